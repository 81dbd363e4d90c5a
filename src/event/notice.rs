// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-facing notices.
//!
//! A notice is a failure report meant for the person using the app,
//! not for the log file: the initial read failed, a toggle did not
//! stick. Reconcilers keep a short history of them and publish each
//! one on the event bus as it happens.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The operation a notice reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeKind {
    /// The first status read after activation failed.
    InitialFetch,
    /// A manual automatic-mode change was rejected and rolled back.
    AutoModeChange,
    /// A manual power toggle was rejected and rolled back.
    PowerToggle,
}

impl NoticeKind {
    /// Returns the lowercase label for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InitialFetch => "initial-fetch",
            Self::AutoModeChange => "auto-mode-change",
            Self::PowerToggle => "power-toggle",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A timestamped, user-facing failure report.
///
/// # Examples
///
/// ```
/// use dmouv_lib::event::{Notice, NoticeKind};
///
/// let notice = Notice::new(NoticeKind::PowerToggle, "failed to update fan status");
/// assert_eq!(notice.kind(), NoticeKind::PowerToggle);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    kind: NoticeKind,
    message: String,
    at: DateTime<Utc>,
}

impl Notice {
    /// Creates a new notice timestamped with the current time.
    #[must_use]
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            at: Utc::now(),
        }
    }

    /// Gets the kind of operation this notice reports on.
    #[must_use]
    pub const fn kind(&self) -> NoticeKind {
        self.kind
    }

    /// Gets the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the time the notice was raised.
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        self.at
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
