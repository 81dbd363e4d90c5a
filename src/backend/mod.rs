// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Backend access for `D'Mouv` devices.
//!
//! This module defines the two seams between a reconciler and the
//! outside world: [`StatusSource`] for authoritative reads and
//! [`CommandSink`] for state writes. The production implementation of
//! both is [`HttpBackend`]; tests substitute in-memory doubles.
//!
//! Both traits return named futures (`impl Future + Send`) rather than
//! using `async fn` sugar so that reconcilers stay spawnable on
//! multi-threaded runtimes; implementations can still be written with
//! plain `async fn`.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{HttpBackend, HttpConfig};

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::command::StatePatch;
use crate::error::Error;
use crate::types::{PowerState, PresenceState};

/// A full status report from the backend.
///
/// This mirrors the JSON object the status endpoint returns:
/// camelCase keys, power as `"on"`/`"off"`, presence as
/// `"detected"`/`"not-detected"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// Power state of the controlled device.
    pub fan_status: PowerState,
    /// Presence reported by the motion sensor.
    pub person_status: PresenceState,
    /// Whether automatic mode is enabled on the backend.
    pub is_auto_mode: bool,
}

impl StatusSnapshot {
    /// Creates a new status snapshot.
    #[must_use]
    pub const fn new(fan_status: PowerState, person_status: PresenceState, is_auto_mode: bool) -> Self {
        Self {
            fan_status,
            person_status,
            is_auto_mode,
        }
    }
}

/// Trait for reading the authoritative device state.
///
/// # Errors
///
/// Implementations return [`Error::Transport`] when the read fails.
pub trait StatusSource: Send + Sync {
    /// Fetches the current status from the backend.
    fn fetch_status(&self) -> impl Future<Output = Result<StatusSnapshot, Error>> + Send;
}

/// Trait for writing state changes to the backend.
///
/// # Errors
///
/// Implementations return [`Error::Patch`] for patches that carry no
/// fields and [`Error::Transport`] when the write fails.
pub trait CommandSink: Send + Sync {
    /// Applies a partial state patch on the backend.
    fn apply_patch(&self, patch: StatePatch) -> impl Future<Output = Result<(), Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_deserializes_from_wire_format() {
        let json = r#"{"fanStatus":"on","personStatus":"detected","isAutoMode":true}"#;
        let snapshot: StatusSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.fan_status, PowerState::On);
        assert_eq!(snapshot.person_status, PresenceState::Detected);
        assert!(snapshot.is_auto_mode);
    }

    #[test]
    fn snapshot_round_trips_field_names() {
        let snapshot = StatusSnapshot::new(PowerState::Off, PresenceState::NotDetected, false);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            json,
            r#"{"fanStatus":"off","personStatus":"not-detected","isAutoMode":false}"#
        );
    }

    #[test]
    fn snapshot_rejects_unknown_power_strings() {
        let json = r#"{"fanStatus":"standby","personStatus":"detected","isAutoMode":false}"#;
        assert!(serde_json::from_str::<StatusSnapshot>(json).is_err());
    }
}
