// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration types for device reconcilers.

use std::time::Duration;

use crate::types::DeviceKind;

/// Timing and bookkeeping policy for a reconciler.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use dmouv_lib::reconciler::ReconcilerConfig;
///
/// // Default policy (5 s polls, 10 s call timeout)
/// let config = ReconcilerConfig::default();
///
/// // Custom policy
/// let config = ReconcilerConfig::new()
///     .with_poll_interval(Duration::from_secs(2))
///     .with_call_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Interval between periodic status polls.
    pub poll_interval: Duration,
    /// Upper bound on any single backend call.
    pub call_timeout: Duration,
    /// Maximum number of notices kept per device; older ones are dropped.
    pub notice_capacity: usize,
}

impl ReconcilerConfig {
    /// Default interval between status polls.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
    /// Default upper bound on a single backend call.
    pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default size of the per-device notice history.
    pub const DEFAULT_NOTICE_CAPACITY: usize = 64;

    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the interval between status polls.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the upper bound on a single backend call.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Sets the size of the notice history.
    #[must_use]
    pub fn with_notice_capacity(mut self, capacity: usize) -> Self {
        self.notice_capacity = capacity;
        self
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            call_timeout: Self::DEFAULT_CALL_TIMEOUT,
            notice_capacity: Self::DEFAULT_NOTICE_CAPACITY,
        }
    }
}

/// Configuration for a reconciled device.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use dmouv_lib::reconciler::DeviceConfig;
///
/// let config = DeviceConfig::fan()
///     .with_friendly_name("Bedroom Fan")
///     .with_poll_interval(Duration::from_secs(3));
///
/// assert_eq!(config.display_name(), "Bedroom Fan");
/// ```
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// The kind of device behind this reconciler.
    pub kind: DeviceKind,
    /// Optional friendly name for the device.
    pub friendly_name: Option<String>,
    /// Timing and bookkeeping policy.
    pub reconciler: ReconcilerConfig,
}

impl DeviceConfig {
    /// Creates a configuration for the given device kind.
    #[must_use]
    pub fn new(kind: DeviceKind) -> Self {
        Self {
            kind,
            friendly_name: None,
            reconciler: ReconcilerConfig::default(),
        }
    }

    /// Creates a configuration for a fan.
    #[must_use]
    pub fn fan() -> Self {
        Self::new(DeviceKind::Fan)
    }

    /// Creates a configuration for a lamp.
    #[must_use]
    pub fn lamp() -> Self {
        Self::new(DeviceKind::Lamp)
    }

    /// Sets a friendly name for the device.
    #[must_use]
    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    /// Sets the reconciler policy.
    #[must_use]
    pub fn with_reconciler(mut self, config: ReconcilerConfig) -> Self {
        self.reconciler = config;
        self
    }

    /// Sets the interval between status polls.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.reconciler.poll_interval = interval;
        self
    }

    /// Sets the upper bound on a single backend call.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.reconciler.call_timeout = timeout;
        self
    }

    /// Returns the friendly name if set, otherwise the kind label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.friendly_name
            .as_deref()
            .unwrap_or(self.kind.as_str())
    }
}
