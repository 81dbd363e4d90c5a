// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use serde::{Deserialize, Serialize};

use crate::backend::StatusSnapshot;
use crate::types::{PowerState, PresenceState};

/// Reconciled state of a `D'Mouv` device, as shown to the presentation layer.
///
/// The state starts from safe defaults (power off, nobody detected,
/// automatic mode disabled) and is populated by the first successful
/// status read. The `loading` flag stays `true` until that first read
/// resolves, successfully or not.
///
/// # Examples
///
/// ```
/// use dmouv_lib::state::DeviceState;
/// use dmouv_lib::types::PowerState;
///
/// let mut state = DeviceState::new();
/// assert!(state.is_loading());
/// assert_eq!(state.power(), PowerState::Off);
///
/// state.mark_loaded();
/// assert!(!state.is_loading());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceState {
    /// Power state of the controlled device.
    power: PowerState,
    /// Presence reported by the motion sensor.
    presence: PresenceState,
    /// Whether the automatic presence-follows-power rule is active.
    auto_mode_enabled: bool,
    /// Whether the first authoritative read is still outstanding.
    loading: bool,
}

impl DeviceState {
    /// Creates a new device state with safe defaults and `loading` set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the power state.
    #[must_use]
    pub const fn power(&self) -> PowerState {
        self.power
    }

    /// Gets the presence state.
    #[must_use]
    pub const fn presence(&self) -> PresenceState {
        self.presence
    }

    /// Returns `true` if automatic mode is enabled.
    #[must_use]
    pub const fn auto_mode_enabled(&self) -> bool {
        self.auto_mode_enabled
    }

    /// Returns `true` while the first authoritative read is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Applies a power state and returns whether the state actually changed.
    pub fn apply_power(&mut self, power: PowerState) -> bool {
        if self.power == power {
            false
        } else {
            self.power = power;
            true
        }
    }

    /// Applies a presence state and returns whether the state actually changed.
    pub fn apply_presence(&mut self, presence: PresenceState) -> bool {
        if self.presence == presence {
            false
        } else {
            self.presence = presence;
            true
        }
    }

    /// Applies the automatic-mode flag and returns whether the state
    /// actually changed.
    pub fn apply_auto_mode(&mut self, enabled: bool) -> bool {
        if self.auto_mode_enabled == enabled {
            false
        } else {
            self.auto_mode_enabled = enabled;
            true
        }
    }

    /// Applies a full status snapshot from the backend.
    ///
    /// Returns `true` if any field changed. The `loading` flag is not
    /// touched; callers clear it with [`mark_loaded`](Self::mark_loaded)
    /// once the first read has resolved.
    pub fn apply_snapshot(&mut self, snapshot: &StatusSnapshot) -> bool {
        let power = self.apply_power(snapshot.fan_status);
        let presence = self.apply_presence(snapshot.person_status);
        let auto = self.apply_auto_mode(snapshot.is_auto_mode);
        power || presence || auto
    }

    /// Clears the `loading` flag. Returns `true` if it was set.
    pub fn mark_loaded(&mut self) -> bool {
        if self.loading {
            self.loading = false;
            true
        } else {
            false
        }
    }

    /// Returns the power state the automatic-mode decision rule wants
    /// to apply, or `None` when no command is needed.
    ///
    /// The rule is: while automatic mode is enabled, power follows
    /// presence. It never fires while the state is still loading, and
    /// it is idempotent: once power matches presence it returns `None`
    /// until one of the two changes.
    #[must_use]
    pub fn auto_decision(&self) -> Option<PowerState> {
        if self.loading || !self.auto_mode_enabled {
            return None;
        }
        let target = PowerState::from(self.presence.is_detected());
        if self.power == target {
            None
        } else {
            Some(target)
        }
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            power: PowerState::Off,
            presence: PresenceState::NotDetected,
            auto_mode_enabled: false,
            loading: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(power: PowerState, presence: PresenceState, auto: bool) -> DeviceState {
        let mut state = DeviceState::new();
        state.apply_power(power);
        state.apply_presence(presence);
        state.apply_auto_mode(auto);
        state.mark_loaded();
        state
    }

    #[test]
    fn new_state_has_safe_defaults() {
        let state = DeviceState::new();
        assert_eq!(state.power(), PowerState::Off);
        assert_eq!(state.presence(), PresenceState::NotDetected);
        assert!(!state.auto_mode_enabled());
        assert!(state.is_loading());
    }

    #[test]
    fn apply_power_reports_changes() {
        let mut state = DeviceState::new();
        assert!(state.apply_power(PowerState::On));
        assert_eq!(state.power(), PowerState::On);
        assert!(!state.apply_power(PowerState::On));
    }

    #[test]
    fn apply_presence_reports_changes() {
        let mut state = DeviceState::new();
        assert!(state.apply_presence(PresenceState::Detected));
        assert!(!state.apply_presence(PresenceState::Detected));
        assert!(state.apply_presence(PresenceState::NotDetected));
    }

    #[test]
    fn apply_snapshot_updates_all_fields() {
        let mut state = DeviceState::new();
        let snapshot = StatusSnapshot::new(PowerState::On, PresenceState::Detected, true);

        assert!(state.apply_snapshot(&snapshot));
        assert_eq!(state.power(), PowerState::On);
        assert_eq!(state.presence(), PresenceState::Detected);
        assert!(state.auto_mode_enabled());
        // Snapshot application never touches the loading flag.
        assert!(state.is_loading());

        assert!(!state.apply_snapshot(&snapshot));
    }

    #[test]
    fn mark_loaded_is_one_way() {
        let mut state = DeviceState::new();
        assert!(state.mark_loaded());
        assert!(!state.mark_loaded());
        assert!(!state.is_loading());
    }

    #[test]
    fn auto_decision_never_fires_while_loading() {
        let mut state = DeviceState::new();
        state.apply_auto_mode(true);
        state.apply_presence(PresenceState::Detected);
        assert_eq!(state.auto_decision(), None);

        state.mark_loaded();
        assert_eq!(state.auto_decision(), Some(PowerState::On));
    }

    #[test]
    fn auto_decision_requires_auto_mode() {
        let state = loaded(PowerState::Off, PresenceState::Detected, false);
        assert_eq!(state.auto_decision(), None);
    }

    #[test]
    fn auto_decision_follows_presence() {
        let state = loaded(PowerState::Off, PresenceState::Detected, true);
        assert_eq!(state.auto_decision(), Some(PowerState::On));

        let state = loaded(PowerState::On, PresenceState::NotDetected, true);
        assert_eq!(state.auto_decision(), Some(PowerState::Off));
    }

    #[test]
    fn auto_decision_is_idempotent() {
        let state = loaded(PowerState::On, PresenceState::Detected, true);
        assert_eq!(state.auto_decision(), None);

        let state = loaded(PowerState::Off, PresenceState::NotDetected, true);
        assert_eq!(state.auto_decision(), None);
    }
}
