// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconciliation phases of a device.

use serde::{Deserialize, Serialize};

/// The reconciliation phase a device is currently in.
///
/// A device starts in [`Loading`](Phase::Loading) and moves to
/// [`Idle`](Phase::Idle) once the first status read resolves. Every
/// outbound command moves it into one of the pending phases for the
/// duration of the write, then back to `Idle` whether the write
/// succeeded or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// The first authoritative read has not resolved yet.
    #[default]
    Loading,
    /// No command is in flight.
    Idle,
    /// The decision rule is switching the device on.
    AutoPendingOn,
    /// The decision rule is switching the device off.
    AutoPendingOff,
    /// A user-initiated command is in flight.
    ManualPending,
}

impl Phase {
    /// Returns `true` if the first read has not resolved yet.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns `true` if no command is in flight.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns `true` if any command is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::AutoPendingOn | Self::AutoPendingOff | Self::ManualPending
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_phase_is_loading() {
        assert_eq!(Phase::default(), Phase::Loading);
        assert!(Phase::default().is_loading());
    }

    #[test]
    fn pending_phases() {
        assert!(Phase::AutoPendingOn.is_pending());
        assert!(Phase::AutoPendingOff.is_pending());
        assert!(Phase::ManualPending.is_pending());
        assert!(!Phase::Idle.is_pending());
        assert!(!Phase::Loading.is_pending());
    }

    #[test]
    fn idle_predicate() {
        assert!(Phase::Idle.is_idle());
        assert!(!Phase::ManualPending.is_idle());
    }
}
