// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconciler event types.

use crate::state::DeviceState;

use super::{DeviceId, Notice};

/// Events emitted by reconcilers and the device registry.
///
/// These events notify subscribers about device lifecycle changes,
/// reconciled state updates, and user-facing notices. All events
/// include the relevant device ID for targeted handling.
///
/// # Examples
///
/// ```
/// use dmouv_lib::event::{DeviceId, ReconcilerEvent};
///
/// let device_id = DeviceId::new();
///
/// let added = ReconcilerEvent::DeviceAdded { device_id };
/// assert!(added.is_lifecycle());
/// ```
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum ReconcilerEvent {
    /// A device was added to the registry.
    DeviceAdded {
        /// The ID of the added device.
        device_id: DeviceId,
    },

    /// A device was removed from the registry.
    DeviceRemoved {
        /// The ID of the removed device.
        device_id: DeviceId,
    },

    /// The reconciled view of a device changed.
    ///
    /// Emitted for every published view: authoritative reads,
    /// optimistic writes, and rollbacks alike.
    StateChanged {
        /// The ID of the device.
        device_id: DeviceId,
        /// The complete new view of the device.
        state: DeviceState,
    },

    /// A user-facing notice was raised.
    NoticeRaised {
        /// The ID of the device.
        device_id: DeviceId,
        /// The notice itself.
        notice: Notice,
    },
}

impl ReconcilerEvent {
    /// Returns the device ID associated with this event.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::DeviceAdded { device_id }
            | Self::DeviceRemoved { device_id }
            | Self::StateChanged { device_id, .. }
            | Self::NoticeRaised { device_id, .. } => *device_id,
        }
    }

    /// Returns `true` if this is a device lifecycle event (added/removed).
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::DeviceAdded { .. } | Self::DeviceRemoved { .. })
    }

    /// Returns `true` if this is a state change event.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }

    /// Returns `true` if this is a notice event.
    #[must_use]
    pub fn is_notice(&self) -> bool {
        matches!(self, Self::NoticeRaised { .. })
    }

    /// Creates a device added event.
    #[must_use]
    pub fn device_added(device_id: DeviceId) -> Self {
        Self::DeviceAdded { device_id }
    }

    /// Creates a device removed event.
    #[must_use]
    pub fn device_removed(device_id: DeviceId) -> Self {
        Self::DeviceRemoved { device_id }
    }

    /// Creates a state changed event.
    #[must_use]
    pub fn state_changed(device_id: DeviceId, state: DeviceState) -> Self {
        Self::StateChanged { device_id, state }
    }

    /// Creates a notice event.
    #[must_use]
    pub fn notice_raised(device_id: DeviceId, notice: Notice) -> Self {
        Self::NoticeRaised { device_id, notice }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NoticeKind;

    #[test]
    fn device_id_extraction() {
        let id = DeviceId::new();

        assert_eq!(ReconcilerEvent::device_added(id).device_id(), id);
        assert_eq!(ReconcilerEvent::device_removed(id).device_id(), id);
        assert_eq!(
            ReconcilerEvent::state_changed(id, DeviceState::new()).device_id(),
            id
        );
    }

    #[test]
    fn lifecycle_events() {
        let id = DeviceId::new();

        assert!(ReconcilerEvent::device_added(id).is_lifecycle());
        assert!(ReconcilerEvent::device_removed(id).is_lifecycle());
        assert!(!ReconcilerEvent::state_changed(id, DeviceState::new()).is_lifecycle());
    }

    #[test]
    fn state_change_events() {
        let id = DeviceId::new();
        let event = ReconcilerEvent::state_changed(id, DeviceState::new());

        assert!(event.is_state_change());
        assert!(!event.is_lifecycle());
        assert!(!event.is_notice());
    }

    #[test]
    fn notice_events() {
        let id = DeviceId::new();
        let notice = Notice::new(NoticeKind::PowerToggle, "failed to update fan status");
        let event = ReconcilerEvent::notice_raised(id, notice.clone());

        assert!(event.is_notice());
        if let ReconcilerEvent::NoticeRaised { notice: n, .. } = event {
            assert_eq!(n, notice);
        } else {
            panic!("Expected NoticeRaised event");
        }
    }
}
