// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel shared by reconcilers and the registry.

use tokio::sync::broadcast;

use super::ReconcilerEvent;

/// Default number of buffered events per subscriber.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fan-out channel for [`ReconcilerEvent`]s.
///
/// Cloning the bus clones a handle to the same underlying channel, which
/// is how the registry hands every reconciler one shared bus: subscribers
/// then see a single merged stream across all devices. Each subscription
/// receives every event published after it was opened.
///
/// A subscriber that stops reading falls behind. Once it trails by more
/// than the channel capacity, its oldest pending events are discarded and
/// the next `recv` reports `RecvError::Lagged`; publishing never blocks.
///
/// # Examples
///
/// ```
/// use dmouv_lib::event::{DeviceId, EventBus, ReconcilerEvent};
///
/// let bus = EventBus::new();
/// let mut events = bus.subscribe();
///
/// bus.publish(ReconcilerEvent::device_added(DeviceId::new()));
/// assert!(events.try_recv().is_ok());
/// ```
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<ReconcilerEvent>,
}

impl EventBus {
    /// Creates a bus with the default buffer capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering at most `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Opens a new subscription.
    ///
    /// The receiver sees events published from this point on; earlier
    /// events are not replayed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReconcilerEvent> {
        self.sender.subscribe()
    }

    /// Returns how many subscriptions are currently open.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Delivers an event to every open subscription.
    ///
    /// Fire-and-forget: with no subscribers the event is dropped.
    pub fn publish(&self, event: ReconcilerEvent) {
        // Err here just means nobody is listening.
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
