// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry for coordinating multiple reconciled devices.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast, watch};

use crate::backend::{CommandSink, StatusSource};
use crate::error::{Error, Result};
use crate::event::{DeviceId, EventBus, Notice, ReconcilerEvent};
use crate::reconciler::{DeviceConfig, DeviceReconciler};
use crate::state::{DeviceState, Phase};
use crate::types::DeviceKind;

/// Registry for coordinating multiple reconciled devices.
///
/// The `DeviceRegistry` owns one [`DeviceReconciler`] per device, keyed
/// by [`DeviceId`], and funnels every device's events through a single
/// shared bus. User intents are addressed by device ID and forwarded to
/// the owning reconciler.
///
/// # Examples
///
/// ```no_run
/// use dmouv_lib::backend::HttpBackend;
/// use dmouv_lib::reconciler::DeviceConfig;
/// use dmouv_lib::registry::DeviceRegistry;
///
/// #[tokio::main]
/// async fn main() -> dmouv_lib::Result<()> {
///     let registry = DeviceRegistry::new();
///
///     // Subscribe to events for all devices
///     let mut events = registry.subscribe();
///     tokio::spawn(async move {
///         while let Ok(event) = events.recv().await {
///             println!("Event: {event:?}");
///         }
///     });
///
///     // Add and activate a device
///     let backend = HttpBackend::new("192.168.1.42")?;
///     let config = DeviceConfig::fan().with_friendly_name("Bedroom Fan");
///     let device_id = registry.add_device(config, backend.clone(), backend).await;
///     registry.activate(device_id).await?;
///
///     // Forward a user intent
///     registry.request_power_toggle(device_id).await?;
///
///     Ok(())
/// }
/// ```
pub struct DeviceRegistry<S, K> {
    /// Reconcilers, keyed by device ID.
    devices: Arc<RwLock<HashMap<DeviceId, Arc<DeviceReconciler<S, K>>>>>,
    /// Event bus shared by every reconciler in this registry.
    event_bus: EventBus,
}

impl<S, K> DeviceRegistry<S, K>
where
    S: StatusSource + 'static,
    K: CommandSink + 'static,
{
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            devices: Arc::new(RwLock::new(HashMap::new())),
            event_bus: EventBus::new(),
        }
    }

    /// Creates a new registry with custom event bus capacity.
    #[must_use]
    pub fn with_capacity(event_capacity: usize) -> Self {
        Self {
            devices: Arc::new(RwLock::new(HashMap::new())),
            event_bus: EventBus::with_capacity(event_capacity),
        }
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to events from all registered devices.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReconcilerEvent> {
        self.event_bus.subscribe()
    }

    /// Returns the number of active event subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.event_bus.subscriber_count()
    }

    // =========================================================================
    // Device Management
    // =========================================================================

    /// Adds a device to the registry.
    ///
    /// The device is not activated automatically. Call
    /// [`activate`](Self::activate) to run the first read and start
    /// polling.
    pub async fn add_device(&self, config: DeviceConfig, source: S, sink: K) -> DeviceId {
        let reconciler = Arc::new(
            DeviceReconciler::new(config, source, sink).with_event_bus(self.event_bus.clone()),
        );
        let device_id = reconciler.id();

        self.devices.write().await.insert(device_id, reconciler);

        self.event_bus
            .publish(ReconcilerEvent::device_added(device_id));

        device_id
    }

    /// Removes a device from the registry, stopping its polling.
    ///
    /// # Returns
    ///
    /// Returns `true` if the device was found and removed, `false` otherwise.
    pub async fn remove_device(&self, device_id: DeviceId) -> bool {
        let Some(reconciler) = self.devices.write().await.remove(&device_id) else {
            return false;
        };

        reconciler.stop_polling();
        self.event_bus
            .publish(ReconcilerEvent::device_removed(device_id));

        true
    }

    /// Returns a list of all device IDs.
    pub async fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.read().await.keys().copied().collect()
    }

    /// Returns the number of registered devices.
    pub async fn device_count(&self) -> usize {
        self.devices.read().await.len()
    }

    /// Returns the kind of a device.
    pub async fn kind(&self, device_id: DeviceId) -> Option<DeviceKind> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|r| r.kind())
    }

    /// Returns the display name of a device.
    pub async fn display_name(&self, device_id: DeviceId) -> Option<String> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|r| r.display_name().to_string())
    }

    /// Returns the reconciler for a device, if registered.
    pub async fn reconciler(&self, device_id: DeviceId) -> Option<Arc<DeviceReconciler<S, K>>> {
        self.devices.read().await.get(&device_id).cloned()
    }

    // =========================================================================
    // Activation
    // =========================================================================

    /// Activates a device: first authoritative read, then periodic polls.
    ///
    /// A failed first read is surfaced as a notice on the event bus, not
    /// as an error here; polling starts either way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is not registered.
    pub async fn activate(&self, device_id: DeviceId) -> Result<()> {
        let reconciler = self
            .reconciler(device_id)
            .await
            .ok_or(Error::DeviceNotFound)?;

        reconciler.activate().await;
        Ok(())
    }

    /// Deactivates a device: no further polls are scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is not registered.
    pub async fn deactivate(&self, device_id: DeviceId) -> Result<()> {
        let reconciler = self
            .reconciler(device_id)
            .await
            .ok_or(Error::DeviceNotFound)?;

        reconciler.deactivate();
        Ok(())
    }

    /// Returns `true` if the device is currently polling.
    pub async fn is_active(&self, device_id: DeviceId) -> bool {
        self.devices
            .read()
            .await
            .get(&device_id)
            .is_some_and(|r| r.is_polling())
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Returns the current reconciled view of a device.
    pub async fn view_model(&self, device_id: DeviceId) -> Option<DeviceState> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|r| r.view_model())
    }

    /// Creates a watch receiver for a device's view.
    ///
    /// The receiver is notified on every published view: authoritative
    /// reads, optimistic writes, and rollbacks.
    pub async fn watch_device(&self, device_id: DeviceId) -> Option<watch::Receiver<DeviceState>> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|r| r.watch_view())
    }

    /// Returns the reconciliation phase of a device.
    pub async fn phase(&self, device_id: DeviceId) -> Option<Phase> {
        let reconciler = self.reconciler(device_id).await?;
        Some(reconciler.phase().await)
    }

    /// Returns the recorded notices of a device, oldest first.
    pub async fn notices(&self, device_id: DeviceId) -> Option<Vec<Notice>> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|r| r.notices())
    }

    // =========================================================================
    // User Intents
    // =========================================================================

    /// Forwards a manual power toggle to a device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is not registered,
    /// or the write error if the toggle was rejected and rolled back.
    pub async fn request_power_toggle(&self, device_id: DeviceId) -> Result<()> {
        let reconciler = self
            .reconciler(device_id)
            .await
            .ok_or(Error::DeviceNotFound)?;

        reconciler.toggle_power().await
    }

    /// Forwards an automatic-mode change to a device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is not registered,
    /// or the write error if the change was rejected and rolled back.
    pub async fn request_auto_mode_change(&self, device_id: DeviceId, enabled: bool) -> Result<()> {
        let reconciler = self
            .reconciler(device_id)
            .await
            .ok_or(Error::DeviceNotFound)?;

        reconciler.set_auto_mode(enabled).await
    }
}

impl<S, K> Default for DeviceRegistry<S, K>
where
    S: StatusSource + 'static,
    K: CommandSink + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, K> Clone for DeviceRegistry<S, K> {
    fn clone(&self) -> Self {
        Self {
            devices: Arc::clone(&self.devices),
            event_bus: self.event_bus.clone(),
        }
    }
}

impl<S, K> fmt::Debug for DeviceRegistry<S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceRegistry").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StatusSnapshot;
    use crate::command::StatePatch;
    use crate::types::{PowerState, PresenceState};

    /// Status source returning the same snapshot forever.
    #[derive(Clone)]
    struct StaticSource {
        snapshot: StatusSnapshot,
    }

    impl StaticSource {
        fn idle() -> Self {
            Self {
                snapshot: StatusSnapshot::new(PowerState::Off, PresenceState::NotDetected, false),
            }
        }
    }

    impl StatusSource for StaticSource {
        async fn fetch_status(&self) -> Result<StatusSnapshot> {
            Ok(self.snapshot)
        }
    }

    /// Command sink recording every patch.
    #[derive(Clone, Default)]
    struct CountingSink {
        patches: Arc<parking_lot::Mutex<Vec<StatePatch>>>,
    }

    impl CountingSink {
        fn patches(&self) -> Vec<StatePatch> {
            self.patches.lock().clone()
        }
    }

    impl CommandSink for CountingSink {
        async fn apply_patch(&self, patch: StatePatch) -> Result<()> {
            self.patches.lock().push(patch);
            Ok(())
        }
    }

    fn registry() -> DeviceRegistry<StaticSource, CountingSink> {
        DeviceRegistry::new()
    }

    #[tokio::test]
    async fn add_and_remove_publish_lifecycle_events() {
        let registry = registry();
        let mut events = registry.subscribe();

        let id = registry
            .add_device(DeviceConfig::fan(), StaticSource::idle(), CountingSink::default())
            .await;
        assert_eq!(registry.device_count().await, 1);

        let event = events.recv().await.unwrap();
        assert!(event.is_lifecycle());
        assert_eq!(event.device_id(), id);

        assert!(registry.remove_device(id).await);
        assert_eq!(registry.device_count().await, 0);

        let event = events.recv().await.unwrap();
        assert!(matches!(event, ReconcilerEvent::DeviceRemoved { .. }));

        // Removing again is a no-op.
        assert!(!registry.remove_device(id).await);
    }

    #[tokio::test]
    async fn unknown_device_is_an_error() {
        let registry = registry();
        let id = DeviceId::new();

        assert!(matches!(
            registry.activate(id).await,
            Err(Error::DeviceNotFound)
        ));
        assert!(matches!(
            registry.request_power_toggle(id).await,
            Err(Error::DeviceNotFound)
        ));
        assert!(matches!(
            registry.request_auto_mode_change(id, true).await,
            Err(Error::DeviceNotFound)
        ));
        assert!(registry.view_model(id).await.is_none());
    }

    #[tokio::test]
    async fn activation_controls_polling() {
        let registry = registry();
        let id = registry
            .add_device(DeviceConfig::fan(), StaticSource::idle(), CountingSink::default())
            .await;

        assert!(!registry.is_active(id).await);

        registry.activate(id).await.unwrap();
        assert!(registry.is_active(id).await);
        assert_eq!(registry.phase(id).await, Some(Phase::Idle));

        registry.deactivate(id).await.unwrap();
        assert!(!registry.is_active(id).await);
    }

    #[tokio::test]
    async fn intents_are_forwarded_to_the_owning_device() {
        let registry = registry();
        let sink = CountingSink::default();
        let id = registry
            .add_device(DeviceConfig::fan(), StaticSource::idle(), sink.clone())
            .await;
        registry.activate(id).await.unwrap();

        registry.request_power_toggle(id).await.unwrap();

        let view = registry.view_model(id).await.unwrap();
        assert_eq!(view.power(), PowerState::On);
        assert_eq!(sink.patches(), vec![StatePatch::power(PowerState::On)]);
    }

    #[tokio::test]
    async fn metadata_accessors() {
        let registry = registry();
        let id = registry
            .add_device(
                DeviceConfig::lamp().with_friendly_name("Desk Lamp"),
                StaticSource::idle(),
                CountingSink::default(),
            )
            .await;

        assert_eq!(registry.kind(id).await, Some(DeviceKind::Lamp));
        assert_eq!(registry.display_name(id).await, Some("Desk Lamp".to_string()));
        assert_eq!(registry.device_ids().await, vec![id]);
    }
}
