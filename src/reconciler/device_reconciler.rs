// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device state reconciliation.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};

use crate::backend::{CommandSink, StatusSource};
use crate::command::StatePatch;
use crate::error::{Error, Result, TransportError};
use crate::event::{DeviceId, EventBus, Notice, NoticeKind, ReconcilerEvent};
use crate::state::{DeviceState, Phase};
use crate::types::{DeviceKind, PowerState};

use super::config::DeviceConfig;
use super::poller::PollHandle;

/// State guarded by the reconciler's mutex.
///
/// Holding one lock across a whole operation, including the backend
/// await, is what makes each operation atomic: a poll tick can never
/// interleave with a half-finished toggle.
struct Core {
    state: DeviceState,
    phase: Phase,
}

/// Reconciles one device's state against its backend.
///
/// The reconciler merges three inputs into a single consistent view:
/// periodic status polls, the automatic-mode decision rule, and manual
/// user intents. Writes are optimistic: the view changes first, then
/// the command goes out, and a rejected manual command is rolled back
/// to the value captured before the write.
///
/// Operations serialize on an internal mutex, so at most one of
/// [`initialize`](Self::initialize), [`poll_tick`](Self::poll_tick),
/// [`set_auto_mode`](Self::set_auto_mode) and
/// [`toggle_power`](Self::toggle_power) runs at a time.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use dmouv_lib::backend::HttpBackend;
/// use dmouv_lib::reconciler::{DeviceConfig, DeviceReconciler};
///
/// # async fn example() -> dmouv_lib::Result<()> {
/// let backend = HttpBackend::new("192.168.1.42")?;
/// let reconciler = Arc::new(DeviceReconciler::new(
///     DeviceConfig::fan().with_friendly_name("Bedroom Fan"),
///     backend.clone(),
///     backend,
/// ));
///
/// // First authoritative read, then polling every 5 seconds.
/// reconciler.activate().await;
///
/// let view = reconciler.view_model();
/// println!("power: {}", view.power());
/// # Ok(())
/// # }
/// ```
pub struct DeviceReconciler<S, K> {
    id: DeviceId,
    config: DeviceConfig,
    source: S,
    sink: K,
    core: Mutex<Core>,
    view_tx: watch::Sender<DeviceState>,
    events: EventBus,
    notices: parking_lot::Mutex<VecDeque<Notice>>,
    poll_task: parking_lot::Mutex<Option<PollHandle>>,
}

impl<S, K> DeviceReconciler<S, K>
where
    S: StatusSource,
    K: CommandSink,
{
    /// Creates a new reconciler with its own event bus.
    ///
    /// The view starts at safe defaults with the loading flag set; call
    /// [`initialize`](Self::initialize) (or [`activate`](Self::activate))
    /// to populate it.
    #[must_use]
    pub fn new(config: DeviceConfig, source: S, sink: K) -> Self {
        let state = DeviceState::new();
        let (view_tx, _) = watch::channel(state);

        Self {
            id: DeviceId::new(),
            config,
            source,
            sink,
            core: Mutex::new(Core {
                state,
                phase: Phase::Loading,
            }),
            view_tx,
            events: EventBus::new(),
            notices: parking_lot::Mutex::new(VecDeque::new()),
            poll_task: parking_lot::Mutex::new(None),
        }
    }

    /// Replaces the event bus, for sharing one bus across devices.
    ///
    /// Intended to be called right after construction, before any
    /// operation runs; events already published are not replayed.
    #[must_use]
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Returns the device ID.
    #[must_use]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Returns the device kind.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.config.kind
    }

    /// Returns the device configuration.
    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Returns the friendly name if set, otherwise the kind label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.config.display_name()
    }

    /// Returns the current reconciled view.
    #[must_use]
    pub fn view_model(&self) -> DeviceState {
        *self.view_tx.borrow()
    }

    /// Creates a watch receiver for view updates.
    ///
    /// The receiver yields the complete view after every published
    /// change: authoritative reads, optimistic writes, and rollbacks.
    #[must_use]
    pub fn watch_view(&self) -> watch::Receiver<DeviceState> {
        self.view_tx.subscribe()
    }

    /// Subscribes to this device's reconciler events.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ReconcilerEvent> {
        self.events.subscribe()
    }

    /// Returns the current reconciliation phase.
    ///
    /// Waits for any in-flight operation to settle first, so the
    /// returned phase is `Loading` or `Idle` in practice.
    pub async fn phase(&self) -> Phase {
        self.core.lock().await.phase
    }

    /// Returns the recorded notices, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().iter().cloned().collect()
    }

    /// Performs the first authoritative read.
    ///
    /// On success the view is populated from the snapshot and the
    /// decision rule is evaluated once. On failure the view keeps its
    /// defaults and a [`NoticeKind::InitialFetch`] notice is raised.
    /// Either way the loading flag is cleared and commands are accepted
    /// again. Polls only track presence, so after a failed read power
    /// and the auto-mode flag stay at their defaults until a retry of
    /// this call succeeds.
    ///
    /// Calling this again after the first read re-reads and
    /// re-populates the view, which is how a re-activated device picks
    /// up fresh state.
    ///
    /// # Errors
    ///
    /// Returns the read error after recording the notice.
    pub async fn initialize(&self) -> Result<()> {
        let mut core = self.core.lock().await;

        match self.read_status().await {
            Ok(snapshot) => {
                core.state.apply_snapshot(&snapshot);
                core.state.mark_loaded();
                core.phase = Phase::Idle;
                self.publish(&core);

                tracing::debug!(device_id = %self.id, ?snapshot, "Initial status read complete");

                self.run_auto_rule(&mut core).await;
                Ok(())
            }
            Err(err) => {
                core.state.mark_loaded();
                core.phase = Phase::Idle;
                self.publish(&core);

                tracing::warn!(device_id = %self.id, error = %err, "Initial status read failed");
                self.raise_notice(NoticeKind::InitialFetch, "failed to fetch initial device status");

                Err(err)
            }
        }
    }

    /// Performs one poll cycle against the status endpoint.
    ///
    /// Only the presence field is consumed: power and the auto-mode
    /// flag in the view may be ahead of the backend because of
    /// optimistic writes, and a poll must not clobber them. When
    /// presence changed, the view is republished and the decision rule
    /// runs. Read failures are logged and swallowed; polling continues
    /// on the next tick.
    pub async fn poll_tick(&self) {
        let mut core = self.core.lock().await;

        if core.state.is_loading() {
            tracing::debug!(device_id = %self.id, "Skipping poll while initial read is outstanding");
            return;
        }

        let snapshot = match self.read_status().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(device_id = %self.id, error = %err, "Status poll failed");
                return;
            }
        };

        if core.state.apply_presence(snapshot.person_status) {
            tracing::debug!(
                device_id = %self.id,
                presence = %snapshot.person_status,
                "Presence changed"
            );
            self.publish(&core);
            self.run_auto_rule(&mut core).await;
        }
    }

    /// Enables or disables automatic mode.
    ///
    /// The flag flips optimistically before the write goes out. A
    /// rejected write rolls the flag back to the value captured before
    /// the flip and raises a [`NoticeKind::AutoModeChange`] notice.
    /// When the flag turns on successfully, the decision rule runs
    /// immediately so power catches up with current presence.
    ///
    /// Ignored while the initial read is outstanding, and when `enabled`
    /// already matches the view.
    ///
    /// # Errors
    ///
    /// Returns the write error after rolling back.
    pub async fn set_auto_mode(&self, enabled: bool) -> Result<()> {
        let mut core = self.core.lock().await;

        if core.state.is_loading() {
            tracing::debug!(device_id = %self.id, "Ignoring auto-mode change while loading");
            return Ok(());
        }

        let previous = core.state.auto_mode_enabled();
        if previous == enabled {
            return Ok(());
        }

        core.state.apply_auto_mode(enabled);
        core.phase = Phase::ManualPending;
        self.publish(&core);

        match self.send_patch(StatePatch::auto_mode(enabled)).await {
            Ok(()) => {
                core.phase = Phase::Idle;
                if enabled {
                    self.run_auto_rule(&mut core).await;
                }
                Ok(())
            }
            Err(err) => {
                core.state.apply_auto_mode(previous);
                core.phase = Phase::Idle;
                self.publish(&core);

                tracing::warn!(device_id = %self.id, error = %err, "Auto-mode change rejected");
                self.raise_notice(NoticeKind::AutoModeChange, "failed to update automatic mode");

                Err(err)
            }
        }
    }

    /// Toggles the power state manually.
    ///
    /// The view flips optimistically before the write goes out. A
    /// rejected write rolls power back to the value captured before the
    /// flip and raises a [`NoticeKind::PowerToggle`] notice.
    ///
    /// Ignored while the initial read is outstanding and while
    /// automatic mode owns the power state.
    ///
    /// # Errors
    ///
    /// Returns the write error after rolling back.
    pub async fn toggle_power(&self) -> Result<()> {
        let mut core = self.core.lock().await;

        if core.state.is_loading() {
            tracing::debug!(device_id = %self.id, "Ignoring power toggle while loading");
            return Ok(());
        }

        if core.state.auto_mode_enabled() {
            tracing::debug!(device_id = %self.id, "Ignoring power toggle while automatic mode is active");
            return Ok(());
        }

        let previous = core.state.power();
        let target = previous.toggled();

        core.state.apply_power(target);
        core.phase = Phase::ManualPending;
        self.publish(&core);

        match self.send_patch(StatePatch::power(target)).await {
            Ok(()) => {
                core.phase = Phase::Idle;
                Ok(())
            }
            Err(err) => {
                core.state.apply_power(previous);
                core.phase = Phase::Idle;
                self.publish(&core);

                tracing::warn!(device_id = %self.id, error = %err, "Power toggle rejected");
                self.raise_notice(NoticeKind::PowerToggle, "failed to update power state");

                Err(err)
            }
        }
    }

    /// Evaluates the automatic-mode decision rule and issues the
    /// correcting command if one is needed.
    ///
    /// Automatic commands are optimistic but never rolled back: the
    /// periodic poll is the authority that straightens out a value the
    /// backend rejected, and flapping the view in the meantime would
    /// only fight it.
    async fn run_auto_rule(&self, core: &mut Core) {
        let Some(target) = core.state.auto_decision() else {
            return;
        };

        core.state.apply_power(target);
        core.phase = if target == PowerState::On {
            Phase::AutoPendingOn
        } else {
            Phase::AutoPendingOff
        };
        self.publish(core);

        tracing::debug!(device_id = %self.id, target = %target, "Decision rule issuing power command");

        if let Err(err) = self.send_patch(StatePatch::power(target)).await {
            tracing::warn!(device_id = %self.id, error = %err, "Automatic power command failed");
        }

        core.phase = Phase::Idle;
    }

    /// Reads the status endpoint, bounded by the call timeout.
    async fn read_status(&self) -> Result<crate::backend::StatusSnapshot> {
        let limit = self.config.reconciler.call_timeout;
        match tokio::time::timeout(limit, self.source.fetch_status()).await {
            Ok(result) => result,
            Err(_) => Err(Error::Transport(TransportError::Timeout(duration_ms(limit)))),
        }
    }

    /// Sends a state patch, bounded by the call timeout.
    async fn send_patch(&self, patch: StatePatch) -> Result<()> {
        let limit = self.config.reconciler.call_timeout;
        match tokio::time::timeout(limit, self.sink.apply_patch(patch)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Transport(TransportError::Timeout(duration_ms(limit)))),
        }
    }

    /// Publishes the current view on the watch channel and the event bus.
    fn publish(&self, core: &Core) {
        let state = core.state;
        // send_replace stores the view even when no receiver is alive;
        // send() would drop it and leave view_model() readers stale.
        self.view_tx.send_replace(state);
        self.events
            .publish(ReconcilerEvent::state_changed(self.id, state));
    }

    /// Records a notice and announces it on the event bus.
    fn raise_notice(&self, kind: NoticeKind, message: &str) {
        let notice = Notice::new(kind, message);

        let mut log = self.notices.lock();
        if log.len() >= self.config.reconciler.notice_capacity {
            log.pop_front();
        }
        log.push_back(notice.clone());
        drop(log);

        self.events
            .publish(ReconcilerEvent::notice_raised(self.id, notice));
    }
}

impl<S, K> DeviceReconciler<S, K>
where
    S: StatusSource + 'static,
    K: CommandSink + 'static,
{
    /// Initializes the device and starts periodic polling.
    ///
    /// A failed initial read is already surfaced as a notice, so it is
    /// not propagated here; polling starts either way and later reads
    /// can straighten the view out.
    pub async fn activate(self: &Arc<Self>) {
        let _ = self.initialize().await;
        self.start_polling();
    }

    /// Stops periodic polling.
    ///
    /// No further ticks are scheduled. A tick already in flight runs to
    /// completion; its result still lands through the usual path.
    pub fn deactivate(&self) {
        self.stop_polling();
    }

    /// Starts the periodic poll task if it is not already running.
    ///
    /// The task holds only a weak reference to the reconciler, so
    /// dropping the last `Arc` also ends polling.
    pub fn start_polling(self: &Arc<Self>) {
        let mut slot = self.poll_task.lock();
        if slot.is_some() {
            tracing::debug!(device_id = %self.id, "Polling already active");
            return;
        }
        *slot = Some(PollHandle::spawn(self, self.config.reconciler.poll_interval));
    }

    /// Stops the periodic poll task if one is running.
    pub fn stop_polling(&self) {
        if let Some(handle) = self.poll_task.lock().take() {
            handle.stop();
            tracing::debug!(device_id = %self.id, "Polling stopped");
        }
    }

    /// Returns `true` if the periodic poll task is running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poll_task.lock().is_some()
    }
}

impl<S, K> std::fmt::Debug for DeviceReconciler<S, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceReconciler")
            .field("id", &self.id)
            .field("kind", &self.config.kind)
            .field("display_name", &self.config.display_name())
            .finish_non_exhaustive()
    }
}

/// Converts a duration to whole milliseconds for error reporting.
fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StatusSnapshot;
    use crate::types::PresenceState;

    use std::sync::atomic::{AtomicBool, Ordering};

    /// Status source returning a fixed snapshot, or an error when told to fail.
    struct FixedSource {
        snapshot: StatusSnapshot,
        failing: AtomicBool,
    }

    impl FixedSource {
        fn new(snapshot: StatusSnapshot) -> Self {
            Self {
                snapshot,
                failing: AtomicBool::new(false),
            }
        }

        fn failing(snapshot: StatusSnapshot) -> Self {
            Self {
                snapshot,
                failing: AtomicBool::new(true),
            }
        }
    }

    impl StatusSource for FixedSource {
        async fn fetch_status(&self) -> Result<StatusSnapshot> {
            if self.failing.load(Ordering::SeqCst) {
                Err(TransportError::ConnectionFailed("injected".to_string()).into())
            } else {
                Ok(self.snapshot)
            }
        }
    }

    /// Command sink recording every patch, failing when told to.
    ///
    /// Clones share their storage, so the test keeps one handle for
    /// assertions while the reconciler owns another.
    #[derive(Clone, Default)]
    struct RecordingSink {
        patches: Arc<parking_lot::Mutex<Vec<StatePatch>>>,
        failing: Arc<AtomicBool>,
    }

    impl RecordingSink {
        fn patches(&self) -> Vec<StatePatch> {
            self.patches.lock().clone()
        }

        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    impl CommandSink for RecordingSink {
        async fn apply_patch(&self, patch: StatePatch) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(TransportError::ConnectionFailed("injected".to_string()).into())
            } else {
                self.patches.lock().push(patch);
                Ok(())
            }
        }
    }

    fn snapshot(power: PowerState, presence: PresenceState, auto: bool) -> StatusSnapshot {
        StatusSnapshot::new(power, presence, auto)
    }

    #[test]
    fn new_reconciler_starts_loading() {
        let sink = RecordingSink::default();
        let source = FixedSource::new(snapshot(PowerState::Off, PresenceState::NotDetected, false));
        let reconciler = DeviceReconciler::new(DeviceConfig::fan(), source, sink.clone());

        let view = reconciler.view_model();
        assert!(view.is_loading());
        assert_eq!(view.power(), PowerState::Off);
        assert!(!reconciler.is_polling());
    }

    #[tokio::test]
    async fn initialize_populates_view() {
        let sink = RecordingSink::default();
        let source = FixedSource::new(snapshot(PowerState::On, PresenceState::Detected, false));
        let reconciler = DeviceReconciler::new(DeviceConfig::fan(), source, sink.clone());

        reconciler.initialize().await.unwrap();

        let view = reconciler.view_model();
        assert!(!view.is_loading());
        assert_eq!(view.power(), PowerState::On);
        assert_eq!(view.presence(), PresenceState::Detected);
        assert_eq!(reconciler.phase().await, Phase::Idle);
        // Auto mode off: no command issued.
        assert!(sink.patches().is_empty());
    }

    #[tokio::test]
    async fn view_updates_land_without_any_watch_receiver() {
        // The receiver handed out by the watch channel at construction
        // is dropped immediately; published views must still be stored
        // for view_model() readers and late subscribers.
        let sink = RecordingSink::default();
        let source = FixedSource::new(snapshot(PowerState::On, PresenceState::Detected, false));
        let reconciler = DeviceReconciler::new(DeviceConfig::fan(), source, sink.clone());

        reconciler.initialize().await.unwrap();

        let view = reconciler.view_model();
        assert!(!view.is_loading());
        assert_eq!(view.power(), PowerState::On);

        let rx = reconciler.watch_view();
        assert_eq!(rx.borrow().power(), PowerState::On);
    }

    #[tokio::test]
    async fn initialize_failure_keeps_defaults_and_raises_notice() {
        let sink = RecordingSink::default();
        let source = FixedSource::failing(snapshot(PowerState::On, PresenceState::Detected, true));
        let reconciler = DeviceReconciler::new(DeviceConfig::fan(), source, sink.clone());

        let result = reconciler.initialize().await;
        assert!(result.is_err());

        let view = reconciler.view_model();
        assert!(!view.is_loading());
        assert_eq!(view.power(), PowerState::Off);
        assert!(!view.auto_mode_enabled());

        let notices = reconciler.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind(), NoticeKind::InitialFetch);
        assert!(sink.patches().is_empty());
    }

    #[tokio::test]
    async fn initialize_runs_decision_rule_once() {
        let sink = RecordingSink::default();
        let source = FixedSource::new(snapshot(PowerState::Off, PresenceState::Detected, true));
        let reconciler = DeviceReconciler::new(DeviceConfig::fan(), source, sink.clone());

        reconciler.initialize().await.unwrap();

        assert_eq!(reconciler.view_model().power(), PowerState::On);
        assert_eq!(sink.patches(), vec![StatePatch::power(PowerState::On)]);
    }

    #[tokio::test]
    async fn commands_are_ignored_while_loading() {
        let sink = RecordingSink::default();
        let source = FixedSource::new(snapshot(PowerState::Off, PresenceState::NotDetected, false));
        let reconciler = DeviceReconciler::new(DeviceConfig::fan(), source, sink.clone());

        reconciler.toggle_power().await.unwrap();
        reconciler.set_auto_mode(true).await.unwrap();

        assert!(sink.patches().is_empty());
        assert!(reconciler.view_model().is_loading());
    }

    #[tokio::test]
    async fn toggle_power_rolls_back_on_failure() {
        let sink = RecordingSink::default();
        let source = FixedSource::new(snapshot(PowerState::Off, PresenceState::NotDetected, false));
        let reconciler = DeviceReconciler::new(DeviceConfig::fan(), source, sink.clone());
        reconciler.initialize().await.unwrap();

        sink.set_failing(true);
        let result = reconciler.toggle_power().await;

        assert!(result.is_err());
        assert_eq!(reconciler.view_model().power(), PowerState::Off);
        assert_eq!(reconciler.phase().await, Phase::Idle);

        let notices = reconciler.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind(), NoticeKind::PowerToggle);
    }

    #[tokio::test]
    async fn notice_history_is_bounded() {
        let sink = RecordingSink::default();
        let source = FixedSource::new(snapshot(PowerState::Off, PresenceState::NotDetected, false));
        let config = DeviceConfig::fan().with_reconciler(
            crate::reconciler::ReconcilerConfig::new().with_notice_capacity(2),
        );
        let reconciler = DeviceReconciler::new(config, source, sink.clone());
        reconciler.initialize().await.unwrap();

        sink.set_failing(true);
        for _ in 0..4 {
            let _ = reconciler.toggle_power().await;
        }

        assert_eq!(reconciler.notices().len(), 2);
    }
}
