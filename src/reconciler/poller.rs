// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic poll task for a reconciler.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::backend::{CommandSink, StatusSource};

use super::device_reconciler::DeviceReconciler;

/// Handle to a running poll task.
///
/// Stopping is cooperative: the task checks the shutdown signal between
/// ticks, never in the middle of one, so an in-flight poll always runs
/// to completion. The task holds only a weak reference to its
/// reconciler and exits on its own once the reconciler is gone.
pub(crate) struct PollHandle {
    shutdown: watch::Sender<bool>,
}

impl PollHandle {
    /// Spawns the poll loop for `reconciler`, ticking every `period`.
    ///
    /// The first tick fires one full period after the spawn; activation
    /// already performed the initial read, so an immediate tick would
    /// only duplicate it.
    pub(crate) fn spawn<S, K>(reconciler: &Arc<DeviceReconciler<S, K>>, period: Duration) -> Self
    where
        S: StatusSource + 'static,
        K: CommandSink + 'static,
    {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let weak = Arc::downgrade(reconciler);
        let device_id = reconciler.id();

        tokio::spawn(async move {
            tracing::debug!(
                device_id = %device_id,
                period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
                "Status polling started"
            );

            let mut ticker = interval_at(Instant::now() + period, period);
            // A slow poll delays the next tick instead of bursting to catch up.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                let Some(reconciler) = weak.upgrade() else {
                    break;
                };
                reconciler.poll_tick().await;
            }

            tracing::debug!(device_id = %device_id, "Status polling ended");
        });

        Self { shutdown }
    }

    /// Signals the poll loop to stop scheduling further ticks.
    pub(crate) fn stop(self) {
        // Ignore send errors (task already ended)
        let _ = self.shutdown.send(true);
    }
}
