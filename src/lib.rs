// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `DMouv` Lib - A Rust library to reconcile `D'Mouv` smart-home device state.
//!
//! This library owns the client-side view of a `D'Mouv` device (a fan or a
//! lamp with a motion sensor) and keeps it consistent across three inputs:
//! periodic status polls, the automatic-mode decision rule, and manual user
//! intents. Writes are optimistic with deterministic rollback, so the
//! presentation layer stays responsive even when the backend is slow or
//! down.
//!
//! # Supported Features
//!
//! - **Device state reconciliation**: one authoritative view per device,
//!   merged from server reads and local intent
//! - **Automatic mode**: while enabled, power follows the presence signal
//!   (detected → on, not detected → off)
//! - **Optimistic writes**: manual commands update the view first and roll
//!   back if the backend rejects them
//! - **Lifecycle-bound polling**: a cancellable 5-second poll task per
//!   device, started and stopped with the device
//! - **Change notification**: watch channels for the view, a broadcast bus
//!   for lifecycle, state, and notice events
//! - **Multi-device registry**: one reconciler per device id behind a
//!   process-wide registry
//!
//! # Quick Start
//!
//! ## Single Device over HTTP
//!
//! ```no_run
//! use std::sync::Arc;
//! use dmouv_lib::backend::HttpBackend;
//! use dmouv_lib::reconciler::{DeviceConfig, DeviceReconciler};
//!
//! #[tokio::main]
//! async fn main() -> dmouv_lib::Result<()> {
//!     let backend = HttpBackend::new("192.168.1.42")?;
//!     let reconciler = Arc::new(DeviceReconciler::new(
//!         DeviceConfig::fan().with_friendly_name("Bedroom Fan"),
//!         backend.clone(),
//!         backend,
//!     ));
//!
//!     // First authoritative read, then polling every 5 seconds.
//!     reconciler.activate().await;
//!
//!     // Manual control while automatic mode is off.
//!     reconciler.toggle_power().await?;
//!
//!     let view = reconciler.view_model();
//!     println!("fan is {}", view.power());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Automatic Mode
//!
//! ```no_run
//! use std::sync::Arc;
//! use dmouv_lib::backend::HttpBackend;
//! use dmouv_lib::reconciler::{DeviceConfig, DeviceReconciler};
//!
//! #[tokio::main]
//! async fn main() -> dmouv_lib::Result<()> {
//!     let backend = HttpBackend::new("192.168.1.42")?;
//!     let reconciler = Arc::new(DeviceReconciler::new(
//!         DeviceConfig::fan(),
//!         backend.clone(),
//!         backend,
//!     ));
//!     reconciler.activate().await;
//!
//!     // From here on, power follows the presence signal.
//!     reconciler.set_auto_mode(true).await?;
//!
//!     let mut view_rx = reconciler.watch_view();
//!     while view_rx.changed().await.is_ok() {
//!         let view = *view_rx.borrow();
//!         println!("presence: {}, fan: {}", view.presence(), view.power());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Multiple Devices
//!
//! ```no_run
//! use dmouv_lib::backend::HttpBackend;
//! use dmouv_lib::reconciler::DeviceConfig;
//! use dmouv_lib::registry::DeviceRegistry;
//!
//! #[tokio::main]
//! async fn main() -> dmouv_lib::Result<()> {
//!     let registry = DeviceRegistry::new();
//!
//!     let fan_backend = HttpBackend::new("192.168.1.42")?;
//!     let fan = registry
//!         .add_device(DeviceConfig::fan(), fan_backend.clone(), fan_backend)
//!         .await;
//!
//!     let lamp_backend = HttpBackend::new("192.168.1.43")?;
//!     let lamp = registry
//!         .add_device(DeviceConfig::lamp(), lamp_backend.clone(), lamp_backend)
//!         .await;
//!
//!     registry.activate(fan).await?;
//!     registry.activate(lamp).await?;
//!
//!     registry.request_power_toggle(lamp).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Backends
//!
//! The reconciler talks to the backend through two traits,
//! [`StatusSource`](backend::StatusSource) for reads and
//! [`CommandSink`](backend::CommandSink) for writes.
//! [`HttpBackend`](backend::HttpBackend) implements both against the
//! device's REST endpoints; tests and other transports provide their own
//! implementations.

pub mod backend;
pub mod command;
pub mod error;
pub mod event;
pub mod reconciler;
pub mod registry;
pub mod state;
pub mod types;

#[cfg(feature = "http")]
pub use backend::{HttpBackend, HttpConfig};
pub use backend::{CommandSink, StatusSnapshot, StatusSource};
pub use command::StatePatch;
pub use error::{Error, PatchError, Result, TransportError, ValueError};
pub use event::{DeviceId, EventBus, Notice, NoticeKind, ReconcilerEvent};
pub use reconciler::{DeviceConfig, DeviceReconciler, ReconcilerConfig};
pub use registry::DeviceRegistry;
pub use state::{DeviceState, Phase};
pub use types::{DeviceKind, PowerState, PresenceState};
