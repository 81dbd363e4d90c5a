// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry for coordinating multiple reconciled devices.
//!
//! This module provides a high-level API for applications that show more
//! than one `D'Mouv` device: the original product pairs a fan and a lamp,
//! each with its own reconciler.
//!
//! # Overview
//!
//! The [`DeviceRegistry`] is the process-wide entry point for the
//! presentation layer. It provides:
//!
//! - **Device management**: add and remove devices, keyed by [`DeviceId`](crate::event::DeviceId)
//! - **Lifecycle control**: activate (first read + polling) and deactivate devices
//! - **View access**: query or watch any device's reconciled state
//! - **Intent routing**: forward power toggles and auto-mode changes to the owning reconciler
//! - **Event funnel**: one shared bus carries every device's events
//!
//! # Examples
//!
//! ## Basic Usage
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
//!     // Add a device
//!     let backend = HttpBackend::new("192.168.1.42")?;
//!     let config = DeviceConfig::fan().with_friendly_name("Bedroom Fan");
//!     let device_id = registry.add_device(config, backend.clone(), backend).await;
//!
//!     // First authoritative read, then polling every 5 seconds
//!     registry.activate(device_id).await?;
//!
//!     // Forward user intents
//!     registry.request_auto_mode_change(device_id, true).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Event Subscription
//!
//! ```no_run
//! use dmouv_lib::backend::HttpBackend;
//! use dmouv_lib::event::ReconcilerEvent;
//! use dmouv_lib::registry::DeviceRegistry;
//!
//! # fn example(registry: DeviceRegistry<HttpBackend, HttpBackend>) {
//! let mut events = registry.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             ReconcilerEvent::StateChanged { device_id, state } => {
//!                 println!("{device_id}: power is {}", state.power());
//!             }
//!             ReconcilerEvent::NoticeRaised { notice, .. } => {
//!                 println!("notice: {notice}");
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//! # }
//! ```
//!
//! ## Watching Device State
//!
//! ```no_run
//! use dmouv_lib::backend::HttpBackend;
//! use dmouv_lib::registry::DeviceRegistry;
//!
//! # async fn example(registry: DeviceRegistry<HttpBackend, HttpBackend>, device_id: dmouv_lib::event::DeviceId) {
//! if let Some(mut view_rx) = registry.watch_device(device_id).await {
//!     tokio::spawn(async move {
//!         while view_rx.changed().await.is_ok() {
//!             let view = *view_rx.borrow();
//!             println!("fan is {}", view.power());
//!         }
//!     });
//! }
//! # }
//! ```

mod device_registry;

pub use device_registry::DeviceRegistry;
