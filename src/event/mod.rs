// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for reconciled state changes and notices.
//!
//! This module provides a pub/sub event system for notifying subscribers
//! about device lifecycle, state changes, and user-facing notices. The
//! [`EventBus`] uses tokio's broadcast channel to allow multiple
//! subscribers to receive events.
//!
//! # Examples
//!
//! ```
//! use dmouv_lib::event::{DeviceId, EventBus, ReconcilerEvent};
//!
//! let bus = EventBus::new();
//!
//! // Subscribe to events
//! let mut rx = bus.subscribe();
//!
//! // Publish an event
//! let device_id = DeviceId::new();
//! bus.publish(ReconcilerEvent::DeviceAdded { device_id });
//! ```

mod device_id;
mod event_bus;
mod notice;
mod reconciler_event;

pub use device_id::DeviceId;
pub use event_bus::EventBus;
pub use notice::{Notice, NoticeKind};
pub use reconciler_event::ReconcilerEvent;
