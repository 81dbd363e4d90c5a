// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the view model and the wire format.
//!
//! This module provides type-safe representations of the values a `D'Mouv`
//! device reports and accepts. Each type parses strictly from its wire
//! string, so invalid backend payloads are rejected at the boundary.
//!
//! # Types
//!
//! - [`PowerState`] - On/Off state of the controlled device
//! - [`PresenceState`] - Detected/NotDetected state of the motion sensor
//! - [`DeviceKind`] - Fan/Lamp device classification

mod device_kind;
mod power;
mod presence;

pub use device_kind::DeviceKind;
pub use power::PowerState;
pub use presence::PresenceState;
