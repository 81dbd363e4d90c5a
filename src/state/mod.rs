// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! This module provides the reconciled view of a device. [`DeviceState`]
//! is the value shown to the presentation layer; [`Phase`] records where
//! the device currently sits in the reconciliation cycle.
//!
//! # Examples
//!
//! ```
//! use dmouv_lib::state::DeviceState;
//! use dmouv_lib::types::{PowerState, PresenceState};
//!
//! let mut state = DeviceState::new();
//! state.apply_presence(PresenceState::Detected);
//! state.apply_auto_mode(true);
//! state.mark_loaded();
//!
//! // With automatic mode on, power wants to follow presence.
//! assert_eq!(state.auto_decision(), Some(PowerState::On));
//! ```

mod device_state;
mod phase;

pub use device_state::DeviceState;
pub use phase::Phase;
