// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device state reconciliation.
//!
//! This module is the engineering core of the library. A
//! [`DeviceReconciler`] owns one device and merges three inputs into one
//! consistent view:
//!
//! - **Periodic polls** of the status endpoint (presence only; the rest
//!   of the view may be ahead of the backend due to optimistic writes)
//! - **The decision rule**: while automatic mode is on, power follows
//!   presence
//! - **Manual intents**: power toggles and automatic-mode changes
//!
//! # Write semantics
//!
//! Every write is optimistic: the view changes first, then the command
//! goes out. Manual writes roll back on failure and raise a notice.
//! Automatic writes never roll back; the periodic poll is the authority
//! that corrects a value the backend rejected.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use dmouv_lib::backend::HttpBackend;
//! use dmouv_lib::reconciler::{DeviceConfig, DeviceReconciler};
//!
//! # async fn example() -> dmouv_lib::Result<()> {
//! let backend = HttpBackend::new("192.168.1.42")?;
//! let reconciler = Arc::new(DeviceReconciler::new(
//!     DeviceConfig::fan(),
//!     backend.clone(),
//!     backend,
//! ));
//!
//! reconciler.activate().await;
//! reconciler.set_auto_mode(true).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod device_reconciler;
mod poller;

pub use config::{DeviceConfig, ReconcilerConfig};
pub use device_reconciler::DeviceReconciler;
