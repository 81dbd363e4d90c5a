// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device kinds supported by the `D'Mouv` platform.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// The kind of controllable device behind a reconciler.
///
/// Every kind shares the same state model and wire contract; the kind
/// only affects presentation (labels, default display names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// A ceiling or standing fan.
    Fan,
    /// A lamp or light fixture.
    Lamp,
}

impl DeviceKind {
    /// Returns the lowercase label for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::Lamp => "lamp",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fan" => Ok(Self::Fan),
            "lamp" => Ok(Self::Lamp),
            _ => Err(ValueError::InvalidDeviceKind(s.to_string())),
        }
    }
}
