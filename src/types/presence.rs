// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Presence state reported by the device's motion sensor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Represents whether the device currently detects a person.
///
/// The backend reports presence as the strings `"detected"` and
/// `"not-detected"`; the serde representation matches.
///
/// # Examples
///
/// ```
/// use dmouv_lib::types::PresenceState;
///
/// let presence: PresenceState = "detected".parse().unwrap();
/// assert!(presence.is_detected());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresenceState {
    /// No person is currently detected.
    #[default]
    NotDetected,
    /// A person is currently detected.
    Detected,
}

impl PresenceState {
    /// Returns the wire string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotDetected => "not-detected",
            Self::Detected => "detected",
        }
    }

    /// Returns `true` if a person is currently detected.
    #[must_use]
    pub const fn is_detected(&self) -> bool {
        matches!(self, Self::Detected)
    }
}

impl fmt::Display for PresenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PresenceState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "detected" => Ok(Self::Detected),
            "not-detected" => Ok(Self::NotDetected),
            _ => Err(ValueError::InvalidPresenceState(s.to_string())),
        }
    }
}

impl From<bool> for PresenceState {
    fn from(value: bool) -> Self {
        if value { Self::Detected } else { Self::NotDetected }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_state_as_str() {
        assert_eq!(PresenceState::Detected.as_str(), "detected");
        assert_eq!(PresenceState::NotDetected.as_str(), "not-detected");
    }

    #[test]
    fn presence_state_from_str() {
        assert_eq!(
            "detected".parse::<PresenceState>().unwrap(),
            PresenceState::Detected
        );
        assert_eq!(
            "NOT-DETECTED".parse::<PresenceState>().unwrap(),
            PresenceState::NotDetected
        );
    }

    #[test]
    fn presence_state_from_str_invalid() {
        let result = "away".parse::<PresenceState>();
        assert!(matches!(
            result.unwrap_err(),
            ValueError::InvalidPresenceState(_)
        ));
    }

    #[test]
    fn presence_state_default_is_not_detected() {
        assert_eq!(PresenceState::default(), PresenceState::NotDetected);
        assert!(!PresenceState::default().is_detected());
    }

    #[test]
    fn presence_state_serde_wire_format() {
        assert_eq!(
            serde_json::to_string(&PresenceState::NotDetected).unwrap(),
            "\"not-detected\""
        );
        let parsed: PresenceState = serde_json::from_str("\"detected\"").unwrap();
        assert_eq!(parsed, PresenceState::Detected);
    }
}
