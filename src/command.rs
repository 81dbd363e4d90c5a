// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound state patches.
//!
//! Every write to the backend is a partial patch of the device state:
//! only the fields present in the patch are changed, everything else is
//! left untouched. The reconciler always sends single-field patches, one
//! per command, so a failed write can be rolled back precisely.

use serde::{Deserialize, Serialize};

use crate::error::PatchError;
use crate::types::PowerState;

/// A partial update of the device state.
///
/// Serializes to the wire format the backend expects: camelCase keys,
/// absent fields omitted entirely. The power field is named `fanStatus`
/// on the wire for every device kind; the backend uses the same contract
/// for fans and lamps.
///
/// # Examples
///
/// ```
/// use dmouv_lib::command::StatePatch;
/// use dmouv_lib::types::PowerState;
///
/// let patch = StatePatch::power(PowerState::On);
/// assert_eq!(
///     serde_json::to_string(&patch).unwrap(),
///     r#"{"fanStatus":"on"}"#
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePatch {
    /// Requested power state, if the patch changes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    fan_status: Option<PowerState>,
    /// Requested automatic-mode flag, if the patch changes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    is_auto_mode: Option<bool>,
}

impl StatePatch {
    /// Creates an empty patch.
    ///
    /// An empty patch fails [`validate`](Self::validate); populate it
    /// with the `with_*` builders before dispatching it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a patch that sets the power state.
    #[must_use]
    pub const fn power(state: PowerState) -> Self {
        Self {
            fan_status: Some(state),
            is_auto_mode: None,
        }
    }

    /// Creates a patch that sets the automatic-mode flag.
    #[must_use]
    pub const fn auto_mode(enabled: bool) -> Self {
        Self {
            fan_status: None,
            is_auto_mode: Some(enabled),
        }
    }

    /// Sets the power state on this patch.
    #[must_use]
    pub const fn with_power(mut self, state: PowerState) -> Self {
        self.fan_status = Some(state);
        self
    }

    /// Sets the automatic-mode flag on this patch.
    #[must_use]
    pub const fn with_auto_mode(mut self, enabled: bool) -> Self {
        self.is_auto_mode = Some(enabled);
        self
    }

    /// Gets the requested power state, if any.
    #[must_use]
    pub const fn fan_status(&self) -> Option<PowerState> {
        self.fan_status
    }

    /// Gets the requested automatic-mode flag, if any.
    #[must_use]
    pub const fn is_auto_mode(&self) -> Option<bool> {
        self.is_auto_mode
    }

    /// Returns `true` if the patch carries no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fan_status.is_none() && self.is_auto_mode.is_none()
    }

    /// Validates that the patch would change something on the wire.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Empty`] if the patch carries no fields.
    pub const fn validate(&self) -> Result<(), PatchError> {
        if self.is_empty() {
            Err(PatchError::Empty)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_patch_serializes_to_wire_format() {
        let patch = StatePatch::power(PowerState::Off);
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"fanStatus":"off"}"#
        );
    }

    #[test]
    fn auto_mode_patch_serializes_to_wire_format() {
        let patch = StatePatch::auto_mode(true);
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"isAutoMode":true}"#
        );
    }

    #[test]
    fn combined_patch_carries_both_fields() {
        let patch = StatePatch::new()
            .with_power(PowerState::On)
            .with_auto_mode(false);
        assert_eq!(patch.fan_status(), Some(PowerState::On));
        assert_eq!(patch.is_auto_mode(), Some(false));
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"fanStatus":"on","isAutoMode":false}"#
        );
    }

    #[test]
    fn empty_patch_fails_validation() {
        let patch = StatePatch::new();
        assert!(patch.is_empty());
        assert_eq!(patch.validate(), Err(PatchError::Empty));
    }

    #[test]
    fn populated_patch_passes_validation() {
        assert!(StatePatch::power(PowerState::On).validate().is_ok());
        assert!(StatePatch::auto_mode(false).validate().is_ok());
    }

    #[test]
    fn patch_deserializes_from_wire_format() {
        let patch: StatePatch = serde_json::from_str(r#"{"fanStatus":"on"}"#).unwrap();
        assert_eq!(patch.fan_status(), Some(PowerState::On));
        assert_eq!(patch.is_auto_mode(), None);
    }
}
