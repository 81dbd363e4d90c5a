// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `DMouv` library.
//!
//! This module provides the error hierarchy for failures across the library:
//! value validation, transport communication, and state patch construction.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when
/// reconciling device state with a `D'Mouv` backend.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the backend.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error occurred while building or dispatching a state patch.
    #[error("patch error: {0}")]
    Patch(#[from] PatchError),

    /// Device was not found in the registry.
    #[error("device not found")]
    DeviceNotFound,
}

/// Errors related to value validation and constraints.
///
/// These errors occur when parsing wire strings into constrained types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// An invalid power state string was provided.
    #[error("invalid power state: {0}")]
    InvalidPowerState(String),

    /// An invalid presence state string was provided.
    #[error("invalid presence state: {0}")]
    InvalidPresenceState(String),

    /// An invalid device kind string was provided.
    #[error("invalid device kind: {0}")]
    InvalidDeviceKind(String),
}

/// Errors related to transport communication with the backend.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the backend failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or device address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to state patches.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// The patch carries no fields and would be a no-op on the wire.
    #[error("patch is empty")]
    Empty,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::InvalidPowerState("dimmed".to_string());
        assert_eq!(err.to_string(), "invalid power state: dimmed");
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::InvalidPresenceState("gone".to_string());
        let err: Error = value_err.into();
        assert!(matches!(
            err,
            Error::Value(ValueError::InvalidPresenceState(_))
        ));
    }

    #[test]
    fn transport_error_display() {
        let err = TransportError::Timeout(10_000);
        assert_eq!(err.to_string(), "request timed out after 10000 ms");

        let err = TransportError::ConnectionFailed("HTTP 502 - Bad Gateway".to_string());
        assert_eq!(err.to_string(), "connection failed: HTTP 502 - Bad Gateway");
    }

    #[test]
    fn patch_error_display() {
        let err: Error = PatchError::Empty.into();
        assert_eq!(err.to_string(), "patch error: patch is empty");
    }
}
