//! Error types for the agent and its host.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`AgentError`].
pub type Result<T> = std::result::Result<T, AgentError>;

/// A command rejected by the host.
///
/// Rejections are never fatal: a layer that gets one falls through to the
/// next, and the depot path inspects it to decide on supply remediation.
/// The display strings are the host's own error text, since they are drawn
/// on the map for a human observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum CommandError {
    /// Not enough minerals for the build or train.
    #[error("Insufficient Minerals")]
    InsufficientMinerals,

    /// Not enough gas for the build or train.
    #[error("Insufficient Gas")]
    InsufficientGas,

    /// Supply cap reached.
    #[error("Insufficient Supply")]
    InsufficientSupply,

    /// The unit is busy with something that cannot be interrupted.
    #[error("Unit Busy")]
    UnitBusy,

    /// The unit or target no longer exists.
    #[error("Unit Does Not Exist")]
    UnitDoesNotExist,

    /// The unit is owned by someone else.
    #[error("Unit Not Owned")]
    UnitNotOwned,

    /// The unit type cannot perform this order (e.g. a depot told to build).
    #[error("Incompatible UnitType")]
    IncompatibleUnitType,

    /// The build site is blocked or off the map.
    #[error("Unbuildable Location")]
    UnbuildableLocation,

    /// The target cannot be used for this order.
    #[error("Invalid Target")]
    InvalidTarget,

    /// The unit cannot attack the target.
    #[error("Unable To Hit")]
    UnableToHit,

    /// Return-cargo ordered on an empty-handed worker.
    #[error("Not Carrying Cargo")]
    NotCarryingCargo,

    /// Move target outside the map.
    #[error("Invalid Parameter")]
    InvalidParameter,
}

/// Top-level error type for agent configuration and loading.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Config or scenario file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Failed to read a file.
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse RON.
    #[error("Failed to parse RON: {0}")]
    ParseError(#[from] ron::error::SpannedError),

    /// A configuration value is out of range.
    #[error("Invalid config value '{field}': {message}")]
    InvalidConfig {
        /// Field name.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_text_matches_host() {
        assert_eq!(CommandError::InsufficientSupply.to_string(), "Insufficient Supply");
        assert_eq!(CommandError::UnbuildableLocation.to_string(), "Unbuildable Location");
    }

    #[test]
    fn test_invalid_config_message() {
        let err = AgentError::InvalidConfig {
            field: "prefer_gas_chance",
            message: "must be within 0.0..=1.0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid config value 'prefer_gas_chance': must be within 0.0..=1.0"
        );
    }
}
