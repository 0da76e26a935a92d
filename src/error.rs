use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating gameplay configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The chase dead zone only exists while `stop_range >= detection_range`.
    #[error("stop range {stop_range} is smaller than detection range {detection_range}")]
    InvertedRanges {
        detection_range: f32,
        stop_range: f32,
    },
    #[error("{field} must be a finite, non-negative number (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("gravity must pull downwards (got {value})")]
    Gravity { value: f32 },
}

/// Returned when no chase target can be found in the world.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("no entity is tagged or named \"{name}\"")]
    NotFound { name: &'static str },
}

pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

pub(crate) fn downward_gravity(value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value < 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Gravity { value })
    }
}
