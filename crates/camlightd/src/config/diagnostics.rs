use std::fmt;
use std::path::PathBuf;

/// A diagnostic produced while loading configuration
///
/// Only warnings are collected; anything fatal is returned as a [`ConfigError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Warning(Warning),
}

/// Warning messages that don't prevent config loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A light entry had the wrong number of `:`-separated fields and was skipped
    MalformedEntry { entry: String },

    /// A light entry had an empty address and was skipped
    MissingAddress { entry: String },

    /// The configured temperature falls outside the device range and will be clamped
    TemperatureClamped {
        address: String,
        kelvin: u32,
        mired: u16,
    },

    /// The log level variable could not be parsed
    InvalidLogLevel { value: String },

    /// Lights were taken from the legacy address-only variable
    LegacyVariable { name: &'static str },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Warning(w) => write!(f, "warning: {}", w),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MalformedEntry { entry } => write!(
                f,
                "invalid light entry '{}' (expected ADDRESS or ADDRESS:BRIGHTNESS:TEMPERATURE), skipping",
                entry
            ),
            Warning::MissingAddress { entry } => {
                write!(f, "light entry '{}' has no address, skipping", entry)
            }
            Warning::TemperatureClamped {
                address,
                kelvin,
                mired,
            } => write!(
                f,
                "{}: temperature {}K is outside 2900-7000K, sending {} mired",
                address, kelvin, mired
            ),
            Warning::InvalidLogLevel { value } => {
                write!(f, "invalid log level '{}', defaulting to info", value)
            }
            Warning::LegacyVariable { name } => write!(
                f,
                "using {} with default brightness and temperature; prefer ELGATO_LIGHTS",
                name
            ),
        }
    }
}

/// Fatal configuration problems, reported before monitoring starts
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no lights configured (set ELGATO_LIGHTS, e.g. '192.168.1.100:50:4500,192.168.1.101')")]
    NoLights,

    #[error("light entry '{entry}': {field} '{value}' is not a number")]
    NotANumber {
        entry: String,
        field: &'static str,
        value: String,
    },

    #[error("light entry '{entry}': brightness {value} is outside 0-100")]
    BrightnessOutOfRange { entry: String, value: u32 },

    #[error("light entry '{entry}': temperature must be greater than 0K")]
    ZeroKelvin { entry: String },

    #[error("invalid port '{0}' (expected 1-65535)")]
    InvalidPort(String),

    #[error("failed to read env file {0}: {1}")]
    EnvFile(PathBuf, #[source] dotenvy::Error),
}
