use std::collections::HashMap;
use std::path::Path;

use tracing_subscriber::filter::LevelFilter;

use super::diagnostics::{ConfigError, Diagnostic, Warning};
use super::light::{parse_lights, LightTarget};

pub const LIGHTS_VAR: &str = "ELGATO_LIGHTS";
pub const LEGACY_LIGHTS_VAR: &str = "ELGATO_LIGHT_IPS";
pub const PORT_VAR: &str = "ELGATO_LIGHT_PORT";
pub const LOG_LEVEL_VAR: &str = "CAMLIGHT_LOG_LEVEL";

pub const DEFAULT_PORT: u16 = 9123;
pub const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Lights to drive, in configuration order
    pub lights: Vec<LightTarget>,

    /// HTTP port shared by every light
    pub port: u16,

    pub logging: LoggingConfig,
}

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    strum::EnumString,
    strum::Display,
    clap::ValueEnum,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[strum(to_string = "warn", serialize = "warning")]
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: LogLevel,
}

impl Config {
    /// Load configuration from the process environment, pre-populated from an env file
    ///
    /// With `env_file` set the file must exist. Without it `./.env` is read when
    /// present. Variables already set in the environment win over file values.
    ///
    /// Returns Ok((Config, diagnostics)) where diagnostics contains warnings.
    pub fn load(env_file: Option<&Path>) -> Result<(Self, Vec<Diagnostic>), ConfigError> {
        let file_vars = match env_file {
            Some(path) => read_env_file(path)?,
            None => {
                let default = Path::new(DEFAULT_ENV_FILE);
                if default.is_file() {
                    read_env_file(default)?
                } else {
                    HashMap::new()
                }
            }
        };

        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file_vars.get(key).cloned()))
    }

    /// Build a Config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<(Self, Vec<Diagnostic>), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut diagnostics = Vec::new();

        let lights_value = lookup(LIGHTS_VAR).filter(|v| !v.trim().is_empty());
        let lights = match lights_value {
            Some(value) => {
                let (lights, warnings) = parse_lights(&value)?;
                diagnostics.extend(warnings);
                lights
            }
            None => match lookup(LEGACY_LIGHTS_VAR).filter(|v| !v.trim().is_empty()) {
                Some(value) => {
                    diagnostics.push(Diagnostic::Warning(Warning::LegacyVariable {
                        name: LEGACY_LIGHTS_VAR,
                    }));
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|ip| !ip.is_empty())
                        .map(LightTarget::with_defaults)
                        .collect()
                }
                None => Vec::new(),
            },
        };

        if lights.is_empty() {
            return Err(ConfigError::NoLights);
        }

        let port = match lookup(PORT_VAR) {
            Some(value) => parse_port(&value)?,
            None => DEFAULT_PORT,
        };

        let level = match lookup(LOG_LEVEL_VAR) {
            Some(value) => value.trim().parse().unwrap_or_else(|_| {
                diagnostics.push(Diagnostic::Warning(Warning::InvalidLogLevel {
                    value: value.clone(),
                }));
                LogLevel::default()
            }),
            None => LogLevel::default(),
        };

        let config = Config {
            lights,
            port,
            logging: LoggingConfig { level },
        };

        Ok((config, diagnostics))
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidPort(value.to_string())),
        Ok(port) => Ok(port),
    }
}

/// Read KEY=VALUE pairs without touching the process environment
fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let to_err = |e| ConfigError::EnvFile(path.to_path_buf(), e);

    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(to_err)? {
        let (key, value) = item.map_err(to_err)?;
        // First definition wins, matching set-if-absent semantics
        vars.entry(key).or_insert(value);
    }
    Ok(vars)
}
