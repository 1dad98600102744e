mod config;
mod diagnostics;
mod light;

pub use config::*;
pub use diagnostics::{ConfigError, Diagnostic, Warning};
pub use light::{
    kelvin_to_mired, mired_to_kelvin, parse_lights, LightTarget, DEFAULT_BRIGHTNESS,
    DEFAULT_TEMPERATURE_KELVIN, MAX_KELVIN, MAX_MIRED, MIN_KELVIN, MIN_MIRED,
};
