//! Per-light target settings and the `ELGATO_LIGHTS` entry format.
//!
//! Each comma-separated entry is either a bare address, which gets the default
//! brightness and temperature, or `address:brightness:temperature` with the
//! temperature in Kelvin.

use std::num::NonZeroU32;

use super::diagnostics::{ConfigError, Diagnostic, Warning};

pub const DEFAULT_BRIGHTNESS: u8 = 100;
pub const DEFAULT_TEMPERATURE_KELVIN: u32 = 5600;

/// Warmest temperature the lights accept (2900K)
pub const MAX_MIRED: u16 = 344;
/// Coolest temperature the lights accept (7000K)
pub const MIN_MIRED: u16 = 143;

pub const MIN_KELVIN: u32 = 2900;
pub const MAX_KELVIN: u32 = 7000;

/// Desired on-state of a single light
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightTarget {
    /// Host name or IP address of the light
    pub address: String,

    /// Brightness in percent (0-100)
    pub brightness: u8,

    /// Colour temperature in Kelvin
    pub temperature: NonZeroU32,
}

impl LightTarget {
    pub fn new(address: impl Into<String>, brightness: u8, temperature: NonZeroU32) -> Self {
        Self {
            address: address.into(),
            brightness: brightness.min(100),
            temperature,
        }
    }

    /// A light at full brightness and 5600K
    pub fn with_defaults(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            brightness: DEFAULT_BRIGHTNESS,
            temperature: NonZeroU32::new(DEFAULT_TEMPERATURE_KELVIN)
                .unwrap_or(NonZeroU32::MIN),
        }
    }

    pub fn temperature_kelvin(&self) -> u32 {
        self.temperature.get()
    }

    /// Temperature in the device's wire unit
    pub fn temperature_mired(&self) -> u16 {
        kelvin_to_mired(self.temperature)
    }
}

/// Convert Kelvin to mired, rounded and clamped to the device range
pub fn kelvin_to_mired(kelvin: NonZeroU32) -> u16 {
    let k = kelvin.get();
    let mired = (1_000_000 + k / 2) / k;
    mired.clamp(MIN_MIRED as u32, MAX_MIRED as u32) as u16
}

/// Convert mired back to Kelvin for display. `None` for 0.
pub fn mired_to_kelvin(mired: u16) -> Option<u32> {
    if mired == 0 {
        return None;
    }
    let m = mired as u32;
    Some((1_000_000 + m / 2) / m)
}

/// Parse a comma-separated list of light entries
///
/// Entries with the wrong number of fields are skipped with a warning so a
/// single typo does not take down correctly configured lights. Numbers that
/// don't parse are fatal. An empty input yields no lights; deciding whether
/// that is an error is left to the caller.
pub fn parse_lights(input: &str) -> Result<(Vec<LightTarget>, Vec<Diagnostic>), ConfigError> {
    let mut lights = Vec::new();
    let mut diagnostics = Vec::new();

    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let parts: Vec<&str> = entry.split(':').map(str::trim).collect();

        let light = match parts.as_slice() {
            [address] => LightTarget::with_defaults(*address),
            [address, brightness, temperature] => {
                if address.is_empty() {
                    diagnostics.push(Diagnostic::Warning(Warning::MissingAddress {
                        entry: entry.to_string(),
                    }));
                    continue;
                }
                parse_full_entry(entry, address, brightness, temperature)?
            }
            _ => {
                diagnostics.push(Diagnostic::Warning(Warning::MalformedEntry {
                    entry: entry.to_string(),
                }));
                continue;
            }
        };

        let kelvin = light.temperature_kelvin();
        if !(MIN_KELVIN..=MAX_KELVIN).contains(&kelvin) {
            diagnostics.push(Diagnostic::Warning(Warning::TemperatureClamped {
                address: light.address.clone(),
                kelvin,
                mired: light.temperature_mired(),
            }));
        }

        lights.push(light);
    }

    Ok((lights, diagnostics))
}

fn parse_full_entry(
    entry: &str,
    address: &str,
    brightness: &str,
    temperature: &str,
) -> Result<LightTarget, ConfigError> {
    let brightness: u32 = brightness.parse().map_err(|_| ConfigError::NotANumber {
        entry: entry.to_string(),
        field: "brightness",
        value: brightness.to_string(),
    })?;
    if brightness > 100 {
        return Err(ConfigError::BrightnessOutOfRange {
            entry: entry.to_string(),
            value: brightness,
        });
    }

    let kelvin: u32 = temperature.parse().map_err(|_| ConfigError::NotANumber {
        entry: entry.to_string(),
        field: "temperature",
        value: temperature.to_string(),
    })?;
    let kelvin = NonZeroU32::new(kelvin).ok_or_else(|| ConfigError::ZeroKelvin {
        entry: entry.to_string(),
    })?;

    Ok(LightTarget::new(address, brightness as u8, kelvin))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kelvin(k: u32) -> NonZeroU32 {
        NonZeroU32::new(k).unwrap()
    }

    #[test]
    fn test_parse_full_and_bare_entries() {
        let (lights, diagnostics) = parse_lights("10.0.0.5:50:4500,10.0.0.6").unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(
            lights,
            vec![
                LightTarget::new("10.0.0.5", 50, kelvin(4500)),
                LightTarget::new("10.0.0.6", 100, kelvin(5600)),
            ]
        );
    }

    #[test]
    fn test_too_many_parts_is_skipped() {
        let (lights, diagnostics) = parse_lights("bad:entry:with:too:many:parts").unwrap();

        assert!(lights.is_empty());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::Warning(Warning::MalformedEntry {
                entry: "bad:entry:with:too:many:parts".to_string()
            })]
        );
    }

    #[test]
    fn test_malformed_entry_does_not_block_others() {
        let (lights, diagnostics) = parse_lights("10.0.0.5:50, 10.0.0.6 ,,").unwrap();

        assert_eq!(lights, vec![LightTarget::with_defaults("10.0.0.6")]);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let (lights, diagnostics) = parse_lights("").unwrap();
        assert!(lights.is_empty());
        assert!(diagnostics.is_empty());

        let (lights, _) = parse_lights("   \t ").unwrap();
        assert!(lights.is_empty());
    }

    #[test]
    fn test_missing_address() {
        let (lights, diagnostics) = parse_lights(":50:4500").unwrap();
        assert!(lights.is_empty());
        assert!(matches!(
            diagnostics[0],
            Diagnostic::Warning(Warning::MissingAddress { .. })
        ));
    }

    #[test]
    fn test_non_numeric_fields_are_fatal() {
        let err = parse_lights("10.0.0.5:bright:4500").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NotANumber {
                field: "brightness",
                ..
            }
        ));

        let err = parse_lights("10.0.0.5:50:warm").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NotANumber {
                field: "temperature",
                ..
            }
        ));

        let err = parse_lights("10.0.0.5:-5:4500").unwrap_err();
        assert!(matches!(err, ConfigError::NotANumber { .. }));
    }

    #[test]
    fn test_zero_kelvin_is_fatal() {
        let err = parse_lights("10.0.0.5:50:0").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroKelvin { .. }));
    }

    #[test]
    fn test_brightness_above_100_is_fatal() {
        let err = parse_lights("10.0.0.5:150:4500").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::BrightnessOutOfRange { value: 150, .. }
        ));
    }

    #[test]
    fn test_out_of_range_temperature_warns_and_clamps() {
        let (lights, diagnostics) = parse_lights("10.0.0.5:50:2000").unwrap();

        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].temperature_mired(), MAX_MIRED);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::Warning(Warning::TemperatureClamped {
                address: "10.0.0.5".to_string(),
                kelvin: 2000,
                mired: 344,
            })]
        );
    }

    #[test]
    fn test_kelvin_to_mired() {
        assert_eq!(kelvin_to_mired(kelvin(5600)), 179);
        assert_eq!(kelvin_to_mired(kelvin(4500)), 222);
        assert_eq!(kelvin_to_mired(kelvin(7000)), 143);
        assert_eq!(kelvin_to_mired(kelvin(2900)), 344);
        assert_eq!(kelvin_to_mired(kelvin(1)), MAX_MIRED);
        assert_eq!(kelvin_to_mired(kelvin(u32::MAX)), MIN_MIRED);
    }

    #[test]
    fn test_mired_to_kelvin() {
        assert_eq!(mired_to_kelvin(0), None);
        assert_eq!(mired_to_kelvin(143), Some(6993));
        assert_eq!(mired_to_kelvin(344), Some(2907));
    }

    #[test]
    fn test_round_trip_within_one_mired_step() {
        for k in MIN_KELVIN..=MAX_KELVIN {
            let mired = kelvin_to_mired(kelvin(k));
            assert!((MIN_MIRED..=MAX_MIRED).contains(&mired), "{}K -> {}", k, mired);

            let back = mired_to_kelvin(mired).unwrap();
            assert_eq!(kelvin_to_mired(kelvin(back)), mired, "{}K", k);

            let step = k * k / 1_000_000 + 1;
            assert!(back.abs_diff(k) <= step, "{}K -> {} -> {}K", k, mired, back);
        }
    }
}
