//! Wire format of the Key Light `/elgato/lights` endpoint.
//!
//! A PUT body looks like `{"lights":[{"on":1,"brightness":50,"temperature":222}]}`.
//! Temperature is always in mired on the wire. Turning a light off only sends
//! `on`; the device keeps its last brightness and temperature across power cycles.

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::config::mired_to_kelvin;
use crate::config::LightTarget;

/// Body of a PUT request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightsPayload {
    pub lights: Vec<LightCommand>,
}

/// Command for a single light in a [`LightsPayload`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightCommand {
    /// 1 for on, 0 for off
    pub on: u8,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,

    /// Colour temperature in mired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<u16>,
}

impl LightsPayload {
    /// Whether this payload switches the light on
    pub fn is_on(&self) -> bool {
        self.lights.iter().any(|l| l.on != 0)
    }
}

/// Switch a light on at its configured brightness and temperature
pub fn encode_on(target: &LightTarget) -> LightsPayload {
    LightsPayload {
        lights: vec![LightCommand {
            on: 1,
            brightness: Some(target.brightness),
            temperature: Some(target.temperature_mired()),
        }],
    }
}

/// Switch a light off, leaving brightness and temperature untouched
pub fn encode_off() -> LightsPayload {
    LightsPayload {
        lights: vec![LightCommand {
            on: 0,
            brightness: None,
            temperature: None,
        }],
    }
}

pub fn encode(target: &LightTarget, on: bool) -> LightsPayload {
    if on {
        encode_on(target)
    } else {
        encode_off()
    }
}

/// Reported state of a light, from a GET on the lights endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LightStatus {
    #[serde(deserialize_with = "deserialize_on")]
    pub on: bool,

    #[serde(default)]
    pub brightness: Option<u8>,

    /// Colour temperature in mired
    #[serde(default)]
    pub temperature: Option<u16>,
}

impl LightStatus {
    pub fn temperature_kelvin(&self) -> Option<u32> {
        self.temperature.and_then(mired_to_kelvin)
    }
}

impl fmt::Display for LightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.on { "ON" } else { "OFF" };
        let brightness = self
            .brightness
            .map(|b| b.to_string())
            .unwrap_or_else(|| "?".to_string());
        let kelvin = self
            .temperature_kelvin()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "?".to_string());
        write!(f, "{} (brightness={}%, temp={}K)", state, brightness, kelvin)
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    lights: Vec<LightStatus>,
}

/// Decode a GET response body. A device reporting no lights yields `None`.
pub fn decode_status(body: &[u8]) -> Result<Option<LightStatus>, serde_json::Error> {
    let response: StatusResponse = serde_json::from_slice(body)?;
    Ok(response.lights.into_iter().next())
}

/// Devices report `on` as 0/1; accept booleans too
fn deserialize_on<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OnFlag {
        Bool(bool),
        Int(u64),
    }

    Ok(match OnFlag::deserialize(deserializer)? {
        OnFlag::Bool(on) => on,
        OnFlag::Int(n) => n != 0,
    })
}
