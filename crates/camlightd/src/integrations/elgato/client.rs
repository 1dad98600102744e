use std::error::Error;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;
use tracing::warn;

use super::light::decode_status;
use super::light::LightStatus;
use super::light::LightsPayload;

/// Path of the lights resource on every Key Light
pub const LIGHTS_PATH: &str = "/elgato/lights";

/// Upper bound on a single device request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of sending one command to one light
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub address: String,

    /// The action attempted: true for on, false for off
    pub on: bool,

    /// One-line diagnostic when the command failed
    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn ok(address: impl Into<String>, on: bool) -> Self {
        Self {
            address: address.into(),
            on,
            error: None,
        }
    }

    pub fn failed(address: impl Into<String>, on: bool, error: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            on,
            error: Some(error.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{}", error_chain(.0))]
    Request(#[source] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("malformed response: {0}")]
    InvalidResponse(String),
}

/// Join an error and its sources into a single line
fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Operations against a single light
///
/// Failures are reported in the returned value rather than raised, so a caller
/// driving many lights never has to unwind on one bad device.
#[async_trait]
pub trait LightClient: Send + Sync {
    /// Send one command to the light at `address`
    async fn apply(&self, address: &str, payload: &LightsPayload) -> DispatchOutcome;

    /// Read the light's current state. `None` if it could not be read.
    async fn query_status(&self, address: &str) -> Option<LightStatus>;
}

/// HTTP client for Elgato Key Lights
#[derive(Debug, Clone)]
pub struct ElgatoClient {
    http: reqwest::Client,
    port: u16,
    timeout: Duration,
}

impl ElgatoClient {
    pub fn new(port: u16) -> Result<Self, DeviceError> {
        Self::with_timeout(port, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(port: u16, timeout: Duration) -> Result<Self, DeviceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DeviceError::Request)?;

        Ok(Self {
            http,
            port,
            timeout,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self, address: &str) -> String {
        format!("http://{}:{}{}", address, self.port, LIGHTS_PATH)
    }

    /// PUT a payload to a light
    pub async fn put(&self, address: &str, payload: &LightsPayload) -> Result<(), DeviceError> {
        let url = self.url(address);
        debug!("[{}] PUT {}", address, url);

        let response = self
            .http
            .put(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Status(status));
        }

        // The device echoes its new state; an empty body is tolerated
        let body = response.bytes().await.map_err(|e| self.request_error(e))?;
        if !body.is_empty() {
            serde_json::from_slice::<serde_json::Value>(&body)
                .map_err(|e| DeviceError::InvalidResponse(e.to_string()))?;
        }

        Ok(())
    }

    /// GET the current state of a light
    pub async fn get(&self, address: &str) -> Result<Option<LightStatus>, DeviceError> {
        let url = self.url(address);
        debug!("[{}] GET {}", address, url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Status(status));
        }

        let body = response.bytes().await.map_err(|e| self.request_error(e))?;
        decode_status(&body).map_err(|e| DeviceError::InvalidResponse(e.to_string()))
    }

    fn request_error(&self, error: reqwest::Error) -> DeviceError {
        if error.is_timeout() {
            DeviceError::Timeout(self.timeout)
        } else {
            DeviceError::Request(error.without_url())
        }
    }
}

#[async_trait]
impl LightClient for ElgatoClient {
    async fn apply(&self, address: &str, payload: &LightsPayload) -> DispatchOutcome {
        let on = payload.is_on();
        match self.put(address, payload).await {
            Ok(()) => DispatchOutcome::ok(address, on),
            Err(e) => DispatchOutcome::failed(address, on, e.to_string()),
        }
    }

    async fn query_status(&self, address: &str) -> Option<LightStatus> {
        match self.get(address).await {
            Ok(Some(status)) => Some(status),
            Ok(None) => {
                warn!("[{}] Device reported no lights", address);
                None
            }
            Err(e) => {
                warn!("[{}] Could not get status: {}", address, e);
                None
            }
        }
    }
}

/// Mock light client for testing
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockLightClient {
    /// Addresses that fail every request
    pub failing: std::collections::HashSet<String>,

    /// Canned status per address
    pub statuses: std::collections::HashMap<String, LightStatus>,

    /// Every payload sent, in the order it arrived
    pub requests: std::sync::Mutex<Vec<(String, LightsPayload)>>,
}

#[cfg(test)]
impl MockLightClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(addresses: &[&str]) -> Self {
        Self {
            failing: addresses.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<(String, LightsPayload)> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl LightClient for MockLightClient {
    async fn apply(&self, address: &str, payload: &LightsPayload) -> DispatchOutcome {
        self.requests
            .lock()
            .unwrap()
            .push((address.to_string(), payload.clone()));

        if self.failing.contains(address) {
            DispatchOutcome::failed(address, payload.is_on(), "connection refused")
        } else {
            DispatchOutcome::ok(address, payload.is_on())
        }
    }

    async fn query_status(&self, address: &str) -> Option<LightStatus> {
        self.statuses.get(address).cloned()
    }
}
