//! Elgato Key Light integration.
//!
//! Lights expose a small unauthenticated HTTP API on the LAN. This module
//! encodes commands for it, talks to one light at a time, and fans a single
//! on/off decision out to every configured light.

mod client;
mod dispatcher;
mod light;

pub use client::DeviceError;
pub use client::DispatchOutcome;
pub use client::ElgatoClient;
pub use client::LightClient;
pub use client::LIGHTS_PATH;
pub use client::REQUEST_TIMEOUT;
pub use dispatcher::failures;
pub use dispatcher::Dispatch;
pub use dispatcher::Dispatcher;
pub use dispatcher::DryRun;
pub use light::decode_status;
pub use light::encode;
pub use light::encode_off;
pub use light::encode_on;
pub use light::LightCommand;
pub use light::LightStatus;
pub use light::LightsPayload;
