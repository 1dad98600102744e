pub mod config;
pub mod engine;
pub mod integrations;
pub mod source;

pub use config::Config;
pub use config::Diagnostic;
pub use config::LightTarget;
pub use config::LogLevel;
pub use engine::CameraState;
pub use engine::Monitor;
pub use engine::MonitorError;
pub use source::EventReader;
pub use source::LineSource;
pub use source::Signal;
