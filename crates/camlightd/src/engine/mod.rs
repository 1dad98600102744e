mod monitor;
mod state;

pub use monitor::Monitor;
pub use monitor::MonitorError;
pub use state::CameraState;
