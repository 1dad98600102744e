use crate::source::Signal;

/// Last detected condition of the camera
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum CameraState {
    #[default]
    Off,
    On,
}

impl CameraState {
    /// State after `signal`, or `None` when the signal causes no transition
    ///
    /// A start while already on and a stop while already off are debounced.
    pub fn next(self, signal: Signal) -> Option<CameraState> {
        match (self, signal) {
            (CameraState::Off, Signal::Start) => Some(CameraState::On),
            (CameraState::On, Signal::Stop) => Some(CameraState::Off),
            _ => None,
        }
    }

    pub fn is_on(self) -> bool {
        self == CameraState::On
    }
}
