use super::LineSource;
use super::SourceError;

/// Logged when a process starts streaming from a camera
pub const START_MARKER: &str = "CMIODeviceStartStream";
/// Logged when a process stops streaming from a camera
pub const STOP_MARKER: &str = "CMIODeviceStopStream";

/// Classification of one event-stream line
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Signal {
    Start,
    Stop,
    Irrelevant,
}

/// Substrings that identify camera start and stop lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub start: String,
    pub stop: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            start: START_MARKER.to_string(),
            stop: STOP_MARKER.to_string(),
        }
    }
}

impl Markers {
    /// Classify a line by substring containment. A line carrying both markers
    /// counts as a start.
    pub fn classify(&self, line: &str) -> Signal {
        if line.contains(&self.start) {
            Signal::Start
        } else if line.contains(&self.stop) {
            Signal::Stop
        } else {
            Signal::Irrelevant
        }
    }
}

/// Pulls lines from a [`LineSource`] one at a time and classifies them
#[derive(Debug)]
pub struct EventReader<S> {
    source: S,
    markers: Markers,
}

impl<S: LineSource> EventReader<S> {
    pub fn new(source: S) -> Self {
        Self::with_markers(source, Markers::default())
    }

    pub fn with_markers(source: S, markers: Markers) -> Self {
        Self { source, markers }
    }

    /// Wait for the next line and classify it. `None` at end of stream.
    pub async fn next_signal(&mut self) -> Result<Option<Signal>, SourceError> {
        let Some(line) = self.source.next_line().await? else {
            return Ok(None);
        };
        Ok(Some(self.markers.classify(&line)))
    }

    pub async fn shutdown(&mut self) -> Result<(), SourceError> {
        self.source.shutdown().await
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
