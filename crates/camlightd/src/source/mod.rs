//! Camera event stream.
//!
//! A [`LineSource`] produces raw text lines from somewhere (a `log stream`
//! subprocess, stdin, a fixed script). [`EventReader`] pulls lines one at a
//! time and classifies each into a [`Signal`].

mod event;
mod process;
mod reader;
mod script;

use std::io;

use async_trait::async_trait;

pub use event::EventReader;
pub use event::Markers;
pub use event::Signal;
pub use event::START_MARKER;
pub use event::STOP_MARKER;
pub use process::ProcessSource;
pub use process::CAMERA_LOG_ARGS;
pub use process::CAMERA_LOG_PROGRAM;
pub use reader::ReaderSource;
pub use script::ScriptedSource;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("event source '{0}' has no stdout")]
    NoStdout(String),

    #[error("failed to read event stream: {0}")]
    Read(#[from] io::Error),

    #[error("failed to stop '{program}': {source}")]
    Terminate {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Producer of an unbounded, append-only sequence of text lines
#[async_trait]
pub trait LineSource: Send {
    /// Wait for the next line, without its line terminator
    ///
    /// Returns Ok(None) once the stream has ended.
    async fn next_line(&mut self) -> Result<Option<String>, SourceError>;

    /// Stop the producer and release its resources
    async fn shutdown(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}
