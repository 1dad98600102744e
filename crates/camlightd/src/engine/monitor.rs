use std::future::Future;

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::state::CameraState;
use crate::config::LightTarget;
use crate::integrations::elgato::failures;
use crate::integrations::elgato::Dispatch;
use crate::integrations::elgato::DispatchOutcome;
use crate::source::EventReader;
use crate::source::LineSource;
use crate::source::Signal;
use crate::source::SourceError;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("event stream closed")]
    StreamClosed,

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Camera monitor
///
/// Owns the camera state and the configured lights, and turns classified
/// events into dispatches. Only genuine transitions dispatch. A failed
/// dispatch does not roll the state back: the state always tracks the last
/// detected camera condition.
#[derive(Debug)]
pub struct Monitor<D> {
    state: CameraState,
    lights: Vec<LightTarget>,
    dispatcher: D,
}

impl<D: Dispatch> Monitor<D> {
    pub fn new(lights: Vec<LightTarget>, dispatcher: D) -> Self {
        Self {
            state: CameraState::default(),
            lights,
            dispatcher,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Apply one signal, dispatching to the lights on a transition
    ///
    /// Returns the dispatch outcomes, or `None` if the signal was ignored.
    pub async fn handle_signal(&mut self, signal: Signal) -> Option<Vec<DispatchOutcome>> {
        let next = self.state.next(signal)?;
        self.state = next;
        info!("Camera {} detected", next);

        let outcomes = self.dispatcher.apply_all(&self.lights, next.is_on()).await;
        let failed = failures(&outcomes);
        if failed > 0 {
            warn!("{} of {} lights did not switch {}", failed, outcomes.len(), next);
        }
        Some(outcomes)
    }

    /// Drive the state machine from `events` until the stream ends or fails
    ///
    /// There is no successful return: an exhausted stream is
    /// [`MonitorError::StreamClosed`].
    pub async fn run<S: LineSource>(&mut self, events: &mut EventReader<S>) -> Result<(), MonitorError> {
        info!("Starting camera monitor...");
        while let Some(signal) = events.next_signal().await? {
            if signal != Signal::Irrelevant {
                debug!("{} signal with camera {}", signal, self.state);
            }
            self.handle_signal(signal).await;
        }
        Err(MonitorError::StreamClosed)
    }

    /// Run until `shutdown` completes, then stop the event source
    ///
    /// Returns Ok(()) when stopped by `shutdown`. The lights are left as they
    /// are.
    pub async fn run_until<S, F>(&mut self, events: &mut EventReader<S>, shutdown: F) -> Result<(), MonitorError>
    where
        S: LineSource,
        F: Future<Output = ()>,
    {
        let result = tokio::select! {
            biased;
            () = shutdown => {
                info!("Received interrupt, shutting down...");
                Ok(())
            }
            result = self.run(events) => result,
        };

        if let Err(e) = events.shutdown().await {
            warn!("{}", e);
        }
        info!("Camera monitor stopped");

        result
    }
}
