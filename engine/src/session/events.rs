//! Session event queue
//!
//! Everything that reaches the session controller arrives as a `SessionEvent`
//! on one bounded channel: user submissions from the front-end, completions
//! from generation workers, and shutdown requests. The controller is the only
//! consumer, so every state change happens on its task.

use sdk::errors::EngineError;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::llm::GenerationResult;

/// Channel buffer size for the session event queue
pub const CHANNEL_BUFFER_SIZE: usize = 100;

/// Events consumed by the session controller
#[derive(Debug)]
pub enum SessionEvent {
    /// Raw text typed by the user
    ///
    /// `done`, when present, fires once the session has finished with the
    /// submission: right away for commands, blank or rejected input, and
    /// after the reply is committed, dropped or faulted for a dispatched one.
    Submit {
        text: String,
        done: Option<oneshot::Sender<()>>,
    },

    /// A generation worker finished
    GenerationFinished(GenerationOutcome),

    /// Stop once no generation is in flight
    Shutdown,
}

/// Result posted back by a generation worker
#[derive(Debug)]
pub struct GenerationOutcome {
    /// Exchange this result belongs to
    pub exchange_id: Uuid,

    /// The submission that triggered the generation, already trimmed
    pub user_input: String,

    /// Post-processed generation, or the fault that prevented it
    pub result: Result<GenerationResult, EngineError>,
}

/// Cloneable front-end handle for posting events to a session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionEvent>,
}

impl SessionHandle {
    pub(crate) fn new(tx: mpsc::Sender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// Post user input to the session
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SessionClosed` if the controller has stopped.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), EngineError> {
        self.send(SessionEvent::Submit {
            text: text.into(),
            done: None,
        })
        .await
    }

    /// Post user input and wait until the session is ready for the next one
    ///
    /// Front-ends reading input line by line use this so they never submit
    /// while a reply is still pending.
    pub async fn submit_and_wait(&self, text: impl Into<String>) -> Result<(), EngineError> {
        let (done, finished) = oneshot::channel();
        self.send(SessionEvent::Submit {
            text: text.into(),
            done: Some(done),
        })
        .await?;

        finished.await.map_err(|_| EngineError::SessionClosed)
    }

    /// Ask the session to stop after any in-flight reply is committed
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        self.send(SessionEvent::Shutdown).await
    }

    async fn send(&self, event: SessionEvent) -> Result<(), EngineError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| EngineError::SessionClosed)
    }
}
