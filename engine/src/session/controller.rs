//! Session Controller
//!
//! Owns the conversation memory and the display surface, and drives the
//! request/response lifecycle of a chat session:
//!
//! ```text
//! Idle --submit--> AwaitingGeneration --worker result--> Committing --> Idle
//! ```
//!
//! Generation happens on a separate worker task. The worker only receives the
//! assembled prompt and posts its outcome back through the session's event
//! queue; memory and display are touched exclusively from the controller's own
//! task. While a generation is in flight every new submission is rejected, so
//! at most one exchange is ever pending.

use sdk::display::{DisplayLine, DisplaySurface, Speaker};
use sdk::errors::{EngineError, EvaErrorExt};
use sdk::types::{Role, HUMAN_LABEL};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::events::{GenerationOutcome, SessionEvent, SessionHandle, CHANNEL_BUFFER_SIZE};
use crate::conversation::{ConversationMemory, PromptAssembler};
use crate::llm::GenerationPipeline;

/// Notice shown after `/reset`
pub const RESET_NOTICE: &str = "Memory reset.";

/// Notice shown when input arrives while a reply is pending
pub const BUSY_NOTICE: &str = "Still replying to your last message.";

/// Lifecycle state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for user input
    Idle,

    /// A generation worker is running
    AwaitingGeneration,

    /// Applying a worker result to memory and display
    Committing,
}

/// Control commands recognised in user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/clear`: erase the visible transcript, keep memory
    Clear,

    /// `/reset`: forget the conversation
    Reset,
}

impl Command {
    /// Match trimmed input against the known commands, ignoring case
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("/clear") {
            Some(Command::Clear)
        } else if input.eq_ignore_ascii_case("/reset") {
            Some(Command::Reset)
        } else {
            None
        }
    }
}

/// What happened to a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, or the session is shutting down
    Ignored,

    /// A reply is still pending
    Busy,

    /// `/clear` handled
    Cleared,

    /// `/reset` handled
    Reset,

    /// A generation worker was started
    Dispatched,
}

/// What happened to a worker result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The exchange was added to memory and displayed
    Committed,

    /// The answer was empty after post-processing
    DroppedEmpty,

    /// The generator failed; a notice was displayed
    Faulted,

    /// The result did not belong to the pending exchange
    Stale,
}

/// Counters describing a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub exchanges_committed: u64,
    pub empty_results_dropped: u64,
    pub generation_faults: u64,
    pub rejected_while_busy: u64,
}

/// Single owner of a chat session's state
pub struct SessionController {
    state: SessionState,

    /// The typing indicator is on screen
    indicator_visible: bool,

    shutdown_requested: bool,

    /// Exchange awaiting its worker result
    pending: Option<Uuid>,

    /// Fired when the pending exchange is finished with
    pending_done: Option<oneshot::Sender<()>>,

    memory: ConversationMemory,
    assembler: PromptAssembler,
    pipeline: Arc<GenerationPipeline>,
    display: Box<dyn DisplaySurface>,

    inbox: mpsc::Receiver<SessionEvent>,

    /// Sender handed to workers and front-end handles
    outbox: mpsc::Sender<SessionEvent>,

    stats: SessionStats,
}

impl SessionController {
    /// Create a controller with an empty memory of `max_turns` exchanges
    pub fn new(
        assembler: PromptAssembler,
        max_turns: usize,
        pipeline: Arc<GenerationPipeline>,
        display: Box<dyn DisplaySurface>,
    ) -> Self {
        let (outbox, inbox) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let memory = ConversationMemory::new(max_turns, assembler.agent_name());

        Self {
            state: SessionState::Idle,
            indicator_visible: false,
            shutdown_requested: false,
            pending: None,
            pending_done: None,
            memory,
            assembler,
            pipeline,
            display,
            inbox,
            outbox,
            stats: SessionStats::default(),
        }
    }

    /// Handle for posting events to this session
    pub fn handle(&self) -> SessionHandle {
        SessionHandle::new(self.outbox.clone())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn indicator_visible(&self) -> bool {
        self.indicator_visible
    }

    /// Process events until shutdown is requested and nothing is in flight
    pub async fn run(mut self) -> SessionStats {
        tracing::info!(
            "Session started (persona: {}, generator: {}, memory: {} exchanges)",
            self.assembler.agent_name(),
            self.pipeline.generator_name(),
            self.memory.max_turns()
        );

        while self.step().await {}

        tracing::info!(
            "Session finished: {} committed, {} empty, {} faults, {} rejected while busy",
            self.stats.exchanges_committed,
            self.stats.empty_results_dropped,
            self.stats.generation_faults,
            self.stats.rejected_while_busy
        );

        self.stats
    }

    /// Wait for and process one event
    ///
    /// Returns false once the session should stop.
    pub async fn step(&mut self) -> bool {
        // The controller holds a sender itself, so the queue never closes
        let event = match self.inbox.recv().await {
            Some(event) => event,
            None => return false,
        };

        match event {
            SessionEvent::Submit { text, done } => {
                let outcome = self.handle_submission(&text);
                if outcome == SubmitOutcome::Dispatched {
                    self.pending_done = done;
                } else if let Some(done) = done {
                    // The waiter may have given up; nothing to do then
                    let _ = done.send(());
                }
            }
            SessionEvent::GenerationFinished(outcome) => {
                self.handle_completion(outcome);
            }
            SessionEvent::Shutdown => {
                tracing::debug!("Shutdown requested in state {:?}", self.state);
                self.shutdown_requested = true;
            }
        }

        !(self.shutdown_requested && self.state == SessionState::Idle)
    }

    /// Handle one user submission
    pub fn handle_submission(&mut self, input: &str) -> SubmitOutcome {
        let text = input.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored;
        }

        if self.shutdown_requested {
            tracing::debug!("Ignoring input received after shutdown request");
            return SubmitOutcome::Ignored;
        }

        if self.state != SessionState::Idle {
            self.stats.rejected_while_busy += 1;
            tracing::debug!("Rejected input while {:?}", self.state);
            self.display.append_line(DisplayLine::system(BUSY_NOTICE));
            return SubmitOutcome::Busy;
        }

        match Command::parse(text) {
            Some(Command::Clear) => {
                tracing::info!("Display cleared");
                self.display.clear_all();
                return SubmitOutcome::Cleared;
            }
            Some(Command::Reset) => {
                tracing::info!("Conversation memory reset ({} turns dropped)", self.memory.len());
                self.memory.clear();
                self.display.append_line(DisplayLine::system(RESET_NOTICE));
                return SubmitOutcome::Reset;
            }
            None => {}
        }

        self.dispatch(text);
        SubmitOutcome::Dispatched
    }

    /// Apply a worker result
    pub fn handle_completion(&mut self, outcome: GenerationOutcome) -> CommitOutcome {
        if self.pending != Some(outcome.exchange_id) {
            tracing::warn!(
                "Discarding result for exchange {} (pending: {:?})",
                outcome.exchange_id,
                self.pending
            );
            return CommitOutcome::Stale;
        }

        self.state = SessionState::Committing;
        self.pending = None;

        if self.indicator_visible {
            self.display.remove_last_transient_line();
            self.indicator_visible = false;
        }

        let exchange_id = outcome.exchange_id;
        let commit = match outcome.result {
            Ok(result) => match result.into_answer() {
                Some(answer) => {
                    self.memory.append(Role::Human, outcome.user_input);
                    self.memory.append(Role::Agent, answer.clone());
                    self.display.append_line(DisplayLine::new(
                        Speaker::Agent,
                        self.assembler.agent_name(),
                        answer,
                    ));
                    self.stats.exchanges_committed += 1;
                    tracing::info!(
                        "Exchange {} committed ({} turns in memory)",
                        exchange_id,
                        self.memory.len()
                    );
                    CommitOutcome::Committed
                }
                None => {
                    self.stats.empty_results_dropped += 1;
                    tracing::warn!(
                        "Exchange {} produced an empty answer; dropped ({} so far)",
                        exchange_id,
                        self.stats.empty_results_dropped
                    );
                    CommitOutcome::DroppedEmpty
                }
            },
            Err(e) => {
                self.stats.generation_faults += 1;
                tracing::error!("Exchange {} failed: {}", exchange_id, e);
                self.display.append_line(DisplayLine::system(format!(
                    "Generation failed: {}",
                    e.user_hint()
                )));
                CommitOutcome::Faulted
            }
        };

        self.state = SessionState::Idle;
        if let Some(done) = self.pending_done.take() {
            let _ = done.send(());
        }
        commit
    }

    /// Show the user turn, build the prompt and start a worker
    fn dispatch(&mut self, text: &str) {
        let exchange_id = Uuid::new_v4();

        self.display
            .append_line(DisplayLine::new(Speaker::Human, HUMAN_LABEL, text));
        self.display
            .append_line(DisplayLine::indicator(self.assembler.agent_name()));
        self.indicator_visible = true;

        let prompt = self.assembler.build(&self.memory, text);
        self.pending = Some(exchange_id);
        self.state = SessionState::AwaitingGeneration;

        tracing::info!(
            "Exchange {} dispatched ({} chars of prompt)",
            exchange_id,
            prompt.len()
        );

        self.spawn_worker(exchange_id, text.to_string(), prompt);
    }

    fn spawn_worker(&self, exchange_id: Uuid, user_input: String, prompt: String) {
        let pipeline = Arc::clone(&self.pipeline);
        let outbox = self.outbox.clone();

        tokio::spawn(async move {
            // Inner task so a panicking generator still produces an outcome
            let generation = tokio::spawn(async move { pipeline.run(&prompt).await });

            let result = match generation.await {
                Ok(Ok(result)) => Ok(result),
                Ok(Err(e)) => Err(EngineError::from(e)),
                Err(e) => Err(EngineError::WorkerFailed(e.to_string())),
            };

            let outcome = GenerationOutcome {
                exchange_id,
                user_input,
                result,
            };

            if outbox
                .send(SessionEvent::GenerationFinished(outcome))
                .await
                .is_err()
            {
                tracing::warn!("Session closed before exchange {} finished", exchange_id);
            }
        });
    }
}
