//! Chat session
//!
//! The controller owns memory and display; front-ends and generation workers
//! talk to it through the event queue.

pub mod controller;
pub mod events;

pub use controller::{
    Command, CommitOutcome, SessionController, SessionState, SessionStats, SubmitOutcome,
    BUSY_NOTICE, RESET_NOTICE,
};
pub use events::{GenerationOutcome, SessionEvent, SessionHandle, CHANNEL_BUFFER_SIZE};
