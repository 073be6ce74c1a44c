//! Display surface implementations
//!
//! The `DisplaySurface` trait lives in the SDK; these are the surfaces the
//! engine ships with.

pub mod recording;
pub mod terminal;

pub use recording::RecordingDisplay;
pub use terminal::TerminalDisplay;
