//! In-memory display surface
//!
//! Keeps the visible transcript as a list of lines. Clones share the same
//! buffer, so one clone can be handed to a session while another inspects what
//! the session rendered. Used by tests and by headless front-ends.

use sdk::display::{DisplayLine, DisplaySurface, Speaker};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    lines: Arc<Mutex<Vec<DisplayLine>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the visible lines
    pub fn lines(&self) -> Vec<DisplayLine> {
        self.lock().clone()
    }

    /// Visible lines from one speaker
    pub fn lines_from(&self, speaker: Speaker) -> Vec<DisplayLine> {
        self.lock()
            .iter()
            .filter(|line| line.speaker == speaker)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether a transient line is currently visible
    pub fn has_transient(&self) -> bool {
        self.lock().iter().any(DisplayLine::is_transient)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DisplayLine>> {
        // A panic while holding the lock cannot leave a Vec half-written
        self.lines.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DisplaySurface for RecordingDisplay {
    fn append_line(&mut self, line: DisplayLine) {
        self.lock().push(line);
    }

    fn remove_last_transient_line(&mut self) {
        let mut lines = self.lock();
        if let Some(index) = lines.iter().rposition(DisplayLine::is_transient) {
            lines.remove(index);
        }
    }

    fn clear_all(&mut self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let display = RecordingDisplay::new();
        let mut writer = display.clone();

        writer.append_line(DisplayLine::system("hello"));
        assert_eq!(display.len(), 1);
        assert_eq!(display.lines()[0].text, "hello");
    }

    #[test]
    fn test_remove_last_transient_line() {
        let mut display = RecordingDisplay::new();
        display.append_line(DisplayLine::new(Speaker::Human, "Human", "hi"));
        display.append_line(DisplayLine::indicator("Eva"));
        display.append_line(DisplayLine::system("Still replying to your last message."));

        display.remove_last_transient_line();

        assert!(!display.has_transient());
        assert_eq!(display.len(), 2);
        assert_eq!(display.lines()[1].speaker, Speaker::System);
    }

    #[test]
    fn test_remove_without_transient_is_noop() {
        let mut display = RecordingDisplay::new();
        display.append_line(DisplayLine::system("a"));
        display.remove_last_transient_line();
        assert_eq!(display.len(), 1);
    }

    #[test]
    fn test_clear_all() {
        let mut display = RecordingDisplay::new();
        display.append_line(DisplayLine::system("a"));
        display.append_line(DisplayLine::system("b"));
        display.clear_all();
        assert!(display.is_empty());
    }

    #[test]
    fn test_lines_from() {
        let mut display = RecordingDisplay::new();
        display.append_line(DisplayLine::new(Speaker::Human, "Human", "hi"));
        display.append_line(DisplayLine::new(Speaker::Agent, "Eva", "hello"));
        display.append_line(DisplayLine::system("note"));

        let agent = display.lines_from(Speaker::Agent);
        assert_eq!(agent.len(), 1);
        assert_eq!(agent[0].text, "hello");
    }
}
