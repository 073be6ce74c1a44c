//! Terminal display surface
//!
//! Prints the transcript as `Label: text` lines. With ANSI enabled, speakers
//! are coloured (human green, persona blue, notices grey italic) and the typing
//! indicator is erased in place once the reply arrives. Without ANSI (output
//! piped to a file) the indicator is never printed, since it could not be
//! taken back.

use sdk::display::{DisplayLine, DisplaySurface, Speaker};
use std::io::Write;

const RESET: &str = "\x1b[0m";
const GREEN: &str = "\x1b[32m";
const BLUE: &str = "\x1b[34m";
const GREY_ITALIC: &str = "\x1b[3;90m";
const CURSOR_UP_CLEAR_LINE: &str = "\x1b[1A\x1b[2K\r";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub struct TerminalDisplay<W: Write + Send> {
    out: W,
    ansi: bool,

    /// Print human lines too; off when the terminal already echoes input
    echo_human: bool,

    /// The indicator is the last line written and can be erased
    transient_on_last_line: bool,
}

impl TerminalDisplay<std::io::Stdout> {
    /// Display on stdout, enabling ANSI and echo based on whether stdout and
    /// stdin are terminals
    pub fn stdout() -> Self {
        use std::io::IsTerminal;

        let ansi = std::io::stdout().is_terminal();
        let echo_human = !std::io::stdin().is_terminal();
        Self::new(std::io::stdout(), ansi, echo_human)
    }
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(out: W, ansi: bool, echo_human: bool) -> Self {
        Self {
            out,
            ansi,
            echo_human,
            transient_on_last_line: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
        {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }

    fn render(&self, line: &DisplayLine) -> String {
        if !self.ansi {
            return format!("{}: {}\n", line.label, line.text);
        }

        match line.speaker {
            Speaker::Human => format!("{}{}:{} {}\n", GREEN, line.label, RESET, line.text),
            Speaker::Agent => format!("{}{}:{} {}\n", BLUE, line.label, RESET, line.text),
            Speaker::System => format!("{}{}: {}{}\n", GREY_ITALIC, line.label, line.text, RESET),
            Speaker::Indicator => format!("{}{}{}\n", GREY_ITALIC, line.text, RESET),
        }
    }
}

impl<W: Write + Send> DisplaySurface for TerminalDisplay<W> {
    fn append_line(&mut self, line: DisplayLine) {
        match line.speaker {
            Speaker::Indicator if !self.ansi => return,
            Speaker::Human if !self.echo_human => return,
            _ => {}
        }

        let rendered = self.render(&line);
        self.write(&rendered);
        self.transient_on_last_line = line.is_transient();
    }

    fn remove_last_transient_line(&mut self) {
        if self.transient_on_last_line {
            self.write(CURSOR_UP_CLEAR_LINE);
            self.transient_on_last_line = false;
        }
    }

    fn clear_all(&mut self) {
        if self.ansi {
            self.write(CLEAR_SCREEN);
        }
        self.transient_on_last_line = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(display: TerminalDisplay<Vec<u8>>) -> String {
        String::from_utf8(display.into_inner()).unwrap()
    }

    #[test]
    fn test_plain_output() {
        let mut display = TerminalDisplay::new(Vec::new(), false, true);
        display.append_line(DisplayLine::new(Speaker::Human, "Human", "hi"));
        display.append_line(DisplayLine::new(Speaker::Agent, "Eva", "hello"));
        display.append_line(DisplayLine::system("Memory reset."));

        assert_eq!(
            output(display),
            "Human: hi\nEva: hello\nSystem: Memory reset.\n"
        );
    }

    #[test]
    fn test_plain_output_skips_indicator() {
        let mut display = TerminalDisplay::new(Vec::new(), false, true);
        display.append_line(DisplayLine::indicator("Eva"));
        display.remove_last_transient_line();
        display.append_line(DisplayLine::new(Speaker::Agent, "Eva", "hello"));

        assert_eq!(output(display), "Eva: hello\n");
    }

    #[test]
    fn test_no_echo_skips_human_lines() {
        let mut display = TerminalDisplay::new(Vec::new(), false, false);
        display.append_line(DisplayLine::new(Speaker::Human, "Human", "hi"));
        display.append_line(DisplayLine::new(Speaker::Agent, "Eva", "hello"));

        assert_eq!(output(display), "Eva: hello\n");
    }

    #[test]
    fn test_ansi_indicator_is_erased() {
        let mut display = TerminalDisplay::new(Vec::new(), true, false);
        display.append_line(DisplayLine::indicator("Eva"));
        display.remove_last_transient_line();

        let out = output(display);
        assert!(out.contains("Eva is typing..."));
        assert!(out.ends_with(CURSOR_UP_CLEAR_LINE));
    }

    #[test]
    fn test_indicator_not_erased_after_other_output() {
        let mut display = TerminalDisplay::new(Vec::new(), true, false);
        display.append_line(DisplayLine::indicator("Eva"));
        display.append_line(DisplayLine::system("Still replying to your last message."));
        display.remove_last_transient_line();

        assert!(!output(display).contains(CURSOR_UP_CLEAR_LINE));
    }

    #[test]
    fn test_clear_all_with_ansi() {
        let mut display = TerminalDisplay::new(Vec::new(), true, false);
        display.clear_all();
        assert_eq!(output(display), CLEAR_SCREEN);
    }
}
