//! Clipboard access through the terminal (OSC 52).

use std::io::{IsTerminal, Write};

use base64::{Engine, engine::general_purpose::STANDARD};
use parade_core::{ParadeError, share::Clipboard};

#[derive(Debug, Default)]
pub struct TerminalClipboard;

impl TerminalClipboard {
    /// Only offered when stdout is an interactive terminal.
    pub fn detect() -> Option<Self> {
        std::io::stdout().is_terminal().then_some(Self)
    }
}

pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

impl Clipboard for TerminalClipboard {
    fn write_text(&self, text: &str) -> Result<(), ParadeError> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(osc52_sequence(text).as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|err| ParadeError::Clipboard(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_wraps_base64_payload() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
    }
}
