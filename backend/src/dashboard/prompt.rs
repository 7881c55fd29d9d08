//! Blocking confirmation and alert dialogs.

use std::io::{self, BufRead, Write};

pub trait Prompter: Send + Sync {
    /// Asks a yes/no question and blocks until answered.
    fn confirm(&self, message: &str) -> bool;

    /// Shows a message the user has to acknowledge.
    fn alert(&self, message: &str);
}

/// Prompts on stdin/stdout.
pub struct TerminalPrompter;

impl TerminalPrompter {
    /// Reads one line of input. `None` on end of input.
    pub fn read_line(&self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str) -> bool {
        match self.read_line(&format!("{message} [y/N] ")) {
            Ok(Some(answer)) => is_affirmative(&answer),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }

    fn alert(&self, message: &str) {
        eprintln!("! {message}");
        // Acknowledgement only; the answer is irrelevant.
        let _ = self.read_line("Press Enter to continue...");
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
