use anyhow::Result;
use console::Term;
use dialoguer::Input;
use std::io::{self, BufRead, ErrorKind};

pub const PROMPT: &str = "Ask about Revenue, Risks, or R&D...";

/// Read the next question; `None` when the user leaves or input ends
pub fn read_question() -> Result<Option<String>> {
    let line = if Term::stdout().is_term() && Term::stderr().is_term() {
        match Input::<String>::new().with_prompt(PROMPT).allow_empty(true).interact_text() {
            Ok(line) => line,
            Err(dialoguer::Error::IO(e))
                if matches!(e.kind(), ErrorKind::UnexpectedEof | ErrorKind::Interrupted) =>
            {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        line.trim_end_matches(['\n', '\r']).to_string()
    };

    if is_exit(&line) {
        Ok(None)
    } else {
        Ok(Some(line))
    }
}

fn is_exit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words() {
        assert!(is_exit("exit"));
        assert!(is_exit("  QUIT "));
        assert!(!is_exit("exit strategy for iPhone?"));
    }
}
