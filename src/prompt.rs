// src/prompt.rs

//! Line-oriented console prompts.
//!
//! Generic over the reader and writer so the question/answer sequence can be
//! driven from tests with in-memory buffers.

use std::io::{BufRead, Write};

use crate::errors::Result;

/// Re-asks allowed for an unparseable yes/no or number before the default is
/// taken.
const MAX_ATTEMPTS: usize = 3;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one trimmed line.
    ///
    /// Returns `None` at end of input.
    pub fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Like [`ask`](Self::ask), but a blank answer or end of input yields
    /// `default`.
    pub fn ask_or(&mut self, question: &str, default: &str) -> Result<String> {
        match self.ask(question)? {
            Some(answer) if !answer.is_empty() => Ok(answer),
            _ => Ok(default.to_string()),
        }
    }

    /// Ask a yes/no question. Blank, end of input, or repeated garbage take
    /// `default`.
    pub fn ask_yes_no(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        for _ in 0..MAX_ATTEMPTS {
            let Some(answer) = self.ask(&format!("{question} {hint} "))? else {
                return Ok(default);
            };
            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer 'y' or 'n'.")?,
            }
        }
        Ok(default)
    }

    /// Ask for a positive whole number.
    pub fn ask_positive(&mut self, question: &str, default: u64) -> Result<u64> {
        for _ in 0..MAX_ATTEMPTS {
            let Some(answer) = self.ask(question)? else {
                return Ok(default);
            };
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<u64>() {
                Ok(n) if n > 0 => return Ok(n),
                _ => writeln!(self.output, "Please enter a whole number greater than 0.")?,
            }
        }
        Ok(default)
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}
