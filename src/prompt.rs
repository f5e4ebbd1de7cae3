//! Yes/no confirmation as an injectable port.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

/// `y` or `yes`, case-insensitive, surrounding whitespace ignored.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Reads one line from stdin after printing the question to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Confirm for TerminalPrompt {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{} ", question)?;
        stderr.flush()?;
        drop(stderr);

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

/// Answers from a fixed script; an exhausted script declines.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Questions asked so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Confirm for ScriptedPrompt {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.asked.push(question.to_string());
        Ok(self
            .answers
            .pop_front()
            .map(|answer| is_affirmative(&answer))
            .unwrap_or(false))
    }
}
