//! Line input sources for the interactive loop
//!
//! The loop reads from a [`LineInput`] so tests can drive it with a scripted
//! queue of lines instead of a terminal.

use crate::error::{RagChatError, Result};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::VecDeque;

/// One read from the input source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Ctrl-C at the prompt
    Interrupted,
    /// Ctrl-D or end of the script
    Eof,
}

/// A source of input lines
pub trait LineInput {
    /// Show `prompt` and read one line
    fn read_line(&mut self, prompt: &str) -> Result<InputEvent>;

    /// Remember a submitted line for recall
    fn add_history(&mut self, _line: &str) {}
}

/// Terminal input backed by rustyline
pub struct RustylineInput {
    editor: DefaultEditor,
}

impl RustylineInput {
    /// Create a line editor on the controlling terminal
    ///
    /// # Errors
    ///
    /// Returns error if the terminal cannot be initialized
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| RagChatError::Input(e.to_string()))?;
        Ok(Self { editor })
    }
}

impl LineInput for RustylineInput {
    fn read_line(&mut self, prompt: &str) -> Result<InputEvent> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(InputEvent::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(InputEvent::Interrupted),
            Err(ReadlineError::Eof) => Ok(InputEvent::Eof),
            Err(e) => {
                tracing::error!("Readline error: {:?}", e);
                Err(RagChatError::Input(e.to_string()).into())
            }
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            tracing::debug!("Could not record history entry: {}", e);
        }
    }
}

/// Input replayed from a fixed list of lines
///
/// Once the lines run out every read returns [`InputEvent::Eof`].
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    /// Create a script from lines
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Queue another line
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
    }

    /// Prompts shown so far, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Lines not consumed yet
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineInput for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<InputEvent> {
        self.prompts.push(prompt.to_string());
        Ok(match self.lines.pop_front() {
            Some(line) => InputEvent::Line(line),
            None => InputEvent::Eof,
        })
    }
}
