//! Line-oriented text channel used for shell output and interactive input.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Result of polling the channel for a line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineInput {
    /// A complete line, without its trailing newline.
    Line(String),
    /// No line is available yet; poll again later.
    Pending,
    /// The input side is closed and will never produce another line.
    Closed,
}

/// Text channel consumed by the shell and tutorial.
pub trait TextChannel {
    /// Writes `text` followed by a newline.
    fn write_line(&mut self, text: &str);

    /// Writes `text` without a newline, for prompts.
    fn write(&mut self, text: &str);

    /// Returns the next input line if one is available.
    fn poll_line(&mut self) -> LineInput;
}

/// Channel over the process's standard output and standard input.
///
/// Reads block until a full line arrives, so polling never yields
/// [`LineInput::Pending`].
#[derive(Debug, Default)]
pub struct StdioChannel;

impl StdioChannel {
    /// Creates a channel bound to the process stdio handles.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TextChannel for StdioChannel {
    fn write_line(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{text}");
    }

    fn write(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "{text}");
        let _ = out.flush();
    }

    fn poll_line(&mut self) -> LineInput {
        read_stdio_line(&mut io::stdin().lock())
    }
}

/// Reads one line, replacing invalid UTF-8 so a stray byte never ends input.
fn read_stdio_line(reader: &mut impl BufRead) -> LineInput {
    let mut buf = Vec::new();
    match reader.read_until(b'\n', &mut buf) {
        Ok(0) | Err(_) => LineInput::Closed,
        Ok(_) => {
            let line = String::from_utf8_lossy(&buf);
            LineInput::Line(line.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

/// In-memory channel: queued inputs in, captured output out.
///
/// Once the queue drains the channel reports [`LineInput::Closed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedChannel {
    inputs: VecDeque<LineInput>,
    output: Vec<String>,
    partial: String,
}

impl BufferedChannel {
    /// Creates a channel with no queued input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a channel that will yield `lines` in order.
    #[must_use]
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut channel = Self::new();
        for line in lines {
            channel.push_line(line);
        }
        channel
    }

    /// Queues an input line.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.inputs.push_back(LineInput::Line(line.into()));
    }

    /// Queues `count` empty polls before the next queued line.
    pub fn push_pending(&mut self, count: usize) {
        for _ in 0..count {
            self.inputs.push_back(LineInput::Pending);
        }
    }

    /// Captured output lines. A trailing prompt without newline is included.
    #[must_use]
    pub fn output(&self) -> Vec<String> {
        let mut lines = self.output.clone();
        if !self.partial.is_empty() {
            lines.push(self.partial.clone());
        }
        lines
    }

    /// Captured output joined with newlines.
    #[must_use]
    pub fn transcript(&self) -> String {
        self.output().join("\n")
    }

    /// Drops captured output, keeping queued input.
    pub fn clear_output(&mut self) {
        self.output.clear();
        self.partial.clear();
    }

    /// Number of queued inputs not yet consumed.
    #[must_use]
    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl TextChannel for BufferedChannel {
    fn write_line(&mut self, text: &str) {
        let mut line = std::mem::take(&mut self.partial);
        line.push_str(text);
        self.output.push(line);
    }

    fn write(&mut self, text: &str) {
        self.partial.push_str(text);
    }

    fn poll_line(&mut self) -> LineInput {
        self.inputs.pop_front().unwrap_or(LineInput::Closed)
    }
}
