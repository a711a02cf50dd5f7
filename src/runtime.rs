use std::io::{self, BufRead};

/// Source of user input lines (commands, answers, confirmations).
pub trait InputSource {
    /// Block until the next line is available, without its line ending.
    /// `None` once the input is exhausted.
    fn read_line(&mut self) -> Option<String>;
}

/// Production input source reading from stdin
pub struct StdinSource {
    stdin: io::Stdin,
}

impl StdinSource {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for StdinSource {
    fn read_line(&mut self) -> Option<String> {
        let mut buf = String::new();
        match self.stdin.lock().read_line(&mut buf) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(trim_line_ending(buf)),
        }
    }
}

fn trim_line_ending(mut line: String) -> String {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}

/// Input source over a fixed script of lines
pub struct ScriptedInput {
    lines: std::vec::IntoIter<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        Self {
            lines: lines.into_iter(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self) -> Option<String> {
        self.lines.next()
    }
}
