use crate::config::Settings;
use crate::line::Line;

/// How a turn is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer<'a> {
    /// Recall mode: the user judged themselves and the UI reports the verdict.
    Judged(bool),
    /// Typing mode: compared against the entry's answer side.
    Typed(&'a str),
}

impl Answer<'_> {
    pub fn is_correct(&self, line: &Line, settings: &Settings) -> bool {
        match *self {
            Answer::Judged(correct) => correct,
            Answer::Typed(input) => answers_match(line.answer_text(), input, settings),
        }
    }
}

/// Apply the case and whitespace policy of `settings` to `text`.
pub fn normalize(text: &str, settings: &Settings) -> String {
    let text = if settings.case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    };
    if settings.whitespace_sensitive {
        text
    } else {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }
}

pub fn answers_match(expected: &str, input: &str, settings: &Settings) -> bool {
    normalize(expected, settings) == normalize(input, settings)
}
