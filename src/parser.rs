//! Plain text deck parser.
//!
//! # Format
//! ```text
//! hund - dog        # everything after the comment token is ignored
//! """ a block comment
//! may span lines """ katze - cat
//! ```
//!
//! Each surviving line that contains the separator becomes one [`Line`];
//! everything else is dropped without error.

use rand::Rng;
use std::collections::BTreeSet;

use crate::config::{Settings, DEFAULT_BLOCK_COMMENT, DEFAULT_COMMENT, DEFAULT_SPLIT};
use crate::line::{Line, SideChoice};

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    pub separator: String,
    pub comment: String,
    pub block_comment: String,
    /// 1-based line numbers to skip.
    pub excluded: BTreeSet<usize>,
    /// Side the user has to produce for every parsed entry.
    pub answer_side: SideChoice,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SPLIT.to_string(),
            comment: DEFAULT_COMMENT.to_string(),
            block_comment: DEFAULT_BLOCK_COMMENT.to_string(),
            excluded: BTreeSet::new(),
            answer_side: SideChoice::Random,
        }
    }
}

impl From<&Settings> for ParseOptions {
    fn from(s: &Settings) -> Self {
        Self {
            separator: s.split.clone(),
            comment: s.comment.clone(),
            block_comment: s.block_comment.clone(),
            excluded: BTreeSet::new(),
            answer_side: s.from_side.opposite(),
        }
    }
}

pub fn parse_str<R: Rng + ?Sized>(content: &str, options: &ParseOptions, rng: &mut R) -> Vec<Line> {
    parse_lines(content.lines(), options, rng)
}

pub fn parse_lines<'a, I, R>(raw_lines: I, options: &ParseOptions, rng: &mut R) -> Vec<Line>
where
    I: IntoIterator<Item = &'a str>,
    R: Rng + ?Sized,
{
    let mut lines = Vec::new();
    let mut inside_block = false;

    for (idx, raw) in raw_lines.into_iter().enumerate() {
        let index = idx + 1;
        if options.excluded.contains(&index) {
            continue;
        }

        let Some(text) = strip_block_comments(raw, &options.block_comment, &mut inside_block) else {
            continue;
        };
        let text = strip_line_comment(&text, &options.comment);

        match split_pair(text, &options.separator) {
            Some((left, right)) => {
                lines.push(Line::with_choice(left, right, options.answer_side, index, rng));
            }
            None => tracing::trace!("line {index}: no separator, skipped"),
        }
    }

    lines
}

/// Remove block comment spans from `line`, carrying the open/closed state
/// across calls. Returns `None` when the whole line sits inside a block.
fn strip_block_comments(line: &str, delimiter: &str, inside: &mut bool) -> Option<String> {
    if delimiter.is_empty() {
        return Some(line.to_string());
    }
    if *inside && !line.contains(delimiter) {
        return None;
    }

    let mut line = line.to_string();
    while let Some(start) = line.find(delimiter) {
        let after = start + delimiter.len();
        if *inside {
            line.replace_range(..after, "");
            *inside = false;
        } else if let Some(end) = line[after..].find(delimiter) {
            line.replace_range(start..after + end + delimiter.len(), "");
        } else {
            line.truncate(start);
            *inside = true;
        }
    }
    Some(line)
}

fn strip_line_comment<'a>(line: &'a str, comment: &str) -> &'a str {
    if comment.is_empty() {
        return line;
    }
    match line.find(comment) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn split_pair<'a>(line: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    if separator.is_empty() {
        return None;
    }
    let (left, right) = line.split_once(separator)?;
    Some((left.trim(), right.trim()))
}
