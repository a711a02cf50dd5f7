use chrono::Local;
use itertools::Itertools;
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::engine::GameEngine;
use crate::master::GameMaster;
use crate::session::SessionState;

const PREVIEW_WIDTH: usize = 24;

/// One-line progress summary shown between turns, honoring the `show*`
/// settings of the active session. `None` when there is nothing to show.
pub fn status_line(gm: &GameMaster) -> Option<String> {
    let engine = gm.engine()?;
    let settings = engine.settings();
    let mut parts = Vec::new();

    if settings.show_position {
        let mut position = position_text(engine);
        let (batch, batches) = gm.batch_progress();
        if batches > 1 {
            position.push_str(&format!("+{batch}/{batches}"));
        }
        parts.push(position);
    }
    if settings.show_mistake_count {
        parts.push(engine.mistake_count().to_string());
    }
    if settings.show_score {
        parts.push(score_text(engine.score(Some(2))));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" - "))
    }
}

/// `n/total` where `n` is the 1-based position of the entry on screen. With
/// repeat-on-mistake, requeued entries wrap around instead of counting past
/// the batch length.
fn position_text(engine: &GameEngine) -> String {
    let total = engine.original_length();
    if total == 0 {
        return "0/0".to_string();
    }
    let adjust = if engine.settings().only_once {
        0
    } else {
        i64::from(engine.mistake_count())
    };
    let current = (engine.current_position() as i64 - adjust).rem_euclid(total as i64) + 1;
    format!("{current}/{total}")
}

fn score_text(score: crate::error::Result<f64>) -> String {
    match score {
        Ok(score) => format!("{score:.2}%"),
        Err(_) => "-".to_string(),
    }
}

/// Table of saved sessions for the `history` command.
pub fn history_table(sessions: &[SessionState]) -> String {
    if sessions.is_empty() {
        return "No saved games.".to_string();
    }

    let header = format!(
        "{:>3}  {:<16}  {:<14}  {:>5}  {:>8}  {:>8}  {}",
        "id", "started", "played", "left", "mistakes", "score", "next"
    );
    let rows = sessions.iter().enumerate().map(|(id, s)| {
        let started = s
            .begin
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let played = HumanTime::from(s.elapsed()).to_text_en(Accuracy::Rough, Tense::Present);
        let next = s
            .remaining
            .front()
            .map(|l| truncate_to_width(&l.joined(&s.settings.split), PREVIEW_WIDTH))
            .unwrap_or_default();
        format!(
            "{:>3}  {:<16}  {:<14}  {:>5}  {:>8}  {:>8}  {}",
            id,
            started,
            played,
            s.entries_left(),
            s.mistake_count,
            score_text(s.score(Some(2))),
            next
        )
    });

    std::iter::once(header).chain(rows).join("\n")
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
