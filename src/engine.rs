use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use std::time::Duration;

use crate::config::Settings;
use crate::error::{GameError, Result};
use crate::line::Line;
use crate::session::SessionState;
use crate::typing_policy::Answer;

/// Drives one deck (one batch) one answer at a time.
#[derive(Debug, Clone)]
pub struct GameEngine {
    state: SessionState,
}

impl GameEngine {
    /// Take ownership of a session snapshot. An unset begin time is set to
    /// now; a missing original length falls back to the remaining entries.
    pub fn new(mut state: SessionState) -> Self {
        if state.begin.is_none() {
            state.begin = Some(Utc::now());
        }
        if state.original_length == 0 {
            state.original_length = state.remaining.len();
        }
        state.queued_batches.clear();
        Self { state }
    }

    pub fn has_entries(&self) -> bool {
        !self.state.remaining.is_empty()
    }

    pub fn current_entry(&self) -> Result<&Line> {
        self.state.remaining.front().ok_or(GameError::EmptyDeck)
    }

    /// Resolve the current entry. Returns whether entries remain afterwards.
    pub fn submit_answer(&mut self, answer: Answer<'_>) -> Result<bool> {
        let current = self.current_entry()?;
        if !answer.is_correct(current, &self.state.settings) {
            let current = current.clone();
            self.mistake(current);
        }
        Ok(self.step_forward())
    }

    fn mistake(&mut self, current: Line) {
        self.state.mistake_count += 1;
        if !self.state.settings.only_once {
            self.state.remaining.push_back(current);
        }
    }

    fn step_forward(&mut self) -> bool {
        self.state.current_position += 1;
        self.state.remaining.pop_front();
        self.has_entries()
    }

    pub fn apply_post_batch_shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.state.settings.random_line_post_batch {
            self.state.remaining.make_contiguous().shuffle(rng);
        }
    }

    /// Replace the deck with the next batch; position and denominator restart.
    pub fn load_batch(&mut self, batch: Vec<Line>) {
        self.state.original_length = batch.len();
        self.state.remaining = batch.into();
        self.state.current_position = 0;
    }

    pub fn record_elapsed(&mut self, elapsed: Duration) {
        self.state.elapsed_secs += elapsed.as_secs_f64();
    }

    pub fn extract_state(&self) -> SessionState {
        self.state.clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn mistake_count(&self) -> u32 {
        self.state.mistake_count
    }

    pub fn current_position(&self) -> usize {
        self.state.current_position
    }

    pub fn remaining(&self) -> &VecDeque<Line> {
        &self.state.remaining
    }

    pub fn original_length(&self) -> usize {
        self.state.original_length
    }

    pub fn begin(&self) -> Option<DateTime<Utc>> {
        self.state.begin
    }

    pub fn elapsed(&self) -> Duration {
        self.state.elapsed()
    }

    pub fn score(&self, round_to: Option<u32>) -> Result<f64> {
        self.state.score(round_to)
    }
}
