//! Session orchestration.
//!
//! The [`GameMaster`] owns the saved session collection and the active
//! [`GameEngine`]. It turns a raw entry list into a playable deck (line
//! filters, side assignment, shuffling, batching) and moves the engine from
//! one batch to the next.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeSet, VecDeque};

use crate::config::Settings;
use crate::engine::GameEngine;
use crate::error::{GameError, Result};
use crate::line::Line;
use crate::session::SessionState;
use crate::store::SessionStore;
use crate::typing_policy::Answer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum GameStatus {
    NotStarted,
    Ongoing,
    Finished,
}

/// What the line whitelist/blacklist did to a new deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    Unfiltered,
    Filtered { kept: usize, dropped: usize },
    /// Filters were set and nothing survived. The session starts finished.
    EmptyResult { dropped: usize },
}

/// Keep entries allowed by the line filters of `settings`.
///
/// A non-empty whitelist is authoritative and the blacklist is subtracted
/// from it; a blacklist on its own removes its lines from the full deck.
pub fn filter_lines(entries: Vec<Line>, settings: &Settings) -> (Vec<Line>, FilterOutcome) {
    let whitelist = &settings.line_whitelist;
    let blacklist = &settings.line_blacklist;
    if whitelist.is_empty() && blacklist.is_empty() {
        return (entries, FilterOutcome::Unfiltered);
    }

    let total = entries.len();
    let kept: Vec<Line> = if whitelist.is_empty() {
        entries
            .into_iter()
            .filter(|line| !blacklist.contains(&line.index))
            .collect()
    } else {
        let effective: BTreeSet<usize> = whitelist.difference(blacklist).copied().collect();
        entries
            .into_iter()
            .filter(|line| effective.contains(&line.index))
            .collect()
    };

    let dropped = total - kept.len();
    let outcome = if kept.is_empty() {
        FilterOutcome::EmptyResult { dropped }
    } else {
        FilterOutcome::Filtered {
            kept: kept.len(),
            dropped,
        }
    };
    (kept, outcome)
}

fn into_batches(entries: Vec<Line>, settings: &Settings) -> VecDeque<Vec<Line>> {
    if !settings.batch_mode {
        return VecDeque::from([entries]);
    }
    let size = settings.batch_size.max(1);
    entries.chunks(size).map(<[Line]>::to_vec).collect()
}

#[derive(Debug)]
pub struct GameMaster {
    saved: Vec<SessionState>,
    /// Slot in `saved` the active session is tied to, once it has one.
    game_id: Option<usize>,
    engine: Option<GameEngine>,
    queued: VecDeque<Vec<Line>>,
    batch_index: usize,
    batch_count: usize,
    status: GameStatus,
    rng: StdRng,
}

impl GameMaster {
    pub fn new(saved: Vec<SessionState>) -> Self {
        Self::with_rng(saved, StdRng::from_entropy())
    }

    pub fn with_rng(saved: Vec<SessionState>, rng: StdRng) -> Self {
        Self {
            saved,
            game_id: None,
            engine: None,
            queued: VecDeque::new(),
            batch_index: 0,
            batch_count: 0,
            status: GameStatus::NotStarted,
            rng,
        }
    }

    pub fn from_store<S: SessionStore>(store: &S) -> Self {
        Self::new(store.load())
    }

    /// Build a fresh session from `entries`; it is not part of the saved
    /// collection until committed.
    pub fn new_session(&mut self, entries: Vec<Line>, settings: Settings) -> FilterOutcome {
        let (mut entries, outcome) = filter_lines(entries, &settings);
        match outcome {
            FilterOutcome::EmptyResult { dropped } => {
                tracing::warn!("line filters removed all {dropped} entries; deck is empty")
            }
            FilterOutcome::Filtered { kept, dropped } => {
                tracing::debug!("line filters kept {kept}, dropped {dropped}")
            }
            FilterOutcome::Unfiltered => {}
        }

        let answer_side = settings.from_side.opposite();
        for line in &mut entries {
            line.assign_side(answer_side, &mut self.rng);
        }

        if settings.random_line_pre_batch {
            entries.shuffle(&mut self.rng);
        }

        let mut batches = into_batches(entries, &settings);
        self.batch_count = batches.len().max(1);
        self.batch_index = 0;
        let first = batches.pop_front().unwrap_or_default();
        self.queued = batches;
        tracing::debug!(
            "new session: {} entries in first of {} batches",
            first.len(),
            self.batch_count
        );

        let mut engine = GameEngine::new(SessionState::new(first, settings));
        engine.apply_post_batch_shuffle(&mut self.rng);
        self.status = if engine.has_entries() {
            GameStatus::Ongoing
        } else {
            GameStatus::Finished
        };
        self.engine = Some(engine);
        self.game_id = None;
        outcome
    }

    /// Answer the current entry, moving on to the next batch when this one
    /// runs out.
    pub fn submit_answer(&mut self, answer: Answer<'_>) -> Result<GameStatus> {
        let engine = self.engine.as_mut().ok_or(GameError::NoActiveSession)?;
        if engine.submit_answer(answer)? {
            return Ok(self.status);
        }
        Ok(self.advance_batch())
    }

    /// Replace the exhausted batch with the next queued one. Anything left in
    /// the current batch is discarded.
    pub fn advance_batch(&mut self) -> GameStatus {
        let Some(engine) = self.engine.as_mut() else {
            return self.status;
        };
        while let Some(batch) = self.queued.pop_front() {
            self.batch_index += 1;
            engine.load_batch(batch);
            engine.apply_post_batch_shuffle(&mut self.rng);
            if engine.has_entries() {
                tracing::debug!("batch {}/{}", self.batch_index + 1, self.batch_count);
                self.status = GameStatus::Ongoing;
                return self.status;
            }
        }
        self.status = GameStatus::Finished;
        self.status
    }

    /// Make saved session `id` the active one, exactly as it was saved.
    pub fn load_session(&mut self, id: usize) -> Result<()> {
        let mut state = self
            .saved
            .get(id)
            .cloned()
            .ok_or(GameError::NotFound {
                id,
                len: self.saved.len(),
            })?;

        self.queued = std::mem::take(&mut state.queued_batches).into();
        self.batch_index = 0;
        self.batch_count = self.queued.len() + 1;
        self.engine = Some(GameEngine::new(state));
        self.game_id = Some(id);
        self.status = GameStatus::Ongoing;
        if !self.engine.as_ref().is_some_and(GameEngine::has_entries) {
            self.advance_batch();
        }
        tracing::debug!("loaded session {id}: {}", self.status);
        Ok(())
    }

    /// Snapshot of the active session including batches not yet started.
    pub fn snapshot(&self) -> Result<SessionState> {
        let engine = self.engine.as_ref().ok_or(GameError::NoActiveSession)?;
        let mut state = engine.extract_state();
        state.queued_batches = self.queued.iter().cloned().collect();
        Ok(state)
    }

    /// Write the active session into the collection: over the slot it came
    /// from, or appended as a new slot that later commits will overwrite.
    pub fn commit_active(&mut self) -> Result<usize> {
        let snapshot = self.snapshot()?;
        let id = match self.game_id {
            Some(id) if id < self.saved.len() => {
                self.saved[id] = snapshot;
                id
            }
            _ => {
                self.saved.push(snapshot);
                self.saved.len() - 1
            }
        };
        self.game_id = Some(id);
        Ok(id)
    }

    /// Commit the active session, if any, and persist the whole collection.
    pub fn save<S: SessionStore>(&mut self, store: &S) -> Result<()> {
        if self.engine.is_some() {
            self.commit_active()?;
        }
        store.save(&self.saved)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn engine(&self) -> Option<&GameEngine> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut GameEngine> {
        self.engine.as_mut()
    }

    pub fn saved_sessions(&self) -> &[SessionState] {
        &self.saved
    }

    pub fn game_id(&self) -> Option<usize> {
        self.game_id
    }

    /// 1-based current batch and total batch count.
    pub fn batch_progress(&self) -> (usize, usize) {
        (self.batch_index + 1, self.batch_count.max(1))
    }

    /// Entries left in the current batch and all queued ones.
    pub fn entries_left(&self) -> usize {
        let current = self.engine.as_ref().map_or(0, |e| e.remaining().len());
        current + self.queued.iter().map(Vec::len).sum::<usize>()
    }
}
