//! Interactive command loop.
//!
//! The app alternates between a command prompt (`game`, `load`, `save`, ...)
//! and game turns. It only reads and writes lines; every rule lives in the
//! [`GameMaster`].

use clap::Parser;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::Settings;
use crate::deck::{load_directory, FileFilter};
use crate::error::Result;
use crate::info::{history_table, status_line};
use crate::master::{FilterOutcome, GameMaster, GameStatus};
use crate::parser::ParseOptions;
use crate::runtime::InputSource;
use crate::store::FileSessionStore;
use crate::typing_policy::Answer;

/// Typed during a turn to get back to the command prompt.
pub const CMD_ESCAPE: &str = ":cmd";

/// Commands accepted at the `Enter command:` prompt
#[derive(Parser, Debug, Clone, PartialEq)]
#[clap(name = "command", no_binary_name = true)]
pub enum ReplCommand {
    /// Start a new game from the deck files in FOLDER
    Game {
        folder: PathBuf,
        /// only read these files (repeatable)
        #[clap(short, long)]
        whitelist: Vec<String>,
        /// skip these files (repeatable)
        #[clap(short, long)]
        blacklist: Vec<String>,
    },
    /// Load a saved game by id (see `history`)
    Load {
        #[clap(default_value_t = 0)]
        id: usize,
    },
    /// Save all games, including the current one
    Save { path: Option<PathBuf> },
    /// List saved games
    History,
    /// Restart the last game from its files
    Restart,
    /// Continue the current game
    Continue,
    /// Exit the game
    Exit,
}

/// Where a game's entries came from, kept for `restart`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSource {
    pub folder: PathBuf,
    pub filter: FileFilter,
}

pub struct App<I: InputSource, W: Write> {
    input: I,
    out: W,
    master: GameMaster,
    settings: Settings,
    saves: FileSessionStore,
    last_game: Option<GameSource>,
    show_cmd: bool,
    running: bool,
}

impl<I: InputSource, W: Write> App<I, W> {
    pub fn new(input: I, out: W, master: GameMaster, settings: Settings, saves: FileSessionStore) -> Self {
        Self {
            input,
            out,
            master,
            settings,
            saves,
            last_game: None,
            show_cmd: true,
            running: true,
        }
    }

    pub fn master(&self) -> &GameMaster {
        &self.master
    }

    pub fn into_parts(self) -> (GameMaster, W) {
        (self.master, self.out)
    }

    /// Run until `exit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        while self.running {
            if self.show_cmd || self.master.status() != GameStatus::Ongoing {
                self.command_turn()?;
            } else {
                self.game_turn()?;
            }
        }
        Ok(())
    }

    fn command_turn(&mut self) -> Result<()> {
        if self.master.engine().is_some_and(|e| e.current_position() > 0) {
            if let Some(info) = status_line(&self.master) {
                writeln!(self.out, "Info: {info}")?;
            }
        }
        write!(self.out, "Enter command: ")?;
        self.out.flush()?;

        let Some(line) = self.input.read_line() else {
            self.running = false;
            return Ok(());
        };
        let words = split_command_line(&line);
        if words.is_empty() {
            return Ok(());
        }

        match ReplCommand::try_parse_from(words) {
            Ok(cmd) => {
                if let Err(e) = self.execute(cmd) {
                    tracing::debug!("command failed: {e:?}");
                    writeln!(self.out, "Error: {e}")?;
                }
            }
            // clap renders help and usage errors the same way
            Err(e) => writeln!(self.out, "{e}")?,
        }
        Ok(())
    }

    pub fn execute(&mut self, cmd: ReplCommand) -> Result<()> {
        match cmd {
            ReplCommand::Game {
                folder,
                whitelist,
                blacklist,
            } => {
                let source = GameSource {
                    folder,
                    filter: FileFilter {
                        whitelist,
                        blacklist,
                    },
                };
                self.start_game(source)?;
            }
            ReplCommand::Load { id } => {
                self.master.load_session(id)?;
                writeln!(self.out, "Loaded game {id}.")?;
                self.show_cmd = false;
            }
            ReplCommand::Save { path } => {
                let store = path.map_or_else(|| self.saves.clone(), FileSessionStore::with_path);
                self.master.save(&store)?;
                writeln!(
                    self.out,
                    "Saved {} games to {}",
                    self.master.saved_sessions().len(),
                    store.path().display()
                )?;
            }
            ReplCommand::History => {
                writeln!(self.out, "{}", history_table(self.master.saved_sessions()))?;
            }
            ReplCommand::Restart => match self.last_game.clone() {
                Some(source) => self.start_game(source)?,
                None => writeln!(self.out, "Nothing to restart.")?,
            },
            ReplCommand::Continue => {
                if self.master.status() == GameStatus::Ongoing {
                    self.show_cmd = false;
                } else {
                    writeln!(self.out, "No game in progress.")?;
                }
            }
            ReplCommand::Exit => self.running = false,
        }
        Ok(())
    }

    /// Read the deck files of `source` and start a new game from them.
    pub fn start_game(&mut self, source: GameSource) -> Result<()> {
        let options = ParseOptions::from(&self.settings);
        let lines = load_directory(&source.folder, &source.filter, &options, &mut rand::thread_rng())?;
        let found = lines.len();
        let outcome = self.master.new_session(lines, self.settings.clone());
        self.last_game = Some(source);
        self.clear()?;

        if found == 0 {
            writeln!(self.out, "No entries found.")?;
        } else if let FilterOutcome::EmptyResult { .. } = outcome {
            writeln!(self.out, "No entries left after line filters.")?;
        }
        self.show_cmd = self.master.status() != GameStatus::Ongoing;
        Ok(())
    }

    fn game_turn(&mut self) -> Result<()> {
        let Some(engine) = self.master.engine() else {
            self.show_cmd = true;
            return Ok(());
        };
        let line = engine.current_entry()?.clone();
        let settings = engine.settings().clone();
        let split = settings.split.as_str();

        if let Some(info) = status_line(&self.master) {
            writeln!(self.out, "Info: {info}")?;
        }
        let started = Instant::now();

        let answer = if settings.typing_mode {
            write!(self.out, "{}{}", line.prompt_text(), split)?;
            self.out.flush()?;
            let Some(typed) = self.input.read_line() else {
                self.running = false;
                return Ok(());
            };
            writeln!(self.out, "{}", line.joined(split))?;
            if self.input.read_line().is_some_and(|l| l.trim() == CMD_ESCAPE) {
                self.show_cmd = true;
            }
            typed
        } else {
            write!(self.out, "{}", line.side_text(line.prompt_side(), Some(split)))?;
            self.out.flush()?;
            if self.input.read_line().is_none() {
                self.running = false;
                return Ok(());
            }
            writeln!(self.out, "{}", line.joined(split))?;
            let mut verdict = self.input.read_line().unwrap_or_default();
            if verdict.contains(CMD_ESCAPE) {
                self.show_cmd = true;
                verdict = verdict.replace(CMD_ESCAPE, "");
            }
            verdict
        };

        if let Some(engine) = self.master.engine_mut() {
            engine.record_elapsed(started.elapsed());
        }
        let status = if settings.typing_mode {
            self.master.submit_answer(Answer::Typed(&answer))?
        } else {
            self.master.submit_answer(Answer::Judged(answer.trim().is_empty()))?
        };
        self.clear()?;

        if status == GameStatus::Finished {
            self.report_finished()?;
        }
        Ok(())
    }

    fn report_finished(&mut self) -> Result<()> {
        if let Some(engine) = self.master.engine() {
            let score = engine
                .score(Some(2))
                .map(|s| format!("{s:.2}%"))
                .unwrap_or_else(|_| "-".to_string());
            writeln!(
                self.out,
                "Finished with {} mistakes, score {score}.",
                engine.mistake_count()
            )?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if !self.settings.no_cls {
            execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }
}

/// Split a command line on whitespace, keeping double-quoted runs together.
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut has_word = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                has_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }
    if has_word {
        words.push(current);
    }
    words
}
