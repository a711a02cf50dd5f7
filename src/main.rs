use clap::Parser;
use std::{error::Error, io, path::PathBuf};
use tracing_subscriber::EnvFilter;

use wordgame::{
    app::{App, GameSource},
    config::{ConfigStore, FileConfigStore, Settings},
    deck::FileFilter,
    line::SideChoice,
    master::GameMaster,
    runtime::StdinSource,
    store::FileSessionStore,
};

/// vocabulary drill for the terminal, one word pair at a time
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Drill word pairs from plain text decks. Start a game right away by passing a deck directory, or use the interactive commands (type `help`)."
)]
pub struct Cli {
    /// settings file to use instead of the default location
    #[clap(long)]
    settings: Option<PathBuf>,

    /// saved games file to use instead of the default location
    #[clap(long)]
    saves: Option<PathBuf>,

    /// never clear the screen between turns
    #[clap(long)]
    no_cls: bool,

    /// type the answers instead of judging them yourself
    #[clap(long)]
    typing: bool,

    /// side shown as the prompt
    #[clap(long, value_enum)]
    from_side: Option<SideChoice>,

    /// deck directory to start a game from
    directory: Option<PathBuf>,

    /// only read these deck files (repeatable)
    #[clap(short, long, requires = "directory")]
    whitelist: Vec<String>,

    /// skip these deck files (repeatable)
    #[clap(short, long, requires = "directory")]
    blacklist: Vec<String>,
}

impl Cli {
    /// Apply command line overrides on top of the stored settings.
    fn apply(&self, mut settings: Settings) -> Settings {
        if self.no_cls {
            settings.no_cls = true;
        }
        if self.typing {
            settings.typing_mode = true;
        }
        if let Some(side) = self.from_side {
            settings.from_side = side;
        }
        settings
    }

    fn game_source(&self) -> Option<GameSource> {
        self.directory.clone().map(|folder| GameSource {
            folder,
            filter: FileFilter {
                whitelist: self.whitelist.clone(),
                blacklist: self.blacklist.clone(),
            },
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wordgame=warn".parse()?))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = cli
        .settings
        .as_ref()
        .map_or_else(FileConfigStore::new, FileConfigStore::with_path);
    let settings = cli.apply(config.load_or_init());
    tracing::debug!("settings from {}", config.path().display());

    let saves = cli
        .saves
        .as_ref()
        .map_or_else(FileSessionStore::new, FileSessionStore::with_path);
    let master = GameMaster::from_store(&saves);
    tracing::debug!("{} saved games in {}", master.saved_sessions().len(), saves.path().display());

    let mut app = App::new(StdinSource::new(), io::stdout(), master, settings, saves);
    if let Some(source) = cli.game_source() {
        app.start_game(source)?;
    }
    app.run()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["wordgame"]);

        assert_eq!(cli.settings, None);
        assert_eq!(cli.saves, None);
        assert!(!cli.no_cls);
        assert!(!cli.typing);
        assert_eq!(cli.from_side, None);
        assert!(cli.game_source().is_none());
    }

    #[test]
    fn test_cli_paths() {
        let cli = Cli::parse_from(["wordgame", "--settings", "s.json", "--saves", "g.json"]);
        assert_eq!(cli.settings, Some(PathBuf::from("s.json")));
        assert_eq!(cli.saves, Some(PathBuf::from("g.json")));
    }

    #[test]
    fn test_cli_directory_with_filters() {
        let cli = Cli::parse_from(["wordgame", "decks", "-w", "a.txt", "-w", "b.txt", "-b", "c.txt"]);
        let source = cli.game_source().unwrap();
        assert_eq!(source.folder, PathBuf::from("decks"));
        assert_eq!(source.filter.whitelist, vec!["a.txt", "b.txt"]);
        assert_eq!(source.filter.blacklist, vec!["c.txt"]);
    }

    #[test]
    fn test_cli_filters_need_directory() {
        assert!(Cli::try_parse_from(["wordgame", "-w", "a.txt"]).is_err());
    }

    #[test]
    fn test_cli_from_side() {
        let cli = Cli::parse_from(["wordgame", "--from-side", "left"]);
        assert_eq!(cli.from_side, Some(SideChoice::Left));

        assert!(Cli::try_parse_from(["wordgame", "--from-side", "up"]).is_err());
    }

    #[test]
    fn test_overrides_only_touch_given_flags() {
        let stored = Settings {
            typing_mode: true,
            from_side: SideChoice::Right,
            ..Settings::default()
        };

        let cli = Cli::parse_from(["wordgame", "--no-cls"]);
        let settings = cli.apply(stored.clone());
        assert!(settings.no_cls);
        assert!(settings.typing_mode);
        assert_eq!(settings.from_side, SideChoice::Right);

        let cli = Cli::parse_from(["wordgame", "--from-side", "left"]);
        assert_eq!(cli.apply(stored).from_side, SideChoice::Left);
    }
}
