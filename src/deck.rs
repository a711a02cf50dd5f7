use itertools::Itertools;
use rand::Rng;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::line::Line;
use crate::parser::{parse_str, ParseOptions};

/// Which files of a deck directory to read, by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFilter {
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
}

impl FileFilter {
    pub fn allows(&self, name: &str) -> bool {
        if self.blacklist.iter().any(|b| b == name) {
            return false;
        }
        self.whitelist.is_empty() || self.whitelist.iter().any(|w| w == name)
    }
}

/// Parse every allowed file directly inside `dir`, in file name order.
/// Line indices restart at 1 for each file.
pub fn load_directory<R: Rng + ?Sized>(
    dir: &Path,
    filter: &FileFilter,
    options: &ParseOptions,
    rng: &mut R,
) -> Result<Vec<Line>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if filter.allows(&name) {
            names.push(name);
        }
    }
    names.sort();
    tracing::debug!("reading {} from {}", names.iter().join(", "), dir.display());

    let mut lines = Vec::new();
    for name in &names {
        let content = fs::read_to_string(dir.join(name))?;
        let parsed = parse_str(&content, options, rng);
        tracing::debug!("{name}: {} entries", parsed.len());
        lines.extend(parsed);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn write_deck(dir: &Path) {
        fs::write(dir.join("a.txt"), "eins - one\nzwei - two\n").unwrap();
        fs::write(dir.join("b.txt"), "# animals\nhund - dog\n").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("c.txt"), "rot - red\n").unwrap();
    }

    fn load(dir: &Path, filter: FileFilter) -> Vec<Line> {
        let mut rng = StdRng::seed_from_u64(0);
        load_directory(dir, &filter, &ParseOptions::default(), &mut rng).unwrap()
    }

    #[test]
    fn reads_all_files_in_name_order() {
        let dir = tempdir().unwrap();
        write_deck(dir.path());
        let lines = load(dir.path(), FileFilter::default());
        let lefts: Vec<&str> = lines.iter().map(|l| l.left.as_str()).collect();
        assert_eq!(lefts, vec!["eins", "zwei", "hund"]);
        assert_eq!(lines[2].index, 2);
    }

    #[test]
    fn whitelist_limits_files() {
        let dir = tempdir().unwrap();
        write_deck(dir.path());
        let filter = FileFilter {
            whitelist: vec!["b.txt".into()],
            blacklist: vec![],
        };
        let lines = load(dir.path(), filter);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].right, "dog");
    }

    #[test]
    fn blacklist_wins_over_whitelist() {
        let filter = FileFilter {
            whitelist: vec!["a.txt".into(), "b.txt".into()],
            blacklist: vec!["a.txt".into()],
        };
        assert!(!filter.allows("a.txt"));
        assert!(filter.allows("b.txt"));
        assert!(!filter.allows("c.txt"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let result = load_directory(
            &dir.path().join("nope"),
            &FileFilter::default(),
            &ParseOptions::default(),
            &mut rng,
        );
        assert_matches!(result, Err(crate::error::GameError::Io(_)));
    }
}
