use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::error::{Result, SyncError};
use crate::model::TournamentDataset;

/// One JSON document per tournament year under a data directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, year: i32) -> PathBuf {
        self.dir.join(format!("matches_{year}.json"))
    }

    /// The stored dataset for `year`, or `None` if nothing was saved yet.
    ///
    /// A file that exists but cannot be decoded is an error, never an empty dataset.
    #[instrument(skip(self))]
    pub fn load(&self, year: i32) -> Result<Option<TournamentDataset>> {
        let path = self.path(year);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SyncError::Io { path, source }),
        };
        let mut dataset: TournamentDataset =
            serde_json::from_str(&text).map_err(|source| SyncError::Json {
                path: path.clone(),
                source,
            })?;
        let dropped = dataset.dedup();
        if dropped > 0 {
            warn!(dropped, path = %path.display(), "dropped duplicate match ids");
        }
        debug!(matches = dataset.matches.len(), "loaded dataset");
        Ok(Some(dataset))
    }

    /// Replaces the stored document for the dataset's year.
    ///
    /// Writes a sibling temp file and renames it over the target, so a failed
    /// save leaves the previous document intact.
    #[instrument(skip(self, dataset), fields(year = dataset.year, matches = dataset.matches.len()))]
    pub fn save(&self, dataset: &TournamentDataset) -> Result<()> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| SyncError::Io { path, source }
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;

        let path = self.path(dataset.year);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(dataset).map_err(|source| SyncError::Json {
            path: path.clone(),
            source,
        })?;

        let written = std::fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(body.as_bytes())?;
                file.sync_all()
            })
            .map_err(io_err(&tmp))
            .and_then(|()| std::fs::rename(&tmp, &path).map_err(io_err(&path)));
        if let Err(e) = written {
            if let Err(cleanup) = std::fs::remove_file(&tmp) {
                debug!(error = %cleanup, tmp = %tmp.display(), "temp file not removed");
            }
            return Err(e);
        }
        debug!(path = %path.display(), "saved dataset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contender, MatchRecord, OutcomeKind};

    fn record(id: &str, a: &str) -> MatchRecord {
        MatchRecord {
            id: id.to_string(),
            player_a: a.to_string(),
            player_b: "Michael van Gerwen".into(),
            odds_a: Some(2.1),
            odds_b: Some(1.72),
            favorite: Contender {
                name: "Michael van Gerwen".into(),
                odds: Some(1.72),
                won: false,
            },
            underdog: Contender {
                name: a.to_string(),
                odds: Some(2.1),
                won: true,
            },
            round: "Döntő".into(),
            outcome: OutcomeKind::Decided,
        }
    }

    #[test]
    fn absent_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        assert!(store.load(2026).unwrap().is_none());
    }

    #[test]
    fn save_then_load_keeps_order_and_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested"));
        let mut dataset = TournamentDataset::new(2026, "PDC");
        dataset.matches = vec![record("u2", "Gian van Veen"), record("u1", "Dimitri Van den Bergh")];
        dataset.matches[0].player_a = "Krzysztof Ratajski-Ł".into();

        store.save(&dataset).unwrap();
        let raw = std::fs::read_to_string(store.path(2026)).unwrap();
        assert!(raw.contains("Krzysztof Ratajski-Ł"));
        assert!(raw.contains("\"round\": \"Döntő\""));
        assert!(!store.path(2026).with_extension("json.tmp").exists());

        let loaded = store.load(2026).unwrap().unwrap();
        assert_eq!(loaded, dataset);
    }

    #[test]
    fn resave_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let mut dataset = TournamentDataset::new(2025, "PDC");
        dataset.matches = vec![record("u1", "Nathan Aspinall")];
        store.save(&dataset).unwrap();
        let first = std::fs::read(store.path(2025)).unwrap();

        let loaded = store.load(2025).unwrap().unwrap();
        store.save(&loaded).unwrap();
        assert_eq!(std::fs::read(store.path(2025)).unwrap(), first);
    }

    #[test]
    fn duplicate_ids_are_dropped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let mut dataset = TournamentDataset::new(2024, "PDC");
        dataset.matches = vec![record("u1", "First"), record("u1", "Second")];
        store.save(&dataset).unwrap();

        let loaded = store.load(2024).unwrap().unwrap();
        assert_eq!(loaded.matches.len(), 1);
        assert_eq!(loaded.matches[0].player_a, "First");
    }

    #[test]
    fn failed_save_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let mut dataset = TournamentDataset::new(2026, "PDC");
        dataset.matches = vec![record("u1", "Luke Littler")];
        store.save(&dataset).unwrap();
        let before = std::fs::read(store.path(2026)).unwrap();

        let tmp = store.path(2026).with_extension("json.tmp");
        std::fs::create_dir(&tmp).unwrap();
        dataset.matches.push(record("u2", "Stephen Bunting"));
        assert!(matches!(store.save(&dataset), Err(SyncError::Io { .. })));

        assert_eq!(std::fs::read(store.path(2026)).unwrap(), before);
        assert_eq!(store.load(2026).unwrap().unwrap().matches.len(), 1);
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        std::fs::create_dir(store.path(2026)).unwrap();
        std::fs::write(store.path(2026).join("keep"), "x").unwrap();

        let dataset = TournamentDataset::new(2026, "PDC");
        assert!(matches!(store.save(&dataset), Err(SyncError::Io { .. })));
        assert!(!store.path(2026).with_extension("json.tmp").exists());
    }

    #[test]
    fn records_without_ids_load_and_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let legacy = r#"{
  "year": 2023,
  "tournament": "PDC 2023",
  "matches": [
    {"playerA": "Gary Anderson", "playerB": "Jonny Clayton", "oddsA": 2.2, "oddsB": 1.65,
     "underdog": "Gary Anderson", "underdogOdds": 2.2, "underdogWon": true,
     "favorite": "Jonny Clayton", "favoriteOdds": 1.65, "favoriteWon": false, "round": "Döntő"},
    {"playerA": "Rob Cross", "playerB": "Dave Chisnall", "oddsA": 1.9, "oddsB": 1.9,
     "underdog": "Rob Cross", "underdogOdds": 1.9, "underdogWon": false,
     "favorite": "Dave Chisnall", "favoriteOdds": 1.9, "favoriteWon": true, "round": "Döntő"},
    {"playerA": "Gian van Veen", "playerB": "Ryan Searle", "oddsA": 1.5, "oddsB": 2.6,
     "underdog": "Ryan Searle", "underdogOdds": 2.6, "underdogWon": false,
     "favorite": "Gian van Veen", "favoriteOdds": 1.5, "favoriteWon": true, "round": "Döntő",
     "id": "https://example.com/match/xyz"}
  ]
}"#;
        std::fs::write(store.path(2023), legacy).unwrap();

        let loaded = store.load(2023).unwrap().unwrap();
        assert_eq!(loaded.matches.len(), 3);
        assert!(loaded.matches[0].id.is_empty());
        assert_eq!(loaded.matches[0].outcome, OutcomeKind::Decided);
        let seen = loaded.seen_ids();
        assert_eq!(seen.len(), 1);
        assert!(seen.contains("https://example.com/match/xyz"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        std::fs::write(store.path(2026), "{ not json").unwrap();
        assert!(matches!(store.load(2026), Err(SyncError::Json { .. })));
    }
}
