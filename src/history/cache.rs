use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use tracing::{debug, info, warn};

use crate::history::error::CacheError;
use crate::history::types::VersionRecord;

/// A stored tag list and the time it was written
#[derive(Debug, Clone, PartialEq)]
pub struct CachedTags {
    pub records: Vec<VersionRecord>,
    pub refreshed_at: DateTime<Utc>,
}

/// Trait for persisting fetched tag lists per repository
///
/// Freshness is decided by the caller from `refreshed_at`; a store only
/// loads and saves.
#[cfg_attr(test, automock)]
pub trait TagStore: Send + Sync {
    /// Load the cached records of a repository.
    ///
    /// Returns `None` on any miss: no entry, unreadable or corrupt content.
    fn load(&self, owner: &str, repo: &str) -> Option<CachedTags>;

    /// Replace the cached records of a repository
    fn save(&self, owner: &str, repo: &str, records: &[VersionRecord]) -> Result<(), CacheError>;
}

/// Tag store keeping one JSON file per repository in a directory
pub struct FileTagStore {
    directory: PathBuf,
}

impl FileTagStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Path of the cache file for a repository
    pub fn entry_path(&self, owner: &str, repo: &str) -> PathBuf {
        self.directory
            .join(format!("github-tags-{}_{}.json", owner, repo))
    }

    fn read_entry(path: &Path) -> Result<CachedTags, CacheError> {
        let content = fs::read(path)?;
        let refreshed_at = fs::metadata(path)?.modified()?;
        Ok(CachedTags {
            records: serde_json::from_slice(&content)?,
            refreshed_at: DateTime::<Utc>::from(refreshed_at),
        })
    }
}

impl TagStore for FileTagStore {
    fn load(&self, owner: &str, repo: &str) -> Option<CachedTags> {
        let path = self.entry_path(owner, repo);

        match Self::read_entry(&path) {
            Ok(cached) => {
                info!(
                    "Found cached tags from {} written at {}",
                    path.display(),
                    cached.refreshed_at
                );
                Some(cached)
            }
            Err(CacheError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!("No tag cache at {}", path.display());
                None
            }
            Err(e) => {
                warn!(
                    "Problems reading tag cache {}, using live query instead: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    fn save(&self, owner: &str, repo: &str, records: &[VersionRecord]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.directory)?;

        let path = self.entry_path(owner, repo);
        let tmp_path = path.with_extension("json.tmp");

        let content = serde_json::to_vec(records)?;
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &path)?;

        debug!("Saved {} tags to {}", records.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    use chrono::TimeDelta;
    use tempfile::TempDir;

    fn record(tag: &str, released_at: &str, author: Option<&str>) -> VersionRecord {
        VersionRecord::new(
            tag,
            DateTime::parse_from_rfc3339(released_at).unwrap(),
            author.map(str::to_string),
        )
    }

    #[test]
    fn save_then_load_returns_same_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTagStore::new(temp_dir.path());

        let records = vec![
            record("24.0.0", "2024-01-01T10:00:00+01:00", Some("octocat")),
            record("24.0.1", "2024-02-01T10:00:00Z", None),
        ];
        store.save("vaadin", "platform", &records).unwrap();

        let loaded = store.load("vaadin", "platform").unwrap().records;
        assert_eq!(loaded, records);
        for (loaded, saved) in loaded.iter().zip(&records) {
            assert_eq!(loaded.released_at, saved.released_at);
            assert_eq!(
                loaded.released_at.offset(),
                saved.released_at.offset()
            );
            assert_eq!(loaded.author, saved.author);
        }
    }

    #[test]
    fn save_replaces_existing_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTagStore::new(temp_dir.path());

        store
            .save("o", "r", &[record("1.0.0", "2020-01-01T00:00:00Z", None)])
            .unwrap();
        store
            .save("o", "r", &[record("2.0.0", "2021-01-01T00:00:00Z", None)])
            .unwrap();

        let loaded = store.load("o", "r").unwrap().records;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].tag, "2.0.0");
        assert!(!store.entry_path("o", "r").with_extension("json.tmp").exists());
    }

    #[test]
    fn load_reports_when_entry_was_written() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTagStore::new(temp_dir.path());
        let before = Utc::now() - TimeDelta::seconds(5);

        store.save("o", "r", &[]).unwrap();

        let refreshed_at = store.load("o", "r").unwrap().refreshed_at;
        assert!(refreshed_at >= before);
        assert!(refreshed_at <= Utc::now() + TimeDelta::seconds(5));
    }

    #[test]
    fn load_reports_modification_time_of_old_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTagStore::new(temp_dir.path());
        store.save("o", "r", &[]).unwrap();

        let written = SystemTime::now() - Duration::from_secs(30 * 24 * 60 * 60);
        fs::File::options()
            .write(true)
            .open(store.entry_path("o", "r"))
            .unwrap()
            .set_modified(written)
            .unwrap();

        let cached = store.load("o", "r").unwrap();
        let expected = DateTime::<Utc>::from(written);
        assert!((cached.refreshed_at - expected).abs() < TimeDelta::seconds(2));
    }

    #[test]
    fn save_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTagStore::new(temp_dir.path().join("nested").join("cache"));

        store.save("o", "r", &[]).unwrap();

        assert!(store.entry_path("o", "r").exists());
    }

    #[test]
    fn entries_are_keyed_by_owner_and_repo() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTagStore::new(temp_dir.path());

        store
            .save("vaadin", "platform", &[record("24.0.0", "2024-01-01T00:00:00Z", None)])
            .unwrap();

        assert!(store.load("vaadin", "flow").is_none());
        assert!(store.load("other", "platform").is_none());
        assert_eq!(
            store.entry_path("vaadin", "platform"),
            temp_dir.path().join("github-tags-vaadin_platform.json")
        );
    }

    #[test]
    fn load_returns_none_for_missing_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTagStore::new(temp_dir.path());

        assert!(store.load("vaadin", "platform").is_none());
    }

    #[test]
    fn load_returns_none_for_corrupt_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTagStore::new(temp_dir.path());
        fs::write(store.entry_path("vaadin", "platform"), "[{\"tag\": ").unwrap();

        assert!(store.load("vaadin", "platform").is_none());
    }

    #[test]
    fn save_fails_when_directory_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let store = FileTagStore::new(&blocker);

        let result = store.save("o", "r", &[]);

        assert!(matches!(result, Err(CacheError::Io(_))));
    }
}
