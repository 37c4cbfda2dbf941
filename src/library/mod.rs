//! Lesson library and credential persistence.
//!
//! Both live in a [`KvStore`] under independent keys. The library is a JSON
//! array of lesson plans, most recently saved first, deduplicated by topic
//! (trimmed, case-insensitive).

mod store;

pub use store::{KvStore, MemoryKvStore, SledKvStore};

use crate::error::{LibraryError, StorageError};
use crate::types::LessonPlan;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub const LIBRARY_KEY: &str = "itafacile_library";
pub const CREDENTIAL_KEY: &str = "gemini_api_key";
pub const DEFAULT_BACKUP_FILE: &str = "itafacile-backup.json";

/// Library configuration (`[library]` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Entries kept after a save
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Entries kept after an import merge
    #[serde(default = "default_import_max_entries")]
    pub import_max_entries: usize,

    /// Data directory override (defaults to the platform data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_max_entries() -> usize {
    20
}

fn default_import_max_entries() -> usize {
    50
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            import_max_entries: default_import_max_entries(),
            data_dir: None,
        }
    }
}

impl LibraryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("max_entries must be greater than zero".to_string());
        }
        if self.import_max_entries < self.max_entries {
            return Err(format!(
                "import_max_entries ({}) cannot be lower than max_entries ({})",
                self.import_max_entries, self.max_entries
            ));
        }
        Ok(())
    }
}

/// Deduplication key for a topic.
pub fn topic_key(topic: &str) -> String {
    topic.trim().to_lowercase()
}

/// Result of merging a backup into the library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    /// New lessons now in the library
    pub added: usize,
    /// Lessons whose topic was already present
    pub skipped_duplicates: usize,
    /// Array elements that were not lesson plans
    pub skipped_invalid: usize,
    /// New lessons dropped by the size cap
    pub truncated: usize,
}

/// Persistent lesson library
pub struct Library {
    store: Arc<dyn KvStore>,
    config: LibraryConfig,
}

impl Library {
    pub fn new(store: Arc<dyn KvStore>, config: LibraryConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Stored lessons, most recent first. A corrupt stored value reads as empty.
    pub fn list(&self) -> Result<Vec<LessonPlan>, LibraryError> {
        let Some(raw) = self.store.get(LIBRARY_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(lessons) => Ok(lessons),
            Err(e) => {
                warn!(error = %e, "Failed to load library, starting empty");
                Ok(Vec::new())
            }
        }
    }

    /// Case-insensitive lookup by topic.
    pub fn find(&self, topic: &str) -> Result<Option<LessonPlan>, LibraryError> {
        let key = topic_key(topic);
        Ok(self
            .list()?
            .into_iter()
            .find(|lesson| topic_key(&lesson.topic) == key))
    }

    /// Insert or replace the lesson for this topic and move it to the front.
    pub fn save(&self, plan: &LessonPlan) -> Result<Vec<LessonPlan>, LibraryError> {
        let key = topic_key(&plan.topic);
        let mut lessons: Vec<LessonPlan> = self
            .list()?
            .into_iter()
            .filter(|lesson| topic_key(&lesson.topic) != key)
            .collect();
        lessons.insert(0, plan.clone());
        lessons.truncate(self.config.max_entries);
        self.persist(&lessons)?;
        info!(topic = %plan.topic, entries = lessons.len(), "Lesson saved to library");
        Ok(lessons)
    }

    /// Remove lessons whose topic matches exactly. Returns whether anything was removed.
    pub fn delete(&self, topic: &str) -> Result<bool, LibraryError> {
        let lessons = self.list()?;
        let before = lessons.len();
        let remaining: Vec<LessonPlan> = lessons
            .into_iter()
            .filter(|lesson| lesson.topic != topic)
            .collect();
        if remaining.len() == before {
            return Ok(false);
        }
        self.persist(&remaining)?;
        info!(topic = %topic, "Lesson deleted from library");
        Ok(true)
    }

    /// Serialize the whole library as a JSON array.
    pub fn export(&self) -> Result<String, LibraryError> {
        let lessons = self.list()?;
        serde_json::to_string_pretty(&lessons).map_err(|e| {
            LibraryError::Storage(StorageError::Encode {
                key: LIBRARY_KEY.to_string(),
                message: e.to_string(),
            })
        })
    }

    /// Write the export to `path`; returns the number of lessons written.
    pub fn export_to_file(&self, path: &Path) -> Result<usize, LibraryError> {
        let count = self.list()?.len();
        let json = self.export()?;
        std::fs::write(path, json).map_err(StorageError::from)?;
        info!(path = %path.display(), lessons = count, "Library exported");
        Ok(count)
    }

    /// Merge a backup document: existing topics are kept, new ones appended.
    ///
    /// The document must be a JSON array. On any error the stored library is untouched.
    pub fn import(&self, text: &str) -> Result<ImportOutcome, LibraryError> {
        let document: serde_json::Value =
            serde_json::from_str(text).map_err(|e| LibraryError::InvalidJson(e.to_string()))?;
        let serde_json::Value::Array(elements) = document else {
            return Err(LibraryError::NotAnArray);
        };

        let mut lessons = self.list()?;
        let mut seen: HashSet<String> = lessons.iter().map(|l| topic_key(&l.topic)).collect();
        let mut outcome = ImportOutcome::default();
        let mut incoming = Vec::new();

        for element in elements {
            let lesson: LessonPlan = match serde_json::from_value(element) {
                Ok(lesson) => lesson,
                Err(e) => {
                    warn!(error = %e, "Skipping invalid lesson in backup");
                    outcome.skipped_invalid += 1;
                    continue;
                }
            };
            let key = topic_key(&lesson.topic);
            if key.is_empty() {
                outcome.skipped_invalid += 1;
                continue;
            }
            if !seen.insert(key) {
                outcome.skipped_duplicates += 1;
                continue;
            }
            incoming.push(lesson);
        }

        let room = self.config.import_max_entries.saturating_sub(lessons.len());
        outcome.added = incoming.len().min(room);
        outcome.truncated = incoming.len() - outcome.added;
        lessons.extend(incoming.into_iter().take(outcome.added));

        if outcome.added > 0 {
            self.persist(&lessons)?;
        }
        info!(
            added = outcome.added,
            duplicates = outcome.skipped_duplicates,
            invalid = outcome.skipped_invalid,
            truncated = outcome.truncated,
            "Library import finished"
        );
        Ok(outcome)
    }

    pub fn import_from_file(&self, path: &Path) -> Result<ImportOutcome, LibraryError> {
        let text = std::fs::read_to_string(path).map_err(StorageError::from)?;
        self.import(&text)
    }

    fn persist(&self, lessons: &[LessonPlan]) -> Result<(), LibraryError> {
        let json = serde_json::to_string(lessons).map_err(|e| StorageError::Encode {
            key: LIBRARY_KEY.to_string(),
            message: e.to_string(),
        })?;
        self.store.put(LIBRARY_KEY, &json)?;
        Ok(())
    }
}

/// Locally saved API credential
pub struct CredentialStore {
    store: Arc<dyn KvStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Saved credential; blank values read as none.
    pub fn get(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .store
            .get(CREDENTIAL_KEY)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    /// Save a trimmed credential. Saving a blank value clears it.
    pub fn set(&self, value: &str) -> Result<(), StorageError> {
        let value = value.trim();
        if value.is_empty() {
            return self.clear();
        }
        self.store.put(CREDENTIAL_KEY, value)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(CREDENTIAL_KEY)
    }
}
