//! In-memory store over a record list or a local JSON export.

use std::path::Path;

use crate::error::{BoardError, Result};
use crate::model::announcement::Announcement;
use crate::parser::sent_time;

use super::AnnouncementStore;

/// Store backed by records already in memory.
///
/// Used by tests and by the CLI when pointed at a JSON export file
/// (a top-level array of announcement objects).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<Announcement>,
}

impl MemoryStore {
    pub fn new(records: Vec<Announcement>) -> Self {
        Self { records }
    }

    /// Load a JSON export from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BoardError::FileNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(|e| BoardError::io(path, e))?;
        let records: Vec<Announcement> =
            serde_json::from_str(&contents).map_err(|e| BoardError::InvalidExport {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AnnouncementStore for MemoryStore {
    fn fetch_all(&self) -> Result<Vec<Announcement>> {
        Ok(self.records.clone())
    }

    fn fetch_by_id(&self, id: &str) -> Result<Option<Announcement>> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn latest(&self) -> Result<Option<Announcement>> {
        // Unparseable timestamps compare as None, i.e. oldest
        Ok(self
            .records
            .iter()
            .max_by_key(|r| sent_time::parse(&r.sent_time))
            .cloned())
    }
}
