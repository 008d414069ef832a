//! Best-effort history of recent renders.
//!
//! The store keeps at most [`MAX_HISTORY_ITEMS`] entries, newest first, with
//! one entry per `(content, content kind)` pair. Read and write failures are
//! logged and leave the history empty or unchanged; they never reach the
//! render pipeline.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::QrConfig;
use crate::error::ImportError;
use crate::export::png::data_url;

pub const MAX_HISTORY_ITEMS: usize = 10;

/// A past render: its configuration, the PNG as a data URL, and when it was made.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub config: QrConfig,
    pub data_url: String,
    /// Unix time in milliseconds.
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn new(config: QrConfig, png: &[u8]) -> Self {
        Self::with_timestamp(config, png, Utc::now().timestamp_millis())
    }

    pub fn with_timestamp(config: QrConfig, png: &[u8], timestamp: i64) -> Self {
        Self {
            config,
            data_url: data_url(png),
            timestamp,
        }
    }

    fn same_payload(&self, other: &HistoryEntry) -> bool {
        self.config.content == other.config.content
            && self.config.content_kind == other.config.content_kind
    }
}

/// `qr-generator-history-<YYYY-MM-DD>.json`
pub fn export_filename(date: NaiveDate) -> String {
    format!("qr-generator-history-{}.json", date.format("%Y-%m-%d"))
}

pub struct HistoryStore {
    path: Option<PathBuf>,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryStore {
    /// A store that lives only as long as the value.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// A store persisted as JSON at `path`. A missing or unreadable file
    /// starts an empty history.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match load(&path) {
            Ok(entries) => bounded(entries),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to load history");
                Vec::new()
            }
        };
        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &[HistoryEntry]) -> io::Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(entries)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)
    }

    /// Adds `entry` at the front, dropping older entries with the same
    /// content and kind, and trims to [`MAX_HISTORY_ITEMS`].
    pub fn save(&self, entry: HistoryEntry) -> Vec<HistoryEntry> {
        let mut entries = self.lock();
        let updated = bounded(std::iter::once(entry).chain(entries.iter().cloned()).collect());

        if let Err(err) = self.persist(&updated) {
            tracing::error!(error = %err, "Failed to save history");
            return entries.clone();
        }
        *entries = updated;
        entries.clone()
    }

    pub fn list(&self) -> Vec<HistoryEntry> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        if let Some(path) = self.path.as_ref() {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => tracing::error!(error = %err, "Failed to clear history"),
            }
        }
    }

    /// The whole history as pretty-printed JSON.
    pub fn export_all(&self) -> Vec<u8> {
        let entries = self.lock();
        serde_json::to_vec_pretty(&*entries).unwrap_or_else(|err| {
            tracing::error!(error = %err, "Failed to export history");
            b"[]".to_vec()
        })
    }

    /// Replaces the history with the entries in `json`, keeping the first
    /// [`MAX_HISTORY_ITEMS`] distinct ones. If the new list cannot be
    /// persisted the current history is kept and returned instead.
    ///
    /// # Errors
    ///
    /// - [`ImportError::MalformedJson`] if `json` does not parse or an entry
    ///   has the wrong shape.
    /// - [`ImportError::NotAnArray`] if the top-level value is not an array.
    ///
    /// The current history is left untouched on error.
    pub fn import_all(&self, json: &[u8]) -> Result<Vec<HistoryEntry>, ImportError> {
        let value: serde_json::Value = serde_json::from_slice(json)?;
        if !value.is_array() {
            return Err(ImportError::NotAnArray);
        }
        let imported = bounded(serde_json::from_value(value)?);

        let mut entries = self.lock();
        if let Err(err) = self.persist(&imported) {
            tracing::error!(error = %err, "Failed to persist imported history");
            return Ok(entries.clone());
        }
        *entries = imported;
        tracing::info!(count = entries.len(), "Imported history");
        Ok(entries.clone())
    }
}

/// Drops later entries that repeat an earlier `(content, content kind)` and
/// trims to [`MAX_HISTORY_ITEMS`].
fn bounded(entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut kept: Vec<HistoryEntry> = Vec::with_capacity(MAX_HISTORY_ITEMS);
    for entry in entries {
        if kept.len() == MAX_HISTORY_ITEMS {
            break;
        }
        if !kept.iter().any(|k| k.same_payload(&entry)) {
            kept.push(entry);
        }
    }
    kept
}

fn load(path: &Path) -> io::Result<Vec<HistoryEntry>> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(io::Error::from)
}
