//! Durable storage for the Claude Code settings document.
//!
//! The settings file is shared with Claude Code itself and with any other
//! tool that registers hooks, so writes are conservative: the whole document
//! is replaced in one atomic rename, a timestamped backup of an existing file
//! is taken before each write, and no-op runs never touch the file at all
//! (callers only invoke [`SettingsStore::save`] when a merge reported a
//! change).

use crate::errors::SettingsError;
use serde_json::{Value, json};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Handle over one settings document on disk.
///
/// Deliberately an explicit value passed around by the caller, never an
/// ambient singleton: load/merge/save compose into a single transaction at
/// the call site.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store rooted at `<claude_dir>/settings.json`.
    pub fn for_claude_dir(claude_dir: &Path) -> Self {
        Self::new(claude_dir.join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document fresh from disk.
    ///
    /// A missing file seeds an empty mapping; malformed content is fatal so
    /// that we never clobber a document we could not parse.
    pub fn load(&self) -> Result<Value, SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no settings at {:?}, starting from empty document", self.path);
                return Ok(json!({}));
            }
            Err(err) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source: err,
                });
            }
        };

        serde_json::from_str(&content).map_err(|err| SettingsError::Parse {
            path: self.path.clone(),
            source: err,
        })
    }

    /// Persist the document, replacing the file content atomically.
    ///
    /// Only called after a merge reported `changed == true`. An existing file
    /// is backed up first; a failed backup is logged and does not abort the
    /// write.
    pub fn save(&self, document: &Value) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| SettingsError::Io {
                path: parent.to_path_buf(),
                source: err,
            })?;
        }

        if self.path.exists()
            && let Err(err) = create_backup(&self.path)
        {
            warn!("could not back up {:?}: {}", self.path, err);
        }

        let mut content = serde_json::to_string_pretty(document).map_err(|err| {
            SettingsError::Parse {
                path: self.path.clone(),
                source: err,
            }
        })?;
        content.push('\n');

        atomic_write(&self.path, content.as_bytes()).map_err(|err| SettingsError::Io {
            path: self.path.clone(),
            source: err,
        })
    }
}

/// Writes content to a file atomically using a temporary file.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no parent directory")
    })?;
    let temp_path = parent.join(format!(".{}.tmp", Uuid::new_v4()));

    let mut file = fs::File::create(&temp_path)?;
    file.write_all(content)?;
    file.sync_all()?;

    fs::rename(&temp_path, path)
}

/// Creates a timestamped sibling copy of a file.
fn create_backup(path: &Path) -> std::io::Result<PathBuf> {
    let backup_name = format!(
        "{}.bak.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("file"),
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    );
    let backup_path = path
        .parent()
        .map(|p| p.join(&backup_name))
        .unwrap_or_else(|| PathBuf::from(&backup_name));

    fs::copy(path, &backup_path)?;
    debug!("created backup: {:?}", backup_path);
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_yields_empty_document() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::for_claude_dir(tmp.path());

        let doc = store.load().unwrap();
        assert_eq!(doc, json!({}));
        assert!(!store.path().exists(), "load must not create the file");
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::for_claude_dir(tmp.path());

        let doc = json!({"theme": "dark", "hooks": {"Stop": []}});
        store.save(&doc).unwrap();

        assert_eq!(store.load().unwrap(), doc);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::new(tmp.path().join("nested").join("settings.json"));

        store.save(&json!({})).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_load_malformed_content_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::for_claude_dir(tmp.path());
        fs::write(store.path(), "{ invalid json }").unwrap();

        let result = store.load();
        assert!(matches!(result, Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn test_save_over_existing_file_creates_backup() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::for_claude_dir(tmp.path());

        store.save(&json!({"v": 1})).unwrap();
        store.save(&json!({"v": 2})).unwrap();

        let backups: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_string_lossy()
                    .starts_with("settings.json.bak.")
            })
            .collect();
        assert_eq!(backups.len(), 1);

        let backup: Value =
            serde_json::from_str(&fs::read_to_string(backups[0].path()).unwrap()).unwrap();
        assert_eq!(backup, json!({"v": 1}));
        assert_eq!(store.load().unwrap(), json!({"v": 2}));
    }

    #[test]
    fn test_atomic_write_overwrites_existing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("existing.json");

        fs::write(&path, "old content").unwrap();
        atomic_write(&path, b"new content").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new content");
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");

        atomic_write(&path, b"{}").unwrap();

        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
