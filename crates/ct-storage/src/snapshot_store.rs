//! File system storage for thread snapshots

use ct_core::comment::{Comment, Commentable};
use ct_core::error::{CommentTreeError, Result};
use ct_core::service::CommentSource;
use ct_core::snapshot::ThreadSnapshot;
use ct_core::types::CommentableRef;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read and validate a single snapshot file
pub fn read_snapshot(path: &Path) -> Result<ThreadSnapshot> {
    let file = fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CommentTreeError::FileNotFound(path.to_path_buf())
        } else {
            CommentTreeError::Io(e)
        }
    })?;

    let reader = BufReader::new(file);
    let snapshot: ThreadSnapshot = serde_json::from_reader(reader)?;
    snapshot.validate()?;

    debug!(
        "Read snapshot of {} ({} comments) from {:?}",
        snapshot.reference(),
        snapshot.comments.len(),
        path
    );
    Ok(snapshot)
}

fn write_temp(temp_path: &Path, snapshot: &ThreadSnapshot) -> Result<()> {
    let temp_file = fs::File::create(temp_path).map_err(|e| {
        CommentTreeError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create temp file: {}", e),
        ))
    })?;
    let mut writer = BufWriter::new(temp_file);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.flush()?;
    Ok(())
}

/// Directory of `<kind>-<id>.json` snapshot files
pub struct FileSystemStore {
    /// Base directory for storage
    base_dir: PathBuf,
    /// Snapshots subdirectory
    snapshots_dir: PathBuf,
}

impl FileSystemStore {
    /// Create a new file system store
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let snapshots_dir = base_dir.join("snapshots");

        let store = Self {
            base_dir,
            snapshots_dir,
        };

        store.ensure_dirs()?;
        Ok(store)
    }

    /// Create store in the default data directory (~/.comment-tree)
    pub fn default_location() -> Result<Self> {
        let base_dir = directories::ProjectDirs::from("com", "forem", "comment-tree")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".comment-tree")
            });

        Self::new(base_dir)
    }

    /// Ensure required directories exist
    fn ensure_dirs(&self) -> Result<()> {
        if !self.snapshots_dir.exists() {
            fs::create_dir_all(&self.snapshots_dir).map_err(|e| {
                CommentTreeError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create snapshots directory: {}", e),
                ))
            })?;
            debug!("Created snapshots directory: {:?}", self.snapshots_dir);
        }
        Ok(())
    }

    /// Get the path for a snapshot file
    fn snapshot_path(&self, commentable: &CommentableRef) -> PathBuf {
        self.snapshots_dir.join(format!("{}.json", commentable))
    }

    /// Get a temporary path for atomic writes
    fn temp_path(&self, commentable: &CommentableRef) -> PathBuf {
        self.snapshots_dir.join(format!(".{}.json.tmp", commentable))
    }

    /// Save a snapshot atomically (write to temp, then rename)
    pub fn save(&self, snapshot: &ThreadSnapshot) -> Result<()> {
        snapshot.validate()?;

        let reference = snapshot.reference();
        let temp_path = self.temp_path(&reference);
        let final_path = self.snapshot_path(&reference);

        let written = write_temp(&temp_path, snapshot).and_then(|()| {
            // Rename to final path (atomic on most filesystems)
            fs::rename(&temp_path, &final_path).map_err(|e| {
                CommentTreeError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to rename temp file: {}", e),
                ))
            })
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        debug!("Saved snapshot {} to {:?}", reference, final_path);
        Ok(())
    }

    /// Load the snapshot of a commentable
    pub fn load(&self, commentable: &CommentableRef) -> Result<ThreadSnapshot> {
        let path = self.snapshot_path(commentable);
        if !path.exists() {
            return Err(CommentTreeError::CommentableNotFound(commentable.to_string()));
        }
        read_snapshot(&path)
    }

    /// List stored commentables with their comment counts
    pub fn list(&self) -> Result<Vec<(CommentableRef, usize)>> {
        let mut snapshots = Vec::new();

        let entries = fs::read_dir(&self.snapshots_dir).map_err(|e| {
            CommentTreeError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read snapshots directory: {}", e),
            ))
        })?;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();

            // Skip non-json files and temp files
            if !path.extension().map(|e| e == "json").unwrap_or(false) {
                continue;
            }
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
            {
                continue;
            }

            match read_snapshot(&path) {
                Ok(snapshot) => snapshots.push((snapshot.reference(), snapshot.comments.len())),
                Err(e) => {
                    warn!("Failed to read snapshot file {:?}: {}", path, e);
                }
            }
        }

        snapshots.sort_by_key(|(reference, _)| (reference.kind.as_str(), reference.id));
        Ok(snapshots)
    }

    /// Delete the snapshot of a commentable
    pub fn delete(&self, commentable: &CommentableRef) -> Result<()> {
        let path = self.snapshot_path(commentable);

        if !path.exists() {
            return Err(CommentTreeError::CommentableNotFound(commentable.to_string()));
        }

        fs::remove_file(&path).map_err(|e| {
            CommentTreeError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to delete snapshot file: {}", e),
            ))
        })?;

        debug!("Deleted snapshot {} from {:?}", commentable, path);
        Ok(())
    }

    pub fn exists(&self, commentable: &CommentableRef) -> bool {
        self.snapshot_path(commentable).exists()
    }

    /// Get base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get snapshots directory
    pub fn snapshots_dir(&self) -> &PathBuf {
        &self.snapshots_dir
    }
}

impl CommentSource for FileSystemStore {
    fn fetch_comments(&self, commentable: &CommentableRef) -> Result<Vec<Comment>> {
        Ok(self.load(commentable)?.comments)
    }

    fn fetch_commentable(&self, commentable: &CommentableRef) -> Result<Commentable> {
        Ok(self.load(commentable)?.commentable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ct_core::comment::CommentBuilder;
    use ct_core::config::Config;
    use ct_core::render::Disposition;
    use ct_core::service::CommentThreadService;
    use ct_core::tree::CommentOrder;
    use ct_core::types::{CommentId, UserId};
    use ct_core::viewer::ViewerContext;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_test_store() -> (FileSystemStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemStore::new(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    fn create_test_snapshot(id: u64) -> ThreadSnapshot {
        let article = CommentableRef::article(id);
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        ThreadSnapshot::new(
            Commentable::new(article, UserId(1)),
            vec![
                CommentBuilder::new(1, article).created_at(ts).build().unwrap(),
                CommentBuilder::new(2, article)
                    .parent(1)
                    .score(-1000)
                    .created_at(ts)
                    .build()
                    .unwrap(),
            ],
        )
    }

    #[test]
    fn test_store_creation() {
        let (store, _temp) = create_test_store();
        assert!(store.snapshots_dir().exists());
    }

    #[test]
    fn test_snapshot_path() {
        let (store, _temp) = create_test_store();
        let path = store.snapshot_path(&CommentableRef::article(7));
        assert!(path.ends_with("article-7.json"));
    }

    #[test]
    fn test_save_and_load() {
        let (store, _temp) = create_test_store();
        let snapshot = create_test_snapshot(1);

        store.save(&snapshot).unwrap();
        assert!(store.exists(&CommentableRef::article(1)));

        let loaded = store.load(&CommentableRef::article(1)).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_load_nonexistent() {
        let (store, _temp) = create_test_store();
        let result = store.load(&CommentableRef::article(99));
        assert!(matches!(result, Err(CommentTreeError::CommentableNotFound(_))));
    }

    #[test]
    fn test_list_snapshots() {
        let (store, _temp) = create_test_store();
        assert!(store.list().unwrap().is_empty());

        store.save(&create_test_snapshot(2)).unwrap();
        store.save(&create_test_snapshot(1)).unwrap();

        let list = store.list().unwrap();
        assert_eq!(
            list,
            vec![(CommentableRef::article(1), 2), (CommentableRef::article(2), 2)]
        );
    }

    #[test]
    fn test_delete_snapshot() {
        let (store, _temp) = create_test_store();
        store.save(&create_test_snapshot(1)).unwrap();

        store.delete(&CommentableRef::article(1)).unwrap();
        assert!(!store.exists(&CommentableRef::article(1)));
        assert!(store.delete(&CommentableRef::article(1)).is_err());
    }

    #[test]
    fn test_atomic_write() {
        let (store, _temp) = create_test_store();
        let snapshot = create_test_snapshot(1);
        store.save(&snapshot).unwrap();

        assert!(!store.temp_path(&snapshot.reference()).exists());

        let content = fs::read_to_string(store.snapshot_path(&snapshot.reference())).unwrap();
        assert!(content.contains("schema_version"));
        assert!(content.contains("\"kind\": \"article\""));
    }

    #[test]
    fn test_failed_save_removes_temp_file() {
        let (store, _temp) = create_test_store();
        let snapshot = create_test_snapshot(1);
        let final_path = store.snapshot_path(&snapshot.reference());
        fs::create_dir(&final_path).unwrap();
        fs::write(final_path.join("blocker"), "").unwrap();

        let result = store.save(&snapshot);

        assert!(matches!(result, Err(CommentTreeError::Io(_))));
        assert!(!store.temp_path(&snapshot.reference()).exists());
    }

    #[test]
    fn test_ignores_temp_and_non_json_files() {
        let (store, _temp) = create_test_store();
        fs::write(store.snapshots_dir().join(".article-1.json.tmp"), "{}").unwrap();
        fs::write(store.snapshots_dir().join("readme.txt"), "test").unwrap();
        fs::write(store.snapshots_dir().join("broken.json"), "not json").unwrap();

        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_read_snapshot_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = read_snapshot(&temp.path().join("missing.json"));
        assert!(matches!(result, Err(CommentTreeError::FileNotFound(_))));
    }

    #[test]
    fn test_store_as_comment_source() {
        let (store, _temp) = create_test_store();
        store.save(&create_test_snapshot(1)).unwrap();

        let service = CommentThreadService::new(&store, &Config::default());
        let view = service
            .render_commentable(
                &CommentableRef::article(1),
                &ViewerContext::user(3),
                None,
                CommentOrder::Top,
            )
            .unwrap();

        assert_eq!(view.plan.disposition_of(&CommentId(1)), Some(Disposition::Full));
        assert_eq!(view.plan.disposition_of(&CommentId(2)), Some(Disposition::Omit));
    }
}
