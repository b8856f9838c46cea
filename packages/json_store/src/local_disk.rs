use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use sectionfs_core_store::{Error, InMemorySection, Section, Value};

use crate::config::LocalSectionConfig;
use crate::debounce::DebounceTimer;
use crate::json_utils::{self, DATA_FILE};

const TEMP_DATA_FILE: &str = "data.json.tmp";

/// A section mirrored onto a directory of JSON documents.
///
/// Each section owns one directory. Its own key/value map lives in
/// `data.json` inside that directory, and each child section is a
/// subdirectory named exactly after the section, so section names must be
/// valid path segments.
///
/// Reads are served from an embedded `InMemorySection` loaded when the
/// section is opened. Mutations update that cache and then (re)start a
/// per-section debounce timer; when it fires the section writes its own
/// document, not its descendants'. `sync` writes the whole subtree
/// immediately, parents before children.
#[derive(Clone)]
pub struct JSONLocalSection {
    node: Arc<Node>,
}

struct Node {
    dir: PathBuf,
    config: LocalSectionConfig,
    cache: InMemorySection,
    sections: RwLock<HashMap<String, JSONLocalSection>>,
    timer: DebounceTimer,
    // Serializes this node's document writes against each other and against
    // deletion of its directory.
    flush_lock: Mutex<()>,
    dirty: AtomicBool,
    deleted: AtomicBool,
    writes: AtomicU64,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl JSONLocalSection {
    /// Open the section tree rooted at `dir` with the default configuration.
    ///
    /// See `open_with_config`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        Self::open_with_config(dir, LocalSectionConfig::default())
    }

    /// Open the section tree rooted at `dir`, creating the directory if needed.
    ///
    /// The whole existing tree is loaded synchronously: `data.json` fills this
    /// section's values and every subdirectory is opened as a child section.
    /// Other entries are ignored. Any I/O or decode failure aborts the open.
    pub fn open_with_config(
        dir: impl Into<PathBuf>,
        config: LocalSectionConfig,
    ) -> Result<Self, Error> {
        let dir = dir.into();
        log::debug!("Creating {}...", dir.display());
        fs::create_dir_all(&dir).map_err(|error| Error::io(&dir, error))?;

        let section = Self::unloaded(dir, config);
        section.load()?;
        Ok(section)
    }

    fn unloaded(dir: PathBuf, config: LocalSectionConfig) -> Self {
        let timer = DebounceTimer::new(config.flush_delay);
        JSONLocalSection {
            node: Arc::new(Node {
                dir,
                config,
                cache: InMemorySection::new(),
                sections: RwLock::new(HashMap::new()),
                timer,
                flush_lock: Mutex::new(()),
                dirty: AtomicBool::new(false),
                deleted: AtomicBool::new(false),
                writes: AtomicU64::new(0),
            }),
        }
    }

    /// The directory backing this section.
    pub fn dir(&self) -> &Path {
        &self.node.dir
    }

    pub fn config(&self) -> &LocalSectionConfig {
        &self.node.config
    }

    /// How many times this section's own `data.json` has been written since
    /// it was opened.
    pub fn write_count(&self) -> u64 {
        self.node.writes.load(Ordering::SeqCst)
    }

    /// Whether this section has mutations not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.node.dirty.load(Ordering::SeqCst)
    }

    /// Whether a debounced write of this section is waiting to fire.
    pub fn flush_pending(&self) -> bool {
        self.node.timer.is_pending()
    }

    /// Write this section's document and then, recursively, every child's,
    /// whether or not they are dirty.
    ///
    /// Pending debounced writes of the sections visited are cancelled. The
    /// first failure aborts the walk and is returned; files already written
    /// stay written.
    pub fn sync(&self) -> Result<(), Error> {
        self.node.timer.cancel();
        self.write_data()?;

        let children: Vec<JSONLocalSection> = read(&self.node.sections).values().cloned().collect();
        for child in children {
            child.sync()?;
        }

        Ok(())
    }

    /// Like `Section::section`, but reports a failure to create or load the
    /// child instead of logging it.
    pub fn try_section(&self, name: &str) -> Result<Self, Error> {
        if let Some(existing) = read(&self.node.sections).get(name) {
            return Ok(existing.clone());
        }

        let mut sections = write(&self.node.sections);
        if let Some(existing) = sections.get(name) {
            return Ok(existing.clone());
        }

        let child = Self::open_with_config(self.node.dir.join(name), self.node.config.clone())?;
        sections.insert(name.to_string(), child.clone());
        Ok(child)
    }

    /// Like `Section::section_delete`, but reports a failure to remove the
    /// child's directory tree instead of logging it.
    ///
    /// The child's own subsections are deleted first, then its directory,
    /// then its entry in this section. Nothing is debounced. If the directory
    /// cannot be removed the child keeps its entry and stays writable.
    pub fn try_section_delete(&self, name: &str) -> Result<bool, Error> {
        let Some(child) = read(&self.node.sections).get(name).cloned() else {
            return Ok(false);
        };

        child.delete_tree()?;

        let mut sections = write(&self.node.sections);
        if sections
            .get(name)
            .is_some_and(|current| current.same_node(&child))
        {
            sections.remove(name);
        }

        Ok(true)
    }

    fn delete_tree(&self) -> Result<(), Error> {
        for name in self.section_keys() {
            self.try_section_delete(&name)?;
        }

        let _flush = self
            .node
            .flush_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        log::debug!("Removing {}...", self.node.dir.display());
        match fs::remove_dir_all(&self.node.dir) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            // The node stays live and registered, so the next flush rewrites
            // whatever the partial removal took away.
            Err(error) => return Err(Error::io(&self.node.dir, error)),
        }

        self.node.timer.cancel();
        self.node.deleted.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self) -> Result<(), Error> {
        let dir = &self.node.dir;
        let mut sections = write(&self.node.sections);

        for entry in walkdir::WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|error| {
                let path = error.path().unwrap_or(dir).to_path_buf();
                let error = error
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("filesystem loop"));
                Error::io(path, error)
            })?;

            let file_type = entry.file_type();
            if file_type.is_dir() {
                let name = entry.file_name().to_str().ok_or_else(|| {
                    Error::decode(entry.path(), "section directory name is not valid UTF-8")
                })?;
                let child = Self::open_with_config(entry.path(), self.node.config.clone())?;
                sections.insert(name.to_string(), child);
            } else if file_type.is_file() && entry.file_name() == DATA_FILE {
                log::debug!("Reading {}...", entry.path().display());
                let bytes = fs::read(entry.path()).map_err(|error| Error::io(entry.path(), error))?;
                for (key, value) in json_utils::decode_document(&bytes, entry.path())? {
                    self.node.cache.set_value(&key, value);
                }
            }
        }

        Ok(())
    }

    fn mark_dirty(&self) {
        self.node.dirty.store(true, Ordering::SeqCst);

        let section = self.clone();
        self.node.timer.arm(move || section.flush_from_timer());
        log::trace!("Scheduled flush of {}", self.node.dir.display());
    }

    fn flush_from_timer(&self) {
        if let Err(error) = self.write_data() {
            log::error!(
                "Debounced flush of {} failed: {}",
                self.node.dir.display(),
                error
            );
        }
    }

    /// Write this section's own key/value map to `data.json`.
    fn write_data(&self) -> Result<(), Error> {
        let _flush = self
            .node
            .flush_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.node.deleted.load(Ordering::SeqCst) {
            return Ok(());
        }

        // Cleared before the snapshot so a concurrent mutation re-marks it.
        self.node.dirty.store(false, Ordering::SeqCst);

        let result = self.persist_snapshot();
        if result.is_err() {
            self.node.dirty.store(true, Ordering::SeqCst);
        }
        result
    }

    fn persist_snapshot(&self) -> Result<(), Error> {
        let data_path = self.node.dir.join(DATA_FILE);
        let temp_path = self.node.dir.join(TEMP_DATA_FILE);

        let bytes = json_utils::encode_document(self.node.cache.entries(), &data_path)?;

        log::debug!("Writing {}...", data_path.display());
        let mut f = fs::File::create(&temp_path).map_err(|error| Error::io(&temp_path, error))?;
        f.write_all(&bytes)
            .and_then(|()| f.sync_all())
            .map_err(|error| Error::io(&temp_path, error))?;
        fs::rename(&temp_path, &data_path).map_err(|error| Error::io(&data_path, error))?;

        self.node.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl std::fmt::Debug for JSONLocalSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JSONLocalSection")
            .field("dir", &self.node.dir)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

impl Section for JSONLocalSection {
    fn keys(&self) -> Vec<String> {
        self.node.cache.keys()
    }

    fn exists(&self, key: &str) -> bool {
        self.node.cache.exists(key)
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.node.cache.get(key)
    }

    fn set_value(&self, key: &str, value: Value) {
        self.node.cache.set_value(key, value);
        self.mark_dirty();
    }

    fn delete(&self, key: &str) -> bool {
        let existed = self.node.cache.delete(key);
        if existed {
            self.mark_dirty();
        }
        existed
    }

    fn section(&self, name: &str) -> Self {
        match self.try_section(name) {
            Ok(child) => child,
            Err(error) => {
                log::error!(
                    "Failed to open section {:?} under {}: {}",
                    name,
                    self.node.dir.display(),
                    error
                );
                // Keep the child in memory; its next flush reports the
                // missing directory.
                write(&self.node.sections)
                    .entry(name.to_string())
                    .or_insert_with(|| {
                        Self::unloaded(self.node.dir.join(name), self.node.config.clone())
                    })
                    .clone()
            }
        }
    }

    fn section_keys(&self) -> Vec<String> {
        read(&self.node.sections).keys().cloned().collect()
    }

    fn section_exists(&self, name: &str) -> bool {
        read(&self.node.sections).contains_key(name)
    }

    fn section_delete(&self, name: &str) -> bool {
        match self.try_section_delete(name) {
            Ok(existed) => existed,
            Err(error) => {
                log::error!(
                    "Failed to delete section {:?} under {}: {}",
                    name,
                    self.node.dir.display(),
                    error
                );
                false
            }
        }
    }

    fn same_node(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectionfs_core_store::section;
    use std::time::Duration;

    fn quiet_config() -> LocalSectionConfig {
        LocalSectionConfig::default().with_flush_delay(Duration::from_secs(60))
    }

    #[test]
    fn open_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("root");

        let section = JSONLocalSection::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(section.dir(), root.as_path());
        assert!(section.keys().is_empty());
        assert!(!section.is_dirty());
    }

    #[test]
    fn navigation_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = JSONLocalSection::open_with_config(dir.path(), quiet_config()).unwrap();

        let leaf = section!(root, "a", "b");
        assert!(dir.path().join("a").join("b").is_dir());
        assert_eq!(leaf.dir(), dir.path().join("a").join("b").as_path());
        assert!(root.section("a").section("b").same_node(&leaf));
    }

    #[test]
    fn children_inherit_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = JSONLocalSection::open_with_config(dir.path(), quiet_config()).unwrap();
        assert_eq!(root.section("child").config(), &quiet_config());
    }

    #[test]
    fn set_marks_dirty_and_sync_cleans() {
        let dir = tempfile::tempdir().unwrap();
        let root = JSONLocalSection::open_with_config(dir.path(), quiet_config()).unwrap();

        root.set("k", &1).unwrap();
        assert!(root.is_dirty());
        assert!(root.flush_pending());
        assert!(!dir.path().join(DATA_FILE).exists());

        root.sync().unwrap();
        assert!(!root.is_dirty());
        assert!(!root.flush_pending());
        assert_eq!(root.write_count(), 1);
        assert!(dir.path().join(DATA_FILE).is_file());
        assert!(!dir.path().join(TEMP_DATA_FILE).exists());
    }

    #[test]
    fn deleting_missing_key_does_not_mark_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let root = JSONLocalSection::open_with_config(dir.path(), quiet_config()).unwrap();

        assert!(!root.delete("missing"));
        assert!(!root.is_dirty());
        assert!(!root.flush_pending());
    }

    #[test]
    fn unsupported_set_does_not_mark_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let root = JSONLocalSection::open_with_config(dir.path(), quiet_config()).unwrap();

        assert!(root.set("k", &()).is_err());
        assert!(!root.is_dirty());
    }

    #[test]
    fn section_delete_removes_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = JSONLocalSection::open_with_config(dir.path(), quiet_config()).unwrap();

        section!(root, "x", "y").set("k", "v").unwrap();
        root.sync().unwrap();
        assert!(dir.path().join("x").join("y").join(DATA_FILE).is_file());

        assert!(root.section_delete("x"));
        assert!(!dir.path().join("x").exists());
        assert!(!root.section_exists("x"));
        assert!(!root.section_delete("x"));
    }

    #[test]
    fn deleted_section_never_writes_again() {
        let dir = tempfile::tempdir().unwrap();
        let root = JSONLocalSection::open_with_config(dir.path(), quiet_config()).unwrap();

        let child = root.section("gone");
        assert!(root.section_delete("gone"));

        child.set("late", &true).unwrap();
        child.sync().unwrap();

        assert!(!dir.path().join("gone").exists());
        assert_eq!(child.write_count(), 0);
    }

    #[test]
    fn failed_delete_leaves_section_live() {
        let dir = tempfile::tempdir().unwrap();
        let root = JSONLocalSection::open_with_config(dir.path(), quiet_config()).unwrap();

        let child = root.section("child");
        child.set("k", &1).unwrap();
        root.sync().unwrap();

        // A regular file where the child's directory was.
        let child_dir = dir.path().join("child");
        fs::remove_dir_all(&child_dir).unwrap();
        fs::write(&child_dir, "").unwrap();

        assert!(matches!(
            root.try_section_delete("child"),
            Err(Error::Io { .. })
        ));
        assert!(root.section_exists("child"));
        assert!(!root.section_delete("child"));
        assert!(root.section_exists("child"));
        assert!(root.sync().is_err());

        fs::remove_file(&child_dir).unwrap();
        fs::create_dir(&child_dir).unwrap();

        let again = root.section("child");
        assert!(again.same_node(&child));
        again.set("k", &2).unwrap();
        root.sync().unwrap();

        assert_eq!(child.write_count(), 2);
        let reopened = JSONLocalSection::open(dir.path()).unwrap();
        assert_eq!(reopened.section("child").int("k", None), (2, true));

        assert!(root.section_delete("child"));
        assert!(!child_dir.exists());
    }

    #[test]
    fn load_ignores_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "not a section").unwrap();
        fs::write(dir.path().join(TEMP_DATA_FILE), "{ half written").unwrap();

        let root = JSONLocalSection::open(dir.path()).unwrap();
        assert!(root.keys().is_empty());
        assert!(root.section_keys().is_empty());
    }

    #[test]
    fn sync_fails_when_directory_vanished() {
        let dir = tempfile::tempdir().unwrap();
        let root = JSONLocalSection::open_with_config(dir.path(), quiet_config()).unwrap();

        let child = root.section("child");
        child.set("k", &1).unwrap();
        fs::remove_dir_all(dir.path().join("child")).unwrap();

        let err = root.sync().unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(child.is_dirty());
        // The flush never recreates a directory it did not create.
        assert!(!dir.path().join("child").exists());
    }

    #[test]
    fn try_section_reports_creation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let root = JSONLocalSection::open_with_config(dir.path(), quiet_config()).unwrap();

        // A regular file where the child directory would go.
        fs::write(dir.path().join("blocked"), "").unwrap();

        assert!(matches!(
            root.try_section("blocked"),
            Err(Error::Io { .. })
        ));
        assert!(!root.section_exists("blocked"));

        // The infallible navigation still hands back a usable in-memory child.
        let child = root.section("blocked");
        child.set("k", &1).unwrap();
        assert_eq!(child.int("k", None), (1, true));
        assert!(child.sync().is_err());
    }
}
