//! Output directory handling
//!
//! Generated files go through an [`OutputStore`] so the batch can run against the
//! real filesystem ([`FsStore`]) or an in-memory one ([`MemoryStore`]).

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while preparing the output directory
#[derive(Debug, Error)]
pub enum OutputError {
    /// The directory could not be created, listed or cleaned
    #[error("output directory '{}' is not writable: {source}", dir.display())]
    Unwritable {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Filesystem operations needed by a batch run
pub trait OutputStore {
    /// Create `dir` and any missing parents. Succeeds if it already exists.
    fn create_dir_all(&mut self, dir: &Path) -> io::Result<()>;

    /// Names of the non-directory entries directly inside `dir`
    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>>;

    fn remove_file(&mut self, path: &Path) -> io::Result<()>;

    /// Create or replace the file at `path`
    fn write_file(&mut self, path: &Path, contents: &str) -> io::Result<()>;
}

/// [`OutputStore`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

impl OutputStore for FsStore {
    fn create_dir_all(&mut self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            // Symlinks are listed as they are; removing one never touches its target
            if entry.file_type()?.is_dir() {
                continue;
            }
            // Names that are not UTF-8 can never match a generated file
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn remove_file(&mut self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn write_file(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }
}

/// In-memory [`OutputStore`]
///
/// Supports a read-only mode and per-file write failures for exercising error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, String>,
    failing: BTreeSet<PathBuf>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing file, creating its parent directories
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.insert_dirs(parent);
        }
        self.files.insert(path, contents.into());
        self
    }

    /// Add an existing directory
    pub fn with_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.insert_dirs(dir.as_ref());
        self
    }

    /// Reject every modification
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Make writes to `path` fail
    pub fn fail_writes_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    /// Contents of the file at `path`
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn has_dir(&self, dir: impl AsRef<Path>) -> bool {
        self.dirs.contains(dir.as_ref())
    }

    fn insert_dirs(&mut self, dir: &Path) {
        for ancestor in dir.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn check_writable(&self, path: &Path) -> io::Result<()> {
        if self.read_only {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("read-only store: {}", path.display()),
            ));
        }
        Ok(())
    }
}

impl OutputStore for MemoryStore {
    fn create_dir_all(&mut self, dir: &Path) -> io::Result<()> {
        if self.dirs.contains(dir) {
            return Ok(());
        }
        self.check_writable(dir)?;
        self.insert_dirs(dir);
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        if !self.dirs.contains(dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", dir.display()),
            ));
        }
        Ok(self
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
            .collect())
    }

    fn remove_file(&mut self, path: &Path) -> io::Result<()> {
        self.check_writable(path)?;
        match self.files.remove(path) {
            Some(_) => Ok(()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )),
        }
    }

    fn write_file(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        self.check_writable(path)?;
        if self.failing.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("write rejected: {}", path.display()),
            ));
        }
        let parent_exists = path.parent().map_or(false, |parent| self.dirs.contains(parent));
        if !parent_exists {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory for {}", path.display()),
            ));
        }
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

/// True when `name` names an entry directly inside a directory
///
/// Rejects empty names, `.`, `..`, absolute paths and anything with a `/` or `\\`.
pub fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Ensure `dir` exists and delete every file in it ending in `.<suffix>`
///
/// Listing happens before any deletion. Other files and all subdirectories are
/// left alone. Returns the names of the removed files.
pub fn prepare<S: OutputStore + ?Sized>(
    store: &mut S,
    dir: &Path,
    suffix: &str,
) -> Result<Vec<String>, OutputError> {
    let unwritable = |source| OutputError::Unwritable {
        dir: dir.to_path_buf(),
        source,
    };

    store.create_dir_all(dir).map_err(unwritable)?;
    tracing::info!("Output directory '{}' ensured", dir.display());

    let ending = format!(".{}", suffix);
    let stale: Vec<String> = store
        .list_files(dir)
        .map_err(unwritable)?
        .into_iter()
        .filter(|name| name.ends_with(&ending))
        .collect();

    for name in &stale {
        tracing::info!("Removing old file: {}", name);
        store.remove_file(&dir.join(name)).map_err(unwritable)?;
    }

    Ok(stale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_creates_missing_dir() {
        let mut store = MemoryStore::new();
        let removed = prepare(&mut store, Path::new("resource/map"), "tres").expect("Should prepare");
        assert!(removed.is_empty());
        assert!(store.has_dir("resource/map"));
        assert!(store.has_dir("resource"));
    }

    #[test]
    fn test_prepare_removes_only_matching_files() {
        let mut store = MemoryStore::new()
            .with_file("out/old.tres", "stale")
            .with_file("out/keep.png", "image")
            .with_file("out/notes.tres.bak", "backup")
            .with_file("out/nested/deep.tres", "nested");

        let removed = prepare(&mut store, Path::new("out"), "tres").expect("Should prepare");

        assert_eq!(removed, vec!["old.tres".to_string()]);
        assert_eq!(store.file("out/old.tres"), None);
        assert_eq!(store.file("out/keep.png"), Some("image"));
        assert_eq!(store.file("out/notes.tres.bak"), Some("backup"));
        assert_eq!(store.file("out/nested/deep.tres"), Some("nested"));
    }

    #[test]
    fn test_prepare_existing_dir_read_only_without_stale_files() {
        let mut store = MemoryStore::new().with_dir("out").read_only();
        let removed = prepare(&mut store, Path::new("out"), "tres").expect("Nothing to change");
        assert!(removed.is_empty());
    }

    #[test]
    fn test_prepare_unwritable_create() {
        let mut store = MemoryStore::new().read_only();
        let err = prepare(&mut store, Path::new("out"), "tres").unwrap_err();
        let OutputError::Unwritable { dir, source } = err;
        assert_eq!(dir, PathBuf::from("out"));
        assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_prepare_unwritable_delete() {
        let mut store = MemoryStore::new().with_file("out/old.tres", "stale").read_only();
        let result = prepare(&mut store, Path::new("out"), "tres");
        assert!(matches!(result, Err(OutputError::Unwritable { .. })));
        assert_eq!(store.file("out/old.tres"), Some("stale"));
    }

    #[test]
    fn test_memory_store_write_failures() {
        let mut store = MemoryStore::new().with_dir("out").fail_writes_to("out/bad.tres");
        assert!(store.write_file(Path::new("out/bad.tres"), "x").is_err());
        assert!(store.write_file(Path::new("missing/a.tres"), "x").is_err());
        store.write_file(Path::new("out/good.tres"), "x").expect("Should write");
        assert_eq!(store.file("out/good.tres"), Some("x"));
    }

    #[test]
    fn test_is_plain_file_name() {
        assert!(is_plain_file_name("grass_01"));
        assert!(is_plain_file_name(".hidden"));
        assert!(is_plain_file_name("a..b"));

        for name in ["", ".", "..", "../x", "/x", "a/b", "a\\b", "C:\\x"] {
            assert!(!is_plain_file_name(name), "{:?} should be rejected", name);
        }
    }

    #[test]
    fn test_fs_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("atlas-tres-{}", uuid::Uuid::new_v4().simple()));
        let mut store = FsStore::new();

        store.create_dir_all(&dir.join("sub")).expect("Should create");
        store.write_file(&dir.join("b.tres"), "b").expect("Should write");
        store.write_file(&dir.join("a.txt"), "a").expect("Should write");

        assert_eq!(
            store.list_files(&dir).expect("Should list"),
            vec!["a.txt".to_string(), "b.tres".to_string()]
        );

        let removed = prepare(&mut store, &dir, "tres").expect("Should prepare");
        assert_eq!(removed, vec!["b.tres".to_string()]);
        assert!(!dir.join("b.tres").exists());
        assert!(dir.join("a.txt").exists());
        assert!(dir.join("sub").is_dir());

        fs::remove_dir_all(&dir).ok();
    }

    #[cfg(unix)]
    #[test]
    fn test_prepare_removes_stale_symlinks() {
        let dir = std::env::temp_dir().join(format!("atlas-tres-{}", uuid::Uuid::new_v4().simple()));
        let target = dir.join("target.txt");
        let mut store = FsStore::new();

        store.create_dir_all(&dir).expect("Should create");
        store.write_file(&target, "kept").expect("Should write");
        std::os::unix::fs::symlink(&target, dir.join("link.tres")).expect("Should link");
        std::os::unix::fs::symlink(dir.join("gone.txt"), dir.join("dangling.tres"))
            .expect("Should link");

        let removed = prepare(&mut store, &dir, "tres").expect("Should prepare");
        assert_eq!(removed, vec!["dangling.tres".to_string(), "link.tres".to_string()]);
        assert!(fs::symlink_metadata(dir.join("link.tres")).is_err());
        assert_eq!(fs::read_to_string(&target).expect("Target survives"), "kept");

        fs::remove_dir_all(&dir).ok();
    }
}
