//! The stateful filesystem service.
//!
//! An [`FsContext`] owns the dialect configuration, an optional fixed
//! current-working-directory override and behavioral flags, and exposes the
//! path algebra plus the real I/O operations. Every physical read or write
//! is indirected through the definitive-path hooks of the installed
//! [`PathResolver`], so a real filesystem and an arbitrarily overlaid
//! virtual one share identical client code.
//!
//! Exactly one process-wide *default* context exists, created lazily on
//! first use; every entity constructed without an explicit context shares
//! it. Mutating a context's settings affects all entities bound to it from
//! that point forward — there is no snapshotting.

use std::fs;
use std::path::{MAIN_SEPARATOR, PathBuf};
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use log::{debug, trace};

use crate::core::{IdentityResolver, PathResolver, PathSpec, Result};
use crate::dialect::Dialect;
use crate::entity::{DirEntity, FileEntity, Node, PathEntity};
use crate::error::FsError;
use crate::visit::{VisitSpec, Visitor};

static DEFAULT_CONTEXT: OnceLock<Arc<FsContext>> = OnceLock::new();

/// The process-wide default context, created lazily on first access and
/// shared by every entity that does not carry an explicit context.
pub fn default_context() -> Arc<FsContext> {
    DEFAULT_CONTEXT
        .get_or_init(|| Arc::new(FsContext::new()))
        .clone()
}

/// How [`FsContext::open_file`] opens its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    /// Create or truncate, then write.
    Write,
    /// Create if absent, then write at the end.
    Append,
}

/// Classification of a stat'ed location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// Raw OS metadata plus derived access flags.
///
/// `readable`/`writable`/`executable` are derived from the POSIX mode bits
/// (owner bits when the entry belongs to the effective user, "other" bits
/// otherwise); `owned` tells which set applied. On non-unix targets the mode
/// is zero and the flags fall back to the read-only attribute.
#[derive(Debug, Clone)]
pub struct Stat {
    pub size: u64,
    pub modified: SystemTime,
    pub mode: u32,
    pub kind: EntryKind,
    pub readable: bool,
    pub writable: bool,
    pub executable: bool,
    pub owned: bool,
}

impl Stat {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

#[derive(Debug)]
struct ContextState {
    dialect: Dialect,
    cwd: Option<String>,
    list_all_entries: bool,
    resolver: Arc<dyn PathResolver>,
}

/// The filesystem context: dialect configuration, cwd override, behavioral
/// flags and the definitive-path resolver.
///
/// Settings live behind an internal `RwLock`, so sharing a context across
/// threads is sound; *semantic* races between concurrent mutators remain
/// the caller's concern. Prefer a private context per thread when settings
/// are mutated at all. All calls are synchronous and blocking; bounded
/// operations close their handles before returning, only `open_file` and
/// `open_directory` hand a live handle to the caller.
#[derive(Debug)]
pub struct FsContext {
    state: RwLock<ContextState>,
}

impl FsContext {
    /// A context speaking the host dialect, resolving the cwd dynamically
    /// from the OS, with the identity resolver.
    pub fn new() -> Self {
        Self::with_dialect(Dialect::host())
    }

    pub fn with_dialect(dialect: Dialect) -> Self {
        FsContext {
            state: RwLock::new(ContextState {
                dialect,
                cwd: None,
                list_all_entries: false,
                resolver: Arc::new(IdentityResolver),
            }),
        }
    }

    fn state(&self) -> RwLockReadGuard<'_, ContextState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, ContextState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn dialect(&self) -> Dialect {
        self.state().dialect.clone()
    }

    pub fn set_dialect(&self, dialect: Dialect) {
        self.state_mut().dialect = dialect;
    }

    pub fn list_all_entries(&self) -> bool {
        self.state().list_all_entries
    }

    /// When set, `read_directory` reports the dotted current/parent entries
    /// even without `include_dotted`.
    pub fn set_list_all_entries(&self, list_all: bool) {
        self.state_mut().list_all_entries = list_all;
    }

    /// Replaces the definitive-path resolver. This is the single seam a
    /// virtual filesystem plugs into.
    pub fn set_resolver(&self, resolver: Arc<dyn PathResolver>) {
        self.state_mut().resolver = resolver;
    }

    fn resolver(&self) -> Arc<dyn PathResolver> {
        self.state().resolver.clone()
    }

    /// Fixes the current working directory. Until cleared, `cwd()` returns
    /// this value instead of querying the OS.
    pub fn set_cwd(&self, spec: impl Into<PathSpec>) {
        let cwd = {
            let dialect = self.dialect();
            dialect.collapse_directory(&dialect.join_directory(spec))
        };
        self.state_mut().cwd = Some(cwd);
    }

    /// Drops the fixed cwd; `cwd()` queries the OS again.
    pub fn clear_cwd(&self) {
        self.state_mut().cwd = None;
    }

    /// The current working directory, canonicalized to dialect convention.
    pub fn cwd(&self) -> Result<String> {
        if let Some(cwd) = self.state().cwd.clone() {
            return Ok(cwd);
        }
        let dialect = self.dialect();
        let native = std::env::current_dir().map_err(|source| FsError::StatFailed {
            path: dialect.current_token().to_string(),
            source,
        })?;
        Ok(self.from_native(&native))
    }

    /// Joins a path spec into a canonical dialect string.
    pub fn join(&self, spec: impl Into<PathSpec>) -> String {
        self.dialect().join_directory(spec)
    }

    /// The conceptual fully-qualified form of `spec`: unchanged if already
    /// absolute, else joined onto the cwd.
    pub fn absolute(&self, spec: impl Into<PathSpec>) -> Result<String> {
        let dialect = self.dialect();
        let path = dialect.join_directory(spec);
        if dialect.is_absolute(&path) {
            return Ok(path);
        }
        Ok(dialect.absolute(&path, &self.cwd()?))
    }

    /// `spec` expressed relative to the cwd.
    pub fn relative(&self, spec: impl Into<PathSpec>) -> Result<String> {
        let dialect = self.dialect();
        let path = dialect.join_directory(spec);
        Ok(dialect.relative(&path, &self.cwd()?))
    }

    /// The concrete location used for reads, after any virtual remapping.
    pub fn definitive_read(&self, spec: impl Into<PathSpec>) -> Result<String> {
        let absolute = self.absolute(spec)?;
        let definitive = self
            .resolver()
            .definitive_read(&absolute, &self.dialect())?;
        trace!("definitive_read: {absolute} -> {definitive}");
        Ok(definitive)
    }

    /// The concrete location used for writes, after any virtual remapping.
    pub fn definitive_write(&self, spec: impl Into<PathSpec>) -> Result<String> {
        let absolute = self.absolute(spec)?;
        let definitive = self
            .resolver()
            .definitive_write(&absolute, &self.dialect())?;
        trace!("definitive_write: {absolute} -> {definitive}");
        Ok(definitive)
    }

    /// Shorthand for [`definitive_write`](FsContext::definitive_write).
    pub fn definitive(&self, spec: impl Into<PathSpec>) -> Result<String> {
        self.definitive_write(spec)
    }

    /// Converts a dialect path into the host-native form handed to the OS.
    pub fn to_native(&self, path: &str) -> PathBuf {
        let sep = self
            .dialect()
            .separator()
            .chars()
            .next()
            .unwrap_or(MAIN_SEPARATOR);
        if sep == MAIN_SEPARATOR {
            PathBuf::from(path)
        } else {
            PathBuf::from(path.replace(sep, &MAIN_SEPARATOR.to_string()))
        }
    }

    fn from_native(&self, path: &std::path::Path) -> String {
        let dialect = self.dialect();
        let sep = dialect.separator().chars().next().unwrap_or(MAIN_SEPARATOR);
        let raw = path.to_string_lossy();
        let translated = if sep == MAIN_SEPARATOR {
            raw.into_owned()
        } else {
            raw.replace(MAIN_SEPARATOR, &sep.to_string())
        };
        dialect.canonical(&translated)
    }

    fn read_target(&self, spec: impl Into<PathSpec>) -> Result<(String, PathBuf)> {
        let definitive = self.definitive_read(spec)?;
        let native = self.to_native(&definitive);
        Ok((definitive, native))
    }

    fn write_target(&self, spec: impl Into<PathSpec>) -> Result<(String, PathBuf)> {
        let definitive = self.definitive_write(spec)?;
        let native = self.to_native(&definitive);
        Ok((definitive, native))
    }

    // ---- entity constructors ----------------------------------------------

    /// A generic path flyweight bound to this context.
    pub fn path(self: &Arc<Self>, spec: impl Into<PathSpec>) -> PathEntity {
        PathEntity::with_context(Arc::clone(self), spec)
    }

    /// A file flyweight bound to this context.
    pub fn file(self: &Arc<Self>, spec: impl Into<PathSpec>) -> FileEntity {
        FileEntity::with_context(Arc::clone(self), spec)
    }

    /// A directory flyweight bound to this context. An empty spec defaults
    /// to the current working directory.
    pub fn directory(self: &Arc<Self>, spec: impl Into<PathSpec>) -> DirEntity {
        DirEntity::with_context(Arc::clone(self), spec)
    }

    /// The directory entity at the dialect root.
    pub fn root(self: &Arc<Self>) -> DirEntity {
        let dialect = self.dialect();
        self.directory(dialect.root_token())
    }

    // ---- file operations --------------------------------------------------

    /// True if the definitive location exists, whatever it is.
    pub fn path_exists(&self, spec: impl Into<PathSpec>) -> Result<bool> {
        let (_, native) = self.read_target(spec)?;
        Ok(fs::metadata(&native).is_ok())
    }

    pub fn file_exists(&self, spec: impl Into<PathSpec>) -> Result<bool> {
        let (_, native) = self.read_target(spec)?;
        Ok(fs::metadata(&native).map(|m| m.is_file()).unwrap_or(false))
    }

    pub fn directory_exists(&self, spec: impl Into<PathSpec>) -> Result<bool> {
        let (_, native) = self.read_target(spec)?;
        Ok(fs::metadata(&native).map(|m| m.is_dir()).unwrap_or(false))
    }

    /// Stats the definitive read location. Fails with `StatFailed` when the
    /// target is unknown to the OS.
    pub fn stat_path(&self, spec: impl Into<PathSpec>) -> Result<Stat> {
        let (definitive, native) = self.read_target(spec)?;
        let meta = fs::metadata(&native).map_err(|source| FsError::StatFailed {
            path: definitive.clone(),
            source,
        })?;
        let modified = meta.modified().map_err(|source| FsError::StatFailed {
            path: definitive,
            source,
        })?;
        let kind = if meta.is_file() {
            EntryKind::File
        } else if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        };
        let (mode, readable, writable, executable, owned) = access_flags(&meta);
        Ok(Stat {
            size: meta.len(),
            modified,
            mode,
            kind,
            readable,
            writable,
            executable,
            owned,
        })
    }

    /// Creates the file if absent; a no-op when it already exists.
    pub fn create_file(&self, spec: impl Into<PathSpec>) -> Result<()> {
        let (definitive, native) = self.write_target(spec)?;
        debug!("create_file: {definitive}");
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&native)
            .map_err(|source| FsError::CreateFailed {
                path: definitive,
                source,
            })?;
        Ok(())
    }

    /// Creates the file if absent, else bumps its modification time.
    pub fn touch_file(&self, spec: impl Into<PathSpec>) -> Result<()> {
        let (definitive, native) = self.write_target(spec)?;
        debug!("touch_file: {definitive}");
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&native)
            .map_err(|source| FsError::CreateFailed {
                path: definitive.clone(),
                source,
            })?;
        file.set_modified(SystemTime::now())
            .map_err(|source| FsError::CreateFailed {
                path: definitive,
                source,
            })?;
        Ok(())
    }

    /// Deletes a file; fails with `DeleteFailed` carrying the OS error,
    /// never a silent success.
    pub fn delete_file(&self, spec: impl Into<PathSpec>) -> Result<()> {
        let (definitive, native) = self.write_target(spec)?;
        debug!("delete_file: {definitive}");
        fs::remove_file(&native).map_err(|source| FsError::DeleteFailed {
            path: definitive,
            source,
        })
    }

    /// Opens a live file handle; the caller owns its lifecycle. `Read`
    /// resolves through `definitive_read`, `Write`/`Append` through
    /// `definitive_write`.
    pub fn open_file(&self, spec: impl Into<PathSpec>, mode: OpenMode) -> Result<fs::File> {
        let (definitive, native) = match mode {
            OpenMode::Read => self.read_target(spec)?,
            OpenMode::Write | OpenMode::Append => self.write_target(spec)?,
        };
        let mut options = fs::OpenOptions::new();
        match mode {
            OpenMode::Read => options.read(true),
            OpenMode::Write => options.write(true).create(true).truncate(true),
            OpenMode::Append => options.append(true).create(true),
        };
        options.open(&native).map_err(|source| FsError::OpenFailed {
            path: definitive,
            source,
        })
    }

    /// Reads the whole file into a byte vector.
    pub fn read_file(&self, spec: impl Into<PathSpec>) -> Result<Vec<u8>> {
        let (definitive, native) = self.read_target(spec)?;
        fs::read(&native).map_err(|source| FsError::OpenFailed {
            path: definitive,
            source,
        })
    }

    /// Replaces the file's contents, creating it if absent.
    pub fn write_file(&self, spec: impl Into<PathSpec>, content: &[u8]) -> Result<()> {
        let (definitive, native) = self.write_target(spec)?;
        debug!("write_file: {definitive} ({} bytes)", content.len());
        fs::write(&native, content).map_err(|source| FsError::OpenFailed {
            path: definitive,
            source,
        })
    }

    /// Appends to the file, creating it if absent. The handle is closed
    /// before returning, error path included.
    pub fn append_file(&self, spec: impl Into<PathSpec>, content: &[u8]) -> Result<()> {
        use std::io::Write;
        let (definitive, native) = self.write_target(spec)?;
        debug!("append_file: {definitive} ({} bytes)", content.len());
        let mut file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&native)
            .map_err(|source| FsError::OpenFailed {
                path: definitive.clone(),
                source,
            })?;
        file.write_all(content).map_err(|source| FsError::OpenFailed {
            path: definitive,
            source,
        })
    }

    // ---- directory operations ---------------------------------------------

    /// Creates the directory and all its parents (mkdir -p semantics).
    pub fn create_directory(&self, spec: impl Into<PathSpec>) -> Result<()> {
        let (definitive, native) = self.write_target(spec)?;
        debug!("create_directory: {definitive}");
        fs::create_dir_all(&native).map_err(|source| FsError::CreateFailed {
            path: definitive,
            source,
        })
    }

    /// Removes the directory and everything below it.
    pub fn delete_directory(&self, spec: impl Into<PathSpec>) -> Result<()> {
        let (definitive, native) = self.write_target(spec)?;
        debug!("delete_directory: {definitive}");
        fs::remove_dir_all(&native).map_err(|source| FsError::DeleteFailed {
            path: definitive,
            source,
        })
    }

    /// Opens a live directory listing handle; the caller owns its lifecycle.
    pub fn open_directory(&self, spec: impl Into<PathSpec>) -> Result<fs::ReadDir> {
        let (definitive, native) = self.read_target(spec)?;
        fs::read_dir(&native).map_err(|source| FsError::OpenFailed {
            path: definitive,
            source,
        })
    }

    fn plain_directory_names(&self, spec: impl Into<PathSpec>) -> Result<Vec<String>> {
        let (definitive, native) = self.read_target(spec)?;
        let mut names = Vec::new();
        let entries = fs::read_dir(&native).map_err(|source| FsError::OpenFailed {
            path: definitive.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| FsError::OpenFailed {
                path: definitive.clone(),
                source,
            })?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn prepend_dotted(&self, names: &mut Vec<String>) {
        let dialect = self.dialect();
        names.insert(0, dialect.parent_token().to_string());
        names.insert(0, dialect.current_token().to_string());
    }

    /// Lists raw entry names, sorted. The dotted current/parent entries are
    /// reported only when `include_dotted` or the context's
    /// `list_all_entries` flag asks for them.
    pub fn read_directory(
        &self,
        spec: impl Into<PathSpec>,
        include_dotted: bool,
    ) -> Result<Vec<String>> {
        let mut names = self.plain_directory_names(spec)?;
        if include_dotted || self.list_all_entries() {
            self.prepend_dotted(&mut names);
        }
        Ok(names)
    }

    /// Looks up `name` under `spec` and classifies it by a runtime stat
    /// into a file, directory or generic path entity. A child the OS cannot
    /// stat classifies as a generic path: it may not exist yet, or be
    /// neither file nor directory.
    pub fn directory_child(
        self: &Arc<Self>,
        spec: impl Into<PathSpec>,
        name: &str,
    ) -> Result<Node> {
        let dialect = self.dialect();
        let parent = self.absolute(spec)?;
        let child = dialect.collapse_directory(&dialect.merge_paths(&parent, name)?);
        let node = match self.stat_path(child.as_str()) {
            Ok(stat) => match stat.kind {
                EntryKind::File => Node::File(self.file(child)),
                EntryKind::Directory => Node::Directory(self.directory(child)),
                EntryKind::Other => Node::Other(self.path(child)),
            },
            Err(_) => Node::Other(self.path(child)),
        };
        Ok(node)
    }

    /// Lists and classifies every child of the directory.
    ///
    /// Dotted current/parent entries appear only when `include_dotted` asks
    /// for them explicitly; the context's `list_all_entries` flag governs
    /// raw [`read_directory`](FsContext::read_directory) output, not
    /// classified child enumeration, so traversal never re-enters the
    /// directory through its own dotted entries.
    pub fn directory_children(
        self: &Arc<Self>,
        spec: impl Into<PathSpec>,
        include_dotted: bool,
    ) -> Result<Vec<Node>> {
        let parent = self.absolute(spec)?;
        let mut names = self.plain_directory_names(parent.as_str())?;
        if include_dotted {
            self.prepend_dotted(&mut names);
        }
        let mut children = Vec::with_capacity(names.len());
        for name in &names {
            children.push(self.directory_child(parent.as_str(), name)?);
        }
        Ok(children)
    }

    /// Builds a traversal rooted at the cwd from a config, or passes an
    /// already-built visitor through unchanged.
    pub fn visitor(self: &Arc<Self>, spec: impl Into<VisitSpec>) -> Visitor {
        match spec.into() {
            VisitSpec::Config(config) => Visitor::new(self.directory(PathSpec::empty()), config),
            VisitSpec::Visitor(visitor) => visitor,
        }
    }
}

impl Default for FsContext {
    fn default() -> Self {
        FsContext::new()
    }
}

#[cfg(unix)]
fn access_flags(meta: &fs::Metadata) -> (u32, bool, bool, bool, bool) {
    use std::os::unix::fs::MetadataExt;
    let mode = meta.mode();
    let owned = meta.uid() == unsafe { libc::geteuid() };
    let (r, w, x) = if owned {
        (0o400, 0o200, 0o100)
    } else {
        (0o004, 0o002, 0o001)
    };
    (mode, mode & r != 0, mode & w != 0, mode & x != 0, owned)
}

#[cfg(not(unix))]
fn access_flags(meta: &fs::Metadata) -> (u32, bool, bool, bool, bool) {
    (0, true, !meta.permissions().readonly(), false, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn setup_test_env() -> TempDir {
        TempDir::new("pathkit-context").unwrap()
    }

    fn context_at(temp: &TempDir) -> Arc<FsContext> {
        let ctx = Arc::new(FsContext::new());
        ctx.set_cwd(temp.path().to_string_lossy().into_owned());
        ctx
    }

    mod cwd_and_algebra {
        use super::*;

        #[test]
        fn test_fixed_cwd_overrides_os() {
            let ctx = FsContext::new();
            ctx.set_cwd("/home/x");
            assert_eq!(ctx.cwd().unwrap(), "/home/x");
            ctx.clear_cwd();
            let os_cwd = std::env::current_dir().unwrap();
            assert_eq!(ctx.cwd().unwrap(), os_cwd.to_string_lossy().into_owned());
        }

        #[test]
        fn test_absolute_joins_onto_cwd() {
            let ctx = FsContext::new();
            ctx.set_cwd("/home/x");
            assert_eq!(ctx.absolute("wam/bam").unwrap(), "/home/x/wam/bam");
            assert_eq!(ctx.absolute("/already").unwrap(), "/already");
        }

        #[test]
        fn test_relative_inverts_absolute() {
            let ctx = FsContext::new();
            ctx.set_cwd("/home/x");
            assert_eq!(ctx.relative("/home/x/wam/bam").unwrap(), "wam/bam");
        }

        #[test]
        fn test_absolute_accepts_components() {
            let ctx = FsContext::new();
            ctx.set_cwd("/home/x");
            assert_eq!(ctx.absolute(["wam", "bam"]).unwrap(), "/home/x/wam/bam");
        }
    }

    mod definitive {
        use super::*;
        use crate::core::PathResolver;

        #[derive(Debug)]
        struct RootedResolver {
            root: String,
        }

        impl PathResolver for RootedResolver {
            fn definitive_read(&self, absolute: &str, dialect: &Dialect) -> Result<String> {
                dialect.merge_paths(&self.root, absolute)
            }

            fn definitive_write(&self, absolute: &str, dialect: &Dialect) -> Result<String> {
                self.definitive_read(absolute, dialect)
            }
        }

        #[test]
        fn test_base_context_identity() {
            let ctx = FsContext::new();
            ctx.set_cwd("/home/x");
            let absolute = ctx.absolute("wam/bam").unwrap();
            assert_eq!(ctx.definitive_read("wam/bam").unwrap(), absolute);
            assert_eq!(ctx.definitive_write("wam/bam").unwrap(), absolute);
            assert_eq!(ctx.definitive("wam/bam").unwrap(), absolute);
        }

        #[test]
        fn test_rooted_resolver_remaps() {
            let ctx = FsContext::new();
            ctx.set_cwd("/home/x");
            ctx.set_resolver(Arc::new(RootedResolver {
                root: "/virtual/root".to_string(),
            }));
            assert_eq!(
                ctx.definitive_read("/etc/conf").unwrap(),
                "/virtual/root/etc/conf"
            );
            assert_eq!(ctx.absolute("/etc/conf").unwrap(), "/etc/conf");
        }

        #[test]
        fn test_io_routes_through_resolver() {
            let temp = setup_test_env();
            let ctx = Arc::new(FsContext::new());
            ctx.set_cwd("/inner");
            ctx.set_resolver(Arc::new(RootedResolver {
                root: temp.path().to_string_lossy().into_owned(),
            }));

            ctx.create_directory("/inner").unwrap();
            ctx.write_file("/inner/note.txt", b"hello").unwrap();

            // the bytes landed under the real root, not at /inner
            let on_host = temp.path().join("inner/note.txt");
            assert_eq!(std::fs::read(on_host).unwrap(), b"hello");
            assert_eq!(ctx.read_file("note.txt").unwrap(), b"hello");
        }
    }

    mod files {
        use super::*;

        #[test]
        fn test_create_file_is_noop_when_present() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            ctx.write_file("keep.txt", b"content").unwrap();
            ctx.create_file("keep.txt").unwrap();
            assert_eq!(ctx.read_file("keep.txt").unwrap(), b"content");
        }

        #[test]
        fn test_touch_creates_then_bumps_mtime() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            ctx.touch_file("stamp").unwrap();
            assert!(ctx.file_exists("stamp").unwrap());
            let before = ctx.stat_path("stamp").unwrap().modified;
            std::thread::sleep(std::time::Duration::from_millis(20));
            ctx.touch_file("stamp").unwrap();
            let after = ctx.stat_path("stamp").unwrap().modified;
            assert!(after >= before);
        }

        #[test]
        fn test_read_write_append_round() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            ctx.write_file("log.txt", b"one").unwrap();
            ctx.append_file("log.txt", b" two").unwrap();
            assert_eq!(ctx.read_file("log.txt").unwrap(), b"one two");
        }

        #[test]
        fn test_delete_missing_file_is_typed_failure() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            let err = ctx.delete_file("nothing.txt").unwrap_err();
            match err {
                FsError::DeleteFailed { source, .. } => {
                    assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
                }
                other => panic!("expected DeleteFailed, got {other:?}"),
            }
        }

        #[test]
        fn test_open_file_modes() {
            use std::io::{Read, Write};
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            {
                let mut f = ctx.open_file("data.bin", OpenMode::Write).unwrap();
                f.write_all(b"abc").unwrap();
            }
            {
                let mut f = ctx.open_file("data.bin", OpenMode::Append).unwrap();
                f.write_all(b"def").unwrap();
            }
            let mut buf = Vec::new();
            ctx.open_file("data.bin", OpenMode::Read)
                .unwrap()
                .read_to_end(&mut buf)
                .unwrap();
            assert_eq!(buf, b"abcdef");
        }

        #[test]
        fn test_open_missing_for_read_fails() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            let err = ctx.open_file("ghost", OpenMode::Read).unwrap_err();
            assert!(matches!(err, FsError::OpenFailed { .. }));
        }

        #[test]
        fn test_stat_flags_on_own_file() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            ctx.write_file("mine.txt", b"x").unwrap();
            let stat = ctx.stat_path("mine.txt").unwrap();
            assert!(stat.is_file());
            assert!(!stat.is_dir());
            assert_eq!(stat.size, 1);
            assert!(stat.readable);
            assert!(stat.writable);
            #[cfg(unix)]
            {
                assert!(stat.owned);
                assert!(!stat.executable);
            }
        }

        #[test]
        fn test_stat_missing_is_stat_failed() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            let err = ctx.stat_path("missing").unwrap_err();
            assert!(matches!(err, FsError::StatFailed { .. }));
        }
    }

    mod directories {
        use super::*;

        #[test]
        fn test_create_directory_recursive() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            ctx.create_directory("a/b/c").unwrap();
            assert!(ctx.directory_exists("a").unwrap());
            assert!(ctx.directory_exists("a/b").unwrap());
            assert!(ctx.directory_exists("a/b/c").unwrap());
        }

        #[test]
        fn test_delete_directory_recursive() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            ctx.create_directory("tree/branch").unwrap();
            ctx.write_file("tree/branch/leaf", b"").unwrap();
            ctx.delete_directory("tree").unwrap();
            assert!(!ctx.path_exists("tree").unwrap());
        }

        #[test]
        fn test_read_directory_excludes_dotted_by_default() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            ctx.write_file("a.txt", b"").unwrap();
            ctx.create_directory("sub").unwrap();
            assert_eq!(ctx.read_directory("", false).unwrap(), vec!["a.txt", "sub"]);
        }

        #[test]
        fn test_read_directory_dotted_on_request() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            ctx.write_file("a.txt", b"").unwrap();
            let names = ctx.read_directory("", true).unwrap();
            assert_eq!(names, vec![".", "..", "a.txt"]);
        }

        #[test]
        fn test_read_directory_honors_list_all_flag() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            ctx.set_list_all_entries(true);
            let names = ctx.read_directory("", false).unwrap();
            assert_eq!(names, vec![".", ".."]);
        }

        #[test]
        fn test_directory_children_classify() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            ctx.write_file("a.txt", b"").unwrap();
            ctx.create_directory("sub").unwrap();

            let children = ctx.directory_children("", false).unwrap();
            assert_eq!(children.len(), 2);
            assert!(matches!(&children[0], Node::File(f) if f.path().ends_with("a.txt")));
            assert!(matches!(&children[1], Node::Directory(d) if d.path().ends_with("sub")));
        }

        #[test]
        fn test_directory_children_ignore_list_all_flag() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            ctx.set_list_all_entries(true);
            ctx.write_file("a.txt", b"").unwrap();
            ctx.create_directory("sub").unwrap();

            let children = ctx.directory_children("", false).unwrap();
            let names: Vec<_> = children.iter().map(|n| n.name()).collect();
            assert_eq!(names, vec!["a.txt", "sub"]);

            // explicit request still surfaces the dotted entries
            let dotted = ctx.directory_children("", true).unwrap();
            assert_eq!(dotted.len(), 4);
            assert!(dotted[0].is_dir());
            assert!(dotted[1].is_dir());
        }

        #[test]
        fn test_directory_child_of_unknown_is_generic_path() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            let node = ctx.directory_child("", "not-yet").unwrap();
            assert!(matches!(node, Node::Other(_)));
        }

        #[test]
        fn test_open_directory_returns_live_handle() {
            let temp = setup_test_env();
            let ctx = context_at(&temp);
            ctx.write_file("solo", b"").unwrap();
            let handle = ctx.open_directory("").unwrap();
            assert_eq!(handle.count(), 1);
        }
    }

    mod default_instance {
        use super::*;

        #[test]
        fn test_default_context_is_shared() {
            let a = default_context();
            let b = default_context();
            assert!(Arc::ptr_eq(&a, &b));
        }
    }
}
