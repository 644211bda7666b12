//! Flyweight path, file and directory entities.
//!
//! Entities are stateless proxies: a path string plus a shared handle to the
//! owning [`FsContext`]. They never cache filesystem truth (size, existence,
//! content) between calls — every inspection re-queries the context at call
//! time, because the same entity can outlive changes to the underlying file
//! and because a virtual context may change its mapping between calls.
//!
//! Two entities built from the same path string and the same context compare
//! equal and display identically, but remain distinct object identities:
//! there is no interning.

use std::fmt;
use std::fs;
use std::sync::Arc;
use std::time::SystemTime;

use crate::context::{FsContext, OpenMode, Stat, default_context};
use crate::core::{PathSpec, Result};
use crate::visit::{VisitSpec, Visitor};

/// A location that may or may not exist, and may be neither file nor
/// directory.
#[derive(Debug, Clone)]
pub struct PathEntity {
    path: String,
    context: Arc<FsContext>,
}

impl PathEntity {
    /// Binds to the process-wide default context.
    pub fn new(spec: impl Into<PathSpec>) -> Self {
        Self::with_context(default_context(), spec)
    }

    /// Binds to an explicit context. An empty spec means "here": it is
    /// stored as the dialect's current token, so the entity follows the
    /// context's cwd instead of freezing it.
    pub fn with_context(context: Arc<FsContext>, spec: impl Into<PathSpec>) -> Self {
        let dialect = context.dialect();
        let spec = spec.into();
        let path = if spec.is_empty() {
            dialect.current_token().to_string()
        } else {
            dialect.join_directory(spec)
        };
        PathEntity { path, context }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn context(&self) -> &Arc<FsContext> {
        &self.context
    }

    pub fn exists(&self) -> Result<bool> {
        self.context.path_exists(self.path.as_str())
    }

    pub fn stat(&self) -> Result<Stat> {
        self.context.stat_path(self.path.as_str())
    }

    pub fn absolute(&self) -> Result<String> {
        self.context.absolute(self.path.as_str())
    }

    pub fn definitive(&self) -> Result<String> {
        self.context.definitive(self.path.as_str())
    }

    /// The filename part of the path; empty when the path ends in a
    /// separator.
    pub fn basename(&self) -> String {
        let (_, _, filename) = self.context.dialect().split_path(&self.path);
        filename
    }

    /// The directory part of the path, volume included.
    pub fn dirname(&self) -> String {
        let (volume, directory, _) = self.context.dialect().split_path(&self.path);
        format!("{volume}{directory}")
    }

    /// Reinterprets this location as a file.
    pub fn as_file(&self) -> FileEntity {
        FileEntity::with_context(self.context.clone(), self.path.as_str())
    }

    /// Reinterprets this location as a directory.
    pub fn as_directory(&self) -> DirEntity {
        DirEntity::with_context(self.context.clone(), self.path.as_str())
    }
}

impl fmt::Display for PathEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl PartialEq for PathEntity {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && Arc::ptr_eq(&self.context, &other.context)
    }
}

impl From<&PathEntity> for PathSpec {
    fn from(entity: &PathEntity) -> Self {
        PathSpec::Text(entity.path.clone())
    }
}

/// A path specialized with file-only operations.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntity {
    entity: PathEntity,
}

impl FileEntity {
    pub fn new(spec: impl Into<PathSpec>) -> Self {
        FileEntity {
            entity: PathEntity::new(spec),
        }
    }

    pub fn with_context(context: Arc<FsContext>, spec: impl Into<PathSpec>) -> Self {
        FileEntity {
            entity: PathEntity::with_context(context, spec),
        }
    }

    pub fn as_path(&self) -> &PathEntity {
        &self.entity
    }

    pub fn path(&self) -> &str {
        self.entity.path()
    }

    pub fn context(&self) -> &Arc<FsContext> {
        self.entity.context()
    }

    pub fn exists(&self) -> Result<bool> {
        self.context().file_exists(self.path())
    }

    /// Creates the file if absent; no-op when present.
    pub fn create(&self) -> Result<()> {
        self.context().create_file(self.path())
    }

    /// Creates the file if absent, else bumps its modification time.
    pub fn touch(&self) -> Result<()> {
        self.context().touch_file(self.path())
    }

    pub fn delete(&self) -> Result<()> {
        self.context().delete_file(self.path())
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        self.context().read_file(self.path())
    }

    pub fn write(&self, content: &[u8]) -> Result<()> {
        self.context().write_file(self.path(), content)
    }

    pub fn append(&self, content: &[u8]) -> Result<()> {
        self.context().append_file(self.path(), content)
    }

    /// Opens a live handle; the caller owns its lifecycle.
    pub fn open(&self, mode: OpenMode) -> Result<fs::File> {
        self.context().open_file(self.path(), mode)
    }

    pub fn absolute(&self) -> Result<String> {
        self.entity.absolute()
    }

    pub fn definitive(&self) -> Result<String> {
        self.entity.definitive()
    }

    pub fn stat(&self) -> Result<Stat> {
        self.entity.stat()
    }

    pub fn size(&self) -> Result<u64> {
        Ok(self.stat()?.size)
    }

    pub fn modified(&self) -> Result<SystemTime> {
        Ok(self.stat()?.modified)
    }
}

impl fmt::Display for FileEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity.fmt(f)
    }
}

/// A path specialized with directory-only operations.
#[derive(Debug, Clone, PartialEq)]
pub struct DirEntity {
    entity: PathEntity,
}

impl DirEntity {
    pub fn new(spec: impl Into<PathSpec>) -> Self {
        DirEntity {
            entity: PathEntity::new(spec),
        }
    }

    pub fn with_context(context: Arc<FsContext>, spec: impl Into<PathSpec>) -> Self {
        DirEntity {
            entity: PathEntity::with_context(context, spec),
        }
    }

    pub fn as_path(&self) -> &PathEntity {
        &self.entity
    }

    pub fn path(&self) -> &str {
        self.entity.path()
    }

    pub fn context(&self) -> &Arc<FsContext> {
        self.entity.context()
    }

    pub fn exists(&self) -> Result<bool> {
        self.context().directory_exists(self.path())
    }

    /// Creates the directory and all its parents.
    pub fn create(&self) -> Result<()> {
        self.context().create_directory(self.path())
    }

    /// Removes the directory and everything below it.
    pub fn delete(&self) -> Result<()> {
        self.context().delete_directory(self.path())
    }

    /// Raw entry names; dotted current/parent entries only on request or
    /// when the context lists all entries.
    pub fn list(&self, include_dotted: bool) -> Result<Vec<String>> {
        self.context().read_directory(self.path(), include_dotted)
    }

    /// Looks up and stat-classifies one child.
    pub fn child(&self, name: &str) -> Result<Node> {
        self.context().directory_child(self.path(), name)
    }

    /// Stat-classified children, dotted entries excluded.
    pub fn children(&self) -> Result<Vec<Node>> {
        self.context().directory_children(self.path(), false)
    }

    pub fn absolute(&self) -> Result<String> {
        self.entity.absolute()
    }

    pub fn definitive(&self) -> Result<String> {
        self.entity.definitive()
    }

    pub fn stat(&self) -> Result<Stat> {
        self.entity.stat()
    }

    /// Builds a traversal rooted here from a config; an already-built
    /// visitor passes through unchanged.
    pub fn visit(&self, spec: impl Into<VisitSpec>) -> Visitor {
        match spec.into() {
            VisitSpec::Config(config) => Visitor::new(self.clone(), config),
            VisitSpec::Visitor(visitor) => visitor,
        }
    }

    /// Runs a visitor's configuration rooted at this directory.
    pub fn accept(&self, visitor: &Visitor) -> Result<Vec<Node>> {
        visitor.rooted_at(self.clone()).collect()
    }

    /// Eagerly walks and accumulates; shorthand for `visit(spec).collect()`.
    pub fn collect(&self, spec: impl Into<VisitSpec>) -> Result<Vec<Node>> {
        self.visit(spec).collect()
    }
}

impl fmt::Display for DirEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity.fmt(f)
    }
}

/// The stat-classified variant a directory lookup produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    File(FileEntity),
    Directory(DirEntity),
    /// Exists but is neither regular file nor directory, or cannot be
    /// stat'ed at all.
    Other(PathEntity),
}

impl Node {
    pub fn path(&self) -> &str {
        match self {
            Node::File(f) => f.path(),
            Node::Directory(d) => d.path(),
            Node::Other(p) => p.path(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    /// The filename part of the node's path.
    pub fn name(&self) -> String {
        let entity = match self {
            Node::File(f) => f.as_path(),
            Node::Directory(d) => d.as_path(),
            Node::Other(p) => p,
        };
        entity.basename()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
