//! A lightweight path-resolution and virtual-filesystem abstraction engine.
//! Represents files, directories and generic paths as stateless flyweight
//! handles, manipulates paths in an OS-agnostic way, and indirects every
//! physical read/write through a remappable "definitive path" step so that a
//! real filesystem and an arbitrarily overlaid virtual one share identical
//! client code.
//!
//! ### Overview
//!
//! `pathkit` separates three concerns the way most code tangles them:
//! the pure path algebra (split/join/collapse/merge, per-OS [`Dialect`]),
//! the stateful [`FsContext`] that performs the actual I/O, and the
//! flyweight entities ([`PathEntity`], [`FileEntity`], [`DirEntity`]) client
//! code passes around.
//!
//! **Key ideas**:
//! - **One seam for virtualization**: every I/O call maps its absolute path
//!   through the [`PathResolver`] hooks (`definitive_read` /
//!   `definitive_write`). The base resolver is the identity; a virtual
//!   filesystem substitutes its own without touching anything else.
//! - **Shared default context**: one process-wide [`FsContext`] is created
//!   lazily on first use ([`default_context`]); any entity built without an
//!   explicit context shares it, and an explicit context can always be
//!   substituted.
//! - **Stateless entities**: entities hold only a path string and a handle
//!   to their context. They never cache filesystem state; every inspection
//!   re-queries at call time.
//! - **Typed failures**: every OS failure is re-raised as an [`FsError`]
//!   carrying the path and the original OS error; nothing is retried or
//!   silently defaulted.
//! - **Configurable traversal**: a [`Visitor`] walks a directory tree
//!   depth-first with filters and a depth limit, eagerly collected or lazily
//!   (and restartably) iterated.

mod context;
mod core;
mod dialect;
mod entity;
mod error;
mod visit;

pub use context::{EntryKind, FsContext, OpenMode, Stat, default_context};
pub use core::{IdentityResolver, PathResolver, PathSpec, Result};
pub use dialect::Dialect;
pub use entity::{DirEntity, FileEntity, Node, PathEntity};
pub use error::FsError;
pub use visit::{VisitConfig, VisitSpec, Visitor, Walk};
