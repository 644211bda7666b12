use std::fmt;

use crate::Dialect;

pub type Result<T> = std::result::Result<T, crate::FsError>;

/// Dual-form path input: an already-joined path string or an ordered
/// sequence of components.
///
/// Every method of this crate that takes "a path" accepts both forms through
/// `impl Into<PathSpec>`, so callers never need to know which one they hold.
/// Joining a `Text` spec is idempotent.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSpec {
    Text(String),
    Parts(Vec<String>),
}

impl PathSpec {
    /// An empty spec; higher-level constructors treat it as "default here".
    pub fn empty() -> Self {
        PathSpec::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            PathSpec::Text(s) => s.is_empty(),
            PathSpec::Parts(v) => v.iter().all(|c| c.is_empty()),
        }
    }
}

impl Default for PathSpec {
    fn default() -> Self {
        PathSpec::empty()
    }
}

impl From<&str> for PathSpec {
    fn from(s: &str) -> Self {
        PathSpec::Text(s.to_string())
    }
}

impl From<String> for PathSpec {
    fn from(s: String) -> Self {
        PathSpec::Text(s)
    }
}

impl From<&String> for PathSpec {
    fn from(s: &String) -> Self {
        PathSpec::Text(s.clone())
    }
}

impl From<Vec<String>> for PathSpec {
    fn from(parts: Vec<String>) -> Self {
        PathSpec::Parts(parts)
    }
}

impl From<&[String]> for PathSpec {
    fn from(parts: &[String]) -> Self {
        PathSpec::Parts(parts.to_vec())
    }
}

impl From<Vec<&str>> for PathSpec {
    fn from(parts: Vec<&str>) -> Self {
        PathSpec::Parts(parts.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[&str]> for PathSpec {
    fn from(parts: &[&str]) -> Self {
        PathSpec::Parts(parts.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PathSpec {
    fn from(parts: [&str; N]) -> Self {
        PathSpec::Parts(parts.iter().map(|s| s.to_string()).collect())
    }
}

/// The definitive-path seam.
///
/// An *absolute* path is the conceptual, fully-qualified location; the
/// *definitive* path is the concrete location actually handed to the OS.
/// The base resolver is the identity, so `absolute == definitive_read ==
/// definitive_write`. A virtual filesystem substitutes its own resolver
/// (e.g. prepending a virtual root, or reading through an overlay while
/// writing elsewhere) without touching any other context method. Both hooks
/// must stay total functions of `absolute path x resolver state`.
pub trait PathResolver: fmt::Debug + Send + Sync {
    /// Maps an absolute path to the location used for reading.
    fn definitive_read(&self, absolute: &str, dialect: &Dialect) -> Result<String> {
        let _ = dialect;
        Ok(absolute.to_string())
    }

    /// Maps an absolute path to the location used for writing.
    fn definitive_write(&self, absolute: &str, dialect: &Dialect) -> Result<String> {
        let _ = dialect;
        Ok(absolute.to_string())
    }
}

/// The base resolver: absolute and definitive paths coincide.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityResolver;

impl PathResolver for IdentityResolver {}
