//! OS-agnostic path algebra.
//!
//! A [`Dialect`] carries the path-syntax conventions of a target OS
//! (separator, root/parent/current tokens) and exposes the pure string
//! algebra built on them: split/join/collapse/merge, absolute/relative.
//! Nothing here performs I/O.
//!
//! Malformed input never raises: the algebra degrades to best-effort
//! canonicalization, because it has no way to distinguish "malformed" from
//! "not yet created". The single typed failure is the volume conflict in
//! [`Dialect::merge_paths`].

use crate::core::{PathSpec, Result};
use crate::error::FsError;

/// Path-syntax conventions for a target OS.
///
/// Immutable once a context is constructed; the host default is derived from
/// the compilation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    separator: String,
    root_token: String,
    parent_token: String,
    current_token: String,
}

impl Dialect {
    /// POSIX conventions: `/`, `/`, `..`, `.`.
    pub fn unix() -> Self {
        Dialect {
            separator: "/".to_string(),
            root_token: "/".to_string(),
            parent_token: "..".to_string(),
            current_token: ".".to_string(),
        }
    }

    /// Windows conventions: `\`, `\`, `..`, `.`, with drive-letter volumes.
    /// Forward slashes are accepted on input and canonicalized to `\`.
    pub fn windows() -> Self {
        Dialect {
            separator: "\\".to_string(),
            root_token: "\\".to_string(),
            parent_token: "..".to_string(),
            current_token: ".".to_string(),
        }
    }

    /// The dialect of the compilation target.
    pub fn host() -> Self {
        if cfg!(windows) {
            Dialect::windows()
        } else {
            Dialect::unix()
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn root_token(&self) -> &str {
        &self.root_token
    }

    pub fn parent_token(&self) -> &str {
        &self.parent_token
    }

    pub fn current_token(&self) -> &str {
        &self.current_token
    }

    fn sep_char(&self) -> char {
        self.separator.chars().next().unwrap_or('/')
    }

    fn is_separator(&self, c: char) -> bool {
        c == self.sep_char() || (self.has_volumes() && c == '/')
    }

    fn has_volumes(&self) -> bool {
        self.separator == "\\"
    }

    /// Splits a leading volume (`C:`) off `path`. Dialects without volumes
    /// always return an empty volume.
    pub fn split_volume<'a>(&self, path: &'a str) -> (&'a str, &'a str) {
        if self.has_volumes() {
            let bytes = path.as_bytes();
            if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
                return (&path[..2], &path[2..]);
            }
        }
        ("", path)
    }

    /// True if `path` begins at the dialect root (after any volume).
    pub fn is_absolute(&self, path: &str) -> bool {
        let (_, rest) = self.split_volume(path);
        rest.chars().next().is_some_and(|c| self.is_separator(c))
    }

    pub fn is_relative(&self, path: &str) -> bool {
        !self.is_absolute(path)
    }

    fn components<'a>(&self, rest: &'a str) -> Vec<&'a str> {
        rest.split(|c| self.is_separator(c))
            .filter(|c| !c.is_empty())
            .collect()
    }

    fn assemble(&self, volume: &str, absolute: bool, parts: &[&str]) -> String {
        let mut out = String::from(volume);
        if absolute {
            out.push(self.sep_char());
        }
        out.push_str(&parts.join(&self.separator));
        out
    }

    /// Canonicalizes separators: alternates unified, runs collapsed,
    /// trailing separator removed (the bare root is kept). Idempotent.
    pub fn canonical(&self, path: &str) -> String {
        let (volume, rest) = self.split_volume(path);
        let absolute = rest.chars().next().is_some_and(|c| self.is_separator(c));
        let parts = self.components(rest);
        self.assemble(volume, absolute, &parts)
    }

    /// Decomposes a composite path into `(volume, directory, filename)`.
    /// Missing parts come back as empty strings, never as an absent value,
    /// so downstream joins stay total.
    pub fn split_path(&self, path: &str) -> (String, String, String) {
        let (volume, rest) = self.split_volume(path);
        match rest.rfind(|c| self.is_separator(c)) {
            None => (volume.to_string(), String::new(), rest.to_string()),
            Some(i) => {
                let directory = if i == 0 {
                    self.root_token.clone()
                } else {
                    self.canonical(&rest[..i])
                };
                (volume.to_string(), directory, rest[i + 1..].to_string())
            }
        }
    }

    /// Inverse of [`split_path`](Dialect::split_path), canonicalized.
    pub fn join_path(&self, volume: &str, directory: &str, filename: &str) -> String {
        let mut out = String::from(volume);
        out.push_str(directory);
        if !directory.is_empty() && !filename.is_empty() {
            out.push(self.sep_char());
        }
        out.push_str(filename);
        self.canonical(&out)
    }

    /// Splits a path into its ordered component strings. The volume and the
    /// root token are stripped; empty components are dropped.
    pub fn split_directory(&self, path: &str) -> Vec<String> {
        let (_, rest) = self.split_volume(path);
        self.components(rest)
            .into_iter()
            .map(|c| c.to_string())
            .collect()
    }

    /// Joins a path spec into a canonical path string.
    ///
    /// Accepts either a component sequence or an already-joined string; the
    /// string form is only canonicalized, so the call is idempotent. Empty
    /// components are skipped.
    pub fn join_directory(&self, spec: impl Into<PathSpec>) -> String {
        match spec.into() {
            PathSpec::Text(s) => self.canonical(&s),
            PathSpec::Parts(parts) => {
                let joined = parts
                    .iter()
                    .filter(|p| !p.is_empty())
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(&self.separator);
                self.canonical(&joined)
            }
        }
    }

    /// Purely lexical resolution of current/parent tokens.
    ///
    /// The current token is dropped; the parent token pops the previous
    /// retained component if any, otherwise it is dropped. This never touches
    /// the real filesystem and never resolves symbolic links, so it must not
    /// be relied on for security-sensitive path containment.
    pub fn collapse_directory(&self, path: &str) -> String {
        let (volume, rest) = self.split_volume(path);
        let absolute = rest.chars().next().is_some_and(|c| self.is_separator(c));
        let mut retained: Vec<&str> = Vec::new();
        for part in self.components(rest) {
            if part == self.current_token {
                continue;
            }
            if part == self.parent_token {
                retained.pop();
                continue;
            }
            retained.push(part);
        }
        self.assemble(volume, absolute, &retained)
    }

    /// Concatenates `base` and `extra` as directory components, deliberately
    /// ignoring whether `extra` looks absolute: virtual-filesystem roots are
    /// joined with absolute-looking virtual paths.
    ///
    /// If both paths declare a volume the volumes must match, otherwise the
    /// call fails with [`FsError::VolumeMismatch`]; a volume declared by only
    /// one side carries over to the result.
    pub fn merge_paths(&self, base: &str, extra: &str) -> Result<String> {
        let (base_volume, base_rest) = self.split_volume(base);
        let (extra_volume, extra_rest) = self.split_volume(extra);
        let volume = match (base_volume.is_empty(), extra_volume.is_empty()) {
            (true, true) => "",
            (false, true) => base_volume,
            (true, false) => extra_volume,
            (false, false) => {
                if base_volume != extra_volume {
                    return Err(FsError::VolumeMismatch {
                        base: base.to_string(),
                        extra: extra.to_string(),
                    });
                }
                base_volume
            }
        };
        let absolute = base_rest.chars().next().is_some_and(|c| self.is_separator(c));
        let mut parts = self.components(base_rest);
        parts.extend(self.components(extra_rest));
        Ok(self.assemble(volume, absolute, &parts))
    }

    /// Returns `path` unchanged if already absolute, else joins it onto
    /// `base` and collapses the result. Idempotent on absolute paths.
    ///
    /// Best-effort on malformed input: a volume prefix on a *relative*
    /// `path` (e.g. `C:rel` under the windows dialect) is discarded and
    /// `base`'s volume wins. Use [`Dialect::merge_paths`] when a volume
    /// disagreement must raise instead.
    pub fn absolute(&self, path: &str, base: &str) -> String {
        if self.is_absolute(path) {
            return path.to_string();
        }
        let (volume, base_rest) = self.split_volume(base);
        let base_absolute = base_rest.chars().next().is_some_and(|c| self.is_separator(c));
        let mut parts = self.components(base_rest);
        let (_, path_rest) = self.split_volume(path);
        parts.extend(self.components(path_rest));
        self.collapse_directory(&self.assemble(volume, base_absolute, &parts))
    }

    /// Computes `path` relative to `base`. Both sides are absolutized
    /// against `base` and collapsed first; a volume disagreement degrades to
    /// the collapsed absolute form of `path` rather than raising.
    pub fn relative(&self, path: &str, base: &str) -> String {
        let target = self.collapse_directory(&self.absolute(path, base));
        let anchor = self.collapse_directory(base);

        let (target_volume, target_rest) = self.split_volume(&target);
        let (anchor_volume, anchor_rest) = self.split_volume(&anchor);
        if !target_volume.is_empty() && !anchor_volume.is_empty() && target_volume != anchor_volume
        {
            return target;
        }

        let target_parts = self.components(target_rest);
        let anchor_parts = self.components(anchor_rest);
        let common = target_parts
            .iter()
            .zip(anchor_parts.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts: Vec<&str> = Vec::new();
        for _ in common..anchor_parts.len() {
            parts.push(&self.parent_token);
        }
        parts.extend(&target_parts[common..]);
        if parts.is_empty() {
            return self.current_token.clone();
        }
        self.assemble("", false, &parts)
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::host()
    }
}
