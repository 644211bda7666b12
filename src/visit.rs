//! Configurable recursive directory traversal.
//!
//! A [`Visitor`] is a configured walk over a directory entity: a depth-first
//! pre-order descent that classifies children through the owning context,
//! applies include/exclude filters, and either accumulates eagerly
//! ([`Visitor::collect`]) or yields lazily ([`Visitor::iter`]).
//!
//! The lazy form is *restartable*: iterating twice re-walks the filesystem
//! rather than replaying a cached result, because directory contents may
//! have changed between calls.

use regex::Regex;

use crate::core::Result;
use crate::entity::{DirEntity, Node};

/// Traversal configuration.
///
/// Defaults: files and directories both included, unlimited depth, no name
/// filters. Filters gate what is *yielded*; descent is gated by the depth
/// limit alone, so an excluded directory's children are still visited.
/// Non-directory entries (including `Other` nodes) follow the `files` flag.
#[derive(Debug, Clone)]
pub struct VisitConfig {
    files: bool,
    dirs: bool,
    max_depth: Option<usize>,
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl VisitConfig {
    pub fn new() -> Self {
        VisitConfig {
            files: true,
            dirs: true,
            max_depth: None,
            include: None,
            exclude: None,
        }
    }

    /// Whether non-directory entries are yielded.
    pub fn files(mut self, yes: bool) -> Self {
        self.files = yes;
        self
    }

    /// Whether directories are yielded.
    pub fn dirs(mut self, yes: bool) -> Self {
        self.dirs = yes;
        self
    }

    /// Limits descent: direct children sit at depth 1. `Some(0)` yields
    /// nothing.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Only names matching `pattern` are yielded.
    pub fn include(mut self, pattern: Regex) -> Self {
        self.include = Some(pattern);
        self
    }

    /// Names matching `pattern` are not yielded.
    pub fn exclude(mut self, pattern: Regex) -> Self {
        self.exclude = Some(pattern);
        self
    }

    fn allows_descent(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|max| depth < max)
    }

    fn selects(&self, node: &Node) -> bool {
        let wanted = if node.is_dir() { self.dirs } else { self.files };
        if !wanted {
            return false;
        }
        let name = node.name();
        if let Some(include) = &self.include {
            if !include.is_match(&name) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(&name) {
                return false;
            }
        }
        true
    }
}

impl Default for VisitConfig {
    fn default() -> Self {
        VisitConfig::new()
    }
}

/// Input to the visitor builders: a fresh config, or an already-built
/// visitor that passes through unchanged.
#[derive(Debug, Clone)]
pub enum VisitSpec {
    Config(VisitConfig),
    Visitor(Visitor),
}

impl From<VisitConfig> for VisitSpec {
    fn from(config: VisitConfig) -> Self {
        VisitSpec::Config(config)
    }
}

impl From<Visitor> for VisitSpec {
    fn from(visitor: Visitor) -> Self {
        VisitSpec::Visitor(visitor)
    }
}

/// A configured, not-yet-executed traversal rooted at a directory entity.
#[derive(Debug, Clone)]
pub struct Visitor {
    root: DirEntity,
    config: VisitConfig,
}

impl Visitor {
    pub fn new(root: DirEntity, config: VisitConfig) -> Self {
        Visitor { root, config }
    }

    pub fn root(&self) -> &DirEntity {
        &self.root
    }

    pub fn config(&self) -> &VisitConfig {
        &self.config
    }

    /// The same configuration bound to another root.
    pub fn rooted_at(&self, root: DirEntity) -> Visitor {
        Visitor {
            root,
            config: self.config.clone(),
        }
    }

    /// Forces full eager evaluation. Each call re-walks the tree.
    pub fn collect(&self) -> Result<Vec<Node>> {
        self.iter().collect()
    }

    /// A lazy walk. Each call starts a fresh traversal from the root.
    pub fn iter(&self) -> Walk<'_> {
        let stack = if self.config.allows_descent(0) {
            vec![Frame::Expand(self.root.clone(), 0)]
        } else {
            Vec::new()
        };
        Walk {
            config: &self.config,
            stack,
        }
    }
}

impl<'a> IntoIterator for &'a Visitor {
    type Item = Result<Node>;
    type IntoIter = Walk<'a>;

    fn into_iter(self) -> Walk<'a> {
        self.iter()
    }
}

enum Frame {
    /// A directory at the given depth whose children are not listed yet.
    Expand(DirEntity, usize),
    /// An in-progress child list.
    Level(std::vec::IntoIter<(Node, usize)>),
}

/// Lazy depth-first pre-order walk. Listing failures surface as `Err`
/// items; traversal then continues with the remaining siblings.
pub struct Walk<'a> {
    config: &'a VisitConfig,
    stack: Vec<Frame>,
}

impl Iterator for Walk<'_> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                Frame::Expand(dir, depth) => match dir.children() {
                    Ok(children) => {
                        let level: Vec<_> = children
                            .into_iter()
                            .map(|node| (node, depth + 1))
                            .collect();
                        self.stack.push(Frame::Level(level.into_iter()));
                    }
                    Err(e) => return Some(Err(e)),
                },
                Frame::Level(mut level) => {
                    let Some((node, depth)) = level.next() else {
                        continue;
                    };
                    // remaining siblings resume after any descent
                    self.stack.push(Frame::Level(level));
                    if let Node::Directory(dir) = &node {
                        if self.config.allows_descent(depth) {
                            self.stack.push(Frame::Expand(dir.clone(), depth));
                        }
                    }
                    if self.config.selects(&node) {
                        return Some(Ok(node));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsContext;
    use std::sync::Arc;
    use tempdir::TempDir;

    fn setup_test_env() -> (TempDir, Arc<FsContext>) {
        let temp = TempDir::new("pathkit-visit").unwrap();
        let ctx = Arc::new(FsContext::new());
        ctx.set_cwd(temp.path().to_string_lossy().into_owned());
        (temp, ctx)
    }

    fn grow_tree(ctx: &Arc<FsContext>) {
        // root/{a.txt, sub/{b.txt}}
        ctx.write_file("a.txt", b"a").unwrap();
        ctx.create_directory("sub").unwrap();
        ctx.write_file("sub/b.txt", b"b").unwrap();
    }

    fn names(nodes: &[Node]) -> Vec<String> {
        nodes.iter().map(|n| n.name()).collect()
    }

    mod collecting {
        use super::*;

        #[test]
        fn test_depth_one_files_only() {
            let (_temp, ctx) = setup_test_env();
            grow_tree(&ctx);
            let config = VisitConfig::new().files(true).dirs(false).max_depth(1);
            let nodes = ctx.directory("").collect(config).unwrap();
            assert_eq!(names(&nodes), vec!["a.txt"]);
        }

        #[test]
        fn test_unlimited_pre_order() {
            let (_temp, ctx) = setup_test_env();
            grow_tree(&ctx);
            let nodes = ctx.directory("").collect(VisitConfig::new()).unwrap();
            assert_eq!(names(&nodes), vec!["a.txt", "sub", "b.txt"]);
        }

        #[test]
        fn test_dirs_only() {
            let (_temp, ctx) = setup_test_env();
            grow_tree(&ctx);
            let config = VisitConfig::new().files(false);
            let nodes = ctx.directory("").collect(config).unwrap();
            assert_eq!(names(&nodes), vec!["sub"]);
        }

        #[test]
        fn test_depth_zero_yields_nothing() {
            let (_temp, ctx) = setup_test_env();
            grow_tree(&ctx);
            let nodes = ctx
                .directory("")
                .collect(VisitConfig::new().max_depth(0))
                .unwrap();
            assert!(nodes.is_empty());
        }

        #[test]
        fn test_list_all_flag_does_not_leak_into_walk() {
            let (_temp, ctx) = setup_test_env();
            grow_tree(&ctx);
            ctx.set_list_all_entries(true);

            // unlimited depth must terminate and never yield the root
            // itself or escape it through the dotted entries
            let nodes = ctx.directory("").collect(VisitConfig::new()).unwrap();
            assert_eq!(names(&nodes), vec!["a.txt", "sub", "b.txt"]);

            let shallow = ctx
                .directory("")
                .collect(VisitConfig::new().max_depth(1))
                .unwrap();
            assert_eq!(shallow.len(), 2);
        }

        #[test]
        fn test_missing_root_surfaces_error() {
            let (_temp, ctx) = setup_test_env();
            let result = ctx.directory("nowhere").collect(VisitConfig::new());
            assert!(result.is_err());
        }
    }

    mod filters {
        use super::*;

        #[test]
        fn test_include_by_name() {
            let (_temp, ctx) = setup_test_env();
            grow_tree(&ctx);
            let config = VisitConfig::new()
                .dirs(false)
                .include(Regex::new(r"\.txt$").unwrap());
            let nodes = ctx.directory("").collect(config).unwrap();
            assert_eq!(names(&nodes), vec!["a.txt", "b.txt"]);
        }

        #[test]
        fn test_exclude_gates_yield_not_descent() {
            let (_temp, ctx) = setup_test_env();
            grow_tree(&ctx);
            let config = VisitConfig::new().exclude(Regex::new("^sub$").unwrap());
            let nodes = ctx.directory("").collect(config).unwrap();
            assert_eq!(names(&nodes), vec!["a.txt", "b.txt"]);
        }
    }

    mod laziness {
        use super::*;

        #[test]
        fn test_iteration_restarts_from_scratch() {
            let (_temp, ctx) = setup_test_env();
            grow_tree(&ctx);
            let visitor = ctx.directory("").visit(VisitConfig::new().dirs(false));

            assert_eq!(visitor.collect().unwrap().len(), 2);
            ctx.write_file("c.txt", b"c").unwrap();
            // second walk sees the new file; nothing was cached
            assert_eq!(visitor.collect().unwrap().len(), 3);
        }

        #[test]
        fn test_partial_consumption_then_fresh_walk() {
            let (_temp, ctx) = setup_test_env();
            grow_tree(&ctx);
            let visitor = ctx.directory("").visit(VisitConfig::new());

            let first = visitor.iter().next().unwrap().unwrap();
            assert_eq!(first.name(), "a.txt");
            let full: Result<Vec<_>> = visitor.iter().collect();
            assert_eq!(full.unwrap().len(), 3);
        }
    }

    mod plumbing {
        use super::*;

        #[test]
        fn test_visit_passes_built_visitor_through() {
            let (_temp, ctx) = setup_test_env();
            grow_tree(&ctx);
            let dir = ctx.directory("");
            let built = dir.visit(VisitConfig::new().files(false));
            let same = dir.visit(built.clone());
            assert_eq!(names(&same.collect().unwrap()), vec!["sub"]);
        }

        #[test]
        fn test_accept_reroots_configuration() {
            let (_temp, ctx) = setup_test_env();
            grow_tree(&ctx);
            let visitor = ctx.directory("").visit(VisitConfig::new().dirs(false));
            let nodes = ctx.directory("sub").accept(&visitor).unwrap();
            assert_eq!(names(&nodes), vec!["b.txt"]);
        }

        #[test]
        fn test_context_visitor_roots_at_cwd() {
            let (_temp, ctx) = setup_test_env();
            grow_tree(&ctx);
            let visitor = ctx.visitor(VisitConfig::new().dirs(false).max_depth(1));
            assert_eq!(names(&visitor.collect().unwrap()), vec!["a.txt"]);
        }
    }
}
