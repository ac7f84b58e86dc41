//! `//= require` directive resolution
//!
//! Flattens a JavaScript entry file into one ordered line sequence. Each
//! `//= require <path>` line is replaced, depth-first, by the lines of the
//! file it names. A file is included at most once per resolution, which
//! short-circuits diamond dependencies and stops cycles.
//!
//! ## Search roots
//!
//! A directive token resolves to `<root>/<token>.js` under each search root
//! in priority order; the first existing candidate wins.
//!
//! | Resolver | Roots |
//! |----------|-------|
//! | [`InclusionResolver::for_tests`] | `test/javascript`, `src/javascript` |
//! | [`InclusionResolver::for_sources`] | `src/javascript` |
//!
//! Sources are handled as bytes, so files in legacy encodings pass through
//! unchanged.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};
use std::sync::LazyLock;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use regex::bytes::Regex;
use thiserror::Error;

static REQUIRE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^//= require ([A-Za-z0-9/_-]+)").expect("valid directive pattern"));

#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("The specified file does not exist: {}", .path.display())]
    SourceFileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IncludeError {
    /// Returns the error kind name
    pub fn kind(&self) -> &'static str {
        "SourceFileNotFound"
    }

    /// Returns the path that could not be read
    pub fn path(&self) -> &Path {
        match self {
            IncludeError::SourceFileNotFound { path, .. } => path,
        }
    }
}

/// Extracts the token of a `//= require <token>` line
pub fn parse_directive(line: &[u8]) -> Option<&str> {
    REQUIRE_DIRECTIVE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| std::str::from_utf8(m.as_bytes()).ok())
}

/// Per-resolution state: included files, output lines and require edges
#[derive(Debug, Default)]
pub struct InclusionGraph {
    included: HashSet<PathBuf>,
    order: Vec<PathBuf>,
    lines: Vec<Vec<u8>>,
    graph: DiGraph<PathBuf, ()>,
    nodes: HashMap<PathBuf, NodeIndex>,
}

impl InclusionGraph {
    fn new() -> Self {
        Self::default()
    }

    /// Marks a file as included; returns false if it already was
    fn include(&mut self, path: &Path) -> bool {
        if !self.included.insert(path.to_path_buf()) {
            return false;
        }
        self.order.push(path.to_path_buf());
        self.node(path);
        true
    }

    fn node(&mut self, path: &Path) -> NodeIndex {
        if let Some(idx) = self.nodes.get(path) {
            return *idx;
        }
        let idx = self.graph.add_node(path.to_path_buf());
        self.nodes.insert(path.to_path_buf(), idx);
        idx
    }

    /// Records that `from` requires `to`
    fn add_edge(&mut self, from: &Path, to: &Path) {
        let from_idx = self.node(from);
        let to_idx = self.node(to);
        if self.graph.find_edge(from_idx, to_idx).is_none() {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    fn push_line(&mut self, line: &[u8]) {
        self.lines.push(line.to_vec());
    }
}

/// The flattened output of one entry file
#[derive(Debug)]
pub struct Resolution {
    lines: Vec<Vec<u8>>,
    files: Vec<PathBuf>,
    graph: DiGraph<PathBuf, ()>,
}

impl Resolution {
    /// Returns the output lines, each with its original line terminator
    pub fn lines(&self) -> &[Vec<u8>] {
        &self.lines
    }

    /// Returns the concatenated output
    pub fn bytes(&self) -> Vec<u8> {
        self.lines.concat()
    }

    /// Returns the concatenated output, with invalid UTF-8 replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    /// Returns the included files, entry first, in inclusion order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Returns the require edges as (requiring file, required file)
    pub fn edges(&self) -> Vec<(&Path, &Path)> {
        self.graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_endpoints(edge))
            .map(|(from, to)| (self.graph[from].as_path(), self.graph[to].as_path()))
            .collect()
    }

    /// Returns true if some file transitively requires itself
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }
}

impl From<InclusionGraph> for Resolution {
    fn from(graph: InclusionGraph) -> Self {
        Self {
            lines: graph.lines,
            files: graph.order,
            graph: graph.graph,
        }
    }
}

/// Resolves require directives against an ordered list of search roots
#[derive(Debug, Clone)]
pub struct InclusionResolver {
    search_roots: Vec<PathBuf>,
}

impl InclusionResolver {
    /// Creates a resolver with the given roots, highest priority first
    pub fn new(search_roots: Vec<PathBuf>) -> Self {
        Self { search_roots }
    }

    /// Resolver for test bundles: test scripts first, then sources
    pub fn for_tests(project_root: &Path) -> Self {
        Self::new(vec![
            project_root.join("test").join("javascript"),
            project_root.join("src").join("javascript"),
        ])
    }

    /// Resolver for application bundles
    pub fn for_sources(project_root: &Path) -> Self {
        Self::new(vec![project_root.join("src").join("javascript")])
    }

    /// Returns the search roots in priority order
    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    /// Flattens `entry` and everything it requires
    pub fn resolve(&self, entry: &Path) -> Result<Resolution, IncludeError> {
        let mut graph = InclusionGraph::new();
        graph.include(entry);
        self.resolve_file(entry, &mut graph)?;
        Ok(graph.into())
    }

    /// Maps a directive token to the file it names
    pub fn locate(&self, token: &str) -> Option<PathBuf> {
        let relative = format!("{}.js", token.replace('/', MAIN_SEPARATOR_STR));
        let candidates: Vec<PathBuf> = self
            .search_roots
            .iter()
            .map(|root| root.join(&relative))
            .collect();

        candidates
            .iter()
            .find(|candidate| candidate.exists())
            .or_else(|| candidates.last())
            .cloned()
    }

    fn resolve_file(&self, path: &Path, graph: &mut InclusionGraph) -> Result<(), IncludeError> {
        let content = fs::read(path).map_err(|source| IncludeError::SourceFileNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        for line in content.split_inclusive(|byte| *byte == b'\n') {
            let Some(token) = parse_directive(line) else {
                graph.push_line(line);
                continue;
            };

            let Some(required) = self.locate(token) else {
                continue;
            };

            graph.add_edge(path, &required);
            if graph.include(&required) {
                self.resolve_file(&required, graph)?;
            }
        }

        graph.push_line(b"\n");
        Ok(())
    }
}
