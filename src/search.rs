//! Textual search for files that define a class or struct.
//!
//! Search only nominates candidates. Every hit is parsed and verified before
//! it is used, so a false positive costs a parse, never a wrong edit.

use crate::config::SearchSection;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search root {0} is not a directory")]
    RootNotFound(PathBuf),

    #[error("cannot build search pattern for '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Project-wide lookup of class definitions by name.
pub trait SymbolSearch {
    /// Files under `root` that appear to define a class or struct called
    /// `name`, sorted by path.
    fn search_class_or_struct_definition(&self, root: &Path, name: &str) -> Result<Vec<PathBuf>, SearchError>;

    /// Names of every class or struct defined under `root`, for suggestions
    /// when a lookup fails.
    fn known_class_names(&self, _root: &Path) -> Result<BTreeSet<String>, SearchError> {
        Ok(BTreeSet::new())
    }
}

/// Walks a directory tree and greps source files with a regex.
#[derive(Debug, Clone)]
pub struct WalkdirSearch {
    extensions: Vec<String>,
    exclude: Vec<String>,
}

impl Default for WalkdirSearch {
    fn default() -> Self {
        Self::from_config(&SearchSection::default())
    }
}

impl WalkdirSearch {
    pub fn new(extensions: Vec<String>, exclude: Vec<String>) -> Self {
        Self { extensions, exclude }
    }

    pub fn from_config(section: &SearchSection) -> Self {
        Self::new(section.extensions.clone(), section.exclude.clone())
    }

    fn wanted(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want == ext))
    }

    fn excluded(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.exclude.iter().any(|ex| ex == name))
    }
}

static ANY_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:class|struct)\s+(?:\[\[[^\]]*\]\]\s*)*(?:[A-Za-z_]\w*\s+)?([A-Za-z_]\w*)\s*(?:final\s*)?[:{]")
        .unwrap()
});

/// Pattern matching the head of a definition of `name`:
/// `class [[attr]] EXPORT name final : ...` or `struct name {`.
pub fn definition_pattern(name: &str) -> Result<Regex, SearchError> {
    let simple = crate::scope::split_qualified(name)
        .last()
        .copied()
        .unwrap_or(name)
        .to_string();
    let pattern = format!(
        r"\b(?:class|struct)\s+(?:\[\[[^\]]*\]\]\s*)*(?:[A-Za-z_]\w*\s+)?{}\s*(?:final\s*)?[:{{]",
        regex::escape(&simple)
    );
    Regex::new(&pattern).map_err(|source| SearchError::InvalidPattern {
        name: name.to_string(),
        source,
    })
}

impl WalkdirSearch {
    /// Visit the text of every searchable file under `root`, in walk order.
    fn for_each_source(&self, root: &Path, mut visit: impl FnMut(DirEntry, &str)) -> Result<(), SearchError> {
        if !root.is_dir() {
            return Err(SearchError::RootNotFound(root.to_path_buf()));
        }

        let walker = WalkDir::new(root).into_iter().filter_entry(|e| !self.excluded(e));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.wanted(entry.path()) {
                continue;
            }
            let Ok(text) = fs::read_to_string(entry.path()) else {
                debug!(path = %entry.path().display(), "skipping non-UTF-8 file");
                continue;
            };
            visit(entry, &text);
        }
        Ok(())
    }
}

impl SymbolSearch for WalkdirSearch {
    fn search_class_or_struct_definition(&self, root: &Path, name: &str) -> Result<Vec<PathBuf>, SearchError> {
        let pattern = definition_pattern(name)?;
        let mut hits = Vec::new();
        self.for_each_source(root, |entry, text| {
            if pattern.is_match(text) {
                hits.push(entry.into_path());
            }
        })?;

        hits.sort();
        debug!(name, root = %root.display(), candidates = hits.len(), "searched for class definition");
        Ok(hits)
    }

    fn known_class_names(&self, root: &Path) -> Result<BTreeSet<String>, SearchError> {
        let mut names = BTreeSet::new();
        self.for_each_source(root, |_, text| {
            names.extend(
                ANY_DEFINITION
                    .captures_iter(text)
                    .filter_map(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string()),
            );
        })?;
        Ok(names)
    }
}
