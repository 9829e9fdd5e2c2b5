//! The refactoring actions exposed to editors and the CLI.
//!
//! Each action parses once, computes every insertion against the untouched
//! buffer and merges them in a single [`apply_insertions`] call. Nothing is
//! computed from a partially patched text.
//!
//! [`apply_insertions`]: crate::edit::apply_insertions

pub mod errors;
pub mod generate_definitions;
pub mod implement_interface;

pub use errors::RefactorError;
pub use generate_definitions::{generate_definitions, GenerateDefinitionsRequest};
pub use implement_interface::{implement_interface, ImplementInterfaceRequest};

use crate::base::DEFAULT_TOKEN_SCAN_BUDGET;
use crate::config::RefactorConfig;
use crate::edit::Insertion;
use serde::Serialize;
use std::path::PathBuf;

/// Knobs shared by the actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefactorOptions {
    /// Prefix of each generated member line
    pub indent: String,
    /// Where interface headers are searched; defaults to the file's directory
    pub search_root: Option<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    pub token_scan_budget: usize,
    pub verify_syntax: bool,
}

impl Default for RefactorOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            search_root: None,
            include_dirs: Vec::new(),
            token_scan_budget: DEFAULT_TOKEN_SCAN_BUDGET,
            verify_syntax: true,
        }
    }
}

impl RefactorOptions {
    pub fn from_config(config: &RefactorConfig) -> Self {
        Self {
            indent: config.format.indent.clone(),
            search_root: config.search.root.clone(),
            include_dirs: config.parse.include_dirs.clone(),
            token_scan_budget: config.engine.token_scan_budget,
            verify_syntax: config.engine.verify_syntax,
        }
    }
}

/// Result of an action on one buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Patch {
    pub file: PathBuf,
    /// Insertions against the original buffer, in the order they were computed
    pub insertions: Vec<Insertion>,
    pub patched: String,
}

impl Patch {
    pub fn is_noop(&self) -> bool {
        self.insertions.iter().all(|i| i.code.is_empty())
    }
}
