use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Contents of a `.cxx-patcher.toml`. Every section is optional.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct RefactorConfig {
    #[serde(default)]
    pub format: FormatSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub parse: ParseSection,
    #[serde(default)]
    pub engine: EngineSection,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FormatSection {
    /// Prefix of every generated member line
    #[serde(default = "default_indent")]
    pub indent: String,
}

impl Default for FormatSection {
    fn default() -> Self {
        Self {
            indent: default_indent(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SearchSection {
    /// Directory searched for interface headers; relative to the config file
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Directory names never descended into
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            root: None,
            extensions: default_extensions(),
            exclude: default_exclude(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ParseSection {
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: usize,
}

impl Default for ParseSection {
    fn default() -> Self {
        Self {
            include_dirs: Vec::new(),
            max_include_depth: default_max_include_depth(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EngineSection {
    #[serde(default = "default_token_scan_budget")]
    pub token_scan_budget: usize,
    /// Reject results that parse with more errors than their input
    #[serde(default = "default_true")]
    pub verify_syntax: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            token_scan_budget: default_token_scan_budget(),
            verify_syntax: true,
        }
    }
}

fn default_indent() -> String {
    "    ".to_string()
}

fn default_extensions() -> Vec<String> {
    ["h", "hh", "hpp", "hxx", "h++", "ipp", "inl"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_exclude() -> Vec<String> {
    [".git", "build"].into_iter().map(String::from).collect()
}

fn default_max_include_depth() -> usize {
    crate::cxx::extract::DEFAULT_MAX_INCLUDE_DEPTH
}

fn default_token_scan_budget() -> usize {
    crate::base::DEFAULT_TOKEN_SCAN_BUDGET
}

fn default_true() -> bool {
    true
}

const MAX_INCLUDE_DEPTH_LIMIT: usize = 64;

impl RefactorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.format.indent.chars().any(|c| c != ' ' && c != '\t') {
            issues.push(ValidationIssue::InvalidValue {
                field: "format.indent",
                message: "only spaces and tabs are allowed".to_string(),
            });
        }

        if self.search.extensions.is_empty() {
            issues.push(ValidationIssue::EmptyList {
                field: "search.extensions",
            });
        }
        for ext in &self.search.extensions {
            if ext.trim().is_empty() || ext.starts_with('.') {
                issues.push(ValidationIssue::InvalidValue {
                    field: "search.extensions",
                    message: format!("'{ext}' must be a bare extension like \"hpp\""),
                });
            }
        }

        if self.parse.max_include_depth > MAX_INCLUDE_DEPTH_LIMIT {
            issues.push(ValidationIssue::InvalidValue {
                field: "parse.max_include_depth",
                message: format!("must be at most {MAX_INCLUDE_DEPTH_LIMIT}"),
            });
        }

        if self.engine.token_scan_budget == 0 {
            issues.push(ValidationIssue::InvalidValue {
                field: "engine.token_scan_budget",
                message: "must be greater than zero".to_string(),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Anchor relative `search.root` and `parse.include_dirs` at `base`, the
    /// directory holding the config file.
    pub fn resolve_paths(&mut self, base: &Path) {
        if let Some(root) = &self.search.root {
            if root.is_relative() {
                self.search.root = Some(base.join(root));
            }
        }
        for dir in &mut self.parse.include_dirs {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyList {
        field: &'static str,
    },
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyList { field } => write!(f, "'{field}' must not be empty"),
            ValidationIssue::InvalidValue { field, message } => {
                write!(f, "invalid '{field}': {message}")
            }
        }
    }
}
