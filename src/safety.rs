//! Write protection for `--write`.
//!
//! A patched file may only land inside the project that asked for it, and
//! never in generated or third-party code: build trees, package-manager
//! caches, system headers, or any directory the search is told to skip.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Package-manager caches below the home directory.
const DEPENDENCY_CACHES: &[&str] = &[".conan2", ".conan/data", ".cache/vcpkg", "vcpkg/packages"];

const SYSTEM_HEADER_DIRS: &[&str] = &["/usr/include", "/usr/local/include"];

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("{path} is outside the project at {workspace}")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("{path} is inside protected directory {forbidden}")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("{path} is under excluded directory '{name}'")]
    ExcludedDirectory { path: PathBuf, name: String },

    #[error("cannot resolve {path}: {source}")]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Decides whether a patched buffer may be written to a path.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    workspace_root: PathBuf,
    forbidden_paths: Vec<PathBuf>,
    excluded_names: Vec<String>,
}

fn canonical(path: &Path) -> Result<PathBuf, SafetyError> {
    path.canonicalize().map_err(|source| SafetyError::Canonicalize {
        path: path.to_path_buf(),
        source,
    })
}

impl WorkspaceGuard {
    /// Guard for a project rooted at `workspace_root`.
    pub fn new(workspace_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let workspace_root = canonical(workspace_root.as_ref())?;

        let home_caches = home::home_dir()
            .into_iter()
            .flat_map(|home| DEPENDENCY_CACHES.iter().map(move |cache| home.join(cache)));
        let system = SYSTEM_HEADER_DIRS.iter().map(PathBuf::from);
        let forbidden_paths = home_caches
            .chain(system)
            .filter_map(|dir| dir.canonicalize().ok())
            .collect();

        Ok(Self {
            workspace_root,
            forbidden_paths,
            excluded_names: ["build", "out", "_deps"].into_iter().map(String::from).collect(),
        })
    }

    /// Guard for patching `target`: the project is the directory holding the
    /// config file in effect, or the target's own directory without one.
    pub fn for_target(target: &Path, config_file: Option<&Path>) -> Result<Self, SafetyError> {
        let anchor = match config_file {
            Some(config) => canonical(config)?,
            None => canonical(target)?,
        };
        let root = anchor.parent().unwrap_or(&anchor).to_path_buf();
        Self::new(root)
    }

    /// Also refuse paths with any of these directory names below the root.
    pub fn excluding<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.excluded_names.contains(&name) {
                self.excluded_names.push(name);
            }
        }
        self
    }

    /// Also refuse anything under `dir`, if it exists.
    pub fn forbidding(mut self, dir: impl AsRef<Path>) -> Self {
        if let Ok(dir) = dir.as_ref().canonicalize() {
            self.forbidden_paths.push(dir);
        }
        self
    }

    /// Canonical path of `path` if a patch may be written to it. Relative
    /// paths are resolved from the current directory.
    ///
    /// Call again right before writing; the check is only as fresh as the
    /// filesystem it looked at.
    pub fn check(&self, path: &Path) -> Result<PathBuf, SafetyError> {
        let resolved = canonical(path)?;

        let Ok(relative) = resolved.strip_prefix(&self.workspace_root) else {
            return Err(SafetyError::OutsideWorkspace {
                path: resolved,
                workspace: self.workspace_root.clone(),
            });
        };

        if let Some(forbidden) = self.forbidden_paths.iter().find(|dir| resolved.starts_with(dir)) {
            return Err(SafetyError::ForbiddenPath {
                forbidden: forbidden.clone(),
                path: resolved,
            });
        }

        let parents = relative.parent().map(Path::components).into_iter().flatten();
        for component in parents {
            let Component::Normal(name) = component else {
                continue;
            };
            if let Some(name) = self.excluded_names.iter().find(|ex| name == ex.as_str()) {
                return Err(SafetyError::ExcludedDirectory {
                    name: name.clone(),
                    path: resolved.clone(),
                });
            }
        }

        Ok(resolved)
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }
}
