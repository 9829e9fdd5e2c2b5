use crate::config::schema::{RefactorConfig, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up from the target file towards the filesystem root.
pub const CONFIG_FILE_NAME: &str = ".cxx-patcher.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            ConfigError::Io { .. } => self,
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(path),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config from {}: {}", path.display(), source)
            }
            ConfigError::Toml { path, source } => match path {
                Some(path) => write!(f, "failed to parse config TOML ({}): {}", path.display(), source),
                None => write!(f, "failed to parse config TOML: {}", source),
            },
            ConfigError::Validation { path, source } => match path {
                Some(path) => write!(f, "invalid config ({}): {}", path.display(), source),
                None => write!(f, "invalid config: {}", source),
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<RefactorConfig, ConfigError> {
    let config: RefactorConfig =
        toml_edit::de::from_str(input).map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

/// Load a config file, anchoring its relative paths at the file's directory.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RefactorConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = load_from_str(&contents).map_err(|error| error.with_path(path))?;
    if let Some(dir) = path.parent() {
        config.resolve_paths(dir);
    }
    Ok(config)
}

/// Nearest `.cxx-patcher.toml` in the directory of `start` or any ancestor.
pub fn discover(start: &Path) -> Option<PathBuf> {
    let absolute = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    let first = if absolute.is_dir() {
        Some(absolute.as_path())
    } else {
        absolute.parent()
    };
    first
        .into_iter()
        .flat_map(Path::ancestors)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Effective configuration for work on `target`: the explicit file if given,
/// else the discovered one, else defaults. Also returns the file used.
pub fn load_for(
    target: &Path,
    explicit: Option<&Path>,
) -> Result<(RefactorConfig, Option<PathBuf>), ConfigError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover(target),
    };
    match path {
        Some(path) => {
            debug!(config = %path.display(), "loading config");
            Ok((load_from_path(&path)?, Some(path)))
        }
        None => {
            debug!("no config file found, using defaults");
            Ok((RefactorConfig::default(), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_all_defaults() {
        let config = load_from_str("").unwrap();
        assert_eq!(config, RefactorConfig::default());
        assert_eq!(config.format.indent, "    ");
        assert_eq!(config.engine.token_scan_budget, 4096);
        assert!(config.engine.verify_syntax);
        assert!(config.search.extensions.iter().any(|e| e == "hpp"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = load_from_str("[format]\nindent = \"\\t\"\n\n[engine]\nverify_syntax = false\n").unwrap();
        assert_eq!(config.format.indent, "\t");
        assert!(!config.engine.verify_syntax);
        assert_eq!(config.engine.token_scan_budget, 4096);
        assert_eq!(config.parse.max_include_depth, 8);
    }

    #[test]
    fn all_issues_are_reported_together() {
        let err = load_from_str(
            "[format]\nindent = \"--\"\n[search]\nextensions = []\n[engine]\ntoken_scan_budget = 0\n",
        )
        .unwrap_err();
        match err {
            ConfigError::Validation { path: None, source } => assert_eq!(source.issues.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn dotted_extension_rejected() {
        let err = load_from_str("[search]\nextensions = [\".hpp\"]\n").unwrap_err();
        assert!(err.to_string().contains("search.extensions"));
    }

    #[test]
    fn toml_error_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[engine\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { path: Some(_), .. }));
    }

    #[test]
    fn relative_paths_anchor_at_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[search]\nroot = \"src\"\n[parse]\ninclude_dirs = [\"include\", \"/opt/inc\"]\n").unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.search.root, Some(dir.path().join("src")));
        assert_eq!(
            config.parse.include_dirs,
            vec![dir.path().join("include"), PathBuf::from("/opt/inc")]
        );
    }

    #[test]
    fn discovery_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        let nested = dir.path().join("src/widgets");
        fs::create_dir_all(&nested).unwrap();
        let file = nested.join("button.cpp");
        fs::write(&file, "").unwrap();

        let found = discover(&file).unwrap();
        assert_eq!(found, dir.path().canonicalize().unwrap().join(CONFIG_FILE_NAME));
    }
}
