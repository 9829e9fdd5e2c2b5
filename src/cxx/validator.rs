use crate::cxx::errors::OracleError;
use crate::cxx::parser::CxxParser;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("patched {path} has {after} syntax error nodes, the original had {before}")]
    SyntaxErrorsIntroduced {
        path: std::path::PathBuf,
        before: usize,
        after: usize,
    },

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Check that a patch didn't make the buffer parse worse.
///
/// Offsets shift after insertions, so ERROR nodes are compared by count
/// rather than by position. Broken input stays acceptable as long as the
/// patch adds no new breakage.
pub fn validate_patch(path: &Path, original: &str, patched: &str) -> Result<(), ValidationError> {
    let mut parser = CxxParser::new()?;
    let before = parser.parse_with_source(original, path)?.error_count();
    let after = parser.parse_with_source(patched, path)?.error_count();

    if after > before {
        return Err(ValidationError::SyntaxErrorsIntroduced {
            path: path.to_path_buf(),
            before,
            after,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_patch_passes() {
        let original = "struct A {\n};\n";
        let patched = "struct A {\n    void f();\n};\n";
        assert!(validate_patch(Path::new("a.hpp"), original, patched).is_ok());
    }

    #[test]
    fn broken_patch_is_rejected() {
        let original = "struct A {\n};\n";
        let patched = "struct A {\n    void f(;\n};\n";
        let result = validate_patch(Path::new("a.hpp"), original, patched);
        assert!(matches!(
            result,
            Err(ValidationError::SyntaxErrorsIntroduced { before: 0, .. })
        ));
    }
}
