use crate::actions::RefactorError;
use crate::cxx::oracle::DeclarationOracle;
use crate::synth::definition_skeleton;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct GenerateDefinitionsRequest<'a> {
    pub path: &'a Path,
    pub text: &'a str,
    /// First zero-based line of the selection
    pub begin: usize,
    /// Last zero-based line of the selection, inclusive
    pub end: usize,
}

/// Empty definitions for the declarations starting inside the selection,
/// separated by blank lines.
///
/// Pure, defaulted and deleted functions are skipped, as is anything that
/// already has a body in the parsed files. Returns an empty string when
/// nothing qualifies.
pub fn generate_definitions(
    oracle: &dyn DeclarationOracle,
    request: GenerateDefinitionsRequest<'_>,
) -> Result<String, RefactorError> {
    let GenerateDefinitionsRequest {
        path,
        text,
        begin,
        end,
    } = request;
    if begin > end {
        return Err(RefactorError::SelectedRangeInverted { begin, end });
    }

    let unit = oracle.parse(text, path)?;
    let skeletons: Vec<String> = unit
        .declarations
        .iter()
        .filter(|d| (begin..=end).contains(&d.line))
        .filter(|d| d.wants_definition() && !unit.is_defined(d))
        .map(definition_skeleton)
        .collect();

    debug!(
        path = %path.display(),
        begin,
        end,
        generated = skeletons.len(),
        "generated definitions"
    );
    Ok(skeletons.join("\n"))
}
