use crate::actions::{Patch, RefactorError, RefactorOptions};
use crate::base::base_specifier_insertion;
use crate::cxx::facts::ClassFact;
use crate::cxx::oracle::{DeclarationOracle, TranslationUnit};
use crate::cxx::validator::validate_patch;
use crate::edit::{apply_insertions, Insertion};
use crate::include::{include_insertion, include_spelling, is_included};
use crate::place::find_suitable_place;
use crate::pure_virtual::collect_override_declarations;
use crate::search::{SearchError, SymbolSearch};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct ImplementInterfaceRequest<'a> {
    pub path: &'a Path,
    pub text: &'a str,
    /// Zero-based line inside the class to extend
    pub line: usize,
    /// Interface to implement, plain or qualified
    pub interface: &'a str,
}

/// An abstract class verified to exist, with the unit it was found in.
struct ResolvedInterface {
    unit: TranslationUnit,
    class: ClassFact,
}

/// Make the class under the cursor implement `interface`: derive from it,
/// declare an override for every pure virtual it leaves open and include
/// its header.
pub fn implement_interface(
    oracle: &dyn DeclarationOracle,
    search: &dyn SymbolSearch,
    request: ImplementInterfaceRequest<'_>,
    options: &RefactorOptions,
) -> Result<Patch, RefactorError> {
    let ImplementInterfaceRequest {
        path,
        text,
        line,
        interface,
    } = request;

    let unit = oracle.parse(text, path)?;
    let class = unit
        .find_enclosing_class(line)
        .ok_or(RefactorError::ClassUnderCursorNotFound { line })?;
    debug!(class = %class.qualified_name, line, "class under cursor");

    let resolved = match find_in_unit(&unit, interface) {
        Some(found) => ResolvedInterface {
            class: found.clone(),
            unit: unit.clone(),
        },
        None => search_interface(oracle, search, &unit, path, interface, options)?,
    };
    let iface = &resolved.class;
    info!(
        interface = %iface.qualified_name,
        header = %iface.origin.display(),
        implementor = %class.qualified_name,
        "implementing interface"
    );

    let mut insertions = Vec::new();

    if !unit.covers_file(&iface.origin) {
        let spelling = include_spelling(&iface.origin, path, &options.include_dirs);
        if !is_included(text, &spelling) {
            insertions.push(include_insertion(text, &spelling));
        }
    }

    if let Some(base) =
        base_specifier_insertion(class, text, &iface.qualified_name, options.token_scan_budget)?
    {
        insertions.push(base);
    }

    let declarations = collect_override_declarations(&resolved.unit, iface, &class.qualified_name);
    let place = find_suitable_place(class);
    let mut block = String::new();
    if !declarations.is_empty() && place.needs_public_label {
        block.push_str("\npublic:");
    }
    for declaration in &declarations {
        block.push('\n');
        block.push_str(&options.indent);
        block.push_str(declaration);
    }
    debug!(
        offset = place.offset,
        needs_public_label = place.needs_public_label,
        count = declarations.len(),
        "member insertion point"
    );
    insertions.push(Insertion::new(block, place.offset));

    let patched = apply_insertions(text, &insertions)?;
    if options.verify_syntax {
        validate_patch(path, text, &patched)?;
    }

    Ok(Patch {
        file: path.to_path_buf(),
        insertions,
        patched,
    })
}

/// An abstract class of that name defined in the buffer or a header it
/// already includes.
fn find_in_unit<'u>(unit: &'u TranslationUnit, name: &'u str) -> Option<&'u ClassFact> {
    unit.classes_named(name).find(|c| unit.is_abstract(c))
}

fn search_interface(
    oracle: &dyn DeclarationOracle,
    search: &dyn SymbolSearch,
    unit: &TranslationUnit,
    path: &Path,
    name: &str,
    options: &RefactorOptions,
) -> Result<ResolvedInterface, RefactorError> {
    let root: PathBuf = match &options.search_root {
        Some(root) => root.clone(),
        None => path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
    };

    let mut seen: BTreeSet<String> = unit.classes.iter().map(|c| c.qualified_name.clone()).collect();
    let candidates = match search.search_class_or_struct_definition(&root, name) {
        Err(SearchError::RootNotFound(missing)) => {
            debug!(root = %missing.display(), "search root does not exist");
            Vec::new()
        }
        found => found?,
    };
    for candidate in candidates {
        if unit.covers_file(&candidate) {
            continue;
        }
        let candidate_unit = oracle.parse_file(&candidate)?;
        let verified = candidate_unit
            .classes_named(name)
            .find(|c| c.origin == candidate && candidate_unit.is_abstract(c))
            .cloned();
        match verified {
            Some(class) => {
                debug!(candidate = %candidate.display(), "interface verified");
                return Ok(ResolvedInterface {
                    unit: candidate_unit,
                    class,
                });
            }
            None => {
                debug!(candidate = %candidate.display(), "candidate rejected");
                seen.extend(candidate_unit.classes.iter().map(|c| c.qualified_name.clone()));
            }
        }
    }

    match search.known_class_names(&root) {
        Ok(names) => seen.extend(names),
        Err(SearchError::RootNotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }
    Err(RefactorError::InterfaceNotFound {
        name: name.to_string(),
        hint: closest_name(name, &seen),
    })
}

fn closest_name(name: &str, known: &BTreeSet<String>) -> Option<String> {
    known
        .iter()
        .filter(|k| k.as_str() != name)
        .map(|k| (strsim::jaro_winkler(name, k), k))
        .filter(|(score, _)| *score >= 0.85)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, k)| k.clone())
}
