use crate::cxx::errors::OracleError;
use crate::cxx::facts::{ClassFact, DefinitionKey, MethodFact};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Answers structured questions about C++ source.
///
/// Implementations turn text into a [`TranslationUnit`] of plain facts; the
/// refactoring engine never sees the syntax tree behind them.
pub trait DeclarationOracle {
    fn parse(&self, text: &str, virtual_path: &Path) -> Result<TranslationUnit, OracleError>;

    /// Read and parse a file from disk.
    fn parse_file(&self, path: &Path) -> Result<TranslationUnit, OracleError> {
        let text = fs::read_to_string(path).map_err(|source| OracleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(&text, path)
    }
}

/// Facts from one parse: the main file plus whatever headers it pulled in.
#[derive(Debug, Clone, Default)]
pub struct TranslationUnit {
    /// Path of the parsed buffer
    pub path: PathBuf,
    /// Class definitions, main file first, each file in source order
    pub classes: Vec<ClassFact>,
    /// Non-defining function declarations of the main file
    pub declarations: Vec<MethodFact>,
    /// Functions with a body anywhere in the unit
    pub definitions: HashSet<DefinitionKey>,
    /// Headers resolved from local `#include` directives
    pub included_files: Vec<PathBuf>,
}

impl TranslationUnit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// The most deeply nested class of the main file whose lines contain `line`.
    pub fn find_enclosing_class(&self, line: usize) -> Option<&ClassFact> {
        self.classes
            .iter()
            .filter(|c| c.origin == self.path && c.contains_line(line))
            .max_by(|a, b| {
                a.depth.cmp(&b.depth).then_with(|| {
                    // narrower wins among equals
                    let span_a = a.line_range.1 - a.line_range.0;
                    let span_b = b.line_range.1 - b.line_range.0;
                    span_b.cmp(&span_a)
                })
            })
    }

    /// First class whose name is exactly `name`.
    pub fn find_class_by_name(&self, name: &str) -> Option<&ClassFact> {
        self.classes_named(name).next()
    }

    /// Classes matching `name`: an unqualified name matches the last segment,
    /// a qualified one must match entirely.
    pub fn classes_named<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a ClassFact> + use<'a, 'b> {
        let name = name.trim().trim_start_matches("::");
        let qualified = name.contains("::");
        self.classes.iter().filter(move |c| {
            if qualified {
                c.qualified_name == name
            } else {
                c.name() == name
            }
        })
    }

    pub fn class_by_qualified_name(&self, qualified_name: &str) -> Option<&ClassFact> {
        let base = strip_template_args(qualified_name);
        self.classes.iter().find(|c| c.qualified_name == base)
    }

    /// Every base of `class` known to this unit, in base-clause order.
    ///
    /// Depth first: a base's own bases come before the base itself. Each
    /// class appears once even when reached along several paths.
    pub fn transitive_bases(&self, class: &ClassFact) -> Vec<&ClassFact> {
        let mut visited = BTreeSet::new();
        visited.insert(class.qualified_name.clone());
        let mut ordered = Vec::new();
        self.collect_bases(class, &mut visited, &mut ordered);
        ordered
    }

    fn collect_bases<'a>(
        &'a self,
        class: &ClassFact,
        visited: &mut BTreeSet<String>,
        ordered: &mut Vec<&'a ClassFact>,
    ) {
        for base in &class.bases {
            let Some(base_class) = self.class_by_qualified_name(base) else {
                continue;
            };
            if !visited.insert(base_class.qualified_name.clone()) {
                continue;
            }
            self.collect_bases(base_class, visited, ordered);
            ordered.push(base_class);
        }
    }

    /// Whether `class` has a pure-virtual method of its own or inherited.
    pub fn is_abstract(&self, class: &ClassFact) -> bool {
        !class.pure_virtuals.is_empty()
            || self
                .transitive_bases(class)
                .iter()
                .any(|b| !b.pure_virtuals.is_empty())
    }

    pub fn is_defined(&self, method: &MethodFact) -> bool {
        self.definitions.contains(&DefinitionKey::of(method))
    }

    /// Whether `path` is the main file or one of the headers it includes.
    pub fn covers_file(&self, path: &Path) -> bool {
        same_file(&self.path, path) || self.included_files.iter().any(|f| same_file(f, path))
    }
}

fn strip_template_args(name: &str) -> &str {
    match name.find('<') {
        Some(i) => &name[..i],
        None => name,
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
