//! Plain, immutable snapshots of C++ declarations.
//!
//! The refactoring engine never touches a syntax tree. Everything it needs
//! about a class or a method is captured here by a [`DeclarationOracle`]
//! and consumed read-only.
//!
//! [`DeclarationOracle`]: crate::cxx::DeclarationOracle

use serde::Serialize;
use std::collections::BTreeSet;
use std::ops::Range;
use std::path::PathBuf;

/// Member access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessSpecifier {
    Public,
    Protected,
    Private,
}

impl AccessSpecifier {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().trim_end_matches(':').trim() {
            "public" => Some(AccessSpecifier::Public),
            "protected" => Some(AccessSpecifier::Protected),
            "private" => Some(AccessSpecifier::Private),
            _ => None,
        }
    }

    /// Access a member gets before any label: public for structs, private for classes.
    pub fn implicit_for(is_struct: bool) -> Self {
        if is_struct {
            AccessSpecifier::Public
        } else {
            AccessSpecifier::Private
        }
    }
}

/// Position of a method written in the class body. Compiler-generated
/// members never get a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSlot {
    /// Byte range of the whole member declaration or definition
    pub range: Range<usize>,
    /// Effective access: the last label, else the class/struct default
    pub access: AccessSpecifier,
}

impl MethodSlot {
    /// A user-declared method with public access, by label or by the
    /// struct default.
    pub fn is_explicit_public(&self) -> bool {
        self.access == AccessSpecifier::Public
    }
}

/// A class or struct definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassFact {
    pub qualified_name: String,
    pub is_struct: bool,
    /// Offset of the `class`/`struct` keyword
    pub start_offset: usize,
    /// From the opening brace up to and including the closing brace
    pub body_range: Range<usize>,
    /// First and last zero-based line of the definition
    pub line_range: (usize, usize),
    /// Number of enclosing class definitions
    pub depth: usize,
    /// End of the `: Base, ...` clause, if the class has one
    pub base_clause_end: Option<usize>,
    /// Direct bases in base-clause order, resolved where possible
    pub bases: Vec<String>,
    pub methods: Vec<MethodSlot>,
    /// Offsets just past the colon of each `public:` label
    pub public_label_offsets: Vec<usize>,
    pub transitive_base_names: BTreeSet<String>,
    /// Own pure-virtual methods in declaration order
    pub pure_virtuals: Vec<MethodFact>,
    /// File the definition was read from
    pub origin: PathBuf,
}

impl ClassFact {
    pub fn has_base_clause(&self) -> bool {
        self.base_clause_end.is_some()
    }

    pub fn derives_from(&self, qualified_name: &str) -> bool {
        self.transitive_base_names.contains(qualified_name)
    }

    /// Ranges of user-declared public methods, in body order.
    pub fn explicit_public_method_ranges(&self) -> impl Iterator<Item = &Range<usize>> {
        self.methods
            .iter()
            .filter(|m| m.is_explicit_public())
            .map(|m| &m.range)
    }

    pub fn contains_line(&self, line: usize) -> bool {
        self.line_range.0 <= line && line <= self.line_range.1
    }

    /// Unqualified class name.
    pub fn name(&self) -> &str {
        crate::scope::split_qualified(&self.qualified_name)
            .last()
            .copied()
            .unwrap_or(&self.qualified_name)
    }
}

/// Spelling of a type, with names resolved to their qualified form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeFact {
    /// Leading qualifiers, e.g. `const `
    pub prefix: String,
    pub name: TypeName,
    /// Trailing declarator operators, e.g. `&` or ` const*`
    pub suffix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeName {
    Plain(String),
    Specialization { template: String, args: Vec<TypeFact> },
}

impl TypeFact {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            prefix: String::new(),
            name: TypeName::Plain(name.into()),
            suffix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamFact {
    pub ty: TypeFact,
    pub name: Option<String>,
    /// Authored default argument; never rendered into generated code
    pub default_value: Option<String>,
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodFact {
    /// Authored name: `run`, `~Widget`, `operator bool`, `operator==`
    pub name: String,
    /// Enclosing class, or namespace for free functions (empty at global scope)
    pub parent_qualified_name: String,
    /// Absent for constructors, destructors and conversion operators
    pub return_type: Option<TypeFact>,
    pub params: Vec<ParamFact>,
    /// Trailing qualifiers in source order: `const`, `&&`, `noexcept`, ...
    pub qualifiers: Vec<String>,
    /// `[[...]]` attributes in source order
    pub attributes: Vec<String>,
    /// `template <...>` header of a member or function template
    pub template_header: Option<String>,
    /// `<T, U>` of an enclosing class template, needed to name it out of line
    pub parent_template_args: Option<String>,
    pub is_pure: bool,
    pub is_virtual: bool,
    pub is_defaulted: bool,
    pub is_deleted: bool,
    pub is_member: bool,
    pub access: AccessSpecifier,
    /// Zero-based line the declaration starts on
    pub line: usize,
    /// Declaration text as written
    pub signature_text: String,
}

impl MethodFact {
    /// `Parent::name`, or just the name at global scope.
    pub fn qualified_name(&self) -> String {
        if self.parent_qualified_name.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.parent_qualified_name, self.name)
        }
    }

    /// Authored signature with resolved, fully qualified types.
    pub fn render_signature(&self) -> String {
        crate::synth::signature(self, crate::synth::NameStyle::Qualified, false)
    }

    pub fn is_destructor(&self) -> bool {
        self.name.starts_with('~')
    }

    /// Pure, defaulted and deleted functions never get a generated body.
    pub fn wants_definition(&self) -> bool {
        !(self.is_pure || self.is_defaulted || self.is_deleted)
    }
}

/// Identity of an existing function body, used to skip already-defined
/// declarations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DefinitionKey {
    pub qualified_name: String,
    pub arity: usize,
    pub is_const: bool,
}

impl DefinitionKey {
    pub fn of(method: &MethodFact) -> Self {
        Self {
            qualified_name: method.qualified_name(),
            arity: method.params.len(),
            is_const: method.qualifiers.iter().any(|q| q == "const"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_parsing() {
        assert_eq!(AccessSpecifier::parse("public"), Some(AccessSpecifier::Public));
        assert_eq!(AccessSpecifier::parse("protected:"), Some(AccessSpecifier::Protected));
        assert_eq!(AccessSpecifier::parse("friend"), None);
        assert_eq!(AccessSpecifier::implicit_for(true), AccessSpecifier::Public);
        assert_eq!(AccessSpecifier::implicit_for(false), AccessSpecifier::Private);
    }
}
