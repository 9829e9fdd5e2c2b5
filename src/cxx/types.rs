//! Type spelling and light-weight name resolution.
//!
//! Names are qualified by looking them up in the scopes enclosing the use,
//! innermost first, against every type declared in the parsed files. A name
//! no scope claims falls back to the single declared type ending in it,
//! which covers `using namespace` imports.

use crate::cxx::facts::{TypeFact, TypeName};
use std::collections::BTreeSet;
use tree_sitter::Node;

/// Every type name declared in a translation unit, fully qualified.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    known: BTreeSet<String>,
}

impl TypeIndex {
    pub fn insert(&mut self, qualified_name: impl Into<String>) {
        self.known.insert(qualified_name.into());
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.known.contains(qualified_name)
    }

    /// Qualify `name` as seen from inside `scope`.
    pub fn qualify(&self, name: &str, scope: &[String]) -> String {
        if let Some(global) = name.strip_prefix("::") {
            return global.to_string();
        }

        for depth in (0..=scope.len()).rev() {
            let candidate = join_scope(&scope[..depth], name);
            if self.known.contains(&candidate) {
                return candidate;
            }
        }

        let suffix = format!("::{name}");
        let mut imported = self.known.iter().filter(|k| k.ends_with(&suffix));
        match (imported.next(), imported.next()) {
            (Some(only), None) => only.clone(),
            _ => name.to_string(),
        }
    }
}

/// `a::b` + `C` → `a::b::C`.
pub fn join_scope(scope: &[String], name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", scope.join("::"), name)
    }
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Spell an integer type the way compilers print it: `unsigned` becomes
/// `unsigned int`, `long int` becomes `long`.
pub fn canonical_sized_type(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let unsigned = words.contains(&"unsigned");
    let signed = words.contains(&"signed");
    let short = words.contains(&"short");
    let longs = words.iter().filter(|w| **w == "long").count();
    let base = words
        .iter()
        .copied()
        .find(|w| matches!(*w, "char" | "double" | "float" | "int" | "__int128"));

    let core = match (short, longs, base) {
        (true, _, _) => "short",
        (_, 1, Some("double")) => "long double",
        (_, n, _) if n >= 2 => "long long",
        (_, 1, _) => "long",
        (_, _, Some(other)) => other,
        _ => "int",
    };

    if unsigned {
        format!("unsigned {core}")
    } else if signed && core == "char" {
        "signed char".to_string()
    } else {
        core.to_string()
    }
}

/// Turns tree-sitter type nodes into [`TypeFact`]s resolved from one scope.
pub struct TypeRenderer<'a> {
    pub source: &'a str,
    pub index: &'a TypeIndex,
    pub scope: &'a [String],
}

impl<'a> TypeRenderer<'a> {
    fn text(&self, node: Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }

    /// Type of a declaration-like node (`type` field plus `type_qualifier`
    /// children), or `None` when it has no type.
    pub fn type_of(&self, holder: Node<'_>, suffix: &str) -> Option<TypeFact> {
        let ty = holder.child_by_field_name("type")?;
        Some(TypeFact {
            prefix: self.qualifier_prefix(holder),
            name: self.type_name(ty),
            suffix: suffix.to_string(),
        })
    }

    fn qualifier_prefix(&self, holder: Node<'_>) -> String {
        let mut cursor = holder.walk();
        let qualifiers: Vec<&str> = holder
            .children(&mut cursor)
            .filter(|c| c.kind() == "type_qualifier")
            .map(|c| self.text(c))
            .collect();
        if qualifiers.is_empty() {
            String::new()
        } else {
            format!("{} ", qualifiers.join(" "))
        }
    }

    pub fn type_name(&self, node: Node<'_>) -> TypeName {
        match node.kind() {
            "primitive_type" => TypeName::Plain(self.text(node).to_string()),
            "sized_type_specifier" => TypeName::Plain(canonical_sized_type(self.text(node))),
            "type_identifier" | "identifier" => {
                TypeName::Plain(self.index.qualify(self.text(node), self.scope))
            }
            "template_type" => self.specialization("", node),
            "qualified_identifier" => self.qualified(node),
            _ => TypeName::Plain(collapse(self.text(node))),
        }
    }

    fn qualified(&self, node: Node<'_>) -> TypeName {
        let mut scopes = Vec::new();
        let mut current = node;
        while current.kind() == "qualified_identifier" {
            scopes.push(
                current
                    .child_by_field_name("scope")
                    .map(|s| collapse(self.text(s)))
                    .unwrap_or_default(),
            );
            match current.child_by_field_name("name") {
                Some(name) => current = name,
                None => return TypeName::Plain(collapse(self.text(node))),
            }
        }

        let prefix = format!("{}::", scopes.join("::"));
        if current.kind() == "template_type" {
            self.specialization(&prefix, current)
        } else {
            let spelled = format!("{prefix}{}", collapse(self.text(current)));
            TypeName::Plain(self.index.qualify(&spelled, self.scope))
        }
    }

    fn specialization(&self, prefix: &str, node: Node<'_>) -> TypeName {
        let template = node
            .child_by_field_name("name")
            .map(|n| format!("{prefix}{}", self.text(n)))
            .unwrap_or_else(|| format!("{prefix}{}", collapse(self.text(node))));

        let args = node
            .child_by_field_name("arguments")
            .map(|list| self.template_args(list))
            .unwrap_or_default();

        TypeName::Specialization {
            template: self.index.qualify(&template, self.scope),
            args,
        }
    }

    fn template_args(&self, list: Node<'_>) -> Vec<TypeFact> {
        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter(|arg| arg.kind() != "comment")
            .map(|arg| match arg.kind() {
                "type_descriptor" => {
                    let suffix = arg
                        .child_by_field_name("declarator")
                        .map(|d| collapse(self.text(d)))
                        .unwrap_or_default();
                    self.type_of(arg, &suffix)
                        .unwrap_or_else(|| TypeFact::plain(collapse(self.text(arg))))
                }
                _ => TypeFact {
                    prefix: String::new(),
                    name: self.type_name(arg),
                    suffix: String::new(),
                },
            })
            .collect()
    }
}
