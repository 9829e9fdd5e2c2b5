//! Declaration oracle backed by tree-sitter's C++ grammar.

use crate::cxx::errors::OracleError;
use crate::cxx::facts::{
    AccessSpecifier, ClassFact, DefinitionKey, MethodFact, MethodSlot, ParamFact, TypeFact,
};
use crate::cxx::oracle::{DeclarationOracle, TranslationUnit};
use crate::cxx::parser::CxxParser;
use crate::cxx::types::{collapse, join_scope, TypeIndex, TypeRenderer};
use crate::scope::split_qualified;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Tree};
use tracing::{debug, warn};

/// Headers followed through local `#include "..."` directives by default.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 8;

/// Reads facts straight off a tree-sitter parse.
///
/// Local includes are resolved next to the including file, then in
/// `include_dirs`, so classes and bases spread across headers are visible.
/// System includes are never followed.
#[derive(Debug, Clone)]
pub struct TreeSitterOracle {
    include_dirs: Vec<PathBuf>,
    max_include_depth: usize,
}

impl Default for TreeSitterOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeSitterOracle {
    pub fn new() -> Self {
        Self {
            include_dirs: Vec::new(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    pub fn with_include_dirs(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.include_dirs.extend(dirs);
        self
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    fn resolve_include(&self, including: &Path, spelled: &str) -> Option<PathBuf> {
        let local = including.parent().map(|dir| dir.join(spelled));
        local
            .into_iter()
            .chain(self.include_dirs.iter().map(|dir| dir.join(spelled)))
            .find(|candidate| candidate.is_file())
    }
}

struct SourceFile {
    path: PathBuf,
    text: String,
    tree: Tree,
}

impl DeclarationOracle for TreeSitterOracle {
    fn parse(&self, text: &str, virtual_path: &Path) -> Result<TranslationUnit, OracleError> {
        let mut parser = CxxParser::new()?;
        let mut files: Vec<SourceFile> = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut pending = vec![(virtual_path.to_path_buf(), text.to_string(), 0usize)];
        seen.insert(identity(virtual_path));

        // Breadth-first over local includes; the main file stays first.
        while !pending.is_empty() {
            let (path, text, depth) = pending.remove(0);
            let tree = parser.parse_with_source(&text, &path)?.tree;

            if depth < self.max_include_depth {
                for spelled in local_includes(tree.root_node(), &text) {
                    let Some(resolved) = self.resolve_include(&path, &spelled) else {
                        debug!(include = %spelled, from = %path.display(), "include not resolved");
                        continue;
                    };
                    if !seen.insert(identity(&resolved)) {
                        continue;
                    }
                    match fs::read_to_string(&resolved) {
                        Ok(contents) => pending.push((resolved, contents, depth + 1)),
                        Err(e) => warn!(path = %resolved.display(), error = %e, "skipping unreadable include"),
                    }
                }
            }

            files.push(SourceFile { path, text, tree });
        }

        let mut index = TypeIndex::default();
        for file in &files {
            index_types(file.tree.root_node(), &file.text, &mut Vec::new(), &mut index);
        }

        let mut unit = TranslationUnit::new(virtual_path);
        for (position, file) in files.iter().enumerate() {
            let mut extractor = Extractor {
                source: &file.text,
                origin: &file.path,
                index: &index,
                is_main: position == 0,
                classes: Vec::new(),
                declarations: Vec::new(),
                definitions: Vec::new(),
            };
            extractor.walk_scope(file.tree.root_node(), &[], &[]);

            let Extractor {
                mut classes,
                declarations,
                definitions,
                ..
            } = extractor;
            classes.sort_by_key(|c| c.start_offset);
            unit.classes.extend(classes);
            unit.declarations.extend(declarations);
            unit.definitions.extend(definitions);
            if position > 0 {
                unit.included_files.push(file.path.clone());
            }
        }

        fill_transitive_base_names(&mut unit.classes);
        debug!(
            path = %virtual_path.display(),
            classes = unit.classes.len(),
            declarations = unit.declarations.len(),
            headers = unit.included_files.len(),
            "parsed translation unit"
        );
        Ok(unit)
    }
}

fn identity(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn text<'s>(source: &'s str, node: Node<'_>) -> &'s str {
    &source[node.byte_range()]
}

/// `#include "..."` spellings anywhere in the tree, in source order.
fn local_includes(root: Node<'_>, source: &str) -> Vec<String> {
    let mut includes = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == "preproc_include" {
            if let Some(path) = node.child_by_field_name("path") {
                if path.kind() == "string_literal" {
                    includes.push(text(source, path).trim_matches('"').to_string());
                }
            }
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    includes
}

fn is_class_kind(kind: &str) -> bool {
    matches!(kind, "class_specifier" | "struct_specifier")
}

fn is_container_kind(kind: &str) -> bool {
    matches!(
        kind,
        "preproc_ifdef" | "preproc_if" | "preproc_else" | "preproc_elif" | "preproc_elifdef" | "declaration_list"
    )
}

/// First pass: every declared type name, so uses can be qualified later.
fn index_types(node: Node<'_>, source: &str, scope: &mut Vec<String>, index: &mut TypeIndex) {
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
    for child in children {
        match child.kind() {
            "namespace_definition" => {
                let segments = child
                    .child_by_field_name("name")
                    .map(|n| owned_segments(text(source, n)))
                    .unwrap_or_default();
                if let Some(body) = child.child_by_field_name("body") {
                    let depth = scope.len();
                    scope.extend(segments);
                    index_types(body, source, scope, index);
                    scope.truncate(depth);
                }
            }
            "class_specifier" | "struct_specifier" | "union_specifier" | "enum_specifier" => {
                let Some(name) = child.child_by_field_name("name") else {
                    continue;
                };
                let name = collapse(text(source, name));
                index.insert(join_scope(scope, &name));
                if let Some(body) = child.child_by_field_name("body") {
                    let depth = scope.len();
                    scope.extend(owned_segments(&name));
                    index_types(body, source, scope, index);
                    scope.truncate(depth);
                }
            }
            "type_definition" => {
                let mut inner = child.walk();
                for declarator in child.children_by_field_name("declarator", &mut inner) {
                    if declarator.kind() == "type_identifier" {
                        index.insert(join_scope(scope, text(source, declarator)));
                    }
                }
                index_types(child, source, scope, index);
            }
            "alias_declaration" => {
                if let Some(name) = child.child_by_field_name("name") {
                    index.insert(join_scope(scope, text(source, name)));
                }
            }
            "template_declaration" | "declaration" | "field_declaration" | "field_declaration_list"
            | "linkage_specification" => index_types(child, source, scope, index),
            kind if is_container_kind(kind) => index_types(child, source, scope, index),
            _ => {}
        }
    }
}

fn owned_segments(name: &str) -> Vec<String> {
    split_qualified(name).into_iter().map(str::to_string).collect()
}

/// Class the walk is currently inside of.
struct ClassContext {
    qualified_name: String,
    scope: Vec<String>,
    depth: usize,
    template_header: Option<String>,
    template_args: Option<String>,
}

/// Function declarator plus what wraps it.
struct FunctionParts<'t> {
    function: Node<'t>,
    /// Set for conversion operators
    cast: Option<Node<'t>>,
    /// Pointer/reference operators between the type and the function name
    ops: String,
}

struct Extractor<'a> {
    source: &'a str,
    origin: &'a Path,
    index: &'a TypeIndex,
    is_main: bool,
    classes: Vec<ClassFact>,
    declarations: Vec<MethodFact>,
    definitions: Vec<DefinitionKey>,
}

impl<'a> Extractor<'a> {
    fn text(&self, node: Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }

    fn renderer<'s>(&'s self, scope: &'s [String]) -> TypeRenderer<'s> {
        TypeRenderer {
            source: self.source,
            index: self.index,
            scope,
        }
    }

    fn walk_scope(&mut self, node: Node<'_>, scope: &[String], template: &[String]) {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        for child in children {
            self.visit_item(child, scope, template);
        }
    }

    /// One namespace-scope item.
    fn visit_item(&mut self, node: Node<'_>, scope: &[String], template: &[String]) {
        match node.kind() {
            "namespace_definition" => {
                let mut inner = scope.to_vec();
                if let Some(name) = node.child_by_field_name("name") {
                    inner.extend(owned_segments(self.text(name)));
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.walk_scope(body, &inner, &[]);
                }
            }
            kind if is_class_kind(kind) => self.visit_class(node, scope, 0, template),
            "template_declaration" => {
                if let Some((header, inner)) = self.split_template(node) {
                    let mut headers = template.to_vec();
                    headers.push(header);
                    self.visit_item(inner, scope, &headers);
                }
            }
            "declaration" => {
                if let Some(parts) = self.function_parts(node) {
                    if self.is_main {
                        let header = join_headers(template);
                        if let Some(fact) = self.method_fact(
                            node,
                            &parts,
                            &scope.join("::"),
                            scope,
                            AccessSpecifier::Public,
                            header,
                            None,
                            false,
                        ) {
                            self.declarations.push(fact);
                        }
                    }
                } else if let Some(ty) = node.child_by_field_name("type") {
                    if is_class_kind(ty.kind()) {
                        self.visit_class(ty, scope, 0, template);
                    }
                }
            }
            "function_definition" => {
                if let Some(key) = self.definition_key(node, scope) {
                    self.definitions.push(key);
                }
            }
            "linkage_specification" => {
                if let Some(body) = node.child_by_field_name("body") {
                    if body.kind() == "declaration_list" {
                        self.walk_scope(body, scope, template);
                    } else {
                        self.visit_item(body, scope, template);
                    }
                }
            }
            kind if is_container_kind(kind) => self.walk_scope(node, scope, template),
            _ => {}
        }
    }

    /// `template <...> X` → (`template <...>`, X).
    fn split_template<'t>(&self, node: Node<'t>) -> Option<(String, Node<'t>)> {
        let mut cursor = node.walk();
        let inner = node
            .named_children(&mut cursor)
            .filter(|c| c.kind() != "template_parameter_list" && c.kind() != "comment")
            .last()?;
        let header = collapse(&self.source[node.start_byte()..inner.start_byte()]);
        Some((header, inner))
    }

    fn template_args(&self, template_decl: Node<'_>) -> Option<String> {
        let params = template_decl.child_by_field_name("parameters")?;
        let mut cursor = params.walk();
        let names: Vec<String> = params
            .named_children(&mut cursor)
            .filter_map(|p| {
                let name = p
                    .child_by_field_name("name")
                    .or_else(|| p.child_by_field_name("declarator"))
                    .or_else(|| {
                        let mut inner = p.walk();
                        let found = p
                            .named_children(&mut inner)
                            .find(|c| matches!(c.kind(), "type_identifier" | "identifier"));
                        found
                    })?;
                let name = collapse(self.text(name)).trim_start_matches("...").trim().to_string();
                if p.kind().starts_with("variadic") {
                    Some(format!("{name}..."))
                } else {
                    Some(name)
                }
            })
            .collect();
        Some(format!("<{}>", names.join(", ")))
    }

    fn visit_class(&mut self, node: Node<'_>, scope: &[String], depth: usize, template: &[String]) {
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = collapse(self.text(name_node));
        let qualified_name = join_scope(scope, &name);
        let mut class_scope = scope.to_vec();
        class_scope.extend(owned_segments(&name));

        let template_args = node
            .parent()
            .filter(|p| p.kind() == "template_declaration" && !template.is_empty())
            .and_then(|p| self.template_args(p));
        let ctx = ClassContext {
            qualified_name: qualified_name.clone(),
            scope: class_scope,
            depth,
            template_header: join_headers(template),
            template_args,
        };

        let mut base_clause_end = None;
        let mut bases = Vec::new();
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        for child in children.iter().filter(|c| c.kind() == "base_class_clause") {
            base_clause_end = Some(child.end_byte());
            let mut inner = child.walk();
            for base in child.named_children(&mut inner) {
                if matches!(base.kind(), "type_identifier" | "qualified_identifier" | "template_type") {
                    let ty = TypeFact {
                        prefix: String::new(),
                        name: self.renderer(scope).type_name(base),
                        suffix: String::new(),
                    };
                    bases.push(ty.to_string());
                }
            }
        }

        let is_struct = node.kind() == "struct_specifier";
        let mut methods = Vec::new();
        let mut public_label_offsets = Vec::new();
        let mut pure_virtuals = Vec::new();
        let mut access: Option<AccessSpecifier> = None;
        let implicit = AccessSpecifier::implicit_for(is_struct);

        let mut member_cursor = body.walk();
        let members: Vec<Node<'_>> = body.named_children(&mut member_cursor).collect();
        for member in members {
            let current = access.unwrap_or(implicit);
            match member.kind() {
                "access_specifier" => {
                    access = AccessSpecifier::parse(self.text(member));
                    if access == Some(AccessSpecifier::Public) {
                        if let Some(end) = label_end(self.source, member.start_byte(), body.end_byte()) {
                            public_label_offsets.push(end);
                        }
                    }
                }
                "field_declaration" | "declaration" | "function_definition" | "template_declaration" => {
                    let (decl, header) = if member.kind() == "template_declaration" {
                        match self.split_template(member) {
                            Some((header, inner)) => (inner, Some(header)),
                            None => continue,
                        }
                    } else {
                        (member, None)
                    };

                    if decl.kind() == "function_definition" {
                        methods.push(MethodSlot {
                            range: member.byte_range(),
                            access: current,
                        });
                        if let Some(key) = self.definition_key(decl, &ctx.scope) {
                            self.definitions.push(key);
                        }
                        continue;
                    }

                    if let Some(parts) = self.function_parts(decl) {
                        methods.push(MethodSlot {
                            range: member.byte_range(),
                            access: current,
                        });
                        let headers = [ctx.template_header.clone(), header]
                            .into_iter()
                            .flatten()
                            .collect::<Vec<_>>();
                        let Some(fact) = self.method_fact(
                            decl,
                            &parts,
                            &ctx.qualified_name,
                            &ctx.scope,
                            current,
                            join_headers(&headers),
                            ctx.template_args.clone(),
                            true,
                        ) else {
                            continue;
                        };
                        if fact.is_pure {
                            pure_virtuals.push(fact.clone());
                        }
                        if self.is_main {
                            self.declarations.push(fact);
                        }
                    } else if let Some(ty) = decl.child_by_field_name("type") {
                        if is_class_kind(ty.kind()) {
                            let nested_template: Vec<String> = header.into_iter().collect();
                            self.visit_class(ty, &ctx.scope, ctx.depth + 1, &nested_template);
                        }
                    } else if is_class_kind(decl.kind()) {
                        let nested_template: Vec<String> = header.into_iter().collect();
                        self.visit_class(decl, &ctx.scope, ctx.depth + 1, &nested_template);
                    }
                }
                _ => {}
            }
        }

        let start = node.start_position().row;
        let end = node.end_position().row;
        self.classes.push(ClassFact {
            qualified_name,
            is_struct,
            start_offset: node.start_byte(),
            body_range: body.byte_range(),
            line_range: (start, end),
            depth,
            base_clause_end,
            bases,
            methods,
            public_label_offsets,
            transitive_base_names: BTreeSet::new(),
            pure_virtuals,
            origin: self.origin.to_path_buf(),
        });
    }

    /// Locate the function declarator of a declaration, if it declares a function.
    fn function_parts<'t>(&self, decl: Node<'t>) -> Option<FunctionParts<'t>> {
        let mut node = decl.child_by_field_name("declarator")?;
        let mut ops = String::new();
        loop {
            match node.kind() {
                "function_declarator" => {
                    let target = node.child_by_field_name("declarator")?;
                    // `void (*fp)(int)` declares a variable
                    if target.kind() == "parenthesized_declarator" {
                        return None;
                    }
                    return Some(FunctionParts {
                        function: node,
                        cast: None,
                        ops,
                    });
                }
                "operator_cast" => {
                    let function = node.child_by_field_name("declarator")?;
                    return Some(FunctionParts {
                        function,
                        cast: Some(node),
                        ops,
                    });
                }
                "pointer_declarator" | "reference_declarator" | "attributed_declarator" => {
                    let inner = inner_declarator(node)?;
                    if node.kind() != "attributed_declarator" {
                        ops.push_str(&collapse(&self.source[node.start_byte()..inner.start_byte()]));
                    }
                    node = inner;
                }
                _ => return None,
            }
        }
    }

    fn function_name(&self, parts: &FunctionParts<'_>, scope: &[String]) -> Option<String> {
        if let Some(cast) = parts.cast {
            let ty = self.renderer(scope).type_of(cast, "")?;
            return Some(format!("operator {ty}"));
        }
        let target = parts.function.child_by_field_name("declarator")?;
        Some(collapse(self.text(target)))
    }

    fn params(&self, function: Node<'_>, scope: &[String]) -> Vec<ParamFact> {
        let Some(list) = function.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut cursor = list.walk();
        let children: Vec<Node<'_>> = list.children(&mut cursor).collect();
        children
            .into_iter()
            .filter_map(|param| match param.kind() {
                "parameter_declaration" | "optional_parameter_declaration" | "variadic_parameter_declaration" => {
                    self.param_fact(param, scope)
                }
                "..." => Some(ParamFact {
                    ty: TypeFact::plain("..."),
                    name: None,
                    default_value: None,
                }),
                _ => None,
            })
            .collect()
    }

    fn param_fact(&self, param: Node<'_>, scope: &[String]) -> Option<ParamFact> {
        let (ops, name) = match param.child_by_field_name("declarator") {
            Some(declarator) => self.split_declarator(declarator),
            None => (String::new(), None),
        };
        let ty = self.renderer(scope).type_of(param, &ops)?;
        let default_value = param
            .child_by_field_name("default_value")
            .map(|d| collapse(self.text(d)));
        Some(ParamFact {
            ty,
            name,
            default_value,
        })
    }

    /// Split a parameter declarator into operators and the declared name.
    fn split_declarator(&self, node: Node<'_>) -> (String, Option<String>) {
        match node.kind() {
            "identifier" | "field_identifier" => (String::new(), Some(self.text(node).to_string())),
            "pointer_declarator" | "reference_declarator" | "variadic_declarator" => {
                match inner_declarator(node) {
                    Some(inner) => {
                        let op = collapse(&self.source[node.start_byte()..inner.start_byte()]);
                        let (rest, name) = self.split_declarator(inner);
                        (format!("{op}{rest}"), name)
                    }
                    None => (collapse(self.text(node)), None),
                }
            }
            "abstract_pointer_declarator" | "abstract_reference_declarator" => {
                (collapse(self.text(node)), None)
            }
            _ => (String::new(), Some(collapse(self.text(node)))),
        }
    }

    fn qualifiers(&self, function: Node<'_>) -> Vec<String> {
        let params_end = function
            .child_by_field_name("parameters")
            .map(|p| p.end_byte())
            .unwrap_or_else(|| function.start_byte());
        let mut cursor = function.walk();
        let children: Vec<Node<'_>> = function.children(&mut cursor).collect();
        children
            .into_iter()
            .filter(|c| c.start_byte() >= params_end)
            .filter(|c| {
                matches!(
                    c.kind(),
                    "type_qualifier"
                        | "ref_qualifier"
                        | "noexcept"
                        | "throw_specifier"
                        | "trailing_return_type"
                        | "requires_clause"
                        | "&"
                        | "&&"
                )
            })
            .map(|c| collapse(self.text(c)))
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn method_fact(
        &self,
        decl: Node<'_>,
        parts: &FunctionParts<'_>,
        parent: &str,
        scope: &[String],
        access: AccessSpecifier,
        template_header: Option<String>,
        parent_template_args: Option<String>,
        is_member: bool,
    ) -> Option<MethodFact> {
        let name = self.function_name(parts, scope)?;
        let return_type = if parts.cast.is_some() {
            None
        } else {
            self.renderer(scope).type_of(decl, &parts.ops)
        };

        let mut cursor = decl.walk();
        let children: Vec<Node<'_>> = decl.children(&mut cursor).collect();
        let has_kind = |kind: &str| children.iter().any(|c| c.kind() == kind);
        let compact: String = self.text(decl).chars().filter(|c| !c.is_whitespace()).collect();

        let attributes = children
            .iter()
            .filter(|c| c.kind() == "attribute_declaration")
            .map(|c| collapse(self.text(*c)))
            .collect();
        let is_virtual = children
            .iter()
            .any(|c| matches!(c.kind(), "virtual" | "virtual_function_specifier") || self.text(*c) == "virtual");

        Some(MethodFact {
            name,
            parent_qualified_name: parent.to_string(),
            return_type,
            params: self.params(parts.function, scope),
            qualifiers: self.qualifiers(parts.function),
            attributes,
            template_header,
            parent_template_args,
            is_pure: has_kind("pure_virtual_clause") || compact.ends_with("=0;"),
            is_virtual,
            is_defaulted: has_kind("default_method_clause") || compact.ends_with("=default;"),
            is_deleted: has_kind("delete_method_clause") || compact.ends_with("=delete;"),
            is_member,
            access,
            line: decl.start_position().row,
            signature_text: collapse(self.text(decl)),
        })
    }

    fn definition_key(&self, definition: Node<'_>, scope: &[String]) -> Option<DefinitionKey> {
        let parts = self.function_parts(definition)?;
        let name = self.function_name(&parts, scope)?;
        let params = self.params(parts.function, scope);
        let qualifiers = self.qualifiers(parts.function);
        Some(DefinitionKey {
            qualified_name: join_scope(scope, strip_template_args_of_scope(&name).trim_start_matches("::")),
            arity: params.len(),
            is_const: qualifiers.iter().any(|q| q == "const"),
        })
    }
}

fn join_headers(headers: &[String]) -> Option<String> {
    if headers.is_empty() {
        None
    } else {
        Some(headers.join("\n"))
    }
}

/// `Box<T>::get` → `Box::get`, so out-of-line template members match their
/// declarations.
fn strip_template_args_of_scope(name: &str) -> String {
    let segments = split_qualified(name);
    let count = segments.len();
    segments
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            if i + 1 < count {
                s.split('<').next().unwrap_or(s)
            } else {
                s
            }
        })
        .collect::<Vec<_>>()
        .join("::")
}

fn inner_declarator(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("declarator").or_else(|| {
        let count = node.named_child_count();
        (count > 0)
            .then(|| node.named_child(count - 1))
            .flatten()
    })
}

/// Offset just past the colon of an access label starting at `start`.
fn label_end(source: &str, start: usize, limit: usize) -> Option<usize> {
    source[start..limit.min(source.len())]
        .find(':')
        .map(|i| start + i + 1)
}

/// Fill every class's `transitive_base_names` from the direct bases known
/// to the unit. Unknown bases are recorded by name and not followed.
fn fill_transitive_base_names(classes: &mut [ClassFact]) {
    let direct: HashMap<String, Vec<String>> = classes
        .iter()
        .map(|c| (c.qualified_name.clone(), c.bases.clone()))
        .collect();

    for class in classes.iter_mut() {
        let mut names = BTreeSet::new();
        let mut stack: Vec<String> = class.bases.clone();
        while let Some(base) = stack.pop() {
            let plain = base.split('<').next().unwrap_or(&base).to_string();
            if !names.insert(base.clone()) {
                continue;
            }
            names.insert(plain.clone());
            if plain == class.qualified_name {
                continue;
            }
            if let Some(next) = direct.get(&plain) {
                stack.extend(next.iter().cloned());
            }
        }
        class.transitive_base_names = names;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> TranslationUnit {
        TreeSitterOracle::new()
            .parse(source, Path::new("main.cpp"))
            .unwrap()
    }

    #[test]
    fn class_facts_basic() {
        let source = "namespace app {\nclass Widget : public Base {\npublic:\n    void draw();\n};\n}\n";
        let unit = parse(source);
        let widget = unit.find_class_by_name("Widget").unwrap();

        assert_eq!(widget.qualified_name, "app::Widget");
        assert!(!widget.is_struct);
        assert!(widget.has_base_clause());
        assert_eq!(widget.bases, vec!["Base".to_string()]);
        assert_eq!(&source[widget.body_range.start..widget.body_range.start + 1], "{");
        assert_eq!(widget.line_range, (1, 4));
        assert_eq!(widget.methods.len(), 1);
        assert!(widget.methods[0].is_explicit_public());
    }

    #[test]
    fn public_label_offset_is_after_colon() {
        let source = "class A {\n  int x;\npublic :\n  int y;\n};\n";
        let unit = parse(source);
        let a = unit.find_class_by_name("A").unwrap();
        let offset = a.public_label_offsets[0];
        assert_eq!(&source[..offset], "class A {\n  int x;\npublic :");
    }

    #[test]
    fn pure_virtuals_in_order() {
        let source = "struct Runnable {\n    virtual void run() = 0;\n    virtual int stop(unsigned timeout_ms) = 0;\n    virtual ~Runnable() = default;\n};\n";
        let unit = parse(source);
        let runnable = unit.find_class_by_name("Runnable").unwrap();

        let names: Vec<_> = runnable.pure_virtuals.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["run", "stop"]);
        let stop = &runnable.pure_virtuals[1];
        assert_eq!(stop.params[0].ty.to_string(), "unsigned int");
        assert_eq!(stop.params[0].name.as_deref(), Some("timeout_ms"));
        assert!(unit.is_abstract(runnable));
    }

    #[test]
    fn method_details() {
        let source = "#include <string>\nnamespace io {\nstruct Buffer {};\nclass Sink {\npublic:\n    [[nodiscard]] virtual const Buffer& flush(int level = 3) const noexcept = 0;\n};\n}\n";
        let unit = parse(source);
        let sink = unit.find_class_by_name("io::Sink").unwrap();
        let flush = &sink.pure_virtuals[0];

        assert_eq!(flush.name, "flush");
        assert_eq!(flush.parent_qualified_name, "io::Sink");
        assert_eq!(flush.return_type.as_ref().unwrap().to_string(), "const io::Buffer&");
        assert_eq!(flush.params[0].default_value.as_deref(), Some("3"));
        assert_eq!(flush.qualifiers, vec!["const".to_string(), "noexcept".to_string()]);
        assert_eq!(flush.attributes, vec!["[[nodiscard]]".to_string()]);
        assert!(flush.is_virtual);
    }

    #[test]
    fn template_arguments_are_qualified() {
        let source = "#include <map>\nnamespace db { struct Row {}; }\nusing namespace db;\nstruct Store {\n    virtual std::map<int, Row> all() = 0;\n};\n";
        let unit = parse(source);
        let store = unit.find_class_by_name("Store").unwrap();
        assert_eq!(
            store.pure_virtuals[0].return_type.as_ref().unwrap().to_string(),
            "std::map<int, db::Row>"
        );
    }

    #[test]
    fn constructor_and_definitions() {
        let source = "class Boo {\npublic:\n    Boo();\n    int size() const;\n    void inline_body() {}\n};\nint Boo::size() const { return 0; }\n";
        let unit = parse(source);

        let names: Vec<_> = unit.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Boo", "size"]);
        assert!(unit.declarations[0].return_type.is_none());
        assert!(!unit.is_defined(&unit.declarations[0]));
        assert!(unit.is_defined(&unit.declarations[1]));
    }

    #[test]
    fn nested_classes_get_depth() {
        let source = "struct Outer {\n    struct Inner {\n        void f();\n    };\n};\n";
        let unit = parse(source);
        let inner = unit.find_class_by_name("Inner").unwrap();
        assert_eq!(inner.qualified_name, "Outer::Inner");
        assert_eq!(inner.depth, 1);
        assert_eq!(unit.find_enclosing_class(2).unwrap().qualified_name, "Outer::Inner");
        assert_eq!(unit.find_enclosing_class(0).unwrap().qualified_name, "Outer");
    }

    #[test]
    fn transitive_names_follow_known_bases() {
        let source = "struct A { virtual void a() = 0; };\nstruct B : A {};\nstruct C : B, Unknown {};\n";
        let unit = parse(source);
        let c = unit.find_class_by_name("C").unwrap();
        assert!(c.derives_from("A"));
        assert!(c.derives_from("B"));
        assert!(c.derives_from("Unknown"));
        assert!(!c.derives_from("C"));
    }

    #[test]
    fn follows_local_includes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("base.hpp"),
            "#pragma once\nstruct Base { virtual void tick() = 0; };\n",
        )
        .unwrap();
        let main = dir.path().join("main.cpp");
        let unit = TreeSitterOracle::new()
            .parse("#include \"base.hpp\"\nstruct Impl : Base {};\n", &main)
            .unwrap();

        assert_eq!(unit.included_files.len(), 1);
        assert!(unit.covers_file(&dir.path().join("base.hpp")));
        let base = unit.find_class_by_name("Base").unwrap();
        assert_eq!(base.origin, dir.path().join("base.hpp"));
        let imp = unit.find_class_by_name("Impl").unwrap();
        assert_eq!(unit.transitive_bases(imp).len(), 1);
    }
}
