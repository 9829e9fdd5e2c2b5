use crate::cxx::errors::OracleError;
use ast_grep_language::{LanguageExt, SupportLang};
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// Tree-sitter parser wrapper for C++ source code.
pub struct CxxParser {
    parser: Parser,
}

impl CxxParser {
    pub fn new() -> Result<Self, OracleError> {
        let mut parser = Parser::new();
        // ast-grep-language bundles the C++ grammar
        let grammar = SupportLang::Cpp.get_ts_language();
        parser
            .set_language(&grammar)
            .map_err(|_| OracleError::LanguageSet)?;
        Ok(Self { parser })
    }

    /// Parse source code and return the tree along with the source.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
        path: &Path,
    ) -> Result<ParsedSource<'a>, OracleError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| OracleError::ParseFailed {
                path: path.to_path_buf(),
            })?;
        Ok(ParsedSource { source, tree })
    }
}

/// Source text and its syntax tree.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Number of ERROR and MISSING nodes in the tree.
    pub fn error_count(&self) -> usize {
        count_error_nodes(self.tree.root_node())
    }
}

fn count_error_nodes(node: Node<'_>) -> usize {
    let own = usize::from(node.is_error() || node.is_missing());
    if !node.has_error() {
        return own;
    }

    let mut cursor = node.walk();
    let nested: usize = node
        .children(&mut cursor)
        .map(count_error_nodes)
        .sum();
    own + nested
}
