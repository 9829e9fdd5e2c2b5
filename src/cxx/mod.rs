//! C++ front end: tree-sitter parsing and the declaration facts extracted
//! from it.
//!
//! The rest of the crate talks to this module through [`DeclarationOracle`]
//! and the plain structs in [`facts`]; tree-sitter types do not leak out.

pub mod errors;
pub mod extract;
pub mod facts;
pub mod oracle;
pub mod parser;
pub mod tokens;
pub mod types;
pub mod validator;

pub use errors::OracleError;
pub use extract::TreeSitterOracle;
pub use facts::{
    AccessSpecifier, ClassFact, DefinitionKey, MethodFact, MethodSlot, ParamFact, TypeFact,
    TypeName,
};
pub use oracle::{DeclarationOracle, TranslationUnit};
pub use parser::{CxxParser, ParsedSource};
pub use tokens::TokenScanner;
pub use validator::{validate_patch, ValidationError};
