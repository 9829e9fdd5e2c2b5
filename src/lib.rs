//! cxx-patcher: deterministic C++ refactoring actions.
//!
//! Two actions are provided, "implement interface" and "generate function
//! definitions". Both are built on byte-offset insertions computed against an
//! immutable source buffer and merged in one pass.
//!
//! # Architecture
//!
//! Every action compiles down to a list of [`Insertion`]s. The intelligence
//! lives in where those insertions go and what they say:
//!
//! - [`cxx`] parses C++ with tree-sitter and answers questions about it
//!   as plain facts ([`ClassFact`], [`MethodFact`]).
//! - [`synth`] renders override declarations and definition skeletons.
//! - [`scope`] drops qualifiers that are redundant where text lands.
//! - [`place`], [`base`] and [`include`] pick insertion offsets.
//! - [`actions`] ties it together and calls [`apply_insertions`] once.
//!
//! # Example
//!
//! ```no_run
//! use cxx_patcher::actions::{implement_interface, ImplementInterfaceRequest, RefactorOptions};
//! use cxx_patcher::{TreeSitterOracle, WalkdirSearch};
//! use std::path::Path;
//!
//! let path = Path::new("src/maker.cpp");
//! let text = std::fs::read_to_string(path).unwrap();
//! let patch = implement_interface(
//!     &TreeSitterOracle::new(),
//!     &WalkdirSearch::default(),
//!     ImplementInterfaceRequest { path, text: &text, line: 1, interface: "Runnable" },
//!     &RefactorOptions::default(),
//! )
//! .unwrap();
//! println!("{}", patch.patched);
//! ```

pub mod actions;
pub mod base;
pub mod config;
pub mod cxx;
pub mod edit;
pub mod include;
pub mod place;
pub mod pure_virtual;
pub mod safety;
pub mod scope;
pub mod search;
pub mod synth;

// Re-exports
pub use actions::{
    generate_definitions, implement_interface, GenerateDefinitionsRequest,
    ImplementInterfaceRequest, Patch, RefactorError, RefactorOptions,
};
pub use base::{base_specifier_insertion, BaseSpecifierError};
pub use config::{load_for, load_from_path, load_from_str, ConfigError, RefactorConfig};
pub use cxx::{
    ClassFact, DeclarationOracle, MethodFact, OracleError, TranslationUnit, TreeSitterOracle,
    ValidationError,
};
pub use edit::{apply_insertions, write_patched, Insertion, InsertionError, WriteError, WriteResult};
pub use include::{resolve_include_insertion_point, IncludePoint};
pub use place::{find_suitable_place, Place};
pub use pure_virtual::collect_override_declarations;
pub use safety::{SafetyError, WorkspaceGuard};
pub use scope::{remove_all_scopes, remove_scope};
pub use search::{SearchError, SymbolSearch, WalkdirSearch};
pub use synth::{definition_skeleton, override_declaration};
