use crate::base::BaseSpecifierError;
use crate::cxx::{OracleError, ValidationError};
use crate::edit::InsertionError;
use crate::search::SearchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RefactorError {
    #[error("no class or struct encloses line {line}")]
    ClassUnderCursorNotFound { line: usize },

    #[error("no abstract class or struct named '{name}' was found{}", did_you_mean(.hint))]
    InterfaceNotFound { name: String, hint: Option<String> },

    #[error("selected range is inverted: begin line {begin} is after end line {end}")]
    SelectedRangeInverted { begin: usize, end: usize },

    #[error(transparent)]
    Insertion(#[from] InsertionError),

    #[error(transparent)]
    BaseSpecifier(#[from] BaseSpecifierError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn did_you_mean(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!(" (did you mean '{hint}'?)"),
        None => String::new(),
    }
}
