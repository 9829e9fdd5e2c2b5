use crate::cxx::facts::ClassFact;
use crate::cxx::tokens::TokenScanner;
use crate::edit::Insertion;
use crate::scope::remove_all_scopes;
use thiserror::Error;

/// Tokens scanned from the class keyword before giving up on finding the body.
pub const DEFAULT_TOKEN_SCAN_BUDGET: usize = 4096;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BaseSpecifierError {
    #[error("could not find the opening brace of {class} within {budget} tokens")]
    MalformedClassBody { class: String, budget: usize },
}

/// Insertion that makes `class` derive publicly from `base`, or `None` when
/// it already does, directly or not.
///
/// The text goes right after the last token of the class head: after the
/// existing base clause (`, public Base`) or after the name (` : public Base`).
/// Structs derive publicly by default and get no access keyword.
pub fn base_specifier_insertion(
    class: &ClassFact,
    source: &str,
    base: &str,
    budget: usize,
) -> Result<Option<Insertion>, BaseSpecifierError> {
    if class.derives_from(base) {
        return Ok(None);
    }

    let offset = head_end(class, source, budget)?;

    let mut code = String::from(if class.has_base_clause() { ", " } else { " : " });
    if !class.is_struct {
        code.push_str("public ");
    }
    code.push_str(&remove_all_scopes(base, &class.qualified_name));

    Ok(Some(Insertion::new(code, offset)))
}

/// End of the token right before the body's opening brace.
fn head_end(class: &ClassFact, source: &str, budget: usize) -> Result<usize, BaseSpecifierError> {
    let brace = class.body_range.start;
    let malformed = || BaseSpecifierError::MalformedClassBody {
        class: class.qualified_name.clone(),
        budget,
    };

    let mut previous_end = None;
    for token in TokenScanner::new(source, class.start_offset).take(budget) {
        if token.start == brace {
            return previous_end.ok_or_else(malformed);
        }
        if token.start > brace {
            break;
        }
        previous_end = Some(token.end);
    }
    Err(malformed())
}
