//! Textual scope shortening.
//!
//! Generated declarations are rendered with fully qualified names. Where the
//! text is spliced in, some qualifiers are redundant (`lib::Runnable::run`
//! inside `lib::Maker` is just `run`). Removal is a literal substring match,
//! not name resolution: an occurrence inside a string literal is stripped too.

/// Remove every literal occurrence of `prefix` from `text`.
///
/// The prefix is normalized to end in `::`. An empty prefix leaves the text
/// unchanged.
pub fn remove_scope(text: &str, prefix: &str) -> String {
    if prefix.is_empty() || prefix == "::" {
        return text.to_string();
    }
    if prefix.ends_with("::") {
        text.replace(prefix, "")
    } else {
        text.replace(&format!("{prefix}::"), "")
    }
}

/// Remove all prefixes of the nesting scope chain of `qualified_name`, most
/// specific first.
pub fn remove_all_scopes(text: &str, qualified_name: &str) -> String {
    nesting_scope_chain(qualified_name)
        .iter()
        .fold(text.to_string(), |acc, prefix| remove_scope(&acc, prefix))
}

/// Qualifying prefixes of `qualified_name`, most specific first.
///
/// `"A::B::C"` yields `["A::B::C::", "A::B::", "A::"]`. Separators inside
/// template argument lists do not split.
pub fn nesting_scope_chain(qualified_name: &str) -> Vec<String> {
    let name = qualified_name.trim().trim_start_matches("::");
    if name.is_empty() {
        return Vec::new();
    }

    let mut chain: Vec<String> = top_level_separators(name)
        .into_iter()
        .map(|end| format!("{}::", &name[..end]))
        .collect();
    chain.push(format!("{name}::"));
    chain.reverse();
    chain
}

/// Split a qualified name into its top-level segments.
pub fn split_qualified(qualified_name: &str) -> Vec<&str> {
    let name = qualified_name.trim_start_matches("::");
    let mut segments = Vec::new();
    let mut start = 0;
    for end in top_level_separators(name) {
        segments.push(&name[start..end]);
        start = end + 2;
    }
    segments.push(&name[start..]);
    segments.retain(|s| !s.is_empty());
    segments
}

/// Byte offsets of every `::` not nested in `<...>` or `(...)`.
fn top_level_separators(name: &str) -> Vec<usize> {
    let bytes = name.as_bytes();
    let mut depth = 0usize;
    let mut separators = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'(' => depth += 1,
            b'>' | b')' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                separators.push(i);
                i += 2;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    separators
}
