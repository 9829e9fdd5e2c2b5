use crate::cxx::facts::ClassFact;
use serde::Serialize;

/// Where new members go inside a class body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Place {
    pub offset: usize,
    /// The inserted block must open with `public:`
    pub needs_public_label: bool,
}

/// Pick the insertion point for new public members of `class`.
///
/// In order of preference:
/// 1. after the run of public methods starting at the first one, where a
///    struct's unlabeled methods count as public,
/// 2. right after the first `public:` label in the body,
/// 3. right after the opening brace, with a label unless it is a struct.
pub fn find_suitable_place(class: &ClassFact) -> Place {
    if let Some(offset) = end_of_public_method_run(class) {
        return Place {
            offset,
            needs_public_label: false,
        };
    }

    let body = &class.body_range;
    if let Some(&offset) = class
        .public_label_offsets
        .iter()
        .find(|&&o| body.start < o && o < body.end)
    {
        return Place {
            offset,
            needs_public_label: false,
        };
    }

    Place {
        offset: body.start + 1,
        needs_public_label: !class.is_struct,
    }
}

fn end_of_public_method_run(class: &ClassFact) -> Option<usize> {
    let first = class.methods.iter().position(|m| m.is_explicit_public())?;
    class.methods[first..]
        .iter()
        .take_while(|m| m.is_explicit_public())
        .last()
        .map(|m| m.range.end)
}
