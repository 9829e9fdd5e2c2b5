//! Property-based tests for the insertion merger and scope shortening

use cxx_patcher::edit::{apply_insertions, Insertion, InsertionError};
use cxx_patcher::scope::{remove_all_scopes, remove_scope};
use proptest::prelude::*;
use proptest::sample::Index;

/// ASCII buffer plus insertions at valid offsets into it.
fn buffer_and_insertions() -> impl Strategy<Value = (String, Vec<Insertion>)> {
    (
        "[a-z \n{};:]{0,60}",
        prop::collection::vec((any::<Index>(), "[A-Z0-9]{0,6}"), 0..10),
    )
        .prop_map(|(buffer, raw)| {
            let insertions = raw
                .into_iter()
                .map(|(index, code)| Insertion::new(code, index.index(buffer.len() + 1)))
                .collect();
            (buffer, insertions)
        })
}

/// Split `merged` back into original chunks by skipping each inserted code.
fn strip_insertions(merged: &str, insertions: &[Insertion]) -> String {
    let mut ordered: Vec<&Insertion> = insertions.iter().filter(|i| !i.code.is_empty()).collect();
    ordered.sort_by_key(|i| i.offset);

    let mut original = String::new();
    let mut merged_pos = 0;
    let mut original_pos = 0;
    for insertion in ordered {
        let chunk = insertion.offset - original_pos;
        original.push_str(&merged[merged_pos..merged_pos + chunk]);
        merged_pos += chunk + insertion.code.len();
        original_pos = insertion.offset;
    }
    original.push_str(&merged[merged_pos..]);
    original
}

proptest! {
    #[test]
    fn prop_removing_insertions_recovers_buffer((buffer, insertions) in buffer_and_insertions()) {
        let merged = apply_insertions(&buffer, &insertions).unwrap();
        let added: usize = insertions.iter().map(|i| i.code.len()).sum();

        prop_assert_eq!(merged.len(), buffer.len() + added);
        prop_assert_eq!(strip_insertions(&merged, &insertions), buffer);
    }

    #[test]
    fn prop_empty_codes_are_noops((buffer, insertions) in buffer_and_insertions()) {
        let with_empties: Vec<Insertion> = insertions
            .iter()
            .flat_map(|i| [Insertion::new("", i.offset), i.clone()])
            .collect();
        let without: Vec<Insertion> = insertions.iter().filter(|i| !i.code.is_empty()).cloned().collect();

        prop_assert_eq!(
            apply_insertions(&buffer, &with_empties).unwrap(),
            apply_insertions(&buffer, &without).unwrap()
        );
    }

    #[test]
    fn prop_ties_keep_input_order(buffer in "[a-z]{0,20}", codes in prop::collection::vec("[A-Z]{1,3}", 1..6), index in any::<Index>()) {
        let offset = index.index(buffer.len() + 1);
        let insertions: Vec<Insertion> = codes.iter().map(|c| Insertion::new(c.as_str(), offset)).collect();
        let merged = apply_insertions(&buffer, &insertions).unwrap();

        let expected = format!("{}{}{}", &buffer[..offset], codes.concat(), &buffer[offset..]);
        prop_assert_eq!(merged, expected);
    }

    #[test]
    fn prop_out_of_bounds_rejects_everything(
        (buffer, mut insertions) in buffer_and_insertions(),
        overshoot in 1usize..100,
        position in any::<Index>(),
    ) {
        let bad = Insertion::new("X", buffer.len() + overshoot);
        let at = position.index(insertions.len() + 1);
        insertions.insert(at, bad);

        let result = apply_insertions(&buffer, &insertions);
        let is_out_of_bounds = matches!(
            result,
            Err(InsertionError::OutOfBoundsInsertion { offset, .. }) if offset == buffer.len() + overshoot
        );
        prop_assert!(is_out_of_bounds);
    }

    #[test]
    fn prop_remove_scope_without_prefix_is_identity(text in "[a-z :<>]{0,40}", prefix in "[A-Z]{1,5}") {
        prop_assert_eq!(remove_scope(&text, &prefix), text.clone());
        prop_assert_eq!(remove_scope(&remove_scope(&text, &prefix), &prefix), text);
    }

    #[test]
    fn prop_remove_all_scopes_is_idempotent(
        segments in prop::collection::vec("[a-z]{1,4}", 1..4),
        name in "[a-z]{1,6}",
    ) {
        let qualified = segments.join("::");
        let text = format!("void {qualified}::{name}() override;");
        let once = remove_all_scopes(&text, &qualified);

        prop_assert_eq!(&once, &format!("void {name}() override;"));
        prop_assert_eq!(remove_all_scopes(&once, &qualified), once.clone());
    }
}
