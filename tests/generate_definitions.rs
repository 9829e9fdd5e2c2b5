//! Integration tests: generate-definitions over selections of a buffer

use cxx_patcher::actions::{generate_definitions, GenerateDefinitionsRequest};
use cxx_patcher::{RefactorError, TreeSitterOracle};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const BOO: &str = r#"namespace detail {
struct Baz {};
}
using namespace detail;

class Boo {
public:
    Boo();
    Baz do_stuff() const;
};
"#;

fn generate(path: &Path, text: &str, begin: usize, end: usize) -> Result<String, RefactorError> {
    generate_definitions(
        &TreeSitterOracle::new(),
        GenerateDefinitionsRequest {
            path,
            text,
            begin,
            end,
        },
    )
}

#[test]
fn test_boo_end_to_end() {
    assert_eq!(
        generate(Path::new("boo.hpp"), BOO, 7, 8).unwrap(),
        "Boo::Boo()\n{\n}\n\ndetail::Baz Boo::do_stuff() const\n{\n}\n"
    );
}

#[test]
fn test_partial_selection() {
    assert_eq!(
        generate(Path::new("boo.hpp"), BOO, 8, 8).unwrap(),
        "detail::Baz Boo::do_stuff() const\n{\n}\n"
    );
}

#[test]
fn test_empty_when_nothing_in_range() {
    assert_eq!(generate(Path::new("boo.hpp"), BOO, 0, 3).unwrap(), "");
}

#[test]
fn test_inverted_range() {
    let err = generate(Path::new("boo.hpp"), BOO, 8, 7).unwrap_err();
    assert!(matches!(err, RefactorError::SelectedRangeInverted { begin: 8, end: 7 }));
    assert!(err.to_string().contains("inverted"));
}

#[test]
fn test_definitions_in_included_header_are_skipped() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("boo_impl.hpp"),
        "#pragma once\ninline Boo::Boo() {}\n",
    )
    .unwrap();
    let header = dir.path().join("boo.hpp");
    let text = format!("{BOO}#include \"boo_impl.hpp\"\n");
    fs::write(&header, &text).unwrap();

    assert_eq!(
        generate(&header, &text, 0, 20).unwrap(),
        "detail::Baz Boo::do_stuff() const\n{\n}\n"
    );
}

#[test]
fn test_operators_and_references() {
    let text = r#"#include <string>
namespace geo {
struct Vec2 {
    Vec2& operator+=(const Vec2& other);
    bool operator==(const Vec2& rhs) const;
    explicit operator bool() const;
    static Vec2 from(std::string&& text);
};
}
"#;
    assert_eq!(
        generate(Path::new("vec2.hpp"), text, 3, 6).unwrap(),
        "geo::Vec2& geo::Vec2::operator+=(const geo::Vec2& other)\n{\n}\n\n\
         bool geo::Vec2::operator==(const geo::Vec2& rhs) const\n{\n}\n\n\
         geo::Vec2::operator bool() const\n{\n}\n\n\
         geo::Vec2 geo::Vec2::from(std::string&& text)\n{\n}\n"
    );
}
