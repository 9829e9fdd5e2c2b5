//! Integration tests: implement-interface against files on disk
//!
//! Interfaces live in headers next to the implementing file and are found
//! through the walkdir search, like an editor invocation would.

use cxx_patcher::actions::{implement_interface, ImplementInterfaceRequest, RefactorOptions};
use cxx_patcher::{RefactorError, TreeSitterOracle, WalkdirSearch};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Workspace with `runnable.hpp` and the given implementing file.
fn setup_workspace(file_name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("runnable.hpp"),
        "struct Runnable { virtual void run() = 0; virtual int stop(unsigned timeout_ms) = 0; };\n",
    )
    .unwrap();
    let file = dir.path().join(file_name);
    fs::write(&file, contents).unwrap();
    (dir, file)
}

fn implement(file: &Path, line: usize, interface: &str) -> Result<String, RefactorError> {
    let text = fs::read_to_string(file).unwrap();
    implement_interface(
        &TreeSitterOracle::new(),
        &WalkdirSearch::default(),
        ImplementInterfaceRequest {
            path: file,
            text: &text,
            line,
            interface,
        },
        &RefactorOptions::default(),
    )
    .map(|patch| patch.patched)
}

#[test]
fn test_runnable_maker_end_to_end() {
    let (_dir, file) = setup_workspace("maker.cpp", "struct Maker\n{\n};\n");

    for line in 0..=2 {
        assert_eq!(
            implement(&file, line, "Runnable").unwrap(),
            "#include \"runnable.hpp\"\nstruct Maker : Runnable\n{\n    void run() override;\n    int stop(unsigned int timeout_ms) override;\n};\n"
        );
    }
}

#[test]
fn test_struct_with_methods_gets_overrides_after_them() {
    let (_dir, file) = setup_workspace(
        "maker.cpp",
        "struct Maker {\n    void start();\n    void halt();\n};\n",
    );

    assert_eq!(
        implement(&file, 1, "Runnable").unwrap(),
        "#include \"runnable.hpp\"\nstruct Maker : Runnable {\n    void start();\n    void halt();\n    void run() override;\n    int stop(unsigned int timeout_ms) override;\n};\n"
    );
}

#[test]
fn test_existing_include_is_not_duplicated() {
    let (_dir, file) = setup_workspace(
        "maker.cpp",
        "#include \"runnable.hpp\"\n\nclass Maker {\n};\n",
    );

    assert_eq!(
        implement(&file, 2, "Runnable").unwrap(),
        "#include \"runnable.hpp\"\n\nclass Maker : public Runnable {\npublic:\n    void run() override;\n    int stop(unsigned int timeout_ms) override;\n};\n"
    );
}

#[test]
fn test_already_derived_class_only_gets_members() {
    let (_dir, file) = setup_workspace(
        "maker.cpp",
        "#include \"runnable.hpp\"\nstruct Maker : Runnable {\n};\n",
    );

    assert_eq!(
        implement(&file, 1, "Runnable").unwrap(),
        "#include \"runnable.hpp\"\nstruct Maker : Runnable {\n    void run() override;\n    int stop(unsigned int timeout_ms) override;\n};\n"
    );
}

#[test]
fn test_inherited_pure_virtuals_come_first() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("io")).unwrap();
    fs::write(
        dir.path().join("io/stream.hpp"),
        r#"#pragma once
#include <string>
namespace io {
struct Closeable {
    virtual ~Closeable() = default;
    virtual void close() = 0;
};
struct Stream : Closeable {
    virtual std::string read(int max_bytes = 512) = 0;
};
}
"#,
    )
    .unwrap();
    let file = dir.path().join("file_stream.hpp");
    fs::write(
        &file,
        "#ifndef FILE_STREAM_HPP\n#define FILE_STREAM_HPP\nnamespace io {\nclass FileStream {\n};\n}\n#endif\n",
    )
    .unwrap();

    assert_eq!(
        implement(&file, 3, "io::Stream").unwrap(),
        "#ifndef FILE_STREAM_HPP\n#define FILE_STREAM_HPP\n#include \"io/stream.hpp\"\nnamespace io {\nclass FileStream : public Stream {\npublic:\n    void close() override;\n    std::string read(int max_bytes) override;\n};\n}\n#endif\n"
    );
}

#[test]
fn test_non_abstract_candidate_is_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("plain.hpp"), "struct Runnable { void run(); };\n").unwrap();
    let file = dir.path().join("maker.cpp");
    fs::write(&file, "struct Maker {};\n").unwrap();

    let err = implement(&file, 0, "Runnable").unwrap_err();
    assert!(matches!(err, RefactorError::InterfaceNotFound { ref name, .. } if name == "Runnable"));
}

#[test]
fn test_cursor_outside_any_class() {
    let (_dir, file) = setup_workspace("maker.cpp", "int x;\n\nstruct Maker {};\n");
    let err = implement(&file, 0, "Runnable").unwrap_err();
    assert!(matches!(err, RefactorError::ClassUnderCursorNotFound { line: 0 }));
}

#[test]
fn test_search_root_option() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("include/core")).unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("include/core/job.hpp"),
        "namespace core { class Job { public: virtual bool step() noexcept = 0; }; }\n",
    )
    .unwrap();
    let file = dir.path().join("src/worker.cpp");
    let text = "#include <thread>\nstruct Worker {\n};\n";
    fs::write(&file, text).unwrap();

    let options = RefactorOptions {
        search_root: Some(dir.path().to_path_buf()),
        include_dirs: vec![dir.path().join("include")],
        ..RefactorOptions::default()
    };
    let patch = implement_interface(
        &TreeSitterOracle::new(),
        &WalkdirSearch::default(),
        ImplementInterfaceRequest {
            path: &file,
            text,
            line: 1,
            interface: "Job",
        },
        &options,
    )
    .unwrap();

    assert_eq!(
        patch.patched,
        "#include <thread>\n#include \"core/job.hpp\"\nstruct Worker : core::Job {\n    bool step() noexcept override;\n};\n"
    );
    assert_eq!(patch.insertions.len(), 3);
}
