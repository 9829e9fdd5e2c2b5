//! Placement and spelling of `#include` directives.

use crate::edit::Insertion;
use regex::Regex;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

static LOCAL_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^[ \t]*#[ \t]*include[ \t]*"[^"\n]*""#).unwrap());
static SYSTEM_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#[ \t]*include[ \t]*<[^>\n]*>").unwrap());
static PRAGMA_ONCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#[ \t]*pragma[ \t]+once\b").unwrap());
static IFNDEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*#[ \t]*ifndef[ \t]+(\w+)[ \t]*$").unwrap());
static DEFINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*#[ \t]*define[ \t]+(\w+)\b").unwrap());
static ANY_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^[ \t]*#[ \t]*include[ \t]*["<]([^">\n]*)[">]"#).unwrap());

/// Where a new `#include` goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IncludePoint {
    pub offset: usize,
    /// The offset is at the end of a line, so the directive starts with `\n`
    pub needs_leading_newline: bool,
}

/// Find where to add an include to `text`.
///
/// First match wins: after the last `"..."` include, after the last `<...>`
/// include, after an include guard's `#define`, after `#pragma once`, after a
/// leading block comment, else the very start.
pub fn resolve_include_insertion_point(text: &str) -> IncludePoint {
    let after_line = |end: usize| IncludePoint {
        offset: line_end(text, end),
        needs_leading_newline: true,
    };

    if let Some(m) = LOCAL_INCLUDE.find_iter(text).last() {
        return after_line(m.end());
    }
    if let Some(m) = SYSTEM_INCLUDE.find_iter(text).last() {
        return after_line(m.end());
    }
    if let Some(end) = include_guard_end(text) {
        return after_line(end);
    }
    if let Some(m) = PRAGMA_ONCE.find(text) {
        return after_line(m.end());
    }
    if let Some(end) = leading_block_comment_end(text) {
        return IncludePoint {
            offset: end,
            needs_leading_newline: true,
        };
    }
    IncludePoint {
        offset: 0,
        needs_leading_newline: false,
    }
}

/// Insertion adding `#include "spelling"` to `text`.
pub fn include_insertion(text: &str, spelling: &str) -> Insertion {
    let point = resolve_include_insertion_point(text);
    let code = if point.needs_leading_newline {
        format!("\n#include \"{spelling}\"")
    } else {
        format!("#include \"{spelling}\"\n")
    };
    Insertion::new(code, point.offset)
}

/// Whether `text` already includes `spelling`, in either bracket style.
pub fn is_included(text: &str, spelling: &str) -> bool {
    ANY_INCLUDE
        .captures_iter(text)
        .any(|caps| caps.get(1).is_some_and(|m| m.as_str().trim() == spelling))
}

/// How `source_file` should spell an include of `header`: relative to the
/// source's directory when below it, else relative to the first include
/// directory containing it, else the bare file name.
pub fn include_spelling(header: &Path, source_file: &Path, include_dirs: &[PathBuf]) -> String {
    let header = normalize(header);
    let source_dir = source_file
        .parent()
        .map(|dir| if dir.as_os_str().is_empty() { Path::new(".") } else { dir });
    let mut bases: Vec<PathBuf> = source_dir.map(normalize).into_iter().collect();
    bases.extend(include_dirs.iter().map(|dir| normalize(dir)));
    bases.retain(|dir| !dir.as_os_str().is_empty());

    bases
        .iter()
        .find_map(|dir| header.strip_prefix(dir).ok().map(slash_path))
        .filter(|s| !s.is_empty())
        .or_else(|| header.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default()
}

fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn line_end(text: &str, from: usize) -> usize {
    text[from..].find('\n').map_or(text.len(), |i| from + i)
}

/// End of the `#define` that pairs with a leading `#ifndef`.
fn include_guard_end(text: &str) -> Option<usize> {
    let mut lines = significant_lines(text);
    let (_, ifndef) = lines.next()?;
    let guard = IFNDEF.captures(ifndef)?.get(1)?.as_str().to_string();
    let (start, define) = lines.next()?;
    let caps = DEFINE.captures(define)?;
    let name = caps.get(1)?;
    (name.as_str() == guard).then(|| start + name.end())
}

/// Non-blank lines outside comments, with their starting offsets. Block
/// comments opening or closing a line are cut off; the offset moves with the
/// remaining text.
fn significant_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut in_block = false;
    let mut offset = 0;
    text.split_inclusive('\n').filter_map(move |raw| {
        let mut start = offset;
        offset += raw.len();
        let mut line = raw.trim_end_matches(['\n', '\r']);

        if in_block {
            let close = line.find("*/")?;
            in_block = false;
            start += close + 2;
            line = &line[close + 2..];
        }
        loop {
            let body = line.trim_start();
            let Some(comment) = body.strip_prefix("/*") else {
                break;
            };
            let Some(close) = comment.find("*/") else {
                in_block = true;
                return None;
            };
            let skip = line.len() - body.len() + 2 + close + 2;
            start += skip;
            line = &line[skip..];
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            return None;
        }
        Some((start, line))
    })
}

fn leading_block_comment_end(text: &str) -> Option<usize> {
    let start = text.len() - text.trim_start().len();
    if !text[start..].starts_with("/*") {
        return None;
    }
    text[start + 2..].find("*/").map(|i| start + 2 + i + 2)
}
