use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental patch primitive: text spliced at a byte offset of the
/// *original* buffer.
///
/// Every refactoring action compiles down to a list of insertions which are
/// merged into the untouched source in a single pass by [`apply_insertions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insertion {
    /// Text to splice in
    pub code: String,
    /// Byte offset into the original buffer
    pub offset: usize,
}

impl Insertion {
    pub fn new(code: impl Into<String>, offset: usize) -> Self {
        Self {
            code: code.into(),
            offset,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsertionError {
    #[error("insertion {code:?} at offset {offset} is past the end of a {buffer_len}-byte buffer")]
    OutOfBoundsInsertion {
        code: String,
        offset: usize,
        buffer_len: usize,
    },

    #[error("insertion {code:?} at offset {offset} splits a UTF-8 character")]
    InsertionSplitsCharacter { code: String, offset: usize },
}

/// Merge `insertions` into `buffer`, returning the patched text.
///
/// All offsets are validated before anything is copied, so a bad insertion
/// never yields a partially patched result. Empty insertions are dropped.
/// Insertions sharing an offset keep their relative input order.
pub fn apply_insertions(buffer: &str, insertions: &[Insertion]) -> Result<String, InsertionError> {
    for insertion in insertions {
        if insertion.offset > buffer.len() {
            return Err(InsertionError::OutOfBoundsInsertion {
                code: insertion.code.clone(),
                offset: insertion.offset,
                buffer_len: buffer.len(),
            });
        }
        if !buffer.is_char_boundary(insertion.offset) {
            return Err(InsertionError::InsertionSplitsCharacter {
                code: insertion.code.clone(),
                offset: insertion.offset,
            });
        }
    }

    let mut ordered: Vec<&Insertion> = insertions.iter().filter(|i| !i.code.is_empty()).collect();
    // sort_by_key is stable: equal offsets stay in input order
    ordered.sort_by_key(|i| i.offset);

    let added: usize = ordered.iter().map(|i| i.code.len()).sum();
    let mut patched = String::with_capacity(buffer.len() + added);
    let mut cursor = 0;
    for insertion in ordered {
        patched.push_str(&buffer[cursor..insertion.offset]);
        patched.push_str(&insertion.code);
        cursor = insertion.offset;
    }
    patched.push_str(&buffer[cursor..]);

    Ok(patched)
}

/// Verification strategy for the on-disk file before a patched buffer replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large files)
    Hash(u64),
}

impl ContentVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            ContentVerification::ExactMatch(expected) => text == expected,
            ContentVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            ContentVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            ContentVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("{file} changed on disk since the patch was computed")]
    StaleSource { file: PathBuf },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of persisting a patched buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "WriteResult should be checked for written/unchanged"]
pub enum WriteResult {
    Written { file: PathBuf, bytes_added: usize },
    /// The patch did not change the buffer
    Unchanged { file: PathBuf },
}

/// Replace `file` with `patched`, provided it still holds `original`.
///
/// Uses tempfile + fsync + rename for crash safety and bumps the mtime so
/// build systems notice the change.
pub fn write_patched(file: &Path, original: &str, patched: &str) -> Result<WriteResult, WriteError> {
    let verification = ContentVerification::from_text(original);
    let current = fs::read_to_string(file)?;
    if !verification.matches(&current) {
        return Err(WriteError::StaleSource {
            file: file.to_path_buf(),
        });
    }

    if original == patched {
        return Ok(WriteResult::Unchanged {
            file: file.to_path_buf(),
        });
    }

    atomic_write(file, patched.as_bytes())?;
    filetime::set_file_mtime(file, filetime::FileTime::now())?;

    Ok(WriteResult::Written {
        file: file.to_path_buf(),
        bytes_added: patched.len().saturating_sub(original.len()),
    })
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), WriteError> {
    // Same directory keeps the rename on one filesystem
    let parent = path.parent().ok_or_else(|| {
        WriteError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        ))
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
