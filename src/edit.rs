use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// A byte-span replacement inside one file's content.
///
/// Every regex match is turned into one of these before anything is
/// written. Spans are checked against the content they are spliced into.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until it is spliced into content"]
pub struct Edit {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// Text that replaces [byte_start, byte_end)
    pub new_text: String,
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("invalid byte range [{byte_start}, {byte_end}) in content of length {content_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        content_len: usize,
    },

    #[error("byte offset {offset} does not fall on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },

    #[error("edits overlap: [{first_start}, {first_end}) and [{second_start}, {second_end})")]
    Overlap {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },
}

impl Edit {
    pub fn new(byte_start: usize, byte_end: usize, new_text: impl Into<String>) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
        }
    }

    fn validate(&self, content: &str) -> Result<(), EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                content_len: content.len(),
            });
        }

        for offset in [self.byte_start, self.byte_end] {
            if !content.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }

        Ok(())
    }
}

/// Apply `edits` to `content` bottom-to-top so earlier offsets stay valid.
///
/// All edits are validated before any splice happens. Overlapping spans are
/// rejected.
pub fn splice(content: &str, edits: &[Edit]) -> Result<String, EditError> {
    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.byte_start.cmp(&a.byte_start));

    for edit in &ordered {
        edit.validate(content)?;
    }

    // Sorted descending: the earlier edit must end before the later one starts
    for window in ordered.windows(2) {
        let (later, earlier) = (window[0], window[1]);
        if earlier.byte_end > later.byte_start {
            return Err(EditError::Overlap {
                first_start: earlier.byte_start,
                first_end: earlier.byte_end,
                second_start: later.byte_start,
                second_end: later.byte_end,
            });
        }
    }

    let mut out = content.to_string();
    for edit in ordered {
        out.replace_range(edit.byte_start..edit.byte_end, &edit.new_text);
    }

    Ok(out)
}

/// Overwrite the file at `path` in place: truncating open, write, fsync.
///
/// Symlinks are resolved first so the link target is patched and the link
/// survives. Opening the existing inode keeps its owner, group and mode,
/// and a read-only target fails before it is truncated.
pub fn write_in_place(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let resolved = fs::canonicalize(path)?;

    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(&resolved)?;
    file.write_all(content)?;
    file.sync_all()?;

    Ok(())
}
