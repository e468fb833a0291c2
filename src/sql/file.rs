//! Raw `.sql` files on disk.

use std::path::{Path, PathBuf};

/// A loaded SQL file. Immutable once read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SqlFile {
    pub path: PathBuf,
    pub content: String,
}

impl SqlFile {
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Ok(SqlFile {
            path: path.to_path_buf(),
            content,
        })
    }

    /// True when the file holds nothing but whitespace.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }
}
