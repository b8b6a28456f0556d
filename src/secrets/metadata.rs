//! The `name|extension|description` metadata convention for binary secrets.

use serde::{Deserialize, Serialize};

const SEPARATOR: char = '|';

/// File details recovered from binary secret metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub extension: String,
    pub description: String,
}

impl FileInfo {
    pub fn new(
        name: impl Into<String>,
        extension: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), extension: extension.into(), description: description.into() }
    }

    /// Split metadata into its three fields.
    ///
    /// Name and extension must be non-empty and cannot contain `|`. The
    /// description absorbs everything after the second separator, must be
    /// non-empty and must fit on one line.
    pub fn parse(metadata: &str) -> Option<Self> {
        let mut parts = metadata.splitn(3, SEPARATOR);
        let name = parts.next()?;
        let extension = parts.next()?;
        let description = parts.next()?;

        if name.is_empty() || extension.is_empty() || description.is_empty() {
            return None;
        }
        if description.contains('\n') {
            return None;
        }

        Some(Self::new(name, extension, description))
    }

    /// File name to restore the payload under
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }

    /// Render back into metadata form
    pub fn to_metadata(&self) -> String {
        format!("{}{SEPARATOR}{}{SEPARATOR}{}", self.name, self.extension, self.description)
    }
}
