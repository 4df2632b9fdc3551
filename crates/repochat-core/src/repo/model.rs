use serde::{Deserialize, Serialize};

use crate::id::RecordId;
use crate::mime::MimeKind;

/// A named collection of files used as conversational context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Unique identifier
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// Files in upload order
    #[serde(default)]
    pub files: Vec<RepoFile>,
}

impl Repository {
    pub fn new(id: RecordId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            files: Vec::new(),
        }
    }

    pub fn find_file(&self, file_id: RecordId) -> Option<&RepoFile> {
        self.files.iter().find(|file| file.id == file_id)
    }
}

/// A file stored in a repository.
///
/// `content` holds the fully extracted text, produced once at upload time.
/// Files are immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoFile {
    /// Unique identifier within the repository
    pub id: RecordId,
    /// Original filename
    pub name: String,
    /// Extracted text content
    pub content: String,
    /// Declared MIME type
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size of the uploaded bytes
    pub size: u64,
    /// When the file was added (ISO 8601)
    pub last_modified: String,
}

impl RepoFile {
    pub fn kind(&self) -> MimeKind {
        MimeKind::from_mime_type(&self.mime_type)
    }
}

/// The result of ingesting an upload, before it is assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDraft {
    pub name: String,
    pub content: String,
    pub mime_type: String,
    pub size: u64,
}
