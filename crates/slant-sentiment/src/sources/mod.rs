//! Document source abstractions.

mod directory;

pub use directory::{publisher_from_file_name, DirectorySource};

use async_trait::async_trait;

use crate::error::SourceError;

/// A candidate document as listed by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Stable key, derived from the document's origin name.
    pub document_id: String,
    /// Publisher label.
    pub origin: String,
}

/// Where raw documents come from.
///
/// `list` failing means the whole source is unavailable. `read` failing
/// affects only that document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn list(&self) -> Result<Vec<DocumentRef>, SourceError>;

    async fn read(&self, document_id: &str) -> Result<String, SourceError>;
}
