//! A directory of `.txt` articles.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{DocumentRef, DocumentSource};
use crate::error::SourceError;

const UNKNOWN_PUBLISHER: &str = "unknown";

/// Lists `*.txt` files directly inside `root`. The file name is the document id.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn io_error(&self, source: std::io::Error) -> SourceError {
        if source.kind() == ErrorKind::NotFound {
            SourceError::NotFound {
                path: self.root.display().to_string(),
            }
        } else {
            SourceError::Io {
                path: self.root.display().to_string(),
                source,
            }
        }
    }
}

#[async_trait]
impl DocumentSource for DirectorySource {
    async fn list(&self) -> Result<Vec<DocumentRef>, SourceError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| self.io_error(e))?;

        let mut documents = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| self.io_error(e))? {
            let file_type = entry.file_type().await.map_err(|e| self.io_error(e))?;
            if !file_type.is_file() {
                continue;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                tracing::warn!(
                    path = %entry.path().display(),
                    "skipping file with non-UTF-8 name"
                );
                continue;
            };
            if !is_article_file(name) {
                continue;
            }

            documents.push(DocumentRef {
                document_id: name.to_string(),
                origin: publisher_from_file_name(name),
            });
        }

        documents.sort_by(|a, b| a.document_id.cmp(&b.document_id));
        Ok(documents)
    }

    async fn read(&self, document_id: &str) -> Result<String, SourceError> {
        if document_id.is_empty()
            || document_id.contains(['/', '\\'])
            || document_id == ".."
            || document_id == "."
        {
            return Err(SourceError::InvalidDocumentId(document_id.to_string()));
        }

        let path = self.root.join(document_id);
        let bytes = tokio::fs::read(&path).await.map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn is_article_file(name: &str) -> bool {
    let is_txt = Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
    is_txt && !name.starts_with("README")
}

/// Publisher label from an article file name.
///
/// Names follow `<subject>__<topic>__<publisher>.txt`; the last `__` segment
/// of the stem is the publisher, with underscores read as spaces. Names
/// without a `__` separator give `"unknown"`.
#[must_use]
pub fn publisher_from_file_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    match stem.rsplit_once("__") {
        Some((_, publisher)) if !publisher.trim_matches('_').trim().is_empty() => {
            publisher.replace('_', " ").trim().to_string()
        }
        _ => UNKNOWN_PUBLISHER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publisher_is_last_double_underscore_segment() {
        assert_eq!(
            publisher_from_file_name("Alvarez_PLC__fishing__2035__Haacklee_Herald.txt"),
            "Haacklee Herald"
        );
        assert_eq!(
            publisher_from_file_name("jones__The_News_Buoy.txt"),
            "The News Buoy"
        );
    }

    #[test]
    fn publisher_falls_back_to_unknown() {
        assert_eq!(publisher_from_file_name("plain_article.txt"), "unknown");
        assert_eq!(publisher_from_file_name("trailing__.txt"), "unknown");
    }

    #[test]
    fn article_files_are_txt_without_readme() {
        assert!(is_article_file("a.txt"));
        assert!(is_article_file("b.TXT"));
        assert!(!is_article_file("README.txt"));
        assert!(!is_article_file("notes.md"));
        assert!(!is_article_file("txt"));
    }

    #[tokio::test]
    async fn lists_sorted_article_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b__Lomark_Daily.txt"), "second").unwrap();
        std::fs::write(dir.path().join("a__Haacklee_Herald.txt"), "first").unwrap();
        std::fs::write(dir.path().join("README.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("image.png"), [0_u8, 1, 2]).unwrap();
        std::fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let source = DirectorySource::new(dir.path());
        let docs = source.list().await.unwrap();

        assert_eq!(
            docs,
            vec![
                DocumentRef {
                    document_id: "a__Haacklee_Herald.txt".to_string(),
                    origin: "Haacklee Herald".to_string(),
                },
                DocumentRef {
                    document_id: "b__Lomark_Daily.txt".to_string(),
                    origin: "Lomark Daily".to_string(),
                },
            ]
        );
        assert_eq!(source.read("a__Haacklee_Herald.txt").await.unwrap(), "first");
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path().join("absent"));
        let err = source.list().await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn read_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());
        for id in ["../secret.txt", "nested/a.txt", "..", ""] {
            let err = source.read(id).await.unwrap_err();
            assert!(matches!(err, SourceError::InvalidDocumentId(_)), "{id}: {err:?}");
        }
    }

    #[tokio::test]
    async fn read_decodes_invalid_utf8_lossily() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.txt"), [b'o', b'k', 0xFF]).unwrap();
        let source = DirectorySource::new(dir.path());
        assert_eq!(source.read("x.txt").await.unwrap(), "ok\u{FFFD}");
    }

    #[tokio::test]
    async fn missing_document_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());
        let err = source.read("gone.txt").await.unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }), "{err:?}");
    }
}
