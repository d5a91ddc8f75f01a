use crate::error::DocumentError;
use scraper::Html;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads documents from disk and builds their element trees
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentParser {
    max_file_size: Option<u64>,
}

impl DocumentParser {
    pub fn new(max_file_size: Option<u64>) -> Self {
        Self { max_file_size }
    }

    /// Read a file as UTF-8 text
    ///
    /// Open and read failures map to `DocumentError::Open`, invalid UTF-8 to
    /// `DocumentError::Parse`.
    pub fn read(&self, path: &Path) -> Result<String, DocumentError> {
        let open_error = |source| DocumentError::Open {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(open_error)?;
        let size = file.metadata().map_err(open_error)?.len();

        if let Some(limit) = self.max_file_size {
            if size > limit {
                return Err(DocumentError::TooLarge {
                    path: path.to_path_buf(),
                    size,
                    limit,
                });
            }
        }

        let mut bytes = Vec::with_capacity(size as usize);
        file.read_to_end(&mut bytes).map_err(open_error)?;

        String::from_utf8(bytes).map_err(|e| DocumentError::Parse {
            path: path.to_path_buf(),
            reason: e.utf8_error().to_string(),
        })
    }

    /// Lenient HTML5 tree construction; malformed markup is repaired, never rejected
    pub fn parse(&self, source: &str) -> Html {
        Html::parse_document(source)
    }

    pub fn parse_file(&self, path: &Path) -> Result<Html, DocumentError> {
        let source = self.read(path)?;
        Ok(self.parse(&source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_reads_utf8_document() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("page.html");
        fs::write(&path, "<p class=\"ok\">héllo</p>").unwrap();

        let source = DocumentParser::default().read(&path).unwrap();
        assert!(source.contains("héllo"));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("latin1.html");
        fs::write(&path, b"<p class=\"caf\xe9\"></p>").unwrap();

        let err = DocumentParser::default().read(&path).unwrap_err();
        assert_matches!(err, DocumentError::Parse { .. });
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let temp_dir = tempdir().unwrap();
        let err = DocumentParser::default()
            .read(&temp_dir.path().join("gone.html"))
            .unwrap_err();

        assert_matches!(err, DocumentError::Open { .. });
    }

    #[test]
    fn test_size_limit() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("big.html");
        fs::write(&path, "x".repeat(64)).unwrap();

        let err = DocumentParser::new(Some(16)).read(&path).unwrap_err();
        assert_matches!(err, DocumentError::TooLarge { size: 64, limit: 16, .. });

        assert!(DocumentParser::new(Some(64)).read(&path).is_ok());
    }

    #[test]
    fn test_malformed_markup_is_repaired() {
        let html = DocumentParser::default().parse("<div class=\"a\"><span class=\"b\">unclosed");

        let elements = html
            .tree
            .root()
            .descendants()
            .filter_map(|node| node.value().as_element().map(|e| e.name().to_string()))
            .collect::<Vec<_>>();

        assert!(elements.contains(&"div".to_string()));
        assert!(elements.contains(&"span".to_string()));
    }
}
