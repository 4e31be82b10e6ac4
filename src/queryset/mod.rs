//! Query-list ingestion
//!
//! `.json` files hold a JSON array of question strings; any other file is
//! read as one question per non-empty line. Order is preserved and questions
//! are never deduplicated: a query is identified by its position.

use crate::error::{HopchainError, Result};
use std::path::Path;

/// An ordered batch of questions
#[derive(Debug, Clone)]
pub struct QuerySet {
    queries: Vec<String>,
}

impl QuerySet {
    /// Load a query list from a file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| HopchainError::Io {
            source: e,
            context: format!("Failed to read query list: {:?}", path),
        })?;

        let queries = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str::<Vec<String>>(&content).map_err(|e| HopchainError::Json {
                source: e,
                context: format!("Query list {:?} is not a JSON array of strings", path),
            })?
        } else {
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect()
        };

        if queries.is_empty() {
            return Err(HopchainError::QuerySet(format!(
                "Query list is empty: {:?}",
                path
            )));
        }

        Ok(Self { queries })
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_json_query_list() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("queries.json");
        std::fs::write(&path, r#"["first question", "second question"]"#).unwrap();

        let set = QuerySet::from_path(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.queries()[0], "first question");
    }

    #[test]
    fn test_line_query_list_keeps_duplicates() {
        let mut file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        writeln!(file, "who did what").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "who did what").unwrap();

        let set = QuerySet::from_path(file.path()).unwrap();
        assert_eq!(set.queries(), &["who did what", "who did what"]);
    }

    #[test]
    fn test_empty_list_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("queries.json");
        std::fs::write(&path, "[]").unwrap();

        assert!(matches!(
            QuerySet::from_path(&path),
            Err(HopchainError::QuerySet(_))
        ));
    }
}
