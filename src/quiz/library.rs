use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::quiz::Quiz;

/// Quizzes available to the host, loaded once at startup.
#[derive(Debug, Default)]
pub struct QuizLibrary {
    quizzes: Vec<Quiz>,
}

#[derive(Debug)]
pub enum LibraryError {
    Open { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    NotAList { path: PathBuf },
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Open { path, source } => {
                write!(f, "failed to open quiz library {}: {}", path.display(), source)
            }
            LibraryError::Parse { path, source } => {
                write!(f, "failed to parse quiz library {}: {}", path.display(), source)
            }
            LibraryError::NotAList { path } => {
                write!(f, "quiz library {} must be a JSON array", path.display())
            }
        }
    }
}

impl std::error::Error for LibraryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LibraryError::Open { source, .. } => Some(source),
            LibraryError::Parse { source, .. } => Some(source),
            LibraryError::NotAList { .. } => None,
        }
    }
}

impl QuizLibrary {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LibraryError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Value =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| LibraryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let Value::Array(entries) = document else {
            return Err(LibraryError::NotAList {
                path: path.to_path_buf(),
            });
        };

        Ok(Self::from_entries(entries))
    }

    /// Entries that are not quiz objects (no string `id`) are skipped.
    pub fn from_entries(entries: Vec<Value>) -> Self {
        let quizzes = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<Quiz>(entry) {
                Ok(quiz) => Some(quiz),
                Err(err) => {
                    log::warn!("Skipping quiz #{} in library: {}", index, err);
                    None
                }
            })
            .collect();
        Self { quizzes }
    }

    pub fn get(&self, id: &str) -> Option<&Quiz> {
        self.quizzes.iter().find(|quiz| quiz.id == id)
    }

    pub fn list(&self) -> impl Iterator<Item = &Quiz> {
        self.quizzes.iter()
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_library(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn opens_quizzes_in_file_order() {
        let file = write_library(
            r#"[
                { "id": "history", "title": "역사", "questions": [
                    { "type": "opinion", "text": "가장 좋아하는 왕은?" }
                ] },
                { "id": "math", "title": "수학", "questions": [] }
            ]"#,
        );
        let library = QuizLibrary::open(file.path()).unwrap();

        assert_eq!(library.len(), 2);
        let ids: Vec<_> = library.list().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["history", "math"]);
        assert_eq!(library.get("history").unwrap().questions.len(), 1);
        assert!(library.get("science").is_none());
    }

    #[test]
    fn skips_entries_without_an_id() {
        let file = write_library(r#"[ { "title": "no id" }, 42, { "id": "ok" } ]"#);
        let library = QuizLibrary::open(file.path()).unwrap();
        assert_eq!(library.len(), 1);
        assert!(library.get("ok").is_some());
    }

    #[test]
    fn rejects_non_list_documents() {
        let file = write_library(r#"{ "id": "single" }"#);
        let err = QuizLibrary::open(file.path()).unwrap_err();
        assert!(matches!(err, LibraryError::NotAList { .. }));
        assert!(err.to_string().contains("must be a JSON array"));
    }

    #[test]
    fn reports_parse_and_open_failures() {
        let file = write_library("[ { ");
        assert!(matches!(
            QuizLibrary::open(file.path()),
            Err(LibraryError::Parse { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            QuizLibrary::open(dir.path().join("missing.json")),
            Err(LibraryError::Open { .. })
        ));
    }
}
