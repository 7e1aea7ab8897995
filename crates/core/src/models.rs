use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note file read from the notes directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Path relative to the notes root, `/`-separated.
    pub relative_path: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteChunk {
    /// `relative_path#index`.
    pub chunk_id: String,
    pub file: String,
    pub chunk_index: usize,
    pub text: String,
}

impl NoteChunk {
    pub fn new(file: &str, chunk_index: usize, text: String) -> Self {
        Self {
            chunk_id: make_chunk_id(file, chunk_index),
            file: file.to_string(),
            chunk_index,
            text,
        }
    }
}

pub fn make_chunk_id(file: &str, chunk_index: usize) -> String {
    format!("{file}#{chunk_index}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedEntry {
    pub chunk: NoteChunk,
    pub embedding: Vec<f32>,
}

/// A complete, self-describing set of indexed entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub embedding_model: String,
    pub dimensions: usize,
    pub built_at: DateTime<Utc>,
    pub entries: Vec<IndexedEntry>,
}

impl Collection {
    pub fn empty(name: impl Into<String>, embedding_model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            name: name.into(),
            embedding_model: embedding_model.into(),
            dimensions,
            built_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    pub file: String,
    pub chunk_id: String,
    /// `1 / (1 + distance)`, in `(0, 1]`.
    pub score: f64,
    pub distance: f64,
    pub text: String,
}

pub fn score_from_distance(distance: f64) -> f64 {
    1.0 / (1.0 + distance.max(0.0))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReindexReport {
    pub indexed_files: usize,
    pub indexed_chunks: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReindexRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_decreases_with_distance() {
        assert_eq!(score_from_distance(0.0), 1.0);
        let near = score_from_distance(0.2);
        let far = score_from_distance(1.5);
        assert!(near > far);
        assert!(far > 0.0 && near <= 1.0);
    }

    #[test]
    fn chunk_id_joins_file_and_index() {
        let chunk = NoteChunk::new("dir/a.md", 3, "text".to_string());
        assert_eq!(chunk.chunk_id, "dir/a.md#3");
    }

    #[test]
    fn chat_request_top_k_is_optional() -> Result<(), serde_json::Error> {
        let parsed: ChatRequest = serde_json::from_str(r#"{"question":"why?"}"#)?;
        assert_eq!(parsed.top_k, None);
        let body = serde_json::to_string(&ChatRequest {
            question: "q".to_string(),
            top_k: None,
        })?;
        assert_eq!(body, r#"{"question":"q"}"#);
        Ok(())
    }
}
