use crate::embeddings::cosine_distance;
use crate::models::score_from_distance;
use crate::traits::VectorIndex;
use crate::{Collection, IndexError, RetrievedChunk};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

pub const DEFAULT_COLLECTION: &str = "notes";

/// Brute-force vector store persisted as one JSON document per collection.
///
/// Readers hold an `Arc` snapshot of the live collection, so a replacement
/// never exposes a half-written or empty index to concurrent searches.
pub struct FileVectorStore {
    path: PathBuf,
    active: RwLock<Option<Arc<Collection>>>,
    write_guard: Mutex<()>,
}

impl FileVectorStore {
    /// Opens the collection `name` under `dir`, loading it if it was persisted before.
    pub async fn open(dir: impl AsRef<Path>, name: &str) -> Result<Self, IndexError> {
        let path = dir.as_ref().join(format!("{name}.json"));
        let active = match tokio::fs::read(&path).await {
            Ok(bytes) => Some(Arc::new(serde_json::from_slice::<Collection>(&bytes)?)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => None,
            Err(error) => return Err(error.into()),
        };

        Ok(Self {
            path,
            active: RwLock::new(active),
            write_guard: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> Option<Arc<Collection>> {
        self.active.read().await.clone()
    }

    async fn persist(&self, collection: &Collection) -> Result<(), IndexError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let staging = self.path.with_extension("json.staging");
        let bytes = serde_json::to_vec(collection)?;
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for FileVectorStore {
    async fn count(&self) -> Result<usize, IndexError> {
        Ok(self.snapshot().await.map_or(0, |collection| collection.len()))
    }

    async fn replace_all(&self, collection: Collection) -> Result<(), IndexError> {
        for entry in &collection.entries {
            if entry.embedding.len() != collection.dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: collection.dimensions,
                    actual: entry.embedding.len(),
                });
            }
        }

        let _guard = self.write_guard.lock().await;
        self.persist(&collection).await?;
        debug!(path = %self.path.display(), entries = collection.len(), "collection persisted");
        *self.active.write().await = Some(Arc::new(collection));
        Ok(())
    }

    async fn search(
        &self,
        model_id: &str,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, IndexError> {
        let Some(collection) = self.snapshot().await else {
            return Ok(Vec::new());
        };
        if collection.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        if collection.embedding_model != model_id {
            return Err(IndexError::EmbeddingModelMismatch {
                indexed: collection.embedding_model.clone(),
                requested: model_id.to_string(),
            });
        }
        if query_vector.len() != collection.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: collection.dimensions,
                actual: query_vector.len(),
            });
        }

        let mut scored = collection
            .entries
            .iter()
            .map(|entry| (cosine_distance(query_vector, &entry.embedding), entry))
            .collect::<Vec<_>>();

        scored.sort_by(|(left_distance, left), (right_distance, right)| {
            left_distance
                .total_cmp(right_distance)
                .then_with(|| left.chunk.chunk_id.cmp(&right.chunk.chunk_id))
        });

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(distance, entry)| RetrievedChunk {
                file: entry.chunk.file.clone(),
                chunk_id: entry.chunk.chunk_id.clone(),
                score: score_from_distance(distance),
                distance,
                text: entry.chunk.text.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IndexedEntry, NoteChunk};
    use tempfile::tempdir;

    fn collection(model: &str, vectors: &[(&str, Vec<f32>)]) -> Collection {
        let mut collection = Collection::empty(DEFAULT_COLLECTION, model, 2);
        for (index, (file, vector)) in vectors.iter().enumerate() {
            collection.entries.push(IndexedEntry {
                chunk: NoteChunk::new(file, index, format!("text of {file}")),
                embedding: vector.clone(),
            });
        }
        collection
    }

    #[tokio::test]
    async fn missing_collection_is_empty() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = FileVectorStore::open(dir.path(), DEFAULT_COLLECTION).await?;
        assert_eq!(store.count().await?, 0);
        assert!(store.snapshot().await.is_none());
        assert!(store.search("m", &[1.0, 0.0], 3).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn results_are_ranked_by_distance() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = FileVectorStore::open(dir.path(), DEFAULT_COLLECTION).await?;
        store
            .replace_all(collection(
                "m",
                &[
                    ("far.md", vec![0.0, 1.0]),
                    ("near.md", vec![1.0, 0.1]),
                    ("exact.md", vec![1.0, 0.0]),
                ],
            ))
            .await?;

        let hits = store.search("m", &[1.0, 0.0], 10).await?;
        let files = hits.iter().map(|hit| hit.file.as_str()).collect::<Vec<_>>();
        assert_eq!(files, vec!["exact.md", "near.md", "far.md"]);
        assert!((hits[0].score - 1.0).abs() < 1e-9);
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(hits.iter().all(|hit| hit.score > 0.0 && hit.score <= 1.0));
        Ok(())
    }

    #[tokio::test]
    async fn top_k_larger_than_collection_returns_everything() -> Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempdir()?;
        let store = FileVectorStore::open(dir.path(), DEFAULT_COLLECTION).await?;
        store
            .replace_all(collection("m", &[("a.md", vec![1.0, 0.0])]))
            .await?;
        assert_eq!(store.search("m", &[0.5, 0.5], 20).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn collection_survives_reopen() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        {
            let store = FileVectorStore::open(dir.path(), DEFAULT_COLLECTION).await?;
            store
                .replace_all(collection("m", &[("a.md", vec![1.0, 0.0]), ("b.md", vec![0.0, 1.0])]))
                .await?;
        }
        let reopened = FileVectorStore::open(dir.path(), DEFAULT_COLLECTION).await?;
        assert_eq!(reopened.count().await?, 2);
        let model = reopened
            .snapshot()
            .await
            .map(|collection| collection.embedding_model.clone());
        assert_eq!(model.as_deref(), Some("m"));
        assert!(!reopened.path().with_extension("json.staging").exists());
        Ok(())
    }

    #[tokio::test]
    async fn mismatched_model_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = FileVectorStore::open(dir.path(), DEFAULT_COLLECTION).await?;
        store
            .replace_all(collection("model-a", &[("a.md", vec![1.0, 0.0])]))
            .await?;

        let result = store.search("model-b", &[1.0, 0.0], 1).await;
        assert!(matches!(result, Err(IndexError::EmbeddingModelMismatch { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_dimension_entries_are_refused() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = FileVectorStore::open(dir.path(), DEFAULT_COLLECTION).await?;
        store
            .replace_all(collection("m", &[("a.md", vec![1.0, 0.0])]))
            .await?;

        let bad = collection("m", &[("b.md", vec![1.0, 0.0, 0.0])]);
        assert!(store.replace_all(bad).await.is_err());
        assert_eq!(store.count().await?, 1);
        Ok(())
    }
}
