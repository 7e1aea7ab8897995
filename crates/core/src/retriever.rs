use crate::chunking::{build_chunks, ChunkingConfig};
use crate::embeddings::Embedder;
use crate::ingest::load_notes;
use crate::stores::DEFAULT_COLLECTION;
use crate::traits::VectorIndex;
use crate::{Collection, IndexError, IndexedEntry, ReindexReport, RetrievedChunk};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Loads, chunks, embeds and searches notes against a single vector index.
pub struct Retriever<V>
where
    V: VectorIndex,
{
    index: V,
    embedder: Box<dyn Embedder>,
    chunking: ChunkingConfig,
    collection_name: String,
    reindex_lock: Mutex<()>,
}

impl<V> Retriever<V>
where
    V: VectorIndex,
{
    pub fn new(index: V, embedder: Box<dyn Embedder>, chunking: ChunkingConfig) -> Self {
        Self {
            index,
            embedder,
            chunking,
            collection_name: DEFAULT_COLLECTION.to_string(),
            reindex_lock: Mutex::new(()),
        }
    }

    pub fn index(&self) -> &V {
        &self.index
    }

    pub async fn count(&self) -> Result<usize, IndexError> {
        self.index.count().await
    }

    /// Rebuilds the whole index from `notes_dir`.
    ///
    /// The new collection is assembled completely before it replaces the live
    /// one; concurrent reindexes run one after another.
    pub async fn reindex(&self, notes_dir: &Path) -> Result<ReindexReport, IndexError> {
        let _guard = self.reindex_lock.lock().await;

        let report = load_notes(notes_dir);
        for skipped in &report.skipped_files {
            warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped note");
        }

        let model_id = self.embedder.model_id();
        let mut staging =
            Collection::empty(&self.collection_name, &model_id, self.embedder.dimensions());

        for note in &report.notes {
            for chunk in build_chunks(note, self.chunking) {
                let embedding = self.embedder.embed(&chunk.text);
                staging.entries.push(IndexedEntry { chunk, embedding });
            }
        }

        let result = ReindexReport {
            indexed_files: report.notes.len(),
            indexed_chunks: staging.len(),
        };

        self.index.replace_all(staging).await?;

        info!(
            notes_dir = %notes_dir.display(),
            embeddings_model = %model_id,
            indexed_files = result.indexed_files,
            indexed_chunks = result.indexed_chunks,
            "reindex complete"
        );

        Ok(result)
    }

    /// Returns up to `top_k` chunks ranked from most to least relevant.
    pub async fn query(&self, question: &str, top_k: usize) -> Result<Vec<RetrievedChunk>, IndexError> {
        let query_vector = self.embedder.embed(question);
        self.index
            .search(&self.embedder.model_id(), &query_vector, top_k)
            .await
    }
}
