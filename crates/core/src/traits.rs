use crate::{Collection, IndexError, LlmError, RetrievedChunk};
use async_trait::async_trait;

#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn count(&self) -> Result<usize, IndexError>;

    /// Replaces the live collection with `collection` in one step.
    async fn replace_all(&self, collection: Collection) -> Result<(), IndexError>;

    async fn search(
        &self,
        model_id: &str,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, IndexError>;
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system: &str, question: &str, context: &str) -> Result<String, LlmError>;
}
