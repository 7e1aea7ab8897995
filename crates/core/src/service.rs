use crate::answer::AnswerComposer;
use crate::config::Settings;
use crate::embeddings::embedder_for_model;
use crate::llm::OpenRouterChat;
use crate::retriever::Retriever;
use crate::stores::{FileVectorStore, DEFAULT_COLLECTION};
use crate::traits::{ChatModel, VectorIndex};
use crate::{ChatRequest, ChatResponse, ReindexReport, ReindexRequest, ServiceError};
use std::path::PathBuf;
use tracing::info;

pub const MIN_TOP_K: i64 = 1;
pub const MAX_TOP_K: i64 = 20;

pub const INDEX_EMPTY_MESSAGE: &str = "The index looks empty. Run /reindex (or call POST /reindex) and ask again.\n\n\
Also check that NOTES_DIR points at the folder with your notes.";

pub const NOTHING_FOUND_MESSAGE: &str = "The notes contain nothing relevant to this question. Try rephrasing it.\n\n\
If you have just added or changed notes, run /reindex.";

/// Applies the default and checks `top_k` is within `[MIN_TOP_K, MAX_TOP_K]`.
pub fn validate_top_k(requested: Option<i64>, default: i64) -> Result<usize, ServiceError> {
    let top_k = requested.unwrap_or(default);
    if !(MIN_TOP_K..=MAX_TOP_K).contains(&top_k) {
        return Err(ServiceError::Validation(format!(
            "top_k must be in [{MIN_TOP_K}, {MAX_TOP_K}]"
        )));
    }
    Ok(top_k as usize)
}

/// Transport-agnostic reindex and chat operations.
pub struct RagService<V, M>
where
    V: VectorIndex,
    M: ChatModel,
{
    settings: Settings,
    retriever: Retriever<V>,
    composer: AnswerComposer<M>,
}

impl RagService<FileVectorStore, OpenRouterChat> {
    /// Wires the file-backed index and the OpenRouter client from `settings`.
    pub async fn from_settings(settings: Settings) -> Result<Self, ServiceError> {
        let embedder = embedder_for_model(&settings.embeddings_model)?;
        let store = FileVectorStore::open(&settings.index_dir, DEFAULT_COLLECTION).await?;
        let retriever = Retriever::new(store, embedder, settings.chunking);
        let composer = AnswerComposer::new(OpenRouterChat::new(settings.llm.clone()));
        Ok(Self::new(settings, retriever, composer))
    }
}

impl<V, M> RagService<V, M>
where
    V: VectorIndex,
    M: ChatModel,
{
    pub fn new(settings: Settings, retriever: Retriever<V>, composer: AnswerComposer<M>) -> Self {
        Self {
            settings,
            retriever,
            composer,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn retriever(&self) -> &Retriever<V> {
        &self.retriever
    }

    pub async fn reindex(&self, request: ReindexRequest) -> Result<ReindexReport, ServiceError> {
        let notes_dir = request
            .notes_dir
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.settings.notes_dir.clone());

        info!(
            notes_dir = %notes_dir.display(),
            index_dir = %self.settings.index_dir.display(),
            embeddings_model = %self.settings.embeddings_model,
            "reindex"
        );

        self.retriever
            .reindex(&notes_dir)
            .await
            .map_err(|error| ServiceError::Internal(error.to_string()))
    }

    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ServiceError> {
        let top_k = validate_top_k(request.top_k, self.settings.top_k_default)?;

        if self.retriever.count().await? == 0 {
            return Ok(ChatResponse {
                answer: INDEX_EMPTY_MESSAGE.to_string(),
            });
        }

        let retrieved = self.retriever.query(&request.question, top_k).await?;
        let top = retrieved
            .iter()
            .max_by(|left, right| left.score.total_cmp(&right.score));

        let Some(top) = top else {
            info!(question = %request.question, top_k, retrieved = 0, "chat");
            return Ok(ChatResponse {
                answer: NOTHING_FOUND_MESSAGE.to_string(),
            });
        };

        info!(
            question = %request.question,
            top_k,
            top_file = %top.file,
            top_score = %format!("{:.4}", top.score),
            "chat"
        );

        let answer = self.composer.compose(&request.question, &retrieved).await?;
        Ok(ChatResponse { answer })
    }
}
