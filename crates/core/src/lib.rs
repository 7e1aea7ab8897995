pub mod answer;
pub mod chunking;
pub mod client;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod retriever;
pub mod service;
pub mod stores;
pub mod traits;

pub use answer::{build_context, AnswerComposer, SYSTEM_PROMPT};
pub use chunking::{build_chunks, chunk_text, ChunkingConfig};
pub use client::{answer_or_unavailable, parse_timeout, RagApiClient, UNAVAILABLE_MESSAGE};
pub use config::Settings;
pub use embeddings::{
    embedder_for_model, CharacterNgramEmbedder, Embedder, DEFAULT_EMBEDDING_DIMENSIONS,
    DEFAULT_EMBEDDING_MODEL,
};
pub use error::{ClientError, IndexError, IngestError, LlmError, ServiceError};
pub use ingest::{discover_note_files, load_notes, NoteLoadReport, SkippedNote};
pub use llm::{LlmSettings, OpenRouterChat};
pub use models::{
    ChatRequest, ChatResponse, Collection, IndexedEntry, Note, NoteChunk, ReindexReport,
    ReindexRequest, RetrievedChunk,
};
pub use retriever::Retriever;
pub use service::{
    validate_top_k, RagService, INDEX_EMPTY_MESSAGE, MAX_TOP_K, MIN_TOP_K, NOTHING_FOUND_MESSAGE,
};
pub use stores::FileVectorStore;
pub use traits::{ChatModel, VectorIndex};
