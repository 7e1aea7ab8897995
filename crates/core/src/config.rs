use crate::chunking::ChunkingConfig;
use crate::embeddings::DEFAULT_EMBEDDING_MODEL;
use crate::llm::LlmSettings;
use std::path::{Path, PathBuf};

pub const DEFAULT_NOTES_DIR: &str = "notes";
pub const DEFAULT_INDEX_DIR: &str = ".index";
pub const DEFAULT_TOP_K: i64 = 4;

/// Process configuration, resolved once by the caller and passed in explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    pub llm: LlmSettings,
    pub notes_dir: PathBuf,
    pub index_dir: PathBuf,
    pub embeddings_model: String,
    pub top_k_default: i64,
    pub chunking: ChunkingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LlmSettings::default(),
            notes_dir: PathBuf::from(DEFAULT_NOTES_DIR),
            index_dir: PathBuf::from(DEFAULT_INDEX_DIR),
            embeddings_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            top_k_default: DEFAULT_TOP_K,
            chunking: ChunkingConfig::default(),
        }
    }
}

impl Settings {
    /// Makes relative directories absolute against `base`.
    pub fn with_base_dir(mut self, base: &Path) -> Self {
        self.notes_dir = resolve_path(&self.notes_dir, base);
        self.index_dir = resolve_path(&self.index_dir, base);
        self
    }
}

pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
