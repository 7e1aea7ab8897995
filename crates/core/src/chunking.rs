use crate::error::IngestError;
use crate::models::{Note, NoteChunk};

pub const DEFAULT_CHUNK_SIZE: usize = 1_000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, IngestError> {
        if chunk_size == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "chunk size must be positive".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(IngestError::InvalidChunkConfig(format!(
                "overlap {overlap} must be smaller than chunk size {chunk_size}"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    fn stride(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap).max(1)
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Splits `text` into fixed-size character windows. Each window after the first
/// starts `overlap` characters before the previous one ended. Windows are trimmed
/// and whitespace-only windows are dropped.
pub fn chunk_text(text: &str, config: ChunkingConfig) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let end = (start + config.chunk_size).min(total);
        let piece: String = chars[start..end].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        if end == total {
            break;
        }
        start = start.saturating_add(config.stride());
    }

    chunks
}

pub fn build_chunks(note: &Note, config: ChunkingConfig) -> Vec<NoteChunk> {
    chunk_text(&note.text, config)
        .into_iter()
        .enumerate()
        .map(|(index, text)| NoteChunk::new(&note.relative_path, index, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(len: usize) -> String {
        ('a'..='z').cycle().take(len).collect()
    }

    #[test]
    fn short_text_is_a_single_trimmed_chunk() {
        let chunks = chunk_text("  hello notes \n", ChunkingConfig::default());
        assert_eq!(chunks, vec!["hello notes".to_string()]);
    }

    #[test]
    fn empty_and_whitespace_text_yield_nothing() {
        assert!(chunk_text("", ChunkingConfig::default()).is_empty());
        assert!(chunk_text(" \n\t  ", ChunkingConfig::default()).is_empty());
    }

    #[test]
    fn overlapping_windows_reconstruct_the_text() -> Result<(), IngestError> {
        let config = ChunkingConfig::new(10, 3)?;
        let text = letters(47);
        let chunks = chunk_text(&text, config);

        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(config.overlap));
        }
        assert_eq!(rebuilt, text);

        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(pair[0].chars().count() - 3).collect();
            let head: String = pair[1].chars().take(3).collect();
            assert_eq!(tail, head);
        }
        Ok(())
    }

    #[test]
    fn chunk_count_matches_stride() -> Result<(), IngestError> {
        let config = ChunkingConfig::new(10, 3)?;
        for len in [11usize, 17, 24, 47, 100] {
            let expected = (len - 3).div_ceil(7);
            assert_eq!(chunk_text(&letters(len), config).len(), expected, "len={len}");
        }
        assert_eq!(chunk_text(&letters(10), config).len(), 1);
        Ok(())
    }

    #[test]
    fn whitespace_only_window_is_discarded() -> Result<(), IngestError> {
        let config = ChunkingConfig::new(5, 0)?;
        let text = format!("abcde{}", " ".repeat(12));
        let chunks = chunk_text(&text, config);
        assert_eq!(chunks, vec!["abcde".to_string()]);
        Ok(())
    }

    #[test]
    fn windows_count_characters_not_bytes() -> Result<(), IngestError> {
        let config = ChunkingConfig::new(4, 1)?;
        let chunks = chunk_text("приветмир", config);
        assert_eq!(chunks[0], "прив");
        assert_eq!(chunks[1], "ветм");
        Ok(())
    }

    #[test]
    fn invalid_overlap_is_rejected() {
        assert!(ChunkingConfig::new(10, 10).is_err());
        assert!(ChunkingConfig::new(0, 0).is_err());
    }

    #[test]
    fn chunk_ids_follow_note_path() {
        let note = Note {
            relative_path: "ops/deploy.md".to_string(),
            text: letters(2_500),
        };
        let chunks = build_chunks(&note, ChunkingConfig::default());
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chunk_id, "ops/deploy.md#0");
        assert_eq!(chunks[2].chunk_id, "ops/deploy.md#2");
        assert!(chunks.iter().all(|chunk| chunk.file == "ops/deploy.md"));
    }
}
