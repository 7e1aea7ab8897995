use crate::error::IndexError;

const DEFAULT: usize = 128;
const MODEL_PREFIX: &str = "char-trigram-";

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;
pub const DEFAULT_EMBEDDING_MODEL: &str = "char-trigram-128";

/// Turns text into a fixed-length vector. Index-time and query-time embeddings
/// are only comparable when `model_id` is equal.
pub trait Embedder: Send + Sync {
    fn model_id(&self) -> String;
    fn dimensions(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;
}

#[derive(Debug, Clone, Copy)]
pub struct CharacterNgramEmbedder {
    pub dimensions: usize,
}

impl Default for CharacterNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl Embedder for CharacterNgramEmbedder {
    fn model_id(&self) -> String {
        format!("{MODEL_PREFIX}{}", self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        let padded;
        let windows = if chars.len() < 3 {
            padded = [vec![' '], chars.clone(), vec![' ']].concat();
            padded.windows(3)
        } else {
            chars.windows(3)
        };

        for window in windows {
            let token = window.iter().collect::<String>();
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

/// Resolves a configured model identifier such as `char-trigram-256`.
pub fn embedder_for_model(model_id: &str) -> Result<Box<dyn Embedder>, IndexError> {
    let dimensions = model_id
        .trim()
        .strip_prefix(MODEL_PREFIX)
        .and_then(|dims| dims.parse::<usize>().ok())
        .filter(|dims| (8..=4096).contains(dims))
        .ok_or_else(|| IndexError::UnknownEmbeddingModel(model_id.to_string()))?;

    Ok(Box::new(CharacterNgramEmbedder { dimensions }))
}

/// Cosine distance in `[0, 2]`; zero vectors are treated as maximally distant
/// from everything but themselves.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 1.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if mag_a < f64::EPSILON || mag_b < f64::EPSILON {
        return 1.0;
    }
    (1.0 - dot / (mag_a * mag_b)).clamp(0.0, 2.0)
}
