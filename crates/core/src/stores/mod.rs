pub mod file;

pub use file::{FileVectorStore, DEFAULT_COLLECTION};
