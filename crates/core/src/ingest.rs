use crate::{IngestError, Note};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

pub const NOTE_EXTENSIONS: [&str; 2] = ["md", "txt"];

pub fn is_note_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            NOTE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Recursively lists note files under `folder` in sorted order.
/// A missing folder yields an empty list.
pub fn discover_note_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if entry.file_type().is_file() && is_note_file(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub fn relative_note_path(root: &Path, path: &Path) -> Result<String, IngestError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| IngestError::OutsideRoot(path.display().to_string()))?;

    let parts = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>();

    Ok(parts.join("/"))
}

/// Reads a note as text, replacing invalid UTF-8 sequences.
pub fn read_note(root: &Path, path: &Path) -> Result<Note, IngestError> {
    let bytes = fs::read(path)?;
    Ok(Note {
        relative_path: relative_note_path(root, path)?,
        text: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

pub struct SkippedNote {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Default)]
pub struct NoteLoadReport {
    pub notes: Vec<Note>,
    pub skipped_files: Vec<SkippedNote>,
}

/// Loads every non-blank note under `folder`. Unreadable files are reported
/// in `skipped_files` instead of failing the whole load.
pub fn load_notes(folder: &Path) -> NoteLoadReport {
    if !folder.is_dir() {
        warn!(notes_dir = %folder.display(), "notes directory does not exist, nothing to index");
        return NoteLoadReport::default();
    }

    let mut report = NoteLoadReport::default();
    for path in discover_note_files(folder) {
        match read_note(folder, &path) {
            Ok(note) if note.text.trim().is_empty() => {}
            Ok(note) => report.notes.push(note),
            Err(error) => report.skipped_files.push(SkippedNote {
                path,
                reason: error.to_string(),
            }),
        }
    }

    report
}
