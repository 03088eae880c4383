use std::path::PathBuf;

use bytes::Bytes;
use iced::widget::image::Handle;

use super::BlobUrl;

/// Identifies one selection. Every in-flight task carries the generation it
/// was dispatched under and is dropped if the selection has moved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// JPEG quality factor in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the encoder's `1..=100` scale.
    pub fn jpeg_quality(self) -> u8 {
        ((self.0 * 100.0).round() as u8).clamp(1, 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    /// Byte length, known once the intake read has finished.
    pub size: u64,
}

impl SelectedFile {
    /// Describes a picked or dropped path without touching the filesystem.
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            path,
            name,
            size: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OriginalPreview {
    pub thumbnail: Handle,
    pub width: u32,
    pub height: u32,
    /// Set when a compression attempt failed and the entry was restored.
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompressedPreview {
    pub image: Handle,
    pub url: BlobUrl,
    pub size: u64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub enum PreviewState {
    Loading,
    Failed(String),
    Original(OriginalPreview),
    Compressing {
        original: OriginalPreview,
        quality: Quality,
    },
    Compressed(CompressedPreview),
}

/// UI state of one selected file, keyed by its index in the selection.
#[derive(Debug, Clone)]
pub struct PreviewEntry {
    pub file: SelectedFile,
    /// Bytes read during intake, reused by the compressor.
    pub source: Option<Bytes>,
    pub state: PreviewState,
}

impl PreviewEntry {
    pub fn new(file: SelectedFile) -> Self {
        Self {
            file,
            source: None,
            state: PreviewState::Loading,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedResult {
    pub reference_url: BlobUrl,
    pub filename: String,
}

/// Compressed outputs in completion order.
#[derive(Debug, Default)]
pub struct ResultStore {
    results: Vec<CompressedResult>,
}

impl ResultStore {
    pub fn push(&mut self, result: CompressedResult) {
        self.results.push(result);
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompressedResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
