pub mod blob;
pub mod error;
pub mod model;

pub use blob::{BlobRegistry, BlobUrl};
pub use error::AppError;
pub use model::{
    CompressedPreview, CompressedResult, Generation, OriginalPreview, PreviewEntry, PreviewState,
    Quality, ResultStore, SelectedFile,
};
