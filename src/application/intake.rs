use std::path::{Path, PathBuf};

use bytes::Bytes;
use iced::widget::image::Handle;

use crate::domain::{AppError, SelectedFile};

/// A selected file that was read and decoded successfully.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
    pub thumbnail: Handle,
}

/// Turns picked or dropped paths into decoded previews.
#[derive(Debug, Clone)]
pub struct SelectionIntake {
    preview_size: u32,
}

impl SelectionIntake {
    pub fn new(preview_size: u32) -> Self {
        Self { preview_size }
    }

    pub fn preview_size(&self) -> u32 {
        self.preview_size
    }

    pub async fn pick_files(&self) -> Option<Vec<PathBuf>> {
        rfd::AsyncFileDialog::new()
            .set_title("Select images")
            .add_filter(
                "Images",
                &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff"],
            )
            .add_filter("All files", &["*"])
            .pick_files()
            .await
            .map(|handles| {
                handles
                    .into_iter()
                    .map(|handle| handle.path().to_path_buf())
                    .collect()
            })
    }

    pub fn describe(paths: Vec<PathBuf>) -> Vec<SelectedFile> {
        paths.into_iter().map(SelectedFile::from_path).collect()
    }

    /// Read one file and decode it off the UI thread.
    pub async fn load(&self, path: PathBuf) -> Result<LoadedImage, AppError> {
        let bytes = read_file(&path).await?;
        let preview_size = self.preview_size;

        tokio::task::spawn_blocking(move || decode_preview(bytes, preview_size))
            .await
            .map_err(|e| AppError::TaskJoin(e.to_string()))?
    }
}

async fn read_file(path: &Path) -> Result<Bytes, AppError> {
    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|e| AppError::Io(format!("{}: {}", path.display(), e)))
}

pub fn decode_preview(bytes: Bytes, preview_size: u32) -> Result<LoadedImage, AppError> {
    let img = image::load_from_memory(&bytes).map_err(|e| AppError::Decode(e.to_string()))?;
    let (width, height) = (img.width(), img.height());

    let thumbnail = img.thumbnail(preview_size, preview_size).to_rgba8();
    let (thumb_width, thumb_height) = thumbnail.dimensions();

    Ok(LoadedImage {
        bytes,
        width,
        height,
        thumbnail: Handle::from_rgba(thumb_width, thumb_height, thumbnail.into_raw()),
    })
}
