use std::path::PathBuf;

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Images wider than this are scaled down to it
    pub max_width: u32,
    pub default_quality: f32,
    /// Bounding box of the intake thumbnails
    pub preview_size: u32,
    pub download_prefix: String,
    /// Replace the original extension with `.jpg` on download
    pub normalize_extension: bool,
    pub download_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_width: 800,
            default_quality: 0.8,
            preview_size: 240,
            download_prefix: "compressed_".to_string(),
            normalize_extension: false,
            download_dir: None,
        }
    }
}

impl AppConfig {
    /// Configured directory, else the user's Downloads folder, else the
    /// working directory.
    pub fn resolve_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
