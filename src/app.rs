use std::path::PathBuf;

use iced::widget::image::Handle;
use iced::{event, window, Event, Subscription, Task};

use crate::application::{
    CompressedImage, Compressor, Downloader, LoadedImage, SelectionIntake,
};
use crate::config::AppConfig;
use crate::domain::{
    AppError, BlobRegistry, CompressedPreview, CompressedResult, Generation, OriginalPreview,
    PreviewEntry, PreviewState, Quality, ResultStore, SelectedFile,
};
use crate::ui::{CompressorView, Panel, UiMessage};

/// Tracks one drag gesture so that a multi-file drop becomes one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropGesture {
    Idle,
    Hovering,
    Dropping,
}

/// Top-level controller. Owns every piece of state the window shows.
pub struct CompressorApp {
    view: CompressorView,
    intake: SelectionIntake,
    compressor: Compressor,
    downloader: Downloader,
    generation: Generation,
    entries: Vec<PreviewEntry>,
    results: ResultStore,
    blobs: BlobRegistry,
    quality: Quality,
    drop_gesture: DropGesture,
}

impl Default for CompressorApp {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl CompressorApp {
    pub fn new(config: AppConfig) -> Self {
        let downloader = Downloader::new(
            config.resolve_download_dir(),
            config.download_prefix.clone(),
            config.normalize_extension,
        );

        Self {
            view: CompressorView::default(),
            intake: SelectionIntake::new(config.preview_size),
            compressor: Compressor::new(config.max_width),
            downloader,
            generation: Generation::default(),
            entries: Vec::new(),
            results: ResultStore::default(),
            blobs: BlobRegistry::default(),
            quality: Quality::new(config.default_quality),
            drop_gesture: DropGesture::Idle,
        }
    }

    /// Replace the current selection. Everything tied to the old one is
    /// discarded before any load for the new one is dispatched.
    fn on_selection_changed(&mut self, files: Vec<SelectedFile>) -> Task<Message> {
        self.generation = self.generation.next();
        let revoked = self.blobs.revoke_all();
        self.results.clear();
        self.entries = files.into_iter().map(PreviewEntry::new).collect();

        log::info!(
            "New selection ({:?}): {} file(s), released {} blob(s)",
            self.generation,
            self.entries.len(),
            revoked
        );
        self.view.status_message = match self.entries.len() {
            0 => "No images selected".to_string(),
            1 => "Loading 1 image...".to_string(),
            n => format!("Loading {} images...", n),
        };

        let loads: Vec<_> = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| self.load_entry(index, entry.file.path.clone()))
            .collect();
        Task::batch(loads)
    }

    /// Add a file to the current selection (later files of one drop gesture).
    fn append_file(&mut self, file: SelectedFile) -> Task<Message> {
        let index = self.entries.len();
        let path = file.path.clone();
        self.entries.push(PreviewEntry::new(file));
        log::debug!("Appended {} at index {}", path.display(), index);
        self.load_entry(index, path)
    }

    fn load_entry(&self, index: usize, path: PathBuf) -> Task<Message> {
        let intake = self.intake.clone();
        let generation = self.generation;

        Task::perform(async move { intake.load(path).await }, move |result| {
            Message::PreviewLoaded {
                generation,
                index,
                result,
            }
        })
    }

    fn compress(&mut self, index: usize) -> Task<Message> {
        let Some(entry) = self.entries.get_mut(index) else {
            return Task::none();
        };
        let (PreviewState::Original(original), Some(source)) = (&entry.state, &entry.source)
        else {
            log::debug!("Ignoring compress for index {} in state {:?}", index, entry.state);
            return Task::none();
        };
        let source = source.clone();
        let original = OriginalPreview {
            note: None,
            ..original.clone()
        };

        // Read the setting now, not when the entry was loaded
        let quality = self.quality;
        entry.state = PreviewState::Compressing { original, quality };

        log::info!(
            "Compressing {} at quality {:.2}",
            entry.file.name,
            quality.value()
        );

        let compressor = self.compressor.clone();
        let generation = self.generation;
        Task::perform(
            async move { compressor.compress(source, quality).await },
            move |result| Message::CompressionFinished {
                generation,
                index,
                result,
            },
        )
    }

    fn is_stale(&self, generation: Generation) -> bool {
        if generation != self.generation {
            log::debug!(
                "Discarding result for {:?}, current selection is {:?}",
                generation,
                self.generation
            );
            return true;
        }
        false
    }

    fn on_preview_loaded(&mut self, index: usize, result: Result<LoadedImage, AppError>) {
        let Some(entry) = self.entries.get_mut(index) else {
            return;
        };
        if !matches!(entry.state, PreviewState::Loading) {
            return;
        }

        match result {
            Ok(loaded) => {
                log::debug!(
                    "Loaded {} ({}x{})",
                    entry.file.name,
                    loaded.width,
                    loaded.height
                );
                entry.state = PreviewState::Original(OriginalPreview {
                    thumbnail: loaded.thumbnail,
                    width: loaded.width,
                    height: loaded.height,
                    note: None,
                });
                entry.file.size = loaded.bytes.len() as u64;
                entry.source = Some(loaded.bytes);
            }
            Err(e) => {
                log::warn!("Failed to load {}: {}", entry.file.name, e);
                entry.state = PreviewState::Failed(e.to_string());
            }
        }

        if !self
            .entries
            .iter()
            .any(|entry| matches!(entry.state, PreviewState::Loading))
        {
            self.view.status_message = "Ready".to_string();
        }
    }

    fn on_compression_finished(
        &mut self,
        index: usize,
        result: Result<CompressedImage, AppError>,
    ) {
        let Some(entry) = self.entries.get_mut(index) else {
            return;
        };
        let PreviewState::Compressing { original, .. } = &entry.state else {
            return;
        };

        match result {
            Ok(compressed) => {
                let size = compressed.bytes.len() as u64;
                let url = self.blobs.create(compressed.bytes.clone());

                entry.state = PreviewState::Compressed(CompressedPreview {
                    image: Handle::from_bytes(compressed.bytes),
                    url,
                    size,
                    width: compressed.width,
                    height: compressed.height,
                });
                self.results.push(CompressedResult {
                    reference_url: url,
                    filename: entry.file.name.clone(),
                });

                log::info!(
                    "Compressed {}: {} -> {} bytes ({})",
                    entry.file.name,
                    entry.file.size,
                    size,
                    url
                );
                self.view.status_message = format!("Compressed {}", entry.file.name);
            }
            Err(e) => {
                log::warn!("Compression of {} failed: {}", entry.file.name, e);
                entry.state = PreviewState::Original(OriginalPreview {
                    note: Some(format!("Compression failed: {}", e)),
                    ..original.clone()
                });
            }
        }
    }

    fn download(&self, index: usize) -> Task<Message> {
        let Some(entry) = self.entries.get(index) else {
            return Task::none();
        };
        let PreviewState::Compressed(compressed) = &entry.state else {
            return Task::none();
        };

        Task::perform(
            self.downloader
                .download_one(&self.blobs, compressed.url, &entry.file.name),
            Message::Downloaded,
        )
    }

    fn show_download_all(&self) -> bool {
        !self.results.is_empty()
    }

    fn panel(&self) -> Panel<'_> {
        Panel {
            entries: &self.entries,
            quality: self.quality,
            show_download_all: self.show_download_all(),
            download_dir: self.downloader.dir(),
            thumbnail_width: self.intake.preview_size() as f32,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(UiMessage),
    /// `None` when the picker was cancelled
    FilesPicked(Option<Vec<PathBuf>>),
    FileHovered,
    FileDropped(PathBuf),
    FilesHoveredLeft,
    PreviewLoaded {
        generation: Generation,
        index: usize,
        result: Result<LoadedImage, AppError>,
    },
    CompressionFinished {
        generation: Generation,
        index: usize,
        result: Result<CompressedImage, AppError>,
    },
    DownloadDirPicked(Option<PathBuf>),
    Downloaded(Result<PathBuf, AppError>),
    BatchDownloaded(Vec<Result<PathBuf, AppError>>),
}

pub fn update(app: &mut CompressorApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => match ui_msg {
            UiMessage::PickFiles => {
                let intake = app.intake.clone();
                return Task::perform(
                    async move { intake.pick_files().await },
                    Message::FilesPicked,
                );
            }
            UiMessage::QualityChanged(value) => {
                app.quality = Quality::new(value);
            }
            UiMessage::Compress(index) => return app.compress(index),
            UiMessage::Download(index) => return app.download(index),
            UiMessage::DownloadAll => {
                log::info!("Downloading {} result(s)", app.results.len());
                return Task::perform(
                    app.downloader.download_all(&app.blobs, &app.results),
                    Message::BatchDownloaded,
                );
            }
            UiMessage::ChooseDownloadDir => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Choose download folder")
                            .pick_folder()
                            .await
                            .map(|handle| handle.path().to_path_buf())
                    },
                    Message::DownloadDirPicked,
                );
            }
        },
        Message::FilesPicked(paths) => match paths {
            Some(paths) => {
                app.drop_gesture = DropGesture::Idle;
                return app.on_selection_changed(SelectionIntake::describe(paths));
            }
            None => {
                app.view.status_message = "Selection cancelled".to_string();
            }
        },
        Message::FileHovered => {
            app.drop_gesture = DropGesture::Hovering;
            app.view.drop_hovered = true;
        }
        Message::FileDropped(path) => {
            app.view.drop_hovered = false;
            let file = SelectedFile::from_path(path);
            if app.drop_gesture == DropGesture::Dropping {
                return app.append_file(file);
            }
            app.drop_gesture = DropGesture::Dropping;
            return app.on_selection_changed(vec![file]);
        }
        Message::FilesHoveredLeft => {
            app.drop_gesture = DropGesture::Idle;
            app.view.drop_hovered = false;
        }
        Message::PreviewLoaded {
            generation,
            index,
            result,
        } => {
            if !app.is_stale(generation) {
                app.on_preview_loaded(index, result);
            }
        }
        Message::CompressionFinished {
            generation,
            index,
            result,
        } => {
            if !app.is_stale(generation) {
                app.on_compression_finished(index, result);
            }
        }
        Message::DownloadDirPicked(dir) => {
            if let Some(dir) = dir {
                app.view.status_message = format!("Downloads will be saved to {}", dir.display());
                app.downloader.set_dir(dir);
            }
        }
        Message::Downloaded(result) => {
            app.view.status_message = match result {
                Ok(path) => format!("Saved: {}", path.display()),
                Err(e) => {
                    log::warn!("Download failed: {}", e);
                    format!("Download failed: {}", e)
                }
            };
        }
        Message::BatchDownloaded(results) => {
            let failed = results.iter().filter(|r| r.is_err()).count();
            for e in results.iter().filter_map(|r| r.as_ref().err()) {
                log::warn!("Download failed: {}", e);
            }
            app.view.status_message = if failed == 0 {
                format!("Saved {} file(s) to {}", results.len(), app.downloader.dir().display())
            } else {
                format!("Saved {} file(s), {} failed", results.len() - failed, failed)
            };
        }
    }
    Task::none()
}

pub fn view(app: &CompressorApp) -> iced::Element<'_, Message> {
    app.view.view(app.panel()).map(Message::UiMessage)
}

/// Window file-drop events feed the same selection path as the picker.
pub fn subscription(_app: &CompressorApp) -> Subscription<Message> {
    event::listen_with(|event, _status, _window| match event {
        Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered),
        Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FilesHoveredLeft),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::intake::decode_preview;
    use crate::application::intake::tests::png_bytes;
    use bytes::Bytes;
    use std::path::Path;

    fn test_app(download_dir: &Path) -> CompressorApp {
        CompressorApp::new(AppConfig {
            download_dir: Some(download_dir.to_path_buf()),
            ..Default::default()
        })
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, png_bytes(width, height)).unwrap();
        path
    }

    fn loaded(path: &Path) -> Result<LoadedImage, AppError> {
        decode_preview(Bytes::from(std::fs::read(path).unwrap()), 64)
    }

    fn select(app: &mut CompressorApp, paths: Vec<PathBuf>) -> Generation {
        let _ = update(app, Message::FilesPicked(Some(paths)));
        app.generation
    }

    fn compressed(app: &CompressorApp, index: usize) -> Result<CompressedImage, AppError> {
        let PreviewState::Compressing { quality, .. } = &app.entries[index].state else {
            panic!("entry {} is not compressing", index);
        };
        let source = app.entries[index].source.clone().unwrap();
        Compressor::new(800).compress_bytes(&source, *quality)
    }

    fn finish_compression(app: &mut CompressorApp, generation: Generation, index: usize) {
        let result = compressed(app, index);
        let _ = update(
            app,
            Message::CompressionFinished {
                generation,
                index,
                result,
            },
        );
    }

    #[test]
    fn test_selection_creates_entries_in_order_despite_load_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write_png(dir.path(), "one.png", 40, 30),
            write_png(dir.path(), "two.png", 50, 30),
            write_png(dir.path(), "three.png", 60, 30),
        ];
        let mut app = test_app(dir.path());
        let generation = select(&mut app, paths.clone());

        for index in [2, 0, 1] {
            let _ = update(
                &mut app,
                Message::PreviewLoaded {
                    generation,
                    index,
                    result: loaded(&paths[index]),
                },
            );
        }

        let names: Vec<_> = app.entries.iter().map(|e| e.file.name.as_str()).collect();
        assert_eq!(names, ["one.png", "two.png", "three.png"]);
        let widths: Vec<_> = app
            .entries
            .iter()
            .map(|e| match &e.state {
                PreviewState::Original(original) => original.width,
                other => panic!("unexpected state {:?}", other),
            })
            .collect();
        assert_eq!(widths, [40, 50, 60]);
    }

    #[test]
    fn test_size_comes_from_the_read_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 30, 20);
        let expected = std::fs::metadata(&path).unwrap().len();
        let mut app = test_app(dir.path());
        let generation = select(&mut app, vec![path.clone()]);
        assert_eq!(app.entries[0].file.size, 0);

        let _ = update(
            &mut app,
            Message::PreviewLoaded {
                generation,
                index: 0,
                result: loaded(&path),
            },
        );
        assert_eq!(app.entries[0].file.size, expected);
    }

    #[test]
    fn test_thumbnail_width_follows_preview_size() {
        let dir = tempfile::tempdir().unwrap();
        let app = CompressorApp::new(AppConfig {
            download_dir: Some(dir.path().to_path_buf()),
            preview_size: 180,
            ..Default::default()
        });
        assert_eq!(app.panel().thumbnail_width, 180.0);
        assert_eq!(test_app(dir.path()).panel().thumbnail_width, 240.0);
    }

    #[test]
    fn test_each_entry_compresses_at_most_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 30, 30);
        let mut app = test_app(dir.path());
        let generation = select(&mut app, vec![path.clone()]);
        let _ = update(
            &mut app,
            Message::PreviewLoaded {
                generation,
                index: 0,
                result: loaded(&path),
            },
        );

        let _ = update(&mut app, Message::UiMessage(UiMessage::QualityChanged(0.4)));
        let _ = update(&mut app, Message::UiMessage(UiMessage::Compress(0)));
        let _ = update(&mut app, Message::UiMessage(UiMessage::QualityChanged(0.9)));
        let _ = update(&mut app, Message::UiMessage(UiMessage::Compress(0)));

        // The second trigger did not restart the pending compression
        let PreviewState::Compressing { quality, .. } = &app.entries[0].state else {
            panic!("entry should be compressing");
        };
        assert_eq!(quality.value(), 0.4);

        finish_compression(&mut app, generation, 0);
        assert_eq!(app.results.len(), 1);

        let _ = update(&mut app, Message::UiMessage(UiMessage::Compress(0)));
        assert!(matches!(app.entries[0].state, PreviewState::Compressed(_)));

        // A late duplicate completion finds nothing to finish
        let duplicate = Compressor::new(800)
            .compress_bytes(&png_bytes(30, 30), Quality::new(0.4));
        let _ = update(
            &mut app,
            Message::CompressionFinished {
                generation,
                index: 0,
                result: duplicate,
            },
        );
        assert_eq!(app.results.len(), 1);
        assert_eq!(app.blobs.live_count(), 1);
    }

    #[test]
    fn test_failed_decode_only_affects_its_entry() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "good.png", 20, 20);
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"corrupt").unwrap();
        let mut app = test_app(dir.path());
        let generation = select(&mut app, vec![bad.clone(), good.clone()]);

        let _ = update(
            &mut app,
            Message::PreviewLoaded {
                generation,
                index: 0,
                result: loaded(&bad),
            },
        );
        let _ = update(
            &mut app,
            Message::PreviewLoaded {
                generation,
                index: 1,
                result: loaded(&good),
            },
        );

        assert!(matches!(app.entries[0].state, PreviewState::Failed(_)));
        assert!(matches!(app.entries[1].state, PreviewState::Original(_)));

        // A failed entry cannot be compressed
        let _ = update(&mut app, Message::UiMessage(UiMessage::Compress(0)));
        assert!(matches!(app.entries[0].state, PreviewState::Failed(_)));
    }

    #[test]
    fn test_compress_out_of_order_leaves_pending_entry_alone() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write_png(dir.path(), "first.png", 1600, 1200),
            write_png(dir.path(), "second.png", 1600, 1200),
        ];
        let mut app = test_app(dir.path());
        let generation = select(&mut app, paths.clone());

        let _ = update(
            &mut app,
            Message::PreviewLoaded {
                generation,
                index: 1,
                result: loaded(&paths[1]),
            },
        );
        let _ = update(&mut app, Message::UiMessage(UiMessage::Compress(1)));
        finish_compression(&mut app, generation, 1);

        assert!(matches!(app.entries[0].state, PreviewState::Loading));
        let PreviewState::Compressed(done) = &app.entries[1].state else {
            panic!("second entry should be compressed");
        };
        assert_eq!((done.width, done.height), (800, 600));
        assert_eq!(app.results.len(), 1);
        assert_eq!(app.results.iter().next().unwrap().filename, "second.png");
        assert!(app.show_download_all());
    }

    #[test]
    fn test_quality_is_read_at_each_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write_png(dir.path(), "a.png", 30, 30),
            write_png(dir.path(), "b.png", 30, 30),
        ];
        let mut app = test_app(dir.path());
        let generation = select(&mut app, paths.clone());
        for index in 0..2 {
            let _ = update(
                &mut app,
                Message::PreviewLoaded {
                    generation,
                    index,
                    result: loaded(&paths[index]),
                },
            );
        }

        let _ = update(&mut app, Message::UiMessage(UiMessage::QualityChanged(0.3)));
        let _ = update(&mut app, Message::UiMessage(UiMessage::Compress(0)));
        let _ = update(&mut app, Message::UiMessage(UiMessage::QualityChanged(0.9)));
        let _ = update(&mut app, Message::UiMessage(UiMessage::Compress(1)));

        let qualities: Vec<_> = app
            .entries
            .iter()
            .map(|e| match &e.state {
                PreviewState::Compressing { quality, .. } => quality.value(),
                other => panic!("unexpected state {:?}", other),
            })
            .collect();
        assert_eq!(qualities, [0.3_f32, 0.9]);
    }

    #[test]
    fn test_results_follow_completion_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write_png(dir.path(), "a.png", 30, 30),
            write_png(dir.path(), "b.png", 30, 30),
        ];
        let mut app = test_app(dir.path());
        let generation = select(&mut app, paths.clone());
        for index in 0..2 {
            let _ = update(
                &mut app,
                Message::PreviewLoaded {
                    generation,
                    index,
                    result: loaded(&paths[index]),
                },
            );
            let _ = update(&mut app, Message::UiMessage(UiMessage::Compress(index)));
        }
        assert!(app.results.is_empty());
        assert!(!app.show_download_all());

        finish_compression(&mut app, generation, 1);
        assert_eq!(app.results.len(), 1);
        finish_compression(&mut app, generation, 0);

        let names: Vec<_> = app.results.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, ["b.png", "a.png"]);
        assert_eq!(app.blobs.live_count(), 2);
    }

    #[test]
    fn test_new_selection_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_png(dir.path(), "first.png", 30, 30);
        let mut app = test_app(dir.path());
        let generation = select(&mut app, vec![first.clone()]);
        let _ = update(
            &mut app,
            Message::PreviewLoaded {
                generation,
                index: 0,
                result: loaded(&first),
            },
        );
        let _ = update(&mut app, Message::UiMessage(UiMessage::Compress(0)));
        finish_compression(&mut app, generation, 0);
        assert!(app.show_download_all());

        let second = select(&mut app, vec![]);
        assert!(second > generation);
        assert!(app.entries.is_empty());
        assert!(app.results.is_empty());
        assert_eq!(app.blobs.live_count(), 0);
        assert!(!app.show_download_all());
    }

    #[test]
    fn test_stale_results_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let old = write_png(dir.path(), "old.png", 30, 30);
        let new = write_png(dir.path(), "new.png", 40, 40);
        let mut app = test_app(dir.path());
        let old_generation = select(&mut app, vec![old.clone()]);
        let _ = update(
            &mut app,
            Message::PreviewLoaded {
                generation: old_generation,
                index: 0,
                result: loaded(&old),
            },
        );
        let _ = update(&mut app, Message::UiMessage(UiMessage::Compress(0)));
        let pending = compressed(&app, 0);

        let new_generation = select(&mut app, vec![new.clone()]);
        let _ = update(
            &mut app,
            Message::PreviewLoaded {
                generation: old_generation,
                index: 0,
                result: loaded(&old),
            },
        );
        let _ = update(
            &mut app,
            Message::CompressionFinished {
                generation: old_generation,
                index: 0,
                result: pending,
            },
        );

        assert!(matches!(app.entries[0].state, PreviewState::Loading));
        assert!(app.results.is_empty());
        assert_eq!(app.blobs.live_count(), 0);

        let _ = update(
            &mut app,
            Message::PreviewLoaded {
                generation: new_generation,
                index: 0,
                result: loaded(&new),
            },
        );
        let PreviewState::Original(original) = &app.entries[0].state else {
            panic!("new entry should be loaded");
        };
        assert_eq!(original.width, 40);
    }

    #[test]
    fn test_failed_compression_restores_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 30, 30);
        let mut app = test_app(dir.path());
        let generation = select(&mut app, vec![path.clone()]);
        let _ = update(
            &mut app,
            Message::PreviewLoaded {
                generation,
                index: 0,
                result: loaded(&path),
            },
        );
        let _ = update(&mut app, Message::UiMessage(UiMessage::Compress(0)));
        let _ = update(
            &mut app,
            Message::CompressionFinished {
                generation,
                index: 0,
                result: Err(AppError::Encode("boom".to_string())),
            },
        );

        let PreviewState::Original(original) = &app.entries[0].state else {
            panic!("entry should be back to original");
        };
        assert!(original.note.as_deref().unwrap().contains("boom"));
        assert!(app.results.is_empty());
        assert!(!app.show_download_all());
    }

    #[test]
    fn test_drop_gesture_builds_one_selection() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 10, 10);
        let b = write_png(dir.path(), "b.png", 10, 10);
        let c = write_png(dir.path(), "c.png", 10, 10);
        let mut app = test_app(dir.path());

        let _ = update(&mut app, Message::FileHovered);
        assert!(app.view.drop_hovered);
        let _ = update(&mut app, Message::FileDropped(a));
        let generation = app.generation;
        let _ = update(&mut app, Message::FileDropped(b));
        assert!(!app.view.drop_hovered);
        assert_eq!(app.generation, generation);
        let names: Vec<_> = app.entries.iter().map(|e| e.file.name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.png"]);

        let _ = update(&mut app, Message::FileHovered);
        let _ = update(&mut app, Message::FileDropped(c));
        assert!(app.generation > generation);
        assert_eq!(app.entries.len(), 1);
        assert_eq!(app.entries[0].file.name, "c.png");
    }

    #[test]
    fn test_cancelled_picker_keeps_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 10, 10);
        let mut app = test_app(dir.path());
        let generation = select(&mut app, vec![path]);

        let _ = update(&mut app, Message::FilesPicked(None));
        assert_eq!(app.generation, generation);
        assert_eq!(app.entries.len(), 1);
    }

    #[tokio::test]
    async fn test_download_all_saves_every_result() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let paths = vec![
            write_png(dir.path(), "a.png", 30, 30),
            write_png(dir.path(), "b.jpg", 30, 30),
            write_png(dir.path(), "c.png", 30, 30),
        ];
        let mut app = test_app(out.path());
        let generation = select(&mut app, paths.clone());
        for index in 0..3 {
            let _ = update(
                &mut app,
                Message::PreviewLoaded {
                    generation,
                    index,
                    result: loaded(&paths[index]),
                },
            );
        }
        for index in [2, 0] {
            let _ = update(&mut app, Message::UiMessage(UiMessage::Compress(index)));
            finish_compression(&mut app, generation, index);
        }

        let saved = app.downloader.download_all(&app.blobs, &app.results).await;
        let saved: Vec<_> = saved.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            saved,
            [out.path().join("compressed_c.png"), out.path().join("compressed_a.png")]
        );
        for path in &saved {
            let bytes = std::fs::read(path).unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
        }
        assert!(!out.path().join("compressed_b.jpg").exists());
    }
}
