use std::path::Path;

use iced::{
    widget::{button, column, container, row, scrollable, slider, text, Column, Image, Space},
    Alignment, Element, Length, Theme,
};

use crate::domain::{PreviewEntry, PreviewState, Quality};
use crate::utils::format_kb;

/// View-only state; everything the user acts on lives in the app.
pub struct CompressorView {
    pub status_message: String,
    pub drop_hovered: bool,
}

impl Default for CompressorView {
    fn default() -> Self {
        Self {
            status_message: "Select images or drop them onto the window".to_string(),
            drop_hovered: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum UiMessage {
    PickFiles,
    QualityChanged(f32),
    Compress(usize),
    Download(usize),
    DownloadAll,
    ChooseDownloadDir,
}

/// Snapshot of app state the view renders.
pub struct Panel<'a> {
    pub entries: &'a [PreviewEntry],
    pub quality: Quality,
    pub show_download_all: bool,
    pub download_dir: &'a Path,
    /// Matches the size thumbnails are decoded at
    pub thumbnail_width: f32,
}

impl CompressorView {
    pub fn view<'a>(&'a self, panel: Panel<'a>) -> Element<'a, UiMessage> {
        let toolbar = row![
            button("Select images")
                .on_press(UiMessage::PickFiles)
                .padding([10, 20]),
            text("Quality:").size(16),
            slider(0.0..=1.0, panel.quality.value(), UiMessage::QualityChanged)
                .step(0.01_f32)
                .width(Length::Fixed(220.0)),
            text(format!("{:.2}", panel.quality.value())).size(16),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let drop_style: fn(&Theme) -> container::Style = if self.drop_hovered {
            container::bordered_box
        } else {
            container::rounded_box
        };
        let drop_label = if self.drop_hovered {
            "Release to load these images"
        } else {
            "Drag and drop images here"
        };
        let drop_zone = container(text(drop_label).size(16))
            .padding(24)
            .width(Length::Fill)
            .center_x(Length::Fill)
            .style(drop_style);

        let download_row = row![
            text(format!("Saving to: {}", panel.download_dir.display())).size(14),
            button("Change...")
                .on_press(UiMessage::ChooseDownloadDir)
                .padding([4, 12]),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let mut content = column![
            text("Image Compressor").size(32),
            toolbar,
            drop_zone,
            download_row,
        ]
        .spacing(14);

        if panel.show_download_all {
            content = content.push(
                button("Download all")
                    .on_press(UiMessage::DownloadAll)
                    .padding([10, 20]),
            );
        }

        let previews: Element<'a, UiMessage> = if panel.entries.is_empty() {
            text("No images selected").size(14).into()
        } else {
            scrollable(
                Column::with_children(
                    panel
                        .entries
                        .iter()
                        .enumerate()
                        .map(|(index, entry)| entry_card(index, entry, panel.thumbnail_width)),
                )
                .spacing(10),
            )
            .height(Length::Fill)
            .into()
        };

        content
            .push(text(&self.status_message).size(14))
            .push(previews)
            .padding(20)
            .into()
    }
}

fn entry_card(index: usize, entry: &PreviewEntry, thumbnail_width: f32) -> Element<'_, UiMessage> {
    let title = text(&entry.file.name).size(16);

    let body: Element<'_, UiMessage> = match &entry.state {
        PreviewState::Loading => text("Loading...").size(14).into(),
        PreviewState::Failed(reason) => text(format!("Could not open this file: {}", reason))
            .size(14)
            .style(text::danger)
            .into(),
        PreviewState::Original(original) => {
            let mut details = column![
                text(format!("Original size: {}", format_kb(entry.file.size))).size(14),
                text(format!("{} x {}", original.width, original.height)).size(12),
            ]
            .spacing(6);
            if let Some(note) = &original.note {
                details = details.push(text(note).size(12).style(text::danger));
            }
            details = details.push(
                button("Compress")
                    .on_press(UiMessage::Compress(index))
                    .padding([6, 16]),
            );

            row![
                Image::new(original.thumbnail.clone()).width(Length::Fixed(thumbnail_width)),
                details,
            ]
            .spacing(16)
            .into()
        }
        PreviewState::Compressing { original, quality } => row![
            Image::new(original.thumbnail.clone()).width(Length::Fixed(thumbnail_width)),
            column![
                text(format!("Original size: {}", format_kb(entry.file.size))).size(14),
                text(format!("Compressing at quality {:.2}...", quality.value())).size(14),
                button("Compress").padding([6, 16]),
            ]
            .spacing(6),
        ]
        .spacing(16)
        .into(),
        PreviewState::Compressed(compressed) => row![
            Image::new(compressed.image.clone()).width(Length::Fixed(thumbnail_width)),
            column![
                text(format!("Compressed size: {}", format_kb(compressed.size))).size(14),
                text(format!("{} x {}", compressed.width, compressed.height)).size(12),
                button("Download")
                    .on_press(UiMessage::Download(index))
                    .padding([6, 16]),
            ]
            .spacing(6),
        ]
        .spacing(16)
        .into(),
    };

    container(column![title, Space::new().height(Length::Fixed(6.0)), body])
        .padding(12)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}
