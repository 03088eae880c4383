mod app;
mod application;
mod config;
mod domain;
mod ui;
mod utils;

use iced::{window, Size};

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application(app::CompressorApp::default, app::update, app::view)
        .title("Image Compressor")
        .subscription(app::subscription)
        .window(window::Settings {
            size: Size::new(960.0, 720.0),
            min_size: Some(Size::new(640.0, 480.0)),
            ..Default::default()
        })
        .run()
}
