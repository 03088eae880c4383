pub mod compressor;
pub mod downloader;
pub mod intake;

pub use compressor::{CompressedImage, Compressor};
pub use downloader::Downloader;
pub use intake::{LoadedImage, SelectionIntake};
