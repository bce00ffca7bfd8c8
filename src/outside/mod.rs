mod command;
mod ffmpeg;
mod ytdl;

pub use ffmpeg::{AudioCutter, Ffmpeg};
pub use ytdl::{DownloadOptions, FetchOptions, MediaFetcher, Ytdl};
