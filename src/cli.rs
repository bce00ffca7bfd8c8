use std::path::PathBuf;

use clap::Parser;

use crate::types::{AudioFormat, AudioQuality};

macro_rules! arg_env {
    ($v:literal) => {
        concat!("ALBUMIZE_", $v)
    };
}

/// Download a playlist, a video with chapters, or a list of single videos
/// as a labeled audio album.
///
/// Every track is extracted to its own audio file, tagged with the artist,
/// the album, its title and its track number.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// URL of a playlist or of a video with chapters, or a list of single-song URLs
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Artist(s) of the album
    #[arg(short, long, env = arg_env!("ARTIST"))]
    pub artist: String,

    /// Album name, defaults to the playlist or video title
    #[arg(long, env = arg_env!("ALBUM"))]
    pub album: Option<String>,

    /// Playlist entries to download, e.g. "1,3-5,7-9,11,12"
    #[arg(short, long)]
    pub playlist_items: Option<String>,

    /// Track numbers to assign, in the same syntax as the playlist entries.
    /// Must list exactly as many numbers as there are tracks
    #[arg(short, long, default_value = "")]
    pub track_numbers: String,

    /// Regular expressions removed from the titles (case-insensitive)
    #[arg(short, long, num_args = 1..)]
    pub strip_patterns: Vec<String>,

    /// Do not remove the artist and album names from the titles
    #[arg(long)]
    pub no_strip_meta: bool,

    /// Audio format of the tracks
    #[arg(short = 'f', long, value_enum, env = arg_env!("AUDIO_FORMAT"))]
    pub audio_format: Option<AudioFormat>,

    /// Audio quality: between 0 (better) and 9 (worse) for VBR,
    /// or a specific bitrate like 128K [default: 160]
    #[arg(short = 'q', long, env = arg_env!("AUDIO_QUALITY"))]
    pub audio_quality: Option<AudioQuality>,

    /// JSON or CSV file describing the chapters of the video
    #[arg(long)]
    pub chapters_file: Option<PathBuf>,

    /// For a video with chapters, remove the source file once split
    #[arg(short, long)]
    pub remove_chapters_source_file: bool,

    /// Name the files `<title>.<ext>` instead of `<title>-<id>.<ext>`
    #[arg(long)]
    pub no_keep_id: bool,

    /// Directory in which the album directory is created
    #[arg(short, long, env = arg_env!("OUTPUT_PATH"))]
    pub output_path: Option<PathBuf>,

    /// TOML file with default values for the options
    #[arg(long, env = arg_env!("CONFIG"))]
    pub config: Option<PathBuf>,

    /// Maximum level of the logs
    #[arg(long, default_value_t = tracing::Level::INFO, env = arg_env!("LOG_LEVEL"))]
    pub log_level: tracing::Level,
}
