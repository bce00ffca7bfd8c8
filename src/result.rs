use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("couldn't get info for {0}")]
    NoInfo(String),

    #[error("invalid track numbers `{spec}`: {reason}")]
    #[diagnostic(help("use comma-separated numbers and ranges, e.g. \"1,3-5,7-9\""))]
    InvalidTrackSpec { spec: String, reason: String },

    #[error("you passed {tracks} track number(s) but there are {items} item(s) to number")]
    TrackCountMismatch { tracks: usize, items: usize },

    #[error("chapter {index} has no {missing}, and chapter {neighbor} has no {neighbor_missing}")]
    UnresolvableChapterBoundary {
        index: usize,
        missing: &'static str,
        neighbor: usize,
        neighbor_missing: &'static str,
    },

    #[error("invalid chapter time `{0}`")]
    #[diagnostic(help("use seconds (`90`, `90.5`) or a clock time (`1:30`, `01:01:30`)"))]
    InvalidChapterTime(String),

    #[error("no chapters file at {}", .0.display())]
    ChaptersFileMissing(PathBuf),

    #[error("failed to read {} as JSON or as CSV", .0.display())]
    #[diagnostic(help("expected a JSON array of {{title, start_time, end_time}} or CSV rows `title,start,end`"))]
    MalformedChaptersFile(PathBuf),

    #[error("if you pass single-song URL(s), you must also specify an album")]
    #[diagnostic(help("add --album <ALBUM>"))]
    AlbumRequired,

    #[error("invalid strip pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{0} isn't installed or could not be run")]
    MissingTool(&'static str),

    #[error("unavailable stream")]
    UnavailableStream,

    #[error("no source file for {0}")]
    SourceFileMissing(String),

    #[error("{program} did run but was not successful: {message}")]
    CommandFailed {
        program: &'static str,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
