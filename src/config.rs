use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic};
use serde::Deserialize;
use tracing::debug;

use crate::{
    cli::Args,
    outside::{DownloadOptions, FetchOptions},
    types::{AudioFormat, AudioQuality},
};

/// Default values that can be read from a TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileDefaults {
    pub output_path: Option<PathBuf>,
    pub audio_format: Option<AudioFormat>,
    pub audio_quality: Option<AudioQuality>,
    pub strip_patterns: Vec<String>,
    pub strip_meta: Option<bool>,
    pub keep_ids: Option<bool>,
    pub remove_chapters_source_file: Option<bool>,
}

impl FileDefaults {
    pub fn read(path: &Path) -> miette::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not read config file {}", path.display()))?;

        settings
            .try_deserialize()
            .into_diagnostic()
            .wrap_err("Invalid config file")
    }
}

/// Everything a run needs to know, fixed at process start
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub urls: Vec<String>,
    pub artist: String,
    pub album: Option<String>,
    /// Directory in which the album directory is created
    pub output_path: PathBuf,
    pub playlist_items: Option<String>,
    pub track_numbers: String,
    pub strip_patterns: Vec<String>,
    /// Also strip the artist and album names from titles
    pub strip_meta: bool,
    pub chapters_file: Option<PathBuf>,
    pub remove_chapters_source_file: bool,
    /// Keep the source id in the file names
    pub keep_ids: bool,
    pub audio_format: AudioFormat,
    pub audio_quality: Option<AudioQuality>,
}

impl RunConfig {
    /// Merge the command-line arguments over the file defaults
    pub fn new(args: Args, defaults: FileDefaults) -> Self {
        let audio_format = args
            .audio_format
            .or(defaults.audio_format)
            .unwrap_or_default();
        let audio_quality = args.audio_quality.or(defaults.audio_quality).or(
            match audio_format {
                AudioFormat::Best => None,
                _ => Some(AudioQuality::DEFAULT),
            },
        );

        let mut strip_patterns = defaults.strip_patterns;
        strip_patterns.extend(args.strip_patterns);

        Self {
            urls: args.urls,
            artist: args.artist,
            album: args.album.filter(|album| !album.is_empty()),
            output_path: args
                .output_path
                .or(defaults.output_path)
                .unwrap_or_else(|| PathBuf::from(".")),
            playlist_items: args.playlist_items.filter(|items| !items.trim().is_empty()),
            track_numbers: args.track_numbers,
            strip_patterns,
            strip_meta: !args.no_strip_meta && defaults.strip_meta.unwrap_or(true),
            chapters_file: args.chapters_file,
            remove_chapters_source_file: args.remove_chapters_source_file
                || defaults.remove_chapters_source_file.unwrap_or(false),
            keep_ids: !args.no_keep_id && defaults.keep_ids.unwrap_or(true),
            audio_format,
            audio_quality,
        }
    }

    /// Load the optional config file and merge it with the arguments
    pub fn from_args(args: Args) -> miette::Result<Self> {
        let defaults = match &args.config {
            Some(path) => {
                debug!("Reading defaults from {}", path.display());
                FileDefaults::read(path)?
            }
            None => FileDefaults::default(),
        };

        Ok(Self::new(args, defaults))
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            ignore_errors: true,
            playlist_items: self.playlist_items.clone(),
        }
    }

    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            format: self.audio_format,
            quality: self.audio_quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use indoc::indoc;

    use super::*;

    fn args(cmdline: &[&str]) -> Args {
        Args::try_parse_from(["albumize"].iter().chain(cmdline)).unwrap()
    }

    #[test]
    fn command_line_defaults() {
        let config = RunConfig::new(args(&["URL", "-a", "Artist"]), FileDefaults::default());

        assert_eq!(config.urls, vec!["URL"]);
        assert_eq!(config.album, None);
        assert_eq!(config.output_path, PathBuf::from("."));
        assert_eq!(config.audio_format, AudioFormat::Mp3);
        assert_eq!(config.audio_quality, Some(AudioQuality::Bitrate(160)));
        assert!(config.strip_meta);
        assert!(config.keep_ids);
        assert!(!config.remove_chapters_source_file);
    }

    #[test]
    fn best_format_has_no_default_quality() {
        let config = RunConfig::new(
            args(&["URL", "-a", "A", "-f", "best"]),
            FileDefaults::default(),
        );
        assert_eq!(config.audio_quality, None);
    }

    #[test]
    fn command_line_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("albumize.toml");
        std::fs::write(
            &path,
            indoc! {r#"
                output_path = "/music"
                audio_format = "opus"
                audio_quality = "5"
                strip_patterns = ["\\(official\\)"]
                strip_meta = false
            "#},
        )
        .unwrap();

        let defaults = FileDefaults::read(&path).unwrap();
        let config = RunConfig::new(
            args(&["U1", "U2", "-a", "A", "-f", "flac", "-s", "lyrics", "--no-keep-id"]),
            defaults,
        );

        assert_eq!(config.urls.len(), 2);
        assert_eq!(config.output_path, PathBuf::from("/music"));
        assert_eq!(config.audio_format, AudioFormat::Flac);
        assert_eq!(config.audio_quality, Some(AudioQuality::Vbr(5)));
        assert_eq!(config.strip_patterns, vec!["\\(official\\)", "lyrics"]);
        assert!(!config.strip_meta);
        assert!(!config.keep_ids);
    }
}
