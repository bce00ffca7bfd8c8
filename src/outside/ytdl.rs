use std::{
    ffi::OsStr,
    path::Path,
    process::{Command, Output},
};

use tracing::{debug, warn};

use super::command::{check_program, run_command, Capture, YT_DL, YT_DLP};
use crate::{
    result::{Error, Result},
    types::{AudioFormat, AudioQuality, ItemInfo},
};

/// Output file name template, relative to the target directory.
/// Files must end with the source id so that they can be found again.
const OUTPUT_TEMPLATE: &str = "%(title)s-%(id)s.%(ext)s";

/// Options of an info extraction
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Keep going when some playlist entries cannot be extracted
    pub ignore_errors: bool,
    /// Playlist entries to consider, e.g. "1,3-5"
    pub playlist_items: Option<String>,
}

/// Options of a download
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub format: AudioFormat,
    pub quality: Option<AudioQuality>,
}

/// Interface for retrieving media information and audio streams
pub trait MediaFetcher {
    /// Get the information about an URL, without downloading any media.
    ///
    /// Return `Ok(None)` if the service could not give anything for it
    /// (deleted, private, age-restricted video...).
    fn fetch_info(&self, url: &str, opts: &FetchOptions) -> Result<Option<ItemInfo>>;

    /// Download the audio stream of the URL into `directory`.
    /// The resulting file name contains the source id right before its extension.
    fn download(&self, url: &str, directory: &Path, opts: &DownloadOptions) -> Result<()>;
}

/// Interface for the [yt-dlp](https://github.com/yt-dlp/yt-dlp) program,
/// or its ancestor [youtube-dl](https://github.com/ytdl-org/youtube-dl)
#[derive(Debug)]
pub struct Ytdl {
    program: &'static str,
}

impl Ytdl {
    /// Verify that the `yt-dlp` or `youtube-dl` binaries are reachable
    pub fn new() -> Result<Self> {
        if check_program(YT_DLP, "--version").is_ok() {
            Ok(Self { program: YT_DLP })
        } else if check_program(YT_DL, "--version").is_ok() {
            Ok(Self { program: YT_DL })
        } else {
            Err(Error::MissingTool(YT_DLP))
        }
    }

    /// Run the command and check if it failed with saying the stream is unavailable.
    /// In that case, return [`Error::UnavailableStream`].
    ///
    /// In other cases, return the output handle.
    fn run_check_availability<F>(&self, f: F, capture: Capture) -> Result<Output>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let res = run_command(self.program, f, capture | Capture::STDERR)?;

        let stderr = String::from_utf8_lossy(&res.stderr);
        let is_unavailable = stderr
            .lines()
            .any(|line| line.starts_with("ERROR:") && line.to_lowercase().contains("unavailable"));
        if is_unavailable && res.stdout.is_empty() {
            Err(Error::UnavailableStream)
        } else {
            Ok(res)
        }
    }
}

impl MediaFetcher for Ytdl {
    fn fetch_info(&self, url: &str, opts: &FetchOptions) -> Result<Option<ItemInfo>> {
        let res = self.run_check_availability(
            |cmd| {
                cmd.arg("-J").arg("--flat-playlist");
                if opts.ignore_errors {
                    cmd.arg("--ignore-errors");
                }
                if let Some(items) = &opts.playlist_items {
                    cmd.args(["--playlist-items", items.as_str()]);
                }
                cmd.arg("--").arg(url)
            },
            Capture::STDOUT,
        );

        let res = match res {
            Ok(res) => res,
            Err(Error::UnavailableStream) => {
                warn!("{url} is unavailable");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let output = String::from_utf8_lossy(&res.stdout);
        let output = output.trim();
        if output.is_empty() || output == "null" {
            debug!("No info returned for {url} (status: {})", res.status);
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(output)?))
    }

    fn download(&self, url: &str, directory: &Path, opts: &DownloadOptions) -> Result<()> {
        let template = directory.join(OUTPUT_TEMPLATE);
        let res = self.run_check_availability(
            |cmd| {
                cmd.arg("-q")
                    .arg("--no-progress")
                    .arg("--ignore-errors")
                    .args([OsStr::new("-o"), template.as_os_str()])
                    .arg("-x")
                    .args(["--audio-format", opts.format.as_str()]);
                if let Some(quality) = opts.quality {
                    cmd.args(["--audio-quality", quality.to_string().as_str()]);
                }
                cmd.arg("--").arg(url)
            },
            Capture::empty(),
        )?;

        if res.status.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                program: self.program,
                message: String::from_utf8_lossy(&res.stderr).trim().to_owned(),
            })
        }
    }
}
