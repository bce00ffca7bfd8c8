use std::{ffi::OsStr, fmt::Debug, path::Path};

use super::command::{assert_success_command, check_program, FFMPEG, FFXXX_DEFAULT_ARGS};
use crate::{result::Result, types::TimeRange};

pub trait AudioCutter: Debug {
    /// Copy the stream data between the range boundaries from the input file
    /// to the output file, without re-encoding.
    ///
    /// If the range is unbounded, the clip continues until the end of the stream.
    fn cut(&self, input: &Path, range: &TimeRange, output: &Path) -> Result<()>;
}

/// Interface for the [ffmpeg](https://ffmpeg.org) program
#[derive(Debug)]
pub struct Ffmpeg;

impl Ffmpeg {
    /// Verify that the `ffmpeg` binary is reachable
    pub fn new() -> Result<Self> {
        check_program(FFMPEG, "-version")?;

        Ok(Self)
    }
}

impl AudioCutter for Ffmpeg {
    fn cut(&self, input: &Path, range: &TimeRange, output: &Path) -> Result<()> {
        assert_success_command(FFMPEG, |cmd| {
            let cmd = cmd
                .args(FFXXX_DEFAULT_ARGS)
                .arg("-y")
                .args([OsStr::new("-i"), input.as_os_str()])
                .args(["-ss", range.start.to_string().as_str()]);

            if !range.is_unbounded() {
                cmd.args(["-to", range.end.to_string().as_str()]);
            }

            cmd.args(["-c:a", "copy"]).arg("--").arg(output)
        })
    }
}
