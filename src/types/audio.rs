use std::{fmt::Display, str::FromStr};

use clap::ValueEnum;
use serde::Deserialize;

/// Audio format the downloaded streams are extracted to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Aac,
    Flac,
    #[default]
    Mp3,
    M4a,
    Opus,
    Vorbis,
    Wav,
    /// Keep the best available audio, whatever its format
    Best,
}

impl AudioFormat {
    /// Name of the format as understood by `yt-dlp --audio-format`
    pub fn as_str(self) -> &'static str {
        match self {
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Opus => "opus",
            AudioFormat::Vorbis => "vorbis",
            AudioFormat::Wav => "wav",
            AudioFormat::Best => "best",
        }
    }
}

/// Either a VBR quality level (0 is better, 9 is worse) or a bitrate in kbit/s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioQuality {
    Vbr(u8),
    Bitrate(u16),
}

impl AudioQuality {
    /// Quality used when none is given and the format is not [`AudioFormat::Best`]
    pub const DEFAULT: AudioQuality = AudioQuality::Bitrate(160);
}

impl FromStr for AudioQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(num_prefix) = s.to_lowercase().strip_suffix('k') {
            return num_prefix
                .parse()
                .map(Self::Bitrate)
                .map_err(|err| format!("invalid bitrate `{s}`: {err}"));
        }

        match s.parse::<u16>() {
            Ok(n) if n <= 9 => Ok(Self::Vbr(n as u8)),
            Ok(n) => Ok(Self::Bitrate(n)),
            Err(_) => Err(format!(
                "`{s}` is neither a quality between 0 and 9 nor a bitrate like 128K"
            )),
        }
    }
}

impl Display for AudioQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioQuality::Vbr(n) => write!(f, "{n}"),
            AudioQuality::Bitrate(n) => write!(f, "{n}K"),
        }
    }
}

impl<'de> Deserialize<'de> for AudioQuality {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
