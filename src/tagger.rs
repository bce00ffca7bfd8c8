use std::path::Path;

use lofty::{config::WriteOptions, error::LoftyError, prelude::*, probe::Probe, tag::Tag};
use tracing::{debug, warn};

/// The fields written to every output track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub track: u32,
    pub total: u32,
}

impl TrackTags {
    /// Track number as `index/total`
    pub fn track_number(&self) -> String {
        format!("{}/{}", self.track, self.total)
    }
}

/// Interface for writing tags into audio files
pub trait TagWriter {
    /// Write all the fields to the file, in a single save.
    ///
    /// Return `false` if the file could not be tagged. Failures are logged
    /// and never interrupt the caller.
    fn set_tags(&self, path: &Path, tags: &TrackTags) -> bool;
}

/// Tag writer supporting every container [lofty] can handle
#[derive(Debug, Default)]
pub struct LoftyTagger;

impl LoftyTagger {
    fn write(path: &Path, tags: &TrackTags) -> Result<(), LoftyError> {
        let mut tagged_file = Probe::open(path)?.read()?;

        let tag_type = tagged_file.primary_tag_type();
        if tagged_file.tag_mut(tag_type).is_none() {
            debug!("No {tag_type:?} tag in {}, creating one", path.display());
            tagged_file.insert_tag(Tag::new(tag_type));
        }

        if let Some(tag) = tagged_file.tag_mut(tag_type) {
            tag.set_title(tags.title.clone());
            tag.set_artist(tags.artist.clone());
            tag.set_album(tags.album.clone());
            tag.set_track(tags.track);
            tag.set_track_total(tags.total);
        }

        tagged_file.save_to_path(path, WriteOptions::default())
    }
}

impl TagWriter for LoftyTagger {
    fn set_tags(&self, path: &Path, tags: &TrackTags) -> bool {
        match Self::write(path, tags) {
            Ok(()) => {
                debug!(
                    "Tagged {} as {} ({})",
                    path.display(),
                    tags.title,
                    tags.track_number()
                );
                true
            }
            Err(err) => {
                warn!(
                    "Tried to set metadata on {} but couldn't, skipping: {err}",
                    path.display()
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> TrackTags {
        TrackTags {
            title: "Song".into(),
            artist: "Artist".into(),
            album: "Album".into(),
            track: 2,
            total: 9,
        }
    }

    #[test]
    fn track_number_format() {
        assert_eq!(tags().track_number(), "2/9");
    }

    /// Smallest valid PCM WAV file: mono, 8 kHz, 16 bits, 0.1 s of silence
    fn write_wav(path: &Path) {
        let samples = [0u8; 1600];
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + samples.len() as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVEfmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&8000u32.to_le_bytes());
        wav.extend_from_slice(&16000u32.to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(samples.len() as u32).to_le_bytes());
        wav.extend_from_slice(&samples);
        std::fs::write(path, wav).unwrap();
    }

    #[test]
    fn every_field_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.wav");
        write_wav(&path);

        assert!(LoftyTagger.set_tags(&path, &tags()));

        let tagged_file = lofty::read_from_path(&path).unwrap();
        let tag = tagged_file.primary_tag().unwrap();
        assert_eq!(tag.title().as_deref(), Some("Song"));
        assert_eq!(tag.artist().as_deref(), Some("Artist"));
        assert_eq!(tag.album().as_deref(), Some("Album"));
        assert_eq!(tag.track(), Some(2));
        assert_eq!(tag.track_total(), Some(9));
    }

    #[test]
    fn tagging_again_replaces_the_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.wav");
        write_wav(&path);

        assert!(LoftyTagger.set_tags(&path, &tags()));
        let retagged = TrackTags {
            title: "Other".into(),
            track: 3,
            ..tags()
        };
        assert!(LoftyTagger.set_tags(&path, &retagged));

        let tagged_file = lofty::read_from_path(&path).unwrap();
        let tag = tagged_file.primary_tag().unwrap();
        assert_eq!(tag.title().as_deref(), Some("Other"));
        assert_eq!(tag.track(), Some(3));
        assert_eq!(tag.track_total(), Some(9));
    }

    #[test]
    fn missing_file_is_not_tagged() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!LoftyTagger.set_tags(&dir.path().join("nothing.mp3"), &tags()));
    }

    #[test]
    fn unknown_container_is_not_tagged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "definitely not audio").unwrap();

        assert!(!LoftyTagger.set_tags(&path, &tags()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "definitely not audio");
    }
}
