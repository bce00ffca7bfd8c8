use regex::{Regex, RegexBuilder};

use crate::result::{Error, Result};

/// Optional dash surrounded by optional spaces
macro_rules! opt_dash {
    () => {
        r#" *-? *"#
    };
}
/// Mandatory dash surrounded by optional spaces
macro_rules! dash {
    () => {
        r#" *- *"#
    };
}

/// Remove the artist name from either side of a title.
/// Example: "Artist - Song" or "Song - Artist"
fn artist_pattern(artist: &str) -> String {
    concat!(opt_dash!(), "{}", opt_dash!()).replace("{}", &regex::escape(artist))
}

/// Remove the album name when it is separated from the title by a dash.
/// Example: "Album - Song" or "Song - Album"
fn album_patterns(album: &str) -> [String; 2] {
    let album = regex::escape(album);
    [
        concat!(dash!(), "{}", " *").replace("{}", &album),
        concat!(" *", "{}", dash!()).replace("{}", &album),
    ]
}

/// Case-insensitive regular expressions removed from raw titles, in order.
#[derive(Debug, Default)]
pub struct Stripper {
    patterns: Vec<Regex>,
}

impl Stripper {
    /// Compile the user patterns, appending the artist and album patterns
    /// when `meta` is given.
    pub fn new(user_patterns: &[String], meta: Option<(&str, &str)>) -> Result<Self> {
        let mut sources = user_patterns.to_vec();
        if let Some((artist, album)) = meta {
            if !artist.is_empty() {
                sources.push(artist_pattern(artist));
            }
            if !album.is_empty() {
                sources.extend(album_patterns(album));
            }
        }

        let patterns = sources
            .into_iter()
            .map(|pattern| {
                RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| Error::InvalidPattern { pattern, source })
            })
            .collect::<Result<_>>()?;

        Ok(Self { patterns })
    }

    /// Apply every pattern to the progressively stripped text
    pub fn strip(&self, text: &str) -> String {
        self.patterns
            .iter()
            .fold(text.to_owned(), |acc, re| re.replace_all(&acc, "").into_owned())
    }

    /// Like [`Stripper::strip`] but keep the original text if nothing would remain
    pub fn strip_or_keep(&self, text: &str) -> String {
        let stripped = self.strip(text);
        if stripped.is_empty() {
            text.to_owned()
        } else {
            stripped
        }
    }
}

/// Remove the characters that cannot appear in a file name
pub fn clean_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_patterns_is_identity() {
        let stripper = Stripper::new(&[], None).unwrap();
        assert_eq!(stripper.strip("Some Title (Official)"), "Some Title (Official)");
    }

    #[test]
    fn patterns_apply_in_order_case_insensitively() {
        let stripper =
            Stripper::new(&patterns(&[r" *\(official video\)", r"\s+$"]), None).unwrap();
        assert_eq!(stripper.strip("Song (OFFICIAL Video)  "), "Song");
    }

    #[test]
    fn stripping_is_stable_once_matches_are_gone() {
        let stripper = Stripper::new(&patterns(&[r"\[hd\]", r"lyrics"]), None).unwrap();
        let once = stripper.strip("Song [HD] Lyrics");
        assert_eq!(stripper.strip(&once), once);
    }

    #[test]
    fn meta_patterns_remove_artist_and_album() {
        let stripper = Stripper::new(&[], Some(("The Band", "Best Of"))).unwrap();
        assert_eq!(stripper.strip("The Band - Song One"), "Song One");
        assert_eq!(stripper.strip("Song Two - the band"), "Song Two");
        assert_eq!(stripper.strip("Best Of - Song Three"), "Song Three");
        assert_eq!(stripper.strip("Song Four - Best Of"), "Song Four");
    }

    #[test]
    fn meta_names_are_literal() {
        let stripper = Stripper::new(&[], Some(("A.B (C)", ""))).unwrap();
        assert_eq!(stripper.strip("A.B (C) - Song"), "Song");
        assert_eq!(stripper.strip("AxB (C) - Song"), "AxB (C) - Song");
    }

    #[test]
    fn strip_or_keep_falls_back_to_original() {
        let stripper = Stripper::new(&[], Some(("Artist", ""))).unwrap();
        assert_eq!(stripper.strip_or_keep("Artist"), "Artist");
    }

    #[test]
    fn malformed_pattern_is_an_error() {
        let err = Stripper::new(&patterns(&["(unclosed"]), None).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn clean_filename_removes_separators() {
        assert_eq!(clean_filename("AC/DC \\ Live\0"), "ACDC  Live");
    }
}
