use crate::result::{Error, Result};

/// More track numbers than any album could use
const MAX_TRACKS: usize = 10_000;

/// Parse a compact track number list such as "1,3-5,7-9" into explicit numbers.
///
/// An empty (or blank) list means positional numbering and gives an empty vector.
pub fn parse(spec: &str) -> Result<Vec<u32>> {
    let compact: String = spec.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Ok(vec![]);
    }

    let invalid = |reason: String| Error::InvalidTrackSpec {
        spec: spec.to_owned(),
        reason,
    };
    let number = |s: &str| {
        s.parse::<u32>()
            .map_err(|_| invalid(format!("`{s}` is not a track number")))
    };

    let mut tracks = Vec::new();
    for part in compact.split(',') {
        match part.split_once('-') {
            None if tracks.len() == MAX_TRACKS => {
                return Err(invalid(format!("more than {MAX_TRACKS} track numbers")))
            }
            None => tracks.push(number(part)?),
            Some((first, last)) => {
                let (first, last) = (number(first)?, number(last)?);
                if first > last {
                    return Err(invalid(format!("range `{part}` is decreasing")));
                }
                if (last - first) as usize >= MAX_TRACKS - tracks.len() {
                    return Err(invalid(format!("more than {MAX_TRACKS} track numbers")));
                }
                tracks.extend(first..=last);
            }
        }
    }

    Ok(tracks)
}

/// Verify that explicit track numbers, if any, cover exactly `items` items
pub fn check_count(tracks: &[u32], items: usize) -> Result<()> {
    if tracks.is_empty() || tracks.len() == items {
        Ok(())
    } else {
        Err(Error::TrackCountMismatch {
            tracks: tracks.len(),
            items,
        })
    }
}

/// Track number of the item at `position` (0-based)
pub fn track_at(tracks: &[u32], position: usize) -> u32 {
    tracks
        .get(position)
        .copied()
        .unwrap_or(position as u32 + 1)
}
