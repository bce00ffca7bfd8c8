use std::{collections::HashSet, fmt::Display, fs, path::Path};

use serde::Deserialize;
use tracing::{debug, warn};

use super::timestamp::{TimeRange, TimeValue, UNBOUNDED_END};
use crate::{
    result::{Error, Result},
    strip::{clean_filename, Stripper},
};

/// A chapter as declared by the video or by a chapters file.
/// Any of its fields may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Chapter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_time: Option<TimeValue>,
    #[serde(default)]
    pub end_time: Option<TimeValue>,
}

impl Chapter {
    fn start(&self) -> Result<Option<f64>> {
        self.start_time.as_ref().map_or(Ok(None), TimeValue::seconds)
    }

    fn end(&self) -> Result<Option<f64>> {
        self.end_time.as_ref().map_or(Ok(None), TimeValue::seconds)
    }
}

/// A chapter with a cleaned title and a complete time range
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChapter {
    pub title: String,
    pub range: TimeRange,
}

impl Display for ResolvedChapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.title, self.range)
    }
}

/// Resolve every chapter boundary in a single pass.
///
/// A missing start borrows the previous chapter's declared end, a missing end
/// borrows the next chapter's declared start. The neighbor's *declared* value is
/// used, never its resolved one. The first start defaults to 0 and the last end
/// to [`UNBOUNDED_END`].
pub fn resolve_chapters(chapters: &[Chapter], stripper: &Stripper) -> Result<Vec<ResolvedChapter>> {
    let last = chapters.len().saturating_sub(1);

    let mut resolved = chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| {
            let start = match chapter.start()? {
                Some(start) => start,
                None if i == 0 => 0.0,
                None => chapters[i - 1].end()?.ok_or(Error::UnresolvableChapterBoundary {
                    index: i + 1,
                    missing: "start_time",
                    neighbor: i,
                    neighbor_missing: "end_time",
                })?,
            };

            let end = match chapter.end()? {
                Some(end) => end,
                None if i == last => UNBOUNDED_END,
                None => chapters[i + 1]
                    .start()?
                    .ok_or(Error::UnresolvableChapterBoundary {
                        index: i + 1,
                        missing: "end_time",
                        neighbor: i + 2,
                        neighbor_missing: "start_time",
                    })?,
            };

            let raw_title = match chapter.title.as_deref() {
                Some(title) if !title.is_empty() => title.to_owned(),
                _ => (i + 1).to_string(),
            };
            let title = clean_filename(&stripper.strip_or_keep(&raw_title));

            Ok(ResolvedChapter {
                title,
                range: TimeRange { start, end },
            })
        })
        .collect::<Result<Vec<_>>>()?;

    disambiguate_titles(&mut resolved);
    Ok(resolved)
}

/// Give every chapter its own title, the second "Intro" becoming "Intro (2)".
/// Titles differing only by case collide too.
fn disambiguate_titles(chapters: &mut [ResolvedChapter]) {
    let mut taken = HashSet::new();
    for chapter in chapters {
        let mut title = chapter.title.clone();
        let mut n = 1;
        while !taken.insert(title.to_lowercase()) {
            n += 1;
            title = format!("{} ({n})", chapter.title);
        }
        chapter.title = title;
    }
}

/// Read a chapters file, first as a JSON array then as CSV rows `title,start[,end]`
pub fn read_chapters_file(path: &Path) -> Result<Vec<Chapter>> {
    let content = fs::read_to_string(path)?;

    match serde_json::from_str::<Vec<Chapter>>(&content) {
        Ok(chapters) => {
            debug!("Read {} chapters from JSON file", chapters.len());
            Ok(chapters)
        }
        Err(err) => {
            warn!(
                "Failed to read {} as JSON ({err}), trying as CSV",
                path.display()
            );
            parse_csv(&content).ok_or_else(|| Error::MalformedChaptersFile(path.to_path_buf()))
        }
    }
}

/// Parse CSV chapter rows. Return `None` if no row could be read.
fn parse_csv(content: &str) -> Option<Vec<Chapter>> {
    let mut rows = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(split_csv_line)
        .peekable();

    // Skip a header row
    if let Some(first) = rows.peek() {
        if first
            .get(1)
            .is_some_and(|col| matches!(col.trim().to_lowercase().as_str(), "start" | "start_time"))
        {
            rows.next();
        }
    }

    let chapters = rows
        .map(|fields| {
            if fields.len() < 2 {
                return None;
            }
            let field = |i: usize| fields.get(i).map(|s| TimeValue::Text(s.trim().to_owned()));
            Some(Chapter {
                title: Some(fields[0].clone()),
                start_time: field(1),
                end_time: field(2),
            })
        })
        .collect::<Option<Vec<_>>>()?;

    if chapters.is_empty() {
        None
    } else {
        Some(chapters)
    }
}

/// Split one CSV line, honoring double-quoted fields and `""` escapes
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = vec![];
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);

    fields
}
