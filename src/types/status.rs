use std::fmt::Display;

use super::item::watch_url;

/// Outcome of one track of the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub index: u32,
    pub success: bool,
    pub source_id: Option<String>,
    pub title: String,
}

impl Status {
    pub fn ok(index: u32, source_id: Option<&str>, title: &str) -> Self {
        Self::new(index, true, source_id, title)
    }

    pub fn failed(index: u32, source_id: Option<&str>, title: &str) -> Self {
        Self::new(index, false, source_id, title)
    }

    fn new(index: u32, success: bool, source_id: Option<&str>, title: &str) -> Self {
        Self {
            index,
            success,
            source_id: source_id.map(String::from),
            title: title.to_owned(),
        }
    }
}

/// Human-readable summary of a run, one line per track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub header: Option<String>,
    pub rows: Vec<Status>,
    /// Show the canonical URL of every row's source
    pub with_urls: bool,
}

impl Report {
    pub fn succeeded(&self) -> usize {
        self.rows.iter().filter(|s| s.success).count()
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(header) = &self.header {
            writeln!(f, "{header}")?;
            writeln!(f)?;
        }

        let lines: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let mark = if row.success { "✔" } else { "✘" };
                let mut cols = vec![format!("{:>5}", row.index), mark.to_owned()];
                if self.with_urls {
                    cols.push(row.source_id.as_deref().map(watch_url).unwrap_or_default());
                }
                cols.push(row.title.clone());
                cols.join("    ")
            })
            .collect();

        write!(f, "{}", lines.join("\n"))
    }
}
