use serde::Deserialize;

use super::Chapter;

/// Information about a fetched URL, as produced by the media fetch service.
///
/// Either a single video (possibly with chapters) or a playlist of entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemInfo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "_type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub extractor: Option<String>,
    #[serde(default)]
    pub chapters: Option<Vec<Chapter>>,
    #[serde(default)]
    pub entries: Option<Vec<Option<PlaylistEntry>>>,
}

impl ItemInfo {
    pub fn is_playlist(&self) -> bool {
        self.kind.as_deref() == Some("playlist")
    }

    pub fn has_chapters(&self) -> bool {
        self.chapters.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// One playlist member. Entries that could not be extracted at all are `None`
/// in [`ItemInfo::entries`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistEntry {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl PlaylistEntry {
    /// What to hand to the fetch service to get this entry
    pub fn locator(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.id)
    }
}

/// Canonical watch URL of a video
pub fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}
