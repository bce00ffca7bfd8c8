mod audio;
mod chapter;
mod item;
mod status;
mod timestamp;

pub use audio::{AudioFormat, AudioQuality};
pub use chapter::{read_chapters_file, resolve_chapters, Chapter, ResolvedChapter};
pub use item::{watch_url, ItemInfo, PlaylistEntry};
pub use status::{Report, Status};
pub use timestamp::{TimeRange, TimeValue, UNBOUNDED_END};
