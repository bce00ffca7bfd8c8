use std::{
    cell::RefCell,
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    outside::AudioCutter,
    result::{Error, Result},
    strip::clean_filename,
    types::ResolvedChapter,
};

/// Keeps one correctly named file per track in the album directory.
///
/// A file claimed by a track of the current run is never handed to another one.
#[derive(Debug)]
pub struct Reconciler<'a> {
    directory: PathBuf,
    cutter: &'a dyn AudioCutter,
    claimed: RefCell<HashSet<PathBuf>>,
}

impl<'a> Reconciler<'a> {
    pub fn new(directory: PathBuf, cutter: &'a dyn AudioCutter) -> Self {
        Self {
            directory,
            cutter,
            claimed: RefCell::default(),
        }
    }

    /// Mark a file as belonging to a track of this run
    pub fn claim(&self, path: &Path) {
        self.claimed.borrow_mut().insert(path.to_path_buf());
    }

    fn is_claimed(&self, path: &Path) -> bool {
        self.claimed.borrow().contains(path)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Unclaimed files of the directory (sorted) whose name, without extension,
    /// satisfies `f`. Files without extension are never matched.
    fn files_matching<F: Fn(&str) -> bool>(&self, f: F) -> Result<Vec<PathBuf>> {
        let mut files = vec![];
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none() || self.is_claimed(&path) {
                continue;
            }
            if path.file_stem().and_then(|s| s.to_str()).is_some_and(&f) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Files whose name ends with the source id, like `<anything><id>.<ext>`
    pub fn locate_by_source_id(&self, id: &str) -> Result<Vec<PathBuf>> {
        if id.is_empty() {
            return Ok(vec![]);
        }
        self.files_matching(|stem| stem.ends_with(id))
    }

    /// Files whose name ends with the title, an exact `<title>.<ext>` first
    pub fn locate_by_title(&self, title: &str) -> Result<Vec<PathBuf>> {
        let title = clean_filename(title);
        if title.is_empty() {
            return Ok(vec![]);
        }
        let mut files = self.files_matching(|stem| stem.ends_with(title.as_str()))?;
        files.sort_by_key(|path| path.file_stem().and_then(|s| s.to_str()) != Some(title.as_str()));
        Ok(files)
    }

    /// Files of a track: by source id, else by exact title
    pub fn locate_track(&self, id: &str, title: &str) -> Result<Vec<PathBuf>> {
        let files = self.locate_by_source_id(id)?;
        if !files.is_empty() {
            return Ok(files);
        }

        let title = clean_filename(title);
        self.files_matching(|stem| stem == title)
    }

    /// Output path of a chapter, sharing the extension of the source file
    pub fn chapter_path(&self, chapter: &ResolvedChapter, source: &Path) -> PathBuf {
        self.sibling_name(source, &chapter.title)
    }

    /// Cut the chapter out of the source file, unless its output was already on disk
    /// before this run. The output is claimed by the chapter.
    ///
    /// The clip is first written to a temporary file of the directory and only
    /// moved to its final name once complete.
    pub fn segment(&self, source: &Path, chapter: &ResolvedChapter) -> Result<PathBuf> {
        let output = self.chapter_path(chapter, source);
        if self.is_claimed(&output) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("'{}' belongs to another track", output.display()),
            )));
        }
        if output.exists() {
            info!(
                "'{}' already exists, not cutting it again",
                output.display()
            );
            self.claim(&output);
            return Ok(output);
        }

        let suffix = source
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let tmp = tempfile::Builder::new()
            .prefix(".albumize-")
            .suffix(&suffix)
            .tempfile_in(&self.directory)?;

        info!("Cutting '{}' ({})", chapter.title, chapter.range);
        self.cutter.cut(source, &chapter.range, tmp.path())?;

        tmp.persist(&output).map_err(|err| Error::Io(err.error))?;
        debug!("Chapter written to '{}'", output.display());
        self.claim(&output);

        Ok(output)
    }

    /// Rename a file to `<title>-<id>.<ext>`, or `<title>.<ext>` when `keep_id` is false.
    /// A `<title>.<ext>` name already taken falls back to `<title>-<id>.<ext>`.
    ///
    /// Renaming is best-effort: on failure the file keeps its name. The returned
    /// path is claimed by the track.
    pub fn rename_track(&self, file: &Path, title: &str, id: &str, keep_id: bool) -> PathBuf {
        let title = clean_filename(title);
        let with_id = self.sibling_name(file, &format!("{title}-{id}"));
        let targets = if keep_id {
            vec![with_id]
        } else {
            vec![self.sibling_name(file, &title), with_id]
        };

        let mut renamed = file.to_path_buf();
        for target in targets {
            if target == file {
                break;
            }
            // Failing to rename only costs the nicer file name
            match rename_no_clobber(file, &target) {
                Ok(()) => {
                    renamed = target;
                    break;
                }
                Err(err) => warn!(
                    "Could not rename '{}' to '{}': {err}",
                    file.display(),
                    target.display()
                ),
            }
        }

        self.claim(&renamed);
        renamed
    }

    /// Path in the directory named `stem`, with the extension of `file`
    fn sibling_name(&self, file: &Path, stem: &str) -> PathBuf {
        let mut name = stem.to_owned();
        if let Some(ext) = file.extension() {
            name.push('.');
            name.push_str(&ext.to_string_lossy());
        }
        self.directory.join(name)
    }

    /// Remove the source file of the chapters, best-effort
    pub fn remove_source(&self, source: &Path) {
        // A leftover source file is harmless
        if let Err(err) = fs::remove_file(source) {
            warn!("Could not remove '{}': {err}", source.display());
        }
    }
}

fn rename_no_clobber(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination already exists",
        ));
    }
    fs::rename(from, to)
}
