use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    config::RunConfig,
    outside::{AudioCutter, FetchOptions, MediaFetcher},
    prompt::Operator,
    reconciler::Reconciler,
    result::{Error, Result},
    strip::{clean_filename, Stripper},
    tagger::{TagWriter, TrackTags},
    track_numbers::{self, check_count, track_at},
    types::{
        read_chapters_file, resolve_chapters, watch_url, ItemInfo, PlaylistEntry, Report,
        ResolvedChapter, Status,
    },
};

/// How the fetched URL(s) must be turned into tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// One or more videos, each one a track
    Singles,
    /// One video split along its chapters
    Chaptered,
    /// Every entry of a playlist is a track
    Playlist,
}

impl Mode {
    fn classify(info: &ItemInfo, has_chapters_file: bool) -> Self {
        if info.is_playlist() {
            Mode::Playlist
        } else if info.has_chapters() || has_chapters_file {
            Mode::Chaptered
        } else {
            Mode::Singles
        }
    }
}

/// The validated work of a run, known before touching the disk
enum Plan {
    Singles,
    Playlist(Vec<Option<PlaylistEntry>>),
    Chaptered {
        url: String,
        id: String,
        chapters: Vec<ResolvedChapter>,
    },
}

/// How the run ended when it did not fail
#[derive(Debug)]
pub enum Outcome {
    Completed(Report),
    /// The operator chose not to go on
    Declined,
}

/// State of one run, owned by the orchestrator
struct RunContext<'a> {
    reconciler: Reconciler<'a>,
    album: String,
    tracks: Vec<u32>,
    /// Whether missing files may be downloaded
    download: bool,
    stripper: Stripper,
    statuses: Vec<Status>,
}

pub struct Orchestrator<'a> {
    config: &'a RunConfig,
    fetcher: &'a dyn MediaFetcher,
    cutter: &'a dyn AudioCutter,
    tagger: &'a dyn TagWriter,
    operator: &'a mut dyn Operator,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a RunConfig,
        fetcher: &'a dyn MediaFetcher,
        cutter: &'a dyn AudioCutter,
        tagger: &'a dyn TagWriter,
        operator: &'a mut dyn Operator,
    ) -> Self {
        Self {
            config,
            fetcher,
            cutter,
            tagger,
            operator,
        }
    }

    /// Run the whole workflow.
    ///
    /// Every error concerning the entire run is returned before anything is
    /// downloaded or written. Errors concerning a single track only show in the report.
    pub fn run(&mut self) -> Result<Outcome> {
        let config = self.config;
        let tracks = track_numbers::parse(&config.track_numbers)?;

        if let Some(path) = &config.chapters_file {
            if !path.is_file() {
                return Err(Error::ChaptersFileMissing(path.clone()));
            }
        }

        let info = match config.urls.as_slice() {
            [url] => {
                info!("Getting info of {url}");
                let info = self
                    .fetcher
                    .fetch_info(url, &config.fetch_options())?
                    .ok_or_else(|| Error::NoInfo(url.clone()))?;
                Some(info)
            }
            urls => {
                check_count(&tracks, urls.len())?;
                None
            }
        };

        let mode = info.as_ref().map_or(Mode::Singles, |info| {
            Mode::classify(info, config.chapters_file.is_some())
        });
        debug!("Selected mode: {mode:?}");

        let album = match (&config.album, &info) {
            (Some(album), _) => album.clone(),
            (None, Some(info)) if mode != Mode::Singles => info.title.clone(),
            _ => return Err(Error::AlbumRequired),
        };

        let stripper = Stripper::new(
            &config.strip_patterns,
            config
                .strip_meta
                .then_some((config.artist.as_str(), album.as_str())),
        )?;

        let plan = match (mode, info) {
            (Mode::Playlist, Some(info)) => {
                info!(
                    "extractor: {} :: downloading playlist",
                    info.extractor.as_deref().unwrap_or("?")
                );
                let entries = info.entries.unwrap_or_default();
                check_count(&tracks, entries.len())?;
                Plan::Playlist(entries)
            }
            (Mode::Chaptered, Some(info)) => {
                let chapters = match &config.chapters_file {
                    Some(path) => read_chapters_file(path)?,
                    None => info.chapters.unwrap_or_default(),
                };
                let chapters = resolve_chapters(&chapters, &stripper)?;
                check_count(&tracks, chapters.len())?;
                Plan::Chaptered {
                    url: config.urls[0].clone(),
                    id: info.id,
                    chapters,
                }
            }
            _ => {
                check_count(&tracks, config.urls.len())?;
                Plan::Singles
            }
        };

        let Some((directory, download)) = self.resolve_directory(&album, &plan)? else {
            return Ok(Outcome::Declined);
        };

        let mut ctx = RunContext {
            reconciler: Reconciler::new(directory, self.cutter),
            album,
            tracks,
            download,
            stripper,
            statuses: vec![],
        };
        let report = match plan {
            Plan::Singles => {
                self.run_singles(&mut ctx);
                Report {
                    header: None,
                    rows: ctx.statuses,
                    with_urls: true,
                }
            }
            Plan::Playlist(entries) => {
                self.run_playlist(&mut ctx, &entries);
                Report {
                    header: None,
                    rows: ctx.statuses,
                    with_urls: true,
                }
            }
            Plan::Chaptered { url, id, chapters } => {
                self.run_chaptered(&mut ctx, &url, &id, &chapters)?;
                Report {
                    header: Some(format!(
                        "playlist built from single video with chapters: {}",
                        watch_url(&id)
                    )),
                    rows: ctx.statuses,
                    with_urls: false,
                }
            }
        };

        info!(
            "{} of {} track(s) completed",
            report.succeeded(),
            report.rows.len()
        );
        Ok(Outcome::Completed(report))
    }

    /// Create the album directory, or ask what to do if it already exists.
    ///
    /// Return the directory and whether missing files may be downloaded,
    /// or `None` if the operator declined to go on.
    fn resolve_directory(&mut self, album: &str, plan: &Plan) -> Result<Option<(PathBuf, bool)>> {
        let config = self.config;
        fs::create_dir_all(&config.output_path)?;
        let directory = config.output_path.join(clean_filename(album));
        let is_singles = matches!(plan, Plan::Singles);

        let (created, download) = match fs::create_dir(&directory) {
            Ok(()) => (true, true),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                println!(
                    "\nthe album directory {} already exists",
                    directory.display()
                );
                let choice = if is_singles {
                    self.operator.choose("(d)ownload again, (e)xit: ", &['d', 'e'])?
                } else {
                    self.operator.choose(
                        "(d)ownload again, (s)kip download but continue, (e)xit: ",
                        &['d', 's', 'e'],
                    )?
                };
                match choice {
                    'd' => (false, true),
                    's' => (false, false),
                    _ => {
                        println!("\nexiting...");
                        return Ok(None);
                    }
                }
            }
            Err(err) => return Err(err.into()),
        };

        if is_singles && config.urls.len() == 1 {
            println!("\nthis video is not a playlist, and it has no chapters");
            let choice = self
                .operator
                .choose("are you sure you want to proceed? (y)es, (n)o: ", &['y', 'n'])?;
            if choice != 'y' {
                if created {
                    remove_empty_dir(&directory);
                }
                println!("\nexiting...");
                return Ok(None);
            }
        }

        Ok(Some((directory, download)))
    }

    fn run_singles(&self, ctx: &mut RunContext) {
        let urls = &self.config.urls;
        let total = urls.len() as u32;

        for (i, url) in urls.iter().enumerate() {
            let index = track_at(&ctx.tracks, i);

            let Some(info) = self.fetch_entry(url) else {
                ctx.statuses.push(Status::failed(index, None, url));
                continue;
            };

            let title = ctx.stripper.strip_or_keep(&info.title);
            let tags = self.track_tags(ctx, &title, index, total);
            let success = self.process_item(ctx, url, &info, &tags);
            ctx.statuses.push(Status {
                index,
                success,
                source_id: Some(info.id),
                title,
            });
        }
    }

    fn run_playlist(&self, ctx: &mut RunContext, entries: &[Option<PlaylistEntry>]) {
        let total = entries.len() as u32;

        for (i, entry) in entries.iter().enumerate() {
            let index = track_at(&ctx.tracks, i);

            let Some(entry) = entry else {
                warn!("Playlist entry {} could not be extracted", i + 1);
                ctx.statuses.push(Status::failed(index, None, ""));
                continue;
            };

            let Some(info) = self.fetch_entry(entry.locator()) else {
                let title = entry.title.as_deref().unwrap_or_default();
                ctx.statuses
                    .push(Status::failed(index, Some(&entry.id), title));
                continue;
            };

            let title = ctx.stripper.strip_or_keep(&info.title);
            let tags = self.track_tags(ctx, &title, index, total);
            let success = self.process_item(ctx, entry.locator(), &info, &tags);
            ctx.statuses.push(Status {
                index,
                success,
                source_id: Some(info.id),
                title,
            });
        }
    }

    fn run_chaptered(
        &self,
        ctx: &mut RunContext,
        url: &str,
        id: &str,
        chapters: &[ResolvedChapter],
    ) -> Result<()> {
        let total = chapters.len() as u32;

        let mut source = ctx.reconciler.locate_by_source_id(id)?.into_iter().next();
        if source.is_none() && ctx.download {
            let mut already_cut = true;
            for chapter in chapters {
                already_cut &= !ctx.reconciler.locate_track("", &chapter.title)?.is_empty();
            }

            if already_cut {
                info!("Every chapter is already on disk, not downloading {url} again");
            } else {
                info!("Downloading {url}");
                if let Err(err) =
                    self.fetcher
                        .download(url, ctx.reconciler.directory(), &self.config.download_options())
                {
                    warn!("Could not download {url}: {err}");
                }
                source = ctx.reconciler.locate_by_source_id(id)?.into_iter().next();
            }
        }

        match &source {
            Some(source) => debug!("Source file: {}", source.display()),
            None => warn!(
                "{}, tagging already cut files only",
                Error::SourceFileMissing(url.to_owned())
            ),
        }

        for (i, chapter) in chapters.iter().enumerate() {
            let index = track_at(&ctx.tracks, i);

            let file = match &source {
                Some(source) => match ctx.reconciler.segment(source, chapter) {
                    Ok(file) => Some(file),
                    Err(err) => {
                        warn!("Could not cut '{}': {err}", chapter.title);
                        None
                    }
                },
                None => {
                    let found = ctx
                        .reconciler
                        .locate_by_title(&chapter.title)?
                        .into_iter()
                        .next();
                    if let Some(file) = &found {
                        ctx.reconciler.claim(file);
                    }
                    found
                }
            };

            let success = match file {
                Some(file) => {
                    let tags = self.track_tags(ctx, &chapter.title, index, total);
                    self.tagger.set_tags(&file, &tags)
                }
                None => {
                    warn!("{}", Error::SourceFileMissing(chapter.title.clone()));
                    false
                }
            };
            ctx.statuses.push(Status {
                index,
                success,
                source_id: None,
                title: chapter.title.clone(),
            });
        }

        if self.config.remove_chapters_source_file {
            if let Some(source) = &source {
                ctx.reconciler.remove_source(source);
            }
        }

        Ok(())
    }

    /// Get the info of a single item, logging why it could not be obtained
    fn fetch_entry(&self, url: &str) -> Option<ItemInfo> {
        let opts = FetchOptions {
            ignore_errors: true,
            playlist_items: None,
        };

        match self.fetcher.fetch_info(url, &opts) {
            Ok(Some(info)) => Some(info),
            Ok(None) => {
                warn!("Couldn't get info for {url}");
                None
            }
            Err(err) => {
                warn!("Couldn't get info for {url}: {err}");
                None
            }
        }
    }

    /// Download the item if it is not on disk yet, then tag and rename its files.
    /// Return whether every file of the item got tagged.
    fn process_item(
        &self,
        ctx: &RunContext,
        url: &str,
        info: &ItemInfo,
        tags: &TrackTags,
    ) -> bool {
        match self.try_process_item(ctx, url, info, tags) {
            Ok(tagged) => tagged,
            Err(err) => {
                warn!("'{}': {err}", info.title);
                false
            }
        }
    }

    fn try_process_item(
        &self,
        ctx: &RunContext,
        url: &str,
        info: &ItemInfo,
        tags: &TrackTags,
    ) -> Result<bool> {
        let mut files = ctx.reconciler.locate_track(&info.id, &tags.title)?;

        if !files.is_empty() {
            info!(
                "Found matching file for '{}', not downloading it again. \
                Delete it or the album directory to process it again",
                info.title
            );
        } else if ctx.download {
            info!("Downloading '{}'", info.title);
            if let Err(err) =
                self.fetcher
                    .download(url, ctx.reconciler.directory(), &self.config.download_options())
            {
                warn!("Could not download {url}: {err}");
            }
            files = ctx.reconciler.locate_track(&info.id, &tags.title)?;
        }

        if files.is_empty() {
            return Err(Error::SourceFileMissing(url.to_owned()));
        }

        let mut tagged = true;
        for file in files {
            tagged &= self.tagger.set_tags(&file, tags);
            ctx.reconciler.rename_track(&file, &tags.title, &info.id, self.config.keep_ids);
        }

        Ok(tagged)
    }

    fn track_tags(&self, ctx: &RunContext, title: &str, index: u32, total: u32) -> TrackTags {
        TrackTags {
            title: title.to_owned(),
            artist: self.config.artist.clone(),
            album: ctx.album.clone(),
            track: index,
            total,
        }
    }
}

/// Remove the album directory created by this run, if nothing was put in it
fn remove_empty_dir(directory: &Path) {
    // A non-empty directory is left as is
    if let Err(err) = fs::remove_dir(directory) {
        warn!("Could not remove '{}': {err}", directory.display());
    }
}
