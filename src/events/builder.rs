// src/events/builder.rs
use crate::config::{ArchiveConfig, EventPaths};
use crate::events::record::{EventDraft, EventRecord};
use crate::extractors::boundary::{extract_body, story_lines, BoundaryTrace, StoryBody};
use crate::extractors::dates::extract_date;
use crate::extractors::normalize::normalize;
use crate::extractors::photos::collect_photos;
use crate::extractors::year_index::YearIndexEntry;
use crate::utils::error::{EventError, ExtractError, InputKind};
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

/// What the year index (or the caller) knows about an event up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRequest {
    pub year: i32,
    pub number: u32,
    pub title: String,
    pub explicit_date: Option<NaiveDate>,
    pub is_planned: bool,
}

impl EventRequest {
    pub fn from_index(year: i32, entry: &YearIndexEntry) -> Self {
        Self {
            year,
            number: entry.number,
            title: entry.title.clone(),
            explicit_date: extract_date(year, &entry.raw_date_hint),
            is_planned: entry.is_planned,
        }
    }
}

/// Builds validated event records from the legacy archive files.
pub struct EventBuilder<'a> {
    config: &'a ArchiveConfig,
}

impl<'a> EventBuilder<'a> {
    pub fn new(config: &'a ArchiveConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, request: &EventRequest) -> Result<EventRecord, EventError> {
        let paths = self
            .config
            .event_paths(request.year, request.number, request.is_planned);
        self.build_from(request, &paths)
    }

    /// Builds the record from explicitly given input paths.
    pub fn build_from(&self, request: &EventRequest, paths: &EventPaths) -> Result<EventRecord, EventError> {
        let (year, number) = (request.year, request.number);
        tracing::debug!("Building event {}:{} from {}", year, number, paths.base.display());

        require(year, number, InputKind::Story, &paths.story, false)?;
        require(year, number, InputKind::PhotoCaptions, &paths.photo_captions, false)?;
        require(year, number, InputKind::PhotoDir, &paths.photo_dir, true)?;

        let story = self.read_story(year, number, &paths.story)?;
        let narrative = story.narrative();

        let captions = read_lossy(year, number, &paths.photo_captions)?;
        let photos = collect_photos(&captions, &paths.photo_dir).map_err(|source| EventError::Io {
            year,
            number,
            path: paths.photo_dir.clone(),
            source,
        })?;

        let date = request.explicit_date.or_else(|| extract_date(year, &narrative));

        let draft = EventDraft {
            year,
            number,
            title: request.title.clone(),
            date,
            narrative,
            photos,
            is_planned: request.is_planned,
            signature: story.signature,
        };

        if draft.date.is_none() {
            return Err(EventError::MissingDate {
                year,
                number,
                summary: draft.summary(),
            });
        }

        let record = draft.validate(&self.config.events_without_photos)?;
        tracing::info!("Built event {}", record);
        Ok(record)
    }

    /// Normalized story body of one event.
    pub fn read_story(&self, year: i32, number: u32, path: &Path) -> Result<StoryBody, EventError> {
        let raw = read_lossy(year, number, path)?;
        let lines = story_lines(&normalize(&raw));
        extract_body(&lines).map_err(|err| match err {
            ExtractError::EmptyContent => EventError::EmptyContent {
                year,
                number,
                path: path.to_path_buf(),
            },
        })
    }

    /// All normalized story lines of an event with the boundary decisions,
    /// or no trace when the body came out empty.
    pub fn story_outline(&self, request: &EventRequest) -> Result<(Vec<String>, Option<BoundaryTrace>), EventError> {
        let paths = self
            .config
            .event_paths(request.year, request.number, request.is_planned);
        require(request.year, request.number, InputKind::Story, &paths.story, false)?;

        let raw = read_lossy(request.year, request.number, &paths.story)?;
        let lines = story_lines(&normalize(&raw));
        let trace = extract_body(&lines).ok().map(|body| body.trace);
        Ok((lines, trace))
    }
}

fn require(year: i32, number: u32, kind: InputKind, path: &Path, dir: bool) -> Result<(), EventError> {
    let present = if dir { path.is_dir() } else { path.exists() };
    if present {
        Ok(())
    } else {
        Err(EventError::MissingFile {
            year,
            number,
            kind,
            path: path.to_path_buf(),
        })
    }
}

/// The archive mixes encodings; invalid UTF-8 is replaced, not fatal.
fn read_lossy(year: i32, number: u32, path: &Path) -> Result<String, EventError> {
    let bytes = fs::read(path).map_err(|source| EventError::Io {
        year,
        number,
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
