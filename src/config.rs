// src/config.rs
use crate::utils::error::ConfigError;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

// --- Defaults ---
const DEFAULT_DOCS_BASE: &str = "./docs";
const DEFAULT_STORY_FILE: &str = "zapis.htm";
const DEFAULT_PHOTOS_FILE: &str = "foto.htm";
const DEFAULT_PHOTOS_DIR: &str = "foto";
const DEFAULT_YEAR_FILE: &str = "akcie.htm";
const DEFAULT_OFF_PLAN_DIR: &str = "mimoplan";
// From this year on the photos sit directly in the event directory.
const DEFAULT_FLAT_PHOTOS_SINCE: i32 = 2015;

/// Prefix that sets off-plan events apart from planned ones with the same
/// number: in registries, stored record dirs and upload names.
pub const OFF_PLAN_PREFIX: &str = "mp-";

/// Set of events per year, e.g. events published without photos.
///
/// In TOML the years are table keys. Off-plan events are listed with the
/// `mp-` prefix, so they never match the planned event with the same number:
///
/// ```toml
/// [events_without_photos]
/// 2015 = [19, "mp-3"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, Vec<RegistryEntry>>")]
pub struct EventRegistry(BTreeMap<i32, BTreeSet<(u32, bool)>>);

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: i32, number: u32, is_planned: bool) {
        self.0.entry(year).or_default().insert((number, is_planned));
    }

    pub fn contains(&self, year: i32, number: u32, is_planned: bool) -> bool {
        self.0
            .get(&year)
            .map_or(false, |events| events.contains(&(number, is_planned)))
    }
}

/// `(year, number)` pairs of planned events.
impl FromIterator<(i32, u32)> for EventRegistry {
    fn from_iter<I: IntoIterator<Item = (i32, u32)>>(iter: I) -> Self {
        let mut registry = EventRegistry::new();
        for (year, number) in iter {
            registry.insert(year, number, true);
        }
        registry
    }
}

/// A registry list item: `19` and `"19"` are planned, `"mp-3"` is off-plan.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RegistryEntry {
    Number(u32),
    Label(String),
}

impl RegistryEntry {
    fn event(self) -> Result<(u32, bool), String> {
        match self {
            RegistryEntry::Number(number) => Ok((number, true)),
            RegistryEntry::Label(label) => {
                let trimmed = label.trim();
                let (digits, is_planned) = match trimmed.strip_prefix(OFF_PLAN_PREFIX) {
                    Some(rest) => (rest, false),
                    None => (trimmed, true),
                };
                digits
                    .parse::<u32>()
                    .map(|number| (number, is_planned))
                    .map_err(|_| format!("registry entry '{}' is not an event number", label))
            }
        }
    }
}

impl TryFrom<BTreeMap<String, Vec<RegistryEntry>>> for EventRegistry {
    type Error = String;

    fn try_from(raw: BTreeMap<String, Vec<RegistryEntry>>) -> Result<Self, Self::Error> {
        let mut registry = EventRegistry::new();
        for (key, entries) in raw {
            let year = key
                .trim()
                .parse::<i32>()
                .map_err(|_| format!("registry key '{}' is not a year", key))?;
            for entry in entries {
                let (number, is_planned) = entry.event()?;
                registry.insert(year, number, is_planned);
            }
        }
        Ok(registry)
    }
}

/// Where the legacy archive lives and how its directories are laid out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub docs_base: PathBuf,
    pub story_file: String,
    pub photos_file: String,
    pub photos_dir: String,
    pub year_file: String,
    pub off_plan_dir: String,
    pub flat_photos_since: i32,
    /// Scratch directory for renamed upload copies; system temp dir if unset.
    pub upload_tmp_dir: Option<PathBuf>,
    pub events_without_photos: EventRegistry,
    pub skipped_events: EventRegistry,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            docs_base: PathBuf::from(DEFAULT_DOCS_BASE),
            story_file: DEFAULT_STORY_FILE.to_string(),
            photos_file: DEFAULT_PHOTOS_FILE.to_string(),
            photos_dir: DEFAULT_PHOTOS_DIR.to_string(),
            year_file: DEFAULT_YEAR_FILE.to_string(),
            off_plan_dir: DEFAULT_OFF_PLAN_DIR.to_string(),
            flat_photos_since: DEFAULT_FLAT_PHOTOS_SINCE,
            upload_tmp_dir: None,
            events_without_photos: EventRegistry::new(),
            skipped_events: EventRegistry::new(),
        }
    }
}

/// Resolved input paths of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPaths {
    pub base: PathBuf,
    pub story: PathBuf,
    pub photo_captions: PathBuf,
    pub photo_dir: PathBuf,
}

impl ArchiveConfig {
    /// Loads the config from a TOML file. Missing keys keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ArchiveConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded archive config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn year_index_path(&self, year: i32) -> PathBuf {
        self.docs_base.join(year.to_string()).join(&self.year_file)
    }

    /// `{base}/{year}/{number}/` for planned events, off-plan ones live in
    /// their own subdirectory of the year.
    pub fn event_paths(&self, year: i32, number: u32, is_planned: bool) -> EventPaths {
        let mut base = self.docs_base.join(year.to_string());
        if !is_planned {
            base.push(&self.off_plan_dir);
        }
        base.push(number.to_string());

        let photo_dir = if year >= self.flat_photos_since {
            base.clone()
        } else {
            base.join(&self.photos_dir)
        };

        EventPaths {
            story: base.join(&self.story_file),
            photo_captions: base.join(&self.photos_file),
            photo_dir,
            base,
        }
    }

    pub fn upload_tmp_dir(&self) -> PathBuf {
        self.upload_tmp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
