// src/utils/error.rs
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the text-level extractors. These know nothing about which
/// event they run for; the builder wraps them with the year/number.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Story body is empty after boundary extraction")]
    EmptyContent,
}

/// Which kind of event input was missing on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Story,
    PhotoCaptions,
    PhotoDir,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputKind::Story => "story file",
            InputKind::PhotoCaptions => "photo caption file",
            InputKind::PhotoDir => "photo directory",
        };
        f.write_str(name)
    }
}

/// The field invariant an event record broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRule {
    Year(i32),
    Number(u32),
    Title(String),
    NarrativeLines(usize),
    Photos(usize),
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::Year(year) => write!(f, "Invalid event year {}", year),
            ValidationRule::Number(number) => write!(f, "Invalid event number {}", number),
            ValidationRule::Title(title) => write!(f, "Invalid event title '{}'", title),
            ValidationRule::NarrativeLines(n) => write!(f, "Invalid event story. Num of lines {}", n),
            ValidationRule::Photos(n) => write!(f, "Invalid event photos. Num of photos {}", n),
        }
    }
}

/// Everything that can abort the build of a single event.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("{year}:{number} {kind} {} does not exist", .path.display())]
    MissingFile {
        year: i32,
        number: u32,
        kind: InputKind,
        path: PathBuf,
    },

    #[error("{year} year index {} does not exist", .path.display())]
    MissingYearIndex { year: i32, path: PathBuf },

    #[error("{year}:{number} story {} is empty", .path.display())]
    EmptyContent { year: i32, number: u32, path: PathBuf },

    #[error("{year}:{number} has no date and none found in the story. Data: {summary}")]
    MissingDate { year: i32, number: u32, summary: String },

    #[error("Validation failed. Data: {summary}. Error: {rule}")]
    Validation { summary: String, rule: ValidationRule },

    #[error("{year}:{number} failed to read {}: {source}", .path.display())]
    Io {
        year: i32,
        number: u32,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String },

    #[error("Authentication rejected by {0}")]
    Unauthorized(String),

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Failed to prepare upload {}: {source}", .path.display())]
    Upload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Event failed: {0}")]
    Event(#[from] EventError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Publishing failed: {0}")]
    Publish(#[from] PublishError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
