// src/storage/mod.rs
use crate::config::OFF_PLAN_PREFIX;
use crate::events::EventRecord;
use crate::extractors::normalize::decode_markup;
use crate::utils::error::StorageError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// `/base_dir/year/NN/` for planned events, `/base_dir/year/mp-NN/` otherwise.
    fn event_dir(&self, year: i32, number: u32, is_planned: bool) -> PathBuf {
        let planned = if is_planned { "" } else { OFF_PLAN_PREFIX };
        self.base_dir
            .join(year.to_string())
            .join(format!("{}{:02}", planned, number))
    }

    /// Saves the record as JSON and its narrative as plain text.
    /// Returns the path of the JSON file.
    pub fn save_record(&self, record: &EventRecord) -> Result<PathBuf, StorageError> {
        let target_dir = self.event_dir(record.year(), record.number(), record.is_planned());

        // Create the directories if they don't exist
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }

        let story_path = target_dir.join("story.txt");
        let mut file = fs::File::create(&story_path).map_err(StorageError::IoError)?;
        file.write_all(decode_markup(record.narrative()).as_bytes())
            .map_err(StorageError::IoError)?;

        let metadata = serde_json::json!({
            "record": record,
            "narrative_chars": record.narrative().chars().count(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });
        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let record_path = target_dir.join("record.json");
        fs::write(&record_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved event {}:{} to {}", record.year(), record.number(), record_path.display());

        Ok(record_path)
    }

    /// Directory for debug artifacts of one event, next to its record.
    pub fn debug_dir(&self, year: i32, number: u32, is_planned: bool) -> Result<PathBuf, StorageError> {
        let dir = self.event_dir(year, number, is_planned).join("debug");
        fs::create_dir_all(&dir).map_err(StorageError::IoError)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventRegistry;
    use crate::events::record::EventDraft;
    use crate::extractors::photos::EventPhoto;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record(is_planned: bool) -> EventRecord {
        EventDraft {
            year: 2013,
            number: 7,
            title: "Malé Karpaty".into(),
            date: NaiveDate::from_ymd_opt(2013, 5, 1),
            narrative: "ráno\nvečer".into(),
            photos: vec![EventPhoto {
                number: 1,
                file_name: "a.jpg".into(),
                path: PathBuf::from("/archive/2013/7/foto/a.jpg"),
                caption: "vrchol".into(),
            }],
            is_planned,
            signature: None,
        }
        .validate(&EventRegistry::new())
        .unwrap()
    }

    #[test]
    fn saves_json_and_story() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::new(dir.path().join("out")).unwrap();

        let path = storage.save_record(&record(true)).unwrap();
        assert_eq!(path, dir.path().join("out/2013/07/record.json"));

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["record"]["title"], "Malé Karpaty");
        assert_eq!(json["record"]["date"], "2013-05-01");
        assert_eq!(json["record"]["photos"][0]["caption"], "vrchol");
        assert_eq!(json["narrative_chars"], 10);

        let story = fs::read_to_string(dir.path().join("out/2013/07/story.txt")).unwrap();
        assert_eq!(story, "ráno\nvečer");
    }

    #[test]
    fn story_text_has_markup_entities_decoded() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let mut without_photos = EventRegistry::new();
        without_photos.insert(2013, 8, true);
        let record = EventDraft {
            year: 2013,
            number: 8,
            title: "Záhorie".into(),
            date: NaiveDate::from_ymd_opt(2013, 6, 1),
            narrative: "cesta &lt;Kriváň&gt;\nA &amp;amp; B".into(),
            photos: Vec::new(),
            is_planned: true,
            signature: None,
        }
        .validate(&without_photos)
        .unwrap();

        storage.save_record(&record).unwrap();
        let story = fs::read_to_string(dir.path().join("2013/08/story.txt")).unwrap();
        assert_eq!(story, "cesta <Kriváň>\nA &amp; B");
    }

    #[test]
    fn off_plan_records_get_their_own_dir() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let path = storage.save_record(&record(false)).unwrap();
        assert!(path.ends_with("2013/mp-07/record.json"));
    }

    #[test]
    fn debug_dir_sits_in_the_event_dir() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let debug = storage.debug_dir(2013, 7, false).unwrap();
        assert_eq!(debug, dir.path().join("2013/mp-07/debug"));
        assert!(debug.is_dir());
    }
}
