// src/publish/gallery.rs
use crate::config::OFF_PLAN_PREFIX;
use crate::events::EventRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// `{year}-{mp-}{event:02}-`, shared by every upload of one event.
pub fn file_name_prefix(year: i32, event_number: u32, is_planned: bool) -> String {
    let planned = if is_planned { "" } else { OFF_PLAN_PREFIX };
    format!("{}-{}{:02}-", year, planned, event_number)
}

/// A photo with the name it gets on the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub name: String,
    pub path: PathBuf,
    pub caption: String,
}

impl GalleryItem {
    pub fn for_record(record: &EventRecord) -> Vec<GalleryItem> {
        let prefix = file_name_prefix(record.year(), record.number(), record.is_planned());
        record
            .photos()
            .iter()
            .map(|photo| GalleryItem {
                name: format!("{}{:02}.jpg", prefix, photo.number),
                path: photo.path.clone(),
                caption: photo.caption.clone(),
            })
            .collect()
    }
}

/// Copy of a photo under its gallery name, removed when dropped.
#[derive(Debug)]
pub struct TemporaryImage {
    path: PathBuf,
}

impl TemporaryImage {
    pub fn create(item: &GalleryItem, tmp_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(tmp_dir)?;
        let path = tmp_dir.join(&item.name);
        fs::copy(&item.path, &path)?;
        tracing::debug!("tmp img \"{}\" created", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TemporaryImage {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("tmp img \"{}\" removed", self.path.display()),
            Err(e) => tracing::warn!("Failed to remove tmp img {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventRegistry;
    use crate::events::record::EventDraft;
    use crate::extractors::photos::EventPhoto;
    use tempfile::TempDir;

    #[test]
    fn names_follow_event_and_photo_numbers() {
        let record = EventDraft {
            year: 2012,
            number: 3,
            title: "Kriváň".into(),
            date: None,
            narrative: "a\nb".into(),
            photos: vec![
                EventPhoto { number: 1, file_name: "x.jpg".into(), path: "/p/x.jpg".into(), caption: "X".into() },
                EventPhoto { number: 2, file_name: "y.jpg".into(), path: "/p/y.jpg".into(), caption: "Y".into() },
            ],
            is_planned: false,
            signature: None,
        }
        .validate(&EventRegistry::new())
        .unwrap();

        let items = GalleryItem::for_record(&record);
        assert_eq!(items[0].name, "2012-mp-03-01.jpg");
        assert_eq!(items[1].name, "2012-mp-03-02.jpg");
        assert_eq!(items[1].caption, "Y");
        assert_eq!(file_name_prefix(2012, 3, true), "2012-03-");
    }

    #[test]
    fn temporary_copy_is_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"jpeg").unwrap();
        let item = GalleryItem {
            name: "2012-01-01.jpg".into(),
            path: source,
            caption: String::new(),
        };

        let tmp_dir = dir.path().join("upload");
        let copy_path = {
            let image = TemporaryImage::create(&item, &tmp_dir).unwrap();
            assert_eq!(fs::read(image.path()).unwrap(), b"jpeg");
            image.path().to_path_buf()
        };
        assert!(!copy_path.exists());
    }

    #[test]
    fn missing_source_is_an_error() {
        let dir = TempDir::new().unwrap();
        let item = GalleryItem {
            name: "2012-01-01.jpg".into(),
            path: dir.path().join("missing.jpg"),
            caption: String::new(),
        };
        assert!(TemporaryImage::create(&item, dir.path()).is_err());
    }
}
