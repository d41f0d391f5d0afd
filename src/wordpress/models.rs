// src/wordpress/models.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const WP_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// REST collections the importer touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Posts,
    Pages,
    Media,
}

impl ItemKind {
    pub fn path(self) -> &'static str {
        match self {
            ItemKind::Posts => "posts",
            ItemKind::Pages => "pages",
            ItemKind::Media => "media",
        }
    }
}

/// Publication window used to find what an import created for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub after: NaiveDateTime,
    pub before: NaiveDateTime,
}

impl DateRange {
    /// From the last second of the previous year up to midnight of the next one.
    pub fn year(year: i32) -> Option<Self> {
        let after = NaiveDate::from_ymd_opt(year - 1, 12, 31)?.and_hms_opt(23, 59, 59)?;
        let before = NaiveDate::from_ymd_opt(year + 1, 1, 1)?.and_hms_opt(0, 0, 0)?;
        Some(Self { after, before })
    }
}

/// A post or page to create, with taxonomy terms given by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub kind: ItemKind,
    pub title: String,
    pub content: String,
    pub date: Option<NaiveDateTime>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
}

/// Body of `POST /posts` and `POST /pages`.
#[derive(Debug, Serialize)]
pub struct NewPost<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Created {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct Term {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rendered {
    pub rendered: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSize {
    pub file: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaDetails {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub sizes: HashMap<String, MediaSize>,
}

/// The fields of a listed post, page or media item the importer reads.
#[derive(Debug, Clone, Deserialize)]
pub struct WpItem {
    pub id: u64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub title: Option<Rendered>,
    #[serde(default)]
    pub media_details: Option<MediaDetails>,
}

impl WpItem {
    /// File name of the full-size rendition of a media item.
    pub fn full_file_name(&self) -> Option<&str> {
        let details = self.media_details.as_ref()?;
        if let Some(full) = details.sizes.get("full") {
            return Some(full.file.as_str());
        }
        details
            .file
            .as_deref()
            .map(|file| file.rsplit('/').next().unwrap_or(file))
    }

    pub fn title_text(&self) -> &str {
        self.title.as_ref().map(|t| t.rendered.as_str()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_brackets_the_year() {
        let range = DateRange::year(2012).unwrap();
        assert_eq!(range.after.format(WP_DATE_FORMAT).to_string(), "2011-12-31T23:59:59");
        assert_eq!(range.before.format(WP_DATE_FORMAT).to_string(), "2013-01-01T00:00:00");
    }

    #[test]
    fn reads_full_size_file_name() {
        let item: WpItem = serde_json::from_value(serde_json::json!({
            "id": 12,
            "date": "2012-05-12T00:00:00",
            "title": {"rendered": "popis"},
            "media_details": {
                "file": "2012/05/2012-03-01.jpg",
                "sizes": {"full": {"file": "2012-03-01-scaled.jpg"}}
            }
        }))
        .unwrap();
        assert_eq!(item.full_file_name(), Some("2012-03-01-scaled.jpg"));
        assert_eq!(item.title_text(), "popis");

        let bare: WpItem = serde_json::from_value(serde_json::json!({
            "id": 13,
            "media_details": {"file": "2012/05/2012-03-02.jpg"}
        }))
        .unwrap();
        assert_eq!(bare.full_file_name(), Some("2012-03-02.jpg"));
    }
}
