// src/publish/importer.rs
use crate::events::EventRecord;
use crate::publish::content::render_body;
use crate::publish::gallery::{file_name_prefix, GalleryItem, TemporaryImage};
use crate::publish::year_page::{format_iso_date, render_year_page, EventLink};
use crate::utils::error::PublishError;
use crate::wordpress::models::{DateRange, ItemKind, PostDraft};
use crate::wordpress::Publisher;
use chrono::NaiveDate;
use std::path::PathBuf;

fn year_range(year: i32) -> Result<DateRange, PublishError> {
    DateRange::year(year).ok_or_else(|| PublishError::Parse(format!("year {} is out of range", year)))
}

/// Moves validated events onto a site through a [`Publisher`].
pub struct Importer<P: Publisher> {
    publisher: P,
    upload_tmp_dir: PathBuf,
}

impl<P: Publisher> Importer<P> {
    pub fn new(publisher: P, upload_tmp_dir: PathBuf) -> Self {
        Self {
            publisher,
            upload_tmp_dir,
        }
    }

    /// Uploads every photo of the record under its gallery name, in photo order.
    pub async fn upload_event_photos(&self, record: &EventRecord) -> Result<Vec<u64>, PublishError> {
        let mut ids = Vec::with_capacity(record.photos().len());

        for item in GalleryItem::for_record(record) {
            let image = TemporaryImage::create(&item, &self.upload_tmp_dir).map_err(|source| PublishError::Upload {
                path: item.path.clone(),
                source,
            })?;
            let id = self
                .publisher
                .upload_image(image.path(), &item.caption, record.date())
                .await
                .map_err(|e| {
                    tracing::error!("Failed to upload image {}. Error: {}", item.name, e);
                    e
                })?;
            ids.push(id);
        }

        Ok(ids)
    }

    /// Ids of media already uploaded for an event, ordered by file name.
    pub async fn post_image_ids(&self, year: i32, event_number: u32, is_planned: bool) -> Result<Vec<u64>, PublishError> {
        let prefix = file_name_prefix(year, event_number, is_planned);
        let items = self
            .publisher
            .list_items(ItemKind::Media, &year_range(year)?, Some(&prefix))
            .await?;

        // search is a full-text match, so keep only real prefix hits
        let mut named: Vec<(&str, u64)> = items
            .iter()
            .filter_map(|item| item.full_file_name().map(|name| (name, item.id)))
            .filter(|(name, _)| name.starts_with(&prefix))
            .collect();
        named.sort_by(|a, b| a.0.cmp(b.0));

        Ok(named.into_iter().map(|(_, id)| id).collect())
    }

    /// Creates the event post with the given gallery.
    pub async fn create_event_post(&self, record: &EventRecord, image_ids: &[u64]) -> Result<u64, PublishError> {
        let post = PostDraft {
            kind: ItemKind::Posts,
            title: record.title().to_string(),
            content: render_body(record, image_ids),
            date: record.date().and_then(|d| d.and_hms_opt(0, 0, 0)),
            tags: vec!["imported".to_string(), format!("rok_{}", record.year())],
            categories: vec!["Akcie".to_string(), format!("Akcie_{}", record.year())],
        };

        let id = self.publisher.create_post(&post).await?;
        tracing::info!("Imported post {}. {}", id, record);
        Ok(id)
    }

    /// Uploads the photos (or reuses earlier uploads) and creates the post.
    pub async fn import_event(&self, record: &EventRecord, reuse_uploads: bool) -> Result<u64, PublishError> {
        let mut image_ids = Vec::new();
        if reuse_uploads {
            image_ids = self
                .post_image_ids(record.year(), record.number(), record.is_planned())
                .await?;
            tracing::debug!("Found {} uploaded images for {}:{}", image_ids.len(), record.year(), record.number());
        }
        if image_ids.is_empty() && !record.photos().is_empty() {
            image_ids = self.upload_event_photos(record).await?;
        }

        self.create_event_post(record, &image_ids).await
    }

    /// Deletes every post and page published within the year. Returns how
    /// many items were removed.
    pub async fn remove_year_items(&self, year: i32) -> Result<usize, PublishError> {
        let range = year_range(year)?;
        let mut removed = 0;

        for kind in [ItemKind::Posts, ItemKind::Pages] {
            let items = self.publisher.list_items(kind, &range, None).await?;
            tracing::info!("{} items to remove: {}", kind.path(), items.len());
            for item in items {
                self.publisher.delete_item(kind, item.id).await?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Creates the `Akcie {year}` overview page linking the year's posts in
    /// publication order.
    pub async fn create_year_page(&self, year: i32) -> Result<u64, PublishError> {
        let mut posts = self
            .publisher
            .list_items(ItemKind::Posts, &year_range(year)?, None)
            .await?;
        posts.sort_by(|a, b| a.date.cmp(&b.date));

        // posts carry no planned flag, so they all go to the first column
        let planned: Vec<EventLink> = posts
            .iter()
            .enumerate()
            .map(|(i, post)| EventLink {
                event_number: i + 1,
                title: post.title_text().to_string(),
                link: post.link.clone().unwrap_or_default(),
                date: format_iso_date(post.date.as_deref().unwrap_or_default()),
            })
            .collect();

        let page = PostDraft {
            kind: ItemKind::Pages,
            title: format!("Akcie {}", year),
            content: render_year_page(&planned, &[]),
            date: NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            tags: Vec::new(),
            categories: Vec::new(),
        };

        let id = self.publisher.create_post(&page).await?;
        tracing::info!("Created page {} for year {}", id, year);
        Ok(id)
    }
}
