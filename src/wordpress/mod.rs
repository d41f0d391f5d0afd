// src/wordpress/mod.rs
pub mod client;
pub mod models;

use crate::utils::error::PublishError;
use chrono::NaiveDate;
use models::{DateRange, ItemKind, PostDraft, WpItem};
use std::path::Path;

/// The publishing side of an import. Calls are made one at a time and are
/// never retried.
#[allow(async_fn_in_trait)]
pub trait Publisher {
    async fn create_post(&self, post: &PostDraft) -> Result<u64, PublishError>;

    async fn upload_image(&self, path: &Path, caption: &str, date: Option<NaiveDate>) -> Result<u64, PublishError>;

    async fn list_items(
        &self,
        kind: ItemKind,
        range: &DateRange,
        search: Option<&str>,
    ) -> Result<Vec<WpItem>, PublishError>;

    async fn delete_item(&self, kind: ItemKind, id: u64) -> Result<(), PublishError>;
}
