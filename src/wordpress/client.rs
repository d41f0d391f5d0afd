// src/wordpress/client.rs
use crate::utils::error::PublishError;
use crate::wordpress::models::{
    Created, DateRange, ItemKind, NewPost, PostDraft, Term, WpItem, WP_DATE_FORMAT,
};
use crate::wordpress::Publisher;
use chrono::NaiveDate;
use reqwest::header;
use std::path::Path;
use std::time::Duration;

const USER_AGENT: &str = concat!("archive_migrator/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 120;
// WordPress caps per_page at 100.
const PAGE_SIZE: &str = "100";

/// WordPress REST API (`/wp-json/wp/v2`) with basic auth.
pub struct WordpressClient {
    http: reqwest::Client,
    api_url: String,
    username: String,
    password: String,
}

impl WordpressClient {
    pub fn new(site_url: &str, username: &str, password: &str) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_url: format!("{}/wp-json/wp/v2", site_url.trim_end_matches('/')),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    /// Looks a tag or category up by name and creates it when missing.
    pub async fn ensure_term(&self, taxonomy: &str, name: &str) -> Result<u64, PublishError> {
        let url = self.endpoint(taxonomy);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("search", name), ("per_page", PAGE_SIZE)])
            .send()
            .await?;
        let terms: Vec<Term> = check(response, &url).await?.json().await?;

        if let Some(term) = terms.iter().find(|term| term.name == name) {
            return Ok(term.id);
        }

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        let created: Created = check(response, &url).await?.json().await?;
        tracing::info!("Created {} '{}' with id {}", taxonomy, name, created.id);
        Ok(created.id)
    }

    async fn ensure_terms(&self, taxonomy: &str, names: &[String]) -> Result<Vec<u64>, PublishError> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            ids.push(self.ensure_term(taxonomy, name).await?);
        }
        Ok(ids)
    }
}

/// Maps error statuses the way the API reports them.
async fn check(response: reqwest::Response, url: &str) -> Result<reqwest::Response, PublishError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    tracing::error!("HTTP error status: {} for URL: {}", status, url);
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(PublishError::Unauthorized(url.to_string()));
    }
    if let Ok(body) = response.text().await {
        tracing::debug!("Error body: {}", body);
    }
    Err(PublishError::Http {
        status,
        url: url.to_string(),
    })
}

impl Publisher for WordpressClient {
    async fn create_post(&self, post: &PostDraft) -> Result<u64, PublishError> {
        let tags = self.ensure_terms("tags", &post.tags).await?;
        let categories = self.ensure_terms("categories", &post.categories).await?;
        let date = post.date.map(|d| d.format(WP_DATE_FORMAT).to_string());

        let body = NewPost {
            title: &post.title,
            content: &post.content,
            status: "publish",
            date,
            tags,
            categories,
        };

        let url = self.endpoint(post.kind.path());
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await?;
        let created: Created = check(response, &url).await?.json().await?;

        tracing::info!("Created {} {}: {}", post.kind.path(), created.id, post.title);
        Ok(created.id)
    }

    async fn upload_image(&self, path: &Path, caption: &str, date: Option<NaiveDate>) -> Result<u64, PublishError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| PublishError::Upload {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| PublishError::Parse(format!("upload path {} has no file name", path.display())))?;

        let mut params = vec![("caption", caption.to_string()), ("title", caption.to_string())];
        if let Some(date) = date.and_then(|d| d.and_hms_opt(0, 0, 0)) {
            params.push(("date", date.format(WP_DATE_FORMAT).to_string()));
        }

        let url = self.endpoint(ItemKind::Media.path());
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(header::CONTENT_TYPE, "image/jpeg")
            .header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            )
            .query(&params)
            .body(bytes)
            .send()
            .await?;
        let created: Created = check(response, &url).await?.json().await?;

        tracing::info!("Imported image {}. {}: {}", created.id, file_name, caption);
        Ok(created.id)
    }

    async fn list_items(
        &self,
        kind: ItemKind,
        range: &DateRange,
        search: Option<&str>,
    ) -> Result<Vec<WpItem>, PublishError> {
        let mut params = vec![
            ("after", range.after.format(WP_DATE_FORMAT).to_string()),
            ("before", range.before.format(WP_DATE_FORMAT).to_string()),
            ("per_page", PAGE_SIZE.to_string()),
        ];
        if let Some(search) = search {
            params.push(("search", search.to_string()));
        }

        let url = self.endpoint(kind.path());
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .query(&params)
            .send()
            .await?;
        let items: Vec<WpItem> = check(response, &url).await?.json().await?;
        tracing::debug!("Listed {} {}", items.len(), kind.path());
        Ok(items)
    }

    async fn delete_item(&self, kind: ItemKind, id: u64) -> Result<(), PublishError> {
        let url = self.endpoint(&format!("{}/{}", kind.path(), id));
        let mut request = self
            .http
            .delete(&url)
            .basic_auth(&self.username, Some(&self.password));
        // attachments cannot be trashed
        if kind == ItemKind::Media {
            request = request.query(&[("force", "true")]);
        }
        let response = request.send().await?;
        check(response, &url).await?;

        tracing::info!("Removed {} with id {}", kind.path(), id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_has_no_double_slash() {
        let client = WordpressClient::new("https://klub.example.sk/", "user", "secret").unwrap();
        assert_eq!(client.endpoint("posts"), "https://klub.example.sk/wp-json/wp/v2/posts");
    }
}
