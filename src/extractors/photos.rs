// src/extractors/photos.rs

// --- Imports ---
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

// --- CSS Selectors (Lazy Static) ---
// Captions start after the first paragraph (the page heading).
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p").expect("Failed to compile ANCHOR_SELECTOR")
});
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body").expect("Failed to compile BODY_SELECTOR")
});
static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("img[src]").expect("Failed to compile IMG_SELECTOR")
});

const PHOTO_EXTENSION: &str = ".jpg";
const THUMBNAIL_SUFFIX: &str = "_tn.jpg";
// Site footer, also in the mis-decoded form old exports carry.
const SITE_FOOTERS: [&str; 2] = ["Stránka MKCK ", "StrÃ¡nka MKCK "];

// --- Data Structures ---
/// One sibling of the caption document, reduced to what pairing needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionNode {
    Element { image: Option<String>, text: String },
    NonElement,
}

/// An image name from the caption document and the text that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAssociation {
    pub file_name: String,
    pub caption: String,
}

impl PhotoAssociation {
    pub fn new(file_name: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            caption: caption.into(),
        }
    }
}

/// A caption joined to the photo file it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventPhoto {
    /// 1-based position in caption document order.
    pub number: usize,
    pub file_name: String,
    pub path: PathBuf,
    pub caption: String,
}

/// Flattens the siblings following the anchor paragraph. Without an anchor
/// the whole body is walked.
pub fn caption_nodes(html: &str) -> Vec<CaptionNode> {
    let document = Html::parse_document(html);

    let siblings: Vec<_> = match document.select(&ANCHOR_SELECTOR).next() {
        Some(anchor) => anchor.next_siblings().collect(),
        None => {
            tracing::debug!("Caption document has no anchor paragraph, walking the whole body");
            document
                .select(&BODY_SELECTOR)
                .next()
                .map(|body| body.children().collect())
                .unwrap_or_default()
        }
    };

    siblings
        .into_iter()
        .map(|node| match ElementRef::wrap(node) {
            Some(element) => CaptionNode::Element {
                image: image_name(element),
                text: element.text().collect::<String>().replace('\u{a0}', " ").trim().to_string(),
            },
            None => CaptionNode::NonElement,
        })
        .collect()
}

/// Basename of the first image in or at `element`.
fn image_name(element: ElementRef) -> Option<String> {
    let src = if element.value().name() == "img" {
        element.value().attr("src")
    } else {
        element
            .select(&IMG_SELECTOR)
            .next()
            .and_then(|img| img.value().attr("src"))
    }?;

    let name = src.trim().rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Pairs each image with the first text block after it, in document order.
///
/// Two images in a row leave the first one with an empty caption, as does an
/// image at the very end. Text before any image is ignored.
pub fn associate(nodes: &[CaptionNode]) -> Vec<PhotoAssociation> {
    let mut associations = Vec::new();
    let mut pending: Option<String> = None;

    for node in nodes {
        let CaptionNode::Element { image, text } = node else {
            continue;
        };

        if let Some(image) = image {
            if let Some(previous) = pending.take() {
                associations.push(PhotoAssociation::new(previous, ""));
            }
            pending = Some(image.clone());
        } else if !text.is_empty() && !is_site_footer(text) {
            if let Some(file_name) = pending.take() {
                let caption = text.lines().next().unwrap_or_default().trim();
                tracing::trace!("img: {} {}", file_name, caption);
                associations.push(PhotoAssociation::new(file_name, caption));
            }
        }
    }

    if let Some(file_name) = pending {
        associations.push(PhotoAssociation::new(file_name, ""));
    }

    associations
}

fn is_site_footer(text: &str) -> bool {
    SITE_FOOTERS.iter().any(|footer| text.starts_with(footer))
}

/// Full-size photos in `dir` by file name; thumbnails are never included.
pub fn photo_files(dir: &Path) -> io::Result<BTreeMap<String, PathBuf>> {
    let mut files = BTreeMap::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!("Skipping non UTF-8 file name in {}", dir.display());
            continue;
        };
        let lower = name.to_lowercase();
        if lower.ends_with(PHOTO_EXTENSION) && !lower.ends_with(THUMBNAIL_SUFFIX) {
            files.insert(name, entry.path());
        }
    }

    tracing::debug!("Found {} photo files in {}", files.len(), dir.display());
    Ok(files)
}

/// Joins associations to files on disk and numbers the survivors.
/// A caption naming a file that is not there is dropped.
pub fn resolve(associations: Vec<PhotoAssociation>, files: &BTreeMap<String, PathBuf>) -> Vec<EventPhoto> {
    let mut seen = HashSet::new();
    let mut photos = Vec::new();

    for association in associations {
        let Some(path) = files.get(&association.file_name) else {
            tracing::debug!("No file for captioned photo {}, dropping it", association.file_name);
            continue;
        };
        if !seen.insert(association.file_name.clone()) {
            tracing::debug!("Photo {} is captioned twice, keeping the first", association.file_name);
            continue;
        }
        photos.push(EventPhoto {
            number: photos.len() + 1,
            file_name: association.file_name,
            path: path.clone(),
            caption: association.caption,
        });
    }

    photos
}

/// Caption document + photo directory → numbered photos.
pub fn collect_photos(captions_html: &str, photo_dir: &Path) -> io::Result<Vec<EventPhoto>> {
    let associations = associate(&caption_nodes(captions_html));
    let files = photo_files(photo_dir)?;
    Ok(resolve(associations, &files))
}
