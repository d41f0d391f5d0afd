// src/extractors/boundary.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Markers ---
// Two historical rule sets exist in the archive tooling ("Archív akcií" with a
// short footer list vs. "Archív akci" with fillers, signatures and photo
// markers). This is the later, wider one.
const BANNER_PREFIX: &str = "Archív akci";
const FILLER_LINES: [&str; 3] = ["<!--", "pata", "//-->"];
const FOOTER_PREFIXES: [&str; 2] = ["pata", "Stránka MKCK - Malo"];
const PHOTO_MARKERS: [&str; 2] = ["foto z akcie:", "foto:"];
const NOISE_LINES: [&str; 3] = [".", "menu pre zapis", "<!--"];
const SIGNATURE_NAMES: [&str; 5] = ["Kraic", "Herceg", "Golier", "Poláček", "Naništa"];
const NOT_A_SIGNATURE: &str = " administrátor ";

// "Zápis z akcie č. 12" heading repeated at the top of some stories.
static TITLE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:z[áa]pis|z[áa]znam)\s+z\s+akcie\s*(?:č|c)?\.?\s*\d+\b")
        .expect("Failed to compile TITLE_LINE_RE")
});

// --- Data Structures ---
/// Where the boundary heuristics cut a story, kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryTrace {
    pub banner_at: Option<usize>,
    pub header: usize,
    pub footer: usize,
    pub signature_at: Option<usize>,
    pub photo_marker_at: Option<usize>,
    pub title_line_stripped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryBody {
    pub lines: Vec<String>,
    /// Author line found right after the narrative, if any.
    pub signature: Option<String>,
    pub trace: BoundaryTrace,
}

impl StoryBody {
    pub fn narrative(&self) -> String {
        self.lines.join("\n")
    }
}

/// Trimmed, non-empty lines of a normalized story, minus known noise lines.
pub fn story_lines(normalized: &str) -> Vec<String> {
    normalized
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !NOISE_LINES.contains(line))
        .map(str::to_string)
        .collect()
}

/// Cuts the site banner and footer boilerplate off a story: `lines[header..footer]`.
pub fn extract_body(lines: &[String]) -> Result<StoryBody, ExtractError> {
    let mut trace = BoundaryTrace::default();

    let (mut header, banner_at) = header_index(lines);
    trace.banner_at = banner_at;

    let scan = footer_index(lines, header);
    let mut footer = scan.footer;
    trace.photo_marker_at = scan.photo_marker_at;
    trace.signature_at = scan.signature_at;

    // A signature may also sit right above a sentinel or photo marker.
    let mut signature = scan.signature_at.map(|i| lines[i].clone());
    while footer > header && is_signature(&lines[footer - 1]) {
        footer -= 1;
        trace.signature_at = Some(footer);
        signature = Some(lines[footer].clone());
    }

    if header < footer && TITLE_LINE_RE.is_match(&lines[header]) {
        tracing::debug!("Stripping title line '{}'", lines[header]);
        header += 1;
        trace.title_line_stripped = true;
    }

    trace.header = header;
    trace.footer = footer;
    tracing::debug!("Story boundaries: header {} footer {} of {} lines", header, footer, lines.len());

    if header >= footer {
        return Err(ExtractError::EmptyContent);
    }

    for (i, line) in lines[header..footer].iter().enumerate() {
        tracing::trace!("{}: {}", i, line);
    }

    Ok(StoryBody {
        lines: lines[header..footer].to_vec(),
        signature,
        trace,
    })
}

/// Index of the first narrative line: past the banner and the fillers after it.
fn header_index(lines: &[String]) -> (usize, Option<usize>) {
    let Some(banner) = lines.iter().position(|line| line.starts_with(BANNER_PREFIX)) else {
        return (0, None);
    };

    let mut index = banner + 1;
    while index < lines.len() && FILLER_LINES.contains(&lines[index].as_str()) {
        index += 1;
    }
    (index, Some(banner))
}

struct FooterScan {
    footer: usize,
    signature_at: Option<usize>,
    photo_marker_at: Option<usize>,
}

/// One past the last narrative line, never above `header`.
fn footer_index(lines: &[String], header: usize) -> FooterScan {
    let mut footer: Option<usize> = None;
    let mut signature_at = None;

    for i in (header..lines.len()).rev() {
        let line = lines[i].as_str();
        match footer {
            None if is_signature(line) => {
                tracing::trace!("Signature '{}' ends the story", line);
                signature_at = Some(i);
                footer = Some(i);
                break;
            }
            None => {
                if FOOTER_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
                    footer = Some(i);
                }
            }
            Some(_) => {
                if FILLER_LINES.contains(&line) {
                    footer = Some(i);
                } else {
                    break;
                }
            }
        }
    }

    // The photo section outranks whatever boilerplate follows it.
    let photo_marker_at = (header..lines.len()).rev().find(|&i| is_photo_marker(&lines[i]));
    if let Some(i) = photo_marker_at {
        footer = Some(i);
    }

    FooterScan {
        footer: footer.unwrap_or(lines.len()),
        signature_at,
        photo_marker_at,
    }
}

fn is_photo_marker(line: &str) -> bool {
    let lower = line.to_lowercase();
    PHOTO_MARKERS.iter().any(|marker| lower.starts_with(marker))
}

/// A line ending with one of the regular authors' surnames.
pub fn is_signature(line: &str) -> bool {
    if line.contains(NOT_A_SIGNATURE) {
        return false;
    }
    SIGNATURE_NAMES.iter().any(|name| line.ends_with(name))
}
