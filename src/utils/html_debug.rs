// src/utils/html_debug.rs
use crate::extractors::boundary::BoundaryTrace;
use crate::extractors::normalize::decode_markup;
use crate::publish::content::escape_html;
use crate::utils::error::AppError;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// How a story line was classified by the boundary extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineRole {
    Header,
    Banner,
    TitleLine,
    Body,
    Signature,
    PhotoMarker,
    Footer,
}

impl LineRole {
    fn css_class(self) -> &'static str {
        match self {
            LineRole::Header => "highlight-header",
            LineRole::Banner => "highlight-start",
            LineRole::TitleLine => "highlight-custom",
            LineRole::Body => "highlight-body",
            LineRole::Signature => "highlight-signature",
            LineRole::PhotoMarker => "highlight-end",
            LineRole::Footer => "highlight-footer",
        }
    }
}

fn line_role(index: usize, trace: &BoundaryTrace) -> LineRole {
    if trace.banner_at == Some(index) {
        LineRole::Banner
    } else if trace.signature_at == Some(index) {
        LineRole::Signature
    } else if trace.photo_marker_at == Some(index) {
        LineRole::PhotoMarker
    } else if trace.title_line_stripped && index + 1 == trace.header {
        LineRole::TitleLine
    } else if index < trace.header {
        LineRole::Header
    } else if index < trace.footer {
        LineRole::Body
    } else {
        LineRole::Footer
    }
}

/// Renders the story lines with the boundary decisions highlighted.
/// Without a trace (the body came out empty) every line is shown plain.
pub fn render_debug_html(lines: &[String], trace: Option<&BoundaryTrace>) -> String {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");

    // CSS for highlight colors
    debug_html.push_str(".highlight-start { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-end { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-body { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-header, .highlight-footer { color: #888888; }\n");
    debug_html.push_str(".highlight-signature { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    if let Some(trace) = trace {
        let _ = writeln!(
            debug_html,
            "<p>header: {} footer: {} lines: {}</p>",
            trace.header,
            trace.footer,
            lines.len()
        );
    } else {
        debug_html.push_str("<p>story body is empty</p>\n");
    }

    debug_html.push_str("<ol start=\"0\">\n");
    for (index, line) in lines.iter().enumerate() {
        let role = trace.map(|trace| line_role(index, trace));
        let escaped = escape_html(&decode_markup(line));
        match role {
            Some(role) => {
                let _ = writeln!(
                    debug_html,
                    "<li><span class=\"{}\" title=\"{:?}\">{}</span></li>",
                    role.css_class(),
                    role,
                    escaped
                );
            }
            None => {
                let _ = writeln!(debug_html, "<li>{}</li>", escaped);
            }
        }
    }
    debug_html.push_str("</ol>\n</body>\n</html>");
    debug_html
}

/// Writes the annotated story to `filename`.
pub fn create_debug_html(lines: &[String], trace: Option<&BoundaryTrace>, filename: &Path) -> Result<(), AppError> {
    let mut file = File::create(filename)?;
    file.write_all(render_debug_html(lines, trace).as_bytes())?;

    tracing::info!("Saved debug HTML to {}", filename.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::boundary::extract_body;

    #[test]
    fn marks_each_line_with_its_role() {
        let lines: Vec<String> = ["Archív akcií", "Zápis z akcie 2", "a &lt; b", "text", "Ján Kraic", "pata"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let body = extract_body(&lines).unwrap();
        let html = render_debug_html(&lines, Some(&body.trace));

        assert!(html.contains("<span class=\"highlight-start\" title=\"Banner\">Archív akcií</span>"));
        assert!(html.contains("title=\"TitleLine\">Zápis z akcie 2</span>"));
        assert!(html.contains("<span class=\"highlight-body\" title=\"Body\">a &lt; b</span>"));
        assert!(html.contains("title=\"Signature\">Ján Kraic</span>"));
        assert!(html.contains("title=\"Footer\">pata</span>"));
    }

    #[test]
    fn writes_plain_lines_without_trace() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("story.html");
        create_debug_html(&["x".to_string()], None, &path).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("<li>x</li>"));
        assert!(html.contains("story body is empty"));
    }
}
