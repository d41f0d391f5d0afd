// src/publish/content.rs
use crate::events::EventRecord;
use crate::extractors::normalize::decode_markup;
use std::fmt::Write as _;

const BULLET_MARKERS: [char; 4] = ['-', '*', '•', '–'];

/// Lines that continue a list or introduce one stay together with `<br />`.
fn is_list_line(line: &str) -> bool {
    line.starts_with(|c: char| BULLET_MARKERS.contains(&c)) || line.ends_with(':')
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Post body for an event: the narrative as paragraphs, the author line and
/// a gallery of the uploaded images.
pub fn render_body(record: &EventRecord, image_ids: &[u64]) -> String {
    let mut body = String::new();

    for line in record.narrative().lines().map(str::trim).filter(|l| !l.is_empty()) {
        let escaped = escape_html(&decode_markup(line));
        if is_list_line(line) {
            let _ = writeln!(body, "{}<br />", escaped);
        } else {
            let _ = writeln!(body, "<p>{}</p>", escaped);
        }
    }

    if let Some(signature) = record.signature() {
        let _ = writeln!(body, "<p><em>{}</em></p>", escape_html(&decode_markup(signature)));
    }

    if !image_ids.is_empty() {
        let ids: Vec<String> = image_ids.iter().map(u64::to_string).collect();
        let _ = writeln!(body, "[gallery ids=\"{}\"]", ids.join(","));
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventRegistry;
    use crate::events::record::EventDraft;

    fn record(narrative: &str, signature: Option<&str>) -> EventRecord {
        let mut exempt = EventRegistry::new();
        exempt.insert(2011, 4, true);
        EventDraft {
            year: 2011,
            number: 4,
            title: "Vysoké Tatry".into(),
            date: None,
            narrative: narrative.into(),
            photos: Vec::new(),
            is_planned: true,
            signature: signature.map(str::to_string),
        }
        .validate(&exempt)
        .unwrap()
    }

    #[test]
    fn paragraphs_and_list_lines() {
        let body = render_body(&record("Účastníci:\n- Jano\n- Fero\nPočasie <super> & teplo.", None), &[]);
        assert_eq!(
            body,
            "Účastníci:<br />\n- Jano<br />\n- Fero<br />\n<p>Počasie &lt;super&gt; &amp; teplo.</p>\n"
        );
    }

    #[test]
    fn normalized_entities_are_escaped_once() {
        let body = render_body(&record("cesta &lt;Kriváň&gt;\nA &amp;amp; B", None), &[]);
        assert_eq!(body, "<p>cesta &lt;Kriváň&gt;</p>\n<p>A &amp;amp; B</p>\n");
    }

    #[test]
    fn signature_and_gallery() {
        let body = render_body(&record("ráno\nvečer", Some("Ján Kraic")), &[11, 12, 15]);
        assert!(body.ends_with("<p><em>Ján Kraic</em></p>\n[gallery ids=\"11,12,15\"]\n"));
        assert!(body.starts_with("<p>ráno</p>\n<p>večer</p>\n"));
    }
}
