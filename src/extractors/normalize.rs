// src/extractors/normalize.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// --- Regex Patterns (Lazy Static) ---
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z][a-zA-Z0-9]{1,31});")
        .expect("Failed to compile ENTITY_RE")
});

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->").expect("Failed to compile COMMENT_RE")
});

// MS Word leaves style attributes all over the story markup, sometimes with the
// tag split over several lines so that only its tail sits on a line.
static STYLE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^<>]*(?:margin-bottom|:justify|font-)[^<>]*>?")
        .expect("Failed to compile STYLE_TAG_RE")
});
static STYLE_TAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[^<>\n]*(?:margin-bottom|:justify|font-)[^<>]*>")
        .expect("Failed to compile STYLE_TAIL_RE")
});

static SPAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<span[^>]*>?|</span>").expect("Failed to compile SPAN_RE")
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^<>]*>").expect("Failed to compile TAG_RE")
});
static UNTERMINATED_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[a-zA-Z/!][^<>]*\z").expect("Failed to compile UNTERMINATED_TAG_RE")
});

static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s*\n").expect("Failed to compile BLANK_LINES_RE")
});

const CONDITIONAL_START: &str = "[if gte ";
const CONDITIONAL_END: &str = "<![endif]";
// Documents this short are usually a handful of huge lines.
const SHORT_DOCUMENT_LINES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityPass {
    /// Everything except the characters that would turn text into markup.
    Text,
    /// Only `<`, `>` and `&`, decoded when the text leaves the pipeline.
    Markup,
}

/// Turns a legacy story document into plain text.
///
/// A chain of lossy textual rewrites rather than a DOM transform: the story
/// files are too broken for a parser to keep their line structure, and the
/// boundary heuristics downstream are line based. Never fails.
///
/// `&lt;`, `&gt;` and `&amp;` stay escaped so the output is stable under
/// another pass; [`decode_markup`] turns them into characters for display.
pub fn normalize(raw: &str) -> String {
    let mut text = split_long_lines(raw);
    text = strip_conditional_block(&text);
    text = decode_pass(&text, EntityPass::Text);
    text = COMMENT_RE.replace_all(&text, "").into_owned();
    text = text.replace("<!--", "");
    text = STYLE_TAG_RE.replace_all(&text, "").into_owned();
    text = STYLE_TAIL_RE.replace_all(&text, "").into_owned();
    text = SPAN_RE.replace_all(&text, "").into_owned();
    // removing `<x>` from `<<x>>` leaves a new tag behind
    while TAG_RE.is_match(&text) {
        text = TAG_RE.replace_all(&text, "").into_owned();
    }
    text = UNTERMINATED_TAG_RE.replace_all(&text, "").into_owned();
    BLANK_LINES_RE.replace_all(&text, "\n\n").into_owned()
}

/// Decodes every entity this archive uses, including `&lt;`, `&gt;`, `&amp;`.
pub fn decode_entities(text: &str) -> String {
    let text = decode_pass(text, EntityPass::Text);
    decode_markup(&text)
}

/// Decodes the `&lt;`, `&gt;` and `&amp;` that [`normalize`] leaves in place.
pub fn decode_markup(text: &str) -> String {
    decode_pass(text, EntityPass::Markup)
}

fn split_long_lines(raw: &str) -> String {
    let lines = raw.lines().count();
    let mut text = raw.to_string();
    if lines == 1 {
        text = text.replace("div>", "div>\n");
    }
    if lines <= SHORT_DOCUMENT_LINES {
        text = text.replace("<p>", "\n<p>");
    }
    text
}

/// Drops the lines from the first `[if gte ` up to the last `<![endif]`.
fn strip_conditional_block(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|line| line.contains(CONDITIONAL_START));
    let end = lines.iter().rposition(|line| line.contains(CONDITIONAL_END));

    match (start, end) {
        (Some(start), Some(end)) if end >= start => {
            tracing::trace!("Dropping conditional block, lines {}..={}", start, end);
            lines[..start]
                .iter()
                .chain(lines[end + 1..].iter())
                .copied()
                .collect::<Vec<_>>()
                .join("\n")
        }
        _ => text.to_string(),
    }
}

fn decode_pass(text: &str, pass: EntityPass) -> String {
    let decoded = ENTITY_RE.replace_all(text, |caps: &Captures| {
        match resolve_entity(&caps[1]) {
            Some(ch) if is_markup_char(ch) == (pass == EntityPass::Markup) => ch.to_string(),
            _ => caps[0].to_string(),
        }
    });
    match pass {
        EntityPass::Text => decoded.replace('\u{a0}', " "),
        EntityPass::Markup => decoded.into_owned(),
    }
}

fn is_markup_char(ch: char) -> bool {
    matches!(ch, '<' | '>' | '&')
}

fn resolve_entity(body: &str) -> Option<char> {
    if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(numeric_char);
    }
    if let Some(dec) = body.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(numeric_char);
    }
    named_entity(body)
}

fn numeric_char(code: u32) -> Option<char> {
    match code {
        0xa0 => Some(' '),
        _ => char::from_u32(code),
    }
}

fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        "nbsp" => ' ',
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "bdquo" => '„',
        "ldquo" => '“',
        "rdquo" => '”',
        "sbquo" => '‚',
        "lsquo" => '‘',
        "rsquo" => '’',
        "laquo" => '«',
        "raquo" => '»',
        "deg" => '°',
        "copy" => '©',
        "middot" => '·',
        "bull" => '•',
        "times" => '×',
        "euro" => '€',
        // Slovak and Czech letters
        "aacute" => 'á',
        "Aacute" => 'Á',
        "auml" => 'ä',
        "Auml" => 'Ä',
        "ccaron" => 'č',
        "Ccaron" => 'Č',
        "dcaron" => 'ď',
        "Dcaron" => 'Ď',
        "eacute" => 'é',
        "Eacute" => 'É',
        "ecaron" => 'ě',
        "Ecaron" => 'Ě',
        "iacute" => 'í',
        "Iacute" => 'Í',
        "lacute" => 'ĺ',
        "Lacute" => 'Ĺ',
        "lcaron" => 'ľ',
        "Lcaron" => 'Ľ',
        "ncaron" => 'ň',
        "Ncaron" => 'Ň',
        "oacute" => 'ó',
        "Oacute" => 'Ó',
        "ocirc" => 'ô',
        "Ocirc" => 'Ô',
        "ouml" => 'ö',
        "Ouml" => 'Ö',
        "racute" => 'ŕ',
        "Racute" => 'Ŕ',
        "rcaron" => 'ř',
        "Rcaron" => 'Ř',
        "scaron" => 'š',
        "Scaron" => 'Š',
        "tcaron" => 'ť',
        "Tcaron" => 'Ť',
        "uacute" => 'ú',
        "Uacute" => 'Ú',
        "uring" => 'ů',
        "Uring" => 'Ů',
        "uuml" => 'ü',
        "Uuml" => 'Ü',
        "yacute" => 'ý',
        "Yacute" => 'Ý',
        "zcaron" => 'ž',
        "Zcaron" => 'Ž',
        _ => return None,
    };
    Some(ch)
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comment_blocks_and_keeps_lines() {
        let raw = "Archív akcií ...\n\nišli sme na výlet dňa 5.6.\npršalo\n<!--\npata\n-->";
        let text = normalize(raw);
        assert_eq!(text, "Archív akcií ...\n\nišli sme na výlet dňa 5.6.\npršalo\n");
    }

    #[test]
    fn normalize_is_idempotent() {
        let raw = "<html><body>\n<p style=\"margin-bottom: 0cm\">Prv&aacute; veta&nbsp;textu</p>\n\n\n\n\
                   <p><span lang=SK>druh&aacute;</span> veta &amp; <b>koniec</b></p>\n<!-- pata -->\n</body></html>";
        let once = normalize(raw);
        let twice = normalize(&once);
        assert_eq!(once, twice);
        assert!(once.contains("Prvá veta textu"));
        assert!(once.contains("druhá veta &amp; koniec"));
    }

    #[test]
    fn single_line_documents_break_after_divs() {
        let raw = "<div>prvy</div><div>druhy</div><div>treti</div>";
        let text = normalize(raw);
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(lines, vec!["prvy", "druhy", "treti"]);
    }

    #[test]
    fn short_documents_break_before_paragraphs() {
        let raw = "<p>prvy</p><p>druhy</p>";
        let text = normalize(raw);
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(lines, vec!["prvy", "druhy"]);
    }

    #[test]
    fn drops_office_conditional_block() {
        let raw = "uvod\n<!--[if gte mso 9]><xml>\n<w:WordDocument>\n</xml><![endif]-->\ntext po bloku\n";
        let text = normalize(raw);
        assert!(text.contains("uvod"));
        assert!(text.contains("text po bloku"));
        assert!(!text.contains("WordDocument"));
    }

    #[test]
    fn removes_style_fragments_split_over_lines() {
        let raw = "<p class=MsoNormal\nstyle='margin-bottom:0cm;text-align:justify'>Obsah</p>\nďalší riadok\nriadok 3\nriadok 4\nriadok 5\nriadok 6";
        let text = normalize(raw);
        assert!(!text.contains("margin-bottom"));
        assert!(!text.contains("justify"));
        assert!(text.contains("Obsah"));
    }

    #[test]
    fn tolerates_unterminated_tags() {
        let text = normalize("text pred\n<p class=\"x\"\n");
        assert_eq!(text.trim(), "text pred");
    }

    #[test]
    fn escaped_brackets_survive_as_text() {
        let text = normalize("a &lt;b&gt; c\nd\ne\nf\ng\nh");
        assert!(text.starts_with("a &lt;b&gt; c"));
        assert!(decode_markup(&text).starts_with("a <b> c"));
    }

    #[test]
    fn escaped_markup_is_stable_under_renormalizing() {
        for raw in [
            "cesta &lt;Kriváň&gt; bola dlhá\nnávrat\nd\ne\nf\ng",
            "A &amp;amp; B\nC\nd\ne\nf\ng",
            "x &#60;b&#62; y &amp;nbsp; z\n2\n3\n4\n5\n6",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input: {:?}", raw);
        }

        let once = normalize("cesta &lt;Kriváň&gt; bola dlhá\nnávrat\nd\ne\nf\ng");
        assert!(decode_markup(&once).starts_with("cesta <Kriváň> bola dlhá"));
        let once = normalize("A &amp;amp; B\nC\nd\ne\nf\ng");
        assert!(decode_markup(&once).starts_with("A &amp; B"));
    }

    #[test]
    fn nested_brackets_leave_no_tag_behind() {
        let raw = "a <<b>> c\n2\n3\n4\n5\n6";
        let once = normalize(raw);
        assert!(once.starts_with("a  c"));
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn decodes_numeric_and_named_entities() {
        assert_eq!(decode_entities("Poľana&#160;&scaron;tart &#x17E;"), "Poľana štart ž");
        assert_eq!(decode_entities("&unknown; &amp;"), "&unknown; &");
        assert_eq!(decode_entities("a\u{a0}b"), "a b");
    }

    #[test]
    fn collapses_blank_line_runs() {
        let text = normalize("a\n\n\n\n b\nc\nd\ne\nf");
        assert_eq!(text, "a\n\n b\nc\nd\ne\nf");
    }
}
