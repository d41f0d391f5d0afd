// src/extractors/year_index.rs
use crate::extractors::normalize::decode_entities;
use once_cell::sync::Lazy;
use regex::Regex;

/// Number reserved for the `cakcie=KT` link of the yearly listing.
pub const KT_EVENT_NUMBER: u32 = 50;

// href, link text, and whatever plain text trails the link on its line
static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']?([^"'\s>]+)["']?[^>]*>(.*?)</a>([^<\n]*)"#)
        .expect("Failed to compile ANCHOR_RE")
});
static EVENT_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)cakcie=(\d+|KT)\b").expect("Failed to compile EVENT_ID_RE")
});
static INNER_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").expect("Failed to compile INNER_TAG_RE")
});
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RE")
});

const EVENT_DETAIL_PATH: &str = "akciadet";
const OFF_PLAN_PATHS: [&str; 2] = ["mimoplan", "akciemp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearIndexEntry {
    pub number: u32,
    pub title: String,
    /// Link text plus the text after the link, where the date usually is.
    pub raw_date_hint: String,
    pub is_planned: bool,
}

/// Lists the events linked from a year page.
///
/// Ordered by zero-padded event number, planned events before off-plan ones;
/// entries with equal keys keep their document order.
pub fn read_year(index_html: &str, year: i32) -> Vec<YearIndexEntry> {
    let mut entries = Vec::new();

    for caps in ANCHOR_RE.captures_iter(index_html) {
        let href = &caps[1];
        if !href.to_lowercase().contains(EVENT_DETAIL_PATH) {
            continue;
        }
        let Some(id) = EVENT_ID_RE.captures(href) else {
            tracing::debug!("{}: event link without id: {}", year, href);
            continue;
        };

        let number = if id[1].eq_ignore_ascii_case("KT") {
            KT_EVENT_NUMBER
        } else {
            match id[1].parse::<u32>() {
                Ok(number) => number,
                Err(_) => {
                    tracing::warn!("{}: unreadable event id in {}", year, href);
                    continue;
                }
            }
        };

        let lower_href = href.to_lowercase();
        let is_planned = !OFF_PLAN_PATHS.iter().any(|path| lower_href.contains(path));

        let title = clean_text(&caps[2]);
        let trailing = clean_text(&caps[3]);
        let raw_date_hint = if trailing.is_empty() {
            title.clone()
        } else {
            format!("{} {}", title, trailing)
        };

        tracing::trace!("{}: event {} '{}' planned={}", year, number, title, is_planned);
        entries.push(YearIndexEntry {
            number,
            title,
            raw_date_hint,
            is_planned,
        });
    }

    entries.sort_by_key(|entry| (!entry.is_planned, format!("{:02}", entry.number)));
    tracing::debug!("{}: {} events in year index", year, entries.len());
    entries
}

fn clean_text(raw: &str) -> String {
    let text = INNER_TAG_RE.replace_all(raw, "");
    let text = decode_entities(&text);
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"
<table><tr><td>
<a href="akciadet.php?rok=2012&cakcie=10">Bratislava&nbsp;&ndash; Devín</a> (12.5.)<br>
<a href="akciadet.php?rok=2012&cakcie=2">Zimn&yacute; prechod</a> (14.1.)<br>
<a href="../index.html">Domov</a>
<a href='akciadet.php?rok=2012&cakcie=KT'><b>Klubové</b> tábory</a><br>
<a href="akciemp/akciadet.php?rok=2012&cakcie=1">Spontánny výlet</a>
<a href="akciadet.php?rok=2012&cakcie=7">Vrch&nbsp;Zobor</a>
</td></tr></table>
"#;

    #[test]
    fn reads_links_in_number_order() {
        let entries = read_year(INDEX, 2012);
        let numbers: Vec<(u32, bool)> = entries.iter().map(|e| (e.number, e.is_planned)).collect();
        assert_eq!(numbers, vec![(2, true), (7, true), (10, true), (KT_EVENT_NUMBER, true), (1, false)]);
    }

    #[test]
    fn decodes_titles_and_keeps_date_hints() {
        let entries = read_year(INDEX, 2012);
        let devin = entries.iter().find(|e| e.number == 10).unwrap();
        assert_eq!(devin.title, "Bratislava – Devín");
        assert_eq!(devin.raw_date_hint, "Bratislava – Devín (12.5.)");

        let zobor = entries.iter().find(|e| e.number == 7).unwrap();
        assert_eq!(zobor.title, "Vrch Zobor");
        assert_eq!(zobor.raw_date_hint, "Vrch Zobor");

        let kt = entries.iter().find(|e| e.number == KT_EVENT_NUMBER).unwrap();
        assert_eq!(kt.title, "Klubové tábory");
    }

    #[test]
    fn ignores_unrelated_links() {
        let entries = read_year("<a href=\"index.html\">Domov</a><a href=\"akciadet.php\">bez id</a>", 2012);
        assert!(entries.is_empty());
    }

    #[test]
    fn equal_numbers_keep_document_order() {
        let html = "<a href=\"akciadet.php?cakcie=3\">prvá</a>\n<a href=\"akciadet.php?cakcie=3\">druhá</a>";
        let titles: Vec<String> = read_year(html, 2011).into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["prvá", "druhá"]);
    }
}
