// src/extractors/dates.rs
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

// `5.6.` style day.month with no year; the year comes from the archive.
static DAY_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\D)(\d{1,2})\.\s?(\d{1,2})\.").expect("Failed to compile DAY_MONTH_RE")
});

/// Finds the first `D.M.` in `text` that is a real calendar day of `year`.
pub fn extract_date(year: i32, text: &str) -> Option<NaiveDate> {
    for caps in DAY_MONTH_RE.captures_iter(text) {
        let day = caps[1].parse::<u32>().ok()?;
        let month = caps[2].parse::<u32>().ok()?;
        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => return Some(date),
            None => tracing::trace!("Ignoring impossible date {}.{}. in {}", day, month, year),
        }
    }
    None
}
