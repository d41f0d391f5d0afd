// src/publish/year_page.rs
use crate::publish::content::escape_html;
use crate::wordpress::models::WP_DATE_FORMAT;
use chrono::{Datelike, NaiveDateTime};
use std::fmt::Write as _;

/// One line of the year overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLink {
    pub event_number: usize,
    pub title: String,
    pub link: String,
    pub date: String,
}

/// `" (D.M.)"` from a WordPress timestamp, empty when there is none or it
/// does not parse.
pub fn format_iso_date(iso_date: &str) -> String {
    if iso_date.is_empty() {
        return String::new();
    }
    match NaiveDateTime::parse_from_str(iso_date, WP_DATE_FORMAT) {
        Ok(dt) => format!(" ({}.{}.)", dt.day(), dt.month()),
        Err(e) => {
            tracing::warn!("Unparsable post date {}: {}", iso_date, e);
            String::new()
        }
    }
}

fn write_column(page: &mut String, heading: &str, width: &str, events: &[EventLink]) {
    let _ = writeln!(page, "              <td width=\"{}\">", width);
    let _ = writeln!(page, "                <h4><strong>{}</strong></h4>", heading);
    page.push_str("                <p>\n");
    for item in events {
        // titles come from the API already rendered
        let _ = writeln!(
            page,
            "                  {}. <a href=\"{}\">{}{}</a><br />",
            item.event_number,
            escape_html(&item.link),
            item.title,
            item.date
        );
    }
    page.push_str("                </p>\n");
    page.push_str("              </td>\n");
}

/// Two-column table of planned and off-plan events.
pub fn render_year_page(planned: &[EventLink], off_plan: &[EventLink]) -> String {
    let mut page = String::from(
        "<table width=\"100%\">\n  <tbody>\n    <tr>\n      <td>\n        <table width=\"100%\">\n          <tbody>\n            <tr>\n",
    );
    write_column(&mut page, "Plánované akcie", "50%", planned);
    write_column(&mut page, "Akcie mimo plánu", "49%", off_plan);
    page.push_str("            </tr>\n          </tbody>\n        </table>\n      </td>\n    </tr>\n  </tbody>\n</table>\n");
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_day_and_month() {
        assert_eq!(format_iso_date("2012-05-07T00:00:00"), " (7.5.)");
        assert_eq!(format_iso_date(""), "");
        assert_eq!(format_iso_date("7.5.2012"), "");
    }

    #[test]
    fn renders_both_columns() {
        let planned = vec![EventLink {
            event_number: 1,
            title: "Kriváň".into(),
            link: "https://klub.example.sk/?p=5".into(),
            date: " (7.5.)".into(),
        }];
        let page = render_year_page(&planned, &[]);
        assert!(page.contains("1. <a href=\"https://klub.example.sk/?p=5\">Kriváň (7.5.)</a><br />"));
        assert!(page.contains("<h4><strong>Akcie mimo plánu</strong></h4>"));
        let planned_at = page.find("Plánované akcie").unwrap();
        let off_plan_at = page.find("Akcie mimo plánu").unwrap();
        assert!(planned_at < off_plan_at);
    }
}
