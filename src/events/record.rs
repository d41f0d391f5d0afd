// src/events/record.rs
use crate::config::EventRegistry;
use crate::extractors::photos::EventPhoto;
use crate::utils::error::{EventError, ValidationRule};
use chrono::NaiveDate;
use serde::Serialize;

const MIN_YEAR: i32 = 1990;
const MAX_EVENT_NUMBER: u32 = 50;
const MIN_TITLE_CHARS: usize = 3;
const MIN_NARRATIVE_LINES: usize = 2;

/// An event as assembled from its files, not yet checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub year: i32,
    pub number: u32,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub narrative: String,
    pub photos: Vec<EventPhoto>,
    pub is_planned: bool,
    pub signature: Option<String>,
}

impl EventDraft {
    /// `year:number t:title d:date c:chars p:photos`, for error messages.
    pub fn summary(&self) -> String {
        summarize(self.year, self.number, &self.title, self.date, &self.narrative, self.photos.len())
    }

    /// Checks the field invariants. `without_photos` lists the events that may
    /// have no photos at all.
    pub fn validate(self, without_photos: &EventRegistry) -> Result<EventRecord, EventError> {
        if let Some(rule) = self.broken_rule(without_photos) {
            return Err(EventError::Validation {
                summary: self.summary(),
                rule,
            });
        }

        Ok(EventRecord {
            year: self.year,
            number: self.number,
            title: self.title,
            date: self.date,
            narrative: self.narrative,
            photos: self.photos,
            is_planned: self.is_planned,
            signature: self.signature,
        })
    }

    fn broken_rule(&self, without_photos: &EventRegistry) -> Option<ValidationRule> {
        if self.year < MIN_YEAR {
            return Some(ValidationRule::Year(self.year));
        }
        if !(1..=MAX_EVENT_NUMBER).contains(&self.number) {
            return Some(ValidationRule::Number(self.number));
        }
        if self.title.chars().count() < MIN_TITLE_CHARS {
            return Some(ValidationRule::Title(self.title.clone()));
        }
        let lines = self.narrative.lines().filter(|line| !line.trim().is_empty()).count();
        if lines < MIN_NARRATIVE_LINES {
            return Some(ValidationRule::NarrativeLines(lines));
        }
        if self.photos.is_empty() && !without_photos.contains(self.year, self.number, self.is_planned) {
            return Some(ValidationRule::Photos(self.photos.len()));
        }
        None
    }
}

/// A validated event, ready to be stored or published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    year: i32,
    number: u32,
    title: String,
    date: Option<NaiveDate>,
    narrative: String,
    photos: Vec<EventPhoto>,
    is_planned: bool,
    signature: Option<String>,
}

impl EventRecord {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    pub fn photos(&self) -> &[EventPhoto] {
        &self.photos
    }

    pub fn is_planned(&self) -> bool {
        self.is_planned
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }
}

impl std::fmt::Display for EventRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&summarize(
            self.year,
            self.number,
            &self.title,
            self.date,
            &self.narrative,
            self.photos.len(),
        ))
    }
}

fn summarize(year: i32, number: u32, title: &str, date: Option<NaiveDate>, narrative: &str, photos: usize) -> String {
    let date = date.map(|d| d.to_string()).unwrap_or_else(|| "None".to_string());
    format!("{}:{} t:{} d:{} c:{} p:{}", year, number, title, date, narrative.chars().count(), photos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn photo() -> EventPhoto {
        EventPhoto {
            number: 1,
            file_name: "a.jpg".into(),
            path: PathBuf::from("/tmp/a.jpg"),
            caption: "popis".into(),
        }
    }

    fn draft() -> EventDraft {
        EventDraft {
            year: 2015,
            number: 20,
            title: "Výlet".into(),
            date: NaiveDate::from_ymd_opt(2015, 6, 5),
            narrative: "prvý riadok\ndruhý riadok".into(),
            photos: vec![photo()],
            is_planned: true,
            signature: None,
        }
    }

    fn rule(result: Result<EventRecord, EventError>) -> ValidationRule {
        match result {
            Err(EventError::Validation { rule, .. }) => rule,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn valid_draft_becomes_record() {
        let record = draft().validate(&EventRegistry::new()).unwrap();
        assert_eq!(record.year(), 2015);
        assert_eq!(record.title(), "Výlet");
        assert_eq!(record.photos().len(), 1);
        assert_eq!(record.to_string(), "2015:20 t:Výlet d:2015-06-05 c:24 p:1");
    }

    #[test]
    fn title_needs_three_characters() {
        let mut two = draft();
        two.title = "Ba".into();
        assert_eq!(rule(two.validate(&EventRegistry::new())), ValidationRule::Title("Ba".into()));

        let mut three = draft();
        three.title = "Bač".into();
        assert!(three.validate(&EventRegistry::new()).is_ok());
    }

    #[test]
    fn photo_exemption_applies_to_listed_events_only() {
        let exempt: EventRegistry = [(2015, 19)].into_iter().collect();

        let mut nineteen = draft();
        nineteen.number = 19;
        nineteen.photos.clear();
        assert!(nineteen.validate(&exempt).is_ok());

        let mut twenty = draft();
        twenty.photos.clear();
        assert_eq!(rule(twenty.validate(&exempt)), ValidationRule::Photos(0));
    }

    #[test]
    fn photo_exemption_keeps_planned_and_off_plan_apart() {
        let exempt: EventRegistry = [(2015, 19)].into_iter().collect();

        let mut off_plan = draft();
        off_plan.number = 19;
        off_plan.is_planned = false;
        off_plan.photos.clear();
        assert_eq!(rule(off_plan.clone().validate(&exempt)), ValidationRule::Photos(0));

        let mut exempt_off_plan = EventRegistry::new();
        exempt_off_plan.insert(2015, 19, false);
        assert!(off_plan.validate(&exempt_off_plan).is_ok());
    }

    #[test]
    fn checks_year_number_and_narrative() {
        let mut old = draft();
        old.year = 1989;
        assert_eq!(rule(old.validate(&EventRegistry::new())), ValidationRule::Year(1989));

        for number in [0, 51] {
            let mut bad = draft();
            bad.number = number;
            assert_eq!(rule(bad.validate(&EventRegistry::new())), ValidationRule::Number(number));
        }

        let mut short = draft();
        short.narrative = "jediný riadok\n   \n".into();
        assert_eq!(rule(short.validate(&EventRegistry::new())), ValidationRule::NarrativeLines(1));
    }

    #[test]
    fn validation_error_carries_summary() {
        let mut bad = draft();
        bad.photos.clear();
        let err = bad.validate(&EventRegistry::new()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("2015:20 t:Výlet"), "{}", message);
        assert!(message.contains("Num of photos 0"), "{}", message);
    }
}
