// src/events/year.rs
use crate::config::ArchiveConfig;
use crate::events::builder::{EventBuilder, EventRequest};
use crate::events::record::EventRecord;
use crate::extractors::year_index::read_year;
use crate::utils::error::EventError;
use std::fs;

/// Outcome of one year: the accepted records and every event that failed.
#[derive(Debug, Default)]
pub struct YearReport {
    pub year: i32,
    pub records: Vec<EventRecord>,
    pub failures: Vec<EventError>,
    pub skipped: Vec<u32>,
}

/// Walks a year index and builds its events one by one.
pub struct YearLoader<'a> {
    config: &'a ArchiveConfig,
    builder: EventBuilder<'a>,
}

impl<'a> YearLoader<'a> {
    pub fn new(config: &'a ArchiveConfig) -> Self {
        Self {
            config,
            builder: EventBuilder::new(config),
        }
    }

    pub fn builder(&self) -> &EventBuilder<'a> {
        &self.builder
    }

    /// Every event the year index lists, registry skips included.
    pub fn requests(&self, year: i32) -> Result<Vec<EventRequest>, EventError> {
        let path = self.config.year_index_path(year);
        if !path.exists() {
            return Err(EventError::MissingYearIndex { year, path });
        }
        let bytes = fs::read(&path).map_err(|source| EventError::Io {
            year,
            number: 0,
            path: path.clone(),
            source,
        })?;
        let index = String::from_utf8_lossy(&bytes);

        Ok(read_year(&index, year)
            .iter()
            .map(|entry| EventRequest::from_index(year, entry))
            .collect())
    }

    /// A failed event is logged and collected, the rest of the year still runs.
    /// Only a missing year index fails the whole call.
    pub fn load(&self, year: i32) -> Result<YearReport, EventError> {
        let mut report = YearReport {
            year,
            ..YearReport::default()
        };

        for request in self.requests(year)? {
            if self.config.skipped_events.contains(year, request.number, request.is_planned) {
                tracing::info!("Skipping event {}:{} ({})", year, request.number, request.title);
                report.skipped.push(request.number);
                continue;
            }

            match self.builder.build(&request) {
                Ok(record) => report.records.push(record),
                Err(err) => {
                    tracing::error!("Event {}:{} failed: {}", year, request.number, err);
                    report.failures.push(err);
                }
            }
        }

        tracing::info!(
            "Year {}: {} events built, {} failed, {} skipped",
            year,
            report.records.len(),
            report.failures.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}
