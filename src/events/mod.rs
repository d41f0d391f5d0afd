// src/events/mod.rs
pub mod builder;
pub mod record;
pub mod year;

pub use builder::EventRequest;
pub use record::EventRecord;
pub use year::YearLoader;
