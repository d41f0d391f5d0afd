// src/publish/mod.rs
pub mod content;
pub mod gallery;
pub mod importer;
pub mod year_page;

pub use importer::Importer;
