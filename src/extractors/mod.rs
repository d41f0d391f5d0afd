// src/extractors/mod.rs
pub mod boundary;
pub mod dates;
pub mod normalize;
pub mod photos;
pub mod year_index;
