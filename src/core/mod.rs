//! Place data: records, keyword tables, classification, loading, statistics.

pub mod catalog;
pub mod classify;
pub mod place;
pub mod stats;
pub mod store;
