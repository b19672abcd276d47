//! Event context extraction.
//!
//! Derives two signals from the free-text fields of a calendar event: an
//! occasion bucket for outfit generation, and a best-effort destination city
//! for weather lookups. Both are pure functions over in-memory strings and
//! are recomputed on every read; nothing here is persisted.

mod destination;
mod occasion;

pub use destination::extract_destination;
pub use occasion::{classify_occasion, Occasion};
