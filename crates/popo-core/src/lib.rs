//! Popo Core
//!
//! Domain types, translation tables, field extractors and port traits for the
//! Popocatépetl bulletin service. This crate has minimal dependencies and
//! defines the shared vocabulary used across all other crates.

pub mod dates;
pub mod error;
pub mod extract;
pub mod ids;
pub mod normalize;
pub mod ports;
pub mod record;

pub use dates::{DateInputError, parse_date_input};
pub use error::{Error, Result};
pub use ids::DateKey;
pub use record::{DataRecord, FieldName, FieldValue};
