//! Parsing of caller-supplied dates.

use crate::error::Error;
use crate::normalize;
use chrono::NaiveDate;

/// Accepted numeric and abbreviated-month layouts, tried in order.
const FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%Y", "%d/%m/%Y", "%d %b %Y", "%d-%m-%Y"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateInputError {
    #[error("You must enter a date")]
    Missing,
    #[error("Please enter a valid date in the form dd-MMM-YYYY such as 01-JAN-2023")]
    Unrecognized(String),
}

impl From<DateInputError> for Error {
    fn from(err: DateInputError) -> Self {
        match err {
            DateInputError::Missing => Error::InvalidDate(err.to_string()),
            DateInputError::Unrecognized(input) => Error::InvalidDate(input),
        }
    }
}

/// Parse a date as typed by a caller: `2023-01-01`, `01-JAN-2023`,
/// `01/01/2023` or `01 de Enero de 2023`.
pub fn parse_date_input(input: &str) -> Result<NaiveDate, DateInputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DateInputError::Missing);
    }

    FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .or_else(|| normalize::parse_spanish_date(input))
        .ok_or_else(|| DateInputError::Unrecognized(input.to_string()))
}
