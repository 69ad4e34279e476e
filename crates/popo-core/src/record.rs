//! Bulletin record types.

use crate::error::Error;
use serde::{Serialize, Serializer};
use std::fmt;

/// One extracted field: either a genuine value or a diagnostic explaining
/// why the value could not be obtained.
///
/// Callers see both variants as a plain string, so the record keeps the same
/// shape whether acquisition fully succeeded or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Value(String),
    Diagnostic(String),
}

impl FieldValue {
    pub fn value(value: impl Into<String>) -> Self {
        FieldValue::Value(value.into())
    }

    /// Build a diagnostic. An empty message is replaced so that a diagnostic
    /// always carries an explanation.
    pub fn diagnostic(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            FieldValue::Diagnostic("no explanation available".to_string())
        } else {
            FieldValue::Diagnostic(message)
        }
    }

    pub fn from_error(err: &Error) -> Self {
        Self::diagnostic(err.to_string())
    }

    pub fn is_value(&self) -> bool {
        matches!(self, FieldValue::Value(_))
    }

    pub fn is_diagnostic(&self) -> bool {
        matches!(self, FieldValue::Diagnostic(_))
    }

    /// The text shown to callers: the value or the diagnostic.
    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Value(s) | FieldValue::Diagnostic(s) => s,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Names of the five extracted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Phase,
    PlumeDirection,
    Exhalations,
    TremorMinutes,
    Explosions,
}

impl FieldName {
    pub const ALL: [FieldName; 5] = [
        FieldName::Phase,
        FieldName::PlumeDirection,
        FieldName::Exhalations,
        FieldName::TremorMinutes,
        FieldName::Explosions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Phase => "phase",
            FieldName::PlumeDirection => "plumeDirection",
            FieldName::Exhalations => "exhalations",
            FieldName::TremorMinutes => "tremorMinutes",
            FieldName::Explosions => "explosions",
        }
    }

    /// Human wording used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            FieldName::Phase => "alert phase",
            FieldName::PlumeDirection => "plume direction",
            FieldName::Exhalations => "exhalation",
            FieldName::TremorMinutes => "tremor minutes",
            FieldName::Explosions => "explosion",
        }
    }

    /// Whether the field comes from the teaser article rather than the full report.
    pub fn is_teaser_field(&self) -> bool {
        matches!(
            self,
            FieldName::Exhalations | FieldName::TremorMinutes | FieldName::Explosions
        )
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for FieldName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phase" => Ok(FieldName::Phase),
            "plumedirection" | "directionofplume" => Ok(FieldName::PlumeDirection),
            "exhalations" => Ok(FieldName::Exhalations),
            "tremorminutes" => Ok(FieldName::TremorMinutes),
            "explosions" => Ok(FieldName::Explosions),
            _ => Err(Error::UnknownField(s.to_string())),
        }
    }
}

/// The extracted content of one daily bulletin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRecord {
    pub phase: FieldValue,
    pub plume_direction: FieldValue,
    pub exhalations: FieldValue,
    pub tremor_minutes: FieldValue,
    pub explosions: FieldValue,
}

impl DataRecord {
    /// Build a record by computing each field in turn.
    pub fn from_fn(mut value: impl FnMut(FieldName) -> FieldValue) -> Self {
        Self {
            phase: value(FieldName::Phase),
            plume_direction: value(FieldName::PlumeDirection),
            exhalations: value(FieldName::Exhalations),
            tremor_minutes: value(FieldName::TremorMinutes),
            explosions: value(FieldName::Explosions),
        }
    }

    /// A record where every field carries the same diagnostic.
    pub fn all_diagnostic(err: &Error) -> Self {
        let diagnostic = FieldValue::from_error(err);
        Self::from_fn(|_| diagnostic.clone())
    }

    pub fn field(&self, name: FieldName) -> &FieldValue {
        match name {
            FieldName::Phase => &self.phase,
            FieldName::PlumeDirection => &self.plume_direction,
            FieldName::Exhalations => &self.exhalations,
            FieldName::TremorMinutes => &self.tremor_minutes,
            FieldName::Explosions => &self.explosions,
        }
    }

    /// Number of fields holding a genuine value.
    pub fn resolved_count(&self) -> usize {
        FieldName::ALL
            .iter()
            .filter(|name| self.field(**name).is_value())
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.resolved_count() == FieldName::ALL.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_diagnostic_is_replaced() {
        let diag = FieldValue::diagnostic("  ");
        assert!(diag.is_diagnostic());
        assert!(!diag.as_str().trim().is_empty());
    }

    #[test]
    fn test_record_serializes_as_plain_strings() {
        let record = DataRecord {
            phase: FieldValue::value("Phase 2"),
            plume_direction: FieldValue::value("North East"),
            exhalations: FieldValue::value("15"),
            tremor_minutes: FieldValue::diagnostic("could not find tremor minutes data"),
            explosions: FieldValue::value("3"),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "phase": "Phase 2",
                "plumeDirection": "North East",
                "exhalations": "15",
                "tremorMinutes": "could not find tremor minutes data",
                "explosions": "3",
            })
        );
        assert_eq!(record.resolved_count(), 4);
        assert!(!record.is_complete());
    }

    #[test]
    fn test_field_name_parsing() {
        assert_eq!("phase".parse::<FieldName>().unwrap(), FieldName::Phase);
        assert_eq!(
            "directionOfPlume".parse::<FieldName>().unwrap(),
            FieldName::PlumeDirection
        );
        assert_eq!(
            "TREMORMINUTES".parse::<FieldName>().unwrap(),
            FieldName::TremorMinutes
        );
        assert!("volcanotectonic".parse::<FieldName>().is_err());
    }

    #[test]
    fn test_all_diagnostic_fills_every_field() {
        let date = chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let record = DataRecord::all_diagnostic(&Error::ArticleNotFound(date));
        for name in FieldName::ALL {
            assert!(record.field(name).is_diagnostic());
        }
    }

    #[test]
    fn test_from_fn_places_each_field() {
        let record = DataRecord::from_fn(|name| {
            if name.is_teaser_field() {
                FieldValue::value(name.as_str())
            } else {
                FieldValue::diagnostic(name.label())
            }
        });
        assert_eq!(record.tremor_minutes, FieldValue::value("tremorMinutes"));
        assert_eq!(record.explosions, FieldValue::value("explosions"));
        assert_eq!(record.plume_direction, FieldValue::diagnostic("plume direction"));
        assert_eq!(record.resolved_count(), 3);
    }
}
