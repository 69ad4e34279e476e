//! Field extractors.
//!
//! Each extractor takes raw text surfaced by a pipeline stage and returns a
//! [`FieldValue`]: the normalized value, or a diagnostic explaining the miss.
//! Extractors never fail and never return an empty string.

use crate::error::{Error, Result};
use crate::normalize;
use crate::record::{FieldName, FieldValue};
use regex::Regex;
use std::sync::LazyLock;

// A digit run, optionally with thousands separators ("1,234" or "1.234").
const DIGITS: &str = r"(\d{1,3}(?:[,.]\d{3})+|\d+)";

static EXHALATIONS: LazyLock<Regex> = LazyLock::new(|| count_pattern("exhalaciones"));
static TREMOR_MINUTES: LazyLock<Regex> = LazyLock::new(|| count_pattern("minutos"));
static EXPLOSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b({DIGITS}|\p{{L}}+)\s+explosiones\b"))
        .expect("explosion pattern is valid")
});

fn count_pattern(unit: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{DIGITS}\s+{unit}\b")).expect("count pattern is valid")
}

fn into_field(result: Result<String>) -> FieldValue {
    match result {
        Ok(value) => FieldValue::value(value),
        Err(err) => FieldValue::from_error(&err),
    }
}

/// Tokens of `pattern` in `text`, skipping matches that start inside a
/// larger number (`1,5 minutos` must not read as `5`).
fn tokens<'t>(pattern: &'t Regex, text: &'t str) -> impl Iterator<Item = &'t str> {
    pattern.captures_iter(text).filter_map(move |caps| {
        let token = caps.get(1)?;
        let inside_number = text[..token.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c == ',' || c == '.' || c.is_ascii_digit());
        (!inside_number).then_some(token.as_str())
    })
}

fn find_count(pattern: &Regex, text: &str, field: FieldName) -> Result<String> {
    tokens(pattern, text)
        .next()
        .and_then(normalize::count_token)
        .ok_or(Error::FieldNotFound(field))
}

/// Extract `field` from the text its stage surfaced.
pub fn field(field: FieldName, text: &str) -> FieldValue {
    match field {
        FieldName::Phase => phase(text),
        FieldName::PlumeDirection => plume_direction(text),
        FieldName::Exhalations => exhalations(text),
        FieldName::TremorMinutes => tremor_minutes(text),
        FieldName::Explosions => explosions(text),
    }
}

/// Exhalation count from the teaser text (`15 exhalaciones` → `15`).
pub fn exhalations(text: &str) -> FieldValue {
    into_field(find_count(&EXHALATIONS, text, FieldName::Exhalations))
}

/// Tremor minutes from the teaser text (`53 minutos` → `53`).
pub fn tremor_minutes(text: &str) -> FieldValue {
    into_field(find_count(&TREMOR_MINUTES, text, FieldName::TremorMinutes))
}

/// Explosion count from the teaser text. The token before `explosiones` may
/// be a digit run or a spelled-out number from one to twenty.
pub fn explosions(text: &str) -> FieldValue {
    into_field(find_explosions(text))
}

fn find_explosions(text: &str) -> Result<String> {
    let mut first_unmapped = None;
    for token in tokens(&EXPLOSIONS, text) {
        match normalize::count_token(token) {
            Some(count) => return Ok(count),
            None => {
                first_unmapped.get_or_insert(token);
            }
        }
    }

    match first_unmapped {
        Some(token) => Err(Error::FieldNotRecognized {
            field: FieldName::Explosions,
            detail: format!("unrecognized count '{token}'"),
        }),
        None => Err(Error::FieldNotFound(FieldName::Explosions)),
    }
}

/// Alert phase from the alert-level text of the full report.
pub fn phase(alert_text: &str) -> FieldValue {
    into_field(
        normalize::alert_phase(alert_text)
            .map(str::to_string)
            .ok_or_else(|| Error::FieldNotRecognized {
                field: FieldName::Phase,
                detail: format!("no alert colour in '{}'", alert_text.trim()),
            }),
    )
}

/// Plume direction from the direction text of the full report.
///
/// Known compass tokens are translated; anything else is passed through
/// verbatim since the source text may already be meaningful.
pub fn plume_direction(token: &str) -> FieldValue {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return FieldValue::from_error(&Error::FieldNotFound(FieldName::PlumeDirection));
    }
    match normalize::compass_direction(trimmed) {
        Some(direction) => FieldValue::value(direction),
        None => FieldValue::value(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEASER: &str = "En las últimas 24 horas, mediante los sistemas de monitoreo \
        del volcán Popocatépetl se identificaron 15 exhalaciones, acompañadas de vapor \
        de agua y gases volcánicos. Además, se registraron tres explosiones y 1,123 \
        minutos de tremor de baja amplitud.";

    #[test]
    fn test_counts_from_teaser() {
        assert_eq!(exhalations(TEASER), FieldValue::value("15"));
        assert_eq!(tremor_minutes(TEASER), FieldValue::value("1123"));
        assert_eq!(explosions(TEASER), FieldValue::value("3"));
    }

    #[test]
    fn test_count_pattern_is_case_insensitive() {
        assert_eq!(exhalations("... 42 Exhalaciones ..."), FieldValue::value("42"));
        assert_eq!(tremor_minutes("1.440 minutos"), FieldValue::value("1440"));
        assert_eq!(explosions("... 7 EXPLOSIONES ..."), FieldValue::value("7"));
        assert_eq!(explosions("... Dieciocho explosiones ..."), FieldValue::value("18"));
    }

    #[test]
    fn test_separated_counts_agree() {
        let text = "1,200 exhalaciones, 1,200 explosiones y 1.200 minutos";
        assert_eq!(exhalations(text), FieldValue::value("1200"));
        assert_eq!(explosions(text), FieldValue::value("1200"));
        assert_eq!(tremor_minutes(text), FieldValue::value("1200"));
    }

    #[test]
    fn test_fractional_counts_are_not_truncated() {
        assert!(tremor_minutes("1,5 minutos de tremor").is_diagnostic());
        assert!(explosions("2.5 explosiones").is_diagnostic());
        assert_eq!(
            tremor_minutes("1,5 horas, es decir 90 minutos"),
            FieldValue::value("90")
        );
    }

    #[test]
    fn test_missing_counts_yield_diagnostics() {
        let text = "Sin actividad relevante.";
        for value in [exhalations(text), tremor_minutes(text), explosions(text)] {
            assert!(value.is_diagnostic());
            assert!(!value.as_str().is_empty());
        }
        assert_eq!(
            exhalations(text).as_str(),
            "Could not find exhalation data"
        );
    }

    #[test]
    fn test_unmapped_explosion_token() {
        let value = explosions("no se registraron explosiones");
        assert!(value.is_diagnostic());
        assert!(value.as_str().contains("registraron"));

        // A later mappable token still wins.
        let value = explosions("las explosiones de ayer; hoy hubo dos explosiones");
        assert_eq!(value, FieldValue::value("2"));
    }

    #[test]
    fn test_explosion_table_is_closed() {
        assert!(explosions("veintiuno explosiones").is_diagnostic());
        assert_eq!(explosions("veinte explosiones"), FieldValue::value("20"));
    }

    #[test]
    fn test_phase() {
        assert_eq!(phase("Amarillo Fase 2"), FieldValue::value("Phase 2"));
        assert_eq!(phase("VERDE"), FieldValue::value("Phase 1"));
        assert_eq!(phase("Rojo Fase 3"), FieldValue::value("Phase 3"));

        let missing = phase("sin datos");
        assert!(missing.is_diagnostic());
        assert!(missing.as_str().contains("sin datos"));
    }

    #[test]
    fn test_plume_direction() {
        assert_eq!(plume_direction("noreste"), FieldValue::value("North East"));
        assert_eq!(plume_direction("Oeste-Suroeste"), FieldValue::value("West South West"));
        assert_eq!(plume_direction("diagonal"), FieldValue::value("diagonal"));
        assert!(plume_direction("   ").is_diagnostic());
    }
}
