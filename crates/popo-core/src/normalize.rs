//! Static translation tables for bulletin text.
//!
//! Every table is a constant slice of `(source token, target value)` pairs.
//! Lookups never allocate for the table itself and the tests below check the
//! tables for size, uniqueness and coverage.

use chrono::NaiveDate;

/// Spanish compass points to English direction names.
///
/// Four cardinal, four intercardinal and eight secondary-intercardinal points.
pub const COMPASS_DIRECTIONS: &[(&str, &str)] = &[
    ("norte", "North"),
    ("sur", "South"),
    ("este", "East"),
    ("oeste", "West"),
    ("noreste", "North East"),
    ("noroeste", "North West"),
    ("sureste", "South East"),
    ("suroeste", "South West"),
    ("nor-noreste", "North North East"),
    ("nor-noroeste", "North North West"),
    ("sur-sureste", "South South East"),
    ("sur-suroeste", "South South West"),
    ("este-noreste", "East North East"),
    ("este-sureste", "East South East"),
    ("oeste-noroeste", "West North West"),
    ("oeste-suroeste", "West South West"),
];

/// Alert colour keywords to phase labels, in match priority order.
pub const ALERT_PHASES: &[(&str, &str)] = &[
    ("amarillo", "Phase 2"),
    ("verde", "Phase 1"),
    ("rojo", "Phase 3"),
];

/// Spelled-out Spanish numbers from one to twenty.
pub const SPANISH_NUMBERS: &[(&str, &str)] = &[
    ("uno", "1"),
    ("dos", "2"),
    ("tres", "3"),
    ("cuatro", "4"),
    ("cinco", "5"),
    ("seis", "6"),
    ("siete", "7"),
    ("ocho", "8"),
    ("nueve", "9"),
    ("diez", "10"),
    ("once", "11"),
    ("doce", "12"),
    ("trece", "13"),
    ("catorce", "14"),
    ("quince", "15"),
    ("dieciséis", "16"),
    ("diecisiete", "17"),
    ("dieciocho", "18"),
    ("diecinueve", "19"),
    ("veinte", "20"),
];

/// Spanish month names, January first.
pub const SPANISH_MONTHS: &[&str] = &[
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(source, _)| *source == key)
        .map(|(_, target)| *target)
}

/// Translate a compass token. Matching is exact after lower-casing, trimming
/// and removing whitespace around hyphens.
pub fn compass_direction(token: &str) -> Option<&'static str> {
    lookup(COMPASS_DIRECTIONS, &canonical_direction(token))
}

fn canonical_direction(token: &str) -> String {
    token
        .trim()
        .to_lowercase()
        .split('-')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("-")
}

/// Classify alert-level text by colour keyword. First keyword found wins.
pub fn alert_phase(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    ALERT_PHASES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, phase)| *phase)
}

/// Normalize a count token: a digit run is returned without thousands
/// separators, a spelled-out number from one to twenty is translated.
pub fn count_token(token: &str) -> Option<String> {
    let token = token.trim();
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        let digits = token.replace([',', '.'], "");
        return digits.chars().all(|c| c.is_ascii_digit()).then_some(digits);
    }
    lookup(SPANISH_NUMBERS, &token.to_lowercase()).map(str::to_string)
}

/// Month number for a Spanish month name.
pub fn spanish_month(name: &str) -> Option<u32> {
    let lower = name.trim().to_lowercase();
    SPANISH_MONTHS
        .iter()
        .position(|month| *month == lower)
        .map(|idx| idx as u32 + 1)
}

/// Parse a Spanish long-form date such as `06 de Octubre de 2025`.
pub fn parse_spanish_date(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    match parts.as_slice() {
        [day, de1, month, de2, year]
            if de1.eq_ignore_ascii_case("de") && de2.eq_ignore_ascii_case("de") =>
        {
            let day: u32 = day.parse().ok()?;
            let month = spanish_month(month)?;
            let year: i32 = year.parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
        _ => None,
    }
}
