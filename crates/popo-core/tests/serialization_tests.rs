//! Serialization tests for popo-core types.

use chrono::NaiveDate;
use popo_core::extract;
use popo_core::ports::Locator;
use popo_core::{DataRecord, DateKey, Error, FieldName, FieldValue};
use pretty_assertions::assert_eq;

fn record_from_texts(teaser: &str, alert: &str, direction: &str) -> DataRecord {
    DataRecord {
        phase: extract::phase(alert),
        plume_direction: extract::plume_direction(direction),
        exhalations: extract::exhalations(teaser),
        tremor_minutes: extract::tremor_minutes(teaser),
        explosions: extract::explosions(teaser),
    }
}

#[test]
fn test_extracted_record_serializes_flat() {
    let record = record_from_texts(
        "se identificaron 33 exhalaciones, dos explosiones y 245 minutos de tremor",
        "Amarillo Fase 2",
        "oeste-suroeste",
    );

    let json = serde_json::to_string(&record).expect("serialize");
    assert_eq!(
        json,
        r#"{"phase":"Phase 2","plumeDirection":"West South West","exhalations":"33","tremorMinutes":"245","explosions":"2"}"#
    );
    assert!(record.is_complete());
}

#[test]
fn test_diagnostics_serialize_in_place_of_values() {
    let date = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");
    let mut record = DataRecord::all_diagnostic(&Error::ArticleNotFound(date));
    record.phase = FieldValue::value("Phase 1");

    let json = serde_json::to_value(&record).expect("serialize");
    let object = json.as_object().expect("object");
    assert_eq!(object.len(), FieldName::ALL.len());
    assert_eq!(object["phase"], "Phase 1");
    assert_eq!(object["explosions"], "No bulletin article found for 2023-01-01");
    assert_eq!(record.resolved_count(), 1);
}

#[test]
fn test_date_key_is_transparent() {
    let key = DateKey::from_ymd(2025, 10, 6).expect("valid date");
    assert_eq!(serde_json::to_string(&key).expect("serialize"), r#""2025-10-06""#);

    let parsed: DateKey = serde_json::from_str(r#""2025-10-06""#).expect("deserialize");
    assert_eq!(parsed, key);
}

#[test]
fn test_locator_yaml_style_config() {
    let json = r#"[
        {"kind": "css", "selector": "article a", "contains": "Continuar leyendo"},
        {"kind": "after_heading", "heading": "h4", "heading_text": "Alerta", "target": "p"}
    ]"#;
    let locators: Vec<Locator> = serde_json::from_str(json).expect("deserialize");
    assert_eq!(
        locators,
        vec![
            Locator::css_containing("article a", "Continuar leyendo"),
            Locator::after_heading("h4", "Alerta", "p"),
        ]
    );
}
