//! End-to-end pipeline runs over the HTTP driver against a fake bulletin site.

use chrono::NaiveDate;
use popo_core::{DataRecord, Error, FieldValue};
use popo_scraper::{HttpDriver, ScrapeConfig, ScrapePipeline};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH_TEMPLATE: &str =
    "/archivo/articulos?fechaInicio=${{ day }}/${{ month }}/${{ year }}&q=${{ query }}";

const SEARCH_PAGE: &str = r#"<html><body>
  <article>
    <h2>Reporte del monitoreo de CENAPRED del volcán Popocatépetl</h2>
    <a href="/articulos/reporte-popocatepetl">Continuar leyendo</a>
  </article>
</body></html>"#;

const EMPTY_SEARCH_PAGE: &str = r#"<html><body><p>No se encontraron resultados</p></body></html>"#;

const TEASER_PAGE: &str = r#"<html><body>
  <div class="article-body">
    <p>En las últimas 24 horas se identificaron 26 exhalaciones, acompañadas de vapor
    de agua y gases. Además, se registraron dos explosiones y 1,284 minutos de tremor.</p>
    <p><strong>Para ver el reporte completo:</strong> <a href="/reporte/completo">aquí</a></p>
  </div>
</body></html>"#;

const TEASER_WITHOUT_REPORT: &str = r#"<html><body>
  <div class="article-body">
    <p>Se identificaron 8 exhalaciones y 120 minutos de tremor.</p>
  </div>
</body></html>"#;

const REPORT_PAGE: &str = r#"<html><body>
  <div><h4>Semáforo de alerta volcánica</h4></div>
  <div><p><b>AMARILLO FASE 2</b></p></div>
  <div><h4>Dirección de la pluma</h4></div>
  <div><p><b>oeste-suroeste</b></p></div>
</body></html>"#;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 3, 7).unwrap()
}

fn pipeline(server: &MockServer) -> ScrapePipeline {
    let config = ScrapeConfig {
        search_url_template: server.uri() + SEARCH_PATH_TEMPLATE,
        wait_timeout_secs: 1,
        ..Default::default()
    };
    let driver = HttpDriver::new(&config).unwrap();
    ScrapePipeline::new(Arc::new(driver), config)
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_search(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/archivo/articulos"))
        .and(query_param("fechaInicio", "07/03/2023"))
        .and(query_param("q", "Popocatépetl"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_bulletin() {
    let server = MockServer::start().await;
    mount_search(&server, SEARCH_PAGE).await;
    mount_page(&server, "/articulos/reporte-popocatepetl", TEASER_PAGE).await;
    mount_page(&server, "/reporte/completo", REPORT_PAGE).await;

    let record = pipeline(&server).run(date()).await.unwrap();

    assert_eq!(
        record,
        DataRecord {
            phase: FieldValue::value("Phase 2"),
            plume_direction: FieldValue::value("West South West"),
            exhalations: FieldValue::value("26"),
            tremor_minutes: FieldValue::value("1284"),
            explosions: FieldValue::value("2"),
        }
    );
}

#[tokio::test]
async fn test_no_search_result_degrades_every_field() {
    let server = MockServer::start().await;
    mount_search(&server, EMPTY_SEARCH_PAGE).await;

    let record = pipeline(&server).run(date()).await.unwrap();

    assert_eq!(record, DataRecord::all_diagnostic(&Error::ArticleNotFound(date())));
    assert_eq!(record.resolved_count(), 0);
}

#[tokio::test]
async fn test_missing_report_link_keeps_counts() {
    let server = MockServer::start().await;
    mount_search(&server, SEARCH_PAGE).await;
    mount_page(&server, "/articulos/reporte-popocatepetl", TEASER_WITHOUT_REPORT).await;

    let record = pipeline(&server).run(date()).await.unwrap();

    assert_eq!(record.exhalations, FieldValue::value("8"));
    assert_eq!(record.tremor_minutes, FieldValue::value("120"));
    assert!(record.explosions.is_diagnostic());
    assert_eq!(record.phase.as_str(), "Full report not found");
    assert_eq!(record.plume_direction.as_str(), "Full report not found");
}

#[tokio::test]
async fn test_broken_report_page_only_affects_report_fields() {
    let server = MockServer::start().await;
    mount_search(&server, SEARCH_PAGE).await;
    mount_page(&server, "/articulos/reporte-popocatepetl", TEASER_PAGE).await;
    Mock::given(method("GET"))
        .and(path("/reporte/completo"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let record = pipeline(&server).run(date()).await.unwrap();

    assert_eq!(record.exhalations, FieldValue::value("26"));
    assert_eq!(record.explosions, FieldValue::value("2"));
    assert_eq!(record.phase.as_str(), "Full report not found");
}

#[tokio::test]
async fn test_unreachable_search_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = pipeline(&server).run(date()).await.unwrap_err();
    assert!(matches!(err, Error::SessionUnavailable(_)));
}
