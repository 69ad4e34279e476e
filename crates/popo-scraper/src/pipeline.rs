//! The bulletin acquisition pipeline.
//!
//! A run walks five stages against one browsing session:
//!
//! 1. load the archive search for the date,
//! 2. follow the first "continue reading" link to the teaser article,
//! 3. read the teaser body (exhalations, tremor minutes, explosions),
//! 4. follow the teaser's link to the full report,
//! 5. read the alert level and plume direction from the full report.
//!
//! Only a failure in stage 1 fails the run. Later failures degrade the
//! fields that depend on the failed stage and leave the others intact.

use crate::config::ScrapeConfig;
use crate::template;
use async_trait::async_trait;
use chrono::NaiveDate;
use popo_core::ports::{
    BrowserDriver, BrowserSession, BulletinSource, ContextHandle, ContextTarget, Locator, NodeHandle,
};
use popo_core::{DataRecord, Error, FieldName, FieldValue, Result, extract};
use popo_trace::{scrape_span, stage_span};
use std::sync::Arc;
use tracing::{Instrument, debug, info, warn};

/// Raw texts read from the full report. Each is independently optional.
#[derive(Debug)]
pub struct ReportTexts {
    pub alert_level: Result<String>,
    pub plume_direction: Result<String>,
}

/// Build a record from what the stages surfaced.
///
/// `teaser` is the teaser body (stage 3) or the error explaining why it is
/// missing; `report` is the same for the full report (stages 4 and 5). The
/// teaser never affects phase or plume direction, and the report never
/// affects the three counts.
pub fn assemble_record(teaser: Result<String>, report: Result<ReportTexts>) -> DataRecord {
    DataRecord::from_fn(|field| match source_text(field, &teaser, &report) {
        Ok(text) => extract::field(field, text),
        Err(err) => FieldValue::from_error(err),
    })
}

/// The text `field` is extracted from, or the error that replaced it.
fn source_text<'a>(
    field: FieldName,
    teaser: &'a Result<String>,
    report: &'a Result<ReportTexts>,
) -> std::result::Result<&'a str, &'a Error> {
    if field.is_teaser_field() {
        return teaser.as_deref();
    }
    let texts = report.as_ref()?;
    if field == FieldName::Phase {
        texts.alert_level.as_deref()
    } else {
        texts.plume_direction.as_deref()
    }
}

/// Drives one browsing session per run through the bulletin site.
pub struct ScrapePipeline {
    driver: Arc<dyn BrowserDriver>,
    config: ScrapeConfig,
}

impl ScrapePipeline {
    pub fn new(driver: Arc<dyn BrowserDriver>, config: ScrapeConfig) -> Self {
        Self { driver, config }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Acquire the bulletin for `date`.
    ///
    /// Returns `Err` only when the search stage could not run at all.
    pub async fn run(&self, date: NaiveDate) -> Result<DataRecord> {
        async move {
            let search_url = template::search_url(
                &self.config.search_url_template,
                &self.config.query_term,
                date,
            )?;

            let mut session = self
                .driver
                .open_session()
                .await
                .map_err(|e| match e {
                    Error::SessionUnavailable(_) => e,
                    other => Error::SessionUnavailable(other.to_string()),
                })?;

            let result = self.run_stages(session.as_mut(), date, search_url.as_str()).await;

            if let Err(e) = session.close().await {
                debug!(error = %e, "Failed to close browsing session");
            }

            if let Ok(record) = &result {
                info!(
                    resolved = record.resolved_count(),
                    total = FieldName::ALL.len(),
                    "Bulletin acquired"
                );
            }
            result
        }
        .instrument(scrape_span(date))
        .await
    }

    async fn run_stages(
        &self,
        session: &mut dyn BrowserSession,
        date: NaiveDate,
        search_url: &str,
    ) -> Result<DataRecord> {
        let search = match tokio::time::timeout(
            self.config.page_load_timeout(),
            session.load_page(search_url),
        )
        .instrument(stage_span("search"))
        .await
        {
            Ok(loaded) => loaded
                .map_err(|e| Error::SessionUnavailable(format!("search page did not load: {e}")))?,
            Err(_) => {
                return Err(Error::SessionUnavailable(
                    "search page did not load in time".to_string(),
                ));
            }
        };

        let teaser_context = match self
            .follow(session, search, &self.config.locators.continue_reading)
            .instrument(stage_span("locate_teaser"))
            .await
        {
            Ok(context) => context,
            Err(e) => {
                warn!(%date, error = %e, "No teaser article in search results");
                return Ok(DataRecord::all_diagnostic(&Error::ArticleNotFound(date)));
            }
        };

        let teaser = self
            .read(session, teaser_context, &self.config.locators.article_body)
            .instrument(stage_span("read_teaser"))
            .await
            .map_err(|e| {
                warn!(%date, error = %e, "Teaser article body unreadable");
                Error::ArticleNotFound(date)
            });

        let report = match self
            .follow(session, teaser_context, &self.config.locators.full_report_link)
            .instrument(stage_span("locate_report"))
            .await
        {
            Ok(report_context) => Ok(self
                .read_report(session, report_context)
                .instrument(stage_span("read_report"))
                .await),
            Err(e) => {
                warn!(%date, error = %e, "Full report link missing");
                Err(Error::FullReportNotFound)
            }
        };

        Ok(assemble_record(teaser, report))
    }

    /// Wait for a link in `context`, follow it and switch to the new context.
    async fn follow(
        &self,
        session: &mut dyn BrowserSession,
        context: ContextHandle,
        locator: &Locator,
    ) -> Result<ContextHandle> {
        let link = self.wait(session, context, locator).await?;
        session.activate(&link).await?;
        session.switch_context(ContextTarget::MostRecent)
    }

    async fn read(
        &self,
        session: &mut dyn BrowserSession,
        context: ContextHandle,
        locator: &Locator,
    ) -> Result<String> {
        let node = self.wait(session, context, locator).await?;
        session.text_of(&node).await
    }

    /// Wait for `locator`, bounded here whether or not the driver honors the
    /// timeout it is handed.
    async fn wait(
        &self,
        session: &mut dyn BrowserSession,
        context: ContextHandle,
        locator: &Locator,
    ) -> Result<NodeHandle> {
        let timeout = self.config.wait_timeout();
        tokio::time::timeout(timeout, session.wait_until_actionable(context, locator, timeout))
            .await
            .unwrap_or_else(|_| {
                Err(Error::ElementNotFound {
                    locator: locator.to_string(),
                })
            })
    }

    async fn read_report(
        &self,
        session: &mut dyn BrowserSession,
        context: ContextHandle,
    ) -> ReportTexts {
        let locators = &self.config.locators;
        let alert_level = self
            .read(session, context, &locators.alert_level)
            .await
            .map_err(|e| Error::FieldNotRecognized {
                field: FieldName::Phase,
                detail: e.to_string(),
            });
        let plume_direction = self
            .read(session, context, &locators.plume_direction)
            .await
            .map_err(|e| Error::FieldNotRecognized {
                field: FieldName::PlumeDirection,
                detail: e.to_string(),
            });
        ReportTexts {
            alert_level,
            plume_direction,
        }
    }
}

#[async_trait]
impl BulletinSource for ScrapePipeline {
    async fn fetch(&self, date: NaiveDate) -> Result<DataRecord> {
        self.run(date).await
    }
}
