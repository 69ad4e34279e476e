//! Scrape configuration.

use popo_core::ports::Locator;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the acquisition pipeline and its HTTP driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Search URL with `${{ day }}`, `${{ month }}`, `${{ year }}` and
    /// `${{ query }}` placeholders.
    #[serde(default = "default_search_url_template")]
    pub search_url_template: String,
    #[serde(default = "default_query_term")]
    pub query_term: String,
    /// Upper bound for every wait on a page element.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,
    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub locators: SiteLocators,
}

fn default_search_url_template() -> String {
    "https://www.gob.mx/cenapred/archivo/articulos?idiom=es&filter_origin=archive\
     &fechaInicio=${{ day }}/${{ month }}/${{ year }}\
     &fechaFin=${{ day }}/${{ month }}/${{ year }}&q=${{ query }}"
        .to_string()
}

fn default_query_term() -> String {
    "Popocatépetl".to_string()
}

fn default_wait_timeout() -> u64 {
    10
}

fn default_page_load_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("popo/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            search_url_template: default_search_url_template(),
            query_term: default_query_term(),
            wait_timeout_secs: default_wait_timeout(),
            page_load_timeout_secs: default_page_load_timeout(),
            user_agent: default_user_agent(),
            locators: SiteLocators::default(),
        }
    }
}

impl ScrapeConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }
}

/// Where each stage finds its element on the bulletin site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteLocators {
    /// "Continue reading" link of the first search result.
    pub continue_reading: Locator,
    /// Body of the teaser article.
    pub article_body: Locator,
    /// Link from the teaser article to the full report.
    pub full_report_link: Locator,
    /// Alert-level value in the full report.
    pub alert_level: Locator,
    /// Plume-direction value in the full report.
    pub plume_direction: Locator,
}

impl Default for SiteLocators {
    fn default() -> Self {
        Self {
            continue_reading: Locator::css_containing("article a", "Continuar leyendo"),
            article_body: Locator::css("div.article-body"),
            full_report_link: Locator::after_heading(
                "strong",
                "Para ver el reporte completo",
                "a",
            ),
            alert_level: Locator::after_heading("h4", "Semáforo de alerta volcánica", "b"),
            plume_direction: Locator::after_heading("h4", "Dirección de la pluma", "p b"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ScrapeConfig::default();
        assert_eq!(config.wait_timeout(), Duration::from_secs(10));
        assert_eq!(config.query_term, "Popocatépetl");
        assert!(config.search_url_template.contains("fechaInicio=${{ day }}"));
        assert!(config.search_url_template.ends_with("&q=${{ query }}"));
    }

    #[test]
    fn test_partial_yaml_keeps_default_locators() {
        let yaml = r#"
wait_timeout_secs: 3
locators:
  article_body:
    kind: css
    selector: "section.body"
"#;
        let config: ScrapeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.wait_timeout_secs, 3);
        assert_eq!(config.locators.article_body, Locator::css("section.body"));
        assert_eq!(
            config.locators.continue_reading,
            SiteLocators::default().continue_reading
        );
    }
}
