//! Search URL rendering.
//!
//! Templates use `${{ name }}` placeholders. Unknown placeholders are a
//! configuration error rather than silently rendering as empty.

use chrono::{Datelike, NaiveDate};
use popo_core::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\{\s*([^}]+?)\s*\}\}").expect("placeholder pattern is valid")
});

/// Values available to a search URL template.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub day: String,
    pub month: String,
    pub year: String,
    /// Already URL-encoded.
    pub query: String,
}

impl SearchParams {
    /// Parameters for a one-day search window on `date`.
    pub fn for_date(date: NaiveDate, query_term: &str) -> Self {
        Self {
            day: format!("{:02}", date.day()),
            month: format!("{:02}", date.month()),
            year: format!("{:04}", date.year()),
            query: url::form_urlencoded::byte_serialize(query_term.as_bytes()).collect(),
        }
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        match name {
            "day" => Some(&self.day),
            "month" => Some(&self.month),
            "year" => Some(&self.year),
            "query" => Some(&self.query),
            _ => None,
        }
    }
}

/// Substitute every placeholder in `template`.
pub fn render(template: &str, params: &SearchParams) -> Result<String> {
    let mut unknown = None;
    let rendered = PLACEHOLDER.replace_all(template, |caps: &regex::Captures| {
        let name = caps.get(1).map_or("", |m| m.as_str());
        match params.resolve(name) {
            Some(value) => value.to_string(),
            None => {
                unknown.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match unknown {
        Some(name) => Err(Error::Config(format!(
            "unknown placeholder '{name}' in search URL template"
        ))),
        None => Ok(rendered.into_owned()),
    }
}

/// Render and validate the search URL for `date`.
pub fn search_url(template: &str, query_term: &str, date: NaiveDate) -> Result<Url> {
    let rendered = render(template, &SearchParams::for_date(date, query_term))?;
    Url::parse(&rendered)
        .map_err(|e| Error::Config(format!("invalid search URL '{rendered}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_render_zero_pads_and_encodes() {
        let params = SearchParams::for_date(date(2023, 1, 5), "Popocatépetl");
        let rendered = render(
            "https://example.test/s?from=${{ day }}/${{month}}/${{ year }}&q=${{ query }}",
            &params,
        )
        .unwrap();
        assert_eq!(
            rendered,
            "https://example.test/s?from=05/01/2023&q=Popocat%C3%A9petl"
        );
    }

    #[test]
    fn test_unknown_placeholder_is_config_error() {
        let params = SearchParams::for_date(date(2023, 1, 5), "x");
        let err = render("https://example.test/?h=${{ hour }}", &params).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("hour")));
    }

    #[test]
    fn test_default_template_produces_valid_url() {
        let config = crate::ScrapeConfig::default();
        let url = search_url(&config.search_url_template, &config.query_term, date(2022, 12, 31))
            .unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("fechaInicio".to_string(), "31/12/2022".to_string())));
        assert!(pairs.contains(&("fechaFin".to_string(), "31/12/2022".to_string())));
        assert!(pairs.contains(&("q".to_string(), "Popocatépetl".to_string())));
    }

    #[test]
    fn test_invalid_base_is_reported() {
        assert!(search_url("not a url ${{ day }}", "x", date(2023, 1, 1)).is_err());
    }
}
