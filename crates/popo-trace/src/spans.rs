//! Span creation for bulletin acquisition.

use chrono::NaiveDate;
use tracing::{Level, Span, span};

/// Span covering one full scrape of the bulletin site for a date.
pub fn scrape_span(date: NaiveDate) -> Span {
    span!(
        Level::INFO,
        "scrape.run",
        bulletin.date = %date,
    )
}

/// Span for one pipeline stage inside a scrape.
pub fn stage_span(stage: &str) -> Span {
    span!(
        Level::INFO,
        "scrape.stage",
        stage = stage,
    )
}

/// Span for cache operations.
pub fn cache_span(operation: &str, key: &str) -> Span {
    span!(
        Level::DEBUG,
        "cache.operation",
        operation = operation,
        cache.key = key,
    )
}

/// Span for an inbound HTTP request, tagged with its request id.
pub fn request_span(method: &str, path: &str, request_id: &str) -> Span {
    span!(
        Level::INFO,
        "http.request",
        http.method = method,
        http.path = path,
        request.id = request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_are_disabled_without_subscriber() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        // No subscriber is installed in unit tests.
        assert!(scrape_span(date).is_disabled());
        assert!(stage_span("search").is_disabled());
        assert!(cache_span("get", "2025-10-06").is_disabled());
    }
}
