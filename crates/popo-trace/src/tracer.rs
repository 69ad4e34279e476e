//! Subscriber initialization and configuration.

use opentelemetry::trace::TracerProvider;
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource, runtime,
    trace::{RandomIdGenerator, Sampler},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Failed to initialize tracer: {0}")]
    Init(String),
    #[error("Invalid log filter: {0}")]
    Filter(String),
}

/// OTLP exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OtlpConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for OtlpConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4317".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub filter: String,
    pub format: LogFormat,
    pub service_name: String,
    pub service_version: String,
    pub sample_rate: f64,
    /// OTLP export is off unless an exporter is configured.
    pub otlp: Option<OtlpConfig>,
    pub resource_attributes: HashMap<String, String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Text,
            service_name: "popo".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            sample_rate: 1.0,
            otlp: None,
            resource_attributes: HashMap::new(),
        }
    }
}

impl TracingConfig {
    fn env_filter(&self) -> Result<EnvFilter, TracerError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.filter).map_err(|e| TracerError::Filter(e.to_string())),
        }
    }

    fn sampler(&self) -> Sampler {
        if self.sample_rate >= 1.0 {
            Sampler::AlwaysOn
        } else if self.sample_rate <= 0.0 {
            Sampler::AlwaysOff
        } else {
            Sampler::TraceIdRatioBased(self.sample_rate)
        }
    }
}

/// Install the global subscriber for the given configuration.
///
/// Must be called from within a Tokio runtime when OTLP export is enabled.
pub fn init_tracer(config: &TracingConfig) -> Result<(), TracerError> {
    let env_filter = config.env_filter()?;

    match &config.otlp {
        Some(otlp_config) => {
            let provider = build_provider(config, otlp_config)?;
            let tracer = provider.tracer("popo");
            global::set_tracer_provider(provider);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer(config.format))
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()
                .map_err(|e| TracerError::Init(e.to_string()))
        }
        None => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer(config.format))
            .try_init()
            .map_err(|e| TracerError::Init(e.to_string())),
    }
}

fn fmt_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Text => fmt::layer().with_target(true).with_thread_ids(true).boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed(),
    }
}

fn build_resource(config: &TracingConfig) -> Resource {
    let mut attrs = vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", config.service_version.clone()),
    ];

    for (key, value) in &config.resource_attributes {
        attrs.push(KeyValue::new(key.clone(), value.clone()));
    }

    Resource::new(attrs)
}

fn build_provider(
    config: &TracingConfig,
    otlp_config: &OtlpConfig,
) -> Result<opentelemetry_sdk::trace::TracerProvider, TracerError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&otlp_config.endpoint)
        .with_timeout(std::time::Duration::from_secs(otlp_config.timeout_seconds))
        .build()
        .map_err(|e| TracerError::Init(e.to_string()))?;

    Ok(opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_sampler(config.sampler())
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(build_resource(config))
        .build())
}

/// Shutdown the tracer and flush remaining spans.
pub fn shutdown_tracer() {
    global::shutdown_tracer_provider();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.filter, "info");
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.service_name, "popo");
        assert!(config.otlp.is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: TracingConfig = serde_yaml::from_str("format: json\notlp: {}\n").unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.filter, "info");
        assert_eq!(
            config.otlp.map(|o| o.endpoint),
            Some("http://localhost:4317".to_string())
        );
    }

    #[test]
    fn test_sampler_bounds() {
        let mut config = TracingConfig::default();
        assert!(matches!(config.sampler(), Sampler::AlwaysOn));
        config.sample_rate = 0.0;
        assert!(matches!(config.sampler(), Sampler::AlwaysOff));
        config.sample_rate = 0.25;
        assert!(matches!(config.sampler(), Sampler::TraceIdRatioBased(_)));
    }
}
