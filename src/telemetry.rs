//! Optional trace export
//!
//! When Langfuse or a generic OTLP endpoint is configured, `tracing` spans from
//! this crate are bridged to OpenTelemetry and sent over OTLP/HTTP. Export runs
//! on the batch processor's own thread and never fails a turn.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{Array, StringValue, Value};
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{Level, Subscriber};
use tracing_opentelemetry::OpenTelemetrySpanExt;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;
use uuid::Uuid;

use crate::config::EnvLookup;
use crate::error::{AgentError, Result};

pub const LANGFUSE_HOST_ENV: &str = "LANGFUSE_HOST";
pub const LANGFUSE_PUBLIC_KEY_ENV: &str = "LANGFUSE_PUBLIC_KEY";
pub const LANGFUSE_SECRET_KEY_ENV: &str = "LANGFUSE_SECRET_KEY";
pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
pub const OTLP_HEADERS_ENV: &str = "OTEL_EXPORTER_OTLP_HEADERS";

const SERVICE_NAME: &str = "agent-builder";
const TRACED_TARGET: &str = "agent_builder";
const EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to send traces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Full traces URL, ending in `/v1/traces`
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
}

impl TelemetryConfig {
    /// Resolve from Langfuse settings first, then the generic OTLP variables
    pub fn from_env(lookup: EnvLookup<'_>) -> Option<Self> {
        if let Some(host) = lookup(LANGFUSE_HOST_ENV) {
            let public = lookup(LANGFUSE_PUBLIC_KEY_ENV).unwrap_or_default();
            let secret = lookup(LANGFUSE_SECRET_KEY_ENV).unwrap_or_default();
            if public.is_empty() || secret.is_empty() {
                tracing::warn!("LANGFUSE_HOST is set but the Langfuse keys are missing; traces will be rejected");
            }
            let auth = BASE64.encode(format!("{public}:{secret}"));
            return Some(Self {
                endpoint: format!("{}/api/public/otel/v1/traces", host.trim_end_matches('/')),
                headers: vec![("Authorization".to_string(), format!("Basic {auth}"))],
            });
        }

        let endpoint = lookup(OTLP_ENDPOINT_ENV)?;
        Some(Self {
            endpoint: format!("{}/v1/traces", endpoint.trim_end_matches('/')),
            headers: lookup(OTLP_HEADERS_ENV)
                .map(|h| parse_headers(&h))
                .unwrap_or_default(),
        })
    }

    /// Variables exported so child processes report to the same collector
    pub fn child_env(&self) -> Vec<(&'static str, String)> {
        let base = self
            .endpoint
            .strip_suffix("/v1/traces")
            .unwrap_or(&self.endpoint)
            .to_string();
        let headers = self
            .headers
            .iter()
            .map(|(k, v)| format!("{k}={}", v.replace(' ', "%20")))
            .collect::<Vec<_>>()
            .join(",");

        vec![(OTLP_ENDPOINT_ENV, base), (OTLP_HEADERS_ENV, headers)]
    }
}

/// Parse `k=v,k=v` header lists; `%20` is decoded to a space
fn parse_headers(value: &str) -> Vec<(String, String)> {
    value
        .split(',')
        .filter_map(|pair| {
            let (key, val) = pair.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), val.trim().replace("%20", " ")))
        })
        .collect()
}

/// Session attributes attached to each invocation span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceAttributes {
    pub session_id: String,
    pub user_id: String,
    pub tags: Vec<String>,
}

impl TraceAttributes {
    /// Attributes for a new session with a random UUID
    pub fn new_session(lookup: EnvLookup<'_>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            user_id: lookup("USER").unwrap_or_else(|| format!("{SERVICE_NAME}-user")),
            tags: vec![SERVICE_NAME.to_string()],
        }
    }

    /// Attach the session attributes to `span`
    pub fn apply(&self, span: &tracing::Span) {
        span.set_attribute("session.id", self.session_id.clone());
        span.set_attribute("user.id", self.user_id.clone());
        let tags: Vec<StringValue> = self.tags.iter().cloned().map(StringValue::from).collect();
        span.set_attribute("langfuse.tags", Value::Array(Array::String(tags)));
    }
}

/// OTLP trace pipeline; shut down on drop so queued spans are sent
pub struct Telemetry {
    provider: SdkTracerProvider,
}

impl Telemetry {
    /// Build an OTLP/HTTP exporter for `config` behind a batch span processor
    pub fn init(config: &TelemetryConfig) -> Result<Self> {
        // reqwest's blocking client must not be built on a runtime thread
        let client = std::thread::spawn(|| {
            reqwest::blocking::Client::builder()
                .timeout(EXPORT_TIMEOUT)
                .build()
        })
        .join()
        .map_err(|_| AgentError::config("Trace exporter client could not be built"))??;

        let headers: HashMap<String, String> = config.headers.iter().cloned().collect();
        let exporter = SpanExporter::builder()
            .with_http()
            .with_http_client(client)
            .with_protocol(Protocol::HttpBinary)
            .with_endpoint(config.endpoint.clone())
            .with_headers(headers)
            .with_timeout(EXPORT_TIMEOUT)
            .build()
            .map_err(|e| AgentError::config(format!("Trace exporter: {e}")))?;

        let provider = SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(Resource::builder().with_service_name(SERVICE_NAME).build())
            .build();

        tracing::debug!(endpoint = %config.endpoint, "Trace export enabled");
        Ok(Self { provider })
    }

    /// Layer that turns this crate's spans into OpenTelemetry spans
    pub fn layer<S>(&self) -> impl Layer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        tracing_opentelemetry::layer()
            .with_tracer(self.provider.tracer(SERVICE_NAME))
            .with_filter(Targets::new().with_target(TRACED_TARGET, Level::INFO))
    }

    /// Export everything queued so far
    pub fn flush(&self) {
        if let Err(e) = self.provider.force_flush() {
            tracing::warn!("Trace export failed: {e}");
        }
    }
}

impl Drop for Telemetry {
    fn drop(&mut self) {
        if let Err(e) = self.provider.shutdown() {
            tracing::warn!("Trace export shutdown failed: {e}");
        }
    }
}



#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_langfuse_config() {
        let vars = lookup_from(&[
            (LANGFUSE_HOST_ENV, "https://cloud.langfuse.com/"),
            (LANGFUSE_PUBLIC_KEY_ENV, "pk"),
            (LANGFUSE_SECRET_KEY_ENV, "sk"),
            (OTLP_ENDPOINT_ENV, "http://ignored:4318"),
        ]);
        let config = TelemetryConfig::from_env(&|k: &str| vars.get(k).cloned()).unwrap();

        assert_eq!(config.endpoint, "https://cloud.langfuse.com/api/public/otel/v1/traces");
        assert_eq!(
            config.headers,
            vec![("Authorization".to_string(), format!("Basic {}", BASE64.encode("pk:sk")))]
        );
    }

    #[test]
    fn test_otlp_config() {
        let vars = lookup_from(&[
            (OTLP_ENDPOINT_ENV, "http://localhost:4318"),
            (OTLP_HEADERS_ENV, "x-api-key=abc, Authorization=Bearer%20tok,broken"),
        ]);
        let config = TelemetryConfig::from_env(&|k: &str| vars.get(k).cloned()).unwrap();

        assert_eq!(config.endpoint, "http://localhost:4318/v1/traces");
        assert_eq!(config.headers.len(), 2);
        assert_eq!(config.headers[1].1, "Bearer tok");
    }

    #[test]
    fn test_no_telemetry() {
        assert!(TelemetryConfig::from_env(&|_: &str| -> Option<String> { None }).is_none());
    }

    #[test]
    fn test_child_env() {
        let config = TelemetryConfig {
            endpoint: "http://collector:4318/v1/traces".to_string(),
            headers: vec![("Authorization".to_string(), "Basic abc".to_string())],
        };
        let env: HashMap<_, _> = config.child_env().into_iter().collect();
        assert_eq!(env[OTLP_ENDPOINT_ENV], "http://collector:4318");
        assert_eq!(env[OTLP_HEADERS_ENV], "Authorization=Basic%20abc");
    }

    #[test]
    fn test_init_accepts_unreachable_endpoint() {
        let config = TelemetryConfig {
            endpoint: "http://127.0.0.1:9/v1/traces".to_string(),
            headers: vec![],
        };
        let telemetry = Telemetry::init(&config).unwrap();
        // Nothing queued, so nothing to send
        telemetry.flush();
    }
}
