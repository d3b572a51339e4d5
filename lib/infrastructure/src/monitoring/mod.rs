pub mod meter;

use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{ExporterBuildError, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::error::Error;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

//KNOWN ISSUE: EnvFilter on layer-level drops statements of the bridged logger, hence one filter per layer

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitoringConfig {
    pub service_name: String,
    pub logs: EnvFilterConfig,
    #[serde(default)]
    pub format: LogFormat,
    pub otlp: Option<OtlpConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EnvFilterConfig {
    pub default_level: String,
    #[serde(default)]
    pub filters: Vec<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct OtlpConfig {
    pub url: Option<String>,
    #[serde(default = "default_metrics_interval_secs")]
    pub metrics_interval_secs: u64,
}

fn default_metrics_interval_secs() -> u64 {
    60
}

impl TryFrom<&EnvFilterConfig> for EnvFilter {
    type Error = tracing_subscriber::filter::ParseError;

    fn try_from(config: &EnvFilterConfig) -> Result<Self, Self::Error> {
        EnvFilter::builder()
            .with_default_directive(config.default_level.parse()?)
            .parse(config.filters.join(","))
    }
}

impl MonitoringConfig {
    pub fn init(&self) -> Result<(), Box<dyn Error>> {
        match &self.otlp {
            Some(otlp) => self.init_with_export(otlp),
            None => self.init_console_only(),
        }
    }

    fn init_console_only(&self) -> Result<(), Box<dyn Error>> {
        let filter = EnvFilter::try_from(&self.logs)?;
        let registry = tracing_subscriber::registry().with(filter);

        match self.format {
            LogFormat::Plain => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
            LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init()?,
        }

        Ok(())
    }

    fn init_with_export(&self, otlp: &OtlpConfig) -> Result<(), Box<dyn Error>> {
        let resource = Resource::builder()
            .with_attribute(KeyValue::new("service.name", self.service_name.clone()))
            .build();

        let logger_provider = new_logger_provider(resource.clone(), otlp.url.as_deref())?;
        let tracer_provider = new_tracer_provider(resource.clone(), otlp.url.as_deref())?;
        let meter_provider = new_meter_provider(resource, otlp)?;
        opentelemetry::global::set_meter_provider(meter_provider);

        let tracer = tracer_provider.tracer(self.service_name.clone());

        let (plain_layer, json_layer) = match self.format {
            LogFormat::Plain => (Some(tracing_subscriber::fmt::layer()), None),
            LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
        };

        tracing_subscriber::registry()
            .with(OpenTelemetryLayer::new(tracer).with_filter(EnvFilter::try_from(&self.logs)?))
            .with(OpenTelemetryTracingBridge::new(&logger_provider).with_filter(EnvFilter::try_from(&self.logs)?))
            .with(plain_layer.with_filter(EnvFilter::try_from(&self.logs)?))
            .with(json_layer.with_filter(EnvFilter::try_from(&self.logs)?))
            .try_init()?;

        Ok(())
    }
}

fn new_tracer_provider(resource: Resource, url: Option<&str>) -> Result<SdkTracerProvider, ExporterBuildError> {
    let builder = SdkTracerProvider::builder().with_resource(resource);

    match url {
        Some(url) => {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(url)
                .build()?;
            Ok(builder.with_batch_exporter(exporter).build())
        }
        None => Ok(builder
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build()),
    }
}

fn new_logger_provider(resource: Resource, url: Option<&str>) -> Result<SdkLoggerProvider, ExporterBuildError> {
    let builder = SdkLoggerProvider::builder().with_resource(resource);

    match url {
        Some(url) => {
            let exporter = opentelemetry_otlp::LogExporter::builder()
                .with_tonic()
                .with_endpoint(url)
                .build()?;
            Ok(builder.with_batch_exporter(exporter).build())
        }
        None => Ok(builder
            .with_simple_exporter(opentelemetry_stdout::LogExporter::default())
            .build()),
    }
}

fn new_meter_provider(resource: Resource, otlp: &OtlpConfig) -> Result<SdkMeterProvider, ExporterBuildError> {
    let interval = std::time::Duration::from_secs(otlp.metrics_interval_secs);

    let builder = SdkMeterProvider::builder();
    let builder = match &otlp.url {
        Some(url) => {
            let exporter = opentelemetry_otlp::MetricExporter::builder()
                .with_tonic()
                .with_endpoint(url)
                .build()?;
            builder.with_reader(PeriodicReader::builder(exporter).with_interval(interval).build())
        }
        None => builder.with_reader(
            PeriodicReader::builder(opentelemetry_stdout::MetricExporter::default())
                .with_interval(interval)
                .build(),
        ),
    };

    Ok(builder.with_resource(resource).build())
}
