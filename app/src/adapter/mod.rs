pub mod homeassistant;
pub mod metrics_export;
