use cached::proc_macro::cached;
use opentelemetry::KeyValue;

pub fn set(name: &'static str, value: f64, kv: &[(&str, &str)]) {
    let kv: Vec<KeyValue> = kv
        .iter()
        .map(|(k, v)| KeyValue::new(k.to_string(), v.to_string()))
        .collect();
    gauge(name).record(value, &kv)
}

#[cached]
fn gauge(name: &'static str) -> opentelemetry::metrics::Gauge<f64> {
    opentelemetry::global::meter("energy_conversion").f64_gauge(name).build()
}
