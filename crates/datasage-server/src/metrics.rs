//! Prometheus metrics for the DataSage server
//!
//! Counts HTTP requests per route and status, answered chat intents and
//! translated query shapes. Exposed in text format on `GET /metrics`.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,

    /// Labels: route, status
    http_requests_total: IntCounterVec,

    /// Labels: intent
    chat_intents_total: IntCounterVec,

    /// Labels: shape
    translations_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by route and status")
                .namespace("datasage"),
            &["route", "status"],
        )?;

        let chat_intents_total = IntCounterVec::new(
            Opts::new("chat_intents_total", "Chat questions answered by intent")
                .namespace("datasage"),
            &["intent"],
        )?;

        let translations_total = IntCounterVec::new(
            Opts::new("translations_total", "Requests translated to SQL by shape")
                .namespace("datasage"),
            &["shape"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(chat_intents_total.clone()))?;
        registry.register(Box::new(translations_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            chat_intents_total,
            translations_total,
        })
    }

    pub fn observe_request(&self, route: &str, status: u16) {
        self.http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    pub fn observe_intent(&self, intent: &str) {
        self.chat_intents_total.with_label_values(&[intent]).inc();
    }

    pub fn observe_translation(&self, shape: &str) {
        self.translations_total.with_label_values(&[shape]).inc();
    }

    /// Encode all metrics in Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_render() {
        let metrics = Metrics::new().unwrap();
        metrics.observe_request("/chat", 200);
        metrics.observe_request("/chat", 200);
        metrics.observe_intent("customer_count");
        metrics.observe_translation("row_count");

        let text = metrics.render().unwrap();
        assert!(text.contains("datasage_http_requests_total{route=\"/chat\",status=\"200\"} 2"));
        assert!(text.contains("datasage_chat_intents_total{intent=\"customer_count\"} 1"));
        assert!(text.contains("datasage_translations_total{shape=\"row_count\"} 1"));
    }

    #[test]
    fn test_empty_vecs_render_nothing() {
        let metrics = Metrics::new().unwrap();
        let text = metrics.render().unwrap();
        assert!(!text.contains("datasage_chat_intents_total{"));
    }
}
