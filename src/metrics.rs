// src/metrics.rs
//! Analytics events emitted by the views.
//!
//! Events keep the `{event, category, properties}` shape downstream
//! consumers read, so the names below must stay stable.
use serde::Serialize;
use serde_json::{Map, Value};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetaMetricsEventName {
    #[serde(rename = "Token Screen Opened")]
    TokenScreenOpened,
    #[serde(rename = "Token Imported")]
    TokenImported,
    #[serde(rename = "Token Hidden")]
    TokenHidden,
    #[serde(rename = "Custodian Connected")]
    CustodianConnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetaMetricsEventCategory {
    Navigation,
    Wallet,
    #[serde(rename = "MMI")]
    Institutional,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaMetricsEvent {
    pub event: MetaMetricsEventName,
    pub category: MetaMetricsEventCategory,
    pub properties: Map<String, Value>,
}

impl MetaMetricsEvent {
    pub fn new(event: MetaMetricsEventName, category: MetaMetricsEventCategory) -> Self {
        Self {
            event,
            category,
            properties: Map::new(),
        }
    }

    pub fn property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

/// Destination for analytics events
pub trait MetricsSink {
    fn track(&self, event: MetaMetricsEvent);
}

/// Writes events to the log as JSON
pub struct LogMetricsSink;

impl MetricsSink for LogMetricsSink {
    fn track(&self, event: MetaMetricsEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => log::info!("metrics: {}", json),
            Err(e) => log::warn!("Failed to serialize metrics event {:?}: {}", event.event, e),
        }
    }
}

/// Context handle the components use to emit events
#[derive(Clone)]
pub struct MetricsContext {
    sink: Rc<dyn MetricsSink>,
}

impl MetricsContext {
    pub fn new(sink: Rc<dyn MetricsSink>) -> Self {
        Self { sink }
    }

    pub fn track(&self, event: MetaMetricsEvent) {
        self.sink.track(event);
    }
}

impl Default for MetricsContext {
    fn default() -> Self {
        Self::new(Rc::new(LogMetricsSink))
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    pub struct RecordingSink {
        pub events: RefCell<Vec<MetaMetricsEvent>>,
    }

    impl MetricsSink for RecordingSink {
        fn track(&self, event: MetaMetricsEvent) {
            self.events.borrow_mut().push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_serialization_is_stable() {
        let event = MetaMetricsEvent::new(
            MetaMetricsEventName::TokenScreenOpened,
            MetaMetricsEventCategory::Navigation,
        )
        .property("token_symbol", "ETH")
        .property("location", "Home");

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "Token Screen Opened",
                "category": "Navigation",
                "properties": { "token_symbol": "ETH", "location": "Home" }
            })
        );
    }

    #[test]
    fn test_context_forwards_to_sink() {
        let sink = Rc::new(recording::RecordingSink::default());
        let context = MetricsContext::new(sink.clone());
        context.track(MetaMetricsEvent::new(
            MetaMetricsEventName::TokenImported,
            MetaMetricsEventCategory::Wallet,
        ));
        assert_eq!(sink.events.borrow().len(), 1);
    }
}
