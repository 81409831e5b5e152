use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

/// One recorded `tracing` event.
#[derive(Debug, Clone, Serialize)]
pub struct CapturedEvent {
    pub level: String,
    pub target: String,
    /// The formatted message, empty if the event had none.
    pub message: String,
    pub fields: HashMap<String, serde_json::Value>,
}

impl CapturedEvent {
    /// The string value of `name`, if recorded as a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }
}

/// Shared storage for captured events
#[derive(Debug, Clone, Default)]
pub struct SharedLogStorage {
    events: Arc<RwLock<Vec<CapturedEvent>>>,
}

impl SharedLogStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.read().map(|events| events.clone()).unwrap_or_default()
    }

    /// Events at `level` carrying `field == value`.
    pub fn find(&self, level: Level, field: &str, value: &str) -> Vec<CapturedEvent> {
        let level = level.to_string();
        self.events()
            .into_iter()
            .filter(|e| e.level == level && e.field_str(field) == Some(value))
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }

    fn push(&self, event: CapturedEvent) {
        if let Ok(mut events) = self.events.write() {
            events.push(event);
        }
    }
}

/// A tracing layer that records events in memory
pub struct LogCaptureLayer {
    storage: Arc<SharedLogStorage>,
}

impl LogCaptureLayer {
    pub fn new(storage: Arc<SharedLogStorage>) -> Self {
        Self { storage }
    }
}

impl<S> Layer<S> for LogCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);
        let mut fields = visitor.0;

        let message = match fields.remove("message") {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let metadata = event.metadata();
        self.storage.push(CapturedEvent {
            level: metadata.level().to_string(),
            target: metadata.target().to_string(),
            message,
            fields,
        });
    }
}

/// A subscriber that only records into `storage`, for scoped use with
/// `tracing::subscriber::set_default`.
pub fn capturing_subscriber(storage: Arc<SharedLogStorage>) -> impl Subscriber + Send + Sync {
    use tracing_subscriber::layer::SubscriberExt;
    tracing_subscriber::registry().with(LogCaptureLayer::new(storage))
}

#[derive(Default)]
struct JsonVisitor(HashMap<String, serde_json::Value>);

impl tracing::field::Visit for JsonVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::Value::Bool(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture() -> (Arc<SharedLogStorage>, impl Subscriber + Send + Sync) {
        let storage = Arc::new(SharedLogStorage::new());
        let subscriber = capturing_subscriber(storage.clone());
        (storage, subscriber)
    }

    #[test]
    fn records_level_message_and_fields() {
        let (storage, subscriber) = capture();

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(operation = "ingest", error = %"quota exceeded", chunks = 3u64, "embedding failed");
        });

        let events = storage.events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.level, "ERROR");
        assert_eq!(event.message, "embedding failed");
        assert_eq!(event.field_str("operation"), Some("ingest"));
        assert_eq!(event.field_str("error"), Some("quota exceeded"));
        assert_eq!(event.fields["chunks"], serde_json::json!(3));
    }

    #[test]
    fn find_filters_by_level_and_field() {
        let (storage, subscriber) = capture();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(operation = "search", "found relevant chunks");
            tracing::error!(operation = "search", "query embedding failed");
            tracing::error!(operation = "answer", "generation failed");
        });

        let hits = storage.find(Level::ERROR, "operation", "search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].message, "query embedding failed");

        storage.clear();
        assert!(storage.events().is_empty());
    }

    #[tokio::test]
    async fn captures_events_from_async_code() {
        let (storage, subscriber) = capture();
        let _guard = tracing::subscriber::set_default(subscriber);

        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        tracing::warn!(operation = "answer", "answer failed quality check");

        assert_eq!(storage.find(Level::WARN, "operation", "answer").len(), 1);
    }
}
