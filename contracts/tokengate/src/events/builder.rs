use near_sdk::env;
use near_sdk::serde::Serialize;
use near_sdk::serde_json::{json, Map, Value};

use super::{PREFIX, STANDARD, VERSION};

/// NEP-297 event assembler: one data object per log line.
pub(crate) struct EventBuilder {
    event: &'static str,
    data: Map<String, Value>,
}

impl EventBuilder {
    pub fn new(event: &'static str, operation: &str, actor: impl Serialize) -> Self {
        let mut data = Map::new();
        data.insert("operation".to_string(), Value::String(operation.to_string()));
        data.insert(
            "actor".to_string(),
            near_sdk::serde_json::to_value(actor).unwrap_or(Value::Null),
        );
        Self { event, data }
    }

    pub fn field(mut self, key: &str, value: impl Serialize) -> Self {
        self.data.insert(
            key.to_string(),
            near_sdk::serde_json::to_value(value).unwrap_or(Value::Null),
        );
        self
    }

    pub fn field_opt(mut self, key: &str, value: Option<impl Serialize>) -> Self {
        if let Some(value) = value {
            self = self.field(key, value);
        }
        self
    }

    pub fn emit(self) {
        let payload = json!({
            "standard": STANDARD,
            "version": VERSION,
            "event": self.event,
            "data": [Value::Object(self.data)],
        });
        env::log_str(&format!("{}{}", PREFIX, payload));
    }
}
