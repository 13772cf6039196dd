//! Edit records and the local <-> wire field name table.

use serde_json::{Map, Value};

use super::integration::IntegrationExpireBehavior;

/// Local field name paired with its wire field name.
pub const FIELD_NAMES: &[(&str, &str)] = &[
    ("expireBehavior", "expire_behavior"),
    ("expireGracePeriod", "expire_grace_period"),
    ("enableEmoticons", "enable_emoticons"),
];

pub fn wire_name(local: &str) -> Option<&'static str> {
    FIELD_NAMES
        .iter()
        .find(|(l, _)| *l == local)
        .map(|(_, w)| *w)
}

pub fn local_name(wire: &str) -> Option<&'static str> {
    FIELD_NAMES
        .iter()
        .find(|(_, w)| *w == wire)
        .map(|(l, _)| *l)
}

/// Rename local keys to wire keys, producing a new map.
///
/// Keys not in [`FIELD_NAMES`] pass through unchanged. If a record carries both
/// the local and the wire spelling of a field, the translated local value wins.
pub fn to_wire(record: &Map<String, Value>) -> Map<String, Value> {
    let mut out: Map<String, Value> = record
        .iter()
        .filter(|(k, _)| wire_name(k).is_none())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    for (key, value) in record {
        if let Some(wire) = wire_name(key) {
            out.insert(wire.to_string(), value.clone());
        }
    }
    out
}

/// A partial edit of an integration, keyed by local field names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditIntegration {
    fields: Map<String, Value>,
}

impl EditIntegration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expire_behavior(self, behavior: IntegrationExpireBehavior) -> Self {
        self.field("expireBehavior", u8::from(behavior))
    }

    /// Grace period in days.
    pub fn expire_grace_period(self, days: u32) -> Self {
        self.field("expireGracePeriod", days)
    }

    /// Only honoured by the remote for Twitch integrations; not tracked locally.
    pub fn enable_emoticons(self, enabled: bool) -> Self {
        self.field("enableEmoticons", enabled)
    }

    /// Set an arbitrary key. Unknown keys are forwarded as given.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The outgoing request body. Leaves `self` untouched.
    pub fn to_wire(&self) -> Map<String, Value> {
        to_wire(&self.fields)
    }
}

impl From<Map<String, Value>> for EditIntegration {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_table_is_bidirectional() {
        for (local, wire) in FIELD_NAMES {
            assert_eq!(wire_name(local), Some(*wire));
            assert_eq!(local_name(wire), Some(*local));
        }
        assert_eq!(wire_name("expire_behavior"), None);
        assert_eq!(local_name("expireBehavior"), None);
    }

    #[test]
    fn test_to_wire_renames_and_drops_local_keys() {
        let edit = EditIntegration::new()
            .expire_behavior(IntegrationExpireBehavior::Kick)
            .expire_grace_period(7);
        let wire = edit.to_wire();

        assert_eq!(
            Value::Object(wire),
            json!({ "expire_behavior": 1, "expire_grace_period": 7 })
        );
        // The caller's record still holds local names.
        assert!(edit.fields().contains_key("expireBehavior"));
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let edit = EditIntegration::new()
            .enable_emoticons(true)
            .field("custom_option", "x");
        let wire = edit.to_wire();
        assert_eq!(wire["enable_emoticons"], json!(true));
        assert_eq!(wire["custom_option"], json!("x"));
        assert!(!wire.contains_key("enableEmoticons"));
    }

    #[test]
    fn test_local_spelling_wins_over_wire_spelling() {
        let edit = EditIntegration::new()
            .field("expire_grace_period", 1)
            .expire_grace_period(30);
        assert_eq!(edit.to_wire()["expire_grace_period"], json!(30));
    }

    #[test]
    fn test_from_map() {
        let mut map = Map::new();
        map.insert("expireGracePeriod".into(), json!(3));
        let edit = EditIntegration::from(map);
        assert!(!edit.is_empty());
        assert_eq!(Value::Object(edit.to_wire()), json!({ "expire_grace_period": 3 }));
    }
}
