//! Untyped documents: a JSON object carrying its public id under a configurable field.

use crate::dao::DaoError;
use serde_json::{Map, Value};

/// One resource instance. Always holds the resource's id field once persisted.
pub type Document = Map<String, Value>;

/// Read the id field from a payload. `Ok(None)` when the field is absent.
/// The id must be a non-empty string; anything else is a validation failure.
pub fn id_value<'a>(doc: &'a Document, id_field: &str) -> Result<Option<&'a str>, DaoError> {
    match doc.get(id_field) {
        None => Ok(None),
        Some(Value::String(s)) if !s.is_empty() => Ok(Some(s.as_str())),
        Some(Value::String(_)) => Err(DaoError::Validation(format!("{} must not be empty", id_field))),
        Some(other) => Err(DaoError::Validation(format!(
            "{} must be a string, got {}",
            id_field,
            type_name_of_json(other)
        ))),
    }
}

/// Ensure the payload carries an id, generating a random one when absent. Returns the id.
pub fn ensure_id(doc: &mut Document, id_field: &str) -> Result<String, DaoError> {
    if let Some(id) = id_value(doc, id_field)? {
        return Ok(id.to_string());
    }
    let id = new_id();
    doc.insert(id_field.to_string(), Value::String(id.clone()));
    Ok(id)
}

/// Fresh opaque identifier (UUID v4).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Shallow merge: top-level keys of `patch` overwrite those of `doc`.
pub fn merge(doc: &mut Document, patch: Document) {
    for (k, v) in patch {
        doc.insert(k, v);
    }
}

/// True when every (key, value) of `filter` is present in `doc`.
pub fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(k, v)| doc.get(k) == Some(v))
}

fn type_name_of_json(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn id_value_rejects_non_string_ids() {
        let d = doc(json!({"RoleId": 7}));
        assert!(matches!(id_value(&d, "RoleId"), Err(DaoError::Validation(_))));
        let d = doc(json!({"RoleId": ""}));
        assert!(matches!(id_value(&d, "RoleId"), Err(DaoError::Validation(_))));
        let d = doc(json!({"label": "x"}));
        assert_eq!(id_value(&d, "RoleId").unwrap(), None);
    }

    #[test]
    fn ensure_id_keeps_supplied_and_fills_missing() {
        let mut d = doc(json!({"RoleId": "admin"}));
        assert_eq!(ensure_id(&mut d, "RoleId").unwrap(), "admin");

        let mut d = doc(json!({"label": "Guest"}));
        let id = ensure_id(&mut d, "RoleId").unwrap();
        assert!(!id.is_empty());
        assert_eq!(d["RoleId"], json!(id));
    }

    #[test]
    fn merge_overwrites_top_level_only() {
        let mut d = doc(json!({"RoleId": "admin", "label": "Administrator", "meta": {"a": 1}}));
        merge(&mut d, doc(json!({"label": "Root", "meta": {"b": 2}})));
        assert_eq!(
            Value::Object(d),
            json!({"RoleId": "admin", "label": "Root", "meta": {"b": 2}})
        );
    }

    #[test]
    fn empty_filter_matches_everything() {
        let d = doc(json!({"RoleId": "admin", "label": "Root"}));
        assert!(matches(&d, &Document::new()));
        assert!(matches(&d, &doc(json!({"label": "Root"}))));
        assert!(!matches(&d, &doc(json!({"label": "Guest"}))));
    }
}
