//! Element-data extraction: attribute reads, property-bag filtering and the
//! cross-reference into the global-data table.

use crate::document::{DocumentModel, ElementNode};
use crate::translate::Translator;
use serde_json::{Map, Value};

/// Include/exclude projection over a property bag.
///
/// Per key: when an include list is set, the key must appear in it; the
/// exclude list is checked afterwards and always wins. Surviving keys keep
/// their source order. Non-object values pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct FieldFilter {
    pub display_fields: Option<Vec<String>>,
    pub exclude_fields: Vec<String>,
}

impl FieldFilter {
    pub fn new(display_fields: Option<Vec<String>>, exclude_fields: Vec<String>) -> Self {
        Self {
            display_fields,
            exclude_fields,
        }
    }

    pub fn filter(&self, value: &Value) -> Value {
        let Value::Object(map) = value else {
            return value.clone();
        };
        let mut out = Map::new();
        for (key, v) in map {
            if let Some(display) = &self.display_fields {
                if !display.iter().any(|f| f == key) {
                    continue;
                }
            }
            if self.exclude_fields.iter().any(|f| f == key) {
                continue;
            }
            out.insert(key.clone(), v.clone());
        }
        Value::Object(out)
    }
}

/// Snapshot of one node's metadata, re-extracted on every use so it always
/// reflects the current document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    /// Translated class name, or the translated word "Element".
    pub title: String,
    pub id: Option<String>,
    pub ref_id: Option<String>,
    pub class: Option<String>,
    pub level: Option<String>,
    pub layer: Option<String>,
    /// Filtered local property bag; empty when `data-props` is absent or
    /// unparseable.
    pub props: Map<String, Value>,
    /// Filtered global-data record, `None` when the reference resolves to
    /// nothing.
    pub global_data: Option<Map<String, Value>>,
}

impl ExtractedRecord {
    /// Read one node's attributes and cross-reference the global-data table.
    pub fn extract(
        node: &ElementNode,
        model: &DocumentModel,
        filter: &FieldFilter,
        translator: &Translator,
    ) -> Self {
        let title = translator
            .translate(node.class.as_deref().unwrap_or("Element"))
            .to_string();

        let props = match &node.props_raw {
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(value) => as_object(filter.filter(&value)),
                Err(e) => {
                    log::warn!("failed to parse data-props on {:?}: {e}", node.id);
                    Map::new()
                }
            },
            None => Map::new(),
        };

        let global_data = node.ref_id.as_deref().and_then(|r| {
            let record = model.global_data_for(r)?;
            if !record.is_object() {
                log::warn!("global data for {r} is not an object, ignoring");
                return None;
            }
            Some(as_object(filter.filter(record)))
        });

        Self {
            title,
            id: node.id.clone(),
            ref_id: node.ref_id.clone(),
            class: node.class.clone(),
            level: node.level.clone(),
            layer: node.layer.clone(),
            props,
            global_data,
        }
    }

    /// Compact one-line summary for hover display:
    /// title, then ref/id, then material and condition when present.
    pub fn hover_summary(&self, translator: &Translator) -> String {
        let mut parts = vec![self.title.clone()];
        if let Some(r) = &self.ref_id {
            parts.push(format!("{}: {r}", translator.translate("Ref")));
        }
        if let Some(id) = &self.id {
            parts.push(format!("{}: {id}", translator.translate("ID")));
        }
        for (key, label) in [("material", "Material"), ("condition", "Condition")] {
            let value = self
                .props
                .get(key)
                .or_else(|| self.global_data.as_ref().and_then(|g| g.get(key)));
            if let Some(Value::String(v)) = value {
                parts.push(format!(
                    "{}: {}",
                    translator.translate(label),
                    translator.translate(v)
                ));
            }
        }
        parts.join(" - ")
    }
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model_with_global(ref_id: &str, record: Value) -> DocumentModel {
        let mut model = DocumentModel::default();
        model.global_data.insert(ref_id.to_string(), record);
        model
    }

    fn node(class: Option<&str>, ref_id: Option<&str>, props: Option<&str>) -> ElementNode {
        ElementNode {
            tag: "rect".to_string(),
            id: Some("n1".to_string()),
            ref_id: ref_id.map(str::to_string),
            class: class.map(str::to_string),
            props_raw: props.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_include_then_exclude() {
        let filter = FieldFilter::new(
            Some(vec!["a".to_string(), "b".to_string()]),
            vec!["b".to_string()],
        );
        let out = filter.filter(&json!({"a": 1, "b": 2, "c": 3}));
        assert_eq!(out, json!({"a": 1}));
    }

    #[test]
    fn test_filter_passes_non_objects() {
        let filter = FieldFilter::new(Some(vec![]), vec![]);
        assert_eq!(filter.filter(&json!("text")), json!("text"));
        assert_eq!(filter.filter(&json!(42)), json!(42));
    }

    #[test]
    fn test_filter_preserves_source_order() {
        let filter = FieldFilter::default();
        let out = filter.filter(&json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_extract_resolves_global_data() {
        let model = model_with_global("R1", json!({"material": "Stone"}));
        let record = ExtractedRecord::extract(
            &node(Some("WallSurface"), Some("R1"), None),
            &model,
            &FieldFilter::default(),
            &Translator::new("en"),
        );
        assert_eq!(record.global_data, Some(as_object(json!({"material": "Stone"}))));
    }

    #[test]
    fn test_extract_missing_global_data_is_none() {
        let model = model_with_global("R1", json!({"material": "Stone"}));
        let record = ExtractedRecord::extract(
            &node(Some("WallSurface"), Some("R2"), None),
            &model,
            &FieldFilter::default(),
            &Translator::new("en"),
        );
        assert_eq!(record.global_data, None);
    }

    #[test]
    fn test_extract_bad_props_yields_empty_bag() {
        let record = ExtractedRecord::extract(
            &node(Some("Building"), None, Some("{broken")),
            &DocumentModel::default(),
            &FieldFilter::default(),
            &Translator::new("en"),
        );
        assert!(record.props.is_empty());
        assert_eq!(record.title, "Building");
    }

    #[test]
    fn test_extract_title_defaults_to_element() {
        let record = ExtractedRecord::extract(
            &node(None, None, None),
            &DocumentModel::default(),
            &FieldFilter::default(),
            &Translator::new("fr"),
        );
        assert_eq!(record.title, "Élément");
    }

    #[test]
    fn test_extract_applies_filter_to_both_bags() {
        let model = model_with_global("R1", json!({"material": "Stone", "secret": "x"}));
        let filter = FieldFilter::new(None, vec!["secret".to_string()]);
        let record = ExtractedRecord::extract(
            &node(Some("Building"), Some("R1"), Some(r#"{"condition": "Good", "secret": "y"}"#)),
            &model,
            &filter,
            &Translator::new("en"),
        );
        assert!(record.props.get("secret").is_none());
        assert!(record.global_data.as_ref().unwrap().get("secret").is_none());
        assert_eq!(record.props["condition"], "Good");
    }

    #[test]
    fn test_hover_summary() {
        let record = ExtractedRecord::extract(
            &node(
                Some("WallSurface"),
                Some("R1"),
                Some(r#"{"material": "Stone", "condition": "Good"}"#),
            ),
            &DocumentModel::default(),
            &FieldFilter::default(),
            &Translator::new("fr"),
        );
        assert_eq!(
            record.hover_summary(&Translator::new("fr")),
            "Surface de mur - Réf: R1 - ID: n1 - Matériau: Pierre - État: Bon"
        );
    }
}
