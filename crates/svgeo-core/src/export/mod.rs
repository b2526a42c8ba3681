//! Multi-format export pipeline.
//!
//! One structured report tree is built per export and rendered by a
//! serializer per output format (plain text, Word-targeting HTML, RTF).
//! Because every serializer walks the same tree, the three representations
//! describe the same information set by construction.

mod html;
mod rtf;
mod text;

use crate::extract::ExtractedRecord;
use crate::translate::Translator;
use serde_json::Value;
use thiserror::Error;

/// Errors on the export/copy path. Producing a report never fails; these
/// come from the collaborators consuming it.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
    #[error("{0} export is not available")]
    Unsupported(&'static str),
    #[error("encoding failed: {0}")]
    Encode(String),
    #[error("file write failed: {0}")]
    Io(String),
    #[error("no data to export")]
    Empty,
}

/// Style tier for enumerated condition-like values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTier {
    Excellent,
    Good,
    Moderate,
    Poor,
    Ruined,
    Unknown,
}

impl BadgeTier {
    /// Tier for a raw (untranslated) enumerated value. Unknown values get
    /// the default tier rather than failing.
    pub fn from_value(value: &str) -> Self {
        match value {
            "Excellent" => Self::Excellent,
            "Good" => Self::Good,
            "Moderate" => Self::Moderate,
            "Poor" => Self::Poor,
            "Ruined" => Self::Ruined,
            _ => Self::Unknown,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Excellent => "badge-excellent",
            Self::Good => "badge-good",
            Self::Moderate => "badge-moderate",
            Self::Poor => "badge-poor",
            Self::Ruined => "badge-ruined",
            Self::Unknown => "badge-unknown",
        }
    }
}

/// A rendered cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValue {
    Text(String),
    Badge { text: String, tier: BadgeTier },
    /// Pretty-printed structured dump for nested values.
    Pre(String),
}

impl ReportValue {
    /// The textual content, independent of styling.
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(s) | Self::Pre(s) => s,
            Self::Badge { text, .. } => text,
        }
    }
}

/// One label/value line of a table block.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub label: String,
    pub value: ReportValue,
}

/// A block of the report tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportNode {
    Heading { level: u8, text: String },
    /// Aggregate "N elements" line of multi-record reports.
    CountLine { count: usize, label: String },
    Divider { heavy: bool },
    Table(Vec<ReportRow>),
}

/// The export document: an ordered list of blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub nodes: Vec<ReportNode>,
}

impl Report {
    /// Build the report for a single record.
    pub fn single(record: &ExtractedRecord, translator: &Translator) -> Self {
        let mut report = Report::default();
        report.heading(1, record.title.clone());
        report.push_record_body(record, translator, 2);
        report
    }

    /// Build the numbered multi-record report with an aggregate count
    /// header and rules between records.
    pub fn many(records: &[ExtractedRecord], translator: &Translator) -> Self {
        let mut report = Report::default();
        report.heading(1, translator.translate("All Elements Data").to_string());
        report.nodes.push(ReportNode::CountLine {
            count: records.len(),
            label: translator.translate("elements").to_string(),
        });
        report.nodes.push(ReportNode::Divider { heavy: true });
        for (index, record) in records.iter().enumerate() {
            if index > 0 {
                report.nodes.push(ReportNode::Divider { heavy: false });
            }
            report.heading(2, format!("{}. {}", index + 1, record.title));
            report.push_record_body(record, translator, 3);
        }
        report
    }

    fn push_record_body(&mut self, record: &ExtractedRecord, translator: &Translator, level: u8) {
        let mut basic = Vec::new();
        let mut scalar = |label: &str, value: &Option<String>, translate_value: bool| {
            if let Some(v) = value {
                let text = if translate_value {
                    translator.translate(v).to_string()
                } else {
                    v.clone()
                };
                basic.push(ReportRow {
                    label: translator.translate(label).to_string(),
                    value: ReportValue::Text(text),
                });
            }
        };
        scalar("ID", &record.id, false);
        scalar("Reference", &record.ref_id, false);
        scalar("Class", &record.class, true);
        scalar("Level of detail", &record.level, false);
        scalar("Layer", &record.layer, false);

        self.heading(level, translator.translate("Basic Information").to_string());
        self.nodes.push(ReportNode::Table(basic));

        if let Some(global) = &record.global_data {
            self.heading(level, translator.translate("Global data").to_string());
            self.nodes.push(ReportNode::Table(property_rows(global, translator)));
        }
        if !record.props.is_empty() {
            self.heading(level, translator.translate("Properties").to_string());
            self.nodes
                .push(ReportNode::Table(property_rows(&record.props, translator)));
        }
    }

    fn heading(&mut self, level: u8, text: String) {
        self.nodes.push(ReportNode::Heading { level, text });
    }

    /// All label/value rows, for consumers that only need the data set.
    pub fn rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.nodes.iter().flat_map(|n| match n {
            ReportNode::Table(rows) => rows.iter(),
            _ => [].iter(),
        })
    }

    /// Plain-text rendition.
    pub fn to_text(&self) -> String {
        text::render(self)
    }

    /// Self-contained styled HTML, Word-compatible. `custom_css` is
    /// appended to the style block.
    pub fn to_html(&self, custom_css: &str) -> String {
        html::render(self, custom_css)
    }

    /// RTF rendition with escaped non-ASCII codepoints.
    pub fn to_rtf(&self) -> String {
        rtf::render(self)
    }
}

/// Split a camel-case identifier into capitalized words:
/// `yearBuilt` -> `Year Built`, `IfcType` -> `Ifc Type`.
pub fn derive_label(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else {
            if ch.is_ascii_uppercase() {
                out.push(' ');
            }
            out.push(ch);
        }
    }
    out
}

fn property_rows(bag: &serde_json::Map<String, Value>, translator: &Translator) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    for (key, value) in bag {
        if value.is_null() {
            continue;
        }
        let label = translator.translate(&derive_label(key)).to_string();
        rows.push(ReportRow {
            value: property_value(key, &label, value, translator),
            label,
        });
    }
    rows
}

fn property_value(key: &str, label: &str, value: &Value, translator: &Translator) -> ReportValue {
    if value.is_object() || value.is_array() {
        let pretty =
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        return ReportValue::Pre(pretty);
    }

    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let text = translator.translate(&raw).to_string();

    let lower_key = key.to_lowercase();
    let lower_label = label.to_lowercase();
    if lower_key.contains("condition") || lower_label.contains("condition") || lower_label.contains("état") {
        ReportValue::Badge {
            text,
            tier: BadgeTier::from_value(&raw),
        }
    } else if lower_key.contains("status") || lower_label.contains("status") || lower_label.contains("statut") {
        ReportValue::Badge {
            text,
            tier: BadgeTier::Unknown,
        }
    } else {
        ReportValue::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentModel;
    use crate::extract::FieldFilter;
    use serde_json::json;

    fn record() -> ExtractedRecord {
        let mut model = DocumentModel::default();
        model.global_data.insert(
            "R1".to_string(),
            json!({"material": "Stone", "heritageStatus": "Protected"}),
        );
        let node = crate::document::ElementNode {
            tag: "rect".to_string(),
            id: Some("w1".to_string()),
            ref_id: Some("R1".to_string()),
            class: Some("WallSurface".to_string()),
            level: Some("LOD2".to_string()),
            layer: Some("walls".to_string()),
            props_raw: Some(r#"{"condition": "Good", "yearBuilt": 1450}"#.to_string()),
            ..Default::default()
        };
        ExtractedRecord::extract(&node, &model, &FieldFilter::default(), &Translator::new("en"))
    }

    #[test]
    fn test_derive_label() {
        assert_eq!(derive_label("yearBuilt"), "Year Built");
        assert_eq!(derive_label("IfcType"), "Ifc Type");
        assert_eq!(derive_label("material"), "Material");
        assert_eq!(derive_label("conditionDate"), "Condition Date");
    }

    #[test]
    fn test_condition_becomes_tiered_badge() {
        let t = Translator::new("en");
        let value = property_value("condition", "Condition", &json!("Good"), &t);
        assert_eq!(
            value,
            ReportValue::Badge {
                text: "Good".to_string(),
                tier: BadgeTier::Good
            }
        );
        // unknown enumerated values degrade to the default tier
        let value = property_value("condition", "Condition", &json!("Pristine"), &t);
        assert!(matches!(value, ReportValue::Badge { tier: BadgeTier::Unknown, .. }));
    }

    #[test]
    fn test_condition_detected_on_translated_label() {
        // French label "État" matches the localized condition keyword.
        let t = Translator::new("fr");
        let value = property_value("condition", "État", &json!("Good"), &t);
        assert!(matches!(value, ReportValue::Badge { tier: BadgeTier::Good, .. }));
    }

    #[test]
    fn test_status_gets_default_badge() {
        let t = Translator::new("en");
        let value = property_value("heritageStatus", "Heritage Status", &json!("Protected"), &t);
        assert!(matches!(value, ReportValue::Badge { tier: BadgeTier::Unknown, .. }));
    }

    #[test]
    fn test_nested_values_render_as_pre_dump() {
        let t = Translator::new("en");
        let value = property_value("dimensions", "Dimensions", &json!({"w": 2, "h": 3}), &t);
        let ReportValue::Pre(text) = value else {
            panic!("expected Pre");
        };
        assert!(text.contains("\"w\": 2"));
    }

    #[test]
    fn test_null_properties_are_skipped() {
        let t = Translator::new("en");
        let rows = property_rows(
            json!({"a": 1, "b": null}).as_object().unwrap(),
            &t,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "A");
    }

    #[test]
    fn test_single_report_structure() {
        let report = Report::single(&record(), &Translator::new("en"));
        assert_eq!(
            report.nodes[0],
            ReportNode::Heading {
                level: 1,
                text: "WallSurface".to_string()
            }
        );
        let labels: Vec<&str> = report.rows().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "ID",
                "Reference",
                "Class",
                "Level of detail",
                "Layer",
                "Material",
                "Heritage Status",
                "Condition",
                "Year Built",
            ]
        );
    }

    #[test]
    fn test_many_report_numbers_and_separates() {
        let records = vec![record(), record()];
        let report = Report::many(&records, &Translator::new("en"));
        assert!(matches!(
            report.nodes[1],
            ReportNode::CountLine { count: 2, .. }
        ));
        assert!(matches!(report.nodes[2], ReportNode::Divider { heavy: true }));
        let numbered: Vec<&str> = report
            .nodes
            .iter()
            .filter_map(|n| match n {
                ReportNode::Heading { level: 2, text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(numbered, ["1. WallSurface", "2. WallSurface"]);
        assert_eq!(
            report
                .nodes
                .iter()
                .filter(|n| matches!(n, ReportNode::Divider { heavy: false }))
                .count(),
            1
        );
    }

    #[test]
    fn test_formats_share_the_information_set() {
        // Round-trip property: every label/value pair appears in all three
        // renditions for records without nested-object properties.
        let report = Report::single(&record(), &Translator::new("en"));
        let text = report.to_text();
        let html = report.to_html("");
        let rtf = report.to_rtf();
        for row in report.rows() {
            assert!(text.contains(&row.label), "text missing {}", row.label);
            assert!(html.contains(&row.label), "html missing {}", row.label);
            assert!(rtf.contains(&row.label), "rtf missing {}", row.label);
            let value = row.value.as_text();
            assert!(text.contains(value), "text missing {value}");
            assert!(html.contains(value), "html missing {value}");
            assert!(rtf.contains(value), "rtf missing {value}");
        }
    }
}
