//! Parsed SVGEO document: tagged nodes, metadata blocks, layer table.

use kurbo::Rect;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

/// Element id of the document-level metadata block.
pub const DOCUMENT_METADATA_ID: &str = "SVG_GEO_DOCUMENT";
/// Element id of the global-data metadata block.
pub const DATA_METADATA_ID: &str = "SVG_GEO_DATA";
/// Root attribute carrying the SVGEO format version.
pub const VERSION_ATTR: &str = "data-svg-geo-version";

/// Errors fatal to loading a document. Anything recoverable (bad metadata,
/// bad per-node props) is logged and degraded instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed markup: {0}")]
    Malformed(#[from] roxmltree::Error),
    #[error("document root is <{0}>, expected <svg>")]
    NotSvg(String),
}

/// One element of the rendered tree, as read at load time.
///
/// The core never mutates nodes; it only reads attributes off them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementNode {
    /// Tag name (`rect`, `path`, ...), used when measuring.
    pub tag: String,
    pub id: Option<String>,
    /// Cross-reference key into the global-data table (`data-ref`).
    pub ref_id: Option<String>,
    /// Semantic class (`data-class`); presence marks the node as tagged.
    pub class: Option<String>,
    /// Level-of-detail tag (`data-level`).
    pub level: Option<String>,
    /// Layer key (`data-layer`).
    pub layer: Option<String>,
    /// Serialized property bag (`data-props`), parsed lazily and best-effort.
    pub props_raw: Option<String>,
    /// Remaining attributes, kept for geometry measuring.
    pub attrs: HashMap<String, String>,
}

impl ElementNode {
    /// Whether this node carries structured geo metadata.
    pub fn is_tagged(&self) -> bool {
        self.class.is_some()
    }

    /// Numeric attribute lookup, `None` when absent or unparseable.
    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        self.attrs.get(name)?.trim().parse().ok()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// A named, toggle-able grouping of nodes with a display order and
/// localized label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerDef {
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub label: BTreeMap<String, String>,
}

impl LayerDef {
    /// Resolve the display label: requested locale, then `en`, then `key`.
    pub fn label_for<'a>(&'a self, locale: &str, key: &'a str) -> &'a str {
        self.label
            .get(locale)
            .or_else(|| self.label.get("en"))
            .map(String::as_str)
            .unwrap_or(key)
    }
}

/// The parsed document plus its side-channel data. Built once at load time,
/// immutable thereafter; layer visibility lives with the viewer, not here.
#[derive(Debug, Clone, Default)]
pub struct DocumentModel {
    /// Original markup text, kept verbatim for export.
    pub source: String,
    /// Declared SVGEO format version, if any.
    pub version: Option<String>,
    /// Declared view-box, taken verbatim when present.
    pub view_box: Option<Rect>,
    /// Declared `width`/`height` root attributes.
    pub declared_size: Option<(f64, f64)>,
    /// Document-level metadata block, `None` when absent or unparseable.
    pub metadata: Option<Value>,
    /// Reference-keyed global data records.
    pub global_data: serde_json::Map<String, Value>,
    /// Layer table from the data block's `layers` sub-map.
    pub layers: BTreeMap<String, LayerDef>,
    /// Every element of the tree, document order.
    pub nodes: Vec<ElementNode>,
}

impl DocumentModel {
    /// Parse a document from markup text.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let doc = roxmltree::Document::parse(text)?;
        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(LoadError::NotSvg(root.tag_name().name().to_string()));
        }

        let version = root.attribute(VERSION_ATTR).map(str::to_string);
        if version.is_none() {
            log::warn!("SVGEO version not specified on document root");
        }

        let view_box = root.attribute("viewBox").and_then(parse_view_box);
        let declared_size = match (
            root.attribute("width").and_then(|v| v.trim().parse().ok()),
            root.attribute("height").and_then(|v| v.trim().parse().ok()),
        ) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        };

        let mut model = DocumentModel {
            source: text.to_string(),
            version,
            view_box,
            declared_size,
            ..Default::default()
        };

        model.collect_nodes(&root);
        Ok(model)
    }

    /// Walk the rendered tree. Non-rendered containers (`defs`, `style`,
    /// `title`, `desc`) are skipped whole: their content never draws, so it
    /// must not reach the node list or the measured content box.
    fn collect_nodes(&mut self, parent: &roxmltree::Node<'_, '_>) {
        for node in parent.children().filter(roxmltree::Node::is_element) {
            match node.tag_name().name() {
                "metadata" => self.read_metadata_block(&node),
                "defs" | "style" | "title" | "desc" => {}
                _ => {
                    self.nodes.push(read_element(&node));
                    self.collect_nodes(&node);
                }
            }
        }
    }

    /// Parse a document from a file on disk.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    fn read_metadata_block(&mut self, node: &roxmltree::Node<'_, '_>) {
        let Some(id) = node.attribute("id") else {
            return;
        };
        let text = node.text().unwrap_or("").trim();
        match id {
            DOCUMENT_METADATA_ID => match serde_json::from_str(text) {
                Ok(value) => self.metadata = Some(value),
                Err(e) => log::warn!("failed to parse {DOCUMENT_METADATA_ID} metadata: {e}"),
            },
            DATA_METADATA_ID => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(mut map)) => {
                    if let Some(layers) = map.remove("layers") {
                        match serde_json::from_value(layers) {
                            Ok(parsed) => self.layers = parsed,
                            Err(e) => log::warn!("failed to parse layer table: {e}"),
                        }
                    }
                    self.global_data = map;
                }
                Ok(_) => log::warn!("{DATA_METADATA_ID} metadata is not an object, ignoring"),
                Err(e) => log::warn!("failed to parse {DATA_METADATA_ID} metadata: {e}"),
            },
            _ => {}
        }
    }

    /// Document language from the metadata block, when declared.
    pub fn language(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("document")?.get("lang")?.as_str()
    }

    /// Global-data record for a reference id. Missing entries are normal.
    pub fn global_data_for(&self, ref_id: &str) -> Option<&Value> {
        self.global_data.get(ref_id)
    }

    /// Nodes carrying structured geo metadata, document order.
    pub fn tagged(&self) -> impl Iterator<Item = &ElementNode> {
        self.nodes.iter().filter(|n| n.is_tagged())
    }

    /// First node matching a reference id, falling back to element id.
    pub fn node_by_ref(&self, ref_id: &str) -> Option<&ElementNode> {
        self.nodes
            .iter()
            .find(|n| n.ref_id.as_deref() == Some(ref_id))
            .or_else(|| self.nodes.iter().find(|n| n.id.as_deref() == Some(ref_id)))
    }

    /// All tagged nodes of a given class.
    pub fn nodes_by_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a ElementNode> {
        self.nodes.iter().filter(move |n| n.class.as_deref() == Some(class))
    }

    /// Node keys of every layer actually referenced by the tree.
    pub fn layer_keys_in_use(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.nodes.iter().filter_map(|n| n.layer.as_deref()).collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

fn read_element(node: &roxmltree::Node<'_, '_>) -> ElementNode {
    let mut out = ElementNode {
        tag: node.tag_name().name().to_string(),
        ..Default::default()
    };
    for attr in node.attributes() {
        match attr.name() {
            "id" => out.id = Some(attr.value().to_string()),
            "data-ref" => out.ref_id = Some(attr.value().to_string()),
            "data-class" => out.class = Some(attr.value().to_string()),
            "data-level" => out.level = Some(attr.value().to_string()),
            "data-layer" => out.layer = Some(attr.value().to_string()),
            "data-props" => out.props_raw = Some(attr.value().to_string()),
            name => {
                out.attrs.insert(name.to_string(), attr.value().to_string());
            }
        }
    }
    out
}

fn parse_view_box(value: &str) -> Option<Rect> {
    let mut parts = value.split_whitespace().map(|p| p.parse::<f64>());
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let w = parts.next()?.ok()?;
    let h = parts.next()?.ok()?;
    Some(Rect::new(x, y, x + w, y + h))
}
