//! SVGEO Core Library
//!
//! Platform-agnostic logic for viewing geo-tagged SVG documents: viewport
//! fitting and pan/zoom state, the parsed document model, per-element data
//! extraction and the multi-format export pipeline.

pub mod document;
pub mod export;
pub mod extract;
pub mod geometry;
pub mod translate;
pub mod viewport;

pub use document::{DocumentModel, ElementNode, LayerDef, LoadError};
pub use export::{BadgeTier, ExportError, Report, ReportNode, ReportRow, ReportValue};
pub use extract::{ExtractedRecord, FieldFilter};
pub use geometry::{FitError, FitTransform, GeometryFitter, Measure, ShapeMeasure};
pub use translate::Translator;
pub use viewport::{ViewportController, ViewportState, WheelDirection};
