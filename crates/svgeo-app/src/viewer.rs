//! The viewer shell: owns the document, viewport and collaborators, and
//! exposes the host-facing operations and events.

use crate::clipboard::{ArboardClipboard, ClipboardPayload, ClipboardWriter};
use crate::clock::{Clock, SystemClock};
use crate::download::{encode_png, DialogDownloader, FileDownloader};
use crate::events::{EventBus, HandlerId};
use crate::notify::{Notice, NoticeKind, NotificationCenter};
use kurbo::{Point, Size};
use serde_json::{json, Value};
use std::collections::HashMap;
use svgeo_core::{
    DocumentModel, ExportError, ExtractedRecord, FieldFilter, FitError, GeometryFitter,
    LoadError, Measure, Report, ShapeMeasure, Translator, ViewportController, ViewportState,
    WheelDirection,
};

/// Default margin around fitted content, in viewport units.
pub const DEFAULT_MARGIN: f64 = 40.0;
/// Image exports scale the content so its larger side reaches this many
/// pixels; content already larger is left alone.
pub const MIN_IMAGE_DIMENSION: f64 = 2000.0;

const SVG_FILENAME: &str = "svg-geo-export.svg";
const PNG_FILENAME: &str = "svg-geo-export.png";

/// Host-configurable viewer options.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub locale: String,
    /// Extra translation entries merged over the defaults.
    pub translations: Vec<(String, String)>,
    /// When set, only these property keys are shown.
    pub display_fields: Option<Vec<String>>,
    /// Property keys never shown; wins over `display_fields`.
    pub exclude_fields: Vec<String>,
    /// Appended to the style block of HTML exports.
    pub custom_css: String,
    pub margin: f64,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            locale: "fr".to_string(),
            translations: Vec::new(),
            display_fields: None,
            exclude_fields: Vec::new(),
            custom_css: String::new(),
            margin: DEFAULT_MARGIN,
        }
    }
}

/// What to place on the clipboard.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportKind {
    /// The document markup (styled + plain-text representations).
    Svg,
    /// A rasterized image of the document; needs a [`Rasterizer`].
    Image,
    /// One element's formatted data, addressed by reference id.
    ElementData(String),
    /// Every tagged element's formatted data.
    AllData,
}

/// Per-layer display state, owned by the viewer (the document's layer table
/// itself stays immutable).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerState {
    pub visible: bool,
    pub opacity: f64,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
        }
    }
}

/// A layer row for host-side layer pickers, sorted by declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    pub key: String,
    pub label: String,
    pub order: i64,
    pub state: LayerState,
}

/// Rasterized RGBA frame.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Injected capability turning document markup into pixels for image
/// exports. Absent by default; image exports then degrade with a notice.
pub trait Rasterizer {
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> Result<RasterImage, ExportError>;
}

/// Interactive viewer for SVGEO documents.
pub struct GeoViewer {
    options: ViewerOptions,
    translator: Translator,
    filter: FieldFilter,
    document: Option<DocumentModel>,
    viewport: ViewportController,
    viewport_size: Size,
    pending_fit: bool,
    layer_state: HashMap<String, LayerState>,
    events: EventBus,
    notices: NotificationCenter,
    measure: Box<dyn Measure>,
    clock: Box<dyn Clock>,
    clipboard: Box<dyn ClipboardWriter>,
    downloader: Box<dyn FileDownloader>,
    rasterizer: Option<Box<dyn Rasterizer>>,
}

impl GeoViewer {
    pub fn new(options: ViewerOptions) -> Self {
        let mut translator = Translator::new(options.locale.clone());
        translator.merge(options.translations.iter().cloned());
        let filter = FieldFilter::new(
            options.display_fields.clone(),
            options.exclude_fields.clone(),
        );
        Self {
            options,
            translator,
            filter,
            document: None,
            viewport: ViewportController::new(),
            viewport_size: Size::ZERO,
            pending_fit: false,
            layer_state: HashMap::new(),
            events: EventBus::new(),
            notices: NotificationCenter::new(),
            measure: Box::new(ShapeMeasure),
            clock: Box::new(SystemClock::default()),
            clipboard: Box::new(ArboardClipboard),
            downloader: Box::new(DialogDownloader),
            rasterizer: None,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardWriter>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_downloader(mut self, downloader: Box<dyn FileDownloader>) -> Self {
        self.downloader = downloader;
        self
    }

    pub fn with_measure(mut self, measure: Box<dyn Measure>) -> Self {
        self.measure = measure;
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Box<dyn Rasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    // ---- loading -----------------------------------------------------

    /// Load a document from markup text. On failure the viewer keeps its
    /// previous state.
    pub fn load_str(&mut self, text: &str) -> Result<(), LoadError> {
        let model = DocumentModel::parse(text)?;
        self.install(model);
        Ok(())
    }

    /// Load a document from a file.
    pub fn load_path(&mut self, path: impl AsRef<std::path::Path>) -> Result<(), LoadError> {
        let model = DocumentModel::load_path(path)?;
        self.install(model);
        Ok(())
    }

    fn install(&mut self, model: DocumentModel) {
        self.layer_state.clear();
        for key in model.layers.keys() {
            self.layer_state.insert(key.clone(), LayerState::default());
        }
        for key in model.layer_keys_in_use() {
            self.layer_state
                .entry(key.to_string())
                .or_insert_with(LayerState::default);
        }

        let payload = json!({
            "metadata": model.metadata.clone().unwrap_or(Value::Null),
            "elements": model.tagged().count(),
            "layers": model.layers.len(),
        });
        self.document = Some(model);
        self.fit_view();
        self.events.emit("loaded", payload);
    }

    pub fn document(&self) -> Option<&DocumentModel> {
        self.document.as_ref()
    }

    // ---- viewport ----------------------------------------------------

    /// Tell the viewer how big its viewport is. A fit deferred because the
    /// viewport had no size yet is retried here.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
        if self.pending_fit {
            self.fit_view();
        }
    }

    fn fit_view(&mut self) {
        let Some(model) = &self.document else {
            return;
        };
        let content = GeometryFitter::content_box(model, self.measure.as_ref());
        match self
            .viewport
            .reset_to_fit(content, self.viewport_size, self.options.margin)
        {
            Ok(_) => self.pending_fit = false,
            Err(FitError::ViewportNotReady) => {
                log::debug!("viewport not ready, deferring fit");
                self.pending_fit = true;
            }
        }
    }

    /// Fit-to-view, as a user action.
    pub fn reset_view(&mut self) {
        self.fit_view();
        self.events.emit("reset", Value::Null);
    }

    pub fn viewport_state(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        let zoom = self.viewport.set_zoom(zoom);
        self.events.emit("zoom", json!({ "zoom": zoom }));
        zoom
    }

    pub fn wheel_zoom(&mut self, direction: WheelDirection) -> f64 {
        let zoom = self.viewport.apply_wheel_delta(direction);
        self.events.emit("zoom", json!({ "zoom": zoom }));
        zoom
    }

    pub fn begin_pan(&mut self, cursor: Point) {
        self.viewport.begin_pan(cursor);
    }

    pub fn continue_pan(&mut self, cursor: Point) {
        self.viewport.continue_pan(cursor);
    }

    pub fn end_pan(&mut self) {
        let now = self.clock.now();
        if self.viewport.end_pan(now) {
            let state = self.viewport.state();
            self.events
                .emit("pan", json!({ "x": state.pan_x, "y": state.pan_y }));
        }
    }

    /// Whether a pan just ended; click-driven selection must no-op then.
    pub fn pan_suppressed(&mut self) -> bool {
        let now = self.clock.now();
        self.viewport.has_moved(now)
    }

    // ---- element access ----------------------------------------------

    fn extract(&self, node: &svgeo_core::ElementNode) -> Option<ExtractedRecord> {
        let model = self.document.as_ref()?;
        Some(ExtractedRecord::extract(
            node,
            model,
            &self.filter,
            &self.translator,
        ))
    }

    pub fn get_element_by_ref(&self, ref_id: &str) -> Option<ExtractedRecord> {
        let node = self.document.as_ref()?.node_by_ref(ref_id)?;
        self.extract(node)
    }

    pub fn get_elements_by_class(&self, class: &str) -> Vec<ExtractedRecord> {
        let Some(model) = &self.document else {
            return Vec::new();
        };
        model
            .nodes_by_class(class)
            .filter_map(|n| self.extract(n))
            .collect()
    }

    /// Click-to-inspect: `None` while click suppression is active or when
    /// the reference resolves to nothing.
    pub fn inspect(&mut self, ref_id: &str) -> Option<ExtractedRecord> {
        if self.pan_suppressed() {
            return None;
        }
        self.get_element_by_ref(ref_id)
    }

    /// Tagged elements whose measured box contains the cursor, skipping
    /// hidden layers.
    pub fn elements_under_cursor(&self, screen: Point) -> Vec<ExtractedRecord> {
        let Some(model) = &self.document else {
            return Vec::new();
        };
        let doc_point = self.viewport.state().inverse_transform() * screen;
        model
            .tagged()
            .filter(|n| self.node_layer_visible(n))
            .filter(|n| {
                self.measure
                    .measure(n)
                    .is_some_and(|b| b.contains(doc_point))
            })
            .filter_map(|n| self.extract(n))
            .collect()
    }

    /// One-line info string for the element under the cursor, if any.
    pub fn hover_summary(&self, screen: Point) -> Option<String> {
        self.elements_under_cursor(screen)
            .first()
            .map(|r| r.hover_summary(&self.translator))
    }

    fn node_layer_visible(&self, node: &svgeo_core::ElementNode) -> bool {
        match &node.layer {
            Some(key) => self.layer_state.get(key).map_or(true, |s| s.visible),
            None => true,
        }
    }

    // ---- layers ------------------------------------------------------

    /// Toggle (or set) a layer's visibility; returns the new state.
    pub fn toggle_layer(&mut self, key: &str, visible: Option<bool>) -> bool {
        let state = self.layer_state.entry(key.to_string()).or_default();
        state.visible = visible.unwrap_or(!state.visible);
        state.visible
    }

    pub fn set_layer_opacity(&mut self, key: &str, opacity: f64) {
        let state = self.layer_state.entry(key.to_string()).or_default();
        state.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn layer_state(&self, key: &str) -> LayerState {
        self.layer_state.get(key).copied().unwrap_or_default()
    }

    /// Layer rows sorted by declared order then key, labels resolved in the
    /// document language (falling back to the viewer locale).
    pub fn layers(&self) -> Vec<LayerInfo> {
        let Some(model) = &self.document else {
            return Vec::new();
        };
        let locale = model.language().unwrap_or(&self.options.locale).to_string();
        let mut rows: Vec<LayerInfo> = model
            .layers
            .iter()
            .map(|(key, def)| LayerInfo {
                key: key.clone(),
                label: def.label_for(&locale, key).to_string(),
                order: def.order,
                state: self.layer_state(key),
            })
            .collect();
        rows.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.key.cmp(&b.key)));
        rows
    }

    // ---- locale ------------------------------------------------------

    pub fn set_locale(&mut self, locale: &str) {
        self.options.locale = locale.to_string();
        self.translator.set_locale(locale);
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    // ---- reports -----------------------------------------------------

    /// Formatted report for one element.
    pub fn element_report(&self, ref_id: &str) -> Option<Report> {
        let record = self.get_element_by_ref(ref_id)?;
        Some(Report::single(&record, &self.translator))
    }

    /// Formatted report over every tagged element; `None` without a
    /// document or when nothing is tagged.
    pub fn all_report(&self) -> Option<Report> {
        let model = self.document.as_ref()?;
        let records: Vec<ExtractedRecord> =
            model.tagged().filter_map(|n| self.extract(n)).collect();
        if records.is_empty() {
            return None;
        }
        Some(Report::many(&records, &self.translator))
    }

    // ---- exports -----------------------------------------------------

    /// Save the document markup through the file collaborator.
    pub fn export_as_file(&mut self) -> bool {
        let Some(source) = self.document.as_ref().map(|m| m.source.clone()) else {
            return false;
        };
        match self
            .downloader
            .save(SVG_FILENAME, "image/svg+xml", source.as_bytes())
        {
            Ok(()) => {
                self.events.emit("download", json!({ "format": "svg" }));
                true
            }
            Err(e) => {
                log::error!("file export failed: {e}");
                let msg = self.translator.translate("Failed to copy data").to_string();
                self.notify(msg, NoticeKind::Error);
                false
            }
        }
    }

    /// Rasterize the document and save it as a PNG file.
    pub fn export_image_file(&mut self) -> bool {
        let image = match self.rasterize_document() {
            Ok(image) => image,
            Err(e) => {
                log::error!("image export failed: {e}");
                let msg = self.translator.translate("Failed to copy image").to_string();
                self.notify(msg, NoticeKind::Error);
                return false;
            }
        };
        let encoded = match encode_png(image.width, image.height, &image.rgba) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("png encode failed: {e}");
                return false;
            }
        };
        match self.downloader.save(PNG_FILENAME, "image/png", &encoded) {
            Ok(()) => {
                self.events.emit("download", json!({ "format": "png" }));
                true
            }
            Err(e) => {
                log::error!("file export failed: {e}");
                false
            }
        }
    }

    /// Copy a representation of the document or its data to the clipboard.
    /// Failures degrade and end in a user-visible notice, never a panic or
    /// an error thrown at the host.
    pub fn export_to_clipboard(&mut self, kind: ExportKind) -> bool {
        match kind {
            ExportKind::Svg => self.copy_svg(),
            ExportKind::Image => self.copy_image(),
            ExportKind::ElementData(ref_id) => self.copy_element_data(&ref_id),
            ExportKind::AllData => self.copy_all_data(),
        }
    }

    fn copy_svg(&mut self) -> bool {
        let Some(source) = self.document.as_ref().map(|m| m.source.clone()) else {
            return false;
        };
        let html = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"UTF-8\">\n</head>\n<body>\n  {source}\n</body>\n</html>"
        );
        let payloads = [
            ClipboardPayload::Html {
                html,
                alt_text: source.clone(),
            },
            ClipboardPayload::Text(source),
        ];
        let result = self.clipboard.write(&payloads);
        self.finish_copy(
            "copy",
            json!({ "format": "svg" }),
            "SVG copied to clipboard!",
            "Failed to copy to clipboard",
            result,
        )
    }

    fn copy_image(&mut self) -> bool {
        let result = self.rasterize_document().and_then(|image| {
            self.clipboard.write(&[ClipboardPayload::Image {
                width: image.width as usize,
                height: image.height as usize,
                rgba: image.rgba,
            }])
        });
        self.finish_copy(
            "copy",
            json!({ "format": "png" }),
            "Image copied to clipboard!",
            "Failed to copy image",
            result,
        )
    }

    fn copy_element_data(&mut self, ref_id: &str) -> bool {
        let Some(report) = self.element_report(ref_id) else {
            let msg = self.translator.translate("No data to copy").to_string();
            self.notify(msg, NoticeKind::Error);
            self.events
                .emit("copyData", json!({ "success": false, "ref": ref_id }));
            return false;
        };
        let result = self.clipboard.write(&report_payloads(&report, &self.options.custom_css));
        self.finish_copy(
            "copyData",
            json!({ "format": "html", "ref": ref_id }),
            "Data copied to clipboard!",
            "Failed to copy data",
            result,
        )
    }

    fn copy_all_data(&mut self) -> bool {
        let Some(report) = self.all_report() else {
            let msg = self.translator.translate("No data to copy").to_string();
            self.notify(msg, NoticeKind::Error);
            self.events.emit("copyAllData", json!({ "success": false }));
            return false;
        };
        let count = self
            .document
            .as_ref()
            .map(|m| m.tagged().count())
            .unwrap_or(0);
        let result = self.clipboard.write(&report_payloads(&report, &self.options.custom_css));
        let ok = result.is_ok();
        if ok {
            let msg = format!(
                "{count} {}",
                self.translator.translate("elements copied to clipboard!")
            );
            self.notify(msg, NoticeKind::Success);
        } else {
            let msg = self.translator.translate("Failed to copy data").to_string();
            self.notify(msg, NoticeKind::Error);
        }
        if let Err(e) = result {
            log::error!("copy all data failed: {e}");
        }
        self.events
            .emit("copyAllData", json!({ "success": ok, "count": count }));
        ok
    }

    fn finish_copy(
        &mut self,
        event: &str,
        mut payload: Value,
        ok_key: &str,
        err_key: &str,
        result: Result<(), ExportError>,
    ) -> bool {
        let ok = result.is_ok();
        if let Err(e) = result {
            log::error!("{event} failed: {e}");
        }
        if let Some(map) = payload.as_object_mut() {
            map.insert("success".to_string(), Value::Bool(ok));
        }
        let key = if ok { ok_key } else { err_key };
        let msg = self.translator.translate(key).to_string();
        self.notify(msg, if ok { NoticeKind::Success } else { NoticeKind::Error });
        self.events.emit(event, payload);
        ok
    }

    fn rasterize_document(&self) -> Result<RasterImage, ExportError> {
        let model = self.document.as_ref().ok_or(ExportError::Empty)?;
        let rasterizer = self
            .rasterizer
            .as_ref()
            .ok_or(ExportError::Unsupported("image"))?;

        let content = GeometryFitter::content_box(model, self.measure.as_ref());
        let (w, h) = (content.width().max(1.0), content.height().max(1.0));
        let scale = (MIN_IMAGE_DIMENSION / w.max(h)).max(1.0);
        rasterizer.rasterize(
            &model.source,
            (w * scale).round() as u32,
            (h * scale).round() as u32,
        )
    }

    // ---- events & notices --------------------------------------------

    pub fn subscribe(&mut self, event: &str, handler: impl FnMut(&Value) + 'static) -> HandlerId {
        self.events.subscribe(event, handler)
    }

    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Forward a host-supplied context-menu entry to subscribers.
    pub fn emit_context_menu_item(&mut self, payload: Value) {
        self.events.emit("contextMenuItem", payload);
    }

    /// The transient notice currently visible, if any.
    pub fn current_notice(&mut self) -> Option<Notice> {
        let now = self.clock.now();
        self.notices.current(now).cloned()
    }

    fn notify(&mut self, message: String, kind: NoticeKind) {
        let now = self.clock.now();
        self.notices.show(message, kind, now);
    }

    /// Drop the document and every registered handler.
    pub fn destroy(&mut self) {
        self.document = None;
        self.layer_state.clear();
        self.viewport = ViewportController::new();
        self.pending_fit = false;
        self.events.clear();
    }
}

fn report_payloads(report: &Report, custom_css: &str) -> Vec<ClipboardPayload> {
    let text = report.to_text();
    vec![
        ClipboardPayload::Html {
            html: report.to_html(custom_css),
            alt_text: text.clone(),
        },
        ClipboardPayload::Rtf(report.to_rtf()),
        ClipboardPayload::Text(text),
    ]
}
