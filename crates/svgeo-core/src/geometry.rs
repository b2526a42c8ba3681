//! Fit-to-view geometry: content bounding boxes and the fitted transform.

use crate::document::{DocumentModel, ElementNode};
use kurbo::{BezPath, Circle, Ellipse, Line, Point, Rect, Shape, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback content size when the document declares nothing measurable.
pub const FALLBACK_SIZE: Size = Size::new(800.0, 600.0);

#[derive(Debug, Error)]
pub enum FitError {
    /// The viewport has no size yet; callers retry once it does.
    #[error("viewport has zero width or height")]
    ViewportNotReady,
}

/// Scale and offset that place a content box inside a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitTransform {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

/// Bounding-box query over a document node.
///
/// Injected so the fitter never depends on how boxes are produced; the
/// default implementation computes them from shape attributes.
pub trait Measure {
    fn measure(&self, node: &ElementNode) -> Option<Rect>;
}

/// Measures basic SVG shapes from their attributes, including `path` data
/// via kurbo's svg-path parser. Unknown tags yield `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeMeasure;

impl Measure for ShapeMeasure {
    fn measure(&self, node: &ElementNode) -> Option<Rect> {
        match node.tag.as_str() {
            "rect" | "image" => {
                let x = node.attr_f64("x").unwrap_or(0.0);
                let y = node.attr_f64("y").unwrap_or(0.0);
                let w = node.attr_f64("width")?;
                let h = node.attr_f64("height")?;
                Some(Rect::new(x, y, x + w, y + h))
            }
            "circle" => {
                let cx = node.attr_f64("cx").unwrap_or(0.0);
                let cy = node.attr_f64("cy").unwrap_or(0.0);
                let r = node.attr_f64("r")?;
                Some(Circle::new(Point::new(cx, cy), r).bounding_box())
            }
            "ellipse" => {
                let cx = node.attr_f64("cx").unwrap_or(0.0);
                let cy = node.attr_f64("cy").unwrap_or(0.0);
                let rx = node.attr_f64("rx")?;
                let ry = node.attr_f64("ry")?;
                Some(Ellipse::new(Point::new(cx, cy), (rx, ry), 0.0).bounding_box())
            }
            "line" => {
                let p0 = Point::new(node.attr_f64("x1")?, node.attr_f64("y1")?);
                let p1 = Point::new(node.attr_f64("x2")?, node.attr_f64("y2")?);
                Some(Line::new(p0, p1).bounding_box())
            }
            "polyline" | "polygon" => points_bounds(node.attr("points")?),
            "path" => {
                let path = BezPath::from_svg(node.attr("d")?).ok()?;
                if path.elements().is_empty() {
                    None
                } else {
                    Some(path.bounding_box())
                }
            }
            _ => None,
        }
    }
}

fn points_bounds(points: &str) -> Option<Rect> {
    let coords: Vec<f64> = points
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    let mut pairs = coords.chunks_exact(2);
    let first = pairs.next()?;
    let mut bounds = Rect::from_origin_size(Point::new(first[0], first[1]), Size::ZERO);
    for pair in pairs {
        bounds = bounds.union_pt(Point::new(pair[0], pair[1]));
    }
    Some(bounds)
}

/// Computes the zoom/pan that fits a content box into a viewport.
/// Pure and stateless; the controller owns the resulting state.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryFitter;

impl GeometryFitter {
    /// Fit `content` into `viewport` leaving `margin` on every side.
    ///
    /// The zoom is capped at 1.0: content smaller than the viewport is shown
    /// at native scale, never magnified. A degenerate content box falls back
    /// to the identity transform rather than dividing by zero.
    pub fn fit(content: Rect, viewport: Size, margin: f64) -> Result<FitTransform, FitError> {
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            return Err(FitError::ViewportNotReady);
        }
        if content.width() <= 0.0 || content.height() <= 0.0 {
            log::warn!("degenerate content box {content:?}, using identity transform");
            return Ok(FitTransform {
                zoom: 1.0,
                pan_x: 0.0,
                pan_y: 0.0,
            });
        }

        let scale_x = (viewport.width - 2.0 * margin) / content.width();
        let scale_y = (viewport.height - 2.0 * margin) / content.height();
        let zoom = scale_x.min(scale_y).min(1.0);

        Ok(FitTransform {
            zoom,
            pan_x: (viewport.width - content.width() * zoom) / 2.0 - content.x0 * zoom,
            pan_y: (viewport.height - content.height() * zoom) / 2.0 - content.y0 * zoom,
        })
    }

    /// Resolve the content box for a document.
    ///
    /// A declared view-box wins verbatim, even over the rendered extents.
    /// Otherwise the union of per-node measured boxes (skipping zero-sized
    /// ones), then declared width/height, then 800x600.
    pub fn content_box(model: &DocumentModel, measure: &dyn Measure) -> Rect {
        if let Some(vb) = model.view_box {
            return vb;
        }

        let mut union: Option<Rect> = None;
        for node in &model.nodes {
            if let Some(b) = measure.measure(node) {
                if b.width() > 0.0 && b.height() > 0.0 {
                    union = Some(match union {
                        Some(u) => u.union(b),
                        None => b,
                    });
                }
            }
        }
        if let Some(u) = union {
            return u;
        }

        let (w, h) = model.declared_size.unwrap_or((FALLBACK_SIZE.width, FALLBACK_SIZE.height));
        Rect::new(0.0, 0.0, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentModel;

    #[test]
    fn test_fit_never_magnifies() {
        let fit = GeometryFitter::fit(
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Size::new(400.0, 400.0),
            40.0,
        )
        .unwrap();
        assert_eq!(fit.zoom, 1.0);
    }

    #[test]
    fn test_fit_shrinks_to_smaller_axis() {
        let fit = GeometryFitter::fit(
            Rect::new(0.0, 0.0, 640.0, 320.0),
            Size::new(400.0, 400.0),
            40.0,
        )
        .unwrap();
        assert_eq!(fit.zoom, 320.0 / 640.0);
    }

    #[test]
    fn test_fit_centers_with_offset_origin() {
        // Declared view-box "0 0 200 100" into 400x400 with margin 40:
        // zoom = min(320/200, 320/100, 1) = 1, pan centers the box.
        let fit = GeometryFitter::fit(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Size::new(400.0, 400.0),
            40.0,
        )
        .unwrap();
        assert_eq!(fit.zoom, 1.0);
        assert_eq!(fit.pan_x, 100.0);
        assert_eq!(fit.pan_y, 150.0);
    }

    #[test]
    fn test_fit_offsets_nonzero_min() {
        let fit = GeometryFitter::fit(
            Rect::new(50.0, 20.0, 250.0, 120.0),
            Size::new(400.0, 400.0),
            40.0,
        )
        .unwrap();
        assert_eq!(fit.zoom, 1.0);
        assert_eq!(fit.pan_x, (400.0 - 200.0) / 2.0 - 50.0);
        assert_eq!(fit.pan_y, (400.0 - 100.0) / 2.0 - 20.0);
    }

    #[test]
    fn test_zero_viewport_not_ready() {
        let result = GeometryFitter::fit(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Size::new(0.0, 300.0),
            40.0,
        );
        assert!(matches!(result, Err(FitError::ViewportNotReady)));
    }

    #[test]
    fn test_degenerate_content_identity() {
        let fit = GeometryFitter::fit(Rect::ZERO, Size::new(400.0, 400.0), 40.0).unwrap();
        assert_eq!(fit.zoom, 1.0);
        assert_eq!(fit.pan_x, 0.0);
        assert_eq!(fit.pan_y, 0.0);
    }

    #[test]
    fn test_view_box_wins_over_extents() {
        let model = DocumentModel::parse(
            r#"<svg viewBox="0 0 200 100" data-svg-geo-version="0.2">
                 <rect x="0" y="0" width="5000" height="5000"/>
               </svg>"#,
        )
        .unwrap();
        let content = GeometryFitter::content_box(&model, &ShapeMeasure);
        assert_eq!(content, Rect::new(0.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn test_measured_union_skips_zero_boxes() {
        let model = DocumentModel::parse(
            r#"<svg data-svg-geo-version="0.2">
                 <rect x="10" y="20" width="30" height="40"/>
                 <rect x="0" y="0" width="0" height="100"/>
                 <line x1="60" y1="25" x2="90" y2="70"/>
               </svg>"#,
        )
        .unwrap();
        let content = GeometryFitter::content_box(&model, &ShapeMeasure);
        assert_eq!(content, Rect::new(10.0, 20.0, 90.0, 70.0));
    }

    #[test]
    fn test_content_box_ignores_defs_content() {
        let model = DocumentModel::parse(
            r#"<svg data-svg-geo-version="0.2">
                 <defs><rect width="9000" height="9000"/></defs>
                 <rect x="10" y="20" width="30" height="40"/>
               </svg>"#,
        )
        .unwrap();
        let content = GeometryFitter::content_box(&model, &ShapeMeasure);
        assert_eq!(content, Rect::new(10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn test_declared_size_fallback() {
        let model = DocumentModel::parse(
            r#"<svg width="320" height="240" data-svg-geo-version="0.2"><g/></svg>"#,
        )
        .unwrap();
        let content = GeometryFitter::content_box(&model, &ShapeMeasure);
        assert_eq!(content, Rect::new(0.0, 0.0, 320.0, 240.0));
    }

    #[test]
    fn test_default_size_fallback() {
        let model =
            DocumentModel::parse(r#"<svg data-svg-geo-version="0.2"><g/></svg>"#).unwrap();
        let content = GeometryFitter::content_box(&model, &ShapeMeasure);
        assert_eq!(content, Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn test_shape_measure_path_and_polygon() {
        let mut node = ElementNode {
            tag: "path".to_string(),
            ..Default::default()
        };
        node.attrs
            .insert("d".to_string(), "M 0 0 L 100 0 L 100 50 Z".to_string());
        let bounds = ShapeMeasure.measure(&node).unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 100.0, 50.0));

        let mut poly = ElementNode {
            tag: "polygon".to_string(),
            ..Default::default()
        };
        poly.attrs
            .insert("points".to_string(), "0,0 10,0 10,20".to_string());
        assert_eq!(
            ShapeMeasure.measure(&poly).unwrap(),
            Rect::new(0.0, 0.0, 10.0, 20.0)
        );
    }
}
