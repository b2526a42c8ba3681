//! Viewport state machine: zoom/pan composition and click suppression.

use crate::geometry::{FitError, FitTransform, GeometryFitter};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum allowed zoom level.
pub const MIN_ZOOM: f64 = 0.1;
/// Maximum allowed zoom level.
pub const MAX_ZOOM: f64 = 10.0;
/// Per-axis displacement (from pan start) past which a drag stops being a
/// click.
pub const PAN_CLICK_THRESHOLD: f64 = 3.0;
/// How long `has_moved` stays observable after the pan ends, so the click
/// handler fired on the same pointer-up still sees it.
pub const PAN_SUPPRESS_WINDOW: Duration = Duration::from_millis(300);

/// Discrete wheel step direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelDirection {
    In,
    Out,
}

/// Current zoom/pan. Mutated only through [`ViewportController`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl ViewportState {
    /// The document-to-screen transform, anchored at the content origin.
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.pan_x, self.pan_y)) * Affine::scale(self.zoom)
    }

    /// Screen-to-document transform for hit testing.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(Vec2::new(-self.pan_x, -self.pan_y))
    }
}

#[derive(Debug, Clone, Copy)]
struct PanSession {
    /// Cursor-to-pan-origin offset recorded at pan start.
    anchor: Vec2,
    /// Pan value when the session began, for the click threshold.
    start: Vec2,
}

/// Owns [`ViewportState`] and composes gestures into it.
///
/// Single-pointer input: a second `begin_pan` while panning just overwrites
/// the anchor.
#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    state: ViewportState,
    pan: Option<PanSession>,
    has_moved: bool,
    /// Deadline after which `has_moved` reads as cleared. Re-arming a pan
    /// replaces it, so a stale deadline never fires late.
    suppress_until: Option<Duration>,
}

impl ViewportController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// Apply one discrete wheel step: x0.9 out, x1.1 in, clamped.
    /// Zoom is anchored at the content origin, not the cursor.
    pub fn apply_wheel_delta(&mut self, direction: WheelDirection) -> f64 {
        let factor = match direction {
            WheelDirection::In => 1.1,
            WheelDirection::Out => 0.9,
        };
        self.set_zoom(self.state.zoom * factor)
    }

    /// Set the zoom level, clamped to [0.1, 10]. Pan is untouched.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.state.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.state.zoom
    }

    /// Enter the panning state, recording the cursor-to-pan offset.
    pub fn begin_pan(&mut self, cursor: Point) {
        self.pan = Some(PanSession {
            anchor: Vec2::new(cursor.x - self.state.pan_x, cursor.y - self.state.pan_y),
            start: Vec2::new(self.state.pan_x, self.state.pan_y),
        });
        self.has_moved = false;
        self.suppress_until = None;
    }

    /// Recompute pan from the cursor. No-op outside the panning state.
    pub fn continue_pan(&mut self, cursor: Point) {
        let Some(session) = self.pan else {
            return;
        };
        self.state.pan_x = cursor.x - session.anchor.x;
        self.state.pan_y = cursor.y - session.anchor.y;

        if (self.state.pan_x - session.start.x).abs() > PAN_CLICK_THRESHOLD
            || (self.state.pan_y - session.start.y).abs() > PAN_CLICK_THRESHOLD
        {
            self.has_moved = true;
        }
    }

    /// Leave the panning state. If the pointer actually moved, `has_moved`
    /// stays observable until the suppression window elapses.
    pub fn end_pan(&mut self, now: Duration) -> bool {
        if self.pan.take().is_none() {
            return false;
        }
        if self.has_moved {
            self.suppress_until = Some(now + PAN_SUPPRESS_WINDOW);
        }
        true
    }

    /// Whether a pan just happened; click handlers no-op while this is true.
    pub fn has_moved(&mut self, now: Duration) -> bool {
        if let Some(deadline) = self.suppress_until {
            if now >= deadline {
                self.has_moved = false;
                self.suppress_until = None;
            }
        }
        self.has_moved
    }

    /// Replace the state wholesale with a fitted transform.
    pub fn reset_to_fit(
        &mut self,
        content: Rect,
        viewport: Size,
        margin: f64,
    ) -> Result<FitTransform, FitError> {
        let fit = GeometryFitter::fit(content, viewport, margin)?;
        self.apply_fit(fit);
        Ok(fit)
    }

    pub fn apply_fit(&mut self, fit: FitTransform) {
        self.state = ViewportState {
            zoom: fit.zoom,
            pan_x: fit.pan_x,
            pan_y: fit.pan_y,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_wheel_steps() {
        let mut vc = ViewportController::new();
        assert!((vc.apply_wheel_delta(WheelDirection::In) - 1.1).abs() < 1e-12);
        vc.set_zoom(1.0);
        assert!((vc.apply_wheel_delta(WheelDirection::Out) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_wheel_zoom_clamps_at_max() {
        let mut vc = ViewportController::new();
        for _ in 0..10 {
            vc.apply_wheel_delta(WheelDirection::In);
        }
        assert!(vc.state().zoom <= MAX_ZOOM);
        // 1.1^10 ~ 2.59, nowhere near the cap yet
        assert!((vc.state().zoom - 1.1f64.powi(10)).abs() < 1e-9);

        vc.set_zoom(9.5);
        vc.apply_wheel_delta(WheelDirection::In);
        assert_eq!(vc.state().zoom, MAX_ZOOM);
    }

    #[test]
    fn test_set_zoom_idempotent_clamp() {
        let mut vc = ViewportController::new();
        vc.set_zoom(0.01);
        assert_eq!(vc.state().zoom, 0.1);
        vc.set_zoom(50.0);
        assert_eq!(vc.state().zoom, 10.0);
        let before = vc.state();
        vc.set_zoom(10.0);
        assert_eq!(vc.state(), before);
    }

    #[test]
    fn test_zoom_leaves_pan_untouched() {
        let mut vc = ViewportController::new();
        vc.begin_pan(Point::new(0.0, 0.0));
        vc.continue_pan(Point::new(25.0, -10.0));
        vc.end_pan(ms(0));
        let pan = (vc.state().pan_x, vc.state().pan_y);
        vc.set_zoom(2.0);
        assert_eq!((vc.state().pan_x, vc.state().pan_y), pan);
    }

    #[test]
    fn test_pan_tracks_cursor() {
        let mut vc = ViewportController::new();
        vc.begin_pan(Point::new(100.0, 100.0));
        vc.continue_pan(Point::new(130.0, 90.0));
        assert_eq!(vc.state().pan_x, 30.0);
        assert_eq!(vc.state().pan_y, -10.0);
    }

    #[test]
    fn test_continue_pan_requires_session() {
        let mut vc = ViewportController::new();
        vc.continue_pan(Point::new(500.0, 500.0));
        assert_eq!(vc.state(), ViewportState::default());
    }

    #[test]
    fn test_small_drag_is_still_a_click() {
        let mut vc = ViewportController::new();
        vc.begin_pan(Point::new(0.0, 0.0));
        vc.continue_pan(Point::new(2.0, 2.0));
        vc.end_pan(ms(0));
        assert!(!vc.has_moved(ms(0)));
    }

    #[test]
    fn test_click_suppression_window() {
        let mut vc = ViewportController::new();
        vc.begin_pan(Point::new(0.0, 0.0));
        vc.continue_pan(Point::new(10.0, 0.0));
        vc.end_pan(ms(1000));
        // Same tick as pointer-up: the click handler must still see it.
        assert!(vc.has_moved(ms(1000)));
        assert!(vc.has_moved(ms(1299)));
        // After the deferred clear the flag reads false.
        assert!(!vc.has_moved(ms(1300)));
        assert!(!vc.has_moved(ms(5000)));
    }

    #[test]
    fn test_new_pan_replaces_stale_deadline() {
        let mut vc = ViewportController::new();
        vc.begin_pan(Point::new(0.0, 0.0));
        vc.continue_pan(Point::new(10.0, 0.0));
        vc.end_pan(ms(0));
        vc.begin_pan(Point::new(0.0, 0.0));
        vc.continue_pan(Point::new(1.0, 0.0));
        vc.end_pan(ms(100));
        // The second, click-like pan wins; the old deadline is gone.
        assert!(!vc.has_moved(ms(100)));
    }

    #[test]
    fn test_transform_round_trip() {
        let mut vc = ViewportController::new();
        vc.set_zoom(2.0);
        vc.begin_pan(Point::new(0.0, 0.0));
        vc.continue_pan(Point::new(40.0, 30.0));
        vc.end_pan(ms(0));
        let state = vc.state();
        let p = Point::new(12.0, 34.0);
        let round = state.inverse_transform() * (state.transform() * p);
        assert!((round.x - p.x).abs() < 1e-9);
        assert!((round.y - p.y).abs() < 1e-9);
    }
}
