//! Viewport state and the pan/zoom service seam.
//!
//! The engine does not recognize pan/zoom gestures itself. A host supplies an
//! implementation of [`PanZoom`] (wrapping whatever gesture recognizer the
//! rendering backend offers) and wires its transform-change callback to
//! [`Flow::apply_transform`](crate::flow::Flow::apply_transform). The
//! [`ViewportController`] owns the committed transform and delegates every
//! transition request to the attached service.

use serde::{Deserialize, Serialize};

/// The pan/zoom transform applied to the logical plane: a translation in
/// screen pixels plus a scale factor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, zoom: 1.0 }
    }
}

impl Viewport {
    pub fn new(x: f32, y: f32, zoom: f32) -> Self {
        Self { x, y, zoom }
    }

    /// Convert a screen-space point (relative to the container) into plane
    /// coordinates under this transform.
    pub fn screen_to_plane(&self, x: f32, y: f32) -> (f32, f32) {
        let z = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        ((x - self.x) / z, (y - self.y) / z)
    }

    /// Convert a plane-space point into screen coordinates.
    pub fn plane_to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.zoom + self.x, y * self.zoom + self.y)
    }
}

/// A rectangular extent `[[min_x, min_y], [max_x, max_y]]` used to constrain
/// viewport transitions.
pub type ViewportExtent = [[f32; 2]; 2];

/// The unbounded logical extent.
pub const INFINITE_EXTENT: ViewportExtent = [
    [f32::NEG_INFINITY, f32::NEG_INFINITY],
    [f32::INFINITY, f32::INFINITY],
];

/// Zoom factor applied by [`ViewportController::zoom_in`] and
/// [`ViewportController::zoom_out`].
pub const ZOOM_STEP: f32 = 1.2;

/// Configuration forwarded to the external gesture recognizer.
#[derive(Clone, Debug, PartialEq)]
pub struct PanZoomUpdateConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub pan_on_drag: bool,
    pub zoom_on_scroll: bool,
    pub zoom_on_double_click: bool,
    pub zoom_on_pinch: bool,
    pub prevent_scrolling: bool,
}

impl Default for PanZoomUpdateConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 2.0,
            pan_on_drag: true,
            zoom_on_scroll: true,
            zoom_on_double_click: true,
            zoom_on_pinch: true,
            prevent_scrolling: true,
        }
    }
}

/// Options for [`Flow::fit_view`](crate::flow::Flow::fit_view).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitViewOptions {
    /// Padding around the content, as a ratio of the container size.
    pub padding: f32,
    /// Override of the controller's minimum zoom for this fit.
    pub min_zoom: Option<f32>,
    /// Override of the controller's maximum zoom for this fit.
    pub max_zoom: Option<f32>,
}

impl Default for FitViewOptions {
    fn default() -> Self {
        Self { padding: 0.1, min_zoom: None, max_zoom: None }
    }
}

/// The external pan/zoom gesture service.
///
/// Implementations own gesture recognition (wheel, pinch, drag-to-pan) and any
/// transition animation. They report every transform change back to the host,
/// which forwards it to [`Flow::apply_transform`](crate::flow::Flow::apply_transform).
pub trait PanZoom {
    /// Push updated interaction configuration to the service.
    fn update(&mut self, config: &PanZoomUpdateConfig);

    /// Request a transition to `viewport`, constrained by a screen-space
    /// rectangle and a logical extent. Returns `true` when the transition was
    /// accepted (it may still animate over several frames).
    fn set_viewport_constrained(
        &mut self,
        viewport: Viewport,
        bounds: ViewportExtent,
        extent: ViewportExtent,
    ) -> bool;

    /// Request a direct scale change, bypassing the rectangle constraint.
    fn scale_to(&mut self, zoom: f32) -> bool;

    /// Release all resources held by the service.
    fn destroy(&mut self);
}

/// Owns the committed viewport transform and the zoom bounds.
///
/// Transition requests return the viewport that should be committed through
/// the apply-transform funnel, or `None` when no service is attached (a soft
/// no-op, not an error).
pub struct ViewportController {
    viewport: Viewport,
    min_zoom: f32,
    max_zoom: f32,
    pan_zoom: Option<Box<dyn PanZoom>>,
}

impl ViewportController {
    pub fn new(initial: Viewport, min_zoom: f32, max_zoom: f32) -> Self {
        Self { viewport: initial, min_zoom, max_zoom, pan_zoom: None }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn min_zoom(&self) -> f32 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Attach the gesture service, pushing the current configuration to it.
    pub fn attach(&mut self, mut service: Box<dyn PanZoom>, config: &PanZoomUpdateConfig) {
        service.update(config);
        self.pan_zoom = Some(service);
    }

    pub fn is_attached(&self) -> bool {
        self.pan_zoom.is_some()
    }

    /// Store a committed transform. This is the state-write half of the
    /// apply-transform funnel; the façade re-applies the visual transform and
    /// emits the notification.
    pub fn commit(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Request a constrained viewport transition. The zoom bound is the
    /// service's constraint to reapply, so the request is forwarded
    /// unchanged; the screen-space bounds come from the container.
    pub fn request_viewport(
        &mut self,
        viewport: Viewport,
        screen_bounds: ViewportExtent,
    ) -> Option<Viewport> {
        let service = self.pan_zoom.as_mut()?;
        service
            .set_viewport_constrained(viewport, screen_bounds, INFINITE_EXTENT)
            .then_some(viewport)
    }

    /// Request a direct zoom change at the current translation.
    pub fn request_zoom(&mut self, target: f32) -> Option<Viewport> {
        let zoom = self.clamp_zoom(target);
        let service = self.pan_zoom.as_mut()?;
        service
            .scale_to(zoom)
            .then_some(Viewport { zoom, ..self.viewport })
    }

    pub fn zoom_in(&mut self) -> Option<Viewport> {
        let target = self.viewport.zoom * ZOOM_STEP;
        self.request_zoom(target)
    }

    pub fn zoom_out(&mut self) -> Option<Viewport> {
        let target = self.viewport.zoom / ZOOM_STEP;
        self.request_zoom(target)
    }

    /// Tear down the attached service, if any.
    pub fn destroy(&mut self) {
        if let Some(mut service) = self.pan_zoom.take() {
            service.destroy();
        }
    }
}
