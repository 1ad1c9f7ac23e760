//! Plane-space geometry primitives and viewport fitting math.
//!
//! Everything here is a pure function over value types; no engine state is
//! involved.

use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

/// A point in the logical plane (not screen space).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct XYPosition {
    pub x: f32,
    pub y: f32,
}

impl XYPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: XYPosition) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// An axis-aligned rectangle in the logical plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> XYPosition {
        XYPosition::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// Bounding box of a set of rectangles, or `None` for an empty set.
pub fn bounds_of(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

/// Compute the viewport that frames `bounds` inside a container of the given
/// size, leaving `padding` (a ratio of the container size) around it. The
/// resulting zoom is clamped to `[min_zoom, max_zoom]` and the bounds center
/// lands on the container center.
pub fn viewport_for_bounds(
    bounds: Rect,
    container_width: f32,
    container_height: f32,
    min_zoom: f32,
    max_zoom: f32,
    padding: f32,
) -> Viewport {
    let x_zoom = container_width / (bounds.width * (1.0 + padding));
    let y_zoom = container_height / (bounds.height * (1.0 + padding));
    let zoom = x_zoom.min(y_zoom).clamp(min_zoom, max_zoom);

    let center = bounds.center();
    Viewport {
        x: container_width / 2.0 - center.x * zoom,
        y: container_height / 2.0 - center.y * zoom,
        zoom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, -5.0, 10.0, 10.0);
        assert_eq!(a.union(b), Rect::new(0.0, -5.0, 30.0, 15.0));
    }

    #[test]
    fn bounds_of_empty_is_none() {
        assert!(bounds_of(Vec::new()).is_none());
    }

    #[test]
    fn bounds_of_single_rect_is_that_rect() {
        let r = Rect::new(5.0, 6.0, 7.0, 8.0);
        assert_eq!(bounds_of([r]), Some(r));
    }

    #[test]
    fn bounds_of_spans_all_rects() {
        let rects = [
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Rect::new(200.0, 100.0, 100.0, 50.0),
            Rect::new(-50.0, 25.0, 10.0, 10.0),
        ];
        assert_eq!(bounds_of(rects), Some(Rect::new(-50.0, 0.0, 350.0, 150.0)));
    }

    #[test]
    fn center_of_rect() {
        let r = Rect::new(50.0, 50.0, 100.0, 50.0);
        assert_eq!(r.center(), XYPosition::new(100.0, 75.0));
    }

    #[test]
    fn viewport_for_bounds_centers_content() {
        // One default-sized node at (50, 50) in an 800x600 container. Fitting
        // zoom would exceed the maximum, so it clamps to 2.0 and the node
        // center (100, 75) must land on the container center (400, 300).
        let bounds = Rect::new(50.0, 50.0, 100.0, 50.0);
        let v = viewport_for_bounds(bounds, 800.0, 600.0, 0.5, 2.0, 0.1);

        assert_eq!(v.zoom, 2.0);
        let (sx, sy) = v.plane_to_screen(100.0, 75.0);
        assert!((sx - 400.0).abs() < 1e-3);
        assert!((sy - 300.0).abs() < 1e-3);
    }

    #[test]
    fn viewport_for_bounds_clamps_to_min_zoom() {
        // Content far larger than the container.
        let bounds = Rect::new(0.0, 0.0, 10_000.0, 10_000.0);
        let v = viewport_for_bounds(bounds, 800.0, 600.0, 0.5, 2.0, 0.1);
        assert_eq!(v.zoom, 0.5);
    }

    #[test]
    fn viewport_for_bounds_padding_shrinks_zoom() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 300.0);
        let tight = viewport_for_bounds(bounds, 800.0, 600.0, 0.1, 10.0, 0.0);
        let padded = viewport_for_bounds(bounds, 800.0, 600.0, 0.1, 10.0, 0.5);
        assert!(padded.zoom < tight.zoom);
        assert_eq!(tight.zoom, 2.0);
    }

    #[test]
    fn distance_sq_is_squared_euclidean() {
        let a = XYPosition::new(0.0, 0.0);
        let b = XYPosition::new(3.0, 4.0);
        assert_eq!(a.distance_sq(b), 25.0);
    }
}
