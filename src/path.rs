//! Edge path geometry.
//!
//! Pure functions mapping a pair of endpoints to a path-command string plus a
//! label anchor. The command syntax is SVG-compatible (`M`/`L`/`C`) but any
//! backend able to draw lines and cubic beziers can interpret it.

/// Default minimum control-point offset for bezier edges.
pub const DEFAULT_BEZIER_OFFSET: f32 = 50.0;

/// A rendered connector: path commands plus the point where a label would be
/// anchored (the curve midpoint).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgePath {
    pub commands: String,
    pub label_x: f32,
    pub label_y: f32,
}

impl EdgePath {
    /// The degenerate path used when an edge's endpoints cannot be resolved.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Straight connector between two points.
pub fn straight_path(sx: f32, sy: f32, tx: f32, ty: f32) -> EdgePath {
    EdgePath {
        commands: format!("M {} {} L {} {}", sx, sy, tx, ty),
        label_x: (sx + tx) / 2.0,
        label_y: (sy + ty) / 2.0,
    }
}

/// Axis-aligned step connector: horizontal to the midpoint, vertical, then
/// horizontal into the target.
pub fn step_path(sx: f32, sy: f32, tx: f32, ty: f32) -> EdgePath {
    let mid_x = (sx + tx) / 2.0;
    EdgePath {
        commands: format!(
            "M {} {} L {} {} L {} {} L {} {}",
            sx, sy, mid_x, sy, mid_x, ty, tx, ty
        ),
        label_x: mid_x,
        label_y: (sy + ty) / 2.0,
    }
}

/// Horizontal-biased cubic bezier connector.
///
/// Control points extend horizontally from both endpoints by half the
/// horizontal distance, but never less than `min_offset * zoom`. Endpoints
/// closer than a zoom-scaled threshold fall back to a straight segment to
/// avoid zig-zags.
pub fn bezier_path(sx: f32, sy: f32, tx: f32, ty: f32, zoom: f32, min_offset: f32) -> EdgePath {
    let dx = tx - sx;
    let dy = ty - sy;
    let threshold = 10.0 * zoom;
    if dx * dx + dy * dy < threshold * threshold {
        return straight_path(sx, sy, tx, ty);
    }

    let offset = (dx.abs() * 0.5).max(min_offset * zoom);
    let c1x = sx + offset;
    let c2x = tx - offset;

    // Curve midpoint at t = 0.5: (p0 + 3*p1 + 3*p2 + p3) / 8.
    let label_x = (sx + 3.0 * c1x + 3.0 * c2x + tx) / 8.0;
    let label_y = (sy + 3.0 * sy + 3.0 * ty + ty) / 8.0;

    EdgePath {
        commands: format!(
            "M {} {} C {} {} {} {} {} {}",
            sx, sy, c1x, sy, c2x, ty, tx, ty
        ),
        label_x,
        label_y,
    }
}
