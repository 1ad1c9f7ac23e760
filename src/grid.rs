//! Background grid shell.
//!
//! A presentational shell that re-derives an infinite-grid path from the
//! committed viewport. It holds no reference to the façade; the host forwards
//! [`FlowEvent::ViewportChanged`](crate::events::FlowEvent) payloads into
//! [`BackgroundGrid::set_viewport`].

use std::fmt::Write;

use crate::observable::Observable;
use crate::viewport::Viewport;

/// Grid lines disappear below this on-screen spacing.
const MIN_VISIBLE_SPACING: f32 = 4.0;

/// Path commands for a grid covering a `width` x `height` surface under the
/// given viewport. The pan offset wraps modulo the effective spacing so the
/// grid appears infinite.
pub fn grid_commands(width: f32, height: f32, viewport: &Viewport, spacing: f32) -> String {
    let effective = spacing * viewport.zoom;
    if effective < MIN_VISIBLE_SPACING {
        return String::new();
    }

    let offset_x = viewport.x.rem_euclid(effective);
    let offset_y = viewport.y.rem_euclid(effective);

    let mut commands = String::new();
    let mut x = offset_x;
    while x < width + effective {
        if !commands.is_empty() {
            commands.push(' ');
        }
        let _ = write!(commands, "M {} 0 L {} {}", x, x, height);
        x += effective;
    }
    let mut y = offset_y;
    while y < height + effective {
        let _ = write!(commands, " M 0 {} L {} {}", y, width, y);
        y += effective;
    }
    commands
}

/// Viewport-driven grid state for a background layer.
pub struct BackgroundGrid {
    width: f32,
    height: f32,
    spacing: f32,
    viewport: Observable<Viewport>,
    commands: String,
}

impl BackgroundGrid {
    pub fn new(width: f32, height: f32, spacing: f32) -> Self {
        let viewport = Viewport::default();
        Self {
            width,
            height,
            spacing,
            commands: grid_commands(width, height, &viewport, spacing),
            viewport: Observable::new(viewport),
        }
    }

    pub fn commands(&self) -> &str {
        &self.commands
    }

    pub fn viewport(&self) -> Viewport {
        *self.viewport.get()
    }

    /// Feed a committed viewport in; regenerates the path only on an actual
    /// change. Returns whether a regeneration happened.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        if !self.viewport.set(viewport) {
            return false;
        }
        self.commands = grid_commands(self.width, self.height, self.viewport.get(), self.spacing);
        true
    }
}
