use crate::config::CursorMode;

/// Aim-point strategy, picked once per session from the cursor mode.
///
/// `Fixed` derives the aim point from the playfield geometry; `Free` owns a
/// mutable position fed by pointer motion. Keeping both behind one type
/// keeps mode conditionals out of the motion model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aim {
    Fixed,
    Free { x: f64, y: f64 },
}

impl Aim {
    pub fn for_mode(mode: CursorMode, width: f64, height: f64) -> Self {
        match mode {
            CursorMode::Fixed => Aim::Fixed,
            CursorMode::Free => Aim::Free {
                x: width / 2.0,
                y: height / 2.0,
            },
        }
    }

    pub fn position(&self, width: f64, height: f64) -> (f64, f64) {
        match *self {
            Aim::Fixed => (width / 2.0, height / 2.0),
            Aim::Free { x, y } => (x, y),
        }
    }

    /// Capture-relative motion. No-op for a fixed crosshair.
    pub fn apply_motion(&mut self, dx: f64, dy: f64, width: f64, height: f64) {
        if let Aim::Free { x, y } = self {
            *x = (*x + dx).clamp(0.0, width);
            *y = (*y + dy).clamp(0.0, height);
        }
    }

    /// Absolute pointer position, used when no capture is held.
    pub fn set_absolute(&mut self, px: f64, py: f64, width: f64, height: f64) {
        if let Aim::Free { x, y } = self {
            *x = px.clamp(0.0, width);
            *y = py.clamp(0.0, height);
        }
    }

    /// Geometry re-sync after a resize; free aim snaps back to center.
    pub fn recenter(&mut self, width: f64, height: f64) {
        if let Aim::Free { x, y } = self {
            *x = width / 2.0;
            *y = height / 2.0;
        }
    }
}
