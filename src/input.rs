use std::collections::VecDeque;

/// Trailing window used for the live clicks-per-second readout.
const CPS_WINDOW_SECS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Middle,
    Right,
}

impl Button {
    fn index(self) -> usize {
        match self {
            Button::Left => 0,
            Button::Middle => 1,
            Button::Right => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonCounts {
    pub left: u32,
    pub middle: u32,
    pub right: u32,
}

/// Per-frame snapshot handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickState {
    pub left: bool,
    pub middle: bool,
    pub right: bool,
    pub cps: f64,
    pub counts: ButtonCounts,
}

/// Accumulates raw pointer state between frames.
///
/// Event handlers only touch cheap fields here; the frame tick drains the
/// motion accumulator and prunes the click window, so every frame sees one
/// consistent snapshot.
#[derive(Debug)]
pub struct InputTracker {
    down: [bool; 3],
    counts: ButtonCounts,
    /// Left-click timestamps (seconds) inside the trailing CPS window,
    /// appended monotonically and pruned oldest-first.
    recent_clicks: VecDeque<f64>,
    first_click_at: Option<f64>,
    last_click_at: Option<f64>,
    pending_dx: f64,
    pending_dy: f64,
    captured: bool,
}

impl InputTracker {
    pub fn new() -> Self {
        Self {
            down: [false; 3],
            counts: ButtonCounts::default(),
            recent_clicks: VecDeque::new(),
            first_click_at: None,
            last_click_at: None,
            pending_dx: 0.0,
            pending_dy: 0.0,
            captured: false,
        }
    }

    /// Clears session-scoped state. Physical button-down flags and the
    /// capture flag survive, they describe the pointer, not the session.
    pub fn reset(&mut self) {
        self.counts = ButtonCounts::default();
        self.recent_clicks.clear();
        self.first_click_at = None;
        self.last_click_at = None;
        self.pending_dx = 0.0;
        self.pending_dy = 0.0;
    }

    /// Registers a down-transition. Returns true when capture should be
    /// requested (first button press while uncaptured).
    pub fn on_button_down(&mut self, button: Button, now_secs: f64) -> bool {
        let idx = button.index();
        if self.down[idx] {
            return false;
        }
        self.down[idx] = true;
        match button {
            Button::Left => {
                self.counts.left += 1;
                self.recent_clicks.push_back(now_secs);
                if self.first_click_at.is_none() {
                    self.first_click_at = Some(now_secs);
                }
                self.last_click_at = Some(now_secs);
            }
            Button::Middle => self.counts.middle += 1,
            Button::Right => self.counts.right += 1,
        }
        !self.captured
    }

    pub fn on_button_up(&mut self, button: Button) {
        self.down[button.index()] = false;
    }

    pub fn add_motion(&mut self, dx: f64, dy: f64) {
        self.pending_dx += dx;
        self.pending_dy += dy;
    }

    /// Drains the motion accumulated since the previous frame.
    pub fn take_delta(&mut self) -> (f64, f64) {
        let delta = (self.pending_dx, self.pending_dy);
        self.pending_dx = 0.0;
        self.pending_dy = 0.0;
        delta
    }

    /// Drops click timestamps older than the CPS window. Timestamps arrive
    /// in order, so pruning from the front is sufficient.
    pub fn prune_clicks(&mut self, now_secs: f64) {
        while let Some(&oldest) = self.recent_clicks.front() {
            if now_secs - oldest > CPS_WINDOW_SECS {
                self.recent_clicks.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn live_cps(&self) -> f64 {
        self.recent_clicks.len() as f64
    }

    pub fn counts(&self) -> ButtonCounts {
        self.counts
    }

    pub fn first_click_at(&self) -> Option<f64> {
        self.first_click_at
    }

    pub fn last_click_at(&self) -> Option<f64> {
        self.last_click_at
    }

    pub fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    pub fn click_state(&self) -> ClickState {
        ClickState {
            left: self.down[0],
            middle: self.down[1],
            right: self.down[2],
            cps: self.live_cps(),
            counts: self.counts,
        }
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}
