use crate::aim::Aim;
use crate::config::{CursorMode, Settings};
use crate::input::{Button, ClickState, InputTracker};
use crate::motion::{self, Target};
use crate::scoring::{
    summarize, History, SessionTotals, Summary, ERROR_HISTORY_CAP, PATH_HISTORY_CAP,
};
use crate::session::{Phase, SessionTimer};
use crate::util::distance;
use chrono::Local;
use rand::Rng;

/// Logical playfield size. Rendering maps this onto whatever terminal area
/// is available; the simulation never sees device cells.
pub const FIELD_WIDTH: f64 = 800.0;
pub const FIELD_HEIGHT: f64 = 600.0;

/// The drill engine: one object owning every piece of per-session mutable
/// state (timer, target, aim, input, histories), constructed once and fully
/// reset by `start`.
///
/// All timing comes in as monotonic milliseconds from the caller. The only
/// writers are the frame tick and the thin input handlers, which touch
/// disjoint primitive fields.
#[derive(Debug)]
pub struct Drill {
    pub settings: Settings,
    width: f64,
    height: f64,
    timer: SessionTimer,
    target: Target,
    aim: Aim,
    tracker: InputTracker,
    errors: History<f64>,
    path: History<(f64, f64)>,
}

impl Drill {
    pub fn new(settings: Settings) -> Self {
        Self::with_field(settings, FIELD_WIDTH, FIELD_HEIGHT)
    }

    pub fn with_field(settings: Settings, width: f64, height: f64) -> Self {
        let target = Target::spawn(width, height);
        let aim = Aim::for_mode(settings.cursor_mode, width, height);
        Self {
            settings,
            width,
            height,
            timer: SessionTimer::new(),
            target,
            aim,
            tracker: InputTracker::new(),
            errors: History::new(ERROR_HISTORY_CAP),
            path: History::new(PATH_HISTORY_CAP),
        }
    }

    pub fn phase(&self) -> Phase {
        self.timer.phase()
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn aim_point(&self) -> (f64, f64) {
        self.aim.position(self.width, self.height)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn errors(&self) -> &History<f64> {
        &self.errors
    }

    pub fn path(&self) -> &History<(f64, f64)> {
        &self.path
    }

    pub fn countdown_left(&self) -> u32 {
        self.timer.countdown_left()
    }

    pub fn seconds_left(&self) -> u32 {
        self.timer.seconds_left()
    }

    pub fn click_state(&self) -> ClickState {
        self.tracker.click_state()
    }

    pub fn is_captured(&self) -> bool {
        self.tracker.is_captured()
    }

    pub fn set_captured(&mut self, captured: bool) {
        if !captured && self.tracker.is_captured() {
            log::warn!("pointer capture lost, falling back to absolute tracking");
        }
        self.tracker.set_captured(captured);
    }

    /// Valid from any phase. All session-scoped state is reset before the
    /// new session's first frame can run.
    pub fn start(&mut self, now_ms: f64) {
        self.errors.clear();
        self.path.clear();
        self.tracker.reset();
        self.target = Target::spawn(self.width, self.height);
        self.aim = Aim::for_mode(self.settings.cursor_mode, self.width, self.height);
        self.timer
            .start(self.settings.countdown_secs, self.settings.duration_secs, now_ms);
    }

    /// Forced end (explicit stop or focus loss). No-op unless a session is
    /// active.
    pub fn stop(&mut self) -> Option<Summary> {
        self.finish()
    }

    /// Space-bar semantics: stop when a session is active, start otherwise.
    pub fn toggle(&mut self, now_ms: f64) -> Option<Summary> {
        if self.timer.is_active() {
            self.stop()
        } else {
            self.start(now_ms);
            None
        }
    }

    /// One simulation pass per display frame. Returns the session summary
    /// on the frame the session ends, exactly once.
    pub fn on_frame<R: Rng>(&mut self, now_ms: f64, rng: &mut R) -> Option<Summary> {
        // The live CPS window is wall-time based and keeps decaying after
        // the session ends.
        self.tracker.prune_clicks(now_ms / 1000.0);

        if !self.timer.is_active() {
            // Stale tick from a session that no longer exists.
            return None;
        }

        let phase_before = self.timer.phase();
        let expired = self.timer.tick(now_ms);
        // Drain motion every frame so countdown-phase wiggle never leaks
        // into the first running frame.
        let (_dx, dy) = self.tracker.take_delta();

        // The countdown-to-running transition and the first running frame
        // are separate observations; simulation starts on the latter.
        if phase_before != Phase::Running {
            return None;
        }
        if expired {
            return self.finish();
        }

        let in_grace = self.timer.in_grace(now_ms, self.settings.grace_ms);
        motion::step(
            &mut self.target,
            &self.settings,
            dy,
            in_grace,
            self.width,
            self.height,
            rng,
        );

        let error = distance((self.target.x, self.target.y), self.aim_point());
        self.errors.push(error);
        if self.settings.show_path {
            self.path.push((self.target.x, self.target.y));
        }
        None
    }

    /// Returns true when exclusive capture should be requested.
    pub fn on_button_down(&mut self, button: Button, now_ms: f64) -> bool {
        self.tracker.on_button_down(button, now_ms / 1000.0)
    }

    pub fn on_button_up(&mut self, button: Button) {
        self.tracker.on_button_up(button);
    }

    /// Pointer motion. Relative deltas only exist while captured;
    /// uncaptured motion degrades to absolute positioning of a free aim.
    pub fn on_pointer_moved(&mut self, dx: f64, dy: f64, abs_x: f64, abs_y: f64) {
        if self.tracker.is_captured() {
            self.tracker.add_motion(dx, dy);
            self.aim.apply_motion(dx, dy, self.width, self.height);
        } else {
            self.aim.set_absolute(abs_x, abs_y, self.width, self.height);
        }
    }

    /// Geometry re-sync. Target coordinates are logical px and survive
    /// unchanged; a free aim snaps back to center.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.aim.recenter(width, height);
    }

    /// Takes effect on the next `start`; the active session keeps its
    /// strategy.
    pub fn set_cursor_mode(&mut self, mode: CursorMode) {
        self.settings.cursor_mode = mode;
    }

    pub fn set_show_path(&mut self, on: bool) {
        self.settings.show_path = on;
        if !on {
            self.path.clear();
        }
    }

    fn finish(&mut self) -> Option<Summary> {
        if !self.timer.end() {
            return None;
        }
        let counts = self.tracker.counts();
        let totals = SessionTotals {
            shots: counts.left,
            first_click_at: self.tracker.first_click_at(),
            last_click_at: self.tracker.last_click_at(),
        };
        Some(summarize(
            &self.errors,
            self.settings.target_radius,
            totals,
            self.timer.duration_secs(),
            Local::now().format("%H:%M:%S").to_string(),
        ))
    }
}
