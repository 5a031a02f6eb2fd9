/// Session lifecycle. `Ended` stays until the next `start`, which is valid
/// from any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Countdown,
    Running,
    Ended,
}

/// Countdown and session timing, driven by monotonic milliseconds supplied
/// by the caller. Time never comes from the system clock here so the whole
/// state machine runs under simulated time in tests.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    phase: Phase,
    countdown_secs: u32,
    duration_secs: u32,
    countdown_started_at: f64,
    started_at: Option<f64>,
    ends_at: Option<f64>,
    countdown_left: u32,
    seconds_left: u32,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            countdown_secs: 0,
            duration_secs: 0,
            countdown_started_at: 0.0,
            started_at: None,
            ends_at: None,
            countdown_left: 0,
            seconds_left: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Countdown | Phase::Running)
    }

    pub fn start(&mut self, countdown_secs: u32, duration_secs: u32, now_ms: f64) {
        self.phase = Phase::Countdown;
        self.countdown_secs = countdown_secs;
        self.duration_secs = duration_secs;
        self.countdown_started_at = now_ms;
        // The definitive start timestamp is latched on the first Running
        // tick, not here.
        self.started_at = None;
        self.ends_at = None;
        self.countdown_left = countdown_secs;
        self.seconds_left = duration_secs;
    }

    /// Advances the timer one frame. Returns true when the session's time
    /// is up and the caller should end it.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        match self.phase {
            Phase::Countdown => {
                let elapsed = now_ms - self.countdown_started_at;
                let remaining = self
                    .countdown_secs
                    .saturating_sub((elapsed / 1000.0).floor() as u32);
                self.countdown_left = remaining;
                if remaining == 0 {
                    self.phase = Phase::Running;
                }
                false
            }
            Phase::Running => {
                if self.started_at.is_none() {
                    self.started_at = Some(now_ms);
                    self.ends_at = Some(now_ms + self.duration_secs as f64 * 1000.0);
                }
                let ms_left = (self.ends_at.unwrap_or(now_ms) - now_ms).max(0.0);
                // Displayed seconds update only on change; end timing is
                // driven by ms_left itself.
                let secs = (ms_left / 1000.0).ceil() as u32;
                if secs != self.seconds_left {
                    self.seconds_left = secs;
                }
                ms_left <= 0.0
            }
            Phase::Idle | Phase::Ended => false,
        }
    }

    /// Idempotent; returns true only on the transition into `Ended`.
    pub fn end(&mut self) -> bool {
        match self.phase {
            Phase::Countdown | Phase::Running => {
                self.phase = Phase::Ended;
                true
            }
            Phase::Idle | Phase::Ended => false,
        }
    }

    pub fn started_at(&self) -> Option<f64> {
        self.started_at
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn countdown_left(&self) -> u32 {
        self.countdown_left
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    /// True while the start-grace window is open. Before the start
    /// timestamp is latched the window counts as open.
    pub fn in_grace(&self, now_ms: f64, grace_ms: u64) -> bool {
        match self.started_at {
            Some(start) => now_ms - start < grace_ms as f64,
            None => true,
        }
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}
