use crate::util::{mean, round_dp};
use std::collections::VecDeque;

/// Per-frame tracking errors kept for the live sparkline and the session
/// mean.
pub const ERROR_HISTORY_CAP: usize = 300;
/// Recent target positions for the path overlay.
pub const PATH_HISTORY_CAP: usize = 800;

/// Fixed-capacity history; pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct History<T> {
    buf: VecDeque<T>,
    cap: usize,
}

impl<T> History<T> {
    pub fn new(cap: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, value: T) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buf.iter()
    }
}

/// Emitted exactly once per ended session.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Wall-clock label of when the session ended.
    pub ended_at: String,
    pub duration_secs: u32,
    /// Mean tracking error, px, 1 decimal.
    pub avg_error: f64,
    /// Estimated fraction of shots on target, percent, 1 decimal.
    pub hit_rate: f64,
    /// Total left clicks.
    pub shots: u32,
    /// Average clicks per second across the session, 2 decimals.
    pub avg_cps: f64,
}

/// Inputs the aggregator accumulated since the last session start.
#[derive(Debug, Clone, Copy)]
pub struct SessionTotals {
    pub shots: u32,
    pub first_click_at: Option<f64>,
    pub last_click_at: Option<f64>,
}

/// Computes the end-of-session summary. Every ratio short-circuits to 0
/// when its denominator is empty; that is policy, not convenience.
pub fn summarize(
    errors: &History<f64>,
    target_radius: f64,
    totals: SessionTotals,
    duration_secs: u32,
    ended_at: String,
) -> Summary {
    let error_values: Vec<f64> = errors.iter().copied().collect();
    let avg_error = mean(&error_values).unwrap_or(0.0);

    // Proportional estimate: clicks are not timestamped against frames, so
    // the share of on-target frames is scaled by the shot count instead of
    // hit-testing individual clicks.
    let hit_rate = if totals.shots > 0 && !error_values.is_empty() {
        let hit_frames = error_values
            .iter()
            .filter(|&&e| e <= target_radius)
            .count() as f64;
        let approx_hits =
            (hit_frames * totals.shots as f64 / error_values.len() as f64).round();
        approx_hits / totals.shots as f64
    } else {
        0.0
    };

    let avg_cps = match (totals.first_click_at, totals.last_click_at) {
        (Some(first), Some(last)) if totals.shots >= 2 && last > first => {
            (totals.shots as f64 - 1.0) / (last - first)
        }
        _ => 0.0,
    };

    Summary {
        ended_at,
        duration_secs,
        avg_error: round_dp(avg_error, 1),
        hit_rate: round_dp(hit_rate * 100.0, 1),
        shots: totals.shots,
        avg_cps: round_dp(avg_cps, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_of(values: &[f64]) -> History<f64> {
        let mut h = History::new(ERROR_HISTORY_CAP);
        for &v in values {
            h.push(v);
        }
        h
    }

    fn no_clicks() -> SessionTotals {
        SessionTotals {
            shots: 0,
            first_click_at: None,
            last_click_at: None,
        }
    }

    #[test]
    fn history_evicts_oldest_at_capacity() {
        let mut h = History::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            h.push(v);
        }
        assert_eq!(h.len(), 3);
        let values: Vec<f64> = h.iter().copied().collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn empty_session_summary_is_all_zeros() {
        let summary = summarize(&errors_of(&[]), 20.0, no_clicks(), 30, "now".into());
        assert_eq!(summary.avg_error, 0.0);
        assert_eq!(summary.hit_rate, 0.0);
        assert_eq!(summary.shots, 0);
        assert_eq!(summary.avg_cps, 0.0);
    }

    #[test]
    fn mean_error_rounds_to_one_decimal() {
        let summary = summarize(
            &errors_of(&[1.0, 2.0, 2.33]),
            20.0,
            no_clicks(),
            30,
            "now".into(),
        );
        assert_eq!(summary.avg_error, 1.8);
    }

    #[test]
    fn hit_rate_zero_without_shots() {
        let summary = summarize(&errors_of(&[1.0, 1.0]), 20.0, no_clicks(), 30, "now".into());
        assert_eq!(summary.hit_rate, 0.0);
    }

    #[test]
    fn hit_rate_scales_on_target_frame_share() {
        // Half the frames on target, 10 shots: 5 estimated hits.
        let totals = SessionTotals {
            shots: 10,
            first_click_at: Some(0.0),
            last_click_at: Some(9.0),
        };
        let summary = summarize(
            &errors_of(&[5.0, 5.0, 50.0, 50.0]),
            20.0,
            totals,
            30,
            "now".into(),
        );
        assert_eq!(summary.hit_rate, 50.0);
    }

    #[test]
    fn hit_rate_is_monotonic_in_shots() {
        // Half the frames on target; even shot counts keep the estimator
        // exact so rounding cannot wobble the comparison.
        let errors = errors_of(&[5.0, 50.0]);
        let mut previous = -1.0;
        for shots in (2..=40).step_by(2) {
            let totals = SessionTotals {
                shots,
                first_click_at: Some(0.0),
                last_click_at: Some(shots as f64),
            };
            let summary = summarize(&errors, 20.0, totals, 30, "now".into());
            assert!(
                summary.hit_rate >= previous,
                "hit rate dropped at shots={shots}"
            );
            previous = summary.hit_rate;
        }
    }

    #[test]
    fn avg_cps_needs_two_clicks_and_positive_span() {
        let one = SessionTotals {
            shots: 1,
            first_click_at: Some(1.0),
            last_click_at: Some(1.0),
        };
        assert_eq!(
            summarize(&errors_of(&[1.0]), 20.0, one, 30, "now".into()).avg_cps,
            0.0
        );

        let simultaneous = SessionTotals {
            shots: 2,
            first_click_at: Some(1.0),
            last_click_at: Some(1.0),
        };
        assert_eq!(
            summarize(&errors_of(&[1.0]), 20.0, simultaneous, 30, "now".into()).avg_cps,
            0.0
        );
    }

    #[test]
    fn two_clicks_one_second_apart_is_one_cps() {
        let totals = SessionTotals {
            shots: 2,
            first_click_at: Some(3.0),
            last_click_at: Some(4.0),
        };
        let summary = summarize(&errors_of(&[1.0]), 20.0, totals, 30, "now".into());
        assert_eq!(summary.avg_cps, 1.0);
    }

    #[test]
    fn avg_cps_rounds_to_two_decimals() {
        let totals = SessionTotals {
            shots: 4,
            first_click_at: Some(0.0),
            last_click_at: Some(0.9),
        };
        let summary = summarize(&errors_of(&[1.0]), 20.0, totals, 30, "now".into());
        // 3 intervals over 0.9 s.
        assert_eq!(summary.avg_cps, 3.33);
    }
}
