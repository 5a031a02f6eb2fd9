use crate::config::{CursorMode, Settings};
use rand::Rng;

/// Nominal frame duration. The integrator deliberately assumes a fixed
/// 60 Hz step instead of measuring wall-clock deltas; per-frame
/// displacement is constant regardless of actual frame pacing.
pub const FRAME_DT: f64 = 1.0 / 60.0;

/// Horizontal perturbation applied when the target wraps, px.
pub const WRAP_X_JITTER: f64 = 100.0;

/// The single moving point the drill tracks, in logical playfield px.
/// Screen convention: y grows downward, so recoil drift decreases y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub x: f64,
    pub y: f64,
}

impl Target {
    /// Session spawn point: horizontal center, three quarters down.
    pub fn spawn(width: f64, height: f64) -> Self {
        Self {
            x: width / 2.0,
            y: height * 0.75,
        }
    }
}

/// Shapes a raw vertical pointer delta into a compensation input:
/// dead-zone first, then grace suppression of downward (positive) motion.
/// Upward corrections are never suppressed.
pub fn shape_delta(dy: f64, dead_zone: f64, in_grace: bool) -> f64 {
    if dy.abs() < dead_zone {
        return 0.0;
    }
    if in_grace && dy > 0.0 {
        return 0.0;
    }
    dy
}

/// Advances the target one frame: recoil drift up, compensation down (or
/// up), then the one-directional wrap past the top edge.
pub fn step<R: Rng>(
    target: &mut Target,
    settings: &Settings,
    raw_dy: f64,
    in_grace: bool,
    width: f64,
    height: f64,
    rng: &mut R,
) {
    let jitter = if settings.recoil_jitter > 0.0 {
        rng.gen_range(-settings.recoil_jitter..=settings.recoil_jitter)
    } else {
        0.0
    };
    let speed = settings.recoil_speed + jitter;

    let dy = shape_delta(raw_dy, settings.dead_zone, in_grace);
    // In free mode the user's own crosshair motion is the tracking action;
    // no separate compensation term.
    let compensation = match settings.cursor_mode {
        CursorMode::Fixed => dy * settings.compensation_gain,
        CursorMode::Free => 0.0,
    };

    target.y -= speed * FRAME_DT;
    target.y += compensation;

    let radius = settings.target_radius;
    if target.y < -radius {
        target.y = height + radius;
        let offset = rng.gen_range(-WRAP_X_JITTER..=WRAP_X_JITTER);
        // Order-safe for targets wider than half the field, where the
        // clamp bounds invert.
        target.x = (target.x + offset).min(width - radius).max(radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    const WIDTH: f64 = 800.0;
    const HEIGHT: f64 = 600.0;

    fn quiet_settings() -> Settings {
        Settings {
            recoil_speed: 60.0,
            recoil_jitter: 0.0,
            compensation_gain: 1.0,
            dead_zone: 2.0,
            ..Settings::default()
        }
    }

    fn rng() -> StepRng {
        StepRng::new(0, 0)
    }

    #[test]
    fn spawn_is_centered_three_quarters_down() {
        let target = Target::spawn(WIDTH, HEIGHT);
        assert_eq!(target.x, 400.0);
        assert_eq!(target.y, 450.0);
    }

    #[test]
    fn recoil_moves_target_up_by_fixed_step() {
        let settings = quiet_settings();
        let mut target = Target::spawn(WIDTH, HEIGHT);
        step(&mut target, &settings, 0.0, false, WIDTH, HEIGHT, &mut rng());
        // 60 px/s at the nominal 1/60 s step is exactly one px per frame.
        assert!((target.y - 449.0).abs() < 1e-9);
        assert_eq!(target.x, 400.0);
    }

    #[test]
    fn dead_zone_zeroes_small_deltas() {
        let settings = quiet_settings();

        let mut with_small = Target::spawn(WIDTH, HEIGHT);
        step(
            &mut with_small,
            &settings,
            1.9,
            false,
            WIDTH,
            HEIGHT,
            &mut rng(),
        );

        let mut without = Target::spawn(WIDTH, HEIGHT);
        step(&mut without, &settings, 0.0, false, WIDTH, HEIGHT, &mut rng());

        assert_eq!(with_small.y, without.y);
    }

    #[test]
    fn delta_at_dead_zone_threshold_passes() {
        let settings = quiet_settings();
        let mut target = Target::spawn(WIDTH, HEIGHT);
        step(&mut target, &settings, 2.0, false, WIDTH, HEIGHT, &mut rng());
        assert!((target.y - (449.0 + 2.0)).abs() < 1e-9);
    }

    #[test]
    fn grace_suppresses_downward_motion_only() {
        assert_eq!(shape_delta(5.0, 1.0, true), 0.0);
        assert_eq!(shape_delta(-5.0, 1.0, true), -5.0);
        assert_eq!(shape_delta(5.0, 1.0, false), 5.0);
    }

    #[test]
    fn compensation_applies_gain_in_fixed_mode() {
        let settings = Settings {
            compensation_gain: 2.0,
            ..quiet_settings()
        };
        let mut target = Target::spawn(WIDTH, HEIGHT);
        step(&mut target, &settings, 3.0, false, WIDTH, HEIGHT, &mut rng());
        assert!((target.y - (449.0 + 6.0)).abs() < 1e-9);
    }

    #[test]
    fn free_mode_never_compensates() {
        let settings = Settings {
            cursor_mode: CursorMode::Free,
            ..quiet_settings()
        };
        let mut target = Target::spawn(WIDTH, HEIGHT);
        step(
            &mut target,
            &settings,
            50.0,
            false,
            WIDTH,
            HEIGHT,
            &mut rng(),
        );
        assert!((target.y - 449.0).abs() < 1e-9);
    }

    #[test]
    fn target_wraps_to_bottom_past_top_edge() {
        let settings = quiet_settings();
        let radius = settings.target_radius;
        let mut target = Target {
            x: 400.0,
            y: -radius - 1.0,
        };
        step(&mut target, &settings, 0.0, false, WIDTH, HEIGHT, &mut rng());
        assert_eq!(target.y, HEIGHT + radius);
        assert!(target.x >= radius && target.x <= WIDTH - radius);
    }

    #[test]
    fn wrap_clamps_x_inside_field() {
        let settings = quiet_settings();
        let radius = settings.target_radius;
        // StepRng yields the low end of gen_range, a -100 px offset.
        let mut target = Target {
            x: radius + 1.0,
            y: -radius - 1.0,
        };
        step(&mut target, &settings, 0.0, false, WIDTH, HEIGHT, &mut rng());
        assert_eq!(target.x, radius);
    }

    #[test]
    fn wrap_with_oversized_radius_does_not_panic() {
        // A radius past half the field width inverts the clamp bounds;
        // the wrap must still land on the near edge.
        let settings = Settings {
            target_radius: 450.0,
            ..quiet_settings()
        };
        let mut target = Target {
            x: 400.0,
            y: -451.0,
        };
        step(&mut target, &settings, 0.0, false, WIDTH, HEIGHT, &mut rng());
        assert_eq!(target.y, HEIGHT + 450.0);
        assert_eq!(target.x, 450.0);
    }

    #[test]
    fn no_wrap_below_the_field() {
        let settings = quiet_settings();
        let mut target = Target {
            x: 400.0,
            y: HEIGHT + 500.0,
        };
        step(&mut target, &settings, 0.0, false, WIDTH, HEIGHT, &mut rng());
        // Wrap is one-directional; far-below positions are left alone.
        assert!(target.y > HEIGHT);
    }

    #[test]
    fn zero_recoil_zero_input_is_static() {
        let settings = Settings {
            recoil_speed: 0.0,
            recoil_jitter: 0.0,
            ..quiet_settings()
        };
        let mut target = Target::spawn(WIDTH, HEIGHT);
        for _ in 0..300 {
            step(&mut target, &settings, 0.0, false, WIDTH, HEIGHT, &mut rng());
        }
        assert_eq!(target, Target::spawn(WIDTH, HEIGHT));
    }
}
