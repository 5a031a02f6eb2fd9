use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points, Rectangle},
        Block, Borders, Paragraph, Sparkline, Widget,
    },
};

use flick::drill::{FIELD_HEIGHT, FIELD_WIDTH};
use flick::session::Phase;
use crate::{App, HEAT_COLS, HEAT_ROWS};

/// Vertical split: playfield, error sparkline, status, score log.
pub fn layout(area: Rect) -> (Rect, Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(10),
                Constraint::Length(4),
                Constraint::Length(2),
                Constraint::Length(6),
            ]
            .as_ref(),
        )
        .split(area);
    (chunks[0], chunks[1], chunks[2], chunks[3])
}

/// The playfield area, shared with mouse-coordinate mapping in main.
pub fn field_rect(area: Rect) -> Rect {
    layout(area).0
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (field, spark, status, log) = layout(area);

        render_field(self, field, buf);
        render_sparkline(self, spark, buf);
        render_status(self, status, buf);
        render_score_log(self, log, buf);
    }
}

fn render_field(app: &App, area: Rect, buf: &mut Buffer) {
    let drill = &app.drill;
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title("flick"))
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, FIELD_WIDTH])
        .y_bounds([0.0, FIELD_HEIGHT])
        .paint(|ctx| {
            if drill.settings.show_heatmap {
                paint_heatmap(ctx, &app.heat);
            }
            if drill.settings.show_path {
                paint_path(ctx, drill);
            }
            paint_target(ctx, drill);
            paint_crosshair(ctx, drill);
            paint_overlay_text(ctx, drill);
        });
    canvas.render(area, buf);
}

// Engine y grows downward, canvas y grows upward.
fn flip(y: f64) -> f64 {
    FIELD_HEIGHT - y
}

fn paint_target(ctx: &mut Context, drill: &flick::drill::Drill) {
    let target = drill.target();
    ctx.draw(&Circle {
        x: target.x,
        y: flip(target.y),
        radius: drill.settings.target_radius,
        color: Color::Red,
    });
}

fn paint_crosshair(ctx: &mut Context, drill: &flick::drill::Drill) {
    let (x, y) = drill.aim_point();
    let y = flip(y);
    let len = drill.settings.crosshair_len;
    ctx.draw(&CanvasLine {
        x1: x - len,
        y1: y,
        x2: x + len,
        y2: y,
        color: Color::Cyan,
    });
    ctx.draw(&CanvasLine {
        x1: x,
        y1: y - len,
        x2: x,
        y2: y + len,
        color: Color::Cyan,
    });
}

fn paint_path(ctx: &mut Context, drill: &flick::drill::Drill) {
    let coords: Vec<(f64, f64)> = drill.path().iter().map(|&(x, y)| (x, flip(y))).collect();
    if !coords.is_empty() {
        ctx.draw(&Points {
            coords: &coords,
            color: Color::DarkGray,
        });
    }
}

fn paint_heatmap(ctx: &mut Context, heat: &[[u32; HEAT_COLS]; HEAT_ROWS]) {
    let max = heat
        .iter()
        .flat_map(|row| row.iter())
        .copied()
        .max()
        .unwrap_or(0);
    if max == 0 {
        return;
    }
    let cell_w = FIELD_WIDTH / HEAT_COLS as f64;
    let cell_h = FIELD_HEIGHT / HEAT_ROWS as f64;
    for (row, cols) in heat.iter().enumerate() {
        for (col, &count) in cols.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let color = match count * 3 / max {
                0 => Color::Indexed(52),
                1 => Color::Indexed(88),
                _ => Color::Indexed(124),
            };
            ctx.draw(&Rectangle {
                x: col as f64 * cell_w,
                y: flip((row + 1) as f64 * cell_h),
                width: cell_w,
                height: cell_h,
                color,
            });
        }
    }
}

fn paint_overlay_text(ctx: &mut Context, drill: &flick::drill::Drill) {
    let center_x = FIELD_WIDTH / 2.0;
    match drill.phase() {
        Phase::Idle => {
            ctx.print(
                center_x - 140.0,
                flip(FIELD_HEIGHT * 0.25),
                Line::from(Span::styled(
                    "SPACE start · m cursor mode · p path · h heatmap · q quit",
                    Style::default().add_modifier(Modifier::DIM),
                )),
            );
        }
        Phase::Countdown => {
            ctx.print(
                center_x,
                flip(FIELD_HEIGHT * 0.25),
                Line::from(Span::styled(
                    format!("{}", drill.countdown_left()),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
            );
        }
        Phase::Running => {}
        Phase::Ended => {
            ctx.print(
                center_x - 60.0,
                flip(FIELD_HEIGHT * 0.25),
                Line::from(Span::styled(
                    "done · SPACE to go again",
                    Style::default().add_modifier(Modifier::DIM),
                )),
            );
        }
    }
}

fn render_sparkline(app: &App, area: Rect, buf: &mut Buffer) {
    let window = area.width.saturating_sub(2) as usize;
    let errors: Vec<u64> = app.drill.errors().iter().map(|&e| e as u64).collect();
    let start = errors.len().saturating_sub(window);
    let spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title("error px"))
        .style(Style::default().fg(Color::Cyan))
        .data(&errors[start..]);
    spark.render(area, buf);
}

fn render_status(app: &App, area: Rect, buf: &mut Buffer) {
    let drill = &app.drill;
    let clicks = drill.click_state();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let timing = match drill.phase() {
        Phase::Idle => "idle".to_string(),
        Phase::Countdown => format!("starting in {}", drill.countdown_left()),
        Phase::Running => format!("{}s left", drill.seconds_left()),
        Phase::Ended => "ended".to_string(),
    };

    fn dot(down: bool) -> &'static str {
        if down {
            "●"
        } else {
            "○"
        }
    }

    let line = Line::from(vec![
        Span::styled(timing, bold),
        Span::raw("  │  "),
        Span::raw(format!(
            "{} {} {}  L{} M{} R{}",
            dot(clicks.left),
            dot(clicks.middle),
            dot(clicks.right),
            clicks.counts.left,
            clicks.counts.middle,
            clicks.counts.right,
        )),
        Span::raw("  │  "),
        Span::styled(format!("{:.0} cps", clicks.cps), bold),
        Span::raw("  │  "),
        Span::raw(format!("{} aim", drill.settings.cursor_mode)),
        Span::raw(if drill.is_captured() {
            "  │  captured"
        } else {
            "  │  uncaptured"
        }),
    ]);

    let mut lines = vec![line];
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_score_log(app: &App, area: Rect, buf: &mut Buffer) {
    let lines: Vec<Line> = app
        .score_log
        .iter()
        .map(|s| {
            Line::from(Span::raw(format!(
                "{}  {:>3}s  err {:>6.1}px  hit {:>5.1}%  shots {:>3}  cps {:.2}",
                s.ended_at, s.duration_secs, s.avg_error, s.hit_rate, s.shots, s.avg_cps
            )))
        })
        .collect();

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("sessions"))
        .render(area, buf);
}
