pub mod ui;

use flick::{
    config::{CursorMode, FileSettingsStore, Settings, SettingsStore},
    drill::{Drill, FIELD_HEIGHT, FIELD_WIDTH},
    input::Button,
    runtime::{Clock, CrosstermEventSource, DrillEvent, FixedTicker, MonotonicClock, Runner},
    scoring::Summary,
    session::Phase,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, KeyCode,
        KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
};

/// Completed sessions kept in the on-screen log.
const SCORE_LOG_CAP: usize = 4;

/// Heatmap grid resolution, presentation-side only.
pub const HEAT_COLS: usize = 16;
pub const HEAT_ROWS: usize = 12;

/// terminal aim trainer with recoil-compensation drills
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "An aim-training drill for the terminal: track a target drifting under simulated recoil, counteract it with the mouse, and get scored on timing and accuracy. Flags override the saved settings file."
)]
pub struct Cli {
    /// countdown before the drill starts, seconds
    #[clap(short = 'c', long)]
    countdown: Option<u32>,

    /// drill duration, seconds (minimum 5)
    #[clap(short = 'd', long)]
    duration: Option<u32>,

    /// target radius, px
    #[clap(short = 'r', long)]
    target_radius: Option<f64>,

    /// crosshair half-length, px
    #[clap(long)]
    crosshair_len: Option<f64>,

    /// baseline upward recoil drift, px/s
    #[clap(long)]
    recoil_speed: Option<f64>,

    /// random recoil jitter amplitude, px/s
    #[clap(long)]
    recoil_jitter: Option<f64>,

    /// multiplier on vertical mouse deltas in fixed mode
    #[clap(long)]
    gain: Option<f64>,

    /// window after start during which downward motion is ignored, ms
    #[clap(long)]
    grace_ms: Option<u64>,

    /// minimum |mouse delta| that counts as compensation, px
    #[clap(long)]
    dead_zone: Option<f64>,

    /// fixed: crosshair pinned to center; free: crosshair follows the mouse
    #[clap(short = 'm', long, value_enum)]
    cursor_mode: Option<CursorMode>,

    /// draw the target's recent path
    #[clap(long)]
    path: bool,

    /// draw a heatmap of where the target has been
    #[clap(long)]
    heatmap: bool,
}

impl Cli {
    /// Saved settings with CLI overrides folded in.
    fn to_settings(&self, mut settings: Settings) -> Settings {
        if let Some(v) = self.countdown {
            settings.countdown_secs = v;
        }
        if let Some(v) = self.duration {
            settings.duration_secs = v;
        }
        if let Some(v) = self.target_radius {
            settings.target_radius = v;
        }
        if let Some(v) = self.crosshair_len {
            settings.crosshair_len = v;
        }
        if let Some(v) = self.recoil_speed {
            settings.recoil_speed = v;
        }
        if let Some(v) = self.recoil_jitter {
            settings.recoil_jitter = v;
        }
        if let Some(v) = self.gain {
            settings.compensation_gain = v;
        }
        if let Some(v) = self.grace_ms {
            settings.grace_ms = v;
        }
        if let Some(v) = self.dead_zone {
            settings.dead_zone = v;
        }
        if let Some(v) = self.cursor_mode {
            settings.cursor_mode = v;
        }
        if self.path {
            settings.show_path = true;
        }
        if self.heatmap {
            settings.show_heatmap = true;
        }
        settings
    }
}

#[derive(Debug)]
pub struct App {
    pub drill: Drill,
    pub score_log: Vec<Summary>,
    pub heat: [[u32; HEAT_COLS]; HEAT_ROWS],
    pub status: Option<String>,
    last_pointer: Option<(f64, f64)>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            drill: Drill::new(settings),
            score_log: Vec::new(),
            heat: [[0; HEAT_COLS]; HEAT_ROWS],
            status: None,
            last_pointer: None,
        }
    }

    fn push_summary(&mut self, summary: Summary) {
        self.score_log.insert(0, summary);
        self.score_log.truncate(SCORE_LOG_CAP);
    }

    fn clear_heat(&mut self) {
        self.heat = [[0; HEAT_COLS]; HEAT_ROWS];
    }

    fn accumulate_heat(&mut self) {
        if !self.drill.settings.show_heatmap
            || self.drill.phase() != Phase::Running
        {
            return;
        }
        let target = self.drill.target();
        let col = (target.x / FIELD_WIDTH * HEAT_COLS as f64) as usize;
        let row = (target.y / FIELD_HEIGHT * HEAT_ROWS as f64) as usize;
        if col < HEAT_COLS && row < HEAT_ROWS {
            self.heat[row][col] += 1;
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent, size: Rect, now_ms: f64) {
        let field = ui::field_rect(size);
        let (px, py) = cell_to_field(mouse.column, mouse.row, field);

        match mouse.kind {
            MouseEventKind::Down(button) => {
                if self.drill.on_button_down(map_button(button), now_ms) {
                    // Mouse capture is process-wide in a terminal; the
                    // events reaching us mean it is effectively held.
                    self.drill.set_captured(true);
                }
            }
            MouseEventKind::Up(button) => {
                self.drill.on_button_up(map_button(button));
            }
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                let (dx, dy) = match self.last_pointer {
                    Some((lx, ly)) => (px - lx, py - ly),
                    None => (0.0, 0.0),
                };
                self.last_pointer = Some((px, py));
                self.drill.on_pointer_moved(dx, dy, px, py);
            }
            _ => {}
        }
    }
}

fn map_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Middle => Button::Middle,
        MouseButton::Right => Button::Right,
    }
}

/// Terminal cell to logical playfield px, relative to the field rect.
fn cell_to_field(column: u16, row: u16, field: Rect) -> (f64, f64) {
    let inner_w = field.width.saturating_sub(2).max(1) as f64;
    let inner_h = field.height.saturating_sub(2).max(1) as f64;
    let cx = column.saturating_sub(field.x + 1) as f64;
    let cy = row.saturating_sub(field.y + 1) as f64;
    let px = ((cx + 0.5) / inner_w * FIELD_WIDTH).clamp(0.0, FIELD_WIDTH);
    let py = ((cy + 0.5) / inner_h * FIELD_HEIGHT).clamp(0.0, FIELD_HEIGHT);
    (px, py)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileSettingsStore::new();
    let settings = cli.to_settings(store.load());
    if let Err(msg) = settings.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::ValueValidation, msg).exit();
    }
    if let Err(e) = store.save(&settings) {
        log::warn!("could not persist settings: {e}");
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;

    let mut app = App::new(settings);
    match execute!(stdout, EnableMouseCapture) {
        Ok(()) => app.drill.set_captured(true),
        Err(e) => {
            log::warn!("mouse capture unavailable: {e}");
            app.status = Some("mouse capture unavailable".into());
        }
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange,
    )?;
    terminal.show_cursor()?;

    result
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::frame());
    let clock = MonotonicClock::new();
    let mut rng = rand::thread_rng();

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            DrillEvent::Tick => {
                if let Some(summary) = app.drill.on_frame(clock.now_ms(), &mut rng) {
                    app.push_summary(summary);
                }
                app.accumulate_heat();
                terminal.draw(|f| ui(app, f))?;
            }
            DrillEvent::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        break;
                    }
                    KeyCode::Char('q') => {
                        break;
                    }
                    KeyCode::Char(' ') => {
                        let starting = !matches!(
                            app.drill.phase(),
                            Phase::Countdown | Phase::Running
                        );
                        if starting {
                            app.clear_heat();
                        }
                        if let Some(summary) = app.drill.toggle(clock.now_ms()) {
                            app.push_summary(summary);
                        }
                    }
                    KeyCode::Char('m') => {
                        // Cursor mode is a per-session capability; only
                        // switch between sessions.
                        if !matches!(
                            app.drill.phase(),
                            Phase::Countdown | Phase::Running
                        ) {
                            let next = match app.drill.settings.cursor_mode {
                                CursorMode::Fixed => CursorMode::Free,
                                CursorMode::Free => CursorMode::Fixed,
                            };
                            app.drill.set_cursor_mode(next);
                        }
                    }
                    KeyCode::Char('p') => {
                        let on = !app.drill.settings.show_path;
                        app.drill.set_show_path(on);
                    }
                    KeyCode::Char('h') => {
                        app.drill.settings.show_heatmap = !app.drill.settings.show_heatmap;
                        if !app.drill.settings.show_heatmap {
                            app.clear_heat();
                        }
                    }
                    _ => {}
                }
                terminal.draw(|f| ui(app, f))?;
            }
            DrillEvent::Mouse(mouse) => {
                let size = terminal.size()?;
                let area = Rect::new(0, 0, size.width, size.height);
                app.on_mouse(mouse, area, clock.now_ms());
            }
            DrillEvent::Resize => {
                // The playfield is logical px; only the cell mapping and
                // the free aim need re-syncing.
                app.last_pointer = None;
                app.drill.resize(FIELD_WIDTH, FIELD_HEIGHT);
                terminal.draw(|f| ui(app, f))?;
            }
            DrillEvent::FocusLost => {
                // Same as an explicit stop; a backgrounded drill must not
                // keep accumulating.
                if let Some(summary) = app.drill.stop() {
                    app.push_summary(summary);
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}
