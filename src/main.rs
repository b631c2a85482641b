pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{info, warn};
use numtap::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging::init_file_logger,
    runtime::{CrosstermEventSource, FixedTicker, Runner, TermEvent},
    session::clamp_points,
    ClickRule, GameEvent, GameSession, GameSnapshot, Phase, SessionConfig,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

const TICK_RATE_MS: u64 = 50;
const MAX_ENTRY_DIGITS: usize = 4;

/// tap the numbered targets in ascending order before the clock runs away
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A number-memory game: targets numbered 1..n are scattered over the field and must be hit in ascending order while the clock runs. Auto play can finish the board for you."
)]
pub struct Cli {
    /// number of targets on the field (clamped to 1..=2000)
    #[clap(short = 'n', long, allow_negative_numbers = true)]
    points: Option<i64>,

    /// click rule: ordered ends the run on a wrong hit, any-order accepts any target
    #[clap(short = 'r', long, value_enum)]
    rule: Option<ClickRule>,

    /// milliseconds between auto play hits
    #[clap(long)]
    auto_play_ms: Option<u64>,

    /// seconds a hit target stays on the field before it is removed
    #[clap(long)]
    fade_secs: Option<u32>,

    /// seed for target placement, for repeatable boards
    #[clap(long)]
    seed: Option<u64>,

    /// store the resulting settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer command line flags over the stored config
    fn resolve(&self, mut cfg: Config) -> Config {
        if let Some(points) = self.points {
            cfg.points = clamp_points(points);
        }
        if let Some(rule) = self.rule {
            cfg.rule = rule;
        }
        if let Some(ms) = self.auto_play_ms {
            cfg.auto_play_ms = ms;
        }
        if let Some(secs) = self.fade_secs {
            cfg.fade_secs = secs;
        }
        cfg
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub session: GameSession,
    /// last state emitted by the session; the only thing the renderer reads
    pub snapshot: GameSnapshot,
    /// digits typed towards a keyboard hit
    pub entry: String,
    /// screen area of the last frame, for mouse hit-testing
    pub screen: Rect,
}

impl App {
    pub fn new(config: &Config, seed: Option<u64>) -> Self {
        let session_config = SessionConfig::from(config);
        let session = match seed {
            Some(seed) => GameSession::with_seed(session_config, seed),
            None => GameSession::new(session_config),
        };

        Self {
            snapshot: session.snapshot(),
            session,
            entry: String::new(),
            screen: Rect::default(),
        }
    }

    pub fn dispatch(&mut self, event: GameEvent) {
        self.snapshot = self.session.update(event);
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }

        let points = i64::from(self.snapshot.points);
        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Flow::Quit
            }
            KeyCode::Char('p') => {
                self.entry.clear();
                self.dispatch(GameEvent::Start);
            }
            KeyCode::Char('a') => self.dispatch(GameEvent::ToggleAutoPlay),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.entry.len() < MAX_ENTRY_DIGITS {
                    self.entry.push(c);
                }
            }
            KeyCode::Backspace => {
                self.entry.pop();
            }
            KeyCode::Enter => self.commit_entry(),
            KeyCode::Up => self.dispatch(GameEvent::Configure(points + 1)),
            KeyCode::Down => self.dispatch(GameEvent::Configure(points - 1)),
            KeyCode::PageUp => self.dispatch(GameEvent::Configure(points + 10)),
            KeyCode::PageDown => self.dispatch(GameEvent::Configure(points - 10)),
            _ => {}
        }
        Flow::Continue
    }

    fn commit_entry(&mut self) {
        if self.entry.is_empty() {
            if self.snapshot.phase != Phase::Running {
                self.dispatch(GameEvent::Start);
            }
            return;
        }

        let entry = std::mem::take(&mut self.entry);
        if let Ok(id) = entry.parse::<u32>() {
            self.dispatch(GameEvent::Click(id));
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }

        let inner = ui::field::layout(self.screen).field_inner();
        if let Some(id) = ui::field::hit_test(
            &self.snapshot.targets,
            inner,
            self.snapshot.field,
            mouse.column,
            mouse.row,
        ) {
            self.dispatch(GameEvent::Click(id));
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = AppDirs::log_path() {
        if let Err(e) = init_file_logger(&path) {
            eprintln!("logging disabled: {}", e);
        }
    }

    let store = FileConfigStore::new();
    let config = cli.resolve(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!("saved settings to {}", store.path().display());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config, cli.seed);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        warn!("terminal loop failed: {}", e);
    }
    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    draw(terminal, app)?;
    runner.lap();

    loop {
        let event = runner.step();
        // time first, so inputs land on an up to date clock
        app.dispatch(GameEvent::Advance(runner.lap()));

        match event {
            TermEvent::Tick | TermEvent::Resize => {}
            TermEvent::Key(key) => {
                if app.on_key(key) == Flow::Quit {
                    break;
                }
            }
            TermEvent::Mouse(mouse) => app.on_mouse(mouse),
        }

        draw(terminal, app)?;
    }

    Ok(())
}

fn draw<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let frame = terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    app.screen = frame.area;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use numtap::target::TargetState;
    use ratatui::backend::TestBackend;

    fn app(points: u32) -> App {
        let config = Config {
            points,
            ..Config::default()
        };
        App::new(&config, Some(11))
    }

    fn press(app: &mut App, code: KeyCode) -> Flow {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_id(app: &mut App, id: u32) {
        for c in id.to_string().chars() {
            press(app, KeyCode::Char(c));
        }
        press(app, KeyCode::Enter);
    }

    fn rendered(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        draw(&mut terminal, app).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["numtap"]);

        assert_eq!(cli.points, None);
        assert_eq!(cli.rule, None);
        assert_eq!(cli.seed, None);
        assert!(!cli.save_config);
        assert_eq!(cli.resolve(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_points_are_clamped() {
        let cli = Cli::parse_from(["numtap", "-n", "5000"]);
        assert_eq!(cli.resolve(Config::default()).points, 2000);

        let cli = Cli::parse_from(["numtap", "--points", "-3"]);
        assert_eq!(cli.resolve(Config::default()).points, 1);
    }

    #[test]
    fn test_cli_overrides_stored_config() {
        let cli = Cli::parse_from([
            "numtap",
            "-r",
            "any-order",
            "--auto-play-ms",
            "200",
            "--fade-secs",
            "1",
            "--seed",
            "9",
        ]);
        let stored = Config {
            points: 30,
            ..Config::default()
        };
        let cfg = cli.resolve(stored);

        assert_eq!(cfg.points, 30);
        assert_eq!(cfg.rule, ClickRule::AnyOrder);
        assert_eq!(cfg.auto_play_ms, 200);
        assert_eq!(cfg.fade_secs, 1);
        assert_eq!(cli.seed, Some(9));
    }

    #[test]
    fn test_app_starts_in_setup() {
        let app = app(3);
        assert_eq!(app.snapshot.phase, Phase::Setup);
        assert_eq!(app.snapshot.points, 3);
        assert!(app.snapshot.targets.is_empty());
    }

    #[test]
    fn test_enter_starts_then_hits_typed_ids() {
        let mut app = app(3);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.snapshot.phase, Phase::Running);

        type_id(&mut app, 1);
        assert!(app.entry.is_empty());
        assert_eq!(app.session.target_state(1), Some(TargetState::Fading));
        assert_eq!(app.snapshot.next, Some(2));

        type_id(&mut app, 3);
        assert_eq!(app.snapshot.phase, Phase::Failed);
    }

    #[test]
    fn test_entry_editing() {
        let mut app = app(3);
        press(&mut app, KeyCode::Char('p'));
        for c in ['1', '2', '3', '4', '5'] {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.entry, "1234");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.entry, "1");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.snapshot.next, Some(2));
    }

    #[test]
    fn test_point_keys_clamp() {
        let mut app = app(1);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.snapshot.points, 1);
        press(&mut app, KeyCode::PageUp);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.snapshot.points, 12);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app(1);
        assert_eq!(press(&mut app, KeyCode::Esc), Flow::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.on_key(ctrl_c), Flow::Quit);
        assert_eq!(press(&mut app, KeyCode::Char('x')), Flow::Continue);
    }

    #[test]
    fn test_auto_play_key_finishes_the_board() {
        let mut app = app(2);
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('a'));
        assert!(app.snapshot.auto_play);

        app.dispatch(GameEvent::Advance(Duration::from_secs(5)));
        assert_eq!(app.snapshot.phase, Phase::Cleared);
    }

    #[test]
    fn test_mouse_click_hits_drawn_target() {
        let mut app = app(1);
        press(&mut app, KeyCode::Char('p'));
        rendered(&mut app);

        let inner = ui::field::layout(app.screen).field_inner();
        let rect = ui::field::target_rect(inner, app.snapshot.field, &app.snapshot.targets[0]);
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: rect.x,
            row: rect.y,
            modifiers: KeyModifiers::NONE,
        };
        app.on_mouse(click);

        assert_matches!(app.session.target_state(1), Some(TargetState::Fading));
    }

    #[test]
    fn test_mouse_click_on_empty_cell_is_ignored() {
        let mut app = app(1);
        press(&mut app, KeyCode::Char('p'));
        rendered(&mut app);

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        app.on_mouse(click);
        assert_eq!(app.snapshot.phase, Phase::Running);
        assert_eq!(app.session.target_state(1), Some(TargetState::Active));
    }

    #[test]
    fn test_ui_renders_banners() {
        let mut app = app(1);
        let content = rendered(&mut app);
        assert!(content.contains("LET'S PLAY"));
        assert!(content.contains("Points: 1"));
        assert!(content.contains("Time: 0.0s"));
        assert!(content.contains("Next: None"));

        press(&mut app, KeyCode::Char('p'));
        type_id(&mut app, 1);
        app.dispatch(GameEvent::Advance(Duration::from_secs(2)));
        let content = rendered(&mut app);
        assert!(content.contains("ALL CLEARED"));
        assert!(!content.contains("Next:"));
    }

    #[test]
    fn test_ui_renders_game_over_and_fading_target() {
        let mut app = app(1);
        press(&mut app, KeyCode::Char('p'));
        app.dispatch(GameEvent::Advance(Duration::from_millis(700)));
        type_id(&mut app, 1);
        let content = rendered(&mut app);
        assert!(content.contains("0.7s 2"));

        type_id(&mut app, 1);
        assert_eq!(app.snapshot.phase, Phase::Running);

        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Char('p'));
        type_id(&mut app, 2);
        let content = rendered(&mut app);
        assert!(content.contains("GAME OVER"));
    }
}
