mod ui;

use anyhow::Context;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use lexiplay::challenges::MiniGameType;
use lexiplay::core::config::GameConfig;
use lexiplay::core::input::{Key, KeyDetector, Point};
use lexiplay::core::logging;
use lexiplay::resources::sound::{default_backend, SoundBoard, SoundTrigger};
use lexiplay::screens::{CursorStyle, ScreenKind};
use lexiplay::{Host, MiniGameHandler, Word};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use ratatui::layout::Rect;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::rc::Rc;
use std::time::{Duration, Instant};

const QUESTION_LANGUAGE: &str = "English";
const ANSWER_LANGUAGE: &str = "German";

const WORDS: &[(&str, &str)] = &[
    ("river", "Fluss"),
    ("hammer", "Hammer"),
    ("stone", "Stein"),
    ("garden", "Garten"),
    ("boat", "Boot"),
    ("mole", "Maulwurf"),
];

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// The handler's view of the terminal application.
struct TerminalHost {
    config: GameConfig,
    sound: Rc<dyn SoundTrigger>,
    rng: StdRng,
    mounted: Vec<ScreenKind>,
}

impl Host for TerminalHost {
    fn add_screen(&mut self, kind: ScreenKind) {
        debug!("mounting {:?}", kind);
        self.mounted.push(kind);
    }

    fn remove_screen(&mut self, kind: ScreenKind) {
        debug!("unmounting {:?}", kind);
        self.mounted.retain(|k| *k != kind);
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        // The terminal pointer cannot be hidden; the whack scene draws the
        // hammer over it instead.
        debug!("cursor style {:?} with {:?} mounted", cursor, self.mounted);
    }

    fn config(&self) -> &GameConfig {
        &self.config
    }

    fn sound(&self) -> Rc<dyn SoundTrigger> {
        Rc::clone(&self.sound)
    }

    fn rng(&mut self) -> Box<dyn RngCore> {
        Box::new(StdRng::seed_from_u64(self.rng.gen()))
    }
}

fn print_help() {
    println!("Lexiplay - word quiz with arcade mini-games\n");
    println!("Usage: lexiplay [options]\n");
    println!("Options:");
    println!("  --seed N   Seed the mini-game random source");
    println!("  --version  Show version information");
    println!("  --help     Show this help message");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut seed = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--version" | "-v" => {
                println!("lexiplay {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--seed" => {
                let value = args.get(i + 1).context("--seed needs a value")?;
                seed = Some(
                    value
                        .parse::<u64>()
                        .with_context(|| format!("invalid seed: {}", value))?,
                );
                i += 1;
            }
            other => {
                eprintln!("Unknown option: {}", other);
                eprintln!("Run 'lexiplay --help' for usage.");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if let Err(e) = logging::default_log_path().and_then(|path| logging::init_file_logging(&path)) {
        eprintln!("Logging disabled: {}", e);
    }

    let config = match GameConfig::default_path() {
        Ok(path) => GameConfig::load_or_default(&path),
        Err(e) => {
            warn!("{}, using default config", e);
            GameConfig::default()
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;

    let result = run(&mut terminal, config, seed);

    // Restore terminal even if the game loop failed
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableMouseCapture)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(c) => Some(Key::Char(c)),
        _ => None,
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Bounds every screen gets for a terminal of `area`.
fn content_bounds(area: Rect) -> (i32, i32, i32, i32) {
    let content = ui::game_common::game_layout(area).content;
    (
        content.x as i32,
        content.y as i32,
        content.width as i32,
        content.height as i32,
    )
}

fn run(terminal: &mut Tui, config: GameConfig, seed: Option<u64>) -> anyhow::Result<()> {
    let detector = Rc::new(KeyDetector::new(config.hold_window_ms));
    let sound: Rc<dyn SoundTrigger> =
        Rc::new(SoundBoard::new(config.sound_dir.clone(), default_backend()));
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let frame_time = Duration::from_millis(config.frame_ms());
    let clock = Instant::now();

    for (index, (question, answer)) in WORDS.iter().enumerate() {
        let word = Word::new(question, answer, MiniGameType::from_index(index));
        let host = TerminalHost {
            config: config.clone(),
            sound: Rc::clone(&sound),
            rng: StdRng::seed_from_u64(rng.gen()),
            mounted: Vec::new(),
        };
        let mut handler = MiniGameHandler::new(
            host,
            word,
            QUESTION_LANGUAGE,
            ANSWER_LANGUAGE,
            Box::new(|| {}),
            config.mini_game_timeout_ms,
        )?;
        handler.use_key_detector(Some(Rc::clone(&detector)));
        let (x, y, w, h) = content_bounds(terminal.size()?);
        handler.set_bounds(x, y, w, h);
        handler.begin()?;

        while !handler.is_finished() {
            let tick_start = Instant::now();
            let now_ms = clock.elapsed().as_millis() as u64;

            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) if is_quit(&key) => {
                        info!("quit requested");
                        return Ok(());
                    }
                    Event::Key(key) => match (key.kind, map_key(key.code)) {
                        (KeyEventKind::Release, Some(k)) => detector.release(k),
                        (_, Some(k)) => detector.press(k, now_ms),
                        (_, None) => {}
                    },
                    Event::Mouse(MouseEvent {
                        kind, column, row, ..
                    }) => {
                        let point = Point::new(column as i32, row as i32);
                        match kind {
                            MouseEventKind::Down(MouseButton::Left) => detector.click(point),
                            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                                detector.move_pointer(point)
                            }
                            _ => {}
                        }
                    }
                    Event::Resize(width, height) => {
                        let (x, y, w, h) = content_bounds(Rect::new(0, 0, width, height));
                        handler.set_bounds(x, y, w, h);
                        terminal.clear()?;
                    }
                    _ => {}
                }
            }

            handler
                .update(now_ms)
                .context("play-through left its state order")?;
            if handler.take_redraw() {
                terminal.draw(|frame| ui::draw(frame, &handler))?;
            }

            if let Some(rest) = frame_time.checked_sub(tick_start.elapsed()) {
                std::thread::sleep(rest);
            }
        }

        if let Some(score) = handler.score() {
            info!(
                "'{}' done: {} points ({:?})",
                handler.word().question,
                score.points,
                score.outcome
            );
        }
    }

    Ok(())
}
