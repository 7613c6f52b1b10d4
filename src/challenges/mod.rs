//! Reward mini-games: River Run (scroller) and Whack-a-Word (whack).

pub mod completion;
pub mod score;
pub mod scroller;
pub mod whack;

pub use completion::Completion;
pub use score::{MiniGameType, Outcome, Score};
pub use scroller::{ScrollerConfig, ScrollerGame};
pub use whack::{WhackConfig, WhackGame};

use crate::core::geometry::Bounds;
use crate::core::input::{InputFrame, Key, KeyDetector};
use crate::screens::{CursorStyle, Screen};
use std::rc::Rc;

/// Run-once notification handed to screens and mini-games.
pub type Callback = Box<dyn FnOnce() + Send>;

/// What every mini-game offers the handler on top of being a [`Screen`].
///
/// A mini-game fires its completion callback exactly once, a settle delay
/// after play ends (lives gone, time up, or forfeit).
pub trait MiniGame: Screen {
    fn game_type(&self) -> MiniGameType;

    /// Arm the game. Updates before this are ignored.
    fn start(&mut self);

    /// The play field changed size. Rescaling happens in the background.
    fn resized(&mut self, width: u16, height: u16);

    /// The result, available once play has ended.
    fn score(&self) -> Option<Score>;

    fn use_key_detector(&mut self, detector: Option<Rc<KeyDetector>>);

    fn key_detector(&self) -> Option<&Rc<KeyDetector>>;

    fn is_finished(&self) -> bool;

    fn cursor(&self) -> CursorStyle {
        CursorStyle::Default
    }

    /// Update from the game's own key detector, or with no input.
    fn tick(&mut self, timestamp_ms: u64) {
        let input = self
            .key_detector()
            .map(|d| d.snapshot(timestamp_ms))
            .unwrap_or_default();
        self.update(&input, timestamp_ms);
    }
}

/// Feed this tick's presses to the double-Esc forfeit. The first Escape
/// arms it, any other key disarms it. Returns true once confirmed.
pub fn process_forfeit(forfeit_pending: &mut bool, input: &InputFrame) -> bool {
    for key in &input.pressed {
        match key {
            Key::Escape if *forfeit_pending => return true,
            Key::Escape => *forfeit_pending = true,
            _ => *forfeit_pending = false,
        }
    }
    false
}

/// The currently running mini-game. Only one exists per play-through.
pub enum MiniGameKind {
    Scroller(Box<ScrollerGame>),
    Whack(Box<WhackGame>),
}

macro_rules! dispatch {
    ($self:expr, $game:ident => $body:expr) => {
        match $self {
            MiniGameKind::Scroller($game) => $body,
            MiniGameKind::Whack($game) => $body,
        }
    };
}

impl Screen for MiniGameKind {
    fn set_bounds(&mut self, bounds: Bounds) {
        dispatch!(self, g => g.set_bounds(bounds))
    }

    fn bounds(&self) -> Bounds {
        dispatch!(self, g => g.bounds())
    }

    fn update(&mut self, input: &InputFrame, timestamp_ms: u64) {
        dispatch!(self, g => g.update(input, timestamp_ms))
    }

    fn repaint(&mut self) {
        dispatch!(self, g => g.repaint())
    }

    fn take_redraw(&mut self) -> bool {
        dispatch!(self, g => g.take_redraw())
    }
}

impl MiniGame for MiniGameKind {
    fn game_type(&self) -> MiniGameType {
        dispatch!(self, g => g.game_type())
    }

    fn start(&mut self) {
        dispatch!(self, g => g.start())
    }

    fn resized(&mut self, width: u16, height: u16) {
        dispatch!(self, g => g.resized(width, height))
    }

    fn score(&self) -> Option<Score> {
        dispatch!(self, g => g.score())
    }

    fn use_key_detector(&mut self, detector: Option<Rc<KeyDetector>>) {
        dispatch!(self, g => g.use_key_detector(detector))
    }

    fn key_detector(&self) -> Option<&Rc<KeyDetector>> {
        dispatch!(self, g => g.key_detector())
    }

    fn is_finished(&self) -> bool {
        dispatch!(self, g => g.is_finished())
    }

    fn cursor(&self) -> CursorStyle {
        dispatch!(self, g => g.cursor())
    }
}
