//! Screens the handler can show: the word prompt, a mini-game, the score.

pub mod score_screen;
pub mod word_screen;

pub use score_screen::ScoreScreen;
pub use word_screen::{WordPhase, WordScreen};

use crate::core::geometry::Bounds;
use crate::core::input::InputFrame;

/// Which screen the host should mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Word,
    MiniGame,
    Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Hidden,
}

/// Something the frame driver updates and draws once per tick.
pub trait Screen {
    fn set_bounds(&mut self, bounds: Bounds);

    fn bounds(&self) -> Bounds;

    fn update(&mut self, input: &InputFrame, timestamp_ms: u64);

    /// Ask for a redraw on the next frame.
    fn repaint(&mut self);

    /// Whether anything changed since the last call. Clears the flag.
    fn take_redraw(&mut self) -> bool;
}
