//! Shows the mini-game result until the player confirms.

use super::Screen;
use crate::challenges::{Callback, Score};
use crate::core::geometry::Bounds;
use crate::core::input::InputFrame;

pub struct ScoreScreen {
    pub score: Score,
    started: bool,
    bounds: Bounds,
    redraw: bool,
    on_done: Option<Callback>,
}

impl ScoreScreen {
    pub fn new(score: Score, on_done: Callback) -> Self {
        Self {
            score,
            started: false,
            bounds: Bounds::default(),
            redraw: true,
            on_done: Some(on_done),
        }
    }

    /// Start accepting the dismiss key.
    pub fn begin(&mut self) {
        self.started = true;
        self.redraw = true;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_done(&self) -> bool {
        self.on_done.is_none()
    }
}

impl Screen for ScoreScreen {
    fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.redraw = true;
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn update(&mut self, input: &InputFrame, _timestamp_ms: u64) {
        if !self.started || !input.pressed.iter().any(|k| k.is_confirm()) {
            return;
        }
        if let Some(callback) = self.on_done.take() {
            callback();
        }
    }

    fn repaint(&mut self) {
        self.redraw = true;
    }

    fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }
}
