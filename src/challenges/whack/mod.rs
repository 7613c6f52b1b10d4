//! Whack-a-Word: bop the moles as they pop up.

pub mod logic;
pub mod types;

pub use logic::spawn_probability;
pub use types::*;

use super::{MiniGame, MiniGameType, Score};
use crate::core::geometry::Bounds;
use crate::core::input::{InputFrame, KeyDetector};
use crate::screens::{CursorStyle, Screen};
use std::rc::Rc;
use std::time::Duration;

impl WhackGame {
    pub fn wait_for_sprites(&mut self, timeout: Duration) -> bool {
        logic::wait_for_sprites(self, timeout)
    }
}

impl Screen for WhackGame {
    fn set_bounds(&mut self, bounds: Bounds) {
        let resized = bounds.size() != self.bounds.size();
        self.bounds = bounds;
        if resized {
            self.resized(bounds.size().width, bounds.size().height);
        }
        self.redraw_requested = true;
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn update(&mut self, input: &InputFrame, timestamp_ms: u64) {
        logic::update(self, input, timestamp_ms);
    }

    fn repaint(&mut self) {
        self.redraw_requested = true;
    }

    fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }
}

impl MiniGame for WhackGame {
    fn game_type(&self) -> MiniGameType {
        MiniGameType::Whack
    }

    fn start(&mut self) {
        logic::start(self);
    }

    fn resized(&mut self, width: u16, height: u16) {
        logic::request_rescale(self, width, height);
    }

    fn score(&self) -> Option<Score> {
        logic::score(self)
    }

    fn use_key_detector(&mut self, detector: Option<Rc<KeyDetector>>) {
        self.detector = detector;
    }

    fn key_detector(&self) -> Option<&Rc<KeyDetector>> {
        self.detector.as_ref()
    }

    fn is_finished(&self) -> bool {
        self.completion.is_finished()
    }

    /// The hammer stands in for the pointer.
    fn cursor(&self) -> CursorStyle {
        CursorStyle::Hidden
    }
}
