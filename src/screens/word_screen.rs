//! The word prompt: show the question, reveal the answer, then hand back.

use super::Screen;
use crate::challenges::Callback;
use crate::core::geometry::Bounds;
use crate::core::input::InputFrame;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordPhase {
    Question,
    Answer,
    Done,
}

pub struct WordScreen {
    pub question: String,
    pub answer: String,
    pub question_language: String,
    pub answer_language: String,
    phase: WordPhase,
    bounds: Bounds,
    redraw: bool,
    on_done: Option<Callback>,
}

impl WordScreen {
    pub fn new(
        question: &str,
        answer: &str,
        question_language: &str,
        answer_language: &str,
        on_done: Callback,
    ) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            question_language: question_language.to_string(),
            answer_language: answer_language.to_string(),
            phase: WordPhase::Question,
            bounds: Bounds::default(),
            redraw: true,
            on_done: Some(on_done),
        }
    }

    pub fn phase(&self) -> WordPhase {
        self.phase
    }

    /// Move to the next phase, firing the callback on reaching `Done`.
    pub fn advance(&mut self) {
        self.phase = match self.phase {
            WordPhase::Question => WordPhase::Answer,
            WordPhase::Answer | WordPhase::Done => WordPhase::Done,
        };
        self.redraw = true;
        if self.phase == WordPhase::Done {
            if let Some(callback) = self.on_done.take() {
                debug!("word screen done: {}", self.question);
                callback();
            }
        }
    }
}

impl Screen for WordScreen {
    fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.redraw = true;
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn update(&mut self, input: &InputFrame, _timestamp_ms: u64) {
        for key in &input.pressed {
            if self.phase == WordPhase::Done {
                break;
            }
            if key.is_confirm() {
                self.advance();
            }
        }
    }

    fn repaint(&mut self) {
        self.redraw = true;
    }

    fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::Key;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn pressed(keys: &[Key]) -> InputFrame {
        InputFrame {
            pressed: keys.to_vec(),
            ..InputFrame::default()
        }
    }

    #[test]
    fn test_two_confirms_complete_once() {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        let mut screen = WordScreen::new(
            "dog",
            "Hund",
            "English",
            "German",
            Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );

        screen.update(&pressed(&[Key::Char('x')]), 0);
        assert_eq!(screen.phase(), WordPhase::Question);
        screen.update(&pressed(&[Key::Enter]), 16);
        assert_eq!(screen.phase(), WordPhase::Answer);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        screen.update(&pressed(&[Key::Space, Key::Enter, Key::Enter]), 32);
        assert_eq!(screen.phase(), WordPhase::Done);
        screen.update(&pressed(&[Key::Enter]), 48);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_redraw_flag_clears() {
        let mut screen = WordScreen::new("a", "b", "x", "y", Box::new(|| {}));
        assert!(screen.take_redraw());
        assert!(!screen.take_redraw());
        screen.repaint();
        assert!(screen.take_redraw());
    }
}
