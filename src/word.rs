//! A quiz word and the mini-game it rewards.

use crate::challenges::{
    Callback, Completion, MiniGameKind, MiniGameType, ScrollerGame, WhackGame,
};
use crate::core::config::GameConfig;
use crate::resources::art;
use crate::resources::sound::SoundTrigger;
use rand::RngCore;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub question: String,
    pub answer: String,
    /// The mini-game played after this word.
    pub game: MiniGameType,
}

impl Word {
    pub fn new(question: &str, answer: &str, game: MiniGameType) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            game,
        }
    }

    /// Build this word's mini-game. `on_done` fires once, a settle delay
    /// after play ends; `timeout_ms == 0` means no time limit.
    pub fn create_mini_game(
        &self,
        config: &GameConfig,
        sound: Rc<dyn SoundTrigger>,
        rng: Box<dyn RngCore>,
        on_done: Callback,
        timeout_ms: u64,
    ) -> MiniGameKind {
        let completion = Completion::new(on_done, timeout_ms, config.settle_delay_ms);
        match self.game {
            MiniGameType::Scroller => MiniGameKind::Scroller(Box::new(ScrollerGame::new(
                config.scroller.clone(),
                config.fps,
                art::river_theme(),
                sound,
                completion,
                rng,
            ))),
            MiniGameType::Whack => MiniGameKind::Whack(Box::new(WhackGame::new(
                config.whack.clone(),
                config.fps,
                art::mole_theme(),
                sound,
                completion,
                rng,
            ))),
        }
    }
}
