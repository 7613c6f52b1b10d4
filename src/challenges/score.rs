//! The result a mini-game hands back to the handler.

use serde::{Deserialize, Serialize};

/// Which mini-game produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MiniGameType {
    Scroller,
    Whack,
}

impl MiniGameType {
    pub const ALL: [MiniGameType; 2] = [MiniGameType::Scroller, MiniGameType::Whack];

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Scroller => "River Run",
            Self::Whack => "Whack-a-Word",
        }
    }
}

/// Why a mini-game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Played to its natural end (e.g. out of lives).
    Completed,
    /// The overall time limit ran out.
    TimedOut,
    /// The player gave up.
    Forfeited,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub game: MiniGameType,
    pub points: i64,
    /// Collectables caught or moles whacked.
    pub hits: u32,
    /// Clicks that did not land a hit.
    pub misses: u32,
    /// Obstacles run into.
    pub damage: u32,
    pub outcome: Outcome,
    pub duration_ms: u64,
}

impl Score {
    pub fn new(game: MiniGameType, outcome: Outcome) -> Self {
        Self {
            game,
            points: 0,
            hits: 0,
            misses: 0,
            damage: 0,
            outcome,
            duration_ms: 0,
        }
    }

    /// Hit ratio in percent, `None` when nothing was attempted.
    pub fn accuracy(&self) -> Option<u32> {
        let attempts = self.hits + self.misses + self.damage;
        if attempts == 0 {
            None
        } else {
            Some(self.hits * 100 / attempts)
        }
    }
}
