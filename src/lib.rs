//! Lexiplay - word quiz with arcade reward mini-games.
//!
//! This module exposes the game logic for testing and external use.

pub mod animation;
pub mod challenges;
pub mod core;
pub mod handler;
pub mod resources;
pub mod screens;
pub mod word;

pub use handler::{ActiveScreen, Host, MiniGameHandler, State};
pub use word::Word;
