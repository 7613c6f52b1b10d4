//! Sprites, sounds and the background rescaler.

pub mod art;
pub mod rescale;
pub mod sound;
pub mod sprite;

pub use rescale::{CancelToken, Rescaler};
pub use sound::{AudioBackend, BellBackend, Silence, SoundBoard, SoundTrigger};
pub use sprite::{Drawable, Sprite, SpriteSheet};
