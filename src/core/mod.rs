//! Ambient plumbing shared by every screen: timing constants, configuration,
//! errors, logging and the key-input source.

pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;

pub use config::*;
pub use constants::*;
pub use error::*;
pub use geometry::*;
pub use input::*;
