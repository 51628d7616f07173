//! Girder Run simulation core: a frame-stepped 2D platformer with rolling
//! barrels, ladders, power-ups and a countdown bonus.
//!
//! The library holds everything that runs without a terminal. The binary
//! adds keyboard, gamepad, sound and rendering on top of `sim::world::Model`.

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;

pub use error::{Result, SimError};
pub use sim::world::{Model, Phase};
