//! Core game logic module for Chubby Bird
//!
//! This module contains all the simulation logic without any I/O or rendering
//! dependencies. It is shared by the interactive modes and RL training.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::Action;
pub use config::{GameConfig, RewardConfig};
pub use engine::{GameEngine, StepInfo, StepResult};
pub use state::{Bird, Food, GameState, Rect};
