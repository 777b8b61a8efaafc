//! Chubby Bird - a flap-to-eat arcade game with a DQN-trained autopilot
//!
//! This library provides:
//! - Core game logic (game module)
//! - DQN environment, agent and model persistence (rl module)
//! - TUI rendering and terminal handling (render module)
//! - Keyboard mapping (input module)
//! - Session and training statistics (metrics module)
//! - Play and training modes (modes module)

pub mod config;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
