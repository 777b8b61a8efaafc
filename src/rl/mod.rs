//! Reinforcement learning for Chubby Bird
//!
//! Provides:
//! - 4-feature observations (bird height, velocity, offset to nearest food)
//! - Step/reset environment wrapper around the game engine
//! - Fully connected Q-network and DQN agent with a target network
//! - Bounded experience replay
//! - Model persistence with Burn recorders

pub mod backend;
pub mod buffer;
pub mod config;
pub mod dqn;
pub mod environment;
pub mod network;
pub mod observation;
pub mod persistence;

pub use backend::{InferenceBackend, TrainingBackend, default_device};
pub use buffer::{ReplayBuffer, Transition};
pub use config::DqnConfig;
pub use dqn::DqnAgent;
pub use environment::BirdEnvironment;
pub use network::{QNetwork, QNetworkConfig, argmax_rows};
pub use observation::{OBSERVATION_DIM, Observation, create_observation, observation_batch};
pub use persistence::{DEFAULT_MODEL_PATH, ModelError, ModelMetadata, load_network, save_model};
