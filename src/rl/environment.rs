use super::observation::{Observation, create_observation};
use crate::game::{Action, GameConfig, GameEngine, GameState};

/// Chubby Bird environment for reinforcement learning
///
/// Wraps the game engine and provides the standard RL interface:
/// - Observations as 4-feature vectors
/// - Discrete action space (0: do nothing, 1: flap)
/// - `reset` / `step` returning `(observation, reward, done)`
///
/// Callers must `reset` before the first `step` of every episode and must
/// not `step` a finished episode.
pub struct BirdEnvironment {
    engine: GameEngine,
    state: GameState,
}

impl BirdEnvironment {
    /// Create a new environment with entropy-seeded spawns
    pub fn new(config: GameConfig) -> Self {
        Self::from_engine(GameEngine::new(config))
    }

    /// Create an environment whose spawns are reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::from_engine(GameEngine::with_seed(config, seed))
    }

    fn from_engine(mut engine: GameEngine) -> Self {
        let state = engine.reset();
        Self { engine, state }
    }

    /// Reset the environment and return the initial observation
    pub fn reset(&mut self) -> Observation {
        self.state = self.engine.reset();
        self.observation()
    }

    /// Step the environment with a discrete action
    ///
    /// Actions:
    /// - 0: Do nothing
    /// - 1: Flap
    ///
    /// Returns: (observation, reward, done)
    ///
    /// # Panics
    ///
    /// Panics on an action index other than 0 or 1, or when the episode has
    /// already finished.
    pub fn step(&mut self, action_idx: usize) -> (Observation, f32, bool) {
        let action = Action::from_index(action_idx);
        let step_result = self.engine.step(&mut self.state, action);

        (self.observation(), step_result.reward, step_result.terminated)
    }

    /// Get current observation without stepping
    pub fn observation(&self) -> Observation {
        create_observation(&self.state, self.engine.config())
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    /// Get reference to current game state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access to the world, for scripted scenarios
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Collected food items in the current episode
    pub fn score(&self) -> u32 {
        self.state.score
    }

    /// Spawn a food item at the right edge with the given top
    pub fn spawn_food_at(&mut self, top: f32) {
        self.engine.spawn_food_at(&mut self.state, top);
    }
}
