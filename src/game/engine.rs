use super::{
    action::Action,
    config::GameConfig,
    state::{Bird, Food, GameState},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Information about a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    /// Food items collected this step
    pub collected: u32,
    /// Food items that left the screen uncollected this step
    pub missed: u32,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Reward for this step (for RL training)
    pub reward: f32,
    /// Whether the game has terminated
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine seeded from OS entropy
    ///
    /// # Panics
    ///
    /// Panics if `config` fails validation.
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a game engine whose spawn randomness is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        config.validate().expect("Invalid game configuration");
        Self { config, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to initial state
    ///
    /// The bird starts at a random height inside `spawn_y_range`.
    pub fn reset(&mut self) -> GameState {
        let (lo, hi) = self.config.spawn_y_range;
        let center_y = self.rng.gen_range(lo..=hi) as f32;
        let bird = Bird::new(self.config.bird_x, center_y, self.config.bird_size);

        GameState::new(bird, self.config.screen_width, self.config.screen_height)
    }

    /// Execute one tick of the game
    ///
    /// # Panics
    ///
    /// Panics if the state is already terminal; call [`GameEngine::reset`] first.
    pub fn step(&mut self, state: &mut GameState, action: Action) -> StepResult {
        assert!(
            !state.done,
            "step called on a finished episode; reset the game first"
        );

        let rewards = &self.config.rewards;
        let height = self.config.screen_height;
        let mut reward = rewards.step_penalty;
        let mut info = StepInfo::default();

        state.steps += 1;

        // Bird physics
        if action == Action::Flap {
            state.bird.flap(self.config.flap_strength);
        }
        state.bird.apply_gravity(self.config.gravity);
        state.bird.velocity = state
            .bird
            .velocity
            .clamp(-self.config.max_velocity, self.config.max_velocity);
        state.bird.clamp_to_ceiling();

        if state.steps % self.config.food_spawn_interval == 0 {
            let (lo, hi) = self.config.food_y_range;
            let top = self.rng.gen_range(lo..=hi) as f32;
            self.spawn_food_at(state, top);
        }

        // Move food and resolve collisions
        let bird_rect = state.bird.rect;
        let speed = self.config.food_speed;
        state.foods.retain_mut(|food| {
            food.advance(speed);
            if bird_rect.overlaps(&food.rect) {
                info.collected += 1;
                false
            } else if food.has_exited() {
                info.missed += 1;
                false
            } else {
                true
            }
        });
        state.score += info.collected;
        reward += info.collected as f32 * rewards.food_reward;
        reward += info.missed as f32 * rewards.miss_penalty;

        // Position shaping
        let bird = &state.bird.rect;
        let (band_lo, band_hi) = rewards.middle_band;
        if bird.top < height * rewards.ceiling_zone {
            reward += rewards.ceiling_penalty;
        } else if height * band_lo < bird.top && bird.top < height * band_hi {
            reward += rewards.middle_bonus;
        }
        if bird.bottom() > height * rewards.floor_zone {
            reward += rewards.floor_penalty;
        }

        if let Some(food) = state.nearest_food() {
            if (food.rect.top - bird.top).abs() < rewards.proximity_distance {
                reward += rewards.proximity_bonus;
            }
        }

        if bird.bottom() > height {
            reward += rewards.death_penalty;
            state.done = true;
        }

        StepResult {
            reward,
            terminated: state.done,
            info,
        }
    }

    /// Spawn a food item just past the right edge with the given top
    pub fn spawn_food_at(&self, state: &mut GameState, top: f32) {
        let size = self.config.food_size;
        let left = self.config.screen_width + self.config.food_spawn_offset - size / 2.0;
        state.foods.push(Food::new(left, top, size));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> GameEngine {
        GameEngine::with_seed(GameConfig::default(), 7)
    }

    #[test]
    #[should_panic(expected = "Invalid game configuration")]
    fn test_engine_rejects_invalid_config() {
        let config = GameConfig {
            max_velocity: -1.0,
            ..Default::default()
        };
        GameEngine::with_seed(config, 7);
    }

    #[test]
    fn test_reset() {
        let mut engine = engine();
        let state = engine.reset();

        assert!(!state.done);
        assert_eq!(state.score, 0);
        assert_eq!(state.steps, 0);
        assert!(state.foods.is_empty());
        assert_eq!(state.bird.velocity, 0.0);

        let center = state.bird.rect.top + 30.0;
        assert!((50.0..=500.0).contains(&center));
    }

    #[test]
    fn test_gravity_pulls_bird_down() {
        let mut engine = engine();
        let mut state = engine.reset();
        let top = state.bird.rect.top;

        engine.step(&mut state, Action::Idle);

        assert_eq!(state.steps, 1);
        assert_eq!(state.bird.velocity, 0.5);
        assert_eq!(state.bird.rect.top, top + 0.5);
    }

    #[test]
    fn test_flap_moves_bird_up() {
        let mut engine = engine();
        let mut state = engine.reset();
        let top = state.bird.rect.top;

        engine.step(&mut state, Action::Flap);

        assert_eq!(state.bird.velocity, -7.5);
        assert_eq!(state.bird.rect.top, top - 7.5);
    }

    #[test]
    fn test_velocity_clamped() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.bird.rect.top = 100.0;
        state.bird.velocity = 14.8;

        engine.step(&mut state, Action::Idle);

        assert_eq!(state.bird.velocity, 15.0);
    }

    #[test]
    fn test_food_spawns_on_interval() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.bird.rect.top = 250.0;

        for _ in 0..59 {
            state.bird.rect.top = 250.0;
            state.bird.velocity = 0.0;
            engine.step(&mut state, Action::Idle);
        }
        assert!(state.foods.is_empty());

        state.bird.rect.top = 250.0;
        engine.step(&mut state, Action::Idle);
        assert_eq!(state.foods.len(), 1);

        let food = &state.foods[0];
        assert_eq!(food.rect.left, 800.0 + 50.0 - 20.0 - 4.0);
        assert!((10.0..=550.0).contains(&food.rect.top));
    }

    #[test]
    fn test_food_collection() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.bird.rect.top = 250.0;

        let bird = state.bird.rect;
        state.foods.push(Food::new(bird.left + 10.0, bird.top, 40.0));

        let result = engine.step(&mut state, Action::Idle);

        assert_eq!(result.info.collected, 1);
        assert_eq!(state.score, 1);
        assert!(state.foods.is_empty());
        assert!(result.reward >= 10.0 - 0.005);
    }

    #[test]
    fn test_missed_food_penalty() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.bird.rect.top = 250.0;
        state.foods.push(Food::new(-38.0, 500.0, 40.0));

        let result = engine.step(&mut state, Action::Idle);

        assert_eq!(result.info.missed, 1);
        assert!(state.foods.is_empty());
        // -0.005 step, -2 miss, +0.05 middle band
        assert!((result.reward - (-1.955)).abs() < 1e-5);
    }

    #[test]
    fn test_ceiling_penalty() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.bird.rect.top = 10.0;

        let result = engine.step(&mut state, Action::Idle);

        assert!((result.reward - (-2.005)).abs() < 1e-5);
    }

    #[test]
    fn test_floor_zone_penalty() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.bird.rect.top = 490.0; // bottom 550.5 > 540

        let result = engine.step(&mut state, Action::Idle);

        assert!(!result.terminated);
        assert!((result.reward - (-0.505)).abs() < 1e-5);
    }

    #[test]
    fn test_proximity_bonus() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.bird.rect.top = 250.0;
        state.foods.push(Food::new(700.0, 300.0, 40.0));

        let result = engine.step(&mut state, Action::Idle);

        // -0.005 step, +0.05 middle band, +0.05 proximity
        assert!((result.reward - 0.095).abs() < 1e-5);
    }

    #[test]
    fn test_death_at_bottom() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.bird.rect.top = 545.0;

        let result = engine.step(&mut state, Action::Idle);

        assert!(result.terminated);
        assert!(state.done);
        // -0.005 step, -0.5 floor zone, -10 death
        assert!((result.reward - (-10.505)).abs() < 1e-5);
    }

    #[test]
    #[should_panic(expected = "reset the game first")]
    fn test_step_after_done_panics() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.done = true;
        engine.step(&mut state, Action::Idle);
    }

    #[test]
    fn test_seeded_engines_agree() {
        let mut a = GameEngine::with_seed(GameConfig::default(), 42);
        let mut b = GameEngine::with_seed(GameConfig::default(), 42);
        let mut state_a = a.reset();
        let mut state_b = b.reset();
        assert_eq!(state_a, state_b);

        for tick in 0..300 {
            if state_a.done {
                break;
            }
            let action = if tick % 9 == 0 { Action::Flap } else { Action::Idle };
            let ra = a.step(&mut state_a, action);
            let rb = b.step(&mut state_b, action);
            assert_eq!(ra, rb);
            assert_eq!(state_a, state_b);
        }
    }
}
