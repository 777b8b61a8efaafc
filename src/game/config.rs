use serde::{Deserialize, Serialize};

/// Reward shaping applied by the engine each tick
///
/// Zones are expressed as fractions of the screen height. The zones overlap on
/// purpose and are evaluated exactly as listed in [`GameEngine::step`].
///
/// [`GameEngine::step`]: super::GameEngine::step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Applied every tick before anything else
    pub step_penalty: f32,
    /// Collecting a food item
    pub food_reward: f32,
    /// A food item leaving the left edge uncollected
    pub miss_penalty: f32,
    /// Bird top inside the ceiling zone
    pub ceiling_penalty: f32,
    /// Fraction of the height counted as the ceiling zone
    pub ceiling_zone: f32,
    /// Bird top strictly inside the middle band
    pub middle_bonus: f32,
    /// Middle band lower/upper fractions (exclusive)
    pub middle_band: (f32, f32),
    /// Bird bottom below the floor line
    pub floor_penalty: f32,
    /// Fraction of the height where the floor zone starts
    pub floor_zone: f32,
    /// Bird vertically close to the nearest food
    pub proximity_bonus: f32,
    /// Vertical distance counted as "close"
    pub proximity_distance: f32,
    /// Bird bottom below the screen
    pub death_penalty: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            step_penalty: -0.005,
            food_reward: 10.0,
            miss_penalty: -2.0,
            ceiling_penalty: -2.0,
            ceiling_zone: 0.15,
            middle_bonus: 0.05,
            middle_band: (0.25, 0.75),
            floor_penalty: -0.5,
            floor_zone: 0.9,
            proximity_bonus: 0.05,
            proximity_distance: 100.0,
            death_penalty: -10.0,
        }
    }
}

/// Configuration for the game world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the simulated screen
    pub screen_width: f32,
    /// Height of the simulated screen
    pub screen_height: f32,

    /// Fixed horizontal centre of the bird
    pub bird_x: f32,
    /// Side length of the bird's square bounding box
    pub bird_size: f32,
    /// Velocity added every tick
    pub gravity: f32,
    /// Velocity the bird is set to when it flaps
    pub flap_strength: f32,
    /// Absolute velocity limit
    pub max_velocity: f32,
    /// Range the bird's centre is drawn from on reset
    pub spawn_y_range: (i32, i32),

    /// Side length of a food item's square bounding box
    pub food_size: f32,
    /// Leftward movement per tick
    pub food_speed: f32,
    /// A food item spawns on every tick divisible by this
    pub food_spawn_interval: u32,
    /// Horizontal offset past the right edge where food appears
    pub food_spawn_offset: f32,
    /// Range a food item's top is drawn from
    pub food_y_range: (i32, i32),

    /// Divisor applied to the velocity in observations
    pub velocity_scale: f32,

    // Rewards (for RL)
    pub rewards: RewardConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 800.0,
            screen_height: 600.0,
            bird_x: 300.0,
            bird_size: 60.0,
            gravity: 0.5,
            flap_strength: -8.0,
            max_velocity: 15.0,
            spawn_y_range: (50, 500),
            food_size: 40.0,
            food_speed: 4.0,
            food_spawn_interval: 60,
            food_spawn_offset: 50.0,
            food_y_range: (10, 550),
            velocity_scale: 10.0,
            rewards: RewardConfig::default(),
        }
    }
}

impl GameConfig {
    /// Create a configuration for a custom screen size
    ///
    /// Spawn ranges are derived from the height the same way the defaults are.
    pub fn new(width: f32, height: f32) -> Self {
        let h = height as i32;
        Self {
            screen_width: width,
            screen_height: height,
            spawn_y_range: (50, h - 100),
            food_y_range: (10, h - 50),
            ..Default::default()
        }
    }

    /// Check that the world is large enough to simulate
    pub fn validate(&self) -> Result<(), String> {
        if self.screen_width <= 0.0 || self.screen_height <= 0.0 {
            return Err(format!(
                "screen must have positive size, got {}x{}",
                self.screen_width, self.screen_height
            ));
        }

        if self.spawn_y_range.0 > self.spawn_y_range.1 {
            return Err(format!("empty spawn_y_range {:?}", self.spawn_y_range));
        }

        if self.food_y_range.0 > self.food_y_range.1 {
            return Err(format!("empty food_y_range {:?}", self.food_y_range));
        }

        if self.food_spawn_interval == 0 {
            return Err("food_spawn_interval must be at least 1".to_string());
        }

        if self.max_velocity <= 0.0 {
            return Err(format!("max_velocity must be positive, got {}", self.max_velocity));
        }

        if self.food_speed <= 0.0 {
            return Err(format!("food_speed must be positive, got {}", self.food_speed));
        }

        if self.velocity_scale == 0.0 {
            return Err("velocity_scale must be non-zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.screen_width, 800.0);
        assert_eq!(config.screen_height, 600.0);
        assert_eq!(config.food_spawn_interval, 60);
        assert_eq!(config.rewards.food_reward, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config_derives_ranges() {
        let config = GameConfig::new(1000.0, 700.0);
        assert_eq!(config.spawn_y_range, (50, 600));
        assert_eq!(config.food_y_range, (10, 650));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = GameConfig::default();
        config.food_spawn_interval = 0;
        assert!(config.validate().is_err());

        let config = GameConfig::new(100.0, 100.0);
        assert!(config.validate().is_err()); // spawn range (50, 0) is empty
    }

    #[test]
    fn test_non_positive_speeds_rejected() {
        let mut config = GameConfig::default();
        config.max_velocity = -1.0;
        assert!(config.validate().unwrap_err().contains("max_velocity"));

        config.max_velocity = 0.0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.food_speed = 0.0;
        assert!(config.validate().unwrap_err().contains("food_speed"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"gravity": 0.8}"#).unwrap();
        assert_eq!(config.gravity, 0.8);
        assert_eq!(config.screen_height, 600.0);
        assert_eq!(config.rewards, RewardConfig::default());
    }
}
