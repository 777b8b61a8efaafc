//! DQN hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the DQN (Deep Q-Network) agent
///
/// # Example
///
/// ```rust
/// use chubby_bird::rl::DqnConfig;
///
/// let config = DqnConfig {
///     batch_size: 32,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DqnConfig {
    /// Learning rate for the Adam optimizer
    ///
    /// Default: 1e-3
    pub learning_rate: f64,

    /// Discount factor for future rewards (gamma)
    ///
    /// Default: 0.99
    pub gamma: f32,

    /// Exploration rate at the start of training
    ///
    /// Default: 1.0
    pub epsilon_start: f64,

    /// Exploration rate never decays below this
    ///
    /// Default: 0.01
    pub epsilon_min: f64,

    /// Multiplicative decay applied once per learning step
    ///
    /// Default: 0.999
    pub epsilon_decay: f64,

    /// Chance of a random action on top of epsilon-greedy exploration
    ///
    /// Default: 0.05
    pub random_action_prob: f64,

    /// Transitions per gradient step
    ///
    /// Default: 64
    pub batch_size: usize,

    /// Maximum number of transitions kept for replay
    ///
    /// Default: 5000
    pub buffer_capacity: usize,

    /// Learning steps between hard copies of the online network into the
    /// target network
    ///
    /// Default: 200
    pub target_sync_interval: usize,
}

impl DqnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if !(0.0..=1.0).contains(&self.epsilon_start) {
            return Err(format!(
                "epsilon_start must be in [0, 1], got {}",
                self.epsilon_start
            ));
        }

        if !(0.0..=1.0).contains(&self.epsilon_min) || self.epsilon_min > self.epsilon_start {
            return Err(format!(
                "epsilon_min must be in [0, epsilon_start], got {}",
                self.epsilon_min
            ));
        }

        if self.epsilon_decay <= 0.0 || self.epsilon_decay > 1.0 {
            return Err(format!(
                "epsilon_decay must be in (0, 1], got {}",
                self.epsilon_decay
            ));
        }

        if !(0.0..=1.0).contains(&self.random_action_prob) {
            return Err(format!(
                "random_action_prob must be in [0, 1], got {}",
                self.random_action_prob
            ));
        }

        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }

        if self.batch_size > self.buffer_capacity {
            return Err(format!(
                "batch_size ({}) cannot exceed buffer_capacity ({})",
                self.batch_size, self.buffer_capacity
            ));
        }

        if self.target_sync_interval == 0 {
            return Err("target_sync_interval must be at least 1".to_string());
        }

        Ok(())
    }
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            gamma: 0.99,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.999,
            random_action_prob: 0.05,
            batch_size: 64,
            buffer_capacity: 5000,
            target_sync_interval: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DqnConfig::default();
        assert_eq!(config.learning_rate, 1e-3);
        assert_eq!(config.gamma, 0.99);
        assert_eq!(config.epsilon_start, 1.0);
        assert_eq!(config.epsilon_min, 0.01);
        assert_eq!(config.epsilon_decay, 0.999);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.buffer_capacity, 5000);
        assert_eq!(config.target_sync_interval, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_negative_learning_rate() {
        let mut config = DqnConfig::default();
        config.learning_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_gamma_out_of_range() {
        let mut config = DqnConfig::default();
        config.gamma = 1.5;
        assert!(config.validate().is_err());

        config.gamma = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_epsilon_schedule() {
        let mut config = DqnConfig::default();
        config.epsilon_min = 1.5;
        assert!(config.validate().is_err());

        let mut config = DqnConfig::default();
        config.epsilon_decay = 0.0;
        assert!(config.validate().is_err());

        let mut config = DqnConfig::default();
        config.epsilon_start = 0.0;
        config.epsilon_min = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_batch_exceeds_buffer() {
        let mut config = DqnConfig::default();
        config.batch_size = 6000;
        assert!(config.validate().is_err());

        config.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_sync_interval() {
        let mut config = DqnConfig::default();
        config.target_sync_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_round_trip_keeps_custom_values() {
        let config = DqnConfig {
            gamma: 0.95,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: DqnConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
