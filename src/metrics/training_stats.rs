//! Training statistics tracking for DQN
//!
//! Rolling averages over recent episodes and learning steps, plus running
//! totals and the best episode seen so far.

use std::collections::VecDeque;

/// Training statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use chubby_bird::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
///
/// stats.record_episode(15.5, 150, 2);
/// stats.record_loss(0.8);
///
/// assert_eq!(stats.best_score(), 2);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    episode_rewards: VecDeque<f32>,

    /// Episode lengths in steps
    episode_lengths: VecDeque<usize>,

    /// Food collected per episode
    episode_scores: VecDeque<u32>,

    losses: VecDeque<f32>,

    total_episodes: usize,
    total_steps: usize,
    best_score: u32,
    best_reward: f32,

    window_size: usize,
}

impl TrainingStats {
    /// Create a tracker averaging over the last `window_size` values
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_rewards: VecDeque::with_capacity(window_size),
            episode_lengths: VecDeque::with_capacity(window_size),
            episode_scores: VecDeque::with_capacity(window_size),
            losses: VecDeque::with_capacity(window_size),
            total_episodes: 0,
            total_steps: 0,
            best_score: 0,
            best_reward: f32::NEG_INFINITY,
            window_size,
        }
    }

    /// Record the completion of an episode
    ///
    /// # Example
    ///
    /// ```rust
    /// use chubby_bird::metrics::TrainingStats;
    ///
    /// let mut stats = TrainingStats::new(100);
    /// stats.record_episode(-12.0, 150, 0);
    ///
    /// assert_eq!(stats.total_episodes(), 1);
    /// assert_eq!(stats.total_steps(), 150);
    /// ```
    pub fn record_episode(&mut self, reward: f32, length: usize, score: u32) {
        Self::push_deque(&mut self.episode_rewards, reward, self.window_size);
        Self::push_deque(&mut self.episode_lengths, length, self.window_size);
        Self::push_deque(&mut self.episode_scores, score, self.window_size);
        self.total_episodes += 1;
        self.total_steps += length;
        self.best_score = self.best_score.max(score);
        self.best_reward = self.best_reward.max(reward);
    }

    /// Record the loss of one learning step
    pub fn record_loss(&mut self, loss: f32) {
        Self::push_deque(&mut self.losses, loss, self.window_size);
    }

    pub fn mean_episode_reward(&self) -> f32 {
        Self::mean(self.episode_rewards.iter().copied())
    }

    pub fn mean_episode_length(&self) -> f32 {
        Self::mean(self.episode_lengths.iter().map(|&len| len as f32))
    }

    pub fn mean_episode_score(&self) -> f32 {
        Self::mean(self.episode_scores.iter().map(|&score| score as f32))
    }

    /// Mean loss over recent learning steps, 0.0 before the first one
    pub fn mean_loss(&self) -> f32 {
        Self::mean(self.losses.iter().copied())
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Highest score of any recorded episode
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Highest total reward of any recorded episode
    pub fn best_reward(&self) -> Option<f32> {
        (self.total_episodes > 0).then_some(self.best_reward)
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line summary of the rolling statistics
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Reward: {:.2} | Score: {:.2} | Len: {:.1} | Loss: {:.4} | Best: {}",
            self.total_episodes,
            self.total_steps,
            self.mean_episode_reward(),
            self.mean_episode_score(),
            self.mean_episode_length(),
            self.mean_loss(),
            self.best_score,
        )
    }

    fn mean(values: impl ExactSizeIterator<Item = f32>) -> f32 {
        let len = values.len();
        if len == 0 {
            0.0
        } else {
            values.sum::<f32>() / len as f32
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}
