//! Experience replay buffer for DQN training
//!
//! A bounded FIFO of transitions. Once full, every push evicts the oldest
//! transition in O(1). Training samples uniform minibatches from it, which
//! decorrelates consecutive updates.

use rand::Rng;
use std::collections::VecDeque;

use super::observation::Observation;

/// One environment tick as seen by the learner
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: Observation,
    pub action: usize,
    pub reward: f32,
    pub next_state: Observation,
    pub done: bool,
}

impl Transition {
    pub fn new(
        state: Observation,
        action: usize,
        reward: f32,
        next_state: Observation,
        done: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            done,
        }
    }
}

/// Bounded ring of transitions with uniform sampling
///
/// # Example
///
/// ```rust
/// use chubby_bird::rl::{ReplayBuffer, Transition};
///
/// let mut buffer = ReplayBuffer::new(2);
/// for i in 0..3 {
///     buffer.push(Transition::new([0.0; 4], 0, i as f32, [0.0; 4], false));
/// }
///
/// assert_eq!(buffer.len(), 2);
/// assert_eq!(buffer.iter().next().unwrap().reward, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    transitions: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    /// Create a buffer holding at most `capacity` transitions
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay buffer capacity must be positive");
        Self {
            transitions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a transition, evicting the oldest one when full
    pub fn push(&mut self, transition: Transition) {
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Draw `batch_size` distinct transitions uniformly at random
    ///
    /// # Panics
    ///
    /// Panics if fewer than `batch_size` transitions are stored.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Vec<&Transition> {
        assert!(
            batch_size <= self.transitions.len(),
            "cannot sample {} transitions from a buffer holding {}",
            batch_size,
            self.transitions.len()
        );

        rand::seq::index::sample(rng, self.transitions.len(), batch_size)
            .into_iter()
            .map(|idx| &self.transitions[idx])
            .collect()
    }

    /// Transitions from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.transitions.len() == self.capacity
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    fn transition(id: usize) -> Transition {
        Transition::new([id as f32, 0.0, 0.0, 0.0], id % 2, id as f32, [0.0; 4], false)
    }

    #[test]
    fn test_push_and_len() {
        let mut buffer = ReplayBuffer::new(10);
        assert!(buffer.is_empty());

        buffer.push(transition(0));
        buffer.push(transition(1));

        assert_eq!(buffer.len(), 2);
        assert!(!buffer.is_full());
        assert_eq!(buffer.capacity(), 10);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut buffer = ReplayBuffer::new(5000);

        for id in 1..=5001 {
            buffer.push(transition(id));
            assert!(buffer.len() <= 5000);
        }

        assert_eq!(buffer.len(), 5000);
        assert!(buffer.iter().all(|t| t.reward != 1.0));
        assert_eq!(buffer.iter().next().unwrap().reward, 2.0);
        assert_eq!(buffer.iter().last().unwrap().reward, 5001.0);
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut buffer = ReplayBuffer::new(100);
        for id in 0..100 {
            buffer.push(transition(id));
        }

        let mut rng = StdRng::seed_from_u64(0);
        let batch = buffer.sample(64, &mut rng);

        assert_eq!(batch.len(), 64);
        let distinct: HashSet<u32> = batch.iter().map(|t| t.reward as u32).collect();
        assert_eq!(distinct.len(), 64);
    }

    #[test]
    fn test_sample_whole_buffer() {
        let mut buffer = ReplayBuffer::new(8);
        for id in 0..8 {
            buffer.push(transition(id));
        }

        let mut rng = StdRng::seed_from_u64(1);
        let mut rewards: Vec<u32> = buffer
            .sample(8, &mut rng)
            .iter()
            .map(|t| t.reward as u32)
            .collect();
        rewards.sort();

        assert_eq!(rewards, (0..8).collect::<Vec<_>>());
    }

    #[test]
    #[should_panic(expected = "cannot sample")]
    fn test_oversampling_panics() {
        let mut buffer = ReplayBuffer::new(8);
        buffer.push(transition(0));

        let mut rng = StdRng::seed_from_u64(0);
        buffer.sample(2, &mut rng);
    }

    #[test]
    fn test_clear() {
        let mut buffer = ReplayBuffer::new(4);
        buffer.push(transition(0));
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
