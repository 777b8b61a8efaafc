//! DQN (Deep Q-Network) agent implementation
//!
//! The agent owns two structurally identical networks. The online network is
//! updated on every learning step; the target network is a frozen copy used
//! only to compute bootstrap targets, refreshed with a hard copy every
//! `target_sync_interval` learning steps.

use super::buffer::{ReplayBuffer, Transition};
use super::config::DqnConfig;
use super::network::{QNetwork, argmax_rows};
use super::observation::{Observation, observation_batch};
use crate::game::Action;
use burn::{
    module::AutodiffModule,
    optim::{Adam, AdamConfig, GradientsParams, Optimizer, adaptor::OptimizerAdaptor},
    tensor::{Bool, ElementConversion, Int, Tensor, TensorData, backend::AutodiffBackend},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// DQN agent for reinforcement learning
///
/// # Type Parameters
///
/// * `B` - Autodiff backend for gradient computation
///
/// # Example
///
/// ```rust,ignore
/// use chubby_bird::rl::{DqnAgent, DqnConfig, QNetworkConfig, TrainingBackend, default_device};
///
/// let device = default_device();
/// let network = QNetworkConfig::new().init::<TrainingBackend>(&device);
/// let mut agent = DqnAgent::new(network, DqnConfig::default(), device);
///
/// let action = agent.select_action(&[0.5, 0.0, 1.0, 0.0]);
/// ```
pub struct DqnAgent<B: AutodiffBackend> {
    /// Network trained on every learning step
    online: QNetwork<B>,

    /// Point-in-time copy of `online` used for bootstrap targets
    target: QNetwork<B::InnerBackend>,

    /// Adam optimizer for the online network
    optim: OptimizerAdaptor<Adam, QNetwork<B>, B>,

    config: DqnConfig,

    buffer: ReplayBuffer,

    /// Current exploration rate
    epsilon: f64,

    /// Successful learning steps so far
    learning_steps: usize,

    rng: StdRng,

    device: B::Device,
}

impl<B: AutodiffBackend> DqnAgent<B> {
    /// Create a new DQN agent with entropy-seeded exploration
    ///
    /// # Panics
    ///
    /// Panics if `config` fails validation.
    pub fn new(network: QNetwork<B>, config: DqnConfig, device: B::Device) -> Self {
        Self::with_rng(network, config, device, StdRng::from_entropy())
    }

    /// Create a DQN agent whose exploration and sampling are reproducible
    pub fn with_seed(
        network: QNetwork<B>,
        config: DqnConfig,
        device: B::Device,
        seed: u64,
    ) -> Self {
        Self::with_rng(network, config, device, StdRng::seed_from_u64(seed))
    }

    fn with_rng(network: QNetwork<B>, config: DqnConfig, device: B::Device, rng: StdRng) -> Self {
        config.validate().expect("Invalid DQN configuration");

        let target = network.valid();
        let optim = AdamConfig::new().init();
        let buffer = ReplayBuffer::new(config.buffer_capacity);

        Self {
            online: network,
            target,
            optim,
            epsilon: config.epsilon_start,
            config,
            buffer,
            learning_steps: 0,
            rng,
            device,
        }
    }

    /// Epsilon-greedy action selection
    ///
    /// Explores with probability epsilon, and independently with probability
    /// `random_action_prob`; otherwise picks the action with the highest
    /// online Q-value.
    pub fn select_action(&mut self, observation: &Observation) -> usize {
        if self.rng.gen_bool(self.epsilon)
            || self.rng.gen_bool(self.config.random_action_prob)
        {
            return self.rng.gen_range(0..Action::COUNT);
        }

        self.greedy_action(observation)
    }

    /// The action with the highest online Q-value
    pub fn greedy_action(&self, observation: &Observation) -> usize {
        let q_values = self
            .online
            .forward(observation_batch::<B>(&[*observation], &self.device))
            .detach();

        argmax_rows(q_values)[0]
    }

    /// Store a transition in the replay buffer
    pub fn remember(&mut self, transition: Transition) {
        self.buffer.push(transition);
    }

    /// Perform one learning step
    ///
    /// Samples a minibatch, regresses the online Q-values of the taken actions
    /// towards `r + gamma * max_a Q_target(s', a)` (no bootstrap on terminal
    /// transitions) and applies one Adam step. Syncs the target network every
    /// `target_sync_interval` steps and decays epsilon.
    ///
    /// # Returns
    ///
    /// The minibatch MSE loss, or `None` when fewer than `batch_size`
    /// transitions are stored (nothing is changed in that case).
    pub fn train(&mut self) -> Option<f32> {
        if self.buffer.len() < self.config.batch_size {
            return None;
        }

        let batch = self.buffer.sample(self.config.batch_size, &mut self.rng);
        let states: Vec<Observation> = batch.iter().map(|t| t.state).collect();
        let actions: Vec<i32> = batch.iter().map(|t| t.action as i32).collect();
        let rewards: Vec<f32> = batch.iter().map(|t| t.reward).collect();
        let next_states: Vec<Observation> = batch.iter().map(|t| t.next_state).collect();
        let dones: Vec<bool> = batch.iter().map(|t| t.done).collect();

        let targets = Tensor::<B, 1>::from_inner(self.bootstrap_targets(
            &rewards,
            &next_states,
            &dones,
        ));

        let states = observation_batch::<B>(&states, &self.device);
        let actions = Tensor::<B, 1, Int>::from_ints(actions.as_slice(), &self.device);

        // Q(s, a) for the actions actually taken
        let current_q = self
            .online
            .forward(states)
            .gather(1, actions.unsqueeze_dim(1))
            .squeeze::<1>(1);

        let loss = self.compute_loss(current_q, targets);
        let loss_value = loss.clone().into_scalar().elem::<f32>();

        let grads = GradientsParams::from_grads(loss.backward(), &self.online);
        self.online = self
            .optim
            .step(self.config.learning_rate, self.online.clone(), grads);

        self.learning_steps += 1;
        if self.learning_steps % self.config.target_sync_interval == 0 {
            self.sync_target();
            tracing::debug!(step = self.learning_steps, "target network synchronized");
        }

        self.decay_epsilon();

        Some(loss_value)
    }

    /// Bootstrap targets `r + gamma * max_a Q_target(s', a) * (1 - done)`
    ///
    /// Terminal rows get exactly `r`, even when the target network output is
    /// not finite.
    pub fn bootstrap_targets(
        &self,
        rewards: &[f32],
        next_states: &[Observation],
        dones: &[bool],
    ) -> Tensor<B::InnerBackend, 1> {
        assert!(
            rewards.len() == next_states.len() && rewards.len() == dones.len(),
            "bootstrap inputs must have equal lengths"
        );

        let next_q = self
            .target
            .forward(observation_batch(next_states, &self.device))
            .max_dim(1)
            .squeeze::<1>(1);

        let done_mask = Tensor::<B::InnerBackend, 1, Bool>::from_bool(
            TensorData::new(dones.to_vec(), [dones.len()]),
            &self.device,
        );
        let rewards = Tensor::<B::InnerBackend, 1>::from_floats(rewards, &self.device);

        rewards + next_q.mask_fill(done_mask, 0.0).mul_scalar(self.config.gamma)
    }

    /// Mean squared error between predicted and target Q-values
    fn compute_loss(&self, current_q: Tensor<B, 1>, target_q: Tensor<B, 1>) -> Tensor<B, 1> {
        let diff = current_q - target_q;
        (diff.clone() * diff).mean()
    }

    /// Hard-copy the online parameters into the target network
    pub fn sync_target(&mut self) {
        self.target = self.online.valid();
    }

    fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Override the exploration rate, e.g. 0.0 for greedy evaluation
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    /// Get the number of learning steps performed
    pub fn learning_steps(&self) -> usize {
        self.learning_steps
    }

    pub fn buffer(&self) -> &ReplayBuffer {
        &self.buffer
    }

    /// Get a reference to the online network
    pub fn network(&self) -> &QNetwork<B> {
        &self.online
    }

    /// Get a reference to the target network
    pub fn target_network(&self) -> &QNetwork<B::InnerBackend> {
        &self.target
    }

    pub fn config(&self) -> &DqnConfig {
        &self.config
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }
}
