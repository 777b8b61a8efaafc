//! Training mode for the DQN agent
//!
//! Runs episodes in the bird environment, learning once per tick, and keeps
//! the best model seen so far on disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use chubby_bird::modes::{TrainConfig, TrainMode};
//! use chubby_bird::rl::{TrainingBackend, default_device};
//!
//! let config = TrainConfig {
//!     episodes: 100,
//!     ..Default::default()
//! };
//!
//! let mut train_mode = TrainMode::<TrainingBackend>::new(config, default_device());
//! train_mode.run()?;
//! ```

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use crossterm::event::{self, Event, KeyEventKind};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::game::{GameConfig, GameState};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::{GameMetrics, TrainingStats};
use crate::render::{Hud, Renderer, TerminalSession};
use crate::rl::{
    BirdEnvironment, DEFAULT_MODEL_PATH, DqnAgent, DqnConfig, ModelMetadata, QNetworkConfig,
    Transition, save_model,
};

/// Episodes shorter than this never replace the best model on reward alone
pub const MIN_STEPS_FOR_REWARD_SAVE: usize = 2500;

/// Frame rate of rendered training
const RENDER_FPS: u64 = 60;

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to train
    pub episodes: usize,

    /// Episode is cut off after this many ticks
    pub max_steps: usize,

    /// Draw the simulation while training
    pub render: bool,

    /// Where the best model is written
    pub save_path: PathBuf,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// Seed for spawns and exploration; entropy when `None`
    pub seed: Option<u64>,

    pub game_config: GameConfig,

    pub dqn_config: DqnConfig,
}

impl TrainConfig {
    pub fn new(episodes: usize, save_path: PathBuf) -> Self {
        Self {
            episodes,
            save_path,
            ..Default::default()
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            episodes: 25,
            max_steps: 8000,
            render: false,
            save_path: PathBuf::from(DEFAULT_MODEL_PATH),
            log_frequency: 1,
            seed: None,
            game_config: GameConfig::default(),
            dqn_config: DqnConfig::default(),
        }
    }
}

/// Why an episode replaced the best model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaveReason {
    Score(u32),
    Reward(f32),
}

/// Decides whether an episode produced a new best model
///
/// A higher score always wins. Failing that, a higher total reward wins, but
/// only for episodes that lasted at least [`MIN_STEPS_FOR_REWARD_SAVE`] ticks.
#[derive(Debug, Clone)]
pub struct BestModelTracker {
    best_score: Option<u32>,
    best_reward: f32,
}

impl BestModelTracker {
    pub fn new() -> Self {
        Self {
            best_score: None,
            best_reward: f32::NEG_INFINITY,
        }
    }

    pub fn consider(&mut self, score: u32, total_reward: f32, steps: usize) -> Option<SaveReason> {
        if self.best_score.is_none_or(|best| score > best) {
            self.best_score = Some(score);
            return Some(SaveReason::Score(score));
        }

        if total_reward > self.best_reward && steps >= MIN_STEPS_FOR_REWARD_SAVE {
            self.best_reward = total_reward;
            return Some(SaveReason::Reward(total_reward));
        }

        None
    }

    pub fn best_score(&self) -> Option<u32> {
        self.best_score
    }
}

impl Default for BestModelTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one training episode
#[derive(Debug, Clone)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub reward: f32,
    pub steps: usize,
    pub score: u32,
    pub epsilon: f64,
    pub saved: Option<SaveReason>,
}

/// Training mode for the DQN agent
pub struct TrainMode<B: AutodiffBackend> {
    agent: DqnAgent<B>,
    env: BirdEnvironment,
    stats: TrainingStats,
    tracker: BestModelTracker,
    config: TrainConfig,
}

impl<B: AutodiffBackend> TrainMode<B> {
    pub fn new(config: TrainConfig, device: B::Device) -> Self {
        let network = QNetworkConfig::new().init::<B>(&device);

        let (agent, env) = match config.seed {
            Some(seed) => (
                DqnAgent::with_seed(network, config.dqn_config.clone(), device, seed),
                BirdEnvironment::with_seed(config.game_config.clone(), seed.wrapping_add(1)),
            ),
            None => (
                DqnAgent::new(network, config.dqn_config.clone(), device),
                BirdEnvironment::new(config.game_config.clone()),
            ),
        };

        Self {
            agent,
            env,
            // 100-episode rolling window
            stats: TrainingStats::new(100),
            tracker: BestModelTracker::new(),
            config,
        }
    }

    /// Run the training loop
    ///
    /// Returns early, keeping the best model saved so far, when the user quits
    /// a rendered run.
    pub fn run(&mut self) -> Result<&TrainingStats> {
        tracing::info!(
            episodes = self.config.episodes,
            max_steps = self.config.max_steps,
            render = self.config.render,
            save_path = %self.config.save_path.display(),
            "starting DQN training"
        );

        let mut view = if self.config.render {
            Some(TrainingView::new()?)
        } else {
            None
        };

        for episode in 0..self.config.episodes {
            let Some(summary) = self.run_episode(episode, view.as_mut())? else {
                tracing::info!(episode, "training stopped by user");
                break;
            };

            if (episode + 1) % self.config.log_frequency.max(1) == 0 {
                tracing::info!(
                    episode = summary.episode,
                    steps = summary.steps,
                    reward = format_args!("{:.2}", summary.reward),
                    score = summary.score,
                    epsilon = format_args!("{:.3}", summary.epsilon),
                    "episode finished"
                );
            }
        }

        drop(view);
        tracing::info!(summary = %self.stats.format_summary(), "training complete");

        Ok(&self.stats)
    }

    /// Run a single training episode
    ///
    /// # Returns
    ///
    /// The episode summary, or `None` if the user stopped a rendered run
    /// before the episode ended.
    pub fn run_episode(
        &mut self,
        episode: usize,
        mut view: Option<&mut TrainingView>,
    ) -> Result<Option<EpisodeSummary>> {
        let mut obs = self.env.reset();
        let mut total_reward = 0.0;
        let mut steps = 0;

        if let Some(view) = view.as_deref_mut() {
            view.metrics.on_game_start();
        }

        loop {
            let action = self.agent.select_action(&obs);
            let (next_obs, reward, done) = self.env.step(action);

            self.agent
                .remember(Transition::new(obs, action, reward, next_obs, done));
            if let Some(loss) = self.agent.train() {
                self.stats.record_loss(loss);
            }

            obs = next_obs;
            total_reward += reward;
            steps += 1;

            if let Some(view) = view.as_deref_mut() {
                view.metrics.on_step(reward);
                let status = format!(
                    "Episode {}/{} | ε {:.3} | Loss {:.4}",
                    episode + 1,
                    self.config.episodes,
                    self.agent.epsilon(),
                    self.stats.mean_loss()
                );
                if view.frame(self.env.state(), status)? {
                    return Ok(None);
                }
            }

            if done || steps >= self.config.max_steps {
                break;
            }
        }

        let score = self.env.score();
        self.stats.record_episode(total_reward, steps, score);
        if let Some(view) = view {
            view.metrics.on_game_over(score);
        }

        let saved = self.tracker.consider(score, total_reward, steps);
        if let Some(reason) = saved {
            self.save_best(episode, score, total_reward)?;
            tracing::info!(?reason, path = %self.config.save_path.display(), "model saved");
        }

        Ok(Some(EpisodeSummary {
            episode,
            reward: total_reward,
            steps,
            score,
            epsilon: self.agent.epsilon(),
            saved,
        }))
    }

    fn save_best(&self, episode: usize, score: u32, total_reward: f32) -> Result<()> {
        let metadata = ModelMetadata::from_agent(&self.agent, episode + 1, score, total_reward);
        save_model(&self.agent, &metadata, &self.config.save_path).with_context(|| {
            format!("Failed to save model to {:?}", self.config.save_path)
        })
    }

    pub fn agent(&self) -> &DqnAgent<B> {
        &self.agent
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }
}

/// Terminal view of a training run
///
/// Drawn synchronously from the training loop, so the agent and environment
/// never leave the training thread; frames only read the game state.
pub struct TrainingView {
    session: TerminalSession,
    renderer: Renderer,
    input_handler: InputHandler,
    metrics: GameMetrics,
    frame_interval: Duration,
    next_frame: Instant,
}

impl TrainingView {
    pub fn new() -> Result<Self> {
        let frame_interval = Duration::from_micros(1_000_000 / RENDER_FPS);
        Ok(Self {
            session: TerminalSession::new()?,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            metrics: GameMetrics::new(),
            frame_interval,
            next_frame: Instant::now() + frame_interval,
        })
    }

    /// Draw one frame and wait for the next frame slot
    ///
    /// Returns true if the user asked to stop training.
    fn frame(&mut self, state: &GameState, status: String) -> Result<bool> {
        self.metrics.update();
        let hud = Hud {
            title: "Chubby Bird - Training".to_string(),
            status,
            controls: "Q/Esc stop training".to_string(),
            banner: None,
        };
        let (renderer, metrics) = (&self.renderer, &self.metrics);
        self.session
            .draw(|frame| renderer.render(frame, state, metrics, &hud))?;

        if self.quit_requested()? {
            return Ok(true);
        }

        let now = Instant::now();
        if now < self.next_frame {
            std::thread::sleep(self.next_frame - now);
            self.next_frame += self.frame_interval;
        } else {
            self.next_frame = now + self.frame_interval;
        }

        Ok(false)
    }

    fn quit_requested(&mut self) -> Result<bool> {
        while event::poll(Duration::ZERO).context("Failed to poll terminal events")? {
            if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
                if key.kind == KeyEventKind::Press
                    && self.input_handler.handle_key_event(key) == KeyAction::Quit
                {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
