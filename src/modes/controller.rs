//! Who decides whether the bird flaps
//!
//! Every interactive mode runs the same loop ([`PlayMode`](super::PlayMode));
//! the modes differ only in the [`Controller`] plugged into it.

use burn::tensor::backend::Backend;
use std::path::Path;

use crate::game::Action;
use crate::input::KeyAction;
use crate::rl::{ModelError, Observation, QNetwork, argmax_rows, load_network, observation_batch};

/// What the play loop does after the bird hits the ground
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeOutcome {
    /// Reset immediately and keep playing
    Continue,
    /// Show a game over screen until the player restarts
    AwaitRestart,
    /// The session is decided; show the result until the player restarts or quits
    Finished(String),
}

pub trait Controller {
    /// Name shown around the playfield
    fn title(&self) -> &str;

    fn decide_action(&mut self, observation: &Observation) -> Action;

    /// Gameplay keys (flap) while an episode is running
    fn handle_key(&mut self, _key: KeyAction) {}

    /// Called once per episode with the food collected in it
    fn episode_finished(&mut self, score: u32) -> EpisodeOutcome;

    /// Start over after a finished session
    fn restart(&mut self) {}

    /// Whether R may abandon an episode that is still running
    fn allows_restart(&self) -> bool {
        true
    }

    /// One line of mode-specific status
    fn status(&self) -> String;

    fn controls(&self) -> &str {
        "Q quit"
    }
}

/// Keyboard-driven bird
#[derive(Debug, Default)]
pub struct HumanController {
    pending_flap: bool,
}

impl HumanController {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Controller for HumanController {
    fn title(&self) -> &str {
        "Chubby Bird"
    }

    fn decide_action(&mut self, _observation: &Observation) -> Action {
        if std::mem::take(&mut self.pending_flap) {
            Action::Flap
        } else {
            Action::Idle
        }
    }

    fn handle_key(&mut self, key: KeyAction) {
        if key == KeyAction::Flap {
            self.pending_flap = true;
        }
    }

    fn episode_finished(&mut self, _score: u32) -> EpisodeOutcome {
        self.pending_flap = false;
        EpisodeOutcome::AwaitRestart
    }

    fn status(&self) -> String {
        "Collect the food, don't fall".to_string()
    }

    fn controls(&self) -> &str {
        "Space/↑/W flap | R restart | Q quit"
    }
}

/// Trained network playing greedily
pub struct AgentController<B: Backend> {
    network: QNetwork<B>,
    device: B::Device,
    episodes: usize,
    best_score: u32,
}

impl<B: Backend> AgentController<B> {
    pub fn new(network: QNetwork<B>, device: B::Device) -> Self {
        Self {
            network,
            device,
            episodes: 0,
            best_score: 0,
        }
    }

    /// Load the network saved by training
    pub fn load(path: &Path, device: B::Device) -> Result<Self, ModelError> {
        let (network, metadata) = load_network::<B>(path, &device)?;
        tracing::info!(
            path = %path.display(),
            episodes = metadata.episodes_trained,
            score = metadata.score,
            "loaded trained model"
        );

        Ok(Self::new(network, device))
    }

    pub fn greedy_action(&self, observation: &Observation) -> Action {
        let q_values = self
            .network
            .forward(observation_batch(&[*observation], &self.device));

        Action::from_index(argmax_rows(q_values)[0])
    }
}

impl<B: Backend> Controller for AgentController<B> {
    fn title(&self) -> &str {
        "Chubby Bird - AI"
    }

    fn decide_action(&mut self, observation: &Observation) -> Action {
        self.greedy_action(observation)
    }

    fn episode_finished(&mut self, score: u32) -> EpisodeOutcome {
        self.episodes += 1;
        self.best_score = self.best_score.max(score);
        tracing::info!(episode = self.episodes, score, "AI episode finished");
        EpisodeOutcome::Continue
    }

    fn status(&self) -> String {
        format!(
            "AI episodes: {} | Best: {}",
            self.episodes, self.best_score
        )
    }

    fn controls(&self) -> &str {
        "R restart episode | Q quit"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Player,
    Ai,
}

/// Player and AI take alternating turns; turn scores add up and the first to
/// `win_score` wins
pub struct VersusController<B: Backend> {
    human: HumanController,
    agent: AgentController<B>,
    turn: Turn,
    player_score: u32,
    ai_score: u32,
    win_score: u32,
}

impl<B: Backend> VersusController<B> {
    /// # Panics
    ///
    /// Panics if `win_score` is zero.
    pub fn new(agent: AgentController<B>, win_score: u32) -> Self {
        assert!(win_score > 0, "win score must be positive");
        Self {
            human: HumanController::new(),
            agent,
            turn: Turn::Player,
            player_score: 0,
            ai_score: 0,
            win_score,
        }
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// Totals as (player, ai)
    pub fn scores(&self) -> (u32, u32) {
        (self.player_score, self.ai_score)
    }

    /// Final standing, e.g. for printing after the terminal is restored
    pub fn result(&self) -> String {
        let verdict = match self.player_score.cmp(&self.ai_score) {
            std::cmp::Ordering::Greater => "YOU WIN!",
            std::cmp::Ordering::Less => "AI WINS!",
            std::cmp::Ordering::Equal => "TIE!",
        };
        format!(
            "Final: You {} - {} AI | {}",
            self.player_score, self.ai_score, verdict
        )
    }
}

impl<B: Backend> Controller for VersusController<B> {
    fn title(&self) -> &str {
        match self.turn {
            Turn::Player => "You vs AI - YOUR TURN",
            Turn::Ai => "You vs AI - AI TURN",
        }
    }

    fn decide_action(&mut self, observation: &Observation) -> Action {
        match self.turn {
            Turn::Player => self.human.decide_action(observation),
            Turn::Ai => self.agent.decide_action(observation),
        }
    }

    fn handle_key(&mut self, key: KeyAction) {
        if self.turn == Turn::Player {
            self.human.handle_key(key);
        }
    }

    fn episode_finished(&mut self, score: u32) -> EpisodeOutcome {
        self.human.episode_finished(score);
        match self.turn {
            Turn::Player => self.player_score += score,
            Turn::Ai => self.ai_score += score,
        }
        tracing::info!(
            turn = ?self.turn,
            score,
            player_total = self.player_score,
            ai_total = self.ai_score,
            "turn finished"
        );

        if self.player_score >= self.win_score || self.ai_score >= self.win_score {
            return EpisodeOutcome::Finished(self.result());
        }

        self.turn = match self.turn {
            Turn::Player => Turn::Ai,
            Turn::Ai => Turn::Player,
        };
        EpisodeOutcome::Continue
    }

    fn allows_restart(&self) -> bool {
        false
    }

    fn restart(&mut self) {
        self.turn = Turn::Player;
        self.player_score = 0;
        self.ai_score = 0;
    }

    fn status(&self) -> String {
        format!(
            "You {}/{} | AI {}/{}",
            self.player_score, self.win_score, self.ai_score, self.win_score
        )
    }

    fn controls(&self) -> &str {
        "Space/↑/W flap on your turn | Q quit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{InferenceBackend, QNetworkConfig, default_device};

    const OBS: Observation = [0.5, 0.0, 1.0, 0.0];

    fn agent() -> AgentController<InferenceBackend> {
        let device = default_device();
        let network = QNetworkConfig::new().init::<InferenceBackend>(&device);
        AgentController::new(network, device)
    }

    #[test]
    fn test_human_flap_is_consumed_once() {
        let mut human = HumanController::new();
        assert_eq!(human.decide_action(&OBS), Action::Idle);

        human.handle_key(KeyAction::Flap);
        human.handle_key(KeyAction::Flap);
        assert_eq!(human.decide_action(&OBS), Action::Flap);
        assert_eq!(human.decide_action(&OBS), Action::Idle);
    }

    #[test]
    fn test_human_ignores_other_keys() {
        let mut human = HumanController::new();
        human.handle_key(KeyAction::Restart);
        assert_eq!(human.decide_action(&OBS), Action::Idle);
        assert_eq!(human.episode_finished(3), EpisodeOutcome::AwaitRestart);
    }

    #[test]
    fn test_agent_is_deterministic() {
        let mut agent = agent();
        let first = agent.decide_action(&OBS);
        for _ in 0..10 {
            assert_eq!(agent.decide_action(&OBS), first);
        }
        assert_eq!(agent.episode_finished(2), EpisodeOutcome::Continue);
        assert!(agent.status().contains("Best: 2"));
    }

    #[test]
    fn test_agent_load_missing_model() {
        let dir = tempfile::TempDir::new().unwrap();
        let result =
            AgentController::<InferenceBackend>::load(&dir.path().join("none"), default_device());

        assert!(matches!(result, Err(ModelError::Missing { .. })));
    }

    #[test]
    fn test_versus_turns_alternate_and_accumulate() {
        let mut versus = VersusController::new(agent(), 10);
        assert_eq!(versus.turn(), Turn::Player);

        assert_eq!(versus.episode_finished(4), EpisodeOutcome::Continue);
        assert_eq!(versus.turn(), Turn::Ai);

        assert_eq!(versus.episode_finished(3), EpisodeOutcome::Continue);
        assert_eq!(versus.turn(), Turn::Player);

        assert_eq!(versus.episode_finished(2), EpisodeOutcome::Continue);
        assert_eq!(versus.scores(), (6, 3));
        assert_eq!(versus.status(), "You 6/10 | AI 3/10");
    }

    #[test]
    fn test_versus_first_to_win_score() {
        let mut versus = VersusController::new(agent(), 10);
        versus.episode_finished(4);

        match versus.episode_finished(10) {
            EpisodeOutcome::Finished(message) => assert!(message.contains("AI WINS!")),
            other => panic!("expected a finished match, got {other:?}"),
        }

        versus.restart();
        assert_eq!(versus.scores(), (0, 0));
        assert_eq!(versus.turn(), Turn::Player);
    }

    #[test]
    fn test_versus_ignores_keys_on_ai_turn() {
        let mut versus = VersusController::new(agent(), 10);
        versus.episode_finished(0);
        assert_eq!(versus.turn(), Turn::Ai);

        versus.handle_key(KeyAction::Flap);
        versus.episode_finished(0);

        // The flap pressed during the AI turn must not leak into the player's turn
        assert_eq!(versus.decide_action(&OBS), Action::Idle);
    }
}
