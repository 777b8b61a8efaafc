//! Interactive game loop shared by manual, watch and versus play
//!
//! The loop steps the environment at 60 Hz, asks the [`Controller`] for each
//! action and redraws at about 30 FPS. What happens when the bird hits the
//! ground is up to the controller.

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

use super::controller::{Controller, EpisodeOutcome};
use crate::game::GameConfig;
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{Hud, Renderer, TerminalSession};
use crate::rl::{BirdEnvironment, Observation};

/// Simulation rate of interactive play
pub const TICK_RATE_HZ: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Running,
    GameOver,
    Finished(String),
}

pub struct PlayMode<C: Controller> {
    env: BirdEnvironment,
    controller: C,
    observation: Observation,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    phase: Phase,
    should_quit: bool,
}

impl<C: Controller> PlayMode<C> {
    pub fn new(config: GameConfig, controller: C) -> Self {
        Self::with_environment(BirdEnvironment::new(config), controller)
    }

    pub fn with_environment(mut env: BirdEnvironment, controller: C) -> Self {
        let observation = env.reset();

        Self {
            env,
            controller,
            observation,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            phase: Phase::Running,
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut session = TerminalSession::new()?;
        self.run_game_loop(&mut session).await
    }

    async fn run_game_loop(&mut self, session: &mut TerminalSession) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(Duration::from_micros(1_000_000 / TICK_RATE_HZ));
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Render at 30 FPS (33ms per frame)
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                _ = tick_timer.tick() => {
                    self.tick();
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    let hud = self.hud();
                    session.draw(|frame| {
                        self.renderer.render(frame, self.env.state(), &self.metrics, &hud);
                    }).context("Failed to render game")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }
            self.handle_key_action(self.input_handler.handle_key_event(key));
        }
    }

    fn handle_key_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Restart => match self.phase {
                Phase::Finished(_) => {
                    self.controller.restart();
                    self.reset_game();
                }
                Phase::GameOver => self.reset_game(),
                Phase::Running if self.controller.allows_restart() => self.reset_game(),
                Phase::Running => {}
            },
            KeyAction::Flap | KeyAction::None => {
                if self.phase == Phase::Running {
                    self.controller.handle_key(action);
                }
            }
        }
    }

    /// Advance the game by one simulation tick
    fn tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }

        let action = self.controller.decide_action(&self.observation);
        let (observation, reward, done) = self.env.step(action.index());
        self.observation = observation;
        self.metrics.on_step(reward);

        if done {
            let score = self.env.score();
            self.metrics.on_game_over(score);

            match self.controller.episode_finished(score) {
                EpisodeOutcome::Continue => self.reset_game(),
                EpisodeOutcome::AwaitRestart => self.phase = Phase::GameOver,
                EpisodeOutcome::Finished(message) => self.phase = Phase::Finished(message),
            }
        }
    }

    fn reset_game(&mut self) {
        self.observation = self.env.reset();
        self.metrics.on_game_start();
        self.phase = Phase::Running;
    }

    fn hud(&self) -> Hud {
        let banner = match &self.phase {
            Phase::Running => None,
            Phase::GameOver => Some(vec![
                "GAME OVER".to_string(),
                format!("Final Score: {}", self.env.score()),
                "Press R to restart or Q to quit".to_string(),
            ]),
            Phase::Finished(message) => Some(vec![
                "MATCH OVER".to_string(),
                message.clone(),
                "Press R to play again or Q to quit".to_string(),
            ]),
        };

        Hud {
            title: self.controller.title().to_string(),
            status: self.controller.status(),
            controls: self.controller.controls().to_string(),
            banner,
        }
    }
}
