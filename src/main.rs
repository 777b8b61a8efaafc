use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use chubby_bird::config::AppConfig;
use chubby_bird::game::GameConfig;
use chubby_bird::modes::{
    AgentController, HumanController, PlayMode, TrainConfig, TrainMode, VersusController,
};
use chubby_bird::rl::{
    BirdEnvironment, DEFAULT_MODEL_PATH, InferenceBackend, TrainingBackend, default_device,
    persistence::weights_path,
};

/// Log file used while the terminal shows the game
const LOG_FILE: &str = "chubby_bird.log";

#[derive(Parser)]
#[command(name = "chubby_bird")]
#[command(version, about = "Flap-to-eat arcade game with a DQN-trained autopilot")]
struct Cli {
    /// Game mode
    #[arg(long, value_enum, default_value = "manual")]
    mode: Mode,

    /// Training episodes
    #[arg(long, default_value = "25")]
    episodes: usize,

    /// Tick budget per training episode
    #[arg(long, default_value = "8000")]
    max_steps: usize,

    /// Draw the game while training
    #[arg(long)]
    render: bool,

    /// Model path (weights are stored next to it as .mpk)
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Seed for reproducible spawns and exploration
    #[arg(long)]
    seed: Option<u64>,

    /// Points needed to win a versus match
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    win_score: u32,

    /// JSON file overriding game and DQN settings
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Play with the keyboard
    Manual,
    /// Watch the trained AI play
    Watch,
    /// Take turns against the trained AI
    Versus,
    /// Train the AI
    Train,
}

impl Mode {
    fn uses_terminal(self, render: bool) -> bool {
        self != Mode::Train || render
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.mode.uses_terminal(cli.render))?;

    let app_config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.mode {
        Mode::Manual => {
            let env = environment(app_config.game, cli.seed);
            let mut mode = PlayMode::with_environment(env, HumanController::new());
            mode.run().await?;
            println!("\nYour best score: {}\n", mode.metrics().high_score);
        }
        Mode::Watch => {
            let Some(agent) = load_agent(&cli.model)? else {
                return Ok(());
            };
            let env = environment(app_config.game, cli.seed);
            let mut mode = PlayMode::with_environment(env, agent);
            mode.run().await?;
            println!("\nAI best score: {}\n", mode.metrics().high_score);
        }
        Mode::Versus => {
            let Some(agent) = load_agent(&cli.model)? else {
                return Ok(());
            };
            let env = environment(app_config.game, cli.seed);
            let versus = VersusController::new(agent, cli.win_score);
            let mut mode = PlayMode::with_environment(env, versus);
            mode.run().await?;
            println!("\n{}\n", mode.controller().result());
        }
        Mode::Train => {
            let config = TrainConfig {
                episodes: cli.episodes,
                max_steps: cli.max_steps,
                render: cli.render,
                save_path: cli.model.clone(),
                seed: cli.seed,
                game_config: app_config.game,
                dqn_config: app_config.dqn,
                ..Default::default()
            };

            let mut train_mode = TrainMode::<TrainingBackend>::new(config, default_device());
            let stats = train_mode.run()?;
            println!("\nTraining complete: {}", stats.format_summary());
            println!("Best model: {}\n", weights_path(&cli.model).display());
        }
    }

    Ok(())
}

/// Log to stderr, or to a file while a mode owns the terminal
fn init_tracing(to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if to_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(LOG_FILE)
            .with_context(|| format!("Failed to open log file {LOG_FILE}"))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}

fn environment(config: GameConfig, seed: Option<u64>) -> BirdEnvironment {
    match seed {
        Some(seed) => BirdEnvironment::with_seed(config, seed),
        None => BirdEnvironment::new(config),
    }
}

/// Load the trained agent, or explain how to get one
fn load_agent(path: &Path) -> Result<Option<AgentController<InferenceBackend>>> {
    match AgentController::load(path, default_device()) {
        Ok(agent) => Ok(Some(agent)),
        Err(err) if err.is_missing() => {
            tracing::warn!(path = %path.display(), "no trained model");
            eprintln!(
                "{} not found! Train first with: chubby_bird --mode train",
                weights_path(path).display()
            );
            Ok(None)
        }
        Err(err) => {
            Err(err).with_context(|| format!("Failed to load model from {:?}", path))
        }
    }
}
