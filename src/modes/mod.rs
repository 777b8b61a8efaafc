pub mod controller;
pub mod play;
pub mod train;

pub use controller::{
    AgentController, Controller, EpisodeOutcome, HumanController, Turn, VersusController,
};
pub use play::PlayMode;
pub use train::{
    BestModelTracker, EpisodeSummary, SaveReason, TrainConfig, TrainMode, TrainingView,
};
