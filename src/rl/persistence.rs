//! Model persistence for saving and loading trained agents
//!
//! A saved model is two files next to each other:
//! - `<path>.mpk` - online network weights (Burn named MessagePack record)
//! - `<path>.meta.json` - metadata as JSON
//!
//! Loading distinguishes "nothing has been trained yet" ([`ModelError::Missing`])
//! from every other failure so that play modes can ask the user to train first.

use super::{DqnAgent, DqnConfig, QNetwork, QNetworkConfig};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::{AutodiffBackend, Backend},
};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of the best model found during training
pub const DEFAULT_MODEL_PATH: &str = "models/best_model";

/// Errors raised while saving or loading a model
#[derive(Debug, Error)]
pub enum ModelError {
    /// No trained model exists at the requested path
    #[error("no trained model found at {path:?}; run training first")]
    Missing { path: PathBuf },

    #[error("failed to access {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read or write network weights: {0}")]
    Record(String),

    #[error("invalid model metadata")]
    Metadata(#[from] serde_json::Error),
}

impl ModelError {
    pub fn is_missing(&self) -> bool {
        matches!(self, ModelError::Missing { .. })
    }
}

/// Metadata saved with the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Layer sizes needed to rebuild the network
    pub network: QNetworkConfig,

    /// DQN configuration used during training
    pub dqn_config: DqnConfig,

    /// Learning steps completed when the model was saved
    pub learning_steps: usize,

    /// Episodes completed when the model was saved
    pub episodes_trained: usize,

    /// Food collected in the episode that produced this model
    pub score: u32,

    /// Total reward of the episode that produced this model
    pub total_reward: f32,

    /// Exploration rate at save time
    pub epsilon: f64,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl ModelMetadata {
    /// Describe the current state of `agent`
    pub fn from_agent<B: AutodiffBackend>(
        agent: &DqnAgent<B>,
        episodes_trained: usize,
        score: u32,
        total_reward: f32,
    ) -> Self {
        Self {
            network: QNetworkConfig::new(),
            dqn_config: agent.config().clone(),
            learning_steps: agent.learning_steps(),
            episodes_trained,
            score,
            total_reward,
            epsilon: agent.epsilon(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Path of the weights file for a model path
pub fn weights_path(path: &Path) -> PathBuf {
    path.with_extension("mpk")
}

/// Path of the metadata file for a model path
pub fn metadata_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

/// Save the agent's online network and metadata
///
/// Creates parent directories if they don't exist and overwrites any model
/// already stored at `path`.
pub fn save_model<B: AutodiffBackend>(
    agent: &DqnAgent<B>,
    metadata: &ModelMetadata,
    path: &Path,
) -> Result<(), ModelError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ModelError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let record = agent.network().clone().into_record();
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(record, weights_path(path))
        .map_err(|err| ModelError::Record(format!("{err:?}")))?;

    let meta_path = metadata_path(path);
    let meta_json = serde_json::to_string_pretty(metadata)?;
    std::fs::write(&meta_path, meta_json).map_err(|source| ModelError::Io {
        path: meta_path,
        source,
    })?;

    Ok(())
}

/// Load a trained network from a file
///
/// # Returns
///
/// The rebuilt network and its metadata, or [`ModelError::Missing`] when no
/// weights were ever written at `path`.
pub fn load_network<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<(QNetwork<B>, ModelMetadata), ModelError> {
    let weights = weights_path(path);
    if !weights.exists() {
        return Err(ModelError::Missing {
            path: path.to_path_buf(),
        });
    }

    let meta_path = metadata_path(path);
    let meta_json = std::fs::read_to_string(&meta_path).map_err(|source| ModelError::Io {
        path: meta_path,
        source,
    })?;
    let metadata: ModelMetadata = serde_json::from_str(&meta_json)?;

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(weights, device)
        .map_err(|err| ModelError::Record(format!("{err:?}")))?;

    let network = metadata.network.init::<B>(device).load_record(record);

    Ok((network, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{InferenceBackend, TrainingBackend, default_device};
    use burn::module::AutodiffModule;
    use tempfile::TempDir;

    fn test_agent() -> DqnAgent<TrainingBackend> {
        let device = default_device();
        let network = QNetworkConfig::new().init::<TrainingBackend>(&device);
        DqnAgent::with_seed(network, DqnConfig::default(), device, 3)
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("best_model");
        let agent = test_agent();
        let metadata = ModelMetadata::from_agent(&agent, 12, 4, 35.5);

        save_model(&agent, &metadata, &path).unwrap();
        assert!(weights_path(&path).exists());
        assert!(metadata_path(&path).exists());

        let (network, loaded) =
            load_network::<InferenceBackend>(&path, &default_device()).unwrap();

        assert_eq!(
            network.flat_parameters(),
            agent.network().valid().flat_parameters()
        );
        assert_eq!(loaded.episodes_trained, 12);
        assert_eq!(loaded.score, 4);
        assert_eq!(loaded.network, QNetworkConfig::new());
    }

    #[test]
    fn test_missing_model_is_distinguishable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("never_trained");

        let err = load_network::<InferenceBackend>(&path, &default_device()).unwrap_err();

        assert!(err.is_missing());
        assert!(err.to_string().contains("run training first"));
    }

    #[test]
    fn test_missing_metadata_is_not_reported_as_missing_model() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("best_model");
        let agent = test_agent();
        save_model(&agent, &ModelMetadata::from_agent(&agent, 0, 0, 0.0), &path).unwrap();
        std::fs::remove_file(metadata_path(&path)).unwrap();

        let err = load_network::<InferenceBackend>(&path, &default_device()).unwrap_err();

        assert!(matches!(err, ModelError::Io { .. }));
    }

    #[test]
    fn test_corrupt_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("best_model");
        let agent = test_agent();
        save_model(&agent, &ModelMetadata::from_agent(&agent, 0, 0, 0.0), &path).unwrap();
        std::fs::write(metadata_path(&path), "not json").unwrap();

        let err = load_network::<InferenceBackend>(&path, &default_device()).unwrap_err();

        assert!(matches!(err, ModelError::Metadata(_)));
    }

    #[test]
    fn test_metadata_serialization() {
        let agent = test_agent();
        let metadata = ModelMetadata::from_agent(&agent, 100, 7, -3.25);

        let json = serde_json::to_string(&metadata).unwrap();
        let deserialized: ModelMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.episodes_trained, 100);
        assert_eq!(deserialized.score, 7);
        assert_eq!(deserialized.total_reward, -3.25);
        assert_eq!(deserialized.epsilon, 1.0);
    }
}
