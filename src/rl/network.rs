//! Q-network approximating action values for the bird
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, 4]
//!   ↓ Linear(4 → 128) + ReLU
//!   ↓ Linear(128 → 128) + ReLU
//!   ↓ Linear(128 → 2) → Q(s, ·) for [do nothing, flap]
//! ```
//!
//! # Example
//!
//! ```rust
//! use chubby_bird::rl::QNetworkConfig;
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! let device = NdArrayDevice::default();
//! let network = QNetworkConfig::new().init::<Backend>(&device);
//!
//! let observation = Tensor::zeros([8, 4], &device);
//! let q_values = network.forward(observation);
//!
//! assert_eq!(q_values.dims(), [8, 2]);
//! ```

use burn::{
    module::{Module, Param},
    nn::{Linear, LinearConfig},
    tensor::{Tensor, activation::relu, backend::Backend},
};
use serde::{Deserialize, Serialize};

use super::observation::OBSERVATION_DIM;
use crate::game::Action;

/// Configuration for the Q-network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QNetworkConfig {
    /// Number of input features (default: 4)
    pub input_dim: usize,

    /// Width of both hidden layers (default: 128)
    pub hidden_dim: usize,

    /// Number of actions valued by the network (default: 2)
    pub num_actions: usize,
}

impl QNetworkConfig {
    /// Create a new configuration with the default layer sizes
    pub fn new() -> Self {
        Self {
            input_dim: OBSERVATION_DIM,
            hidden_dim: 128,
            num_actions: Action::COUNT,
        }
    }

    /// Initialize a Q-network from this configuration
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            fc1: LinearConfig::new(self.input_dim, self.hidden_dim).init(device),
            fc2: LinearConfig::new(self.hidden_dim, self.hidden_dim).init(device),
            head: LinearConfig::new(self.hidden_dim, self.num_actions).init(device),
        }
    }
}

impl Default for QNetworkConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Fully connected action-value network
///
/// Generic over the Backend so the same definition serves training
/// (`Autodiff<NdArray>`) and inference (`NdArray`).
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    /// Outputs one value per action
    head: Linear<B>,
}

impl<B: Backend> QNetwork<B> {
    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `observation` - Tensor with shape `[batch, 4]`
    ///
    /// # Returns
    ///
    /// Q-values with shape `[batch, num_actions]`
    pub fn forward(&self, observation: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.fc1.forward(observation));
        let x = relu(self.fc2.forward(x));
        self.head.forward(x)
    }

    /// Every weight and bias, flattened in layer order
    ///
    /// Used to compare two networks exactly, e.g. online against target.
    pub fn flat_parameters(&self) -> Vec<f32> {
        let mut params = Vec::new();
        for layer in [&self.fc1, &self.fc2, &self.head] {
            params.extend(param_values(&layer.weight));
            if let Some(bias) = &layer.bias {
                params.extend(param_values(bias));
            }
        }
        params
    }
}

fn param_values<B: Backend, const D: usize>(param: &Param<Tensor<B, D>>) -> Vec<f32> {
    param
        .val()
        .into_data()
        .convert::<f32>()
        .to_vec()
        .expect("parameter tensors hold f32 data")
}

/// Index of the largest value in each row
pub fn argmax_rows<B: Backend>(q_values: Tensor<B, 2>) -> Vec<usize> {
    let [_, num_actions] = q_values.dims();
    let values: Vec<f32> = q_values
        .into_data()
        .convert::<f32>()
        .to_vec()
        .expect("q-values hold f32 data");

    values
        .chunks(num_actions)
        .map(|row| {
            row.iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(idx, _)| idx)
                .unwrap_or(0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::Autodiff;
    use burn::backend::ndarray::{NdArray, NdArrayDevice};
    use burn::module::AutodiffModule;
    use burn::tensor::Distribution;

    type TestBackend = NdArray<f32>;
    type TestAutodiffBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_forward_pass_shapes() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::new().init::<TestBackend>(&device);

        for batch_size in [1, 4, 64] {
            let q_values = network.forward(Tensor::zeros([batch_size, 4], &device));
            assert_eq!(q_values.dims(), [batch_size, 2]);
        }
    }

    #[test]
    fn test_parameter_count() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::new().init::<TestBackend>(&device);

        // (4*128 + 128) + (128*128 + 128) + (128*2 + 2)
        assert_eq!(network.flat_parameters().len(), 17_410);
        assert_eq!(network.num_params(), 17_410);
    }

    #[test]
    fn test_valid_copy_has_identical_parameters() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::new().init::<TestAutodiffBackend>(&device);

        let copy = network.valid();

        assert_eq!(network.flat_parameters(), copy.flat_parameters());
    }

    #[test]
    fn test_gradient_flow() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::new().init::<TestAutodiffBackend>(&device);

        let observation = Tensor::ones([2, 4], &device).require_grad();
        let loss = network.forward(observation.clone()).sum();
        let gradients = loss.backward();

        assert!(
            observation.grad(&gradients).is_some(),
            "Gradients should flow back to input observation"
        );
    }

    #[test]
    fn test_output_finite() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::new().init::<TestBackend>(&device);

        let observation = Tensor::random([16, 4], Distribution::Uniform(-1.0, 1.0), &device);
        let values: Vec<f32> = network.forward(observation).into_data().to_vec().unwrap();

        for val in values {
            assert!(val.is_finite(), "Q-values should be finite, got: {}", val);
        }
    }

    #[test]
    fn test_argmax_rows() {
        let device = NdArrayDevice::default();
        let q_values =
            Tensor::<TestBackend, 2>::from_floats([[0.1, 0.6], [0.9, -0.2]], &device);

        assert_eq!(argmax_rows(q_values), vec![1, 0]);
    }
}
