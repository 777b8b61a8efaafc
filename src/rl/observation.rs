use burn::tensor::{Tensor, TensorData, backend::Backend};

use crate::game::{GameConfig, GameState};

/// Number of features in an observation
pub const OBSERVATION_DIM: usize = 4;

/// Feature vector fed to the Q-network
///
/// - 0: bird top / screen height
/// - 1: bird velocity / velocity scale
/// - 2: horizontal offset to the nearest food / screen width (1.0 if none)
/// - 3: vertical offset to the nearest food / screen height (0.0 if none)
pub type Observation = [f32; OBSERVATION_DIM];

/// Create an observation from game state
pub fn create_observation(state: &GameState, config: &GameConfig) -> Observation {
    let bird = &state.bird.rect;

    let (food_dx, food_dy) = match state.nearest_food() {
        Some(food) => (
            (food.rect.left - bird.left) / state.screen_width,
            (food.rect.top - bird.top) / state.screen_height,
        ),
        None => (1.0, 0.0),
    };

    [
        bird.top / state.screen_height,
        state.bird.velocity / config.velocity_scale,
        food_dx,
        food_dy,
    ]
}

/// Stack observations into a `[batch, 4]` tensor
pub fn observation_batch<B: Backend>(
    observations: &[Observation],
    device: &B::Device,
) -> Tensor<B, 2> {
    let data: Vec<f32> = observations.iter().flatten().copied().collect();
    let tensor_data = TensorData::new(data, [observations.len(), OBSERVATION_DIM]);

    Tensor::<B, 2>::from_data(tensor_data, device)
}
