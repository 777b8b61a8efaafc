/// Action that can be taken in the game
///
/// Index 0 is "do nothing" and index 1 is "flap", matching the output layout
/// of the Q-network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    #[default]
    Idle,
    Flap,
}

impl Action {
    /// Number of discrete actions
    pub const COUNT: usize = 2;

    /// Convert a discrete action index to an action
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not 0 or 1.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Action::Idle,
            1 => Action::Flap,
            other => panic!("action index must be 0 or 1, got {other}"),
        }
    }

    /// Discrete index of this action
    pub fn index(self) -> usize {
        match self {
            Action::Idle => 0,
            Action::Flap => 1,
        }
    }
}
