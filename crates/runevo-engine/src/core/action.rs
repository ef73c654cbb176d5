use std::fmt;

use serde::{Deserialize, Serialize};

/// A button input the agent holds for a number of ticks.
///
/// The playable set is indexed `0..3` (`MoveLeft`, `MoveRight`, `ActivateA`).
/// Any other index maps to [`Action::Pass`], which presses nothing.
///
/// # Example
///
/// ```
/// use runevo_engine::Action;
///
/// assert_eq!(Action::from_index(1), Action::MoveRight);
/// assert_eq!(Action::from_index(7), Action::Pass);
/// assert_eq!(Action::ActivateA.to_string(), "A");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveLeft,
    MoveRight,
    ActivateA,
    Pass,
}

impl Action {
    /// Number of playable actions.
    pub const LEN: usize = 3;

    /// Playable actions in index order.
    pub const PLAYABLE: [Self; Self::LEN] = [Self::MoveLeft, Self::MoveRight, Self::ActivateA];

    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        match index {
            0 => Self::MoveLeft,
            1 => Self::MoveRight,
            2 => Self::ActivateA,
            _ => Self::Pass,
        }
    }

    /// Returns the index of a playable action, `None` for [`Action::Pass`].
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::MoveLeft => Some(0),
            Self::MoveRight => Some(1),
            Self::ActivateA => Some(2),
            Self::Pass => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MoveLeft => "left",
            Self::MoveRight => "right",
            Self::ActivateA => "A",
            Self::Pass => "pass",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
