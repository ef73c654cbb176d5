use crate::{Action, EnvironmentError};

/// Level progress reported by a step, or the end of the episode.
///
/// The terminal marker is its own variant so that it can never be mistaken
/// for a progress value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Progress {
    InProgress(u32),
    GameOver,
}

/// Feedback from holding one action.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome<S> {
    /// Snapshot of the world after the step.
    pub state: S,
    /// Fitness gained (or lost) during the step.
    pub fitness_delta: f32,
    /// Remaining clock time after the step.
    pub time_left: u32,
    pub progress: Progress,
}

/// A game the training system can play.
///
/// One environment runs one episode at a time. Callers that evaluate in
/// parallel must use one instance per concurrent episode.
pub trait Environment {
    /// Opaque snapshot of world state.
    type State;

    /// Restarts the episode and returns the initial state.
    fn reset(&mut self) -> Result<Self::State, EnvironmentError>;

    /// Holds `action` for `duration` ticks, then releases it.
    ///
    /// [`Action::Pass`] holds nothing and only lets time pass. Once the game is
    /// over, the outcome reports [`Progress::GameOver`].
    fn step(
        &mut self,
        action: Action,
        duration: u32,
    ) -> Result<StepOutcome<Self::State>, EnvironmentError>;

    /// Returns whether the episode has ended, without advancing it.
    fn is_game_over(&self) -> bool;

    /// Returns whether a large obstacle is close ahead of the agent.
    ///
    /// Environments without this capability keep the default, which never
    /// reports an obstacle.
    fn detect_large_obstacle(&self) -> bool {
        false
    }
}

impl<E> Environment for &mut E
where
    E: Environment + ?Sized,
{
    type State = E::State;

    fn reset(&mut self) -> Result<Self::State, EnvironmentError> {
        (**self).reset()
    }

    fn step(
        &mut self,
        action: Action,
        duration: u32,
    ) -> Result<StepOutcome<Self::State>, EnvironmentError> {
        (**self).step(action, duration)
    }

    fn is_game_over(&self) -> bool {
        (**self).is_game_over()
    }

    fn detect_large_obstacle(&self) -> bool {
        (**self).detect_large_obstacle()
    }
}
