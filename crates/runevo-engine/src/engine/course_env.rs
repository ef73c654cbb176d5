use serde::{Deserialize, Serialize};

use crate::{
    Action, CourseLayout, CourseSeed, EnvironmentError, ObstacleKind,
    engine::{
        environment::{Environment, Progress, StepOutcome},
        runner::Runner,
    },
};

/// Clock time at the start of an episode and after each lost life.
pub const START_TIME: u32 = 300;
/// Number of ticks per clock unit.
pub const TICKS_PER_TIME_UNIT: u32 = 24;
pub const START_LIVES: u32 = 3;
/// The game ends when the runner is down to this many lives.
pub const GAME_OVER_LIVES: u32 = 1;

const WALL_CLEAR_SCORE: u32 = 100;
const PIT_CLEAR_SCORE: u32 = 50;
const GOAL_TIME_BONUS: u32 = 10;

/// Walls at least this tall count as large obstacles.
pub const LARGE_WALL_HEIGHT: u32 = 10;
/// How far ahead of the runner large obstacles are detected.
pub const OBSTACLE_LOOKAHEAD: u32 = 48;

/// Snapshot of a course episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseState {
    pub runner: Runner,
    pub score: u32,
    /// Furthest horizontal position reached.
    pub level_progress: u32,
    pub time_left: u32,
    pub lives_left: u32,
    pub finished: bool,
}

/// A side-scrolling course played by holding button inputs.
///
/// The runner starts at the left end and must reach the goal at the right end
/// of the [`CourseLayout`], jumping over pits and walls. Falling into a pit or
/// running out of time costs a life and restarts from the last cleared
/// obstacle.
///
/// # Fitness
///
/// The game fitness is `score + 2 × level_progress + time_left`. Each
/// [`step`](Environment::step) reports how much it changed since the previous
/// step, so the sum of deltas over an episode equals the final game fitness
/// minus the initial one.
///
/// # Example
///
/// ```
/// use runevo_engine::{Action, CourseEnvironment, CourseSeed, Environment};
///
/// let mut env = CourseEnvironment::new(CourseSeed::from_bytes([1; 16]));
/// let start = env.reset().unwrap();
/// let outcome = env.step(Action::MoveRight, 5).unwrap();
/// assert_eq!(outcome.state.runner.x(), start.runner.x() + 5);
/// assert!(outcome.fitness_delta > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct CourseEnvironment {
    layout: CourseLayout,
    state: CourseState,
    checkpoint: u32,
    cleared_obstacles: usize,
    clock_ticks: u32,
    last_fitness: f32,
}

impl CourseEnvironment {
    /// Creates an environment on the course generated from `seed`.
    #[must_use]
    pub fn new(seed: CourseSeed) -> Self {
        Self::with_layout(CourseLayout::generate(seed))
    }

    #[must_use]
    pub fn with_layout(layout: CourseLayout) -> Self {
        let mut this = Self {
            layout,
            state: Self::initial_state(),
            checkpoint: 0,
            cleared_obstacles: 0,
            clock_ticks: 0,
            last_fitness: 0.0,
        };
        this.restart();
        this
    }

    #[must_use]
    pub fn layout(&self) -> &CourseLayout {
        &self.layout
    }

    #[must_use]
    pub fn state(&self) -> &CourseState {
        &self.state
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn game_fitness(&self) -> f32 {
        let CourseState {
            score,
            level_progress,
            time_left,
            ..
        } = self.state;
        score as f32 + 2.0 * level_progress as f32 + time_left as f32
    }

    const fn initial_state() -> CourseState {
        CourseState {
            runner: Runner::new(0),
            score: 0,
            level_progress: 0,
            time_left: START_TIME,
            lives_left: START_LIVES,
            finished: false,
        }
    }

    fn restart(&mut self) {
        self.state = Self::initial_state();
        self.checkpoint = 0;
        self.cleared_obstacles = 0;
        self.clock_ticks = 0;
        self.last_fitness = self.game_fitness();
    }

    fn tick(&mut self, input: Action) {
        if self.state.runner.tick(&self.layout, input).is_fell() {
            tracing::debug!(x = self.state.runner.x(), "runner fell into a pit");
            self.lose_life();
            return;
        }

        let x = self.state.runner.x();
        self.state.level_progress = self.state.level_progress.max(x);
        self.clear_passed_obstacles(x);

        if x >= self.layout.length() {
            self.state.finished = true;
            self.state.score += self.state.time_left * GOAL_TIME_BONUS;
            tracing::debug!(score = self.state.score, "runner reached the goal");
            return;
        }

        self.clock_ticks += 1;
        if self.clock_ticks % TICKS_PER_TIME_UNIT == 0 {
            self.state.time_left = self.state.time_left.saturating_sub(1);
            if self.state.time_left == 0 {
                tracing::debug!(x, "runner ran out of time");
                self.lose_life();
            }
        }
    }

    fn clear_passed_obstacles(&mut self, x: u32) {
        let obstacles = self.layout.obstacles();
        while let Some(obstacle) = obstacles.get(self.cleared_obstacles)
            && obstacle.end() <= x
        {
            self.state.score += match obstacle.kind {
                ObstacleKind::Pit => PIT_CLEAR_SCORE,
                ObstacleKind::Wall { .. } => WALL_CLEAR_SCORE,
            };
            self.checkpoint = obstacle.end();
            self.cleared_obstacles += 1;
        }
    }

    fn lose_life(&mut self) {
        self.state.lives_left = self.state.lives_left.saturating_sub(1);
        self.state.runner = Runner::new(self.checkpoint);
        self.state.time_left = START_TIME;
        self.clock_ticks = 0;
    }
}

impl Environment for CourseEnvironment {
    type State = CourseState;

    fn reset(&mut self) -> Result<Self::State, EnvironmentError> {
        self.restart();
        Ok(self.state)
    }

    fn step(
        &mut self,
        action: Action,
        duration: u32,
    ) -> Result<StepOutcome<Self::State>, EnvironmentError> {
        if self.is_game_over() {
            return Ok(StepOutcome {
                state: self.state,
                fitness_delta: 0.0,
                time_left: 0,
                progress: Progress::GameOver,
            });
        }

        for _ in 0..duration {
            self.tick(action);
            if self.is_game_over() {
                break;
            }
        }
        // release the button
        if !self.is_game_over() {
            self.tick(Action::Pass);
        }

        let fitness = self.game_fitness();
        let fitness_delta = fitness - self.last_fitness;
        self.last_fitness = fitness;

        let progress = if self.is_game_over() {
            Progress::GameOver
        } else {
            Progress::InProgress(self.state.level_progress)
        };
        Ok(StepOutcome {
            state: self.state,
            fitness_delta,
            time_left: self.state.time_left,
            progress,
        })
    }

    fn is_game_over(&self) -> bool {
        self.state.finished || self.state.lives_left <= GAME_OVER_LIVES
    }

    fn detect_large_obstacle(&self) -> bool {
        self.layout
            .obstacles_ahead(self.state.runner.x(), OBSTACLE_LOOKAHEAD)
            .any(|o| matches!(o.kind, ObstacleKind::Wall { height } if height >= LARGE_WALL_HEIGHT))
    }
}

#[cfg(test)]
mod tests {
    use crate::{JUMP_BUDGET, Obstacle};

    use super::*;

    fn env_with(obstacles: Vec<Obstacle>, length: u32) -> CourseEnvironment {
        CourseEnvironment::with_layout(CourseLayout::new(length, obstacles))
    }

    fn pit(start: u32, width: u32) -> Obstacle {
        Obstacle {
            kind: ObstacleKind::Pit,
            start,
            width,
        }
    }

    #[test]
    fn test_walking_reports_progress_delta() {
        let mut env = env_with(vec![], 1000);
        env.reset().unwrap();
        let outcome = env.step(Action::MoveRight, 9).unwrap();
        // 9 held ticks + 1 release tick, 2 fitness points per pixel
        assert_eq!(outcome.state.level_progress, 9);
        assert!((outcome.fitness_delta - 18.0).abs() < f32::EPSILON);
        assert_eq!(outcome.progress, Progress::InProgress(9));
        assert_eq!(outcome.time_left, START_TIME);
    }

    #[test]
    fn test_pass_only_advances_time() {
        let mut env = env_with(vec![], 1000);
        env.reset().unwrap();
        let outcome = env.step(Action::Pass, TICKS_PER_TIME_UNIT - 1).unwrap();
        assert_eq!(outcome.state.runner.x(), 0);
        assert_eq!(outcome.time_left, START_TIME - 1);
        assert!((outcome.fitness_delta + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_falling_twice_ends_the_game() {
        let mut env = env_with(vec![pit(10, 4)], 1000);
        env.reset().unwrap();

        // falls at x=10, respawns at the start and walks on
        let outcome = env.step(Action::MoveRight, 15).unwrap();
        assert_eq!(outcome.state.lives_left, START_LIVES - 1);
        assert_eq!(outcome.state.runner.x(), 5);
        assert!(!env.is_game_over());

        let outcome = env.step(Action::MoveRight, 20).unwrap();
        assert_eq!(outcome.progress, Progress::GameOver);
        assert!(env.is_game_over());

        let outcome = env.step(Action::MoveRight, 20).unwrap();
        assert_eq!(outcome.progress, Progress::GameOver);
        assert!(outcome.fitness_delta.abs() < f32::EPSILON);
        assert_eq!(outcome.time_left, 0);
    }

    #[test]
    fn test_start_on_wall_does_not_sink() {
        let wall = Obstacle {
            kind: ObstacleKind::Wall { height: 5 },
            start: 0,
            width: 8,
        };
        let mut env = env_with(vec![wall], 100);
        env.reset().unwrap();
        let outcome = env.step(Action::Pass, 1).unwrap();
        assert_eq!(outcome.state.runner.altitude(), 5);
        assert_eq!(outcome.state.lives_left, START_LIVES);
    }

    #[test]
    fn test_respawn_next_to_wall_after_pit() {
        let wall = Obstacle {
            kind: ObstacleKind::Wall { height: 5 },
            start: 14,
            width: 6,
        };
        let mut env = env_with(vec![pit(10, 4), wall], 1000);
        env.reset().unwrap();
        env.step(Action::MoveRight, 7).unwrap();
        env.step(Action::ActivateA, JUMP_BUDGET).unwrap();
        let outcome = env.step(Action::MoveRight, 7).unwrap();
        assert_eq!(outcome.state.runner.x(), 14);
        assert_eq!(env.checkpoint, 14);

        env.lose_life();
        let outcome = env.step(Action::Pass, 1).unwrap();
        assert_eq!(outcome.state.runner.x(), 14);
        assert_eq!(outcome.state.runner.altitude(), 5);
    }

    #[test]
    fn test_clearing_pit_scores_and_moves_checkpoint() {
        let mut env = env_with(vec![pit(10, 4)], 1000);
        env.reset().unwrap();
        env.step(Action::MoveRight, 7).unwrap();
        env.step(Action::ActivateA, 8).unwrap();
        let outcome = env.step(Action::MoveRight, 10).unwrap();
        assert_eq!(outcome.state.score, PIT_CLEAR_SCORE);
        assert_eq!(outcome.state.lives_left, START_LIVES);
        assert_eq!(env.checkpoint, 14);
    }

    #[test]
    fn test_reaching_goal_finishes() {
        let mut env = env_with(vec![], 20);
        env.reset().unwrap();
        let outcome = env.step(Action::MoveRight, 30).unwrap();
        assert!(outcome.state.finished);
        assert_eq!(outcome.progress, Progress::GameOver);
        assert_eq!(outcome.state.score, START_TIME * GOAL_TIME_BONUS);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut env = env_with(vec![pit(10, 4)], 1000);
        env.reset().unwrap();
        env.step(Action::MoveRight, 20).unwrap();
        let state = env.reset().unwrap();
        assert_eq!(state, CourseEnvironment::initial_state());
        assert!(!env.is_game_over());
    }

    #[test]
    fn test_detect_large_obstacle() {
        let wall = |start, height| Obstacle {
            kind: ObstacleKind::Wall { height },
            start,
            width: 8,
        };
        let mut env = env_with(vec![wall(30, 4), wall(100, LARGE_WALL_HEIGHT)], 1000);
        env.reset().unwrap();
        assert!(!env.detect_large_obstacle());

        // blocked by the first wall
        env.step(Action::MoveRight, 40).unwrap();
        assert_eq!(env.state().runner.x(), 29);

        env.step(Action::ActivateA, 6).unwrap();
        env.step(Action::MoveRight, 30).unwrap();
        assert_eq!(env.state().runner.x(), 59);
        assert!(env.detect_large_obstacle());
    }
}
