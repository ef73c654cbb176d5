//! Episode evaluation: turning one play-through into a fitness score.
//!
//! An individual is evaluated by resetting the environment and holding each of
//! its genes in order. The episode stops when the genes run out or as soon as
//! a step reports [`Progress::GameOver`](runevo_engine::Progress::GameOver).
//!
//! # Fitness Formula
//!
//! ```text
//! raw = Σ fitness_delta + survival_bonus + 5 × right_moves
//!
//! where:
//!   survival_bonus = 500 if the clock was ever above zero, else 0
//!   right_moves    = number of executed steps holding MoveRight
//!
//! fitness = raw / 10000
//! ```
//!
//! Normalization only rescales fitness for readable logs. It does not change
//! the ranking of individuals, and every stored fitness is normalized.

use runevo_engine::{Environment, EnvironmentError};

use crate::individual::Individual;

pub const SURVIVAL_BONUS: f32 = 500.0;
pub const RIGHT_MOVE_BONUS: f32 = 5.0;
pub const FITNESS_SCALE: f32 = 10_000.0;

/// What happened during one episode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpisodeSummary {
    /// Sum of fitness deltas reported by the environment.
    pub total_fitness: f32,
    /// Largest remaining clock time observed.
    pub max_time: u32,
    pub right_moves: usize,
    /// Number of genes actually played.
    pub steps: usize,
    /// Whether the environment reported game over.
    pub game_over: bool,
}

impl EpisodeSummary {
    /// Environment fitness plus the survival and forward-motion bonuses.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn raw_fitness(&self) -> f32 {
        let survival_bonus = if self.max_time > 0 {
            SURVIVAL_BONUS
        } else {
            0.0
        };
        self.total_fitness + survival_bonus + self.right_moves as f32 * RIGHT_MOVE_BONUS
    }

    #[must_use]
    pub fn normalized_fitness(&self) -> f32 {
        self.raw_fitness() / FITNESS_SCALE
    }
}

/// Plays one full episode of `individual` on a freshly reset `environment`.
#[tracing::instrument(level = "trace", skip_all, fields(genes = individual.len()))]
pub fn play_episode<E>(
    individual: &Individual,
    environment: &mut E,
) -> Result<EpisodeSummary, EnvironmentError>
where
    E: Environment + ?Sized,
{
    environment.reset()?;

    let mut summary = EpisodeSummary::default();
    for gene in individual.actions() {
        let outcome = environment.step(gene.action, gene.duration)?;
        summary.steps += 1;
        summary.total_fitness += outcome.fitness_delta;
        summary.max_time = summary.max_time.max(outcome.time_left);
        if gene.action.is_move_right() {
            summary.right_moves += 1;
        }
        if outcome.progress.is_game_over() {
            summary.game_over = true;
            break;
        }
    }
    Ok(summary)
}

/// Evaluates `individual`, stores its normalized fitness and returns it.
pub fn evaluate_fitness<E>(
    individual: &mut Individual,
    environment: &mut E,
) -> Result<f32, EnvironmentError>
where
    E: Environment + ?Sized,
{
    let summary = play_episode(individual, environment)?;
    let fitness = summary.normalized_fitness();
    individual.set_fitness(fitness);
    tracing::debug!(
        fitness,
        steps = summary.steps,
        game_over = summary.game_over,
        "evaluated individual"
    );
    Ok(fitness)
}
