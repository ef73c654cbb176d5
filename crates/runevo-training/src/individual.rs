//! Action-sequence individuals and the distributions that create their genes.
//!
//! An [`Individual`] is an ordered list of [`Gene`]s, each holding one
//! [`Action`] for a number of ticks. Two distinct gene distributions exist on
//! purpose:
//!
//! - [`GenerationDistribution`] builds initial individuals. It favors
//!   `MoveRight` (weights left:right:A = 1:2:1) and sometimes stretches jumps.
//! - [`MutationDistribution`] replaces genes during mutation. It draws actions
//!   uniformly and never stretches jumps.

use std::{fmt, ops::RangeInclusive};

use rand::{
    Rng,
    distr::{Distribution, weighted::WeightedIndex},
};
use runevo_engine::{Action, Environment};
use serde::{Deserialize, Serialize};

/// Number of genes in a freshly generated individual.
pub const DEFAULT_ACTION_COUNT: usize = 5000;

/// Range of hold durations, in ticks, for ordinary genes.
pub const DURATION_RANGE: RangeInclusive<u32> = 1..=10;

/// Range of hold durations, in ticks, for stretched jumps.
pub const LONG_JUMP_RANGE: RangeInclusive<u32> = 5..=15;

const GENERATION_WEIGHTS: [u32; Action::LEN] = [1, 2, 1];
const LONG_JUMP_PROBABILITY: f64 = 0.2;
const LONG_JUMP_PROBABILITY_NEAR_OBSTACLE: f64 = 0.5;

/// One action held for `duration` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gene {
    pub action: Action,
    pub duration: u32,
}

impl Gene {
    #[must_use]
    pub const fn new(action: Action, duration: u32) -> Self {
        Self { action, duration }
    }

    /// Builds a gene from a raw action index; unknown indices become [`Action::Pass`].
    #[must_use]
    pub const fn from_index(index: usize, duration: u32) -> Self {
        Self::new(Action::from_index(index), duration)
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {} ticks", self.action, self.duration)
    }
}

/// Gene distribution for initial population generation.
///
/// Actions follow the weights left:right:A = 1:2:1 and durations are uniform
/// in [`DURATION_RANGE`]. A jump is re-rolled into [`LONG_JUMP_RANGE`] with
/// probability 0.2, or 0.5 when a large obstacle was detected ahead.
#[derive(Debug, Clone)]
pub struct GenerationDistribution {
    actions: WeightedIndex<u32>,
    long_jump_probability: f64,
}

impl GenerationDistribution {
    #[must_use]
    pub fn new(large_obstacle: bool) -> Self {
        let actions = WeightedIndex::new(GENERATION_WEIGHTS).expect("weights are positive");
        let long_jump_probability = if large_obstacle {
            LONG_JUMP_PROBABILITY_NEAR_OBSTACLE
        } else {
            LONG_JUMP_PROBABILITY
        };
        Self {
            actions,
            long_jump_probability,
        }
    }
}

impl Distribution<Gene> for GenerationDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Gene {
        let action = Action::from_index(self.actions.sample(rng));
        let mut duration = rng.random_range(DURATION_RANGE);
        if action.is_activate_a() && rng.random_bool(self.long_jump_probability) {
            duration = rng.random_range(LONG_JUMP_RANGE);
        }
        Gene::new(action, duration)
    }
}

/// Gene distribution for mutation: uniform action, uniform duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationDistribution;

impl Distribution<Gene> for MutationDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Gene {
        Gene::from_index(
            rng.random_range(0..Action::LEN),
            rng.random_range(DURATION_RANGE),
        )
    }
}

/// Generates `length` genes from the [`GenerationDistribution`].
///
/// Depends only on `rng`, so a seeded generator reproduces the same sequence.
pub fn generate_actions<R>(length: usize, large_obstacle: bool, rng: &mut R) -> Vec<Gene>
where
    R: Rng + ?Sized,
{
    let distribution = GenerationDistribution::new(large_obstacle);
    (0..length).map(|_| distribution.sample(rng)).collect()
}

/// Asks the environment whether a large obstacle is ahead.
///
/// Environments that do not implement the capability report `false`.
pub fn detect_large_obstacle<E>(environment: &E) -> bool
where
    E: Environment + ?Sized,
{
    environment.detect_large_obstacle()
}

/// A candidate solution: an action sequence and its last evaluated fitness.
///
/// The sequence length never changes after creation. Fitness starts at zero
/// and is overwritten every time the individual is evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    actions: Vec<Gene>,
    fitness: f32,
}

impl Individual {
    /// Creates an individual with `length` randomly generated genes.
    pub fn random<R>(rng: &mut R, length: usize, large_obstacle: bool) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::from_actions(generate_actions(length, large_obstacle, rng))
    }

    #[must_use]
    pub fn from_actions(actions: Vec<Gene>) -> Self {
        Self {
            actions,
            fitness: 0.0,
        }
    }

    #[must_use]
    pub fn actions(&self) -> &[Gene] {
        &self.actions
    }

    /// Mutable access to the genes; the slice keeps the length fixed.
    pub fn actions_mut(&mut self) -> &mut [Gene] {
        &mut self.actions
    }

    #[must_use]
    pub fn into_actions(self) -> Vec<Gene> {
        self.actions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the normalized fitness of the last evaluation.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Returns a human-readable listing of the genes, one per line.
    #[must_use]
    pub fn action_trace(&self) -> ActionTrace<'_> {
        ActionTrace(&self.actions)
    }
}

/// Display adapter printing genes as `right for 3 ticks`, one per line.
#[derive(Debug, Clone, Copy)]
pub struct ActionTrace<'a>(&'a [Gene]);

impl fmt::Display for ActionTrace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, gene) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{gene}")?;
        }
        Ok(())
    }
}
