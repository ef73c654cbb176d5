//! Genetic operators: tournament selection, single-point crossover and mutation.
//!
//! # Tournament Selection
//!
//! Each slot of the selected pool is filled by a tournament: `k` contestants
//! are drawn uniformly with replacement and the fittest one wins. Ties go to
//! the contestant drawn first. When `k` is at least the population size, the
//! tournament is the whole population (in population order), so a unique best
//! individual always wins.
//!
//! # Single-Point Crossover
//!
//! Two parents are cut at the same index and their tails swapped. The cut is
//! drawn from `[1, len(parent1) - 1]` and applied to each parent clamped to its
//! own length, so parents of different lengths produce children whose lengths
//! differ from both parents while the total gene count is preserved.
//!
//! # Mutation
//!
//! Each gene is independently replaced, with probability `mutation_rate`, by a
//! fresh gene from [`MutationDistribution`]. Mutation works in place.

use rand::{Rng, distr::Distribution as _};

use crate::individual::{Gene, Individual, MutationDistribution};

pub const DEFAULT_TOURNAMENT_SIZE: usize = 3;
pub const DEFAULT_MUTATION_RATE: f64 = 0.1;

/// Selects one individual by tournament.
///
/// # Panics
///
/// Panics if `population` is empty or `tournament_size` is zero.
pub fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(!population.is_empty());
    assert!(tournament_size > 0);

    let mut best = None::<&Individual>;
    let mut enter = |contestant: &'a Individual| {
        if best.is_none_or(|b| contestant.fitness() > b.fitness()) {
            best = Some(contestant);
        }
    };
    if tournament_size >= population.len() {
        population.iter().for_each(&mut enter);
    } else {
        for _ in 0..tournament_size {
            enter(&population[rng.random_range(0..population.len())]);
        }
    }
    best.expect("tournament has at least one contestant")
}

/// Fills a pool of `selection_size` individuals by repeated tournaments.
///
/// Winners are cloned; the same individual can be selected more than once.
pub fn select<R>(
    population: &[Individual],
    selection_size: usize,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<Individual>
where
    R: Rng + ?Sized,
{
    (0..selection_size)
        .map(|_| tournament_select(population, tournament_size, rng).clone())
        .collect()
}

/// Crosses two parents at a random point.
///
/// Parents with fewer than two genes cannot be cut; their children are plain
/// copies.
pub fn crossover<R>(
    parent1: &Individual,
    parent2: &Individual,
    rng: &mut R,
) -> (Individual, Individual)
where
    R: Rng + ?Sized,
{
    if parent1.len() < 2 {
        return (
            Individual::from_actions(parent1.actions().to_vec()),
            Individual::from_actions(parent2.actions().to_vec()),
        );
    }
    let point = rng.random_range(1..parent1.len());
    crossover_at(parent1, parent2, point)
}

/// Crosses two parents at a fixed point.
///
/// `child1 = parent1[..point] ++ parent2[point..]` and
/// `child2 = parent2[..point] ++ parent1[point..]`, with `point` clamped to
/// each parent's length.
#[must_use]
pub fn crossover_at(
    parent1: &Individual,
    parent2: &Individual,
    point: usize,
) -> (Individual, Individual) {
    let (head1, tail1) = parent1.actions().split_at(point.min(parent1.len()));
    let (head2, tail2) = parent2.actions().split_at(point.min(parent2.len()));
    let join = |head: &[Gene], tail: &[Gene]| Individual::from_actions([head, tail].concat());
    (join(head1, tail2), join(head2, tail1))
}

/// Mutates `individual` in place.
///
/// # Panics
///
/// Panics if `mutation_rate` is outside `[0, 1]`.
pub fn mutate<R>(individual: &mut Individual, mutation_rate: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for gene in individual.actions_mut() {
        if rng.random_bool(mutation_rate) {
            *gene = MutationDistribution.sample(rng);
        }
    }
}
