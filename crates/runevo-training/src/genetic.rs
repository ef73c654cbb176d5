//! Genetic algorithm evolving action sequences.
//!
//! # Algorithm Overview
//!
//! Each generation runs the same cycle:
//!
//! 1. **Evaluate Fitness** - Every individual plays one episode on the environment
//! 2. **Track Best** - The best individual seen so far is updated on strict improvement
//! 3. **Tournament Selection** - `selection_size` survivors are chosen by tournament
//! 4. **Recombination** - Pairs of distinct survivors are crossed until the
//!    population is full again
//! 5. **Mutation** - Only the new descendants are mutated; survivors carry over as-is
//!
//! The final generation is evaluated but not evolved. The run returns the best
//! individual observed across all generations, not the best of the last one.
//!
//! # Key Components
//!
//! - [`GeneticAlgorithmParams`] - Run configuration with defaults and validation
//! - [`Population`] - Individuals evaluated together, serially or in parallel
//! - [`PopulationEvolver`] - Produces the next generation from an evaluated one
//! - [`EvolutionState`] - Best-so-far bookkeeping
//! - [`GeneticAlgorithm`] - Drives the generation loop
//!
//! # Parallelization
//!
//! [`Population::evaluate_fitness_parallel`] evaluates every individual on its
//! own thread with its own environment built by a factory. For deterministic
//! environments the result equals serial evaluation.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//! use runevo_engine::{CourseEnvironment, CourseSeed};
//! use runevo_training::{GeneticAlgorithm, GeneticAlgorithmParams};
//!
//! let params = GeneticAlgorithmParams {
//!     population_size: 6,
//!     generations: 2,
//!     action_count: 20,
//!     selection_size: 3,
//!     ..GeneticAlgorithmParams::default()
//! };
//! let algorithm = GeneticAlgorithm::new(params).unwrap();
//! let mut environment = CourseEnvironment::new(CourseSeed::from_bytes([7; 16]));
//! let mut rng = Pcg32::seed_from_u64(1);
//! let best = algorithm.run(&mut environment, &mut rng, |_| {}).unwrap();
//! assert_eq!(best.len(), 20);
//! ```

use std::{panic, thread};

use rand::{Rng, seq::index};
use runevo_engine::{Environment, EnvironmentError};
use serde::{Deserialize, Serialize};

use crate::{
    ConfigurationError, EvolutionError, evaluator,
    individual::{DEFAULT_ACTION_COUNT, Individual, detect_large_obstacle},
    operators::{self, DEFAULT_MUTATION_RATE, DEFAULT_TOURNAMENT_SIZE},
    stats::FitnessStats,
};

pub const DEFAULT_POPULATION_SIZE: usize = 100;
pub const DEFAULT_GENERATIONS: usize = 1000;
pub const DEFAULT_SELECTION_SIZE: usize = 50;

/// Parameters of one genetic algorithm run.
///
/// Missing fields take their default when deserialized, so a configuration
/// file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticAlgorithmParams {
    /// Number of individuals per generation
    pub population_size: usize,
    /// Number of generations to evaluate
    pub generations: usize,
    /// Number of genes per individual
    pub action_count: usize,
    /// Number of tournament winners surviving into the next generation
    pub selection_size: usize,
    /// Contestants per tournament (larger = stronger selection pressure)
    pub tournament_size: usize,
    /// Probability of replacing each gene of a descendant
    pub mutation_rate: f64,
}

impl Default for GeneticAlgorithmParams {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            generations: DEFAULT_GENERATIONS,
            action_count: DEFAULT_ACTION_COUNT,
            selection_size: DEFAULT_SELECTION_SIZE,
            tournament_size: DEFAULT_TOURNAMENT_SIZE,
            mutation_rate: DEFAULT_MUTATION_RATE,
        }
    }
}

impl GeneticAlgorithmParams {
    /// Checks that the parameters describe a runnable configuration.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.population_size < 2 {
            return Err(ConfigurationError::PopulationTooSmall {
                size: self.population_size,
            });
        }
        if self.selection_size < 2 {
            return Err(ConfigurationError::SelectionTooSmall {
                size: self.selection_size,
            });
        }
        if self.selection_size > self.population_size {
            return Err(ConfigurationError::SelectionExceedsPopulation {
                selection_size: self.selection_size,
                population_size: self.population_size,
            });
        }
        if self.tournament_size == 0 {
            return Err(ConfigurationError::ZeroTournamentSize);
        }
        if self.action_count == 0 {
            return Err(ConfigurationError::ZeroActionCount);
        }
        if self.generations == 0 {
            return Err(ConfigurationError::ZeroGenerations);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigurationError::InvalidMutationRate {
                rate: self.mutation_rate,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn evolver(&self) -> PopulationEvolver {
        PopulationEvolver {
            selection_size: self.selection_size,
            tournament_size: self.tournament_size,
            mutation_rate: self.mutation_rate,
        }
    }
}

/// A generation of individuals.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates `count` random individuals of `action_count` genes each.
    pub fn random<R>(count: usize, action_count: usize, large_obstacle: bool, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| Individual::random(rng, action_count, large_obstacle))
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn into_individuals(self) -> Vec<Individual> {
        self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Evaluates every individual in population order on one environment.
    ///
    /// Stops at the first environment error.
    pub fn evaluate_fitness<E>(&mut self, environment: &mut E) -> Result<(), EnvironmentError>
    where
        E: Environment + ?Sized,
    {
        for ind in &mut self.individuals {
            evaluator::evaluate_fitness(ind, environment)?;
        }
        Ok(())
    }

    /// Evaluates every individual on its own thread.
    ///
    /// `make_environment` is called once per individual, on the thread that
    /// evaluates it. The first error in population order is returned.
    pub fn evaluate_fitness_parallel<E, F>(
        &mut self,
        make_environment: F,
    ) -> Result<(), EnvironmentError>
    where
        E: Environment,
        F: Fn() -> E + Sync,
    {
        let make_environment = &make_environment;
        thread::scope(|s| {
            let handles = self
                .individuals
                .iter_mut()
                .map(|ind| {
                    s.spawn(move || {
                        let mut environment = make_environment();
                        evaluator::evaluate_fitness(ind, &mut environment)
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                .try_for_each(|result| result.map(|_| ()))
        })
    }

    /// Returns the fittest individual; ties go to the earliest one.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.iter().reduce(|best, ind| {
            if ind.fitness() > best.fitness() {
                ind
            } else {
                best
            }
        })
    }

    /// Computes statistics of the current fitness values.
    ///
    /// Returns `None` for an empty population.
    #[must_use]
    pub fn compute_fitness_stats(&self) -> Option<FitnessStats> {
        FitnessStats::new(self.individuals.iter().map(Individual::fitness))
    }
}

/// Controls how one generation turns into the next.
#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    /// Number of tournament winners surviving unmutated
    pub selection_size: usize,
    /// Contestants per tournament
    pub tournament_size: usize,
    /// Per-gene mutation probability for descendants
    pub mutation_rate: f64,
}

impl PopulationEvolver {
    /// Builds the next generation from an evaluated `population`.
    ///
    /// 1. Selects `selection_size` survivors by tournament
    /// 2. Crosses pairs of distinct survivors until the population size is
    ///    restored, dropping the second child when only one slot is left
    /// 3. Mutates the descendants
    ///
    /// The result has the same size as `population`, survivors first.
    pub fn evolve<R>(
        &self,
        population: &Population,
        rng: &mut R,
    ) -> Result<Population, ConfigurationError>
    where
        R: Rng + ?Sized,
    {
        let population_size = population.len();
        if self.selection_size > population_size {
            return Err(ConfigurationError::SelectionExceedsPopulation {
                selection_size: self.selection_size,
                population_size,
            });
        }
        if self.tournament_size == 0 {
            return Err(ConfigurationError::ZeroTournamentSize);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigurationError::InvalidMutationRate {
                rate: self.mutation_rate,
            });
        }

        let survivors = operators::select(
            &population.individuals,
            self.selection_size,
            self.tournament_size,
            rng,
        );
        let needed = population_size - survivors.len();
        if needed > 0 && survivors.len() < 2 {
            return Err(ConfigurationError::SelectionTooSmall {
                size: survivors.len(),
            });
        }

        let mut descendants = Vec::with_capacity(needed);
        while descendants.len() < needed {
            let parents = index::sample(rng, survivors.len(), 2);
            let (child1, child2) = operators::crossover(
                &survivors[parents.index(0)],
                &survivors[parents.index(1)],
                rng,
            );
            descendants.push(child1);
            if descendants.len() < needed {
                descendants.push(child2);
            }
        }
        for child in &mut descendants {
            operators::mutate(child, self.mutation_rate, rng);
        }

        let mut individuals = survivors;
        individuals.extend(descendants);
        Ok(Population { individuals })
    }
}

/// Best-so-far bookkeeping across generations.
#[derive(Debug, Clone, Default)]
pub struct EvolutionState {
    generation: usize,
    best: Option<Individual>,
}

impl EvolutionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of generations observed so far.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn best_individual(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    /// Fitness of the best individual, or negative infinity before any.
    #[must_use]
    pub fn best_fitness(&self) -> f32 {
        self.best.as_ref().map_or(f32::NEG_INFINITY, Individual::fitness)
    }

    #[must_use]
    pub fn into_best(self) -> Option<Individual> {
        self.best
    }

    /// Records an evaluated generation.
    ///
    /// The stored best is replaced by a copy of the population's best only
    /// when its fitness is strictly greater. Returns whether it was replaced.
    pub fn observe(&mut self, population: &Population) -> bool {
        self.generation += 1;
        match population.best() {
            Some(candidate) if candidate.fitness() > self.best_fitness() => {
                self.best = Some(candidate.clone());
                true
            }
            _ => false,
        }
    }
}

/// Summary of one evaluated generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationReport<'a> {
    /// Zero-based generation index
    pub generation: usize,
    pub stats: FitnessStats,
    /// Best fitness observed in any generation so far
    pub best_fitness: f32,
    /// Whether this generation produced a new best
    pub improved: bool,
    /// Best individual observed so far
    pub best: &'a Individual,
}

/// Runs the generation loop with validated parameters.
#[derive(Debug, Clone)]
pub struct GeneticAlgorithm {
    params: GeneticAlgorithmParams,
}

impl GeneticAlgorithm {
    pub fn new(params: GeneticAlgorithmParams) -> Result<Self, ConfigurationError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[must_use]
    pub fn params(&self) -> &GeneticAlgorithmParams {
        &self.params
    }

    /// Creates the initial population, asking `environment` about obstacles
    /// right after a reset.
    pub fn initial_population<E, R>(
        &self,
        environment: &mut E,
        rng: &mut R,
    ) -> Result<Population, EnvironmentError>
    where
        E: Environment + ?Sized,
        R: Rng + ?Sized,
    {
        environment.reset()?;
        let large_obstacle = detect_large_obstacle(environment);
        Ok(Population::random(
            self.params.population_size,
            self.params.action_count,
            large_obstacle,
            rng,
        ))
    }

    /// Evolves a random population on one environment, evaluated serially.
    pub fn run<E, R, O>(
        &self,
        environment: &mut E,
        rng: &mut R,
        observer: O,
    ) -> Result<Individual, EvolutionError>
    where
        E: Environment + ?Sized,
        R: Rng + ?Sized,
        O: FnMut(&GenerationReport<'_>),
    {
        let population = self.initial_population(environment, rng)?;
        self.run_with(
            population,
            |population| population.evaluate_fitness(&mut *environment),
            rng,
            observer,
        )
    }

    /// Evolves a random population, evaluating each individual on its own
    /// thread with an environment from `make_environment`.
    pub fn run_parallel<E, F, R, O>(
        &self,
        make_environment: F,
        rng: &mut R,
        observer: O,
    ) -> Result<Individual, EvolutionError>
    where
        E: Environment,
        F: Fn() -> E + Sync,
        R: Rng + ?Sized,
        O: FnMut(&GenerationReport<'_>),
    {
        let population = self.initial_population(&mut make_environment(), rng)?;
        self.run_with(
            population,
            |population| population.evaluate_fitness_parallel(&make_environment),
            rng,
            observer,
        )
    }

    /// Evolves `population` for the configured number of generations.
    ///
    /// `evaluate` assigns fitness to every individual of a generation and
    /// `observer` receives a report after each evaluation. The first
    /// environment error ends the run.
    pub fn run_with<V, R, O>(
        &self,
        mut population: Population,
        mut evaluate: V,
        rng: &mut R,
        mut observer: O,
    ) -> Result<Individual, EvolutionError>
    where
        V: FnMut(&mut Population) -> Result<(), EnvironmentError>,
        R: Rng + ?Sized,
        O: FnMut(&GenerationReport<'_>),
    {
        if population.len() < 2 {
            return Err(ConfigurationError::PopulationTooSmall {
                size: population.len(),
            }
            .into());
        }

        let evolver = self.params.evolver();
        let mut state = EvolutionState::new();
        for generation in 0..self.params.generations {
            evaluate(&mut population)?;
            let improved = state.observe(&population);

            let (Some(best), Some(stats)) =
                (state.best_individual(), population.compute_fitness_stats())
            else {
                return Err(ConfigurationError::PopulationTooSmall {
                    size: population.len(),
                }
                .into());
            };
            let report = GenerationReport {
                generation,
                stats,
                best_fitness: best.fitness(),
                improved,
                best,
            };
            tracing::info!(
                generation,
                min = stats.min,
                max = stats.max,
                mean = stats.mean,
                std_dev = stats.std_dev,
                best = report.best_fitness,
                improved,
                "generation evaluated"
            );
            observer(&report);

            if generation + 1 < self.params.generations {
                population = evolver.evolve(&population, rng)?;
            }
        }

        state
            .into_best()
            .ok_or(EvolutionError::Configuration(ConfigurationError::ZeroGenerations))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;
    use runevo_engine::{Action, CourseEnvironment, CourseSeed, Progress, StepOutcome};

    use crate::{evaluator::tests::StubEnvironment, individual::Gene};

    use super::*;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(2024)
    }

    fn small_params() -> GeneticAlgorithmParams {
        GeneticAlgorithmParams {
            population_size: 10,
            generations: 5,
            action_count: 30,
            selection_size: 5,
            ..GeneticAlgorithmParams::default()
        }
    }

    fn with_fitness(fitness: f32) -> Individual {
        let mut ind = Individual::from_actions(vec![Gene::new(Action::MoveRight, 1)]);
        ind.set_fitness(fitness);
        ind
    }

    /// Environment paying 1.0 for every step, recording each step's delta.
    struct RecordingEnvironment<'a> {
        episode_total: f32,
        totals: &'a RefCell<Vec<f32>>,
        in_episode: bool,
    }

    impl RecordingEnvironment<'_> {
        fn finish_episode(&mut self) {
            if self.in_episode {
                self.totals.borrow_mut().push(self.episode_total);
            }
        }
    }

    impl Environment for RecordingEnvironment<'_> {
        type State = ();

        fn reset(&mut self) -> Result<Self::State, EnvironmentError> {
            self.finish_episode();
            self.episode_total = 0.0;
            self.in_episode = true;
            Ok(())
        }

        fn step(
            &mut self,
            _action: Action,
            _duration: u32,
        ) -> Result<StepOutcome<Self::State>, EnvironmentError> {
            self.episode_total += 1.0;
            Ok(StepOutcome {
                state: (),
                fitness_delta: 1.0,
                time_left: 0,
                progress: Progress::InProgress(0),
            })
        }

        fn is_game_over(&self) -> bool {
            false
        }
    }

    /// Reports a large obstacle only after a reset, remembering how many
    /// resets preceded the query.
    struct ObstacleEnvironment {
        inner: StubEnvironment,
        resets_at_query: Cell<Option<usize>>,
    }

    impl Environment for ObstacleEnvironment {
        type State = usize;

        fn reset(&mut self) -> Result<Self::State, EnvironmentError> {
            self.inner.reset()
        }

        fn step(
            &mut self,
            action: Action,
            duration: u32,
        ) -> Result<StepOutcome<Self::State>, EnvironmentError> {
            self.inner.step(action, duration)
        }

        fn is_game_over(&self) -> bool {
            self.inner.is_game_over()
        }

        fn detect_large_obstacle(&self) -> bool {
            self.resets_at_query.set(Some(self.inner.resets));
            self.inner.resets > 0
        }
    }

    #[test]
    fn test_default_params() {
        let params = GeneticAlgorithmParams::default();
        assert_eq!(params.population_size, 100);
        assert_eq!(params.generations, 1000);
        assert_eq!(params.action_count, 5000);
        assert_eq!(params.selection_size, 50);
        assert_eq!(params.tournament_size, 3);
        assert!((params.mutation_rate - 0.1).abs() < f64::EPSILON);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_deserialize_with_defaults() {
        let params: GeneticAlgorithmParams =
            serde_json::from_str(r#"{ "population_size": 20, "mutation_rate": 0.2 }"#).unwrap();
        assert_eq!(params.population_size, 20);
        assert!((params.mutation_rate - 0.2).abs() < f64::EPSILON);
        assert_eq!(params.selection_size, DEFAULT_SELECTION_SIZE);
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let cases = [
            GeneticAlgorithmParams {
                population_size: 1,
                selection_size: 1,
                ..small_params()
            },
            GeneticAlgorithmParams {
                selection_size: 1,
                ..small_params()
            },
            GeneticAlgorithmParams {
                selection_size: 11,
                ..small_params()
            },
            GeneticAlgorithmParams {
                tournament_size: 0,
                ..small_params()
            },
            GeneticAlgorithmParams {
                action_count: 0,
                ..small_params()
            },
            GeneticAlgorithmParams {
                generations: 0,
                ..small_params()
            },
            GeneticAlgorithmParams {
                mutation_rate: 1.5,
                ..small_params()
            },
            GeneticAlgorithmParams {
                mutation_rate: -0.1,
                ..small_params()
            },
        ];
        for params in cases {
            assert!(GeneticAlgorithm::new(params.clone()).is_err(), "{params:?}");
        }
    }

    #[test]
    fn test_evolve_keeps_population_size() {
        let mut rng = rng();
        let params = small_params();
        let mut population = Population::random(10, 30, false, &mut rng);
        population
            .evaluate_fitness(&mut StubEnvironment::new(1.0))
            .unwrap();

        for selection_size in [2, 5, 9, 10] {
            let evolver = PopulationEvolver {
                selection_size,
                ..params.evolver()
            };
            let next = evolver.evolve(&population, &mut rng).unwrap();
            assert_eq!(next.len(), population.len());
            assert!(next.individuals().iter().all(|ind| ind.len() == 30));
        }
    }

    #[test]
    fn test_survivors_are_not_mutated() {
        let mut rng = rng();
        let population =
            Population::from_individuals([0.1, 0.2, 0.3, 0.4].map(with_fitness).to_vec());
        let evolver = PopulationEvolver {
            selection_size: 2,
            tournament_size: 4,
            mutation_rate: 1.0,
        };
        let next = evolver.evolve(&population, &mut rng).unwrap();
        // full tournaments always pick the best
        for survivor in &next.individuals()[..2] {
            assert_eq!(survivor, &population.individuals()[3]);
        }
    }

    #[test]
    fn test_hand_built_evolver_is_checked() {
        let mut rng = rng();
        let population =
            Population::from_individuals([0.1, 0.2, 0.3, 0.4].map(with_fitness).to_vec());
        let evolver = PopulationEvolver {
            selection_size: 2,
            tournament_size: 2,
            mutation_rate: 1.5,
        };
        assert!(matches!(
            evolver.evolve(&population, &mut rng),
            Err(ConfigurationError::InvalidMutationRate { .. })
        ));

        let evolver = PopulationEvolver {
            selection_size: 1,
            tournament_size: 2,
            mutation_rate: 0.1,
        };
        assert_eq!(
            evolver.evolve(&population, &mut rng),
            Err(ConfigurationError::SelectionTooSmall { size: 1 })
        );

        let evolver = PopulationEvolver {
            selection_size: 5,
            tournament_size: 2,
            mutation_rate: 0.1,
        };
        assert!(evolver.evolve(&population, &mut rng).is_err());
    }

    #[test]
    fn test_environment_without_capability_reports_no_obstacle() {
        assert!(!detect_large_obstacle(&StubEnvironment::new(0.0)));
    }

    #[test]
    fn test_initial_population_uses_obstacle_signal() {
        let params = GeneticAlgorithmParams {
            population_size: 20,
            action_count: 500,
            selection_size: 10,
            ..small_params()
        };
        let algorithm = GeneticAlgorithm::new(params).unwrap();
        let long_jumps = |population: &Population| {
            population
                .individuals()
                .iter()
                .flat_map(Individual::actions)
                .filter(|g| g.action.is_activate_a() && g.duration > 10)
                .count()
        };

        let mut plain = StubEnvironment::new(0.0);
        let without = algorithm.initial_population(&mut plain, &mut rng()).unwrap();
        assert_eq!(plain.resets, 1);

        let mut near_wall = ObstacleEnvironment {
            inner: StubEnvironment::new(0.0),
            resets_at_query: Cell::new(None),
        };
        let with = algorithm
            .initial_population(&mut near_wall, &mut rng())
            .unwrap();
        assert_eq!(near_wall.resets_at_query.get(), Some(1));

        assert_eq!(without.len(), 20);
        assert!(long_jumps(&with) > long_jumps(&without));
    }

    #[test]
    fn test_best_tracking_is_idempotent() {
        let population =
            Population::from_individuals([0.1, 0.7, 0.7, 0.2].map(with_fitness).to_vec());
        let mut state = EvolutionState::new();
        assert!(state.observe(&population));
        let best = state.best_individual().unwrap().clone();
        assert!(!state.observe(&population));
        assert_eq!(state.best_individual(), Some(&best));
        assert!((state.best_fitness() - 0.7).abs() < f32::EPSILON);
        assert_eq!(state.generation(), 2);

        let worse = Population::from_individuals([0.0, 0.1].map(with_fitness).to_vec());
        assert!(!state.observe(&worse));
        assert!((state.best_fitness() - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_end_to_end_with_scripted_individuals() {
        let individuals = [
            [(0, 1), (1, 2), (2, 3)],
            [(1, 1), (1, 1), (1, 1)],
            [(2, 4), (0, 2), (1, 9)],
            [(1, 3), (2, 2), (0, 1)],
        ]
        .map(|pairs| Individual::from_actions(pairs.map(|(a, d)| Gene::from_index(a, d)).to_vec()))
        .to_vec();

        let params = GeneticAlgorithmParams {
            population_size: 4,
            generations: 2,
            action_count: 3,
            selection_size: 2,
            tournament_size: 2,
            mutation_rate: 0.0,
        };
        let algorithm = GeneticAlgorithm::new(params).unwrap();
        let totals = RefCell::new(vec![]);
        let mut environment = RecordingEnvironment {
            episode_total: 0.0,
            totals: &totals,
            in_episode: false,
        };
        let mut reports = vec![];
        let best = algorithm
            .run_with(
                Population::from_individuals(individuals),
                |population| population.evaluate_fitness(&mut environment),
                &mut rng(),
                |report| reports.push((report.generation, report.best_fitness)),
            )
            .unwrap();
        environment.finish_episode();

        let totals = totals.into_inner();
        assert_eq!(totals.len(), 8);
        assert!(totals.iter().all(|total| (total - 3.0).abs() < f32::EPSILON));
        assert_eq!(best.len(), 3);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].0, 0);
        assert_eq!(reports[1].0, 1);
        assert!((best.fitness() - reports[1].1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_environment_error_ends_run() {
        let algorithm = GeneticAlgorithm::new(small_params()).unwrap();
        let mut environment = StubEnvironment::new(1.0);
        environment.fail_on_step = true;
        let err = algorithm
            .run(&mut environment, &mut rng(), |_| {})
            .unwrap_err();
        assert!(err.is_environment());
    }

    #[test]
    fn test_best_is_never_worse_than_any_generation() {
        let algorithm = GeneticAlgorithm::new(small_params()).unwrap();
        let mut environment = CourseEnvironment::new(CourseSeed::from_bytes([3; 16]));
        let mut max_seen = f32::NEG_INFINITY;
        let best = algorithm
            .run(&mut environment, &mut rng(), |report| {
                max_seen = max_seen.max(report.stats.max);
                assert!(report.best_fitness >= report.stats.max);
            })
            .unwrap();
        assert!((best.fitness() - max_seen).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parallel_evaluation_matches_serial() {
        let seed = CourseSeed::from_bytes([9; 16]);
        let population = Population::random(8, 40, false, &mut rng());

        let mut serial = population.clone();
        serial
            .evaluate_fitness(&mut CourseEnvironment::new(seed))
            .unwrap();
        let mut parallel = population;
        parallel
            .evaluate_fitness_parallel(|| CourseEnvironment::new(seed))
            .unwrap();

        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_fitness_stats() {
        let population = Population::from_individuals([0.1, 0.3].map(with_fitness).to_vec());
        let stats = population.compute_fitness_stats().unwrap();
        assert!((stats.mean - 0.2).abs() < 1e-6);
        assert!(Population::from_individuals(vec![]).compute_fitness_stats().is_none());
    }
}
