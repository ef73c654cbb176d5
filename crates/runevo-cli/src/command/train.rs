use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use runevo_engine::{CourseEnvironment, CourseSeed};
use runevo_training::{GenerationReport, GeneticAlgorithm, GeneticAlgorithmParams};

use crate::{
    model::runner_model::RunnerModel,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// JSON file with genetic algorithm parameters; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of individuals per generation
    #[arg(long)]
    population: Option<usize>,
    /// Number of generations
    #[arg(long)]
    generations: Option<usize>,
    /// Number of genes per individual
    #[arg(long)]
    actions: Option<usize>,
    /// Number of tournament winners kept each generation
    #[arg(long)]
    selection: Option<usize>,
    /// Contestants per tournament
    #[arg(long)]
    tournament: Option<usize>,
    /// Per-gene mutation probability
    #[arg(long)]
    mutation_rate: Option<f64>,
    /// Seed of the random number generator driving evolution
    #[arg(long)]
    seed: Option<u64>,
    /// Course to train on, as 32 hex digits (random if omitted)
    #[arg(long)]
    course_seed: Option<CourseSeed>,
    /// Evaluate individuals on parallel threads
    #[arg(long)]
    parallel: bool,
    /// Model name stored in the output
    #[arg(long, default_value = "runner")]
    name: String,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl TrainArg {
    fn params(&self) -> anyhow::Result<GeneticAlgorithmParams> {
        let mut params = match &self.config {
            Some(path) => util::read_json_file("parameter", path)?,
            None => GeneticAlgorithmParams::default(),
        };
        let overrides = [
            (&mut params.population_size, self.population),
            (&mut params.generations, self.generations),
            (&mut params.action_count, self.actions),
            (&mut params.selection_size, self.selection),
            (&mut params.tournament_size, self.tournament),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(rate) = self.mutation_rate {
            params.mutation_rate = rate;
        }
        Ok(params)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let params = arg.params()?;
    let algorithm =
        GeneticAlgorithm::new(params).context("Invalid genetic algorithm parameters")?;
    let params = algorithm.params();

    let course_seed = arg.course_seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = match arg.seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };

    tracing::info!(
        %course_seed,
        population = params.population_size,
        generations = params.generations,
        actions = params.action_count,
        parallel = arg.parallel,
        "training started"
    );

    let observer = |report: &GenerationReport<'_>| {
        if report.improved {
            tracing::debug!(
                generation = report.generation,
                "new best action sequence:\n{}",
                report.best.action_trace()
            );
        }
    };
    let best = if arg.parallel {
        algorithm.run_parallel(|| CourseEnvironment::new(course_seed), &mut rng, observer)?
    } else {
        let mut environment = CourseEnvironment::new(course_seed);
        algorithm.run(&mut environment, &mut rng, observer)?
    };

    eprintln!("Training completed.");

    let model = RunnerModel {
        name: arg.name.clone(),
        trained_at: Utc::now(),
        course_seed,
        final_fitness: best.fitness(),
        actions: best.into_actions(),
    };
    Output::save_json(&model, arg.output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Course seed: {}", model.course_seed);
    eprintln!("  Final fitness: {:.4}", model.final_fitness);
    eprintln!("  Actions: {}", model.actions.len());

    Ok(())
}
