use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use runevo_training::Individual;

use crate::model::runner_model::RunnerModel;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ShowArg {
    /// Path to a trained runner model
    model: PathBuf,
    /// Print only the first N actions
    #[arg(long)]
    limit: Option<usize>,
}

pub(crate) fn run(arg: &ShowArg) -> anyhow::Result<()> {
    let model = RunnerModel::open(&arg.model)?;
    let mut individual = model.to_individual();
    if let Some(limit) = arg.limit {
        let actions = individual.into_actions().into_iter().take(limit).collect();
        individual = Individual::from_actions(actions);
    }

    eprintln!("Name: {}", model.name);
    eprintln!("Trained at: {}", model.trained_at);
    eprintln!("Final fitness: {:.4}", model.final_fitness);

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", individual.action_trace())?;
    Ok(())
}
