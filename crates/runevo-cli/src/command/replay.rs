use std::path::PathBuf;

use runevo_engine::CourseEnvironment;
use runevo_training::play_episode;

use crate::model::runner_model::RunnerModel;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Path to a trained runner model
    model: PathBuf,
    /// Number of times to play the course
    #[arg(long, default_value_t = 1)]
    loops: usize,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let model = RunnerModel::open(&arg.model)?;
    let individual = model.to_individual();
    let mut environment = CourseEnvironment::new(model.course_seed);

    eprintln!(
        "Replaying {} ({} actions, trained fitness {:.4}) on course {}",
        model.name,
        individual.len(),
        model.final_fitness,
        model.course_seed
    );
    for i in 0..arg.loops {
        let summary = play_episode(&individual, &mut environment)?;
        let state = environment.state();
        eprintln!("Loop #{i}:");
        eprintln!("  Fitness:        {:.4}", summary.normalized_fitness());
        eprintln!("  Steps played:   {}/{}", summary.steps, individual.len());
        eprintln!(
            "  Progress:       {}/{}",
            state.level_progress,
            environment.layout().length()
        );
        eprintln!("  Score:          {}", state.score);
        eprintln!("  Lives left:     {}", state.lives_left);
        eprintln!("  Reached goal:   {}", state.finished);
        eprintln!("  Ended early:    {}", summary.game_over);
    }
    Ok(())
}
