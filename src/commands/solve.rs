use crate::dictionary::Dictionary;
use crate::models::hand::Hand;
use crate::models::io::SolveReport;
use crate::solver;
use crate::solver::snapshot::SnapshotOptions;
use crate::utils;
use anyhow::Error;
use itertools::Itertools;
use std::path::PathBuf;
use structopt::StructOpt;

/// Arrange a hand of letters into a connected grid of crossing dictionary words
#[derive(Debug, StructOpt)]
pub struct Solve {
    /// The letters in hand, like "WHATHATTHRAW". Lowercase input is accepted.
    hand: String,
    /// The word list to use: one uppercase word per line, blank lines ignored
    #[structopt(long)]
    dictionary: PathBuf,
    /// Node budget for the search. Larger budgets explore more arrangements.
    #[structopt(long)]
    budget: Option<u64>,
    /// Also treat rotated and mirrored grids as duplicates while searching
    #[structopt(long)]
    collapse_symmetries: bool,
    /// Write the resulting state as JSON, to feed back into `peel` and `swap`
    #[structopt(long)]
    output: Option<PathBuf>,
}

pub fn solve(cmd: Solve) -> Result<(), Error> {
    let dictionary = Dictionary::load(&cmd.dictionary)?;
    let hand: Hand = cmd.hand.to_uppercase().parse()?;
    let options = SnapshotOptions {
        collapse_symmetries: cmd.collapse_symmetries,
    };

    let budget = cmd.budget.unwrap_or(solver::DEFAULT_SOLVE_BUDGET);
    let solution = solver::solve(&hand, &dictionary, budget, options)?;

    log::debug!(
        "Maximal runs on the grid: {}",
        solution.grid.runs().iter().format(", ")
    );
    log::info!(
        "Placed {} of {} tiles in {} words after {} nodes",
        solution.grid.letter_count(),
        hand.len(),
        solution.grid.word_count(),
        solution.stats.nodes
    );
    if solution.stats.budget_exhausted {
        log::warn!("Search budget ran out, the grid may not be the best possible");
    }

    print!("{}", solution.grid);
    if !solution.unplaced.is_empty() {
        println!("Unplaced: {}", solution.unplaced);
    }

    if let Some(path) = &cmd.output {
        utils::write_json(path, &SolveReport::new(&solution))?;
        log::info!("Wrote state to {}", path.display());
    }

    Ok(())
}
