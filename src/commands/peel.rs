use crate::dictionary::Dictionary;
use crate::models::grid::Grid;
use crate::models::hand::Hand;
use crate::models::io::SolveReport;
use crate::peel as peel_mod;
use crate::solver::snapshot::SnapshotOptions;
use crate::utils;
use anyhow::Error;
use std::path::PathBuf;
use structopt::StructOpt;

/// Work freshly drawn letters into a previously solved grid
#[derive(Debug, StructOpt)]
pub struct Peel {
    /// The newly drawn letters, like "S". Lowercase input is accepted.
    letters: String,
    /// The word list to use: one uppercase word per line, blank lines ignored
    #[structopt(long)]
    dictionary: PathBuf,
    /// The state file written by a previous `solve` or `peel`
    #[structopt(long)]
    state: PathBuf,
    /// Node budget shared by the attach, restructure and re-solve tiers
    #[structopt(long)]
    budget: Option<u64>,
    /// Also treat rotated and mirrored grids as duplicates while searching
    #[structopt(long)]
    collapse_symmetries: bool,
    /// Write the updated state as JSON
    #[structopt(long)]
    output: Option<PathBuf>,
}

pub fn peel(cmd: Peel) -> Result<(), Error> {
    let dictionary = Dictionary::load(&cmd.dictionary)?;
    let new_letters: Hand = cmd.letters.to_uppercase().parse()?;
    let options = SnapshotOptions {
        collapse_symmetries: cmd.collapse_symmetries,
    };

    let report: SolveReport = utils::read_json(&cmd.state)?;
    let grid = Grid::replay(&report.grid.placed_words()?, &dictionary)?;
    let mut prev_hand = grid.tiles_used();
    prev_hand.add_all(&report.unplaced.parse()?);

    let budget = cmd.budget.unwrap_or(peel_mod::DEFAULT_PEEL_BUDGET);
    let solution = peel_mod::peel(grid, &prev_hand, &new_letters, &dictionary, budget, options)?;

    log::info!(
        "Peel used the {:?} strategy: {} tiles now placed in {} words",
        solution.stats.strategy,
        solution.grid.letter_count(),
        solution.grid.word_count()
    );

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
