use crate::dictionary::Dictionary;
use crate::models::grid::Grid;
use crate::models::hand::Hand;
use crate::models::io::SolveReport;
use crate::swap_analysis::swap_scores;
use crate::utils;
use anyhow::Error;
use std::path::PathBuf;
use structopt::StructOpt;

/// Rank the unplaced letters by how attractive they are to trade back into the pool
#[derive(Debug, StructOpt)]
pub struct Swap {
    /// The word list to use: one uppercase word per line, blank lines ignored
    #[structopt(long)]
    dictionary: PathBuf,
    /// The state file written by a previous `solve` or `peel`
    #[structopt(long)]
    state: PathBuf,
}

pub fn swap(cmd: Swap) -> Result<(), Error> {
    let dictionary = Dictionary::load(&cmd.dictionary)?;

    let report: SolveReport = utils::read_json(&cmd.state)?;
    let grid = Grid::replay(&report.grid.placed_words()?, &dictionary)?;
    let mut hand = grid.tiles_used();
    hand.add_all(&report.unplaced.parse::<Hand>()?);

    let scores = swap_scores(&hand, &grid, &dictionary);
    if scores.is_empty() {
        println!("Every tile is placed, nothing to swap");
        return Ok(());
    }

    for (letter, score) in scores {
        println!("{} {}", letter, score);
    }
    Ok(())
}
