use crate::models::grid::{Grid, PlacedWord};
use crate::models::letter::Letter;
use crate::models::position::{Direction, Position};
use crate::models::word::Word;
use crate::solver::{Solution, SolveStats};
use anyhow::Error;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// The state file written by `solve` and `peel` and read back by `peel` and `swap`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    pub grid: GridReport,
    pub unplaced: String,
    pub stats: SolveStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridReport {
    pub bounds: Option<BoundsReport>,
    pub cells: Vec<CellReport>,
    pub words: Vec<PlacedWordReport>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundsReport {
    pub min_row: i16,
    pub min_col: i16,
    pub max_row: i16,
    pub max_col: i16,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CellReport {
    pub row: i16,
    pub col: i16,
    pub letter: Letter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedWordReport {
    pub row: i16,
    pub col: i16,
    pub direction: Direction,
    pub word: String,
}

impl SolveReport {
    pub fn new(solution: &Solution) -> Self {
        SolveReport {
            grid: GridReport::from_grid(&solution.grid),
            unplaced: solution.unplaced.to_string(),
            stats: solution.stats.clone(),
        }
    }
}

impl GridReport {
    pub fn from_grid(grid: &Grid) -> Self {
        let bounds = grid.bounds().map(|(top_left, bottom_right)| BoundsReport {
            min_row: top_left.row,
            min_col: top_left.col,
            max_row: bottom_right.row,
            max_col: bottom_right.col,
        });

        let cells = grid
            .cells()
            .sorted()
            .map(|(pos, letter)| CellReport {
                row: pos.row,
                col: pos.col,
                letter,
            })
            .collect();

        let words = grid
            .placed_words()
            .map(|placed| PlacedWordReport {
                row: placed.start.row,
                col: placed.start.col,
                direction: placed.direction,
                word: placed.word.to_string(),
            })
            .collect();

        GridReport {
            bounds,
            cells,
            words,
        }
    }

    /// Parse the placed-word list back into domain values, ready for [`Grid::replay`]
    pub fn placed_words(&self) -> Result<Vec<PlacedWord>, Error> {
        self.words
            .iter()
            .map(|report| {
                Ok(PlacedWord {
                    start: Position::new(report.row, report.col),
                    direction: report.direction,
                    word: Word::try_from(report.word.as_str())?,
                })
            })
            .collect()
    }
}
