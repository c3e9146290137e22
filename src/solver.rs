use crate::dictionary::Dictionary;
use crate::models::grid::Grid;
use crate::models::hand::Hand;
use crate::models::letter::{Letter, LetterSet};
use crate::models::position::{Direction, Position};
use crate::models::word::Word;
use crate::solver::snapshot::{SnapshotOptions, SnapshotStore};
use anyhow::{ensure, Error};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

pub mod snapshot;

pub const DEFAULT_SOLVE_BUDGET: u64 = 200_000;

/// Below this many remaining tiles the solver tries short candidate words first, since the
/// tail of a hand usually only fits small crosses
const SMALL_HAND: usize = 5;

/// A node-count allowance. The search polls it at every recursion entry and unwinds
/// cleanly once it runs out, keeping results reproducible across machines.
#[derive(Debug)]
pub struct Budget {
    limit: u64,
    used: u64,
}

impl Budget {
    pub fn new(limit: u64) -> Self {
        Budget { limit, used: 0 }
    }

    /// Spend `amount` nodes. Returns `false` once the allowance is gone.
    pub fn charge(&mut self, amount: u64) -> bool {
        self.used += amount;
        self.used <= self.limit
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }

    pub fn used(&self) -> u64 {
        self.used
    }
}

/// Which tier of the solver produced the returned grid
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    SeedSearch,
    QuickAttach,
    Restructure,
    FullResolve,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SolveStats {
    pub nodes: u64,
    pub dedup_hits: u64,
    pub budget_exhausted: bool,
    pub strategy: Strategy,
}

/// The outcome of a solve: the best grid found, the tiles that could not be placed and
/// some counters. An unsolvable hand is a normal outcome, not an error.
#[derive(Debug)]
pub struct Solution {
    pub grid: Grid,
    pub unplaced: Hand,
    pub stats: SolveStats,
}

/// Arrange as many tiles of the hand as possible into a connected grid of dictionary
/// words. The search is deterministic: the same hand and dictionary always produce the
/// same grid.
pub fn solve(
    hand: &Hand,
    dictionary: &Dictionary,
    budget_limit: u64,
    options: SnapshotOptions,
) -> Result<Solution, Error> {
    ensure!(!hand.is_empty(), "Cannot solve an empty hand");

    let mut budget = Budget::new(budget_limit);
    Ok(solve_from(
        Grid::new(),
        hand,
        dictionary,
        &mut budget,
        options,
        Strategy::SeedSearch,
    ))
}

/// Letters of the hand that appear in no word spellable from it. No arrangement can ever
/// place them, so the search drops them up front and reports them back as unplaced.
pub fn dead_letters(hand: &Hand, dictionary: &Dictionary) -> LetterSet {
    let mut dead = LetterSet::default();
    for (letter, _) in hand.counts() {
        if !dictionary.has_word_with(hand, letter) {
            dead.insert(letter);
        }
    }
    dead
}

/// Run the backtracking search on top of an existing grid. `full_hand` covers the tiles
/// already on the grid plus the ones still in hand; the caller keeps ownership of the
/// budget so several searches can share one allowance.
pub(crate) fn solve_from(
    grid: Grid,
    full_hand: &Hand,
    dictionary: &Dictionary,
    budget: &mut Budget,
    options: SnapshotOptions,
    strategy: Strategy,
) -> Solution {
    let nodes_before = budget.used();

    let mut remaining = full_hand.clone();
    remaining.subtract(&grid.tiles_used());
    for letter in dead_letters(full_hand, dictionary).iter() {
        remaining.take_all(letter);
    }

    let target = grid.letter_count() + remaining.len();
    let mut search = Search {
        dictionary,
        store: SnapshotStore::new(options),
        budget,
        best: Best::new(&grid),
        target,
        done: false,
    };

    if grid.is_empty() {
        search.run_seeds(&mut remaining);
    } else {
        let mut grid = grid;
        search.explore(&mut grid, &mut remaining);
    }

    let Search {
        store,
        budget,
        best,
        ..
    } = search;
    let best = best.grid;
    let mut unplaced = full_hand.clone();
    unplaced.subtract(&best.tiles_used());

    let stats = SolveStats {
        nodes: budget.used() - nodes_before,
        dedup_hits: store.dedup_hits(),
        budget_exhausted: budget.is_exhausted(),
        strategy,
    };
    Solution {
        grid: best,
        unplaced,
        stats,
    }
}

/// Lexicographic quality of a grid: more tiles placed wins, then fewer words, then a
/// tighter bounding box
pub(crate) type Quality = (usize, Reverse<usize>, Reverse<i64>);

pub(crate) fn quality(grid: &Grid) -> Quality {
    (
        grid.letter_count(),
        Reverse(grid.word_count()),
        Reverse(grid.area()),
    )
}

struct Best {
    grid: Grid,
    quality: Quality,
}

impl Best {
    fn new(grid: &Grid) -> Self {
        Best {
            grid: grid.clone(),
            quality: quality(grid),
        }
    }

    fn offer(&mut self, grid: &Grid) {
        let quality = quality(grid);
        if quality > self.quality {
            self.quality = quality;
            self.grid = grid.clone();
        }
    }
}

struct Search<'a> {
    dictionary: &'a Dictionary,
    store: SnapshotStore,
    budget: &'a mut Budget,
    best: Best,
    /// Tiles placed once every live tile lands; reaching it ends the search
    target: usize,
    done: bool,
}

impl<'a> Search<'a> {
    fn finished(&self) -> bool {
        self.done || self.budget.is_exhausted()
    }

    /// Try every seed word at the origin. Longest and hardest seeds go first: front-loading
    /// rare letters keeps them from stranding at the end of the search.
    fn run_seeds(&mut self, remaining: &mut Hand) {
        let mut seeds = self.dictionary.words_from(remaining, None);
        seeds.sort_by(|a, b| {
            b.len()
                .cmp(&a.len())
                .then_with(|| b.difficulty().cmp(&a.difficulty()))
                .then_with(|| a.cmp(b))
        });
        log::debug!("Trying {} seed words for {} tiles", seeds.len(), remaining.len());

        let mut grid = Grid::new();
        for seed in seeds {
            if self.finished() {
                break;
            }

            let placement = match grid.can_place(
                &seed,
                Position::ORIGIN,
                Direction::Horizontal,
                self.dictionary,
            ) {
                Ok(placement) => placement,
                Err(_) => continue,
            };
            let used = grid.place(placement);
            if self.store.insert(&grid) {
                remaining.subtract(&used);
                self.explore(&mut grid, remaining);
                remaining.add_all(&used);
            }
            grid.undo();
        }
    }

    fn explore(&mut self, grid: &mut Grid, remaining: &mut Hand) {
        // The current grid is itself a candidate answer
        self.best.offer(grid);
        if grid.letter_count() == self.target {
            // Nothing can beat a grid holding every live tile
            self.done = true;
            return;
        }
        if !self.budget.charge(1) {
            return;
        }
        if remaining.is_empty() {
            return;
        }

        // Attach through occupied cells, hardest letters first: they admit the fewest
        // words, so resolving them early prunes deeper
        let mut pivots: Vec<(Position, Letter)> = grid.cells().collect();
        pivots.sort_by_key(|&(pos, letter)| (Reverse(letter.difficulty()), pos));

        let mut candidates: BTreeMap<Letter, Vec<Word>> = BTreeMap::new();
        for (pivot, letter) in pivots {
            if self.finished() {
                return;
            }

            let dictionary = self.dictionary;
            let words = candidates
                .entry(letter)
                .or_insert_with(|| candidate_words(dictionary, remaining, letter));

            for word in words.iter() {
                for index in word.positions_of(letter) {
                    for &direction in &Direction::BOTH {
                        let start = pivot - direction.delta() * index as i16;
                        let placement =
                            match grid.can_place(word, start, direction, self.dictionary) {
                                Ok(placement) => placement,
                                Err(_) => continue,
                            };
                        let used = placement.tiles_used();
                        if !remaining.contains_all(&used) {
                            continue;
                        }

                        grid.place(placement);
                        if self.store.insert(grid) {
                            remaining.subtract(&used);
                            self.explore(grid, remaining);
                            remaining.add_all(&used);
                        }
                        grid.undo();

                        if self.finished() {
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Words attachable through one pivot letter. The pivot tile is free: the word only has
/// to be spellable from the remaining hand plus that letter.
fn candidate_words(dictionary: &Dictionary, remaining: &Hand, pivot: Letter) -> Vec<Word> {
    let mut words = dictionary.words_from(&remaining.with(pivot), Some(pivot));
    if remaining.len() < SMALL_HAND {
        words.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    } else {
        words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    }
    words
}
