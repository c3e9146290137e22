use crate::dictionary::Dictionary;
use crate::models::grid::Grid;
use crate::models::hand::Hand;
use crate::models::letter::Letter;
use crate::models::position::{Direction, Position};
use crate::models::word::Word;
use crate::solver::snapshot::SnapshotOptions;
use crate::solver::{self, Budget, Solution, SolveStats, Strategy};
use anyhow::{ensure, Error};

pub const DEFAULT_PEEL_BUDGET: u64 = 100_000;

/// Share of the peel budget spent on each tier. Whatever the first two tiers leave behind
/// goes to the full re-solve.
const QUICK_ATTACH_SHARE: u64 = 20;
const RESTRUCTURE_SHARE: u64 = 30;

/// How many of the most recent words the restructure tier is allowed to take back
const MAX_POPPED_WORDS: usize = 3;

/// Update a solved grid after new tiles arrive. Three strategies run in order under a
/// shared node budget: attach the new tiles with tiny cross words, take back the last few
/// words and search again, and finally re-solve the whole hand from scratch. The best
/// grid seen anywhere wins.
pub fn peel(
    grid: Grid,
    prev_hand: &Hand,
    new_letters: &Hand,
    dictionary: &Dictionary,
    budget_limit: u64,
    options: SnapshotOptions,
) -> Result<Solution, Error> {
    ensure!(!new_letters.is_empty(), "No new letters to peel");
    ensure!(
        prev_hand.contains_all(&grid.tiles_used()),
        "The hand does not cover the tiles on the grid"
    );

    let mut full_hand = prev_hand.clone();
    full_hand.add_all(new_letters);

    let mut nodes = 0;
    let mut dedup_hits = 0;

    // Tier 1: quick attach
    let mut attach_budget = Budget::new(budget_limit * QUICK_ATTACH_SHARE / 100);
    let mut attached = grid.clone();
    let mut missing = new_letters.clone();
    let all_attached = quick_attach(&mut attached, &mut missing, dictionary, &mut attach_budget);
    nodes += attach_budget.used();

    if all_attached {
        log::debug!("Quick attach placed every new tile");
        let mut unplaced = full_hand.clone();
        unplaced.subtract(&attached.tiles_used());
        return Ok(Solution {
            grid: attached,
            unplaced,
            stats: SolveStats {
                nodes,
                dedup_hits,
                budget_exhausted: false,
                strategy: Strategy::QuickAttach,
            },
        });
    }

    // Quick attach may still have improved the grid, keep it as the baseline
    let mut best = (attached, Strategy::QuickAttach);

    // Tier 2: take back the last few words and search from the reduced grid
    let mut restructure_budget = Budget::new(budget_limit * RESTRUCTURE_SHARE / 100);
    for popped in 1..=MAX_POPPED_WORDS.min(grid.word_count()) {
        if restructure_budget.is_exhausted() {
            break;
        }
        log::debug!("Restructuring by taking back {} words", popped);

        let mut reduced = grid.clone();
        for _ in 0..popped {
            reduced.undo();
        }

        let solution = solver::solve_from(
            reduced,
            &full_hand,
            dictionary,
            &mut restructure_budget,
            options,
            Strategy::Restructure,
        );
        nodes += solution.stats.nodes;
        dedup_hits += solution.stats.dedup_hits;

        let done = solution.unplaced.is_empty();
        offer(&mut best, solution.grid, Strategy::Restructure);
        if done {
            let (grid, strategy) = best;
            let mut unplaced = full_hand.clone();
            unplaced.subtract(&grid.tiles_used());
            return Ok(Solution {
                grid,
                unplaced,
                stats: SolveStats {
                    nodes,
                    dedup_hits,
                    budget_exhausted: false,
                    strategy,
                },
            });
        }
    }

    // Tier 3: full re-solve on whatever allowance is left
    let mut resolve_budget = Budget::new(budget_limit.saturating_sub(nodes));
    let solution = solver::solve_from(
        Grid::new(),
        &full_hand,
        dictionary,
        &mut resolve_budget,
        options,
        Strategy::FullResolve,
    );
    nodes += solution.stats.nodes;
    dedup_hits += solution.stats.dedup_hits;
    offer(&mut best, solution.grid, Strategy::FullResolve);

    let (grid, strategy) = best;
    let mut unplaced = full_hand.clone();
    unplaced.subtract(&grid.tiles_used());
    Ok(Solution {
        grid,
        unplaced,
        stats: SolveStats {
            nodes,
            dedup_hits,
            budget_exhausted: resolve_budget.is_exhausted(),
            strategy,
        },
    })
}

fn offer(best: &mut (Grid, Strategy), candidate: Grid, strategy: Strategy) {
    if solver::quality(&candidate) > solver::quality(&best.0) {
        *best = (candidate, strategy);
    }
}

/// Attach new tiles one at a time with two- or three-letter words that write exactly one
/// new cell: the anchor itself, every other cell reusing letters already on the grid.
/// Returns `true` once every new tile has landed.
fn quick_attach(
    grid: &mut Grid,
    missing: &mut Hand,
    dictionary: &Dictionary,
    budget: &mut Budget,
) -> bool {
    'restart: loop {
        if missing.is_empty() {
            return true;
        }

        for anchor in grid.anchors() {
            for &direction in &Direction::BOTH {
                for length in 2..=3 {
                    for offset in 0..length {
                        if !budget.charge(1) {
                            return false;
                        }

                        let start = anchor - direction.delta() * offset;
                        if let Some(word) =
                            complete_pattern(grid, dictionary, missing, start, direction, length, anchor)
                        {
                            let placement =
                                match grid.can_place(&word, start, direction, dictionary) {
                                    Ok(placement) => placement,
                                    Err(_) => continue,
                                };
                            if placement.new_cell_count() != 1 {
                                continue;
                            }

                            let used = grid.place(placement);
                            missing.subtract(&used);
                            log::debug!("Quick attached {} at the anchor", word);
                            // Anchors moved, start over from the freshest grid
                            continue 'restart;
                        }
                    }
                }
            }
        }

        return false;
    }
}

/// Fill the single open cell of a word template from the missing tiles. All other cells
/// must already hold letters; the candidate letter must turn the template into a word.
fn complete_pattern(
    grid: &Grid,
    dictionary: &Dictionary,
    missing: &Hand,
    start: Position,
    direction: Direction,
    length: i16,
    anchor: Position,
) -> Option<Word> {
    let delta = direction.delta();

    // Collect the fixed letters; every cell besides the anchor must be occupied
    let mut template = Vec::with_capacity(length as usize);
    for i in 0..length {
        let pos = start + delta * i;
        match grid.get(pos) {
            Some(letter) => template.push(Some(letter)),
            None if pos == anchor => template.push(None),
            None => return None,
        }
    }
    let open = template.iter().position(|cell| cell.is_none())?;

    // When the open cell ends the template, the trie narrows the candidates up front
    let allowed = if open + 1 == template.len() {
        let prefix: Vec<Letter> = template[..open].iter().filter_map(|&cell| cell).collect();
        Some(dictionary.continuations(&prefix))
    } else {
        None
    };

    for (letter, _) in missing.counts() {
        if let Some(allowed) = allowed {
            if !allowed.contains(letter) {
                continue;
            }
        }
        let letters: Vec<Letter> = template
            .iter()
            .map(|&cell| cell.unwrap_or(letter))
            .collect();
        if dictionary.contains(&letters) {
            return Word::new(letters).ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::solve;

    fn solve_hand(hand: &Hand, dictionary: &Dictionary) -> Grid {
        solve(hand, dictionary, solver::DEFAULT_SOLVE_BUDGET, Default::default())
            .unwrap()
            .grid
    }

    fn assert_valid(solution: &Solution, full_hand: &Hand, dictionary: &Dictionary) {
        for run in solution.grid.runs() {
            assert!(dictionary.contains(run.letters()), "{} is not a word", run);
        }
        assert!(solution.grid.is_connected());
        let mut total = solution.grid.tiles_used();
        total.add_all(&solution.unplaced);
        assert_eq!(&total, full_hand);
    }

    #[test]
    fn quick_attach_single_tile() {
        let dictionary = Dictionary::build(vec!["CAT", "AS", "AT", "TA"]).unwrap();
        let hand: Hand = "CAT".parse().unwrap();
        let grid = solve_hand(&hand, &dictionary);

        let new_letters: Hand = "S".parse().unwrap();
        let solution = peel(
            grid,
            &hand,
            &new_letters,
            &dictionary,
            DEFAULT_PEEL_BUDGET,
            Default::default(),
        )
        .unwrap();

        let full_hand: Hand = "CATS".parse().unwrap();
        assert_valid(&solution, &full_hand, &dictionary);
        assert!(solution.unplaced.is_empty());
        assert_eq!(solution.grid.letter_count(), 4);
        assert_eq!(solution.stats.strategy, Strategy::QuickAttach);
    }

    #[test]
    fn quick_attach_crosses_an_existing_word() {
        let dictionary = Dictionary::build(vec!["HELLO", "OW", "WE", "HOW", "LOW"]).unwrap();
        let hand: Hand = "HELLO".parse().unwrap();
        let grid = solve_hand(&hand, &dictionary);
        assert_eq!(grid.letter_count(), 5);

        let new_letters: Hand = "W".parse().unwrap();
        let solution = peel(
            grid,
            &hand,
            &new_letters,
            &dictionary,
            DEFAULT_PEEL_BUDGET,
            Default::default(),
        )
        .unwrap();

        let full_hand: Hand = "HELLOW".parse().unwrap();
        assert_valid(&solution, &full_hand, &dictionary);
        assert!(solution.unplaced.is_empty());
        assert_eq!(solution.grid.letter_count(), 6);
        assert_eq!(solution.stats.strategy, Strategy::QuickAttach);
    }

    #[test]
    fn restructure_when_attach_cannot_help() {
        // No two-letter cross can host the T, the grid has to be rebuilt
        let dictionary =
            Dictionary::build(vec!["SAME", "MEATS", "TEAMS", "MEAT", "TEAM"]).unwrap();
        let hand: Hand = "SAME".parse().unwrap();
        let grid = solve_hand(&hand, &dictionary);
        assert_eq!(grid.letter_count(), 4);

        let new_letters: Hand = "T".parse().unwrap();
        let solution = peel(
            grid,
            &hand,
            &new_letters,
            &dictionary,
            DEFAULT_PEEL_BUDGET,
            Default::default(),
        )
        .unwrap();

        let full_hand: Hand = "SAMET".parse().unwrap();
        assert_valid(&solution, &full_hand, &dictionary);
        assert!(solution.unplaced.is_empty());
        assert_eq!(solution.grid.letter_count(), 5);
        assert_eq!(solution.stats.strategy, Strategy::Restructure);
    }

    #[test]
    fn impossible_tile_stays_unplaced() {
        let dictionary = Dictionary::build(vec!["CAT", "AT", "TA"]).unwrap();
        let hand: Hand = "CAT".parse().unwrap();
        let grid = solve_hand(&hand, &dictionary);

        let new_letters: Hand = "Q".parse().unwrap();
        let solution = peel(
            grid,
            &hand,
            &new_letters,
            &dictionary,
            DEFAULT_PEEL_BUDGET,
            Default::default(),
        )
        .unwrap();

        let full_hand: Hand = "CATQ".parse().unwrap();
        assert_valid(&solution, &full_hand, &dictionary);
        assert_eq!(solution.unplaced, "Q".parse().unwrap());
        assert_eq!(solution.grid.letter_count(), 3);
    }

    #[test]
    fn peel_without_new_letters_is_an_error() {
        let dictionary = Dictionary::build(vec!["CAT"]).unwrap();
        let hand: Hand = "CAT".parse().unwrap();
        let grid = solve_hand(&hand, &dictionary);

        assert!(peel(
            grid,
            &hand,
            &Hand::new(),
            &dictionary,
            DEFAULT_PEEL_BUDGET,
            Default::default(),
        )
        .is_err());
    }
}
