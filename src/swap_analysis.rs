use crate::dictionary::Dictionary;
use crate::models::grid::Grid;
use crate::models::hand::Hand;
use crate::models::letter::Letter;
use crate::solver::dead_letters;
use itertools::Itertools;
use std::cmp::Reverse;

/// Fixed weights of the swap score. A high score means "better to trade away".
const DIFFICULTY_WEIGHT: i32 = 3;
const SHORT_WORD_PENALTY: i32 = 2;
const DEAD_LETTER_BONUS: i32 = 25;

/// Words up to this length count as support when judging how easy a letter is to place
const SHORT_WORD_MAX_LEN: usize = 4;

/// Score every letter of the hand that is not on the grid by how attractive it is to
/// trade back into the pool. Hard letters score high, letters with plenty of short words
/// to hide in score low, and letters that cannot be placed at all get a flat bonus.
/// Returns the letters sorted by descending score; an empty list when everything is placed.
pub fn swap_scores(hand: &Hand, grid: &Grid, dictionary: &Dictionary) -> Vec<(Letter, i32)> {
    let mut unplaced = hand.clone();
    unplaced.subtract(&grid.tiles_used());
    if unplaced.is_empty() {
        return Vec::new();
    }

    let dead = dead_letters(&unplaced, dictionary);

    let mut scores = unplaced
        .counts()
        .map(|(letter, _)| {
            let support = dictionary.count_words_with(&unplaced, letter, SHORT_WORD_MAX_LEN);
            let mut score =
                DIFFICULTY_WEIGHT * letter.difficulty() as i32 - SHORT_WORD_PENALTY * support as i32;
            if dead.contains(letter) {
                score += DEAD_LETTER_BONUS;
            }
            (letter, score)
        })
        .collect_vec();

    scores.sort_by_key(|&(letter, score)| (Reverse(score), Reverse(letter.difficulty()), letter));
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_hopeless_letters_first() {
        let dictionary = Dictionary::build(vec!["CAT", "AT", "TA"]).unwrap();
        let hand: Hand = "QJXZQJXZ".parse().unwrap();
        let grid = Grid::new();

        let scores = swap_scores(&hand, &grid, &dictionary);
        let letters: Vec<Letter> = scores.iter().map(|&(letter, _)| letter).collect();

        // All four are dead; ties break by difficulty, then alphabetically
        assert_eq!(letters, vec![Letter::Q, Letter::Z, Letter::J, Letter::X]);
        for (_, score) in scores {
            assert!(score > 0);
        }
    }

    #[test]
    fn well_supported_letters_score_low() {
        let dictionary = Dictionary::build(vec!["CAT", "AT", "TA", "QI"]).unwrap();
        let hand: Hand = "ATQ".parse().unwrap();
        let grid = Grid::new();

        let scores = swap_scores(&hand, &grid, &dictionary);
        assert_eq!(scores[0].0, Letter::Q);

        // A and T each appear in the two spellable short words AT and TA
        let a_score = scores.iter().find(|&&(c, _)| c == Letter::A).unwrap().1;
        assert_eq!(a_score, 3 - 2 * 2);
    }

    #[test]
    fn placed_letters_are_ignored() {
        let dictionary = Dictionary::build(vec!["CAT", "AT", "TA"]).unwrap();
        let hand: Hand = "CATQ".parse().unwrap();
        let grid = crate::solver::solve(&hand, &dictionary, 10_000, Default::default())
            .unwrap()
            .grid;
        assert_eq!(grid.letter_count(), 3);

        let scores = swap_scores(&hand, &grid, &dictionary);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].0, Letter::Q);
    }

    #[test]
    fn fully_placed_hand_has_nothing_to_swap() {
        let dictionary = Dictionary::build(vec!["CAT"]).unwrap();
        let hand: Hand = "CAT".parse().unwrap();
        let grid = crate::solver::solve(&hand, &dictionary, 10_000, Default::default())
            .unwrap()
            .grid;

        assert!(swap_scores(&hand, &grid, &dictionary).is_empty());
    }
}
