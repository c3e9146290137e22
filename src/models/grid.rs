use crate::dictionary::Dictionary;
use crate::models::hand::Hand;
use crate::models::letter::Letter;
use crate::models::position::{Direction, Position};
use crate::models::word::Word;
use anyhow::{anyhow, Error};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::fmt::Write;

/// Represents a word committed to the grid at a fixed position
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PlacedWord {
    pub start: Position,
    pub direction: Direction,
    pub word: Word,
}

/// A validated placement, ready to be committed with [`Grid::place`]
#[derive(Debug, Clone)]
pub struct Placement {
    placed: PlacedWord,
    new_cells: Vec<(Position, Letter)>,
}

/// Why a trial placement was refused. A rejection is a normal answer, not an error.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Rejection {
    /// The word is not in the dictionary
    NotAWord,
    /// An occupied cell holds a different letter
    Conflict,
    /// The cell before the start or after the end is occupied, so the run would extend
    BlockedEnd,
    /// A perpendicular run through a new cell would not be a dictionary word
    CrossWord,
    /// The word shares no cell with the existing grid
    Detached,
    /// Every cell is already occupied, the placement would write nothing
    NothingNew,
}

/// The letter plane. Cells are tracked sparsely; coordinates are signed and unbounded.
/// The placed-word list doubles as the undo stack: every placement records which cells it
/// wrote, so [`Grid::undo`] restores the exact previous state.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: HashMap<Position, Letter>,
    placements: Vec<PlacementRecord>,
    top_left: Position,
    bottom_right: Position,
}

#[derive(Debug, Clone)]
struct PlacementRecord {
    placed: PlacedWord,
    new_cells: Vec<Position>,
}

impl PlacedWord {
    pub fn end(&self) -> Position {
        self.start + self.direction.delta() * (self.word.len() as i16 - 1)
    }
}

impl Placement {
    pub fn new_cell_count(&self) -> usize {
        self.new_cells.len()
    }

    /// The tiles this placement would draw from the hand. Overlap cells reuse the letters
    /// already on the grid and cost nothing.
    pub fn tiles_used(&self) -> Hand {
        let mut hand = Hand::new();
        for &(_, letter) in &self.new_cells {
            hand.add(letter);
        }
        hand
    }
}

impl Grid {
    pub fn new() -> Self {
        Grid {
            cells: HashMap::new(),
            placements: Vec::new(),
            top_left: Position::new(i16::MAX, i16::MAX),
            bottom_right: Position::new(i16::MIN, i16::MIN),
        }
    }

    /// Rebuild a grid by replaying placed words in their original order, re-validating
    /// every invariant on the way
    pub fn replay(words: &[PlacedWord], dictionary: &Dictionary) -> Result<Grid, Error> {
        let mut grid = Grid::new();
        for placed in words {
            let placement = grid
                .can_place(&placed.word, placed.start, placed.direction, dictionary)
                .map_err(|rejection| {
                    anyhow!("Cannot replay word {}: {}", placed.word, rejection)
                })?;
            grid.place(placement);
        }
        debug_assert!(grid.is_connected());
        Ok(grid)
    }

    pub fn get(&self, at: Position) -> Option<Letter> {
        self.cells.get(&at).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Return the number of tiles on the grid
    pub fn letter_count(&self) -> usize {
        self.cells.len()
    }

    pub fn word_count(&self) -> usize {
        self.placements.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = (Position, Letter)> + '_ {
        self.cells.iter().map(|(&pos, &letter)| (pos, letter))
    }

    pub fn placed_words(&self) -> impl Iterator<Item = &PlacedWord> {
        self.placements.iter().map(|record| &record.placed)
    }

    /// Return the multiset of tiles currently on the grid
    pub fn tiles_used(&self) -> Hand {
        let mut hand = Hand::new();
        for &letter in self.cells.values() {
            hand.add(letter);
        }
        hand
    }

    /// Return the bounding box as `(top_left, bottom_right)`, or `None` for an empty grid
    pub fn bounds(&self) -> Option<(Position, Position)> {
        if self.is_empty() {
            None
        } else {
            Some((self.top_left, self.bottom_right))
        }
    }

    /// Area of the bounding box, used as the tightness component of the quality metric
    pub fn area(&self) -> i64 {
        match self.bounds() {
            None => 0,
            Some((top_left, bottom_right)) => {
                let height = (bottom_right.row - top_left.row) as i64 + 1;
                let width = (bottom_right.col - top_left.col) as i64 + 1;
                height * width
            }
        }
    }

    /// Validate a placement without mutating the grid. On success the returned [`Placement`]
    /// carries the cells that would be newly written.
    pub fn can_place(
        &self,
        word: &Word,
        start: Position,
        direction: Direction,
        dictionary: &Dictionary,
    ) -> Result<Placement, Rejection> {
        if !dictionary.contains(word.letters()) {
            return Err(Rejection::NotAWord);
        }

        let delta = direction.delta();
        let end = start + delta * (word.len() as i16 - 1);
        if self.cells.contains_key(&(start - delta)) || self.cells.contains_key(&(end + delta)) {
            return Err(Rejection::BlockedEnd);
        }

        let mut overlaps = false;
        let mut new_cells = Vec::new();
        for (i, &letter) in word.letters().iter().enumerate() {
            let pos = start + delta * i as i16;
            match self.get(pos) {
                Some(existing) if existing == letter => overlaps = true,
                Some(_) => return Err(Rejection::Conflict),
                None => {
                    let run = self.cross_run(pos, letter, direction.perpendicular());
                    if run.len() >= 2 && !dictionary.contains(&run) {
                        return Err(Rejection::CrossWord);
                    }
                    new_cells.push((pos, letter));
                }
            }
        }

        if !overlaps && !self.is_empty() {
            return Err(Rejection::Detached);
        }
        if new_cells.is_empty() {
            return Err(Rejection::NothingNew);
        }

        Ok(Placement {
            placed: PlacedWord {
                start,
                direction,
                word: word.clone(),
            },
            new_cells,
        })
    }

    /// The maximal run along `axis` that would pass through `pos` once it holds `letter`
    fn cross_run(&self, pos: Position, letter: Letter, axis: Direction) -> Vec<Letter> {
        let delta = axis.delta();

        let mut first = pos;
        while self.cells.contains_key(&(first - delta)) {
            first = first - delta;
        }

        let mut run = Vec::new();
        let mut cursor = first;
        loop {
            match self.get(cursor) {
                Some(existing) => run.push(existing),
                None if cursor == pos => run.push(letter),
                None => break,
            }
            cursor = cursor + delta;
        }
        run
    }

    /// Commit a placement validated by [`Grid::can_place`]. Returns the tiles drawn from
    /// the hand, that is, the letters of the newly written cells only.
    pub fn place(&mut self, placement: Placement) -> Hand {
        let tiles = placement.tiles_used();

        let mut new_cells = Vec::with_capacity(placement.new_cells.len());
        for (pos, letter) in placement.new_cells {
            let previous = self.cells.insert(pos, letter);
            debug_assert!(previous.is_none());
            self.top_left.row = self.top_left.row.min(pos.row);
            self.top_left.col = self.top_left.col.min(pos.col);
            self.bottom_right.row = self.bottom_right.row.max(pos.row);
            self.bottom_right.col = self.bottom_right.col.max(pos.col);
            new_cells.push(pos);
        }

        self.placements.push(PlacementRecord {
            placed: placement.placed,
            new_cells,
        });
        tiles
    }

    /// Remove the most recently placed word, clearing only the cells it newly wrote. The
    /// grid returns to the exact state it had before the matching [`Grid::place`].
    pub fn undo(&mut self) -> Option<PlacedWord> {
        let record = self.placements.pop()?;
        for pos in &record.new_cells {
            self.cells.remove(pos);
        }
        self.recompute_bounds();
        Some(record.placed)
    }

    fn recompute_bounds(&mut self) {
        self.top_left = Position::new(i16::MAX, i16::MAX);
        self.bottom_right = Position::new(i16::MIN, i16::MIN);
        for &pos in self.cells.keys() {
            self.top_left.row = self.top_left.row.min(pos.row);
            self.top_left.col = self.top_left.col.min(pos.col);
            self.bottom_right.row = self.bottom_right.row.max(pos.row);
            self.bottom_right.col = self.bottom_right.col.max(pos.col);
        }
    }

    /// Return the cells where a future word may attach: every empty cell next to an
    /// occupied one, in row-column order. An empty grid anchors at the origin.
    pub fn anchors(&self) -> Vec<Position> {
        if self.is_empty() {
            return vec![Position::ORIGIN];
        }

        let mut anchors = BTreeSet::new();
        for &pos in self.cells.keys() {
            for neighbor in pos.neighbors() {
                if !self.cells.contains_key(&neighbor) {
                    anchors.insert(neighbor);
                }
            }
        }
        anchors.into_iter().collect()
    }

    /// Check that all occupied cells form a single edge-connected region. This holds by
    /// construction after every accepted placement; it is re-checked in tests and replay.
    pub fn is_connected(&self) -> bool {
        let start = match self.cells.keys().next() {
            None => return true,
            Some(&pos) => pos,
        };

        let mut visited = HashSet::new();
        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            if !visited.insert(pos) {
                continue;
            }
            for neighbor in pos.neighbors() {
                if self.cells.contains_key(&neighbor) && !visited.contains(&neighbor) {
                    stack.push(neighbor);
                }
            }
        }

        visited.len() == self.cells.len()
    }

    /// Enumerate every maximal run of two or more letters, horizontal then vertical, in
    /// row-column order
    pub fn runs(&self) -> Vec<Word> {
        let mut runs = Vec::new();
        for &direction in &Direction::BOTH {
            let delta = direction.delta();
            let mut starts: Vec<Position> = self
                .cells
                .keys()
                .copied()
                .filter(|&pos| !self.cells.contains_key(&(pos - delta)))
                .collect();
            starts.sort();

            for start in starts {
                let mut letters = Vec::new();
                let mut cursor = start;
                while let Some(letter) = self.get(cursor) {
                    letters.push(letter);
                    cursor = cursor + delta;
                }
                if let Ok(word) = Word::new(letters) {
                    runs.push(word);
                }
            }
        }
        runs
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new()
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reason = match self {
            Rejection::NotAWord => "the word is not in the dictionary",
            Rejection::Conflict => "an occupied cell holds a different letter",
            Rejection::BlockedEnd => "a cell beyond the word's end is occupied",
            Rejection::CrossWord => "a crossing run would not be a word",
            Rejection::Detached => "the word does not touch the grid",
            Rejection::NothingNew => "the word would not write any new cell",
        };
        f.write_str(reason)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (top_left, bottom_right) = match self.bounds() {
            None => return Ok(()),
            Some(bounds) => bounds,
        };

        for row in top_left.row..=bottom_right.row {
            for col in top_left.col..=bottom_right.col {
                match self.get(Position::new(row, col)) {
                    None => f.write_char('.')?,
                    Some(letter) => f.write_char(letter.as_char())?,
                }
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    fn dictionary() -> Dictionary {
        Dictionary::build(vec![
            "CAT", "CATS", "COLA", "AS", "AT", "TA", "TAR", "OAT", "SO",
        ])
        .unwrap()
    }

    fn place(grid: &mut Grid, dictionary: &Dictionary, word: &str, start: Position, direction: Direction) -> Hand {
        let word = Word::try_from(word).unwrap();
        let placement = grid.can_place(&word, start, direction, dictionary).unwrap();
        grid.place(placement)
    }

    #[test]
    fn place_and_cross() {
        let dictionary = dictionary();
        let mut grid = Grid::new();

        let used = place(&mut grid, &dictionary, "CAT", Position::ORIGIN, Direction::Horizontal);
        assert_eq!(used, "ACT".parse().unwrap());
        assert_eq!(grid.to_string(), "CAT\n");

        // COLA crosses CAT at the shared C; only O, L, A are drawn from the hand
        let used = place(&mut grid, &dictionary, "COLA", Position::ORIGIN, Direction::Vertical);
        assert_eq!(used, "ALO".parse().unwrap());
        assert_eq!(grid.to_string(), "CAT\nO..\nL..\nA..\n");

        assert_eq!(grid.letter_count(), 6);
        assert_eq!(grid.word_count(), 2);
        assert!(grid.is_connected());
    }

    #[test]
    fn rejections() {
        let dictionary = dictionary();
        let mut grid = Grid::new();
        place(&mut grid, &dictionary, "CAT", Position::ORIGIN, Direction::Horizontal);
        place(&mut grid, &dictionary, "COLA", Position::ORIGIN, Direction::Vertical);

        let check = |word: &str, start, direction| {
            let word = Word::try_from(word).unwrap();
            grid.can_place(&word, start, direction, &dictionary)
                .unwrap_err()
        };

        // TAR would need the cell holding A to hold T
        assert_eq!(
            check("TAR", Position::new(0, 1), Direction::Vertical),
            Rejection::Conflict
        );
        // OAT ends right before the C, extending the horizontal run
        assert_eq!(
            check("OAT", Position::new(0, -3), Direction::Horizontal),
            Rejection::BlockedEnd
        );
        // AS would hang an S beside COLA's O, forming the crossing non-word OS
        assert_eq!(
            check("AS", Position::new(0, 1), Direction::Vertical),
            Rejection::CrossWord
        );
        // A word floating away from the grid
        assert_eq!(
            check("TA", Position::new(5, 5), Direction::Horizontal),
            Rejection::Detached
        );
        // Re-placing CAT on top of itself writes nothing
        assert_eq!(
            check("CAT", Position::ORIGIN, Direction::Horizontal),
            Rejection::NothingNew
        );
        // SO is fine, SO backwards is not a word
        assert_eq!(
            check("OS", Position::new(0, 9), Direction::Horizontal),
            Rejection::NotAWord
        );
    }

    #[test]
    fn undo_restores_previous_state() {
        let dictionary = dictionary();
        let mut grid = Grid::new();

        place(&mut grid, &dictionary, "CAT", Position::ORIGIN, Direction::Horizontal);
        let before = grid.to_string();
        let before_tiles = grid.tiles_used();

        place(&mut grid, &dictionary, "COLA", Position::ORIGIN, Direction::Vertical);
        place(&mut grid, &dictionary, "TA", Position::new(0, 2), Direction::Vertical);

        let removed = grid.undo().unwrap();
        assert_eq!(removed.word, Word::try_from("TA").unwrap());
        let removed = grid.undo().unwrap();
        assert_eq!(removed.word, Word::try_from("COLA").unwrap());

        // The shared C cell must survive the undo of COLA
        assert_eq!(grid.to_string(), before);
        assert_eq!(grid.tiles_used(), before_tiles);
        assert_eq!(grid.word_count(), 1);

        grid.undo().unwrap();
        assert!(grid.is_empty());
        assert!(grid.undo().is_none());
        assert_eq!(grid.to_string(), "");
    }

    #[test]
    fn anchors() {
        let dictionary = dictionary();
        let mut grid = Grid::new();
        assert_eq!(grid.anchors(), vec![Position::ORIGIN]);

        place(&mut grid, &dictionary, "AT", Position::ORIGIN, Direction::Horizontal);
        assert_eq!(
            grid.anchors(),
            vec![
                Position::new(-1, 0),
                Position::new(-1, 1),
                Position::new(0, -1),
                Position::new(0, 2),
                Position::new(1, 0),
                Position::new(1, 1),
            ]
        );
    }

    #[test]
    fn runs() {
        let dictionary = dictionary();
        let mut grid = Grid::new();
        place(&mut grid, &dictionary, "CAT", Position::ORIGIN, Direction::Horizontal);
        place(&mut grid, &dictionary, "COLA", Position::ORIGIN, Direction::Vertical);

        let runs = grid
            .runs()
            .iter()
            .map(|word| word.to_string())
            .collect::<Vec<_>>();
        assert_eq!(runs, ["CAT", "COLA"]);
    }

    #[test]
    fn replay_round_trip() {
        let dictionary = dictionary();
        let mut grid = Grid::new();
        place(&mut grid, &dictionary, "CAT", Position::ORIGIN, Direction::Horizontal);
        place(&mut grid, &dictionary, "COLA", Position::ORIGIN, Direction::Vertical);

        let words: Vec<PlacedWord> = grid.placed_words().cloned().collect();
        let replayed = Grid::replay(&words, &dictionary).unwrap();
        assert_eq!(replayed.to_string(), grid.to_string());

        // Tampered input: the second word no longer touches the first
        let mut words = words;
        words[1].start = Position::new(10, 10);
        assert!(Grid::replay(&words, &dictionary).is_err());
    }
}
