use crate::models::hand::Hand;
use crate::models::letter::Letter;
use rand::Rng;

/// How many of each tile a fresh bag holds, from A to Z. The counts sum to 144.
pub const TILE_FREQUENCIES: [u8; 26] = [
    13, 3, 3, 6, 18, 3, 4, 3, 12, 2, 2, 5, 3, 8, 11, 3, 2, 9, 6, 9, 6, 3, 3, 2, 3, 2,
];

/// The bag of tiles not yet drawn into any hand
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Pool {
    tiles: Hand,
}

impl Pool {
    /// A full bag with the standard distribution
    pub fn full() -> Self {
        let mut tiles = Hand::new();
        for (index, &count) in TILE_FREQUENCIES.iter().enumerate() {
            tiles.add_n(Letter::from_index(index), count);
        }
        Pool { tiles }
    }

    pub fn tiles(&self) -> &Hand {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Draw up to `n` tiles, each one picked uniformly among the tiles still in the bag
    pub fn draw<R: Rng>(&mut self, n: usize, rng: &mut R) -> Vec<Letter> {
        let mut drawn = Vec::with_capacity(n);
        for _ in 0..n {
            match self.draw_one(rng) {
                Some(letter) => drawn.push(letter),
                None => break,
            }
        }
        drawn
    }

    /// Return one tile to the bag, then draw `draw_n` fresh ones
    pub fn swap<R: Rng>(&mut self, returned: Letter, draw_n: usize, rng: &mut R) -> Vec<Letter> {
        self.tiles.add(returned);
        self.draw(draw_n, rng)
    }

    fn draw_one<R: Rng>(&mut self, rng: &mut R) -> Option<Letter> {
        let total = self.tiles.len();
        if total == 0 {
            return None;
        }

        let mut pick = rng.gen_range(0..total);
        let mut drawn = None;
        for (letter, count) in self.tiles.counts() {
            let count = count as usize;
            if pick < count {
                drawn = Some(letter);
                break;
            }
            pick -= count;
        }

        // pick < total, so the walk always lands on a letter
        let letter = drawn?;
        self.tiles.remove(letter);
        Some(letter)
    }
}
