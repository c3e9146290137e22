use crate::models::grid::Grid;
use crate::models::position::Position;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// Dihedral transforms of the plane as row/column coefficient matrices. The first entry is
/// the identity; the full set covers the 4 rotations and their mirror images.
const TRANSFORMS: [[i16; 4]; 8] = [
    [1, 0, 0, 1],
    [1, 0, 0, -1],
    [-1, 0, 0, 1],
    [-1, 0, 0, -1],
    [0, 1, 1, 0],
    [0, 1, -1, 0],
    [0, -1, 1, 0],
    [0, -1, -1, 0],
];

#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotOptions {
    /// Also collapse grids that are rotations or mirror images of each other. Off by
    /// default: only translations are canonicalized away.
    pub collapse_symmetries: bool,
}

/// The set of grid states already explored during one solve. Lives for a single top-level
/// solve call and is discarded afterwards.
#[derive(Debug)]
pub struct SnapshotStore {
    options: SnapshotOptions,
    seen: HashSet<u64>,
    hits: u64,
}

impl SnapshotStore {
    pub fn new(options: SnapshotOptions) -> Self {
        SnapshotStore {
            options,
            seen: HashSet::new(),
            hits: 0,
        }
    }

    /// Record the grid's canonical key. Returns `false` when an equivalent grid was
    /// already seen, meaning the caller should not recurse into it again.
    pub fn insert(&mut self, grid: &Grid) -> bool {
        if self.seen.insert(snapshot_key(grid, self.options)) {
            true
        } else {
            self.hits += 1;
            false
        }
    }

    pub fn dedup_hits(&self) -> u64 {
        self.hits
    }
}

/// Hash the set of placed words with their relative geometry. Two grids that place the
/// same words at the same offsets get the same key no matter where on the plane they sit.
pub fn snapshot_key(grid: &Grid, options: SnapshotOptions) -> u64 {
    let placements: Vec<(Position, Position, Vec<u8>)> = grid
        .placed_words()
        .map(|placed| {
            let letters = placed
                .word
                .letters()
                .iter()
                .map(|&letter| letter.index() as u8)
                .collect();
            (placed.start, placed.end(), letters)
        })
        .collect();

    let transforms: &[[i16; 4]] = if options.collapse_symmetries {
        &TRANSFORMS
    } else {
        &TRANSFORMS[..1]
    };

    let canonical = transforms
        .iter()
        .map(|&transform| canonical_form(&placements, transform))
        .min()
        .unwrap_or_default();

    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    hasher.finish()
}

/// Apply one transform to every placement, re-anchor each word in reading order, shift the
/// whole set against the top-left corner and sort it
fn canonical_form(
    placements: &[(Position, Position, Vec<u8>)],
    transform: [i16; 4],
) -> Vec<(i16, i16, bool, Vec<u8>)> {
    let apply = |pos: Position| {
        Position::new(
            transform[0] * pos.row + transform[1] * pos.col,
            transform[2] * pos.row + transform[3] * pos.col,
        )
    };

    let mut entries: Vec<(i16, i16, bool, Vec<u8>)> = placements
        .iter()
        .map(|(start, end, letters)| {
            let (start, end) = (apply(*start), apply(*end));
            // A mirrored word reads backwards: re-anchor it at the other end
            let (start, end, letters) = if start <= end {
                (start, end, letters.clone())
            } else {
                (end, start, letters.iter().rev().copied().collect())
            };
            let vertical = start.col == end.col && start.row != end.row;
            (start.row, start.col, vertical, letters)
        })
        .collect();

    let min_row = entries.iter().map(|e| e.0).min().unwrap_or(0);
    let min_col = entries.iter().map(|e| e.1).min().unwrap_or(0);
    for entry in &mut entries {
        entry.0 -= min_row;
        entry.1 -= min_col;
    }

    entries.sort();
    entries
}
