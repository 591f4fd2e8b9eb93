//! The flat list of symmetry-expanded moves plus its offset index (spec
//! §4.3's "Indexing").

use std::collections::BTreeMap;

use super::symmetry::{self, ConcreteMove};
use super::template::MoveTemplate;

/// All concrete moves available to a search, plus a `final_offset → indices`
/// index. `BTreeMap`, not `HashMap`: per spec §5, nothing in this crate may
/// rely on hash-map iteration order for move enumeration.
#[derive(Debug)]
pub struct MoveCatalog {
    moves: Vec<ConcreteMove>,
    by_final_offset: BTreeMap<Vec<i32>, Vec<usize>>,
    max_distance: i32,
}

impl MoveCatalog {
    pub fn from_templates(templates: &[MoveTemplate]) -> Self {
        let mut moves = Vec::new();
        for template in templates {
            moves.extend(symmetry::expand(template));
        }

        let mut by_final_offset: BTreeMap<Vec<i32>, Vec<usize>> = BTreeMap::new();
        let mut max_distance = 0;
        for (idx, mv) in moves.iter().enumerate() {
            by_final_offset.entry(mv.final_offset.clone()).or_default().push(idx);
            max_distance = max_distance.max(chebyshev_extent(mv));
        }

        Self {
            moves,
            by_final_offset,
            max_distance,
        }
    }

    pub fn all(&self) -> &[ConcreteMove] {
        &self.moves
    }

    pub fn get(&self, index: usize) -> &ConcreteMove {
        &self.moves[index]
    }

    /// Indices of moves whose final offset is exactly `offset`.
    pub fn by_final_offset(&self, offset: &[i32]) -> &[usize] {
        self.by_final_offset.get(offset).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every distinct final offset any move in the catalog can produce, in
    /// sorted order.
    pub fn final_offsets(&self) -> impl Iterator<Item = &Vec<i32>> {
        self.by_final_offset.keys()
    }

    /// `max |offset|∞` over every cell and the final offset of every move;
    /// used to size lattice boundary padding.
    pub fn max_distance(&self) -> i32 {
        self.max_distance
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

fn chebyshev_extent(mv: &ConcreteMove) -> i32 {
    let from_cells = mv.cells.iter().flat_map(|(o, _)| o.iter().map(|&c| c.abs())).max().unwrap_or(0);
    let from_final = mv.final_offset.iter().map(|&c| c.abs()).max().unwrap_or(0);
    from_cells.max(from_final)
}
