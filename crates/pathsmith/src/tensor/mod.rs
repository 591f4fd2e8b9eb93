//! Dense N-dimensional array indexed by integer coordinate vectors (spec §4.1).
//!
//! Grounded on `pathfinder/coordtensor/CoordTensor.h` from the source system:
//! same index formula (`Σ cᵢ · axisSize^i`), same fast paths for order 2/3,
//! same optional origin offset. Unlike the source, `coords_from_index` is
//! computed on demand rather than precomputed into an `axisSize^order`-sized
//! table — that table traded memory for speed in a language without bounds
//! checks to dodge; the O(order) divmod here is cheap enough not to need it,
//! and the access pattern stays observably identical.

mod sentinel;

pub use sentinel::{FREE_SPACE, OCCUPIED_NO_ANCHOR, OUT_OF_BOUNDS};

/// Dispatch tag for the index-from-coords fast paths (Design Notes §9: a
/// sealed variant replacing the source's member-function-pointer dispatch).
#[derive(Debug, Clone)]
enum TensorShape {
    Order2,
    Order3,
    OrderN { multipliers: Vec<i64> },
}

impl TensorShape {
    fn for_order(order: usize, axis_size: i32) -> Self {
        match order {
            2 => Self::Order2,
            3 => Self::Order3,
            _ => {
                let mut multipliers = Vec::with_capacity(order);
                let mut m: i64 = 1;
                for _ in 0..order {
                    multipliers.push(m);
                    m *= i64::from(axis_size);
                }
                Self::OrderN { multipliers }
            }
        }
    }
}

/// Dense `order`-dimensional array of `T`, addressed by coordinate or by
/// linear index.
///
/// A coordinate is in-bounds iff every component lies in `[0, axis_size)`.
/// Accessing an out-of-range coordinate is a programmer error (panics) for
/// the generic `get`/`get_mut`; see [`crate::lattice::Lattice`] for the
/// sentinel-returning occupancy specialization.
#[derive(Debug, Clone)]
pub struct CoordTensor<T> {
    order: usize,
    axis_size: i32,
    shape: TensorShape,
    offset: Option<Vec<i32>>,
    data: Vec<T>,
}

impl<T: Clone> CoordTensor<T> {
    /// Build a tensor of the given `order` and `axis_size`, filled with
    /// `value`, with an optional origin offset applied to every access.
    pub fn new(order: usize, axis_size: i32, value: T, origin_offset: Option<Vec<i32>>) -> Self {
        assert!(order >= 1, "tensor order must be at least 1");
        assert!(axis_size >= 1, "axis size must be at least 1");
        let len = (axis_size as usize)
            .checked_pow(order as u32)
            .expect("tensor size overflowed usize");
        Self {
            order,
            axis_size,
            shape: TensorShape::for_order(order, axis_size),
            offset: origin_offset,
            data: vec![value; len],
        }
    }

    /// Number of coordinate components.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Length of every axis.
    pub fn axis_size(&self) -> i32 {
        self.axis_size
    }

    /// `true` iff every component of `coords` lies in `[0, axis_size)`.
    pub fn in_bounds(&self, coords: &[i32]) -> bool {
        coords.len() == self.order && coords.iter().all(|&c| c >= 0 && c < self.axis_size)
    }

    fn offset_coords(&self, coords: &[i32]) -> Vec<i32> {
        match &self.offset {
            None => coords.to_vec(),
            Some(offset) => coords.iter().zip(offset).map(|(c, o)| c + o).collect(),
        }
    }

    /// Linear index for `coords` (origin offset applied first). Coordinates
    /// need not be in bounds; the caller is responsible for bounds-checking
    /// before using the result to index the tensor.
    pub fn index_from_coords(&self, coords: &[i32]) -> i64 {
        assert_eq!(coords.len(), self.order, "coordinate arity mismatch");
        let coords = self.offset_coords(coords);
        match &self.shape {
            TensorShape::Order2 => i64::from(coords[0]) + i64::from(coords[1]) * i64::from(self.axis_size),
            TensorShape::Order3 => {
                let axis = i64::from(self.axis_size);
                i64::from(coords[0]) + i64::from(coords[1]) * axis + i64::from(coords[2]) * axis * axis
            }
            TensorShape::OrderN { multipliers } => coords
                .iter()
                .zip(multipliers)
                .map(|(&c, &m)| i64::from(c) * m)
                .sum(),
        }
    }

    /// Coordinate vector for `index` (inverse of [`Self::index_from_coords`],
    /// ignoring any origin offset — offsets apply only to forward lookups).
    pub fn coords_from_index(&self, index: i64) -> Vec<i32> {
        let axis = i64::from(self.axis_size);
        let mut rem = index;
        let mut coords = vec![0i32; self.order];
        for i in (0..self.order).rev() {
            let multiplier = match &self.shape {
                TensorShape::Order2 => {
                    if i == 1 {
                        axis
                    } else {
                        1
                    }
                }
                TensorShape::Order3 => match i {
                    2 => axis * axis,
                    1 => axis,
                    _ => 1,
                },
                TensorShape::OrderN { multipliers } => multipliers[i],
            };
            coords[i] = (rem / multiplier) as i32;
            rem %= multiplier;
        }
        coords
    }

    /// Element at `coords` (origin offset applied). Panics if `coords` is
    /// out of bounds.
    pub fn get(&self, coords: &[i32]) -> &T {
        debug_assert!(self.in_bounds(coords), "coordinate {coords:?} out of bounds");
        &self.data[self.index_from_coords(coords) as usize]
    }

    /// Mutable element at `coords`. Panics if `coords` is out of bounds.
    pub fn get_mut(&mut self, coords: &[i32]) -> &mut T {
        debug_assert!(self.in_bounds(coords), "coordinate {coords:?} out of bounds");
        let idx = self.index_from_coords(coords) as usize;
        &mut self.data[idx]
    }

    /// Element at a precomputed linear index, bypassing coordinate
    /// conversion entirely (always faster when the index is already known).
    pub fn get_by_index(&self, index: i64) -> &T {
        &self.data[index as usize]
    }

    /// Mutable element at a precomputed linear index.
    pub fn get_mut_by_index(&mut self, index: i64) -> &mut T {
        &mut self.data[index as usize]
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Replace the backing storage wholesale. `vec.len()` must equal the
    /// tensor's total element count.
    pub fn fill_from_vec(&mut self, vec: Vec<T>) {
        assert_eq!(vec.len(), self.data.len(), "fill_from_vec length mismatch");
        self.data = vec;
    }

    /// Read-only view of the backing storage, in linear-index order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: PartialEq> PartialEq for CoordTensor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}
