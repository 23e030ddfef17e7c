//! Locating and decoding the stored blocks of one resolution.
//!
//! Blocks tile the matrix as a square grid of stripes. For block `(row, col)`
//! the linear index `row * stripes + col` selects one entry of the length and
//! offset tables. The sign of the offset tells how the block was written:
//!
//! * `offset >= 0` - sparse, `length` triplets starting at `offset` in the
//!   row/column/value arrays.
//! * `offset < 0` - dense, slot `-(offset + 1)` of the `[slots, N, N]` array.
//!
//! A block with `length == 0` has no stored data and decodes to zeros.

use crate::libs::error::{HictError, Result};
use crate::libs::store::{self, BlockStore};
use nalgebra::DMatrix;

/// `N x N` matrix of contact counts
pub type DenseTile = DMatrix<i64>;

/// Where the payload of a block lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLocation {
    length: u64,
    offset: i64,
}

impl BlockLocation {
    pub fn new(length: u64, offset: i64) -> Self {
        Self { length, offset }
    }

    /// A block with nothing stored
    pub fn empty() -> Self {
        Self::new(0, 0)
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn is_sparse(&self) -> bool {
        !self.is_empty() && self.offset >= 0
    }

    /// Slot in the dense-block array, if the block is stored densely
    pub fn dense_slot(&self) -> Option<u64> {
        if self.is_empty() || self.offset >= 0 {
            None
        } else {
            Some(-(self.offset + 1) as u64)
        }
    }
}

/// Row, column and value arrays of one sparse block, local to the tile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseTriplets {
    pub rows: Vec<i64>,
    pub cols: Vec<i64>,
    pub values: Vec<i64>,
}

impl SparseTriplets {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Expand into a dense `side x side` tile.
    ///
    /// Values at repeated coordinates are summed. For diagonal blocks only one
    /// triangle is stored, so every off-diagonal entry is mirrored.
    pub fn to_dense(&self, side: usize, is_diagonal: bool) -> Result<DenseTile> {
        let mut tile = DenseTile::zeros(side, side);

        for ((&r, &c), &v) in self.rows.iter().zip(&self.cols).zip(&self.values) {
            if r < 0 || c < 0 || r as usize >= side || c as usize >= side {
                return Err(HictError::malformed(format!(
                    "triplet ({}, {}) outside a {}x{} tile",
                    r, c, side, side
                )));
            }
            let (r, c) = (r as usize, c as usize);
            add_count(&mut tile, r, c, v)?;
            if is_diagonal && r != c {
                add_count(&mut tile, c, r, v)?;
            }
        }

        Ok(tile)
    }
}

fn add_count(tile: &mut DenseTile, r: usize, c: usize, v: i64) -> Result<()> {
    let current = tile[(r, c)];
    tile[(r, c)] = current.checked_add(v).ok_or_else(|| {
        HictError::malformed(format!(
            "count at ({}, {}) overflows: {} + {}",
            r, c, current, v
        ))
    })?;
    Ok(())
}

/// Find the length/offset pair of block `(row, col)`.
///
/// `stripes` is the stripe count per axis at this resolution. The offset table
/// is only read for blocks that have data.
pub fn locate<S: BlockStore + ?Sized>(
    store: &S,
    resolution: u64,
    stripes: u64,
    row: u64,
    col: u64,
) -> Result<BlockLocation> {
    if row >= stripes || col >= stripes {
        return Err(HictError::CoordinateOutOfRange {
            row,
            col,
            resolution,
            stripes,
        });
    }

    let block_index = row * stripes + col;

    let length = read_one(store, &store::block_length_path(resolution), block_index)?;
    if length == 0 {
        return Ok(BlockLocation::empty());
    }
    if length < 0 {
        return Err(HictError::malformed(format!(
            "block {} at resolution {} has negative length {}",
            block_index, resolution, length
        )));
    }

    let offset = read_one(store, &store::block_offset_path(resolution), block_index)?;

    Ok(BlockLocation::new(length as u64, offset))
}

/// Materialise the tile described by `location`.
pub fn decode<S: BlockStore + ?Sized>(
    store: &S,
    location: BlockLocation,
    resolution: u64,
    is_diagonal: bool,
    side: usize,
) -> Result<DenseTile> {
    if location.is_empty() {
        return Ok(DenseTile::zeros(side, side));
    }

    match location.dense_slot() {
        None => {
            let triplets = read_triplets(store, location, resolution)?;
            triplets.to_dense(side, is_diagonal)
        }
        Some(slot) => read_dense(store, slot, resolution, side),
    }
}

/// Read the three parallel arrays of a sparse block
pub fn read_triplets<S: BlockStore + ?Sized>(
    store: &S,
    location: BlockLocation,
    resolution: u64,
) -> Result<SparseTriplets> {
    let offset = location.offset().max(0) as u64;
    let length = location.length() as usize;

    let rows = read_exact(store, &store::block_rows_path(resolution), offset, length)?;
    let cols = read_exact(store, &store::block_cols_path(resolution), offset, length)?;
    let values = read_exact(store, &store::block_values_path(resolution), offset, length)?;

    Ok(SparseTriplets { rows, cols, values })
}

fn read_dense<S: BlockStore + ?Sized>(
    store: &S,
    slot: u64,
    resolution: u64,
    side: usize,
) -> Result<DenseTile> {
    let path = store::dense_blocks_path(resolution);
    let shape = store.shape(&path)?;
    if shape.len() != 3 {
        return Err(HictError::malformed(format!(
            "dense blocks at resolution {} have shape {:?}, expected [slots, {}, {}]",
            resolution, shape, side, side
        )));
    }

    let slots = shape[0] as u64;
    if slot >= slots {
        return Err(HictError::SlotOutOfRange { slot, slots });
    }
    if shape[1] != side || shape[2] != side {
        return Err(HictError::malformed(format!(
            "dense blocks at resolution {} are {}x{}, expected {}x{}",
            resolution, shape[1], shape[2], side, side
        )));
    }

    let slab = store.read_slab(&path, slot)?;
    if slab.len() != side * side {
        return Err(HictError::ShortRead {
            path,
            expected: side * side,
            actual: slab.len(),
        });
    }

    Ok(DenseTile::from_row_slice(side, side, &slab))
}

fn read_one<S: BlockStore + ?Sized>(store: &S, path: &str, index: u64) -> Result<i64> {
    let values = read_exact(store, path, index, 1)?;
    Ok(values[0])
}

fn read_exact<S: BlockStore + ?Sized>(
    store: &S,
    path: &str,
    offset: u64,
    count: usize,
) -> Result<Vec<i64>> {
    let values = store.read_range(path, offset, count)?;
    if values.len() != count {
        return Err(HictError::ShortRead {
            path: path.to_string(),
            expected: count,
            actual: values.len(),
        });
    }
    Ok(values)
}
