//! Read-only access to the named datasets of a chunked matrix container.
//!
//! A container groups datasets by resolution:
//!
//! ```text
//! /resolutions/<R>/treap_coo/block_length   1-D, entries per block
//! /resolutions/<R>/treap_coo/block_offset   1-D, >= 0 sparse start, < 0 dense slot
//! /resolutions/<R>/treap_coo/block_rows     1-D, sparse row in tile
//! /resolutions/<R>/treap_coo/block_cols     1-D, sparse column in tile
//! /resolutions/<R>/treap_coo/block_vals     1-D, sparse value
//! /resolutions/<R>/treap_coo/dense_blocks   3-D, [slots, N, N]
//! /resolutions/<R>/stripes/stripe_length_bins  1-D, optional
//! ```
//!
//! * [`memory`] - Datasets held in memory.
//! * [`dir`] - One binary file per dataset under a root directory.
//! * `hdf5` - HDF5 files (feature `hdf5`).

pub mod dir;
#[cfg(feature = "hdf5")]
pub mod hdf5;
pub mod memory;

pub use dir::DirStore;
#[cfg(feature = "hdf5")]
pub use self::hdf5::Hdf5Store;
pub use memory::MemoryStore;

use crate::libs::error::Result;

pub const RESOLUTIONS_GROUP: &str = "/resolutions";

/// Byte-addressable named datasets of `i64` elements.
///
/// Implementations acquire whatever handle they need inside each call and
/// release it before returning, so a store can be shared across threads.
pub trait BlockStore: Send + Sync {
    /// Names of the direct children of a group
    fn group_members(&self, path: &str) -> Result<Vec<String>>;

    fn exists(&self, path: &str) -> bool;

    fn shape(&self, path: &str) -> Result<Vec<usize>>;

    /// Up to `count` elements of a 1-D dataset starting at `offset`.
    ///
    /// Fewer elements are returned when the dataset ends early.
    fn read_range(&self, path: &str, offset: u64, count: usize) -> Result<Vec<i64>>;

    /// The `index`-th slab along the first axis of a 3-D dataset, row-major.
    fn read_slab(&self, path: &str, index: u64) -> Result<Vec<i64>>;
}

impl<T: BlockStore + ?Sized> BlockStore for Box<T> {
    fn group_members(&self, path: &str) -> Result<Vec<String>> {
        (**self).group_members(path)
    }

    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }

    fn shape(&self, path: &str) -> Result<Vec<usize>> {
        (**self).shape(path)
    }

    fn read_range(&self, path: &str, offset: u64, count: usize) -> Result<Vec<i64>> {
        (**self).read_range(path, offset, count)
    }

    fn read_slab(&self, path: &str, index: u64) -> Result<Vec<i64>> {
        (**self).read_slab(path, index)
    }
}

fn treap_coo_path(resolution: u64, name: &str) -> String {
    format!("{}/{}/treap_coo/{}", RESOLUTIONS_GROUP, resolution, name)
}

pub fn block_length_path(resolution: u64) -> String {
    treap_coo_path(resolution, "block_length")
}

pub fn block_offset_path(resolution: u64) -> String {
    treap_coo_path(resolution, "block_offset")
}

pub fn block_rows_path(resolution: u64) -> String {
    treap_coo_path(resolution, "block_rows")
}

pub fn block_cols_path(resolution: u64) -> String {
    treap_coo_path(resolution, "block_cols")
}

pub fn block_values_path(resolution: u64) -> String {
    treap_coo_path(resolution, "block_vals")
}

pub fn dense_blocks_path(resolution: u64) -> String {
    treap_coo_path(resolution, "dense_blocks")
}

pub fn stripe_lengths_path(resolution: u64) -> String {
    format!("{}/{}/stripes/stripe_length_bins", RESOLUTIONS_GROUP, resolution)
}
