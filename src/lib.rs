//! Random access to the tiles of multi-resolution Hi-C contact matrices, and
//! an algebra over the oriented ranges that describe the current assembly.
//!
//! * [`libs::matrix`] - Opened matrices: resolutions, tile queries.
//! * [`libs::block`] - Locating and decoding sparse or dense blocks.
//! * [`libs::store`] - Dataset stores the blocks are read from.
//! * [`libs::atu`] - Assembly tiling units and merge/reduce.
//! * [`libs::assembly`] - Order maintenance under reversals and moves.

pub mod libs;

pub use libs::atu::{Atu, Direction};
pub use libs::block::{BlockLocation, DenseTile};
pub use libs::error::{HictError, Result};
pub use libs::matrix::{ChunkedMatrix, OpenOptions};
