use crate::libs::atu::{self, Atu};
use crate::libs::block::{self, BlockLocation, DenseTile};
use crate::libs::error::{HictError, Result};
use crate::libs::resolution::ResolutionIndex;
use crate::libs::store::{self, BlockStore, RESOLUTIONS_GROUP};
use log::{debug, info, warn};
use rayon::prelude::*;

pub const DEFAULT_TILE_SIZE: usize = 256;

/// Settings applied when opening a matrix
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Side length `N` of every tile
    pub tile_size: usize,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tile_size(mut self, tile_size: usize) -> Self {
        self.tile_size = tile_size;
        self
    }
}

/// Stripe geometry of one resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub stripes: u64,
    pub matrix_size_bins: u64,
}

/// Summary of an opened matrix, one row per resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionInfo {
    pub resolution: u64,
    pub stripes: Option<u64>,
    pub matrix_size_bins: Option<u64>,
    /// Resolution relative to the finest one
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixInfo {
    pub tile_size: usize,
    pub resolutions: Vec<ResolutionInfo>,
}

/// An opened multi-resolution contact matrix.
///
/// Everything discovered at open time is immutable afterwards, so a shared
/// reference can serve any number of concurrent tile queries.
#[derive(Debug)]
pub struct ChunkedMatrix<S> {
    store: S,
    tile_size: usize,
    index: ResolutionIndex,
    /// Indexed by resolution ordinal; `None` when the layout could not be read
    layouts: Vec<Option<Layout>>,
}

impl<S: BlockStore> ChunkedMatrix<S> {
    pub fn open(store: S, options: OpenOptions) -> Result<Self> {
        if options.tile_size == 0 {
            return Err(HictError::InvalidConfig {
                message: "tile size must be positive".to_string(),
            });
        }

        let mut resolutions = Vec::new();
        for name in store.group_members(RESOLUTIONS_GROUP)? {
            match name.parse::<u64>() {
                Ok(r) if r > 0 => resolutions.push(r),
                _ => debug!("Skipping non-resolution group {}", name),
            }
        }
        let index = ResolutionIndex::open(resolutions)?;

        let mut layouts = Vec::with_capacity(index.len());
        for resolution in index.resolutions() {
            match read_layout(&store, resolution, options.tile_size) {
                Ok(layout) => {
                    debug!(
                        "Resolution {}: {} stripes, {} bins",
                        resolution, layout.stripes, layout.matrix_size_bins
                    );
                    layouts.push(Some(layout));
                }
                Err(e) => {
                    warn!("Resolution {} is unusable: {}", resolution, e);
                    layouts.push(None);
                }
            }
        }
        info!(
            "Opened matrix with {} resolutions, tile size {}",
            index.len(),
            options.tile_size
        );

        Ok(Self {
            store,
            tile_size: options.tile_size,
            index,
            layouts,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Resolutions in discovery order
    pub fn list_resolutions(&self) -> Vec<u64> {
        self.index.resolutions()
    }

    pub fn layout(&self, resolution: u64) -> Result<Layout> {
        let ordinal = self.index.lookup(resolution)?;
        self.layouts[ordinal].ok_or_else(|| {
            HictError::unavailable(
                store::block_length_path(resolution),
                "no stripe layout for this resolution",
            )
        })
    }

    pub fn stripes_per_axis(&self, resolution: u64) -> Result<u64> {
        Ok(self.layout(resolution)?.stripes)
    }

    pub fn locate(&self, row: u64, col: u64, resolution: u64) -> Result<BlockLocation> {
        let stripes = self.stripes_per_axis(resolution)?;
        block::locate(&self.store, resolution, stripes, row, col)
    }

    /// Dense tile at the intersection of row stripe `row` and column stripe `col`
    pub fn get_tile(&self, row: u64, col: u64, resolution: u64) -> Result<DenseTile> {
        let location = self.locate(row, col, resolution)?;
        block::decode(
            &self.store,
            location,
            resolution,
            row == col,
            self.tile_size,
        )
    }

    /// Several tiles of one resolution, decoded in parallel, in input order
    pub fn get_tiles(&self, coords: &[(u64, u64)], resolution: u64) -> Result<Vec<DenseTile>> {
        self.index.lookup(resolution)?;
        coords
            .par_iter()
            .map(|&(row, col)| self.get_tile(row, col, resolution))
            .collect()
    }

    pub fn reduce_assembly_order(&self, atus: &[Atu]) -> Vec<Atu> {
        atu::reduce(atus)
    }

    pub fn info(&self) -> MatrixInfo {
        let resolutions = self.index.resolutions();
        let finest = resolutions.iter().copied().min().unwrap_or(1);

        let resolutions = resolutions
            .iter()
            .zip(&self.layouts)
            .map(|(&resolution, layout)| ResolutionInfo {
                resolution,
                stripes: layout.map(|l| l.stripes),
                matrix_size_bins: layout.map(|l| l.matrix_size_bins),
                scale: resolution as f64 / finest as f64,
            })
            .collect();

        MatrixInfo {
            tile_size: self.tile_size,
            resolutions,
        }
    }
}

/// Stripe count and matrix size of one resolution.
///
/// Stripe lengths are used when the container records them; otherwise the
/// length table is taken as a square grid of blocks. Either way the length
/// table must hold exactly `stripes * stripes` entries.
fn read_layout<S: BlockStore>(store: &S, resolution: u64, tile_size: usize) -> Result<Layout> {
    let length_path = store::block_length_path(resolution);
    let shape = store.shape(&length_path)?;
    if shape.len() != 1 {
        return Err(HictError::malformed(format!(
            "block length table at resolution {} has shape {:?}",
            resolution, shape
        )));
    }
    let blocks = shape[0] as u64;

    let stripe_path = store::stripe_lengths_path(resolution);
    if store.exists(&stripe_path) {
        let shape = store.shape(&stripe_path)?;
        let stripes = shape.first().copied().unwrap_or(0);
        let lengths = store.read_range(&stripe_path, 0, stripes)?;
        if lengths.len() != stripes {
            return Err(HictError::ShortRead {
                path: stripe_path,
                expected: stripes,
                actual: lengths.len(),
            });
        }
        if let Some(bad) = lengths.iter().find(|l| **l < 0) {
            return Err(HictError::malformed(format!(
                "negative stripe length {} at resolution {}",
                bad, resolution
            )));
        }

        let stripes = stripes as u64;
        if stripes.checked_mul(stripes) != Some(blocks) {
            return Err(HictError::malformed(format!(
                "{} stripes at resolution {} need {} blocks, length table has {}",
                stripes,
                resolution,
                stripes.saturating_mul(stripes),
                blocks
            )));
        }
        return Ok(Layout {
            stripes,
            matrix_size_bins: lengths.iter().map(|l| *l as u64).sum(),
        });
    }

    let stripes = square_root(blocks);
    if stripes * stripes != blocks {
        return Err(HictError::malformed(format!(
            "{} blocks at resolution {} do not form a square grid",
            blocks, resolution
        )));
    }

    Ok(Layout {
        stripes,
        matrix_size_bins: stripes * tile_size as u64,
    })
}

// Integer square root, rounded down
fn square_root(n: u64) -> u64 {
    let mut root = (n as f64).sqrt() as u64;
    // the float estimate may be off by one either way
    while root.checked_mul(root).map_or(true, |sq| sq > n) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).map_or(false, |sq| sq <= n) {
        root += 1;
    }
    root
}
