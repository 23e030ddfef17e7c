use crate::libs::error::{HictError, Result};
use indexmap::IndexSet;

/// Ordered set of resolutions (bin sizes) with a dense ordinal for each.
///
/// Built once when a matrix is opened; lookups afterwards are read-only.
#[derive(Debug, Clone, Default)]
pub struct ResolutionIndex {
    resolutions: IndexSet<u64>,
}

impl ResolutionIndex {
    /// Build the index in discovery order.
    ///
    /// ```
    /// use hict::libs::resolution::ResolutionIndex;
    /// let index = ResolutionIndex::open([10000, 1000, 100000]).unwrap();
    /// assert_eq!(index.lookup(1000).unwrap(), 1);
    /// assert!(ResolutionIndex::open([1000, 1000]).is_err());
    /// ```
    pub fn open(resolutions: impl IntoIterator<Item = u64>) -> Result<Self> {
        let mut set = IndexSet::new();
        for resolution in resolutions {
            if resolution == 0 {
                return Err(HictError::InvalidConfig {
                    message: "resolution must be a positive integer".to_string(),
                });
            }
            if !set.insert(resolution) {
                return Err(HictError::DuplicateResolution { resolution });
            }
        }

        Ok(Self { resolutions: set })
    }

    pub fn lookup(&self, resolution: u64) -> Result<usize> {
        self.resolutions
            .get_index_of(&resolution)
            .ok_or(HictError::UnknownResolution { resolution })
    }

    pub fn contains(&self, resolution: u64) -> bool {
        self.resolutions.contains(&resolution)
    }

    /// Resolutions in discovery order
    pub fn resolutions(&self) -> Vec<u64> {
        self.resolutions.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.resolutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolutions.is_empty()
    }
}
