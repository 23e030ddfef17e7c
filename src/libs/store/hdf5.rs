use crate::libs::error::{HictError, Result};
use crate::libs::store::BlockStore;
use hdf5_metno::File;
use ndarray::s;
use std::path::{Path, PathBuf};

/// Datasets of an HDF5 container, read through `hdf5-metno`.
///
/// The file is opened read-only inside every call and closed when the
/// handle drops, on success and error paths alike.
#[derive(Debug, Clone)]
pub struct Hdf5Store {
    path: PathBuf,
}

impl Hdf5Store {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        // Fail early on files that are not HDF5 at all
        File::open(&path)
            .map_err(|e| HictError::unavailable(path.display().to_string(), e.to_string()))?;
        Ok(Self { path })
    }

    fn file(&self) -> Result<File> {
        File::open(&self.path)
            .map_err(|e| HictError::unavailable(self.path.display().to_string(), e.to_string()))
    }

    fn dataset(&self, file: &File, path: &str) -> Result<hdf5_metno::Dataset> {
        file.dataset(path)
            .map_err(|e| HictError::unavailable(path, e.to_string()))
    }
}

impl BlockStore for Hdf5Store {
    fn group_members(&self, path: &str) -> Result<Vec<String>> {
        let file = self.file()?;
        let group = file
            .group(path)
            .map_err(|e| HictError::unavailable(path, e.to_string()))?;
        let mut members = group
            .member_names()
            .map_err(|e| HictError::unavailable(path, e.to_string()))?;
        members.sort();
        Ok(members)
    }

    fn exists(&self, path: &str) -> bool {
        match self.file() {
            Ok(file) => file.dataset(path).is_ok(),
            Err(_) => false,
        }
    }

    fn shape(&self, path: &str) -> Result<Vec<usize>> {
        let file = self.file()?;
        Ok(self.dataset(&file, path)?.shape())
    }

    fn read_range(&self, path: &str, offset: u64, count: usize) -> Result<Vec<i64>> {
        let file = self.file()?;
        let dataset = self.dataset(&file, path)?;
        let shape = dataset.shape();
        if shape.len() != 1 {
            return Err(HictError::unavailable(
                path,
                format!("expected a 1-D dataset, found shape {:?}", shape),
            ));
        }

        let start = (offset as usize).min(shape[0]);
        let end = start.saturating_add(count).min(shape[0]);
        if start == end {
            return Ok(Vec::new());
        }
        let values = dataset
            .read_slice_1d::<i64, _>(s![start..end])
            .map_err(|e| HictError::unavailable(path, e.to_string()))?;
        Ok(values.to_vec())
    }

    fn read_slab(&self, path: &str, index: u64) -> Result<Vec<i64>> {
        let file = self.file()?;
        let dataset = self.dataset(&file, path)?;
        let shape = dataset.shape();
        if shape.len() != 3 {
            return Err(HictError::unavailable(
                path,
                format!("expected a 3-D dataset, found shape {:?}", shape),
            ));
        }

        let slots = shape[0] as u64;
        if index >= slots {
            return Err(HictError::SlotOutOfRange { slot: index, slots });
        }
        let slab = dataset
            .read_slice_2d::<i64, _>(s![index as usize, .., ..])
            .map_err(|e| HictError::unavailable(path, e.to_string()))?;
        Ok(slab.iter().copied().collect())
    }
}
