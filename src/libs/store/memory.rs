use crate::libs::error::{HictError, Result};
use crate::libs::store::BlockStore;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
struct Dataset {
    shape: Vec<usize>,
    data: Vec<i64>,
}

/// Datasets kept in memory, keyed by path.
///
/// Data reads are counted, which makes the read pattern of a query observable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    datasets: BTreeMap<String, Dataset>,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a dataset of any rank; `data` is row-major.
    pub fn insert(&mut self, path: &str, shape: &[usize], data: Vec<i64>) -> Result<()> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(HictError::InvalidConfig {
                message: format!(
                    "dataset {} has shape {:?} but {} elements",
                    path,
                    shape,
                    data.len()
                ),
            });
        }
        self.datasets.insert(
            path.to_string(),
            Dataset {
                shape: shape.to_vec(),
                data,
            },
        );
        Ok(())
    }

    /// Insert a 1-D dataset (builder pattern)
    pub fn with_array(mut self, path: &str, data: Vec<i64>) -> Self {
        let shape = vec![data.len()];
        self.datasets
            .insert(path.to_string(), Dataset { shape, data });
        self
    }

    /// Number of `read_range`/`read_slab` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    fn dataset(&self, path: &str) -> Result<&Dataset> {
        self.datasets
            .get(path)
            .ok_or_else(|| HictError::unavailable(path, "no such dataset"))
    }
}

impl BlockStore for MemoryStore {
    fn group_members(&self, path: &str) -> Result<Vec<String>> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let mut members: Vec<String> = Vec::new();
        for key in self.datasets.keys() {
            if let Some(rest) = key.strip_prefix(&prefix) {
                let name = rest.split('/').next().unwrap_or(rest);
                members.push(name.to_string());
            }
        }
        if members.is_empty() {
            return Err(HictError::unavailable(path, "no such group"));
        }
        members.sort();
        members.dedup();
        Ok(members)
    }

    fn exists(&self, path: &str) -> bool {
        self.datasets.contains_key(path)
    }

    fn shape(&self, path: &str) -> Result<Vec<usize>> {
        Ok(self.dataset(path)?.shape.clone())
    }

    fn read_range(&self, path: &str, offset: u64, count: usize) -> Result<Vec<i64>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let dataset = self.dataset(path)?;
        if dataset.shape.len() != 1 {
            return Err(HictError::unavailable(
                path,
                format!("expected a 1-D dataset, found shape {:?}", dataset.shape),
            ));
        }

        let len = dataset.data.len();
        let start = (offset as usize).min(len);
        let end = start.saturating_add(count).min(len);
        Ok(dataset.data[start..end].to_vec())
    }

    fn read_slab(&self, path: &str, index: u64) -> Result<Vec<i64>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let dataset = self.dataset(path)?;
        if dataset.shape.len() != 3 {
            return Err(HictError::unavailable(
                path,
                format!("expected a 3-D dataset, found shape {:?}", dataset.shape),
            ));
        }

        let slots = dataset.shape[0] as u64;
        if index >= slots {
            return Err(HictError::SlotOutOfRange { slot: index, slots });
        }
        let slab = dataset.shape[1] * dataset.shape[2];
        let start = index as usize * slab;
        Ok(dataset.data[start..start + slab].to_vec())
    }
}
