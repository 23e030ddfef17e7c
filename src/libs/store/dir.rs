use crate::libs::error::{HictError, Result};
use crate::libs::store::BlockStore;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

pub const DATASET_MAGIC: u32 = 0x53444348;
const DATASET_MAGIC_SWAPPED: u32 = 0x48434453;
pub const DATASET_VERSION: u32 = 1;

/// Datasets stored as individual files below a root directory.
///
/// The dataset `/resolutions/1000/treap_coo/block_length` lives at
/// `<root>/resolutions/1000/treap_coo/block_length`. Each file holds
///
/// ```text
/// u32 magic, u32 version, u32 ndim, ndim x u64 dims, i64 elements (row-major)
/// ```
///
/// in the byte order of the machine that wrote it; the magic tells which.
/// Every read opens its own file handle, so the store holds no open files.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(HictError::unavailable(
                root.display().to_string(),
                "not a directory",
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    fn open_dataset(&self, path: &str) -> Result<DatasetReader<BufReader<File>>> {
        let file = File::open(self.file_path(path))
            .map_err(|e| HictError::unavailable(path, e.to_string()))?;
        DatasetReader::new(BufReader::new(file), path)
    }
}

impl BlockStore for DirStore {
    fn group_members(&self, path: &str) -> Result<Vec<String>> {
        let dir = self.file_path(path);
        let entries =
            std::fs::read_dir(&dir).map_err(|e| HictError::unavailable(path, e.to_string()))?;

        let mut members = Vec::new();
        for entry in entries {
            let entry = entry?;
            members.push(entry.file_name().to_string_lossy().into_owned());
        }
        members.sort();
        Ok(members)
    }

    fn exists(&self, path: &str) -> bool {
        self.file_path(path).is_file()
    }

    fn shape(&self, path: &str) -> Result<Vec<usize>> {
        Ok(self.open_dataset(path)?.shape)
    }

    fn read_range(&self, path: &str, offset: u64, count: usize) -> Result<Vec<i64>> {
        self.open_dataset(path)?.read_range(offset, count)
    }

    fn read_slab(&self, path: &str, index: u64) -> Result<Vec<i64>> {
        self.open_dataset(path)?.read_slab(index)
    }
}

/// Header-parsed view over one dataset file
#[derive(Debug)]
pub struct DatasetReader<R> {
    reader: R,
    path: String,
    pub shape: Vec<usize>,
    is_swapped: bool,
    data_start: u64,
}

impl<R: Read + Seek> DatasetReader<R> {
    pub fn new(mut reader: R, path: &str) -> Result<Self> {
        let header_err = |e: std::io::Error| HictError::unavailable(path, e.to_string());

        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf).map_err(header_err)?;
        let magic = u32::from_ne_bytes(buf);

        let is_swapped = if magic == DATASET_MAGIC {
            false
        } else if magic == DATASET_MAGIC_SWAPPED {
            true
        } else {
            return Err(HictError::unavailable(
                path,
                format!("not a dataset file (magic: {:x})", magic),
            ));
        };

        let version = read_u32(&mut reader, is_swapped).map_err(header_err)?;
        if version != DATASET_VERSION {
            return Err(HictError::unavailable(
                path,
                format!(
                    "unsupported dataset version: {} (only version 1 is supported)",
                    version
                ),
            ));
        }

        let ndim = read_u32(&mut reader, is_swapped).map_err(header_err)? as usize;
        let mut shape = Vec::with_capacity(ndim);
        for _ in 0..ndim {
            shape.push(read_u64(&mut reader, is_swapped).map_err(header_err)? as usize);
        }

        let data_start = reader.stream_position()?;

        Ok(Self {
            reader,
            path: path.to_string(),
            shape,
            is_swapped,
            data_start,
        })
    }

    pub fn read_range(&mut self, offset: u64, count: usize) -> Result<Vec<i64>> {
        if self.shape.len() != 1 {
            return Err(HictError::unavailable(
                &self.path,
                format!("expected a 1-D dataset, found shape {:?}", self.shape),
            ));
        }

        let len = self.shape[0] as u64;
        let start = offset.min(len);
        let available = (len - start).min(count as u64) as usize;
        self.read_elements(start, available)
    }

    pub fn read_slab(&mut self, index: u64) -> Result<Vec<i64>> {
        if self.shape.len() != 3 {
            return Err(HictError::unavailable(
                &self.path,
                format!("expected a 3-D dataset, found shape {:?}", self.shape),
            ));
        }

        let slots = self.shape[0] as u64;
        if index >= slots {
            return Err(HictError::SlotOutOfRange { slot: index, slots });
        }

        let slab = self.shape[1] * self.shape[2];
        let elements = self.read_elements(index * slab as u64, slab)?;
        if elements.len() != slab {
            return Err(HictError::ShortRead {
                path: self.path.clone(),
                expected: slab,
                actual: elements.len(),
            });
        }
        Ok(elements)
    }

    // A truncated file yields fewer elements rather than an error
    fn read_elements(&mut self, start: u64, count: usize) -> Result<Vec<i64>> {
        self.reader
            .seek(SeekFrom::Start(self.data_start + start * 8))?;

        let mut bytes = Vec::with_capacity(count * 8);
        (&mut self.reader)
            .take(count as u64 * 8)
            .read_to_end(&mut bytes)?;

        let elements = bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(chunk);
                let val = i64::from_ne_bytes(buf);
                if self.is_swapped {
                    val.swap_bytes()
                } else {
                    val
                }
            })
            .collect();
        Ok(elements)
    }
}

fn read_u32<R: Read>(reader: &mut R, is_swapped: bool) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    let val = u32::from_ne_bytes(buf);
    if is_swapped {
        Ok(val.swap_bytes())
    } else {
        Ok(val)
    }
}

fn read_u64<R: Read>(reader: &mut R, is_swapped: bool) -> std::io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    let val = u64::from_ne_bytes(buf);
    if is_swapped {
        Ok(val.swap_bytes())
    } else {
        Ok(val)
    }
}
