#![allow(dead_code)]

use std::fs;
use std::path::Path;

const DATASET_MAGIC: u32 = 0x53444348;

/// Write one dataset file in native byte order
pub fn write_dataset(root: &Path, path: &str, shape: &[u64], data: &[i64]) -> anyhow::Result<()> {
    let file = root.join(path.trim_start_matches('/'));
    fs::create_dir_all(file.parent().unwrap())?;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&DATASET_MAGIC.to_ne_bytes());
    bytes.extend_from_slice(&1u32.to_ne_bytes());
    bytes.extend_from_slice(&(shape.len() as u32).to_ne_bytes());
    for d in shape {
        bytes.extend_from_slice(&d.to_ne_bytes());
    }
    for v in data {
        bytes.extend_from_slice(&v.to_ne_bytes());
    }
    fs::write(file, bytes)?;
    Ok(())
}

fn write_array(root: &Path, path: &str, data: &[i64]) -> anyhow::Result<()> {
    write_dataset(root, path, &[data.len() as u64], data)
}

/// A two-resolution matrix with tile size 4.
///
/// Resolution 1000, 4x4 stripes, no stripe metadata:
/// * (0, 0) sparse diagonal: (0,0,5) (1,2,3)
/// * (0, 1) sparse: (3,0,7)
/// * (1, 1) dense, offset -3, slot 2 holds 200..216
/// * (2, 3) empty with a junk offset
///
/// Resolution 5000, stripes of 4 and 3 bins:
/// * (1, 0) sparse: (2,2,11)
pub fn create_matrix(root: &Path) -> anyhow::Result<()> {
    let mut lengths = vec![0i64; 16];
    let mut offsets = vec![0i64; 16];
    lengths[0] = 2;
    offsets[0] = 0;
    lengths[1] = 1;
    offsets[1] = 2;
    lengths[5] = 16;
    offsets[5] = -3;
    offsets[11] = -1;

    write_array(root, "/resolutions/1000/treap_coo/block_length", &lengths)?;
    write_array(root, "/resolutions/1000/treap_coo/block_offset", &offsets)?;
    write_array(root, "/resolutions/1000/treap_coo/block_rows", &[0, 1, 3])?;
    write_array(root, "/resolutions/1000/treap_coo/block_cols", &[0, 2, 0])?;
    write_array(root, "/resolutions/1000/treap_coo/block_vals", &[5, 3, 7])?;

    let dense: Vec<i64> = (0..3)
        .flat_map(|slot| (0..16).map(move |i| slot * 100 + i))
        .collect();
    write_dataset(
        root,
        "/resolutions/1000/treap_coo/dense_blocks",
        &[3, 4, 4],
        &dense,
    )?;

    write_array(root, "/resolutions/5000/treap_coo/block_length", &[0, 0, 1, 0])?;
    write_array(root, "/resolutions/5000/treap_coo/block_offset", &[0, 0, 0, 0])?;
    write_array(root, "/resolutions/5000/treap_coo/block_rows", &[2])?;
    write_array(root, "/resolutions/5000/treap_coo/block_cols", &[2])?;
    write_array(root, "/resolutions/5000/treap_coo/block_vals", &[11])?;
    write_array(root, "/resolutions/5000/stripes/stripe_length_bins", &[4, 3])?;

    write_array(root, "/resolutions/attributes/version", &[1])?;

    Ok(())
}
