use hict::libs::atu::{reduce, Atu, Direction};
use hict::libs::block::{BlockLocation, DenseTile};
use hict::libs::matrix::{ChunkedMatrix, OpenOptions};
use hict::libs::store::DirStore;
use hict::HictError;
use tempfile::TempDir;

mod common;

fn open(temp: &TempDir, tile_size: usize) -> anyhow::Result<ChunkedMatrix<DirStore>> {
    common::create_matrix(temp.path())?;
    let store = DirStore::open(temp.path())?;
    Ok(ChunkedMatrix::open(
        store,
        OpenOptions::new().tile_size(tile_size),
    )?)
}

#[test]
fn test_open_dir() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let matrix = open(&temp, 4)?;

    // "attributes" is not a resolution
    assert_eq!(matrix.list_resolutions(), vec![1000, 5000]);
    assert_eq!(matrix.stripes_per_axis(1000)?, 4);
    assert_eq!(matrix.stripes_per_axis(5000)?, 2);
    assert_eq!(matrix.layout(5000)?.matrix_size_bins, 7);

    Ok(())
}

#[test]
fn test_empty_block() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let matrix = open(&temp, 256)?;

    let location = matrix.locate(2, 3, 1000)?;
    assert_eq!(location.length(), 0);

    let tile = matrix.get_tile(2, 3, 1000)?;
    assert_eq!(tile.shape(), (256, 256));
    assert_eq!(tile, DenseTile::zeros(256, 256));

    Ok(())
}

#[test]
fn test_sparse_diagonal_block() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let matrix = open(&temp, 4)?;

    let tile = matrix.get_tile(0, 0, 1000)?;
    let mut expected = DenseTile::zeros(4, 4);
    expected[(0, 0)] = 5;
    expected[(1, 2)] = 3;
    expected[(2, 1)] = 3;
    assert_eq!(tile, expected);

    for i in 0..4 {
        for j in 0..4 {
            assert_eq!(tile[(i, j)], tile[(j, i)]);
        }
    }

    Ok(())
}

#[test]
fn test_sparse_block() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let matrix = open(&temp, 4)?;

    let tile = matrix.get_tile(0, 1, 1000)?;
    assert_eq!(tile[(3, 0)], 7);
    assert_eq!(tile[(0, 3)], 0);

    let tile = matrix.get_tile(1, 0, 5000)?;
    assert_eq!(tile[(2, 2)], 11);
    assert_eq!(tile.iter().sum::<i64>(), 11);

    Ok(())
}

#[test]
fn test_dense_block_slot() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let matrix = open(&temp, 4)?;

    let location = matrix.locate(1, 1, 1000)?;
    assert_eq!(location, BlockLocation::new(16, -3));
    assert_eq!(location.dense_slot(), Some(2));

    // slot 2, not 3
    let tile = matrix.get_tile(1, 1, 1000)?;
    assert_eq!(tile[(0, 0)], 200);
    assert_eq!(tile[(0, 1)], 201);
    assert_eq!(tile[(1, 0)], 204);
    assert_eq!(tile[(3, 3)], 215);

    Ok(())
}

#[test]
fn test_dense_block_wrong_side() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let matrix = open(&temp, 8)?;

    let res = matrix.get_tile(1, 1, 1000);
    assert!(matches!(res, Err(HictError::MalformedBlock { .. })));

    Ok(())
}

#[test]
fn test_query_errors() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let matrix = open(&temp, 4)?;

    assert!(matches!(
        matrix.get_tile(0, 0, 2000),
        Err(HictError::UnknownResolution { resolution: 2000 })
    ));
    // 4 stripes at 1000, 2 at 5000
    assert!(matrix.get_tile(3, 3, 1000).is_ok());
    assert!(matches!(
        matrix.get_tile(3, 3, 5000),
        Err(HictError::CoordinateOutOfRange { stripes: 2, .. })
    ));

    Ok(())
}

#[test]
fn test_missing_datasets() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    common::create_matrix(temp.path())?;
    std::fs::remove_file(
        temp.path()
            .join("resolutions/1000/treap_coo/block_offset"),
    )?;

    let matrix = ChunkedMatrix::open(DirStore::open(temp.path())?, OpenOptions::new().tile_size(4))?;
    // empty blocks never touch the offset table
    assert!(matrix.get_tile(2, 3, 1000).is_ok());
    assert!(matches!(
        matrix.get_tile(0, 0, 1000),
        Err(HictError::DatasetUnavailable { .. })
    ));

    Ok(())
}

#[test]
fn test_repeated_queries() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let matrix = open(&temp, 4)?;

    let coords: Vec<(u64, u64)> = (0..4).flat_map(|r| (0..4).map(move |c| (r, c))).collect();
    let first = matrix.get_tiles(&coords, 1000)?;
    let second = matrix.get_tiles(&coords, 1000)?;
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn test_reduce_order() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let matrix = open(&temp, 4)?;

    let atus = vec![
        Atu::new(1, 0, 5, Direction::Forward)?,
        Atu::new(1, 5, 10, Direction::Forward)?,
        Atu::new(2, 0, 3, Direction::Forward)?,
    ];
    let expected = vec![
        Atu::new(1, 0, 10, Direction::Forward)?,
        Atu::new(2, 0, 3, Direction::Forward)?,
    ];
    assert_eq!(matrix.reduce_assembly_order(&atus), expected);
    assert_eq!(reduce(&expected), expected);

    Ok(())
}
