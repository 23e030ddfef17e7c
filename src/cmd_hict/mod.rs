//! Subcommand modules for the `hict` binary.

pub mod info;
pub mod reduce;
pub mod tile;

use clap::{Arg, ArgMatches};
use hict::libs::matrix::{ChunkedMatrix, OpenOptions};
use hict::libs::store::{BlockStore, DirStore};
use std::path::Path;

pub fn arg_store() -> Arg {
    Arg::new("store")
        .required(true)
        .index(1)
        .help("Matrix container: a dataset directory or an HDF5 file")
}

pub fn arg_tile_size() -> Arg {
    Arg::new("tile_size")
        .long("tile-size")
        .num_args(1)
        .default_value("256")
        .value_parser(clap::value_parser!(usize))
        .help("Side length of dense tiles")
}

pub fn arg_outfile() -> Arg {
    Arg::new("outfile")
        .long("outfile")
        .short('o')
        .num_args(1)
        .default_value("stdout")
        .help("Output filename. [stdout] for screen")
}

/// Open the matrix named by the `store` and `tile_size` arguments
pub fn open_matrix(args: &ArgMatches) -> anyhow::Result<ChunkedMatrix<Box<dyn BlockStore>>> {
    let path = Path::new(args.get_one::<String>("store").unwrap());
    let tile_size = *args.get_one::<usize>("tile_size").unwrap();

    let store: Box<dyn BlockStore> = if path.is_dir() {
        Box::new(DirStore::open(path)?)
    } else {
        open_file_store(path)?
    };

    Ok(ChunkedMatrix::open(
        store,
        OpenOptions::new().tile_size(tile_size),
    )?)
}

#[cfg(feature = "hdf5")]
fn open_file_store(path: &Path) -> anyhow::Result<Box<dyn BlockStore>> {
    Ok(Box::new(hict::libs::store::Hdf5Store::open(path)?))
}

#[cfg(not(feature = "hdf5"))]
fn open_file_store(path: &Path) -> anyhow::Result<Box<dyn BlockStore>> {
    Err(anyhow::anyhow!(
        "{} is not a dataset directory (HDF5 files need the `hdf5` feature)",
        path.display()
    ))
}
