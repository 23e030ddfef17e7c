use clap::*;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("info")
        .about("Resolutions and stripe grids of a matrix")
        .after_help(
            r###"
This command lists the resolutions found in a matrix container.

Output columns (tab-separated):
    resolution  stripes  matrix_size_bins  scale

* stripes: stripes per axis at this resolution
* matrix_size_bins: matrix side in bins
* scale: resolution relative to the finest one

Resolutions whose layout cannot be read show NA.

Examples:
1. List resolutions:
   hict info matrix/

2. Save the output to a file:
   hict info matrix/ -o resolutions.tsv

"###,
        )
        .arg(super::arg_store())
        .arg(super::arg_tile_size())
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let matrix = super::open_matrix(args)?;
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    let na = || "NA".to_string();
    for res in matrix.info().resolutions {
        writer.write_fmt(format_args!(
            "{}\t{}\t{}\t{}\n",
            res.resolution,
            res.stripes.map_or_else(na, |s| s.to_string()),
            res.matrix_size_bins.map_or_else(na, |s| s.to_string()),
            res.scale
        ))?;
    }

    Ok(())
}
