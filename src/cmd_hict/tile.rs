use clap::*;
use hict::libs::io::{write_tile, write_tile_sparse};
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("tile")
        .about("Dense tiles at stripe intersections")
        .after_help(
            r###"
This command decodes the tiles at the given (row stripe, column stripe)
intersections of one resolution.

Coordinates are 0-based stripe indices written as row,col.

Each tile starts with a header line
    #tile  row  col  resolution
followed by N tab-separated rows, or with --sparse by the nonzero
    row  col  value
entries of the tile.

Examples:
1. A diagonal tile:
   hict tile matrix/ 10000 0,0

2. Several tiles, decoded with 4 threads:
   hict tile matrix/ 10000 0,0 0,1 1,1 --parallel 4

3. Nonzero entries only:
   hict tile matrix/ 10000 2,3 --sparse

"###,
        )
        .arg(super::arg_store())
        .arg(
            Arg::new("resolution")
                .required(true)
                .index(2)
                .value_parser(value_parser!(u64))
                .help("Resolution (bin size)"),
        )
        .arg(
            Arg::new("coords")
                .required(true)
                .index(3)
                .num_args(1..)
                .help("Stripe intersections, as row,col"),
        )
        .arg(
            Arg::new("sparse")
                .long("sparse")
                .action(ArgAction::SetTrue)
                .help("Output nonzero entries only"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .value_parser(value_parser!(usize))
                .num_args(1)
                .default_value("1")
                .help("Number of threads"),
        )
        .arg(super::arg_tile_size())
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let resolution = *args.get_one::<u64>("resolution").unwrap();
    let is_sparse = args.get_flag("sparse");
    let parallel = *args.get_one::<usize>("parallel").unwrap();

    let coords = args
        .get_many::<String>("coords")
        .unwrap()
        .map(|s| parse_coord(s))
        .collect::<anyhow::Result<Vec<_>>>()?;

    //----------------------------
    // Decode
    //----------------------------
    let matrix = super::open_matrix(args)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallel)
        .build()?;
    let tiles = pool.install(|| matrix.get_tiles(&coords, resolution))?;

    //----------------------------
    // Output
    //----------------------------
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    for ((row, col), tile) in coords.iter().zip(&tiles) {
        writeln!(writer, "#tile\t{}\t{}\t{}", row, col, resolution)?;
        if is_sparse {
            write_tile_sparse(&mut writer, tile)?;
        } else {
            write_tile(&mut writer, tile)?;
        }
    }

    Ok(())
}

fn parse_coord(s: &str) -> anyhow::Result<(u64, u64)> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("Coordinate [{}] is not row,col", s))?;
    Ok((row.trim().parse()?, col.trim().parse()?))
}
