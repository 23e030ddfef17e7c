use clap::*;
use hict::libs::assembly::AssemblyTree;
use hict::libs::atu;
use hict::libs::io::{read_atus, reader, write_atus};
use log::info;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("reduce")
        .about("Collapse adjacent ATUs of an assembly order")
        .after_help(
            r###"
This command reads an assembly order as a list of ATUs (assembly tiling
units) and writes its canonical form, where consecutive ATUs of the same
stripe and direction with touching ranges are merged.

Input lines are either tab-separated
    stripe  start  end  strand
or written as stripe(strand):start-end. Ranges are 0-based, half-open.
Blank lines and lines starting with # are ignored.

--flip start-end reverses bins [start, end) of the assembly before
reducing; it may be given several times and is applied in order.

Examples:
1. Reduce an order:
   hict reduce order.tsv

2. Reverse the first 100 bins, then reduce:
   hict reduce order.tsv --flip 0-100

"###,
        )
        .arg(
            Arg::new("infile")
                .index(1)
                .num_args(1)
                .default_value("stdin")
                .help("Input filename. [stdin] for standard input"),
        )
        .arg(
            Arg::new("flip")
                .long("flip")
                .num_args(1)
                .action(ArgAction::Append)
                .help("Reverse bins start-end before reducing"),
        )
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let atus = read_atus(reader(infile)?)?;
    info!("Read {} ATUs from {}", atus.len(), infile);

    let reduced = match args.get_many::<String>("flip") {
        Some(flips) => {
            let mut tree = AssemblyTree::from_atus(atus);
            for flip in flips {
                let (start, end) = parse_range(flip)?;
                tree.reverse_range(start, end)?;
            }
            tree.assembly_order()
        }
        None => atu::reduce(&atus),
    };
    info!("Reduced to {} ATUs", reduced.len());

    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    write_atus(&mut writer, &reduced)?;

    Ok(())
}

fn parse_range(s: &str) -> anyhow::Result<(u64, u64)> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| anyhow::anyhow!("Range [{}] is not start-end", s))?;
    Ok((start.trim().parse()?, end.trim().parse()?))
}
