extern crate clap;
use clap::*;

mod cmd_hict;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let app = Command::new("hict")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`hict` - Random access to Hi-C contact tiles")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_hict::info::make_subcommand())
        .subcommand(cmd_hict::tile::make_subcommand())
        .subcommand(cmd_hict::reduce::make_subcommand())
        .after_help(
            r###"Subcommands:

* Matrices:
    * info   - Resolutions and stripe grids of a matrix
    * tile   - Dense tiles at stripe intersections

* Assembly order:
    * reduce - Collapse adjacent ATUs, optionally after reversals

Set RUST_LOG=info (or debug) for progress messages.

"###,
        );

    // Check which subcomamnd the user ran...
    match app.get_matches().subcommand() {
        Some(("info", sub_matches)) => cmd_hict::info::execute(sub_matches),
        Some(("tile", sub_matches)) => cmd_hict::tile::execute(sub_matches),
        Some(("reduce", sub_matches)) => cmd_hict::reduce::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
