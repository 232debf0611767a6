use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::{Arg, Command};
use env_logger::Env;
use log::info;
use parklots::{
    DEFAULT_OUTPUT_DIR, ExtractOptions, InputFormat, MissingCoordinates, extract_parking_lots,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = Command::new("parklots")
        .version("0.1.0")
        .about("Extract surface parking lots from OpenStreetMap data as public/private GeoJSON")
        .arg(
            Arg::new("input")
                .help("Input OSM file (.osm XML or .osm.pbf)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .default_value(DEFAULT_OUTPUT_DIR)
                .help("Directory for the GeoJSON output files"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Input format: auto, xml, pbf")
                .value_parser(["auto", "xml", "pbf"])
                .default_value("auto"),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .action(clap::ArgAction::SetTrue)
                .help("Write single-line JSON instead of pretty-printed output"),
        )
        .arg(
            Arg::new("combined")
                .long("combined")
                .action(clap::ArgAction::SetTrue)
                .help("Also write every lot to a single parkingLots.json"),
        )
        .arg(
            Arg::new("no-parallel")
                .long("no-parallel")
                .action(clap::ArgAction::SetTrue)
                .help("Assemble lots on the main thread only"),
        )
        .arg(
            Arg::new("threads")
                .short('j')
                .long("threads")
                .value_name("N")
                .value_parser(RangedU64ValueParser::<usize>::new().range(1..))
                .help("Worker threads for parallel assembly (default: number of CPUs)"),
        )
        .arg(
            Arg::new("missing-coords")
                .long("missing-coords")
                .value_name("POLICY")
                .help("Nodes without lon/lat: zero (substitute 0.0) or skip (drop the point)")
                .value_parser(["zero", "skip"])
                .default_value("zero"),
        )
        .get_matches();

    let input_path = matches
        .get_one::<String>("input")
        .context("Missing input path")?;
    let output_dir = matches
        .get_one::<String>("output-dir")
        .context("Missing output directory")?;

    let mut options = ExtractOptions::new(input_path, output_dir);
    if let Some(format) = matches.get_one::<String>("format") {
        options.format = format.parse::<InputFormat>()?;
    }
    options.pretty_print = !matches.get_flag("compact");
    options.combined = matches.get_flag("combined");
    options.parallel = !matches.get_flag("no-parallel");
    if let Some(threads) = matches.get_one::<usize>("threads") {
        options.threads = *threads;
    }
    if let Some(policy) = matches.get_one::<String>("missing-coords") {
        options.missing_coordinates = policy.parse::<MissingCoordinates>()?;
    }

    let summary = extract_parking_lots(&options)?;
    info!(
        "{} public and {} private parking lots written to {}",
        summary.public_features,
        summary.private_features,
        options.output_dir.display()
    );

    Ok(())
}
