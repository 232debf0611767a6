use crate::assembler::{AssemblyStats, ParkingLot, assemble_lots};
use crate::emitter::{emit, emit_combined};
use crate::index::EntityIndex;
use crate::osm::OsmData;
use crate::parallel_assembler::assemble_lots_with_threads;
use crate::reader::{InputFormat, read_osm_file};
use crate::resolver::{MissingCoordinates, NodeResolver};
use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const PUBLIC_FILE_NAME: &str = "publicParkingLots.json";
pub const PRIVATE_FILE_NAME: &str = "privateParkingLots.json";
pub const COMBINED_FILE_NAME: &str = "parkingLots.json";
pub const DEFAULT_OUTPUT_DIR: &str = "json";

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub format: InputFormat,
    pub pretty_print: bool,
    /// Also write every lot to one combined document.
    pub combined: bool,
    pub parallel: bool,
    pub threads: usize,
    pub missing_coordinates: MissingCoordinates,
}

impl ExtractOptions {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        ExtractOptions {
            input: input.into(),
            output_dir: output_dir.into(),
            format: InputFormat::Auto,
            pretty_print: true,
            combined: false,
            parallel: true,
            threads: num_cpus::get(),
            missing_coordinates: MissingCoordinates::Zero,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractSummary {
    pub stats: AssemblyStats,
    pub public_features: usize,
    pub private_features: usize,
    pub written: Vec<PathBuf>,
}

/// Reads the input, assembles parking lots and writes the GeoJSON documents.
///
/// Nothing is written unless decoding and assembly both succeed.
pub fn extract_parking_lots(options: &ExtractOptions) -> Result<ExtractSummary> {
    if !options.input.exists() {
        bail!("Input file does not exist: {}", options.input.display());
    }
    if options.threads == 0 {
        bail!("Thread count must be at least 1");
    }

    let start = Instant::now();
    let data = read_osm_file(&options.input, options.format)?;
    let (lots, stats) = assemble(&data, options)?;

    let collections = emit(&lots);
    let mut documents = vec![
        (
            PUBLIC_FILE_NAME,
            collections.public.len(),
            collections.public.to_json(options.pretty_print)?,
        ),
        (
            PRIVATE_FILE_NAME,
            collections.private.len(),
            collections.private.to_json(options.pretty_print)?,
        ),
    ];
    if options.combined {
        let combined = emit_combined(&lots);
        documents.push((
            COMBINED_FILE_NAME,
            combined.len(),
            combined.to_json(options.pretty_print)?,
        ));
    }

    fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            options.output_dir.display()
        )
    })?;

    let mut written = Vec::with_capacity(documents.len());
    for (file_name, feature_count, json) in documents {
        let path = options.output_dir.join(file_name);
        write_document(&path, &json)?;
        info!("Wrote {} features to {}", feature_count, path.display());
        written.push(path);
    }

    info!("Complete in {:?}", start.elapsed());

    Ok(ExtractSummary {
        stats,
        public_features: collections.public.len(),
        private_features: collections.private.len(),
        written,
    })
}

/// Indexes the decoded data and runs the lot assembler configured by `options`.
pub fn assemble(
    data: &OsmData,
    options: &ExtractOptions,
) -> Result<(Vec<ParkingLot>, AssemblyStats)> {
    let index = EntityIndex::from_data(data);
    debug!(
        "Indexed {} nodes, {} ways, {} relations",
        index.node_count(),
        index.way_count(),
        index.relation_count()
    );

    let resolver =
        NodeResolver::new(&index).with_missing_coordinates(options.missing_coordinates);

    let lots = if options.parallel {
        info!("Assembling parking lots on {} threads...", options.threads);
        assemble_lots_with_threads(&data.relations, &data.ways, &resolver, options.threads)?
    } else {
        info!("Assembling parking lots...");
        assemble_lots(&data.relations, &data.ways, &resolver)
    };

    let stats = AssemblyStats::collect(&lots, &data.relations, &data.ways);
    report(&stats);
    Ok((lots, stats))
}

fn report(stats: &AssemblyStats) {
    info!(
        "{} surface parking lots found ({} from relations, {} standalone ways; {} public, {} private)",
        stats.total_lots(),
        stats.relation_lots,
        stats.way_lots,
        stats.public_lots,
        stats.private_lots
    );

    if stats.missing_members > 0 {
        info!(
            "{} relation member ways were not in the extract and were skipped",
            stats.missing_members
        );
    }
    if stats.empty_lots > 0 {
        warn!(
            "{} parking lots have no resolvable rings and are emitted with empty coordinates",
            stats.empty_lots
        );
    }
    if stats.zero_filled_points > 0 {
        warn!(
            "{} points had a missing longitude or latitude replaced by 0.0",
            stats.zero_filled_points
        );
    }
    if stats.open_rings > 0 {
        debug!("{} rings are not closed", stats.open_rings);
    }
}

fn write_document(path: &Path, json: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", json)
        .and_then(|_| writer.flush())
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    Ok(())
}
