// Parallel lot assembly with deterministic output order
use crate::assembler::{LotSource, ParkingLot, relation_rings, way_lot};
use crate::classifier::classify;
use crate::osm::{OsmRelation, OsmWay};
use crate::resolver::NodeResolver;
use log::debug;
use rayon::prelude::*;
use std::collections::HashSet;

/// Same result as [`crate::assemble_lots`], computed on the current rayon pool.
///
/// The consumed-way set is fixed by a sequential pre-pass before either phase
/// starts, so neither phase writes shared state. Collecting into a `Vec`
/// keeps relation and way order.
pub fn assemble_lots_parallel(
    relations: &[OsmRelation],
    ways: &[OsmWay],
    resolver: &NodeResolver,
) -> Vec<ParkingLot> {
    let index = resolver.index();
    let consumed: HashSet<i64> = relations
        .iter()
        .filter(|relation| classify(relation.tags.as_ref()).is_some())
        .flat_map(|relation| relation.way_member_ids())
        .filter(|member_id| index.way(*member_id).is_some())
        .collect();

    debug!(
        "Pre-pass: {} member ways consumed by relations",
        consumed.len()
    );

    let mut lots: Vec<ParkingLot> = relations
        .par_iter()
        .filter_map(|relation| {
            let access = classify(relation.tags.as_ref())?;
            let (rings, _) = relation_rings(relation, resolver);
            Some(ParkingLot {
                source: LotSource::Relation(relation.id),
                access,
                rings,
            })
        })
        .collect();

    let way_lots: Vec<ParkingLot> = ways
        .par_iter()
        .filter(|way| !consumed.contains(&way.id))
        .filter_map(|way| way_lot(way, resolver))
        .collect();

    lots.extend(way_lots);
    lots
}

/// Runs `assemble_lots_parallel` on a dedicated pool of `threads` workers.
pub fn assemble_lots_with_threads(
    relations: &[OsmRelation],
    ways: &[OsmWay],
    resolver: &NodeResolver,
    threads: usize,
) -> anyhow::Result<Vec<ParkingLot>> {
    if threads == 0 {
        anyhow::bail!("Thread count must be at least 1");
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))?;

    Ok(pool.install(|| assemble_lots_parallel(relations, ways, resolver)))
}
