use crate::classifier::{ParkingAccess, classify};
use crate::osm::{OsmRelation, OsmWay, is_closed_way};
use crate::resolver::{NodeResolver, ResolvedRing};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Where a parking lot was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LotSource {
    Relation(i64),
    Way(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParkingLot {
    pub source: LotSource,
    pub access: ParkingAccess,
    /// One ring renders as a Polygon, any other count as a MultiPolygon.
    pub rings: Vec<ResolvedRing>,
}

impl ParkingLot {
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

/// Builds the ordered list of parking lots: relation lots first, in relation
/// order, then standalone way lots, in way order.
///
/// A way that is a member of a qualifying relation belongs to that relation's
/// lot and is never emitted on its own, whatever its own tags say. A way listed
/// by several qualifying relations is a ring in each of them.
pub fn assemble_lots(
    relations: &[OsmRelation],
    ways: &[OsmWay],
    resolver: &NodeResolver,
) -> Vec<ParkingLot> {
    let mut lots = Vec::new();
    let mut consumed: HashSet<i64> = HashSet::new();

    for relation in relations {
        let Some(access) = classify(relation.tags.as_ref()) else {
            continue;
        };

        let (rings, member_ids) = relation_rings(relation, resolver);
        consumed.extend(member_ids);
        lots.push(ParkingLot {
            source: LotSource::Relation(relation.id),
            access,
            rings,
        });
    }

    debug!(
        "{} relation lots, {} member ways consumed",
        lots.len(),
        consumed.len()
    );

    for way in ways {
        if consumed.contains(&way.id) {
            continue;
        }
        if let Some(lot) = way_lot(way, resolver) {
            lots.push(lot);
        }
    }

    lots
}

/// Rings for the way members of a qualifying relation, plus the ids of the
/// member ways that were found. Members missing from the index are skipped.
pub(crate) fn relation_rings(
    relation: &OsmRelation,
    resolver: &NodeResolver,
) -> (Vec<ResolvedRing>, Vec<i64>) {
    let mut rings = Vec::new();
    let mut member_ids = Vec::new();

    for member_id in relation.way_member_ids() {
        match resolver.index().way(member_id) {
            Some(way) => {
                rings.push(resolver.resolve(way));
                member_ids.push(member_id);
            }
            None => debug!(
                "relation {}: member way {} not in extract",
                relation.id, member_id
            ),
        }
    }

    (rings, member_ids)
}

pub(crate) fn way_lot(way: &OsmWay, resolver: &NodeResolver) -> Option<ParkingLot> {
    let access = classify(way.tags.as_ref())?;
    Some(ParkingLot {
        source: LotSource::Way(way.id),
        access,
        rings: vec![resolver.resolve(way)],
    })
}

/// Counters describing one assembly run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub relation_lots: usize,
    pub way_lots: usize,
    pub public_lots: usize,
    pub private_lots: usize,
    /// Lots with no rings at all (relations none of whose members resolved).
    pub empty_lots: usize,
    /// Member ways a qualifying relation named but the extract lacked.
    pub missing_members: usize,
    /// Rings whose declared node list does not end where it starts.
    pub open_rings: usize,
    pub zero_filled_points: usize,
}

impl AssemblyStats {
    pub fn collect(lots: &[ParkingLot], relations: &[OsmRelation], ways: &[OsmWay]) -> Self {
        let mut stats = AssemblyStats::default();
        // First occurrence wins, as in the entity index.
        let mut relation_members: HashMap<i64, usize> = HashMap::with_capacity(relations.len());
        for relation in relations {
            relation_members
                .entry(relation.id)
                .or_insert_with(|| relation.way_member_ids().count());
        }
        let mut way_closed: HashMap<i64, bool> = HashMap::with_capacity(ways.len());
        for way in ways {
            way_closed
                .entry(way.id)
                .or_insert_with(|| is_closed_way(way));
        }

        for lot in lots {
            match lot.source {
                LotSource::Relation(id) => {
                    stats.relation_lots += 1;
                    let declared = relation_members.get(&id).copied().unwrap_or(0);
                    stats.missing_members += declared.saturating_sub(lot.rings.len());
                }
                LotSource::Way(_) => stats.way_lots += 1,
            }
            match lot.access {
                ParkingAccess::Public => stats.public_lots += 1,
                ParkingAccess::Private => stats.private_lots += 1,
            }
            if lot.is_empty() {
                stats.empty_lots += 1;
            }
            for ring in &lot.rings {
                stats.zero_filled_points += ring.zero_filled;
                if !way_closed.get(&ring.way_id).copied().unwrap_or(false) {
                    stats.open_rings += 1;
                }
            }
        }

        stats
    }

    pub fn total_lots(&self) -> usize {
        self.relation_lots + self.way_lots
    }
}
