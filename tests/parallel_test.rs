// Parallel assembly must match the sequential result exactly
use parklots::*;

fn parking_tags(access: Option<&str>) -> Option<Tags> {
    let mut tags = Tags::new();
    tags.insert("amenity".to_string(), "parking".to_string());
    if let Some(access) = access {
        tags.insert("access".to_string(), access.to_string());
    }
    Some(tags)
}

/// A grid of lots: every tenth group of ways is bundled into a relation.
fn grid(lot_count: i64) -> OsmData {
    let mut data = OsmData::default();

    for lot in 0..lot_count {
        let first_node = lot * 4;
        for corner in 0..4 {
            data.nodes.push(OsmNode {
                id: first_node + corner,
                lat: Some(49.0 + lot as f64 * 0.001 + (corner / 2) as f64 * 0.0005),
                lon: Some(-122.0 + (corner % 2) as f64 * 0.0005),
            });
        }

        let access = if lot % 3 == 0 { Some("private") } else { None };
        data.ways.push(OsmWay {
            id: lot,
            node_refs: Some(vec![
                first_node,
                first_node + 1,
                first_node + 3,
                first_node + 2,
                first_node,
            ]),
            tags: parking_tags(access),
        });
    }

    for group in (0..lot_count).step_by(10) {
        data.relations.push(OsmRelation {
            id: 100_000 + group,
            members: (group..(group + 3).min(lot_count))
                .map(|way_id| OsmRelationMember {
                    member_type: MemberType::Way,
                    member_id: way_id,
                    role: "outer".to_string(),
                })
                .collect(),
            tags: parking_tags(None),
        });
    }

    data
}

#[test]
fn test_parallel_matches_sequential() {
    let data = grid(500);
    let index = EntityIndex::from_data(&data);
    let resolver = NodeResolver::new(&index);

    let sequential = assemble_lots(&data.relations, &data.ways, &resolver);
    let parallel = assemble_lots_parallel(&data.relations, &data.ways, &resolver);

    assert_eq!(sequential.len(), 50 + 500 - 150);
    assert_eq!(sequential, parallel);
}

#[test]
fn test_dedicated_pool_matches_sequential() {
    let data = grid(120);
    let index = EntityIndex::from_data(&data);
    let resolver = NodeResolver::new(&index);

    let sequential = assemble_lots(&data.relations, &data.ways, &resolver);
    for threads in [1, 4] {
        let pooled = assemble_lots_with_threads(&data.relations, &data.ways, &resolver, threads)
            .expect("pool should build");
        assert_eq!(sequential, pooled, "mismatch with {} threads", threads);
    }
}

#[test]
fn test_zero_threads_rejected() {
    let data = grid(1);
    let index = EntityIndex::from_data(&data);
    let resolver = NodeResolver::new(&index);

    let result = assemble_lots_with_threads(&data.relations, &data.ways, &resolver, 0);
    assert!(result.is_err());
}

#[test]
fn test_cpu_core_detection() {
    let cpus = num_cpus::get();
    assert!(cpus >= 1, "Need at least 1 CPU core");
    assert_eq!(ExtractOptions::new("in.osm", "out").threads, cpus);
}
