use geojson::GeoJson;
use parklots::*;
use serde_json::Value;

fn ring(way_id: i64, offset: f64) -> ResolvedRing {
    ResolvedRing {
        way_id,
        points: vec![
            [-122.60 + offset, 49.10],
            [-122.59 + offset, 49.10],
            [-122.59 + offset, 49.11],
            [-122.60 + offset, 49.10],
        ],
        zero_filled: 0,
    }
}

fn lot(source: LotSource, access: ParkingAccess, rings: Vec<ResolvedRing>) -> ParkingLot {
    ParkingLot {
        source,
        access,
        rings,
    }
}

fn sample_lots() -> Vec<ParkingLot> {
    vec![
        lot(
            LotSource::Relation(1),
            ParkingAccess::Public,
            vec![ring(10, 0.0), ring(11, 0.1)],
        ),
        lot(LotSource::Way(20), ParkingAccess::Private, vec![ring(20, 0.2)]),
        lot(LotSource::Way(21), ParkingAccess::Public, vec![ring(21, 0.3)]),
    ]
}

#[test]
fn test_single_ring_is_polygon() {
    let geometry = Geometry::from_lot(&sample_lots()[1]);
    assert_eq!(geometry.type_name(), "Polygon");

    let json = serde_json::to_value(&geometry).expect("Should serialize");
    assert_eq!(json["type"], "Polygon");
    assert_eq!(json["coordinates"].as_array().map(Vec::len), Some(1));
    assert_eq!(
        json["coordinates"][0][0],
        serde_json::json!([-122.60 + 0.2, 49.10])
    );
}

#[test]
fn test_multiple_rings_are_multipolygon() {
    let geometry = Geometry::from_lot(&sample_lots()[0]);
    assert_eq!(geometry.type_name(), "MultiPolygon");

    let json = serde_json::to_value(&geometry).expect("Should serialize");
    let polygons = json["coordinates"].as_array().expect("coordinates array");
    assert_eq!(polygons.len(), 2);
    for polygon in polygons {
        // Each ring is its own outer boundary.
        assert_eq!(polygon.as_array().map(Vec::len), Some(1));
        assert_eq!(polygon[0].as_array().map(Vec::len), Some(4));
    }
}

#[test]
fn test_lots_routed_by_access() {
    let collections = emit(&sample_lots());

    assert_eq!(collections.public.len(), 2);
    assert_eq!(collections.private.len(), 1);
    assert_eq!(
        collections.public.features[0].geometry.type_name(),
        "MultiPolygon"
    );
    assert_eq!(collections.public.features[1].geometry.type_name(), "Polygon");
    assert_eq!(collections.get(ParkingAccess::Private).len(), 1);
}

#[test]
fn test_collection_document_shape() {
    let collections = emit(&sample_lots());
    let json = collections.private.to_json(true).expect("Should serialize");

    let parsed: Value = serde_json::from_str(&json).expect("Should parse JSON");
    assert_eq!(parsed["type"], "FeatureCollection");
    assert_eq!(parsed["info"], serde_json::json!([]));
    assert_eq!(parsed["features"][0]["type"], "Feature");
    assert_eq!(parsed["features"][0]["properties"], serde_json::json!({}));

    // Pretty output keeps feature keys in type, properties, geometry order.
    let type_pos = json.find("\"type\": \"Feature\"").expect("feature type");
    let properties_pos = json.find("\"properties\"").expect("properties");
    let geometry_pos = json.find("\"geometry\"").expect("geometry");
    assert!(type_pos < properties_pos && properties_pos < geometry_pos);
}

#[test]
fn test_output_is_valid_geojson() {
    let collections = emit(&sample_lots());
    let json = collections.public.to_json(false).expect("Should serialize");

    let geojson: GeoJson = json.parse().expect("Should be valid GeoJSON");
    match geojson {
        GeoJson::FeatureCollection(collection) => {
            assert_eq!(collection.features.len(), 2);
            let first = collection.features[0]
                .geometry
                .as_ref()
                .expect("feature geometry");
            match &first.value {
                geojson::Value::MultiPolygon(polygons) => assert_eq!(polygons.len(), 2),
                other => panic!("Expected a MultiPolygon, got {:?}", other),
            }
            assert!(matches!(
                collections.public.features[1].geometry.to_geojson().value,
                geojson::Value::Polygon(_)
            ));
        }
        other => panic!("Expected a FeatureCollection, got {:?}", other),
    }
}

#[test]
fn test_serialization_is_stable() {
    let lots = sample_lots();
    let first = emit(&lots).public.to_json(true).expect("Should serialize");
    let second = emit(&lots).public.to_json(true).expect("Should serialize");
    assert_eq!(first, second);
}

#[test]
fn test_combined_document_keeps_lot_order() {
    let combined = emit_combined(&sample_lots());

    assert_eq!(combined.len(), 3);
    let types: Vec<&str> = combined
        .features
        .iter()
        .map(|feature| feature.geometry.type_name())
        .collect();
    assert_eq!(types, vec!["MultiPolygon", "Polygon", "Polygon"]);
}

#[test]
fn test_empty_lots_produce_empty_collections() {
    let collections = emit(&[]);
    assert!(collections.public.is_empty());
    assert!(collections.private.is_empty());
}
