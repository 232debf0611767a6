use crate::assembler::ParkingLot;
use crate::classifier::ParkingAccess;
use crate::resolver::ResolvedRing;
use geojson::{PolygonType, Position};
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

const FEATURE_COLLECTION: &str = "FeatureCollection";
const FEATURE: &str = "Feature";

/// GeoJSON FeatureCollection with a fixed key order: `type`, `features`,
/// `info`. `info` is always empty and kept for consumers that expect it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature>,
    pub info: Vec<Value>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        FeatureCollection {
            kind: FEATURE_COLLECTION,
            features,
            info: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn to_json(&self, pretty_print: bool) -> serde_json::Result<String> {
        if pretty_print {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

impl Feature {
    pub fn from_lot(lot: &ParkingLot) -> Self {
        Feature {
            kind: FEATURE,
            properties: Map::new(),
            geometry: Geometry::from_lot(lot),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Polygon(PolygonType),
    /// Every ring becomes its own single-ring polygon; no holes.
    MultiPolygon(Vec<PolygonType>),
}

impl Geometry {
    /// A single ring is a Polygon. Any other count, including zero, is a
    /// MultiPolygon; zero rings give an empty coordinate array.
    pub fn from_lot(lot: &ParkingLot) -> Self {
        match lot.rings.as_slice() {
            [ring] => Geometry::Polygon(vec![ring_positions(ring)]),
            rings => {
                if rings.is_empty() {
                    debug!("{:?} has no rings, emitting empty MultiPolygon", lot.source);
                }
                Geometry::MultiPolygon(
                    rings
                        .iter()
                        .map(|ring| vec![ring_positions(ring)])
                        .collect(),
                )
            }
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    pub fn to_geojson(&self) -> geojson::Geometry {
        let value = match self {
            Geometry::Polygon(polygon) => geojson::Value::Polygon(polygon.clone()),
            Geometry::MultiPolygon(polygons) => geojson::Value::MultiPolygon(polygons.clone()),
        };
        geojson::Geometry::new(value)
    }
}

fn ring_positions(ring: &ResolvedRing) -> Vec<Position> {
    ring.points.iter().map(|point| point.to_vec()).collect()
}

/// Public and private lots as two separate documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkingCollections {
    pub public: FeatureCollection,
    pub private: FeatureCollection,
}

impl ParkingCollections {
    pub fn get(&self, access: ParkingAccess) -> &FeatureCollection {
        match access {
            ParkingAccess::Public => &self.public,
            ParkingAccess::Private => &self.private,
        }
    }
}

/// Converts lots to features, routed by access class, in lot order.
pub fn emit(lots: &[ParkingLot]) -> ParkingCollections {
    let mut public = Vec::new();
    let mut private = Vec::new();

    for lot in lots {
        let feature = Feature::from_lot(lot);
        match lot.access {
            ParkingAccess::Public => public.push(feature),
            ParkingAccess::Private => private.push(feature),
        }
    }

    ParkingCollections {
        public: FeatureCollection::new(public),
        private: FeatureCollection::new(private),
    }
}

/// Every lot in one document, for deployments that load a single file.
pub fn emit_combined(lots: &[ParkingLot]) -> FeatureCollection {
    FeatureCollection::new(lots.iter().map(Feature::from_lot).collect())
}
