use crate::index::EntityIndex;
use crate::osm::OsmWay;
use serde::Serialize;
use std::str::FromStr;

/// A position in `[lon, lat]` order.
pub type Point = [f64; 2];

/// What to do with a node that exists but lacks a longitude or latitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingCoordinates {
    /// Substitute `0.0` for the absent value.
    #[default]
    Zero,
    /// Drop the point, as if the node were not in the index.
    Skip,
}

impl FromStr for MissingCoordinates {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" => Ok(MissingCoordinates::Zero),
            "skip" => Ok(MissingCoordinates::Skip),
            other => anyhow::bail!("Unknown missing-coordinate policy '{}'", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRing {
    pub way_id: i64,
    pub points: Vec<Point>,
    /// Points that had an absent coordinate replaced by `0.0`.
    pub zero_filled: usize,
}

/// Turns a way's node references into coordinates via the entity index.
#[derive(Debug, Clone, Copy)]
pub struct NodeResolver<'i, 'a> {
    index: &'i EntityIndex<'a>,
    missing_coordinates: MissingCoordinates,
}

impl<'i, 'a> NodeResolver<'i, 'a> {
    pub fn new(index: &'i EntityIndex<'a>) -> Self {
        NodeResolver {
            index,
            missing_coordinates: MissingCoordinates::default(),
        }
    }

    pub fn with_missing_coordinates(mut self, policy: MissingCoordinates) -> Self {
        self.missing_coordinates = policy;
        self
    }

    pub fn index(&self) -> &'i EntityIndex<'a> {
        self.index
    }

    /// Resolves every referenced node in reference order. References to
    /// nodes absent from the index are dropped, so the ring may come back
    /// shorter than the way's reference list.
    pub fn resolve(&self, way: &OsmWay) -> ResolvedRing {
        let refs = way.refs();
        let mut points = Vec::with_capacity(refs.len());
        let mut zero_filled = 0;

        for &node_id in refs {
            let Some(node) = self.index.node(node_id) else {
                continue;
            };

            match (node.lon, node.lat) {
                (Some(lon), Some(lat)) => points.push([lon, lat]),
                (lon, lat) => match self.missing_coordinates {
                    MissingCoordinates::Zero => {
                        zero_filled += 1;
                        points.push([lon.unwrap_or(0.0), lat.unwrap_or(0.0)]);
                    }
                    MissingCoordinates::Skip => {}
                },
            }
        }

        ResolvedRing {
            way_id: way.id,
            points,
            zero_filled,
        }
    }
}
