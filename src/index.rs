use crate::osm::{OsmData, OsmNode, OsmRelation, OsmWay};
use std::collections::HashMap;

/// Read-only id lookup over one decoded OSM stream.
///
/// Built once and shared by reference with every later stage. When the input
/// repeats an id, the first occurrence wins.
#[derive(Debug, Default)]
pub struct EntityIndex<'a> {
    nodes: HashMap<i64, &'a OsmNode>,
    ways: HashMap<i64, &'a OsmWay>,
    relations: HashMap<i64, &'a OsmRelation>,
}

impl<'a> EntityIndex<'a> {
    pub fn build(relations: &'a [OsmRelation], ways: &'a [OsmWay], nodes: &'a [OsmNode]) -> Self {
        let mut index = EntityIndex {
            nodes: HashMap::with_capacity(nodes.len()),
            ways: HashMap::with_capacity(ways.len()),
            relations: HashMap::with_capacity(relations.len()),
        };

        for node in nodes {
            index.nodes.entry(node.id).or_insert(node);
        }
        for way in ways {
            index.ways.entry(way.id).or_insert(way);
        }
        for relation in relations {
            index.relations.entry(relation.id).or_insert(relation);
        }

        index
    }

    pub fn from_data(data: &'a OsmData) -> Self {
        Self::build(&data.relations, &data.ways, &data.nodes)
    }

    pub fn node(&self, id: i64) -> Option<&'a OsmNode> {
        self.nodes.get(&id).copied()
    }

    pub fn way(&self, id: i64) -> Option<&'a OsmWay> {
        self.ways.get(&id).copied()
    }

    pub fn relation(&self, id: i64) -> Option<&'a OsmRelation> {
        self.relations.get(&id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }
}
