use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

pub type Tags = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsmNode {
    pub id: i64,
    /// Absent for nodes the source stream carried without a position.
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsmWay {
    pub id: i64,
    /// `None` reads as an empty reference list.
    pub node_refs: Option<Vec<i64>>,
    /// `None` when the way carried no tags at all.
    pub tags: Option<Tags>,
}

impl OsmWay {
    pub fn refs(&self) -> &[i64] {
        self.node_refs.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsmRelationMember {
    pub member_type: MemberType,
    pub member_id: i64,
    pub role: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MemberType {
    Node,
    Way,
    Relation,
}

impl FromStr for MemberType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(MemberType::Node),
            "way" => Ok(MemberType::Way),
            "relation" => Ok(MemberType::Relation),
            other => bail!("Unknown relation member type '{}'", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsmRelation {
    pub id: i64,
    pub members: Vec<OsmRelationMember>,
    pub tags: Option<Tags>,
}

impl OsmRelation {
    /// Ids of way members, in declared order.
    pub fn way_member_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.members
            .iter()
            .filter(|member| member.member_type == MemberType::Way)
            .map(|member| member.member_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OsmElement {
    Node(OsmNode),
    Way(OsmWay),
    Relation(OsmRelation),
}

impl OsmElement {
    pub fn id(&self) -> i64 {
        match self {
            OsmElement::Node(node) => node.id,
            OsmElement::Way(way) => way.id,
            OsmElement::Relation(relation) => relation.id,
        }
    }

    /// Nodes carry no tag set in this model.
    pub fn tags(&self) -> Option<&Tags> {
        match self {
            OsmElement::Node(_) => None,
            OsmElement::Way(way) => way.tags.as_ref(),
            OsmElement::Relation(relation) => relation.tags.as_ref(),
        }
    }

    pub fn get_tag(&self, key: &str) -> Option<&String> {
        self.tags().and_then(|tags| tags.get(key))
    }

    /// Adds a tag to a way or relation, creating its tag set on first use.
    /// Node tags are dropped.
    pub fn insert_tag(&mut self, key: String, value: String) {
        let tags = match self {
            OsmElement::Node(_) => return,
            OsmElement::Way(way) => &mut way.tags,
            OsmElement::Relation(relation) => &mut relation.tags,
        };
        tags.get_or_insert_with(HashMap::new).insert(key, value);
    }
}

/// Decoded contents of one OSM stream, each collection in stream order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsmData {
    pub nodes: Vec<OsmNode>,
    pub ways: Vec<OsmWay>,
    pub relations: Vec<OsmRelation>,
}

impl OsmData {
    pub fn push(&mut self, element: OsmElement) {
        match element {
            OsmElement::Node(node) => self.nodes.push(node),
            OsmElement::Way(way) => self.ways.push(way),
            OsmElement::Relation(relation) => self.relations.push(relation),
        }
    }

    pub fn element_count(&self) -> usize {
        self.nodes.len() + self.ways.len() + self.relations.len()
    }
}

pub fn is_closed_way(way: &OsmWay) -> bool {
    let refs = way.refs();
    !refs.is_empty() && refs.first() == refs.last()
}
