use crate::osm::{
    MemberType, OsmData, OsmElement, OsmNode, OsmRelation, OsmRelationMember, OsmWay, Tags,
};
use anyhow::{Context, Result, bail};
use log::{debug, info};
use osmpbf::{Element, ElementReader};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// PBF for paths ending in `.pbf`, XML otherwise.
    #[default]
    Auto,
    Xml,
    Pbf,
}

impl InputFormat {
    pub fn resolve(self, path: &Path) -> InputFormat {
        match self {
            InputFormat::Auto => {
                let is_pbf = path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pbf"));
                if is_pbf {
                    InputFormat::Pbf
                } else {
                    InputFormat::Xml
                }
            }
            explicit => explicit,
        }
    }
}

impl FromStr for InputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(InputFormat::Auto),
            "xml" | "osm" => Ok(InputFormat::Xml),
            "pbf" => Ok(InputFormat::Pbf),
            other => bail!("Unknown input format '{}'", other),
        }
    }
}

pub fn read_osm_file(path: &Path, format: InputFormat) -> Result<OsmData> {
    let data = match format.resolve(path) {
        InputFormat::Pbf => read_osm_pbf(path)?,
        _ => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open OSM file: {}", path.display()))?;
            read_osm_xml(BufReader::new(file))
                .with_context(|| format!("Failed to decode OSM XML: {}", path.display()))?
        }
    };

    info!(
        "Decoded {} nodes, {} ways, {} relations",
        data.nodes.len(),
        data.ways.len(),
        data.relations.len()
    );
    Ok(data)
}

/// Decodes an OSM XML document. Elements keep their document order.
pub fn read_osm_xml<R: BufRead>(source: R) -> Result<OsmData> {
    let mut reader = Reader::from_reader(source);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut data = OsmData::default();
    let mut current: Option<OsmElement> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .with_context(|| format!("Malformed XML near byte {}", reader.buffer_position()))?;

        match event {
            Event::Eof => break,
            Event::Start(e) => start_element(&e, false, &mut current, &mut data)?,
            Event::Empty(e) => start_element(&e, true, &mut current, &mut data)?,
            Event::End(e) => {
                if matches!(e.name().as_ref(), b"node" | b"way" | b"relation")
                    && let Some(element) = current.take()
                {
                    data.push(element);
                }
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(element) = current.take() {
        bail!("Unterminated element with id {} at end of document", element.id());
    }

    Ok(data)
}

fn start_element(
    e: &BytesStart,
    self_closing: bool,
    current: &mut Option<OsmElement>,
    data: &mut OsmData,
) -> Result<()> {
    match e.name().as_ref() {
        b"node" | b"way" | b"relation" => {
            let element = parse_element(e)?;
            if self_closing {
                data.push(element);
            } else if let Some(unclosed) = current.replace(element) {
                bail!(
                    "Element {} opened before element {} closed",
                    id_attribute(e),
                    unclosed.id()
                );
            }
        }
        b"nd" => {
            if let Some(OsmElement::Way(way)) = current.as_mut() {
                let node_ref: i64 = required(e, b"ref")?;
                way.node_refs.get_or_insert_with(Vec::new).push(node_ref);
            }
        }
        b"tag" => {
            if let Some(element) = current.as_mut() {
                let key: String = required(e, b"k")?;
                let value = attribute(e, b"v")?.unwrap_or_default();
                element.insert_tag(key, value);
            }
        }
        b"member" => {
            if let Some(OsmElement::Relation(relation)) = current.as_mut() {
                relation.members.push(OsmRelationMember {
                    member_type: required(e, b"type")?,
                    member_id: required(e, b"ref")?,
                    role: attribute(e, b"role")?.unwrap_or_default(),
                });
            }
        }
        other => debug!("Skipping <{}>", String::from_utf8_lossy(other)),
    }
    Ok(())
}

fn parse_element(e: &BytesStart) -> Result<OsmElement> {
    let id: i64 = required(e, b"id")?;
    let element = match e.name().as_ref() {
        b"node" => OsmElement::Node(OsmNode {
            id,
            lat: optional(e, b"lat")?,
            lon: optional(e, b"lon")?,
        }),
        b"way" => OsmElement::Way(OsmWay {
            id,
            node_refs: Some(Vec::new()),
            tags: None,
        }),
        _ => OsmElement::Relation(OsmRelation {
            id,
            members: Vec::new(),
            tags: None,
        }),
    };
    Ok(element)
}

fn id_attribute(e: &BytesStart) -> String {
    attribute(e, b"id")
        .ok()
        .flatten()
        .unwrap_or_else(|| "?".to_string())
}

fn attribute(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn optional<T>(e: &BytesStart, key: &[u8]) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    attribute(e, key)?
        .map(|value| {
            value.parse::<T>().with_context(|| {
                format!(
                    "Invalid {} '{}' on <{}>",
                    String::from_utf8_lossy(key),
                    value,
                    String::from_utf8_lossy(e.name().as_ref())
                )
            })
        })
        .transpose()
}

fn required<T>(e: &BytesStart, key: &[u8]) -> Result<T>
where
    T: FromStr,
    T::Err: Into<anyhow::Error>,
{
    let value = attribute(e, key)?.with_context(|| {
        format!(
            "Missing {} on <{}>",
            String::from_utf8_lossy(key),
            String::from_utf8_lossy(e.name().as_ref())
        )
    })?;
    let parsed: Result<T> = value.parse::<T>().map_err(Into::into);
    parsed.with_context(|| {
        format!(
            "Invalid {} '{}' on <{}>",
            String::from_utf8_lossy(key),
            value,
            String::from_utf8_lossy(e.name().as_ref())
        )
    })
}

/// Decodes an OSM PBF file sequentially, keeping file order.
pub fn read_osm_pbf(path: &Path) -> Result<OsmData> {
    let reader = ElementReader::from_path(path)
        .with_context(|| format!("Failed to open PBF file: {}", path.display()))?;

    let mut data = OsmData::default();
    reader
        .for_each(|element| data.push(convert_element(element)))
        .with_context(|| format!("Failed to decode PBF file: {}", path.display()))?;

    Ok(data)
}

fn convert_element(element: Element) -> OsmElement {
    match element {
        Element::Node(node) => OsmElement::Node(OsmNode {
            id: node.id(),
            lat: Some(node.lat()),
            lon: Some(node.lon()),
        }),
        Element::DenseNode(dense_node) => OsmElement::Node(OsmNode {
            id: dense_node.id(),
            lat: Some(dense_node.lat()),
            lon: Some(dense_node.lon()),
        }),
        Element::Way(way) => {
            let tags: Tags = way
                .tags()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            OsmElement::Way(OsmWay {
                id: way.id(),
                node_refs: Some(way.refs().collect()),
                tags: non_empty(tags),
            })
        }
        Element::Relation(relation) => {
            let tags: Tags = relation
                .tags()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            let members: Vec<OsmRelationMember> = relation
                .members()
                .map(|member| {
                    let member_type = match member.member_type {
                        osmpbf::RelMemberType::Node => MemberType::Node,
                        osmpbf::RelMemberType::Way => MemberType::Way,
                        osmpbf::RelMemberType::Relation => MemberType::Relation,
                    };
                    OsmRelationMember {
                        member_type,
                        member_id: member.member_id,
                        role: member.role().unwrap_or("").to_string(),
                    }
                })
                .collect();

            OsmElement::Relation(OsmRelation {
                id: relation.id(),
                members,
                tags: non_empty(tags),
            })
        }
    }
}

fn non_empty(tags: Tags) -> Option<Tags> {
    if tags.is_empty() { None } else { Some(tags) }
}
