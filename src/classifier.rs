use crate::osm::Tags;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParkingAccess {
    Public,
    Private,
}

impl ParkingAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParkingAccess::Public => "public",
            ParkingAccess::Private => "private",
        }
    }
}

impl fmt::Display for ParkingAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether a tag set describes a surface parking lot, and if so who
/// may use it. `None` means "not a surface parking lot".
pub fn classify(tags: Option<&Tags>) -> Option<ParkingAccess> {
    let tags = tags?;

    if tags.get("amenity").map(String::as_str) != Some("parking") {
        return None;
    }

    // Structures, not lots.
    if matches!(
        tags.get("parking").map(String::as_str),
        Some("underground" | "rooftop")
    ) {
        return None;
    }

    if tags.get("access").map(String::as_str) == Some("private") {
        Some(ParkingAccess::Private)
    } else {
        Some(ParkingAccess::Public)
    }
}
