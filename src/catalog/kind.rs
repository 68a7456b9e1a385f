use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Relationship kind of a catalog.
///
/// The set is closed: declarations naming any other value are rejected rather
/// than treated as `object`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CatalogKind {
    #[default]
    Object,
    Source,
    Index,
    Neighbor,
    Association,
}

/// Named reference a dependent catalog carries to another catalog.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Relation {
    Primary,
    Join,
}

/// Back-reference collection on the referenced catalog.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EdgeSet {
    Sources,
    Indexes,
    Neighbors,
    Associations,
    AssociationsRight,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown catalog type {}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl CatalogKind {
    pub const ALL: [CatalogKind; 5] = [
        CatalogKind::Object,
        CatalogKind::Source,
        CatalogKind::Index,
        CatalogKind::Neighbor,
        CatalogKind::Association,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Object => "object",
            CatalogKind::Source => "source",
            CatalogKind::Index => "index",
            CatalogKind::Neighbor => "neighbor",
            CatalogKind::Association => "association",
        }
    }

    /// References a catalog of this kind must declare, in link order.
    pub fn relations(&self) -> &'static [Relation] {
        match self {
            CatalogKind::Object => &[],
            CatalogKind::Source | CatalogKind::Index | CatalogKind::Neighbor => {
                &[Relation::Primary]
            }
            CatalogKind::Association => &[Relation::Primary, Relation::Join],
        }
    }

    /// Which collection on the referenced catalog lists a dependent of this
    /// kind through `relation`. `None` when the kind never carries that
    /// relation.
    pub fn back_reference(&self, relation: Relation) -> Option<EdgeSet> {
        match (*self, relation) {
            (CatalogKind::Object, _) => None,
            (CatalogKind::Source, Relation::Primary) => Some(EdgeSet::Sources),
            (CatalogKind::Index, Relation::Primary) => Some(EdgeSet::Indexes),
            (CatalogKind::Neighbor, Relation::Primary) => Some(EdgeSet::Neighbors),
            (CatalogKind::Association, Relation::Primary) => Some(EdgeSet::Associations),
            (CatalogKind::Association, Relation::Join) => Some(EdgeSet::AssociationsRight),
            (CatalogKind::Source | CatalogKind::Index | CatalogKind::Neighbor, Relation::Join) => {
                None
            }
        }
    }
}

impl FromStr for CatalogKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "object" => Ok(CatalogKind::Object),
            "source" => Ok(CatalogKind::Source),
            "index" => Ok(CatalogKind::Index),
            "neighbor" => Ok(CatalogKind::Neighbor),
            "association" => Ok(CatalogKind::Association),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CatalogKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CatalogKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Primary => "primary",
            Relation::Join => "join",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EdgeSet {
    pub const ALL: [EdgeSet; 5] = [
        EdgeSet::Sources,
        EdgeSet::Indexes,
        EdgeSet::Neighbors,
        EdgeSet::Associations,
        EdgeSet::AssociationsRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeSet::Sources => "sources",
            EdgeSet::Indexes => "indexes",
            EdgeSet::Neighbors => "neighbors",
            EdgeSet::Associations => "associations",
            EdgeSet::AssociationsRight => "associations_right",
        }
    }
}
