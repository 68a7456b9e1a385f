//! Catalog graph model.
//!
//! `CatalogKind` is the closed set of relationship kinds, `CatalogNode` a
//! resolved entry and `CatalogRegistry` the owning, name-keyed store. Nodes
//! refer to each other through `CatalogId` handles issued by the registry.

pub mod kind;
pub mod node;
pub mod registry;

pub use kind::{CatalogKind, EdgeSet, Relation, UnknownKind};
pub use node::{CatalogId, CatalogNode};
pub use registry::{AddedCatalog, CatalogRegistry, NameMismatch, UnlinkedReference};
