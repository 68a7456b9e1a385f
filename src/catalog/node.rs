use crate::catalog::kind::{CatalogKind, EdgeSet, Relation};
use std::path::{Path, PathBuf};

/// Handle to a node owned by a [`CatalogRegistry`](crate::CatalogRegistry).
///
/// Handles are only meaningful for the registry that issued them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CatalogId(pub(crate) usize);

impl CatalogId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One resolved catalog plus its edges.
///
/// `primary`/`join` point at the catalogs this node depends on; the five edge
/// collections list the nodes depending on this one, in link order.
/// Catalogs registered at runtime stay unlinked but remember the referent
/// names their catalog info declared.
#[derive(Clone, Debug)]
pub struct CatalogNode {
    name: String,
    path: PathBuf,
    kind: CatalogKind,
    namespace: String,
    notes: Vec<String>,
    contact_info: Vec<String>,
    primary: Option<CatalogId>,
    join: Option<CatalogId>,
    declared_primary: Option<String>,
    declared_join: Option<String>,
    sources: Vec<CatalogId>,
    indexes: Vec<CatalogId>,
    neighbors: Vec<CatalogId>,
    associations: Vec<CatalogId>,
    associations_right: Vec<CatalogId>,
}

impl CatalogNode {
    pub(crate) fn new(name: String, path: PathBuf, kind: CatalogKind) -> Self {
        Self {
            name,
            path,
            kind,
            namespace: String::new(),
            notes: Vec::new(),
            contact_info: Vec::new(),
            primary: None,
            join: None,
            declared_primary: None,
            declared_join: None,
            sources: Vec::new(),
            indexes: Vec::new(),
            neighbors: Vec::new(),
            associations: Vec::new(),
            associations_right: Vec::new(),
        }
    }

    pub(crate) fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    pub(crate) fn with_annotations(mut self, notes: &[String], contact_info: &[String]) -> Self {
        self.notes = notes.to_vec();
        self.contact_info = contact_info.to_vec();
        self
    }

    pub(crate) fn with_declared_references(
        mut self,
        primary: Option<String>,
        join: Option<String>,
    ) -> Self {
        self.declared_primary = primary;
        self.declared_join = join;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    /// Full namespace the catalog was declared in; empty for catalogs added
    /// at runtime.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn contact_info(&self) -> &[String] {
        &self.contact_info
    }

    pub fn primary(&self) -> Option<CatalogId> {
        self.primary
    }

    pub fn join(&self) -> Option<CatalogId> {
        self.join
    }

    pub fn reference(&self, relation: Relation) -> Option<CatalogId> {
        match relation {
            Relation::Primary => self.primary,
            Relation::Join => self.join,
        }
    }

    /// Referent named for `relation` without being linked.
    pub fn declared_reference(&self, relation: Relation) -> Option<&str> {
        match relation {
            Relation::Primary => self.declared_primary.as_deref(),
            Relation::Join => self.declared_join.as_deref(),
        }
    }

    pub fn sources(&self) -> &[CatalogId] {
        &self.sources
    }

    pub fn indexes(&self) -> &[CatalogId] {
        &self.indexes
    }

    pub fn neighbors(&self) -> &[CatalogId] {
        &self.neighbors
    }

    pub fn associations(&self) -> &[CatalogId] {
        &self.associations
    }

    pub fn associations_right(&self) -> &[CatalogId] {
        &self.associations_right
    }

    pub fn edges(&self, set: EdgeSet) -> &[CatalogId] {
        match set {
            EdgeSet::Sources => &self.sources,
            EdgeSet::Indexes => &self.indexes,
            EdgeSet::Neighbors => &self.neighbors,
            EdgeSet::Associations => &self.associations,
            EdgeSet::AssociationsRight => &self.associations_right,
        }
    }

    pub(crate) fn edges_mut(&mut self, set: EdgeSet) -> &mut Vec<CatalogId> {
        match set {
            EdgeSet::Sources => &mut self.sources,
            EdgeSet::Indexes => &mut self.indexes,
            EdgeSet::Neighbors => &mut self.neighbors,
            EdgeSet::Associations => &mut self.associations,
            EdgeSet::AssociationsRight => &mut self.associations_right,
        }
    }

    pub(crate) fn set_reference(&mut self, relation: Relation, target: CatalogId) {
        match relation {
            Relation::Primary => self.primary = Some(target),
            Relation::Join => self.join = Some(target),
        }
    }

    /// Move the incoming edge collections of `previous` onto this node.
    pub(crate) fn inherit_edges(&mut self, previous: &mut CatalogNode) {
        self.sources = std::mem::take(&mut previous.sources);
        self.indexes = std::mem::take(&mut previous.indexes);
        self.neighbors = std::mem::take(&mut previous.neighbors);
        self.associations = std::mem::take(&mut previous.associations);
        self.associations_right = std::mem::take(&mut previous.associations_right);
    }
}
