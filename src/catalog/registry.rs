//! Resolved catalog graph and its runtime mutation API.
//!
//! The registry owns every node; relations between nodes are `CatalogId`
//! handles into the owned vector, so dependents and their referents never own
//! each other. Nodes keep their insertion position for the registry's
//! lifetime and are never removed individually.

use crate::catalog::kind::{CatalogKind, EdgeSet, Relation};
use crate::catalog::node::{CatalogId, CatalogNode};
use crate::error::{AlmanacError, Result};
use crate::sidecar::CatalogInfo;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Default)]
/// Name-keyed store of catalog nodes in insertion order.
pub struct CatalogRegistry {
    nodes: Vec<CatalogNode>,
    by_name: BTreeMap<String, CatalogId>,
}

/// Sidecar name differing from the name a catalog was registered under.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NameMismatch {
    pub registered: String,
    pub declared: String,
}

/// Relationship a runtime-added catalog would need but does not get.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnlinkedReference {
    pub relation: Relation,
    /// Referent named by the sidecar, if it names one.
    pub target: Option<String>,
}

/// Result of [`CatalogRegistry::add_catalog`].
#[derive(Clone, Debug)]
pub struct AddedCatalog {
    pub id: CatalogId,
    pub replaced: bool,
    pub name_mismatch: Option<NameMismatch>,
    pub unlinked: Vec<UnlinkedReference>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve a handle issued by this registry.
    pub fn node(&self, id: CatalogId) -> &CatalogNode {
        &self.nodes[id.0]
    }

    pub fn id_of(&self, name: &str) -> Option<CatalogId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogNode> {
        self.id_of(name).map(|id| self.node(id))
    }

    /// Exact-name lookup.
    pub fn lookup(&self, name: &str) -> Result<&CatalogNode> {
        self.get(name)
            .ok_or_else(|| AlmanacError::CatalogNotFound(name.to_string()))
    }

    /// All catalogs in insertion order.
    pub fn catalogs(&self) -> impl Iterator<Item = &CatalogNode> {
        self.nodes.iter()
    }

    pub fn of_kind(&self, kind: CatalogKind) -> impl Iterator<Item = &CatalogNode> {
        self.nodes.iter().filter(move |node| node.kind() == kind)
    }

    pub fn primary_of(&self, node: &CatalogNode) -> Option<&CatalogNode> {
        node.primary().map(|id| self.node(id))
    }

    pub fn join_of(&self, node: &CatalogNode) -> Option<&CatalogNode> {
        node.join().map(|id| self.node(id))
    }

    /// Names of the nodes behind a list of handles, in order.
    pub fn names<'a>(&'a self, ids: &'a [CatalogId]) -> impl Iterator<Item = &'a str> + 'a {
        ids.iter().map(|id| self.node(*id).name())
    }

    pub(crate) fn insert(&mut self, node: CatalogNode) -> Result<CatalogId> {
        if self.by_name.contains_key(node.name()) {
            return Err(AlmanacError::DuplicateCatalogName(node.name().to_string()));
        }
        let id = CatalogId(self.nodes.len());
        self.by_name.insert(node.name().to_string(), id);
        self.nodes.push(node);
        Ok(id)
    }

    /// Point `dependent` at `target` through `relation` and record the
    /// inverse edge on `target`.
    pub(crate) fn link(&mut self, dependent: CatalogId, relation: Relation, target: CatalogId) {
        let kind = self.nodes[dependent.0].kind();
        let Some(set) = kind.back_reference(relation) else {
            return;
        };
        self.nodes[dependent.0].set_reference(relation, target);
        self.nodes[target.0].edges_mut(set).push(dependent);
    }

    /// Register a catalog directory at runtime.
    ///
    /// The kind comes from `kind`, else the sidecar's `catalog_type`, else
    /// `object`. No relationships are linked: the new node is always
    /// edge-less, and any reference it would need is listed in the outcome's
    /// `unlinked` field and logged. Referents the sidecar names are kept on
    /// the node so a written declaration still carries them. With
    /// `overwrite`, an existing node of the same name is replaced in place:
    /// its outgoing edges are dropped from their targets and the catalogs
    /// depending on it now depend on the replacement.
    pub fn add_catalog(
        &mut self,
        name: &str,
        path: impl AsRef<Path>,
        kind: Option<CatalogKind>,
        overwrite: bool,
    ) -> Result<AddedCatalog> {
        let path = path.as_ref();
        let existing = self.id_of(name);
        if existing.is_some() && !overwrite {
            return Err(AlmanacError::DuplicateCatalogName(name.to_string()));
        }

        let info = CatalogInfo::load(path)?;
        let name_mismatch = (info.catalog_name != name).then(|| NameMismatch {
            registered: name.to_string(),
            declared: info.catalog_name.clone(),
        });
        if let Some(mismatch) = &name_mismatch {
            warn!(
                registered = %mismatch.registered,
                declared = %mismatch.declared,
                "catalog names don't match, which could cause confusion"
            );
        }

        let kind = kind.unwrap_or_else(|| info.kind());
        let unlinked: Vec<UnlinkedReference> = kind
            .relations()
            .iter()
            .map(|relation| UnlinkedReference {
                relation: *relation,
                target: info.reference(*relation).map(str::to_string),
            })
            .collect();
        if !unlinked.is_empty() {
            warn!(
                catalog = name,
                kind = %kind,
                "catalog added without linking its relationships"
            );
        }

        let declared = |relation| {
            unlinked
                .iter()
                .find(|reference| reference.relation == relation)
                .and_then(|reference| reference.target.clone())
        };
        let mut node = CatalogNode::new(name.to_string(), path.to_path_buf(), kind)
            .with_declared_references(declared(Relation::Primary), declared(Relation::Join));
        let (id, replaced) = match existing {
            Some(id) => {
                self.unlink_outgoing(id);
                node.inherit_edges(&mut self.nodes[id.0]);
                self.nodes[id.0] = node;
                (id, true)
            }
            None => (self.insert(node)?, false),
        };

        Ok(AddedCatalog {
            id,
            replaced,
            name_mismatch,
            unlinked,
        })
    }

    fn unlink_outgoing(&mut self, id: CatalogId) {
        let kind = self.nodes[id.0].kind();
        for relation in kind.relations() {
            let (Some(target), Some(set)) = (
                self.nodes[id.0].reference(*relation),
                kind.back_reference(*relation),
            ) else {
                continue;
            };
            self.nodes[target.0].edges_mut(set).retain(|dep| *dep != id);
        }
    }

    /// Check that every edge collection is the exact inverse of the
    /// `primary`/`join` fields.
    ///
    /// Returns every violation rather than stopping at the first.
    pub fn consistency_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            let id = CatalogId(idx);
            if node.kind() == CatalogKind::Object
                && (node.primary().is_some() || node.join().is_some())
            {
                errors.push(format!("object {} carries a reference", node.name()));
            }
            for relation in [Relation::Primary, Relation::Join] {
                let Some(target) = node.reference(relation) else {
                    continue;
                };
                let Some(set) = node.kind().back_reference(relation) else {
                    errors.push(format!(
                        "{} {} carries an unexpected {relation} reference",
                        node.kind(),
                        node.name()
                    ));
                    continue;
                };
                let listed = self.node(target).edges(set).iter().filter(|dep| **dep == id).count();
                if listed != 1 {
                    errors.push(format!(
                        "{} lists {} {} time(s) in {}",
                        self.node(target).name(),
                        node.name(),
                        listed,
                        set.as_str()
                    ));
                }
            }
            for set in EdgeSet::ALL {
                for dep in node.edges(set) {
                    let dependent = self.node(*dep);
                    let points_back = dependent.kind().relations().iter().any(|relation| {
                        dependent.kind().back_reference(*relation) == Some(set)
                            && dependent.reference(*relation) == Some(id)
                    });
                    if !points_back {
                        errors.push(format!(
                            "{} lists {} in {} but it does not reference it",
                            node.name(),
                            dependent.name(),
                            set.as_str()
                        ));
                    }
                }
            }
        }
        errors
    }
}
