//! Writing declaration documents.
//!
//! Two write paths exist: re-serializing a resolved registry, and generating
//! a fresh document from catalog directories and their sidecars. Both emit
//! flat namespaces and no includes; documents that relied on includes or
//! nesting come back as one self-contained file whose namespace prefixes are
//! the full `outer:inner` names.

use crate::catalog::{CatalogKind, CatalogNode, CatalogRegistry, Relation};
use crate::error::{AlmanacError, Result};
use crate::sidecar::CatalogInfo;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Default, Serialize)]
struct DocumentOut {
    namespace: Vec<NamespaceOut>,
}

#[derive(Debug, Serialize)]
struct NamespaceOut {
    prefix: String,
    catalog: Vec<CatalogOut>,
}

#[derive(Debug, Serialize)]
struct CatalogOut {
    name: String,
    #[serde(rename = "type")]
    kind: CatalogKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relative_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    join: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    contact_info: Vec<String>,
}

impl DocumentOut {
    fn namespace_mut(&mut self, prefix: &str) -> &mut NamespaceOut {
        let idx = match self.namespace.iter().position(|ns| ns.prefix == prefix) {
            Some(idx) => idx,
            None => {
                self.namespace.push(NamespaceOut {
                    prefix: prefix.to_string(),
                    catalog: Vec::new(),
                });
                self.namespace.len() - 1
            }
        };
        &mut self.namespace[idx]
    }
}

fn catalog_out(registry: &CatalogRegistry, node: &CatalogNode) -> Result<CatalogOut> {
    let mut out = CatalogOut {
        name: node.name().to_string(),
        kind: node.kind(),
        path: Some(absolute_location(node.path())?),
        relative_path: None,
        primary: None,
        join: None,
        notes: node.notes().to_vec(),
        contact_info: node.contact_info().to_vec(),
    };
    for relation in node.kind().relations() {
        let referent = written_reference(registry, node, *relation)?;
        match relation {
            Relation::Primary => out.primary = Some(referent),
            Relation::Join => out.join = Some(referent),
        }
    }
    Ok(out)
}

/// Name to emit for `relation`: the linked referent, or for a catalog added
/// at runtime the registered referent its catalog info named.
fn written_reference(
    registry: &CatalogRegistry,
    node: &CatalogNode,
    relation: Relation,
) -> Result<String> {
    if let Some(target) = registry_reference(registry, node, relation) {
        return Ok(target.to_string());
    }
    let reason = match node.declared_reference(relation) {
        Some(target) => format!("{relation} catalog {target} is not registered"),
        None => format!("no {relation} catalog is linked or named in its catalog info"),
    };
    Err(AlmanacError::UnwritableCatalog {
        kind: node.kind(),
        catalog: node.name().to_string(),
        reason,
    })
}

fn registry_reference<'a>(
    registry: &'a CatalogRegistry,
    node: &'a CatalogNode,
    relation: Relation,
) -> Option<&'a str> {
    match node.reference(relation) {
        Some(id) => Some(registry.node(id).name()),
        None => node
            .declared_reference(relation)
            .filter(|target| registry.get(target).is_some()),
    }
}

fn path_string(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| AlmanacError::NonUtf8Path(path.to_path_buf()))
}

/// Catalog locations are written absolute so the document resolves from any
/// working directory and at any destination.
fn absolute_location(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path)
        .map_err(|err| AlmanacError::io(format!("resolving {}", path.display()), err))?;
    path_string(&absolute)
}

/// Declaration document describing the registry's current nodes and edges.
///
/// Nodes are grouped by namespace in order of first appearance. Fails
/// without output when a dependent has neither a linked referent nor a
/// registered one named by its catalog info.
pub fn to_declaration(registry: &CatalogRegistry) -> Result<serde_json::Value> {
    let mut document = DocumentOut::default();
    for node in registry.catalogs() {
        let catalog = catalog_out(registry, node)?;
        document.namespace_mut(node.namespace()).catalog.push(catalog);
    }
    Ok(serde_json::json!(document))
}

/// Re-serialize `registry` to `destination`.
///
/// Nothing is written when the registry cannot be serialized.
pub fn write_declaration(registry: &CatalogRegistry, destination: &Path) -> Result<()> {
    write_document(destination, &to_declaration(registry)?)
}

/// Build a single-namespace document from catalog directories.
///
/// With `paths_relative`, each entry of `catalog_dirs` is relative to
/// `destination`'s directory and is emitted as `relative_path`; otherwise it
/// is emitted as an absolute `path`. Every dependent must name a referent
/// among the generated catalogs.
pub fn declaration_from_catalog_dirs(
    destination: &Path,
    namespace_prefix: &str,
    catalog_dirs: &[PathBuf],
    paths_relative: bool,
) -> Result<serde_json::Value> {
    let base = destination.parent().unwrap_or_else(|| Path::new(""));
    let mut catalogs = Vec::with_capacity(catalog_dirs.len());
    for dir in catalog_dirs {
        let on_disk = if paths_relative { base.join(dir) } else { dir.clone() };
        let info = CatalogInfo::load(&on_disk)?;
        let (path, relative_path) = if paths_relative {
            (None, Some(path_string(dir)?))
        } else {
            (Some(absolute_location(dir)?), None)
        };
        catalogs.push(CatalogOut {
            name: info.catalog_name.clone(),
            kind: info.kind(),
            path,
            relative_path,
            primary: info.primary_catalog.clone(),
            join: info.join_catalog.clone(),
            notes: Vec::new(),
            contact_info: Vec::new(),
        });
    }
    check_generated_references(&catalogs)?;

    let document = DocumentOut {
        namespace: vec![NamespaceOut {
            prefix: namespace_prefix.to_string(),
            catalog: catalogs,
        }],
    };
    Ok(serde_json::json!(document))
}

fn check_generated_references(catalogs: &[CatalogOut]) -> Result<()> {
    for catalog in catalogs {
        for relation in catalog.kind.relations() {
            let referent = match relation {
                Relation::Primary => catalog.primary.as_deref(),
                Relation::Join => catalog.join.as_deref(),
            };
            let reason = match referent {
                Some(target) if catalogs.iter().any(|other| other.name == target) => continue,
                Some(target) => format!("{relation} catalog {target} is not among the catalogs"),
                None => format!("catalog info names no {relation} catalog"),
            };
            return Err(AlmanacError::UnwritableCatalog {
                kind: catalog.kind,
                catalog: catalog.name.clone(),
                reason,
            });
        }
    }
    Ok(())
}

/// Generate and write a document for `catalog_dirs`.
pub fn generate_declaration(
    destination: &Path,
    namespace_prefix: &str,
    catalog_dirs: &[PathBuf],
    paths_relative: bool,
) -> Result<()> {
    let document =
        declaration_from_catalog_dirs(destination, namespace_prefix, catalog_dirs, paths_relative)?;
    write_document(destination, &document)
}

/// Replace `destination` atomically with pretty-printed JSON.
fn write_document(destination: &Path, document: &serde_json::Value) -> Result<()> {
    let dir = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let context = || format!("writing {}", destination.display());

    let mut file = NamedTempFile::new_in(dir).map_err(|err| AlmanacError::io(context(), err))?;
    let rendered = serde_json::to_string_pretty(document)
        .map_err(|err| AlmanacError::io(context(), err.into()))?;
    file.write_all(rendered.as_bytes())
        .and_then(|_| file.write_all(b"\n"))
        .map_err(|err| AlmanacError::io(context(), err))?;
    file.persist(destination)
        .map_err(|err| AlmanacError::io(context(), err.error))?;
    debug!(destination = %destination.display(), "wrote almanac");
    Ok(())
}
