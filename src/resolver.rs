//! Two-pass graph construction from a parsed declaration.
//!
//! Pass one creates a node for every declared catalog so forward references
//! (later in the document, or in another included document) resolve; pass two
//! links each dependent to its referents. Any failure discards the partially
//! built registry.

use crate::catalog::{CatalogNode, CatalogRegistry};
use crate::declaration::AlmanacDeclaration;
use crate::error::{AlmanacError, Result};
use tracing::debug;

/// Build a fully linked registry from `declaration`.
pub fn resolve(declaration: &AlmanacDeclaration) -> Result<CatalogRegistry> {
    let declared = declaration.catalogs();
    let mut registry = CatalogRegistry::new();

    let mut ids = Vec::with_capacity(declared.len());
    for entry in &declared {
        let catalog = entry.catalog;
        let node = CatalogNode::new(catalog.name.clone(), catalog.path.clone(), catalog.kind)
            .with_namespace(entry.namespace)
            .with_annotations(&catalog.notes, &catalog.contact_info);
        ids.push(registry.insert(node)?);
    }

    for (entry, id) in declared.iter().zip(ids) {
        let catalog = entry.catalog;
        for relation in catalog.kind.relations() {
            // The parser guarantees required references are present.
            let Some(referent) = catalog.reference(*relation) else {
                return Err(AlmanacError::malformed(
                    &declaration.document,
                    format!("{} {} has no {relation} catalog", catalog.kind, catalog.name),
                ));
            };
            let target = registry
                .id_of(referent)
                .ok_or_else(|| AlmanacError::UnresolvedReference {
                    kind: catalog.kind,
                    relation: *relation,
                    catalog: catalog.name.clone(),
                    missing: referent.to_string(),
                })?;
            registry.link(id, *relation, target);
        }
    }

    debug!(
        document = %declaration.document.display(),
        catalogs = registry.len(),
        "resolved almanac"
    );
    Ok(registry)
}
