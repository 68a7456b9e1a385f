//! Registry of data catalogs and the typed relationships between them.
//!
//! An almanac is declared in JSON documents (see [`declaration`]), parsed
//! into an unresolved description, then resolved into a [`CatalogRegistry`]
//! whose nodes link to their primary/join catalogs and list their dependents
//! (sources, indexes, neighbors, associations). The helper binaries layer
//! reporting, generation and runtime registration on top of these types.

use std::path::Path;

pub mod catalog;
pub mod config;
pub mod declaration;
pub mod error;
pub mod report;
pub mod resolver;
mod schema_loader;
pub mod sidecar;
pub mod writer;

pub use catalog::{
    AddedCatalog, CatalogId, CatalogKind, CatalogNode, CatalogRegistry, EdgeSet, NameMismatch,
    Relation, UnlinkedReference,
};
pub use declaration::{
    AlmanacDeclaration, CatalogDeclaration, NamespaceDeclaration, parse_almanac,
    parse_almanac_str, parse_almanac_with_prefix,
};
pub use error::{AlmanacError, Result};
pub use report::{render, render_kind};
pub use resolver::resolve;
pub use sidecar::{CATALOG_INFO_FILE, CatalogInfo};
pub use writer::{generate_declaration, to_declaration, write_declaration};

/// A parsed declaration together with the registry resolved from it.
#[derive(Debug)]
pub struct Almanac {
    declaration: AlmanacDeclaration,
    registry: CatalogRegistry,
}

impl Almanac {
    /// Parse and resolve the document at `path`, including everything it
    /// includes. Construction is all-or-nothing.
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_declaration(parse_almanac(path)?)
    }

    pub fn from_declaration(declaration: AlmanacDeclaration) -> Result<Self> {
        let registry = resolve(&declaration)?;
        Ok(Self {
            declaration,
            registry,
        })
    }

    pub fn declaration(&self) -> &AlmanacDeclaration {
        &self.declaration
    }

    pub fn registry(&self) -> &CatalogRegistry {
        &self.registry
    }

    /// Mutable access for runtime registration via
    /// [`CatalogRegistry::add_catalog`].
    pub fn registry_mut(&mut self) -> &mut CatalogRegistry {
        &mut self.registry
    }

    pub fn into_registry(self) -> CatalogRegistry {
        self.registry
    }
}
