//! Error conditions surfaced by almanac parsing, resolution and mutation.

use crate::catalog::{CatalogKind, Relation};
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AlmanacError> = std::result::Result<T, E>;

/// Every fatal condition the core can report.
///
/// Variants carry the offending catalog name (and relationship kind where one
/// applies) so callers can print them without extra context.
#[derive(Debug, Error)]
pub enum AlmanacError {
    /// Unknown kind, bad reference cardinality, missing attribute, bad shape.
    #[error("malformed declaration in {}: {message}", .document.display())]
    MalformedDeclaration { document: PathBuf, message: String },

    #[error("duplicate catalog name '{0}'")]
    DuplicateCatalogName(String),

    #[error("{kind} {catalog} missing {relation} catalog {missing}")]
    UnresolvedReference {
        kind: CatalogKind,
        relation: Relation,
        catalog: String,
        missing: String,
    },

    #[error("catalog '{0}' not found")]
    CatalogNotFound(String),

    #[error("no directory exists at {}", .0.display())]
    MissingCatalogDirectory(PathBuf),

    #[error("no catalog info found where expected: {}", .0.display())]
    MissingMetadataSidecar(PathBuf),

    #[error("invalid catalog info {}: {source}", .path.display())]
    InvalidSidecar {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A catalog whose relationship could not be written so that the
    /// document would load again.
    #[error("{kind} {catalog} cannot be written: {reason}")]
    UnwritableCatalog {
        kind: CatalogKind,
        catalog: String,
        reason: String,
    },

    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("declaration schema failed to compile: {0}")]
    SchemaCompile(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl AlmanacError {
    pub(crate) fn malformed(document: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AlmanacError::MalformedDeclaration {
            document: document.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        AlmanacError::Io {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_reference_names_kind_dependent_and_referent() {
        let err = AlmanacError::UnresolvedReference {
            kind: CatalogKind::Source,
            relation: Relation::Primary,
            catalog: "detections".to_string(),
            missing: "object".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "source detections missing primary catalog object"
        );
    }

    #[test]
    fn malformed_declaration_names_document() {
        let err = AlmanacError::malformed("/tmp/almanac.json", "index idx has no primary catalog");
        let message = err.to_string();
        assert!(message.contains("/tmp/almanac.json"));
        assert!(message.contains("index idx has no primary catalog"));
    }
}
