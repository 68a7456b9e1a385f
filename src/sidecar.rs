//! Per-catalog metadata sidecar (`catalog_info.json`).
//!
//! Each catalog directory carries a flat JSON record naming the catalog and,
//! for dependent catalogs, the catalogs it relates to. The registry mutation
//! API and the declaration generator read it; nothing here touches the graph.

use crate::catalog::{CatalogKind, Relation};
use crate::error::{AlmanacError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CATALOG_INFO_FILE: &str = "catalog_info.json";

#[derive(Clone, Debug, Deserialize, Serialize)]
/// Recognized sidecar keys plus whatever else the catalog writer recorded.
pub struct CatalogInfo {
    pub catalog_name: String,
    #[serde(default)]
    pub catalog_type: Option<CatalogKind>,
    #[serde(default)]
    pub primary_catalog: Option<String>,
    #[serde(default)]
    pub join_catalog: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CatalogInfo {
    /// Read the sidecar under `catalog_dir`.
    ///
    /// A missing directory and a directory without a sidecar are reported as
    /// distinct conditions.
    pub fn load(catalog_dir: &Path) -> Result<Self> {
        if !catalog_dir.exists() {
            return Err(AlmanacError::MissingCatalogDirectory(
                catalog_dir.to_path_buf(),
            ));
        }
        let sidecar = sidecar_path(catalog_dir);
        if !sidecar.is_file() {
            return Err(AlmanacError::MissingMetadataSidecar(sidecar));
        }
        let data = fs::read_to_string(&sidecar)
            .map_err(|err| AlmanacError::io(format!("reading {}", sidecar.display()), err))?;
        serde_json::from_str(&data).map_err(|source| AlmanacError::InvalidSidecar {
            path: sidecar,
            source,
        })
    }

    pub fn kind(&self) -> CatalogKind {
        self.catalog_type.unwrap_or_default()
    }

    pub fn reference(&self, relation: Relation) -> Option<&str> {
        match relation {
            Relation::Primary => self.primary_catalog.as_deref(),
            Relation::Join => self.join_catalog.as_deref(),
        }
    }
}

pub fn sidecar_path(catalog_dir: &Path) -> PathBuf {
    catalog_dir.join(CATALOG_INFO_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn load_reads_known_keys_and_keeps_extras() {
        let dir = TempDir::new().unwrap();
        fs::write(
            sidecar_path(dir.path()),
            json!({
                "catalog_name": "detections",
                "catalog_type": "source",
                "primary_catalog": "object",
                "total_rows": 131
            })
            .to_string(),
        )
        .unwrap();

        let info = CatalogInfo::load(dir.path()).unwrap();
        assert_eq!(info.catalog_name, "detections");
        assert_eq!(info.kind(), CatalogKind::Source);
        assert_eq!(info.reference(Relation::Primary), Some("object"));
        assert_eq!(info.reference(Relation::Join), None);
        assert_eq!(info.extra.get("total_rows"), Some(&json!(131)));
    }

    #[test]
    fn kind_defaults_to_object() {
        let info: CatalogInfo = serde_json::from_value(json!({"catalog_name": "x"})).unwrap();
        assert_eq!(info.kind(), CatalogKind::Object);
    }

    #[test]
    fn missing_directory_and_sidecar_are_distinct() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            CatalogInfo::load(&missing),
            Err(AlmanacError::MissingCatalogDirectory(path)) if path == missing
        ));
        assert!(matches!(
            CatalogInfo::load(dir.path()),
            Err(AlmanacError::MissingMetadataSidecar(path)) if path.ends_with(CATALOG_INFO_FILE)
        ));
    }

    #[test]
    fn unknown_type_in_sidecar_is_invalid() {
        let dir = TempDir::new().unwrap();
        fs::write(
            sidecar_path(dir.path()),
            r#"{"catalog_name": "x", "catalog_type": "margin"}"#,
        )
        .unwrap();
        assert!(matches!(
            CatalogInfo::load(dir.path()),
            Err(AlmanacError::InvalidSidecar { .. })
        ));
    }
}
