//! Plain-text report of a resolved registry.

use crate::catalog::{CatalogId, CatalogKind, CatalogNode, CatalogRegistry};
use std::fmt::{self, Write};

/// Display adapter for one node and its dependents.
pub struct NodeReport<'a> {
    registry: &'a CatalogRegistry,
    node: &'a CatalogNode,
}

impl<'a> NodeReport<'a> {
    pub fn new(registry: &'a CatalogRegistry, node: &'a CatalogNode) -> Self {
        Self { registry, node }
    }

    fn members(&self, f: &mut fmt::Formatter<'_>, ids: &[CatalogId], marker: &str) -> fmt::Result {
        for name in self.registry.names(ids) {
            writeln!(f, "    {marker}{name}")?;
        }
        Ok(())
    }
}

impl fmt::Display for NodeReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node;
        writeln!(f, "{} ({})", node.name(), node.kind())?;
        if !node.sources().is_empty() {
            writeln!(f, "  sources")?;
            self.members(f, node.sources(), "")?;
        }
        if !node.neighbors().is_empty() {
            writeln!(f, "  neighbors")?;
            self.members(f, node.neighbors(), "")?;
        }
        if !node.associations().is_empty() || !node.associations_right().is_empty() {
            writeln!(f, "  associations")?;
            self.members(f, node.associations(), "")?;
            // Right-hand members: this catalog is the association's join side.
            self.members(f, node.associations_right(), "** ")?;
        }
        if !node.indexes().is_empty() {
            writeln!(f, "  indexes")?;
            self.members(f, node.indexes(), "")?;
        }
        Ok(())
    }
}

/// Report every catalog in insertion order.
pub fn render(registry: &CatalogRegistry) -> String {
    render_nodes(registry, "--ALL CATALOGS--", registry.catalogs())
}

/// Report the catalogs of one kind, e.g. `--ALL OBJECT CATALOGS--`.
pub fn render_kind(registry: &CatalogRegistry, kind: CatalogKind) -> String {
    let heading = format!("--ALL {} CATALOGS--", kind.as_str().to_uppercase());
    render_nodes(registry, &heading, registry.of_kind(kind))
}

fn render_nodes<'a>(
    registry: &'a CatalogRegistry,
    heading: &str,
    nodes: impl Iterator<Item = &'a CatalogNode>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{heading}");
    for node in nodes {
        let _ = writeln!(out, "{}", NodeReport::new(registry, node));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::parse_almanac_str;
    use crate::resolver::resolve;
    use serde_json::json;
    use std::path::Path;

    fn registry() -> CatalogRegistry {
        let doc = json!({"namespace": [{"catalog": [
            {"name": "object", "path": "/o"},
            {"name": "detections", "path": "/d", "type": "source", "primary": "object"},
            {"name": "object_to_detections", "path": "/a", "type": "association",
             "primary": "object", "join": "detections"}
        ]}]});
        let declaration =
            parse_almanac_str(&doc.to_string(), Path::new("/almanacs/root.json")).unwrap();
        resolve(&declaration).unwrap()
    }

    #[test]
    fn reverse_associations_are_marked() {
        let registry = registry();
        let detections = registry.lookup("detections").unwrap();
        assert_eq!(
            NodeReport::new(&registry, detections).to_string(),
            "detections (source)\n  associations\n    ** object_to_detections\n"
        );
        let object = registry.lookup("object").unwrap();
        assert_eq!(
            NodeReport::new(&registry, object).to_string(),
            "object (object)\n  sources\n    detections\n  associations\n    object_to_detections\n"
        );
    }

    #[test]
    fn kind_report_filters_and_heads() {
        let registry = registry();
        let report = render_kind(&registry, CatalogKind::Source);
        assert!(report.starts_with("--ALL SOURCE CATALOGS--\n"));
        assert!(report.contains("detections (source)"));
        assert!(!report.contains("object (object)"));

        let full = render(&registry);
        assert!(full.starts_with("--ALL CATALOGS--\n"));
        assert!(full.contains("object_to_detections (association)"));
    }
}
