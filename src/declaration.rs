//! Almanac declaration documents.
//!
//! A declaration document lists catalogs grouped into (possibly nested)
//! namespaces and may pull in further documents through `include` entries.
//! Parsing produces an unresolved description: catalog references stay plain
//! names until the resolver links them.
//!
//! ```json
//! {
//!   "include": [{"relative_path": "other/almanac.json"}],
//!   "namespace": [{
//!     "prefix": "survey",
//!     "catalog": [
//!       {"name": "object", "path": "/data/object"},
//!       {"name": "detections", "relative_path": "det", "type": "source", "primary": "object"}
//!     ]
//!   }]
//! }
//! ```

use crate::catalog::{CatalogKind, Relation};
use crate::error::{AlmanacError, Result};
use crate::schema_loader::validate_declaration;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Debug, Default)]
/// One parsed document plus everything it includes.
pub struct AlmanacDeclaration {
    pub document: PathBuf,
    pub notes: Vec<String>,
    pub contact_info: Vec<String>,
    pub namespaces: Vec<NamespaceDeclaration>,
    pub included: Vec<AlmanacDeclaration>,
}

#[derive(Clone, Debug, Default)]
pub struct NamespaceDeclaration {
    /// Prefix as written on this namespace.
    pub prefix: String,
    /// Prefix joined with every enclosing namespace, `outer:inner`.
    pub full_name: String,
    pub catalogs: Vec<CatalogDeclaration>,
    pub namespaces: Vec<NamespaceDeclaration>,
}

#[derive(Clone, Debug)]
/// A catalog entry with its references still carried by name.
pub struct CatalogDeclaration {
    pub name: String,
    pub path: PathBuf,
    pub kind: CatalogKind,
    pub primary: Option<String>,
    pub join: Option<String>,
    pub notes: Vec<String>,
    pub contact_info: Vec<String>,
}

/// A catalog declaration together with the namespace it was declared in.
#[derive(Clone, Copy, Debug)]
pub struct DeclaredCatalog<'a> {
    pub namespace: &'a str,
    pub catalog: &'a CatalogDeclaration,
}

impl CatalogDeclaration {
    pub fn reference(&self, relation: Relation) -> Option<&str> {
        match relation {
            Relation::Primary => self.primary.as_deref(),
            Relation::Join => self.join.as_deref(),
        }
    }
}

impl AlmanacDeclaration {
    /// Every catalog declaration in resolution order.
    ///
    /// Included documents come first, in declaration order and depth first,
    /// then this document's namespaces; a namespace's own catalogs precede
    /// those of its nested namespaces.
    pub fn catalogs(&self) -> Vec<DeclaredCatalog<'_>> {
        let mut out = Vec::new();
        self.collect_catalogs(&mut out);
        out
    }

    fn collect_catalogs<'a>(&'a self, out: &mut Vec<DeclaredCatalog<'a>>) {
        for included in &self.included {
            included.collect_catalogs(out);
        }
        for namespace in &self.namespaces {
            namespace.collect_catalogs(out);
        }
    }
}

impl NamespaceDeclaration {
    fn collect_catalogs<'a>(&'a self, out: &mut Vec<DeclaredCatalog<'a>>) {
        out.extend(self.catalogs.iter().map(|catalog| DeclaredCatalog {
            namespace: &self.full_name,
            catalog,
        }));
        for nested in &self.namespaces {
            nested.collect_catalogs(out);
        }
    }
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    include: Vec<RawInclude>,
    #[serde(default)]
    namespace: Vec<RawNamespace>,
    #[serde(default)]
    notes: Vec<String>,
    #[serde(default)]
    contact_info: Vec<String>,
}

#[derive(Deserialize)]
struct RawInclude {
    path: Option<String>,
    relative_path: Option<String>,
}

#[derive(Deserialize)]
struct RawNamespace {
    prefix: Option<String>,
    #[serde(default)]
    catalog: Vec<RawCatalog>,
    #[serde(default)]
    namespace: Vec<RawNamespace>,
}

#[derive(Deserialize)]
struct RawCatalog {
    name: Option<String>,
    path: Option<String>,
    relative_path: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    primary: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    join: Vec<String>,
    #[serde(default)]
    notes: Vec<String>,
    #[serde(default)]
    contact_info: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

/// Parse the document at `path` and every document it includes.
pub fn parse_almanac(path: &Path) -> Result<AlmanacDeclaration> {
    parse_almanac_with_prefix(path, "")
}

/// Like [`parse_almanac`], nesting every namespace under `namespace_prefix`.
pub fn parse_almanac_with_prefix(path: &Path, namespace_prefix: &str) -> Result<AlmanacDeclaration> {
    let mut stack = Vec::new();
    parse_document(path, namespace_prefix, &mut stack)
}

/// Parse declaration text as if it had been read from `document`.
///
/// Relative paths and includes resolve against `document`'s directory.
pub fn parse_almanac_str(contents: &str, document: &Path) -> Result<AlmanacDeclaration> {
    let mut stack = vec![canonical_or_given(document)];
    parse_contents(contents, document, "", &mut stack)
}

fn parse_document(
    path: &Path,
    prefix: &str,
    stack: &mut Vec<PathBuf>,
) -> Result<AlmanacDeclaration> {
    let canonical = fs::canonicalize(path)
        .map_err(|err| AlmanacError::io(format!("resolving {}", path.display()), err))?;
    if stack.contains(&canonical) {
        return Err(AlmanacError::malformed(
            path,
            format!("include cycle through {}", canonical.display()),
        ));
    }
    let contents = fs::read_to_string(path)
        .map_err(|err| AlmanacError::io(format!("reading {}", path.display()), err))?;

    stack.push(canonical);
    let parsed = parse_contents(&contents, path, prefix, stack);
    stack.pop();
    parsed
}

fn parse_contents(
    contents: &str,
    document: &Path,
    prefix: &str,
    stack: &mut Vec<PathBuf>,
) -> Result<AlmanacDeclaration> {
    let value: Value = serde_json::from_str(contents)
        .map_err(|err| AlmanacError::malformed(document, format!("invalid JSON: {err}")))?;
    validate_declaration(document, &value)?;
    // Re-read from text: a `Value` keeps only the last of duplicate keys, the
    // derived structs reject them.
    let raw: RawDocument = serde_json::from_str(contents)
        .map_err(|err| AlmanacError::malformed(document, err.to_string()))?;

    let mut included = Vec::with_capacity(raw.include.len());
    for include in &raw.include {
        let target = resolve_location(
            document,
            include.path.as_deref(),
            include.relative_path.as_deref(),
        )
        .ok_or_else(|| AlmanacError::malformed(document, "include has no path or relative_path"))?;
        debug!(document = %document.display(), include = %target.display(), "including almanac");
        included.push(parse_document(&target, prefix, stack)?);
    }

    let namespaces = raw
        .namespace
        .iter()
        .map(|namespace| parse_namespace(document, namespace, prefix))
        .collect::<Result<Vec<_>>>()?;

    Ok(AlmanacDeclaration {
        document: document.to_path_buf(),
        notes: raw.notes,
        contact_info: raw.contact_info,
        namespaces,
        included,
    })
}

fn parse_namespace(
    document: &Path,
    raw: &RawNamespace,
    parent: &str,
) -> Result<NamespaceDeclaration> {
    let prefix = raw.prefix.clone().unwrap_or_default();
    let full_name = join_namespace(parent, &prefix);
    debug!(namespace = %full_name, catalogs = raw.catalog.len(), "parsing namespace");

    let catalogs = raw
        .catalog
        .iter()
        .map(|catalog| parse_catalog(document, catalog, &full_name))
        .collect::<Result<Vec<_>>>()?;
    let namespaces = raw
        .namespace
        .iter()
        .map(|nested| parse_namespace(document, nested, &full_name))
        .collect::<Result<Vec<_>>>()?;

    Ok(NamespaceDeclaration {
        prefix,
        full_name,
        catalogs,
        namespaces,
    })
}

fn parse_catalog(document: &Path, raw: &RawCatalog, namespace: &str) -> Result<CatalogDeclaration> {
    let name = raw
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| {
            AlmanacError::malformed(
                document,
                format!("catalog in namespace '{namespace}' has no name"),
            )
        })?;
    let path = resolve_location(document, raw.path.as_deref(), raw.relative_path.as_deref())
        .ok_or_else(|| {
            AlmanacError::malformed(document, format!("catalog {name} has no path or relative_path"))
        })?;
    let kind = match raw.kind.as_deref() {
        None => CatalogKind::Object,
        Some(value) => value
            .parse()
            .map_err(|err| AlmanacError::malformed(document, format!("catalog {name}: {err}")))?,
    };

    let mut declaration = CatalogDeclaration {
        name,
        path,
        kind,
        primary: None,
        join: None,
        notes: raw.notes.clone(),
        contact_info: raw.contact_info.clone(),
    };
    for relation in kind.relations() {
        let candidates = match relation {
            Relation::Primary => &raw.primary,
            Relation::Join => &raw.join,
        };
        let linked = single_reference(document, candidates, kind, *relation, &declaration.name)?;
        match relation {
            Relation::Primary => declaration.primary = Some(linked),
            Relation::Join => declaration.join = Some(linked),
        }
    }
    Ok(declaration)
}

fn single_reference(
    document: &Path,
    candidates: &[String],
    kind: CatalogKind,
    relation: Relation,
    catalog: &str,
) -> Result<String> {
    match candidates {
        [single] => Ok(single.clone()),
        [] => Err(AlmanacError::malformed(
            document,
            format!("{kind} {catalog} has no {relation} catalog"),
        )),
        _ => Err(AlmanacError::malformed(
            document,
            format!("{kind} {catalog} has too many {relation} catalogs"),
        )),
    }
}

/// Absolute `path` wins; otherwise `relative_path` joins the document's
/// directory.
fn resolve_location(document: &Path, path: Option<&str>, relative: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = path.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let relative = relative.filter(|p| !p.is_empty())?;
    let base = document.parent().unwrap_or_else(|| Path::new(""));
    Some(base.join(relative))
}

fn join_namespace(parent: &str, part: &str) -> String {
    match (parent.is_empty(), part.is_empty()) {
        (true, _) => part.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{parent}:{part}"),
    }
}

fn canonical_or_given(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
