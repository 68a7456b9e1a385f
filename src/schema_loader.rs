//! JSON Schema check for declaration documents.
//!
//! The schema ships inside the binary so validation never depends on the
//! working directory. It only constrains document shape; kind names and
//! reference cardinality are left to the parser so its errors can name the
//! offending catalog.

use crate::error::{AlmanacError, Result};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;

pub const DECLARATION_SCHEMA: &str = include_str!("../schema/almanac.schema.json");

fn compile_declaration_schema() -> std::result::Result<JSONSchema, String> {
    let schema: Value = serde_json::from_str(DECLARATION_SCHEMA).map_err(|err| err.to_string())?;
    JSONSchema::compile(&schema).map_err(|err| err.to_string())
}

/// Compiled once per process and shared by every document and include.
fn declaration_schema() -> Result<&'static JSONSchema> {
    static COMPILED: OnceLock<std::result::Result<JSONSchema, String>> = OnceLock::new();
    COMPILED
        .get_or_init(compile_declaration_schema)
        .as_ref()
        .map_err(|message| AlmanacError::SchemaCompile(message.clone()))
}

/// Validate a parsed document against the declaration schema.
///
/// Every violation is reported, one per line, prefixed with its JSON pointer.
pub(crate) fn validate_declaration(document: &Path, value: &Value) -> Result<()> {
    let compiled = declaration_schema()?;
    if let Err(errors) = compiled.validate(value) {
        let details = errors
            .map(|err| {
                let pointer = err.instance_path.to_string();
                if pointer.is_empty() {
                    err.to_string()
                } else {
                    format!("{pointer}: {err}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        return Err(AlmanacError::malformed(
            document,
            format!("failed schema validation:\n{details}"),
        ));
    }
    Ok(())
}
