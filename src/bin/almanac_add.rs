//! Registers one catalog directory in an existing almanac.
//!
//! The almanac is loaded and resolved, the catalog is added from its
//! `catalog_info.json`, and the registry is written back (to `--output`, or
//! over the input document). Added catalogs are not linked to other catalogs;
//! any relationship the sidecar declares is reported on stderr and written
//! into the document, where the next load links it. Nothing is written when
//! a relationship has no registered referent.

use almanac::config::{init_logging, resolve_almanac_path};
use almanac::{Almanac, CatalogKind, write_declaration};
use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    let path = resolve_almanac_path(args.file.as_deref());
    let mut almanac =
        Almanac::open(&path).with_context(|| format!("loading almanac {}", path.display()))?;

    let added = almanac
        .registry_mut()
        .add_catalog(&args.name, &args.catalog_dir, args.kind, args.overwrite)
        .with_context(|| format!("adding catalog {}", args.name))?;

    if let Some(mismatch) = &added.name_mismatch {
        eprintln!(
            "almanac-add: warning - catalog names don't match ({} vs {})",
            mismatch.registered, mismatch.declared
        );
    }
    for unlinked in &added.unlinked {
        eprintln!(
            "almanac-add: {} {} was not linked{}",
            args.name,
            unlinked.relation,
            unlinked
                .target
                .as_deref()
                .map(|target| format!(" (sidecar names {target})"))
                .unwrap_or_default()
        );
    }

    let output = args.output.unwrap_or(path);
    write_declaration(almanac.registry(), &output)
        .with_context(|| format!("writing {}", output.display()))?;
    Ok(())
}

struct CliArgs {
    file: Option<PathBuf>,
    output: Option<PathBuf>,
    name: String,
    catalog_dir: PathBuf,
    kind: Option<CatalogKind>,
    overwrite: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut file = None;
        let mut output = None;
        let mut name = None;
        let mut catalog_dir = None;
        let mut kind = None;
        let mut overwrite = false;

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--file" => file = Some(PathBuf::from(next_value(&mut args, "--file")?)),
                "--output" => output = Some(PathBuf::from(next_value(&mut args, "--output")?)),
                "--name" => name = Some(next_value(&mut args, "--name")?),
                "--path" => catalog_dir = Some(PathBuf::from(next_value(&mut args, "--path")?)),
                "--kind" => {
                    let raw = next_value(&mut args, "--kind")?;
                    kind = Some(raw.parse::<CatalogKind>()?);
                }
                "--overwrite" => overwrite = true,
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n{}", usage()),
            }
        }

        let (Some(name), Some(catalog_dir)) = (name, catalog_dir) else {
            bail!("--name and --path are required\n{}", usage());
        };

        Ok(CliArgs {
            file,
            output,
            name,
            catalog_dir,
            kind,
            overwrite,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = std::ffi::OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow::anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: almanac-add [--file PATH] --name NAME --path DIR [--kind KIND] [--overwrite] [--output PATH]\n\
Adds the catalog at DIR under NAME and rewrites the almanac. Existing names require --overwrite.\n"
}
