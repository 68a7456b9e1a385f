//! Prints the catalogs registered in an almanac.
//!
//! Loads the declaration document (`--file`, else `ALMANAC_FILE`, else
//! `./almanac.json`), resolves it, and prints every catalog with its
//! dependents. `--kind` narrows the listing; `--check` additionally verifies
//! that every edge collection mirrors the catalogs' references.

use almanac::config::{init_logging, resolve_almanac_path};
use almanac::{Almanac, CatalogKind, render, render_kind};
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
    let almanac =
        Almanac::open(&path).with_context(|| format!("loading almanac {}", path.display()))?;
    let registry = almanac.registry();

    if args.check {
        let errors = registry.consistency_errors();
        if !errors.is_empty() {
            bail!(
                "almanac {} is inconsistent:\n{}",
                path.display(),
                errors.join("\n")
            );
        }
    }

    let report = match args.kind {
        Some(kind) => render_kind(registry, kind),
        None => render(registry),
    };
    print!("{report}");
    Ok(())
}

struct CliArgs {
    file: Option<PathBuf>,
    kind: Option<CatalogKind>,
    check: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut file = None;
        let mut kind = None;
        let mut check = false;

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--file" => file = Some(PathBuf::from(next_value(&mut args, "--file")?)),
                "--kind" => {
                    let raw = next_value(&mut args, "--kind")?;
                    kind = Some(raw.parse::<CatalogKind>()?);
                }
                "--check" => check = true,
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n{}", usage()),
            }
        }

        Ok(CliArgs { file, kind, check })
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
    "Usage: almanac-report [--file PATH] [--kind object|source|index|neighbor|association] [--check]\n\
Prints every registered catalog with its sources, neighbors, associations and indexes.\n"
}
