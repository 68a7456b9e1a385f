//! Writes an almanac declaration for a set of catalog directories.
//!
//! Each directory must carry a `catalog_info.json` sidecar; its name, type
//! and primary/join catalogs become one entry of a single namespace.

use almanac::config::init_logging;
use almanac::generate_declaration;
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
    generate_declaration(&args.output, &args.prefix, &args.catalog_dirs, args.relative)
        .with_context(|| format!("generating {}", args.output.display()))?;
    Ok(())
}

struct CliArgs {
    output: PathBuf,
    prefix: String,
    relative: bool,
    catalog_dirs: Vec<PathBuf>,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut output = None;
        let mut prefix = String::new();
        let mut relative = false;
        let mut catalog_dirs = Vec::new();

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--output" => output = Some(PathBuf::from(next_value(&mut args, "--output")?)),
                "--prefix" => prefix = next_value(&mut args, "--prefix")?,
                "--relative" => relative = true,
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => bail!("unknown flag: {flag}\n{}", usage()),
                dir => catalog_dirs.push(PathBuf::from(dir)),
            }
        }

        let Some(output) = output else {
            bail!("--output is required\n{}", usage());
        };
        if catalog_dirs.is_empty() {
            bail!("at least one catalog directory is required\n{}", usage());
        }

        Ok(CliArgs {
            output,
            prefix,
            relative,
            catalog_dirs,
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
    "Usage: almanac-generate --output PATH [--prefix NAMESPACE] [--relative] DIR...\n\
Writes a declaration with one catalog per directory, read from each directory's catalog_info.json.\n\
With --relative, DIRs are relative to the output file's directory and recorded as relative_path.\n"
}
