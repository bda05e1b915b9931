//! Config Inspector
//!
//! Loads a TOML or JSON config (following `__include__` directives) and prints
//! it as pretty JSON.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin inspect_config -- configs/train.toml
//! cargo run --bin inspect_config -- configs/train.toml --key model.loss
//! cargo run --bin inspect_config -- configs/train.toml --search-path configs/base
//! ```

use anyhow::{Context, Result};
use banet_burn::ConfigLoader;
use banet_demos::init_logging;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to load (.toml or .json)
    file: PathBuf,

    /// Print only the value at this dotted key
    #[arg(short, long)]
    key: Option<String>,

    /// Extra directories searched for included files
    #[arg(long = "search-path")]
    search_path: Vec<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut loader = args
        .search_path
        .iter()
        .fold(ConfigLoader::new(), |loader, dir| loader.with_search_dir(dir));

    let config = loader
        .load(&args.file)
        .with_context(|| format!("Failed to load config: {}", args.file.display()))?;

    let json = match &args.key {
        Some(key) => config
            .get_path(key)
            .with_context(|| format!("Key not found in {}: {key}", args.file.display()))?
            .to_json(),
        None => config.to_json(),
    };

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
