mod cli;
mod config;

use std::fs;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use typeshape::{SchemaBuilder, SourceIndex, TypeRef};

use crate::cli::Cli;
use crate::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    let output = run(&cli)?;
    match &cli.output {
        Some(path) => {
            fs::write(path, output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "schema written");
        }
        None => println!("{output}"),
    }
    Ok(())
}

/// Logs go to stderr so stdout carries only the document.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Index the sources, build every root and render the result as pretty JSON.
fn run(cli: &Cli) -> Result<String> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let mut index = SourceIndex::new();
    if let Some(dir) = &cli.dir {
        index.add_dir(dir)?;
    }
    for file in &cli.file {
        index
            .add_file(file)
            .with_context(|| format!("Failed to index {}", file.display()))?;
    }
    info!(declarations = index.len(), "source indexed");

    let roots = cli
        .roots
        .iter()
        .map(|root| {
            root.parse::<TypeRef>()
                .with_context(|| format!("Invalid root type `{root}`"))
        })
        .collect::<Result<Vec<_>>>()?;

    let set = SchemaBuilder::new(&index)
        .with_options(config.build.clone())
        .with_overrides(config.override_map())
        .build_many(&roots);

    let json = if cli.openapi {
        let openapi = set.into_openapi(&config.openapi.title, &config.openapi.version);
        serde_json::to_string_pretty(&openapi)?
    } else {
        serde_json::to_string_pretty(&set)?
    };
    Ok(json)
}
