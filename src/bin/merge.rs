//! k2list-merge: merge every list file under a directory into one list.

use clap::Parser;
use k2list::{deduplicate, Collector, ListWriter, MergeConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "k2list-merge")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Merge list files into one deduplicated list", long_about = None)]
struct Cli {
    /// Directory searched recursively for list files [default: .]
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Output file [default: full.list]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Extension of list files [default: list]
    #[arg(short, long)]
    extension: Option<String>,

    /// Do not read the output file back in when it lies under the root
    #[arg(long)]
    exclude_output: bool,

    /// YAML config file; flags given on the command line take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build_config(cli: Cli) -> k2list::Result<MergeConfig> {
    let mut config = match &cli.config {
        Some(path) => MergeConfig::load(path)?,
        None => MergeConfig::default(),
    };

    if let Some(root) = cli.root {
        config.root = root;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(extension) = cli.extension {
        config.extension = extension;
    }
    if cli.exclude_output {
        config.exclude_output = true;
    }

    config.validated()
}

fn run(cli: Cli) -> k2list::Result<()> {
    let config = build_config(cli)?;
    log::debug!("Using config: {:?}", config);

    println!("Reading list files...");
    let entries = Collector::from_config(&config).collect(&config.root)?;

    println!("Found {} entries. Deduplicating...", entries.len());
    let merged = deduplicate(&entries);
    log::info!("{}", merged.stats());

    println!(
        "{} unique entries remain. Saving to {}...",
        merged.len(),
        config.output.display()
    );
    ListWriter::new(&config.output).write(&merged)?;

    println!("Done!");
    Ok(())
}
