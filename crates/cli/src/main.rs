use clap::Parser;
use goimportsort_core::{
    parse_prefix_list, BatchResult, CategoryOrder, FileOutcome, ImportSorter, SortConfig,
    DEFAULT_ORDER,
};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "goimportsort")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sort Go import lines into inbuilt, external, and local groups")]
#[command(long_about = "Rewrites the import declarations of Go source files into a single \
    grouped import block: standard-library packages first, then third-party packages, then \
    project-local packages, each group alphabetically sorted and blank-line separated \
    (order configurable via --order). Directories are processed recursively, one parallel \
    task per file.\n\n\
    By default a single file is printed to stdout; use -w to rewrite files in place.")]
struct Args {
    /// Files or directories to process
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Print rewritten source of changed files to stdout
    #[arg(short, long)]
    list: bool,

    /// Write result back to the source files instead of stdout
    #[arg(short, long)]
    write: bool,

    /// Comma-separated prefixes of imports to place in the local group
    /// (defaults to the module path from go.mod)
    #[arg(long, default_value = "")]
    local: String,

    /// Category order, e.g. "ixl" variants over i=inbuilt, e=external, l=local
    #[arg(short, long, default_value = DEFAULT_ORDER)]
    order: String,

    /// Additional ignore patterns (glob style)
    #[arg(long, action = clap::ArgAction::Append)]
    ignore: Vec<String>,

    /// Ignore file path (defaults to .gitignore)
    #[arg(long)]
    ignore_file: Option<PathBuf>,

    /// Also process files under vendor/ and testdata/
    #[arg(long)]
    include_vendor: bool,

    /// Parallel threads (0 = auto)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let order = CategoryOrder::parse_lenient(&args.order);
    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut config = SortConfig::new(root)
        .with_order(order)
        .with_local_prefixes(parse_prefix_list(&args.local))
        .with_ignore_patterns(args.ignore.clone())
        .with_include_vendor(args.include_vendor)
        .with_threads(args.threads);
    if let Some(ignore_file) = args.ignore_file.clone() {
        config = config.with_ignore_file(ignore_file);
    }

    let sorter = ImportSorter::new(config)?;

    let mut failed = false;
    for path in &args.paths {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => {
                log::error!("{}: {err}", path.display());
                failed = true;
                continue;
            }
        };

        if metadata.is_dir() {
            let result = sorter.sort_dir(path)?;
            failed |= !report_batch(&args, result);
        } else {
            match sorter.sort_file(path) {
                Ok(outcome) => failed |= !handle_outcome(&args, &outcome, true),
                Err(err) => {
                    log::error!("{}: {err}", path.display());
                    failed = true;
                }
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Report a directory run; returns false if any file failed.
fn report_batch(args: &Args, result: BatchResult) -> bool {
    let mut ok = result.ok();
    for (path, err) in &result.failures {
        log::error!("{}: {err}", path.display());
    }
    for outcome in &result.outcomes {
        ok &= handle_outcome(args, outcome, false);
    }

    ok
}

/// Print or write one outcome per the flags; returns false on a write error.
fn handle_outcome(args: &Args, outcome: &FileOutcome, single_file: bool) -> bool {
    // default mode for a single file is gofmt-like: print to stdout
    let print_default = single_file && !args.list && !args.write;
    if print_default || (args.list && outcome.changed) {
        let stdout = io::stdout();
        if stdout.lock().write_all(&outcome.output).is_err() {
            return false;
        }
    }

    if args.write && outcome.changed {
        if let Err(err) = fs::write(&outcome.path, &outcome.output) {
            log::error!("could not write {}: {err}", outcome.path.display());
            return false;
        }
        log::info!("file {} has been changed", outcome.path.display());
    }

    true
}
