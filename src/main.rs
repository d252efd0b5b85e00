//! pathwalk - Filtered, depth-bounded directory listing.
//!
//! Usage:
//!   pathwalk walk [ROOT]      List directories and files below ROOT
//!   pathwalk expire <DIR>     Remove files older than a given age
//!   pathwalk --help           Show help

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use pathwalk_ops::{ExpireOptions, ExpireResult, FileLock, MacTime, TimestampDelta, start_expire};
use pathwalk_scan::{WalkConfig, WalkWarning, WarningKind, walk};

#[derive(Parser)]
#[command(
    name = "pathwalk",
    version,
    about = "Filtered, depth-bounded directory listing",
    long_about = "pathwalk lists the directories and files of a tree, filtered by glob \
                  patterns and extensions and bounded in depth.\n\n\
                  Set RUST_LOG for finer control over log output."
)]
struct Cli {
    /// Log debug information to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List directories and files below a root
    Walk(WalkArgs),

    /// Remove files whose timestamp is older than a given age
    Expire {
        /// Directory to clean up
        directory: PathBuf,

        /// Age threshold (e.g., "30d", "12h", "2w", "1y")
        #[arg(short, long, default_value = "30d")]
        older_than: String,

        /// Timestamp to compare
        #[arg(short, long, default_value = "modified")]
        time: TimeKind,

        /// Only report what would be removed
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}

#[derive(Args)]
struct WalkArgs {
    /// Root directory (defaults to current directory)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// First level to list (the root is level 1)
    #[arg(long, default_value = "1")]
    min_depth: u32,

    /// Deepest level to visit (0 = unlimited)
    #[arg(short = 'd', long, default_value = "0")]
    max_depth: u32,

    /// Skip directories matching this root-relative pattern
    #[arg(long = "exclude-dir", value_name = "PATTERN")]
    exclude_dir: Vec<String>,

    /// Only descend into directories matching this root-relative pattern
    #[arg(long = "include-dir", value_name = "PATTERN")]
    include_dir: Vec<String>,

    /// Skip files whose name matches this pattern
    #[arg(long = "exclude-file", value_name = "PATTERN")]
    exclude_file: Vec<String>,

    /// Only list files whose name matches this pattern
    #[arg(long = "include-file", value_name = "PATTERN")]
    include_file: Vec<String>,

    /// Skip files with this extension (e.g., ".log")
    #[arg(long = "exclude-ext", value_name = "EXT")]
    exclude_ext: Vec<String>,

    /// Only list files with this extension
    #[arg(long = "include-ext", value_name = "EXT")]
    include_ext: Vec<String>,

    /// Leave directories out of the listing
    #[arg(long)]
    no_dirs: bool,

    /// Leave files out of the listing
    #[arg(long)]
    no_files: bool,

    /// Do not descend into symlinked directories
    #[arg(long)]
    no_follow: bool,

    /// Print one JSON object per entry
    #[arg(long)]
    json: bool,
}

impl From<WalkArgs> for WalkConfig {
    fn from(args: WalkArgs) -> Self {
        WalkConfig {
            root: args.root,
            min_depth: args.min_depth,
            max_depth: args.max_depth,
            dir_exclude: args.exclude_dir,
            dir_include: args.include_dir,
            file_exclude: args.exclude_file,
            file_include: args.include_file,
            ext_exclude: args.exclude_ext,
            ext_include: args.include_ext,
            exclude_dirs: args.no_dirs,
            exclude_files: args.no_files,
            follow_symlinks: !args.no_follow,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TimeKind {
    Modified,
    /// Inode change time on Unix, creation time elsewhere
    Changed,
    Created,
    Accessed,
}

impl From<TimeKind> for MacTime {
    fn from(kind: TimeKind) -> Self {
        match kind {
            TimeKind::Modified => MacTime::Modified,
            TimeKind::Changed => MacTime::Changed,
            TimeKind::Created => MacTime::Created,
            TimeKind::Accessed => MacTime::Accessed,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Walk(args) => run_walk(args)?,
        Command::Expire {
            directory,
            older_than,
            time,
            dry_run,
        } => run_expire(directory, &older_than, time, dry_run)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_walk(args: WalkArgs) -> Result<()> {
    let json = args.json;
    let config = WalkConfig::from(args);
    let root = config.root.clone();

    let mut walker = walk(config).with_context(|| format!("Cannot walk {}", root.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for entry in walker.by_ref() {
        let entry = entry.context("Walk failed")?;
        if json {
            serde_json::to_writer(&mut out, &entry)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", entry.path.display())?;
        }
    }
    out.flush()?;

    let unreadable = unreadable_dirs(walker.warnings());
    if unreadable > 0 {
        eprintln!("{unreadable} directories could not be read");
    }
    Ok(())
}

fn run_expire(directory: PathBuf, older_than: &str, time: TimeKind, dry_run: bool) -> Result<()> {
    let age: TimestampDelta = older_than
        .parse()
        .with_context(|| format!("Invalid age {older_than:?}"))?;
    let options = ExpireOptions {
        mac: time.into(),
        delta: age.negated(),
        dry_run,
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    let complete = runtime.block_on(async {
        let mut rx = start_expire(directory.clone(), options, FileLock::global());
        let mut complete = None;
        while let Some(result) = rx.recv().await {
            match result {
                ExpireResult::Expired(path) => print_expired(&path, dry_run),
                ExpireResult::Progress(progress) => {
                    tracing::debug!(checked = progress.files_checked, "Expiry in progress");
                }
                ExpireResult::Complete(done) => complete = Some(done),
            }
        }
        complete
    });

    let Some(complete) = complete else {
        color_eyre::eyre::bail!("Expiry of {} stopped unexpectedly", directory.display());
    };

    for error in &complete.errors {
        eprintln!("  {error}");
    }
    println!(
        "{} ({})",
        complete.summary(),
        format_size(complete.bytes_processed)
    );

    if !complete.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_expired(path: &Path, dry_run: bool) {
    if dry_run {
        println!("would remove {}", path.display());
    } else {
        println!("removed {}", path.display());
    }
}

/// Count listing failures, leaving out per-entry metadata errors.
fn unreadable_dirs(warnings: &[WalkWarning]) -> usize {
    warnings
        .iter()
        .filter(|w| matches!(w.kind, WarningKind::PermissionDenied | WarningKind::ReadError))
        .count()
}

fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
