use anyhow::Context;
use clap::Parser;
use mpa_pages::{ArgSources, FileConfig, Mpa, MpaConfig, MpaPlan, DEFAULT_CONFIG_FILE};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "mpa-pages",
    version,
    author,
    about = "Discover multi-page app entries and generate dev-server rewrites",
    long_about = "Discover multi-page app entries and generate dev-server rewrites.\n\n\
    Scans the scan directory for entry scripts, derives one page per entry, and \
    prints the bundler input map and the ordered history-fallback rewrite rules \
    as JSON.\n\n\
    USAGE EXAMPLES:\n  \
      # Everything for the current project\n  \
      mpa-pages\n\n  \
      # Only two pages, deployed under /app/\n  \
      mpa-pages --page home,shop/cart --base /app/\n\n  \
      # Which file does the dev server serve for a path?\n  \
      mpa-pages --resolve /shop/cart/items"
)]
struct Cli {
    /// Project root
    #[arg(short, long, default_value = ".", value_name = "PATH")]
    root: PathBuf,

    /// Config file (defaults to mpa.toml in the root, if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory scanned for entries, relative to the root
    #[arg(long, value_name = "DIR")]
    scan_dir: Option<String>,

    /// Entry file glob
    #[arg(long, value_name = "GLOB")]
    scan_file: Option<String>,

    /// HTML template filename next to each entry
    #[arg(long, value_name = "NAME")]
    filename: Option<String>,

    /// Comma-separated pages added to any page filter
    #[arg(long, value_name = "PAGES")]
    default_entries: Option<String>,

    /// Base URL the site is served under
    #[arg(long, value_name = "URL")]
    base: Option<String>,

    /// Only build these pages (comma-separated)
    #[arg(long, env = "MPA_ENTRY", value_name = "PAGES")]
    entry: Option<String>,

    /// Alias of --entry, used when --entry is empty
    #[arg(long, value_name = "PAGES")]
    file: Option<String>,

    /// Alias of --entry, used when --entry and --file are empty
    #[arg(long, value_name = "PAGES")]
    page: Option<String>,

    /// What to print
    #[arg(short, long, value_enum, default_value = "all")]
    emit: Emit,

    /// Print the rewrite that a request path resolves to
    #[arg(long, value_name = "URL_PATH")]
    resolve: Option<String>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Emit {
    /// Page catalog
    Pages,
    /// Bundler input map
    Input,
    /// Rewrite rules
    Rewrites,
    /// Scanned entries, including filtered ones
    Entries,
    /// Pages, input, rewrites and first page
    All,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    let mut builder = MpaConfig::builder().root(&cli.root);

    if let Some(scan_dir) = cli.scan_dir {
        builder = builder.scan_dir(scan_dir);
    }
    if let Some(scan_file) = cli.scan_file {
        builder = builder.scan_file(scan_file);
    }
    if let Some(filename) = cli.filename {
        builder = builder.filename(filename);
    }
    if let Some(default_entries) = cli.default_entries {
        builder = builder.default_entries(default_entries);
    }
    if let Some(base) = cli.base {
        builder = builder.base(base);
    }

    // An explicit --config must exist; the default file is optional.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.root.join(DEFAULT_CONFIG_FILE));
    if cli.config.is_some() || config_path.is_file() {
        let file = FileConfig::load(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        builder = builder.merge_file(file);
    }

    let config = builder.build().context("Failed to build configuration")?;

    let args = ArgSources {
        entry: cli.entry,
        file: cli.file,
        page: cli.page,
    };

    let plan = Mpa::new(config)
        .context("Failed to create planner")?
        .plan(&args)
        .context("Page discovery failed")?;

    let output = match cli.resolve {
        Some(path) => resolution(&plan, &path),
        None => emit(&plan, cli.emit)?,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to serialize output")?
    );

    Ok(())
}

fn emit(plan: &MpaPlan, emit: Emit) -> anyhow::Result<Value> {
    let value = match emit {
        Emit::Pages => serde_json::to_value(&plan.pages)?,
        Emit::Input => serde_json::to_value(&plan.input)?,
        Emit::Rewrites => serde_json::to_value(&plan.rewrites)?,
        Emit::Entries => json!({
            "glob": plan.report.glob,
            "args": plan.report.args,
            "entries": plan.report.all_entries,
        }),
        Emit::All => serde_json::to_value(plan)?,
    };
    Ok(value)
}

fn resolution(plan: &MpaPlan, path: &str) -> Value {
    match plan.resolve(path) {
        Some(rule) => json!({ "path": path, "from": rule.from, "to": rule.to }),
        None => json!({ "path": path, "from": null, "to": null }),
    }
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("mpa_pages=info"),
        1 => EnvFilter::new("mpa_pages=debug"),
        _ => EnvFilter::new("mpa_pages=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .init();

    Ok(())
}
