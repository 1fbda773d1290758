use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use framebench::{
    build, load_seed_csv, mtcars, persist, BenchConfig, ConfigOverlay, Reporter, ResultTable,
    Session,
};

/// Time tabular operations across implementations and plot the results
#[derive(Parser, Debug)]
#[command(name = "framebench", version)]
struct Cli {
    /// TOML file overriding the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed table as CSV (columns model, mpg, cyl, hp); defaults to mtcars
    #[arg(long)]
    seed_csv: Option<PathBuf>,

    /// Target dataset rows (rounded up to whole seed copies)
    #[arg(long)]
    rows: Option<usize>,

    /// Timed repetitions per operation and method
    #[arg(long)]
    reps: Option<usize>,

    /// Untimed warmup runs before each measurement
    #[arg(long)]
    warmup: Option<usize>,

    /// Methods in benchmark order, comma separated
    #[arg(long, value_delimiter = ',')]
    methods: Option<Vec<String>>,

    /// Plot file; `.pdf` or `.svg`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Plot title
    #[arg(long)]
    title: Option<String>,

    /// Also export raw timings as CSV
    #[arg(long)]
    results_csv: Option<PathBuf>,

    /// Also export raw timings as JSON
    #[arg(long)]
    results_json: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn overlay(&self) -> ConfigOverlay {
        ConfigOverlay {
            target_rows: self.rows,
            repetitions: self.reps,
            warmup: self.warmup,
            methods: self.methods.clone(),
            output: self.output.clone(),
            params: None,
        }
    }
}

fn print_summary(results: &ResultTable) {
    println!(
        "{:<16} {:<11} {:>5} {:>11} {:>11} {:>11}",
        "operation", "method", "n", "min_ms", "median_ms", "max_ms"
    );
    for row in results.summary() {
        println!(
            "{:<16} {:<11} {:>5} {:>11.4} {:>11.4} {:>11.4}",
            row.operation.name(),
            row.method.label(),
            row.samples,
            row.min_ms,
            row.median_ms,
            row.max_ms
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = BenchConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.merge(&cli.overlay());
    config.validate().context("invalid configuration")?;

    let seed = match &cli.seed_csv {
        Some(path) => load_seed_csv(path)
            .with_context(|| format!("loading seed table from {}", path.display()))?,
        None => mtcars(),
    };
    let dataset = build(&seed, config.target_rows).context("building dataset")?;
    info!(
        rows = dataset.row_count(),
        replicas = dataset.replicas(),
        "dataset ready"
    );

    let output = Session::new(&config, dataset)
        .context("preparing benchmark")?
        .run()
        .context("benchmark failed")?;
    print_summary(&output.results);

    if let Some(path) = &cli.results_csv {
        output.results.write_csv(path).context("exporting CSV results")?;
    }
    if let Some(path) = &cli.results_json {
        output.results.write_json(path).context("exporting JSON results")?;
    }

    let mut reporter = Reporter::new();
    if let Some(title) = &cli.title {
        reporter = reporter.with_title(title.as_str());
    }
    let artifact = reporter
        .render(&output.results)
        .context("rendering plot")?;
    if let Err(e) = persist(&artifact, &config.output) {
        error!(error = %e, "plot not saved; timings are in the summary above");
        return Err(e).context("saving plot");
    }
    Ok(())
}
