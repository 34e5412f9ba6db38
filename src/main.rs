//! route-bench: measure route table memory and dispatch speed of HTTP routers.
//!
//! # Startup
//!
//! ```text
//! parse CLI → load config (file or defaults) → apply CLI overrides
//!     → validate → init logging → Harness::new → run → render to stdout
//! ```
//!
//! The tracking allocator is installed here so memory profiling and
//! per-dispatch allocation counts are available.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use route_bench::config::{self, BenchConfig, ConfigError};
use route_bench::harness::SCENARIOS;
use route_bench::observability::init_logging;
use route_bench::{adapters, report, Harness, ReportFormat, TrackingAllocator};

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

#[derive(Parser)]
#[command(name = "route-bench")]
#[command(about = "Benchmark HTTP router memory footprint and dispatch speed", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Regex selecting routers by name
    #[arg(short, long)]
    routers: Option<String>,

    /// Regex selecting scenarios by name
    #[arg(short, long)]
    scenarios: Option<String>,

    /// Output format: table, json or prometheus
    #[arg(short, long)]
    format: Option<ReportFormat>,

    /// Target wall time per measurement
    #[arg(long)]
    bench_time_ms: Option<u64>,

    /// Run exactly this many passes instead of calibrating
    #[arg(long)]
    iterations: Option<u64>,

    /// Heap settle passes around each build
    #[arg(long)]
    settle_passes: Option<u32>,

    /// Skip route table memory profiling
    #[arg(long)]
    no_memory: bool,

    /// Query string appended to every request
    #[arg(long)]
    query: Option<String>,

    /// List routers and scenarios, then exit
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn apply(&self, config: &mut BenchConfig) {
        if let Some(routers) = &self.routers {
            config.selection.routers = Some(routers.clone());
        }
        if let Some(scenarios) = &self.scenarios {
            config.selection.scenarios = Some(scenarios.clone());
        }
        if let Some(format) = self.format {
            config.report.format = format;
        }
        if let Some(ms) = self.bench_time_ms {
            config.simulator.bench_time_ms = ms;
        }
        if let Some(iterations) = self.iterations {
            config.simulator.fixed_iterations = Some(iterations);
        }
        if let Some(passes) = self.settle_passes {
            config.memory.settle_passes = passes;
        }
        if self.no_memory {
            config.memory.enabled = false;
        }
        if let Some(query) = &self.query {
            config.simulator.query = Some(query.clone());
        }
    }
}

fn list() {
    println!("routers:");
    for adapter in adapters::registry() {
        let caps = adapter.capabilities();
        println!(
            "  {:<8} params={} catch_all={}",
            adapter.name(),
            caps.params,
            caps.catch_all
        );
    }
    println!("scenarios:");
    for scenario in SCENARIOS {
        println!("  {:<12} fixture={}", scenario.name, scenario.fixture());
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list {
        list();
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => BenchConfig::default(),
    };
    cli.apply(&mut config);
    config::validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability.log_level)?;
    tracing::info!(
        config = ?cli.config,
        memory = config.memory.enabled,
        format = %config.report.format,
        "route-bench starting"
    );

    let harness = Harness::new(&config)?;
    let run = harness.run();
    print!("{}", report::render(&run, config.report.format)?);

    let failures = run.failures().count();
    if failures > 0 {
        tracing::warn!(failures, "some measurements failed");
    }
    Ok(())
}
