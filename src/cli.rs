use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;

use crate::catalog::{ModuleCatalog, ModuleId, ModuleKind};
use crate::config::{RunConfig, DEFAULT_OUTPUT_DIR};
use crate::error::ChainResult;
use crate::logging::init_tracing;
use crate::optimizer::{enumerate_setup, full_setup, solve_grid, CandidateSet, RunParameters};
use crate::output::{format_solution, format_tier, write_candidate_csv, write_grid_csv};
use crate::parallel::WorkerPool;

#[derive(Debug, Parser)]
#[command(
    name = "quality-chain",
    about = "Optimal productivity/quality module splits for a five-tier quality upcycling chain"
)]
pub struct Cli {
    /// Log level for this crate (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve the chain for one productivity and one quality module.
    Solve(SolveArgs),
    /// Try every candidate module pair at every tier and tabulate all of them.
    Enumerate(EnumerateArgs),
    /// Solve every catalog pair and write the productivity × quality table.
    Grid(GridArgs),
    /// Write grid tables for each configured machine.
    Batch(BatchArgs),
}

#[derive(Debug, Clone, Args)]
pub struct MachineArgs {
    /// Module slots per machine.
    #[arg(long, short = 'k')]
    pub slots: u32,

    /// Machine productivity before modules (1.5 for a 50% bonus).
    #[arg(long, short = 'b', default_value = "1")]
    pub base_productivity: Decimal,
}

impl MachineArgs {
    fn parameters(&self) -> ChainResult<RunParameters> {
        RunParameters::new(self.slots, self.base_productivity)
    }
}

#[derive(Debug, Clone, Args)]
pub struct SolveArgs {
    #[command(flatten)]
    pub machine: MachineArgs,

    /// Productivity module id, e.g. T3Q5.
    #[arg(long, short = 'p', default_value = "T3Q5")]
    pub productivity: String,

    /// Quality module id, e.g. T3Q5.
    #[arg(long, short = 'q', default_value = "T3Q5")]
    pub quality: String,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct EnumerateArgs {
    #[command(flatten)]
    pub machine: MachineArgs,

    /// Comma-separated productivity candidates; the whole catalog when omitted.
    #[arg(long, short = 'p', value_delimiter = ',')]
    pub productivity: Vec<String>,

    /// Comma-separated quality candidates; the whole catalog when omitted.
    #[arg(long, short = 'q', value_delimiter = ',')]
    pub quality: Vec<String>,

    /// Candidate table destination; stdout when omitted.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print the whole solution as JSON on stdout.
    #[arg(long, conflicts_with = "output")]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct GridArgs {
    #[command(flatten)]
    pub machine: MachineArgs,

    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Worker threads; 0 uses every core.
    #[arg(long, default_value_t = 0)]
    pub workers: usize,
}

#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// YAML or JSON run list; the built-in machine presets when omitted.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    #[arg(long, default_value_t = 0)]
    pub workers: usize,
}

pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };
    init_tracing(cli.log_level.as_deref());

    let catalog = ModuleCatalog::standard();
    let (label, outcome) = match &cli.command {
        Command::Solve(args) => ("solve", handle_solve(&catalog, args)),
        Command::Enumerate(args) => ("enumerate", handle_enumerate(&catalog, args)),
        Command::Grid(args) => ("grid", handle_grid(&catalog, args)),
        Command::Batch(args) => ("batch", handle_batch(&catalog, args)),
    };

    match outcome {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{label} failed: {err}");
            1
        }
    }
}

fn handle_solve(catalog: &ModuleCatalog, args: &SolveArgs) -> ChainResult<()> {
    let params = args.machine.parameters()?;
    let (productivity, _) = catalog.resolve(ModuleKind::Productivity, &args.productivity)?;
    let (quality, _) = catalog.resolve(ModuleKind::Quality, &args.quality)?;
    let solution = full_setup(catalog, &params, productivity, quality)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&solution)?);
    } else {
        println!("{}", format_solution(&solution.tiers));
    }
    Ok(())
}

fn resolve_candidates(
    catalog: &ModuleCatalog,
    kind: ModuleKind,
    raw: &[String],
) -> ChainResult<Vec<ModuleId>> {
    if raw.is_empty() {
        return Ok(catalog.ids(kind));
    }
    raw.iter()
        .map(|id| catalog.resolve(kind, id).map(|(id, _)| id))
        .collect()
}

fn handle_enumerate(catalog: &ModuleCatalog, args: &EnumerateArgs) -> ChainResult<()> {
    let params = args.machine.parameters()?;
    let candidates = CandidateSet::new(
        resolve_candidates(catalog, ModuleKind::Productivity, &args.productivity)?,
        resolve_candidates(catalog, ModuleKind::Quality, &args.quality)?,
    );
    let solution = enumerate_setup(catalog, &params, &candidates)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&solution)?);
        return Ok(());
    }

    match &args.output {
        Some(path) => {
            write_candidate_csv(&solution.records, create_output(path)?)?;
            for choice in &solution.tiers {
                let quality = choice
                    .quality_module
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "tier {}: {}/{} {}",
                    choice.result.tier,
                    choice.productivity_module,
                    quality,
                    format_tier(&choice.result)
                );
            }
        }
        None => write_candidate_csv(&solution.records, io::stdout().lock())?,
    }
    Ok(())
}

fn handle_grid(catalog: &ModuleCatalog, args: &GridArgs) -> ChainResult<()> {
    let params = args.machine.parameters()?;
    let grid = solve_grid(catalog, &params, &WorkerPool::with_workers(args.workers))?;
    match &args.output {
        Some(path) => {
            write_grid_csv(&grid, create_output(path)?)?;
            println!("wrote {}", path.display());
        }
        None => write_grid_csv(&grid, io::stdout().lock())?,
    }
    Ok(())
}

fn handle_batch(catalog: &ModuleCatalog, args: &BatchArgs) -> ChainResult<()> {
    let config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::presets(),
    };
    fs::create_dir_all(&args.output_dir)?;
    let pool = WorkerPool::with_workers(args.workers);

    for run in &config.runs {
        let grid = solve_grid(catalog, &run.parameters()?, &pool)?;
        let path = run.output_path(&args.output_dir);
        write_grid_csv(&grid, create_output(&path)?)?;
        info!(run = %run.name, path = %path.display(), "batch run written");
        println!("wrote {} ({})", path.display(), run.name);
    }
    Ok(())
}

fn create_output(path: &Path) -> ChainResult<impl Write> {
    Ok(BufWriter::new(File::create(path)?))
}
