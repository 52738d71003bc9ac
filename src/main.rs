//! Systolic Array Test Vector Generator CLI
//!
//! Usage:
//!   systolic-vectors --rows 16 --cols 16 --k 128 --flow ws
//!   systolic-vectors --config vectors.json --seed 7 --out-dir build/tb
//!   systolic-vectors --rows 4 --cols 4 --k 5 --flow both --json

use clap::Parser as ClapParser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use systolic_vectors::{
    generate, FileSink, FlowSelection, GenResult, GenerationReport, RandomSource, VectorConfig,
    VectorKind,
};

#[derive(ClapParser, Debug)]
#[command(name = "systolic-vectors")]
#[command(author = "FPGA Team")]
#[command(version = "0.1.0")]
#[command(about = "Generates packed hex stimulus and golden vectors for a systolic array testbench")]
struct Args {
    /// Load settings from a JSON file; flags override it
    #[arg(short = 'c', long = "config")]
    config_file: Option<PathBuf>,

    /// Rows of A (and input lanes of the array)
    #[arg(long)]
    rows: Option<usize>,

    /// Columns of B
    #[arg(long)]
    cols: Option<usize>,

    /// Input element width in bits
    #[arg(long = "ip_width", alias = "ip-width")]
    ip_width: Option<usize>,

    /// Output element width in bits
    #[arg(long = "op_width", alias = "op-width")]
    op_width: Option<usize>,

    /// K dimension
    #[arg(short = 'k', long = "k")]
    k_dim: Option<usize>,

    /// RNG seed for reproducible vectors
    #[arg(long)]
    seed: Option<u64>,

    /// Generate input_matrix for OS, WS, or both (weights+golden always written)
    #[arg(long, value_parser = parse_flow)]
    flow: Option<FlowSelection>,

    /// Directory the .hex files are written to
    #[arg(short = 'o', long = "out-dir", default_value = ".")]
    out_dir: PathBuf,

    /// Print the run manifest as JSON
    #[arg(short = 'j', long = "json")]
    json_output: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn parse_flow(s: &str) -> Result<FlowSelection, String> {
    s.parse::<FlowSelection>().map_err(|e| e.to_string())
}

fn resolve_config(args: &Args) -> GenResult<VectorConfig> {
    let mut config = match &args.config_file {
        Some(path) => VectorConfig::from_json_file(path)?,
        None => VectorConfig::default(),
    };

    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(ip_width) = args.ip_width {
        config.ip_width = ip_width;
    }
    if let Some(op_width) = args.op_width {
        config.op_width = op_width;
    }
    if let Some(k_dim) = args.k_dim {
        config.k_dim = k_dim;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(flow) = args.flow {
        config.flow = flow;
    }

    config.validate()?;
    Ok(config)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = resolve_config(&args).unwrap_or_else(|e| {
        eprintln!("{}: {}", "Configuration error".red(), e);
        std::process::exit(1);
    });

    if !args.json_output {
        println!("{}: {}", "Generating".bold().blue(), config);
    }

    let mut source = RandomSource::new(config.seed);
    let mut sink = FileSink::new(&args.out_dir);
    let report = match generate(&config, &mut source, &mut sink) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}: {}", "Generation error".red(), e);
            std::process::exit(1);
        }
    };

    if args.json_output {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{}: Failed to serialize to JSON: {}", "Error".red(), e);
                std::process::exit(1);
            }
        }
    } else {
        print_report(&report, args.verbose);
    }
}

fn print_report(report: &GenerationReport, verbose: bool) {
    let names: Vec<String> = report
        .files
        .iter()
        .map(|f| match f.kind {
            VectorKind::Input(df) if report.config.flow != FlowSelection::Both => {
                format!("{} ({})", f.name, df)
            }
            _ => f.name.clone(),
        })
        .collect();
    println!("{}: {}", "Wrote".green(), names.join(", "));

    if verbose {
        println!();
        for file in &report.files {
            println!(
                "  {}: {} lines x {} hex digits",
                file.name.cyan(),
                file.lines,
                file.hex_digits
            );
        }
    }
}
