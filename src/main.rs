use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use linksim_rs::config::{CodingConfig, ShapingConfig, SimulationConfig, SnrSweep};
use linksim_rs::link::{BerEvaluator, SweepPoint};
use linksim_rs::pulse::{PulseShaper, SingularityPolicy};
use linksim_rs::utils::consts::*;
use linksim_rs::utils::logging::init_logging;
use linksim_rs::Result;

mod ui;
use ui::progress::{ProgressManager, templates};

#[derive(Parser)]
#[command(author, version, about = "Digital link BER simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure BER over an SNR sweep
    Sweep {
        /// JSON simulation config (defaults to uncoded 2-PAM)
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, allow_hyphen_values = true)]
        start: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        stop: Option<f64>,
        #[arg(long)]
        step: Option<f64>,
        /// Worker threads; 1 runs the points in order
        #[arg(short, long, default_value_t = 1)]
        workers: usize,
        /// Print the points as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print raised-cosine taps (and optionally a shaped waveform) as JSON
    Pulse {
        #[arg(long, default_value_t = DEFAULT_ROLL_OFF)]
        roll_off: f64,
        #[arg(long, default_value_t = DEFAULT_SPAN)]
        span: f64,
        #[arg(long, default_value_t = DEFAULT_SYMBOL_RATE)]
        symbol_rate: f64,
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: f64,
        /// Zero the singular samples instead of using the analytic limit
        #[arg(long)]
        zero_singularity: bool,
        /// Symbol levels to shape, e.g. --levels=1,-1,1
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        levels: Vec<f64>,
    },
    /// Print transmitted and received constellation points at one SNR
    Constellation {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 20.0, allow_hyphen_values = true)]
        snr: f64,
        #[arg(short = 'n', long, default_value_t = 1024)]
        symbols: usize,
    },
    /// Validate a block code and print its syndrome table
    Code {
        /// JSON simulation config; its `coding` section is used
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<SimulationConfig> {
    match path {
        Some(path) => SimulationConfig::from_json_file(path),
        None => Ok(SimulationConfig::default()),
    }
}

fn sweep(
    config: Option<PathBuf>,
    start: Option<f64>,
    stop: Option<f64>,
    step: Option<f64>,
    workers: usize,
    json: bool,
) -> Result<()> {
    let mut config = load_config(config)?;
    if start.is_some() || stop.is_some() || step.is_some() {
        config.sweep = SnrSweep::range(
            start.unwrap_or(DEFAULT_SNR_START_DB),
            stop.unwrap_or(DEFAULT_SNR_STOP_DB),
            step.unwrap_or(DEFAULT_SNR_STEP_DB),
        );
    }
    let snr_db = config.sweep.values()?;
    let evaluator = BerEvaluator::new(&config)?;
    tracing::info!(
        "Sweeping {} SNR points, {} bits x {} trials per point",
        snr_db.len(),
        config.bits_per_trial,
        config.trials
    );

    let progress = ProgressManager::new();
    let template = if workers > 1 {
        templates::PARALLEL_SWEEP
    } else {
        templates::SWEEP
    };
    let _ = progress.create_bar("sweep", snr_db.len() as u64, template, "");
    let on_point = |point: &SweepPoint| {
        let _ = progress.set_message("sweep", &format!("{:.1} dB", point.snr_db));
        let _ = progress.inc("sweep", 1);
    };

    let points = if workers > 1 {
        evaluator.run_parallel_with(&snr_db, workers, on_point)?
    } else {
        let mut points = Vec::with_capacity(snr_db.len());
        for point in evaluator.points(&snr_db) {
            let point = point?;
            on_point(&point);
            points.push(point);
        }
        points
    };
    let _ = progress.finish("sweep", "done");
    progress.clear_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    } else {
        ui::print_sweep_table(&points);
    }
    Ok(())
}

fn pulse(
    roll_off: f64,
    span: f64,
    symbol_rate: f64,
    sample_rate: f64,
    zero_singularity: bool,
    levels: Vec<f64>,
) -> Result<()> {
    let policy = if zero_singularity {
        SingularityPolicy::Zero
    } else {
        SingularityPolicy::AnalyticLimit
    };
    let pulse = ShapingConfig {
        roll_off,
        span,
        symbol_rate,
        sample_rate,
        singularity: policy,
    }
    .pulse()?;
    let mut out = json!({
        "roll_off": roll_off,
        "span": span,
        "samples_per_symbol": pulse.samples_per_symbol(),
        "singularity": policy,
        "time": pulse.time_axis(),
        "taps": pulse.taps(),
    });
    if !levels.is_empty() {
        let waveform = PulseShaper::new(pulse).apply(&levels);
        let mut value = serde_json::to_value(&waveform)?;
        value["time"] = json!(waveform.time_axis());
        out["waveform"] = value;
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn constellation(config: Option<PathBuf>, snr: f64, symbols: usize) -> Result<()> {
    let config = load_config(config)?;
    let evaluator = BerEvaluator::new(&config)?;
    let mut rng = evaluator.point_rng(0);
    let snapshot = evaluator.snapshot(&mut rng, snr, symbols)?;
    tracing::info!(
        "{} of {} symbols in error at {} dB",
        snapshot.symbol_errors,
        symbols,
        snr
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn code(config: Option<PathBuf>) -> Result<()> {
    let coding = match config {
        Some(path) => SimulationConfig::from_json_file(path)?
            .coding
            .unwrap_or_else(CodingConfig::hamming74),
        None => CodingConfig::hamming74(),
    };
    let code = coding.build()?;
    ui::print_syndrome_table(&code);
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging();
    ui::print_banner();

    let result = match cli.command {
        Commands::Sweep {
            config,
            start,
            stop,
            step,
            workers,
            json,
        } => sweep(config, start, stop, step, workers, json),
        Commands::Pulse {
            roll_off,
            span,
            symbol_rate,
            sample_rate,
            zero_singularity,
            levels,
        } => pulse(roll_off, span, symbol_rate, sample_rate, zero_singularity, levels),
        Commands::Constellation {
            config,
            snr,
            symbols,
        } => constellation(config, snr, symbols),
        Commands::Code { config } => code(config),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
