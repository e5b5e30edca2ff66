use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use rimecast_core::core_types::{Aspect, Meters, TerrainInfo, WeatherSeries};
use rimecast_core::scoring::{
    cumulative, rate_color, AspectSeriesRunner, FormationRecord, LatestConditions, PeakRate,
    RiskModel, VerglasMode, VerglasStatus,
};
use rimecast_core::EngineConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Rime and verglas formation rates for a weather series
#[derive(Parser, Debug)]
#[command(name = "rimecast")]
#[command(about = "Per-aspect rime and verglas formation from a weather series", long_about = None)]
struct Args {
    /// Weather series JSON (a series object or a bare array of samples)
    #[arg(value_hint = ValueHint::FilePath)]
    series: PathBuf,

    /// Engine configuration JSON; omitted fields keep their defaults
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Verglas model, overriding the configuration
    #[arg(short, long, value_enum)]
    mode: Option<ModeOpt>,

    /// Keep every Nth hourly sample, totalling precipitation per interval
    #[arg(short, long)]
    resample: Option<usize>,

    /// Print records as JSON instead of the conditions report
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Report running per-aspect totals
    #[arg(long, action = ArgAction::SetTrue)]
    cumulative: bool,

    /// Elevation in meters for the risk score (defaults to the series altitude)
    #[arg(short, long)]
    elevation: Option<f64>,

    /// Debug logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModeOpt {
    MeltFreeze,
    AspectTimeOfDay,
}

impl From<ModeOpt> for VerglasMode {
    fn from(value: ModeOpt) -> Self {
        match value {
            ModeOpt::MeltFreeze => VerglasMode::MeltFreeze,
            ModeOpt::AspectTimeOfDay => VerglasMode::AspectTimeOfDay,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.verglas_mode = mode.into();
    }

    let mut series = load_series(&args.series)?;
    series
        .validate()
        .with_context(|| format!("weather series {} rejected", args.series.display()))?;
    if let Some(interval) = args.resample {
        series = series
            .resample(interval)
            .with_context(|| format!("resampling every {interval} samples"))?;
        config.verglas = config.verglas.resampled(interval);
        info!(
            "Resampled to {}h steps, verglas lookback {} samples",
            *config.verglas.sample_interval_hours, config.verglas.lookback_samples
        );
    }
    info!(
        "Loaded {} samples from {}",
        series.len(),
        args.series.display()
    );

    let risk = RiskModel::new(config.risk.clone()).context("invalid risk configuration")?;
    let runner = AspectSeriesRunner::new(config).context("invalid engine configuration")?;
    let records = runner
        .run_parallel(&series.samples)
        .context("weather series rejected")?;

    if args.json {
        let out = if args.cumulative {
            serde_json::to_string_pretty(&cumulative(&records))?
        } else {
            serde_json::to_string_pretty(&records)?
        };
        println!("{out}");
        return Ok(());
    }

    let Some(latest) = records.last() else {
        println!("No samples in {}", args.series.display());
        return Ok(());
    };

    let elevation = args.elevation.map(Meters::new).or(series.altitude);
    let terrain = TerrainInfo {
        elevation,
        ..TerrainInfo::default()
    };
    terrain.validate().context("invalid terrain")?;

    print_conditions(&series, latest);
    print_risk(&risk, latest, &terrain);
    if args.cumulative {
        print_cumulative(&records);
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    EngineConfig::from_json_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

fn load_series(path: &Path) -> Result<WeatherSeries> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading weather series {}", path.display()))?;
    WeatherSeries::from_json_str(&raw)
        .with_context(|| format!("parsing weather series {}", path.display()))
}

fn format_peak(peak: Option<&PeakRate>) -> String {
    match peak {
        Some(peak) => {
            let aspects: Vec<&str> = peak.aspects.iter().copied().map(Aspect::name).collect();
            format!(
                "{:.3} on {} ({})",
                peak.rate,
                aspects.join(", "),
                rate_color(peak.rate)
            )
        }
        None => "none".to_string(),
    }
}

fn print_conditions(series: &WeatherSeries, record: &FormationRecord) {
    let latest = LatestConditions::from_record(record);

    println!("=== Latest Conditions ===");
    if let Some(name) = &series.name {
        println!("Location: {name}");
    }
    println!("Time: {}", latest.timestamp);
    match latest.temperature {
        Some(t) => println!("Temperature: {t:.1}"),
        None => println!("Temperature: n/a"),
    }
    match (latest.wind_speed_mph, latest.wind_direction) {
        (Some(mph), Some(dir)) => println!(
            "Wind: {:.0} mph from {} ({:.0}°)",
            mph,
            Aspect::from_bearing(dir),
            *dir
        ),
        (Some(mph), None) => println!("Wind: {mph:.0} mph"),
        _ => println!("Wind: n/a"),
    }
    println!("Rime: {}", format_peak(latest.rime.as_ref()));
    if record.verglas_status == VerglasStatus::InsufficientHistory {
        println!("Verglas: not enough history");
    } else {
        println!("Verglas: {}", format_peak(latest.verglas.as_ref()));
    }
}

fn print_risk(risk: &RiskModel, record: &FormationRecord, terrain: &TerrainInfo) {
    println!("\n=== Risk ===");
    let Some(assessment) = risk.assess(&record.weather, terrain) else {
        warn!("latest sample has no temperature, risk not scored");
        println!("Risk: n/a");
        return;
    };
    println!(
        "Rime: {:.1} ({})",
        assessment.rime.score, assessment.rime.level
    );
    println!(
        "Verglas: {:.1} ({})",
        assessment.verglas.score, assessment.verglas.level
    );
    println!(
        "Overall: {} ({}), primary hazard {}",
        assessment.combined.level,
        assessment.combined.level.color(),
        assessment.combined.primary_hazard
    );
}

fn print_cumulative(records: &[FormationRecord]) {
    let Some(totals) = cumulative(records).pop() else {
        return;
    };
    println!("\n=== Cumulative ({} samples) ===", records.len());
    println!("{:<4} {:>8} {:>8}", "", "rime", "verglas");
    for aspect in Aspect::ALL {
        println!(
            "{:<4} {:>8.3} {:>8.3}",
            aspect.name(),
            totals.rime[aspect],
            totals.verglas[aspect]
        );
    }
}
