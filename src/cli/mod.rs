//! Command-line interface for the GSLib joint converter.

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::columns::{load_column_values, ColumnSpec};
use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "gslib-joints")]
#[command(about = "Convert GSLib point files into joint files and plot them", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a GSLib file into a joint file and plot it
    Convert(ConvertArgs),

    /// Write the default configuration as YAML
    InitConfig {
        /// Destination YAML file
        path: PathBuf,
    },
}

#[derive(Args)]
struct ConvertArgs {
    /// Input .gslib file
    input: Option<PathBuf>,
    /// Output joint file
    output: Option<PathBuf>,
    /// Offset added to i_index
    #[arg(long)]
    i_offset: Option<u32>,
    /// Offset added to j_index
    #[arg(long)]
    j_offset: Option<u32>,
    /// Offset added to k_index
    #[arg(long)]
    k_offset: Option<u32>,
    /// Dip angle for every row (degrees, 0-90)
    #[arg(long, conflicts_with = "dip_angle_file")]
    dip_angle: Option<f64>,
    /// File with one dip angle per row
    #[arg(long)]
    dip_angle_file: Option<PathBuf>,
    /// Strike angle for every row (degrees, 0-360)
    #[arg(long, conflicts_with = "strike_angle_file")]
    strike_angle: Option<f64>,
    /// File with one strike angle per row
    #[arg(long)]
    strike_angle_file: Option<PathBuf>,
    /// Normal stiffness for every row
    #[arg(long, conflicts_with = "kn_file")]
    kn: Option<f64>,
    /// File with one normal stiffness per row
    #[arg(long)]
    kn_file: Option<PathBuf>,
    /// Shear stiffness for every row
    #[arg(long, conflicts_with = "ks_file")]
    ks: Option<f64>,
    /// File with one shear stiffness per row
    #[arg(long)]
    ks_file: Option<PathBuf>,
    /// Output PNG path (defaults to the output file with .png extension)
    #[arg(long)]
    plot_output: Option<PathBuf>,
    /// Skip the 3D scatter plot
    #[arg(long)]
    no_plot: bool,
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<60} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            let head: String = value.chars().take(36).collect();
            format!("{}...", head)
        } else {
            value.clone()
        };
        println!("║ {:<19}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

/// Pick the column spec: values file, then command-line scalar, then config.
fn resolve_column(
    value: Option<f64>,
    file: Option<&Path>,
    current: &ColumnSpec,
) -> anyhow::Result<ColumnSpec> {
    if let Some(path) = file {
        info!("Loading per-row values from {}", path.display());
        return Ok(load_column_values(path)?);
    }
    Ok(value.map(ColumnSpec::Constant).unwrap_or_else(|| current.clone()))
}

fn apply_overrides(args: &ConvertArgs, config: &mut PipelineConfig) -> anyhow::Result<()> {
    let convert = &mut config.convert;
    if let Some(input) = &args.input {
        convert.input_gslib_file = input.clone();
    }
    if let Some(output) = &args.output {
        convert.output_gslib_file = output.clone();
    }
    convert.i_offset = args.i_offset.unwrap_or(convert.i_offset);
    convert.j_offset = args.j_offset.unwrap_or(convert.j_offset);
    convert.k_offset = args.k_offset.unwrap_or(convert.k_offset);

    convert.dip_angle = resolve_column(args.dip_angle, args.dip_angle_file.as_deref(), &convert.dip_angle)?;
    convert.strike_angle = resolve_column(
        args.strike_angle,
        args.strike_angle_file.as_deref(),
        &convert.strike_angle,
    )?;
    convert.kn = resolve_column(args.kn, args.kn_file.as_deref(), &convert.kn)?;
    convert.ks = resolve_column(args.ks, args.ks_file.as_deref(), &convert.ks)?;

    if args.plot_output.is_some() {
        config.plot.output = args.plot_output.clone();
    }
    if args.no_plot {
        config.plot.enabled = false;
    }
    Ok(())
}

fn describe_column(spec: &ColumnSpec) -> String {
    match spec {
        ColumnSpec::Constant(value) => value.to_string(),
        ColumnSpec::PerRow(values) => format!("{} per-row values", values.len()),
    }
}

/// Load the YAML config named by `--config`, or the defaults when none is given.
fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let config = PipelineConfig::from_yaml(path)
        .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {}", path.display(), e))?;
    info!("Loaded config from: {}", path.display());
    Ok(config)
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Convert(args) => cmd_convert(&args, config),
        Commands::InitConfig { path } => cmd_init_config(&path, &config),
    }
}

fn cmd_convert(args: &ConvertArgs, mut config: PipelineConfig) {
    use crate::processors::converter;

    let start = Instant::now();

    if let Err(e) = apply_overrides(args, &mut config) {
        error!("Invalid arguments: {:#}", e);
        std::process::exit(1);
    }

    let convert = &config.convert;
    println!("Converting GSLib file...");
    println!("Input: {}", convert.input_gslib_file.display());
    println!("Output: {}", convert.output_gslib_file.display());

    let spinner = create_spinner("Converting rows...");

    match converter::run_pipeline(&config) {
        Ok(summary) => {
            spinner.finish_and_clear();

            let plot = summary
                .plot
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "skipped".to_string());

            print_summary(
                "Conversion Complete",
                &[
                    ("Input file", summary.input.display().to_string()),
                    ("Output file", summary.output.display().to_string()),
                    ("Rows written", summary.rows.to_string()),
                    (
                        "Offsets (i, j, k)",
                        format!("{}, {}, {}", convert.i_offset, convert.j_offset, convert.k_offset),
                    ),
                    ("Dip angle", describe_column(&convert.dip_angle)),
                    ("Strike angle", describe_column(&convert.strike_angle)),
                    ("KN", describe_column(&convert.kn)),
                    ("KS", describe_column(&convert.ks)),
                    ("Plot", plot),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Conversion failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_init_config(path: &Path, config: &PipelineConfig) {
    match config.to_yaml(path) {
        Ok(()) => println!("Wrote configuration to {}", path.display()),
        Err(e) => {
            error!("Failed to write config to {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
