use clap::{Parser, Subcommand, ValueEnum};
use ms_app::{
    AppError, AppResult, EnsembleReport, RunOutput, RunProgressEvent, RunStage, project_service,
};
use ms_project::ConfigFormat;
use ms_sim::StopSignal;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mechsim")]
#[command(about = "mechsim CLI - closed-loop simulation of mechanical control exercises", long_about = None)]
struct Cli {
    /// Report wall-clock timings on stderr
    #[arg(long, global = true)]
    timing: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a run configuration
    Validate {
        /// Path to the config file (YAML or JSON)
        config_path: PathBuf,
    },
    /// Print or write the default configuration for a system
    Defaults {
        /// System name (arm or pendulum)
        system: String,
        /// Output file (format by extension); YAML to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a simulation and export the recorded samples
    Run {
        /// Path to the config file (YAML or JSON)
        config_path: PathBuf,
        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,
        /// Override the end time in seconds
        #[arg(long)]
        t_end: Option<f64>,
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the same configuration for many parameter draws in parallel
    Ensemble {
        /// Path to the config file (YAML or JSON)
        config_path: PathBuf,
        /// Number of members
        #[arg(long, default_value_t = 20)]
        runs: usize,
        /// First seed; members use consecutive seeds
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Override the end time in seconds
        #[arg(long)]
        t_end: Option<f64>,
        /// Write the full JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let fallback = if cli.timing {
        "warn,ms_core::timing=info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(io::stderr)
        .init();
    ms_core::timing::set_enabled(cli.timing);

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Defaults { system, output } => cmd_defaults(&system, output.as_deref()),
        Commands::Run {
            config_path,
            seed,
            t_end,
            format,
            output,
        } => cmd_run(&config_path, seed, t_end, format, output.as_deref()),
        Commands::Ensemble {
            config_path,
            runs,
            seed,
            t_end,
            output,
        } => cmd_ensemble(&config_path, runs, seed, t_end, output.as_deref()),
    }
}

/// Stop signal raised by Ctrl-C so a long run ends cleanly with its data.
fn install_stop_handler() -> StopSignal {
    let stop = StopSignal::new();
    let handle = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nStopping at the next sample...");
        handle.stop();
    }) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }
    stop
}

fn load_with_overrides(config_path: &Path, t_end: Option<f64>) -> AppResult<ms_project::RunConfig> {
    let mut config = project_service::load_config(config_path)?;
    if let Some(t_end) = t_end {
        config.sim.t_end = t_end;
        project_service::validate_config(&config)?;
    }
    Ok(config)
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating config: {}", config_path.display());
    let config = project_service::load_config(config_path)?;
    let summary = project_service::summarize(&config)?;
    println!("✓ Config is valid");
    println!(
        "  {} ({}, {} controller)",
        summary.name, summary.system, summary.controller
    );
    println!(
        "  Ts={}s  t_end={}s  samples={}  alpha={}  seed={}",
        summary.ts,
        summary.t_end,
        summary.samples,
        summary.alpha,
        summary
            .seed
            .map_or_else(|| "random".to_string(), |s| s.to_string())
    );
    Ok(())
}

fn cmd_defaults(system: &str, output: Option<&Path>) -> AppResult<()> {
    let config = project_service::default_config(system)?;
    match output {
        Some(path) => {
            project_service::save_config(path, &config)?;
            println!("✓ Wrote default {} config to {}", system, path.display());
        }
        None => print!("{}", ms_project::render(&config, ConfigFormat::Yaml)?),
    }
    Ok(())
}

fn cmd_run(
    config_path: &Path,
    seed: Option<u64>,
    t_end: Option<f64>,
    format: ExportFormat,
    output: Option<&Path>,
) -> AppResult<()> {
    let config = load_with_overrides(config_path, t_end)?;
    let stop = install_stop_handler();

    eprintln!("Running {} ({})", config.name, config.system.kind());
    let mut last_emit = Instant::now();
    let out = ms_app::run_config_with(
        &config,
        seed,
        &stop,
        Some(&mut |event: RunProgressEvent| {
            let emit_now =
                event.stage != RunStage::Simulating || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_emit = Instant::now();
            }
        }),
    )?;
    eprintln!();

    print_run_summary(&out);

    let content = match format {
        ExportFormat::Csv => samples_csv(&out),
        ExportFormat::Json => serde_json::to_string_pretty(&out)
            .map_err(|e| AppError::InvalidInput(format!("Failed to serialize run: {}", e)))?,
    };
    write_output(output, &content, out.samples.len())
}

fn cmd_ensemble(
    config_path: &Path,
    runs: usize,
    seed: u64,
    t_end: Option<f64>,
    output: Option<&Path>,
) -> AppResult<()> {
    let config = load_with_overrides(config_path, t_end)?;
    let stop = install_stop_handler();
    let seeds = ms_app::ensemble_seeds(seed, runs);

    eprintln!(
        "Running ensemble of {} for {} ({})",
        runs,
        config.name,
        config.system.kind()
    );
    let started = Instant::now();
    let report = ms_app::run_ensemble(&config, &seeds, &stop)?;
    print_ensemble_report(&report, started.elapsed().as_secs_f64());

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::InvalidInput(format!("Failed to serialize report: {}", e)))?;
        std::fs::write(path, json)?;
        println!("✓ Wrote ensemble report to {}", path.display());
    }
    Ok(())
}

fn render_cli_progress(event: &RunProgressEvent) {
    let label = match event.stage {
        RunStage::Compiling => "Compiling",
        RunStage::Simulating => "Simulating",
        RunStage::Completed => "Completed",
    };
    eprint!(
        "\r{:<10} t={:.2}/{:.2}s ({:>5.1}%) samples={} elapsed={:.2}s",
        label,
        event.sim_time_s,
        event.t_end_s,
        100.0 * event.fraction_complete,
        event.samples,
        event.elapsed_wall_s
    );
    let _ = io::stderr().flush();
}

fn print_run_summary(out: &RunOutput) {
    let m = &out.metrics;
    eprintln!("Seed: {}", out.seed);
    eprintln!("Drawn parameters: {:?}", out.drawn);
    if out.summary.stopped {
        eprintln!("Stopped early at t={:.3}s", out.summary.t_final);
    }
    eprintln!(
        "Samples: {}  steps: {}  wall: {:.3}s",
        out.summary.samples, out.summary.steps, out.wall_time_s
    );
    eprintln!(
        "Final error: {:.4}  peak |u|: {:.4}  peak |angle|: {:.4}  saturated: {:.1}%",
        m.final_error, m.peak_abs_input, m.peak_abs_angle, m.saturation_pct
    );
    if let Some(rise) = m.rise_time_90_s {
        eprintln!("Rise time (90%): {:.3}s", rise);
    }
    if let Some(settle) = m.settling_time_2pct_s {
        eprintln!("Settling time (2%): {:.3}s", settle);
    }
    if let Some(os) = m.overshoot_pct {
        eprintln!("Overshoot: {:.1}%", os);
    }
}

fn print_ensemble_report(report: &EnsembleReport, elapsed_s: f64) {
    println!("\n{:>8}  {:>12}  {:>10}  {:>10}", "seed", "final_err", "peak_u", "peak_ang");
    for member in &report.members {
        match (&member.metrics, &member.error) {
            (Some(m), _) => println!(
                "{:>8}  {:>12.5}  {:>10.4}  {:>10.4}",
                member.seed, m.final_error, m.peak_abs_input, m.peak_abs_angle
            ),
            (None, Some(e)) => println!("{:>8}  failed: {}", member.seed, e),
            (None, None) => println!("{:>8}  no result", member.seed),
        }
    }
    println!(
        "\n{} runs, {} failed, {:.2}s",
        report.runs, report.failed, elapsed_s
    );
    println!(
        "Worst |final error|: {:.5}  mean: {:.5}",
        report.worst_final_error, report.mean_abs_final_error
    );
    println!(
        "Peak |u|: {:.4}  peak |angle|: {:.4}",
        report.peak_abs_input, report.peak_abs_angle
    );
}

fn samples_csv(out: &RunOutput) -> String {
    let mut csv = String::from("t,reference");
    for label in out.state_labels {
        csv.push(',');
        csv.push_str(label);
    }
    csv.push_str(",u\n");
    for row in &out.samples {
        csv.push_str(&format!("{},{}", row.t, row.reference));
        for x in &row.state {
            csv.push_str(&format!(",{}", x));
        }
        csv.push_str(&format!(",{}\n", row.u));
    }
    csv
}

fn write_output(output: Option<&Path>, content: &str, samples: usize) -> AppResult<()> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
        println!("✓ Exported {} samples to {}", samples, path.display());
    } else {
        print!("{}", content);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_has_labelled_header_and_one_line_per_sample() {
        let mut config = ms_project::RunConfig::pendulum_default();
        config.sim.t_end = 0.3;
        let out = ms_app::run_config(&config, Some(1)).unwrap();
        let csv = samples_csv(&out);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "t,reference,z,theta,zdot,thetadot,u");
        assert_eq!(lines.len(), 4);
        assert!(lines[1..].iter().all(|l| l.split(',').count() == 7));
    }

    #[test]
    fn cli_parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "mechsim", "run", "demo.yaml", "--seed", "4", "--t-end", "2.5", "--format", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                seed,
                t_end,
                format,
                output,
                ..
            } => {
                assert_eq!(seed, Some(4));
                assert_eq!(t_end, Some(2.5));
                assert_eq!(format, ExportFormat::Json);
                assert!(output.is_none());
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn timing_flag_is_global() {
        let cli = Cli::try_parse_from(["mechsim", "validate", "demo.yaml", "--timing"]).unwrap();
        assert!(cli.timing);
        assert!(matches!(cli.command, Commands::Validate { .. }));
    }
}
