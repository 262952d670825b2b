use crate::cli::SimulateArgs;
use crate::config::{RunOverrides, build_config};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use cryowater::engine::progress::ProgressReporter;
use cryowater::workflows::{self, simulate::SimulationReport};
use std::path::Path;
use tracing::info;

pub fn run(args: SimulateArgs, threads: Option<usize>, quiet: bool) -> Result<()> {
    let overrides = RunOverrides {
        frames: args.frames,
        seed: args.seed,
        threads,
    };
    info!("Merging configuration from file and CLI arguments...");
    let app_config = build_config(&args.source, &overrides)?;

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Simulating {} frame(s) of {} motion...",
        app_config.frames, app_config.core_config.material
    );
    info!("Invoking the core simulation workflow...");

    let result = workflows::simulate::run(
        &app_config.core_config,
        app_config.specimen(),
        app_config.frames,
        &reporter,
    )?;
    let report = &result.report;

    let wrapped: usize = report.frames.iter().map(|f| f.wrapped).sum();
    println!(
        "✓ Seeded {} atoms ({:.2}% of the {:.4e} expected) in a {} x {} x {} grid.",
        report.seeded_atoms,
        100.0 * report.seeded_atoms as f64 / report.population.expected_atoms.max(1.0),
        report.population.expected_atoms,
        report.geometry.dims[0],
        report.geometry.dims[1],
        report.geometry.dims[2],
    );
    println!(
        "✓ Perturbed {} frame(s) at {:.4} voxels per axis; {} boundary wraps in total.",
        report.frames.len(),
        report.sigma_voxels,
        wrapped
    );

    if let Some(path) = &args.report {
        write_report(report, path)?;
        println!("Report written to: {}", path.display());
    }

    Ok(())
}

fn write_report(report: &SimulationReport, path: &Path) -> Result<()> {
    info!("Writing simulation report to {:?}", path);
    let content = toml::to_string_pretty(report).map_err(|e| CliError::ReportWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    std::fs::write(path, content)?;
    Ok(())
}
