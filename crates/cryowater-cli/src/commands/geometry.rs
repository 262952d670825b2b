use crate::cli::GeometryArgs;
use crate::config::{AppConfig, RunOverrides, build_config};
use crate::error::Result;
use cryowater::engine::volume::SolventVolume;
use tracing::info;

pub fn run(args: GeometryArgs, threads: Option<usize>) -> Result<()> {
    let overrides = RunOverrides {
        threads,
        ..Default::default()
    };
    info!("Merging configuration from file and CLI arguments...");
    let app_config = build_config(&args.source, &overrides)?;

    let volume = size_volume(&app_config)?;
    print_summary(&volume);
    Ok(())
}

fn size_volume(app_config: &AppConfig) -> Result<SolventVolume> {
    info!(
        "Sizing a {} volume at {} Å/voxel.",
        app_config.core_config.material, app_config.core_config.pixel_size
    );
    Ok(SolventVolume::new(
        app_config.core_config.clone(),
        app_config.specimen(),
    )?)
}

fn print_summary(volume: &SolventVolume) {
    let geometry = volume.geometry();
    let padding = volume.padding();
    let population = volume.population();
    let [nx, ny, nz] = geometry.dims;
    let [ex, ey, ez] = geometry.extent_angstroms;

    println!("Material:        {}", volume.config().material);
    println!("Voxel grid:      {} x {} x {}", nx, ny, nz);
    println!("Extent (Å):      {:.1} x {:.1} x {:.1}", ex, ey, ez);
    println!(
        "Padding (vox):   x {} / y {} / z {}",
        padding.x, padding.y, padding.z
    );
    println!(
        "Usable band:     {} voxel margin, {} candidate sites",
        geometry.margin,
        geometry.usable_sites()
    );
    println!(
        "Population:      {:.4e} atoms expected, capacity {}",
        population.expected_atoms, population.capacity
    );
    println!(
        "Thermal step:    {:.4} voxels per axis per frame",
        volume.perturbation_sigma()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigArgs;
    use crate::error::CliError;
    use cryowater::engine::error::EngineError;

    fn args(set_values: &[&str]) -> GeometryArgs {
        GeometryArgs {
            source: ConfigArgs {
                config: None,
                set_values: set_values.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    #[test]
    fn sizes_a_specimen_volume() {
        let result = run(
            args(&["specimen.nx=64", "specimen.ny=64", "specimen.nz=32", "tilt.max-tilt=30"]),
            Some(1),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn solvent_without_specimen_reports_engine_error() {
        let result = run(args(&[]), Some(1));
        assert!(matches!(result, Err(CliError::Engine(EngineError::Geometry { .. }))));
    }

    #[test]
    fn support_layer_needs_no_specimen() {
        let result = run(
            args(&["material=amorphous-carbon", "pixel-size=10", "tilt.max-tilt=50"]),
            Some(1),
        );
        assert!(result.is_ok());
    }
}
