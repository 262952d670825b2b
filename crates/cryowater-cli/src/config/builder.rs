use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileSpecimenConfig};
use super::models::AppConfig;
use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use cryowater::core::models::specimen::SpecimenBox;
use cryowater::engine::config::SolventConfigBuilder;
use serde::de::DeserializeOwned;
use std::str::FromStr;
use tracing::{debug, warn};

/// Per-invocation values that take precedence over the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOverrides {
    pub frames: Option<usize>,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
}

/// Resolves the run configuration. Precedence, highest first: command-line flags, `--set`
/// values, the config file, then [`DefaultsConfig`].
pub fn build_config(source: &ConfigArgs, overrides: &RunOverrides) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &source.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &source.set_values)?;

    let material = file_config.material.unwrap_or(defaults.material);
    let pixel_size = file_config.pixel_size.unwrap_or(defaults.pixel_size);
    let material_properties = file_config
        .material_properties
        .take()
        .unwrap_or_default()
        .resolve(material);

    let tilt = file_config.tilt.take().unwrap_or_default();
    let threads = overrides
        .threads
        .or(file_config.threads)
        .unwrap_or_else(rayon::current_num_threads);
    let frames = overrides
        .frames
        .or(file_config.frames)
        .unwrap_or(defaults.frames);

    let specimen = resolve_specimen(file_config.specimen.take(), pixel_size)?;
    if material.is_support_layer() && specimen.is_some() {
        warn!("A support layer has a fixed footprint; the [specimen] table is ignored.");
    }

    let core_config = SolventConfigBuilder::new()
        .material(material)
        .material_properties(material_properties)
        .pixel_size(pixel_size)
        .neighborhood_half_width(
            file_config
                .neighborhood_half_width
                .unwrap_or(defaults.neighborhood_half_width),
        )
        .dose_per_frame(file_config.dose_per_frame.unwrap_or(defaults.dose_per_frame))
        .max_tilt_degrees(tilt.max_tilt.unwrap_or(defaults.max_tilt))
        .in_plane_rotation_degrees(tilt.in_plane_rotation.unwrap_or(defaults.in_plane_rotation))
        .tilt_axis(tilt.axis.unwrap_or(defaults.tilt_axis))
        .threads(threads)
        .seed(overrides.seed.or(file_config.seed).unwrap_or(defaults.seed))
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    debug!("Resolved configuration: {:?}", core_config);

    Ok(AppConfig {
        core_config,
        specimen,
        frames,
    })
}

fn resolve_specimen(
    file_val: Option<FileSpecimenConfig>,
    pixel_size: f64,
) -> Result<Option<SpecimenBox>> {
    let Some(specimen) = file_val else {
        return Ok(None);
    };
    match (specimen.nx, specimen.ny, specimen.nz) {
        (Some(nx), Some(ny), Some(nz)) => Ok(Some(SpecimenBox::new(
            nx,
            ny,
            nz,
            specimen.pixel_size.unwrap_or(pixel_size),
        ))),
        _ => Err(CliError::Config(
            "`specimen` requires all of `nx`, `ny` and `nz`".to_string(),
        )),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid numeric value for {}: {}", key, value)))
}

fn parse_name<T: DeserializeOwned>(key: &str, value: &str) -> Result<T> {
    toml::Value::String(value.to_string())
        .try_into()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "material" => config.material = Some(parse_name(key, value_str)?),
            "pixel-size" => config.pixel_size = Some(parse_number(key, value_str)?),
            "neighborhood-half-width" => {
                config.neighborhood_half_width = Some(parse_number(key, value_str)?)
            }
            "dose-per-frame" => config.dose_per_frame = Some(parse_number(key, value_str)?),
            "frames" => config.frames = Some(parse_number(key, value_str)?),
            "seed" => config.seed = Some(parse_number(key, value_str)?),
            "threads" => config.threads = Some(parse_number(key, value_str)?),
            "specimen.nx" => {
                config.specimen.get_or_insert_with(Default::default).nx =
                    Some(parse_number(key, value_str)?)
            }
            "specimen.ny" => {
                config.specimen.get_or_insert_with(Default::default).ny =
                    Some(parse_number(key, value_str)?)
            }
            "specimen.nz" => {
                config.specimen.get_or_insert_with(Default::default).nz =
                    Some(parse_number(key, value_str)?)
            }
            "specimen.pixel-size" => {
                config.specimen.get_or_insert_with(Default::default).pixel_size =
                    Some(parse_number(key, value_str)?)
            }
            "tilt.max-tilt" => {
                config.tilt.get_or_insert_with(Default::default).max_tilt =
                    Some(parse_number(key, value_str)?)
            }
            "tilt.in-plane-rotation" => {
                config
                    .tilt
                    .get_or_insert_with(Default::default)
                    .in_plane_rotation = Some(parse_number(key, value_str)?)
            }
            "tilt.axis" => {
                config.tilt.get_or_insert_with(Default::default).axis =
                    Some(parse_name(key, value_str)?)
            }
            "material-properties.density" => {
                config
                    .material_properties
                    .get_or_insert_with(Default::default)
                    .density = Some(parse_number(key, value_str)?)
            }
            "material-properties.molar-mass" => {
                config
                    .material_properties
                    .get_or_insert_with(Default::default)
                    .molar_mass = Some(parse_number(key, value_str)?)
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
