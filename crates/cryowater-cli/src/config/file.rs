use crate::error::{CliError, Result};
use cryowater::core::models::material::{Material, MaterialProperties};
use cryowater::engine::config::TiltAxis;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSpecimenConfig {
    pub nx: Option<usize>,
    pub ny: Option<usize>,
    pub nz: Option<usize>,
    /// Pixel size the specimen box was sampled at; defaults to the run's pixel size.
    pub pixel_size: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileTiltConfig {
    pub max_tilt: Option<f64>,
    pub in_plane_rotation: Option<f64>,
    pub axis: Option<TiltAxis>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileMaterialProperties {
    pub density: Option<f64>,
    pub molar_mass: Option<f64>,
}

impl FileMaterialProperties {
    /// Fills whichever of the two values is missing from the material's tabulated properties.
    pub fn resolve(&self, material: Material) -> MaterialProperties {
        let tabulated = material.properties();
        MaterialProperties {
            density: self.density.unwrap_or(tabulated.density),
            molar_mass: self.molar_mass.unwrap_or(tabulated.molar_mass),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub material: Option<Material>,
    pub pixel_size: Option<f64>,
    pub neighborhood_half_width: Option<usize>,
    pub dose_per_frame: Option<f64>,
    pub frames: Option<usize>,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
    pub specimen: Option<FileSpecimenConfig>,
    pub tilt: Option<FileTiltConfig>,
    pub material_properties: Option<FileMaterialProperties>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn full_file_deserializes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(
            &path,
            r#"
            material = "solvent"
            pixel-size = 1.5
            neighborhood-half-width = 4
            dose-per-frame = 0.8
            frames = 20
            seed = 11

            [specimen]
            nx = 256
            ny = 200
            nz = 96

            [tilt]
            max-tilt = 60.0
            in-plane-rotation = 12.5
            axis = "y"

            [material-properties]
            density = 0.92
            "#,
        )
        .unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        assert_eq!(config.material, Some(Material::Solvent));
        assert_eq!(config.pixel_size, Some(1.5));
        assert_eq!(config.frames, Some(20));
        let specimen = config.specimen.unwrap();
        assert_eq!((specimen.nx, specimen.ny, specimen.nz), (Some(256), Some(200), Some(96)));
        assert!(specimen.pixel_size.is_none());
        let tilt = config.tilt.unwrap();
        assert_eq!(tilt.max_tilt, Some(60.0));
        assert_eq!(tilt.axis, Some(TiltAxis::Y));

        let properties = config.material_properties.unwrap().resolve(Material::Solvent);
        assert_eq!(properties.density, 0.92);
        assert_eq!(properties.molar_mass, Material::Solvent.properties().molar_mass);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("typo.toml");
        fs::write(&path, "pixelsize = 1.0\n").unwrap();

        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            FileConfig::from_file(&dir.path().join("absent.toml")),
            Err(CliError::Io(_))
        ));
    }
}
