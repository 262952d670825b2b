use serde::{Deserialize, Serialize};

/// Avogadro's number scaled by 10^-24, i.e. molecules per mole times cm³ per Å³.
pub const AVOGADRO_PER_CUBIC_ANGSTROM: f64 = 0.6022140857;

/// Vitreous ice density, 0.94 +/- 0.02 g/cm³ (Ghormley & Hochanadel, 1971).
pub const SOLVENT_DENSITY: f64 = 0.94;
/// Lower end of the amorphous carbon range, matching holography measurements.
pub const CARBON_DENSITY: f64 = 1.75;
pub const MW_WATER: f64 = 18.01528;
pub const MW_CARBON: f64 = 12.0107;

/// Lateral footprint of a simulated support film, independent of the specimen.
pub const CARBON_X_ANGSTROMS: f64 = 2000.0;
pub const CARBON_Y_ANGSTROMS: f64 = 2000.0;

/// The material filling the simulated volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Material {
    /// Solvent (vitreous ice) surrounding a specimen.
    #[default]
    Solvent,
    /// An amorphous carbon support layer with a fixed lateral footprint.
    AmorphousCarbon,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Mass density in g/cm³.
    pub density: f64,
    /// Molar mass in g/mol.
    pub molar_mass: f64,
}

impl MaterialProperties {
    /// Number density in atoms (or molecules) per cubic angstrom.
    pub fn atoms_per_cubic_angstrom(&self) -> f64 {
        self.density * AVOGADRO_PER_CUBIC_ANGSTROM / self.molar_mass
    }
}

impl Material {
    pub fn properties(&self) -> MaterialProperties {
        match self {
            Material::Solvent => MaterialProperties {
                density: SOLVENT_DENSITY,
                molar_mass: MW_WATER,
            },
            Material::AmorphousCarbon => MaterialProperties {
                density: CARBON_DENSITY,
                molar_mass: MW_CARBON,
            },
        }
    }

    pub fn is_support_layer(&self) -> bool {
        matches!(self, Material::AmorphousCarbon)
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Material::Solvent => write!(f, "solvent"),
            Material::AmorphousCarbon => write!(f, "amorphous-carbon"),
        }
    }
}
