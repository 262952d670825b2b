use serde::{Deserialize, Serialize};

/// The voxel box of the specimen the solvent has to enclose.
///
/// Implemented by whatever structure representation the surrounding simulator uses; the
/// engine only ever needs the box dimensions and the pixel size they were computed with.
pub trait SpecimenGeometry {
    /// Voxel counts along X, Y and Z.
    fn voxel_dims(&self) -> [usize; 3];

    /// Pixel (voxel edge) size in angstroms. Zero or negative means "not yet set".
    fn pixel_size(&self) -> f64;
}

/// A plain specimen box, for callers that track the specimen's extent without a full model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecimenBox {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub pixel_size: f64,
}

impl SpecimenBox {
    pub fn new(nx: usize, ny: usize, nz: usize, pixel_size: f64) -> Self {
        Self {
            nx,
            ny,
            nz,
            pixel_size,
        }
    }
}

impl SpecimenGeometry for SpecimenBox {
    fn voxel_dims(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }

    fn pixel_size(&self) -> f64 {
        self.pixel_size
    }
}
