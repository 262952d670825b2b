use super::config::{TiltAxis, TiltConfig};
use crate::core::models::material::{CARBON_X_ANGSTROMS, CARBON_Y_ANGSTROMS};
use crate::core::models::specimen::SpecimenGeometry;
use crate::core::utils::geometry::{euler_rotation, rotate_point};
use nalgebra::Point3;
use serde::Serialize;
use std::ops::Range;
use thiserror::Error;
use tracing::{info, warn};

pub const MAX_SUPPORTED_TILT_DEGREES: f64 = 70.0;
pub const RECOMMENDED_MAX_IN_PLANE_ROTATION_DEGREES: f64 = 45.0;
const ANGLE_TOLERANCE_DEGREES: f64 = 0.01;
const NEGLIGIBLE_TILT_DEGREES: f64 = 0.1;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum GeometryError {
    #[error("Maximum tilt angle supported is {max} degrees, got {requested}")]
    TiltOutOfRange { requested: f64, max: f64 },

    #[error(
        "Tilts about the {0:?} axis are not supported; padding is only modeled for single-axis tilts about Y"
    )]
    UnsupportedTiltAxis(TiltAxis),

    #[error("The pixel size is not set or not positive (got {0})")]
    InvalidPixelSize(f64),

    #[error("Support layer thickness must be a finite, positive number of angstroms (got {0})")]
    InvalidThickness(f64),

    #[error("A specimen geometry is required to size a solvent volume")]
    MissingSpecimen,
}

/// Extra voxels added around the specimen box so tilted or rotated views are not clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Padding {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// Computes the padding needed for a tilt series about Y with a rotated tilt axis.
///
/// The lateral pads cover the corners an in-plane rotation sweeps into view. The tilt pad is
/// how far the bottom edge of the padded box travels along X when tilted by `max_tilt`,
/// counted on both sides.
pub fn compute_padding(
    tilt: &TiltConfig,
    thickness: usize,
    nx: usize,
    ny: usize,
) -> Result<Padding, GeometryError> {
    if tilt.axis != TiltAxis::Y {
        return Err(GeometryError::UnsupportedTiltAxis(tilt.axis));
    }

    let max_tilt = tilt.max_tilt_degrees.abs();
    if max_tilt > MAX_SUPPORTED_TILT_DEGREES + ANGLE_TOLERANCE_DEGREES {
        return Err(GeometryError::TiltOutOfRange {
            requested: tilt.max_tilt_degrees,
            max: MAX_SUPPORTED_TILT_DEGREES,
        });
    }

    let rotation = tilt.in_plane_rotation_degrees;
    if rotation.abs() > RECOMMENDED_MAX_IN_PLANE_ROTATION_DEGREES + ANGLE_TOLERANCE_DEGREES {
        warn!(
            "Requested a tilt-axis rotation of {:.3} degrees, which is greater than the recommended max of {:.2}. This will add a lot of atoms.",
            rotation, RECOMMENDED_MAX_IN_PLANE_ROTATION_DEGREES
        );
    }

    let sin_rotation = rotation.to_radians().sin().abs();
    let pad_x = (0.5 * ny as f64 * sin_rotation).round() as usize;
    let pad_y = (0.5 * nx as f64 * sin_rotation).round() as usize;

    let pad_z = if max_tilt < NEGLIGIBLE_TILT_DEGREES {
        0
    } else {
        let reference = Point3::new(0.5 * (nx + pad_x) as f64, 0.0, -(thickness as f64) / 2.0);
        let tilted = rotate_point(&euler_rotation(0.0, max_tilt, 0.0), &reference);
        (2.0 * (tilted.x - reference.x)).abs().round() as usize
    };

    Ok(Padding {
        x: pad_x,
        y: pad_y,
        z: pad_z,
    })
}

/// Size of the simulated volume in physical and voxel units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeGeometry {
    /// Physical extents along X, Y, Z in angstroms.
    pub extent_angstroms: [f64; 3],
    /// Voxel counts along X, Y, Z.
    pub dims: [usize; 3],
    /// Voxel index of the volume center, `floor(n / 2)` per axis.
    pub origin: [usize; 3],
    pub pixel_size: f64,
    /// Neighborhood half-width in voxels; no atom lives closer than this to a face.
    pub margin: usize,
}

impl VolumeGeometry {
    /// A support film with a fixed lateral footprint and the requested thickness.
    ///
    /// The Z voxel count is forced even.
    pub fn support_layer(
        pixel_size: f64,
        thickness_angstroms: f64,
        margin: usize,
    ) -> Result<Self, GeometryError> {
        if !(pixel_size.is_finite() && pixel_size > 0.0) {
            return Err(GeometryError::InvalidPixelSize(pixel_size));
        }
        if !(thickness_angstroms.is_finite() && thickness_angstroms > 0.0) {
            return Err(GeometryError::InvalidThickness(thickness_angstroms));
        }

        let extent = [CARBON_X_ANGSTROMS, CARBON_Y_ANGSTROMS, thickness_angstroms];
        let mut dims = extent.map(|e| (e / pixel_size).round() as usize);
        if dims[2] % 2 != 0 {
            dims[2] += 1;
        }

        let geometry = Self::from_parts(extent, dims, pixel_size, margin);
        geometry.log_dimensions();
        Ok(geometry)
    }

    /// A solvent box enclosing the specimen, padded for the tilt series.
    ///
    /// Under the single-axis tilt assumption the tilt pad widens X only, alongside the
    /// rotation pad; Z keeps the specimen thickness.
    pub fn enclosing_specimen(
        specimen: &dyn SpecimenGeometry,
        tilt: &TiltConfig,
        pixel_size: f64,
        margin: usize,
    ) -> Result<(Self, Padding), GeometryError> {
        let specimen_pixel = specimen.pixel_size();
        if !(specimen_pixel.is_finite() && specimen_pixel > 0.0) {
            return Err(GeometryError::InvalidPixelSize(specimen_pixel));
        }
        if !(pixel_size.is_finite() && pixel_size > 0.0) {
            return Err(GeometryError::InvalidPixelSize(pixel_size));
        }

        let [nx, ny, nz] = specimen.voxel_dims();
        info!(
            "Specimen size before rotation padding: {} x {} (rotation {:.2} degrees)",
            nx, ny, tilt.in_plane_rotation_degrees
        );

        let padding = compute_padding(tilt, nz, nx, ny)?;
        let dims = [nx + padding.x + padding.z, ny + padding.y, nz];
        info!(
            "Size after rotation padding: {} x {} (pad x {}, pad y {}, pad z {})",
            dims[0], dims[1], padding.x, padding.y, padding.z
        );

        let extent = dims.map(|n| n as f64 * specimen_pixel);
        let geometry = Self::from_parts(extent, dims, pixel_size, margin);
        geometry.log_dimensions();
        Ok((geometry, padding))
    }

    fn from_parts(extent: [f64; 3], dims: [usize; 3], pixel_size: f64, margin: usize) -> Self {
        Self {
            extent_angstroms: extent,
            dims,
            origin: dims.map(|n| n / 2),
            pixel_size,
            margin,
        }
    }

    fn log_dimensions(&self) {
        let [x, y, z] = self.extent_angstroms;
        info!(
            "Volume dimensions in angstroms: {:.2} x {:.2} x {:.2}",
            x, y, z
        );
    }

    pub fn volume_cubic_angstroms(&self) -> f64 {
        self.extent_angstroms.iter().product()
    }

    /// Integer voxel indices along `axis` that keep a full neighborhood inside the volume.
    ///
    /// Empty when the axis is no wider than twice the margin.
    pub fn usable_range(&self, axis: usize) -> Range<usize> {
        let n = self.dims[axis];
        let upper = n.saturating_sub(self.margin);
        self.margin..upper.max(self.margin)
    }

    /// Number of candidate lattice sites inside the usable band on all three axes.
    pub fn usable_sites(&self) -> usize {
        (0..3).map(|axis| self.usable_range(axis).len()).product()
    }

    /// Half-open coordinate band `[margin, n - margin)` atoms are kept in along `axis`.
    pub fn usable_band(&self, axis: usize) -> (f32, f32) {
        let range = self.usable_range(axis);
        (range.start as f32, range.end as f32)
    }
}
