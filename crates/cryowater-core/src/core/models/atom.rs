use nalgebra::Point3;
use thiserror::Error;

/// A single point-like atom of the solvent or support film.
///
/// Coordinates are expressed in voxel units of the simulated volume. Single precision keeps
/// populations of hundreds of millions of atoms within reach of a workstation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AtomPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl AtomPosition {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Coordinates in X, Y, Z order.
    #[inline]
    pub fn coords(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    #[inline]
    pub fn coords_mut(&mut self) -> [&mut f32; 3] {
        [&mut self.x, &mut self.y, &mut self.z]
    }
}

impl From<AtomPosition> for Point3<f64> {
    fn from(p: AtomPosition) -> Self {
        Point3::new(p.x as f64, p.y as f64, p.z as f64)
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("Atom collection capacity exceeded: {requested} atoms requested, capacity is {capacity}")]
pub struct CapacityError {
    pub requested: usize,
    pub capacity: usize,
}

impl CapacityError {
    /// How far the request overshot the capacity, as a fraction of the capacity.
    pub fn overshoot(&self) -> f64 {
        if self.capacity == 0 {
            f64::INFINITY
        } else {
            self.requested as f64 / self.capacity as f64 - 1.0
        }
    }
}

/// Exclusively owned, fixed-capacity storage for the atom field.
///
/// The capacity is decided once, before any atom is written, and the collection refuses
/// writes that would exceed it instead of reallocating.
#[derive(Debug, Clone, Default)]
pub struct AtomCollection {
    positions: Vec<AtomPosition>,
    capacity: usize,
}

impl AtomCollection {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// The number of filled slots.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_slice(&self) -> &[AtomPosition] {
        &self.positions
    }

    pub fn as_mut_slice(&mut self) -> &mut [AtomPosition] {
        &mut self.positions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AtomPosition> {
        self.positions.iter()
    }

    /// Appends a batch of atoms, or leaves the collection untouched if the batch does not fit.
    pub fn extend_within_capacity(&mut self, batch: &[AtomPosition]) -> Result<(), CapacityError> {
        let requested = self.positions.len() + batch.len();
        if requested > self.capacity {
            return Err(CapacityError {
                requested,
                capacity: self.capacity,
            });
        }
        self.positions.extend_from_slice(batch);
        Ok(())
    }
}

impl<'a> IntoIterator for &'a AtomCollection {
    type Item = &'a AtomPosition;
    type IntoIter = std::slice::Iter<'a, AtomPosition>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}
