pub mod geometry;
pub mod simulate;
