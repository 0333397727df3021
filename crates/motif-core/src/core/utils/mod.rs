//! Geometry helpers and the spatial index used by bond inference and correspondence
//! extension.

pub mod geometry;
pub mod spatial;
