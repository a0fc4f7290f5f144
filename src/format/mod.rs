/// RK05 format constants and geometry

/// Format constants
pub mod constants;
/// Drive geometry and flat image mapping
pub mod geometry;

pub use constants::*;
pub use geometry::{Geometry, SectorAddress};
