//! Convex hull construction and outlier-robust peeling.

mod peel;
mod polyhedron;
pub mod quickhull;

pub use peel::{HullBuilder, HullOutcome, HullStatus};
pub use polyhedron::{PeelLayer, Polyhedron, Provenance};
pub use quickhull::{convex_hull, ConvexHull};
