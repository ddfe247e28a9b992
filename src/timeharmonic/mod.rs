//! Finite element layer for the 2D time-harmonic curl-curl equation
//!
//! Lowest-order Nédélec elements, a manufactured cos/sin model problem, and a
//! [`crate::driver::FemBackend`] implementation that assembles and solves it.

mod nedelec;
mod pde;
mod problem;

pub use nedelec::{CellGeometry, NedelecSpace};
pub use pde::{CosSinData, TimeHarmonicPde};
pub use problem::{NedelecBackend, SolveError};
