//! Adaptive FEM for the 2D time-harmonic curl-curl equation
//!
//! This crate implements a recovery-based a posteriori error estimator and an
//! adaptive mesh-marking driver. The curl of a curl-conforming finite element
//! solution is piecewise constant; the estimator reconstructs a smoother nodal
//! approximation of it, measures the per-cell discrepancy, selects a minimal
//! set of cells capturing a target fraction of the total estimated error, and
//! iterates solve-estimate-mark-refine rounds.
//!
//! # Features
//!
//! - **Triangle meshes**: structured generators and conforming longest-edge
//!   bisection refinement
//! - **Nodal recovery**: inverse-area-weighted averaging and superconvergent
//!   patch recovery with a deterministic fallback at singular patches
//! - **Bulk marking**: Dörfler selection of a minimal cell subset
//! - **Adaptive driver**: round orchestration with convergence history
//! - **Model problem**: lowest-order Nédélec discretization of
//!   `curl curl u - u = f` with a manufactured cos/sin solution
//!
//! # Example
//!
//! ```
//! use maxwell_afem::driver::{AdaptiveDriver, DriverConfig};
//! use maxwell_afem::mesh::unit_square_triangles;
//! use maxwell_afem::timeharmonic::{CosSinData, NedelecBackend};
//!
//! let mut mesh = unit_square_triangles(4);
//! let mut backend = NedelecBackend::new(CosSinData);
//! let mut driver = AdaptiveDriver::new(DriverConfig {
//!     max_rounds: 3,
//!     ..Default::default()
//! })?;
//!
//! driver.run(&mut mesh, &mut backend)?;
//! for record in driver.history() {
//!     println!("{} dofs: {:?}", record.dofs, record.norms);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod driver;
pub mod estimate;
pub mod marking;
pub mod mesh;
pub mod recovery;
pub mod timeharmonic;

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
