//! Nodal recovery of cellwise fields
//!
//! The raw curl of a curl-conforming finite element solution is piecewise
//! constant and discontinuous across cells. The recovery operators here
//! rebuild a continuous nodal field from it: a cheap inverse-area-weighted
//! average, and a superconvergent patch recovery (SPR) that fits a local
//! affine polynomial over each node's incident edges.

mod averaging;
mod spr;

pub use averaging::recover_averaging;
pub use spr::{edge_average, recover_spr, recover_spr_from_edges};

use crate::mesh::{MeshTopology, TriMesh};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recovery errors
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("node {0} has no incident cells (malformed mesh)")]
    DegenerateNode(usize),
    #[error("non-finite recovered value at node {0}")]
    NonFiniteValue(usize),
}

/// Closed set of nodal recovery strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecoveryMethod {
    /// Inverse-area-weighted nodal averaging
    Averaging,
    /// Superconvergent patch recovery over incident edges, falling back to
    /// averaging at nodes with singular patches
    #[default]
    SuperconvergentPatch,
}

/// Recover a nodal field from a cellwise field with the chosen strategy
pub fn recover(
    mesh: &TriMesh,
    topo: &MeshTopology,
    cell_field: &[f64],
    method: RecoveryMethod,
) -> Result<Vec<f64>, RecoveryError> {
    match method {
        RecoveryMethod::Averaging => recover_averaging(mesh, topo, cell_field),
        RecoveryMethod::SuperconvergentPatch => recover_spr(mesh, topo, cell_field),
    }
}
