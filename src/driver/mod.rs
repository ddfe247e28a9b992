//! Adaptive solve-estimate-mark-refine driver
//!
//! One round runs assemble+solve (through the [`FemBackend`] seam), nodal
//! recovery, error estimation, history recording, and, unless it is the last
//! round, marking and mesh bisection. All per-round arrays are rebuilt from
//! scratch each round because refinement invalidates every index.

use crate::estimate::{estimate, EstimateError};
use crate::marking::{bulk_mark, marked_count};
use crate::mesh::{bisect, TriMesh};
use crate::recovery::{recover, RecoveryError, RecoveryMethod};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Driver errors
///
/// Any of these halts the round loop; the history recorded so far remains
/// readable on the driver.
#[derive(Debug, Error)]
pub enum AdaptError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("finite element solve failed")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error(transparent)]
    Recovery(#[from] RecoveryError),
    #[error(transparent)]
    Estimate(#[from] EstimateError),
}

/// Immutable per-run parameter record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Number of adaptive rounds
    pub max_rounds: usize,
    /// Bulk marking parameter in `(0, 1]`
    pub theta: f64,
    /// Nodal recovery strategy
    pub recovery: RecoveryMethod,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_rounds: 30,
            theta: 0.3,
            recovery: RecoveryMethod::default(),
        }
    }
}

impl DriverConfig {
    fn validate(&self) -> Result<(), AdaptError> {
        if self.max_rounds == 0 {
            return Err(AdaptError::InvalidConfig(
                "max_rounds must be at least 1".into(),
            ));
        }
        if !(self.theta > 0.0 && self.theta <= 1.0) {
            return Err(AdaptError::InvalidConfig(format!(
                "theta must lie in (0, 1], got {}",
                self.theta
            )));
        }
        Ok(())
    }
}

/// One assemble+solve result handed back by the FE layer
#[derive(Debug, Clone)]
pub struct RoundSolution {
    /// Raw derived quantity (curl of the solution) at each cell's barycenter
    pub cell_field: Vec<f64>,
    /// Degrees of freedom of the solve
    pub dof_count: usize,
    /// Named exact-solution comparison norms, appended to the history
    pub extra_norms: Vec<(String, f64)>,
}

/// The external finite element layer
///
/// The driver owns the adaptive loop; assembly, boundary conditions, and the
/// linear solve stay behind this seam.
pub trait FemBackend {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Assemble and solve on the current mesh, returning the raw cell field
    /// and the dof count
    fn assemble_and_solve(&mut self, mesh: &TriMesh) -> Result<RoundSolution, Self::Error>;
}

/// One convergence-history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceRecord {
    /// Adaptive round index
    pub round: usize,
    /// Degrees of freedom in this round's solve
    pub dofs: usize,
    /// Named error norms; the estimator's global value comes first
    pub norms: Vec<(String, f64)>,
}

/// Why the round loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The configured number of rounds completed
    RoundLimit,
    /// The estimator judged the solution locally exact everywhere (zero total
    /// indicator mass), so marking selected no cells
    Stagnated { round: usize },
}

/// Name under which the estimator's global value is recorded
pub const ESTIMATOR_NORM: &str = "eta";

/// Adaptive driver with its owned, append-only convergence history
pub struct AdaptiveDriver {
    config: DriverConfig,
    history: Vec<ConvergenceRecord>,
}

impl AdaptiveDriver {
    /// Create a driver, validating the configuration
    pub fn new(config: DriverConfig) -> Result<Self, AdaptError> {
        config.validate()?;
        Ok(Self {
            config,
            history: Vec::new(),
        })
    }

    /// The configuration this driver runs with
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Convergence records of all completed rounds, including those before a
    /// failed round
    pub fn history(&self) -> &[ConvergenceRecord] {
        &self.history
    }

    /// Run the adaptive loop, mutating `mesh` through refinement
    ///
    /// Each round: solve, recover, estimate, record; then mark and bisect
    /// unless this was the final round. Returns why the loop stopped. On
    /// error the history of completed rounds stays available via
    /// [`history`](Self::history).
    pub fn run<B: FemBackend>(
        &mut self,
        mesh: &mut TriMesh,
        backend: &mut B,
    ) -> Result<StopReason, AdaptError> {
        for round in 0..self.config.max_rounds {
            let solution = backend
                .assemble_and_solve(mesh)
                .map_err(|e| AdaptError::Backend(Box::new(e)))?;

            let topo = mesh.topology();
            let recovered = recover(mesh, &topo, &solution.cell_field, self.config.recovery)?;
            let est = estimate(mesh, &solution.cell_field, &recovered)?;

            log::info!(
                "round {}: {} cells, {} dofs, estimated error {:.4e}",
                round,
                mesh.num_cells(),
                solution.dof_count,
                est.global
            );

            let mut norms = vec![(ESTIMATOR_NORM.to_string(), est.global)];
            norms.extend(solution.extra_norms);
            self.history.push(ConvergenceRecord {
                round,
                dofs: solution.dof_count,
                norms,
            });

            if round + 1 == self.config.max_rounds {
                break;
            }

            let marked = bulk_mark(&est.indicator, self.config.theta);
            if marked_count(&marked) == 0 {
                log::info!("round {}: zero indicator mass, stopping early", round);
                return Ok(StopReason::Stagnated { round });
            }
            bisect(mesh, &marked);
        }
        Ok(StopReason::RoundLimit)
    }
}
