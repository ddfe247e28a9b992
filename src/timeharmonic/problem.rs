//! Assembly and solve for the time-harmonic model problem
//!
//! Assembles `curl-curl - mass` for the lowest-order Nédélec space, applies
//! Dirichlet (tangential) data on boundary edges, and solves with a dense LU
//! factorization. The dense solve is only suitable for the small systems the
//! adaptive demo produces; a sparse solver is deliberately out of scope.

use super::nedelec::NedelecSpace;
use super::pde::TimeHarmonicPde;
use crate::driver::{FemBackend, RoundSolution};
use crate::mesh::TriMesh;
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Solve errors for the model backend
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("assembled time-harmonic system is singular")]
    SingularSystem,
}

/// Assemble the `curl-curl - mass` system and source vector
fn assemble<P: TimeHarmonicPde>(
    space: &NedelecSpace<'_>,
    pde: &P,
) -> (DMatrix<f64>, DVector<f64>) {
    let n = space.num_dofs();
    let mut matrix = DMatrix::zeros(n, n);
    let mut rhs = DVector::zeros(n);

    for cell in 0..space.mesh.num_cells() {
        let (curl_mat, mass) = space.element_matrices(cell);
        let load = space.element_load(cell, |p| pde.source(p));
        let signs = space.dof_signs(cell);
        let edges = space.topo.cell_edges[cell];

        for k in 0..3 {
            rhs[edges[k]] += signs[k] * load[k];
            for l in 0..3 {
                matrix[(edges[k], edges[l])] +=
                    signs[k] * signs[l] * (curl_mat[k][l] - mass[k][l]);
            }
        }
    }
    (matrix, rhs)
}

/// Impose Dirichlet values on boundary edges by row/column elimination
fn apply_dirichlet<P: TimeHarmonicPde>(
    space: &NedelecSpace<'_>,
    pde: &P,
    matrix: &mut DMatrix<f64>,
    rhs: &mut DVector<f64>,
) {
    let n = space.num_dofs();
    for edge in 0..n {
        if !space.topo.is_boundary_edge(edge) {
            continue;
        }
        let value = space.edge_circulation(edge, |p| pde.solution(p));
        for i in 0..n {
            rhs[i] -= matrix[(i, edge)] * value;
            matrix[(i, edge)] = 0.0;
            matrix[(edge, i)] = 0.0;
        }
        matrix[(edge, edge)] = 1.0;
        rhs[edge] = value;
    }
}

/// Finite element backend for the driver, parameterized by the model data
pub struct NedelecBackend<P: TimeHarmonicPde> {
    pde: P,
}

impl<P: TimeHarmonicPde> NedelecBackend<P> {
    pub fn new(pde: P) -> Self {
        Self { pde }
    }
}

impl<P: TimeHarmonicPde> FemBackend for NedelecBackend<P> {
    type Error = SolveError;

    fn assemble_and_solve(&mut self, mesh: &TriMesh) -> Result<RoundSolution, SolveError> {
        let topo = mesh.topology();
        let space = NedelecSpace::new(mesh, &topo);

        let (mut matrix, mut rhs) = assemble(&space, &self.pde);
        apply_dirichlet(&space, &self.pde, &mut matrix, &mut rhs);

        let dofs = matrix
            .lu()
            .solve(&rhs)
            .ok_or(SolveError::SingularSystem)?;
        let dofs = dofs.as_slice();

        let cell_field: Vec<f64> = (0..mesh.num_cells())
            .map(|c| space.cell_curl(c, dofs))
            .collect();

        let extra_norms = vec![
            (
                "L2 u".to_string(),
                space.l2_error_solution(dofs, |p| self.pde.solution(p)),
            ),
            (
                "L2 curl u".to_string(),
                space.l2_error_curl(dofs, |p| self.pde.curl(p)),
            ),
        ];

        Ok(RoundSolution {
            cell_field,
            dof_count: space.num_dofs(),
            extra_norms,
        })
    }
}
