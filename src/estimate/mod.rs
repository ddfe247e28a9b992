//! Recovery-based a posteriori error estimation
//!
//! The per-cell indicator is the squared difference between the raw cellwise
//! value and the recovered nodal field evaluated back at the cell's
//! barycentric sample point, weighted by the cell area. The global estimate is
//! the square root of the indicator sum.

use crate::mesh::TriMesh;
use rayon::prelude::*;
use thiserror::Error;

/// Estimation errors
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("non-finite error indicator at cell {0}")]
    NonFiniteIndicator(usize),
}

/// Per-cell indicators and the global estimate
#[derive(Debug, Clone)]
pub struct ErrorEstimate {
    /// One non-negative indicator per cell
    pub indicator: Vec<f64>,
    /// `sqrt(sum of indicators)`
    pub global: f64,
}

/// Estimate the per-cell error from a raw cell field and a recovered nodal field
///
/// The recovered field is interpolated to each cell's centroid by averaging
/// its three nodal values, which is the exact barycentric evaluation of a
/// nodal-linear field at that point. NaN or Inf anywhere in the inputs is
/// rejected so that no adaptive decision is made on corrupted data.
pub fn estimate(
    mesh: &TriMesh,
    cell_field: &[f64],
    recovered: &[f64],
) -> Result<ErrorEstimate, EstimateError> {
    assert_eq!(cell_field.len(), mesh.num_cells());
    assert_eq!(recovered.len(), mesh.num_nodes());

    let indicator: Vec<f64> = (0..mesh.num_cells())
        .into_par_iter()
        .map(|c| {
            let [a, b, d] = mesh.cells[c];
            let at_cell = (recovered[a] + recovered[b] + recovered[d]) / 3.0;
            let diff = at_cell - cell_field[c];
            let eta = mesh.cell_measure(c) * diff * diff;
            if eta.is_finite() {
                Ok(eta)
            } else {
                Err(EstimateError::NonFiniteIndicator(c))
            }
        })
        .collect::<Result<_, _>>()?;

    let global = indicator.iter().sum::<f64>().sqrt();
    Ok(ErrorEstimate { indicator, global })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::unit_square_triangles;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_recovery_gives_zero_estimate() {
        let mesh = unit_square_triangles(3);
        let cell_field = vec![2.0; mesh.num_cells()];
        let recovered = vec![2.0; mesh.num_nodes()];

        let est = estimate(&mesh, &cell_field, &recovered).unwrap();
        assert_relative_eq!(est.global, 0.0, epsilon = 1e-12);
        assert!(est.indicator.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_indicator_scales_with_measure_and_misfit() {
        let mesh = unit_square_triangles(1);
        let cell_field = vec![0.0, 1.0];
        let recovered = vec![0.0; mesh.num_nodes()];

        let est = estimate(&mesh, &cell_field, &recovered).unwrap();
        assert_relative_eq!(est.indicator[0], 0.0, epsilon = 1e-12);
        // measure 0.5, squared difference 1
        assert_relative_eq!(est.indicator[1], 0.5, epsilon = 1e-12);
        assert_relative_eq!(est.global, 0.5_f64.sqrt(), epsilon = 1e-12);
        assert!(est.indicator.iter().all(|&e| e >= 0.0));
    }

    #[test]
    fn test_nan_input_rejected() {
        let mesh = unit_square_triangles(1);
        let cell_field = vec![f64::NAN, 1.0];
        let recovered = vec![0.0; mesh.num_nodes()];

        let err = estimate(&mesh, &cell_field, &recovered).unwrap_err();
        assert!(matches!(err, EstimateError::NonFiniteIndicator(0)));
    }
}
