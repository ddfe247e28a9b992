//! Inverse-area-weighted nodal averaging
//!
//! Each node receives the average of the cell values around it, weighted by
//! the reciprocal of the cell area so that finer cells dominate.

use super::RecoveryError;
use crate::mesh::{MeshTopology, TriMesh};
use rayon::prelude::*;

/// Recover a nodal field by inverse-area-weighted averaging of a cell field
///
/// Fails with [`RecoveryError::DegenerateNode`] if some node has no incident
/// cell, which indicates a malformed mesh.
pub fn recover_averaging(
    mesh: &TriMesh,
    topo: &MeshTopology,
    cell_field: &[f64],
) -> Result<Vec<f64>, RecoveryError> {
    assert_eq!(cell_field.len(), mesh.num_cells());

    let inv_measure: Vec<f64> = (0..mesh.num_cells())
        .map(|c| 1.0 / mesh.cell_measure(c))
        .collect();

    (0..mesh.num_nodes())
        .into_par_iter()
        .map(|node| {
            let cells = &topo.node_cells[node];
            if cells.is_empty() {
                return Err(RecoveryError::DegenerateNode(node));
            }
            let mut weight = 0.0;
            let mut value = 0.0;
            for &c in cells {
                weight += inv_measure[c];
                value += cell_field[c] * inv_measure[c];
            }
            let recovered = value / weight;
            if !recovered.is_finite() {
                return Err(RecoveryError::NonFiniteValue(node));
            }
            Ok(recovered)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::unit_square_triangles;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_field_exactness() {
        let mesh = unit_square_triangles(4);
        let topo = mesh.topology();
        let field = vec![7.5; mesh.num_cells()];

        let recovered = recover_averaging(&mesh, &topo, &field).unwrap();
        for &v in &recovered {
            assert_relative_eq!(v, 7.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_smaller_cells_dominate() {
        // two cells sharing node 1, the second one smaller
        let mut mesh = crate::mesh::TriMesh::new();
        mesh.add_node((0.0, 0.0).into());
        mesh.add_node((1.0, 0.0).into());
        mesh.add_node((1.0, 2.0).into());
        mesh.add_node((1.5, 0.0).into());
        mesh.add_cell([0, 1, 2]);
        mesh.add_cell([1, 3, 2]);
        let topo = mesh.topology();

        let a0 = mesh.cell_measure(0);
        let a1 = mesh.cell_measure(1);
        assert!(a1 < a0);

        let recovered = recover_averaging(&mesh, &topo, &[1.0, 3.0]).unwrap();
        let expected = (1.0 / a0 + 3.0 / a1) / (1.0 / a0 + 1.0 / a1);
        assert_relative_eq!(recovered[1], expected, epsilon = 1e-12);
        // closer to the small cell's value than the plain mean
        assert!(recovered[1] > 2.0);
    }

    #[test]
    fn test_degenerate_node_detected() {
        let mut mesh = crate::mesh::TriMesh::new();
        mesh.add_node((0.0, 0.0).into());
        mesh.add_node((1.0, 0.0).into());
        mesh.add_node((0.0, 1.0).into());
        mesh.add_node((5.0, 5.0).into()); // orphan
        mesh.add_cell([0, 1, 2]);
        let topo = mesh.topology();

        let err = recover_averaging(&mesh, &topo, &[1.0]).unwrap_err();
        assert!(matches!(err, RecoveryError::DegenerateNode(3)));
    }
}
