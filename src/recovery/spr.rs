//! Superconvergent patch recovery over incident edges
//!
//! For every node, an affine polynomial is fitted by least squares to the
//! edge-field samples of the node's incident edges. The design row of an edge
//! is `[1, d.x, d.y]` where `d` is the offset from the node to the edge
//! midpoint, so the first endpoint of an edge sees the half-edge vector `+v`
//! and the second endpoint `-v`. The fitted constant term is the recovered
//! nodal value; it carries one extra order of accuracy on patches with at
//! least three independent edge directions.
//!
//! Nodes whose accumulated 3x3 system is singular to working precision
//! (boundary corners with too few or collinear edges) deterministically take
//! the averaging-recovery value instead.

use super::{recover_averaging, RecoveryError};
use crate::mesh::{MeshTopology, TriMesh};
use rayon::prelude::*;

/// Pivot threshold, relative to the column scale of the patch matrix
const PIVOT_TOL: f64 = 1e-10;

/// Average a cell field onto edges
///
/// Interior edges take the mean of their two incident cells, boundary edges
/// the value of their single cell.
pub fn edge_average(topo: &MeshTopology, cell_field: &[f64]) -> Vec<f64> {
    topo.edge_cells
        .iter()
        .map(|&(c0, c1)| match c1 {
            Some(c1) => 0.5 * (cell_field[c0] + cell_field[c1]),
            None => cell_field[c0],
        })
        .collect()
}

/// Solve a 3x3 system by partial-pivot Gaussian elimination on the stack
///
/// Returns `None` when a pivot falls below `PIVOT_TOL` relative to its
/// column's magnitude, i.e. the system is singular to working precision.
fn solve3(a: &[[f64; 3]; 3], b: &[f64; 3]) -> Option<[f64; 3]> {
    let mut m = *a;
    let mut r = *b;

    let mut scale = [0.0_f64; 3];
    for row in &m {
        for j in 0..3 {
            scale[j] = scale[j].max(row[j].abs());
        }
    }

    for k in 0..3 {
        let mut piv = k;
        for i in k + 1..3 {
            if m[i][k].abs() > m[piv][k].abs() {
                piv = i;
            }
        }
        if m[piv][k].abs() <= PIVOT_TOL * scale[k] {
            return None;
        }
        if piv != k {
            m.swap(k, piv);
            r.swap(k, piv);
        }
        for i in k + 1..3 {
            let f = m[i][k] / m[k][k];
            for j in k + 1..3 {
                m[i][j] -= f * m[k][j];
            }
            r[i] -= f * r[k];
        }
    }

    let mut x = [0.0; 3];
    for k in (0..3).rev() {
        let mut s = r[k];
        for j in k + 1..3 {
            s -= m[k][j] * x[j];
        }
        x[k] = s / m[k][k];
    }
    Some(x)
}

fn accumulate(a: &mut [[f64; 3]; 3], r: &mut [f64; 3], phi: [f64; 3], value: f64) {
    for i in 0..3 {
        for j in 0..3 {
            a[i][j] += phi[i] * phi[j];
        }
        r[i] += value * phi[i];
    }
}

/// Patch recovery from an explicit edge field
///
/// `fallback` must hold one value per node; it is used verbatim for nodes
/// whose patch system is singular. Returns the recovered nodal values and the
/// number of nodes that fell back.
pub fn recover_spr_from_edges(
    mesh: &TriMesh,
    topo: &MeshTopology,
    edge_field: &[f64],
    fallback: &[f64],
) -> (Vec<f64>, usize) {
    assert_eq!(edge_field.len(), topo.num_edges());
    assert_eq!(fallback.len(), mesh.num_nodes());

    let mut mats = vec![[[0.0_f64; 3]; 3]; mesh.num_nodes()];
    let mut rhs = vec![[0.0_f64; 3]; mesh.num_nodes()];

    for (e, &[a, b]) in topo.edges.iter().enumerate() {
        let pa = mesh.node(a);
        let pb = mesh.node(b);
        let vx = 0.5 * (pb.x - pa.x);
        let vy = 0.5 * (pb.y - pa.y);
        let g = edge_field[e];
        accumulate(&mut mats[a], &mut rhs[a], [1.0, vx, vy], g);
        // the second endpoint sees the midpoint on the opposite side
        accumulate(&mut mats[b], &mut rhs[b], [1.0, -vx, -vy], g);
    }

    let solved: Vec<(f64, bool)> = (0..mesh.num_nodes())
        .into_par_iter()
        .map(|n| match solve3(&mats[n], &rhs[n]) {
            Some(c) if c[0].is_finite() => (c[0], false),
            _ => (fallback[n], true),
        })
        .collect();

    let fallbacks = solved.iter().filter(|&&(_, fb)| fb).count();
    let values = solved.into_iter().map(|(v, _)| v).collect();
    (values, fallbacks)
}

/// Superconvergent patch recovery of a cell field
///
/// Derives the edge field by averaging adjacent cell values, fits the per-node
/// patches, and falls back to inverse-area-weighted averaging at nodes with
/// singular patches.
pub fn recover_spr(
    mesh: &TriMesh,
    topo: &MeshTopology,
    cell_field: &[f64],
) -> Result<Vec<f64>, RecoveryError> {
    assert_eq!(cell_field.len(), mesh.num_cells());

    // the averaging field doubles as degenerate-mesh validation
    let fallback = recover_averaging(mesh, topo, cell_field)?;
    let edge_field = edge_average(topo, cell_field);

    let (values, fallbacks) = recover_spr_from_edges(mesh, topo, &edge_field, &fallback);
    if fallbacks > 0 {
        log::debug!(
            "patch recovery fell back to averaging at {} of {} nodes",
            fallbacks,
            mesh.num_nodes()
        );
    }

    if let Some(node) = values.iter().position(|v| !v.is_finite()) {
        return Err(RecoveryError::NonFiniteValue(node));
    }
    Ok(values)
}
