//! Structured mesh generators
//!
//! Provides triangulated rectangle meshes used as initial meshes for the
//! adaptive loop.

use super::types::{Point, TriMesh};

/// Generate a rectangular mesh with triangular cells
///
/// Each grid cell is split along its bottom-left to top-right diagonal.
pub fn rectangular_mesh_triangles(
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    nx: usize,
    ny: usize,
) -> TriMesh {
    let mut mesh = TriMesh::new();

    let dx = (x_max - x_min) / nx as f64;
    let dy = (y_max - y_min) / ny as f64;

    // Create nodes
    for j in 0..=ny {
        for i in 0..=nx {
            let x = x_min + i as f64 * dx;
            let y = y_min + j as f64 * dy;
            mesh.add_node(Point::new(x, y));
        }
    }

    // Two triangles per grid cell
    for j in 0..ny {
        for i in 0..nx {
            let n00 = j * (nx + 1) + i;
            let n10 = n00 + 1;
            let n01 = n00 + (nx + 1);
            let n11 = n01 + 1;

            mesh.add_cell([n00, n10, n11]);
            mesh.add_cell([n00, n11, n01]);
        }
    }

    mesh
}

/// Generate a unit square mesh with `n x n` grid cells (2n² triangles)
pub fn unit_square_triangles(n: usize) -> TriMesh {
    rectangular_mesh_triangles(0.0, 1.0, 0.0, 1.0, n, n)
}
