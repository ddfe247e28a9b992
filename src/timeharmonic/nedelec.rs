//! Lowest-order first-kind Nédélec elements on triangles
//!
//! One degree of freedom per edge: the circulation of the field along the
//! edge, oriented from the lower to the higher node index. The local basis on
//! a cell is `phi_ij = lambda_i grad(lambda_j) - lambda_j grad(lambda_i)` for
//! the edge between vertices `i` and `j`; its curl is cellwise constant.
//!
//! Mass and load integrals use the three-midpoint quadrature rule, which is
//! exact for the quadratic mass integrand.

use crate::mesh::{MeshTopology, Point, TriMesh};

/// Barycentric coordinates of the edge-midpoint quadrature points
const MIDPOINT_RULE: [[f64; 3]; 3] = [[0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0]];

/// Per-cell geometry shared by all element integrals
pub struct CellGeometry {
    /// Unsigned cell area
    pub area: f64,
    /// Barycentric coordinate gradients
    pub grad_lambda: [[f64; 2]; 3],
    /// Cell vertex coordinates
    pub vertices: [Point; 3],
}

impl CellGeometry {
    /// Physical location of a barycentric point
    pub fn point(&self, lambda: [f64; 3]) -> Point {
        Point::new(
            lambda[0] * self.vertices[0].x
                + lambda[1] * self.vertices[1].x
                + lambda[2] * self.vertices[2].x,
            lambda[0] * self.vertices[0].y
                + lambda[1] * self.vertices[1].y
                + lambda[2] * self.vertices[2].y,
        )
    }
}

/// Lowest-order Nédélec space over a mesh and its derived topology
pub struct NedelecSpace<'a> {
    pub mesh: &'a TriMesh,
    pub topo: &'a MeshTopology,
}

impl<'a> NedelecSpace<'a> {
    pub fn new(mesh: &'a TriMesh, topo: &'a MeshTopology) -> Self {
        Self { mesh, topo }
    }

    /// Global degrees of freedom (one per edge)
    pub fn num_dofs(&self) -> usize {
        self.topo.num_edges()
    }

    /// Geometry of one cell
    pub fn geometry(&self, cell: usize) -> CellGeometry {
        let [a, b, c] = self.mesh.cells[cell];
        let p = [self.mesh.nodes[a], self.mesh.nodes[b], self.mesh.nodes[c]];
        let signed_area =
            0.5 * ((p[1].x - p[0].x) * (p[2].y - p[0].y) - (p[1].y - p[0].y) * (p[2].x - p[0].x));
        let inv = 1.0 / (2.0 * signed_area);
        // grad(lambda_i) = rot(p_j - p_k) / (2 A), (i, j, k) cyclic
        let mut grad_lambda = [[0.0; 2]; 3];
        for i in 0..3 {
            let j = (i + 1) % 3;
            let k = (i + 2) % 3;
            grad_lambda[i] = [(p[j].y - p[k].y) * inv, (p[k].x - p[j].x) * inv];
        }
        CellGeometry {
            area: signed_area.abs(),
            grad_lambda,
            vertices: p,
        }
    }

    /// Orientation signs of a cell's local edges relative to the global
    /// low-to-high edge direction
    pub fn dof_signs(&self, cell: usize) -> [f64; 3] {
        let nodes = self.mesh.cells[cell];
        let mut signs = [0.0; 3];
        for k in 0..3 {
            let i = nodes[(k + 1) % 3];
            let j = nodes[(k + 2) % 3];
            signs[k] = if i < j { 1.0 } else { -1.0 };
        }
        signs
    }

    /// Local basis vectors at a barycentric point, in local edge orientation
    pub fn basis_at(geom: &CellGeometry, lambda: [f64; 3]) -> [[f64; 2]; 3] {
        let g = &geom.grad_lambda;
        let mut phi = [[0.0; 2]; 3];
        for k in 0..3 {
            let i = (k + 1) % 3;
            let j = (k + 2) % 3;
            phi[k] = [
                lambda[i] * g[j][0] - lambda[j] * g[i][0],
                lambda[i] * g[j][1] - lambda[j] * g[i][1],
            ];
        }
        phi
    }

    /// Cellwise-constant curls of the local basis, in local edge orientation
    pub fn basis_curls(geom: &CellGeometry) -> [f64; 3] {
        let g = &geom.grad_lambda;
        let mut curls = [0.0; 3];
        for k in 0..3 {
            let i = (k + 1) % 3;
            let j = (k + 2) % 3;
            // curl(phi_ij) = 2 grad(lambda_i) x grad(lambda_j)
            curls[k] = 2.0 * (g[i][0] * g[j][1] - g[i][1] * g[j][0]);
        }
        curls
    }

    /// Element curl-curl and mass matrices, in local edge orientation
    pub fn element_matrices(&self, cell: usize) -> ([[f64; 3]; 3], [[f64; 3]; 3]) {
        let geom = self.geometry(cell);
        let curls = Self::basis_curls(&geom);

        let mut curl_mat = [[0.0; 3]; 3];
        for k in 0..3 {
            for l in 0..3 {
                curl_mat[k][l] = geom.area * curls[k] * curls[l];
            }
        }

        let mut mass = [[0.0; 3]; 3];
        let w = geom.area / 3.0;
        for lambda in MIDPOINT_RULE {
            let phi = Self::basis_at(&geom, lambda);
            for k in 0..3 {
                for l in 0..3 {
                    mass[k][l] += w * (phi[k][0] * phi[l][0] + phi[k][1] * phi[l][1]);
                }
            }
        }
        (curl_mat, mass)
    }

    /// Element load vector for a vector source, in local edge orientation
    pub fn element_load<F>(&self, cell: usize, source: F) -> [f64; 3]
    where
        F: Fn(Point) -> [f64; 2],
    {
        let geom = self.geometry(cell);
        let w = geom.area / 3.0;
        let mut load = [0.0; 3];
        for lambda in MIDPOINT_RULE {
            let phi = Self::basis_at(&geom, lambda);
            let f = source(geom.point(lambda));
            for k in 0..3 {
                load[k] += w * (f[0] * phi[k][0] + f[1] * phi[k][1]);
            }
        }
        load
    }

    /// Curl of a finite element function on one cell (constant there)
    pub fn cell_curl(&self, cell: usize, dofs: &[f64]) -> f64 {
        let geom = self.geometry(cell);
        let curls = Self::basis_curls(&geom);
        let signs = self.dof_signs(cell);
        let edges = self.topo.cell_edges[cell];
        (0..3).map(|k| signs[k] * dofs[edges[k]] * curls[k]).sum()
    }

    /// Value of a finite element function at a barycentric point of a cell
    pub fn value_at(&self, cell: usize, lambda: [f64; 3], dofs: &[f64]) -> [f64; 2] {
        let geom = self.geometry(cell);
        let phi = Self::basis_at(&geom, lambda);
        let signs = self.dof_signs(cell);
        let edges = self.topo.cell_edges[cell];
        let mut value = [0.0; 2];
        for k in 0..3 {
            let coeff = signs[k] * dofs[edges[k]];
            value[0] += coeff * phi[k][0];
            value[1] += coeff * phi[k][1];
        }
        value
    }

    /// Edge circulation of an exact vector field, by Simpson's rule
    pub fn edge_circulation<F>(&self, edge: usize, field: F) -> f64
    where
        F: Fn(Point) -> [f64; 2],
    {
        let (a, b) = self.topo.edge_endpoints(edge);
        let pa = self.mesh.nodes[a];
        let pb = self.mesh.nodes[b];
        let mid = pa.midpoint(&pb);
        let (dx, dy) = (pb.x - pa.x, pb.y - pa.y);
        let ua = field(pa);
        let um = field(mid);
        let ub = field(pb);
        ((ua[0] + 4.0 * um[0] + ub[0]) * dx + (ua[1] + 4.0 * um[1] + ub[1]) * dy) / 6.0
    }

    /// Edge-dof interpolant of an exact vector field
    pub fn interpolate<F>(&self, field: F) -> Vec<f64>
    where
        F: Fn(Point) -> [f64; 2],
    {
        (0..self.num_dofs())
            .map(|e| self.edge_circulation(e, &field))
            .collect()
    }

    /// L2 distance between a finite element function and an exact field
    pub fn l2_error_solution<F>(&self, dofs: &[f64], exact: F) -> f64
    where
        F: Fn(Point) -> [f64; 2],
    {
        let mut err_sq = 0.0;
        for cell in 0..self.mesh.num_cells() {
            let geom = self.geometry(cell);
            let w = geom.area / 3.0;
            for lambda in MIDPOINT_RULE {
                let uh = self.value_at(cell, lambda, dofs);
                let u = exact(geom.point(lambda));
                let dx = u[0] - uh[0];
                let dy = u[1] - uh[1];
                err_sq += w * (dx * dx + dy * dy);
            }
        }
        err_sq.sqrt()
    }

    /// L2 distance between the cellwise curl of a finite element function and
    /// an exact scalar field
    pub fn l2_error_curl<F>(&self, dofs: &[f64], exact_curl: F) -> f64
    where
        F: Fn(Point) -> f64,
    {
        let mut err_sq = 0.0;
        for cell in 0..self.mesh.num_cells() {
            let geom = self.geometry(cell);
            let w = geom.area / 3.0;
            let curl_h = self.cell_curl(cell, dofs);
            for lambda in MIDPOINT_RULE {
                let d = exact_curl(geom.point(lambda)) - curl_h;
                err_sq += w * d * d;
            }
        }
        err_sq.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::unit_square_triangles;
    use crate::timeharmonic::pde::{CosSinData, TimeHarmonicPde};
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_cell_basis_curls() {
        let mut mesh = TriMesh::new();
        mesh.add_node(Point::new(0.0, 0.0));
        mesh.add_node(Point::new(1.0, 0.0));
        mesh.add_node(Point::new(0.0, 1.0));
        mesh.add_cell([0, 1, 2]);
        let topo = mesh.topology();
        let space = NedelecSpace::new(&mesh, &topo);

        let geom = space.geometry(0);
        assert_relative_eq!(geom.area, 0.5, epsilon = 1e-12);
        // curl of each local basis function is 1/area on a triangle
        for c in NedelecSpace::basis_curls(&geom) {
            assert_relative_eq!(c, 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_element_matrices_symmetric() {
        let mesh = unit_square_triangles(2);
        let topo = mesh.topology();
        let space = NedelecSpace::new(&mesh, &topo);

        for cell in 0..mesh.num_cells() {
            let (curl_mat, mass) = space.element_matrices(cell);
            for k in 0..3 {
                assert!(mass[k][k] > 0.0);
                for l in 0..3 {
                    assert_relative_eq!(curl_mat[k][l], curl_mat[l][k], epsilon = 1e-12);
                    assert_relative_eq!(mass[k][l], mass[l][k], epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_interpolant_circulation_consistency() {
        // By Stokes' theorem the cellwise curl of the edge interpolant is the
        // mean curl over the cell; at mesh size 1/8 that stays close to the
        // centroid value of the exact curl.
        let mesh = unit_square_triangles(8);
        let topo = mesh.topology();
        let space = NedelecSpace::new(&mesh, &topo);
        let data = CosSinData;

        let dofs = space.interpolate(|p| data.solution(p));
        for cell in 0..mesh.num_cells() {
            let curl_h = space.cell_curl(cell, &dofs);
            let exact = data.curl(mesh.cell_centroid(cell));
            assert!(
                (curl_h - exact).abs() < 0.25,
                "cell {}: curl {} vs exact {}",
                cell,
                curl_h,
                exact
            );
        }
    }

    #[test]
    fn test_interpolant_l2_accuracy() {
        let data = CosSinData;
        let error_at = |n: usize| {
            let mesh = unit_square_triangles(n);
            let topo = mesh.topology();
            let space = NedelecSpace::new(&mesh, &topo);
            let dofs = space.interpolate(|p| data.solution(p));
            space.l2_error_solution(&dofs, |p| data.solution(p))
        };

        let coarse = error_at(4);
        let fine = error_at(8);
        assert!(coarse.is_finite() && fine.is_finite());
        assert!(fine < coarse, "no convergence: {} -> {}", coarse, fine);
        assert!(fine < 1.0, "interpolation error too large: {}", fine);
    }

    #[test]
    fn test_constant_field_interpolates_exactly() {
        // constant vector fields are in the lowest-order Nédélec space
        let mesh = unit_square_triangles(3);
        let topo = mesh.topology();
        let space = NedelecSpace::new(&mesh, &topo);

        let dofs = space.interpolate(|_| [1.0, -2.0]);
        let err = space.l2_error_solution(&dofs, |_| [1.0, -2.0]);
        assert_relative_eq!(err, 0.0, epsilon = 1e-10);
        for cell in 0..mesh.num_cells() {
            assert_relative_eq!(space.cell_curl(cell, &dofs), 0.0, epsilon = 1e-10);
        }
    }
}
