//! Triangle mesh types for adaptive finite element analysis
//!
//! The mesh owns only nodes and cells. Everything edge-related (edge list,
//! edge-to-cell incidence, node-to-cell adjacency) lives in [`MeshTopology`],
//! which is derived on demand and must be rebuilt after every refinement.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A point in the plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between two points
    pub fn midpoint(&self, other: &Point) -> Point {
        Point {
            x: 0.5 * (self.x + other.x),
            y: 0.5 * (self.y + other.y),
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from(p: (f64, f64)) -> Self {
        Point::new(p.0, p.1)
    }
}

/// Edge identified by its sorted endpoint node indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey(pub usize, pub usize);

impl EdgeKey {
    pub fn new(a: usize, b: usize) -> Self {
        if a < b { EdgeKey(a, b) } else { EdgeKey(b, a) }
    }
}

/// A conforming triangle mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriMesh {
    /// Node coordinates
    pub nodes: Vec<Point>,
    /// Cells as node index triples
    pub cells: Vec<[usize; 3]>,
}

impl TriMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// Add a node and return its index
    pub fn add_node(&mut self, point: Point) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(point);
        idx
    }

    /// Add a cell and return its index
    pub fn add_cell(&mut self, nodes: [usize; 3]) -> usize {
        let idx = self.cells.len();
        self.cells.push(nodes);
        idx
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of cells
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Get node coordinates
    pub fn node(&self, idx: usize) -> &Point {
        &self.nodes[idx]
    }

    /// Cell area
    pub fn cell_measure(&self, cell: usize) -> f64 {
        let [a, b, c] = self.cells[cell];
        let p0 = &self.nodes[a];
        let p1 = &self.nodes[b];
        let p2 = &self.nodes[c];
        let v1 = (p1.x - p0.x, p1.y - p0.y);
        let v2 = (p2.x - p0.x, p2.y - p0.y);
        0.5 * (v1.0 * v2.1 - v1.1 * v2.0).abs()
    }

    /// Cell centroid (barycentric sample point)
    pub fn cell_centroid(&self, cell: usize) -> Point {
        let [a, b, c] = self.cells[cell];
        Point::new(
            (self.nodes[a].x + self.nodes[b].x + self.nodes[c].x) / 3.0,
            (self.nodes[a].y + self.nodes[b].y + self.nodes[c].y) / 3.0,
        )
    }

    /// Total mesh area
    pub fn total_measure(&self) -> f64 {
        (0..self.num_cells()).map(|c| self.cell_measure(c)).sum()
    }

    /// Build the derived edge and adjacency arrays for the current cells.
    ///
    /// The result is invalidated by any mutation of the mesh; callers that
    /// refine must rebuild it.
    pub fn topology(&self) -> MeshTopology {
        let mut edge_ids: HashMap<EdgeKey, usize> = HashMap::new();
        let mut edges: Vec<[usize; 2]> = Vec::new();
        let mut edge_cells: Vec<(usize, Option<usize>)> = Vec::new();
        let mut cell_edges: Vec<[usize; 3]> = Vec::with_capacity(self.cells.len());
        let mut node_cells: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];

        for (cell_idx, cell) in self.cells.iter().enumerate() {
            let mut local = [0usize; 3];
            // local edge i is opposite vertex i
            for (i, (a, b)) in [
                (cell[1], cell[2]),
                (cell[2], cell[0]),
                (cell[0], cell[1]),
            ]
            .into_iter()
            .enumerate()
            {
                let key = EdgeKey::new(a, b);
                let edge_idx = *edge_ids.entry(key).or_insert_with(|| {
                    edges.push([key.0, key.1]);
                    edge_cells.push((cell_idx, None));
                    edges.len() - 1
                });
                if edge_cells[edge_idx].0 != cell_idx {
                    edge_cells[edge_idx].1 = Some(cell_idx);
                }
                local[i] = edge_idx;
            }
            cell_edges.push(local);
            for &n in cell {
                node_cells[n].push(cell_idx);
            }
        }

        MeshTopology {
            edges,
            edge_cells,
            cell_edges,
            node_cells,
        }
    }
}

impl Default for TriMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Derived edge and adjacency arrays for one mesh generation
///
/// All indices refer to the `TriMesh` the topology was built from.
#[derive(Debug, Clone)]
pub struct MeshTopology {
    /// Edge endpoints as sorted node index pairs
    pub edges: Vec<[usize; 2]>,
    /// Edge to incident cells (one for boundary edges, two for interior)
    pub edge_cells: Vec<(usize, Option<usize>)>,
    /// Cell to its three edges (edge i opposite vertex i)
    pub cell_edges: Vec<[usize; 3]>,
    /// Node to incident cells
    pub node_cells: Vec<Vec<usize>>,
}

impl MeshTopology {
    /// Number of edges
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Whether an edge lies on the boundary
    pub fn is_boundary_edge(&self, edge: usize) -> bool {
        self.edge_cells[edge].1.is_none()
    }

    /// Endpoints of an edge, lower node index first
    pub fn edge_endpoints(&self, edge: usize) -> (usize, usize) {
        let [a, b] = self.edges[edge];
        (a, b)
    }
}
