//! Conforming mesh refinement by longest-edge bisection
//!
//! Cells are marked for refinement by a per-cell boolean mark set. The longest
//! edge of every marked cell is cut at its midpoint; the cut set is then
//! closed so that any cell with a cut edge also has its own longest edge cut,
//! which keeps the subdivided mesh conforming (no hanging nodes). Each cell is
//! finally split into 2, 3, or 4 children depending on how many of its edges
//! were cut.

use super::types::{MeshTopology, TriMesh};

/// Refinement statistics
pub struct RefinementResult {
    /// Number of parent cells that were subdivided
    pub refined_cells: usize,
    /// Indices of midpoint nodes created
    pub new_nodes: Vec<usize>,
}

/// Local index of the longest edge of a cell (edge i opposite vertex i)
fn longest_local_edge(mesh: &TriMesh, topo: &MeshTopology, cell: usize) -> usize {
    let mut best = 0;
    let mut best_len = 0.0_f64;
    for (i, &edge) in topo.cell_edges[cell].iter().enumerate() {
        let [a, b] = topo.edges[edge];
        let p = mesh.node(a);
        let q = mesh.node(b);
        let dx = q.x - p.x;
        let dy = q.y - p.y;
        let len = dx * dx + dy * dy;
        if len > best_len {
            best_len = len;
            best = i;
        }
    }
    best
}

/// Refine all cells flagged in `marked` by conforming longest-edge bisection
///
/// `marked` must have one entry per cell. Node and cell indices of the refined
/// mesh bear no relation to the old ones; every derived array (topology,
/// fields, indicators) is invalid afterwards and must be rebuilt.
pub fn bisect(mesh: &mut TriMesh, marked: &[bool]) -> RefinementResult {
    assert_eq!(
        marked.len(),
        mesh.num_cells(),
        "mark set length must match cell count"
    );

    let topo = mesh.topology();
    let longest: Vec<usize> = (0..mesh.num_cells())
        .map(|c| longest_local_edge(mesh, &topo, c))
        .collect();

    // Cut the longest edge of every marked cell
    let mut cut = vec![false; topo.num_edges()];
    for (cell, &is_marked) in marked.iter().enumerate() {
        if is_marked {
            cut[topo.cell_edges[cell][longest[cell]]] = true;
        }
    }

    // Closure: a cell with any cut edge must also have its longest edge cut
    loop {
        let mut changed = false;
        for cell in 0..mesh.num_cells() {
            let edges = &topo.cell_edges[cell];
            let refinement_edge = edges[longest[cell]];
            if !cut[refinement_edge] && edges.iter().any(|&e| cut[e]) {
                cut[refinement_edge] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // Create midpoint nodes for all cut edges
    let mut new_nodes = Vec::new();
    let mut midpoint: Vec<Option<usize>> = vec![None; topo.num_edges()];
    for (edge, &is_cut) in cut.iter().enumerate() {
        if is_cut {
            let [a, b] = topo.edges[edge];
            let mid = mesh.nodes[a].midpoint(&mesh.nodes[b]);
            let idx = mesh.add_node(mid);
            midpoint[edge] = Some(idx);
            new_nodes.push(idx);
        }
    }

    // Subdivide cells. The refinement edge is always cut by closure; the two
    // remaining edges each belong to exactly one child and may be cut too.
    let mut new_cells: Vec<[usize; 3]> = Vec::with_capacity(mesh.num_cells());
    let mut refined_cells = 0;
    for (cell, &nodes) in mesh.cells.iter().enumerate() {
        let edges = &topo.cell_edges[cell];
        if edges.iter().all(|&e| !cut[e]) {
            new_cells.push(nodes);
            continue;
        }
        refined_cells += 1;

        let k = longest[cell];
        // apex o opposite the refinement edge (p, q)
        let o = nodes[k];
        let p = nodes[(k + 1) % 3];
        let q = nodes[(k + 2) % 3];
        let m = midpoint[edges[k]].expect("refinement edge is cut");

        // child containing edge (o, p), which is opposite vertex q
        match midpoint[edges[(k + 2) % 3]] {
            Some(u) => {
                new_cells.push([u, p, m]);
                new_cells.push([u, m, o]);
            }
            None => new_cells.push([m, o, p]),
        }
        // child containing edge (q, o), which is opposite vertex p
        match midpoint[edges[(k + 1) % 3]] {
            Some(w) => {
                new_cells.push([w, o, m]);
                new_cells.push([w, m, q]);
            }
            None => new_cells.push([m, q, o]),
        }
    }
    mesh.cells = new_cells;

    RefinementResult {
        refined_cells,
        new_nodes,
    }
}

/// Bisect every cell of the mesh once
pub fn uniform_refine(mesh: &mut TriMesh) -> RefinementResult {
    let marked = vec![true; mesh.num_cells()];
    bisect(mesh, &marked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generators::unit_square_triangles;

    /// Conformity check: Euler's formula for a triangulated disk and exact
    /// area preservation.
    fn assert_conforming(mesh: &TriMesh, expected_area: f64) {
        let topo = mesh.topology();
        assert_eq!(
            topo.num_edges(),
            mesh.num_nodes() + mesh.num_cells() - 1,
            "Euler count violated"
        );
        assert!((mesh.total_measure() - expected_area).abs() < 1e-12);
    }

    #[test]
    fn test_bisect_single_marked_cell() {
        let mut mesh = unit_square_triangles(1);
        assert_eq!(mesh.num_cells(), 2);

        // Both triangles share the diagonal, which is the longest edge of
        // each, so bisecting one forces its neighbour too.
        let mut marked = vec![false; 2];
        marked[0] = true;
        let result = bisect(&mut mesh, &marked);

        assert_eq!(result.refined_cells, 2);
        assert_eq!(result.new_nodes.len(), 1);
        assert_eq!(mesh.num_cells(), 4);
        assert_conforming(&mesh, 1.0);
    }

    #[test]
    fn test_uniform_refine() {
        let mut mesh = unit_square_triangles(2);
        let cells_before = mesh.num_cells();

        let result = uniform_refine(&mut mesh);

        assert_eq!(result.refined_cells, cells_before);
        assert!(mesh.num_cells() >= 2 * cells_before);
        assert_conforming(&mesh, 1.0);
    }

    #[test]
    fn test_repeated_adaptive_bisect_stays_conforming() {
        let mut mesh = unit_square_triangles(2);
        for round in 0..4 {
            // mark roughly a third of the cells, deterministically
            let marked: Vec<bool> = (0..mesh.num_cells())
                .map(|c| (c + round) % 3 == 0)
                .collect();
            let cells_before = mesh.num_cells();
            bisect(&mut mesh, &marked);
            assert!(mesh.num_cells() > cells_before);
            assert_conforming(&mesh, 1.0);
        }
    }

    #[test]
    fn test_empty_mark_set_is_noop() {
        let mut mesh = unit_square_triangles(2);
        let cells_before = mesh.num_cells();
        let result = bisect(&mut mesh, &vec![false; cells_before]);
        assert_eq!(result.refined_cells, 0);
        assert_eq!(mesh.num_cells(), cells_before);
    }
}
