//! Bulk (Dörfler) cell marking
//!
//! Selects the smallest set of cells whose cumulative indicator mass reaches a
//! fraction `theta` of the total: cells are visited in descending indicator
//! order (ties broken by ascending index for determinism) and marked until the
//! running sum first reaches `theta * total`.

/// Mark cells by bulk chasing
///
/// `theta` must lie in `(0, 1]`; with `theta = 1` every cell with a nonzero
/// indicator is marked. If the total indicator mass is zero no cell is marked;
/// the caller is expected to treat that as stagnation rather than loop.
pub fn bulk_mark(indicator: &[f64], theta: f64) -> Vec<bool> {
    debug_assert!(theta > 0.0 && theta <= 1.0);

    let mut order: Vec<usize> = (0..indicator.len()).collect();
    order.sort_unstable_by(|&i, &j| indicator[j].total_cmp(&indicator[i]).then(i.cmp(&j)));

    // summing in the visit order keeps the theta = 1 case exact
    let total: f64 = order.iter().map(|&i| indicator[i]).sum();
    let mut marked = vec![false; indicator.len()];
    if total <= 0.0 {
        return marked;
    }

    let target = theta * total;
    let mut accumulated = 0.0;
    for &cell in &order {
        marked[cell] = true;
        accumulated += indicator[cell];
        if accumulated >= target {
            break;
        }
    }
    marked
}

/// Number of marked cells
pub fn marked_count(marked: &[bool]) -> usize {
    marked.iter().filter(|&&m| m).count()
}
