//! Turning a negative cycle discovered during elimination into a human-facing
//! conflict: the minimal set of original constraints that are jointly
//! unsatisfiable. Grounded on `dc_checking/dc_be.py`'s `extract_conflict`,
//! `expand_nc` and `expand_extension_path`.

use crate::ldg::{BoundTag, EdgeId, Ldg, LabelType, Provenance};
use crate::tn::TemporalNetwork;

/// An edge's original-constraint attribution, as reported in a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictEdge {
    pub constraint_name: String,
    pub tag: BoundTag,
}

/// Expands every derived edge in `nc` into the two edges it was triangulated
/// from, recursively, splicing each expansion in at the position of the edge
/// it replaces. This must happen in place (not append the expansion at the
/// end) so the result is still a valid cyclic walk through the graph.
pub fn expand_nc(ldg: &Ldg, nc: &[EdgeId]) -> Vec<EdgeId> {
    let mut expanded = Vec::new();
    for &e in nc {
        match &ldg.edge(e).provenance {
            Provenance::Derived { parents } => {
                let (p1, p2) = *parents;
                expanded.extend(expand_nc(ldg, &[p1, p2]));
            }
            _ => expanded.push(e),
        }
    }
    expanded
}

/// Starting from `nc_star[idx]` (a lower-labeled edge), walks forward around
/// the cyclic order accumulating edge weights until the running total goes
/// negative, returning the prefix of edges covered. This is the "extension
/// path" that must also be unsatisfiable for the lower edge's contingent link
/// to be implicated in the conflict.
pub fn extension_path(nc_star: &[EdgeId], ldg: &Ldg, idx: usize) -> Vec<EdgeId> {
    let e = nc_star[idx];
    debug_assert_eq!(ldg.edge(e).label_type, LabelType::Lower);
    let mut running = ldg.edge(e).weight;
    let mut path = vec![e];
    let n = nc_star.len();
    for i in 0..n {
        let cur = nc_star[(i + idx + 1) % n];
        running = running.saturating_add(ldg.edge(cur).weight);
        path.push(cur);
        if running < 0 {
            return path;
        }
    }
    unreachable!("a semi-reducible negative cycle's extension path must go negative within one full traversal")
}

/// Expands a raw negative cycle into its full conflict: the expanded cycle
/// itself, plus one extension path for every lower-labeled edge it contains.
pub fn extract_conflict(ldg: &Ldg, nc: &[EdgeId]) -> Vec<Vec<EdgeId>> {
    let nc_star = expand_nc(ldg, nc);
    let mut components = vec![nc_star.clone()];
    for (idx, &e) in nc_star.iter().enumerate() {
        if ldg.edge(e).label_type == LabelType::Lower {
            components.push(extension_path(&nc_star, ldg, idx));
        }
    }
    components
}

/// Maps each graph-level conflict component back to the original constraints
/// (and which of their bounds) that produced its edges, dropping edges that
/// carry no such attribution (purely structural edges).
pub fn to_tn_conflict(tn: &TemporalNetwork, ldg: &Ldg, components: &[Vec<EdgeId>]) -> Vec<Vec<ConflictEdge>> {
    components
        .iter()
        .map(|component| {
            component
                .iter()
                .filter_map(|&eid| match &ldg.edge(eid).provenance {
                    Provenance::Original { constraint, tag } => Some(ConflictEdge {
                        constraint_name: tn.constraint_name(*constraint).to_string(),
                        tag: *tag,
                    }),
                    _ => None,
                })
                .collect()
        })
        .collect()
}
