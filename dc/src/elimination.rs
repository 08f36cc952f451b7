//! The bucket-elimination engine itself: repeatedly find a vertex with no live
//! negative in-edge ("ready"), eliminate it by triangulating its in/out edges,
//! and stop the moment a ready vertex cannot be found (a negative cycle) or an
//! elimination step discovers an inconsistent self-loop. Grounded on
//! `dc_checking/dc_be.py`'s `check_dc_bucket_elimination`, `track_ready_node`
//! and `eliminate`.

use crate::ldg::{EdgeId, Ldg, Provenance};
use crate::tn::EventId;
use crate::triangulate;

/// The result of searching for the next vertex to eliminate.
enum ReadyResult {
    /// `v` has no live negative in-edge and can be eliminated next.
    Ready(EventId),
    /// Following negative in-edges looped back on an already-visited vertex;
    /// the edges walked from that point on form a (semi-reducible) negative
    /// cycle witnessing uncontrollability.
    Cycle(Vec<EdgeId>),
}

/// Outcome of running elimination to completion (or to the first failure).
pub enum EliminationOutcome {
    /// All vertices were eliminated in this order.
    Controllable(Vec<EventId>),
    /// The edges of a negative cycle (not yet expanded into original edges),
    /// plus the vertices that were successfully eliminated before it was found
    /// (the Python original returns this partial order alongside the conflict).
    Uncontrollable(Vec<EdgeId>, Vec<EventId>),
}

/// Walks negative in-edges from `start`, iteratively rather than recursively so
/// that a pathological chain of vertices cannot blow the stack.
fn find_ready_or_cycle(ldg: &Ldg, start: EventId) -> ReadyResult {
    let mut history: Vec<EventId> = Vec::new();
    let mut history_edges: Vec<EdgeId> = Vec::new();
    let mut v = start;
    loop {
        if let Some(idx) = history.iter().position(|&x| x == v) {
            return ReadyResult::Cycle(history_edges[idx..].to_vec());
        }
        match ldg.in_edges(v).find(|&id| ldg.edge(id).weight < 0) {
            Some(eid) => {
                let source = ldg.edge(eid).source;
                history.push(v);
                history_edges.push(eid);
                v = source;
            }
            None => return ReadyResult::Ready(v),
        }
    }
}

/// Eliminates `v` from the graph: checks every self-loop formed by its in/out
/// edges for a semi-reducible negative cycle, triangulates every other pair of
/// in/out edges into a child edge, then detaches `v`.
///
/// On success `v` is no longer alive in `ldg`. On failure, returns the
/// offending `(in_edge, out_edge)` pair as the witnessing negative cycle.
pub fn eliminate_vertex(ldg: &mut Ldg, v: EventId) -> Result<(), Vec<EdgeId>> {
    let out_ids: Vec<EdgeId> = ldg.out_edges(v).collect();
    let in_ids: Vec<EdgeId> = ldg.in_edges(v).collect();

    for &e_out in &out_ids {
        let out_edge = ldg.edge(e_out).clone();
        for &e_in in &in_ids {
            let in_edge = ldg.edge(e_in).clone();
            if in_edge.source == out_edge.target && !triangulate::is_consistent_loop(&in_edge, &out_edge) {
                return Err(vec![e_in, e_out]);
            }
        }
    }

    for &e_out in &out_ids {
        let out_edge = ldg.edge(e_out).clone();
        for &e_in in &in_ids {
            let in_edge = ldg.edge(e_in).clone();
            if in_edge.source == out_edge.target {
                continue;
            }
            if let Some((label_type, label, weight)) = triangulate::triangulate(&in_edge, &out_edge) {
                ldg.insert_tightest(
                    in_edge.source,
                    out_edge.target,
                    weight,
                    label_type,
                    label,
                    Provenance::Derived { parents: (e_in, e_out) },
                );
            }
        }
    }

    ldg.eliminate(v);
    Ok(())
}

/// Runs bucket elimination to completion, eliminating one ready vertex at a
/// time until none remain (controllable) or a negative cycle is found
/// (uncontrollable), invoking `on_step` with a reference to the graph and the
/// vertex about to be eliminated before each elimination.
pub fn run(ldg: &mut Ldg, mut on_step: impl FnMut(&Ldg, EventId)) -> EliminationOutcome {
    let mut order = Vec::new();
    loop {
        let start = match ldg.alive_vertices().next() {
            Some(v) => v,
            None => return EliminationOutcome::Controllable(order),
        };
        match find_ready_or_cycle(ldg, start) {
            ReadyResult::Cycle(edges) => {
                tracing::trace!(cycle_len = edges.len(), "found a negative cycle while searching for a ready vertex");
                return EliminationOutcome::Uncontrollable(edges, order);
            }
            ReadyResult::Ready(v) => {
                on_step(ldg, v);
                tracing::trace!(step = order.len(), vertex = ?v, "eliminating vertex");
                match eliminate_vertex(ldg, v) {
                    Ok(()) => order.push(v),
                    Err(edges) => return EliminationOutcome::Uncontrollable(edges, order),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tn::TemporalNetwork;

    #[test]
    fn acyclic_requirement_network_is_fully_eliminated() {
        let mut tn = TemporalNetwork::new();
        tn.add_constraint("a", "b", Some(1), Some(5), Some("c1")).unwrap();
        tn.add_constraint("b", "c", Some(1), Some(5), Some("c2")).unwrap();
        let mut ldg = Ldg::from_network(&tn);
        let outcome = run(&mut ldg, |_, _| {});
        match outcome {
            EliminationOutcome::Controllable(order) => assert_eq!(order.len(), 3),
            EliminationOutcome::Uncontrollable(..) => panic!("expected controllable"),
        }
    }

    #[test]
    fn direct_negative_cycle_is_uncontrollable() {
        let mut tn = TemporalNetwork::new();
        tn.add_constraint("a", "b", None, Some(1), Some("c1")).unwrap();
        tn.add_constraint("b", "a", None, Some(-2), Some("c2")).unwrap();
        let mut ldg = Ldg::from_network(&tn);
        let outcome = run(&mut ldg, |_, _| {});
        assert!(matches!(outcome, EliminationOutcome::Uncontrollable(_, _)));
    }
}
