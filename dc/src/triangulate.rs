//! Pairwise triangulation of in/out edges at a vertex being eliminated, and the
//! semi-reducible negative cycle check on the self-loops that triangulation can
//! produce. Grounded on `dc_checking/ldg.py`'s `triangulate` and the cycle check
//! inlined in `dc_be.py`'s `eliminate_vertex`.

use crate::ldg::{Edge, LabelType};
use crate::tn::EventId;
use crate::W;

/// `true` if the self-loop obtained by composing `in_edge` then `out_edge`
/// (both touching the vertex being eliminated) is harmless: either its total
/// weight is non-negative, or it is a lower/upper pair for the same contingent
/// link, which cancels regardless of weight (a semi-reducible negative cycle).
pub fn is_consistent_loop(in_edge: &Edge, out_edge: &Edge) -> bool {
    if in_edge.weight.saturating_add(out_edge.weight) >= 0 {
        return true;
    }
    in_edge.label_type == LabelType::Lower
        && out_edge.label_type == LabelType::Upper
        && in_edge.label == out_edge.label
}

/// Composes `in_edge` (into the eliminated vertex) with `out_edge` (out of it)
/// into a single edge between their other endpoints, per the label-combination
/// table. Returns `None` when no edge should be produced (a lower edge meeting
/// an upper edge of a different contingent link, which the construction never
/// allows two edges at once to both carry).
pub fn triangulate(in_edge: &Edge, out_edge: &Edge) -> Option<(LabelType, Option<EventId>, W)> {
    let w = in_edge.weight.saturating_add(out_edge.weight);

    let (label_type, label) = match (in_edge.label_type, out_edge.label_type) {
        (LabelType::Lower, LabelType::Upper) => {
            if in_edge.label == out_edge.label {
                return None;
            }
            if w >= 0 {
                (LabelType::Lower, in_edge.label)
            } else {
                (LabelType::Upper, out_edge.label)
            }
        }
        (LabelType::Lower, LabelType::Lower) => (LabelType::Lower, in_edge.label),
        (LabelType::Lower, LabelType::None) => (LabelType::Lower, in_edge.label),
        (LabelType::None, LabelType::Upper) => (LabelType::Upper, out_edge.label),
        (LabelType::None, LabelType::Lower) => (LabelType::None, None),
        (LabelType::None, LabelType::None) => (LabelType::None, None),
        (LabelType::Upper, _) => {
            unreachable!(
                "a ready vertex (no negative in-edges) cannot have a live upper-labeled in-edge: \
                 upper edges are always constructed with strictly negative weight"
            )
        }
    };

    // Once the composed weight settles the label's sign, the label is no longer
    // informative and can be stripped, matching the normalization the Python
    // original applies after every triangulation step.
    let label_type = match label_type {
        LabelType::Lower if w < 0 => LabelType::None,
        LabelType::Upper if w >= 0 => LabelType::None,
        other => other,
    };
    let label = if label_type == LabelType::None { None } else { label };

    Some((label_type, label, w))
}
