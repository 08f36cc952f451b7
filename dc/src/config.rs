//! Tunable knobs for a DC check: whether to pay for full conflict extraction,
//! and an optional hook fed a snapshot of the graph before each elimination
//! step. Deliberately has no dependency on any rendering crate; a caller that
//! wants a picture renders `LdgSnapshot` itself (the CLI does, for instance).

use crate::ldg::{LabelType, Ldg};
use crate::tn::EventId;
use crate::W;

/// Options controlling how [`crate::is_controllable`] runs.
pub struct DcConfig {
    /// When `true` (the default), an uncontrollable network reports every
    /// original constraint implicated by the full hybrid conflict. When
    /// `false`, only the raw negative cycle that was first discovered is
    /// reported, which is cheaper but may omit constraints that also
    /// contribute to the inconsistency.
    pub full_conflict: bool,
    /// Called with a snapshot of the graph immediately before each vertex is
    /// eliminated, e.g. to drive a step-by-step visualization.
    pub visualize: Option<Box<dyn FnMut(&LdgSnapshot)>>,
}

impl Default for DcConfig {
    fn default() -> Self {
        DcConfig {
            full_conflict: true,
            visualize: None,
        }
    }
}

impl std::fmt::Debug for DcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DcConfig")
            .field("full_conflict", &self.full_conflict)
            .field("visualize", &self.visualize.is_some())
            .finish()
    }
}

/// A snapshot of an edge for rendering purposes: names instead of arena ids, so
/// it can outlive the graph it was taken from.
#[derive(Debug, Clone)]
pub struct EdgeSnapshot {
    pub source: String,
    pub target: String,
    pub weight: W,
    pub label_type: LabelType,
    pub label: Option<String>,
}

/// A snapshot of the labeled distance graph at one point during elimination.
#[derive(Debug, Clone)]
pub struct LdgSnapshot {
    pub step: usize,
    pub eliminated: Option<String>,
    pub vertices: Vec<String>,
    pub edges: Vec<EdgeSnapshot>,
}

impl LdgSnapshot {
    pub(crate) fn capture(ldg: &Ldg, step: usize, eliminated: EventId) -> LdgSnapshot {
        let vertices: Vec<String> = ldg.alive_vertices().map(|v| ldg.event_name(v).to_string()).collect();
        let mut edges = Vec::new();
        for v in ldg.alive_vertices() {
            for eid in ldg.out_edges(v) {
                let e = ldg.edge(eid);
                edges.push(EdgeSnapshot {
                    source: ldg.event_name(e.source).to_string(),
                    target: ldg.event_name(e.target).to_string(),
                    weight: e.weight,
                    label_type: e.label_type,
                    label: e.label.map(|l| ldg.event_name(l).to_string()),
                });
            }
        }
        LdgSnapshot {
            step,
            eliminated: Some(ldg.event_name(eliminated).to_string()),
            vertices,
            edges,
        }
    }
}
