//! The labeled distance graph (LDG): the working representation that the
//! elimination engine actually operates on. Grounded on `dc_checking/ldg.py`'s
//! `LabeledDistanceGraph` (`to_ldg`, `add_edge`/tightest-edge filtering, and the
//! edge-provenance bookkeeping `add_edge` performs via its `parent` chains).

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;

use dc_collections::{create_ref_type, RefMap, RefVec};

use crate::tn::{ConstraintId, ConstraintKind, EventId, TemporalNetwork};
use crate::W;

create_ref_type!(EdgeId);

/// Whether an edge carries an STNU label, and if so, which side of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelType {
    None,
    /// A lower-case edge `s --(lower,C):w--> e`, produced by a contingent link.
    Lower,
    /// An upper-case edge `e --(upper,C):w--> s`, produced by a contingent link.
    Upper,
}

/// Which bound of an original constraint an edge encodes, kept purely so a
/// surviving conflict edge can be reported back in terms of the constraint that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundTag {
    UbPlus,
    LbMinus,
    LbPlus,
    UbMinus,
    UbMinusLbPlus,
}

impl fmt::Display for BoundTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BoundTag::UbPlus => "UB+",
            BoundTag::LbMinus => "LB-",
            BoundTag::LbPlus => "LB+",
            BoundTag::UbMinus => "UB-",
            BoundTag::UbMinusLbPlus => "UB-/LB+",
        };
        f.write_str(s)
    }
}

/// Where an edge came from, kept so that a reported conflict can be traced back
/// to the original constraints that caused it without ever rewriting the
/// provenance of an edge once it has been inserted.
#[derive(Debug, Clone)]
pub enum Provenance {
    /// Directly derived from one bound of a user-supplied constraint.
    Original { constraint: ConstraintId, tag: BoundTag },
    /// Produced by network normalization, but not attributable to a single bound
    /// (the zero-weight lower edge from an auxiliary event to its contingent end).
    Structural,
    /// Produced by triangulating two edges during vertex elimination.
    Derived { parents: (EdgeId, EdgeId) },
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub source: EventId,
    pub target: EventId,
    pub weight: W,
    pub label_type: LabelType,
    pub label: Option<EventId>,
    pub provenance: Provenance,
}

fn edge_dominates(
    a_weight: W,
    a_lt: LabelType,
    a_label: Option<EventId>,
    b_weight: W,
    b_lt: LabelType,
    b_label: Option<EventId>,
) -> bool {
    a_weight <= b_weight && (matches!(a_lt, LabelType::None) || (a_lt as u8, a_label) == (b_lt as u8, b_label))
}

/// The labeled distance graph built from a [`TemporalNetwork`] and then mutated
/// in place by vertex elimination. Edges are append-only: once pushed into the
/// arena an edge is never rewritten, only (logically) removed from the live
/// adjacency so that provenance chains captured by surviving children always
/// remain valid to walk.
#[derive(Debug, Clone)]
pub struct Ldg {
    events: RefVec<EventId, String>,
    edges: RefVec<EdgeId, Edge>,
    out_adj: RefMap<EventId, HashMap<EventId, Vec<EdgeId>>>,
    in_adj: RefMap<EventId, HashMap<EventId, Vec<EdgeId>>>,
    alive: RefVec<EventId, bool>,
}

impl Ldg {
    fn empty(tn: &TemporalNetwork) -> Self {
        let mut events = RefVec::new();
        let mut out_adj = RefMap::default();
        let mut in_adj = RefMap::default();
        let mut alive = RefVec::new();
        for (id, name) in tn.events() {
            let pushed = events.push(name.to_string());
            assert_eq!(pushed, id, "event ids must line up between tn and ldg");
            out_adj.insert(id, HashMap::new());
            in_adj.insert(id, HashMap::new());
            alive.push(true);
        }
        Ldg {
            events,
            edges: RefVec::new(),
            out_adj,
            in_adj,
            alive,
        }
    }

    fn add_event(&mut self, name: String) -> EventId {
        let id = self.events.push(name);
        self.out_adj.insert(id, HashMap::new());
        self.in_adj.insert(id, HashMap::new());
        self.alive.push(true);
        id
    }

    pub fn event_name(&self, id: EventId) -> &str {
        &self.events[id]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub fn is_alive(&self, v: EventId) -> bool {
        self.alive[v]
    }

    pub fn alive_vertices(&self) -> impl Iterator<Item = EventId> + '_ {
        self.alive.entries().filter_map(|(id, &a)| a.then_some(id))
    }

    pub fn out_edges(&self, v: EventId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_adj
            .get(v)
            .into_iter()
            .flat_map(|m| m.values())
            .flatten()
            .copied()
    }

    pub fn in_edges(&self, v: EventId) -> impl Iterator<Item = EdgeId> + '_ {
        self.in_adj
            .get(v)
            .into_iter()
            .flat_map(|m| m.values())
            .flatten()
            .copied()
    }

    /// Appends a new edge unconditionally, with no dominance check. Used for the
    /// initial network-to-graph translation, where no parallel edges exist yet.
    fn push_edge(
        &mut self,
        source: EventId,
        target: EventId,
        weight: W,
        label_type: LabelType,
        label: Option<EventId>,
        provenance: Provenance,
    ) -> EdgeId {
        let id = self.edges.push(Edge {
            source,
            target,
            weight,
            label_type,
            label,
            provenance,
        });
        self.out_adj[source].entry(target).or_default().push(id);
        self.in_adj[target].entry(source).or_default().push(id);
        id
    }

    fn remove_parallel(&mut self, id: EdgeId) {
        let e = &self.edges[id];
        let (source, target) = (e.source, e.target);
        if let Some(v) = self.out_adj[source].get_mut(&target) {
            v.retain(|&x| x != id);
        }
        if let Some(v) = self.in_adj[target].get_mut(&source) {
            v.retain(|&x| x != id);
        }
    }

    /// Inserts a candidate edge, keeping only the tightest among parallel edges
    /// between the same pair of events with matching labels (the §4.4 dominance
    /// filter). An edge that is dominated by an existing one is discarded; an
    /// edge that dominates existing ones replaces them.
    pub fn insert_tightest(
        &mut self,
        source: EventId,
        target: EventId,
        weight: W,
        label_type: LabelType,
        label: Option<EventId>,
        provenance: Provenance,
    ) {
        let parallel: Vec<EdgeId> = self
            .out_adj
            .get(source)
            .and_then(|m| m.get(&target))
            .cloned()
            .unwrap_or_default();

        for &existing in &parallel {
            let e = &self.edges[existing];
            if edge_dominates(e.weight, e.label_type, e.label, weight, label_type, label) {
                return;
            }
        }

        let mut dominated = Vec::new();
        for &existing in &parallel {
            let e = &self.edges[existing];
            if edge_dominates(weight, label_type, label, e.weight, e.label_type, e.label) {
                dominated.push(existing);
            }
        }
        for id in dominated {
            self.remove_parallel(id);
        }
        self.push_edge(source, target, weight, label_type, label, provenance);

        if crate::DC_EXTENSIVE_CHECKS.get() {
            self.debug_check_no_mutually_dominating_parallel_edges(source, target);
        }
    }

    /// Re-checks, from scratch, that no two parallel edges between `source` and
    /// `target` dominate each other, which would mean `insert_tightest` let a
    /// strictly worse edge survive alongside a better one.
    fn debug_check_no_mutually_dominating_parallel_edges(&self, source: EventId, target: EventId) {
        let parallel: Vec<EdgeId> = self
            .out_adj
            .get(source)
            .and_then(|m| m.get(&target))
            .cloned()
            .unwrap_or_default();
        for (i, &a) in parallel.iter().enumerate() {
            for &b in &parallel[i + 1..] {
                let (ea, eb) = (&self.edges[a], &self.edges[b]);
                debug_assert!(
                    !edge_dominates(ea.weight, ea.label_type, ea.label, eb.weight, eb.label_type, eb.label),
                    "edge {:?} dominates surviving parallel edge {:?}",
                    a,
                    b
                );
            }
        }
    }

    /// Removes `v` from the live graph. Its edges remain in the arena (so any
    /// provenance chain referencing them is still walkable) but are no longer
    /// reachable from `out_edges`/`in_edges` on either endpoint.
    pub fn eliminate(&mut self, v: EventId) {
        self.alive[v] = false;
        let out_ids: Vec<EdgeId> = self.out_edges(v).collect();
        let in_ids: Vec<EdgeId> = self.in_edges(v).collect();
        for id in out_ids {
            let target = self.edges[id].target;
            if let Some(m) = self.in_adj[target].get_mut(&v) {
                m.retain(|&x| x != id);
            }
        }
        for id in in_ids {
            let source = self.edges[id].source;
            if let Some(m) = self.out_adj[source].get_mut(&v) {
                m.retain(|&x| x != id);
            }
        }
        self.out_adj[v].clear();
        self.in_adj[v].clear();
    }

    /// Builds the initial labeled distance graph from a temporal network,
    /// normalizing every constraint per the STC/SCTC construction rules.
    pub fn from_network(tn: &TemporalNetwork) -> Ldg {
        let mut ldg = Ldg::empty(tn);
        let mut used_names: HashSet<String> = tn.events().map(|(_, n)| n.to_string()).collect();

        for (cid, c) in tn.constraints() {
            match c.kind {
                ConstraintKind::Requirement => {
                    if let Some(ub) = c.ub {
                        ldg.insert_tightest(
                            c.s,
                            c.e,
                            ub,
                            LabelType::None,
                            None,
                            Provenance::Original { constraint: cid, tag: BoundTag::UbPlus },
                        );
                    }
                    if let Some(lb) = c.lb {
                        ldg.insert_tightest(
                            c.e,
                            c.s,
                            -lb,
                            LabelType::None,
                            None,
                            Provenance::Original { constraint: cid, tag: BoundTag::LbMinus },
                        );
                    }
                }
                ConstraintKind::Contingent => {
                    let lb = c.lb.expect("contingent constraint always has a lower bound");
                    let ub = c.ub.expect("contingent constraint always has an upper bound");
                    if lb == ub {
                        ldg.insert_tightest(
                            c.s,
                            c.e,
                            ub,
                            LabelType::None,
                            None,
                            Provenance::Original { constraint: cid, tag: BoundTag::UbPlus },
                        );
                        ldg.insert_tightest(
                            c.e,
                            c.s,
                            -lb,
                            LabelType::None,
                            None,
                            Provenance::Original { constraint: cid, tag: BoundTag::LbMinus },
                        );
                    } else if lb == 0 {
                        ldg.insert_tightest(
                            c.s,
                            c.e,
                            0,
                            LabelType::Lower,
                            Some(c.e),
                            Provenance::Original { constraint: cid, tag: BoundTag::LbPlus },
                        );
                        ldg.insert_tightest(
                            c.e,
                            c.s,
                            -ub,
                            LabelType::Upper,
                            Some(c.e),
                            Provenance::Original { constraint: cid, tag: BoundTag::UbMinus },
                        );
                    } else {
                        let aux_name = unique_aux_name(tn.event_name(c.e), &mut used_names);
                        let aux = ldg.add_event(aux_name);
                        ldg.insert_tightest(
                            c.s,
                            aux,
                            lb,
                            LabelType::None,
                            None,
                            Provenance::Original { constraint: cid, tag: BoundTag::LbPlus },
                        );
                        ldg.insert_tightest(
                            aux,
                            c.s,
                            -lb,
                            LabelType::None,
                            None,
                            Provenance::Original { constraint: cid, tag: BoundTag::LbMinus },
                        );
                        ldg.insert_tightest(aux, c.e, 0, LabelType::Lower, Some(c.e), Provenance::Structural);
                        ldg.insert_tightest(
                            c.e,
                            aux,
                            -(ub - lb),
                            LabelType::Upper,
                            Some(c.e),
                            Provenance::Original { constraint: cid, tag: BoundTag::UbMinusLbPlus },
                        );
                    }
                }
            }
        }
        ldg
    }
}

fn unique_aux_name(base: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = format!("{base}'");
    let mut n = 2u64;
    while used.contains(&candidate) {
        candidate = format!("{base}'{n}");
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}
