//! The user-facing temporal network: events plus requirement and contingent
//! constraints, grounded on `dc_checking/temporal_network.py`'s `TemporalNetwork`
//! but with a typed, arena-indexed representation instead of name-keyed dicts.

use std::collections::HashMap;

use dc_collections::{create_ref_type, RefMap, RefVec};

use crate::error::TnError;
use crate::W;

create_ref_type!(EventId);
create_ref_type!(ConstraintId);

/// Which of the two constraint kinds a [`Constraint`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// A Simple Temporal Constraint: the executor controls when `e` fires.
    Requirement,
    /// A Simple Contingent Temporal Constraint: nature controls when `e` fires,
    /// within `[lb, ub]` of `s`'s occurrence.
    Contingent,
}

/// A single temporal constraint `lb <= t(e) - t(s) <= ub`, with either bound
/// absent for a requirement constraint. Contingent constraints always carry both.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: String,
    pub s: EventId,
    pub e: EventId,
    pub lb: Option<W>,
    pub ub: Option<W>,
    pub kind: ConstraintKind,
}

impl Constraint {
    pub fn is_contingent(&self) -> bool {
        self.kind == ConstraintKind::Contingent
    }
}

/// A temporal network: a set of events connected by requirement and contingent
/// constraints. Every uncontrollable event (the end of a contingent constraint)
/// is the end of exactly one such constraint.
#[derive(Debug, Clone, Default)]
pub struct TemporalNetwork {
    event_names: RefVec<EventId, String>,
    event_ids: HashMap<String, EventId>,
    constraints: RefVec<ConstraintId, Option<Constraint>>,
    constraint_ids: HashMap<String, ConstraintId>,
    /// Constraints touching each event, kept so `remove_event` can refuse to
    /// orphan a still-referenced event (mirrors the Python original's refusal to
    /// silently drop constraints unless explicitly asked to).
    event_constraints: RefMap<EventId, Vec<ConstraintId>>,
    /// The single contingent constraint ending at each uncontrollable event.
    contingent_end: RefMap<EventId, ConstraintId>,
    anon_constraint_counter: u64,
}

impl TemporalNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` as an event if it is not already known, returning its id.
    pub fn add_event(&mut self, name: impl Into<String>) -> EventId {
        let name = name.into();
        if let Some(&id) = self.event_ids.get(&name) {
            return id;
        }
        let id = self.event_names.push(name.clone());
        self.event_ids.insert(name, id);
        self.event_constraints.insert(id, Vec::new());
        id
    }

    pub fn event_name(&self, id: EventId) -> &str {
        &self.event_names[id]
    }

    pub fn event_id(&self, name: &str) -> Option<EventId> {
        self.event_ids.get(name).copied()
    }

    pub fn events(&self) -> impl Iterator<Item = (EventId, &str)> {
        self.event_names.entries().map(|(id, n)| (id, n.as_str()))
    }

    pub fn num_events(&self) -> usize {
        self.event_names.len()
    }

    fn fresh_constraint_name(&mut self) -> String {
        loop {
            self.anon_constraint_counter += 1;
            let candidate = format!("c{}", self.anon_constraint_counter);
            if !self.constraint_ids.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn insert_constraint(
        &mut self,
        s: &str,
        e: &str,
        lb: Option<W>,
        ub: Option<W>,
        name: Option<String>,
        kind: ConstraintKind,
    ) -> Result<ConstraintId, TnError> {
        let name = match name {
            Some(n) => n,
            None => self.fresh_constraint_name(),
        };
        if self.constraint_ids.contains_key(&name) {
            return Err(TnError::DuplicateConstraintName(name));
        }
        if s == e {
            return Err(TnError::SelfLoop(name));
        }
        match kind {
            ConstraintKind::Contingent => {
                if lb.is_none() || ub.is_none() {
                    return Err(TnError::MissingBound(name));
                }
                let (lbv, ubv) = (lb.unwrap(), ub.unwrap());
                if lbv < 0 || lbv > ubv {
                    return Err(TnError::InvalidBounds { name, lb, ub });
                }
            }
            ConstraintKind::Requirement => {
                if let (Some(lbv), Some(ubv)) = (lb, ub) {
                    if lbv > ubv {
                        return Err(TnError::InvalidBounds { name, lb, ub });
                    }
                }
            }
        }

        if kind == ConstraintKind::Contingent {
            if let Some(existing_e_id) = self.event_id(e) {
                if let Some(existing) = self.contingent_end.get(existing_e_id) {
                    return Err(TnError::DuplicateContingentEnd {
                        end: e.to_string(),
                        existing: self.constraint_name(*existing).to_string(),
                    });
                }
            }
        }

        let s_id = self.add_event(s);
        let e_id = self.add_event(e);

        let id = self.constraints.push(Some(Constraint {
            name: name.clone(),
            s: s_id,
            e: e_id,
            lb,
            ub,
            kind,
        }));
        self.constraint_ids.insert(name, id);
        self.event_constraints[s_id].push(id);
        self.event_constraints[e_id].push(id);
        if kind == ConstraintKind::Contingent {
            self.contingent_end.insert(e_id, id);
        }
        Ok(id)
    }

    /// Adds a requirement constraint `lb <= t(e) - t(s) <= ub`. Either bound may
    /// be `None`.
    pub fn add_constraint(
        &mut self,
        s: &str,
        e: &str,
        lb: Option<W>,
        ub: Option<W>,
        name: Option<&str>,
    ) -> Result<ConstraintId, TnError> {
        self.insert_constraint(s, e, lb, ub, name.map(str::to_string), ConstraintKind::Requirement)
    }

    /// Adds a contingent constraint `lb <= t(e) - t(s) <= ub`, `0 <= lb <= ub`.
    /// `e` becomes uncontrollable and must not already be the end of another
    /// contingent constraint.
    pub fn add_contingent_constraint(
        &mut self,
        s: &str,
        e: &str,
        lb: W,
        ub: W,
        name: Option<&str>,
    ) -> Result<ConstraintId, TnError> {
        self.insert_constraint(
            s,
            e,
            Some(lb),
            Some(ub),
            name.map(str::to_string),
            ConstraintKind::Contingent,
        )
    }

    pub fn constraint(&self, id: ConstraintId) -> &Constraint {
        self.constraints[id]
            .as_ref()
            .expect("constraint id still valid after removal")
    }

    pub fn constraint_name(&self, id: ConstraintId) -> &str {
        &self.constraint(id).name
    }

    pub fn constraint_id(&self, name: &str) -> Option<ConstraintId> {
        self.constraint_ids.get(name).copied()
    }

    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &Constraint)> {
        self.constraints
            .entries()
            .filter_map(|(id, c)| c.as_ref().map(|c| (id, c)))
    }

    pub fn is_uncontrollable_event(&self, id: EventId) -> bool {
        self.contingent_end.contains(id)
    }

    /// Removes a constraint, and deregisters its events from it. Does not remove
    /// the events themselves even if they become unreferenced; call
    /// [`Self::remove_event`] explicitly for that.
    pub fn remove_constraint(&mut self, name: &str) -> Result<(), TnError> {
        let id = self
            .constraint_ids
            .remove(name)
            .ok_or_else(|| TnError::UnknownConstraint(name.to_string()))?;
        let c = self.constraints[id].take().expect("constraint present");
        self.event_constraints[c.s].retain(|&x| x != id);
        self.event_constraints[c.e].retain(|&x| x != id);
        if c.kind == ConstraintKind::Contingent {
            self.contingent_end.remove(c.e);
        }
        Ok(())
    }

    /// Removes an isolated event. Fails if any constraint still references it;
    /// remove those constraints first.
    pub fn remove_event(&mut self, name: &str) -> Result<(), TnError> {
        let id = self
            .event_ids
            .get(name)
            .copied()
            .ok_or_else(|| TnError::UnknownEvent(name.to_string()))?;
        let refs = self.event_constraints.get(id).map(Vec::len).unwrap_or(0);
        if refs > 0 {
            return Err(TnError::EventStillInUse(name.to_string(), refs));
        }
        self.event_ids.remove(name);
        self.event_constraints.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup_event() {
        let mut tn = TemporalNetwork::new();
        let e1 = tn.add_event("e1");
        let e1_again = tn.add_event("e1");
        assert_eq!(e1, e1_again);
        assert_eq!(tn.event_name(e1), "e1");
        assert_eq!(tn.num_events(), 1);
    }

    #[test]
    fn duplicate_constraint_name_rejected() {
        let mut tn = TemporalNetwork::new();
        tn.add_constraint("a", "b", Some(1), Some(2), Some("c1")).unwrap();
        let err = tn.add_constraint("b", "a", Some(1), Some(2), Some("c1")).unwrap_err();
        assert!(matches!(err, TnError::DuplicateConstraintName(n) if n == "c1"));
    }

    #[test]
    fn contingent_requires_both_bounds_and_nonnegative_lb() {
        let mut tn = TemporalNetwork::new();
        assert!(matches!(
            tn.add_contingent_constraint("a", "b", -1, 2, None).unwrap_err(),
            TnError::InvalidBounds { .. }
        ));
    }

    #[test]
    fn at_most_one_contingent_per_end_event() {
        let mut tn = TemporalNetwork::new();
        tn.add_contingent_constraint("a", "b", 1, 2, Some("c1")).unwrap();
        let err = tn.add_contingent_constraint("x", "b", 1, 2, Some("c2")).unwrap_err();
        assert!(matches!(err, TnError::DuplicateContingentEnd { .. }));
    }

    #[test]
    fn rejected_duplicate_contingent_end_does_not_leak_a_new_event() {
        let mut tn = TemporalNetwork::new();
        tn.add_contingent_constraint("a", "b", 1, 2, Some("c1")).unwrap();
        assert_eq!(tn.num_events(), 2);
        let err = tn.add_contingent_constraint("x", "b", 1, 2, Some("c2")).unwrap_err();
        assert!(matches!(err, TnError::DuplicateContingentEnd { .. }));
        // "x" must not have been registered as a side effect of the rejected call.
        assert_eq!(tn.num_events(), 2);
        assert!(tn.event_id("x").is_none());
    }

    #[test]
    fn remove_event_refuses_while_referenced() {
        let mut tn = TemporalNetwork::new();
        tn.add_constraint("a", "b", Some(1), Some(2), Some("c1")).unwrap();
        assert!(matches!(tn.remove_event("a"), Err(TnError::EventStillInUse(_, 1))));
        tn.remove_constraint("c1").unwrap();
        assert!(tn.remove_event("a").is_ok());
    }

    #[test]
    fn self_loop_rejected() {
        let mut tn = TemporalNetwork::new();
        let err = tn.add_constraint("a", "a", Some(0), Some(1), None).unwrap_err();
        assert!(matches!(err, TnError::SelfLoop(_)));
    }

    #[test]
    fn anonymous_constraint_names_are_generated() {
        let mut tn = TemporalNetwork::new();
        let id1 = tn.add_constraint("a", "b", None, Some(5), None).unwrap();
        let id2 = tn.add_constraint("b", "c", None, Some(5), None).unwrap();
        assert_ne!(tn.constraint_name(id1), tn.constraint_name(id2));
    }
}
