//! Dynamic controllability checking for Simple Temporal Networks with
//! Uncertainty (STNUs), via bucket elimination over a labeled distance graph.
//!
//! A [`tn::TemporalNetwork`] of requirement and contingent constraints is
//! normalized into a [`ldg::Ldg`] and then reduced one vertex at a time. If
//! every vertex can be eliminated without producing a negative cycle, the
//! network is dynamically controllable; otherwise [`is_controllable`] reports
//! the original constraints responsible.

pub mod config;
pub mod conflict;
pub mod elimination;
pub mod error;
pub mod ldg;
pub mod triangulate;
pub mod tn;

pub use config::DcConfig;
pub use error::TnError;
pub use tn::TemporalNetwork;

/// The integer type temporal distances and bounds are expressed in.
pub type W = i64;

/// Gates expensive self-checks (e.g. re-validating the tightest-edge dominance
/// invariant after every insertion into the graph) that are useful when
/// debugging the elimination engine but too costly to run unconditionally.
pub static DC_EXTENSIVE_CHECKS: env_param::EnvParam<bool> = env_param::EnvParam::new("DC_EXTENSIVE_CHECKS", "false");

use conflict::ConflictEdge;
use elimination::EliminationOutcome;
use ldg::Ldg;

/// The result of a dynamic controllability check.
#[derive(Debug)]
pub struct DcOutcome {
    pub controllable: bool,
    /// Names of events in the order they were eliminated, up to the point
    /// where the check stopped.
    pub order: Vec<String>,
    /// Present exactly when `controllable` is `false`: one or more components,
    /// each a set of original constraints (tagged with the bound they
    /// contributed) that are jointly responsible for the inconsistency.
    pub conflict: Option<Vec<Vec<ConflictEdge>>>,
}

/// Checks whether `tn` is dynamically controllable.
#[tracing::instrument(level = "debug", skip(tn, config), fields(events = tn.num_events()))]
pub fn is_controllable(tn: &TemporalNetwork, config: &mut DcConfig) -> DcOutcome {
    let mut ldg = Ldg::from_network(tn);
    let mut step = 0usize;

    let outcome = if let Some(hook) = config.visualize.as_mut() {
        elimination::run(&mut ldg, |g, v| {
            let snapshot = config::LdgSnapshot::capture(g, step, v);
            (*hook)(&snapshot);
            step += 1;
        })
    } else {
        elimination::run(&mut ldg, |_, _| {})
    };

    match outcome {
        EliminationOutcome::Controllable(order) => {
            tracing::debug!(eliminated = order.len(), "network is dynamically controllable");
            DcOutcome {
                controllable: true,
                order: order.into_iter().map(|v| ldg.event_name(v).to_string()).collect(),
                conflict: None,
            }
        }
        EliminationOutcome::Uncontrollable(nc, partial_order) => {
            tracing::debug!(
                cycle_len = nc.len(),
                eliminated_before_cycle = partial_order.len(),
                "network is not dynamically controllable"
            );
            let components = if config.full_conflict {
                conflict::extract_conflict(&ldg, &nc)
            } else {
                vec![nc]
            };
            let tn_conflict = conflict::to_tn_conflict(tn, &ldg, &components);
            DcOutcome {
                controllable: false,
                order: partial_order.into_iter().map(|v| ldg.event_name(v).to_string()).collect(),
                conflict: Some(tn_conflict),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_stn_is_controllable() {
        let mut tn = TemporalNetwork::new();
        tn.add_constraint("a", "b", Some(1), Some(5), Some("c1")).unwrap();
        let mut config = DcConfig::default();
        let outcome = is_controllable(&tn, &mut config);
        assert!(outcome.controllable);
        assert!(outcome.conflict.is_none());
    }

    #[test]
    fn contradictory_stn_is_uncontrollable_with_conflict() {
        let mut tn = TemporalNetwork::new();
        tn.add_constraint("a", "b", None, Some(1), Some("c1")).unwrap();
        tn.add_constraint("b", "a", None, Some(-2), Some("c2")).unwrap();
        let mut config = DcConfig::default();
        let outcome = is_controllable(&tn, &mut config);
        assert!(!outcome.controllable);
        let conflict = outcome.conflict.unwrap();
        let names: Vec<&str> = conflict[0].iter().map(|e| e.constraint_name.as_str()).collect();
        assert!(names.contains(&"c1") && names.contains(&"c2"));
    }
}
