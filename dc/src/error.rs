use crate::W;

/// Errors rejected synchronously at the temporal-network level, before any
/// analysis is attempted. Uncontrollability is never reported through this type:
/// it is a normal (negative) outcome of [`crate::is_controllable`], not an error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TnError {
    #[error("constraint name '{0}' is already used in this network")]
    DuplicateConstraintName(String),

    #[error("contingent constraint '{0}' must have both a lower and an upper bound")]
    MissingBound(String),

    #[error("invalid bounds for constraint '{name}': lb={lb:?}, ub={ub:?}")]
    InvalidBounds {
        name: String,
        lb: Option<W>,
        ub: Option<W>,
    },

    #[error("constraint '{0}' has the same start and end event")]
    SelfLoop(String),

    #[error("event '{0}' is not registered in this network")]
    UnknownEvent(String),

    #[error("constraint '{0}' is not registered in this network")]
    UnknownConstraint(String),

    #[error("event '{0}' cannot be removed: {1} constraint(s) still reference it")]
    EventStillInUse(String, usize),

    #[error(
        "event '{end}' is already the end of contingent constraint '{existing}'; \
         an uncontrollable event may be the end of at most one contingent constraint"
    )]
    DuplicateContingentEnd { end: String, existing: String },
}
