//! User assertions that override unknown state changes

use crate::arch::StateChange;
use serde::{Deserialize, Serialize};

/// Scope of a state-change assertion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssertionType {
    /// The asserted change replaces the effect of one instruction; the
    /// executor keeps going past it.
    Instruction,
    /// The asserted change stands in for the containing subroutine's
    /// return-state summary.
    Subroutine,
}

/// A state-change assertion supplied by the user.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    pub scope: AssertionType,
    pub state_change: StateChange,
}

impl Assertion {
    pub fn new(scope: AssertionType, state_change: StateChange) -> Self {
        Assertion {
            scope,
            state_change,
        }
    }
}
