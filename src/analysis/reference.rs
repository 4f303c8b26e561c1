//! Types needed to analyze references

use crate::maths::u24;
use serde::{Deserialize, Serialize};

/// A control-flow reference from one instruction to another.
///
/// The source PC keys the reference set inside the `Analysis`; each
/// entry records the target plus the subroutine the referencing
/// instruction was reached through.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reference {
    pub target: u24,
    pub subroutine_pc: u24,
}

impl Reference {
    pub fn new(target: u24, subroutine_pc: u24) -> Self {
        Reference {
            target,
            subroutine_pc,
        }
    }
}
