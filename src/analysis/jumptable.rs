//! Jump table records populated from user assertions

use crate::maths::u24;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How much of a jump table is believed to be covered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpTableStatus {
    /// Registered when an indirect transfer was found, but no range has
    /// been asserted yet.
    Unknown,
    /// A user-asserted range that may not cover the whole table.
    Partial,
    /// A user-asserted range declared to cover the whole table.
    Complete,
}

/// A table of word targets indexed by the byte offset into the table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JumpTable {
    pub status: JumpTableStatus,
    pub targets: BTreeMap<u16, u24>,
}

impl Default for JumpTable {
    fn default() -> JumpTable {
        JumpTable {
            status: JumpTableStatus::Unknown,
            targets: BTreeMap::new(),
        }
    }
}
