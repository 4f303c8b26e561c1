//! Processor status register and state-change deltas

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

bitflags! {
    /// 65C816 status register (P).
    ///
    /// Only M and X matter to the analysis: they select the width of
    /// immediate operands for the accumulator and the index registers.
    #[derive(Serialize, Deserialize)]
    pub struct State: u8 {
        const C = 0x01;
        const Z = 0x02;
        const I = 0x04;
        const D = 0x08;
        const X = 0x10;
        const M = 0x20;
        const V = 0x40;
        const N = 0x80;
    }
}

impl State {
    /// Build a state from a raw P register value.
    pub fn from_p(p: u8) -> State {
        State::from_bits_truncate(p)
    }

    /// The raw P register value.
    pub fn p(self) -> u8 {
        self.bits()
    }

    /// The accumulator size flag.
    pub fn m(self) -> bool {
        self.contains(State::M)
    }

    /// The index size flag.
    pub fn x(self) -> bool {
        self.contains(State::X)
    }

    /// Size of A in bytes.
    pub fn size_a(self) -> u32 {
        if self.m() {
            1
        } else {
            2
        }
    }

    /// Size of X/Y in bytes.
    pub fn size_x(self) -> u32 {
        if self.x() {
            1
        } else {
            2
        }
    }

    /// Set the P bits selected by `mask` (SEP).
    pub fn set_mask(&mut self, mask: u8) {
        self.insert(State::from_bits_truncate(mask));
    }

    /// Reset the P bits selected by `mask` (REP).
    pub fn reset_mask(&mut self, mask: u8) {
        self.remove(State::from_bits_truncate(mask));
    }
}

impl Default for State {
    /// State out of reset: 8-bit accumulator and index registers.
    fn default() -> State {
        State::M | State::X
    }
}

/// Why a subroutine's effect on the state could not be established.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum UnknownReason {
    Known,
    Unknown,
    SuspectInstruction,
    MultipleReturnStates,
    IndirectJump,
    StackManipulation,
    Recursion,
    MutableCode,
}

impl Default for UnknownReason {
    fn default() -> UnknownReason {
        UnknownReason::Known
    }
}

impl Display for UnknownReason {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        use UnknownReason::*;

        match self {
            Known => write!(f, "Known"),
            Unknown => write!(f, "Unknown"),
            SuspectInstruction => write!(f, "Suspect instruction"),
            MultipleReturnStates => write!(f, "Multiple return states"),
            IndirectJump => write!(f, "Indirect jump"),
            StackManipulation => write!(f, "Stack manipulation"),
            Recursion => write!(f, "Recursion"),
            MutableCode => write!(f, "Mutable code"),
        }
    }
}

/// Observed change to the M and X flags across a stretch of execution.
///
/// An empty change means the flags provably return to their entry
/// values; an unknown change carries the reason the effect could not be
/// predicted.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub m: Option<bool>,
    pub x: Option<bool>,
    pub unknown_reason: UnknownReason,
}

impl StateChange {
    /// A change with explicit M/X effects.
    pub fn new(m: Option<bool>, x: Option<bool>) -> StateChange {
        StateChange {
            m,
            x,
            unknown_reason: UnknownReason::Known,
        }
    }

    /// An unpredictable change tagged with its reason.
    pub fn new_unknown(reason: UnknownReason) -> StateChange {
        StateChange {
            m: None,
            x: None,
            unknown_reason: reason,
        }
    }

    /// Record the flags set to 1 by a SEP with the given mask.
    pub fn set_mask(&mut self, mask: u8) {
        let change = State::from_bits_truncate(mask);
        if change.m() {
            self.m = Some(true);
        }
        if change.x() {
            self.x = Some(true);
        }
    }

    /// Record the flags reset to 0 by a REP with the given mask.
    pub fn reset_mask(&mut self, mask: u8) {
        let change = State::from_bits_truncate(mask);
        if change.m() {
            self.m = Some(false);
        }
        if change.x() {
            self.x = Some(false);
        }
    }

    /// Whether the change is known and affects neither flag.
    pub fn is_empty(self) -> bool {
        !self.is_unknown() && self.m.is_none() && self.x.is_none()
    }

    /// Whether the change is unpredictable.
    pub fn is_unknown(self) -> bool {
        self.unknown_reason != UnknownReason::Known
    }

    /// Null out flags that an inference proves were already at this
    /// value on entry, so a SEP/REP round trip reads as no change.
    pub fn apply_inference(&mut self, inference: StateChange) {
        if self.m.is_some() && self.m == inference.m {
            self.m = None;
        }
        if self.x.is_some() && self.x == inference.x {
            self.x = None;
        }
    }

    /// The change as observed by a caller in the given state: flags
    /// that match the caller's current values are elided.
    pub fn simplify(self, state: State) -> StateChange {
        let mut simplified = self;
        if simplified.m == Some(state.m()) {
            simplified.m = None;
        }
        if simplified.x == Some(state.x()) {
            simplified.x = None;
        }
        simplified
    }
}

impl Display for StateChange {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.is_unknown() {
            return write!(f, "unknown ({})", self.unknown_reason);
        }
        if self.is_empty() {
            return write!(f, "none");
        }

        let mut parts = Vec::new();
        if let Some(m) = self.m {
            parts.push(format!("m={}", m as u8));
        }
        if let Some(x) = self.x {
            parts.push(format!("x={}", x as u8));
        }
        write!(f, "{}", parts.join(","))
    }
}
