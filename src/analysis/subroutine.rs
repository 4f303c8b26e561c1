//! Subroutine records and their state-change summaries

use crate::arch::{Instruction, State, StateChange};
use crate::maths::u24;
use std::collections::{BTreeMap, HashSet};

/// A subroutine discovered (or declared) during analysis.
///
/// Aggregates the instructions reachable from its entry PC together
/// with the state changes observed at each terminating instruction,
/// split into changes we can rely on and changes we cannot predict.
#[derive(Clone, Debug)]
pub struct Subroutine {
    pc: u24,
    label: String,
    is_entry_point: bool,
    instructions: BTreeMap<u24, Instruction>,
    known_state_changes: BTreeMap<u24, StateChange>,
    unknown_state_changes: BTreeMap<u24, StateChange>,
}

impl Subroutine {
    pub fn new(pc: u24, label: String, is_entry_point: bool) -> Self {
        Subroutine {
            pc,
            label,
            is_entry_point,
            instructions: BTreeMap::new(),
            known_state_changes: BTreeMap::new(),
            unknown_state_changes: BTreeMap::new(),
        }
    }

    pub fn pc(&self) -> u24 {
        self.pc
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: String) {
        self.label = label;
    }

    pub fn is_entry_point(&self) -> bool {
        self.is_entry_point
    }

    /// Member instructions in ascending PC order.
    pub fn instructions(&self) -> &BTreeMap<u24, Instruction> {
        &self.instructions
    }

    pub fn add_instruction(&mut self, instruction: Instruction) {
        self.instructions.insert(instruction.pc(), instruction);
    }

    /// Record a state change observed at a terminating instruction.
    pub fn add_state_change(&mut self, pc: u24, state_change: StateChange) {
        if state_change.is_unknown() {
            self.unknown_state_changes.insert(pc, state_change);
        } else {
            self.known_state_changes.insert(pc, state_change);
        }
    }

    pub fn known_state_changes(&self) -> &BTreeMap<u24, StateChange> {
        &self.known_state_changes
    }

    pub fn unknown_state_changes(&self) -> &BTreeMap<u24, StateChange> {
        &self.unknown_state_changes
    }

    pub fn has_unknown_state_change(&self) -> bool {
        !self.unknown_state_changes.is_empty()
    }

    /// The known state changes as a caller in `state` would observe
    /// them: flags already matching the caller's values are elided.
    pub fn simplified_state_changes(&self, state: State) -> HashSet<StateChange> {
        self.known_state_changes
            .values()
            .map(|change| change.simplify(state))
            .collect()
    }

    /// Whether execution out of the entry point saves the caller's
    /// state before anything can disturb it.
    pub fn saves_state_in_incipit(&self) -> bool {
        use crate::arch::Op;

        for instruction in self.instructions.values() {
            if instruction.operation() == Op::Php {
                return true;
            }
            if instruction.is_sep_rep() || instruction.is_control() {
                return false;
            }
        }
        false
    }

    /// Whether an unknown state change originates here rather than
    /// being inherited from a callee.
    pub fn is_responsible_for_unknown(&self) -> bool {
        use crate::arch::UnknownReason;

        self.unknown_state_changes
            .values()
            .any(|change| change.unknown_reason != UnknownReason::Unknown)
    }

    /// Whether any member performs an indirect jump or call.
    pub fn has_jump_table(&self) -> bool {
        self.instructions
            .values()
            .any(|i| (i.is_jump() || i.is_call()) && i.absolute_argument().is_none())
    }

    /// Whether any member is an interrupt-class instruction.
    pub fn has_suspect_instructions(&self) -> bool {
        use crate::arch::InstructionType;

        self.instructions
            .values()
            .any(|i| i.instruction_type() == InstructionType::Interrupt)
    }
}
