//! Symbolic model of the 65C816 hardware stack

use crate::arch::{Instruction, State, StateChange};
use crate::maths::u24;
use std::collections::HashMap;

/// What a single stack slot is known to hold.
#[derive(Clone, Debug, PartialEq)]
pub enum StackData {
    /// A byte with no tracked value.
    Unknown,
    /// One byte of a known value.
    Byte(u8),
    /// The state pair deposited by PHP.
    State(State, StateChange),
}

impl Default for StackData {
    fn default() -> StackData {
        StackData::Unknown
    }
}

/// A stack slot plus the instruction that wrote it, when known.
#[derive(Clone, Debug, Default)]
pub struct StackEntry {
    pub instruction: Option<Instruction>,
    pub data: StackData,
}

/// The abstract stack.
///
/// Slots live in a sparse map keyed by the 16-bit stack pointer, which
/// starts at 0x100 and wraps like the hardware register. Values are
/// only tracked well enough to validate returns and recover PHP/PLP
/// pairings.
#[derive(Clone, Debug)]
pub struct Stack {
    memory: HashMap<u16, StackEntry>,
    pointer: u16,
    last_manipulator: Option<Instruction>,
}

impl Default for Stack {
    fn default() -> Stack {
        Stack {
            memory: HashMap::new(),
            pointer: 0x100,
            last_manipulator: None,
        }
    }
}

impl Stack {
    pub fn new() -> Stack {
        Stack::default()
    }

    /// Remember the instruction that last rewrote the stack pointer
    /// (TCS/TXS). The new pointer value itself is not tracked.
    pub fn record_manipulation(&mut self, instruction: Instruction) {
        self.last_manipulator = Some(instruction);
    }

    pub fn last_manipulator(&self) -> Option<Instruction> {
        self.last_manipulator
    }

    /// Push `size` bytes of `data` (or unknown bytes), high to low, so
    /// that the low byte ends up on top of the stack.
    pub fn push(&mut self, size: u32, data: Option<u24>, instruction: Instruction) {
        for i in (1..=size).rev() {
            let byte = data.map(|value| (value.value() >> ((i - 1) * 8)) as u8);
            self.memory.insert(
                self.pointer,
                StackEntry {
                    instruction: Some(instruction),
                    data: byte.map_or(StackData::Unknown, StackData::Byte),
                },
            );
            self.pointer = self.pointer.wrapping_sub(1);
        }
    }

    /// Push one byte.
    pub fn push_one(&mut self, data: Option<u8>, instruction: Instruction) {
        self.memory.insert(
            self.pointer,
            StackEntry {
                instruction: Some(instruction),
                data: data.map_or(StackData::Unknown, StackData::Byte),
            },
        );
        self.pointer = self.pointer.wrapping_sub(1);
    }

    /// Push the state pair deposited by PHP.
    pub fn push_state(&mut self, state: State, state_change: StateChange, instruction: Instruction) {
        self.memory.insert(
            self.pointer,
            StackEntry {
                instruction: Some(instruction),
                data: StackData::State(state, state_change),
            },
        );
        self.pointer = self.pointer.wrapping_sub(1);
    }

    /// Pop a single entry. Slots never written pop as empty entries.
    pub fn pop_one(&mut self) -> StackEntry {
        self.pointer = self.pointer.wrapping_add(1);
        self.memory.get(&self.pointer).cloned().unwrap_or_default()
    }

    /// Pop `size` entries, bottom of the popped range last.
    pub fn pop(&mut self, size: u32) -> Vec<StackEntry> {
        (0..size).map(|_| self.pop_one()).collect()
    }

    /// Read the top `size` entries without moving the pointer.
    pub fn peek(&self, size: u32) -> Vec<StackEntry> {
        (1..=size as u16)
            .map(|i| {
                self.memory
                    .get(&self.pointer.wrapping_add(i))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Whether the top `size` entries hold exactly `value`, stored
    /// little-endian from the top of the stack down.
    pub fn match_value(&self, size: u32, value: u24) -> bool {
        self.peek(size).iter().enumerate().all(|(i, entry)| {
            entry.data == StackData::Byte((value.value() >> (i * 8)) as u8)
        })
    }
}
