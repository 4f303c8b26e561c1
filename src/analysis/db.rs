//! The repository of everything learned about a program image

use crate::analysis::{Assertion, AssertionType, Cpu, JumpTable, JumpTableStatus, Reference, Subroutine};
use crate::arch::{Instruction, State, StateChange};
use crate::maths::u24;
use crate::memory::Rom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A location the analysis starts exploring from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub label: String,
    pub pc: u24,
    pub state: State,
}

/// A repository of information obtained from the program under
/// analysis.
///
/// Derived results (instructions, subroutines, references, local
/// labels) are rebuilt from scratch by every [`Analysis::run`]; user
/// data (entry points, comments, labels, assertions, jump tables)
/// survives across runs.
#[derive(Clone, Debug)]
pub struct Analysis {
    rom: Rom,

    // Derived results.
    instructions: HashMap<u24, HashSet<Instruction>>,
    subroutines: BTreeMap<u24, Subroutine>,
    references: HashMap<u24, HashSet<Reference>>,
    local_labels: HashMap<(u24, u24), String>,

    // User data.
    entry_points: BTreeMap<u24, EntryPoint>,
    comments: BTreeMap<u24, String>,
    user_labels: BTreeMap<u24, String>,
    instruction_assertions: BTreeMap<u24, StateChange>,
    subroutine_assertions: BTreeMap<(u24, u24), StateChange>,
    jump_tables: BTreeMap<u24, JumpTable>,
}

impl Analysis {
    /// Build an analysis seeded with the ROM's reset and NMI vectors.
    pub fn new(rom: Rom) -> Analysis {
        let mut analysis = Analysis {
            rom,
            instructions: HashMap::new(),
            subroutines: BTreeMap::new(),
            references: HashMap::new(),
            local_labels: HashMap::new(),
            entry_points: BTreeMap::new(),
            comments: BTreeMap::new(),
            user_labels: BTreeMap::new(),
            instruction_assertions: BTreeMap::new(),
            subroutine_assertions: BTreeMap::new(),
            jump_tables: BTreeMap::new(),
        };

        let reset = analysis.rom.reset_vector();
        let nmi = analysis.rom.nmi_vector();
        analysis.add_entry_point("reset".to_string(), reset, State::default());
        analysis.add_entry_point("nmi".to_string(), nmi, State::default());

        analysis
    }

    pub fn rom(&self) -> &Rom {
        &self.rom
    }

    /// Wipe the derived results, preserving user data.
    pub fn clear(&mut self) {
        self.instructions.clear();
        self.subroutines.clear();
        self.references.clear();
        self.local_labels.clear();
    }

    /// (Re)build the derived results by exploring from every entry
    /// point.
    pub fn run(&mut self) {
        self.clear();

        let entry_points: Vec<EntryPoint> = self.entry_points.values().cloned().collect();
        for entry in entry_points {
            self.add_subroutine(entry.pc, Some(entry.label.clone()), true);
            let mut cpu = Cpu::new(entry.pc, entry.pc, entry.state);
            cpu.run(self);
        }

        self.generate_local_labels();
    }

    /// Register an additional entry point.
    pub fn add_entry_point(&mut self, label: String, pc: u24, state: State) {
        self.entry_points
            .insert(pc, EntryPoint { label, pc, state });
    }

    pub fn entry_points(&self) -> impl Iterator<Item = &EntryPoint> {
        self.entry_points.values()
    }

    /// Record a decoded instruction.
    ///
    /// Returns `None` when an instruction with the same identity (PC,
    /// subroutine, entry state) has already been visited, which is the
    /// executor's signal that this path has converged.
    pub fn add_instruction(
        &mut self,
        pc: u24,
        subroutine_pc: u24,
        opcode: u8,
        argument: u24,
        state: State,
    ) -> Option<Instruction> {
        let instruction = Instruction::new(pc, subroutine_pc, opcode, argument, state);
        if !self.instructions.entry(pc).or_default().insert(instruction) {
            return None;
        }

        if let Some(subroutine) = self.subroutines.get_mut(&subroutine_pc) {
            subroutine.add_instruction(instruction);
        }
        Some(instruction)
    }

    /// Record that `source` transfers control to `target`.
    pub fn add_reference(&mut self, source: u24, target: u24, subroutine_pc: u24) {
        self.references
            .entry(source)
            .or_default()
            .insert(Reference::new(target, subroutine_pc));
    }

    /// Register a subroutine, if it is not already known.
    ///
    /// A user label takes priority, then the supplied label, then a
    /// generated `sub_XXXXXX` name.
    pub fn add_subroutine(&mut self, pc: u24, label: Option<String>, is_entry_point: bool) {
        let label = self
            .user_labels
            .get(&pc)
            .cloned()
            .or(label)
            .unwrap_or_else(|| format!("sub_{:06X}", pc));

        self.subroutines
            .entry(pc)
            .or_insert_with(|| Subroutine::new(pc, label, is_entry_point));
    }

    /// Record a state change at a terminating instruction of a
    /// subroutine.
    pub fn add_subroutine_state(&mut self, subroutine_pc: u24, pc: u24, change: StateChange) {
        if let Some(subroutine) = self.subroutines.get_mut(&subroutine_pc) {
            subroutine.add_state_change(pc, change);
        }
    }

    pub fn subroutine(&self, pc: u24) -> Option<&Subroutine> {
        self.subroutines.get(&pc)
    }

    pub fn subroutines(&self) -> &BTreeMap<u24, Subroutine> {
        &self.subroutines
    }

    pub fn instructions(&self) -> &HashMap<u24, HashSet<Instruction>> {
        &self.instructions
    }

    pub fn references(&self) -> &HashMap<u24, HashSet<Reference>> {
        &self.references
    }

    /// Any one of the instructions decoded at `pc`.
    pub fn any_instruction(&self, pc: u24) -> Option<Instruction> {
        self.instructions
            .get(&pc)
            .and_then(|set| set.iter().next())
            .copied()
    }

    /// The assertion that applies at (pc, subroutine), if any. An
    /// instruction-scoped assertion wins over a subroutine-scoped one.
    pub fn get_assertion(&self, pc: u24, subroutine_pc: u24) -> Option<Assertion> {
        if let Some(change) = self.instruction_assertions.get(&pc) {
            return Some(Assertion::new(AssertionType::Instruction, *change));
        }
        if let Some(change) = self.subroutine_assertions.get(&(subroutine_pc, pc)) {
            return Some(Assertion::new(AssertionType::Subroutine, *change));
        }
        None
    }

    /// Assert the state change performed by the instruction at `pc`.
    pub fn assert_instruction(&mut self, pc: u24, state_change: StateChange) {
        self.instruction_assertions.insert(pc, state_change);
    }

    /// Assert the return-state summary recorded for `subroutine_pc`
    /// when execution stops at `pc`.
    pub fn assert_subroutine(&mut self, subroutine_pc: u24, pc: u24, state_change: StateChange) {
        self.subroutine_assertions
            .insert((subroutine_pc, pc), state_change);
    }

    pub fn remove_assertion(&mut self, pc: u24, subroutine_pc: u24) {
        self.instruction_assertions.remove(&pc);
        self.subroutine_assertions.remove(&(subroutine_pc, pc));
    }

    pub fn instruction_assertions(&self) -> &BTreeMap<u24, StateChange> {
        &self.instruction_assertions
    }

    pub fn subroutine_assertions(&self) -> &BTreeMap<(u24, u24), StateChange> {
        &self.subroutine_assertions
    }

    /// The jump table registered at `pc`, if any.
    pub fn jump_table(&self, pc: u24) -> Option<&JumpTable> {
        self.jump_tables.get(&pc)
    }

    pub fn jump_tables(&self) -> &BTreeMap<u24, JumpTable> {
        &self.jump_tables
    }

    /// Note an indirect transfer whose table is not yet known.
    pub fn register_unknown_jump_table(&mut self, pc: u24) {
        self.jump_tables.entry(pc).or_default();
    }

    /// Restore a previously captured jump table (project loading).
    pub fn restore_jump_table(&mut self, pc: u24, table: JumpTable) {
        self.jump_tables.insert(pc, table);
    }

    /// Populate the jump table spanned by the indirect transfer at
    /// `caller_pc` over the byte range `[start, end]`, reading one word
    /// target every two bytes.
    ///
    /// Returns false when no instruction with a table argument has been
    /// decoded at `caller_pc` yet.
    pub fn define_jump_table(
        &mut self,
        caller_pc: u24,
        range: (u16, u16),
        status: JumpTableStatus,
    ) -> bool {
        let caller = match self.any_instruction(caller_pc) {
            Some(caller) => caller,
            None => return false,
        };
        let argument = match caller.argument() {
            Some(argument) => argument,
            None => return false,
        };

        let bank = caller.pc() & 0xFF_0000;
        let table = self.jump_tables.entry(caller_pc).or_default();

        let (start, end) = range;
        let mut index = u32::from(start);
        while index <= u32::from(end) {
            let slot = bank | (argument + index);
            let target = bank | u24::from(self.rom.read_word(slot));
            table.targets.insert(index as u16, target);
            index += 2;
        }
        table.status = status;

        true
    }

    /// Drop a jump table definition.
    pub fn undefine_jump_table(&mut self, pc: u24) {
        self.jump_tables.remove(&pc);
    }

    /// The label visible at `pc` from inside `subroutine_pc`:
    /// subroutine labels win, then dot-prefixed local labels.
    pub fn get_label(&self, pc: u24, subroutine_pc: Option<u24>) -> Option<String> {
        if let Some(subroutine) = self.subroutines.get(&pc) {
            return Some(subroutine.label().to_string());
        }

        let subroutine_pc = subroutine_pc?;
        self.local_labels
            .get(&(subroutine_pc, pc))
            .map(|label| format!(".{}", label))
    }

    /// The local label generated at `pc` inside `subroutine_pc`.
    pub fn local_label(&self, subroutine_pc: u24, pc: u24) -> Option<&str> {
        self.local_labels
            .get(&(subroutine_pc, pc))
            .map(String::as_str)
    }

    /// Attach a user label to `pc`, renaming any subroutine already
    /// registered there. The label survives re-runs.
    pub fn rename_label(&mut self, pc: u24, label: String) {
        if let Some(subroutine) = self.subroutines.get_mut(&pc) {
            subroutine.set_label(label.clone());
        }
        self.user_labels.insert(pc, label);
    }

    pub fn user_labels(&self) -> &BTreeMap<u24, String> {
        &self.user_labels
    }

    /// The user comment at `pc`, if any.
    pub fn comment(&self, pc: u24) -> Option<&str> {
        self.comments.get(&pc).map(String::as_str)
    }

    /// Set or clear the user comment at `pc`.
    pub fn set_comment(&mut self, pc: u24, comment: String) {
        if comment.is_empty() {
            self.comments.remove(&pc);
        } else {
            self.comments.insert(pc, comment);
        }
    }

    pub fn comments(&self) -> &BTreeMap<u24, String> {
        &self.comments
    }

    /// Name every referenced instruction that is not a subroutine
    /// entry with a `loc_XXXXXX` local label (or a user override).
    fn generate_local_labels(&mut self) {
        for reference_set in self.references.values() {
            for reference in reference_set {
                if self.subroutines.contains_key(&reference.target) {
                    continue;
                }

                let label = self
                    .user_labels
                    .get(&reference.target)
                    .cloned()
                    .unwrap_or_else(|| format!("loc_{:06X}", reference.target));
                self.local_labels
                    .insert((reference.subroutine_pc, reference.target), label);
            }
        }
    }
}
