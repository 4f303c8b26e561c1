//! The symbolic executor that discovers reachable code

use crate::analysis::{Analysis, AssertionType, JumpTableStatus, Stack, StackData, StackEntry};
use crate::arch::{AddressMode, Instruction, InstructionType, Op, State, StateChange, UnknownReason};
use crate::maths::u24;
use crate::memory::Rom;
use std::collections::{BTreeSet, HashSet};

/// A depth-first explorer over the program's control-flow graph.
///
/// The executor is a plain value: forking at a branch or a call clones
/// it, and the clone runs to exhaustion before the original proceeds.
/// The shared [`Analysis`] is only borrowed for the duration of each
/// call, which is what lets clones run against the same repository.
#[derive(Clone, Debug)]
pub struct Cpu {
    pc: u24,
    subroutine_pc: u24,
    state: State,
    state_change: StateChange,
    state_inference: StateChange,
    stack: Stack,
    stop: bool,
}

impl Cpu {
    pub fn new(pc: u24, subroutine_pc: u24, state: State) -> Cpu {
        Cpu {
            pc,
            subroutine_pc,
            state,
            state_change: StateChange::default(),
            state_inference: StateChange::default(),
            stack: Stack::new(),
            stop: false,
        }
    }

    /// Explore until this path terminates.
    pub fn run(&mut self, analysis: &mut Analysis) {
        while !self.stop {
            self.step(analysis);
        }
    }

    /// Fetch, record and execute one instruction.
    fn step(&mut self, analysis: &mut Analysis) {
        // Code living in RAM can be rewritten under our feet.
        if Rom::is_ram(self.pc) {
            return self.unknown_state_change(analysis, self.pc, UnknownReason::MutableCode);
        }

        let opcode = analysis.rom().read_byte(self.pc);
        let argument = analysis.rom().read_address(self.pc + 1);

        match analysis.add_instruction(self.pc, self.subroutine_pc, opcode, argument, self.state) {
            Some(instruction) => self.execute(analysis, instruction),
            // Already visited in this exact state: the path converged.
            None => self.stop = true,
        }
    }

    fn execute(&mut self, analysis: &mut Analysis, instruction: Instruction) {
        self.pc = self.pc + instruction.size();

        self.derive_state_inference(&instruction);

        match instruction.instruction_type() {
            InstructionType::Branch => self.branch(analysis, instruction),
            InstructionType::Call => self.call(analysis, instruction),
            InstructionType::Interrupt => self.interrupt(analysis, instruction),
            InstructionType::Jump => self.jump(analysis, instruction),
            InstructionType::Return => self.ret(analysis, instruction),
            InstructionType::SepRep => self.sep_rep(instruction),
            InstructionType::Pop => self.pop(analysis, instruction),
            InstructionType::Push => self.push(instruction),
            InstructionType::Other => {
                if instruction.changes_stack_pointer() {
                    self.stack.record_manipulation(instruction);
                }
            }
        }
    }

    /// Fork on a conditional branch: a clone exhausts the fall-through
    /// path, then this executor takes the branch.
    fn branch(&mut self, analysis: &mut Analysis, instruction: Instruction) {
        let mut fall_through = self.clone();
        fall_through.run(analysis);

        match instruction.absolute_argument() {
            Some(target) => {
                analysis.add_reference(instruction.pc(), target, self.subroutine_pc);
                self.pc = target;
            }
            None => {
                self.unknown_state_change(analysis, instruction.pc(), UnknownReason::IndirectJump)
            }
        }
    }

    /// Execute a called subroutine in a clone, then propagate its
    /// return-state summary back into this executor.
    fn call(&mut self, analysis: &mut Analysis, instruction: Instruction) {
        let targets = match self.compute_jump_targets(analysis, &instruction) {
            Some(targets) => targets,
            None => {
                return self.unknown_state_change(
                    analysis,
                    instruction.pc(),
                    UnknownReason::IndirectJump,
                );
            }
        };

        for &target in &targets {
            let mut callee = self.clone();
            callee.pc = target;
            callee.subroutine_pc = target;
            callee.state_change = StateChange::default();

            // The return address the matching RTS/RTL will consume.
            match instruction.operation() {
                Op::Jsr => callee.stack.push(2, Some(instruction.pc()), instruction),
                Op::Jsl => callee.stack.push(3, Some(instruction.pc()), instruction),
                _ => {}
            }

            analysis.add_subroutine(target, None, false);
            analysis.add_reference(instruction.pc(), target, self.subroutine_pc);
            callee.run(analysis);
        }

        self.propagate_subroutine_state(analysis, instruction.pc(), &targets);
    }

    fn interrupt(&mut self, analysis: &mut Analysis, instruction: Instruction) {
        self.unknown_state_change(analysis, instruction.pc(), UnknownReason::SuspectInstruction);
    }

    /// Explore every jump target in its own clone, then stop here.
    fn jump(&mut self, analysis: &mut Analysis, instruction: Instruction) {
        let targets = match self.compute_jump_targets(analysis, &instruction) {
            Some(targets) => targets,
            None => {
                return self.unknown_state_change(
                    analysis,
                    instruction.pc(),
                    UnknownReason::IndirectJump,
                );
            }
        };

        // Targets recovered from a jump table start subroutines of
        // their own; a direct jump stays inside the current one.
        let through_table = instruction.absolute_argument().is_none();

        for &target in &targets {
            analysis.add_reference(instruction.pc(), target, self.subroutine_pc);

            let mut explorer = self.clone();
            explorer.pc = target;
            if through_table {
                explorer.subroutine_pc = target;
                explorer.state_change = StateChange::default();
                analysis.add_subroutine(target, None, false);
            }
            explorer.run(analysis);
        }

        self.stop = true;
    }

    fn ret(&mut self, analysis: &mut Analysis, instruction: Instruction) {
        if instruction.operation() == Op::Rti {
            return self.standard_ret(analysis, instruction);
        }

        let ret_size = if instruction.operation() == Op::Rts { 2 } else { 3 };
        let entries = self.stack.pop(ret_size);

        if self.is_return_manipulated(&instruction, &entries) {
            self.unknown_state_change(analysis, instruction.pc(), UnknownReason::StackManipulation);
        } else {
            self.standard_ret(analysis, instruction);
        }
    }

    /// Record the accumulated state change as a known summary of the
    /// current subroutine and end this path.
    fn standard_ret(&mut self, analysis: &mut Analysis, instruction: Instruction) {
        analysis.add_subroutine_state(self.subroutine_pc, instruction.pc(), self.state_change);
        self.stop = true;
    }

    fn sep_rep(&mut self, instruction: Instruction) {
        let mask = match instruction.absolute_argument() {
            Some(argument) => argument.value() as u8,
            None => return,
        };

        match instruction.operation() {
            Op::Sep => {
                self.state.set_mask(mask);
                self.state_change.set_mask(mask);
            }
            Op::Rep => {
                self.state.reset_mask(mask);
                self.state_change.reset_mask(mask);
            }
            _ => {}
        }

        // A SEP/REP round trip back to an inferred entry value is not
        // an observable state change.
        self.state_change.apply_inference(self.state_inference);
    }

    fn pop(&mut self, analysis: &mut Analysis, instruction: Instruction) {
        match instruction.operation() {
            Op::Plp => {
                let entry = self.stack.pop_one();
                match self.restored_state_pair(&entry) {
                    Some((state, state_change)) => {
                        self.state = state;
                        self.state_change = state_change;
                    }
                    None => self.unknown_state_change(
                        analysis,
                        instruction.pc(),
                        UnknownReason::StackManipulation,
                    ),
                }
            }

            Op::Pla => {
                self.stack.pop(self.state.size_a());
            }

            Op::Plx | Op::Ply => {
                self.stack.pop(self.state.size_x());
            }

            Op::Plb => {
                self.stack.pop_one();
            }

            Op::Pld => {
                self.stack.pop(2);
            }

            _ => {}
        }
    }

    fn push(&mut self, instruction: Instruction) {
        match instruction.operation() {
            Op::Php => self
                .stack
                .push_state(self.state, self.state_change, instruction),

            Op::Pha => self.stack.push(self.state.size_a(), None, instruction),

            Op::Phx | Op::Phy => self.stack.push(self.state.size_x(), None, instruction),

            Op::Phb | Op::Phk => self.stack.push_one(None, instruction),

            Op::Phd | Op::Pea | Op::Per | Op::Pei => self.stack.push(2, None, instruction),

            _ => {}
        }
    }

    /// The state pair a PLP restores, when the top of the stack was
    /// genuinely written by a PHP.
    fn restored_state_pair(&self, entry: &StackEntry) -> Option<(State, StateChange)> {
        let pusher = entry.instruction.as_ref()?;
        if pusher.operation() != Op::Php {
            return None;
        }
        match &entry.data {
            StackData::State(state, state_change) => Some((*state, *state_change)),
            _ => None,
        }
    }

    /// Whether a return would consume bytes that were not pushed by the
    /// matching call instruction.
    fn is_return_manipulated(&self, instruction: &Instruction, entries: &[StackEntry]) -> bool {
        let op = instruction.operation();

        for entry in entries {
            let pusher = match &entry.instruction {
                Some(pusher) => pusher,
                None => return true,
            };

            match op {
                Op::Rts if pusher.operation() != Op::Jsr => return true,
                Op::Rtl if pusher.operation() != Op::Jsl => return true,
                _ => {}
            }
        }

        false
    }

    /// The target set of a jump or call: the direct target when the
    /// argument resolves, otherwise the contents of an asserted jump
    /// table. An indirect transfer with no usable table registers an
    /// unknown table and yields `None`.
    fn compute_jump_targets(
        &mut self,
        analysis: &mut Analysis,
        instruction: &Instruction,
    ) -> Option<BTreeSet<u24>> {
        if let Some(target) = instruction.absolute_argument() {
            let mut targets = BTreeSet::new();
            targets.insert(target);
            return Some(targets);
        }

        let known = analysis
            .jump_table(instruction.pc())
            .filter(|table| table.status != JumpTableStatus::Unknown)
            .map(|table| table.targets.values().copied().collect::<BTreeSet<u24>>());

        match known {
            Some(targets) => Some(targets),
            None => {
                analysis.register_unknown_jump_table(instruction.pc());
                None
            }
        }
    }

    /// Observing the width of an immediate operand before any mode
    /// change proves the entry value of the matching flag.
    fn derive_state_inference(&mut self, instruction: &Instruction) {
        if instruction.address_mode() == AddressMode::ImmediateM && self.state_change.m.is_none() {
            self.state_inference.m = Some(self.state.m());
        }
        if instruction.address_mode() == AddressMode::ImmediateX && self.state_change.x.is_none() {
            self.state_inference.x = Some(self.state.x());
        }
    }

    /// Fold the return-state summaries of the called subroutines into
    /// this executor's state.
    fn propagate_subroutine_state(
        &mut self,
        analysis: &mut Analysis,
        pc: u24,
        targets: &BTreeSet<u24>,
    ) {
        let mut changes: HashSet<StateChange> = HashSet::new();
        let mut polluted = false;

        for target in targets {
            if let Some(subroutine) = analysis.subroutine(*target) {
                if subroutine.has_unknown_state_change() {
                    polluted = true;
                    break;
                }
                changes.extend(subroutine.simplified_state_changes(self.state));
            }
        }

        if polluted {
            return self.unknown_state_change(analysis, pc, UnknownReason::Unknown);
        }

        if changes.len() != 1 {
            return self.unknown_state_change(analysis, pc, UnknownReason::MultipleReturnStates);
        }

        if let Some(change) = changes.into_iter().next() {
            self.apply_state_change(change);
        }
    }

    /// Apply a resolved state change to both the live state and the
    /// accumulated delta.
    fn apply_state_change(&mut self, change: StateChange) {
        if let Some(m) = change.m {
            self.state.set(State::M, m);
            self.state_change.m = Some(m);
        }
        if let Some(x) = change.x {
            self.state.set(State::X, x);
            self.state_change.x = Some(x);
        }
    }

    /// Handle a point where the state change cannot be predicted,
    /// consulting user assertions before giving up on the path.
    fn unknown_state_change(&mut self, analysis: &mut Analysis, pc: u24, reason: UnknownReason) {
        match analysis.get_assertion(pc, self.subroutine_pc) {
            None => {
                analysis.add_subroutine_state(
                    self.subroutine_pc,
                    pc,
                    StateChange::new_unknown(reason),
                );
                self.stop = true;
            }

            Some(assertion) => match assertion.scope {
                AssertionType::Instruction => self.apply_state_change(assertion.state_change),
                AssertionType::Subroutine => {
                    analysis.add_subroutine_state(self.subroutine_pc, pc, assertion.state_change);
                    self.stop = true;
                }
            },
        }
    }
}
