//! Decoded instructions and their operand rendering

use crate::arch::hwregs::hardware_register;
use crate::arch::opcodes::{AddressMode, Op, OPCODE_TABLE};
use crate::arch::state::State;
use crate::maths::u24;
use std::hash::{Hash, Hasher};

/// Coarse dispatch category for the symbolic executor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InstructionType {
    Branch,
    Call,
    Interrupt,
    Jump,
    Pop,
    Push,
    Return,
    SepRep,
    Other,
}

/// A single decoded instruction.
///
/// The raw argument always carries three bytes read past the opcode;
/// the operand accessors mask it down to the width implied by the
/// addressing mode under the entry state. Identity for deduplication is
/// (pc, owning subroutine, P register on entry).
#[derive(Copy, Clone, Debug)]
pub struct Instruction {
    pc: u24,
    subroutine_pc: u24,
    opcode: u8,
    argument: u24,
    state: State,
}

impl PartialEq for Instruction {
    fn eq(&self, other: &Self) -> bool {
        self.pc == other.pc
            && self.subroutine_pc == other.subroutine_pc
            && self.state.p() == other.state.p()
    }
}

impl Eq for Instruction {}

impl Hash for Instruction {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.pc.hash(hasher);
        self.subroutine_pc.hash(hasher);
        self.state.p().hash(hasher);
    }
}

impl Instruction {
    pub fn new(pc: u24, subroutine_pc: u24, opcode: u8, argument: u24, state: State) -> Self {
        Instruction {
            pc,
            subroutine_pc,
            opcode,
            argument,
            state,
        }
    }

    pub fn pc(&self) -> u24 {
        self.pc
    }

    pub fn subroutine_pc(&self) -> u24 {
        self.subroutine_pc
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The instruction's operation.
    pub fn operation(&self) -> Op {
        OPCODE_TABLE[self.opcode as usize].0
    }

    /// The instruction's addressing mode.
    pub fn address_mode(&self) -> AddressMode {
        OPCODE_TABLE[self.opcode as usize].1
    }

    /// Lowercase mnemonic.
    pub fn name(&self) -> &'static str {
        self.operation().mnemonic()
    }

    /// Category used for control-flow dispatch.
    pub fn instruction_type(&self) -> InstructionType {
        use Op::*;

        match self.operation() {
            Jsr | Jsl => InstructionType::Call,

            Jmp | Jml | Bra | Brl => InstructionType::Jump,

            Rts | Rtl | Rti => InstructionType::Return,

            Brk | Cop => InstructionType::Interrupt,

            Sep | Rep => InstructionType::SepRep,

            Pla | Plb | Pld | Plp | Plx | Ply => InstructionType::Pop,

            Pea | Pei | Per | Pha | Phb | Phd | Phk | Php | Phx | Phy => InstructionType::Push,

            Bcc | Bcs | Beq | Bmi | Bne | Bpl | Bvc | Bvs => InstructionType::Branch,

            _ => InstructionType::Other,
        }
    }

    /// Whether this instruction transfers control.
    pub fn is_control(&self) -> bool {
        matches!(
            self.instruction_type(),
            InstructionType::Branch
                | InstructionType::Call
                | InstructionType::Jump
                | InstructionType::Return
                | InstructionType::Interrupt
        )
    }

    pub fn is_branch(&self) -> bool {
        self.instruction_type() == InstructionType::Branch
    }

    pub fn is_call(&self) -> bool {
        self.instruction_type() == InstructionType::Call
    }

    pub fn is_jump(&self) -> bool {
        self.instruction_type() == InstructionType::Jump
    }

    pub fn is_return(&self) -> bool {
        self.instruction_type() == InstructionType::Return
    }

    pub fn is_sep_rep(&self) -> bool {
        self.instruction_type() == InstructionType::SepRep
    }

    /// Whether the instruction writes the accumulator.
    pub fn changes_a(&self) -> bool {
        use Op::*;

        matches!(
            self.operation(),
            Adc | And | Asl | Dec | Eor | Inc | Lda | Lsr | Ora | Pla | Rol | Ror | Sbc | Tdc
                | Tsc | Txa | Tya | Xba
        )
    }

    /// Whether the instruction writes the X register.
    pub fn changes_x(&self) -> bool {
        use Op::*;

        matches!(self.operation(), Dex | Inx | Ldx | Plx | Tax | Tsx | Tyx)
    }

    /// Whether the instruction rewrites the stack pointer wholesale.
    pub fn changes_stack_pointer(&self) -> bool {
        matches!(self.operation(), Op::Tcs | Op::Txs)
    }

    /// Operand width in bytes under the entry state.
    pub fn argument_size(&self) -> u32 {
        if let Some(size) = self.address_mode().static_argument_size() {
            return size;
        }

        match self.address_mode() {
            AddressMode::ImmediateM => self.state.size_a(),
            AddressMode::ImmediateX => self.state.size_x(),
            _ => unreachable!("non-immediate mode with state-dependent size"),
        }
    }

    /// Total instruction size in bytes.
    pub fn size(&self) -> u32 {
        self.argument_size() + 1
    }

    /// The operand masked to its width, if the instruction has one.
    pub fn argument(&self) -> Option<u24> {
        match self.argument_size() {
            0 => None,
            1 => Some(self.argument & 0xFF),
            2 => Some(self.argument & 0xFFFF),
            _ => Some(self.argument),
        }
    }

    /// The operand as an absolute bus address, when it is fully
    /// specified by the instruction itself.
    pub fn absolute_argument(&self) -> Option<u24> {
        use AddressMode::*;

        let arg = self.argument()?;

        match self.address_mode() {
            ImmediateM | ImmediateX | Immediate8 | AbsoluteLong => Some(arg),

            // The bank byte comes from the current program bank.
            Absolute => {
                if self.is_control() {
                    Some((self.pc & 0xFF_0000) | arg)
                } else {
                    None
                }
            }

            Relative => Some(self.relative_target(i32::from(arg.value() as u8 as i8))),
            RelativeLong => Some(self.relative_target(i32::from(arg.value() as u16 as i16))),

            _ => None,
        }
    }

    fn relative_target(&self, offset: i32) -> u24 {
        let base = self.pc.value() as i32 + self.size() as i32;
        u24::from(base.wrapping_add(offset) as u32)
    }

    /// The operand formatted for the listing, without label resolution.
    pub fn argument_string(&self) -> String {
        use AddressMode::*;

        let arg = match self.argument() {
            Some(arg) => arg.value(),
            None => {
                return match self.address_mode() {
                    ImpliedAccumulator => "a".to_string(),
                    _ => String::new(),
                };
            }
        };
        let width = (self.argument_size() * 2) as usize;

        match self.address_mode() {
            Implied => String::new(),
            ImpliedAccumulator => "a".to_string(),

            ImmediateM | ImmediateX | Immediate8 => format!("#${:0width$X}", arg, width = width),

            Relative | RelativeLong | DirectPage | Absolute | AbsoluteLong | StackAbsolute => {
                format!("${:0width$X}", arg, width = width)
            }

            DirectPageIndexedX | AbsoluteIndexedX | AbsoluteIndexedLong => {
                format!("${:0width$X},x", arg, width = width)
            }

            DirectPageIndexedY | AbsoluteIndexedY => format!("${:0width$X},y", arg, width = width),

            DirectPageIndirect | AbsoluteIndirect | PeiDirectPageIndirect => {
                format!("(${:0width$X})", arg, width = width)
            }

            DirectPageIndirectLong | AbsoluteIndirectLong => {
                format!("[${:0width$X}]", arg, width = width)
            }

            DirectPageIndexedIndirect | AbsoluteIndexedIndirect => {
                format!("(${:0width$X},x)", arg, width = width)
            }

            DirectPageIndirectIndexed => format!("(${:0width$X}),y", arg, width = width),

            DirectPageIndirectIndexedLong => format!("[${:0width$X}],y", arg, width = width),

            StackRelative => format!("${:02X},s", arg),

            StackRelativeIndirectIndexed => format!("(${:02X},s),y", arg),

            Move => format!("${:02X},${:02X}", arg >> 8, arg & 0xFF),
        }
    }

    /// Canonical hardware-register name for the operand, if it targets
    /// a named MMIO address.
    pub fn hardware_register_alias(&self) -> Option<String> {
        if self.is_control() {
            return None;
        }

        let arg = match self.address_mode() {
            AddressMode::Absolute | AddressMode::AbsoluteLong => self.argument()?,
            _ => return None,
        };

        // Banks 0x00-0x3F and 0x80-0xBF mirror the MMIO region.
        let v = arg.value();
        let address = if arg.bank() & 0x7F < 0x40 { v & 0xFFFF } else { v };

        hardware_register(address).map(|name| format!("!{}", name))
    }
}
