//! Plain-text assembly listing

use crate::analysis::{Analysis, Subroutine};
use crate::arch::Instruction;
use std::io;

/// Renders a converged [`Analysis`] as an assembly listing.
///
/// Output is deterministic: subroutines in ascending entry PC order,
/// separated by blank lines, members in ascending PC order.
pub struct Disassembly<'a> {
    analysis: &'a Analysis,
}

impl<'a> Disassembly<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Disassembly { analysis }
    }

    /// Write the whole listing.
    pub fn write<W: io::Write>(&self, w: &mut W) -> io::Result<()> {
        let mut first = true;
        for subroutine in self.analysis.subroutines().values() {
            if !first {
                writeln!(w)?;
            }
            first = false;
            self.write_subroutine(w, subroutine)?;
        }
        Ok(())
    }

    /// The listing as a string, for consumers that want to post-process
    /// it.
    pub fn text(&self) -> String {
        let mut buffer = Vec::new();
        self.write(&mut buffer).expect("write to Vec cannot fail");
        String::from_utf8(buffer).expect("listing is always valid UTF-8")
    }

    fn write_subroutine<W: io::Write>(&self, w: &mut W, subroutine: &Subroutine) -> io::Result<()> {
        writeln!(w, "{}:", subroutine.label())?;
        if subroutine.has_unknown_state_change() {
            writeln!(w, "  ; Unknown return state")?;
        }

        for instruction in subroutine.instructions().values() {
            if let Some(local) = self
                .analysis
                .local_label(subroutine.pc(), instruction.pc())
            {
                writeln!(w, ".{}:", local)?;
            }
            self.write_instruction(w, subroutine, instruction)?;
        }
        Ok(())
    }

    fn write_instruction<W: io::Write>(
        &self,
        w: &mut W,
        subroutine: &Subroutine,
        instruction: &Instruction,
    ) -> io::Result<()> {
        let operand = self.operand(subroutine, instruction);

        let mut line = format!(
            "  {:<4}{:<25} ; ${:06X}",
            instruction.name(),
            operand,
            instruction.pc()
        );
        if let Some(comment) = self.analysis.comment(instruction.pc()) {
            line.push_str(&format!(" | {}", comment));
        }
        writeln!(w, "{}", line)?;

        self.write_annotations(w, subroutine, instruction)
    }

    /// Label-resolved operand: a subroutine or local label for control
    /// transfers, a hardware-register alias for MMIO accesses, the
    /// plain hex rendering otherwise.
    fn operand(&self, subroutine: &Subroutine, instruction: &Instruction) -> String {
        if instruction.is_control() {
            if let Some(target) = instruction.absolute_argument() {
                if let Some(label) = self.analysis.get_label(target, Some(subroutine.pc())) {
                    return label;
                }
            }
        }

        if let Some(alias) = instruction.hardware_register_alias() {
            return alias;
        }

        instruction.argument_string()
    }

    fn write_annotations<W: io::Write>(
        &self,
        w: &mut W,
        subroutine: &Subroutine,
        instruction: &Instruction,
    ) -> io::Result<()> {
        let pc = instruction.pc();

        if let Some(assertion) = self.analysis.get_assertion(pc, subroutine.pc()) {
            return writeln!(w, "  ; Asserted state change: {}", assertion.state_change);
        }

        if let Some(change) = subroutine.unknown_state_changes().get(&pc) {
            return writeln!(w, "  ; {}", change.unknown_reason);
        }

        Ok(())
    }
}
