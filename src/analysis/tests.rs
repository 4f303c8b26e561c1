use crate::analysis::{Analysis, JumpTableStatus, Reference};
use crate::arch::{State, StateChange, UnknownReason};
use crate::maths::u24;
use crate::memory::Rom;

fn pc(value: u32) -> u24 {
    u24::from(value)
}

/// Build an analysis over a LoROM image with `code` at bus 0x8000.
///
/// The reset vector points at 0x8000; the NMI vector points at an RTI
/// parked at 0x9000.
fn analysis_with_code(code: &[u8]) -> Analysis {
    let mut data = vec![0_u8; 0x10000];

    for (i, c) in b"TEST".iter().enumerate() {
        data[0x7FC0 + i] = *c;
    }
    data[0x7FEA] = 0x00;
    data[0x7FEB] = 0x90;
    data[0x7FFC] = 0x00;
    data[0x7FFD] = 0x80;

    // RTI at bus 0x9000 so the NMI handler converges immediately.
    data[0x1000] = 0x40;

    data[..code.len()].copy_from_slice(code);

    Analysis::new(Rom::from_bytes(data))
}

#[test]
fn infinite_loop_converges() {
    // jmp $8000
    let mut analysis = analysis_with_code(&[0x4C, 0x00, 0x80]);
    analysis.run();

    let reset = analysis.subroutine(pc(0x8000)).unwrap();
    assert_eq!(reset.label(), "reset");
    assert!(reset.is_entry_point());
    assert_eq!(reset.instructions().len(), 1);
    assert!(!reset.has_unknown_state_change());

    // The jump references itself from within its own subroutine.
    let refs = analysis.references().get(&pc(0x8000)).unwrap();
    assert!(refs.contains(&Reference::new(pc(0x8000), pc(0x8000))));

    // Only reset and nmi exist.
    assert_eq!(analysis.subroutines().len(), 2);
}

#[test]
fn state_change_propagates_to_caller() {
    // reset: jsr $800A ; lda #$1234 ; ldx #$1234 ; rts
    // sub:   rep #$30 ; rts
    let mut analysis = analysis_with_code(&[
        0x20, 0x0A, 0x80, // 0x8000 jsr $800A
        0xA9, 0x34, 0x12, // 0x8003 lda #$1234 (16-bit)
        0xA2, 0x34, 0x12, // 0x8006 ldx #$1234 (16-bit)
        0x60, // 0x8009 rts
        0xC2, 0x30, // 0x800A rep #$30
        0x60, // 0x800C rts
    ]);
    analysis.run();

    assert_eq!(analysis.subroutines().len(), 3);

    // The callee's return summary switches both flags to 16-bit.
    let callee = analysis.subroutine(pc(0x800A)).unwrap();
    assert_eq!(callee.label(), "sub_00800A");
    let change = callee.known_state_changes().get(&pc(0x800C)).unwrap();
    assert_eq!(change.m, Some(false));
    assert_eq!(change.x, Some(false));

    // The loads after the call were decoded with 16-bit operands.
    let lda = analysis.any_instruction(pc(0x8003)).unwrap();
    assert_eq!(lda.argument_size(), 2);
    assert_eq!(lda.argument(), Some(pc(0x1234)));
    let ldx = analysis.any_instruction(pc(0x8006)).unwrap();
    assert_eq!(ldx.argument_size(), 2);
    assert_eq!(ldx.argument(), Some(pc(0x1234)));
}

#[test]
fn inferred_entry_state_elides_redundant_toggles() {
    // reset: rep #$30 ; jsr $8008 ; rts
    // sub:   lda #$1234 ; sep #$20 ; rep #$20 ; rts
    let mut analysis = analysis_with_code(&[
        0xC2, 0x30, // 0x8000 rep #$30
        0x20, 0x08, 0x80, // 0x8002 jsr $8008
        0x60, // 0x8005 rts
        0xEA, 0xEA, // padding
        0xA9, 0x34, 0x12, // 0x8008 lda #$1234 (16-bit; proves M on entry)
        0xE2, 0x20, // 0x800B sep #$20
        0xC2, 0x20, // 0x800D rep #$20
        0x60, // 0x800F rts
    ]);
    analysis.run();

    // The SEP/REP round trip cancels against the inferred entry state.
    let callee = analysis.subroutine(pc(0x8008)).unwrap();
    assert_eq!(callee.known_state_changes().len(), 1);
    let change = callee.known_state_changes().get(&pc(0x800F)).unwrap();
    assert!(change.is_empty());
}

#[test]
fn php_plp_preserves_state() {
    // reset: jsr $8006 ; rts
    // sub:   php ; sep #$30 ; plp ; rts
    let mut analysis = analysis_with_code(&[
        0x20, 0x06, 0x80, // 0x8000 jsr $8006
        0x60, // 0x8003 rts
        0xEA, 0xEA, // padding
        0x08, // 0x8006 php
        0xE2, 0x30, // 0x8007 sep #$30
        0x28, // 0x8009 plp
        0x60, // 0x800A rts
    ]);
    analysis.run();

    let reset = analysis.subroutine(pc(0x8000)).unwrap();
    assert!(!reset.saves_state_in_incipit());

    let callee = analysis.subroutine(pc(0x8006)).unwrap();
    assert!(callee.saves_state_in_incipit());
    assert_eq!(callee.instructions().len(), 4);

    // The PLP restored both the state and the accumulated change.
    assert_eq!(callee.known_state_changes().len(), 1);
    let change = callee.known_state_changes().get(&pc(0x800A)).unwrap();
    assert!(change.is_empty());
}

#[test]
fn indirect_jump_blocks_until_table_is_defined() {
    // reset: jmp ($8200)
    let mut analysis = analysis_with_code(&[0x6C, 0x00, 0x82]);

    analysis.run();

    // The jump cannot be resolved: the path dies with a marker and an
    // unknown jump table is registered at the jump's address.
    let reset = analysis.subroutine(pc(0x8000)).unwrap();
    let change = reset.unknown_state_changes().get(&pc(0x8000)).unwrap();
    assert_eq!(change.unknown_reason, UnknownReason::IndirectJump);
    assert!(reset.has_jump_table());

    let table = analysis.jump_table(pc(0x8000)).unwrap();
    assert_eq!(table.status, JumpTableStatus::Unknown);

    // Now assert a two-slot table at $8200 pointing at $8100/$8300.
    {
        // Table words and target code are patched into a fresh image.
        let mut analysis = analysis_with_code(&{
            let mut code = vec![0x6C, 0x00, 0x82];
            code.resize(0x400, 0xEA);
            code[0x100] = 0x60; // rts at 0x8100
            code[0x200] = 0x00; // table slot 0 -> 0x8100
            code[0x201] = 0x81;
            code[0x202] = 0x00; // table slot 2 -> 0x8300
            code[0x203] = 0x83;
            code[0x300] = 0x60; // rts at 0x8300
            code
        });

        analysis.run();
        assert!(analysis.define_jump_table(pc(0x8000), (0, 2), JumpTableStatus::Partial));
        analysis.run();

        let table = analysis.jump_table(pc(0x8000)).unwrap();
        assert_eq!(table.status, JumpTableStatus::Partial);
        assert_eq!(table.targets.get(&0), Some(&pc(0x8100)));
        assert_eq!(table.targets.get(&2), Some(&pc(0x8300)));

        // The targets now exist as subroutines of their own.
        assert!(analysis.subroutine(pc(0x8100)).is_some());
        assert!(analysis.subroutine(pc(0x8300)).is_some());
        assert_eq!(analysis.subroutines().len(), 4);
    }
}

#[test]
fn stack_manipulation_poisons_the_return() {
    // reset: pha ; pha ; rts
    let mut analysis = analysis_with_code(&[0x48, 0x48, 0x60]);
    analysis.run();

    let reset = analysis.subroutine(pc(0x8000)).unwrap();
    let change = reset.unknown_state_changes().get(&pc(0x8002)).unwrap();
    assert_eq!(change.unknown_reason, UnknownReason::StackManipulation);
}

#[test]
fn diverging_return_states_pollute_the_caller() {
    // reset: jsr $800A ; rts
    // sub:   bne .skip ; rep #$20 ; rts ; .skip: sep #$10 ; rts
    let mut analysis = analysis_with_code(&[
        0x20, 0x0A, 0x80, // 0x8000 jsr $800A
        0x60, // 0x8003 rts
        0xEA, 0xEA, 0xEA, 0xEA, 0xEA, 0xEA, // padding
        0xD0, 0x03, // 0x800A bne $800F
        0xC2, 0x20, // 0x800C rep #$20
        0x60, // 0x800E rts
        0xE2, 0x10, // 0x800F sep #$10
        0x60, // 0x8011 rts
    ]);
    analysis.run();

    let callee = analysis.subroutine(pc(0x800A)).unwrap();
    assert_eq!(callee.known_state_changes().len(), 2);
    assert!(!callee.has_unknown_state_change());

    // The two simplified summaries disagree, so the call site is
    // marked as unpredictable.
    let reset = analysis.subroutine(pc(0x8000)).unwrap();
    let change = reset.unknown_state_changes().get(&pc(0x8000)).unwrap();
    assert_eq!(change.unknown_reason, UnknownReason::MultipleReturnStates);

    // The branch target inside the callee got a local label.
    assert_eq!(analysis.local_label(pc(0x800A), pc(0x800F)), Some("loc_00800F"));
}

#[test]
fn interrupts_stop_the_path_unless_asserted() {
    // reset: brk ; rts
    let mut analysis = analysis_with_code(&[0x00, 0x00, 0x60]);
    analysis.run();

    let reset = analysis.subroutine(pc(0x8000)).unwrap();
    assert!(reset.has_suspect_instructions());
    let change = reset.unknown_state_changes().get(&pc(0x8000)).unwrap();
    assert_eq!(change.unknown_reason, UnknownReason::SuspectInstruction);
    assert_eq!(reset.instructions().len(), 1);
    assert!(reset.is_responsible_for_unknown());

    // An instruction-scoped assertion lets execution continue past it.
    analysis.assert_instruction(pc(0x8000), StateChange::default());
    analysis.run();

    let reset = analysis.subroutine(pc(0x8000)).unwrap();
    assert_eq!(reset.instructions().len(), 2);
    assert!(reset.unknown_state_changes().get(&pc(0x8000)).is_none());
}

#[test]
fn subroutine_assertions_replace_the_summary() {
    // reset: jsr $8006 ; jmp $8003
    // sub:   jmp ($8200)  -- unresolvable
    let mut analysis = analysis_with_code(&[
        0x20, 0x06, 0x80, // 0x8000 jsr $8006
        0x4C, 0x03, 0x80, // 0x8003 jmp $8003
        0x6C, 0x00, 0x82, // 0x8006 jmp ($8200)
    ]);
    analysis.run();

    // The callee's unknown summary pollutes the caller.
    let reset = analysis.subroutine(pc(0x8000)).unwrap();
    let change = reset.unknown_state_changes().get(&pc(0x8000)).unwrap();
    assert_eq!(change.unknown_reason, UnknownReason::Unknown);
    assert!(!reset.is_responsible_for_unknown());

    // Asserting the callee's return state unblocks the caller.
    analysis.assert_subroutine(pc(0x8006), pc(0x8006), StateChange::default());
    analysis.run();

    let callee = analysis.subroutine(pc(0x8006)).unwrap();
    assert!(!callee.has_unknown_state_change());
    assert!(callee
        .known_state_changes()
        .get(&pc(0x8006))
        .unwrap()
        .is_empty());

    let reset = analysis.subroutine(pc(0x8000)).unwrap();
    assert!(!reset.has_unknown_state_change());
}

#[test]
fn user_labels_survive_reruns() {
    let mut analysis = analysis_with_code(&[0x4C, 0x00, 0x80]);
    analysis.run();
    analysis.rename_label(pc(0x8000), "main_loop".to_string());
    analysis.run();

    assert_eq!(analysis.subroutine(pc(0x8000)).unwrap().label(), "main_loop");
    assert_eq!(analysis.get_label(pc(0x8000), None), Some("main_loop".to_string()));
}

#[test]
fn entry_points_survive_clear() {
    let mut analysis = analysis_with_code(&[0x4C, 0x00, 0x80]);
    analysis.add_entry_point("irq".to_string(), pc(0x9002), State::default());
    analysis.run();

    assert_eq!(analysis.subroutines().len(), 3);
    assert_eq!(analysis.subroutine(pc(0x9002)).unwrap().label(), "irq");

    analysis.run();
    assert_eq!(analysis.subroutines().len(), 3);
}

#[test]
fn every_member_belongs_to_its_subroutine() {
    let mut analysis = analysis_with_code(&[
        0x20, 0x0A, 0x80, // jsr $800A
        0xA9, 0x34, 0x12, // lda #$1234
        0xA2, 0x34, 0x12, // ldx #$1234
        0x60, // rts
        0xC2, 0x30, // rep #$30
        0x60, // rts
    ]);
    analysis.run();

    for (sub_pc, subroutine) in analysis.subroutines() {
        assert_eq!(*sub_pc, subroutine.pc());
        for (member_pc, member) in subroutine.instructions() {
            assert_eq!(member.subroutine_pc(), subroutine.pc());
            assert_eq!(*member_pc, member.pc());
        }
    }

    // Every reference source is a decoded instruction in the claimed
    // subroutine.
    for (source, reference_set) in analysis.references() {
        for reference in reference_set {
            let subroutine = analysis.subroutine(reference.subroutine_pc).unwrap();
            assert!(subroutine.instructions().contains_key(source));
        }
    }
}

#[test]
fn abstract_stack_round_trips() {
    use crate::analysis::{Stack, StackData};
    use crate::arch::Instruction;

    let pha = Instruction::new(pc(0x8000), pc(0x8000), 0x48, pc(0), State::default());
    let mut stack = Stack::new();

    stack.push(2, Some(pc(0x8123)), pha);
    assert!(stack.match_value(2, pc(0x8123)));
    assert!(!stack.match_value(2, pc(0x8124)));

    // Peeking does not disturb the pointer.
    assert_eq!(stack.peek(2).len(), 2);
    assert!(stack.match_value(2, pc(0x8123)));

    // The low byte pops first.
    let entries = stack.pop(2);
    assert_eq!(entries[0].data, StackData::Byte(0x23));
    assert_eq!(entries[1].data, StackData::Byte(0x81));

    // Popping a slot that was never written yields an empty entry.
    let empty = stack.pop_one();
    assert!(empty.instruction.is_none());
    assert_eq!(empty.data, StackData::Unknown);

    // TCS/TXS only leave a diagnostic trace behind.
    let tcs = Instruction::new(pc(0x8004), pc(0x8000), 0x1B, pc(0), State::default());
    stack.record_manipulation(tcs);
    assert_eq!(stack.last_manipulator().unwrap().pc(), pc(0x8004));
}

#[test]
fn abstract_stack_recovers_php_pairs() {
    use crate::analysis::{Stack, StackData};
    use crate::arch::Instruction;

    let php = Instruction::new(pc(0x8000), pc(0x8000), 0x08, pc(0), State::default());
    let mut stack = Stack::new();

    let change = StateChange::new(Some(false), None);
    stack.push_state(State::default(), change, php);

    let entry = stack.pop_one();
    assert_eq!(entry.instruction.unwrap().pc(), pc(0x8000));
    match entry.data {
        StackData::State(state, restored) => {
            assert_eq!(state, State::default());
            assert_eq!(restored, change);
        }
        _ => panic!("expected a state pair"),
    }
}

#[test]
fn assertions_and_jump_tables_can_be_withdrawn() {
    let mut analysis = analysis_with_code(&[0x00, 0x00, 0x60]);
    analysis.assert_instruction(pc(0x8000), StateChange::default());
    analysis.run();
    assert_eq!(
        analysis.subroutine(pc(0x8000)).unwrap().instructions().len(),
        2
    );

    // Withdrawing the assertion makes the interrupt terminal again.
    analysis.remove_assertion(pc(0x8000), pc(0x8000));
    analysis.run();
    assert_eq!(
        analysis.subroutine(pc(0x8000)).unwrap().instructions().len(),
        1
    );

    // An indirect jump's table can be dropped the same way.
    let mut analysis = analysis_with_code(&[0x6C, 0x00, 0x82]);
    analysis.run();
    assert!(analysis.jump_table(pc(0x8000)).is_some());
    analysis.undefine_jump_table(pc(0x8000));
    assert!(analysis.jump_table(pc(0x8000)).is_none());
}
