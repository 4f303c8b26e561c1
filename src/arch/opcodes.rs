//! Static decoding tables for the 65C816 instruction set

/// Memory addressing modes.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum AddressMode {
    Implied,
    ImmediateM,
    ImmediateX,
    Immediate8,
    Relative,
    RelativeLong,
    DirectPage,
    DirectPageIndexedX,
    DirectPageIndexedY,
    DirectPageIndirect,
    DirectPageIndexedIndirect,
    DirectPageIndirectIndexed,
    DirectPageIndirectLong,
    DirectPageIndirectIndexedLong,
    Absolute,
    AbsoluteIndexedX,
    AbsoluteIndexedY,
    AbsoluteLong,
    AbsoluteIndexedLong,
    StackRelative,
    StackRelativeIndirectIndexed,
    AbsoluteIndirect,
    AbsoluteIndirectLong,
    AbsoluteIndexedIndirect,
    ImpliedAccumulator,
    Move,
    StackAbsolute,
    PeiDirectPageIndirect,
}

impl AddressMode {
    /// Operand width in bytes, or `None` when it depends on the state
    /// register (ImmediateM and ImmediateX).
    pub fn static_argument_size(self) -> Option<u32> {
        use AddressMode::*;

        match self {
            Implied | ImpliedAccumulator => Some(0),

            ImmediateM | ImmediateX => None,

            Immediate8 | Relative | DirectPage | DirectPageIndexedX | DirectPageIndexedY
            | DirectPageIndirect | DirectPageIndexedIndirect | DirectPageIndirectIndexed
            | DirectPageIndirectLong | DirectPageIndirectIndexedLong | StackRelative
            | StackRelativeIndirectIndexed | PeiDirectPageIndirect => Some(1),

            RelativeLong | Absolute | AbsoluteIndexedX | AbsoluteIndexedY | AbsoluteIndirect
            | AbsoluteIndirectLong | AbsoluteIndexedIndirect | Move | StackAbsolute => Some(2),

            AbsoluteLong | AbsoluteIndexedLong => Some(3),
        }
    }
}

/// 65C816 operations.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Op {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Bra,
    Brk,
    Brl,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cop,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jml,
    Jmp,
    Jsl,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Mvn,
    Mvp,
    Nop,
    Ora,
    Pea,
    Pei,
    Per,
    Pha,
    Phb,
    Phd,
    Phk,
    Php,
    Phx,
    Phy,
    Pla,
    Plb,
    Pld,
    Plp,
    Plx,
    Ply,
    Rep,
    Rol,
    Ror,
    Rti,
    Rtl,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sep,
    Sta,
    Stp,
    Stx,
    Sty,
    Stz,
    Tax,
    Tay,
    Tcd,
    Tcs,
    Tdc,
    Trb,
    Tsb,
    Tsc,
    Tsx,
    Txa,
    Txs,
    Txy,
    Tya,
    Tyx,
    Wai,
    Wdm,
    Xba,
    Xce,
}

impl Op {
    /// Canonical lowercase mnemonic for disassembly output.
    pub fn mnemonic(self) -> &'static str {
        use Op::*;

        match self {
            Adc => "adc",
            And => "and",
            Asl => "asl",
            Bcc => "bcc",
            Bcs => "bcs",
            Beq => "beq",
            Bit => "bit",
            Bmi => "bmi",
            Bne => "bne",
            Bpl => "bpl",
            Bra => "bra",
            Brk => "brk",
            Brl => "brl",
            Bvc => "bvc",
            Bvs => "bvs",
            Clc => "clc",
            Cld => "cld",
            Cli => "cli",
            Clv => "clv",
            Cmp => "cmp",
            Cop => "cop",
            Cpx => "cpx",
            Cpy => "cpy",
            Dec => "dec",
            Dex => "dex",
            Dey => "dey",
            Eor => "eor",
            Inc => "inc",
            Inx => "inx",
            Iny => "iny",
            Jml => "jml",
            Jmp => "jmp",
            Jsl => "jsl",
            Jsr => "jsr",
            Lda => "lda",
            Ldx => "ldx",
            Ldy => "ldy",
            Lsr => "lsr",
            Mvn => "mvn",
            Mvp => "mvp",
            Nop => "nop",
            Ora => "ora",
            Pea => "pea",
            Pei => "pei",
            Per => "per",
            Pha => "pha",
            Phb => "phb",
            Phd => "phd",
            Phk => "phk",
            Php => "php",
            Phx => "phx",
            Phy => "phy",
            Pla => "pla",
            Plb => "plb",
            Pld => "pld",
            Plp => "plp",
            Plx => "plx",
            Ply => "ply",
            Rep => "rep",
            Rol => "rol",
            Ror => "ror",
            Rti => "rti",
            Rtl => "rtl",
            Rts => "rts",
            Sbc => "sbc",
            Sec => "sec",
            Sed => "sed",
            Sei => "sei",
            Sep => "sep",
            Sta => "sta",
            Stp => "stp",
            Stx => "stx",
            Sty => "sty",
            Stz => "stz",
            Tax => "tax",
            Tay => "tay",
            Tcd => "tcd",
            Tcs => "tcs",
            Tdc => "tdc",
            Trb => "trb",
            Tsb => "tsb",
            Tsc => "tsc",
            Tsx => "tsx",
            Txa => "txa",
            Txs => "txs",
            Txy => "txy",
            Tya => "tya",
            Tyx => "tyx",
            Wai => "wai",
            Wdm => "wdm",
            Xba => "xba",
            Xce => "xce",
        }
    }
}

/// Every opcode byte decoded as an operation plus an addressing mode.
#[rustfmt::skip]
pub static OPCODE_TABLE: [(Op, AddressMode); 256] = {
    use AddressMode::*;
    use Op::*;

    [
        // 0x00
        (Brk, Immediate8),
        (Ora, DirectPageIndexedIndirect),
        (Cop, Immediate8),
        (Ora, StackRelative),
        (Tsb, DirectPage),
        (Ora, DirectPage),
        (Asl, DirectPage),
        (Ora, DirectPageIndirectLong),
        (Php, Implied),
        (Ora, ImmediateM),
        (Asl, ImpliedAccumulator),
        (Phd, Implied),
        (Tsb, Absolute),
        (Ora, Absolute),
        (Asl, Absolute),
        (Ora, AbsoluteLong),
        // 0x10
        (Bpl, Relative),
        (Ora, DirectPageIndirectIndexed),
        (Ora, DirectPageIndirect),
        (Ora, StackRelativeIndirectIndexed),
        (Trb, DirectPage),
        (Ora, DirectPageIndexedX),
        (Asl, DirectPageIndexedX),
        (Ora, DirectPageIndirectIndexedLong),
        (Clc, Implied),
        (Ora, AbsoluteIndexedY),
        (Inc, ImpliedAccumulator),
        (Tcs, Implied),
        (Trb, Absolute),
        (Ora, AbsoluteIndexedX),
        (Asl, AbsoluteIndexedX),
        (Ora, AbsoluteIndexedLong),
        // 0x20
        (Jsr, Absolute),
        (And, DirectPageIndexedIndirect),
        (Jsl, AbsoluteLong),
        (And, StackRelative),
        (Bit, DirectPage),
        (And, DirectPage),
        (Rol, DirectPage),
        (And, DirectPageIndirectLong),
        (Plp, Implied),
        (And, ImmediateM),
        (Rol, ImpliedAccumulator),
        (Pld, Implied),
        (Bit, Absolute),
        (And, Absolute),
        (Rol, Absolute),
        (And, AbsoluteLong),
        // 0x30
        (Bmi, Relative),
        (And, DirectPageIndirectIndexed),
        (And, DirectPageIndirect),
        (And, StackRelativeIndirectIndexed),
        (Bit, DirectPageIndexedX),
        (And, DirectPageIndexedX),
        (Rol, DirectPageIndexedX),
        (And, DirectPageIndirectIndexedLong),
        (Sec, Implied),
        (And, AbsoluteIndexedY),
        (Dec, ImpliedAccumulator),
        (Tsc, Implied),
        (Bit, AbsoluteIndexedX),
        (And, AbsoluteIndexedX),
        (Rol, AbsoluteIndexedX),
        (And, AbsoluteIndexedLong),
        // 0x40
        (Rti, Implied),
        (Eor, DirectPageIndexedIndirect),
        (Wdm, Immediate8),
        (Eor, StackRelative),
        (Mvp, Move),
        (Eor, DirectPage),
        (Lsr, DirectPage),
        (Eor, DirectPageIndirectLong),
        (Pha, Implied),
        (Eor, ImmediateM),
        (Lsr, ImpliedAccumulator),
        (Phk, Implied),
        (Jmp, Absolute),
        (Eor, Absolute),
        (Lsr, Absolute),
        (Eor, AbsoluteLong),
        // 0x50
        (Bvc, Relative),
        (Eor, DirectPageIndirectIndexed),
        (Eor, DirectPageIndirect),
        (Eor, StackRelativeIndirectIndexed),
        (Mvn, Move),
        (Eor, DirectPageIndexedX),
        (Lsr, DirectPageIndexedX),
        (Eor, DirectPageIndirectIndexedLong),
        (Cli, Implied),
        (Eor, AbsoluteIndexedY),
        (Phy, Implied),
        (Tcd, Implied),
        (Jml, AbsoluteLong),
        (Eor, AbsoluteIndexedX),
        (Lsr, AbsoluteIndexedX),
        (Eor, AbsoluteIndexedLong),
        // 0x60
        (Rts, Implied),
        (Adc, DirectPageIndexedIndirect),
        (Per, RelativeLong),
        (Adc, StackRelative),
        (Stz, DirectPage),
        (Adc, DirectPage),
        (Ror, DirectPage),
        (Adc, DirectPageIndirectLong),
        (Pla, Implied),
        (Adc, ImmediateM),
        (Ror, ImpliedAccumulator),
        (Rtl, Implied),
        (Jmp, AbsoluteIndirect),
        (Adc, Absolute),
        (Ror, Absolute),
        (Adc, AbsoluteLong),
        // 0x70
        (Bvs, Relative),
        (Adc, DirectPageIndirectIndexed),
        (Adc, DirectPageIndirect),
        (Adc, StackRelativeIndirectIndexed),
        (Stz, DirectPageIndexedX),
        (Adc, DirectPageIndexedX),
        (Ror, DirectPageIndexedX),
        (Adc, DirectPageIndirectIndexedLong),
        (Sei, Implied),
        (Adc, AbsoluteIndexedY),
        (Ply, Implied),
        (Tdc, Implied),
        (Jmp, AbsoluteIndexedIndirect),
        (Adc, AbsoluteIndexedX),
        (Ror, AbsoluteIndexedX),
        (Adc, AbsoluteIndexedLong),
        // 0x80
        (Bra, Relative),
        (Sta, DirectPageIndexedIndirect),
        (Brl, RelativeLong),
        (Sta, StackRelative),
        (Sty, DirectPage),
        (Sta, DirectPage),
        (Stx, DirectPage),
        (Sta, DirectPageIndirectLong),
        (Dey, Implied),
        (Bit, ImmediateM),
        (Txa, Implied),
        (Phb, Implied),
        (Sty, Absolute),
        (Sta, Absolute),
        (Stx, Absolute),
        (Sta, AbsoluteLong),
        // 0x90
        (Bcc, Relative),
        (Sta, DirectPageIndirectIndexed),
        (Sta, DirectPageIndirect),
        (Sta, StackRelativeIndirectIndexed),
        (Sty, DirectPageIndexedX),
        (Sta, DirectPageIndexedX),
        (Stx, DirectPageIndexedY),
        (Sta, DirectPageIndirectIndexedLong),
        (Tya, Implied),
        (Sta, AbsoluteIndexedY),
        (Txs, Implied),
        (Txy, Implied),
        (Stz, Absolute),
        (Sta, AbsoluteIndexedX),
        (Stz, AbsoluteIndexedX),
        (Sta, AbsoluteIndexedLong),
        // 0xA0
        (Ldy, ImmediateX),
        (Lda, DirectPageIndexedIndirect),
        (Ldx, ImmediateX),
        (Lda, StackRelative),
        (Ldy, DirectPage),
        (Lda, DirectPage),
        (Ldx, DirectPage),
        (Lda, DirectPageIndirectLong),
        (Tay, Implied),
        (Lda, ImmediateM),
        (Tax, Implied),
        (Plb, Implied),
        (Ldy, Absolute),
        (Lda, Absolute),
        (Ldx, Absolute),
        (Lda, AbsoluteLong),
        // 0xB0
        (Bcs, Relative),
        (Lda, DirectPageIndirectIndexed),
        (Lda, DirectPageIndirect),
        (Lda, StackRelativeIndirectIndexed),
        (Ldy, DirectPageIndexedX),
        (Lda, DirectPageIndexedX),
        (Ldx, DirectPageIndexedY),
        (Lda, DirectPageIndirectIndexedLong),
        (Clv, Implied),
        (Lda, AbsoluteIndexedY),
        (Tsx, Implied),
        (Tyx, Implied),
        (Ldy, AbsoluteIndexedX),
        (Lda, AbsoluteIndexedX),
        (Ldx, AbsoluteIndexedY),
        (Lda, AbsoluteIndexedLong),
        // 0xC0
        (Cpy, ImmediateX),
        (Cmp, DirectPageIndexedIndirect),
        (Rep, Immediate8),
        (Cmp, StackRelative),
        (Cpy, DirectPage),
        (Cmp, DirectPage),
        (Dec, DirectPage),
        (Cmp, DirectPageIndirectLong),
        (Iny, Implied),
        (Cmp, ImmediateM),
        (Dex, Implied),
        (Wai, Implied),
        (Cpy, Absolute),
        (Cmp, Absolute),
        (Dec, Absolute),
        (Cmp, AbsoluteLong),
        // 0xD0
        (Bne, Relative),
        (Cmp, DirectPageIndirectIndexed),
        (Cmp, DirectPageIndirect),
        (Cmp, StackRelativeIndirectIndexed),
        (Pei, PeiDirectPageIndirect),
        (Cmp, DirectPageIndexedX),
        (Dec, DirectPageIndexedX),
        (Cmp, DirectPageIndirectIndexedLong),
        (Cld, Implied),
        (Cmp, AbsoluteIndexedY),
        (Phx, Implied),
        (Stp, Implied),
        (Jml, AbsoluteIndirectLong),
        (Cmp, AbsoluteIndexedX),
        (Dec, AbsoluteIndexedX),
        (Cmp, AbsoluteIndexedLong),
        // 0xE0
        (Cpx, ImmediateX),
        (Sbc, DirectPageIndexedIndirect),
        (Sep, Immediate8),
        (Sbc, StackRelative),
        (Cpx, DirectPage),
        (Sbc, DirectPage),
        (Inc, DirectPage),
        (Sbc, DirectPageIndirectLong),
        (Inx, Implied),
        (Sbc, ImmediateM),
        (Nop, Implied),
        (Xba, Implied),
        (Cpx, Absolute),
        (Sbc, Absolute),
        (Inc, Absolute),
        (Sbc, AbsoluteLong),
        // 0xF0
        (Beq, Relative),
        (Sbc, DirectPageIndirectIndexed),
        (Sbc, DirectPageIndirect),
        (Sbc, StackRelativeIndirectIndexed),
        (Pea, StackAbsolute),
        (Sbc, DirectPageIndexedX),
        (Inc, DirectPageIndexedX),
        (Sbc, DirectPageIndirectIndexedLong),
        (Sed, Implied),
        (Sbc, AbsoluteIndexedY),
        (Plx, Implied),
        (Xce, Implied),
        (Jsr, AbsoluteIndexedIndirect),
        (Sbc, AbsoluteIndexedX),
        (Inc, AbsoluteIndexedX),
        (Sbc, AbsoluteIndexedLong),
    ]
};
