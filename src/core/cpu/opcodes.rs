// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The 65C02 opcode table: one entry per byte value, naming the
//! mnemonic, addressing mode, and documented base cycle count.
//!
//! [`decode`] is consulted exactly once per instruction, in
//! [`super::Cpu::step`]. It never touches the bus; it only classifies
//! the opcode byte already fetched there.

use super::addressing::AddrMode;

/// Every documented 65C02 operation. Several WDC-added bit operations
/// are parameterized by bit number (0-7) rather than given 32 separate
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Lda,
    Ldx,
    Ldy,
    Sta,
    Stx,
    Sty,
    Stz,
    Tax,
    Txa,
    Tay,
    Tya,
    Tsx,
    Txs,
    Pha,
    Pla,
    Php,
    Plp,
    Phx,
    Phy,
    Plx,
    Ply,
    And,
    Ora,
    Eor,
    Adc,
    Sbc,
    Asl,
    Lsr,
    Rol,
    Ror,
    Inc,
    Dec,
    Inx,
    Dex,
    Iny,
    Dey,
    Cmp,
    Cpx,
    Cpy,
    Bpl,
    Bmi,
    Bvc,
    Bvs,
    Bcc,
    Bcs,
    Bne,
    Beq,
    Bra,
    Jmp,
    Jsr,
    Rts,
    Rti,
    Bit,
    Trb,
    Tsb,
    Clc,
    Sec,
    Cli,
    Sei,
    Clv,
    Cld,
    Sed,
    Nop,
    Brk,
    Stp,
    Wai,
    /// Reset bit `n` of a zero-page operand.
    Rmb(u8),
    /// Set bit `n` of a zero-page operand.
    Smb(u8),
    /// Branch if bit `n` of a zero-page operand is clear.
    Bbr(u8),
    /// Branch if bit `n` of a zero-page operand is set.
    Bbs(u8),
}

#[derive(Debug, Clone, Copy)]
pub struct OpcodeInfo {
    pub mnemonic: Mnemonic,
    pub mode: AddrMode,
    pub cycles: u8,
}

const fn op(mnemonic: Mnemonic, mode: AddrMode, cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        cycles,
    }
}

/// Classify opcode byte `code` into its mnemonic, addressing mode, and
/// documented base cycle count (before any page-cross or branch-taken
/// penalty, which [`super::Cpu::step`] adds separately).
///
/// Every one of the 256 byte values is assigned: undocumented 6502
/// holes are WDC-reserved no-ops on the 65C02, so they decode here as
/// [`Mnemonic::Nop`] with a 2-cycle implied form rather than anything
/// "illegal" (`spec.md` §7).
pub fn decode(code: u8) -> OpcodeInfo {
    use AddrMode::*;
    use Mnemonic::*;

    match code {
        // --- Loads ---
        0xA9 => op(Lda, Immediate, 2),
        0xA5 => op(Lda, ZeroPage, 3),
        0xB5 => op(Lda, ZeroPageX, 4),
        0xAD => op(Lda, Absolute, 4),
        0xBD => op(Lda, AbsoluteX, 4),
        0xB9 => op(Lda, AbsoluteY, 4),
        0xA1 => op(Lda, IndirectX, 6),
        0xB1 => op(Lda, IndirectY, 5),
        0xB2 => op(Lda, ZeroPageIndirect, 5),

        0xA2 => op(Ldx, Immediate, 2),
        0xA6 => op(Ldx, ZeroPage, 3),
        0xB6 => op(Ldx, ZeroPageY, 4),
        0xAE => op(Ldx, Absolute, 4),
        0xBE => op(Ldx, AbsoluteY, 4),

        0xA0 => op(Ldy, Immediate, 2),
        0xA4 => op(Ldy, ZeroPage, 3),
        0xB4 => op(Ldy, ZeroPageX, 4),
        0xAC => op(Ldy, Absolute, 4),
        0xBC => op(Ldy, AbsoluteX, 4),

        // --- Stores ---
        0x85 => op(Sta, ZeroPage, 3),
        0x95 => op(Sta, ZeroPageX, 4),
        0x8D => op(Sta, Absolute, 4),
        0x9D => op(Sta, AbsoluteX, 5),
        0x99 => op(Sta, AbsoluteY, 5),
        0x81 => op(Sta, IndirectX, 6),
        0x91 => op(Sta, IndirectY, 6),
        0x92 => op(Sta, ZeroPageIndirect, 5),

        0x86 => op(Stx, ZeroPage, 3),
        0x96 => op(Stx, ZeroPageY, 4),
        0x8E => op(Stx, Absolute, 4),

        0x84 => op(Sty, ZeroPage, 3),
        0x94 => op(Sty, ZeroPageX, 4),
        0x8C => op(Sty, Absolute, 4),

        0x64 => op(Stz, ZeroPage, 3),
        0x74 => op(Stz, ZeroPageX, 4),
        0x9C => op(Stz, Absolute, 4),
        0x9E => op(Stz, AbsoluteX, 5),

        // --- Transfers ---
        0xAA => op(Tax, Implicit, 2),
        0x8A => op(Txa, Implicit, 2),
        0xA8 => op(Tay, Implicit, 2),
        0x98 => op(Tya, Implicit, 2),
        0xBA => op(Tsx, Implicit, 2),
        0x9A => op(Txs, Implicit, 2),

        // --- Stack ---
        0x48 => op(Pha, Implicit, 3),
        0x68 => op(Pla, Implicit, 4),
        0x08 => op(Php, Implicit, 3),
        0x28 => op(Plp, Implicit, 4),
        0xDA => op(Phx, Implicit, 3),
        0x5A => op(Phy, Implicit, 3),
        0xFA => op(Plx, Implicit, 4),
        0x7A => op(Ply, Implicit, 4),

        // --- Logic ---
        0x29 => op(And, Immediate, 2),
        0x25 => op(And, ZeroPage, 3),
        0x35 => op(And, ZeroPageX, 4),
        0x2D => op(And, Absolute, 4),
        0x3D => op(And, AbsoluteX, 4),
        0x39 => op(And, AbsoluteY, 4),
        0x21 => op(And, IndirectX, 6),
        0x31 => op(And, IndirectY, 5),
        0x32 => op(And, ZeroPageIndirect, 5),

        0x09 => op(Ora, Immediate, 2),
        0x05 => op(Ora, ZeroPage, 3),
        0x15 => op(Ora, ZeroPageX, 4),
        0x0D => op(Ora, Absolute, 4),
        0x1D => op(Ora, AbsoluteX, 4),
        0x19 => op(Ora, AbsoluteY, 4),
        0x01 => op(Ora, IndirectX, 6),
        0x11 => op(Ora, IndirectY, 5),
        0x12 => op(Ora, ZeroPageIndirect, 5),

        0x49 => op(Eor, Immediate, 2),
        0x45 => op(Eor, ZeroPage, 3),
        0x55 => op(Eor, ZeroPageX, 4),
        0x4D => op(Eor, Absolute, 4),
        0x5D => op(Eor, AbsoluteX, 4),
        0x59 => op(Eor, AbsoluteY, 4),
        0x41 => op(Eor, IndirectX, 6),
        0x51 => op(Eor, IndirectY, 5),
        0x52 => op(Eor, ZeroPageIndirect, 5),

        // --- Arithmetic ---
        0x69 => op(Adc, Immediate, 2),
        0x65 => op(Adc, ZeroPage, 3),
        0x75 => op(Adc, ZeroPageX, 4),
        0x6D => op(Adc, Absolute, 4),
        0x7D => op(Adc, AbsoluteX, 4),
        0x79 => op(Adc, AbsoluteY, 4),
        0x61 => op(Adc, IndirectX, 6),
        0x71 => op(Adc, IndirectY, 5),
        0x72 => op(Adc, ZeroPageIndirect, 5),

        0xE9 => op(Sbc, Immediate, 2),
        0xE5 => op(Sbc, ZeroPage, 3),
        0xF5 => op(Sbc, ZeroPageX, 4),
        0xED => op(Sbc, Absolute, 4),
        0xFD => op(Sbc, AbsoluteX, 4),
        0xF9 => op(Sbc, AbsoluteY, 4),
        0xE1 => op(Sbc, IndirectX, 6),
        0xF1 => op(Sbc, IndirectY, 5),
        0xF2 => op(Sbc, ZeroPageIndirect, 5),

        // --- Shifts / rotates ---
        0x0A => op(Asl, Accumulator, 2),
        0x06 => op(Asl, ZeroPage, 5),
        0x16 => op(Asl, ZeroPageX, 6),
        0x0E => op(Asl, Absolute, 6),
        0x1E => op(Asl, AbsoluteX, 6),

        0x4A => op(Lsr, Accumulator, 2),
        0x46 => op(Lsr, ZeroPage, 5),
        0x56 => op(Lsr, ZeroPageX, 6),
        0x4E => op(Lsr, Absolute, 6),
        0x5E => op(Lsr, AbsoluteX, 6),

        0x2A => op(Rol, Accumulator, 2),
        0x26 => op(Rol, ZeroPage, 5),
        0x36 => op(Rol, ZeroPageX, 6),
        0x2E => op(Rol, Absolute, 6),
        0x3E => op(Rol, AbsoluteX, 6),

        0x6A => op(Ror, Accumulator, 2),
        0x66 => op(Ror, ZeroPage, 5),
        0x76 => op(Ror, ZeroPageX, 6),
        0x6E => op(Ror, Absolute, 6),
        0x7E => op(Ror, AbsoluteX, 6),

        // --- Increment / decrement ---
        0x1A => op(Inc, Accumulator, 2),
        0xE6 => op(Inc, ZeroPage, 5),
        0xF6 => op(Inc, ZeroPageX, 6),
        0xEE => op(Inc, Absolute, 6),
        0xFE => op(Inc, AbsoluteX, 6),

        0x3A => op(Dec, Accumulator, 2),
        0xC6 => op(Dec, ZeroPage, 5),
        0xD6 => op(Dec, ZeroPageX, 6),
        0xCE => op(Dec, Absolute, 6),
        0xDE => op(Dec, AbsoluteX, 6),

        0xE8 => op(Inx, Implicit, 2),
        0xCA => op(Dex, Implicit, 2),
        0xC8 => op(Iny, Implicit, 2),
        0x88 => op(Dey, Implicit, 2),

        // --- Compare ---
        0xC9 => op(Cmp, Immediate, 2),
        0xC5 => op(Cmp, ZeroPage, 3),
        0xD5 => op(Cmp, ZeroPageX, 4),
        0xCD => op(Cmp, Absolute, 4),
        0xDD => op(Cmp, AbsoluteX, 4),
        0xD9 => op(Cmp, AbsoluteY, 4),
        0xC1 => op(Cmp, IndirectX, 6),
        0xD1 => op(Cmp, IndirectY, 5),
        0xD2 => op(Cmp, ZeroPageIndirect, 5),

        0xE0 => op(Cpx, Immediate, 2),
        0xE4 => op(Cpx, ZeroPage, 3),
        0xEC => op(Cpx, Absolute, 4),

        0xC0 => op(Cpy, Immediate, 2),
        0xC4 => op(Cpy, ZeroPage, 3),
        0xCC => op(Cpy, Absolute, 4),

        // --- Branches ---
        0x10 => op(Bpl, Relative, 2),
        0x30 => op(Bmi, Relative, 2),
        0x50 => op(Bvc, Relative, 2),
        0x70 => op(Bvs, Relative, 2),
        0x90 => op(Bcc, Relative, 2),
        0xB0 => op(Bcs, Relative, 2),
        0xD0 => op(Bne, Relative, 2),
        0xF0 => op(Beq, Relative, 2),
        0x80 => op(Bra, Relative, 3),

        // --- Jumps / calls ---
        0x4C => op(Jmp, Absolute, 3),
        0x6C => op(Jmp, Indirect, 6),
        0x7C => op(Jmp, AbsoluteIndexedIndirect, 6),
        0x20 => op(Jsr, Absolute, 6),
        0x60 => op(Rts, Implicit, 6),
        0x40 => op(Rti, Implicit, 6),

        // --- BIT / TRB / TSB ---
        0x89 => op(Bit, Immediate, 2),
        0x24 => op(Bit, ZeroPage, 3),
        0x34 => op(Bit, ZeroPageX, 4),
        0x2C => op(Bit, Absolute, 4),
        0x3C => op(Bit, AbsoluteX, 4),

        0x14 => op(Trb, ZeroPage, 5),
        0x1C => op(Trb, Absolute, 6),
        0x04 => op(Tsb, ZeroPage, 5),
        0x0C => op(Tsb, Absolute, 6),

        // --- Flags ---
        0x18 => op(Clc, Implicit, 2),
        0x38 => op(Sec, Implicit, 2),
        0x58 => op(Cli, Implicit, 2),
        0x78 => op(Sei, Implicit, 2),
        0xB8 => op(Clv, Implicit, 2),
        0xD8 => op(Cld, Implicit, 2),
        0xF8 => op(Sed, Implicit, 2),

        // --- Misc ---
        0xEA => op(Nop, Implicit, 2),
        0x00 => op(Brk, Implicit, 7),
        0xDB => op(Stp, Implicit, 3),
        0xCB => op(Wai, Implicit, 3),

        // --- RMBn / SMBn (zero page bit twiddling) ---
        0x07 => op(Rmb(0), ZeroPage, 5),
        0x17 => op(Rmb(1), ZeroPage, 5),
        0x27 => op(Rmb(2), ZeroPage, 5),
        0x37 => op(Rmb(3), ZeroPage, 5),
        0x47 => op(Rmb(4), ZeroPage, 5),
        0x57 => op(Rmb(5), ZeroPage, 5),
        0x67 => op(Rmb(6), ZeroPage, 5),
        0x77 => op(Rmb(7), ZeroPage, 5),
        0x87 => op(Smb(0), ZeroPage, 5),
        0x97 => op(Smb(1), ZeroPage, 5),
        0xA7 => op(Smb(2), ZeroPage, 5),
        0xB7 => op(Smb(3), ZeroPage, 5),
        0xC7 => op(Smb(4), ZeroPage, 5),
        0xD7 => op(Smb(5), ZeroPage, 5),
        0xE7 => op(Smb(6), ZeroPage, 5),
        0xF7 => op(Smb(7), ZeroPage, 5),

        // --- BBRn / BBSn ---
        0x0F => op(Bbr(0), ZeroPageRelative, 5),
        0x1F => op(Bbr(1), ZeroPageRelative, 5),
        0x2F => op(Bbr(2), ZeroPageRelative, 5),
        0x3F => op(Bbr(3), ZeroPageRelative, 5),
        0x4F => op(Bbr(4), ZeroPageRelative, 5),
        0x5F => op(Bbr(5), ZeroPageRelative, 5),
        0x6F => op(Bbr(6), ZeroPageRelative, 5),
        0x7F => op(Bbr(7), ZeroPageRelative, 5),
        0x8F => op(Bbs(0), ZeroPageRelative, 5),
        0x9F => op(Bbs(1), ZeroPageRelative, 5),
        0xAF => op(Bbs(2), ZeroPageRelative, 5),
        0xBF => op(Bbs(3), ZeroPageRelative, 5),
        0xCF => op(Bbs(4), ZeroPageRelative, 5),
        0xDF => op(Bbs(5), ZeroPageRelative, 5),
        0xEF => op(Bbs(6), ZeroPageRelative, 5),
        0xFF => op(Bbs(7), ZeroPageRelative, 5),

        // --- WDC-reserved fillers: documented as no-ops, not "illegal" ---
        _ => op(Nop, Implicit, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_opcode_decodes() {
        for code in 0u16..=255 {
            let _ = decode(code as u8);
        }
    }

    #[test]
    fn known_opcodes_match_datasheet() {
        assert_eq!(decode(0xA9).mnemonic, Mnemonic::Lda);
        assert_eq!(decode(0xA9).cycles, 2);
        assert_eq!(decode(0x6C).mode, AddrMode::Indirect);
        assert_eq!(decode(0x80).mnemonic, Mnemonic::Bra);
    }

    #[test]
    fn bbr_bbs_bit_numbers_decode() {
        assert_eq!(decode(0x0F).mnemonic, Mnemonic::Bbr(0));
        assert_eq!(decode(0xFF).mnemonic, Mnemonic::Bbs(7));
    }
}
