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

//! A one-instruction-at-a-time text disassembler, built the way the
//! teacher formats MIPS instructions: opcode lookup first, then a
//! mnemonic-specific operand string. This module never touches a
//! [`super::super::memory::MainBus`] — it only reads the byte slice it
//! is handed — so calling it can never trip a trap or a soft switch.

use super::addressing::AddrMode;
use super::opcodes::{decode, Mnemonic};

/// The decoded text and byte length of one instruction starting at
/// `bytes[0]`. `bytes` must have enough trailing bytes for the widest
/// operand (`ZeroPageRelative` needs two); short slices are padded with
/// zero bytes for the disassembly text, matching how a ROM's final
/// instruction would read past the loaded image.
pub fn disassemble_one(bytes: &[u8]) -> (String, usize) {
    let opcode = bytes.first().copied().unwrap_or(0);
    let info = decode(opcode);
    let fetch = |idx: usize| -> u8 { bytes.get(idx).copied().unwrap_or(0) };

    let mnemonic_name = mnemonic_name(info.mnemonic);

    let (operand, len) = match info.mode {
        AddrMode::Implicit | AddrMode::Accumulator => (String::new(), 1),
        AddrMode::Immediate => (format!("#${:02X}", fetch(1)), 2),
        AddrMode::ZeroPage => (format!("${:02X}", fetch(1)), 2),
        AddrMode::ZeroPageX => (format!("${:02X},X", fetch(1)), 2),
        AddrMode::ZeroPageY => (format!("${:02X},Y", fetch(1)), 2),
        AddrMode::Absolute => (format!("${:02X}{:02X}", fetch(2), fetch(1)), 3),
        AddrMode::AbsoluteX => (format!("${:02X}{:02X},X", fetch(2), fetch(1)), 3),
        AddrMode::AbsoluteY => (format!("${:02X}{:02X},Y", fetch(2), fetch(1)), 3),
        AddrMode::Indirect => (format!("(${:02X}{:02X})", fetch(2), fetch(1)), 3),
        AddrMode::AbsoluteIndexedIndirect => {
            (format!("(${:02X}{:02X},X)", fetch(2), fetch(1)), 3)
        }
        AddrMode::IndirectX => (format!("(${:02X},X)", fetch(1)), 2),
        AddrMode::IndirectY => (format!("(${:02X}),Y", fetch(1)), 2),
        AddrMode::ZeroPageIndirect => (format!("(${:02X})", fetch(1)), 2),
        AddrMode::Relative => {
            let offset = fetch(1) as i8;
            (format!("*{:+}", offset as i32 + 2), 2)
        }
        AddrMode::ZeroPageRelative => {
            let offset = fetch(2) as i8;
            (
                format!("${:02X},*{:+}", fetch(1), offset as i32 + 3),
                3,
            )
        }
    };

    let text = if operand.is_empty() {
        mnemonic_name.to_string()
    } else {
        format!("{mnemonic_name} {operand}")
    };
    (text, len)
}

fn mnemonic_name(m: Mnemonic) -> &'static str {
    match m {
        Mnemonic::Lda => "LDA",
        Mnemonic::Ldx => "LDX",
        Mnemonic::Ldy => "LDY",
        Mnemonic::Sta => "STA",
        Mnemonic::Stx => "STX",
        Mnemonic::Sty => "STY",
        Mnemonic::Stz => "STZ",
        Mnemonic::Tax => "TAX",
        Mnemonic::Txa => "TXA",
        Mnemonic::Tay => "TAY",
        Mnemonic::Tya => "TYA",
        Mnemonic::Tsx => "TSX",
        Mnemonic::Txs => "TXS",
        Mnemonic::Pha => "PHA",
        Mnemonic::Pla => "PLA",
        Mnemonic::Php => "PHP",
        Mnemonic::Plp => "PLP",
        Mnemonic::Phx => "PHX",
        Mnemonic::Phy => "PHY",
        Mnemonic::Plx => "PLX",
        Mnemonic::Ply => "PLY",
        Mnemonic::And => "AND",
        Mnemonic::Ora => "ORA",
        Mnemonic::Eor => "EOR",
        Mnemonic::Adc => "ADC",
        Mnemonic::Sbc => "SBC",
        Mnemonic::Asl => "ASL",
        Mnemonic::Lsr => "LSR",
        Mnemonic::Rol => "ROL",
        Mnemonic::Ror => "ROR",
        Mnemonic::Inc => "INC",
        Mnemonic::Dec => "DEC",
        Mnemonic::Inx => "INX",
        Mnemonic::Dex => "DEX",
        Mnemonic::Iny => "INY",
        Mnemonic::Dey => "DEY",
        Mnemonic::Cmp => "CMP",
        Mnemonic::Cpx => "CPX",
        Mnemonic::Cpy => "CPY",
        Mnemonic::Bpl => "BPL",
        Mnemonic::Bmi => "BMI",
        Mnemonic::Bvc => "BVC",
        Mnemonic::Bvs => "BVS",
        Mnemonic::Bcc => "BCC",
        Mnemonic::Bcs => "BCS",
        Mnemonic::Bne => "BNE",
        Mnemonic::Beq => "BEQ",
        Mnemonic::Bra => "BRA",
        Mnemonic::Jmp => "JMP",
        Mnemonic::Jsr => "JSR",
        Mnemonic::Rts => "RTS",
        Mnemonic::Rti => "RTI",
        Mnemonic::Bit => "BIT",
        Mnemonic::Trb => "TRB",
        Mnemonic::Tsb => "TSB",
        Mnemonic::Clc => "CLC",
        Mnemonic::Sec => "SEC",
        Mnemonic::Cli => "CLI",
        Mnemonic::Sei => "SEI",
        Mnemonic::Clv => "CLV",
        Mnemonic::Cld => "CLD",
        Mnemonic::Sed => "SED",
        Mnemonic::Nop => "NOP",
        Mnemonic::Brk => "BRK",
        Mnemonic::Stp => "STP",
        Mnemonic::Wai => "WAI",
        Mnemonic::Rmb(0) => "RMB0",
        Mnemonic::Rmb(1) => "RMB1",
        Mnemonic::Rmb(2) => "RMB2",
        Mnemonic::Rmb(3) => "RMB3",
        Mnemonic::Rmb(4) => "RMB4",
        Mnemonic::Rmb(5) => "RMB5",
        Mnemonic::Rmb(6) => "RMB6",
        Mnemonic::Rmb(_) => "RMB7",
        Mnemonic::Smb(0) => "SMB0",
        Mnemonic::Smb(1) => "SMB1",
        Mnemonic::Smb(2) => "SMB2",
        Mnemonic::Smb(3) => "SMB3",
        Mnemonic::Smb(4) => "SMB4",
        Mnemonic::Smb(5) => "SMB5",
        Mnemonic::Smb(6) => "SMB6",
        Mnemonic::Smb(_) => "SMB7",
        Mnemonic::Bbr(0) => "BBR0",
        Mnemonic::Bbr(1) => "BBR1",
        Mnemonic::Bbr(2) => "BBR2",
        Mnemonic::Bbr(3) => "BBR3",
        Mnemonic::Bbr(4) => "BBR4",
        Mnemonic::Bbr(5) => "BBR5",
        Mnemonic::Bbr(6) => "BBR6",
        Mnemonic::Bbr(_) => "BBR7",
        Mnemonic::Bbs(0) => "BBS0",
        Mnemonic::Bbs(1) => "BBS1",
        Mnemonic::Bbs(2) => "BBS2",
        Mnemonic::Bbs(3) => "BBS3",
        Mnemonic::Bbs(4) => "BBS4",
        Mnemonic::Bbs(5) => "BBS5",
        Mnemonic::Bbs(6) => "BBS6",
        Mnemonic::Bbs(_) => "BBS7",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_load_formats_operand() {
        let (text, len) = disassemble_one(&[0xA9, 0x42]);
        assert_eq!(text, "LDA #$42");
        assert_eq!(len, 2);
    }

    #[test]
    fn absolute_jump_reads_little_endian_operand() {
        let (text, len) = disassemble_one(&[0x4C, 0x00, 0xC0]);
        assert_eq!(text, "JMP $C000");
        assert_eq!(len, 3);
    }

    #[test]
    fn implicit_instruction_has_no_operand() {
        let (text, len) = disassemble_one(&[0xEA]);
        assert_eq!(text, "NOP");
        assert_eq!(len, 1);
    }

    #[test]
    fn bit_opcode_names_the_bit_number() {
        let (text, _) = disassemble_one(&[0x07, 0x10]);
        assert_eq!(text, "RMB0 $10");
    }

    #[test]
    fn short_trailing_slice_pads_with_zero() {
        let (text, len) = disassemble_one(&[0xAD]);
        assert_eq!(text, "LDA $0000");
        assert_eq!(len, 3);
    }
}
