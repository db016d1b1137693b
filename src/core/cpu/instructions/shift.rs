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

//! ASL/LSR/ROL/ROR and INC/DEC, shared between the accumulator form and
//! the memory read-modify-write forms by taking/returning a plain `u8`;
//! the caller in [`super::super::dispatch`] decides where that byte
//! comes from and goes back to.

use crate::core::cpu::{Cpu, Flags};

impl Cpu {
    pub(crate) fn op_asl(&mut self, value: u8) -> u8 {
        self.regs.p.set(Flags::CARRY, value & 0x80 != 0);
        let result = value << 1;
        self.set_nz(result);
        result
    }

    pub(crate) fn op_lsr(&mut self, value: u8) -> u8 {
        self.regs.p.set(Flags::CARRY, value & 0x01 != 0);
        let result = value >> 1;
        self.set_nz(result);
        result
    }

    pub(crate) fn op_rol(&mut self, value: u8) -> u8 {
        let carry_in = if self.regs.p.contains(Flags::CARRY) { 1 } else { 0 };
        self.regs.p.set(Flags::CARRY, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.set_nz(result);
        result
    }

    pub(crate) fn op_ror(&mut self, value: u8) -> u8 {
        let carry_in = if self.regs.p.contains(Flags::CARRY) { 0x80 } else { 0 };
        self.regs.p.set(Flags::CARRY, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.set_nz(result);
        result
    }

    pub(crate) fn op_inc(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_nz(result);
        result
    }

    pub(crate) fn op_dec(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_nz(result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asl_sets_carry_from_bit7() {
        let mut cpu = Cpu::new();
        assert_eq!(cpu.op_asl(0x80), 0x00);
        assert!(cpu.regs.p.contains(Flags::CARRY));
        assert!(cpu.regs.p.contains(Flags::ZERO));
    }

    #[test]
    fn ror_shifts_carry_into_bit7() {
        let mut cpu = Cpu::new();
        cpu.regs.p.insert(Flags::CARRY);
        assert_eq!(cpu.op_ror(0x00), 0x80);
        assert!(!cpu.regs.p.contains(Flags::CARRY));
        assert!(cpu.regs.p.contains(Flags::NEGATIVE));
    }

    #[test]
    fn inc_dec_wrap() {
        let mut cpu = Cpu::new();
        assert_eq!(cpu.op_inc(0xFF), 0x00);
        assert!(cpu.regs.p.contains(Flags::ZERO));
        assert_eq!(cpu.op_dec(0x00), 0xFF);
        assert!(cpu.regs.p.contains(Flags::NEGATIVE));
    }
}
