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

//! `BRK` and `RTI`. Hardware IRQ/NMI servicing lives in
//! [`super::super::Cpu::step`] since it happens outside instruction
//! dispatch; this module only covers the two opcodes that share its
//! stack layout.

use crate::core::addr::{AccessIntent, Addr};
use crate::core::cpu::{Cpu, Flags};
use crate::core::memory::MainBus;

impl Cpu {
    /// `BRK`: a software interrupt. Pushes `PC+1` (skipping the
    /// conventional signature byte), then `P` with `B` set, vectors
    /// through `$FFFE`, sets `I`, and clears `D` (a 65C02 correction
    /// over the NMOS 6502, which leaves `D` alone).
    pub(crate) fn op_brk(&mut self, bus: &mut MainBus) {
        let return_pc = self.regs.pc.wrapping_add(1);
        self.push16(bus, return_pc);
        let mut flags = self.regs.p;
        flags.insert(Flags::BREAK);
        flags.insert(Flags::UNUSED);
        self.push(bus, flags.bits());
        self.regs.p.insert(Flags::IRQ_DISABLE);
        self.regs.p.remove(Flags::DECIMAL);
        self.regs.pc = bus.read16(Addr(0xFFFE), AccessIntent::DebugRead);
    }

    /// `RTI`: pop `P` (forcing the always-1 `UNUSED` bit), then `PC`.
    pub(crate) fn op_rti(&mut self, bus: &mut MainBus) {
        let flags = self.pull(bus);
        self.regs.p = Flags::from_bits_truncate(flags) | Flags::UNUSED;
        self.regs.pc = self.pull16(bus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brk_vectors_through_fffe_and_sets_break_and_i() {
        let mut cpu = Cpu::new();
        let mut bus = MainBus::new();
        bus.load_system_rom(&[0; 0x3000]);
        bus.write8(Addr(0xFFFE), AccessIntent::DebugWrite, 0x00);
        bus.write8(Addr(0xFFFF), AccessIntent::DebugWrite, 0x30);
        cpu.regs.pc = 0x1000;
        cpu.regs.s = 0xFF;
        cpu.op_brk(&mut bus);
        assert_eq!(cpu.regs.pc, 0x3000);
        assert!(cpu.regs.p.contains(Flags::IRQ_DISABLE));
        assert!(!cpu.regs.p.contains(Flags::DECIMAL));
    }

    #[test]
    fn brk_then_rti_restores_pc_and_flags() {
        let mut cpu = Cpu::new();
        let mut bus = MainBus::new();
        bus.load_system_rom(&[0; 0x3000]);
        bus.write8(Addr(0xFFFE), AccessIntent::DebugWrite, 0x00);
        bus.write8(Addr(0xFFFF), AccessIntent::DebugWrite, 0x30);
        cpu.regs.pc = 0x1000;
        cpu.regs.s = 0xFF;
        cpu.regs.p.insert(Flags::CARRY);
        cpu.op_brk(&mut bus);
        cpu.op_rti(&mut bus);
        assert_eq!(cpu.regs.pc, 0x1001);
        assert!(cpu.regs.p.contains(Flags::CARRY));
        assert_eq!(cpu.regs.s, 0xFF);
    }
}
