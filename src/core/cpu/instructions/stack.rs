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

//! Register transfers (TAX/TXA/...) and the stack push/pull opcodes
//! (PHA/PLA/PHP/PLP/PHX/PHY/PLX/PLY). `TXS` is the one transfer that
//! does not touch N/Z: it is purely a stack-pointer assignment.

use crate::core::cpu::{Cpu, Flags};
use crate::core::memory::MainBus;

impl Cpu {
    pub(crate) fn op_tax(&mut self) {
        self.regs.x = self.regs.a;
        let x = self.regs.x;
        self.set_nz(x);
    }

    pub(crate) fn op_txa(&mut self) {
        self.regs.a = self.regs.x;
        let a = self.regs.a;
        self.set_nz(a);
    }

    pub(crate) fn op_tay(&mut self) {
        self.regs.y = self.regs.a;
        let y = self.regs.y;
        self.set_nz(y);
    }

    pub(crate) fn op_tya(&mut self) {
        self.regs.a = self.regs.y;
        let a = self.regs.a;
        self.set_nz(a);
    }

    pub(crate) fn op_tsx(&mut self) {
        self.regs.x = self.regs.s;
        let x = self.regs.x;
        self.set_nz(x);
    }

    pub(crate) fn op_txs(&mut self) {
        self.regs.s = self.regs.x;
    }

    pub(crate) fn op_pha(&mut self, bus: &mut MainBus) {
        let a = self.regs.a;
        self.push(bus, a);
    }

    pub(crate) fn op_pla(&mut self, bus: &mut MainBus) {
        let value = self.pull(bus);
        self.regs.a = value;
        self.set_nz(value);
    }

    pub(crate) fn op_phx(&mut self, bus: &mut MainBus) {
        let x = self.regs.x;
        self.push(bus, x);
    }

    pub(crate) fn op_plx(&mut self, bus: &mut MainBus) {
        let value = self.pull(bus);
        self.regs.x = value;
        self.set_nz(value);
    }

    pub(crate) fn op_phy(&mut self, bus: &mut MainBus) {
        let y = self.regs.y;
        self.push(bus, y);
    }

    pub(crate) fn op_ply(&mut self, bus: &mut MainBus) {
        let value = self.pull(bus);
        self.regs.y = value;
        self.set_nz(value);
    }

    /// `PHP` pushes `P` with `B` and the always-1 bit set, matching what
    /// a hardware interrupt would push (`spec.md` §4.9).
    pub(crate) fn op_php(&mut self, bus: &mut MainBus) {
        let mut flags = self.regs.p;
        flags.insert(Flags::BREAK);
        flags.insert(Flags::UNUSED);
        self.push(bus, flags.bits());
    }

    pub(crate) fn op_plp(&mut self, bus: &mut MainBus) {
        let value = self.pull(bus);
        self.regs.p = Flags::from_bits_truncate(value) | Flags::UNUSED;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::MainBus;

    #[test]
    fn pha_pla_round_trips() {
        let mut cpu = Cpu::new();
        let mut bus = MainBus::new();
        cpu.regs.a = 0x42;
        cpu.op_pha(&mut bus);
        cpu.regs.a = 0x00;
        cpu.op_pla(&mut bus);
        assert_eq!(cpu.regs.a, 0x42);
    }

    #[test]
    fn txs_does_not_touch_flags() {
        let mut cpu = Cpu::new();
        cpu.regs.p = Flags::UNUSED;
        cpu.regs.x = 0x00;
        cpu.op_txs();
        assert_eq!(cpu.regs.p, Flags::UNUSED);
    }
}
