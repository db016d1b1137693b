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

//! The single-flag-bit opcodes (CLC/SEC/CLI/SEI/CLV/CLD/SED) and the
//! two opcodes that stop the pipeline rather than touch it (`STP`,
//! `WAI`). `NOP` needs no helper at all.

use crate::core::cpu::{Cpu, Flags};

impl Cpu {
    pub(crate) fn op_clc(&mut self) {
        self.regs.p.remove(Flags::CARRY);
    }
    pub(crate) fn op_sec(&mut self) {
        self.regs.p.insert(Flags::CARRY);
    }
    pub(crate) fn op_cli(&mut self) {
        self.regs.p.remove(Flags::IRQ_DISABLE);
    }
    pub(crate) fn op_sei(&mut self) {
        self.regs.p.insert(Flags::IRQ_DISABLE);
    }
    pub(crate) fn op_clv(&mut self) {
        self.regs.p.remove(Flags::OVERFLOW);
    }
    pub(crate) fn op_cld(&mut self) {
        self.regs.p.remove(Flags::DECIMAL);
    }
    pub(crate) fn op_sed(&mut self) {
        self.regs.p.insert(Flags::DECIMAL);
    }

    /// `STP`: halt the pipeline until the next `reset()`.
    pub(crate) fn op_stp(&mut self) {
        self.halted = true;
        log::debug!("cpu: STP executed, halting");
    }

    /// `WAI`: suspend `step()` until an IRQ or NMI is serviced.
    pub(crate) fn op_wai(&mut self) {
        self.waiting = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clc_sec_toggle_carry() {
        let mut cpu = Cpu::new();
        cpu.op_sec();
        assert!(cpu.regs.p.contains(Flags::CARRY));
        cpu.op_clc();
        assert!(!cpu.regs.p.contains(Flags::CARRY));
    }

    #[test]
    fn sei_cli_toggle_irq_disable() {
        let mut cpu = Cpu::new();
        cpu.op_cli();
        assert!(!cpu.regs.p.contains(Flags::IRQ_DISABLE));
        cpu.op_sei();
        assert!(cpu.regs.p.contains(Flags::IRQ_DISABLE));
    }

    #[test]
    fn cld_sed_toggle_decimal() {
        let mut cpu = Cpu::new();
        cpu.op_sed();
        assert!(cpu.regs.p.contains(Flags::DECIMAL));
        cpu.op_cld();
        assert!(!cpu.regs.p.contains(Flags::DECIMAL));
    }

    #[test]
    fn clv_clears_overflow() {
        let mut cpu = Cpu::new();
        cpu.regs.p.insert(Flags::OVERFLOW);
        cpu.op_clv();
        assert!(!cpu.regs.p.contains(Flags::OVERFLOW));
    }

    #[test]
    fn stp_halts() {
        let mut cpu = Cpu::new();
        cpu.op_stp();
        assert!(cpu.halted);
    }
}
