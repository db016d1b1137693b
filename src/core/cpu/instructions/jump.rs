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

//! JMP, JSR, and RTS. `BRK`/`RTI` live in [`super::exception`] since
//! they share machinery with interrupt servicing.

use crate::core::cpu::Cpu;
use crate::core::memory::MainBus;

impl Cpu {
    /// `JSR`: push the address of the last byte of the 3-byte `JSR`
    /// instruction (`return_pc - 1`), then jump to `target`.
    pub(crate) fn op_jsr(&mut self, bus: &mut MainBus, target: u16) {
        let return_minus_one = self.regs.pc.wrapping_sub(1);
        self.push16(bus, return_minus_one);
        self.regs.pc = target;
    }

    /// `RTS`: pop `return_pc - 1` and resume just past the call site.
    pub(crate) fn op_rts(&mut self, bus: &mut MainBus) {
        let popped = self.pull16(bus);
        self.regs.pc = popped.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsr_rts_round_trips_pc() {
        let mut cpu = Cpu::new();
        let mut bus = MainBus::new();
        cpu.regs.pc = 0x1003; // as if the 3-byte JSR has been fully fetched
        cpu.regs.s = 0xFF;
        cpu.op_jsr(&mut bus, 0x2000);
        assert_eq!(cpu.regs.pc, 0x2000);
        cpu.op_rts(&mut bus);
        assert_eq!(cpu.regs.pc, 0x1003);
        assert_eq!(cpu.regs.s, 0xFF);
    }
}
