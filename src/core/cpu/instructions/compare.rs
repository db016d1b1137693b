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

//! CMP/CPX/CPY: all three compare a register against a value the same
//! way (a non-writeback subtraction), so a single helper serves all
//! three addressing-mode families.

use crate::core::cpu::{Cpu, Flags};

impl Cpu {
    pub(crate) fn op_compare(&mut self, register: u8, value: u8) {
        let result = register.wrapping_sub(value);
        self.regs.p.set(Flags::CARRY, register >= value);
        self.set_nz(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_sets_zero_and_carry() {
        let mut cpu = Cpu::new();
        cpu.op_compare(0x42, 0x42);
        assert!(cpu.regs.p.contains(Flags::ZERO));
        assert!(cpu.regs.p.contains(Flags::CARRY));
    }

    #[test]
    fn register_less_than_value_clears_carry() {
        let mut cpu = Cpu::new();
        cpu.op_compare(0x10, 0x20);
        assert!(!cpu.regs.p.contains(Flags::CARRY));
        assert!(!cpu.regs.p.contains(Flags::ZERO));
    }
}
