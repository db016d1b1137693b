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

//! The conditional branches plus `BRA` (unconditional, 65C02-only).

use crate::core::cpu::{Cpu, Flags, Mnemonic};

impl Cpu {
    /// Whether `mnemonic` (one of the branch opcodes) would be taken
    /// given the current flags. `BRA` is always taken.
    pub(crate) fn branch_condition(&self, mnemonic: Mnemonic) -> bool {
        match mnemonic {
            Mnemonic::Bpl => !self.regs.p.contains(Flags::NEGATIVE),
            Mnemonic::Bmi => self.regs.p.contains(Flags::NEGATIVE),
            Mnemonic::Bvc => !self.regs.p.contains(Flags::OVERFLOW),
            Mnemonic::Bvs => self.regs.p.contains(Flags::OVERFLOW),
            Mnemonic::Bcc => !self.regs.p.contains(Flags::CARRY),
            Mnemonic::Bcs => self.regs.p.contains(Flags::CARRY),
            Mnemonic::Bne => !self.regs.p.contains(Flags::ZERO),
            Mnemonic::Beq => self.regs.p.contains(Flags::ZERO),
            Mnemonic::Bra => true,
            _ => unreachable!("branch_condition called with non-branch mnemonic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beq_follows_zero_flag() {
        let mut cpu = Cpu::new();
        cpu.regs.p.insert(Flags::ZERO);
        assert!(cpu.branch_condition(Mnemonic::Beq));
        assert!(!cpu.branch_condition(Mnemonic::Bne));
    }

    #[test]
    fn bra_always_taken() {
        let cpu = Cpu::new();
        assert!(cpu.branch_condition(Mnemonic::Bra));
    }
}
