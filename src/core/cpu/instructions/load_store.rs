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

//! LDA/LDX/LDY and STA/STX/STY/STZ. Stores never touch the flags; loads
//! always update N and Z via [`Cpu::set_nz`].

use crate::core::cpu::Cpu;

impl Cpu {
    pub(crate) fn op_lda(&mut self, value: u8) {
        self.regs.a = value;
        self.set_nz(value);
    }

    pub(crate) fn op_ldx(&mut self, value: u8) {
        self.regs.x = value;
        self.set_nz(value);
    }

    pub(crate) fn op_ldy(&mut self, value: u8) {
        self.regs.y = value;
        self.set_nz(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cpu::Flags;

    #[test]
    fn lda_sets_zero_flag() {
        let mut cpu = Cpu::new();
        cpu.op_lda(0x00);
        assert_eq!(cpu.regs.a, 0x00);
        assert!(cpu.regs.p.contains(Flags::ZERO));
        assert!(!cpu.regs.p.contains(Flags::NEGATIVE));
    }

    #[test]
    fn ldx_sets_negative_flag() {
        let mut cpu = Cpu::new();
        cpu.op_ldx(0x80);
        assert_eq!(cpu.regs.x, 0x80);
        assert!(cpu.regs.p.contains(Flags::NEGATIVE));
        assert!(!cpu.regs.p.contains(Flags::ZERO));
    }

    #[test]
    fn ldy_loads_positive_value() {
        let mut cpu = Cpu::new();
        cpu.op_ldy(0x42);
        assert_eq!(cpu.regs.y, 0x42);
        assert!(!cpu.regs.p.contains(Flags::ZERO));
        assert!(!cpu.regs.p.contains(Flags::NEGATIVE));
    }
}
