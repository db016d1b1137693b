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

//! The WDC-added zero-page bit instructions: `RMBn`/`SMBn` (clear/set a
//! single bit, no flags affected) and `BBRn`/`BBSn` (branch on a single
//! bit's state). None of these existed on the NMOS 6502.

use crate::core::cpu::Cpu;

impl Cpu {
    pub(crate) fn op_rmb(&mut self, bit: u8, value: u8) -> u8 {
        value & !(1 << bit)
    }

    pub(crate) fn op_smb(&mut self, bit: u8, value: u8) -> u8 {
        value | (1 << bit)
    }

    /// `true` if `BBRn`/`BBSn` (given `is_set`) would take the branch for
    /// this zero-page `value`.
    pub(crate) fn bbx_taken(&self, bit: u8, value: u8, is_set: bool) -> bool {
        let set = value & (1 << bit) != 0;
        set == is_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rmb_clears_only_target_bit() {
        let cpu = Cpu::new();
        assert_eq!(cpu.op_rmb(3, 0xFF), 0xF7);
    }

    #[test]
    fn smb_sets_only_target_bit() {
        let cpu = Cpu::new();
        assert_eq!(cpu.op_smb(0, 0x00), 0x01);
    }

    #[test]
    fn bbr_taken_when_bit_clear() {
        let cpu = Cpu::new();
        assert!(cpu.bbx_taken(2, 0b0000_0000, false));
        assert!(!cpu.bbx_taken(2, 0b0000_0100, false));
    }

    #[test]
    fn bbs_taken_when_bit_set() {
        let cpu = Cpu::new();
        assert!(cpu.bbx_taken(2, 0b0000_0100, true));
        assert!(!cpu.bbx_taken(2, 0b0000_0000, true));
    }
}
