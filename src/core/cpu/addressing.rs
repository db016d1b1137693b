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

//! The 65C02's addressing modes.
//!
//! Every mode resolves to a 16-bit effective address, even `Immediate`
//! (whose "address" is simply the operand byte's own location, one past
//! the opcode). `Implicit` and `Accumulator` never touch the bus and are
//! handled directly by the instruction that uses them rather than by
//! [`Cpu::effective_address`].

use super::Cpu;
use crate::core::addr::{AccessIntent, Addr};
use crate::core::memory::MainBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    Implicit,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    ZeroPageIndirect,
    Relative,
    AbsoluteIndexedIndirect,
    /// BBRn/BBSn: a zero-page operand followed by a branch displacement.
    ZeroPageRelative,
}

/// Whether `a` and `b` fall on different 256-byte pages (an extra-cycle
/// penalty for indexed and branch addressing on the 65C02).
#[inline(always)]
fn page_crossed(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}

impl Cpu {
    #[inline(always)]
    pub(super) fn fetch8(&mut self, bus: &mut MainBus) -> u8 {
        let v = bus.read8(Addr(self.regs.pc as u32), AccessIntent::Execute);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        v
    }

    #[inline(always)]
    pub(super) fn fetch16(&mut self, bus: &mut MainBus) -> u16 {
        let lo = self.fetch8(bus) as u16;
        let hi = self.fetch8(bus) as u16;
        (hi << 8) | lo
    }

    /// Resolve `mode`'s operand to a 16-bit effective address, consuming
    /// whatever operand bytes follow the opcode from the bus. Returns
    /// the address and whether resolving it crossed a page boundary
    /// (only `AbsoluteX`/`AbsoluteY`/`IndirectY`/`Relative` ever report
    /// `true`; the 65C02 charges one extra cycle for those, unlike the
    /// NMOS 6502 which also penalizes a few non-indexed cases).
    pub(super) fn effective_address(&mut self, bus: &mut MainBus, mode: AddrMode) -> (u16, bool) {
        match mode {
            AddrMode::Implicit | AddrMode::Accumulator => (0, false),
            AddrMode::Immediate | AddrMode::Relative => {
                let a = self.regs.pc;
                self.regs.pc = self.regs.pc.wrapping_add(1);
                (a, false)
            }
            AddrMode::ZeroPage => (self.fetch8(bus) as u16, false),
            AddrMode::ZeroPageX => {
                (self.fetch8(bus).wrapping_add(self.regs.x) as u16, false)
            }
            AddrMode::ZeroPageY => {
                (self.fetch8(bus).wrapping_add(self.regs.y) as u16, false)
            }
            AddrMode::Absolute => (self.fetch16(bus), false),
            AddrMode::AbsoluteX => {
                let base = self.fetch16(bus);
                let addr = base.wrapping_add(self.regs.x as u16);
                (addr, page_crossed(base, addr))
            }
            AddrMode::AbsoluteY => {
                let base = self.fetch16(bus);
                let addr = base.wrapping_add(self.regs.y as u16);
                (addr, page_crossed(base, addr))
            }
            AddrMode::Indirect => {
                // 65C02 fixes the NMOS page-wrap bug: the high byte is
                // read from ptr+1 even when ptr is the last byte of a
                // page, at the cost of one extra cycle (folded into the
                // opcode's documented base count).
                let ptr = self.fetch16(bus);
                let lo = bus.read8(Addr(ptr as u32), AccessIntent::Read) as u16;
                let hi = bus.read8(Addr(ptr.wrapping_add(1) as u32), AccessIntent::Read) as u16;
                ((hi << 8) | lo, false)
            }
            AddrMode::IndirectX => {
                let zp = self.fetch8(bus).wrapping_add(self.regs.x);
                let lo = bus.read8(Addr(zp as u32), AccessIntent::Read) as u16;
                let hi = bus.read8(Addr(zp.wrapping_add(1) as u32), AccessIntent::Read) as u16;
                ((hi << 8) | lo, false)
            }
            AddrMode::IndirectY => {
                let zp = self.fetch8(bus);
                let lo = bus.read8(Addr(zp as u32), AccessIntent::Read) as u16;
                let hi = bus.read8(Addr(zp.wrapping_add(1) as u32), AccessIntent::Read) as u16;
                let base = (hi << 8) | lo;
                let addr = base.wrapping_add(self.regs.y as u16);
                (addr, page_crossed(base, addr))
            }
            AddrMode::ZeroPageIndirect => {
                let zp = self.fetch8(bus);
                let lo = bus.read8(Addr(zp as u32), AccessIntent::Read) as u16;
                let hi = bus.read8(Addr(zp.wrapping_add(1) as u32), AccessIntent::Read) as u16;
                ((hi << 8) | lo, false)
            }
            AddrMode::AbsoluteIndexedIndirect => {
                let base = self.fetch16(bus);
                let ptr = base.wrapping_add(self.regs.x as u16);
                let lo = bus.read8(Addr(ptr as u32), AccessIntent::Read) as u16;
                let hi = bus.read8(Addr(ptr.wrapping_add(1) as u32), AccessIntent::Read) as u16;
                ((hi << 8) | lo, false)
            }
            AddrMode::ZeroPageRelative => {
                // Caller (BBRn/BBSn) fetches the zero-page operand itself
                // since it needs it twice (bit test, then as the base for
                // the branch operand); this arm exists only to keep the
                // mode enum exhaustive.
                (self.fetch8(bus) as u16, false)
            }
        }
    }

    /// Resolve a `Relative` operand already fetched at `operand_addr` to
    /// a branch target, reporting whether the branch crosses a page (the
    /// 65C02 charges a cycle for that, on top of the cycle charged for
    /// simply taking the branch).
    pub(super) fn branch_target(&self, bus: &mut MainBus, operand_addr: u16) -> (u16, bool) {
        let offset = bus.read8(Addr(operand_addr as u32), AccessIntent::Execute) as i8;
        let next_pc = operand_addr.wrapping_add(1);
        let target = next_pc.wrapping_add(offset as u16);
        (target, page_crossed(next_pc, target))
    }
}
