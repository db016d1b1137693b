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

//! The 65C02 CPU: registers, flags, addressing modes, the full
//! documented opcode set, interrupt latching, and cycle accounting.
//!
//! # Example
//!
//! ```
//! use apple2core::core::cpu::Cpu;
//! use apple2core::core::memory::MainBus;
//! use apple2core::core::scheduler::EventScheduler;
//! use apple2core::core::trap::TrapRegistry;
//!
//! let mut bus = MainBus::new();
//! bus.load_system_rom(&[0xEA; 0x3000]); // NOP filler
//! bus.write8(apple2core::core::addr::Addr(0xFFFC), apple2core::core::addr::AccessIntent::DebugWrite, 0x00);
//! bus.write8(apple2core::core::addr::Addr(0xFFFD), apple2core::core::addr::AccessIntent::DebugWrite, 0x10);
//!
//! let mut cpu = Cpu::new();
//! let traps = TrapRegistry::new();
//! let mut scheduler = EventScheduler::new();
//! cpu.reset(&mut bus);
//! assert_eq!(cpu.regs.pc, 0x1000);
//! cpu.step(&mut bus, &traps, &mut scheduler);
//! ```

mod addressing;
pub mod disassembler;
mod dispatch;
mod opcodes;
pub mod tracer;

mod instructions {
    pub mod arithmetic;
    pub mod bitops;
    pub mod branch;
    pub mod compare;
    pub mod exception;
    pub mod flags;
    pub mod jump;
    pub mod load_store;
    pub mod logical;
    pub mod shift;
    pub mod stack;
}

pub use addressing::AddrMode;
pub use opcodes::{decode, Mnemonic, OpcodeInfo};
pub use tracer::{CpuTracer, TraceEntry};

use crate::core::addr::{AccessIntent, Addr, Cycle};
use crate::core::memory::MainBus;
use crate::core::scheduler::EventScheduler;
use crate::core::trap::{TrapContext, TrapOperation, TrapRegistry, TrapResult};

bitflags::bitflags! {
    /// The 65C02 status register. Bit 5 (`UNUSED`) always reads as 1 and
    /// is never addressable independently; it is tracked only so `PHP`
    /// and `BRK` push a byte that round-trips through `PLP`/`RTI`
    /// exactly as real hardware does.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u8 {
        const CARRY = 0b0000_0001;
        const ZERO = 0b0000_0010;
        const IRQ_DISABLE = 0b0000_0100;
        const DECIMAL = 0b0000_1000;
        const BREAK = 0b0001_0000;
        const UNUSED = 0b0010_0000;
        const OVERFLOW = 0b0100_0000;
        const NEGATIVE = 0b1000_0000;
    }
}

/// The 65C02 register file. No extra 16-bit registers beyond the
/// documented set; the 65816/65832 placeholders in the teacher crate are
/// out of scope for this core (`spec.md` §9).
#[derive(Debug, Clone, Copy)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub pc: u16,
    pub p: Flags,
}

impl Default for Registers {
    fn default() -> Self {
        Registers {
            a: 0,
            x: 0,
            y: 0,
            s: 0xFF,
            pc: 0,
            p: Flags::UNUSED | Flags::IRQ_DISABLE,
        }
    }
}

/// What the previous `step()` executed, consulted by [`Cpu::execute`] and
/// [`Cpu::call`] to know when to stop a multi-instruction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastStep {
    Other,
    Rts,
    Brk,
}

pub struct Cpu {
    pub regs: Registers,
    /// Set by `STP`; `step()` becomes a no-op until `reset()`. Not an
    /// error condition (`spec.md` §7).
    pub halted: bool,
    /// Set by `WAI`; cleared the instant an IRQ or NMI is latched.
    waiting: bool,
    /// Level-sensitive IRQ line, asserted/deasserted by devices.
    irq_line: bool,
    /// Edge-latched NMI request.
    nmi_pending: bool,
    /// Monotonic cycle counter (`spec.md` §3).
    pub cycle: Cycle,
    last_step: LastStep,
    /// Disabled by default; see [`tracer::CpuTracer`].
    pub tracer: CpuTracer,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            regs: Registers::default(),
            halted: false,
            waiting: false,
            irq_line: false,
            nmi_pending: false,
            cycle: Cycle(0),
            last_step: LastStep::Other,
            tracer: CpuTracer::new(),
        }
    }

    /// Assert or deassert the IRQ line. IRQ is level-sensitive: it stays
    /// pending for as long as a device holds it asserted, and `step()`
    /// will keep re-servicing it on every instruction boundary while
    /// `P.I` is clear unless the device deasserts it.
    pub fn set_irq_line(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    /// Latch an edge-triggered NMI request. Serviced on the next
    /// instruction boundary regardless of `P.I`.
    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Reset: `P.I = 1`, `P.D = 0`, `S -= 3` (simulating the vector
    /// push), `PC` loaded from `$FFFC/$FFFD`, `halted` cleared, cycle
    /// counter zeroed.
    pub fn reset(&mut self, bus: &mut MainBus) {
        self.regs.s = self.regs.s.wrapping_sub(3);
        self.regs.p.insert(Flags::IRQ_DISABLE);
        self.regs.p.remove(Flags::DECIMAL);
        self.regs.pc = bus.read16(Addr(0xFFFC), AccessIntent::DebugRead);
        self.halted = false;
        self.waiting = false;
        self.nmi_pending = false;
        self.cycle = Cycle(0);
        log::debug!("cpu: reset, pc={:#06x}", self.regs.pc);
    }

    #[inline(always)]
    pub(crate) fn set_nz(&mut self, value: u8) {
        self.regs.p.set(Flags::ZERO, value == 0);
        self.regs.p.set(Flags::NEGATIVE, value & 0x80 != 0);
    }

    pub(crate) fn push(&mut self, bus: &mut MainBus, value: u8) {
        bus.write8(Addr(0x0100 + self.regs.s as u32), AccessIntent::Write, value);
        self.regs.s = self.regs.s.wrapping_sub(1);
    }

    pub(crate) fn pull(&mut self, bus: &mut MainBus) -> u8 {
        self.regs.s = self.regs.s.wrapping_add(1);
        bus.read8(Addr(0x0100 + self.regs.s as u32), AccessIntent::Read)
    }

    fn push16(&mut self, bus: &mut MainBus, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, (value & 0xFF) as u8);
    }

    fn pull16(&mut self, bus: &mut MainBus) -> u16 {
        let lo = self.pull(bus) as u16;
        let hi = self.pull(bus) as u16;
        (hi << 8) | lo
    }

    /// Service a pending interrupt if one is eligible. Returns the cycle
    /// cost if one was serviced.
    fn service_interrupt(&mut self, bus: &mut MainBus) -> Option<u64> {
        if self.nmi_pending {
            self.nmi_pending = false;
            self.waiting = false;
            self.push16(bus, self.regs.pc);
            let mut flags = self.regs.p;
            flags.remove(Flags::BREAK);
            flags.insert(Flags::UNUSED);
            self.push(bus, flags.bits());
            self.regs.p.insert(Flags::IRQ_DISABLE);
            self.regs.p.remove(Flags::DECIMAL);
            self.regs.pc = bus.read16(Addr(0xFFFA), AccessIntent::DebugRead);
            log::trace!("cpu: NMI serviced, pc={:#06x}", self.regs.pc);
            return Some(7);
        }
        if self.irq_line {
            self.waiting = false;
            if self.regs.p.contains(Flags::IRQ_DISABLE) {
                return None;
            }
            self.push16(bus, self.regs.pc);
            let mut flags = self.regs.p;
            flags.remove(Flags::BREAK);
            flags.insert(Flags::UNUSED);
            self.push(bus, flags.bits());
            self.regs.p.insert(Flags::IRQ_DISABLE);
            self.regs.p.remove(Flags::DECIMAL);
            self.regs.pc = bus.read16(Addr(0xFFFE), AccessIntent::DebugRead);
            log::trace!("cpu: IRQ serviced, pc={:#06x}", self.regs.pc);
            return Some(7);
        }
        None
    }

    /// Execute a single instruction (or service a pending interrupt, or
    /// do nothing if halted/waiting). Returns the number of cycles
    /// consumed.
    ///
    /// Mirrors `spec.md` §4.9's `step()` algorithm exactly: poll
    /// interrupts, fetch, consult the trap registry before dispatch,
    /// then decode and execute.
    pub fn step(
        &mut self,
        bus: &mut MainBus,
        traps: &TrapRegistry,
        scheduler: &mut EventScheduler,
    ) -> u64 {
        if self.halted {
            return 0;
        }
        if let Some(cycles) = self.service_interrupt(bus) {
            self.cycle = self.cycle.advance(cycles);
            scheduler.advance(self.cycle, self, bus);
            return cycles;
        }
        if self.waiting {
            return 0;
        }

        let pc_before = self.regs.pc;
        match traps.try_execute(
            Addr(pc_before as u32),
            TrapOperation::Call,
            self,
            bus,
            TrapContext { cycle: self.cycle },
        ) {
            TrapResult::Handled {
                cycles_consumed,
                skip_instruction,
            } => {
                if skip_instruction {
                    let ret = self.pull16(bus);
                    self.regs.pc = ret.wrapping_add(1);
                }
                self.last_step = LastStep::Other;
                self.cycle = self.cycle.advance(cycles_consumed);
                scheduler.advance(self.cycle, self, bus);
                return cycles_consumed;
            }
            TrapResult::NotHandled => {}
        }

        let opcode = bus.read8(Addr(pc_before as u32), AccessIntent::Execute);
        if self.tracer.is_enabled() {
            self.tracer.record(tracer::TraceEntry {
                pc: pc_before,
                opcode,
                cycle: self.cycle,
            });
        }
        self.regs.pc = pc_before.wrapping_add(1);
        let info = decode(opcode);
        let cycles = self.execute_opcode(bus, traps, info);
        self.cycle = self.cycle.advance(cycles);
        scheduler.advance(self.cycle, self, bus);
        cycles
    }

    /// Run from `start` until an `RTS` pops the stack back to its level
    /// at entry, or a `BRK` executes.
    pub fn execute(
        &mut self,
        start: u16,
        bus: &mut MainBus,
        traps: &TrapRegistry,
        scheduler: &mut EventScheduler,
    ) {
        self.regs.pc = start;
        let baseline_s = self.regs.s;
        loop {
            self.step(bus, traps, scheduler);
            if self.halted {
                break;
            }
            if self.last_step == LastStep::Brk {
                break;
            }
            if self.last_step == LastStep::Rts && self.regs.s == baseline_s {
                break;
            }
        }
    }

    /// Push a synthetic return address, jump to `addr`, and run until an
    /// `RTS` returns through that sentinel or a `BRK` executes. Used by
    /// `Machine::call` to invoke a ROM routine the way `JSR` would.
    pub fn call(
        &mut self,
        addr: u16,
        bus: &mut MainBus,
        traps: &TrapRegistry,
        scheduler: &mut EventScheduler,
    ) {
        const SENTINEL: u16 = 0x0000;
        self.push16(bus, SENTINEL.wrapping_sub(1));
        self.regs.pc = addr;
        loop {
            self.step(bus, traps, scheduler);
            if self.halted {
                break;
            }
            if self.last_step == LastStep::Brk {
                break;
            }
            if self.last_step == LastStep::Rts && self.regs.pc == SENTINEL {
                break;
            }
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::addr::AccessIntent;
    use crate::core::memory::MainBus;

    fn fresh() -> (Cpu, MainBus, TrapRegistry, EventScheduler) {
        let mut bus = MainBus::new();
        bus.load_system_rom(&[0xEA; 0x3000]);
        (Cpu::new(), bus, TrapRegistry::new(), EventScheduler::new())
    }

    fn set_reset_vector(bus: &mut MainBus, addr: u16) {
        bus.write8(Addr(0xFFFC), AccessIntent::DebugWrite, (addr & 0xFF) as u8);
        bus.write8(Addr(0xFFFD), AccessIntent::DebugWrite, (addr >> 8) as u8);
    }

    #[test]
    fn s1_reset_vector() {
        let (mut cpu, mut bus, _traps, _sched) = fresh();
        set_reset_vector(&mut bus, 0x1000);
        cpu.reset(&mut bus);
        assert_eq!(cpu.regs.pc, 0x1000);
        assert!(cpu.regs.p.contains(Flags::IRQ_DISABLE));
        assert!(!cpu.regs.p.contains(Flags::DECIMAL));
    }

    #[test]
    fn s2_jsr_rts() {
        let (mut cpu, mut bus, traps, mut sched) = fresh();
        set_reset_vector(&mut bus, 0x1000);
        cpu.reset(&mut bus);
        // JSR $2000 at $1000; RTS at $2000.
        bus.write8(Addr(0x1000), AccessIntent::DebugWrite, 0x20);
        bus.write8(Addr(0x1001), AccessIntent::DebugWrite, 0x00);
        bus.write8(Addr(0x1002), AccessIntent::DebugWrite, 0x20);
        bus.write8(Addr(0x2000), AccessIntent::DebugWrite, 0x60);
        let baseline_s = cpu.regs.s;
        cpu.step(&mut bus, &traps, &mut sched);
        assert_eq!(cpu.regs.pc, 0x2000);
        cpu.step(&mut bus, &traps, &mut sched);
        assert_eq!(cpu.regs.pc, 0x1003);
        assert_eq!(cpu.regs.s, baseline_s);
    }

    #[test]
    fn s3_hello_poke() {
        let (_cpu, mut bus, _traps, _sched) = fresh();
        bus.write8(Addr(0x0400), AccessIntent::Write, 0xC1);
        assert_eq!(bus.read8(Addr(0x0400), AccessIntent::Read), 0xC1);
    }

    #[test]
    fn stp_halts_and_step_becomes_noop() {
        let (mut cpu, mut bus, traps, mut sched) = fresh();
        set_reset_vector(&mut bus, 0x1000);
        cpu.reset(&mut bus);
        bus.write8(Addr(0x1000), AccessIntent::DebugWrite, 0xDB); // STP
        cpu.step(&mut bus, &traps, &mut sched);
        assert!(cpu.halted);
        let pc = cpu.regs.pc;
        cpu.step(&mut bus, &traps, &mut sched);
        assert_eq!(cpu.regs.pc, pc);
    }

    #[test]
    fn every_opcode_runs_without_panicking() {
        // Smoke test: every opcode value, executed once from a clean
        // register state against a RAM-backed instruction stream, must
        // not panic (spec.md S9: "no illegal instruction condition").
        for code in 0u16..=255 {
            let (mut cpu, mut bus, traps, mut sched) = fresh();
            set_reset_vector(&mut bus, 0x1000);
            cpu.reset(&mut bus);
            cpu.regs.s = 0xFF;
            // Give every addressing mode room to fetch 1-2 more bytes.
            for i in 0..4 {
                bus.write8(Addr(0x1000 + i), AccessIntent::DebugWrite, 0xEA);
            }
            bus.write8(Addr(0x1000), AccessIntent::DebugWrite, code as u8);
            cpu.step(&mut bus, &traps, &mut sched);
        }
    }
}
