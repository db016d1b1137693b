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

//! Dispatches a decoded [`OpcodeInfo`] to the `op_*` helpers defined
//! across `instructions/*.rs`, resolving the addressing mode to an
//! address or register operand first. This is the one place that knows
//! how a mnemonic's addressing mode maps to bus traffic; the `op_*`
//! helpers themselves only ever see plain register/memory values.

use super::addressing::AddrMode;
use super::opcodes::{Mnemonic, OpcodeInfo};
use super::{Cpu, Flags, LastStep};
use crate::core::addr::{AccessFlags, AccessIntent, Addr};
use crate::core::memory::MainBus;
use crate::core::trap::TrapRegistry;

/// Whether a load/compare-style mnemonic charges the documented
/// extra cycle when its indexed addressing mode crosses a page. Stores
/// never do (their worst-case cycle count is already the table value).
fn charges_page_cross_bonus(m: Mnemonic) -> bool {
    matches!(
        m,
        Mnemonic::Lda
            | Mnemonic::Ldx
            | Mnemonic::Ldy
            | Mnemonic::And
            | Mnemonic::Ora
            | Mnemonic::Eor
            | Mnemonic::Adc
            | Mnemonic::Sbc
            | Mnemonic::Cmp
            | Mnemonic::Cpx
            | Mnemonic::Cpy
            | Mnemonic::Bit
    )
}

impl Cpu {
    pub(super) fn execute_opcode(
        &mut self,
        bus: &mut MainBus,
        _traps: &TrapRegistry,
        info: OpcodeInfo,
    ) -> u64 {
        use Mnemonic::*;

        self.last_step = LastStep::Other;
        let mut extra_cycles = 0u64;

        match info.mnemonic {
            Lda | Ldx | Ldy | And | Ora | Eor | Adc | Sbc | Cmp | Cpx | Cpy | Bit => {
                let (addr, crossed) = self.effective_address(bus, info.mode);
                let value = bus.read8(Addr(addr as u32), AccessIntent::Read);
                if crossed && charges_page_cross_bonus(info.mnemonic) {
                    extra_cycles += 1;
                }
                match info.mnemonic {
                    Lda => self.op_lda(value),
                    Ldx => self.op_ldx(value),
                    Ldy => self.op_ldy(value),
                    And => self.op_and(value),
                    Ora => self.op_ora(value),
                    Eor => self.op_eor(value),
                    Adc => {
                        self.op_adc(value);
                        if self.regs.p.contains(Flags::DECIMAL) {
                            extra_cycles += 1;
                        }
                    }
                    Sbc => {
                        self.op_sbc(value);
                        if self.regs.p.contains(Flags::DECIMAL) {
                            extra_cycles += 1;
                        }
                    }
                    Cmp => self.op_compare(self.regs.a, value),
                    Cpx => self.op_compare(self.regs.x, value),
                    Cpy => self.op_compare(self.regs.y, value),
                    Bit => self.op_bit(value, info.mode == AddrMode::Immediate),
                    _ => unreachable!(),
                }
            }

            Sta | Stx | Sty | Stz => {
                let (addr, _) = self.effective_address(bus, info.mode);
                let value = match info.mnemonic {
                    Sta => self.regs.a,
                    Stx => self.regs.x,
                    Sty => self.regs.y,
                    Stz => 0,
                    _ => unreachable!(),
                };
                bus.write8(Addr(addr as u32), AccessIntent::Write, value);
            }

            Tax => self.op_tax(),
            Txa => self.op_txa(),
            Tay => self.op_tay(),
            Tya => self.op_tya(),
            Tsx => self.op_tsx(),
            Txs => self.op_txs(),

            Pha => self.op_pha(bus),
            Pla => self.op_pla(bus),
            Php => self.op_php(bus),
            Plp => self.op_plp(bus),
            Phx => self.op_phx(bus),
            Phy => self.op_phy(bus),
            Plx => self.op_plx(bus),
            Ply => self.op_ply(bus),

            Asl | Lsr | Rol | Ror | Inc | Dec => {
                if info.mode == AddrMode::Accumulator {
                    let value = self.regs.a;
                    self.regs.a = self.apply_shift(info.mnemonic, value);
                } else {
                    let (addr, _) = self.effective_address(bus, info.mode);
                    let value = bus.read8_flagged(
                        Addr(addr as u32),
                        AccessIntent::Read,
                        AccessFlags::DUMMY_READ,
                    );
                    let result = self.apply_shift(info.mnemonic, value);
                    bus.write8(Addr(addr as u32), AccessIntent::Write, result);
                }
            }

            Inx => {
                self.regs.x = self.regs.x.wrapping_add(1);
                let x = self.regs.x;
                self.set_nz(x);
            }
            Dex => {
                self.regs.x = self.regs.x.wrapping_sub(1);
                let x = self.regs.x;
                self.set_nz(x);
            }
            Iny => {
                self.regs.y = self.regs.y.wrapping_add(1);
                let y = self.regs.y;
                self.set_nz(y);
            }
            Dey => {
                self.regs.y = self.regs.y.wrapping_sub(1);
                let y = self.regs.y;
                self.set_nz(y);
            }

            Bpl | Bmi | Bvc | Bvs | Bcc | Bcs | Bne | Beq | Bra => {
                let (operand_addr, _) = self.effective_address(bus, info.mode);
                if self.branch_condition(info.mnemonic) {
                    let (target, crossed) = self.branch_target(bus, operand_addr);
                    self.regs.pc = target;
                    extra_cycles += 1 + if crossed { 1 } else { 0 };
                }
            }

            Jmp => {
                let (addr, _) = self.effective_address(bus, info.mode);
                self.regs.pc = addr;
            }
            Jsr => {
                let (addr, _) = self.effective_address(bus, info.mode);
                self.op_jsr(bus, addr);
            }
            Rts => {
                self.op_rts(bus);
                self.last_step = LastStep::Rts;
            }
            Rti => self.op_rti(bus),

            Trb | Tsb => {
                let (addr, _) = self.effective_address(bus, info.mode);
                let value = bus.read8_flagged(
                    Addr(addr as u32),
                    AccessIntent::Read,
                    AccessFlags::DUMMY_READ,
                );
                let result = if info.mnemonic == Trb {
                    self.op_trb(value)
                } else {
                    self.op_tsb(value)
                };
                bus.write8(Addr(addr as u32), AccessIntent::Write, result);
            }

            Clc => self.op_clc(),
            Sec => self.op_sec(),
            Cli => self.op_cli(),
            Sei => self.op_sei(),
            Clv => self.op_clv(),
            Cld => self.op_cld(),
            Sed => self.op_sed(),

            Nop => {}
            Brk => {
                self.op_brk(bus);
                self.last_step = LastStep::Brk;
            }
            Stp => self.op_stp(),
            Wai => self.op_wai(),

            Rmb(bit) => {
                let (addr, _) = self.effective_address(bus, info.mode);
                let value = bus.read8_flagged(
                    Addr(addr as u32),
                    AccessIntent::Read,
                    AccessFlags::DUMMY_READ,
                );
                let result = self.op_rmb(bit, value);
                bus.write8(Addr(addr as u32), AccessIntent::Write, result);
            }
            Smb(bit) => {
                let (addr, _) = self.effective_address(bus, info.mode);
                let value = bus.read8_flagged(
                    Addr(addr as u32),
                    AccessIntent::Read,
                    AccessFlags::DUMMY_READ,
                );
                let result = self.op_smb(bit, value);
                bus.write8(Addr(addr as u32), AccessIntent::Write, result);
            }
            Bbr(bit) | Bbs(bit) => {
                let zp = self.fetch8(bus);
                let value = bus.read8(Addr(zp as u32), AccessIntent::Read);
                let operand_addr = self.regs.pc;
                let (target, crossed) = self.branch_target(bus, operand_addr);
                self.regs.pc = operand_addr.wrapping_add(1);
                let is_set = matches!(info.mnemonic, Bbs(_));
                if self.bbx_taken(bit, value, is_set) {
                    self.regs.pc = target;
                    extra_cycles += 1 + if crossed { 1 } else { 0 };
                }
            }
        }

        info.cycles as u64 + extra_cycles
    }

    fn apply_shift(&mut self, mnemonic: Mnemonic, value: u8) -> u8 {
        match mnemonic {
            Mnemonic::Asl => self.op_asl(value),
            Mnemonic::Lsr => self.op_lsr(value),
            Mnemonic::Rol => self.op_rol(value),
            Mnemonic::Ror => self.op_ror(value),
            Mnemonic::Inc => self.op_inc(value),
            Mnemonic::Dec => self.op_dec(value),
            _ => unreachable!("apply_shift called with non-shift mnemonic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::addr::{AccessIntent, Addr};
    use crate::core::cpu::Cpu;
    use crate::core::memory::MainBus;
    use crate::core::scheduler::EventScheduler;
    use crate::core::trap::TrapRegistry;

    fn fresh() -> (Cpu, MainBus, TrapRegistry, EventScheduler) {
        let mut bus = MainBus::new();
        bus.load_system_rom(&[0xEA; 0x3000]);
        (Cpu::new(), bus, TrapRegistry::new(), EventScheduler::new())
    }

    /// An RMW opcode's operand read is tagged as a dummy read
    /// (`spec.md` §4.1), so an `INC $C083` (absolute) must not arm the
    /// Language Card's write-enable latch the two real `LDA $C083`
    /// loads this crate's `language_card` tests exercise would
    /// (`spec.md` §4.7).
    #[test]
    fn inc_absolute_on_lc_switch_address_does_not_arm_write_enable() {
        let (mut cpu, mut bus, traps, mut sched) = fresh();
        cpu.regs.pc = 0x1000;
        bus.write8(Addr(0x1000), AccessIntent::DebugWrite, 0xEE); // INC abs
        bus.write8(Addr(0x1001), AccessIntent::DebugWrite, 0x83);
        bus.write8(Addr(0x1002), AccessIntent::DebugWrite, 0xC0); // $C083

        cpu.step(&mut bus, &traps, &mut sched);
        cpu.regs.pc = 0x1000;
        cpu.step(&mut bus, &traps, &mut sched);

        assert!(!bus.language_card().ram_write_enabled());
    }
}
