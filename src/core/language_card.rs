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

//! The Language Card: 16 KiB of bank-switched RAM that can be swapped in
//! over the system ROM at `$D000-$FFFF` (`spec.md` §4.7).
//!
//! Two 4 KiB banks alias into `$D000-$DFFF`; a single 8 KiB bank covers
//! `$E000-$FFFF` regardless of which bank is selected. State lives
//! behind an `Rc<RefCell<_>>` because both the read layer and the write
//! layer installed on [`crate::core::memory::MainBus`] need to see the
//! same bank-select/enable state that `handle_soft_switch` mutates.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::addr::{AccessFlags, AccessIntent, Addr, MemoryContext, PagePerms, OPEN_BUS};
use crate::core::memory::{BusTarget, LayerResolution, LayerResolver, PhysicalMemory};

const RAM_SIZE: u32 = 0x4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bank {
    Bank1,
    Bank2,
}

struct State {
    ram: PhysicalMemory,
    ram_read_enabled: bool,
    ram_write_enabled: bool,
    bank: Bank,
    prewrite_count: u8,
}

/// Resolve `addr` (already known to fall in `$D000-$FFFF`) to the
/// physical offset and virtual window base the currently selected bank
/// maps it through.
fn bank_window(addr: Addr, bank: Bank) -> (u32, Addr) {
    if addr.0 < 0xE000 {
        let physical_base = match bank {
            Bank::Bank1 => 0x0000,
            Bank::Bank2 => 0x1000,
        };
        (physical_base, Addr(0xD000))
    } else {
        (0x2000, Addr(0xE000))
    }
}

struct ReadResolver(Rc<RefCell<State>>);
impl LayerResolver for ReadResolver {
    fn resolve(&self, addr: Addr, intent: AccessIntent) -> Option<LayerResolution> {
        if !intent.is_read() {
            return None;
        }
        let state = self.0.borrow();
        if !state.ram_read_enabled {
            return None;
        }
        let (physical_base, virtual_start) = bank_window(addr, state.bank);
        Some(LayerResolution {
            target: BusTarget::Ram(state.ram.clone()),
            physical_base,
            virtual_start,
            perms: PagePerms::RW,
            context: MemoryContext::new("lc-ram"),
        })
    }
}

struct WriteResolver(Rc<RefCell<State>>);
impl LayerResolver for WriteResolver {
    fn resolve(&self, addr: Addr, intent: AccessIntent) -> Option<LayerResolution> {
        if !intent.is_write() {
            return None;
        }
        let state = self.0.borrow();
        if !state.ram_write_enabled {
            return None;
        }
        let (physical_base, virtual_start) = bank_window(addr, state.bank);
        Some(LayerResolution {
            target: BusTarget::Ram(state.ram.clone()),
            physical_base,
            virtual_start,
            perms: PagePerms::RW,
            context: MemoryContext::new("lc-ram"),
        })
    }
}

/// The soft-switch state machine plus the two layer resolvers it drives.
pub struct LanguageCard {
    state: Rc<RefCell<State>>,
}

impl LanguageCard {
    pub fn new() -> Self {
        LanguageCard {
            state: Rc::new(RefCell::new(State {
                ram: PhysicalMemory::create("language-card-ram", RAM_SIZE, None),
                ram_read_enabled: false,
                ram_write_enabled: false,
                bank: Bank::Bank2,
                prewrite_count: 0,
            })),
        }
    }

    pub fn ram_read_enabled(&self) -> bool {
        self.state.borrow().ram_read_enabled
    }

    pub fn ram_write_enabled(&self) -> bool {
        self.state.borrow().ram_write_enabled
    }

    pub fn read_resolver(&self) -> Rc<dyn LayerResolver> {
        Rc::new(ReadResolver(self.state.clone()))
    }

    pub fn write_resolver(&self) -> Rc<dyn LayerResolver> {
        Rc::new(WriteResolver(self.state.clone()))
    }

    /// Handle an access to `$C080 + k` (`0 <= k <= 15`). Returns the byte
    /// a read of the switch would see; reads and writes both act on the
    /// soft switch's decoded meaning the same way, but only live
    /// (non-debug) accesses mutate state (`spec.md` §9: "debug-intent
    /// reads MUST be side-effect-free").
    ///
    /// `flags` carries [`AccessFlags::DUMMY_READ`] when this access is a
    /// read-modify-write opcode's operand fetch rather than a deliberate
    /// load. The two-consecutive-reads write-enable protocol (`spec.md`
    /// §4.7) only advances on a real load — an RMW instruction that
    /// happens to target this address does not arm or clear it, the same
    /// protection a debug read already gets.
    ///
    /// There is no documented value for reading a Language Card switch
    /// itself (real hardware returns whatever happens to be on the
    /// floating bus); this returns the conventional open-bus byte.
    pub fn handle_soft_switch(&self, k: u8, intent: AccessIntent, flags: AccessFlags) -> u8 {
        if intent.is_live() && !flags.contains(AccessFlags::DUMMY_READ) {
            let mut state = self.state.borrow_mut();
            state.bank = if k & 0x08 != 0 { Bank::Bank1 } else { Bank::Bank2 };

            let odd = k & 0x01 != 0;
            if odd {
                if intent.is_write() {
                    state.prewrite_count = 0;
                } else {
                    state.prewrite_count = (state.prewrite_count + 1).min(2);
                    if state.prewrite_count >= 2 {
                        state.ram_write_enabled = true;
                    }
                }
            } else {
                state.prewrite_count = 0;
                state.ram_write_enabled = false;
            }

            state.ram_read_enabled = matches!(k & 0x03, 0 | 3);
            log::trace!(
                "LC switch k={:#04X}: bank={:?} read_enabled={} write_enabled={}",
                k,
                state.bank,
                state.ram_read_enabled,
                state.ram_write_enabled
            );
        }
        OPEN_BUS
    }
}

impl Default for LanguageCard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::MainBus;

    #[test]
    fn two_reads_of_odd_switch_enable_writes() {
        let lc = LanguageCard::new();
        lc.handle_soft_switch(0x81, AccessIntent::Read, AccessFlags::empty());
        assert!(!lc.ram_write_enabled());
        lc.handle_soft_switch(0x81, AccessIntent::Read, AccessFlags::empty());
        assert!(lc.ram_write_enabled());
    }

    #[test]
    fn write_to_odd_switch_never_enables_writes() {
        let lc = LanguageCard::new();
        lc.handle_soft_switch(0x81, AccessIntent::Write, AccessFlags::empty());
        lc.handle_soft_switch(0x81, AccessIntent::Write, AccessFlags::empty());
        assert!(!lc.ram_write_enabled());
    }

    #[test]
    fn even_switch_disables_writes_and_clears_prewrite() {
        let lc = LanguageCard::new();
        lc.handle_soft_switch(0x81, AccessIntent::Read, AccessFlags::empty());
        lc.handle_soft_switch(0x81, AccessIntent::Read, AccessFlags::empty());
        assert!(lc.ram_write_enabled());
        lc.handle_soft_switch(0x80, AccessIntent::Read, AccessFlags::empty());
        assert!(!lc.ram_write_enabled());
    }

    #[test]
    fn low_nibble_0_and_3_enable_ram_read() {
        let lc = LanguageCard::new();
        lc.handle_soft_switch(0x80, AccessIntent::Read, AccessFlags::empty());
        assert!(lc.ram_read_enabled());
        lc.handle_soft_switch(0x82, AccessIntent::Read, AccessFlags::empty());
        assert!(!lc.ram_read_enabled());
        lc.handle_soft_switch(0x83, AccessIntent::Read, AccessFlags::empty());
        assert!(lc.ram_read_enabled());
    }

    #[test]
    fn debug_access_does_not_mutate_state() {
        let lc = LanguageCard::new();
        lc.handle_soft_switch(0x81, AccessIntent::DebugRead, AccessFlags::empty());
        lc.handle_soft_switch(0x81, AccessIntent::DebugRead, AccessFlags::empty());
        assert!(!lc.ram_write_enabled());
    }

    #[test]
    fn rmw_dummy_read_of_odd_switch_never_arms_write_enable() {
        let lc = LanguageCard::new();
        lc.handle_soft_switch(0x81, AccessIntent::Read, AccessFlags::DUMMY_READ);
        lc.handle_soft_switch(0x81, AccessIntent::Read, AccessFlags::DUMMY_READ);
        assert!(!lc.ram_write_enabled());
    }

    #[test]
    fn s4_lc_bank_switch_scenario() {
        // spec.md S4: enable writes, write RAM, switch to ROM read, then
        // back to RAM read without re-arming writes.
        let mut bus = MainBus::new();
        bus.load_system_rom(&[0x42; 0x3000]);
        bus.read8(Addr(0xC083), AccessIntent::Read);
        bus.read8(Addr(0xC083), AccessIntent::Read);
        assert!(bus.language_card().ram_write_enabled());

        bus.write8(Addr(0xD000), AccessIntent::Write, 0xAA);

        bus.read8(Addr(0xC081), AccessIntent::Read); // ROM read (low nibble 1)
        assert!(!bus.language_card().ram_read_enabled());
        assert_eq!(bus.read8(Addr(0xD000), AccessIntent::Read), 0x42);

        bus.read8(Addr(0xC083), AccessIntent::Read); // RAM read, no write re-arm
        assert!(bus.language_card().ram_read_enabled());
        assert_eq!(bus.read8(Addr(0xD000), AccessIntent::Read), 0xAA);
    }

    #[test]
    fn lc_round_trip_full_range() {
        let mut bus = MainBus::new();
        bus.read8(Addr(0xC083), AccessIntent::Read);
        bus.read8(Addr(0xC083), AccessIntent::Read);
        assert!(bus.language_card().ram_write_enabled());
        assert!(bus.language_card().ram_read_enabled());

        for addr in [0xD050u32, 0xDFFF, 0xE000, 0xFFFF] {
            bus.write8(Addr(addr), AccessIntent::Write, 0x77);
            assert_eq!(bus.read8(Addr(addr), AccessIntent::Read), 0x77);
        }
    }

    #[test]
    fn lc_write_protect_leaves_memory_unchanged() {
        let mut bus = MainBus::new();
        bus.load_system_rom(&[0x11; 0x3000]);
        // Enable read, leave write disabled (even switch).
        bus.read8(Addr(0xC080), AccessIntent::Read);
        assert!(bus.language_card().ram_read_enabled());
        assert!(!bus.language_card().ram_write_enabled());

        let before = bus.read8(Addr(0xE100), AccessIntent::Read);
        bus.write8(Addr(0xE100), AccessIntent::Write, 0x99);
        assert_eq!(bus.read8(Addr(0xE100), AccessIntent::Read), before);
    }
}
