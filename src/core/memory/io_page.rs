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

//! The $C000-$CFFF I/O page.
//!
//! This page is carved up into fixed sub-windows:
//!
//! | Range             | Purpose                                    |
//! |--------------------|--------------------------------------------|
//! | $C000-$C08F        | keyboard/speaker/video soft switches, LC   |
//! | $C090-$C0FF        | per-slot 16-byte I/O window (slots 1-7)    |
//! | $C100-$C7FF        | per-slot 256-byte ROM window (slots 1-7)   |
//! | $C800-$CFFF        | shared 2K expansion ROM window             |
//!
//! Reads and writes here are side-effecting (soft switches, slot ROM
//! election) and always go through [`MainBus::io_read`]/[`MainBus::io_write`]
//! rather than through a [`crate::core::memory::target::BusTarget`].

use super::MainBus;
use crate::core::addr::{AccessFlags, AccessIntent, Addr, OPEN_BUS};

const LC_SWITCH_START: u32 = 0xC080;
const LC_SWITCH_END: u32 = 0xC08F;
const SLOT_IO_START: u32 = 0xC090;
const SLOT_IO_END: u32 = 0xC0FF;
const SLOT_ROM_START: u32 = 0xC100;
const SLOT_ROM_END: u32 = 0xC7FF;
const EXPANSION_ROM_START: u32 = 0xC800;
const EXPANSION_ROM_END: u32 = 0xCFFF;

impl MainBus {
    pub(super) fn io_read(&mut self, addr: Addr, intent: AccessIntent, flags: AccessFlags) -> u8 {
        let a = addr.0;
        match a {
            LC_SWITCH_START..=LC_SWITCH_END => {
                let k = (a - LC_SWITCH_START) as u8;
                let value = self.language_card.handle_soft_switch(k, intent, flags);
                log::trace!(
                    "LC switch read ${:04X} (k={:#04X}, dummy={})",
                    a,
                    k,
                    flags.contains(AccessFlags::DUMMY_READ)
                );
                value
            }
            SLOT_IO_START..=SLOT_IO_END => {
                let (slot, offset) = decode_slot_io(a);
                let value = self.slots.io_read(slot, offset, intent);
                log::trace!("slot {} I/O read +{:#04X} -> {:#04X}", slot, offset, value);
                value
            }
            SLOT_ROM_START..=SLOT_ROM_END => {
                let (slot, offset) = decode_slot_rom(a);
                if intent.is_live() {
                    self.slots.note_rom_access(slot);
                }
                self.slots.read_slot_rom(slot, offset)
            }
            EXPANSION_ROM_START..=EXPANSION_ROM_END => {
                if a == EXPANSION_ROM_END && intent.is_live() {
                    log::debug!("$CFFF read, deselecting expansion ROM");
                    self.slots.deselect_expansion();
                }
                self.slots.read_expansion_rom((a - EXPANSION_ROM_START) as u16)
            }
            _ => {
                log::trace!("unmapped I/O read ${:04X}, returning open bus", a);
                OPEN_BUS
            }
        }
    }

    pub(super) fn io_write(&mut self, addr: Addr, intent: AccessIntent, value: u8) {
        let a = addr.0;
        match a {
            LC_SWITCH_START..=LC_SWITCH_END => {
                let k = (a - LC_SWITCH_START) as u8;
                self.language_card
                    .handle_soft_switch(k, intent, AccessFlags::empty());
            }
            SLOT_IO_START..=SLOT_IO_END => {
                let (slot, offset) = decode_slot_io(a);
                self.slots.io_write(slot, offset, value, intent);
            }
            SLOT_ROM_START..=SLOT_ROM_END => {
                let (slot, _) = decode_slot_rom(a);
                if intent.is_live() {
                    self.slots.note_rom_access(slot);
                }
            }
            EXPANSION_ROM_START..=EXPANSION_ROM_END => {
                if a == EXPANSION_ROM_END && intent.is_live() {
                    log::debug!("$CFFF write, deselecting expansion ROM");
                    self.slots.deselect_expansion();
                }
            }
            _ => {
                log::trace!("unmapped I/O write ${:04X} <- {:#04X}, dropped", a, value);
            }
        }
    }
}

fn decode_slot_io(addr: u32) -> (u8, u8) {
    let rel = addr - SLOT_IO_START;
    (((rel / 0x10) + 1) as u8, (rel % 0x10) as u8)
}

fn decode_slot_rom(addr: u32) -> (u8, u8) {
    let rel = addr - 0xC000;
    ((rel / 0x100) as u8, (rel % 0x100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_io_decode() {
        assert_eq!(decode_slot_io(0xC090), (1, 0));
        assert_eq!(decode_slot_io(0xC09F), (1, 0xF));
        assert_eq!(decode_slot_io(0xC0F0), (7, 0));
    }

    #[test]
    fn slot_rom_decode() {
        assert_eq!(decode_slot_rom(0xC100), (1, 0));
        assert_eq!(decode_slot_rom(0xC1FF), (1, 0xFF));
        assert_eq!(decode_slot_rom(0xC700), (7, 0));
    }

    #[test]
    fn unmapped_io_subrange_is_open_bus() {
        let mut bus = MainBus::new();
        assert_eq!(
            bus.io_read(Addr(0xC000), AccessIntent::Read, AccessFlags::empty()),
            OPEN_BUS
        );
    }

    #[test]
    fn cfff_deselects_expansion_rom() {
        let mut bus = MainBus::new();
        bus.slots.note_rom_access(3);
        assert_eq!(bus.slots.active_expansion_slot(), Some(3));
        bus.io_read(Addr(0xCFFF), AccessIntent::Read, AccessFlags::empty());
        assert_eq!(bus.slots.active_expansion_slot(), None);
    }
}
