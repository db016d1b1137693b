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

//! The slot table and expansion-ROM election protocol (`spec.md` §4.6).
//!
//! Seven peripheral slots, each holding at most one [`SlotCard`]. A card
//! answers its own 16-byte I/O window, its 256-byte slot ROM, and (if it
//! carries one) its 2 KiB expansion ROM window. Only one slot's expansion
//! ROM is visible at `$C800-$CFFF` at a time; which one is decided by the
//! election protocol in [`SlotManager::note_rom_access`].

use crate::core::addr::{AccessIntent, OPEN_BUS};
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::PhysicalMemory;

const SLOT_COUNT: usize = 7;
const EXPANSION_ROM_SIZE: u32 = 0x800;

/// A peripheral card occupying one slot.
///
/// Default method bodies answer "nothing here" so a card with no ROM (a
/// pure I/O device, e.g. a serial card) only needs to implement
/// `io_read`/`io_write`.
pub trait SlotCard {
    /// Called once, immediately after the card is installed.
    fn on_install(&mut self, slot: u8);

    /// Called when this card's expansion ROM becomes the visible one.
    fn on_select(&mut self) {}

    /// Called when this card's expansion ROM stops being the visible one.
    fn on_deselect(&mut self) {}

    fn io_read(&mut self, offset: u8, intent: AccessIntent) -> u8;
    fn io_write(&mut self, offset: u8, value: u8, intent: AccessIntent);

    /// Byte at `$Cn00 + offset` (`offset < 0x100`). `OPEN_BUS` if the
    /// card carries no slot ROM.
    fn rom_byte(&self, offset: u8) -> u8 {
        let _ = offset;
        OPEN_BUS
    }

    /// Byte at `$C800 + offset` (`offset < 0x800`) while this card is the
    /// elected expansion slot. `OPEN_BUS` if the card carries no
    /// expansion ROM.
    fn expansion_rom_byte(&self, offset: u16) -> u8 {
        let _ = offset;
        OPEN_BUS
    }
}

struct SlotEntry {
    card: Box<dyn SlotCard>,
}

/// The seven-slot peripheral table and expansion-ROM election state.
pub struct SlotManager {
    slots: [Option<SlotEntry>; SLOT_COUNT],
    active_expansion_slot: Option<u8>,
    default_expansion_rom: PhysicalMemory,
}

fn slot_index(slot: u8) -> Option<usize> {
    if (1..=7).contains(&slot) {
        Some((slot - 1) as usize)
    } else {
        None
    }
}

impl SlotManager {
    pub fn new() -> Self {
        SlotManager {
            slots: [None, None, None, None, None, None, None],
            active_expansion_slot: None,
            default_expansion_rom: PhysicalMemory::create(
                "default-expansion-rom",
                EXPANSION_ROM_SIZE,
                None,
            ),
        }
    }

    /// Overwrite the built-in 80-column-firmware expansion ROM that
    /// becomes visible when no slot is elected.
    pub fn load_default_expansion_rom(&mut self, data: &[u8]) {
        self.default_expansion_rom.load(data);
    }

    /// Install `card` in `slot` (`1..=7`). Fails if the slot is already
    /// occupied or `slot` is out of range (`spec.md` §4.6: "asserts slot
    /// empty").
    pub fn install_card(&mut self, slot: u8, mut card: Box<dyn SlotCard>) -> Result<()> {
        let idx = slot_index(slot).ok_or(EmulatorError::SlotOccupied(slot))?;
        if self.slots[idx].is_some() {
            return Err(EmulatorError::SlotOccupied(slot));
        }
        card.on_install(slot);
        self.slots[idx] = Some(SlotEntry { card });
        log::info!("card installed in slot {}", slot);
        Ok(())
    }

    /// Remove and return the card in `slot`, if any. Clears the
    /// expansion-ROM election if this slot was the active one.
    pub fn remove_card(&mut self, slot: u8) -> Option<Box<dyn SlotCard>> {
        let idx = slot_index(slot)?;
        let entry = self.slots[idx].take()?;
        if self.active_expansion_slot == Some(slot) {
            self.active_expansion_slot = None;
        }
        log::info!("card removed from slot {}", slot);
        Some(entry.card)
    }

    pub fn is_occupied(&self, slot: u8) -> bool {
        slot_index(slot).is_some_and(|idx| self.slots[idx].is_some())
    }

    pub fn active_expansion_slot(&self) -> Option<u8> {
        self.active_expansion_slot
    }

    /// Run the election protocol triggered by any access in `$Cn00-$CnFF`
    /// (`spec.md` §4.6). Elects before the access is serviced so a read
    /// in the same instruction sees the newly selected ROM.
    pub fn note_rom_access(&mut self, slot: u8) {
        if self.active_expansion_slot == Some(slot) {
            return;
        }
        if let Some(previous) = self.active_expansion_slot.take() {
            if let Some(idx) = slot_index(previous) {
                if let Some(entry) = &mut self.slots[idx] {
                    entry.card.on_deselect();
                }
            }
        }
        self.active_expansion_slot = Some(slot);
        log::debug!("slot {} elected for expansion ROM window", slot);
        if let Some(idx) = slot_index(slot) {
            if let Some(entry) = &mut self.slots[idx] {
                entry.card.on_select();
            }
        }
    }

    /// Deselect the active expansion slot (triggered by any access to
    /// `$CFFF`). The default expansion ROM becomes visible again.
    pub fn deselect_expansion(&mut self) {
        if let Some(previous) = self.active_expansion_slot.take() {
            if let Some(idx) = slot_index(previous) {
                if let Some(entry) = &mut self.slots[idx] {
                    entry.card.on_deselect();
                }
            }
        }
    }

    pub fn io_read(&mut self, slot: u8, offset: u8, intent: AccessIntent) -> u8 {
        match slot_index(slot).and_then(|idx| self.slots[idx].as_mut()) {
            Some(entry) => entry.card.io_read(offset, intent),
            None => OPEN_BUS,
        }
    }

    pub fn io_write(&mut self, slot: u8, offset: u8, value: u8, intent: AccessIntent) {
        if let Some(entry) = slot_index(slot).and_then(|idx| self.slots[idx].as_mut()) {
            entry.card.io_write(offset, value, intent);
        }
    }

    pub fn read_slot_rom(&self, slot: u8, offset: u8) -> u8 {
        match slot_index(slot).and_then(|idx| self.slots[idx].as_ref()) {
            Some(entry) => entry.card.rom_byte(offset),
            None => OPEN_BUS,
        }
    }

    /// The byte currently visible at `$C800 + offset`: the elected slot's
    /// expansion ROM if one is elected, else the default (`spec.md`
    /// §4.6: `get_visible_expansion_rom`).
    pub fn read_expansion_rom(&self, offset: u16) -> u8 {
        if let Some(slot) = self.active_expansion_slot {
            if let Some(entry) = slot_index(slot).and_then(|idx| self.slots[idx].as_ref()) {
                return entry.card.expansion_rom_byte(offset);
            }
        }
        if (offset as u32) < self.default_expansion_rom.len() {
            self.default_expansion_rom.read(offset as u32)
        } else {
            OPEN_BUS
        }
    }
}

impl Default for SlotManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCard {
        rom: [u8; 0x100],
        expansion_rom: [u8; 0x800],
        selects: u32,
        deselects: u32,
    }

    impl TestCard {
        fn new(rom_byte: u8, expansion_byte: u8) -> Self {
            TestCard {
                rom: [rom_byte; 0x100],
                expansion_rom: [expansion_byte; 0x800],
                selects: 0,
                deselects: 0,
            }
        }
    }

    impl SlotCard for TestCard {
        fn on_install(&mut self, _slot: u8) {}
        fn on_select(&mut self) {
            self.selects += 1;
        }
        fn on_deselect(&mut self) {
            self.deselects += 1;
        }
        fn io_read(&mut self, offset: u8, _intent: AccessIntent) -> u8 {
            offset
        }
        fn io_write(&mut self, _offset: u8, _value: u8, _intent: AccessIntent) {}
        fn rom_byte(&self, offset: u8) -> u8 {
            self.rom[offset as usize]
        }
        fn expansion_rom_byte(&self, offset: u16) -> u8 {
            self.expansion_rom[offset as usize]
        }
    }

    #[test]
    fn installing_into_occupied_slot_fails() {
        let mut slots = SlotManager::new();
        slots
            .install_card(6, Box::new(TestCard::new(0x55, 0x55)))
            .unwrap();
        let err = slots.install_card(6, Box::new(TestCard::new(0x11, 0x11)));
        assert!(err.is_err());
    }

    #[test]
    fn s5_slot_rom_election() {
        let mut slots = SlotManager::new();
        slots
            .install_card(6, Box::new(TestCard::new(0x55, 0x55)))
            .unwrap();

        slots.note_rom_access(6);
        assert_eq!(slots.active_expansion_slot(), Some(6));
        assert_eq!(slots.read_expansion_rom(0), 0x55);

        slots.deselect_expansion();
        assert_eq!(slots.active_expansion_slot(), None);
        assert_eq!(slots.read_expansion_rom(0), 0x00); // default ROM, unloaded
    }

    #[test]
    fn selecting_a_new_slot_deselects_the_previous_one() {
        let mut slots = SlotManager::new();
        slots
            .install_card(4, Box::new(TestCard::new(0x44, 0x44)))
            .unwrap();
        slots
            .install_card(5, Box::new(TestCard::new(0x55, 0x55)))
            .unwrap();

        slots.note_rom_access(4);
        slots.note_rom_access(5);
        assert_eq!(slots.active_expansion_slot(), Some(5));
    }

    #[test]
    fn removing_the_active_slot_clears_the_election() {
        let mut slots = SlotManager::new();
        slots
            .install_card(6, Box::new(TestCard::new(0x55, 0x55)))
            .unwrap();
        slots.note_rom_access(6);
        slots.remove_card(6);
        assert_eq!(slots.active_expansion_slot(), None);
    }

    #[test]
    fn unoccupied_slot_io_is_open_bus() {
        let mut slots = SlotManager::new();
        assert_eq!(slots.io_read(3, 0, AccessIntent::Read), OPEN_BUS);
    }
}
