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

//! The memory bus: physical memory, bus targets, the base region table,
//! overlay layers, and the $C000-$CFFF I/O page.
//!
//! # Memory Map (default profile)
//!
//! | Address range     | Region              | Size  | Notes                         |
//! |--------------------|--------------------|-------|-------------------------------|
//! | $0000-$BFFF        | Main RAM           | 48K   | R/W                           |
//! | $C000-$CFFF        | I/O page           | 4K    | composite, see [`io_page`]    |
//! | $D000-$FFFF        | System ROM         | 12K   | R/X, overlaid by Language Card|
//!
//! # Resolution order
//!
//! Every access first asks the active [`layer::LayerStack`] whether an
//! installed overlay claims the address; only if none do does it fall
//! back to the permanent [`region::RegionTable`]. This mirrors
//! `spec.md` §4.4's two-stage lookup exactly.

pub mod io_page;
pub mod layer;
pub mod region;
pub mod target;

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::addr::{AccessFlags, AccessIntent, Addr, MemoryContext, PagePerms, OPEN_BUS};
use crate::core::error::Result;
use crate::core::language_card::LanguageCard;
use crate::core::slots::SlotManager;

pub use layer::{Layer, LayerResolution, LayerResolver, LayerStack};
pub use region::{RegionMapping, RegionTable, RegionTag};
pub use target::{BusTarget, WriteOutcome};

/// Apple II logical address space size: 64 KiB.
pub const ADDRESS_SPACE_SIZE: u32 = 0x1_0000;

const IO_PAGE_START: u32 = 0xC000;
const IO_PAGE_END: u32 = 0xCFFF;

struct PhysicalMemoryInner {
    name: String,
    data: Vec<u8>,
}

/// A named, owned byte buffer, shared via `Rc<RefCell<_>>` so several
/// regions or layers can alias disjoint or overlapping windows into the
/// same physical block (e.g. the Language Card's two banks and the
/// shared upper 8K all live in one 16 KiB [`PhysicalMemory`]).
#[derive(Clone)]
pub struct PhysicalMemory(Rc<RefCell<PhysicalMemoryInner>>);

impl PhysicalMemory {
    /// Create a new block of `size` bytes, optionally seeded from `initial`
    /// (truncated or zero-padded to fit).
    pub fn create(name: impl Into<String>, size: u32, initial: Option<&[u8]>) -> Self {
        let mut data = vec![0u8; size as usize];
        if let Some(bytes) = initial {
            let n = bytes.len().min(data.len());
            data[..n].copy_from_slice(&bytes[..n]);
        }
        PhysicalMemory(Rc::new(RefCell::new(PhysicalMemoryInner {
            name: name.into(),
            data,
        })))
    }

    pub fn len(&self) -> u32 {
        self.0.borrow().data.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn read(&self, offset: u32) -> u8 {
        self.0.borrow().data[offset as usize]
    }

    pub fn write(&self, offset: u32, value: u8) {
        self.0.borrow_mut().data[offset as usize] = value;
    }

    /// Overwrite the whole block from `bytes`, truncated or zero-padded
    /// to fit. Used to hot-load a ROM image at startup.
    pub fn load(&self, bytes: &[u8]) {
        let mut inner = self.0.borrow_mut();
        let n = bytes.len().min(inner.data.len());
        inner.data[..n].copy_from_slice(&bytes[..n]);
        for b in &mut inner.data[n..] {
            *b = 0;
        }
    }
}

/// The central, tightly-coupled memory bus: base regions, overlay
/// layers, the slot manager, and the Language Card controller.
///
/// This is intentionally one struct rather than several independently
/// pluggable pieces: the I/O page's soft switches, the slot ROM election
/// protocol, and the Language Card's bank switching all need to see and
/// mutate each other's state on the same hot path, so `MainBus` owns all
/// of it directly instead of routing through trait objects.
pub struct MainBus {
    regions: RegionTable,
    layers: LayerStack,
    slots: SlotManager,
    language_card: LanguageCard,
}

/// What an address resolves to: either the I/O page's special dispatch,
/// or a concrete target ready for `read8`/`write8`.
enum Resolved {
    IoPage,
    Concrete {
        target: BusTarget,
        offset: u32,
        perms: PagePerms,
        context: MemoryContext,
    },
}

impl MainBus {
    /// Build the default Apple II memory map: 48K of RAM at $0000-$BFFF,
    /// the I/O page at $C000-$CFFF, and 12K of (initially blank) system
    /// ROM at $D000-$FFFF with the Language Card's read/write layers
    /// installed over it.
    pub fn new() -> Self {
        let ram = PhysicalMemory::create("main-ram", 0xC000, None);
        let rom = PhysicalMemory::create("system-rom", 0x3000, None);
        let language_card = LanguageCard::new();

        let regions = RegionTable::build(
            vec![
                RegionMapping {
                    start: Addr(0x0000),
                    size: 0xC000,
                    target: BusTarget::Ram(ram),
                    physical_base: 0,
                    perms: PagePerms::RW,
                    context: MemoryContext::new("main-ram"),
                    tag: RegionTag::Ram,
                },
                RegionMapping {
                    start: Addr(IO_PAGE_START),
                    size: 0x1000,
                    target: BusTarget::Composite,
                    physical_base: 0,
                    perms: PagePerms::RW,
                    context: MemoryContext::new("io"),
                    tag: RegionTag::Io,
                },
                RegionMapping {
                    start: Addr(0xD000),
                    size: 0x3000,
                    target: BusTarget::Rom(rom),
                    physical_base: 0,
                    perms: PagePerms::RX,
                    context: MemoryContext::new("rom"),
                    tag: RegionTag::Rom,
                },
            ],
            ADDRESS_SPACE_SIZE,
        )
        .expect("default Apple II region table is well-formed");

        let mut layers = LayerStack::new();
        layers.install(Layer::new(
            "lc-read",
            10,
            Addr(0xD000),
            0x3000,
            language_card.read_resolver(),
        ));
        layers.install(Layer::new(
            "lc-write",
            10,
            Addr(0xD000),
            0x3000,
            language_card.write_resolver(),
        ));

        MainBus {
            regions,
            layers,
            slots: SlotManager::new(),
            language_card,
        }
    }

    /// Build a bus from caller-supplied regions (used by
    /// [`crate::core::machine::Machine::from_profile`]). `regions` must
    /// already include the I/O page and Language Card ROM window.
    pub fn from_regions(regions: Vec<RegionMapping>) -> Result<Self> {
        let regions = RegionTable::build(regions, ADDRESS_SPACE_SIZE)?;
        let language_card = LanguageCard::new();
        let mut layers = LayerStack::new();
        layers.install(Layer::new(
            "lc-read",
            10,
            Addr(0xD000),
            0x3000,
            language_card.read_resolver(),
        ));
        layers.install(Layer::new(
            "lc-write",
            10,
            Addr(0xD000),
            0x3000,
            language_card.write_resolver(),
        ));
        Ok(MainBus {
            regions,
            layers,
            slots: SlotManager::new(),
            language_card,
        })
    }

    pub fn language_card(&self) -> &LanguageCard {
        &self.language_card
    }

    pub fn slots(&self) -> &SlotManager {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut SlotManager {
        &mut self.slots
    }

    /// Load a ROM image into the $D000-$FFFF system ROM region.
    ///
    /// This always writes the physical memory directly (a
    /// [`AccessIntent::DebugWrite`]-equivalent path), independent of
    /// whatever the Language Card currently has layered over it.
    pub fn load_system_rom(&mut self, data: &[u8]) {
        let region = self.regions.region_for(Addr(0xD000));
        if let BusTarget::Rom(mem) = &region.target {
            mem.load(data);
        }
    }

    /// Resolve `addr` against the layer stack, falling back to the base
    /// region table. Has no side effects: safe to call purely to learn
    /// what context an access would resolve to (used by trap gating).
    fn resolve(&self, addr: Addr, intent: AccessIntent) -> Resolved {
        if (IO_PAGE_START..=IO_PAGE_END).contains(&addr.0) {
            return Resolved::IoPage;
        }
        if let Some(res) = self.layers.resolve(addr, intent) {
            let offset = res.physical_base + addr.offset_from(res.virtual_start);
            return Resolved::Concrete {
                target: res.target,
                offset,
                perms: res.perms,
                context: res.context,
            };
        }
        let region = self.regions.region_for(addr);
        let offset = region.physical_base + addr.offset_from(region.start);
        Resolved::Concrete {
            target: region.target.clone(),
            offset,
            perms: region.perms,
            context: region.context.clone(),
        }
    }

    /// The [`MemoryContext`] that would currently resolve for `addr`,
    /// without performing the access. Used by the trap registry to gate
    /// eligibility before a handler runs.
    pub fn resolve_context(&self, addr: Addr) -> MemoryContext {
        match self.resolve(addr, AccessIntent::DebugRead) {
            Resolved::IoPage => MemoryContext::new("io"),
            Resolved::Concrete { context, .. } => context,
        }
    }

    pub fn read8(&mut self, addr: Addr, intent: AccessIntent) -> u8 {
        self.read8_flagged(addr, intent, AccessFlags::empty())
    }

    /// Read a byte, carrying [`AccessFlags`] alongside the intent. Used
    /// by read-modify-write opcodes to mark their operand fetch as
    /// distinct from a standalone load (`spec.md` §4.1); every other
    /// caller goes through [`MainBus::read8`], which passes empty flags.
    pub fn read8_flagged(&mut self, addr: Addr, intent: AccessIntent, flags: AccessFlags) -> u8 {
        match self.resolve(addr, intent) {
            Resolved::IoPage => self.io_read(addr, intent, flags),
            Resolved::Concrete {
                target,
                offset,
                perms,
                ..
            } => {
                if !perms.contains(PagePerms::READ) {
                    OPEN_BUS
                } else {
                    target.read8(offset, intent)
                }
            }
        }
    }

    pub fn write8(&mut self, addr: Addr, intent: AccessIntent, value: u8) -> WriteOutcome {
        match self.resolve(addr, intent) {
            Resolved::IoPage => {
                self.io_write(addr, intent, value);
                WriteOutcome::Written
            }
            Resolved::Concrete {
                target,
                offset,
                perms,
                ..
            } => {
                if !perms.contains(PagePerms::WRITE) && intent.is_live() {
                    WriteOutcome::Rejected
                } else {
                    target.write8(offset, intent, value)
                }
            }
        }
    }

    /// Little-endian 16-bit read composed of two `read8` calls, low byte
    /// first.
    pub fn read16(&mut self, addr: Addr, intent: AccessIntent) -> u16 {
        let lo = self.read8(addr, intent) as u16;
        let hi = self.read8(Addr(addr.0.wrapping_add(1) & 0xFFFF), intent) as u16;
        (hi << 8) | lo
    }

    pub fn write16(&mut self, addr: Addr, intent: AccessIntent, value: u16) {
        self.write8(addr, intent, (value & 0xFF) as u8);
        self.write8(
            Addr(addr.0.wrapping_add(1) & 0xFFFF),
            intent,
            (value >> 8) as u8,
        );
    }
}

impl Default for MainBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_round_trips() {
        let mut bus = MainBus::new();
        bus.write8(Addr(0x0400), AccessIntent::Write, 0xC1);
        assert_eq!(bus.read8(Addr(0x0400), AccessIntent::Read), 0xC1);
    }

    #[test]
    fn rom_rejects_live_write() {
        let mut bus = MainBus::new();
        bus.load_system_rom(&[0xEA; 0x3000]);
        bus.write8(Addr(0xF000), AccessIntent::Write, 0x00);
        assert_eq!(bus.read8(Addr(0xF000), AccessIntent::Read), 0xEA);
    }

    #[test]
    fn read16_is_little_endian() {
        let mut bus = MainBus::new();
        bus.write8(Addr(0x2000), AccessIntent::Write, 0x34);
        bus.write8(Addr(0x2001), AccessIntent::Write, 0x12);
        assert_eq!(bus.read16(Addr(0x2000), AccessIntent::Read), 0x1234);
    }

    #[test]
    fn full_address_space_resolves_without_panicking() {
        let mut bus = MainBus::new();
        for page in 0..16u32 {
            let addr = Addr(page * crate::core::addr::PAGE_SIZE);
            let _ = bus.read8(addr, AccessIntent::DebugRead);
        }
    }
}
