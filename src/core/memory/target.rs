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

//! Bus targets: the leaf objects that actually service a read or write
//! once the bus has resolved an address to a physical offset.

use super::PhysicalMemory;
use crate::core::addr::{AccessIntent, OPEN_BUS};

/// The outcome of a write attempt at the target level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Rejected,
}

/// One of the four leaf target kinds a region or layer resolution can
/// point at.
///
/// `Composite` is used exclusively for the $C000-$CFFF I/O page; its
/// children (keyboard, Language Card switches, per-slot windows, slot
/// ROM, expansion ROM) are dispatched directly by
/// [`crate::core::memory::MainBus`] rather than through `read8`/`write8`
/// here, since they need mutable access to the slot manager and
/// Language Card controller that a `read8(&self, ...)` signature can't
/// provide. This variant exists so the region table can still name the
/// I/O page's target uniformly with every other region.
#[derive(Clone)]
pub enum BusTarget {
    Ram(PhysicalMemory),
    Rom(PhysicalMemory),
    Composite,
    Null,
}

impl BusTarget {
    /// Read a byte at `offset` within this target's backing memory.
    ///
    /// Out-of-range offsets and [`BusTarget::Null`]/[`BusTarget::Composite`]
    /// both answer open bus; this is the designed fallback, not an error.
    pub fn read8(&self, offset: u32, _intent: AccessIntent) -> u8 {
        match self {
            BusTarget::Ram(mem) | BusTarget::Rom(mem) => {
                if offset < mem.len() {
                    mem.read(offset)
                } else {
                    OPEN_BUS
                }
            }
            BusTarget::Composite | BusTarget::Null => OPEN_BUS,
        }
    }

    /// Write a byte at `offset`.
    ///
    /// ROM targets reject every non-debug write (`intent.is_live()`); a
    /// debug write is allowed through so tooling can hot-load a character
    /// ROM image at runtime, per `spec.md` §4.2.
    pub fn write8(&self, offset: u32, intent: AccessIntent, value: u8) -> WriteOutcome {
        match self {
            BusTarget::Ram(mem) => {
                if offset < mem.len() {
                    mem.write(offset, value);
                    WriteOutcome::Written
                } else {
                    WriteOutcome::Rejected
                }
            }
            BusTarget::Rom(mem) => {
                if intent.is_live() {
                    WriteOutcome::Rejected
                } else if offset < mem.len() {
                    mem.write(offset, value);
                    WriteOutcome::Written
                } else {
                    WriteOutcome::Rejected
                }
            }
            BusTarget::Composite | BusTarget::Null => WriteOutcome::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_round_trips() {
        let mem = PhysicalMemory::create("test-ram", 16, None);
        let target = BusTarget::Ram(mem);
        assert_eq!(
            target.write8(4, AccessIntent::Write, 0xAB),
            WriteOutcome::Written
        );
        assert_eq!(target.read8(4, AccessIntent::Read), 0xAB);
    }

    #[test]
    fn rom_rejects_live_write_but_accepts_debug_write() {
        let mem = PhysicalMemory::create("test-rom", 16, None);
        let target = BusTarget::Rom(mem);
        assert_eq!(
            target.write8(0, AccessIntent::Write, 0x42),
            WriteOutcome::Rejected
        );
        assert_eq!(target.read8(0, AccessIntent::Read), 0x00);

        assert_eq!(
            target.write8(0, AccessIntent::DebugWrite, 0x42),
            WriteOutcome::Written
        );
        assert_eq!(target.read8(0, AccessIntent::Read), 0x42);
    }

    #[test]
    fn out_of_range_offset_is_open_bus() {
        let mem = PhysicalMemory::create("tiny", 4, None);
        let target = BusTarget::Ram(mem);
        assert_eq!(target.read8(100, AccessIntent::Read), OPEN_BUS);
        assert_eq!(
            target.write8(100, AccessIntent::Write, 1),
            WriteOutcome::Rejected
        );
    }

    #[test]
    fn null_and_composite_are_always_open_bus() {
        assert_eq!(BusTarget::Null.read8(0, AccessIntent::Read), OPEN_BUS);
        assert_eq!(BusTarget::Composite.read8(0, AccessIntent::Read), OPEN_BUS);
    }
}
