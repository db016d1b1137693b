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

//! The trap registry: a context-aware `HashMap<(Addr, TrapOperation),
//! TrapEntry>` letting native routines stand in for ROM subroutines
//! (`spec.md` §4.8).
//!
//! A trap only fires when its declared context is actually live: a
//! slot trap requires its slot to be occupied (and, for traps in the
//! `$C800-$CFFF` window, to be the currently elected expansion slot);
//! a trap at `$D000` or above requires the Language Card's RAM-read to
//! be off, since otherwise LC RAM — not ROM — is what the CPU would
//! actually execute.

use std::collections::HashMap;

use crate::core::addr::{Addr, Cycle};
use crate::core::cpu::Cpu;
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::MainBus;

/// Which kind of access can trigger a trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrapOperation {
    /// The CPU is about to execute the opcode at this address.
    Call,
    ReadByte,
    WriteByte,
    Execute,
}

/// A tag used to mass-enable/disable related traps, e.g. all ROM
/// routine stand-ins versus all disk-controller stand-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrapCategory {
    Rom,
    Disk,
    Clock,
    Custom,
}

/// Context supplied to a trap handler at invocation time.
#[derive(Debug, Clone, Copy)]
pub struct TrapContext {
    pub cycle: Cycle,
}

/// What a trap handler does once invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapResult {
    /// Defer to the bus; the original access proceeds untouched.
    NotHandled,
    /// The trap fully serviced the access.
    Handled {
        cycles_consumed: u64,
        /// When `true` and the trap operation was `Call`, the CPU pops
        /// the return address a `JSR` would have pushed to get here and
        /// resumes just past the call site, exactly as if the ROM
        /// routine had run and hit its own `RTS` (`spec.md` §4.8).
        skip_instruction: bool,
    },
}

pub type TrapHandler = Box<dyn Fn(&mut Cpu, &mut MainBus, TrapContext) -> TrapResult>;

pub struct TrapEntry {
    pub address: Addr,
    pub operation: TrapOperation,
    pub name: String,
    pub category: TrapCategory,
    pub handler: TrapHandler,
    pub is_enabled: bool,
    pub slot_number: Option<u8>,
    pub requires_expansion_rom: bool,
    pub description: String,
}

pub struct TrapRegistry {
    entries: HashMap<(Addr, TrapOperation), TrapEntry>,
    disabled_categories: std::collections::HashSet<TrapCategory>,
}

impl TrapRegistry {
    pub fn new() -> Self {
        TrapRegistry {
            entries: HashMap::new(),
            disabled_categories: std::collections::HashSet::new(),
        }
    }

    /// Register a trap. Fails if `(address, operation)` is already taken
    /// (`spec.md` §4.8: "idempotent-failing").
    pub fn register(&mut self, entry: TrapEntry) -> Result<()> {
        let key = (entry.address, entry.operation);
        if self.entries.contains_key(&key) {
            log::warn!(
                "trap registration conflict: \"{}\" at {} already taken",
                entry.name,
                entry.address
            );
            return Err(EmulatorError::TrapConflict {
                address: entry.address,
                operation: entry.operation,
            });
        }
        log::debug!("trap \"{}\" registered at {}", entry.name, entry.address);
        self.entries.insert(key, entry);
        Ok(())
    }

    /// Remove every trap installed for `slot`. Used when a card is
    /// removed from a slot.
    pub fn unregister_slot(&mut self, slot: u8) {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.slot_number != Some(slot));
        log::debug!(
            "unregistered {} trap(s) for slot {}",
            before - self.entries.len(),
            slot
        );
    }

    pub fn set_category_enabled(&mut self, category: TrapCategory, enabled: bool) {
        if enabled {
            self.disabled_categories.remove(&category);
        } else {
            self.disabled_categories.insert(category);
        }
    }

    /// Look up and, if eligible, invoke the trap for `(addr, op)`. Bus
    /// accesses call this unconditionally on the hot path (for `Call`,
    /// from [`crate::core::cpu::Cpu::step`]; for the byte operations,
    /// from [`crate::core::memory::MainBus`] before a live access), so a
    /// miss must be cheap: a single hash lookup, no allocation.
    pub fn try_execute(
        &self,
        addr: Addr,
        op: TrapOperation,
        cpu: &mut Cpu,
        bus: &mut MainBus,
        ctx: TrapContext,
    ) -> TrapResult {
        let Some(entry) = self.entries.get(&(addr, op)) else {
            return TrapResult::NotHandled;
        };
        if !entry.is_enabled || self.disabled_categories.contains(&entry.category) {
            return TrapResult::NotHandled;
        }
        if !self.gate_permits(entry, bus) {
            log::trace!(
                "trap \"{}\" at {} gated off (context not live)",
                entry.name,
                entry.address
            );
            return TrapResult::NotHandled;
        }
        log::trace!("trap \"{}\" firing at {}", entry.name, entry.address);
        (entry.handler)(cpu, bus, ctx)
    }

    fn gate_permits(&self, entry: &TrapEntry, bus: &MainBus) -> bool {
        if let Some(slot) = entry.slot_number {
            if !bus.slots().is_occupied(slot) {
                return false;
            }
            if entry.requires_expansion_rom && bus.slots().active_expansion_slot() != Some(slot) {
                return false;
            }
        }
        if entry.address.0 >= 0xD000 && bus.language_card().ram_read_enabled() {
            return false;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TrapRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::MainBus;
    use std::cell::Cell;
    use std::rc::Rc;

    fn entry(addr: u32, op: TrapOperation, handler: TrapHandler) -> TrapEntry {
        TrapEntry {
            address: Addr(addr),
            operation: op,
            name: "test".into(),
            category: TrapCategory::Rom,
            handler,
            is_enabled: true,
            slot_number: None,
            requires_expansion_rom: false,
            description: "test trap".into(),
        }
    }

    #[test]
    fn fires_exactly_once_and_reports_cycles() {
        let mut registry = TrapRegistry::new();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        registry
            .register(entry(
                0xFBE4,
                TrapOperation::Call,
                Box::new(move |_, _, _| {
                    c.set(c.get() + 1);
                    TrapResult::Handled {
                        cycles_consumed: 6,
                        skip_instruction: true,
                    }
                }),
            ))
            .unwrap();

        let mut cpu = Cpu::new();
        let mut bus = MainBus::new();
        let result = registry.try_execute(
            Addr(0xFBE4),
            TrapOperation::Call,
            &mut cpu,
            &mut bus,
            TrapContext { cycle: Cycle(0) },
        );
        assert_eq!(calls.get(), 1);
        assert_eq!(
            result,
            TrapResult::Handled {
                cycles_consumed: 6,
                skip_instruction: true
            }
        );
    }

    #[test]
    fn registering_same_key_twice_fails() {
        let mut registry = TrapRegistry::new();
        registry
            .register(entry(
                0x1000,
                TrapOperation::Call,
                Box::new(|_, _, _| TrapResult::NotHandled),
            ))
            .unwrap();
        let err = registry.register(entry(
            0x1000,
            TrapOperation::Call,
            Box::new(|_, _, _| TrapResult::NotHandled),
        ));
        assert!(err.is_err());
    }

    #[test]
    fn rom_trap_does_not_fire_while_language_card_ram_read_is_on() {
        let mut registry = TrapRegistry::new();
        registry
            .register(entry(
                0xFD0C,
                TrapOperation::Call,
                Box::new(|_, _, _| TrapResult::Handled {
                    cycles_consumed: 1,
                    skip_instruction: false,
                }),
            ))
            .unwrap();

        let mut cpu = Cpu::new();
        let mut bus = MainBus::new();
        // Enable LC RAM read: $C083 has low nibble 3 (RAM read, write-arm).
        use crate::core::addr::AccessIntent;
        bus.read8(Addr(0xC083), AccessIntent::Read);
        assert!(bus.language_card().ram_read_enabled());

        let result = registry.try_execute(
            Addr(0xFD0C),
            TrapOperation::Call,
            &mut cpu,
            &mut bus,
            TrapContext { cycle: Cycle(0) },
        );
        assert_eq!(result, TrapResult::NotHandled);
    }

    #[test]
    fn unregister_slot_removes_only_that_slots_traps() {
        let mut registry = TrapRegistry::new();
        let mut slot_entry = entry(
            0xC600,
            TrapOperation::Call,
            Box::new(|_, _, _| TrapResult::NotHandled),
        );
        slot_entry.slot_number = Some(6);
        registry.register(slot_entry).unwrap();
        registry
            .register(entry(
                0xFBE4,
                TrapOperation::Call,
                Box::new(|_, _, _| TrapResult::NotHandled),
            ))
            .unwrap();

        registry.unregister_slot(6);
        assert_eq!(registry.len(), 1);
    }
}
