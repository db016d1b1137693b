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

//! [`Machine`]: the CPU, bus, trap registry, and event scheduler wired
//! together into one runnable unit, plus the `peek`/`poke`/`call` surface
//! external collaborators (the BASIC interpreter, a debugger) drive it
//! through (`spec.md` §6).

use std::collections::HashMap;

use crate::core::addr::{AccessIntent, Addr, MemoryContext, PagePerms};
use crate::core::cpu::Cpu;
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::{BusTarget, MainBus, PhysicalMemory, RegionMapping, RegionTag};
use crate::core::profile::{self, MachineProfile, RegionKind};
use crate::core::scheduler::EventScheduler;
use crate::core::trap::TrapRegistry;

/// A fully wired Apple II-class machine: CPU, bus, traps, and scheduler.
pub struct Machine {
    pub cpu: Cpu,
    pub bus: MainBus,
    pub traps: TrapRegistry,
    pub scheduler: EventScheduler,
}

impl Machine {
    /// The default machine: 48K RAM, blank system ROM, no slot cards, no
    /// traps installed. Mirrors [`MainBus::new`].
    pub fn new() -> Self {
        Machine {
            cpu: Cpu::new(),
            bus: MainBus::new(),
            traps: TrapRegistry::new(),
            scheduler: EventScheduler::new(),
        }
    }

    /// Build a machine from a parsed [`MachineProfile`] (`spec.md` §6).
    ///
    /// Only the `physical`/`regions` portion of the profile drives the
    /// bus layout; `controllers` entries other than `"language-card"` are
    /// accepted but not separately wired (the Language Card is always
    /// present on [`MainBus`], so that entry is informational), and
    /// `slots.cards` describe peripherals this core does not itself
    /// implement — the host installs concrete [`crate::core::slots::SlotCard`]s
    /// into [`MainBus::slots_mut`] after construction.
    pub fn from_profile(profile: &MachineProfile) -> Result<Self> {
        profile.validate()?;
        let rom_images = profile::load_rom_images(profile)?;

        let mut physical_blocks: HashMap<String, PhysicalMemory> = HashMap::new();
        for spec in &profile.physical {
            let block = PhysicalMemory::create(spec.name.clone(), spec.size.0, None);
            for source in &spec.sources {
                if source.kind != "rom-image" {
                    log::warn!(
                        "physical block \"{}\" has unsupported source kind \"{}\", skipping",
                        spec.name,
                        source.kind
                    );
                    continue;
                }
                let bytes = rom_images.get(&source.rom_image).ok_or_else(|| {
                    EmulatorError::RomImageNotFound(source.rom_image.clone())
                })?;
                let offset = source.offset.0 as usize;
                let end = offset + bytes.len();
                if end as u32 > block.len() {
                    return Err(EmulatorError::ConfigError(format!(
                        "rom-image \"{}\" does not fit in physical block \"{}\" at offset {}",
                        source.rom_image, spec.name, source.offset
                    )));
                }
                // Byte-at-a-time so a second source into the same block
                // doesn't clobber a prior one (`PhysicalMemory::load`
                // overwrites the whole buffer).
                for (i, byte) in bytes.iter().enumerate() {
                    block.write(offset as u32 + i as u32, *byte);
                }
            }
            physical_blocks.insert(spec.name.clone(), block);
        }

        let mut regions = Vec::with_capacity(profile.regions.len());
        for spec in &profile.regions {
            let perms = parse_permissions(&spec.permissions);
            let target = match spec.kind {
                RegionKind::Composite => BusTarget::Composite,
                RegionKind::Ram | RegionKind::Rom => {
                    let block = match &spec.source {
                        Some(name) => physical_blocks.get(name).cloned().ok_or_else(|| {
                            EmulatorError::ConfigError(format!(
                                "region \"{}\" references unknown physical block \"{}\"",
                                spec.name, name
                            ))
                        })?,
                        None => PhysicalMemory::create(spec.name.clone(), spec.size.0, None),
                    };
                    if spec.kind == RegionKind::Ram {
                        BusTarget::Ram(block)
                    } else {
                        BusTarget::Rom(block)
                    }
                }
            };
            let tag = match spec.kind {
                RegionKind::Ram => RegionTag::Ram,
                RegionKind::Rom => RegionTag::Rom,
                RegionKind::Composite => RegionTag::Io,
            };
            regions.push(RegionMapping {
                start: Addr(spec.start.0),
                size: spec.size.0,
                target,
                physical_base: spec.source_offset.map(|o| o.0).unwrap_or(0),
                perms,
                context: MemoryContext::new(spec.name.clone()),
                tag,
            });
        }

        for controller in &profile.controllers {
            if controller.kind != "language-card" {
                log::info!(
                    "controller \"{}\" of type \"{}\" is declared but not driven by this core",
                    controller.name,
                    controller.kind
                );
            }
        }

        let bus = MainBus::from_regions(regions)?;
        log::debug!(
            "built machine from profile: {} physical blocks, {} regions, {} slot cards declared",
            profile.physical.len(),
            profile.regions.len(),
            profile.slots.cards.len()
        );

        Ok(Machine {
            cpu: Cpu::new(),
            bus,
            traps: TrapRegistry::new(),
            scheduler: EventScheduler::new(),
        })
    }

    /// Parse `json` as a [`MachineProfile`] and build a [`Machine`] from
    /// it in one step. A thin convenience: reading the JSON off disk is
    /// still the host's job (`spec.md` §1), but `serde_json` is already
    /// in this crate's dependency stack to speak the profile format, so
    /// there is no reason to make every caller round-trip through
    /// `MachineProfile::from_json_str` themselves.
    pub fn from_profile_json(json: &str) -> Result<Self> {
        let profile = MachineProfile::from_json_str(json)?;
        Self::from_profile(&profile)
    }

    /// Reset the CPU: load PC from the reset vector, clear the
    /// Interrupt-disable and halted state per the 65C02 reset sequence.
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus);
    }

    /// Debug-intent read: never triggers soft-switch side effects or
    /// trap dispatch (`spec.md` §6).
    pub fn peek(&mut self, addr: u16) -> u8 {
        self.bus.read8(Addr(addr as u32), AccessIntent::DebugRead)
    }

    /// Write-intent write: honors ROM protection and soft switches, the
    /// same as a CPU store instruction would.
    pub fn poke(&mut self, addr: u16, value: u8) {
        self.bus.write8(Addr(addr as u32), AccessIntent::Write, value);
    }

    pub fn read_word(&mut self, addr: u16) -> u16 {
        self.bus.read16(Addr(addr as u32), AccessIntent::DebugRead)
    }

    pub fn write_word(&mut self, addr: u16, value: u16) {
        self.bus
            .write16(Addr(addr as u32), AccessIntent::Write, value);
    }

    /// Execute a single CPU step (instruction, interrupt service, or a
    /// no-op if halted/waiting). Returns cycles consumed.
    pub fn step(&mut self) -> u64 {
        self.cpu.step(&mut self.bus, &self.traps, &mut self.scheduler)
    }

    /// Push a synthetic return address, jump to `addr`, and run until an
    /// `RTS` returns through that sentinel or a `BRK` executes (`spec.md`
    /// §6's `call(addr)`).
    pub fn call(&mut self, addr: u16) {
        self.cpu
            .call(addr, &mut self.bus, &self.traps, &mut self.scheduler);
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_permissions(s: &str) -> PagePerms {
    let mut perms = PagePerms::empty();
    for c in s.chars() {
        match c {
            'r' => perms |= PagePerms::READ,
            'w' => perms |= PagePerms::WRITE,
            'x' => perms |= PagePerms::EXECUTE,
            _ => {}
        }
    }
    perms
}
