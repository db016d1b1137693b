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

//! The base region table: the machine's permanent, page-indexed memory
//! map before any layer overlay is considered.

use crate::core::addr::{Addr, MemoryContext, PagePerms, PAGE_SIZE};
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::target::BusTarget;

/// A coarse classification of what a region backs, used by debug tooling
/// and by tests asserting full coverage of the address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionTag {
    Ram,
    Rom,
    Io,
    Null,
}

/// One entry in the base region table.
///
/// `physical_base` is the offset added to `addr - start` to reach the
/// right byte inside `target`'s backing [`crate::core::memory::PhysicalMemory`];
/// it exists separately from the target so several regions can alias
/// disjoint or overlapping windows of the same physical block.
#[derive(Clone)]
pub struct RegionMapping {
    pub start: Addr,
    pub size: u32,
    pub target: BusTarget,
    pub physical_base: u32,
    pub perms: PagePerms,
    pub context: MemoryContext,
    pub tag: RegionTag,
}

impl RegionMapping {
    pub fn end(&self) -> u32 {
        self.start.0 + self.size
    }
}

/// The page-indexed base region table.
///
/// Lookup is `O(1)`: a page number is used directly as an index into a
/// flat array of region indices, built once at construction time.
pub struct RegionTable {
    regions: Vec<RegionMapping>,
    page_index: Vec<u16>,
}

impl RegionTable {
    /// Build a region table from a list of mappings spanning
    /// `0..address_space_size` with no gaps and no overlaps.
    ///
    /// # Errors
    ///
    /// Returns [`EmulatorError::ConfigError`] if any region is not
    /// page-aligned, if two regions overlap, or if the regions leave a
    /// gap anywhere in `0..address_space_size`.
    pub fn build(mut mappings: Vec<RegionMapping>, address_space_size: u32) -> Result<Self> {
        mappings.sort_by_key(|m| m.start.0);

        let mut cursor = 0u32;
        for mapping in &mappings {
            if !mapping.start.is_page_aligned() || mapping.size % PAGE_SIZE != 0 {
                return Err(EmulatorError::ConfigError(format!(
                    "region at {} (size {:#x}) is not page-aligned",
                    mapping.start, mapping.size
                )));
            }
            if mapping.start.0 != cursor {
                return Err(EmulatorError::ConfigError(format!(
                    "region table has a gap or overlap at {:#06x}: next region starts at {}",
                    cursor, mapping.start
                )));
            }
            cursor = mapping.end();
        }
        if cursor != address_space_size {
            return Err(EmulatorError::ConfigError(format!(
                "region table covers only {:#x} bytes, expected {:#x}",
                cursor, address_space_size
            )));
        }

        let num_pages = address_space_size / PAGE_SIZE;
        let mut page_index = vec![0u16; num_pages as usize];
        for (idx, mapping) in mappings.iter().enumerate() {
            let first_page = mapping.start.0 / PAGE_SIZE;
            let num_mapping_pages = mapping.size / PAGE_SIZE;
            for page in first_page..first_page + num_mapping_pages {
                page_index[page as usize] = idx as u16;
            }
        }

        Ok(RegionTable {
            regions: mappings,
            page_index,
        })
    }

    /// The region covering `addr`. Panics only if `addr` falls outside
    /// the address space the table was built for, which cannot happen
    /// for any address a 16-bit 65C02 program counter can produce once
    /// the table has been validated over the full 64 KiB space.
    pub fn region_for(&self, addr: Addr) -> &RegionMapping {
        let page = addr.page() as usize;
        &self.regions[self.page_index[page] as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::PhysicalMemory;

    fn ram_region(start: u32, size: u32) -> RegionMapping {
        RegionMapping {
            start: Addr(start),
            size,
            target: BusTarget::Ram(PhysicalMemory::create("ram", size, None)),
            physical_base: 0,
            perms: PagePerms::RW,
            context: MemoryContext::new("main-ram"),
            tag: RegionTag::Ram,
        }
    }

    #[test]
    fn rejects_gap() {
        let regions = vec![ram_region(0, PAGE_SIZE), ram_region(PAGE_SIZE * 2, PAGE_SIZE)];
        assert!(RegionTable::build(regions, PAGE_SIZE * 3).is_err());
    }

    #[test]
    fn rejects_overlap() {
        let regions = vec![ram_region(0, PAGE_SIZE * 2), ram_region(PAGE_SIZE, PAGE_SIZE)];
        assert!(RegionTable::build(regions, PAGE_SIZE * 2).is_err());
    }

    #[test]
    fn rejects_incomplete_coverage() {
        let regions = vec![ram_region(0, PAGE_SIZE)];
        assert!(RegionTable::build(regions, PAGE_SIZE * 2).is_err());
    }

    #[test]
    fn builds_and_looks_up_contiguous_regions() {
        let regions = vec![ram_region(0, PAGE_SIZE), ram_region(PAGE_SIZE, PAGE_SIZE)];
        let table = RegionTable::build(regions, PAGE_SIZE * 2).unwrap();
        assert_eq!(table.region_for(Addr(0)).start, Addr(0));
        assert_eq!(table.region_for(Addr(PAGE_SIZE)).start, Addr(PAGE_SIZE));
        assert_eq!(table.region_for(Addr(PAGE_SIZE + 10)).start, Addr(PAGE_SIZE));
    }
}
