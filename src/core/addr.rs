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

//! Addressable primitives: [`Addr`], [`Cycle`], [`PagePerms`],
//! [`AccessIntent`], [`AccessFlags`], and [`MemoryContext`].
//!
//! These are the strong types every other module in the crate builds on.
//! Keeping them as newtypes (rather than raw `u32`/`u64`) means a region
//! boundary, a cycle stamp, and a plain byte offset can never be confused
//! at a function boundary, while `.0` access keeps the hot bus-resolution
//! path allocation-free and branch-cheap.

use std::fmt;

/// Page size in bytes. All regions and layer ranges are page-aligned.
pub const PAGE_SIZE: u32 = 4096;

/// A 32-bit virtual address inside the CPU's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Addr(pub u32);

impl Addr {
    /// The page number this address falls in (`addr / PAGE_SIZE`).
    #[inline(always)]
    pub fn page(self) -> u32 {
        self.0 / PAGE_SIZE
    }

    /// The offset of this address within its page.
    #[inline(always)]
    pub fn page_offset(self) -> u32 {
        self.0 % PAGE_SIZE
    }

    /// Whether `self` is aligned to a page boundary.
    #[inline(always)]
    pub fn is_page_aligned(self) -> bool {
        self.0 % PAGE_SIZE == 0
    }

    /// `self - base`, saturating at zero if `self < base`.
    #[inline(always)]
    pub fn offset_from(self, base: Addr) -> u32 {
        self.0.saturating_sub(base.0)
    }
}

impl From<u32> for Addr {
    fn from(v: u32) -> Self {
        Addr(v)
    }
}

impl From<u16> for Addr {
    fn from(v: u16) -> Self {
        Addr(v as u32)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:04X}", self.0)
    }
}

/// A 64-bit monotonically increasing cycle counter.
///
/// Incremented by the CPU after each instruction by that instruction's
/// measured cost. Never decreases and never wraps in practice (at 1 MHz
/// it would take over 500,000 years to overflow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cycle(pub u64);

impl Cycle {
    /// `self + n`, wrapping only on true overflow (never reached in
    /// practice; `wrapping_add` is used instead of `+` so a pathological
    /// fuzz target can't panic the emulator over a debug-build overflow
    /// check).
    #[inline(always)]
    pub fn advance(self, n: u64) -> Cycle {
        Cycle(self.0.wrapping_add(n))
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags::bitflags! {
    /// Bitmask of permissions a region or layer resolution grants.
    ///
    /// A read to a page without [`PagePerms::READ`] returns the open-bus
    /// value (`0xFF`); a write without [`PagePerms::WRITE`] is silently
    /// dropped. Both are designed behavior, not errors (`spec.md` §7).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PagePerms: u8 {
        const READ = 0b001;
        const WRITE = 0b010;
        const EXECUTE = 0b100;
    }
}

impl PagePerms {
    /// Read/write, no execute — the common case for RAM regions.
    pub const RW: PagePerms = PagePerms::READ.union(PagePerms::WRITE);
    /// Read/execute, no write — the common case for ROM regions.
    pub const RX: PagePerms = PagePerms::READ.union(PagePerms::EXECUTE);
}

/// The open-bus value returned when a read targets an address with no
/// responding device, or a page without [`PagePerms::READ`].
pub const OPEN_BUS: u8 = 0xFF;

/// What kind of access is being made to the bus.
///
/// Debug intents ([`AccessIntent::DebugRead`], [`AccessIntent::DebugWrite`])
/// bypass soft-switch side effects and trap invocation so tooling can
/// inspect machine state without mutating it — this is a hard contract,
/// not an optimization (`spec.md` §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessIntent {
    Read,
    Write,
    Execute,
    DebugRead,
    DebugWrite,
}

impl AccessIntent {
    /// Whether this intent may trigger soft-switch side effects and trap
    /// dispatch (i.e. it is not one of the `Debug*` variants).
    #[inline(always)]
    pub fn is_live(self) -> bool {
        !matches!(self, AccessIntent::DebugRead | AccessIntent::DebugWrite)
    }

    /// Whether this intent represents a read of any kind (including debug
    /// and execute fetches).
    #[inline(always)]
    pub fn is_read(self) -> bool {
        matches!(
            self,
            AccessIntent::Read | AccessIntent::Execute | AccessIntent::DebugRead
        )
    }

    /// Whether this intent represents a write of any kind.
    #[inline(always)]
    pub fn is_write(self) -> bool {
        matches!(self, AccessIntent::Write | AccessIntent::DebugWrite)
    }
}

bitflags::bitflags! {
    /// Extra markers carried alongside an access, e.g. the "dummy read"
    /// a read-modify-write instruction performs before writing back.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u8 {
        /// Marks the operand fetch of a read-modify-write opcode (ASL,
        /// LSR, ROL, ROR, INC, DEC, TRB, TSB, RMB, SMB on memory): the
        /// read that feeds the modify step rather than a standalone
        /// load. Soft-switch handlers consult this to avoid letting an
        /// RMW's incidental read arm a multi-read protocol (the
        /// Language Card's write-enable latch, `spec.md` §4.7) the same
        /// way a deliberate `LDA` of the switch would.
        const DUMMY_READ = 0b01;
    }
}

/// An identifier attached to traps to disambiguate which overlay is
/// currently resolved for an address (`rom`, `lc-ram`, `main-ram`,
/// `aux-ram`, ...). A trap is eligible only when its context matches the
/// context the bus actually resolved for that access.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoryContext(pub String);

impl MemoryContext {
    pub fn new(name: impl Into<String>) -> Self {
        MemoryContext(name.into())
    }
}

impl fmt::Display for MemoryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_page_math() {
        let a = Addr(0x1234);
        assert_eq!(a.page(), 1);
        assert_eq!(a.page_offset(), 0x0234);
        assert!(!a.is_page_aligned());
        assert!(Addr(0xD000).is_page_aligned());
    }

    #[test]
    fn addr_offset_from_saturates() {
        assert_eq!(Addr(0x10).offset_from(Addr(0x20)), 0);
        assert_eq!(Addr(0x30).offset_from(Addr(0x20)), 0x10);
    }

    #[test]
    fn page_perms_rw_rx() {
        assert!(PagePerms::RW.contains(PagePerms::READ));
        assert!(PagePerms::RW.contains(PagePerms::WRITE));
        assert!(!PagePerms::RW.contains(PagePerms::EXECUTE));
        assert!(PagePerms::RX.contains(PagePerms::EXECUTE));
        assert!(!PagePerms::RX.contains(PagePerms::WRITE));
    }

    #[test]
    fn access_intent_is_live() {
        assert!(AccessIntent::Read.is_live());
        assert!(AccessIntent::Write.is_live());
        assert!(!AccessIntent::DebugRead.is_live());
        assert!(!AccessIntent::DebugWrite.is_live());
    }

    #[test]
    fn access_intent_read_write_classification() {
        assert!(AccessIntent::Read.is_read());
        assert!(AccessIntent::Execute.is_read());
        assert!(AccessIntent::DebugRead.is_read());
        assert!(!AccessIntent::Write.is_read());

        assert!(AccessIntent::Write.is_write());
        assert!(AccessIntent::DebugWrite.is_write());
        assert!(!AccessIntent::Read.is_write());
    }

    #[test]
    fn cycle_advance_does_not_panic_near_max() {
        let c = Cycle(u64::MAX - 1);
        assert_eq!(c.advance(1), Cycle(u64::MAX));
        assert_eq!(c.advance(2), Cycle(0));
    }

    #[test]
    fn memory_context_equality() {
        assert_eq!(MemoryContext::new("rom"), MemoryContext::new("rom"));
        assert_ne!(MemoryContext::new("rom"), MemoryContext::new("lc-ram"));
    }
}
