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

//! Crate-wide error type.
//!
//! Out-of-bounds bus accesses and permission denials are *not* errors in
//! this crate (they resolve to open-bus reads or dropped writes, per
//! `spec.md` §7); `EmulatorError` exists for machine construction and trap
//! registration failures, which are the only fallible operations here.

use crate::core::addr::Addr;
use crate::core::trap::TrapOperation;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Everything that can make building or configuring a machine fail.
#[derive(Debug, thiserror::Error)]
pub enum EmulatorError {
    /// A machine profile failed validation: unaligned region, overlapping
    /// regions, a `ram`/`rom` region with no backing physical memory, or a
    /// slot number outside 1..=7.
    #[error("invalid machine profile: {0}")]
    ConfigError(String),

    /// A ROM image file referenced by a profile could not be opened.
    #[error("ROM image not found: {0}")]
    RomImageNotFound(String),

    /// A ROM image file's size did not match the profile's declared size.
    #[error("invalid ROM image size: expected {expected} bytes, got {got}")]
    InvalidRomImageSize { expected: usize, got: usize },

    /// Registering a trap at an `(address, operation)` pair that already
    /// has a handler. Registration is idempotent-failing, not overwriting.
    #[error("trap already registered at {address:?} for {operation:?}")]
    TrapConflict {
        address: Addr,
        operation: TrapOperation,
    },

    /// A card install targeted a slot that is already occupied, or a slot
    /// number outside `1..=7`.
    #[error("slot {0} is occupied or out of range")]
    SlotOccupied(u8),

    /// Propagated filesystem error (ROM image loading).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Propagated JSON error (machine profile parsing).
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
