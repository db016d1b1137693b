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

//! apple2core: the memory/CPU core of an Apple II-class emulator
//!
//! This crate provides the hot-path simulation core shared by a family of
//! Apple II machine emulators: a layered memory bus, a 65C02 CPU, the
//! slot/expansion-ROM dispatch machinery, the Language Card bank-switching
//! controller, and a trap registry that lets native routines stand in for
//! ROM subroutines.
//!
//! # Architecture
//!
//! - [`core::addr`]: strong types for addresses, cycles, and permissions
//! - [`core::memory`]: physical memory, bus targets, region table, layers
//! - [`core::slots`]: the 7-slot expansion bus and $C800-$CFFF election
//! - [`core::language_card`]: the $D000-$FFFF bank-switched RAM controller
//! - [`core::trap`]: native trap registration and dispatch
//! - [`core::cpu`]: 65C02 registers, addressing modes, and opcodes
//! - [`core::scheduler`]: cycle-ordered event queue
//! - [`core::profile`]: the machine-profile JSON data model
//! - [`core::machine`]: wiring all of the above into a runnable machine
//!
//! # Example
//!
//! ```
//! use apple2core::core::machine::Machine;
//!
//! let mut machine = Machine::new();
//! machine.poke(0x0400, 0xC1);
//! assert_eq!(machine.peek(0x0400), 0xC1);
//! ```
//!
//! # What this crate does not do
//!
//! The BASIC lexer/parser/interpreter, debugger shell, GUI windows, video
//! rendering, speaker DSP, keyboard event sources, and disk image parsing
//! are external collaborators. They talk to this crate only through
//! [`core::machine::Machine::peek`], [`core::machine::Machine::poke`], and
//! [`core::machine::Machine::call`].
//!
//! # Error Handling
//!
//! All fallible operations return [`core::error::Result<T>`], an alias for
//! `Result<T, EmulatorError>`.

pub mod core;

pub use core::error::{EmulatorError, Result};
