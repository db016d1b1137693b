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

//! Overlay layers: runtime-toggleable resolutions that sit in front of
//! the base region table.
//!
//! The Language Card controller is the only stock installer of layers
//! (a read layer and a write layer over $D000-$FFFF), but the mechanism
//! is generic so a future auxiliary-memory or internal-ROM card could
//! install more without touching the bus resolution algorithm.

use std::rc::Rc;

use crate::core::addr::{AccessIntent, Addr, MemoryContext, PagePerms};
use crate::core::memory::target::BusTarget;

/// What a layer resolves an access to, in place of the base region.
///
/// `virtual_start` lets a resolver answer with a window that doesn't
/// line up with the layer's own nominal range - this is what lets the
/// Language Card's single $D000-$FFFF layer express a bank switch that
/// only affects the bottom half of the range (see
/// [`crate::core::language_card`]).
pub struct LayerResolution {
    pub target: BusTarget,
    pub physical_base: u32,
    pub virtual_start: Addr,
    pub perms: PagePerms,
    pub context: MemoryContext,
}

/// Something that can answer "what does this layer resolve `addr` to
/// right now", given the live state of whatever controller owns it.
pub trait LayerResolver {
    fn resolve(&self, addr: Addr, intent: AccessIntent) -> Option<LayerResolution>;
}

/// A single overlay: a named, prioritized, independently enable-able
/// resolver bound to a fixed address range.
pub struct Layer {
    pub name: String,
    pub priority: i32,
    pub active: bool,
    pub start: Addr,
    pub size: u32,
    resolver: Rc<dyn LayerResolver>,
}

impl Layer {
    pub fn new(
        name: impl Into<String>,
        priority: i32,
        start: Addr,
        size: u32,
        resolver: Rc<dyn LayerResolver>,
    ) -> Self {
        Layer {
            name: name.into(),
            priority,
            active: true,
            start,
            size,
            resolver,
        }
    }

    pub fn contains(&self, addr: Addr) -> bool {
        addr.0 >= self.start.0 && addr.0 < self.start.0 + self.size
    }
}

/// An ordered stack of [`Layer`]s, highest priority first.
///
/// Resolution walks the stack in priority order and returns the first
/// active, range-matching layer whose resolver answers `Some`. A layer
/// whose resolver answers `None` (e.g. the Language Card's write layer
/// when write-enable is off) simply falls through to the next layer, and
/// ultimately to the base region table if none match.
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        LayerStack { layers: Vec::new() }
    }

    /// Install a layer, keeping the stack sorted by descending priority.
    pub fn install(&mut self, layer: Layer) {
        let pos = self
            .layers
            .iter()
            .position(|l| l.priority < layer.priority)
            .unwrap_or(self.layers.len());
        self.layers.insert(pos, layer);
    }

    /// Enable or disable a layer by name. A no-op if no layer has that name.
    pub fn set_active(&mut self, name: &str, active: bool) {
        if let Some(layer) = self.layers.iter_mut().find(|l| l.name == name) {
            layer.active = active;
        }
    }

    pub fn resolve(&self, addr: Addr, intent: AccessIntent) -> Option<LayerResolution> {
        for layer in &self.layers {
            if layer.active && layer.contains(addr) {
                if let Some(resolution) = layer.resolver.resolve(addr, intent) {
                    return Some(resolution);
                }
            }
        }
        None
    }
}
