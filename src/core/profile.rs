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

//! The machine-profile JSON data model (`spec.md` §6).
//!
//! A profile is loaded once at machine build time and describes the
//! physical memory blocks, the base region mapping, the fixed controllers
//! (Language Card, auxiliary memory), and the slot/card configuration. It
//! never changes shape at runtime; [`crate::core::machine::Machine::from_profile`]
//! is the only consumer.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::{EmulatorError, Result};

/// A `u32` that serializes to and deserializes from a hex string
/// (`"0xC000"`) or a plain JSON integer, matching the profile format's
/// "all hex strings are parsed as hex" convention (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HexU32(pub u32);

impl fmt::Display for HexU32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

impl<'de> Deserialize<'de> for HexU32 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(u32),
            Str(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Num(n) => Ok(HexU32(n)),
            Repr::Str(s) => {
                let digits = s.trim_start_matches("0x").trim_start_matches("0X");
                u32::from_str_radix(digits, 16)
                    .map(HexU32)
                    .map_err(D::Error::custom)
            }
        }
    }
}

impl Serialize for HexU32 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// One source image copied into a [`PhysicalSpec`] block at build time.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "rom-image")]
    pub rom_image: String,
    pub offset: HexU32,
}

/// A named physical memory block, optionally seeded from one or more
/// [`SourceSpec`] images.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PhysicalSpec {
    pub name: String,
    pub size: HexU32,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
}

/// A ROM image file referenced by name from a [`SourceSpec`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RomImageSpec {
    pub name: String,
    pub path: String,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Ram,
    Rom,
    Composite,
}

/// One entry of the base region mapping (`spec.md` §3's `RegionMapping`,
/// pre-resolution).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegionSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RegionKind,
    pub start: HexU32,
    pub size: HexU32,
    /// Subset of `"rwx"`, e.g. `"rw"` or `"rx"`.
    pub permissions: String,
    /// Name of the [`PhysicalSpec`] this region views. `None` allocates a
    /// fresh, privately-owned block the size of the region.
    pub source: Option<String>,
    #[serde(rename = "source-offset", default)]
    pub source_offset: Option<HexU32>,
    pub handler: Option<String>,
}

/// A fixed controller wired over the base map, e.g. the Language Card or
/// an auxiliary-memory bank. Only `"language-card"` is actually driven by
/// this core today (it is built into [`crate::core::memory::MainBus`]
/// unconditionally); other types are accepted for forward compatibility
/// and otherwise ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: Option<HexU32>,
    #[serde(default)]
    pub config: serde_json::Value,
}

/// One card assignment within the `slots` block.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CardSpec {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: String,
    pub preset: Option<String>,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlotsSpec {
    #[serde(rename = "io-region")]
    pub io_region: String,
    pub enabled: bool,
    #[serde(rename = "internalC3Rom", default)]
    pub internal_c3_rom: bool,
    #[serde(rename = "internalCxRom", default)]
    pub internal_cx_rom: bool,
    #[serde(default)]
    pub cards: Vec<CardSpec>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DevicesSpec {
    #[serde(default)]
    pub speaker: Option<serde_json::Value>,
    #[serde(default)]
    pub keyboard: Option<serde_json::Value>,
    #[serde(default)]
    pub video: Option<serde_json::Value>,
}

/// The complete, machine-agnostic profile loaded from JSON at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MachineProfile {
    pub physical: Vec<PhysicalSpec>,
    #[serde(rename = "rom-images", default)]
    pub rom_images: Vec<RomImageSpec>,
    pub regions: Vec<RegionSpec>,
    #[serde(default)]
    pub controllers: Vec<ControllerSpec>,
    pub slots: SlotsSpec,
    #[serde(default)]
    pub devices: DevicesSpec,
}

impl MachineProfile {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Sizes and offsets in a profile must be multiples of the 4096-byte
    /// page size (`spec.md` §6). Checked up front so a malformed profile
    /// fails with one clear error rather than a confusing downstream
    /// region-table rejection.
    pub fn validate(&self) -> Result<()> {
        const PAGE: u32 = crate::core::addr::PAGE_SIZE;
        for physical in &self.physical {
            if physical.size.0 % PAGE != 0 {
                let msg = format!(
                    "physical block \"{}\" size {} is not a multiple of {PAGE:#x}",
                    physical.name, physical.size
                );
                log::error!("{msg}");
                return Err(EmulatorError::ConfigError(msg));
            }
        }
        for region in &self.regions {
            if region.start.0 % PAGE != 0 || region.size.0 % PAGE != 0 {
                let msg = format!(
                    "region \"{}\" (start {}, size {}) is not page-aligned",
                    region.name, region.start, region.size
                );
                log::error!("{msg}");
                return Err(EmulatorError::ConfigError(msg));
            }
            if !region.permissions.chars().all(|c| "rwx".contains(c)) {
                let msg = format!(
                    "region \"{}\" has invalid permissions \"{}\"",
                    region.name, region.permissions
                );
                log::error!("{msg}");
                return Err(EmulatorError::ConfigError(msg));
            }
        }
        for card in &self.slots.cards {
            if !(1..=7).contains(&card.slot) {
                let msg = format!("slot {} is out of range 1..=7", card.slot);
                log::error!("{msg}");
                return Err(EmulatorError::ConfigError(msg));
            }
        }
        Ok(())
    }

    pub fn rom_image(&self, name: &str) -> Option<&RomImageSpec> {
        self.rom_images.iter().find(|r| r.name == name)
    }
}

/// Resolve a profile's `rom-images` into raw bytes, validating declared
/// sizes against what's actually on disk.
pub fn load_rom_images(profile: &MachineProfile) -> Result<HashMap<String, Vec<u8>>> {
    let mut out = HashMap::new();
    for image in &profile.rom_images {
        let bytes = std::fs::read(&image.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EmulatorError::RomImageNotFound(image.path.clone())
            } else {
                EmulatorError::Io(e)
            }
        })?;
        if bytes.len() != image.size {
            return Err(EmulatorError::InvalidRomImageSize {
                expected: image.size,
                got: bytes.len(),
            });
        }
        out.insert(image.name.clone(), bytes);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "physical": [
                {"name": "main-ram", "size": "0xC000", "sources": []},
                {"name": "system-rom", "size": "0x3000", "sources": []}
            ],
            "rom-images": [],
            "regions": [
                {"name": "ram", "type": "ram", "start": "0x0000", "size": "0xC000", "permissions": "rw", "source": "main-ram", "source-offset": "0x0000", "handler": null},
                {"name": "io", "type": "composite", "start": "0xC000", "size": "0x1000", "permissions": "rw", "source": null, "source-offset": null, "handler": "io_page"},
                {"name": "rom", "type": "rom", "start": "0xD000", "size": "0x3000", "permissions": "rx", "source": "system-rom", "source-offset": "0x0000", "handler": null}
            ],
            "controllers": [
                {"name": "lc", "type": "language-card", "size": "0x4000", "config": {}}
            ],
            "slots": {
                "io-region": "io",
                "enabled": true,
                "internalC3Rom": false,
                "internalCxRom": false,
                "cards": []
            }
        }"#
    }

    #[test]
    fn hex_u32_parses_string_and_number() {
        let from_str: HexU32 = serde_json::from_str("\"0xC000\"").unwrap();
        assert_eq!(from_str.0, 0xC000);
        let from_num: HexU32 = serde_json::from_str("49152").unwrap();
        assert_eq!(from_num.0, 49152);
    }

    #[test]
    fn parses_a_complete_profile() {
        let profile = MachineProfile::from_json_str(sample_json()).unwrap();
        assert_eq!(profile.physical.len(), 2);
        assert_eq!(profile.regions.len(), 3);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unaligned_region() {
        let mut profile = MachineProfile::from_json_str(sample_json()).unwrap();
        profile.regions[0].start = HexU32(0x10);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_permissions() {
        let mut profile = MachineProfile::from_json_str(sample_json()).unwrap();
        profile.regions[0].permissions = "rwq".to_string();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_slot() {
        let mut profile = MachineProfile::from_json_str(sample_json()).unwrap();
        profile.slots.cards.push(CardSpec {
            slot: 9,
            kind: "disk2".into(),
            preset: None,
            config: serde_json::Value::Null,
        });
        assert!(profile.validate().is_err());
    }
}
