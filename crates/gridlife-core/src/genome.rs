//! Bit-packed heritable traits.
//!
//! A genome is a single `u32` split into disjoint fields, lowest bits first:
//!
//! | bits | field |
//! |---|---|
//! | 0..12 | color (three 4-bit channels, red highest) |
//! | 12..16 | sight radius |
//! | 16..20 | speed |
//! | 20..20+n | energy seed, `n` in `4..=12` |
//! | remaining | brain (reserved) |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SimulationError;

pub const COLOR_MASK: u32 = 0x0000_0FFF;
pub const SIGHT_MASK: u32 = 0x0000_F000;
pub const SPEED_MASK: u32 = 0x000F_0000;

const SIGHT_SHIFT: u32 = 12;
const SPEED_SHIFT: u32 = 16;
const ENERGY_SHIFT: u32 = 20;

/// Alternating-bit mask used for uniform crossover.
pub const INTERLEAVE_PATTERN: u32 = 0x5555_5555;

/// Decoded 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Similarity score in `(0, 1]`; identical colors score 1.
    #[must_use]
    pub fn closeness(self, other: Color) -> f64 {
        let distance = u32::from(self.r.abs_diff(other.r))
            + u32::from(self.g.abs_diff(other.g))
            + u32::from(self.b.abs_diff(other.b));
        1.0 / (f64::from(distance) + 1.0)
    }
}

/// Fixed-width packed genome.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Genome(pub u32);

impl Genome {
    #[must_use]
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Three 4-bit channels scaled by 16 into the 8-bit range.
    #[must_use]
    pub const fn color(self) -> Color {
        let bits = self.0 & COLOR_MASK;
        Color {
            r: ((bits >> 8) & 0xF) as u8 * 16,
            g: ((bits >> 4) & 0xF) as u8 * 16,
            b: (bits & 0xF) as u8 * 16,
        }
    }

    /// Sensor reach per cardinal direction, in cells.
    #[must_use]
    pub const fn sight(self) -> u32 {
        (self.0 & SIGHT_MASK) >> SIGHT_SHIFT
    }

    /// Cells travelled per move action.
    #[must_use]
    pub const fn speed(self) -> u32 {
        (self.0 & SPEED_MASK) >> SPEED_SHIFT
    }

    /// Uniform crossover: bits where `pattern` is set come from `self`, the rest from `other`.
    #[must_use]
    pub const fn crossover(self, other: Genome, pattern: u32) -> Genome {
        Genome((self.0 & pattern) | (other.0 & !pattern))
    }

    /// Flips every bit set in `pattern`.
    #[must_use]
    pub const fn mutate(self, pattern: u32) -> Genome {
        Genome(self.0 ^ pattern)
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.bits())
    }
}

/// Placement of the configurable energy-seed field and the brain field above it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenomeLayout {
    energy_bits: u32,
}

impl Default for GenomeLayout {
    fn default() -> Self {
        Self { energy_bits: 4 }
    }
}

impl GenomeLayout {
    pub const MIN_ENERGY_BITS: u32 = 4;
    pub const MAX_ENERGY_BITS: u32 = 12;

    pub fn new(energy_bits: u32) -> Result<Self, SimulationError> {
        if !(Self::MIN_ENERGY_BITS..=Self::MAX_ENERGY_BITS).contains(&energy_bits) {
            return Err(SimulationError::InvalidConfig(
                "energy_bits must be between 4 and 12",
            ));
        }
        Ok(Self { energy_bits })
    }

    #[must_use]
    pub const fn energy_bits(&self) -> u32 {
        self.energy_bits
    }

    #[must_use]
    pub const fn energy_mask(&self) -> u32 {
        (((1u64 << self.energy_bits) - 1) << ENERGY_SHIFT) as u32
    }

    #[must_use]
    pub const fn brain_mask(&self) -> u32 {
        let shift = ENERGY_SHIFT + self.energy_bits;
        ((u32::MAX as u64) >> shift << shift) as u32
    }

    #[must_use]
    pub const fn energy(&self, genome: Genome) -> u32 {
        (genome.0 & self.energy_mask()) >> ENERGY_SHIFT
    }

    /// Reserved segment; no decision logic reads it yet.
    #[must_use]
    pub const fn brain(&self, genome: Genome) -> u32 {
        let shift = ENERGY_SHIFT + self.energy_bits;
        if shift >= u32::BITS {
            0
        } else {
            (genome.0 & self.brain_mask()) >> shift
        }
    }
}

/// Named crossover masks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CrossoverPattern {
    /// Alternating single bits.
    #[default]
    Bit,
    /// Alternating bytes.
    Byte,
    /// Upper half from the first parent, lower half from the second.
    Half,
}

impl CrossoverPattern {
    #[must_use]
    pub const fn mask(self) -> u32 {
        match self {
            Self::Bit => INTERLEAVE_PATTERN,
            Self::Byte => 0xFF00_FF00,
            Self::Half => 0xFFFF_0000,
        }
    }
}
