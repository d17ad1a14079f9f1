//! Attribute calculation.
//!
//! A character's five attributes are the race's base line plus the class's
//! additive bonus. Unknown names fall back to a flat base and no bonus, so the
//! calculation never fails.

use crate::catalog::{Class, Race};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Base line used for any race not in the catalog.
pub const DEFAULT_BASE: Stats = Stats::uniform(5);

/// One of the five attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatKey {
    Str,
    Dex,
    Int,
    Cha,
    Vit,
}

impl StatKey {
    pub fn all() -> &'static [StatKey] {
        &[
            StatKey::Str,
            StatKey::Dex,
            StatKey::Int,
            StatKey::Cha,
            StatKey::Vit,
        ]
    }

    /// Short label, e.g. "STR".
    pub fn abbreviation(&self) -> &'static str {
        match self {
            StatKey::Str => "STR",
            StatKey::Dex => "DEX",
            StatKey::Int => "INT",
            StatKey::Cha => "CHA",
            StatKey::Vit => "VIT",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StatKey::Str => "Strength",
            StatKey::Dex => "Dexterity",
            StatKey::Int => "Intellect",
            StatKey::Cha => "Charisma",
            StatKey::Vit => "Vitality",
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// A fully populated attribute set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Stats {
    pub str: u32,
    pub dex: u32,
    pub int: u32,
    pub cha: u32,
    pub vit: u32,
}

impl Stats {
    pub const fn new(str: u32, dex: u32, int: u32, cha: u32, vit: u32) -> Self {
        Self {
            str,
            dex,
            int,
            cha,
            vit,
        }
    }

    /// Every attribute set to `value`.
    pub const fn uniform(value: u32) -> Self {
        Self::new(value, value, value, value, value)
    }

    pub fn get(&self, key: StatKey) -> u32 {
        match key {
            StatKey::Str => self.str,
            StatKey::Dex => self.dex,
            StatKey::Int => self.int,
            StatKey::Cha => self.cha,
            StatKey::Vit => self.vit,
        }
    }

    /// Maximum hit points: ten per point of vitality.
    pub fn max_hp(&self) -> u32 {
        self.vit * 10
    }

    /// Maximum energy: ten per point of intellect.
    pub fn max_energy(&self) -> u32 {
        self.int * 10
    }
}

/// Additive class bonus. Unlisted attributes are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatBonus {
    pub str: u32,
    pub dex: u32,
    pub int: u32,
    pub cha: u32,
    pub vit: u32,
}

impl StatBonus {
    pub fn get(&self, key: StatKey) -> u32 {
        match key {
            StatKey::Str => self.str,
            StatKey::Dex => self.dex,
            StatKey::Int => self.int,
            StatKey::Cha => self.cha,
            StatKey::Vit => self.vit,
        }
    }
}

impl Add<StatBonus> for Stats {
    type Output = Stats;

    fn add(self, bonus: StatBonus) -> Stats {
        Stats {
            str: self.str + bonus.str,
            dex: self.dex + bonus.dex,
            int: self.int + bonus.int,
            cha: self.cha + bonus.cha,
            vit: self.vit + bonus.vit,
        }
    }
}

/// Racial base line.
pub fn base_stats(race: Race) -> Stats {
    match race {
        Race::TerranHuman => Stats::new(5, 5, 5, 5, 5),
        Race::CyberElf => Stats::new(3, 7, 6, 4, 4),
        Race::VoidBorn => Stats::new(2, 4, 8, 3, 3),
        Race::MechaConstruct => Stats::new(8, 3, 5, 1, 8),
        Race::NekoMorph => Stats::new(4, 8, 3, 6, 4),
        Race::Draconian => Stats::new(7, 4, 3, 4, 7),
    }
}

/// Class bonus on top of the racial base line.
pub fn class_bonus(class: Class) -> StatBonus {
    let zero = StatBonus::default();
    match class {
        Class::StarKnight => StatBonus { str: 3, vit: 2, ..zero },
        Class::WarpMage => StatBonus { int: 4, cha: 1, ..zero },
        Class::TechRogue => StatBonus { dex: 3, int: 2, ..zero },
        Class::BioMedic => StatBonus { int: 3, vit: 2, ..zero },
        Class::HeavyGunner => StatBonus { str: 2, vit: 3, ..zero },
        Class::PsionicOperative => StatBonus { cha: 3, int: 2, ..zero },
    }
}

/// Compute attributes for a race and class given by display name.
pub fn calculate_stats(race: &str, class: &str) -> Stats {
    let base = Race::from_name(race).map(base_stats).unwrap_or(DEFAULT_BASE);
    let bonus = Class::from_name(class).map(class_bonus).unwrap_or_default();
    base + bonus
}
