//! Fixed option sets offered by the character creator.
//!
//! Every option has a display name that doubles as its wire value: drafts and
//! characters carry these names as plain strings, so lookups go through
//! `from_name` and tolerate values that are not in the set.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! options {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Display name of this option.
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// All options, in presentation order.
            pub fn all() -> &'static [$name] {
                &[$($name::$variant,)+]
            }

            /// Look up an option by its display name.
            pub fn from_name(name: &str) -> Option<Self> {
                Self::all().iter().copied().find(|o| o.name() == name)
            }

            /// Draw one option uniformly at random.
            pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
                let all = Self::all();
                all[rng.gen_range(0..all.len())]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

options! {
    /// Playable races.
    Race {
        TerranHuman => "Terran (Human)",
        CyberElf => "Cyber-Elf",
        VoidBorn => "Void-Born",
        MechaConstruct => "Mecha-Construct",
        NekoMorph => "Neko-Morph",
        Draconian => "Draconian",
    }
}

options! {
    /// Academy classes.
    Class {
        StarKnight => "Star-Knight",
        WarpMage => "Warp-Mage",
        TechRogue => "Tech-Rogue",
        BioMedic => "Bio-Medic",
        HeavyGunner => "Heavy-Gunner",
        PsionicOperative => "Psionic-Operative",
    }
}

options! {
    Alignment {
        LawfulGood => "Lawful Good",
        NeutralGood => "Neutral Good",
        ChaoticGood => "Chaotic Good",
        LawfulNeutral => "Lawful Neutral",
        TrueNeutral => "True Neutral",
        ChaoticNeutral => "Chaotic Neutral",
        LawfulEvil => "Lawful Evil",
        NeutralEvil => "Neutral Evil",
        ChaoticEvil => "Chaotic Evil",
    }
}

options! {
    Background {
        AcademyLegacy => "Academy Legacy",
        SlumSurvivor => "Slum Survivor",
        CorporateSpy => "Corporate Spy",
        WarOrphan => "War Orphan",
        LostRoyalty => "Lost Royalty",
        MemoryWiped => "Memory Wiped",
    }
}

options! {
    HairStyle {
        CrewCut => "Crew Cut",
        LongAndFlowing => "Long & Flowing",
        CyberDreads => "Cyber-Dreads",
        Bald => "Bald",
        Mohawk => "Mohawk",
        BobCut => "Bob Cut",
    }
}

options! {
    Cybernetics {
        None => "None",
        OcularImplants => "Ocular Implants",
        NeuralInterface => "Neural Interface",
        CyberArm => "Cyber-Arm",
        SynthSkin => "Synth-Skin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_option_counts() {
        assert_eq!(Race::all().len(), 6);
        assert_eq!(Class::all().len(), 6);
        assert_eq!(Alignment::all().len(), 9);
        assert_eq!(Background::all().len(), 6);
        assert_eq!(HairStyle::all().len(), 6);
        assert_eq!(Cybernetics::all().len(), 5);
    }

    #[test]
    fn test_name_lookup() {
        for race in Race::all() {
            assert_eq!(Race::from_name(race.name()), Some(*race));
        }
        assert_eq!(Class::from_name("Warp-Mage"), Some(Class::WarpMage));
        assert_eq!(Class::from_name("warp-mage"), None);
        assert_eq!(Race::from_name("Goblin"), None);
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&Race::TerranHuman).unwrap();
        assert_eq!(json, "\"Terran (Human)\"");
        let parsed: HairStyle = serde_json::from_str("\"Long & Flowing\"").unwrap();
        assert_eq!(parsed, HairStyle::LongAndFlowing);
    }

    #[test]
    fn test_random_stays_in_set() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let alignment = Alignment::random(&mut rng);
            assert!(Alignment::all().contains(&alignment));
        }
    }
}
