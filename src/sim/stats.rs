//! Character archetypes and the stat/progression curve

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RpgError;

/// Playable character classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Warrior,
    Mage,
    Rogue,
    Priest,
    Archer,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::Warrior,
        Archetype::Mage,
        Archetype::Rogue,
        Archetype::Priest,
        Archetype::Archer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Warrior => "warrior",
            Archetype::Mage => "mage",
            Archetype::Rogue => "rogue",
            Archetype::Priest => "priest",
            Archetype::Archer => "archer",
        }
    }

    /// Starting attributes for this class
    pub fn base_attributes(&self) -> Attributes {
        match self {
            Archetype::Warrior => Attributes::new(10, 5, 3, 12),
            Archetype::Mage => Attributes::new(3, 6, 12, 6),
            Archetype::Rogue => Attributes::new(5, 12, 5, 8),
            Archetype::Priest => Attributes::new(4, 7, 10, 9),
            Archetype::Archer => Attributes::new(6, 11, 6, 7),
        }
    }
}

impl FromStr for Archetype {
    type Err = RpgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Archetype::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| RpgError::InvalidArchetype(s.to_string()))
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cosmetic gender tag chosen at character creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = RpgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(RpgError::InvalidGender(s.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four core attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: u32,
    pub dexterity: u32,
    pub intelligence: u32,
    pub vitality: u32,
}

impl Attributes {
    pub const fn new(strength: u32, dexterity: u32, intelligence: u32, vitality: u32) -> Self {
        Self {
            strength,
            dexterity,
            intelligence,
            vitality,
        }
    }
}

/// Look up base attributes by class name
pub fn base_attributes(name: &str) -> Result<Attributes, RpgError> {
    Ok(name.parse::<Archetype>()?.base_attributes())
}

/// Health pool granted by a vitality score, saturating at `i32::MAX`
#[inline]
pub fn derive_max_health(vitality: u32) -> i32 {
    i32::try_from(vitality).unwrap_or(i32::MAX).saturating_mul(10)
}

/// Experience needed for the first level-up
#[inline]
pub const fn initial_experience_threshold() -> u32 {
    100
}

/// Threshold after a level-up: `floor(current * 1.2)`
#[inline]
pub fn next_experience_threshold(current: u32) -> u32 {
    // Integer form avoids float rounding (e.g. 100 * 1.2 = 119.999...)
    u32::try_from(current as u64 * 6 / 5).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_max_health_for_all_archetypes() {
        for archetype in Archetype::ALL {
            let attrs = archetype.base_attributes();
            assert_eq!(derive_max_health(attrs.vitality), attrs.vitality as i32 * 10);
        }
        assert_eq!(derive_max_health(Archetype::Warrior.base_attributes().vitality), 120);
    }

    #[test]
    fn test_max_health_saturates() {
        assert_eq!(derive_max_health(0), 0);
        assert_eq!(derive_max_health(214_748_364), 2_147_483_640);
        assert_eq!(derive_max_health(214_748_365), i32::MAX);
        assert_eq!(derive_max_health(i32::MAX as u32 + 1), i32::MAX);
        assert_eq!(derive_max_health(u32::MAX), i32::MAX);
    }

    #[test]
    fn test_threshold_saturates() {
        assert_eq!(next_experience_threshold(u32::MAX), u32::MAX);
        assert_eq!(next_experience_threshold(u32::MAX / 2), 2_576_980_376);
    }

    #[test]
    fn test_archetype_parse() {
        assert_eq!("mage".parse::<Archetype>().unwrap(), Archetype::Mage);
        for archetype in Archetype::ALL {
            assert_eq!(archetype.as_str().parse::<Archetype>().unwrap(), archetype);
        }
    }

    #[test]
    fn test_invalid_archetype_fails() {
        let err = base_attributes("bard").unwrap_err();
        assert!(matches!(err, RpgError::InvalidArchetype(ref name) if name == "bard"));
        // Names are matched exactly
        assert!("Warrior".parse::<Archetype>().is_err());
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert!(matches!(
            "other".parse::<Gender>(),
            Err(RpgError::InvalidGender(_))
        ));
    }

    #[test]
    fn test_threshold_sequence() {
        assert_eq!(initial_experience_threshold(), 100);
        let mut t = initial_experience_threshold();
        let expected = [120, 144, 172, 206, 247];
        for want in expected {
            t = next_experience_threshold(t);
            assert_eq!(t, want);
        }
    }

    proptest! {
        #[test]
        fn threshold_strictly_increases(start in 5u32..1_000_000) {
            let mut t = start;
            for _ in 0..20 {
                let next = next_experience_threshold(t);
                prop_assert!(next > t);
                // next == floor(t * 6 / 5) in exact arithmetic
                let (next, t6) = (next as u64, t as u64 * 6);
                prop_assert!(next * 5 <= t6 && t6 < (next + 1) * 5);
                let next = next as u32;
                t = next;
                if t > 100_000_000 {
                    break;
                }
            }
        }
    }
}
