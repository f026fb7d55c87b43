use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buffer::SaveBuffer;
use crate::core_api::{CoreError, CoreErrorCode};
use crate::field::{FieldAccessor, FieldDefinition, FieldKind};

/// Every stat the save format defines. Used as the key into the field
/// table and [`FieldRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatId {
    DaughtersName,
    FathersName,
    Stamina,
    Strength,
    Intelligence,
    Elegance,
    Glamour,
    Morality,
    Faith,
    Sin,
    Sensitivity,
    Stress,
    FightingRep,
    MagicRep,
    SocialRep,
    HousekeepingRep,
    CombatSkill,
    Attack,
    Defence,
    MagicSkill,
    MagicAttack,
    MagicDefence,
    Decorum,
    ArtSkill,
    Speech,
    Cooking,
    Cleaning,
    Personality,
    Height,
}

impl StatId {
    pub const ALL: [StatId; 29] = [
        StatId::DaughtersName,
        StatId::FathersName,
        StatId::Stamina,
        StatId::Strength,
        StatId::Intelligence,
        StatId::Elegance,
        StatId::Glamour,
        StatId::Morality,
        StatId::Faith,
        StatId::Sin,
        StatId::Sensitivity,
        StatId::Stress,
        StatId::FightingRep,
        StatId::MagicRep,
        StatId::SocialRep,
        StatId::HousekeepingRep,
        StatId::CombatSkill,
        StatId::Attack,
        StatId::Defence,
        StatId::MagicSkill,
        StatId::MagicAttack,
        StatId::MagicDefence,
        StatId::Decorum,
        StatId::ArtSkill,
        StatId::Speech,
        StatId::Cooking,
        StatId::Cleaning,
        StatId::Personality,
        StatId::Height,
    ];

    /// Stable key used by front ends (CLI flags, JSON output).
    pub fn key(&self) -> &'static str {
        match self {
            Self::DaughtersName => "daughters-name",
            Self::FathersName => "fathers-name",
            Self::Stamina => "stamina",
            Self::Strength => "strength",
            Self::Intelligence => "intelligence",
            Self::Elegance => "elegance",
            Self::Glamour => "glamour",
            Self::Morality => "morality",
            Self::Faith => "faith",
            Self::Sin => "sin",
            Self::Sensitivity => "sensitivity",
            Self::Stress => "stress",
            Self::FightingRep => "fighting-rep",
            Self::MagicRep => "magic-rep",
            Self::SocialRep => "social-rep",
            Self::HousekeepingRep => "housekeeping-rep",
            Self::CombatSkill => "combat-skill",
            Self::Attack => "attack",
            Self::Defence => "defence",
            Self::MagicSkill => "magic-skill",
            Self::MagicAttack => "magic-attack",
            Self::MagicDefence => "magic-defence",
            Self::Decorum => "decorum",
            Self::ArtSkill => "art-skill",
            Self::Speech => "speech",
            Self::Cooking => "cooking",
            Self::Cleaning => "cleaning",
            Self::Personality => "personality",
            Self::Height => "height",
        }
    }

    pub fn from_key(key: &str) -> Option<StatId> {
        Self::ALL.into_iter().find(|stat| stat.key() == key)
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// Valid domains observed on the game's status screens.
const STAT_MIN: i64 = 0;
const STAT_MAX: i64 = 999;
const REP_MIN: i64 = 0;
const REP_MAX: i64 = 999;
const SKILL_MIN: i64 = 0;
const SKILL_MAX: i64 = 999;
const HEIGHT_MIN: f64 = 0.0;
const HEIGHT_MAX: f64 = 500.0;

const NAME_WIDTH: usize = 10;
const STAT_WIDTH: usize = 2;
const HEIGHT_WIDTH: usize = 4;

const STAT_KIND: FieldKind = FieldKind::Int {
    min: STAT_MIN,
    max: STAT_MAX,
};
const REP_KIND: FieldKind = FieldKind::Int {
    min: REP_MIN,
    max: REP_MAX,
};
const SKILL_KIND: FieldKind = FieldKind::Int {
    min: SKILL_MIN,
    max: SKILL_MAX,
};

/// Complete stat-to-offset map for the save image. Offsets are format
/// constants and cannot be derived; `0x4E` (fighting reputation) and
/// `0xF0` (height) anchor the layout.
pub static FIELD_TABLE: [FieldDefinition; 29] = [
    FieldDefinition {
        stat: StatId::DaughtersName,
        name: "Daughter's Name",
        offset: 0x06,
        width: NAME_WIDTH,
        kind: FieldKind::Text,
    },
    FieldDefinition {
        stat: StatId::FathersName,
        name: "Father's Name",
        offset: 0x10,
        width: NAME_WIDTH,
        kind: FieldKind::Text,
    },
    FieldDefinition {
        stat: StatId::Stamina,
        name: "Stamina",
        offset: 0x22,
        width: STAT_WIDTH,
        kind: STAT_KIND,
    },
    FieldDefinition {
        stat: StatId::Strength,
        name: "Strength",
        offset: 0x24,
        width: STAT_WIDTH,
        kind: STAT_KIND,
    },
    FieldDefinition {
        stat: StatId::Intelligence,
        name: "Intelligence",
        offset: 0x26,
        width: STAT_WIDTH,
        kind: STAT_KIND,
    },
    FieldDefinition {
        stat: StatId::Elegance,
        name: "Elegance",
        offset: 0x28,
        width: STAT_WIDTH,
        kind: STAT_KIND,
    },
    FieldDefinition {
        stat: StatId::Glamour,
        name: "Glamour",
        offset: 0x2A,
        width: STAT_WIDTH,
        kind: STAT_KIND,
    },
    FieldDefinition {
        stat: StatId::Morality,
        name: "Morality",
        offset: 0x2C,
        width: STAT_WIDTH,
        kind: STAT_KIND,
    },
    FieldDefinition {
        stat: StatId::Faith,
        name: "Faith",
        offset: 0x2E,
        width: STAT_WIDTH,
        kind: STAT_KIND,
    },
    FieldDefinition {
        stat: StatId::Sin,
        name: "Sin",
        offset: 0x30,
        width: STAT_WIDTH,
        kind: STAT_KIND,
    },
    FieldDefinition {
        stat: StatId::Sensitivity,
        name: "Sensitivity",
        offset: 0x32,
        width: STAT_WIDTH,
        kind: STAT_KIND,
    },
    FieldDefinition {
        stat: StatId::Stress,
        name: "Stress",
        offset: 0x34,
        width: STAT_WIDTH,
        kind: STAT_KIND,
    },
    FieldDefinition {
        stat: StatId::FightingRep,
        name: "Fighting Reputation",
        offset: 0x4E,
        width: STAT_WIDTH,
        kind: REP_KIND,
    },
    FieldDefinition {
        stat: StatId::MagicRep,
        name: "Magic Reputation",
        offset: 0x50,
        width: STAT_WIDTH,
        kind: REP_KIND,
    },
    FieldDefinition {
        stat: StatId::SocialRep,
        name: "Social Reputation",
        offset: 0x52,
        width: STAT_WIDTH,
        kind: REP_KIND,
    },
    FieldDefinition {
        stat: StatId::HousekeepingRep,
        name: "Housekeeping Reputation",
        offset: 0x54,
        width: STAT_WIDTH,
        kind: REP_KIND,
    },
    FieldDefinition {
        stat: StatId::CombatSkill,
        name: "Combat Skill",
        offset: 0x56,
        width: STAT_WIDTH,
        kind: SKILL_KIND,
    },
    FieldDefinition {
        stat: StatId::Attack,
        name: "Attack",
        offset: 0x58,
        width: STAT_WIDTH,
        kind: SKILL_KIND,
    },
    FieldDefinition {
        stat: StatId::Defence,
        name: "Defence",
        offset: 0x5A,
        width: STAT_WIDTH,
        kind: SKILL_KIND,
    },
    FieldDefinition {
        stat: StatId::MagicSkill,
        name: "Magic Skill",
        offset: 0x5C,
        width: STAT_WIDTH,
        kind: SKILL_KIND,
    },
    FieldDefinition {
        stat: StatId::MagicAttack,
        name: "Magic Attack",
        offset: 0x5E,
        width: STAT_WIDTH,
        kind: SKILL_KIND,
    },
    FieldDefinition {
        stat: StatId::MagicDefence,
        name: "Magic Defence",
        offset: 0x60,
        width: STAT_WIDTH,
        kind: SKILL_KIND,
    },
    FieldDefinition {
        stat: StatId::Decorum,
        name: "Decorum",
        offset: 0x62,
        width: STAT_WIDTH,
        kind: SKILL_KIND,
    },
    FieldDefinition {
        stat: StatId::ArtSkill,
        name: "Art Skill",
        offset: 0x64,
        width: STAT_WIDTH,
        kind: SKILL_KIND,
    },
    FieldDefinition {
        stat: StatId::Speech,
        name: "Speech",
        offset: 0x66,
        width: STAT_WIDTH,
        kind: SKILL_KIND,
    },
    FieldDefinition {
        stat: StatId::Cooking,
        name: "Cooking",
        offset: 0x68,
        width: STAT_WIDTH,
        kind: SKILL_KIND,
    },
    FieldDefinition {
        stat: StatId::Cleaning,
        name: "Cleaning",
        offset: 0x6A,
        width: STAT_WIDTH,
        kind: SKILL_KIND,
    },
    FieldDefinition {
        stat: StatId::Personality,
        name: "Personality",
        offset: 0x6C,
        width: STAT_WIDTH,
        kind: SKILL_KIND,
    },
    FieldDefinition {
        stat: StatId::Height,
        name: "Height",
        offset: 0xF0,
        width: HEIGHT_WIDTH,
        kind: FieldKind::Float {
            min: HEIGHT_MIN,
            max: HEIGHT_MAX,
        },
    },
];

/// Table row for one stat, if the table defines it.
pub fn definition_for(stat: StatId) -> Option<&'static FieldDefinition> {
    FIELD_TABLE.iter().find(|def| def.stat == stat)
}

/// One typed accessor per known stat, bound to a single live buffer.
///
/// Rebuilt from the static field table each time it is requested and
/// holding no decoded state, so it is always consistent with the buffer
/// it was built from.
#[derive(Debug)]
pub struct FieldRegistry<'buf> {
    buffer: &'buf mut SaveBuffer,
    fields: BTreeMap<StatId, &'static FieldDefinition>,
}

impl<'buf> FieldRegistry<'buf> {
    /// Pair every [`StatId`] with its table row. Fails with `UnknownField`
    /// only if the static table disagrees with the enumeration, which is a
    /// programming error rather than a data error.
    pub fn build(buffer: &'buf mut SaveBuffer) -> Result<Self, CoreError> {
        let mut fields = BTreeMap::new();
        for def in &FIELD_TABLE {
            if fields.insert(def.stat, def).is_some() {
                return Err(CoreError::new(
                    CoreErrorCode::UnknownField,
                    format!("duplicate field table entry for {}", def.stat),
                ));
            }
        }
        for stat in StatId::ALL {
            if !fields.contains_key(&stat) {
                return Err(CoreError::new(
                    CoreErrorCode::UnknownField,
                    format!("field table has no entry for {stat}"),
                ));
            }
        }
        Ok(Self { buffer, fields })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn stats(&self) -> impl Iterator<Item = StatId> + '_ {
        self.fields.keys().copied()
    }

    pub fn definition(&self, stat: StatId) -> Result<&'static FieldDefinition, CoreError> {
        self.fields.get(&stat).copied().ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::UnknownField,
                format!("no field registered for {stat}"),
            )
        })
    }

    /// Bind a typed accessor for `stat` to the underlying buffer.
    pub fn field(&mut self, stat: StatId) -> Result<FieldAccessor<'_>, CoreError> {
        let def = self.definition(stat)?;
        Ok(FieldAccessor::bind(def, self.buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SAVE_FILE_SIZE;
    use crate::checksum::CHECKSUM_WIDTH;
    use crate::version::FileVersion;

    #[test]
    fn table_covers_every_stat_exactly_once() {
        for stat in StatId::ALL {
            let matches = FIELD_TABLE.iter().filter(|def| def.stat == stat).count();
            assert_eq!(matches, 1, "expected one table row for {stat}");
        }
        assert_eq!(FIELD_TABLE.len(), StatId::ALL.len());
    }

    #[test]
    fn table_ranges_do_not_overlap() {
        let mut rows: Vec<&FieldDefinition> = FIELD_TABLE.iter().collect();
        rows.sort_by_key(|def| def.offset);
        for pair in rows.windows(2) {
            assert!(
                pair[0].offset + pair[0].width <= pair[1].offset,
                "{} overlaps {}",
                pair[0].stat,
                pair[1].stat
            );
        }
    }

    #[test]
    fn table_stays_inside_the_save_image() {
        for def in &FIELD_TABLE {
            assert!(
                def.offset + def.width <= SAVE_FILE_SIZE,
                "{} runs past the end of the image",
                def.stat
            );
            assert!(def.width > 0, "{} has zero width", def.stat);
        }
    }

    #[test]
    fn table_avoids_both_checksum_fields() {
        for version in [FileVersion::EnglishRefine, FileVersion::JapaneseRefine] {
            let start = version.checksum_offset();
            let end = start + CHECKSUM_WIDTH;
            for def in &FIELD_TABLE {
                let clear = def.offset + def.width <= start || def.offset >= end;
                assert!(clear, "{} collides with the {version} checksum", def.stat);
            }
        }
    }

    #[test]
    fn int_ranges_fit_their_width() {
        for def in &FIELD_TABLE {
            if let FieldKind::Int { min, max } = def.kind {
                assert!(min <= max, "{} has an inverted range", def.stat);
                assert!(min >= 0, "{} range below encodable zero", def.stat);
                let capacity = 1i64 << (8 * def.width as u32);
                assert!(max < capacity, "{} max does not fit its width", def.stat);
            }
        }
    }

    #[test]
    fn keys_are_unique_and_roundtrip() {
        for stat in StatId::ALL {
            assert_eq!(StatId::from_key(stat.key()), Some(stat));
        }
    }
}
