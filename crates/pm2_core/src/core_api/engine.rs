use crate::buffer::SaveBuffer;
use crate::checksum;
use crate::field::{FieldAccessor, StatValue, read_value};
use crate::registry::{FieldRegistry, StatId, definition_for};
use crate::version::FileVersion;

use super::error::{CoreError, CoreErrorCode};
use super::types::{Capabilities, Snapshot, StatEntry};

/// Loads save images and hands out editing sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

/// One loaded save file. A session only exists for a successfully loaded
/// image, so every operation below runs against a valid 8192-byte buffer
/// by construction. The buffer is exclusively owned: dropping the session
/// (or loading another file through the engine) discards it.
#[derive(Debug)]
pub struct Session {
    buffer: SaveBuffer,
    version: FileVersion,
    capabilities: Capabilities,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    /// Validate and adopt a raw save image. Version detection is the
    /// caller's job; absent a hint the English Refine layout is assumed.
    pub fn open_bytes<B: AsRef<[u8]>>(
        &self,
        bytes: B,
        hint: Option<FileVersion>,
    ) -> Result<Session, CoreError> {
        let buffer = SaveBuffer::from_bytes(bytes.as_ref())?;
        let version = hint.unwrap_or(FileVersion::EnglishRefine);
        let capabilities = if version.has_full_checksum() {
            Capabilities::full_checksum()
        } else {
            Capabilities::partial_checksum()
        };
        Ok(Session {
            buffer,
            version,
            capabilities,
        })
    }
}

impl Session {
    pub fn version(&self) -> FileVersion {
        self.version
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Fresh registry over the live buffer; cheap to rebuild on demand.
    pub fn registry(&mut self) -> Result<FieldRegistry<'_>, CoreError> {
        FieldRegistry::build(&mut self.buffer)
    }

    /// Checksum the image would carry if saved now.
    pub fn checksum(&self) -> u32 {
        checksum::compute(&self.buffer, self.version)
    }

    /// Recompute the checksum, stamp it into the image at the version's
    /// offset, and return the full file ready to persist.
    pub fn save_bytes(&mut self) -> Result<Vec<u8>, CoreError> {
        let value = checksum::compute(&self.buffer, self.version);
        self.buffer.write_at(
            self.version.checksum_offset(),
            checksum::CHECKSUM_WIDTH,
            &value.to_le_bytes(),
        )?;
        Ok(self.buffer.to_vec())
    }

    pub fn stat_value(&self, stat: StatId) -> Result<StatValue, CoreError> {
        read_value(lookup(stat)?, &self.buffer)
    }

    pub fn stat_int(&self, stat: StatId) -> Result<i64, CoreError> {
        match self.stat_value(stat)? {
            StatValue::Int(value) => Ok(value),
            other => Err(kind_mismatch(stat, "an integer", &other)),
        }
    }

    pub fn stat_float(&self, stat: StatId) -> Result<f64, CoreError> {
        match self.stat_value(stat)? {
            StatValue::Float(value) => Ok(value),
            other => Err(kind_mismatch(stat, "a float", &other)),
        }
    }

    pub fn stat_text(&self, stat: StatId) -> Result<String, CoreError> {
        match self.stat_value(stat)? {
            StatValue::Text(value) => Ok(value),
            other => Err(kind_mismatch(stat, "a text", &other)),
        }
    }

    pub fn set_stat_int(&mut self, stat: StatId, value: i64) -> Result<(), CoreError> {
        match self.registry()?.field(stat)? {
            FieldAccessor::Int(mut field) => field.set(value),
            other => Err(kind_mismatch_def(stat, "integer", &other)),
        }
    }

    pub fn set_stat_float(&mut self, stat: StatId, value: f64) -> Result<(), CoreError> {
        match self.registry()?.field(stat)? {
            FieldAccessor::Float(mut field) => field.set(value),
            other => Err(kind_mismatch_def(stat, "float", &other)),
        }
    }

    pub fn set_stat_text(&mut self, stat: StatId, value: &str) -> Result<(), CoreError> {
        match self.registry()?.field(stat)? {
            FieldAccessor::Text(mut field) => field.set(value),
            other => Err(kind_mismatch_def(stat, "text", &other)),
        }
    }

    /// Every stat as a `(id, display name, value)` row, in enumeration
    /// order. Handy for generic rendering.
    pub fn stat_entries(&self) -> Result<Vec<StatEntry>, CoreError> {
        let mut out = Vec::with_capacity(StatId::ALL.len());
        for stat in StatId::ALL {
            let def = lookup(stat)?;
            out.push(StatEntry {
                id: stat,
                name: def.name.to_string(),
                value: read_value(def, &self.buffer)?,
            });
        }
        Ok(out)
    }

    pub fn snapshot(&self) -> Result<Snapshot, CoreError> {
        Ok(Snapshot {
            version: self.version,
            daughters_name: self.stat_text(StatId::DaughtersName)?,
            fathers_name: self.stat_text(StatId::FathersName)?,
            stamina: self.stat_int(StatId::Stamina)?,
            strength: self.stat_int(StatId::Strength)?,
            intelligence: self.stat_int(StatId::Intelligence)?,
            elegance: self.stat_int(StatId::Elegance)?,
            glamour: self.stat_int(StatId::Glamour)?,
            morality: self.stat_int(StatId::Morality)?,
            faith: self.stat_int(StatId::Faith)?,
            sin: self.stat_int(StatId::Sin)?,
            sensitivity: self.stat_int(StatId::Sensitivity)?,
            stress: self.stat_int(StatId::Stress)?,
            fighting_rep: self.stat_int(StatId::FightingRep)?,
            magic_rep: self.stat_int(StatId::MagicRep)?,
            social_rep: self.stat_int(StatId::SocialRep)?,
            housekeeping_rep: self.stat_int(StatId::HousekeepingRep)?,
            combat_skill: self.stat_int(StatId::CombatSkill)?,
            attack: self.stat_int(StatId::Attack)?,
            defence: self.stat_int(StatId::Defence)?,
            magic_skill: self.stat_int(StatId::MagicSkill)?,
            magic_attack: self.stat_int(StatId::MagicAttack)?,
            magic_defence: self.stat_int(StatId::MagicDefence)?,
            decorum: self.stat_int(StatId::Decorum)?,
            art_skill: self.stat_int(StatId::ArtSkill)?,
            speech: self.stat_int(StatId::Speech)?,
            cooking: self.stat_int(StatId::Cooking)?,
            cleaning: self.stat_int(StatId::Cleaning)?,
            personality: self.stat_int(StatId::Personality)?,
            height: self.stat_float(StatId::Height)?,
        })
    }
}

fn lookup(stat: StatId) -> Result<&'static crate::field::FieldDefinition, CoreError> {
    definition_for(stat).ok_or_else(|| {
        CoreError::new(
            CoreErrorCode::UnknownField,
            format!("field table has no entry for {stat}"),
        )
    })
}

fn kind_mismatch(stat: StatId, wanted: &str, got: &StatValue) -> CoreError {
    CoreError::new(
        CoreErrorCode::UnsupportedOperation,
        format!("{stat} holds a {} value, not {wanted}", got.kind_name()),
    )
}

fn kind_mismatch_def(stat: StatId, wanted: &str, accessor: &FieldAccessor<'_>) -> CoreError {
    CoreError::new(
        CoreErrorCode::UnsupportedOperation,
        format!(
            "{stat} is not {wanted}-valued ({} field)",
            kind_label(accessor)
        ),
    )
}

fn kind_label(accessor: &FieldAccessor<'_>) -> &'static str {
    match accessor {
        FieldAccessor::Int(_) => "integer",
        FieldAccessor::Float(_) => "float",
        FieldAccessor::Text(_) => "text",
    }
}
