use serde::{Deserialize, Serialize};

use crate::field::StatValue;
use crate::registry::StatId;
use crate::version::FileVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChecksumSupport {
    Full,
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityIssue {
    PartialChecksumOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Capabilities {
    pub can_edit: bool,
    pub checksum: ChecksumSupport,
    pub issues: Vec<CapabilityIssue>,
}

impl Capabilities {
    pub fn full_checksum() -> Self {
        Self {
            can_edit: true,
            checksum: ChecksumSupport::Full,
            issues: Vec::new(),
        }
    }

    /// Degraded path: editing still works, but saved files carry the
    /// placeholder checksum instead of one the game would accept.
    pub fn partial_checksum() -> Self {
        Self {
            can_edit: true,
            checksum: ChecksumSupport::Partial,
            issues: vec![CapabilityIssue::PartialChecksumOnly],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatEntry {
    pub id: StatId,
    pub name: String,
    pub value: StatValue,
}

/// Point-in-time dump of every stat in a loaded save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: FileVersion,
    pub daughters_name: String,
    pub fathers_name: String,
    pub stamina: i64,
    pub strength: i64,
    pub intelligence: i64,
    pub elegance: i64,
    pub glamour: i64,
    pub morality: i64,
    pub faith: i64,
    pub sin: i64,
    pub sensitivity: i64,
    pub stress: i64,
    pub fighting_rep: i64,
    pub magic_rep: i64,
    pub social_rep: i64,
    pub housekeeping_rep: i64,
    pub combat_skill: i64,
    pub attack: i64,
    pub defence: i64,
    pub magic_skill: i64,
    pub magic_attack: i64,
    pub magic_defence: i64,
    pub decorum: i64,
    pub art_skill: i64,
    pub speech: i64,
    pub cooking: i64,
    pub cleaning: i64,
    pub personality: i64,
    pub height: f64,
}
