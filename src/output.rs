//! Digital-output addressing and protocol revisions.
//!
//! Controllers expose end-effector outputs through one of two addressing
//! schemes:
//!
//! | Kind | Description | Index field |
//! |------|-------------|-------------|
//! | RDO | Robot digital output (arm-mounted) | unpadded, e.g. `7` |
//! | DO | General digital output | 5 digits, e.g. `00007` |
//!
//! Two revisions of the wire format are in the field. [`ProtocolRevision::Current`]
//! is canonical; [`ProtocolRevision::Legacy`] covers older controller programs
//! that use wider coordinate fields and the `setdo` verb.
//!
//! # Example
//!
//! ```
//! use mappdk::{OutputKind, ProtocolRevision};
//!
//! assert_eq!(OutputKind::Do.format_index(7), "00007");
//! assert_eq!(OutputKind::Rdo.format_index(7), "7");
//! assert_eq!(ProtocolRevision::Current.coordinate_width(), 13);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, RobotError};

/// Digital-output addressing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    /// Robot digital output.
    #[serde(rename = "RDO", alias = "rdo")]
    Rdo,
    /// General digital output.
    #[serde(rename = "DO", alias = "do")]
    Do,
}

/// Width of a zero-padded DO index.
const DO_INDEX_WIDTH: usize = 5;

impl OutputKind {
    /// Renders an output index the way this scheme expects it.
    pub fn format_index(self, index: u32) -> String {
        match self {
            OutputKind::Rdo => index.to_string(),
            OutputKind::Do => format!("{:0width$}", index, width = DO_INDEX_WIDTH),
        }
    }

    /// Verb that reads an output of this kind.
    pub(crate) fn get_verb(self) -> &'static str {
        match self {
            OutputKind::Rdo => "getrdo",
            OutputKind::Do => "getdout",
        }
    }

    /// Verb that writes an output of this kind.
    pub(crate) fn set_verb(self, revision: ProtocolRevision) -> &'static str {
        match (self, revision) {
            (OutputKind::Rdo, _) => "setrdo",
            (OutputKind::Do, ProtocolRevision::Current) => "setdout",
            (OutputKind::Do, ProtocolRevision::Legacy) => "setdo",
        }
    }

    /// Index field for a write of this kind.
    pub(crate) fn format_set_index(self, index: u32, revision: ProtocolRevision) -> String {
        match (self, revision) {
            (OutputKind::Do, ProtocolRevision::Legacy) => index.to_string(),
            _ => self.format_index(index),
        }
    }

    /// Largest index representable in this scheme's field.
    pub(crate) fn max_index(self) -> u32 {
        match self {
            OutputKind::Rdo => u32::MAX,
            OutputKind::Do => 99_999,
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::Rdo => write!(f, "RDO"),
            OutputKind::Do => write!(f, "DO"),
        }
    }
}

impl std::str::FromStr for OutputKind {
    type Err = RobotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "RDO" => Ok(OutputKind::Rdo),
            "DO" => Ok(OutputKind::Do),
            _ => Err(RobotError::invalid_argument(
                "output_kind",
                format!("expected RDO or DO, got {:?}", s),
            )),
        }
    }
}

/// Wire-format revision spoken by the controller program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolRevision {
    /// 13-character coordinate magnitudes, `setdout` with a 5-digit DO index.
    #[default]
    Current,
    /// 17-character coordinate magnitudes, `setdo` with an unpadded DO index.
    Legacy,
}

impl ProtocolRevision {
    /// Total width of a coordinate magnitude field, sign excluded.
    pub fn coordinate_width(self) -> usize {
        match self {
            ProtocolRevision::Current => 13,
            ProtocolRevision::Legacy => 17,
        }
    }
}
