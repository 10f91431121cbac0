//! Equipment classes and line/location assignment.

use serde::{Deserialize, Serialize};

use crate::cadence::Cadence;
use crate::error::CoreError;

pub const CLASS_H2: &str = "H2";
pub const CLASS_H8: &str = "H8";
pub const CLASS_H24: &str = "H24";

/// All valid equipment class strings.
pub const VALID_CLASSES: &[&str] = &[CLASS_H2, CLASS_H8, CLASS_H24];

/// The non-production holding line. Units assigned here are stored, not running.
pub const HOLDING_LINE: &str = "Tool Room";

/// Location of a unit on a production line.
pub const UBICACION_LINEA: &str = "Linea";
/// Location of a unit held off-line.
pub const UBICACION_TOOL_ROOM: &str = "Tool Room";

/// Equipment class (`tipo`). Determines the checklist and the allowed cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum EquipmentClass {
    H2,
    H8,
    H24,
}

impl EquipmentClass {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H2 => CLASS_H2,
            Self::H8 => CLASS_H8,
            Self::H24 => CLASS_H24,
        }
    }

    /// Parse from a string, case-insensitively.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_uppercase().as_str() {
            CLASS_H2 => Ok(Self::H2),
            CLASS_H8 => Ok(Self::H8),
            CLASS_H24 => Ok(Self::H24),
            _ => Err(CoreError::Validation(format!(
                "Invalid tipo '{s}'. Must be one of: {}",
                VALID_CLASSES.join(", ")
            ))),
        }
    }

    /// Maintenance cadences defined for this class.
    pub fn allowed_cadences(&self) -> &'static [Cadence] {
        match self {
            Self::H2 => &[Cadence::Monthly, Cadence::EighteenMonth],
            Self::H8 => &[
                Cadence::Weekly,
                Cadence::Biweekly,
                Cadence::Monthly,
                Cadence::Semiannual,
                Cadence::EighteenMonth,
            ],
            Self::H24 => &[
                Cadence::Weekly,
                Cadence::Monthly,
                Cadence::Semiannual,
                Cadence::EighteenMonth,
            ],
        }
    }

    /// Check that `tipo_mantenimiento` is acceptable for this class.
    ///
    /// Unrecognised cadence labels pass; they fall back to the default
    /// offset when the next due date is computed.
    pub fn validate_cadence(&self, tipo_mantenimiento: &str) -> Result<(), CoreError> {
        match Cadence::from_label(tipo_mantenimiento) {
            Some(cadence) if !self.allowed_cadences().contains(&cadence) => {
                Err(CoreError::Validation(format!(
                    "Cadence '{}' is not defined for {}",
                    cadence.label(),
                    self.as_str()
                )))
            }
            _ => Ok(()),
        }
    }
}

impl TryFrom<String> for EquipmentClass {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str_value(&value)
    }
}

impl From<EquipmentClass> for &'static str {
    fn from(value: EquipmentClass) -> Self {
        value.as_str()
    }
}

/// Location implied by a line assignment: the holding line keeps units in
/// the tool room, every other line is on the floor.
pub fn ubicacion_for_linea(linea: Option<&str>) -> &'static str {
    match linea {
        Some(l) if l.trim().eq_ignore_ascii_case(HOLDING_LINE) => UBICACION_TOOL_ROOM,
        _ => UBICACION_LINEA,
    }
}
