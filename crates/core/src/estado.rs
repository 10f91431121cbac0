//! Lifecycle status (`estado`) of a maintenance record.
//!
//! Stored as a canonical snake_case string. Each collection displays its
//! own labels; requests may send either the canonical value or any known
//! label.

use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::error::CoreError;

pub const ESTADO_OPERATIONAL: &str = "operational";
pub const ESTADO_NEEDS_REPAIR: &str = "needs_repair";
pub const ESTADO_DECOMMISSIONED: &str = "decommissioned";
pub const ESTADO_IN_CUSTODY: &str = "in_custody";

/// All valid canonical estado strings.
pub const VALID_ESTADOS: &[&str] = &[
    ESTADO_OPERATIONAL,
    ESTADO_NEEDS_REPAIR,
    ESTADO_DECOMMISSIONED,
    ESTADO_IN_CUSTODY,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Estado {
    Operational,
    NeedsRepair,
    Decommissioned,
    InCustody,
}

impl Estado {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operational => ESTADO_OPERATIONAL,
            Self::NeedsRepair => ESTADO_NEEDS_REPAIR,
            Self::Decommissioned => ESTADO_DECOMMISSIONED,
            Self::InCustody => ESTADO_IN_CUSTODY,
        }
    }

    /// Parse the canonical database value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            ESTADO_OPERATIONAL => Ok(Self::Operational),
            ESTADO_NEEDS_REPAIR => Ok(Self::NeedsRepair),
            ESTADO_DECOMMISSIONED => Ok(Self::Decommissioned),
            ESTADO_IN_CUSTODY => Ok(Self::InCustody),
            other => Err(CoreError::Validation(format!(
                "Invalid estado '{other}'. Must be one of: {}",
                VALID_ESTADOS.join(", ")
            ))),
        }
    }

    /// Parse a canonical value or a display label from either collection.
    ///
    /// Label matching ignores case and surrounding whitespace, so both
    /// "Por reparar" and "Por Reparar" map to [`Estado::NeedsRepair`].
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        if let Ok(estado) = Self::from_str_value(trimmed) {
            return Ok(estado);
        }
        let lowered = trimmed.to_lowercase();
        match lowered.as_str() {
            "operando" | "activo" | "en linea" | "en línea" => Ok(Self::Operational),
            "por reparar" | "en reparación" | "en reparacion" => Ok(Self::NeedsRepair),
            "baja" => Ok(Self::Decommissioned),
            "resguardo" => Ok(Self::InCustody),
            _ => Err(CoreError::Validation(format!(
                "Invalid estado '{trimmed}'. Must be one of: {}",
                VALID_ESTADOS.join(", ")
            ))),
        }
    }

    /// Display label for this estado in the given collection.
    pub fn label(&self, collection: Collection) -> &'static str {
        match (self, collection) {
            (Self::Operational, Collection::Cabezales) => "Operando",
            (Self::Operational, Collection::Mantenimientos) => "Activo",
            (Self::NeedsRepair, Collection::Cabezales) => "Por reparar",
            (Self::NeedsRepair, Collection::Mantenimientos) => "Por Reparar",
            (Self::Decommissioned, _) => "Baja",
            (Self::InCustody, _) => "Resguardo",
        }
    }

    /// Whether entering this estado requires a non-empty observation.
    pub fn requires_observations(&self) -> bool {
        matches!(self, Self::NeedsRepair | Self::Decommissioned)
    }

    /// Whether a record in this estado may carry a next-due date.
    pub fn schedules_maintenance(&self) -> bool {
        matches!(self, Self::Operational)
    }
}

impl TryFrom<String> for Estado {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Estado> for &'static str {
    fn from(value: Estado) -> Self {
        value.as_str()
    }
}
