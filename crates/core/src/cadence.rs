//! Maintenance cadence (`tipo_mantenimiento`) and next-due-date arithmetic.
//!
//! Month offsets use [`chrono::NaiveDate::checked_add_months`], which clamps
//! to the last day of the target month: Jan 31 + 1 month is Feb 28 (or 29).

use chrono::{Days, Months};

use crate::types::Date;

/// Days added to the reactivation date when a unit comes back operational.
/// Independent of the unit's cadence.
pub const REACTIVATION_OFFSET_DAYS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    Weekly,
    Biweekly,
    Monthly,
    Semiannual,
    EighteenMonth,
}

/// How far a cadence pushes the next due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offset {
    Days(u64),
    Months(u32),
}

/// Offset applied when the cadence label is not recognised.
pub const DEFAULT_OFFSET: Offset = Offset::Months(1);

impl Cadence {
    /// The label stored in `tipo_mantenimiento`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Weekly => "Semanal",
            Self::Biweekly => "Quincenal",
            Self::Monthly => "Mensual",
            Self::Semiannual => "Semestral",
            Self::EighteenMonth => "Año y Medio",
        }
    }

    /// Canonical name of the cadence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Semiannual => "semiannual",
            Self::EighteenMonth => "eighteen_month",
        }
    }

    /// Recognise a stored label or a canonical name. Matching ignores case
    /// and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let lowered = label.trim().to_lowercase();
        match lowered.as_str() {
            "semanal" | "weekly" => Some(Self::Weekly),
            "quincenal" | "biweekly" => Some(Self::Biweekly),
            "mensual" | "monthly" => Some(Self::Monthly),
            "semestral" | "semiannual" => Some(Self::Semiannual),
            "año y medio" | "ano y medio" | "eighteen_month" => Some(Self::EighteenMonth),
            _ => None,
        }
    }

    pub fn offset(&self) -> Offset {
        match self {
            Self::Weekly => Offset::Days(7),
            Self::Biweekly => Offset::Days(15),
            Self::Monthly => Offset::Months(1),
            Self::Semiannual => Offset::Months(6),
            Self::EighteenMonth => Offset::Months(18),
        }
    }
}

impl Offset {
    /// Apply the offset to `base`. Saturates at the largest representable
    /// date instead of failing.
    pub fn apply(&self, base: Date) -> Date {
        let shifted = match *self {
            Offset::Days(n) => base.checked_add_days(Days::new(n)),
            Offset::Months(n) => base.checked_add_months(Months::new(n)),
        };
        shifted.unwrap_or(Date::MAX)
    }
}

/// Next maintenance due date for a stored cadence label.
pub fn next_due_date(tipo_mantenimiento: &str, base: Date) -> Date {
    Cadence::from_label(tipo_mantenimiento)
        .map(|c| c.offset())
        .unwrap_or(DEFAULT_OFFSET)
        .apply(base)
}

/// Next due date after a reactivation on `today`.
pub fn reactivation_due_date(today: Date) -> Date {
    Offset::Days(REACTIVATION_OFFSET_DAYS).apply(today)
}
