//! Display category and listing order, derived at read time.
//!
//! Nothing here is persisted: `estado` and `sm` change independently, so
//! every listing recomputes both the category and the sort key against the
//! current date.

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::CoreError;
use crate::estado::Estado;
use crate::types::{Date, DbId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Decommissioned.
    Baja,
    /// Waiting for repair.
    Reparacion,
    /// Due within the configured threshold.
    ProximoVencer,
    /// Due today or earlier.
    Vencido,
    Activo,
}

/// All valid category strings, in declaration order.
pub const VALID_CATEGORIES: &[&str] = &["baja", "reparacion", "proximo_vencer", "vencido", "activo"];

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Baja,
        Category::Reparacion,
        Category::ProximoVencer,
        Category::Vencido,
        Category::Activo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baja => "baja",
            Self::Reparacion => "reparacion",
            Self::ProximoVencer => "proximo_vencer",
            Self::Vencido => "vencido",
            Self::Activo => "activo",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid categoria '{s}'. Must be one of: {}",
                    VALID_CATEGORIES.join(", ")
                ))
            })
    }
}

/// Whole calendar days from `today` until `sm`. Negative when overdue.
pub fn days_remaining(sm: Date, today: Date) -> i64 {
    (sm - today).num_days()
}

/// Derive the display category of a record.
pub fn derive(estado: Estado, sm: Option<Date>, today: Date, threshold_days: i64) -> Category {
    match estado {
        Estado::Decommissioned => Category::Baja,
        Estado::NeedsRepair => Category::Reparacion,
        _ => match sm.map(|sm| days_remaining(sm, today)) {
            Some(days) if days <= 0 => Category::Vencido,
            Some(days) if days <= threshold_days => Category::ProximoVencer,
            _ => Category::Activo,
        },
    }
}

/// Listing priority. Lower sorts first.
///
/// | rank | records |
/// |------|---------|
/// | 1    | due soon or overdue |
/// | 2    | needs repair |
/// | 3    | everything else that is not decommissioned |
/// | 4    | decommissioned |
pub fn sort_rank(estado: Estado, sm: Option<Date>, today: Date, threshold_days: i64) -> u8 {
    match estado {
        Estado::Decommissioned => 4,
        Estado::NeedsRepair => 2,
        _ => match sm {
            Some(sm) if days_remaining(sm, today) <= threshold_days => 1,
            _ => 3,
        },
    }
}

/// Total order for listings: rank, then `sm` ascending with undated
/// records last, then id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingKey {
    pub rank: u8,
    pub sm: Option<Date>,
    pub id: DbId,
}

impl Ord for ListingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| match (self.sm, other.sm) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for ListingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Category and sort key computed together for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derived {
    pub category: Category,
    pub key: ListingKey,
}

impl Derived {
    pub fn compute(
        id: DbId,
        estado: Estado,
        sm: Option<Date>,
        today: Date,
        threshold_days: i64,
    ) -> Self {
        Self {
            category: derive(estado, sm, today, threshold_days),
            key: ListingKey {
                rank: sort_rank(estado, sm, today, threshold_days),
                sm,
                id,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn today() -> Date {
        d(2024, 6, 1)
    }

    #[test]
    fn decommissioned_is_baja_regardless_of_sm() {
        for sm in [None, Some(d(2020, 1, 1)), Some(d(2030, 1, 1))] {
            assert_eq!(derive(Estado::Decommissioned, sm, today(), 14), Category::Baja);
        }
    }

    #[test]
    fn needs_repair_is_reparacion() {
        assert_eq!(
            derive(Estado::NeedsRepair, Some(d(2024, 6, 2)), today(), 14),
            Category::Reparacion
        );
    }

    #[test]
    fn due_date_boundaries() {
        let t = today();
        assert_eq!(derive(Estado::Operational, Some(t), t, 14), Category::Vencido);
        assert_eq!(derive(Estado::Operational, Some(d(2024, 5, 20)), t, 14), Category::Vencido);
        assert_eq!(derive(Estado::Operational, Some(d(2024, 6, 2)), t, 14), Category::ProximoVencer);
        assert_eq!(derive(Estado::Operational, Some(d(2024, 6, 15)), t, 14), Category::ProximoVencer);
        assert_eq!(derive(Estado::Operational, Some(d(2024, 6, 16)), t, 14), Category::Activo);
    }

    #[test]
    fn threshold_is_per_deployment() {
        let sm = Some(d(2024, 6, 10));
        assert_eq!(derive(Estado::Operational, sm, today(), 14), Category::ProximoVencer);
        assert_eq!(derive(Estado::Operational, sm, today(), 7), Category::Activo);
    }

    #[test]
    fn undated_active_record_is_activo() {
        assert_eq!(derive(Estado::InCustody, None, today(), 14), Category::Activo);
        assert_eq!(derive(Estado::Operational, None, today(), 14), Category::Activo);
    }

    #[test]
    fn listing_order() {
        let t = today();
        let mut keys = vec![
            Derived::compute(1, Estado::Decommissioned, None, t, 14).key,
            Derived::compute(2, Estado::Operational, Some(d(2024, 9, 1)), t, 14).key,
            Derived::compute(3, Estado::NeedsRepair, None, t, 14).key,
            Derived::compute(4, Estado::Operational, Some(d(2024, 6, 5)), t, 14).key,
            Derived::compute(5, Estado::Operational, None, t, 14).key,
            Derived::compute(6, Estado::Operational, Some(d(2024, 5, 1)), t, 14).key,
            Derived::compute(7, Estado::Operational, Some(d(2024, 8, 1)), t, 14).key,
        ];
        keys.sort();
        let ids: Vec<DbId> = keys.iter().map(|k| k.id).collect();
        assert_eq!(ids, vec![6, 4, 3, 7, 2, 5, 1]);
    }

    #[test]
    fn ties_break_on_id() {
        let t = today();
        let a = Derived::compute(9, Estado::NeedsRepair, None, t, 14).key;
        let b = Derived::compute(3, Estado::NeedsRepair, None, t, 14).key;
        assert!(b < a);
    }

    #[test]
    fn category_strings() {
        for c in Category::ALL {
            assert_eq!(Category::from_str_value(c.as_str()).unwrap(), c);
        }
        assert!(Category::from_str_value("overdue").is_err());
    }
}
