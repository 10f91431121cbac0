//! Checklist answers, the operational gate, and the item catalogue.
//!
//! A record carries twelve boolean answer slots. On the wire they travel
//! as an `ops` map keyed `op0`..`op11`; in storage each slot is its own
//! column. What a slot *means* depends on the (class, cadence) pair that
//! was active when it was written; see [`items_for`].

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::cadence::Cadence;
use crate::equipment::EquipmentClass;
use crate::estado::Estado;

/// Number of answer slots on a record.
pub const SLOT_COUNT: usize = 12;

/// Wire keys for each slot, in order.
pub const SLOT_KEYS: [&str; SLOT_COUNT] = [
    "op0", "op1", "op2", "op3", "op4", "op5", "op6", "op7", "op8", "op9", "op10", "op11",
];

/// Slots that must all be answered `true` for a unit to be operational.
/// Slots 7..11 are recorded but never gate the outcome.
pub const REQUIRED_SLOTS: std::ops::Range<usize> = 0..7;

/// Ordered checklist answers. Missing answers are `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checklist([bool; SLOT_COUNT]);

impl Checklist {
    pub fn new(slots: [bool; SLOT_COUNT]) -> Self {
        Self(slots)
    }

    /// A checklist with every slot answered `true`.
    pub fn all_passed() -> Self {
        Self([true; SLOT_COUNT])
    }

    pub fn slots(&self) -> &[bool; SLOT_COUNT] {
        &self.0
    }

    pub fn get(&self, slot: usize) -> bool {
        self.0.get(slot).copied().unwrap_or(false)
    }

    pub fn set(&mut self, slot: usize, value: bool) {
        if let Some(s) = self.0.get_mut(slot) {
            *s = value;
        }
    }

    /// Whether every required slot is answered `true`.
    pub fn passes(&self) -> bool {
        self.0[REQUIRED_SLOTS].iter().all(|&ok| ok)
    }

    /// The estado this checklist leads to.
    pub fn evaluate(&self) -> Estado {
        if self.passes() {
            Estado::Operational
        } else {
            Estado::NeedsRepair
        }
    }
}

/// Map a wire key to its slot index.
pub fn slot_index(key: &str) -> Option<usize> {
    SLOT_KEYS.iter().position(|k| *k == key)
}

impl Serialize for Checklist {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SLOT_COUNT))?;
        for (key, value) in SLOT_KEYS.iter().zip(self.0.iter()) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Checklist {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChecklistVisitor;

        impl<'de> Visitor<'de> for ChecklistVisitor {
            type Value = Checklist;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of op0..op11 to booleans")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Checklist, A::Error> {
                let mut checklist = Checklist::default();
                while let Some((key, value)) = access.next_entry::<String, Option<bool>>()? {
                    let slot = slot_index(&key).ok_or_else(|| {
                        de::Error::unknown_field(&key, &SLOT_KEYS)
                    })?;
                    checklist.set(slot, value.unwrap_or(false));
                }
                Ok(checklist)
            }
        }

        deserializer.deserialize_map(ChecklistVisitor)
    }
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// One displayed checklist item and the slot holding its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub slot: usize,
    pub key: &'static str,
    pub label: &'static str,
}

/// Items used when a record has no equipment class.
const GENERIC_ITEMS: [&str; SLOT_COUNT] = [
    "Limpieza general",
    "Revisión tornillería",
    "Estado de código/etiquetas",
    "Esponjas y elementos flexibles",
    "Integridad de láminas",
    "Vías plásticas",
    "Estado de protecciones",
    "Lubricación",
    "Sensores",
    "Actuadores",
    "Conectores eléctricos",
    "Verificación funcional",
];

fn labels_for(class: EquipmentClass, cadence: Cadence) -> &'static [&'static str] {
    use Cadence::*;
    use EquipmentClass::*;

    match (class, cadence) {
        (H2, Monthly) => &[
            "Limpieza de flecha y reemplazo de pines de clampeo",
            "Limpieza de filtros del cabezal",
        ],
        (H2, EighteenMonth) => &["Lubricación de partes movibles"],
        (H8, Weekly) => &[
            "Limpieza de la sección de reconocimiento (IPS)",
            "Limpieza de LEDs",
            "Limpieza de cristales prismas",
            "Limpieza de reflectores",
        ],
        (H8, Biweekly) => &["Lubricación de borde de la flecha"],
        (H8, Monthly) => &[
            "Limpieza y lubricación de flecha",
            "Lubricación de piezas móviles",
            "Lubricación de O-ring en syringes",
        ],
        (H8, Semiannual) => &["Lubricación del brazo de eje rotatorio"],
        (H8, EighteenMonth) => &[
            "Lubricación de partes móviles",
            "Reemplazo de O-rings en válvulas mecánicas",
        ],
        (H24, Weekly) => &["Limpieza de cámaras IPS", "Limpieza de LEDs"],
        (H24, Monthly) => &[
            "Limpieza / Reemplazo de filtros",
            "Lavado de cabezales en auto head cleaner",
            "Lubricación de flechas y O-rings",
            "Rellenado de grasa Jig ZAGTHJ0052XX",
        ],
        (H24, Semiannual) => &[
            "Lubricación del eje de rotación del brazo",
            "Lubricación de piezas movibles",
            "Lubricación de válvula O-ring mecánica",
        ],
        (H24, EighteenMonth) => &[
            "Lubricación de partes móviles",
            "Reemplazar válvula mecánica de los O-rings",
        ],
        _ => &[],
    }
}

/// Checklist items meaningful for a (class, cadence) pair.
///
/// Without a class, the generic twelve-item list applies. A class with an
/// unrecognised or undefined cadence has no items.
pub fn items_for(class: Option<EquipmentClass>, tipo_mantenimiento: &str) -> Vec<ChecklistItem> {
    let labels: &'static [&'static str] = match class {
        None => &GENERIC_ITEMS,
        Some(class) => match Cadence::from_label(tipo_mantenimiento) {
            Some(cadence) => labels_for(class, cadence),
            None => &[],
        },
    };
    labels
        .iter()
        .enumerate()
        .map(|(slot, &label)| ChecklistItem {
            slot,
            key: SLOT_KEYS[slot],
            label,
        })
        .collect()
}

/// The full catalogue: for every class, each allowed cadence and its items.
pub fn catalogue() -> BTreeMap<&'static str, BTreeMap<&'static str, Vec<ChecklistItem>>> {
    [EquipmentClass::H2, EquipmentClass::H8, EquipmentClass::H24]
        .into_iter()
        .map(|class| {
            let by_cadence = class
                .allowed_cadences()
                .iter()
                .map(|cadence| (cadence.label(), items_for(Some(class), cadence.label())))
                .collect();
            (class.as_str(), by_cadence)
        })
        .collect()
}
