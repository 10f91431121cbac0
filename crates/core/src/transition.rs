//! The record state machine.
//!
//! Every write operation on a maintenance record goes through [`apply`]:
//! it validates the request, runs the checklist gate where the operation
//! collects a checklist, schedules the next due date, and appends notes.
//! The result is the complete lifecycle state to persist; callers never
//! patch `estado`/`sm` themselves.

use crate::cadence::{next_due_date, reactivation_due_date};
use crate::checklist::Checklist;
use crate::error::CoreError;
use crate::estado::Estado;
use crate::types::Date;

pub const NOTE_PREFIX_BAJA: &str = "BAJA";
pub const NOTE_PREFIX_REACTIVADO: &str = "REACTIVADO";
pub const NOTE_PREFIX_MANTENIMIENTO: &str = "MANTENIMIENTO";

/// Lifecycle-relevant fields of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceState {
    pub estado: Estado,
    pub tipo_mantenimiento: String,
    /// Date of last maintenance.
    pub fm: Option<Date>,
    /// Next maintenance due. Only set while operational.
    pub sm: Option<Date>,
    pub ops: Checklist,
    pub observaciones: String,
}

/// Full-record write used by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    /// Requested estado. `None` or `Operational` lets the checklist decide.
    pub estado: Option<Estado>,
    pub tipo_mantenimiento: String,
    pub fm: Option<Date>,
    /// Explicit next due date; computed from the cadence when absent.
    pub sm: Option<Date>,
    pub ops: Checklist,
    pub observaciones: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Write(WriteRequest),
    Decommission {
        motivo: String,
    },
    Reactivate {
        ops: Checklist,
        observaciones: String,
        fecha_reactivacion: Option<Date>,
        tipo_mantenimiento: Option<String>,
    },
    RegisterMaintenance {
        ops: Checklist,
        observaciones: String,
        fecha_mantenimiento: Option<Date>,
        fecha_proximo: Option<Date>,
        tipo_mantenimiento: Option<String>,
    },
    /// Back to operational without a checklist.
    MarkRepaired,
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Write(_) => "write",
            Self::Decommission { .. } => "decommission",
            Self::Reactivate { .. } => "reactivate",
            Self::RegisterMaintenance { .. } => "register_maintenance",
            Self::MarkRepaired => "mark_repaired",
        }
    }
}

/// Compute the state that results from `transition`.
///
/// `current` is the stored state, required by every transition except
/// [`Transition::Write`], which replaces the lifecycle fields wholesale.
/// Nothing is written when this returns an error.
pub fn apply(
    current: Option<&MaintenanceState>,
    transition: Transition,
    today: Date,
) -> Result<MaintenanceState, CoreError> {
    let name = transition.name();
    let require_current = || {
        current.ok_or_else(|| {
            CoreError::Internal(format!("transition '{name}' requires an existing record"))
        })
    };

    match transition {
        Transition::Write(req) => write(req),

        Transition::Decommission { motivo } => {
            let current = require_current()?;
            let motivo = motivo.trim();
            if motivo.is_empty() {
                return Err(CoreError::ObservationsRequired(
                    "A reason is required to decommission a record".to_string(),
                ));
            }
            Ok(MaintenanceState {
                estado: Estado::Decommissioned,
                fm: Some(today),
                sm: None,
                observaciones: append_note(
                    &current.observaciones,
                    &format!("{NOTE_PREFIX_BAJA}: {motivo} - {today}"),
                ),
                ..current.clone()
            })
        }

        Transition::Reactivate {
            ops,
            observaciones,
            fecha_reactivacion,
            tipo_mantenimiento,
        } => {
            let current = require_current()?;
            let note = observaciones.trim();
            if note.is_empty() {
                return Err(CoreError::ObservationsRequired(
                    "Observations are required to reactivate a record".to_string(),
                ));
            }
            let fecha = fecha_reactivacion.unwrap_or(today);
            let (estado, sm) = gate(&ops, || reactivation_due_date(today));
            Ok(MaintenanceState {
                estado,
                tipo_mantenimiento: tipo_mantenimiento
                    .unwrap_or_else(|| current.tipo_mantenimiento.clone()),
                fm: Some(fecha),
                sm,
                ops,
                observaciones: append_note(
                    &current.observaciones,
                    &format!("{NOTE_PREFIX_REACTIVADO} {fecha}: {note}"),
                ),
            })
        }

        Transition::RegisterMaintenance {
            ops,
            observaciones,
            fecha_mantenimiento,
            fecha_proximo,
            tipo_mantenimiento,
        } => {
            let current = require_current()?;
            let fm = fecha_mantenimiento.unwrap_or(today);
            let tipo = tipo_mantenimiento.unwrap_or_else(|| current.tipo_mantenimiento.clone());
            let (estado, sm) = gate(&ops, || {
                fecha_proximo.unwrap_or_else(|| next_due_date(&tipo, fm))
            });
            let note = observaciones.trim();
            let line = if note.is_empty() {
                format!("{NOTE_PREFIX_MANTENIMIENTO} - {today}")
            } else {
                format!("{NOTE_PREFIX_MANTENIMIENTO}: {note} - {today}")
            };
            Ok(MaintenanceState {
                estado,
                tipo_mantenimiento: tipo,
                fm: Some(fm),
                sm,
                ops,
                observaciones: append_note(&current.observaciones, &line),
            })
        }

        Transition::MarkRepaired => {
            let current = require_current()?;
            Ok(MaintenanceState {
                estado: Estado::Operational,
                sm: Some(next_due_date(&current.tipo_mantenimiento, today)),
                ..current.clone()
            })
        }
    }
}

fn write(req: WriteRequest) -> Result<MaintenanceState, CoreError> {
    let estado = match req.estado {
        Some(requested @ (Estado::NeedsRepair | Estado::Decommissioned | Estado::InCustody)) => {
            requested
        }
        Some(Estado::Operational) | None => req.ops.evaluate(),
    };

    if estado.requires_observations() && req.observaciones.trim().is_empty() {
        return Err(CoreError::ObservationsRequired(format!(
            "Observations are required when estado is '{}'",
            estado.as_str()
        )));
    }

    let sm = if estado.schedules_maintenance() {
        let fm = req.fm.ok_or_else(|| {
            CoreError::Validation("fm is required for an operational record".to_string())
        })?;
        Some(req.sm.unwrap_or_else(|| next_due_date(&req.tipo_mantenimiento, fm)))
    } else {
        None
    };

    Ok(MaintenanceState {
        estado,
        tipo_mantenimiento: req.tipo_mantenimiento,
        fm: req.fm,
        sm,
        ops: req.ops,
        observaciones: req.observaciones,
    })
}

/// The checklist gate: operational units get a due date, all others none.
fn gate(ops: &Checklist, due: impl FnOnce() -> Date) -> (Estado, Option<Date>) {
    match ops.evaluate() {
        Estado::Operational => (Estado::Operational, Some(due())),
        other => (other, None),
    }
}

/// Notes are append-only: new lines go after whatever is already there.
pub fn append_note(existing: &str, line: &str) -> String {
    if existing.trim().is_empty() {
        line.to_string()
    } else {
        format!("{}\n{line}", existing.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn operational(tipo: &str) -> MaintenanceState {
        MaintenanceState {
            estado: Estado::Operational,
            tipo_mantenimiento: tipo.to_string(),
            fm: Some(d(2024, 1, 1)),
            sm: Some(d(2024, 1, 8)),
            ops: Checklist::all_passed(),
            observaciones: "Alta inicial".to_string(),
        }
    }

    fn write_req(tipo: &str, ops: Checklist) -> WriteRequest {
        WriteRequest {
            estado: None,
            tipo_mantenimiento: tipo.to_string(),
            fm: Some(d(2024, 1, 1)),
            sm: None,
            ops,
            observaciones: String::new(),
        }
    }

    fn failing(slot: usize) -> Checklist {
        let mut ops = Checklist::all_passed();
        ops.set(slot, false);
        ops
    }

    // -- create / update ------------------------------------------------------

    #[test]
    fn create_weekly_with_passing_checklist() {
        let state = apply(
            None,
            Transition::Write(write_req("Semanal", Checklist::all_passed())),
            d(2024, 1, 1),
        )
        .unwrap();
        assert_eq!(state.estado, Estado::Operational);
        assert_eq!(state.sm, Some(d(2024, 1, 8)));
    }

    #[test]
    fn explicit_sm_is_kept_when_operational() {
        let mut req = write_req("Semanal", Checklist::all_passed());
        req.sm = Some(d(2024, 3, 1));
        let state = apply(None, Transition::Write(req), d(2024, 1, 1)).unwrap();
        assert_eq!(state.sm, Some(d(2024, 3, 1)));
    }

    #[test]
    fn failing_checklist_without_notes_is_rejected() {
        let err = apply(
            None,
            Transition::Write(write_req("Mensual", failing(4))),
            d(2024, 1, 1),
        )
        .unwrap_err();
        assert_matches!(err, CoreError::ObservationsRequired(_));
    }

    #[test]
    fn failing_checklist_with_notes_needs_repair_and_clears_sm() {
        let mut req = write_req("Mensual", failing(4));
        req.sm = Some(d(2024, 2, 1));
        req.observaciones = "Fuga en válvula".to_string();
        let state = apply(None, Transition::Write(req), d(2024, 1, 1)).unwrap();
        assert_eq!(state.estado, Estado::NeedsRepair);
        assert_eq!(state.sm, None);
    }

    #[test]
    fn requested_baja_requires_observations() {
        let mut req = write_req("Mensual", Checklist::all_passed());
        req.estado = Some(Estado::Decommissioned);
        req.observaciones = "   ".to_string();
        assert_matches!(
            apply(None, Transition::Write(req), d(2024, 1, 1)),
            Err(CoreError::ObservationsRequired(_))
        );
    }

    #[test]
    fn in_custody_keeps_estado_without_due_date() {
        let mut req = write_req("Mensual", Checklist::default());
        req.estado = Some(Estado::InCustody);
        req.sm = Some(d(2024, 2, 1));
        let state = apply(None, Transition::Write(req), d(2024, 1, 1)).unwrap();
        assert_eq!(state.estado, Estado::InCustody);
        assert_eq!(state.sm, None);
    }

    #[test]
    fn operational_write_requires_fm() {
        let mut req = write_req("Mensual", Checklist::all_passed());
        req.fm = None;
        assert_matches!(
            apply(None, Transition::Write(req), d(2024, 1, 1)),
            Err(CoreError::Validation(_))
        );
    }

    // -- decommission ---------------------------------------------------------

    #[test]
    fn decommission_appends_reason_and_clears_sm() {
        let current = operational("Semanal");
        let state = apply(
            Some(&current),
            Transition::Decommission {
                motivo: "motor failure".to_string(),
            },
            d(2024, 2, 10),
        )
        .unwrap();
        assert_eq!(state.estado, Estado::Decommissioned);
        assert_eq!(state.sm, None);
        assert_eq!(state.fm, Some(d(2024, 2, 10)));
        assert!(state.observaciones.starts_with("Alta inicial\n"));
        assert!(state
            .observaciones
            .lines()
            .any(|l| l.contains("motor failure")));
    }

    #[test]
    fn decommission_twice_appends_two_notes() {
        let current = operational("Semanal");
        let once = apply(
            Some(&current),
            Transition::Decommission {
                motivo: "golpe".to_string(),
            },
            d(2024, 2, 10),
        )
        .unwrap();
        let twice = apply(
            Some(&once),
            Transition::Decommission {
                motivo: "sin refacciones".to_string(),
            },
            d(2024, 2, 11),
        )
        .unwrap();
        assert_eq!(twice.estado, Estado::Decommissioned);
        assert_eq!(twice.sm, None);
        assert_eq!(twice.observaciones.lines().count(), 3);
    }

    #[test]
    fn decommission_requires_reason() {
        let current = operational("Semanal");
        assert_matches!(
            apply(
                Some(&current),
                Transition::Decommission {
                    motivo: " ".to_string()
                },
                d(2024, 2, 10)
            ),
            Err(CoreError::ObservationsRequired(_))
        );
    }

    // -- reactivate -----------------------------------------------------------

    fn decommissioned() -> MaintenanceState {
        MaintenanceState {
            estado: Estado::Decommissioned,
            sm: None,
            ..operational("Mensual")
        }
    }

    #[test]
    fn reactivate_with_passing_checklist_schedules_sixty_days() {
        let state = apply(
            Some(&decommissioned()),
            Transition::Reactivate {
                ops: Checklist::all_passed(),
                observaciones: "Reparado por proveedor".to_string(),
                fecha_reactivacion: None,
                tipo_mantenimiento: None,
            },
            d(2024, 1, 1),
        )
        .unwrap();
        assert_eq!(state.estado, Estado::Operational);
        assert_eq!(state.sm, Some(d(2024, 3, 1)));
        assert_eq!(state.fm, Some(d(2024, 1, 1)));
        assert!(state
            .observaciones
            .ends_with("REACTIVADO 2024-01-01: Reparado por proveedor"));
    }

    #[test]
    fn reactivate_with_failing_checklist_needs_repair() {
        let state = apply(
            Some(&decommissioned()),
            Transition::Reactivate {
                ops: failing(0),
                observaciones: "Pendiente filtro".to_string(),
                fecha_reactivacion: Some(d(2023, 12, 30)),
                tipo_mantenimiento: Some("Semestral".to_string()),
            },
            d(2024, 1, 1),
        )
        .unwrap();
        assert_eq!(state.estado, Estado::NeedsRepair);
        assert_eq!(state.sm, None);
        assert_eq!(state.fm, Some(d(2023, 12, 30)));
        assert_eq!(state.tipo_mantenimiento, "Semestral");
    }

    #[test]
    fn reactivate_requires_observations() {
        assert_matches!(
            apply(
                Some(&decommissioned()),
                Transition::Reactivate {
                    ops: Checklist::all_passed(),
                    observaciones: String::new(),
                    fecha_reactivacion: None,
                    tipo_mantenimiento: None,
                },
                d(2024, 1, 1)
            ),
            Err(CoreError::ObservationsRequired(_))
        );
    }

    // -- register maintenance -------------------------------------------------

    #[test]
    fn maintenance_with_failed_slot_needs_repair_regardless_of_cadence() {
        for tipo in ["Semanal", "Mensual", "Año y Medio"] {
            let state = apply(
                Some(&operational(tipo)),
                Transition::RegisterMaintenance {
                    ops: failing(1),
                    observaciones: String::new(),
                    fecha_mantenimiento: None,
                    fecha_proximo: Some(d(2025, 1, 1)),
                    tipo_mantenimiento: None,
                },
                d(2024, 4, 1),
            )
            .unwrap();
            assert_eq!(state.estado, Estado::NeedsRepair);
            assert_eq!(state.sm, None);
            assert!(state.observaciones.ends_with("MANTENIMIENTO - 2024-04-01"));
        }
    }

    #[test]
    fn maintenance_schedules_from_cadence() {
        let state = apply(
            Some(&operational("Semestral")),
            Transition::RegisterMaintenance {
                ops: Checklist::all_passed(),
                observaciones: "Lubricación completa".to_string(),
                fecha_mantenimiento: Some(d(2024, 4, 2)),
                fecha_proximo: None,
                tipo_mantenimiento: None,
            },
            d(2024, 4, 3),
        )
        .unwrap();
        assert_eq!(state.estado, Estado::Operational);
        assert_eq!(state.fm, Some(d(2024, 4, 2)));
        assert_eq!(state.sm, Some(d(2024, 10, 2)));
        assert!(state
            .observaciones
            .ends_with("MANTENIMIENTO: Lubricación completa - 2024-04-03"));
    }

    // -- mark repaired --------------------------------------------------------

    #[test]
    fn mark_repaired_bypasses_checklist() {
        let current = MaintenanceState {
            estado: Estado::NeedsRepair,
            sm: None,
            ops: Checklist::default(),
            ..operational("Mensual")
        };
        let state = apply(Some(&current), Transition::MarkRepaired, d(2024, 1, 31)).unwrap();
        assert_eq!(state.estado, Estado::Operational);
        assert_eq!(state.sm, Some(d(2024, 2, 29)));
        assert_eq!(state.observaciones, current.observaciones);
        assert_eq!(state.fm, current.fm);
    }

    #[test]
    fn non_write_transitions_need_a_record() {
        assert_matches!(
            apply(None, Transition::MarkRepaired, d(2024, 1, 1)),
            Err(CoreError::Internal(_))
        );
    }

    // -- notes ----------------------------------------------------------------

    #[test]
    fn append_note_skips_leading_newline() {
        assert_eq!(append_note("", "BAJA: x"), "BAJA: x");
        assert_eq!(append_note("a\n", "b"), "a\nb");
    }
}
