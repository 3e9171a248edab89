use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use time::Date;
use validator::Validate;

use crate::date::DayOfWeek;

/// Recurring weekly meal slot ("tiempo de comida").
///
/// A slot without a day applies to every day of the week. Slots are
/// toggled inactive rather than deleted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MealSlot {
    pub id: String,
    #[serde(rename = "residenciaId")]
    pub residence_id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "grupo")]
    pub group: String,
    #[serde(rename = "ordenGrupo")]
    pub group_order: i64,
    #[serde(rename = "dia")]
    pub day: Option<DayOfWeek>,
    #[serde(rename = "aplicacionOrdinaria")]
    pub ordinary: bool,
    #[serde(rename = "activo")]
    pub active: bool,
}

/// How a meal slot can be taken.
#[derive(
    Serialize, Deserialize, Display, EnumString, AsRefStr, Clone, Copy, Debug, PartialEq, Eq,
)]
#[strum(serialize_all = "snake_case")]
pub enum ServingKind {
    #[serde(rename = "comedor")]
    DiningHall,
    #[serde(rename = "paraLlevar")]
    Takeaway,
    #[serde(rename = "ayuno")]
    Fasting,
}

#[derive(
    Serialize, Deserialize, Display, EnumString, AsRefStr, Clone, Copy, Debug, PartialEq, Eq,
)]
#[strum(serialize_all = "snake_case")]
pub enum AccessKind {
    #[serde(rename = "libre")]
    Open,
    #[serde(rename = "conAutorizacion")]
    AuthorizationRequired,
    #[serde(rename = "cerrada")]
    Closed,
}

/// Concrete way of taking one meal slot, with its own access window.
///
/// The window start/end may fall on the calendar day before/after the
/// slot's nominal day. At most one alternative per slot is principal.
#[derive(Serialize, Deserialize, Validate, Clone, Debug, PartialEq)]
pub struct Alternative {
    pub id: String,
    #[serde(rename = "tiempoComidaId")]
    pub slot_id: String,
    #[serde(rename = "tipoServicio")]
    pub serving: ServingKind,
    #[serde(rename = "tipoAcceso")]
    pub access: AccessKind,
    #[serde(rename = "requiereAprobacion")]
    pub requires_approval: bool,
    #[serde(rename = "horaInicio")]
    #[validate(custom(function = "crate::date::hour_minute"))]
    pub starts: String,
    #[serde(rename = "horaFin")]
    #[validate(custom(function = "crate::date::hour_minute"))]
    pub ends: String,
    #[serde(rename = "empiezaDiaAnterior")]
    pub starts_day_before: bool,
    #[serde(rename = "terminaDiaSiguiente")]
    pub ends_day_after: bool,
    #[serde(rename = "esPrincipal")]
    pub principal: bool,
    #[serde(rename = "horarioSolicitudId")]
    pub cutoff_id: Option<String>,
    #[serde(rename = "activa")]
    pub active: bool,
}

/// Weekly submission deadline governing a set of alternatives.
#[derive(Serialize, Deserialize, Validate, Clone, Debug, PartialEq)]
pub struct RequestCutoff {
    pub id: String,
    #[serde(rename = "residenciaId")]
    pub residence_id: String,
    #[serde(rename = "dia")]
    pub day: DayOfWeek,
    #[serde(rename = "hora")]
    #[validate(custom(function = "crate::date::hour_minute"))]
    pub time: String,
    #[serde(rename = "activo")]
    pub active: bool,
}

/// Date-bounded replacement of part of the base weekly schedule.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScheduleOverride {
    pub id: String,
    #[serde(rename = "residenciaId")]
    pub residence_id: String,
    #[serde(rename = "fechaInicio")]
    pub starts: Date,
    #[serde(rename = "fechaFin")]
    pub ends: Date,
    #[serde(rename = "activa")]
    pub active: bool,
}

impl ScheduleOverride {
    pub fn covers(&self, date: Date) -> bool {
        self.starts <= date && date <= self.ends
    }
}

/// Per-day slot replacement inside a schedule override.
///
/// Matched against the base schedule by (day, group); replaces the slot's
/// display name and may regroup the cell.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SlotOverride {
    pub id: String,
    #[serde(rename = "alteracionId")]
    pub alteration_id: String,
    #[serde(rename = "dia")]
    pub day: DayOfWeek,
    #[serde(rename = "grupo")]
    pub group: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "ordenGrupo")]
    pub group_order: Option<i64>,
}

/// What an alternative override does to the base alternative set.
#[derive(Serialize, Deserialize, Display, EnumString, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OverrideKind {
    Remove,
}

impl OverrideKind {
    /// Applies this kind to the working alternative id set. New kinds must
    /// keep the same filter/merge contract.
    pub fn apply(self, alternative_id: &str, ids: &mut Vec<String>) {
        match self {
            OverrideKind::Remove => ids.retain(|id| id != alternative_id),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AlternativeOverride {
    pub id: String,
    #[serde(rename = "tiempoComidaModId")]
    pub slot_override_id: String,
    #[serde(rename = "tipo")]
    pub kind: OverrideKind,
    #[serde(rename = "alternativaId")]
    pub alternative_id: String,
}

/// A user's standing weekly choice ("semanario"): meal slot id mapped to
/// the chosen alternative id, or null when no default applies.
///
/// Exactly one document exists per (user, residence); more than one is a
/// data-integrity error the engine surfaces.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WeeklySelection {
    pub id: String,
    #[serde(rename = "usuarioId")]
    pub user_id: String,
    #[serde(rename = "residenciaId")]
    pub residence_id: String,
    #[serde(rename = "elecciones")]
    pub choices: BTreeMap<String, Option<String>>,
    #[serde(rename = "actualizadoEn")]
    pub updated_at: i64,
}

/// One-off deviation from the weekly selection for a specific date.
/// A null alternative is an explicit "no meal" choice.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SelectionException {
    pub id: String,
    #[serde(rename = "usuarioId")]
    pub user_id: String,
    #[serde(rename = "residenciaId")]
    pub residence_id: String,
    #[serde(rename = "fecha")]
    pub date: Date,
    #[serde(rename = "tiempoComidaId")]
    pub slot_id: String,
    #[serde(rename = "alternativaId")]
    pub alternative_id: Option<String>,
}
