use serde::de::DeserializeOwned;
use validator::Validate;

use comedor_shared::DateRange;
use comedor_shared::activity::{Activity, ActivityEnrollment, MealSubstitution};
use comedor_shared::meal::{
    Alternative, AlternativeOverride, MealSlot, RequestCutoff, ScheduleOverride, SelectionException,
    SlotOverride, WeeklySelection,
};
use comedor_shared::residence::Residence;
use comedor_shared::user::{Absence, GroupRestriction, UserRecord};
use comedor_store::{DocumentStore, Filter, in_chunks};

use crate::ScheduleError;

/// Firestore collection names.
pub mod collections {
    pub const RESIDENCES: &str = "residencias";
    pub const USERS: &str = "usuarios";
    pub const MEAL_SLOTS: &str = "tiemposComida";
    pub const ALTERNATIVES: &str = "alternativasTiempoComida";
    pub const REQUEST_CUTOFFS: &str = "horariosSolicitudComida";
    pub const SCHEDULE_OVERRIDES: &str = "alteracionesHorario";
    pub const SLOT_OVERRIDES: &str = "tiemposComidaMod";
    pub const ALTERNATIVE_OVERRIDES: &str = "alternativasTiempoComidaMod";
    pub const ACTIVITIES: &str = "actividades";
    pub const MEAL_SUBSTITUTIONS: &str = "sustitucionesComida";
    pub const ENROLLMENTS: &str = "inscripcionesActividad";
    pub const WEEKLY_SELECTIONS: &str = "semanarios";
    pub const EXCEPTIONS: &str = "elecciones";
    pub const ABSENCES: &str = "ausencias";
    pub const GROUP_RESTRICTIONS: &str = "permisosComidaPorGrupo";
}

/// Immutable snapshot of one residence's meal configuration. All
/// resolution is pure over this value; callers own caching and refetch.
#[derive(Debug, Clone)]
pub struct ResidenceConfig {
    pub residence_id: String,
    pub timezone: String,
    pub slots: Vec<MealSlot>,
    pub alternatives: Vec<Alternative>,
    pub cutoffs: Vec<RequestCutoff>,
    pub overrides: Vec<ScheduleOverride>,
    pub slot_overrides: Vec<SlotOverride>,
    pub alternative_overrides: Vec<AlternativeOverride>,
}

/// Per-user snapshot for one affected period: standing selection,
/// exceptions, absences, and the activity plan the user is enrolled in.
#[derive(Debug, Clone)]
pub struct UserSnapshot {
    pub user_id: String,
    pub selection: Option<WeeklySelection>,
    pub exceptions: Vec<SelectionException>,
    pub absences: Vec<Absence>,
    pub enrollments: Vec<ActivityEnrollment>,
    pub activities: Vec<Activity>,
    pub substitutions: Vec<MealSubstitution>,
    pub restriction: Option<GroupRestriction>,
}

impl<S: DocumentStore> crate::Schedule<S> {
    /// Loads and validates the residence configuration snapshot.
    ///
    /// Malformed time strings are rejected here, before any resolution
    /// runs.
    pub async fn residence_config(&self) -> Result<ResidenceConfig, ScheduleError> {
        let residence = self
            .store()
            .get(collections::RESIDENCES, self.residence_id())
            .await?
            .ok_or_else(|| ScheduleError::ResidenceNotFound(self.residence_id().to_owned()))?
            .decode::<Residence>()?;

        let by_residence = [Filter::eq("residenciaId", self.residence_id())];

        let slots: Vec<MealSlot> = self.fetch(collections::MEAL_SLOTS, &by_residence).await?;
        let cutoffs: Vec<RequestCutoff> = self
            .fetch(collections::REQUEST_CUTOFFS, &by_residence)
            .await?;
        let overrides: Vec<ScheduleOverride> = self
            .fetch(collections::SCHEDULE_OVERRIDES, &by_residence)
            .await?;

        let slot_ids = ids_of(&slots, |s: &MealSlot| &s.id);
        let alternatives: Vec<Alternative> = decode_all(
            in_chunks(
                self.store(),
                collections::ALTERNATIVES,
                "tiempoComidaId",
                &slot_ids,
                &[],
            )
            .await?,
        )?;

        let alteration_ids = ids_of(&overrides, |o: &ScheduleOverride| &o.id);
        let slot_overrides: Vec<SlotOverride> = decode_all(
            in_chunks(
                self.store(),
                collections::SLOT_OVERRIDES,
                "alteracionId",
                &alteration_ids,
                &[],
            )
            .await?,
        )?;

        let slot_override_ids = ids_of(&slot_overrides, |m: &SlotOverride| &m.id);
        let alternative_overrides: Vec<AlternativeOverride> = decode_all(
            in_chunks(
                self.store(),
                collections::ALTERNATIVE_OVERRIDES,
                "tiempoComidaModId",
                &slot_override_ids,
                &[],
            )
            .await?,
        )?;

        for alternative in &alternatives {
            alternative.validate()?;
        }
        for cutoff in &cutoffs {
            cutoff.validate()?;
        }

        Ok(ResidenceConfig {
            residence_id: residence.id,
            timezone: residence.timezone,
            slots,
            alternatives,
            cutoffs,
            overrides,
            slot_overrides,
            alternative_overrides,
        })
    }

    /// Loads the user-scoped snapshot for one affected period.
    pub async fn user_snapshot(
        &self,
        user_id: &str,
        period: &DateRange,
    ) -> Result<UserSnapshot, ScheduleError> {
        let by_user = [
            Filter::eq("usuarioId", user_id),
            Filter::eq("residenciaId", self.residence_id()),
        ];

        let selection = self.find_weekly_selection(user_id).await?;

        let mut exception_filters = by_user.to_vec();
        exception_filters.push(Filter::gte("fecha", period.start.to_string()));
        exception_filters.push(Filter::lte("fecha", period.end.to_string()));
        let exceptions: Vec<SelectionException> = decode_all(
            self.store()
                .query(collections::EXCEPTIONS, &exception_filters, None)
                .await?,
        )?;

        let mut absence_filters = by_user.to_vec();
        absence_filters.push(Filter::lte("fechaInicio", period.end.to_string()));
        absence_filters.push(Filter::gte("fechaFin", period.start.to_string()));
        let absences: Vec<Absence> = decode_all(
            self.store()
                .query(collections::ABSENCES, &absence_filters, None)
                .await?,
        )?;

        let enrollments: Vec<ActivityEnrollment> = decode_all(
            self.store()
                .query(
                    collections::ENROLLMENTS,
                    &[Filter::eq("usuarioId", user_id)],
                    None,
                )
                .await?,
        )?
        .into_iter()
        .filter(|e: &ActivityEnrollment| e.dates.iter().any(|date| period.contains(*date)))
        .collect();

        let activity_ids = ids_of(&enrollments, |e: &ActivityEnrollment| &e.activity_id);
        let activities: Vec<Activity> = decode_all(
            in_chunks(
                self.store(),
                collections::ACTIVITIES,
                "id",
                &activity_ids,
                &[],
            )
            .await?,
        )?;
        let substitutions: Vec<MealSubstitution> = decode_all(
            in_chunks(
                self.store(),
                collections::MEAL_SUBSTITUTIONS,
                "actividadId",
                &activity_ids,
                &[],
            )
            .await?,
        )?;

        let restriction = self.group_restriction(user_id).await?;

        Ok(UserSnapshot {
            user_id: user_id.to_owned(),
            selection,
            exceptions,
            absences,
            enrollments,
            activities,
            substitutions,
            restriction,
        })
    }

    /// The user's weekly selection, if exactly zero or one exists.
    /// Several documents for the same pair is the ambiguous terminal
    /// state and surfaces as an integrity error.
    pub(crate) async fn find_weekly_selection(
        &self,
        user_id: &str,
    ) -> Result<Option<WeeklySelection>, ScheduleError> {
        let documents = self
            .store()
            .query(
                collections::WEEKLY_SELECTIONS,
                &[
                    Filter::eq("usuarioId", user_id),
                    Filter::eq("residenciaId", self.residence_id()),
                ],
                None,
            )
            .await?;

        match documents.as_slice() {
            [] => Ok(None),
            [document] => Ok(Some(document.decode()?)),
            _ => Err(ScheduleError::DuplicateWeeklySelection {
                user_id: user_id.to_owned(),
                count: documents.len(),
            }),
        }
    }

    async fn group_restriction(
        &self,
        user_id: &str,
    ) -> Result<Option<GroupRestriction>, ScheduleError> {
        let Some(user) = self.store().get(collections::USERS, user_id).await? else {
            tracing::warn!(user = %user_id, "user record not found, skipping restrictions");
            return Ok(None);
        };
        let user: UserRecord = user.decode()?;

        let Some(group_id) = user.group_id else {
            return Ok(None);
        };

        let documents = self
            .store()
            .query(
                collections::GROUP_RESTRICTIONS,
                &[
                    Filter::eq("residenciaId", self.residence_id()),
                    Filter::eq("grupoId", group_id.as_str()),
                ],
                None,
            )
            .await?;

        documents
            .first()
            .map(|document| document.decode().map_err(Into::into))
            .transpose()
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        collection: &str,
        filters: &[Filter],
    ) -> Result<Vec<T>, ScheduleError> {
        let documents = self.store().query(collection, filters, None).await?;

        decode_all(documents)
    }
}

fn decode_all<T: DeserializeOwned>(
    documents: Vec<comedor_store::Document>,
) -> Result<Vec<T>, ScheduleError> {
    documents
        .iter()
        .map(|document| document.decode().map_err(Into::into))
        .collect()
}

fn ids_of<T, F: Fn(&T) -> &String>(records: &[T], id: F) -> Vec<String> {
    let mut ids = records.iter().map(|r| id(r).clone()).collect::<Vec<_>>();
    ids.sort();
    ids.dedup();

    ids
}
