use serde::Serialize;
use time::{Date, OffsetDateTime};

use comedor_shared::DateRange;
use comedor_shared::session::{SessionError, SessionVerifier};
use comedor_store::DocumentStore;

use crate::config::{ResidenceConfig, UserSnapshot};
use crate::resolver::{ResolvedCell, resolve_cell};
use crate::restriction::flag_restricted;
use crate::{ScheduleError, service};

/// Where a cell's resolved current choice came from.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceSource {
    Exception,
    Activity,
    Weekly,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CellChoice {
    pub alternative_id: Option<String>,
    pub source: ChoiceSource,
}

/// Activity plan replacing the normal slot for this user and date.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CellSubstitution {
    pub activity_id: String,
    pub activity_name: String,
    pub alternative_id: String,
}

/// One date × meal-group cell of the weekly grid.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct GridCell {
    pub group: String,
    pub slot_id: Option<String>,
    pub name: Option<String>,
    pub configured: bool,
    pub altered: bool,
    pub alternatives: Vec<String>,
    pub restricted: Vec<String>,
    pub substitution: Option<CellSubstitution>,
    pub absent: bool,
    pub choice: Option<CellChoice>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct GridDay {
    pub date: Date,
    pub cells: Vec<GridCell>,
}

/// Day × meal-group grid used both for display and as the write shape
/// of the user's weekly selection.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct WeekGrid {
    pub period: DateRange,
    pub groups: Vec<String>,
    pub days: Vec<GridDay>,
}

/// Denormalizes the affected period into the per-day grid for one user.
///
/// Integrity errors abort and surface; lookup gaps degrade the affected
/// cell to its next-available state.
pub fn build_grid(
    period: &DateRange,
    config: &ResidenceConfig,
    user: &UserSnapshot,
) -> Result<WeekGrid, ScheduleError> {
    let groups = group_names(config, period);

    let mut days = Vec::new();
    for date in period.iter_days() {
        let mut cells = Vec::new();
        for group in &groups {
            cells.push(build_cell(date, group, config, user)?);
        }
        days.push(GridDay { date, cells });
    }

    Ok(WeekGrid {
        period: *period,
        groups,
        days,
    })
}

/// De-duplicated union of base slot groups and override groups within
/// the period, ordered by group order then name. Override-introduced
/// groups without an order sort last.
fn group_names(config: &ResidenceConfig, period: &DateRange) -> Vec<String> {
    let mut orders: Vec<(i64, String)> = Vec::new();

    let mut push = |order: i64, name: &str| match orders.iter_mut().find(|(_, n)| n == name) {
        Some(entry) => entry.0 = entry.0.min(order),
        None => orders.push((order, name.to_owned())),
    };

    for slot in config.slots.iter().filter(|s| s.active) {
        push(slot.group_order, &slot.group);
    }

    for alteration in config
        .overrides
        .iter()
        .filter(|o| o.active && DateRange::new(o.starts, o.ends).overlaps(period))
    {
        for slot_override in config
            .slot_overrides
            .iter()
            .filter(|m| m.alteration_id == alteration.id)
        {
            push(
                slot_override.group_order.unwrap_or(i64::MAX),
                &slot_override.group,
            );
        }
    }

    orders.sort();

    orders.into_iter().map(|(_, name)| name).collect()
}

fn build_cell(
    date: Date,
    group: &str,
    config: &ResidenceConfig,
    user: &UserSnapshot,
) -> Result<GridCell, ScheduleError> {
    let resolved = resolve_cell(date, group, config)?;
    let view = flag_restricted(&resolved.alternatives, user.restriction.as_ref());

    let substitution = substitution_for(date, &resolved, user);
    let absent = user.absences.iter().any(|a| a.covers(date));
    let choice = resolve_choice(date, &resolved, substitution.as_ref(), user);

    Ok(GridCell {
        group: group.to_owned(),
        slot_id: resolved.slot_id,
        name: resolved.name,
        configured: resolved.configured,
        altered: resolved.altered,
        alternatives: view.available,
        restricted: view.restricted,
        substitution,
        absent,
        choice,
    })
}

/// Activity substitution consuming this slot for the user on this date,
/// if any enrollment carries one. Enrollments pointing at unknown
/// activities degrade to no substitution.
fn substitution_for(
    date: Date,
    resolved: &ResolvedCell,
    user: &UserSnapshot,
) -> Option<CellSubstitution> {
    let slot_id = resolved.slot_id.as_deref()?;

    for enrollment in user
        .enrollments
        .iter()
        .filter(|e| e.meals_included && e.dates.contains(&date))
    {
        let Some(activity) = user
            .activities
            .iter()
            .find(|a| a.id == enrollment.activity_id)
        else {
            tracing::warn!(
                enrollment = %enrollment.id,
                activity = %enrollment.activity_id,
                "enrollment references an unknown activity"
            );
            continue;
        };

        if !activity.active || !activity.covers(date) {
            continue;
        }

        if let Some(substitution) = user
            .substitutions
            .iter()
            .find(|s| s.activity_id == activity.id && s.date == date && s.slot_id == slot_id)
        {
            return Some(CellSubstitution {
                activity_id: activity.id.clone(),
                activity_name: activity.name.clone(),
                alternative_id: substitution.alternative_id.clone(),
            });
        }
    }

    None
}

/// Current choice for the cell. Precedence: same-date exception, then
/// activity substitution, then the standing weekly selection, then none.
/// A choice naming an alternative no longer available falls through to
/// the next level.
fn resolve_choice(
    date: Date,
    resolved: &ResolvedCell,
    substitution: Option<&CellSubstitution>,
    user: &UserSnapshot,
) -> Option<CellChoice> {
    let slot_id = resolved.slot_id.as_deref()?;

    if let Some(exception) = user
        .exceptions
        .iter()
        .find(|e| e.date == date && e.slot_id == slot_id)
    {
        match &exception.alternative_id {
            None => {
                return Some(CellChoice {
                    alternative_id: None,
                    source: ChoiceSource::Exception,
                });
            }
            Some(id) if resolved.alternatives.contains(id) => {
                return Some(CellChoice {
                    alternative_id: Some(id.clone()),
                    source: ChoiceSource::Exception,
                });
            }
            Some(id) => {
                tracing::warn!(
                    exception = %exception.id,
                    alternative = %id,
                    "exception references an unavailable alternative"
                );
            }
        }
    }

    if let Some(substitution) = substitution {
        return Some(CellChoice {
            alternative_id: Some(substitution.alternative_id.clone()),
            source: ChoiceSource::Activity,
        });
    }

    if let Some(selection) = &user.selection {
        if let Some(Some(id)) = selection.choices.get(slot_id) {
            if resolved.alternatives.contains(id) {
                return Some(CellChoice {
                    alternative_id: Some(id.clone()),
                    source: ChoiceSource::Weekly,
                });
            }
            tracing::warn!(
                selection = %selection.id,
                alternative = %id,
                "weekly selection references an unavailable alternative"
            );
        }
    }

    None
}

impl<S: DocumentStore> crate::Schedule<S> {
    /// Loads the user snapshot for the period and denormalizes the grid.
    pub async fn weekly_grid(
        &self,
        user_id: &str,
        config: &ResidenceConfig,
        period: &DateRange,
    ) -> Result<WeekGrid, ScheduleError> {
        let user = self.user_snapshot(user_id, period).await?;

        build_grid(period, config, &user)
    }

    /// Full request-handler orchestration: verify the session, load the
    /// configuration, compute the affected period and build the grid.
    pub async fn weekly_grid_for_token(
        &self,
        verifier: &dyn SessionVerifier,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<WeekGrid, ScheduleError> {
        let session = verifier.verify(token).await?;
        if session.residence_id != self.residence_id() {
            return Err(SessionError::InvalidSession.into());
        }

        let config = self.residence_config().await?;
        let today = service::local_date(&config.timezone, now);
        let period = crate::period::affected_period(
            today,
            &config.slots,
            &config.alternatives,
            &config.cutoffs,
        )?;

        self.weekly_grid(&session.user_id, &config, &period).await
    }
}
