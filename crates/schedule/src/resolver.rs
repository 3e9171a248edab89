use time::Date;

use comedor_shared::DayOfWeek;
use comedor_shared::meal::{MealSlot, SlotOverride};

use crate::ScheduleError;
use crate::config::ResidenceConfig;

/// Effective meal slot for one date and meal group after merging the
/// base weekly schedule with any covering override.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCell {
    pub slot_id: Option<String>,
    pub name: Option<String>,
    pub alternatives: Vec<String>,
    pub altered: bool,
    pub configured: bool,
}

impl ResolvedCell {
    fn not_configured() -> Self {
        ResolvedCell {
            slot_id: None,
            name: None,
            alternatives: Vec::new(),
            altered: false,
            configured: false,
        }
    }
}

/// Merges the base weekly definition with date-scoped overrides for one
/// (date, group) cell.
///
/// A matched slot override replaces the display name and marks the cell
/// altered; its alternative overrides are then applied to the base
/// alternative set. A cell emptied by removals stays empty (no fallback
/// to the base set). More than one matching slot override is a
/// data-integrity condition, surfaced rather than first-match resolved.
pub fn resolve_cell(
    date: Date,
    group: &str,
    config: &ResidenceConfig,
) -> Result<ResolvedCell, ScheduleError> {
    let day = DayOfWeek::from_weekday(date.weekday());
    let base = base_slot(&config.slots, day, group);

    let mut matched: Vec<&SlotOverride> = Vec::new();
    for alteration in config
        .overrides
        .iter()
        .filter(|o| o.active && o.covers(date))
    {
        matched.extend(config.slot_overrides.iter().filter(|m| {
            m.alteration_id == alteration.id && m.day == day && m.group == group
        }));
    }

    if matched.len() > 1 {
        return Err(ScheduleError::DuplicateSlotOverride {
            date,
            group: group.to_owned(),
        });
    }
    let slot_override = matched.into_iter().next();

    if base.is_none() && slot_override.is_none() {
        return Ok(ResolvedCell::not_configured());
    }

    let mut alternatives = base
        .map(|slot| {
            config
                .alternatives
                .iter()
                .filter(|a| a.active && a.slot_id == slot.id)
                .map(|a| a.id.clone())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let mut name = base.map(|slot| slot.name.clone());
    let mut altered = false;

    if let Some(slot_override) = slot_override {
        altered = true;
        name = Some(slot_override.name.clone());

        for alternative_override in config
            .alternative_overrides
            .iter()
            .filter(|o| o.slot_override_id == slot_override.id)
        {
            alternative_override
                .kind
                .apply(&alternative_override.alternative_id, &mut alternatives);
        }
    }

    Ok(ResolvedCell {
        slot_id: base.map(|slot| slot.id.clone()),
        name,
        alternatives,
        altered,
        configured: true,
    })
}

/// Base slot for (day, group); a day-scoped slot wins over an unscoped
/// one.
fn base_slot<'a>(slots: &'a [MealSlot], day: DayOfWeek, group: &str) -> Option<&'a MealSlot> {
    let mut unscoped = None;

    for slot in slots.iter().filter(|s| s.active && s.group == group) {
        match slot.day {
            Some(d) if d == day => return Some(slot),
            None if unscoped.is_none() => unscoped = Some(slot),
            _ => {}
        }
    }

    unscoped
}
