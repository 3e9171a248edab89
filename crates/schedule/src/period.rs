use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime};

use comedor_shared::meal::{Alternative, MealSlot, RequestCutoff};
use comedor_shared::{DateRange, DayOfWeek, HourMinute, date_in_week, week_of};
use comedor_store::DocumentStore;
use strum::VariantArray;

use crate::config::ResidenceConfig;
use crate::{ScheduleError, service};

/// Inclusive date range guaranteed to cover every meal occurrence whose
/// submission cutoff has not yet passed for the current cycle.
///
/// Seeds with the ISO week containing `today`, then extends the end for
/// alternatives whose access window opens before their governing cutoff
/// (the occurrence still orderable is next week's) and pulls the start
/// back to Sunday for Monday slots whose window opens the day before.
pub fn affected_period(
    today: Date,
    slots: &[MealSlot],
    alternatives: &[Alternative],
    cutoffs: &[RequestCutoff],
) -> Result<DateRange, ScheduleError> {
    let week = week_of(today);
    let mut start = week.start;
    let mut end = week.end;

    for cutoff in cutoffs.iter().filter(|c| c.active) {
        let cutoff_at = PrimitiveDateTime::new(
            date_in_week(week.start, cutoff.day),
            HourMinute::parse(&cutoff.time)?.time(),
        );

        for alternative in alternatives
            .iter()
            .filter(|a| a.active && a.cutoff_id.as_deref() == Some(cutoff.id.as_str()))
        {
            let Some(slot) = active_slot(slots, &alternative.slot_id) else {
                continue;
            };
            let window_start = HourMinute::parse(&alternative.starts)?.time();

            for day in slot_days(slot) {
                let occurrence = date_in_week(week.start, day);
                let mut window_date = occurrence;
                if alternative.starts_day_before {
                    window_date -= Duration::days(1);
                }

                // Window opens before the cutoff fires: the occurrence
                // still orderable belongs to next week.
                if PrimitiveDateTime::new(window_date, window_start) < cutoff_at {
                    let next_occurrence = occurrence + Duration::days(7);
                    if next_occurrence > end {
                        end = next_occurrence;
                    }
                }
            }
        }
    }

    for alternative in alternatives
        .iter()
        .filter(|a| a.active && a.starts_day_before)
    {
        let Some(slot) = active_slot(slots, &alternative.slot_id) else {
            continue;
        };

        if slot_days(slot).any(|day| day == DayOfWeek::Monday) {
            let sunday_before = week.start - Duration::days(1);
            if sunday_before < start {
                start = sunday_before;
            }
        }
    }

    if start > end {
        return Ok(week);
    }

    Ok(DateRange::new(start, end))
}

fn active_slot<'a>(slots: &'a [MealSlot], id: &str) -> Option<&'a MealSlot> {
    slots.iter().find(|slot| slot.id == id && slot.active)
}

/// Weekdays a slot occupies: its own day, or all seven when unscoped.
fn slot_days(slot: &MealSlot) -> impl Iterator<Item = DayOfWeek> + '_ {
    let days: &[DayOfWeek] = match &slot.day {
        Some(day) => std::slice::from_ref(day),
        None => DayOfWeek::VARIANTS,
    };

    days.iter().copied()
}

impl<S: DocumentStore> crate::Schedule<S> {
    /// Affected period for the residence at the given instant.
    pub fn affected_period(
        &self,
        config: &ResidenceConfig,
        now: OffsetDateTime,
    ) -> Result<DateRange, ScheduleError> {
        let today = service::local_date(&config.timezone, now);

        affected_period(today, &config.slots, &config.alternatives, &config.cutoffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comedor_shared::meal::{AccessKind, ServingKind};
    use time::macros::date;

    fn slot(id: &str, day: Option<DayOfWeek>) -> MealSlot {
        MealSlot {
            id: id.to_owned(),
            residence_id: "r1".to_owned(),
            name: id.to_owned(),
            group: "Comidas".to_owned(),
            group_order: 1,
            day,
            ordinary: true,
            active: true,
        }
    }

    fn alternative(id: &str, slot_id: &str, starts: &str, cutoff_id: Option<&str>) -> Alternative {
        Alternative {
            id: id.to_owned(),
            slot_id: slot_id.to_owned(),
            serving: ServingKind::DiningHall,
            access: AccessKind::Open,
            requires_approval: false,
            starts: starts.to_owned(),
            ends: "23:00".to_owned(),
            starts_day_before: false,
            ends_day_after: false,
            principal: false,
            cutoff_id: cutoff_id.map(str::to_owned),
            active: true,
        }
    }

    fn cutoff(id: &str, day: DayOfWeek, time: &str) -> RequestCutoff {
        RequestCutoff {
            id: id.to_owned(),
            residence_id: "r1".to_owned(),
            day,
            time: time.to_owned(),
            active: true,
        }
    }

    // Wednesday 2025-01-22; its ISO week is Jan 20-26.
    const TODAY: Date = date!(2025 - 01 - 22);

    #[test]
    fn test_empty_inputs_yield_plain_week() {
        let period = affected_period(TODAY, &[], &[], &[]).unwrap();

        assert_eq!(period, DateRange::new(date!(2025 - 01 - 20), date!(2025 - 01 - 26)));
    }

    #[test]
    fn test_window_before_cutoff_extends_into_next_week() {
        // Tuesday slot whose takeaway window opens Monday 08:30, before
        // the Monday 09:00 cutoff: the orderable occurrence is next
        // Tuesday.
        let slots = vec![slot("cena-martes", Some(DayOfWeek::Tuesday))];
        let mut alt = alternative("alt-1", "cena-martes", "08:30", Some("c1"));
        alt.starts_day_before = true;
        let cutoffs = vec![cutoff("c1", DayOfWeek::Monday, "09:00")];

        let period = affected_period(TODAY, &slots, &[alt], &cutoffs).unwrap();

        assert_eq!(period.start, date!(2025 - 01 - 20));
        assert_eq!(period.end, date!(2025 - 01 - 28));
    }

    #[test]
    fn test_window_after_cutoff_keeps_plain_week() {
        let slots = vec![slot("cena-martes", Some(DayOfWeek::Tuesday))];
        let alt = alternative("alt-1", "cena-martes", "20:00", Some("c1"));
        let cutoffs = vec![cutoff("c1", DayOfWeek::Monday, "09:00")];

        let period = affected_period(TODAY, &slots, &[alt], &cutoffs).unwrap();

        assert_eq!(period, DateRange::new(date!(2025 - 01 - 20), date!(2025 - 01 - 26)));
    }

    #[test]
    fn test_monday_day_before_pulls_start_to_sunday() {
        let slots = vec![slot("desayuno-lunes", Some(DayOfWeek::Monday))];
        let mut alt = alternative("alt-1", "desayuno-lunes", "22:00", None);
        alt.starts_day_before = true;

        let period = affected_period(TODAY, &slots, &[alt], &[]).unwrap();

        assert_eq!(period.start, date!(2025 - 01 - 19));
        assert_eq!(period.end, date!(2025 - 01 - 26));
    }

    #[test]
    fn test_unscoped_slot_covers_every_day() {
        // Day-unscoped slot: the Monday occurrence pulls the start back
        // and the pre-cutoff windows push the end into next week.
        let slots = vec![slot("merienda", None)];
        let mut alt = alternative("alt-1", "merienda", "06:00", Some("c1"));
        alt.starts_day_before = true;
        let cutoffs = vec![cutoff("c1", DayOfWeek::Sunday, "12:00")];

        let period = affected_period(TODAY, &slots, &[alt], &cutoffs).unwrap();

        assert_eq!(period.start, date!(2025 - 01 - 19));
        // Saturday's window (Friday 06:00) precedes the Sunday cutoff,
        // so next week's Saturday is covered.
        assert!(period.end >= date!(2025 - 02 - 01));
        assert!(period.start <= period.end);
    }

    #[test]
    fn test_inactive_records_are_ignored() {
        let mut inactive_slot = slot("cena-martes", Some(DayOfWeek::Tuesday));
        inactive_slot.active = false;
        let mut alt = alternative("alt-1", "cena-martes", "08:30", Some("c1"));
        alt.starts_day_before = true;
        let cutoffs = vec![cutoff("c1", DayOfWeek::Monday, "09:00")];

        let period = affected_period(TODAY, &[inactive_slot], &[alt], &cutoffs).unwrap();

        assert_eq!(period, DateRange::new(date!(2025 - 01 - 20), date!(2025 - 01 - 26)));
    }

    #[test]
    fn test_end_never_precedes_start() {
        // Conflicting extensions from several cutoffs and windows must
        // still produce an ordered range.
        let slots = vec![
            slot("desayuno-lunes", Some(DayOfWeek::Monday)),
            slot("merienda", None),
        ];
        let mut early = alternative("alt-1", "desayuno-lunes", "00:00", Some("c1"));
        early.starts_day_before = true;
        let late = alternative("alt-2", "merienda", "23:59", Some("c2"));
        let cutoffs = vec![
            cutoff("c1", DayOfWeek::Sunday, "23:59"),
            cutoff("c2", DayOfWeek::Monday, "00:00"),
        ];

        let period = affected_period(TODAY, &slots, &[early, late], &cutoffs).unwrap();

        assert!(period.start <= period.end);
    }
}
