#![allow(dead_code)]

use time::Date;

use comedor_schedule::{Schedule, collections};
use comedor_shared::DayOfWeek;
use comedor_shared::activity::{Activity, ActivityEnrollment, MealSubstitution};
use comedor_shared::meal::{
    AccessKind, Alternative, AlternativeOverride, MealSlot, OverrideKind, RequestCutoff,
    ScheduleOverride, ServingKind, SlotOverride,
};
use comedor_shared::residence::Residence;
use comedor_shared::user::UserRecord;
use comedor_store::MemoryStore;

pub const RESIDENCE: &str = "r1";

/// Engine over a memory store seeded with the residence document.
pub fn schedule() -> anyhow::Result<Schedule<MemoryStore>> {
    let store = MemoryStore::new();
    store.seed(
        collections::RESIDENCES,
        RESIDENCE,
        &Residence {
            id: RESIDENCE.to_owned(),
            name: "Residencia Alcora".to_owned(),
            timezone: "Europe/Madrid".to_owned(),
        },
    )?;

    Ok(Schedule::new(store, RESIDENCE))
}

pub fn meal_slot(id: &str, name: &str, group: &str, order: i64, day: DayOfWeek) -> MealSlot {
    MealSlot {
        id: id.to_owned(),
        residence_id: RESIDENCE.to_owned(),
        name: name.to_owned(),
        group: group.to_owned(),
        group_order: order,
        day: Some(day),
        ordinary: true,
        active: true,
    }
}

pub fn alternative(id: &str, slot_id: &str, principal: bool) -> Alternative {
    Alternative {
        id: id.to_owned(),
        slot_id: slot_id.to_owned(),
        serving: ServingKind::DiningHall,
        access: AccessKind::Open,
        requires_approval: false,
        starts: "13:00".to_owned(),
        ends: "14:30".to_owned(),
        starts_day_before: false,
        ends_day_after: false,
        principal,
        cutoff_id: None,
        active: true,
    }
}

pub fn cutoff(id: &str, day: DayOfWeek, time: &str) -> RequestCutoff {
    RequestCutoff {
        id: id.to_owned(),
        residence_id: RESIDENCE.to_owned(),
        day,
        time: time.to_owned(),
        active: true,
    }
}

pub fn alteration(id: &str, starts: Date, ends: Date) -> ScheduleOverride {
    ScheduleOverride {
        id: id.to_owned(),
        residence_id: RESIDENCE.to_owned(),
        starts,
        ends,
        active: true,
    }
}

pub fn slot_override(
    id: &str,
    alteration_id: &str,
    day: DayOfWeek,
    group: &str,
    name: &str,
) -> SlotOverride {
    SlotOverride {
        id: id.to_owned(),
        alteration_id: alteration_id.to_owned(),
        day,
        group: group.to_owned(),
        name: name.to_owned(),
        group_order: None,
    }
}

pub fn remove_alternative(id: &str, slot_override_id: &str, alternative_id: &str) -> AlternativeOverride {
    AlternativeOverride {
        id: id.to_owned(),
        slot_override_id: slot_override_id.to_owned(),
        kind: OverrideKind::Remove,
        alternative_id: alternative_id.to_owned(),
    }
}

pub fn user(id: &str, group_id: Option<&str>) -> UserRecord {
    UserRecord {
        id: id.to_owned(),
        residence_id: RESIDENCE.to_owned(),
        group_id: group_id.map(str::to_owned),
        active: true,
    }
}

pub fn activity(id: &str, name: &str, starts: Date, ends: Date) -> Activity {
    Activity {
        id: id.to_owned(),
        residence_id: RESIDENCE.to_owned(),
        name: name.to_owned(),
        starts,
        ends,
        active: true,
    }
}

pub fn enrollment(id: &str, activity_id: &str, user_id: &str, dates: Vec<Date>) -> ActivityEnrollment {
    ActivityEnrollment {
        id: id.to_owned(),
        activity_id: activity_id.to_owned(),
        user_id: user_id.to_owned(),
        dates,
        meals_included: true,
    }
}

pub fn substitution(id: &str, activity_id: &str, date: Date, slot_id: &str, alternative_id: &str) -> MealSubstitution {
    MealSubstitution {
        id: id.to_owned(),
        activity_id: activity_id.to_owned(),
        date,
        slot_id: slot_id.to_owned(),
        alternative_id: alternative_id.to_owned(),
    }
}
