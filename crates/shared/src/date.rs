use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};
use time::{Date, Duration, Time, Weekday};

/// Weekday as stored on meal documents.
#[derive(
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    VariantArray,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
)]
#[strum(serialize_all = "lowercase")]
pub enum DayOfWeek {
    #[serde(rename = "lunes")]
    Monday,
    #[serde(rename = "martes")]
    Tuesday,
    #[serde(rename = "miercoles")]
    Wednesday,
    #[serde(rename = "jueves")]
    Thursday,
    #[serde(rename = "viernes")]
    Friday,
    #[serde(rename = "sabado")]
    Saturday,
    #[serde(rename = "domingo")]
    Sunday,
}

impl DayOfWeek {
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Monday => DayOfWeek::Monday,
            Weekday::Tuesday => DayOfWeek::Tuesday,
            Weekday::Wednesday => DayOfWeek::Wednesday,
            Weekday::Thursday => DayOfWeek::Thursday,
            Weekday::Friday => DayOfWeek::Friday,
            Weekday::Saturday => DayOfWeek::Saturday,
            Weekday::Sunday => DayOfWeek::Sunday,
        }
    }

    pub fn weekday(self) -> Weekday {
        match self {
            DayOfWeek::Monday => Weekday::Monday,
            DayOfWeek::Tuesday => Weekday::Tuesday,
            DayOfWeek::Wednesday => Weekday::Wednesday,
            DayOfWeek::Thursday => Weekday::Thursday,
            DayOfWeek::Friday => Weekday::Friday,
            DayOfWeek::Saturday => Weekday::Saturday,
            DayOfWeek::Sunday => Weekday::Sunday,
        }
    }

    /// 0 = Monday .. 6 = Sunday
    pub fn days_from_monday(self) -> i64 {
        self.weekday().number_days_from_monday() as i64
    }

    pub fn matches(self, date: Date) -> bool {
        DayOfWeek::from_weekday(date.weekday()) == self
    }
}

/// Inclusive calendar date range.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).whole_days() + 1
    }

    pub fn iter_days(&self) -> impl Iterator<Item = Date> {
        let end = self.end;
        let mut next = Some(self.start);

        std::iter::from_fn(move || {
            let date = next?;
            if date > end {
                return None;
            }
            next = date.next_day();
            Some(date)
        })
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid HH:mm time: {0}")]
pub struct InvalidHourMinute(pub String);

/// Wall-clock time as stored on meal documents ("HH:mm").
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct HourMinute(Time);

impl HourMinute {
    pub fn parse(value: &str) -> Result<Self, InvalidHourMinute> {
        let err = || InvalidHourMinute(value.to_owned());
        let (hour, minute) = value.split_once(':').ok_or_else(err)?;

        if hour.len() != 2 || minute.len() != 2 {
            return Err(err());
        }

        let hour: u8 = hour.parse().map_err(|_| err())?;
        let minute: u8 = minute.parse().map_err(|_| err())?;
        let time = Time::from_hms(hour, minute, 0).map_err(|_| err())?;

        Ok(Self(time))
    }

    pub fn time(self) -> Time {
        self.0
    }
}

impl fmt::Display for HourMinute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl FromStr for HourMinute {
    type Err = InvalidHourMinute;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Validator rule for HH:mm document fields.
pub fn hour_minute(value: &str) -> Result<(), validator::ValidationError> {
    match HourMinute::parse(value) {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut error = validator::ValidationError::new("hour_minute");
            error.message = Some(std::borrow::Cow::from("Time must be in HH:mm format"));
            Err(error)
        }
    }
}

/// Monday through Sunday of the ISO week containing `date`.
pub fn week_of(date: Date) -> DateRange {
    let days_since_monday = date.weekday().number_days_from_monday() as i64;
    let monday = date - Duration::days(days_since_monday);

    DateRange::new(monday, monday + Duration::days(6))
}

/// The date `day` falls on within the week starting at `monday`.
pub fn date_in_week(monday: Date, day: DayOfWeek) -> Date {
    monday + Duration::days(day.days_from_monday())
}
