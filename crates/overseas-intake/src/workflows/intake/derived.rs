use chrono::{Datelike, Local, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;

/// Value shown in the read-only age field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedAge {
    Years(u32),
    /// Birth date in the future, or less than one full year ago.
    Invalid,
}

impl DerivedAge {
    pub const fn years(self) -> Option<u32> {
        match self {
            Self::Years(years) => Some(years),
            Self::Invalid => None,
        }
    }

    pub const fn is_invalid(self) -> bool {
        matches!(self, Self::Invalid)
    }
}

impl fmt::Display for DerivedAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivedAge::Years(years) => write!(f, "{years}"),
            DerivedAge::Invalid => write!(f, "Invalid"),
        }
    }
}

impl Serialize for DerivedAge {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DerivedAge::Years(years) => serializer.serialize_u32(*years),
            DerivedAge::Invalid => serializer.serialize_str("Invalid"),
        }
    }
}

/// Calendar age of someone born on `date_of_birth`, as of `today`.
pub fn age(date_of_birth: Option<NaiveDate>, today: NaiveDate) -> Option<DerivedAge> {
    let born = date_of_birth?;
    if born > today {
        return Some(DerivedAge::Invalid);
    }

    let mut years = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        years -= 1;
    }

    if years > 0 {
        Some(DerivedAge::Years(years as u32))
    } else {
        Some(DerivedAge::Invalid)
    }
}

/// Source of "today" for age derivation.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn missing_birth_date_yields_no_age() {
        assert_eq!(age(None, date(2024, 6, 15)), None);
    }

    #[test]
    fn birthday_boundary_uses_calendar_years() {
        let born = Some(date(2000, 6, 15));
        assert_eq!(age(born, date(2024, 6, 14)), Some(DerivedAge::Years(23)));
        assert_eq!(age(born, date(2024, 6, 15)), Some(DerivedAge::Years(24)));
        assert_eq!(age(born, date(2024, 7, 1)), Some(DerivedAge::Years(24)));
    }

    #[test]
    fn earlier_month_with_later_day_is_still_a_full_year() {
        let born = Some(date(1990, 3, 31));
        assert_eq!(age(born, date(2020, 4, 1)), Some(DerivedAge::Years(30)));
        assert_eq!(age(born, date(2020, 3, 30)), Some(DerivedAge::Years(29)));
    }

    #[test]
    fn future_birth_date_is_invalid() {
        let today = date(2024, 6, 15);
        assert_eq!(age(Some(date(2024, 6, 16)), today), Some(DerivedAge::Invalid));
        assert_eq!(age(Some(date(2030, 1, 1)), today), Some(DerivedAge::Invalid));
    }

    #[test]
    fn under_one_year_collapses_to_invalid() {
        let today = date(2024, 6, 15);
        assert_eq!(age(Some(today), today), Some(DerivedAge::Invalid));
        assert_eq!(age(Some(date(2023, 6, 16)), today), Some(DerivedAge::Invalid));
        assert_eq!(age(Some(date(2023, 6, 15)), today), Some(DerivedAge::Years(1)));
    }

    #[test]
    fn leap_day_birthdays_count_from_march_first_in_common_years() {
        let born = Some(date(2000, 2, 29));
        assert_eq!(age(born, date(2021, 2, 28)), Some(DerivedAge::Years(20)));
        assert_eq!(age(born, date(2021, 3, 1)), Some(DerivedAge::Years(21)));
    }

    #[test]
    fn invalid_serializes_as_sentinel_text() {
        assert_eq!(
            serde_json::to_value(DerivedAge::Invalid).expect("serializes"),
            serde_json::json!("Invalid")
        );
        assert_eq!(
            serde_json::to_value(DerivedAge::Years(30)).expect("serializes"),
            serde_json::json!(30)
        );
    }
}
