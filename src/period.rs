use crate::error::{DashboardError, Result};
use crate::schema::MonthLocale;
use chrono::{Datelike, Months, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

const PT_BR_MONTHS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

const EN_US_MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// A calendar month keyed by year, ordered chronologically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        validate_month(month)?;
        Ok(Self { year, month })
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        first_day_of_month(self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Inclusive month range selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    pub start: YearMonth,
    pub end: YearMonth,
}

impl DateRange {
    /// Builds a range without validating it; call [`DateRange::validate`]
    /// before generating data from it.
    pub fn new(start_month: u32, start_year: i32, end_month: u32, end_year: i32) -> Self {
        Self {
            start: YearMonth {
                year: start_year,
                month: start_month,
            },
            end: YearMonth {
                year: end_year,
                month: end_month,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_month(self.start.month)?;
        validate_month(self.end.month)?;

        if self.start > self.end {
            return Err(DashboardError::InvalidRange {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }

        Ok(())
    }

    pub fn is_single_month(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive number of months, zero when the range is inverted or invalid.
    pub fn month_count(&self) -> usize {
        match (self.start.first_day(), self.end.first_day()) {
            (Some(start), Some(end)) if start <= end => months_between(start, end) as usize + 1,
            _ => 0,
        }
    }

    pub fn expand(&self, locale: MonthLocale) -> Vec<MonthSlot> {
        expand_period(
            self.start.month,
            self.start.year,
            self.end.month,
            self.end.year,
            locale,
        )
    }
}

/// One month of an expanded range. The label is what gets displayed; the
/// date keeps repeated labels of multi-year ranges apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSlot {
    pub label: String,
    pub date: NaiveDate,
}

impl MonthSlot {
    pub fn new(date: NaiveDate, locale: MonthLocale) -> Self {
        Self {
            label: label_for_date(date, locale),
            date,
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// "Out/2025"
    pub fn label_with_year(&self) -> String {
        format!("{}/{}", self.label, self.year())
    }
}

/// Expands `[start, end]` into consecutive months, both ends included.
///
/// Returns an empty vector when the start lies after the end or either month
/// number is out of range; this never fails.
pub fn expand_period(
    start_month: u32,
    start_year: i32,
    end_month: u32,
    end_year: i32,
    locale: MonthLocale,
) -> Vec<MonthSlot> {
    let (Some(start), Some(end)) = (
        first_day_of_month(start_year, start_month),
        first_day_of_month(end_year, end_month),
    ) else {
        return Vec::new();
    };

    let mut slots = Vec::new();
    let mut current = start;
    while current <= end {
        slots.push(MonthSlot::new(current, locale));
        match current.checked_add_months(Months::new(1)) {
            Some(next) => current = next,
            None => break,
        }
    }

    slots
}

pub fn month_labels(slots: &[MonthSlot]) -> Vec<String> {
    slots.iter().map(|s| s.label.clone()).collect()
}

/// Abbreviated month name with its first letter capitalized ("Fev").
pub fn month_label(month: u32, locale: MonthLocale) -> Option<String> {
    let idx = month.checked_sub(1)? as usize;
    let names = match locale {
        MonthLocale::PtBr => &PT_BR_MONTHS,
        MonthLocale::EnUs => &EN_US_MONTHS,
    };
    names.get(idx).map(|name| capitalize_first(name))
}

fn label_for_date(date: NaiveDate, locale: MonthLocale) -> String {
    month_label(date.month(), locale).unwrap_or_default()
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn first_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let year_diff = end.year() - start.year();
    let month_diff = end.month() as i32 - start.month() as i32;
    year_diff * 12 + month_diff
}

pub fn validate_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(DashboardError::InvalidMonth(month));
    }
    Ok(())
}

/// Years offered by the range selectors, newest first.
pub fn year_options(latest: i32, count: usize) -> Vec<i32> {
    (0..count as i32).map(|i| latest - i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_first_quarter_pt_br() {
        let slots = expand_period(1, 2025, 3, 2025, MonthLocale::PtBr);
        assert_eq!(month_labels(&slots), vec!["Jan", "Fev", "Mar"]);
        assert_eq!(slots[1].date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    }

    #[test]
    fn test_expand_inverted_range_is_empty() {
        assert!(expand_period(5, 2025, 4, 2025, MonthLocale::PtBr).is_empty());
        assert!(expand_period(1, 2026, 12, 2025, MonthLocale::PtBr).is_empty());
    }

    #[test]
    fn test_expand_invalid_month_is_empty() {
        assert!(expand_period(0, 2025, 3, 2025, MonthLocale::PtBr).is_empty());
        assert!(expand_period(1, 2025, 13, 2025, MonthLocale::PtBr).is_empty());
    }

    #[test]
    fn test_expand_across_years_keeps_year() {
        let slots = expand_period(11, 2024, 2, 2026, MonthLocale::EnUs);
        assert_eq!(slots.len(), 16);
        assert_eq!(slots[0].label_with_year(), "Nov/2024");
        assert_eq!(slots[2].label, "Jan");
        assert_eq!(slots[14].label, "Jan");
        assert_ne!(slots[2].year(), slots[14].year());
        assert_eq!(slots.last().unwrap().month(), 2);
    }

    #[test]
    fn test_month_count_matches_expansion() {
        for (range, expected) in [
            (DateRange::new(1, 2025, 12, 2025), 12),
            (DateRange::new(6, 2023, 6, 2023), 1),
            (DateRange::new(10, 2016, 3, 2025), 102),
            (DateRange::new(3, 2025, 1, 2025), 0),
        ] {
            assert_eq!(range.month_count(), expected);
            assert_eq!(range.expand(MonthLocale::PtBr).len(), expected);
        }
    }

    #[test]
    fn test_range_validation() {
        assert!(DateRange::new(1, 2025, 1, 2025).validate().is_ok());
        assert!(DateRange::new(1, 2025, 1, 2025).is_single_month());

        let err = DateRange::new(4, 2025, 2, 2025).validate().unwrap_err();
        assert!(matches!(err, DashboardError::InvalidRange { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid date range: start 2025-04 is after end 2025-02"
        );

        let err = DateRange::new(13, 2025, 2, 2026).validate().unwrap_err();
        assert!(matches!(err, DashboardError::InvalidMonth(13)));
    }

    #[test]
    fn test_month_labels_by_locale() {
        assert_eq!(month_label(2, MonthLocale::PtBr).as_deref(), Some("Fev"));
        assert_eq!(month_label(8, MonthLocale::PtBr).as_deref(), Some("Ago"));
        assert_eq!(month_label(12, MonthLocale::PtBr).as_deref(), Some("Dez"));
        assert_eq!(month_label(2, MonthLocale::EnUs).as_deref(), Some("Feb"));
        assert_eq!(month_label(0, MonthLocale::EnUs), None);
        assert_eq!(month_label(13, MonthLocale::EnUs), None);
    }

    #[test]
    fn test_year_options() {
        let years = year_options(2025, 10);
        assert_eq!(years.len(), 10);
        assert_eq!(years[0], 2025);
        assert_eq!(years[9], 2016);
    }
}
