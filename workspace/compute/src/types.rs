//! Domain types flowing through the pipeline.

use chrono::{Datelike, Months, NaiveDate};
use common::PopulationGroup;
use std::fmt;

/// A calendar month, stored as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NaiveDate);

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Month)
    }

    /// Truncates a date to its month.
    pub fn from_date(date: NaiveDate) -> Self {
        Month(date.with_day(1).unwrap_or(date))
    }

    /// Months since year 0, used as a dense integer key in dataframes.
    pub fn index(&self) -> i32 {
        self.0.year() * 12 + self.0.month0() as i32
    }

    pub fn from_index(index: i32) -> Option<Self> {
        Month::new(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn add_months(&self, months: u32) -> Option<Self> {
        self.0.checked_add_months(Months::new(months)).map(Month)
    }

    pub fn succ(&self) -> Option<Self> {
        self.add_months(1)
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(&self, other: Month) -> i32 {
        other.index() - self.index()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Month::from_date(date)
    }
}

/// A cleaned observation from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub state: String,
    pub month: Month,
    pub population_group: PopulationGroup,
    pub value: f64,
}

impl Record {
    pub fn new(state: impl Into<String>, month: Month, population_group: PopulationGroup, value: f64) -> Self {
        Self {
            state: state.into(),
            month,
            population_group,
            value,
        }
    }
}

/// Mean value of one (month, population group) bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    pub month: Month,
    pub population_group: PopulationGroup,
    pub value: f64,
}

impl AggregatedRow {
    pub fn new(month: Month, population_group: PopulationGroup, value: f64) -> Self {
        Self {
            month,
            population_group,
            value,
        }
    }
}

/// Rows ordered by month, then canonical group order; one row per bucket.
pub type AggregatedSeries = Vec<AggregatedRow>;

/// Normalizes a raw state name: trims it and title-cases it.
///
/// A letter is upper-cased when it follows a non-letter (or starts the
/// string) and lower-cased otherwise, so `"jammu & kashmir"` becomes
/// `"Jammu & Kashmir"`.
pub fn normalize_state(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut previous_is_letter = false;

    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                normalized.extend(c.to_lowercase());
            } else {
                normalized.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            normalized.push(c);
            previous_is_letter = false;
        }
    }

    normalized
}

/// Selected states, normalized, sorted and de-duplicated.
///
/// An empty filter selects every state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StateFilter {
    states: Vec<String>,
}

impl StateFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut states: Vec<String> = states
            .into_iter()
            .map(|s| normalize_state(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        states.sort();
        states.dedup();

        Self { states }
    }

    /// Parses a comma-separated list, e.g. `"Goa, kerala"`.
    pub fn parse_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn is_all(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn matches(&self, state: &str) -> bool {
        self.is_all() || self.states.binary_search_by(|s| s.as_str().cmp(state)).is_ok()
    }
}
