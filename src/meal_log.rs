use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{MealCategory, MealItem, NewMealItem, Nutrients};
use crate::nutrients::{sum_sequence, zero};

/// Canonical key format for dates, also used on disk.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date key.
pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| anyhow::anyhow!("invalid date {:?} (expected YYYY-MM-DD): {}", s, e))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// One day's items grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<MealCategory, Vec<MealItem>>",
    into = "BTreeMap<MealCategory, Vec<MealItem>>"
)]
pub struct DailyLog {
    meals: BTreeMap<MealCategory, Vec<MealItem>>,
}

impl From<BTreeMap<MealCategory, Vec<MealItem>>> for DailyLog {
    fn from(mut meals: BTreeMap<MealCategory, Vec<MealItem>>) -> Self {
        meals.retain(|_, items| !items.is_empty());
        Self { meals }
    }
}

impl From<DailyLog> for BTreeMap<MealCategory, Vec<MealItem>> {
    fn from(log: DailyLog) -> Self {
        log.meals
    }
}

impl DailyLog {
    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }

    /// Items in logging order; empty when the category has none.
    pub fn items(&self, category: MealCategory) -> &[MealItem] {
        self.meals.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty categories in enumeration order.
    pub fn categories(&self) -> impl Iterator<Item = (MealCategory, &[MealItem])> {
        self.meals.iter().map(|(c, items)| (*c, items.as_slice()))
    }

    pub fn totals(&self) -> Nutrients {
        sum_sequence(
            self.meals
                .values()
                .flat_map(|items| items.iter().map(|i| &i.nutrients)),
        )
    }

    pub fn category_totals(&self, category: MealCategory) -> Nutrients {
        sum_sequence(self.items(category).iter().map(|i| &i.nutrients))
    }
}

/// All logged meals, keyed by calendar date.
///
/// Mutators return a new value. Empty categories and dates are pruned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<NaiveDate, DailyLog>",
    into = "BTreeMap<NaiveDate, DailyLog>"
)]
pub struct MealLogs {
    days: BTreeMap<NaiveDate, DailyLog>,
}

impl From<BTreeMap<NaiveDate, DailyLog>> for MealLogs {
    fn from(mut days: BTreeMap<NaiveDate, DailyLog>) -> Self {
        days.retain(|_, log| !log.is_empty());
        Self { days }
    }
}

impl From<MealLogs> for BTreeMap<NaiveDate, DailyLog> {
    fn from(logs: MealLogs) -> Self {
        logs.days
    }
}

impl MealLogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DailyLog> {
        self.days.get(&date)
    }

    /// Dates with at least one item, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn items(&self, date: NaiveDate, category: MealCategory) -> &[MealItem] {
        self.day(date).map(|d| d.items(category)).unwrap_or(&[])
    }

    /// Log a new item, stamping it with the current time.
    pub fn add_item(&self, date: NaiveDate, category: MealCategory, item: NewMealItem) -> MealLogs {
        self.add_item_at(date, category, item, Utc::now())
    }

    /// Log a new item with an ID derived from `logged_at`.
    ///
    /// The item is appended to the end of its bucket. If the derived ID is
    /// already used in that bucket it is bumped until free.
    pub fn add_item_at(
        &self,
        date: NaiveDate,
        category: MealCategory,
        item: NewMealItem,
        logged_at: DateTime<Utc>,
    ) -> MealLogs {
        let existing = self.items(date, category);
        let mut ts = logged_at.timestamp_micros();
        let mut entry_id = ts.to_string();
        while existing.iter().any(|i| i.id == entry_id) {
            ts += 1;
            entry_id = ts.to_string();
        }

        let mut next = self.clone();
        next.days
            .entry(date)
            .or_default()
            .meals
            .entry(category)
            .or_default()
            .push(item.with_id(entry_id));
        next
    }

    /// Remove an item by ID. Missing date, category, or ID is a no-op.
    pub fn delete_item(&self, date: NaiveDate, category: MealCategory, item_id: &str) -> MealLogs {
        let found = self
            .items(date, category)
            .iter()
            .any(|item| item.id == item_id);
        if !found {
            return self.clone();
        }

        let mut next = self.clone();
        if let Some(day) = next.days.get_mut(&date) {
            if let Some(items) = day.meals.get_mut(&category) {
                items.retain(|item| item.id != item_id);
                if items.is_empty() {
                    day.meals.remove(&category);
                }
            }
            if day.is_empty() {
                next.days.remove(&date);
            }
        }
        next
    }

    pub fn totals_for_day(&self, date: NaiveDate) -> Nutrients {
        self.day(date).map(DailyLog::totals).unwrap_or_else(zero)
    }

    pub fn totals_for_category(&self, date: NaiveDate, category: MealCategory) -> Nutrients {
        sum_sequence(self.items(date, category).iter().map(|i| &i.nutrients))
    }
}
