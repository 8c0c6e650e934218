use std::fmt;
use std::iter::successors;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::meal_log::MealLogs;
use crate::models::Nutrients;
use crate::nutrients::sum_sequence;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Monday through Sunday
    #[default]
    Week,
    Month,
    Year,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        })
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(anyhow!("unknown period: {} (expected week, month or year)", s)),
        }
    }
}

/// One chart point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    /// Short display label, e.g. `Jan 5`
    pub label: String,
    #[serde(flatten)]
    pub nutrients: Nutrients,
}

/// Display label for a chart point.
pub fn date_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// First and last day (inclusive) of the period containing `reference`,
/// clipped to the representable date range.
pub fn interval(period: Period, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let back = |days: u32| {
        reference
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN)
    };
    // Only the last month of the calendar can overflow, and it ends on MAX.
    let last_day = |start: NaiveDate, months: u32| {
        start
            .checked_add_months(Months::new(months))
            .and_then(|next| next.checked_sub_days(Days::new(1)))
            .unwrap_or(NaiveDate::MAX)
    };

    match period {
        Period::Week => {
            let start = back(reference.weekday().num_days_from_monday());
            let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
            (start, end)
        }
        Period::Month => {
            let start = back(reference.day0());
            (start, last_day(start, 1))
        }
        Period::Year => {
            let start = back(reference.ordinal0());
            (start, last_day(start, 12))
        }
    }
}

/// One record per calendar day of the period, ascending, including days
/// with nothing logged.
pub fn aggregate(logs: &MealLogs, period: Period, reference: NaiveDate) -> Vec<DailyTotals> {
    let (start, end) = interval(period, reference);
    successors(Some(start), |day| day.succ_opt().filter(|next| *next <= end))
        .map(|date| DailyTotals {
            date,
            label: date_label(date),
            nutrients: logs.totals_for_day(date),
        })
        .collect()
}

/// [`aggregate`] for an instant, bucketed by its calendar date in `Tz`.
pub fn aggregate_at<Tz: TimeZone>(
    logs: &MealLogs,
    period: Period,
    reference: DateTime<Tz>,
) -> Vec<DailyTotals> {
    aggregate(logs, period, reference.date_naive())
}

/// Sum of a series' nutrients.
pub fn series_total(series: &[DailyTotals]) -> Nutrients {
    sum_sequence(series.iter().map(|d| &d.nutrients))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meal_log::parse_date;
    use crate::models::{FoodType, MealCategory, NewMealItem};
    use chrono::{Utc, Weekday};

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn food(calories: f64) -> NewMealItem {
        NewMealItem {
            name: "Thing".to_string(),
            food_type: FoodType::Meat,
            nutrients: Nutrients {
                calories,
                ..Nutrients::default()
            },
        }
    }

    #[test]
    fn week_is_monday_to_sunday() {
        // 2024-01-03 is a Wednesday
        let series = aggregate(&MealLogs::new(), Period::Week, date("2024-01-03"));
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, date("2024-01-01"));
        assert_eq!(series[0].date.weekday(), Weekday::Mon);
        assert_eq!(series[6].date, date("2024-01-07"));
        assert_eq!(series[6].date.weekday(), Weekday::Sun);
    }

    #[test]
    fn week_boundaries_contain_reference() {
        for reference in ["2024-01-01", "2024-01-07", "2023-12-31", "2024-02-29"] {
            let reference = date(reference);
            let series = aggregate(&MealLogs::new(), Period::Week, reference);
            assert_eq!(series.len(), 7);
            assert!(series.iter().any(|d| d.date == reference));
            assert_eq!(series[0].date.weekday(), Weekday::Mon);
        }
    }

    #[test]
    fn week_length_ignores_log_content() {
        let d = date("2024-05-15");
        let logs = MealLogs::new()
            .add_item(d, MealCategory::Lunch, food(400.0))
            .add_item(date("2024-06-01"), MealCategory::Lunch, food(100.0));
        let series = aggregate(&logs, Period::Week, d);
        assert_eq!(series.len(), 7);
        let wednesday = series.iter().find(|p| p.date == d).unwrap();
        assert_eq!(wednesday.nutrients.calories, 400.0);
        assert_eq!(series_total(&series).calories, 400.0);
    }

    #[test]
    fn month_lengths() {
        let logs = MealLogs::new();
        assert_eq!(aggregate(&logs, Period::Month, date("2024-02-10")).len(), 29);
        assert_eq!(aggregate(&logs, Period::Month, date("2023-02-10")).len(), 28);
        assert_eq!(aggregate(&logs, Period::Month, date("2024-04-30")).len(), 30);
        let december = aggregate(&logs, Period::Month, date("2024-12-31"));
        assert_eq!(december.len(), 31);
        assert_eq!(december[0].date, date("2024-12-01"));
        assert_eq!(december[30].date, date("2024-12-31"));
    }

    #[test]
    fn year_lengths() {
        let logs = MealLogs::new();
        let leap = aggregate(&logs, Period::Year, date("2024-07-01"));
        assert_eq!(leap.len(), 366);
        assert_eq!(leap[0].date, date("2024-01-01"));
        assert_eq!(leap[365].date, date("2024-12-31"));
        assert_eq!(aggregate(&logs, Period::Year, date("2023-01-01")).len(), 365);
    }

    #[test]
    fn records_match_day_totals_and_empty_days_are_zero() {
        let logs = MealLogs::new()
            .add_item(date("2024-03-05"), MealCategory::Breakfast, food(300.0))
            .add_item(date("2024-03-05"), MealCategory::Dinner, food(700.0))
            .add_item(date("2024-03-20"), MealCategory::Snacks, food(120.0));
        let series = aggregate(&logs, Period::Month, date("2024-03-15"));
        assert_eq!(series.len(), 31);
        for point in &series {
            assert_eq!(point.nutrients, logs.totals_for_day(point.date));
        }
        assert_eq!(series[4].nutrients.calories, 1000.0);
        assert_eq!(series[0].nutrients, Nutrients::default());
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn labels_are_short_month_day() {
        assert_eq!(date_label(date("2024-01-05")), "Jan 5");
        assert_eq!(date_label(date("2024-11-21")), "Nov 21");
    }

    #[test]
    fn instant_uses_its_calendar_date() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 3, 23, 59, 0).unwrap();
        let series = aggregate_at(&MealLogs::new(), Period::Week, instant);
        assert_eq!(series[0].date, date("2024-01-01"));
    }

    #[test]
    fn periods_at_the_end_of_the_calendar() {
        let logs = MealLogs::new().add_item(NaiveDate::MAX, MealCategory::Lunch, food(50.0));
        for period in [Period::Week, Period::Month, Period::Year] {
            let series = aggregate(&logs, period, NaiveDate::MAX);
            let last = series.last().unwrap();
            assert_eq!(last.date, NaiveDate::MAX);
            assert_eq!(last.nutrients.calories, 50.0);
            assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        }

        let december = aggregate(&logs, Period::Month, NaiveDate::MAX.with_day(15).unwrap());
        assert_eq!(december.len(), 31);
        assert_eq!(december[0].date, NaiveDate::MAX.with_day(1).unwrap());

        let year = aggregate(&logs, Period::Year, NaiveDate::MAX);
        assert_eq!(year[0].date, NaiveDate::MAX.with_ordinal(1).unwrap());
    }

    #[test]
    fn periods_at_the_start_of_the_calendar() {
        let logs = MealLogs::new();
        for period in [Period::Week, Period::Month, Period::Year] {
            let series = aggregate(&logs, period, NaiveDate::MIN);
            assert_eq!(series[0].date, NaiveDate::MIN);
            assert!(series.iter().all(|p| p.nutrients == Nutrients::default()));
        }
        assert!(aggregate(&logs, Period::Week, NaiveDate::MIN).len() <= 7);
        assert_eq!(aggregate(&logs, Period::Month, NaiveDate::MIN).len(), 31);
        let december_31 = NaiveDate::MIN.with_month(12).unwrap().with_day(31).unwrap();
        assert_eq!(interval(Period::Year, NaiveDate::MIN), (NaiveDate::MIN, december_31));
    }

    #[test]
    fn period_parses_case_insensitively() {
        assert_eq!("Month".parse::<Period>().unwrap(), Period::Month);
        assert!("fortnight".parse::<Period>().is_err());
    }
}
