use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, DailyTotals, Period};
use crate::calories::target_for_profile;
use crate::client::{LabelRecognizer, RecognitionError};
use crate::meal_log::MealLogs;
use crate::models::{MealCategory, MealItem, NewMealItem, Nutrients, ProfileInput, UserProfile};
use crate::store::{load, save, Store};

pub const PROFILE_KEY: &str = "userProfile";
pub const LOGS_KEY: &str = "mealLogs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Profile,
    Dashboard,
    Stats,
}

/// One meal category as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealSummary {
    pub category: MealCategory,
    pub items: Vec<MealItem>,
    pub totals: Nutrients,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub target_calories: i64,
    pub consumed: Nutrients,
    /// Target minus consumed calories, negative when over target
    pub remaining_calories: i64,
    /// Every category in menu order, empty ones included
    pub meals: Vec<MealSummary>,
}

pub struct DietApp<S: Store> {
    store: S,
    profile: Option<UserProfile>,
    logs: MealLogs,
}

impl<S: Store> DietApp<S> {
    /// Load persisted state. Missing keys start empty.
    pub fn load(store: S) -> Result<Self> {
        let profile: Option<UserProfile> = load(&store, PROFILE_KEY)?;
        let logs: MealLogs = load(&store, LOGS_KEY)?.unwrap_or_default();
        debug!(
            has_profile = profile.is_some(),
            days = logs.dates().count(),
            "loaded state"
        );
        Ok(Self {
            store,
            profile,
            logs,
        })
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn logs(&self) -> &MealLogs {
        &self.logs
    }

    /// Where the user lands on startup.
    pub fn landing_page(&self) -> Page {
        if self.profile.is_some() {
            Page::Dashboard
        } else {
            Page::Profile
        }
    }

    /// Validate, compute the calorie target snapshot, and persist.
    pub fn save_profile(&mut self, input: ProfileInput) -> Result<&UserProfile> {
        validate_profile(&input)?;
        let target_calories = target_for_profile(&input);
        let profile = UserProfile {
            name: input.name.trim().to_string(),
            age: input.age,
            height: input.height,
            weight: input.weight,
            activity_level: input.activity_level,
            weight_goal: input.weight_goal,
            target_calories,
        };

        save(&self.store, PROFILE_KEY, &profile)?;
        info!(name = %profile.name, target_calories, "profile saved");
        Ok(&*self.profile.insert(profile))
    }

    pub fn add_item(
        &mut self,
        date: NaiveDate,
        category: MealCategory,
        item: NewMealItem,
    ) -> Result<&MealItem> {
        let name = item.name.clone();
        let next = self.logs.add_item(date, category, item);
        self.commit(next)?;
        info!(%date, %category, %name, "item logged");
        self.logs
            .items(date, category)
            .last()
            .ok_or_else(|| anyhow!("logged item missing from {} {}", date, category))
    }

    /// Remove an item. Returns whether anything was removed.
    pub fn delete_item(&mut self, date: NaiveDate, category: MealCategory, item_id: &str) -> Result<bool> {
        let next = self.logs.delete_item(date, category, item_id);
        if next == self.logs {
            debug!(%date, %category, item_id, "nothing to delete");
            return Ok(false);
        }
        self.commit(next)?;
        info!(%date, %category, item_id, "item deleted");
        Ok(true)
    }

    /// Recognize a label photo and log the result.
    ///
    /// The logs are only touched after recognition succeeds; any failure
    /// leaves them exactly as they were.
    pub async fn scan_label<R>(
        &mut self,
        recognizer: &R,
        date: NaiveDate,
        category: MealCategory,
        image: &[u8],
        media_type: &str,
    ) -> Result<&MealItem>
    where
        R: LabelRecognizer + ?Sized,
    {
        let item = recognizer
            .recognize(image, media_type)
            .await
            .map_err(|e: RecognitionError| {
                warn!(error = %e, "label scan failed");
                anyhow::Error::new(e)
            })?;
        self.add_item(date, category, item)
    }

    pub fn dashboard(&self, date: NaiveDate) -> Result<DaySummary> {
        let profile = self
            .profile
            .as_ref()
            .ok_or_else(|| anyhow!("No profile saved yet; create one first"))?;

        let consumed = self.logs.totals_for_day(date);
        let meals = MealCategory::ALL
            .into_iter()
            .map(|category| MealSummary {
                category,
                items: self.logs.items(date, category).to_vec(),
                totals: self.logs.totals_for_category(date, category),
            })
            .collect();

        Ok(DaySummary {
            date,
            target_calories: profile.target_calories,
            consumed,
            remaining_calories: profile.target_calories - consumed.calories.round() as i64,
            meals,
        })
    }

    pub fn stats(&self, period: Period, reference: NaiveDate) -> Vec<DailyTotals> {
        aggregate(&self.logs, period, reference)
    }

    /// Persist first; only swap in the new logs once the write succeeded.
    fn commit(&mut self, next: MealLogs) -> Result<()> {
        save(&self.store, LOGS_KEY, &next)?;
        self.logs = next;
        Ok(())
    }
}

pub fn validate_profile(input: &ProfileInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(anyhow!("Name must not be empty"));
    }
    for (field, value) in [
        ("age", input.age),
        ("height", input.height),
        ("weight", input.weight),
    ] {
        if value == 0 {
            return Err(anyhow!("{} must be a positive whole number", field));
        }
    }
    Ok(())
}
