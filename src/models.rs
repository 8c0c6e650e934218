use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

/// A nutrient vector. Calories in kcal, everything else in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub sugar: f64,
}

/// Dietary classification of a logged food.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodType {
    Veggie,
    Vegan,
    Meat,
    #[default]
    Unknown,
}

impl FoodType {
    pub const ALL: [FoodType; 4] = [Self::Veggie, Self::Vegan, Self::Meat, Self::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Veggie => "Veggie",
            Self::Vegan => "Vegan",
            Self::Meat => "Meat",
            Self::Unknown => "Unknown",
        }
    }

    /// Lenient parse used for recognizer output: anything outside the closed
    /// set maps to `Unknown`.
    pub fn from_label(s: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for FoodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FoodType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("unknown food type: {}", s))
    }
}

/// Meal grouping key. Variant order is the display/enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
    Drinks,
}

impl MealCategory {
    pub const ALL: [MealCategory; 5] = [
        Self::Breakfast,
        Self::Lunch,
        Self::Dinner,
        Self::Snacks,
        Self::Drinks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Snacks => "Snacks",
            Self::Drinks => "Drinks",
        }
    }
}

impl fmt::Display for MealCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("unknown meal category: {}", s))
    }
}

/// A logged food item. Immutable once created; only deletion is supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    /// Time-derived ID, unique within its date/category bucket
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub food_type: FoodType,
    #[serde(flatten)]
    pub nutrients: Nutrients,
}

/// Item data before an ID has been assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMealItem {
    pub name: String,
    #[serde(rename = "type")]
    pub food_type: FoodType,
    #[serde(flatten)]
    pub nutrients: Nutrients,
}

impl NewMealItem {
    pub fn with_id(self, id: String) -> MealItem {
        MealItem {
            id,
            name: self.name,
            food_type: self.food_type,
            nutrients: self.nutrients,
        }
    }
}

/// Activity multiplier applied to BMR. Persisted as the raw multiplier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// 1-3 days/week
    #[default]
    LightlyActive,
    /// 3-5 days/week
    ModeratelyActive,
    /// 6-7 days/week
    VeryActive,
    /// Hard daily exercise or a physical job
    ExtraActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        Self::Sedentary,
        Self::LightlyActive,
        Self::ModeratelyActive,
        Self::VeryActive,
        Self::ExtraActive,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::LightlyActive => 1.375,
            Self::ModeratelyActive => 1.55,
            Self::VeryActive => 1.725,
            Self::ExtraActive => 1.9,
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::LightlyActive => "lightly-active",
            Self::ModeratelyActive => "moderately-active",
            Self::VeryActive => "very-active",
            Self::ExtraActive => "extra-active",
        }
    }
}

impl From<ActivityLevel> for f64 {
    fn from(level: ActivityLevel) -> f64 {
        level.multiplier()
    }
}

impl TryFrom<f64> for ActivityLevel {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        ActivityLevel::ALL
            .into_iter()
            .find(|l| (l.multiplier() - value).abs() < 1e-9)
            .ok_or_else(|| format!("invalid activity multiplier: {}", value))
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ActivityLevel {
    type Err = Error;

    /// Accepts either the slug (`moderately-active`) or the multiplier (`1.55`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(value) = s.parse::<f64>() {
            return ActivityLevel::try_from(value).map_err(|e| anyhow!(e));
        }
        let normalized = s.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|l| l.slug() == normalized)
            .ok_or_else(|| anyhow!("unknown activity level: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightGoal {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl fmt::Display for WeightGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lose => "lose",
            Self::Maintain => "maintain",
            Self::Gain => "gain",
        })
    }
}

impl FromStr for WeightGoal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lose" => Ok(Self::Lose),
            "maintain" => Ok(Self::Maintain),
            "gain" => Ok(Self::Gain),
            _ => Err(anyhow!("unknown weight goal: {}", s)),
        }
    }
}

/// The single local user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    /// Height in cm
    pub height: u32,
    /// Weight in kg
    pub weight: u32,
    pub activity_level: ActivityLevel,
    pub weight_goal: WeightGoal,
    /// Snapshot taken at save time; not recomputed when other fields change.
    pub target_calories: i64,
}

/// Profile fields as entered, before validation and target computation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileInput {
    pub name: String,
    pub age: u32,
    pub height: u32,
    pub weight: u32,
    pub activity_level: ActivityLevel,
    pub weight_goal: WeightGoal,
}

impl From<&UserProfile> for ProfileInput {
    fn from(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            age: profile.age,
            height: profile.height,
            weight: profile.weight,
            activity_level: profile.activity_level,
            weight_goal: profile.weight_goal,
        }
    }
}
