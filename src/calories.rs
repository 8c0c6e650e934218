use crate::models::{ActivityLevel, ProfileInput, WeightGoal};

/// Daily deficit/surplus applied for the lose and gain goals (kcal).
pub const GOAL_ADJUSTMENT_KCAL: f64 = 500.0;

/// Basal metabolic rate in kcal/day (Mifflin-St Jeor, male offset +5 for
/// every profile). Inputs are not validated.
pub fn bmr(weight_kg: f64, height_cm: f64, age: f64) -> f64 {
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age + 5.0
}

/// Total daily energy expenditure in kcal/day.
pub fn tdee(weight_kg: f64, height_cm: f64, age: f64, activity: ActivityLevel) -> f64 {
    bmr(weight_kg, height_cm, age) * activity.multiplier()
}

pub fn target_calories(
    weight_kg: f64,
    height_cm: f64,
    age: f64,
    activity: ActivityLevel,
    goal: WeightGoal,
) -> i64 {
    let tdee = tdee(weight_kg, height_cm, age, activity);
    let target = match goal {
        WeightGoal::Lose => tdee - GOAL_ADJUSTMENT_KCAL,
        WeightGoal::Gain => tdee + GOAL_ADJUSTMENT_KCAL,
        WeightGoal::Maintain => tdee,
    };
    target.round() as i64
}

/// Target for a (validated) profile input.
pub fn target_for_profile(input: &ProfileInput) -> i64 {
    target_calories(
        f64::from(input.weight),
        f64::from(input.height),
        f64::from(input.age),
        input.activity_level,
        input.weight_goal,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile() {
        // 700 + 1093.75 - 150 + 5
        let bmr = bmr(70.0, 175.0, 30.0);
        assert!((bmr - 1648.75).abs() < 1e-9);

        let tdee = tdee(70.0, 175.0, 30.0, ActivityLevel::ModeratelyActive);
        assert!((tdee - 2555.5625).abs() < 1e-9);

        let target = |goal| target_calories(70.0, 175.0, 30.0, ActivityLevel::ModeratelyActive, goal);
        assert_eq!(target(WeightGoal::Maintain), 2556);
        assert_eq!(target(WeightGoal::Lose), 2056);
        assert_eq!(target(WeightGoal::Gain), 3056);
    }

    #[test]
    fn activity_scales_the_target() {
        let sedentary = target_calories(80.0, 180.0, 40.0, ActivityLevel::Sedentary, WeightGoal::Maintain);
        let extra = target_calories(80.0, 180.0, 40.0, ActivityLevel::ExtraActive, WeightGoal::Maintain);
        // BMR = 800 + 1125 - 200 + 5 = 1730
        assert_eq!(sedentary, 2076);
        assert_eq!(extra, 3287);
    }

    #[test]
    fn pathological_inputs_are_not_clamped() {
        let target = target_calories(1.0, 1.0, 120.0, ActivityLevel::Sedentary, WeightGoal::Lose);
        assert!(target < 0);
    }

    #[test]
    fn profile_input_uses_all_fields() {
        let input = ProfileInput {
            name: "Sam".to_string(),
            age: 30,
            height: 175,
            weight: 70,
            activity_level: ActivityLevel::ModeratelyActive,
            weight_goal: WeightGoal::Gain,
        };
        assert_eq!(target_for_profile(&input), 3056);
    }
}
