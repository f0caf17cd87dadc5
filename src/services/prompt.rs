// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prompt construction for diet-plan requests.

use crate::error::AppError;
use crate::models::Profile;

/// Build the completion prompt for a profile.
///
/// Deterministic: the same attributes always produce the same text. Every
/// attribute the completion service needs (age, gender, BMI, diet type, goal
/// and duration) appears in the output.
pub fn build_prompt(profile: &Profile) -> Result<String, AppError> {
    if profile.age == 0 {
        return Err(AppError::InvalidInput("age is required".to_string()));
    }
    if !profile.bmi.is_finite() || profile.bmi <= 0.0 {
        return Err(AppError::InvalidInput("bmi is required".to_string()));
    }
    let gender = non_blank(&profile.gender, "gender")?;
    let goal = non_blank(&profile.goal, "goal")?;
    let diet_type = non_blank(&profile.diet_type, "diet_type")?;
    let duration = non_blank(&profile.duration_label, "duration")?;

    Ok(format!(
        "Create a {duration} {diet_type} diet plan for a {age}-year-old {gender} \
         with a BMI of {bmi:.1} whose goal is {goal}. \
         Organize it day by day with breakfast, lunch, dinner and snacks, \
         and give approximate portions for each meal.",
        age = profile.age,
        bmi = profile.bmi,
    ))
}

fn non_blank<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    Ok(value)
}
