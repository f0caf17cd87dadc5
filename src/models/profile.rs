// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile and plan models for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Profile stored in the `profiles` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    /// Principal name (also used as document ID)
    pub name: String,
    /// Secondary lookup key
    #[serde(default)]
    pub phone: Option<String>,
    pub age: u32,
    pub gender: String,
    pub goal: String,
    pub bmi: f64,
    pub diet_type: String,
    /// Plan length, e.g. "7 days"; also sent upstream as the plan-type hint
    pub duration_label: String,
    /// Reply from the most recent successful relay
    #[serde(default)]
    pub plan_text: Option<String>,
    /// Reason the most recent relay failed, cleared on the next success
    #[serde(default)]
    pub last_error: Option<String>,
    /// Last write (RFC3339)
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Entry in the `plans` collection, one per persisted relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    /// Trainer principal the plan was generated on behalf of
    pub created_by: String,
    /// Principal the plan is for
    pub created_for: String,
    pub plan_body: String,
    pub plan_type: String,
    /// When the plan was stored (RFC3339)
    pub created_at: String,
}

/// One row of a bulk upload, before validation.
///
/// Every column is optional so that a bad row can still be reported by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRow {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub goal: Option<String>,
    pub bmi: Option<String>,
    pub diet_type: Option<String>,
    pub duration_label: Option<String>,
}

impl BatchRow {
    /// Validate the row into a profile without a plan.
    pub fn into_profile(self) -> Result<Profile, String> {
        let name = required(self.name, "name")?;
        let age_raw = required(self.age, "age")?;
        let age = age_raw
            .parse::<u32>()
            .map_err(|_| format!("invalid age {:?}", age_raw))?;
        let bmi_raw = required(self.bmi, "bmi")?;
        let bmi = bmi_raw
            .parse::<f64>()
            .map_err(|_| format!("invalid bmi {:?}", bmi_raw))?;

        Ok(Profile {
            name,
            phone: self.phone.filter(|p| !p.trim().is_empty()),
            age,
            gender: required(self.gender, "gender")?,
            goal: required(self.goal, "goal")?,
            bmi,
            diet_type: required(self.diet_type, "diet_type")?,
            duration_label: required(self.duration_label, "duration")?,
            plan_text: None,
            last_error: None,
            updated_at: None,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("missing {}", field))
}
