use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::health_plans::HealthPlanEntity;
use crate::domain::value_objects::enums::plan_types::HealthPlanType;

/// Parsed form of the JSON a plan generation call returns. Known fields are
/// typed; unknown keys are retained through the flattened map so a stored
/// plan stays structurally equivalent to what the model produced. A response
/// that is not a JSON object falls back to `RawText`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HealthPlanContent {
    Fitness(FitnessPlan),
    Nutrition(NutritionPlan),
    MentalHealth(MentalHealthPlan),
    Preventive(PreventivePlan),
    RawText { content: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FitnessPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_weeks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_workouts: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NutritionPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_calories: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meals: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hydration: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MentalHealthPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_practices: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PreventivePlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenings: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub habits: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl HealthPlanContent {
    /// Boundary parser: a JSON object becomes the plan variant for the
    /// requested type, anything else is wrapped as raw text.
    pub fn parse(plan_type: HealthPlanType, raw: &str) -> Self {
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(value) if value.is_object() => value,
            _ => {
                return HealthPlanContent::RawText {
                    content: raw.trim().to_string(),
                };
            }
        };

        let parsed = match plan_type {
            HealthPlanType::Fitness => {
                serde_json::from_value(value).map(HealthPlanContent::Fitness)
            }
            HealthPlanType::Nutrition => {
                serde_json::from_value(value).map(HealthPlanContent::Nutrition)
            }
            HealthPlanType::MentalHealth => {
                serde_json::from_value(value).map(HealthPlanContent::MentalHealth)
            }
            HealthPlanType::Preventive => {
                serde_json::from_value(value).map(HealthPlanContent::Preventive)
            }
        };

        parsed.unwrap_or_else(|_| HealthPlanContent::RawText {
            content: raw.trim().to_string(),
        })
    }

    pub fn is_structured(&self) -> bool {
        !matches!(self, HealthPlanContent::RawText { .. })
    }

    /// JSON stored in the `content` column: the plan object itself for
    /// structured plans, `{"content": "<raw>"}` for the fallback.
    pub fn to_stored_json(&self) -> Result<Value> {
        let value = match self {
            HealthPlanContent::Fitness(plan) => serde_json::to_value(plan)?,
            HealthPlanContent::Nutrition(plan) => serde_json::to_value(plan)?,
            HealthPlanContent::MentalHealth(plan) => serde_json::to_value(plan)?,
            HealthPlanContent::Preventive(plan) => serde_json::to_value(plan)?,
            HealthPlanContent::RawText { content } => {
                serde_json::json!({ "content": content })
            }
        };
        Ok(value)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateHealthPlanRequest {
    pub plan_type: HealthPlanType,
    /// Owner the plan is stored under; must match the authenticated caller
    /// when present.
    pub user_id: Option<Uuid>,
    pub age: Option<u32>,
    pub goals: Option<String>,
    pub conditions: Option<Vec<String>>,
    pub dietary_preferences: Option<String>,
    pub activity_level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthPlanDto {
    pub id: Uuid,
    pub plan_type: String,
    pub content: Value,
    pub generated: bool,
    pub created_at: DateTime<Utc>,
}

impl From<HealthPlanEntity> for HealthPlanDto {
    fn from(value: HealthPlanEntity) -> Self {
        Self {
            id: value.id,
            plan_type: value.plan_type,
            content: value.content,
            generated: value.generated,
            created_at: value.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_json_round_trips_through_storage() {
        let raw = r#"{"summary":"Bulk up","duration_weeks":8,"weekly_workouts":[{"day":"Mon","focus":"legs"}],"coach_notes":"go slow"}"#;
        let parsed = HealthPlanContent::parse(HealthPlanType::Fitness, raw);

        assert!(parsed.is_structured());
        let stored = parsed.to_stored_json().unwrap();
        let original: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(stored, original);
    }

    #[test]
    fn non_json_response_wraps_into_raw_text() {
        let raw = "Here is your plan:\n1. Eat well\n2. Sleep";
        let parsed = HealthPlanContent::parse(HealthPlanType::Nutrition, raw);

        assert!(!parsed.is_structured());
        let stored = parsed.to_stored_json().unwrap();
        assert_eq!(stored["content"], Value::String(raw.to_string()));
    }

    #[test]
    fn json_array_is_not_a_plan_object() {
        let parsed = HealthPlanContent::parse(HealthPlanType::Preventive, "[1,2,3]");
        assert!(!parsed.is_structured());
    }
}
