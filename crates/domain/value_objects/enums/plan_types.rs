use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthPlanType {
    Fitness,
    Nutrition,
    MentalHealth,
    Preventive,
}

impl HealthPlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthPlanType::Fitness => "fitness",
            HealthPlanType::Nutrition => "nutrition",
            HealthPlanType::MentalHealth => "mental_health",
            HealthPlanType::Preventive => "preventive",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "fitness" => Some(HealthPlanType::Fitness),
            "nutrition" => Some(HealthPlanType::Nutrition),
            "mental_health" => Some(HealthPlanType::MentalHealth),
            "preventive" => Some(HealthPlanType::Preventive),
            _ => None,
        }
    }
}

impl Display for HealthPlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
