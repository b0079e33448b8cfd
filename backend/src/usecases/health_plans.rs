use std::sync::Arc;

use crates::{
    ai::llm_client::ChatMessage,
    domain::{
        entities::health_plans::InsertHealthPlanEntity,
        repositories::health_plans::HealthPlanRepository,
        value_objects::{
            enums::plan_types::HealthPlanType,
            health_plans::{GenerateHealthPlanRequest, HealthPlanContent, HealthPlanDto},
        },
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::ai::LlmGateway;

const PLAN_TEMPERATURE: f32 = 0.7;
const PLAN_MAX_TOKENS: u32 = 1500;

#[derive(Debug, Error)]
pub enum HealthPlanError {
    #[error("plan owner does not match the authenticated user")]
    OwnerMismatch,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HealthPlanError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            HealthPlanError::OwnerMismatch => StatusCode::FORBIDDEN,
            HealthPlanError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, HealthPlanError>;

pub struct HealthPlanUseCase<R, L>
where
    R: HealthPlanRepository + Send + Sync + 'static,
    L: LlmGateway + Send + Sync + 'static,
{
    health_plan_repository: Arc<R>,
    llm_gateway: Arc<L>,
}

impl<R, L> HealthPlanUseCase<R, L>
where
    R: HealthPlanRepository + Send + Sync + 'static,
    L: LlmGateway + Send + Sync + 'static,
{
    pub fn new(health_plan_repository: Arc<R>, llm_gateway: Arc<L>) -> Self {
        Self {
            health_plan_repository,
            llm_gateway,
        }
    }

    /// Generates a plan through the LLM gateway and stores it under the
    /// authenticated caller. A structured JSON reply is stored as-is; any
    /// other reply is wrapped as raw text at the parse boundary.
    pub async fn generate_plan(
        &self,
        auth_user_id: Uuid,
        request: GenerateHealthPlanRequest,
    ) -> UseCaseResult<HealthPlanDto> {
        if let Some(requested_owner) = request.user_id {
            if requested_owner != auth_user_id {
                let err = HealthPlanError::OwnerMismatch;
                warn!(
                    %auth_user_id,
                    %requested_owner,
                    status = err.status_code().as_u16(),
                    "health_plans: owner mismatch"
                );
                return Err(err);
            }
        }

        let plan_type = request.plan_type;
        let messages = build_prompt(&request);

        info!(
            %auth_user_id,
            plan_type = %plan_type,
            "health_plans: requesting plan generation"
        );

        let raw = self
            .llm_gateway
            .chat_completion(messages, PLAN_TEMPERATURE, PLAN_MAX_TOKENS)
            .await
            .map_err(|err| {
                error!(
                    %auth_user_id,
                    plan_type = %plan_type,
                    error = ?err,
                    "health_plans: gateway call failed"
                );
                HealthPlanError::Internal(err)
            })?;

        let content = HealthPlanContent::parse(plan_type, &raw);
        if !content.is_structured() {
            warn!(
                %auth_user_id,
                plan_type = %plan_type,
                "health_plans: response was not structured JSON, storing raw text"
            );
        }

        let stored_content = content.to_stored_json().map_err(HealthPlanError::Internal)?;

        let plan_id = self
            .health_plan_repository
            .insert_plan(InsertHealthPlanEntity {
                user_id: auth_user_id,
                plan_type: plan_type.to_string(),
                content: stored_content.clone(),
                generated: true,
            })
            .await
            .map_err(|err| {
                error!(
                    %auth_user_id,
                    plan_type = %plan_type,
                    db_error = ?err,
                    "health_plans: failed to store plan"
                );
                HealthPlanError::Internal(err)
            })?;

        info!(%auth_user_id, %plan_id, "health_plans: plan stored");

        Ok(HealthPlanDto {
            id: plan_id,
            plan_type: plan_type.to_string(),
            content: stored_content,
            generated: true,
            created_at: chrono::Utc::now(),
        })
    }

    pub async fn list_plans(&self, user_id: Uuid) -> UseCaseResult<Vec<HealthPlanDto>> {
        let plans = self
            .health_plan_repository
            .list_for_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "health_plans: failed to list plans");
                HealthPlanError::Internal(err)
            })?;

        Ok(plans.into_iter().map(HealthPlanDto::from).collect())
    }
}

fn build_prompt(request: &GenerateHealthPlanRequest) -> Vec<ChatMessage> {
    let focus = match request.plan_type {
        HealthPlanType::Fitness => "a progressive fitness and exercise plan",
        HealthPlanType::Nutrition => "a practical nutrition and meal plan",
        HealthPlanType::MentalHealth => "a mental wellness and stress-management plan",
        HealthPlanType::Preventive => "a preventive health and screening plan",
    };

    let mut profile = Vec::new();
    if let Some(age) = request.age {
        profile.push(format!("Age: {}", age));
    }
    if let Some(goals) = request.goals.as_deref().filter(|g| !g.trim().is_empty()) {
        profile.push(format!("Goals: {}", goals));
    }
    if let Some(conditions) = request.conditions.as_ref().filter(|c| !c.is_empty()) {
        profile.push(format!("Known conditions: {}", conditions.join(", ")));
    }
    if let Some(diet) = request
        .dietary_preferences
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        profile.push(format!("Dietary preferences: {}", diet));
    }
    if let Some(activity) = request
        .activity_level
        .as_deref()
        .filter(|a| !a.trim().is_empty())
    {
        profile.push(format!("Activity level: {}", activity));
    }

    let profile = if profile.is_empty() {
        "No additional profile details were provided.".to_string()
    } else {
        profile.join("\n")
    };

    vec![
        ChatMessage::system(format!(
            "You are a certified health and wellness coach serving clients in Kenya. \
Produce {focus}. Respond with a single JSON object and no surrounding prose."
        )),
        ChatMessage::user(profile),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::ai::MockLlmGateway;
    use crates::domain::repositories::health_plans::MockHealthPlanRepository;
    use serde_json::Value;

    fn fitness_request(owner: Option<Uuid>) -> GenerateHealthPlanRequest {
        GenerateHealthPlanRequest {
            plan_type: HealthPlanType::Fitness,
            user_id: owner,
            age: Some(29),
            goals: Some("build endurance".to_string()),
            conditions: None,
            dietary_preferences: None,
            activity_level: Some("moderate".to_string()),
        }
    }

    #[tokio::test]
    async fn structured_response_is_stored_as_received() {
        let user_id = Uuid::new_v4();
        let raw = r#"{"summary":"Endurance base","duration_weeks":6,"coach_notes":"keep hydrating"}"#;
        let expected: Value = serde_json::from_str(raw).unwrap();

        let mut gateway = MockLlmGateway::new();
        gateway
            .expect_chat_completion()
            .times(1)
            .returning(move |_, _, _| {
                let raw = raw.to_string();
                Ok(raw)
            });

        let expected_for_repo = expected.clone();
        let mut repo = MockHealthPlanRepository::new();
        repo.expect_insert_plan()
            .withf(move |entity| {
                entity.content == expected_for_repo
                    && entity.plan_type == "fitness"
                    && entity.generated
            })
            .times(1)
            .returning(|_| Ok(Uuid::new_v4()));

        let usecase = HealthPlanUseCase::new(Arc::new(repo), Arc::new(gateway));
        let dto = usecase
            .generate_plan(user_id, fitness_request(Some(user_id)))
            .await
            .unwrap();

        assert_eq!(dto.content, expected);
    }

    #[tokio::test]
    async fn non_json_response_is_wrapped_as_raw_text() {
        let user_id = Uuid::new_v4();
        let raw = "Week 1: walk daily. Week 2: add jogging.";

        let mut gateway = MockLlmGateway::new();
        gateway
            .expect_chat_completion()
            .returning(move |_, _, _| {
                let raw = raw.to_string();
                Ok(raw)
            });

        let mut repo = MockHealthPlanRepository::new();
        repo.expect_insert_plan()
            .withf(move |entity| entity.content["content"] == Value::String(raw.to_string()))
            .times(1)
            .returning(|_| Ok(Uuid::new_v4()));

        let usecase = HealthPlanUseCase::new(Arc::new(repo), Arc::new(gateway));
        let dto = usecase
            .generate_plan(user_id, fitness_request(None))
            .await
            .unwrap();

        assert_eq!(dto.content["content"], Value::String(raw.to_string()));
    }

    #[tokio::test]
    async fn mismatched_owner_is_forbidden_without_gateway_call() {
        let mut gateway = MockLlmGateway::new();
        gateway.expect_chat_completion().never();

        let mut repo = MockHealthPlanRepository::new();
        repo.expect_insert_plan().never();

        let usecase = HealthPlanUseCase::new(Arc::new(repo), Arc::new(gateway));
        let result = usecase
            .generate_plan(Uuid::new_v4(), fitness_request(Some(Uuid::new_v4())))
            .await;

        assert!(matches!(result, Err(HealthPlanError::OwnerMismatch)));
    }
}
