//! Meal and workout plan generation.

use crate::domain::{CallSite, DomainError, GenerationJob, GenerationRequest, Intent, Purpose};
use crate::ports::GenerationPort;
use crate::usecases::generator::{non_blank, Generated, Generator};
use std::sync::Arc;
use tracing::info;

const NUTRITIONIST_DIRECTIVE: &str = "You are a professional nutritionist who writes personalized, healthy meal plans.

Guidelines:
- Cover breakfast, lunch, dinner and two snacks
- Name specific foods with approximate portions
- Balance protein, carbohydrates and healthy fats
- Keep suggestions practical and easy to find
- Remind the user to stay hydrated
- Use emojis to keep it engaging
- Be concise but informative";

const TRAINER_DIRECTIVE: &str = "You are a certified personal trainer who writes personalized workout plans.

Guidelines:
- Include a warm-up, the main workout and a cool-down
- Give specific exercises with sets, reps or duration
- Account for beginner, intermediate and advanced levels
- Add safety tips and modifications
- Make it workable at home or in a gym
- Use emojis to keep it engaging
- Be concise but comprehensive";

const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 600;

/// Replaces a missing completion.
pub const EMPTY_PLAN_REPLY: &str = "Sorry, I couldn't generate a plan right now. Please try again.";

pub struct Planner {
    ai: Arc<dyn GenerationPort>,
}

impl Planner {
    pub fn new(ai: Arc<dyn GenerationPort>) -> Self {
        Self { ai }
    }

    /// Generate a plan. Any intent other than `PlanMeal` is treated as a workout request.
    pub async fn plan(&self, intent: Intent, message: &str) -> Result<String, DomainError> {
        let (directive, user_content) = match intent {
            Intent::PlanMeal => (
                NUTRITIONIST_DIRECTIVE,
                format!(
                    "Create a healthy meal plan for this request: \"{}\". Make it practical, nutritious and tailored to their needs.",
                    message
                ),
            ),
            _ => (
                TRAINER_DIRECTIVE,
                format!(
                    "Create a workout plan for this request: \"{}\". Match the fitness level and goals mentioned in the message.",
                    message
                ),
            ),
        };

        let request = GenerationRequest {
            purpose: Purpose::Plan,
            system_directive: directive.to_string(),
            user_content,
            temperature: TEMPERATURE,
            max_output_tokens: Some(MAX_OUTPUT_TOKENS),
            json_mode: false,
        };
        let plan = non_blank(self.ai.complete(&request).await?)
            .unwrap_or_else(|| EMPTY_PLAN_REPLY.to_string());

        info!(intent = %intent, plan_len = plan.len(), "plan generated");
        Ok(plan)
    }
}

#[async_trait::async_trait]
impl Generator for Planner {
    fn call_site(&self, job: &GenerationJob) -> CallSite {
        match job.intent {
            Intent::PlanMeal => CallSite::MealPlan,
            _ => CallSite::WorkoutPlan,
        }
    }

    async fn generate(&self, job: &GenerationJob) -> Result<Generated, DomainError> {
        self.plan(job.intent, &job.message).await.map(Generated::text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PipelineStage;
    use crate::usecases::degradation::DegradationPolicy;
    use crate::usecases::generator::run_generator;
    use crate::usecases::test_support::{quota_error, ScriptedAi};

    fn job(intent: Intent) -> GenerationJob {
        GenerationJob {
            user_id: "U1".into(),
            reply_token: "tok".into(),
            intent,
            message: "something high protein".into(),
        }
    }

    #[tokio::test]
    async fn test_meal_uses_nutritionist() {
        let ai = Arc::new(ScriptedAi::text("🍳 Breakfast: eggs"));
        let planner = Planner::new(ai.clone());
        let plan = planner.plan(Intent::PlanMeal, "high protein").await.unwrap();
        assert_eq!(plan, "🍳 Breakfast: eggs");

        let req = &ai.requests()[0];
        assert_eq!(req.system_directive, NUTRITIONIST_DIRECTIVE);
        assert!(req.user_content.contains("\"high protein\""));
        assert_eq!(req.temperature, 0.7);
        assert_eq!(req.max_output_tokens, Some(600));
    }

    #[tokio::test]
    async fn test_workout_uses_trainer() {
        let ai = Arc::new(ScriptedAi::text("plan"));
        let planner = Planner::new(ai.clone());
        planner.plan(Intent::PlanWorkout, "beginner").await.unwrap();
        assert_eq!(ai.requests()[0].system_directive, TRAINER_DIRECTIVE);
    }

    #[tokio::test]
    async fn test_missing_completion_gets_apology() {
        let ai = Arc::new(ScriptedAi::new(vec![Ok(None)]));
        let planner = Planner::new(ai);
        assert_eq!(
            planner.plan(Intent::PlanMeal, "x").await.unwrap(),
            EMPTY_PLAN_REPLY
        );
    }

    #[tokio::test]
    async fn test_quota_fallback_differs_by_intent() {
        let policy = DegradationPolicy::default();

        let meal = Planner::new(Arc::new(ScriptedAi::failing(quota_error())));
        let meal_outcome = run_generator(&meal, &policy, &job(Intent::PlanMeal)).await;

        let workout = Planner::new(Arc::new(ScriptedAi::failing(quota_error())));
        let workout_outcome = run_generator(&workout, &policy, &job(Intent::PlanWorkout)).await;

        assert_eq!(meal_outcome.stage, PipelineStage::Degraded);
        assert_eq!(workout_outcome.stage, PipelineStage::Degraded);
        assert_eq!(
            meal_outcome.reply.message,
            policy.resolve(CallSite::MealPlan, &quota_error(), "")
        );
        assert_eq!(
            workout_outcome.reply.message,
            policy.resolve(CallSite::WorkoutPlan, &quota_error(), "")
        );
        assert_ne!(meal_outcome.reply.message, workout_outcome.reply.message);
    }

    #[tokio::test]
    async fn test_other_failure_asks_for_specifics() {
        let planner = Planner::new(Arc::new(ScriptedAi::failing(DomainError::Generation {
            status: Some(500),
            code: None,
            message: "server error".into(),
        })));
        let outcome =
            run_generator(&planner, &DegradationPolicy::default(), &job(Intent::PlanWorkout)).await;
        assert!(outcome.reply.message.contains("specific type of workout"));
    }
}
