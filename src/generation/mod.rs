//! Lesson generation: credential resolution, model attempts with rate-limit
//! fallback, response validation and error classification.

pub mod classify;
pub mod credential;
pub mod parse;
pub mod schema;

pub use classify::{classify, classify_api_error, is_rate_limited};
pub use credential::{CredentialChain, CredentialSource, ResolvedCredential};
pub use parse::parse_lesson_items;

use crate::error::{ApiError, GenerationError, GenerationErrorKind};
use crate::provider::{
    CompletionOptions, CompletionRequest, CompletionResponse, ModelProviderClient,
    ProviderConfig, ProviderFactory,
};
use crate::types::LessonPlan;
use std::sync::Arc;
use tracing::{error, info, warn};

/// One model attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub model: String,
}

/// Ordered model attempts.
///
/// A successful attempt ends the run. A rate-limited attempt advances to the
/// next one; any other failure stops immediately. Exhausting the list fails
/// with the last error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptPlan {
    attempts: Vec<Attempt>,
}

impl AttemptPlan {
    pub fn new(models: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            attempts: models
                .into_iter()
                .map(|m| Attempt { model: m.into() })
                .collect(),
        }
    }

    /// Primary model, then one fallback.
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new([config.primary_model.clone(), config.fallback_model.clone()])
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn models(&self) -> Vec<&str> {
        self.attempts.iter().map(|a| a.model.as_str()).collect()
    }
}

/// Produces a validated [`LessonPlan`] for a topic.
pub struct LessonGenerator {
    credentials: CredentialChain,
    factory: Arc<dyn ProviderFactory>,
    plan: AttemptPlan,
    options: CompletionOptions,
}

impl LessonGenerator {
    pub fn new(
        credentials: CredentialChain,
        factory: Arc<dyn ProviderFactory>,
        plan: AttemptPlan,
    ) -> Self {
        Self {
            credentials,
            factory,
            plan,
            options: CompletionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn attempt_plan(&self) -> &AttemptPlan {
        &self.plan
    }

    /// Generate a lesson. The returned plan's `topic` is `topic` verbatim.
    ///
    /// Nothing is persisted here; saving is the caller's job.
    pub async fn generate(&self, topic: &str) -> Result<LessonPlan, GenerationError> {
        if topic.trim().is_empty() {
            return Err(GenerationError::new(
                GenerationErrorKind::Unknown,
                "topic is empty",
            ));
        }

        let credential = self.credentials.resolve()?;
        info!(topic = %topic, source = %credential.source, "Generating lesson");

        let client = self
            .factory
            .create_client(&credential.value)
            .map_err(|e| classify_api_error(&e))?;

        let request = CompletionRequest {
            model: String::new(),
            system_instruction: Some(schema::SYSTEM_INSTRUCTION.to_string()),
            prompt: schema::build_prompt(topic.trim()),
            response_schema: Some(schema::response_schema()),
            options: self.options.clone(),
        };

        let response = self
            .run_attempts(client.as_ref(), request)
            .await
            .map_err(|e| {
                let classified = classify_api_error(&e);
                error!(
                    topic = %topic,
                    kind = %classified.kind,
                    detail = %classified.detail,
                    "Lesson generation failed"
                );
                classified
            })?;

        let items = parse_lesson_items(&response.content).map_err(|detail| {
            error!(topic = %topic, model = %response.model, %detail, "Malformed lesson response");
            GenerationError::new(GenerationErrorKind::MalformedResponse, detail)
        })?;

        let plan = LessonPlan::new(topic, items);
        for issue in plan.quality_issues() {
            warn!(topic = %topic, %issue, "Lesson quality issue");
        }
        info!(
            topic = %topic,
            model = %response.model,
            items = plan.items.len(),
            total_tokens = response.usage.total_tokens,
            "Lesson generated"
        );
        Ok(plan)
    }

    async fn run_attempts(
        &self,
        client: &dyn ModelProviderClient,
        template: CompletionRequest,
    ) -> Result<CompletionResponse, ApiError> {
        let mut last_error = None;

        for (index, attempt) in self.plan.attempts().iter().enumerate() {
            let request = CompletionRequest {
                model: attempt.model.clone(),
                ..template.clone()
            };

            match client.complete(request).await {
                Ok(response) => return Ok(response),
                Err(e) if is_rate_limited(&e) => {
                    warn!(
                        attempt = index + 1,
                        model = %attempt.model,
                        error = %e,
                        "Model rate limited, trying next model"
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| ApiError::ConfigError("No models configured".to_string())))
    }
}
