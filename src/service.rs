//! Service façade
//!
//! One object wiring the bank, the remote generator and the insight source
//! together. Initialize once at startup; the HTTP server and the CLI both go
//! through it.
//!
//! ```rust,ignore
//! let tutor = Tutor::from_config(&AppConfig::from_env());
//! let quiz = tutor.generate_quiz(&QuizConfig::new("Physics", "Mechanics", Difficulty::Beginner, 5));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::adaptive::{generate_adaptive_quiz, AdaptiveInfo, AdaptiveQuiz, AdaptiveQuizRequest};
use crate::assessment::{grade_diagnostic, personalized_feedback, DiagnosticResult, Feedback};
use crate::config::AppConfig;
use crate::error::RemoteError;
use crate::insights::{InsightSource, NoInsights, StudentInsights};
use crate::quiz::{fallback_questions, QuizAssembler};
use crate::remote::{GenerationRequest, TextGenerationClient, VectorInsightClient, DEFAULT_RESPONSE_FEEDBACK};
use crate::templates::TemplateBank;
use crate::types::{
    DiagnosticConfig, Difficulty, FallbackReason, Generation, Origin, Question, QuizConfig,
};

/// Remote adaptive quiz plus what the adaptation decided
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteQuiz {
    pub generation: Generation,
    pub adaptive_info: AdaptiveInfo,
}

/// Rule-based feedback plus free-text analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub feedback: Feedback,
    pub analysis: String,
}

pub struct Tutor {
    assembler: QuizAssembler<'static>,
    generator: Option<TextGenerationClient>,
    insights: Arc<dyn InsightSource>,
    store: Option<Arc<VectorInsightClient>>,
}

impl Default for Tutor {
    /// Built-in bank only; no remote services
    fn default() -> Self {
        Self::new(TemplateBank::builtin())
    }
}

impl Tutor {
    pub fn new(bank: &'static TemplateBank) -> Self {
        Self {
            assembler: QuizAssembler::new(bank),
            generator: None,
            insights: Arc::new(NoInsights),
            store: None,
        }
    }

    /// Wire remote clients from configuration; unconfigured services stay off
    pub fn from_config(config: &AppConfig) -> Self {
        let mut tutor = Self::default();
        if config.generation.is_configured() {
            match TextGenerationClient::new(config.generation.clone()) {
                Ok(generator) => tutor = tutor.with_generator(generator),
                Err(e) => warn!(error = %e, "remote generation disabled"),
            }
        }
        if config.vector.is_configured() {
            match VectorInsightClient::new(config.vector.clone()) {
                Ok(vectors) => {
                    let vectors = Arc::new(vectors);
                    tutor = tutor.with_insights(vectors.clone()).with_store(vectors);
                }
                Err(e) => warn!(error = %e, "insight store disabled"),
            }
        }
        info!(
            remote_generation = tutor.generator.is_some(),
            insight_store = tutor.store.is_some(),
            "tutor initialized"
        );
        tutor
    }

    pub fn with_generator(mut self, generator: TextGenerationClient) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_insights(mut self, insights: Arc<dyn InsightSource>) -> Self {
        self.insights = insights;
        self
    }

    pub fn with_store(mut self, store: Arc<VectorInsightClient>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn generate_quiz(&self, config: &QuizConfig) -> Generation {
        self.assembler.generate(config, &mut rand::thread_rng())
    }

    pub fn generate_diagnostic(&self, config: &DiagnosticConfig) -> Vec<Question> {
        self.assembler.diagnostic(config, &mut rand::thread_rng())
    }

    pub async fn insights_for(&self, student_id: Option<&str>) -> Option<StudentInsights> {
        match student_id {
            Some(id) if !id.trim().is_empty() => self.insights.student_insights(id).await,
            _ => None,
        }
    }

    /// Local adaptive quiz at the level prior performance suggests
    pub async fn custom_quiz(&self, request: &AdaptiveQuizRequest) -> AdaptiveQuiz {
        let insights = self.insights_for(request.student_id.as_deref()).await;
        generate_adaptive_quiz(
            &self.assembler,
            request,
            insights.as_ref(),
            &mut rand::thread_rng(),
        )
    }

    /// Remote adaptive quiz; any remote failure yields tagged fallback questions
    pub async fn adaptive_quiz(&self, request: &AdaptiveQuizRequest) -> RemoteQuiz {
        let insights = self.insights_for(request.student_id.as_deref()).await;
        let difficulty = insights
            .as_ref()
            .map_or(request.difficulty, |i| i.difficulty_level);
        let student_level = insights
            .as_ref()
            .map_or(Difficulty::Intermediate, |i| i.difficulty_level);
        let adaptive_info = AdaptiveInfo::new(difficulty, insights.as_ref());

        let generation_request = GenerationRequest {
            topic: request.topic.clone(),
            difficulty,
            question_count: request.question_count,
            student_level,
            previous_performance: insights
                .as_ref()
                .map(|i| i.topic_scores.values().copied().collect())
                .unwrap_or_default(),
            course_context: request.course_context.clone(),
        };

        let result = match &self.generator {
            Some(generator) => generator.generate_quiz(&generation_request).await,
            None => Err(RemoteError::MissingCredentials("watsonx")),
        };

        let generation = match result {
            Ok(mut questions) => {
                let missing = request.question_count.saturating_sub(questions.len());
                if missing > 0 {
                    questions.extend(fallback_questions(&request.topic, difficulty, missing));
                }
                Generation::Generated {
                    origin: Origin::Remote,
                    questions,
                }
            }
            Err(e) => {
                warn!(error = %e, topic = %request.topic, "remote generation failed, using fallback");
                Generation::Fallback {
                    reason: FallbackReason::Remote(e.to_string()),
                    questions: fallback_questions(&request.topic, difficulty, request.question_count),
                }
            }
        };

        RemoteQuiz {
            generation,
            adaptive_info,
        }
    }

    /// Grade and, when an insight store is wired, record the result
    pub async fn grade_diagnostic(
        &self,
        student_id: &str,
        questions: &[Question],
        answers: &HashMap<String, usize>,
    ) -> DiagnosticResult {
        let result = grade_diagnostic(student_id, questions, answers);
        if let Some(store) = &self.store {
            store.store_performance(result.performance_records()).await;
        }
        result
    }

    pub async fn feedback(&self, question: &Question, answer: usize) -> AnswerFeedback {
        let feedback = personalized_feedback(question, answer);
        let analysis = match &self.generator {
            Some(generator) => {
                let chosen = question.options.get(answer).map_or("", |s| s.as_str());
                generator
                    .analyze_student_response(
                        &question.text,
                        chosen,
                        question.correct_option().unwrap_or_default(),
                    )
                    .await
            }
            None => DEFAULT_RESPONSE_FEEDBACK.to_string(),
        };
        AnswerFeedback { feedback, analysis }
    }
}
