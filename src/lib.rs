//! edututor - quiz and diagnostic generation
//!
//! Builds multiple-choice quizzes from a hand-authored question bank,
//! synthesizes numeric word problems, adapts difficulty to prior performance
//! and degrades to placeholder questions instead of failing.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use edututor::{generate_quiz, generate_diagnostic_test, Difficulty, QuizConfig};
//!
//! // Five beginner algebra questions
//! let quiz = generate_quiz(&QuizConfig::new("Mathematics", "Algebra", Difficulty::Beginner, 5));
//!
//! // Diagnostic across topics (never more than 15 questions)
//! let test = generate_diagnostic_test("Physics", "Grade 11", &["Mechanics".into()]);
//!
//! // Reproducible synthesis
//! let mut rng = StdRng::seed_from_u64(7);
//! let generation = QuizAssembler::default().generate(&config, &mut rng);
//! if let Some(reason) = generation.fallback_reason() { /* bank miss */ }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │ HTTP (axum)  │   │  CLI (clap)  │
//! └──────┬───────┘   └──────┬───────┘
//!        └────────┬─────────┘
//!                 ▼
//! ┌─────────────────────────────────────────────┐
//! │ Tutor (service)                              │
//! │  insights ──► adaptive selector              │
//! │  remote generator ──► fallback on failure    │
//! └────────┬──────────────────────────┬─────────┘
//!          ▼                          ▼
//! ┌────────────────┐        ┌──────────────────┐
//! │ QuizAssembler  │──────► │ TemplateBank     │
//! │                │──────► │ Synthesizer      │
//! └────────────────┘        └──────────────────┘
//! ```

pub mod adaptive;
pub mod assessment;
pub mod config;
pub mod error;
pub mod insights;
pub mod quiz;
pub mod remote;
pub mod server;
pub mod service;
pub mod synth;
pub mod templates;
pub mod types;

// Core types
pub use error::{ConfigError, RemoteError};
pub use types::*;

// Generation
pub use quiz::{fallback_questions, generate_diagnostic_test, generate_quiz, QuizAssembler};
pub use synth::{synthesize, Family};
pub use templates::{Lookup, QuestionTemplate, TemplateBank};

// Adaptation and assessment
pub use adaptive::{adaptive_difficulty, generate_adaptive_quiz, AdaptiveInfo, AdaptiveQuiz, AdaptiveQuizRequest};
pub use assessment::{grade_diagnostic, personalized_feedback, DiagnosticResult, Feedback};
pub use insights::{derive_insights, InsightSource, PerformanceRecord, StudentInsights};

// Wiring
pub use config::AppConfig;
pub use service::Tutor;
