//! Core types for edututor
//!
//! Everything here is transient: produced by one generation call, handed to
//! the caller, never mutated by the core afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ConfigError;

/// Question type used when the caller does not ask for one
pub const DEFAULT_QUESTION_TYPE: &str = "Multiple Choice";

/// Every generated question has exactly this many options
pub const OPTION_COUNT: usize = 4;

/// Bounds enforced on `QuizConfig::question_count` at the boundary
pub const MIN_QUESTION_COUNT: usize = 1;
pub const MAX_QUESTION_COUNT: usize = 20;

/// Coarse, ordered difficulty level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// All levels in ascending order
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "easy" => Ok(Difficulty::Beginner),
            "intermediate" | "medium" => Ok(Difficulty::Intermediate),
            "advanced" | "hard" => Ok(Difficulty::Advanced),
            other => Err(ConfigError::UnknownDifficulty(other.to_string())),
        }
    }
}

/// A single multiple-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    /// Ordered candidates; the index is the answer key
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    pub explanation: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_type: String,

    // Optional teaching metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub improvement_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encouragement: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_topics: Vec<String>,
}

impl Question {
    /// Option text at the answer key
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_answer_index).map(|s| s.as_str())
    }

    /// True when the answer key points inside `options`
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == OPTION_COUNT && self.correct_answer_index < self.options.len()
    }
}

/// Build a generation-time question id, e.g. `q_3f2a...`
pub fn question_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Input to the quiz assembler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizConfig {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_count: usize,
    /// Accepted but only "Multiple Choice" is generated
    #[serde(default)]
    pub question_types: Vec<String>,
}

impl QuizConfig {
    pub fn new(subject: &str, topic: &str, difficulty: Difficulty, question_count: usize) -> Self {
        Self {
            subject: subject.to_string(),
            topic: topic.to_string(),
            difficulty,
            question_count,
            question_types: vec![DEFAULT_QUESTION_TYPE.to_string()],
        }
    }

    /// Label stamped on every generated question
    pub fn question_type(&self) -> &str {
        self.question_types
            .first()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_QUESTION_TYPE)
    }

    /// Boundary check; the assembler itself never rejects a config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subject.trim().is_empty() {
            return Err(ConfigError::MissingField("subject"));
        }
        if self.topic.trim().is_empty() {
            return Err(ConfigError::MissingField("topic"));
        }
        validate_count(self.question_count)
    }
}

pub(crate) fn validate_count(count: usize) -> Result<(), ConfigError> {
    if !(MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&count) {
        return Err(ConfigError::QuestionCount {
            got: count,
            min: MIN_QUESTION_COUNT,
            max: MAX_QUESTION_COUNT,
        });
    }
    Ok(())
}

/// Input to the diagnostic assembler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticConfig {
    #[serde(default)]
    pub subject: String,
    /// Opaque label passed through to the response metadata
    #[serde(default)]
    pub grade_level: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl DiagnosticConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subject.trim().is_empty() {
            return Err(ConfigError::MissingField("subject"));
        }
        if self.grade_level.trim().is_empty() {
            return Err(ConfigError::MissingField("gradeLevel"));
        }
        if self.topics.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::EmptyTopics);
        }
        Ok(())
    }
}

/// Where generated (non-fallback) questions came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Hand-authored templates from the bank
    Bank,
    /// Parametric questions from the numeric synthesizer
    Synthesizer,
    /// The remote text-generation service
    Remote,
}

/// Why a request degraded to placeholder questions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum FallbackReason {
    UnknownSubject,
    UnknownTopic,
    EmptyDifficulty,
    /// No bank entry and no synthesizer family for a subject-less request
    NoContent,
    /// The remote generator failed; the detail is the error text
    Remote(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::UnknownSubject => f.write_str("unknown subject"),
            FallbackReason::UnknownTopic => f.write_str("unknown topic"),
            FallbackReason::EmptyDifficulty => f.write_str("no templates at this difficulty"),
            FallbackReason::NoContent => f.write_str("no content for topic"),
            FallbackReason::Remote(e) => write!(f, "remote generation failed: {}", e),
        }
    }
}

/// Outcome of a generation call.
///
/// Callers that only want questions use [`Generation::into_questions`];
/// tests and metadata use the tag to tell real content from degradation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Generation {
    Generated {
        origin: Origin,
        questions: Vec<Question>,
    },
    Fallback {
        reason: FallbackReason,
        questions: Vec<Question>,
    },
}

impl Generation {
    pub fn questions(&self) -> &[Question] {
        match self {
            Generation::Generated { questions, .. } | Generation::Fallback { questions, .. } => {
                questions
            }
        }
    }

    pub fn into_questions(self) -> Vec<Question> {
        match self {
            Generation::Generated { questions, .. } | Generation::Fallback { questions, .. } => {
                questions
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Generation::Fallback { .. })
    }

    pub fn origin(&self) -> Option<Origin> {
        match self {
            Generation::Generated { origin, .. } => Some(*origin),
            Generation::Fallback { .. } => None,
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Generation::Fallback { reason, .. } => Some(reason),
            Generation::Generated { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_ordering() {
        assert!(Difficulty::Beginner < Difficulty::Intermediate);
        assert!(Difficulty::Intermediate < Difficulty::Advanced);
        assert_eq!(Difficulty::ALL[0], Difficulty::Beginner);
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("Beginner".parse::<Difficulty>().unwrap(), Difficulty::Beginner);
        assert_eq!("medium".parse::<Difficulty>().unwrap(), Difficulty::Intermediate);
        assert_eq!(" advanced ".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert!("expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_difficulty_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Difficulty::Intermediate).unwrap(),
            "\"intermediate\""
        );
    }

    #[test]
    fn test_quiz_config_wire_format() {
        let config: QuizConfig = serde_json::from_str(
            r#"{"subject":"Mathematics","topic":"Algebra","difficulty":"beginner","questionCount":3}"#,
        )
        .unwrap();
        assert_eq!(config.question_count, 3);
        assert!(config.question_types.is_empty());
        assert_eq!(config.question_type(), DEFAULT_QUESTION_TYPE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_quiz_config_validation() {
        let mut config = QuizConfig::new("Mathematics", "Algebra", Difficulty::Beginner, 5);
        assert!(config.validate().is_ok());

        config.question_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::QuestionCount { got: 0, .. })));

        config.question_count = 21;
        assert!(config.validate().is_err());

        config.question_count = 5;
        config.subject = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingField("subject"))));
    }

    #[test]
    fn test_diagnostic_config_validation() {
        let config = DiagnosticConfig {
            subject: "Mathematics".to_string(),
            grade_level: "Grade 9".to_string(),
            topics: vec![],
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyTopics)));
    }

    #[test]
    fn test_question_id_prefix() {
        let a = question_id("q");
        let b = question_id("q");
        assert!(a.starts_with("q_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_generation_tag_serialization() {
        let generation = Generation::Fallback {
            reason: FallbackReason::UnknownSubject,
            questions: vec![],
        };
        let json = serde_json::to_value(&generation).unwrap();
        assert_eq!(json["status"], "fallback");
        assert_eq!(json["reason"]["kind"], "unknownSubject");
    }
}
