//! Adaptive difficulty and the local adaptive quiz.
//!
//! Only an `intermediate` request moves: prior topic performance pushes it up
//! to `advanced` or down to `beginner`. Explicit beginner/advanced requests
//! are honored as-is.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::insights::StudentInsights;
use crate::quiz::QuizAssembler;
use crate::synth::{self, Family};
use crate::types::{
    question_id, validate_count, Difficulty, Question, QuizConfig, DEFAULT_QUESTION_TYPE,
};

/// Topic score at or above this escalates an intermediate request
pub const ESCALATE_AT: f64 = 85.0;
/// Topic score below this de-escalates an intermediate request
pub const DEESCALATE_BELOW: f64 = 60.0;

const ADVANCED_SUFFIX: &str =
    " This advanced concept builds on fundamental principles and requires deeper analytical thinking.";
const BEGINNER_PREFIX: &str = "Let's break this down step by step: ";
const BEGINNER_SUFFIX: &str = " Remember, practice makes perfect!";

/// Pick the level to generate at, given the student's score on the topic
pub fn adaptive_difficulty(requested: Difficulty, topic_score: Option<f64>) -> Difficulty {
    match (requested, topic_score) {
        (Difficulty::Intermediate, Some(score)) if score >= ESCALATE_AT => Difficulty::Advanced,
        (Difficulty::Intermediate, Some(score)) if score < DEESCALATE_BELOW => Difficulty::Beginner,
        _ => requested,
    }
}

/// Reword an explanation for the level it is delivered at
pub fn adapt_explanation(question: &mut Question, level: Difficulty) {
    match level {
        Difficulty::Advanced => question.explanation.push_str(ADVANCED_SUFFIX),
        Difficulty::Beginner => {
            question.explanation = format!("{BEGINNER_PREFIX}{}{BEGINNER_SUFFIX}", question.explanation);
        }
        Difficulty::Intermediate => {}
    }
}

/// Request for an adaptive quiz
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveQuizRequest {
    #[serde(default)]
    pub student_id: Option<String>,
    /// Optional; enables the bank for topics without a synthesizer family
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_count: usize,
    /// Free text forwarded to the remote generator
    #[serde(default)]
    pub course_context: Option<String>,
}

impl AdaptiveQuizRequest {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::MissingField("topic"));
        }
        validate_count(self.question_count)
    }
}

/// What the adaptation decided, reported alongside the questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveInfo {
    pub recommended_difficulty: Difficulty,
    pub focus_areas: Vec<String>,
    pub student_strengths: Vec<String>,
}

impl AdaptiveInfo {
    pub fn new(effective: Difficulty, insights: Option<&StudentInsights>) -> Self {
        match insights {
            Some(i) => Self {
                recommended_difficulty: i.difficulty_level,
                focus_areas: i.weak_areas.clone(),
                student_strengths: i.strong_areas.clone(),
            },
            None => Self {
                recommended_difficulty: effective,
                focus_areas: Vec::new(),
                student_strengths: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveQuiz {
    pub questions: Vec<Question>,
    pub effective_difficulty: Difficulty,
    pub adaptive_info: AdaptiveInfo,
}

/// Generate locally at the adapted level.
///
/// Source order: synthesizer family for the topic, then the quiz assembler
/// when a subject is given, then generic questions.
pub fn generate_adaptive_quiz<R: Rng + ?Sized>(
    assembler: &QuizAssembler<'_>,
    request: &AdaptiveQuizRequest,
    insights: Option<&StudentInsights>,
    rng: &mut R,
) -> AdaptiveQuiz {
    let score = insights.and_then(|i| i.topic_score(&request.topic));
    let level = adaptive_difficulty(request.difficulty, score);
    let count = request.question_count;

    let mut questions: Vec<Question> = if let Some(family) = Family::for_topic(&request.topic) {
        (0..count)
            .map(|_| {
                let mut q = synth::synthesize(family, level, rng);
                q.topic = request.topic.clone();
                q
            })
            .collect()
    } else if let Some(subject) = request.subject.as_deref().filter(|s| !s.trim().is_empty()) {
        let config = QuizConfig::new(subject, &request.topic, level, count);
        assembler.generate(&config, rng).into_questions()
    } else {
        (0..count).map(|_| generic_question(&request.topic, level)).collect()
    };

    for q in &mut questions {
        adapt_explanation(q, level);
    }

    AdaptiveQuiz {
        questions,
        effective_difficulty: level,
        adaptive_info: AdaptiveInfo::new(level, insights),
    }
}

fn generic_question(topic: &str, difficulty: Difficulty) -> Question {
    Question {
        id: question_id("gen"),
        text: format!("What is a key concept in {topic}?"),
        options: vec![
            format!("Fundamental principle of {topic}"),
            "Alternative concept A".to_string(),
            "Alternative concept B".to_string(),
            "Alternative concept C".to_string(),
        ],
        correct_answer_index: 0,
        explanation: format!("This question tests understanding of {topic} fundamentals"),
        topic: topic.to_string(),
        difficulty,
        question_type: DEFAULT_QUESTION_TYPE.to_string(),
        concept: None,
        improvement_areas: Vec::new(),
        encouragement: None,
        related_topics: Vec::new(),
    }
}
