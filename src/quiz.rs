//! Quiz Assembler
//!
//! Turns a [`QuizConfig`] into exactly `question_count` questions:
//!
//! 1. Numeric topics skip the bank and are synthesized per question.
//! 2. Bank hits cycle through the bucket. The first pass is verbatim; reused
//!    slots become variations (parametric when the concept has a synthesizer
//!    family, marked reuse otherwise).
//! 3. Misses produce generic fallback questions naming the topic.
//!
//! Also home of the diagnostic assembler, which is just a fan-out over
//! topics and levels.

use crate::synth::{self, Family};
use crate::templates::{Lookup, QuestionTemplate, TemplateBank};
use crate::types::{
    question_id, Difficulty, DiagnosticConfig, FallbackReason, Generation, Origin, Question,
    QuizConfig,
};
use rand::Rng;
use tracing::debug;

/// Marker appended to reused template text
pub const VARIATION_MARKER: &str = " (Practice variation)";

/// Upper bound on diagnostic length
pub const MAX_DIAGNOSTIC_QUESTIONS: usize = 15;

/// Questions requested per topic per level in a diagnostic
pub const QUESTIONS_PER_LEVEL: usize = 1;

/// Assembles quizzes from a template bank plus the numeric synthesizer
#[derive(Debug, Clone, Copy)]
pub struct QuizAssembler<'a> {
    bank: &'a TemplateBank,
}

impl Default for QuizAssembler<'static> {
    fn default() -> Self {
        Self::new(TemplateBank::builtin())
    }
}

impl<'a> QuizAssembler<'a> {
    pub fn new(bank: &'a TemplateBank) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &'a TemplateBank {
        self.bank
    }

    /// Generate a quiz. Never fails; always `config.question_count` questions.
    pub fn generate<R: Rng + ?Sized>(&self, config: &QuizConfig, rng: &mut R) -> Generation {
        let count = config.question_count;

        if let Some(family) = Family::for_topic(&config.topic).filter(Family::is_numeric) {
            let questions = (0..count)
                .map(|_| {
                    let mut q = synth::synthesize(family, config.difficulty, rng);
                    q.topic = config.topic.clone();
                    q.question_type = config.question_type().to_string();
                    q
                })
                .collect();
            return Generation::Generated {
                origin: Origin::Synthesizer,
                questions,
            };
        }

        let lookup = self
            .bank
            .lookup(&config.subject, &config.topic, config.difficulty);
        let templates = match lookup {
            Lookup::Hit(templates) => templates,
            miss => {
                let reason = match miss {
                    Lookup::UnknownSubject => FallbackReason::UnknownSubject,
                    Lookup::UnknownTopic => FallbackReason::UnknownTopic,
                    _ => FallbackReason::EmptyDifficulty,
                };
                debug!(
                    subject = %config.subject,
                    topic = %config.topic,
                    difficulty = %config.difficulty,
                    reason = %reason,
                    "bank miss, using fallback questions"
                );
                return Generation::Fallback {
                    reason,
                    questions: fallback_questions(&config.topic, config.difficulty, count),
                };
            }
        };

        let questions = (0..count)
            .map(|i| {
                let template = &templates[i % templates.len()];
                if i < templates.len() {
                    template.materialize("q", &config.topic, config.difficulty, config.question_type())
                } else {
                    variation(template, config, rng)
                }
            })
            .collect();

        Generation::Generated {
            origin: Origin::Bank,
            questions,
        }
    }

    /// Diagnostic: one question per topic per level, topic-major, capped at 15
    pub fn diagnostic<R: Rng + ?Sized>(&self, config: &DiagnosticConfig, rng: &mut R) -> Vec<Question> {
        let mut questions = Vec::new();
        for topic in config.topics.iter().filter(|t| !t.trim().is_empty()) {
            for difficulty in Difficulty::ALL {
                let quiz = QuizConfig::new(&config.subject, topic, difficulty, QUESTIONS_PER_LEVEL);
                questions.extend(self.generate(&quiz, rng).into_questions());
            }
        }
        questions.truncate(MAX_DIAGNOSTIC_QUESTIONS);
        debug!(
            subject = %config.subject,
            grade_level = %config.grade_level,
            count = questions.len(),
            "assembled diagnostic"
        );
        questions
    }
}

/// Question for a reused template slot
fn variation<R: Rng + ?Sized>(template: &QuestionTemplate, config: &QuizConfig, rng: &mut R) -> Question {
    match Family::for_concept(&template.concept) {
        Some(family) => {
            let fresh = synth::synthesize(family, config.difficulty, rng);
            let mut q = template.materialize("variation", &config.topic, config.difficulty, config.question_type());
            q.text = fresh.text;
            q.options = fresh.options;
            q.correct_answer_index = fresh.correct_answer_index;
            q.explanation = fresh.explanation;
            q
        }
        None => {
            let mut q = template.materialize("variation", &config.topic, config.difficulty, config.question_type());
            q.text.push_str(VARIATION_MARKER);
            q
        }
    }
}

/// Generic placeholder questions, numbered from 1
pub fn fallback_questions(topic: &str, difficulty: Difficulty, count: usize) -> Vec<Question> {
    (1..=count)
        .map(|n| Question {
            id: question_id("fallback"),
            text: format!("{topic} Question {n}: What is a fundamental concept in {topic}?"),
            options: vec![
                format!("Key concept in {topic}"),
                "Alternative answer A".to_string(),
                "Alternative answer B".to_string(),
                "Alternative answer C".to_string(),
            ],
            correct_answer_index: 0,
            explanation: format!(
                "This question tests your understanding of basic {topic} concepts at the \
                 {difficulty} level. Focus on understanding the fundamental principles of this topic."
            ),
            topic: topic.to_string(),
            difficulty,
            question_type: crate::types::DEFAULT_QUESTION_TYPE.to_string(),
            concept: Some(format!("{topic} Fundamentals")),
            improvement_areas: vec![
                format!("Study {topic} basics"),
                format!("Review {difficulty} level concepts"),
                "Practice more problems".to_string(),
            ],
            encouragement: Some(format!(
                "Keep practicing {topic}! Every expert was once a beginner. You're making great progress!"
            )),
            related_topics: vec![
                format!("{topic} Basics"),
                "Fundamental Concepts".to_string(),
                "Practice Problems".to_string(),
            ],
        })
        .collect()
}

/// Generate a quiz from the built-in bank with thread-local randomness
pub fn generate_quiz(config: &QuizConfig) -> Vec<Question> {
    QuizAssembler::default()
        .generate(config, &mut rand::thread_rng())
        .into_questions()
}

/// Diagnostic test from the built-in bank with thread-local randomness
pub fn generate_diagnostic_test(subject: &str, grade_level: &str, topics: &[String]) -> Vec<Question> {
    let config = DiagnosticConfig {
        subject: subject.to_string(),
        grade_level: grade_level.to_string(),
        topics: topics.to_vec(),
    };
    QuizAssembler::default().diagnostic(&config, &mut rand::thread_rng())
}
