//! Assessment: diagnostic grading and per-answer feedback

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::insights::PerformanceRecord;
use crate::types::{Difficulty, Question};

/// Topic percentage at or above this is a strength
pub const STRENGTH_THRESHOLD: u32 = 80;
/// Topic percentage below this is a weakness
pub const WEAKNESS_THRESHOLD: u32 = 60;

/// Graded diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    pub student_id: String,
    /// Rounded percentage, 0-100
    pub overall_score: u32,
    pub topic_scores: BTreeMap<String, u32>,
    pub recommended_difficulty: Difficulty,
    pub weak_areas: Vec<String>,
    pub strong_areas: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Grade answers (question id -> chosen option index) against the questions.
///
/// Unanswered questions count as wrong.
pub fn grade_diagnostic(
    student_id: &str,
    questions: &[Question],
    answers: &HashMap<String, usize>,
) -> DiagnosticResult {
    let mut tally: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    let mut correct = 0;

    for q in questions {
        let hit = answers.get(&q.id) == Some(&q.correct_answer_index);
        let entry = tally.entry(q.topic.as_str()).or_default();
        entry.1 += 1;
        if hit {
            entry.0 += 1;
            correct += 1;
        }
    }

    let overall_score = percent(correct, questions.len());
    let topic_scores: BTreeMap<String, u32> = tally
        .into_iter()
        .map(|(topic, (c, t))| (topic.to_string(), percent(c, t)))
        .collect();

    let strong_areas = topic_scores
        .iter()
        .filter(|(_, s)| **s >= STRENGTH_THRESHOLD)
        .map(|(t, _)| t.clone())
        .collect();
    let weak_areas = topic_scores
        .iter()
        .filter(|(_, s)| **s < WEAKNESS_THRESHOLD)
        .map(|(t, _)| t.clone())
        .collect();

    let recommended_difficulty = if overall_score >= 80 {
        Difficulty::Advanced
    } else if overall_score < 50 {
        Difficulty::Beginner
    } else {
        Difficulty::Intermediate
    };

    DiagnosticResult {
        student_id: student_id.to_string(),
        overall_score,
        topic_scores,
        recommended_difficulty,
        weak_areas,
        strong_areas,
        completed_at: Utc::now(),
    }
}

impl DiagnosticResult {
    /// One history record per graded topic, for the insight store
    pub fn performance_records(&self) -> Vec<PerformanceRecord> {
        self.topic_scores
            .iter()
            .map(|(topic, score)| PerformanceRecord {
                student_id: self.student_id.clone(),
                topic: topic.clone(),
                score: f64::from(*score),
                difficulty: self.recommended_difficulty,
                timestamp: self.completed_at,
                concepts: Vec::new(),
            })
            .collect()
    }
}

fn percent(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

/// Feedback on a single answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub correct: bool,
    pub explanation: String,
    pub improvement_areas: Vec<String>,
    pub encouragement: String,
    pub next_steps: Vec<String>,
}

pub fn personalized_feedback(question: &Question, answer: usize) -> Feedback {
    let concept = question.concept.as_deref().unwrap_or(&question.topic);
    let encouragement = question.encouragement.as_deref().unwrap_or_default();

    if answer == question.correct_answer_index {
        return Feedback {
            correct: true,
            explanation: format!("Excellent! {}", question.explanation),
            improvement_areas: Vec::new(),
            encouragement: format!(
                "Perfect! You've mastered this {concept} concept. {encouragement}"
            )
            .trim_end()
            .to_string(),
            next_steps: vec![
                format!("Continue practicing {}", question.topic),
                "Try more advanced problems".to_string(),
                format!("Explore related topics: {}", question.related_topics.join(", ")),
            ],
        };
    }

    Feedback {
        correct: false,
        explanation: format!("Not quite right. {}", question.explanation),
        improvement_areas: question.improvement_areas.clone(),
        encouragement: format!("Don't worry! Making mistakes is part of learning. {encouragement}")
            .trim_end()
            .to_string(),
        next_steps: vec![
            format!("Review the concept: {concept}"),
            "Practice similar problems".to_string(),
            format!("Study these areas: {}", question.improvement_areas.join(", ")),
            "Ask for help if needed - everyone learns differently!".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::generate_quiz;
    use crate::types::QuizConfig;

    fn question(id: &str, topic: &str, correct: usize) -> Question {
        let mut q = generate_quiz(&QuizConfig::new("Nowhere", topic, Difficulty::Beginner, 1))
            .remove(0);
        q.id = id.to_string();
        q.correct_answer_index = correct;
        q
    }

    #[test]
    fn test_grade_empty() {
        let result = grade_diagnostic("s1", &[], &HashMap::new());
        assert_eq!(result.overall_score, 0);
        assert!(result.topic_scores.is_empty());
        assert_eq!(result.recommended_difficulty, Difficulty::Beginner);
    }

    #[test]
    fn test_grade_thresholds() {
        // Algebra 4/5 = 80 (strong), Geometry 1/2 = 50 (weak), Calculus 2/3 = 67
        let mut questions = Vec::new();
        let mut answers = HashMap::new();
        for i in 0..5 {
            questions.push(question(&format!("a{i}"), "Algebra", 0));
            answers.insert(format!("a{i}"), if i < 4 { 0 } else { 1 });
        }
        for i in 0..2 {
            questions.push(question(&format!("g{i}"), "Geometry", 0));
            answers.insert(format!("g{i}"), i);
        }
        for i in 0..3 {
            questions.push(question(&format!("c{i}"), "Calculus", 0));
            if i < 2 {
                answers.insert(format!("c{i}"), 0);
            }
        }

        let result = grade_diagnostic("s1", &questions, &answers);
        assert_eq!(result.overall_score, 70);
        assert_eq!(result.topic_scores["Algebra"], 80);
        assert_eq!(result.topic_scores["Geometry"], 50);
        assert_eq!(result.topic_scores["Calculus"], 67);
        assert_eq!(result.strong_areas, vec!["Algebra"]);
        assert_eq!(result.weak_areas, vec!["Geometry"]);
        assert_eq!(result.recommended_difficulty, Difficulty::Intermediate);

        let records = result.performance_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].topic, "Algebra");
        assert_eq!(records[0].score, 80.0);
    }

    #[test]
    fn test_grade_recommended_levels() {
        let questions: Vec<_> = (0..10).map(|i| question(&i.to_string(), "Algebra", 0)).collect();
        let answers = |n: usize| -> HashMap<String, usize> {
            (0..n).map(|i| (i.to_string(), 0)).collect()
        };
        assert_eq!(
            grade_diagnostic("s1", &questions, &answers(8)).recommended_difficulty,
            Difficulty::Advanced
        );
        assert_eq!(
            grade_diagnostic("s1", &questions, &answers(5)).recommended_difficulty,
            Difficulty::Intermediate
        );
        assert_eq!(
            grade_diagnostic("s1", &questions, &answers(4)).recommended_difficulty,
            Difficulty::Beginner
        );
    }

    #[test]
    fn test_feedback_correct() {
        let q = question("x", "Optics", 0);
        let fb = personalized_feedback(&q, 0);
        assert!(fb.correct);
        assert!(fb.explanation.starts_with("Excellent! "));
        assert!(fb.encouragement.starts_with("Perfect! You've mastered this Optics Fundamentals concept."));
        assert_eq!(fb.next_steps[0], "Continue practicing Optics");
        assert_eq!(
            fb.next_steps[2],
            "Explore related topics: Optics Basics, Fundamental Concepts, Practice Problems"
        );
        assert!(fb.improvement_areas.is_empty());
    }

    #[test]
    fn test_feedback_incorrect() {
        let q = question("x", "Optics", 0);
        let fb = personalized_feedback(&q, 3);
        assert!(!fb.correct);
        assert!(fb.explanation.starts_with("Not quite right. "));
        assert_eq!(fb.improvement_areas, q.improvement_areas);
        assert_eq!(fb.next_steps.len(), 4);
        assert_eq!(fb.next_steps[0], "Review the concept: Optics Fundamentals");
    }
}
