//! Student insights derived from performance history.
//!
//! Records come from wherever performance is stored (the vector index in
//! production, an in-memory map in tests and the CLI). Derivation is pure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::types::Difficulty;

/// Topic average below this is a weak area
pub const WEAK_AREA_THRESHOLD: f64 = 70.0;
/// Topic average above this is a strong area
pub const STRONG_AREA_THRESHOLD: f64 = 85.0;
/// How many of the latest records drive the recommended level
pub const RECENT_WINDOW: usize = 5;

/// One scored attempt on a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub student_id: String,
    pub topic: String,
    /// Percentage, 0-100
    pub score: f64,
    pub difficulty: Difficulty,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub concepts: Vec<String>,
}

/// Summary of a student's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInsights {
    pub student_id: String,
    /// Average score per topic
    pub topic_scores: BTreeMap<String, f64>,
    pub weak_areas: Vec<String>,
    pub strong_areas: Vec<String>,
    pub recommended_topics: Vec<String>,
    pub difficulty_level: Difficulty,
    /// Average of the recent window
    pub confidence_score: f64,
}

impl StudentInsights {
    pub fn topic_score(&self, topic: &str) -> Option<f64> {
        self.topic_scores.get(topic).copied()
    }
}

/// Summarize `records`; `None` when there is no history
pub fn derive_insights(student_id: &str, records: &[PerformanceRecord]) -> Option<StudentInsights> {
    if records.is_empty() {
        return None;
    }

    let mut per_topic: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in records {
        per_topic.entry(r.topic.as_str()).or_default().push(r.score);
    }
    let topic_scores: BTreeMap<String, f64> = per_topic
        .into_iter()
        .map(|(topic, scores)| (topic.to_string(), mean(&scores)))
        .collect();

    let weak_areas: Vec<String> = topic_scores
        .iter()
        .filter(|(_, avg)| **avg < WEAK_AREA_THRESHOLD)
        .map(|(t, _)| t.clone())
        .collect();
    let strong_areas: Vec<String> = topic_scores
        .iter()
        .filter(|(_, avg)| **avg > STRONG_AREA_THRESHOLD)
        .map(|(t, _)| t.clone())
        .collect();

    let mut recent: Vec<&PerformanceRecord> = records.iter().collect();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let recent_scores: Vec<f64> = recent.iter().take(RECENT_WINDOW).map(|r| r.score).collect();
    let confidence_score = mean(&recent_scores);

    let difficulty_level = if confidence_score > STRONG_AREA_THRESHOLD {
        Difficulty::Advanced
    } else if confidence_score < 60.0 {
        Difficulty::Beginner
    } else {
        Difficulty::Intermediate
    };

    let mut recommended_topics: Vec<String> = Vec::new();
    for topic in weak_areas
        .iter()
        .cloned()
        .chain(strong_areas.iter().flat_map(|a| related_topics(a)).map(|t| t.to_string()))
    {
        if !recommended_topics.contains(&topic) {
            recommended_topics.push(topic);
        }
    }

    Some(StudentInsights {
        student_id: student_id.to_string(),
        topic_scores,
        weak_areas,
        strong_areas,
        recommended_topics,
        difficulty_level,
        confidence_score,
    })
}

/// Follow-on topics for a mastered area (case-insensitive)
pub fn related_topics(area: &str) -> &'static [&'static str] {
    match area.to_lowercase().as_str() {
        "algebra" => &["calculus", "trigonometry"],
        "calculus" => &["differential equations", "linear algebra"],
        "geometry" => &["trigonometry", "coordinate geometry"],
        "statistics" => &["probability", "data analysis"],
        _ => &[],
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

// ============================================================================
// SOURCES
// ============================================================================

/// Anything that can look up a student's insights.
///
/// Lookups never fail: an unreachable source is the same as no history.
#[async_trait]
pub trait InsightSource: Send + Sync {
    async fn student_insights(&self, student_id: &str) -> Option<StudentInsights>;
}

/// No history for anyone
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInsights;

#[async_trait]
impl InsightSource for NoInsights {
    async fn student_insights(&self, _student_id: &str) -> Option<StudentInsights> {
        None
    }
}

/// In-memory performance history keyed by student
#[derive(Debug, Clone, Default)]
pub struct StaticInsights {
    records: HashMap<String, Vec<PerformanceRecord>>,
}

impl StaticInsights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: PerformanceRecord) {
        self.records
            .entry(record.student_id.clone())
            .or_default()
            .push(record);
    }
}

impl FromIterator<PerformanceRecord> for StaticInsights {
    fn from_iter<I: IntoIterator<Item = PerformanceRecord>>(iter: I) -> Self {
        let mut insights = Self::new();
        for record in iter {
            insights.record(record);
        }
        insights
    }
}

#[async_trait]
impl InsightSource for StaticInsights {
    async fn student_insights(&self, student_id: &str) -> Option<StudentInsights> {
        self.records
            .get(student_id)
            .and_then(|records| derive_insights(student_id, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(topic: &str, score: f64, minutes_ago: i64) -> PerformanceRecord {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        PerformanceRecord {
            student_id: "s1".to_string(),
            topic: topic.to_string(),
            score,
            difficulty: Difficulty::Intermediate,
            timestamp: now - Duration::minutes(minutes_ago),
            concepts: vec![],
        }
    }

    #[test]
    fn test_no_records() {
        assert!(derive_insights("s1", &[]).is_none());
    }

    #[test]
    fn test_weak_and_strong_boundaries() {
        let records = vec![
            record("Algebra", 90.0, 1),
            record("Geometry", 85.0, 2),
            record("Calculus", 70.0, 3),
            record("Statistics", 69.0, 4),
        ];
        let insights = derive_insights("s1", &records).unwrap();
        assert_eq!(insights.strong_areas, vec!["Algebra"]);
        assert_eq!(insights.weak_areas, vec!["Statistics"]);
        assert_eq!(insights.topic_score("Geometry"), Some(85.0));
    }

    #[test]
    fn test_recommended_topics_deduplicated() {
        let records = vec![
            record("algebra", 95.0, 1),
            record("geometry", 92.0, 2),
            record("trigonometry", 40.0, 3),
        ];
        let insights = derive_insights("s1", &records).unwrap();
        assert_eq!(
            insights.recommended_topics,
            vec!["trigonometry", "calculus", "coordinate geometry"]
        );
    }

    #[test]
    fn test_recent_window_drives_level() {
        // five recent high scores outweigh older failures
        let mut records: Vec<_> = (0..5).map(|i| record("Algebra", 95.0, i)).collect();
        records.extend((10..20).map(|i| record("Algebra", 10.0, i)));
        let insights = derive_insights("s1", &records).unwrap();
        assert_eq!(insights.difficulty_level, Difficulty::Advanced);
        assert_eq!(insights.confidence_score, 95.0);
    }

    #[test]
    fn test_level_boundaries() {
        let level = |score| derive_insights("s1", &[record("Algebra", score, 0)]).unwrap().difficulty_level;
        assert_eq!(level(85.0), Difficulty::Intermediate);
        assert_eq!(level(85.5), Difficulty::Advanced);
        assert_eq!(level(60.0), Difficulty::Intermediate);
        assert_eq!(level(59.9), Difficulty::Beginner);
    }

    #[tokio::test]
    async fn test_static_source() {
        let source: StaticInsights = vec![record("Algebra", 50.0, 0)].into_iter().collect();
        let insights = source.student_insights("s1").await.unwrap();
        assert_eq!(insights.weak_areas, vec!["Algebra"]);
        assert!(source.student_insights("nobody").await.is_none());
        assert!(NoInsights.student_insights("s1").await.is_none());
    }
}
