//! Vector-index client (Pinecone) for performance history.
//!
//! Reads are a metadata-filtered query; writes are best-effort upserts.
//! Failures never surface to callers as errors on the insight path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::VectorConfig;
use crate::error::RemoteError;
use crate::remote::http_client;
use crate::insights::{derive_insights, InsightSource, PerformanceRecord, StudentInsights};

const SERVICE: &str = "pinecone";
/// Max matches pulled per student
pub const QUERY_TOP_K: usize = 50;

/// One stored vector with its performance metadata
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceVector {
    pub id: String,
    pub values: Vec<f64>,
    pub metadata: PerformanceRecord,
}

impl PerformanceVector {
    /// Embed a record as `[score / 100, level / 2]`
    pub fn from_record(record: PerformanceRecord) -> Self {
        let level = match record.difficulty {
            crate::types::Difficulty::Beginner => 0.0,
            crate::types::Difficulty::Intermediate => 0.5,
            crate::types::Difficulty::Advanced => 1.0,
        };
        Self {
            id: format!(
                "{}_{}_{}",
                record.student_id,
                record.topic.replace(' ', "-").to_lowercase(),
                record.timestamp.timestamp_millis()
            ),
            values: vec![record.score / 100.0, level],
            metadata: record,
        }
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    #[serde(default)]
    metadata: Option<Value>,
}

pub struct VectorInsightClient {
    config: VectorConfig,
    http: reqwest::Client,
}

impl VectorInsightClient {
    pub fn new(config: VectorConfig) -> Result<Self, RemoteError> {
        Ok(Self {
            http: http_client(config.timeout_secs)?,
            config,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response, RemoteError> {
        if !self.config.is_configured() {
            return Err(RemoteError::MissingCredentials(SERVICE));
        }
        let response = self
            .http
            .post(format!("{}{}", self.config.base_url(), path))
            .header("Api-Key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteError::Status {
                service: SERVICE,
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response)
    }

    /// All stored records for a student. Matches whose metadata is not a
    /// performance record (e.g. other vector kinds) are skipped.
    pub async fn query_records(&self, student_id: &str) -> Result<Vec<PerformanceRecord>, RemoteError> {
        let body = json!({
            "filter": { "studentId": { "$eq": student_id } },
            "topK": QUERY_TOP_K,
            "includeMetadata": true,
        });
        let response: QueryResponse = self
            .post("/query", &body)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::malformed(e.to_string()))?;

        Ok(response
            .matches
            .into_iter()
            .filter_map(|m| m.metadata)
            .filter_map(|meta| serde_json::from_value(meta).ok())
            .collect())
    }

    pub async fn upsert(&self, vectors: &[PerformanceVector]) -> Result<(), RemoteError> {
        self.post("/vectors/upsert", &json!({ "vectors": vectors }))
            .await
            .map(|_| ())
    }

    /// Upsert, logging instead of failing
    pub async fn store_performance(&self, records: Vec<PerformanceRecord>) {
        if records.is_empty() {
            return;
        }
        let vectors: Vec<PerformanceVector> =
            records.into_iter().map(PerformanceVector::from_record).collect();
        match self.upsert(&vectors).await {
            Ok(()) => debug!(count = vectors.len(), "stored performance vectors"),
            Err(e) => warn!(error = %e, "failed to store performance vectors"),
        }
    }
}

#[async_trait]
impl InsightSource for VectorInsightClient {
    async fn student_insights(&self, student_id: &str) -> Option<StudentInsights> {
        match self.query_records(student_id).await {
            Ok(records) => derive_insights(student_id, &records),
            Err(RemoteError::MissingCredentials(_)) => None,
            Err(e) => {
                warn!(error = %e, student_id, "insight lookup failed");
                None
            }
        }
    }
}
