//! Runtime configuration.
//!
//! Everything is read from the environment once at startup and handed to the
//! clients explicitly; nothing reads env vars after construction.

use serde::Serialize;
use std::env;

pub const DEFAULT_WATSONX_BASE_URL: &str = "https://us-south.ml.cloud.ibm.com";
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";
pub const DEFAULT_MODEL_ID: &str = "ibm/granite-13b-chat-v2";
pub const DEFAULT_INDEX_NAME: &str = "edututor-ai";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
/// Whole-request limit for remote calls, overridable by `EDUTUTOR_REMOTE_TIMEOUT_SECS`
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

fn remote_timeout_secs() -> u64 {
    env::var("EDUTUTOR_REMOTE_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS)
}

/// Remote text generation (watsonx.ai)
#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    #[serde(skip)]
    pub api_key: String,
    pub project_id: String,
    pub base_url: String,
    /// Token exchange endpoint
    pub iam_url: String,
    pub model_id: String,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("WATSONX_API_KEY").unwrap_or_default(),
            project_id: env::var("WATSONX_PROJECT_ID").unwrap_or_default(),
            base_url: env::var("WATSONX_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_WATSONX_BASE_URL.to_string()),
            iam_url: DEFAULT_IAM_URL.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            timeout_secs: remote_timeout_secs(),
        }
    }
}

impl GenerationConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.project_id.is_empty()
    }
}

/// Vector index holding performance history (Pinecone)
#[derive(Debug, Clone, Serialize)]
pub struct VectorConfig {
    #[serde(skip)]
    pub api_key: String,
    pub environment: String,
    pub index_name: String,
    /// Overrides the host derived from index and environment
    pub host: Option<String>,
    pub timeout_secs: u64,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("PINECONE_API_KEY").unwrap_or_default(),
            environment: env::var("PINECONE_ENVIRONMENT").unwrap_or_default(),
            index_name: env::var("PINECONE_INDEX_NAME")
                .unwrap_or_else(|_| DEFAULT_INDEX_NAME.to_string()),
            host: None,
            timeout_secs: remote_timeout_secs(),
        }
    }
}

impl VectorConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.environment.is_empty()
    }

    /// `https://{index}-{environment}.svc.pinecone.io` unless overridden
    pub fn base_url(&self) -> String {
        match &self.host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}-{}.svc.pinecone.io",
                self.index_name, self.environment
            ),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub vector: VectorConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::default()
    }
}
