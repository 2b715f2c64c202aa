//! Text-generation client (watsonx.ai)
//!
//! API key -> IAM bearer token -> `/v1/text/generation`. The token is cached
//! until five minutes before it expires. Generated text is expected to contain
//! a JSON array of questions; missing fields get defaults.

use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::error::RemoteError;
use crate::remote::http_client;
use crate::types::{question_id, Difficulty, Question, DEFAULT_QUESTION_TYPE, OPTION_COUNT};

const SERVICE: &str = "watsonx";
const API_VERSION: &str = "2023-05-29";
const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";
/// Tokens are refreshed this long before they actually expire
const TOKEN_MARGIN: Duration = Duration::from_secs(300);

/// Returned by [`TextGenerationClient::analyze_student_response`] on any failure
pub const DEFAULT_RESPONSE_FEEDBACK: &str =
    "Great effort! Keep practicing to improve your understanding of this concept.";

/// What to ask the model for
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_count: usize,
    pub student_level: Difficulty,
    pub previous_performance: Vec<f64>,
    pub course_context: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    results: Vec<GenerationResult>,
}

#[derive(Deserialize)]
struct GenerationResult {
    generated_text: String,
}

pub struct TextGenerationClient {
    config: GenerationConfig,
    http: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl TextGenerationClient {
    pub fn new(config: GenerationConfig) -> Result<Self, RemoteError> {
        Ok(Self {
            http: http_client(config.timeout_secs)?,
            config,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, RemoteError> {
        if !self.config.is_configured() {
            return Err(RemoteError::MissingCredentials(SERVICE));
        }

        // Held across the exchange so concurrent callers share one refresh
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .http
            .post(&self.config.iam_url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", IAM_GRANT_TYPE),
                ("apikey", self.config.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteError::Status {
                service: "iam",
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::malformed(format!("token response: {}", e)))?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_MARGIN);
        debug!(expires_in = token.expires_in, "refreshed access token");

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    /// Raw completion for `prompt`
    pub async fn generate_text(&self, prompt: &str, parameters: Value) -> Result<String, RemoteError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/v1/text/generation?version={}",
            self.config.base_url.trim_end_matches('/'),
            API_VERSION
        );
        let body = json!({
            "model_id": self.config.model_id,
            "input": prompt,
            "parameters": parameters,
            "project_id": self.config.project_id,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteError::Status {
                service: SERVICE,
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::malformed(e.to_string()))?;
        parsed
            .results
            .into_iter()
            .next()
            .map(|r| r.generated_text)
            .ok_or_else(|| RemoteError::malformed("no results returned"))
    }

    /// Ask the model for a quiz. At most `question_count` questions come back.
    pub async fn generate_quiz(&self, request: &GenerationRequest) -> Result<Vec<Question>, RemoteError> {
        let parameters = json!({
            "decoding_method": "greedy",
            "max_new_tokens": 2000,
            "temperature": 0.7,
            "top_p": 0.9,
            "repetition_penalty": 1.1,
        });
        let text = self.generate_text(&build_quiz_prompt(request), parameters).await?;
        let mut questions = parse_quiz_response(&text, request)?;
        questions.truncate(request.question_count);
        Ok(questions)
    }

    /// Free-text feedback on an answer; never fails
    pub async fn analyze_student_response(
        &self,
        question: &str,
        student_answer: &str,
        correct_answer: &str,
    ) -> String {
        let prompt = format!(
            "Analyze this student's response and provide personalized feedback:\n\n\
             Question: {question}\n\
             Student Answer: {student_answer}\n\
             Correct Answer: {correct_answer}\n\n\
             Provide constructive feedback that:\n\
             1. Explains why the answer is correct/incorrect\n\
             2. Identifies the underlying concept\n\
             3. Suggests specific areas for improvement\n\
             4. Encourages continued learning\n\n\
             Keep the feedback encouraging and educational."
        );
        let parameters = json!({
            "decoding_method": "greedy",
            "max_new_tokens": 500,
            "temperature": 0.6,
        });

        match self.generate_text(&prompt, parameters).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => DEFAULT_RESPONSE_FEEDBACK.to_string(),
            Err(e) => {
                debug!(error = %e, "response analysis unavailable");
                DEFAULT_RESPONSE_FEEDBACK.to_string()
            }
        }
    }
}

pub fn build_quiz_prompt(request: &GenerationRequest) -> String {
    let previous = if request.previous_performance.is_empty() {
        "No previous data".to_string()
    } else {
        request
            .previous_performance
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        r#"Generate {count} multiple-choice questions for {topic} at {difficulty} level.

Student Context:
- Level: {level}
- Previous Performance: {previous}
- Course Context: {context}

Requirements:
- Each question should have 4 options (A, B, C, D)
- Include detailed explanations for correct answers
- Vary difficulty appropriately
- Focus on conceptual understanding
- Include real-world applications where relevant

Format each question as JSON:
{{
  "question": "Question text",
  "options": ["Option A", "Option B", "Option C", "Option D"],
  "correctAnswer": 0,
  "explanation": "Detailed explanation",
  "difficulty": "{difficulty}",
  "topic": "{topic}"
}}

Return only a valid JSON array of questions."#,
        count = request.question_count,
        topic = request.topic,
        difficulty = request.difficulty,
        level = request.student_level,
        previous = previous,
        context = request.course_context.as_deref().unwrap_or("General"),
    )
}

/// Pull the first `[...]` span out of model output and read it as questions
pub fn parse_quiz_response(text: &str, request: &GenerationRequest) -> Result<Vec<Question>, RemoteError> {
    let start = text.find('[');
    let end = text.rfind(']');
    let span = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => return Err(RemoteError::malformed("no JSON array in generated text")),
    };

    let items: Vec<Value> =
        serde_json::from_str(span).map_err(|e| RemoteError::malformed(e.to_string()))?;
    if items.is_empty() {
        return Err(RemoteError::malformed("empty question array"));
    }

    Ok(items
        .iter()
        .enumerate()
        .map(|(i, item)| question_from_value(i, item, request))
        .collect())
}

fn question_from_value(index: usize, item: &Value, request: &GenerationRequest) -> Question {
    let text_field = |key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    };

    let options: Vec<String> = item
        .get("options")
        .and_then(Value::as_array)
        .map(|opts| {
            opts.iter()
                .filter_map(|o| o.as_str().map(str::to_string))
                .collect()
        })
        .filter(|opts: &Vec<String>| opts.len() == OPTION_COUNT)
        .unwrap_or_else(|| {
            ["Option A", "Option B", "Option C", "Option D"]
                .iter()
                .map(|s| s.to_string())
                .collect()
        });

    let correct_answer_index = item
        .get("correctAnswer")
        .and_then(Value::as_u64)
        .map(|i| i as usize)
        .filter(|i| *i < options.len())
        .unwrap_or(0);

    let difficulty = text_field("difficulty")
        .and_then(|d| d.parse().ok())
        .unwrap_or(request.difficulty);

    Question {
        id: question_id("remote"),
        text: text_field("question").unwrap_or_else(|| format!("Sample question {}", index + 1)),
        options,
        correct_answer_index,
        explanation: text_field("explanation")
            .unwrap_or_else(|| "This is the correct answer.".to_string()),
        topic: text_field("topic").unwrap_or_else(|| request.topic.clone()),
        difficulty,
        question_type: DEFAULT_QUESTION_TYPE.to_string(),
        concept: None,
        improvement_areas: Vec::new(),
        encouragement: None,
        related_topics: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MODEL_ID;

    fn request() -> GenerationRequest {
        GenerationRequest {
            topic: "Photosynthesis".to_string(),
            difficulty: Difficulty::Intermediate,
            question_count: 2,
            student_level: Difficulty::Intermediate,
            previous_performance: vec![72.5],
            course_context: None,
        }
    }

    fn config(server: &mockito::Server) -> GenerationConfig {
        GenerationConfig {
            api_key: "test-key".to_string(),
            project_id: "test-project".to_string(),
            base_url: server.url(),
            iam_url: format!("{}/identity/token", server.url()),
            model_id: DEFAULT_MODEL_ID.to_string(),
            timeout_secs: 5,
        }
    }

    fn generation_body(text: &str) -> String {
        json!({ "results": [{ "generated_text": text }] }).to_string()
    }

    #[test]
    fn test_prompt_mentions_context() {
        let prompt = build_quiz_prompt(&request());
        assert!(prompt.starts_with("Generate 2 multiple-choice questions for Photosynthesis at intermediate level."));
        assert!(prompt.contains("- Previous Performance: 72.5"));
        assert!(prompt.contains("- Course Context: General"));
    }

    #[test]
    fn test_parse_with_surrounding_text_and_defaults() {
        let text = r#"Here are your questions:
[
  {"question": "What do plants absorb?", "options": ["CO2", "O2", "N2", "He"], "correctAnswer": 0,
   "explanation": "Plants take in carbon dioxide.", "difficulty": "easy"},
  {"options": ["only", "three", "options"], "correctAnswer": 7}
]
Good luck!"#;
        let questions = parse_quiz_response(text, &request()).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].difficulty, Difficulty::Beginner);
        assert_eq!(questions[0].topic, "Photosynthesis");

        let q = &questions[1];
        assert_eq!(q.text, "Sample question 2");
        assert_eq!(q.options, vec!["Option A", "Option B", "Option C", "Option D"]);
        assert_eq!(q.correct_answer_index, 0);
        assert_eq!(q.explanation, "This is the correct answer.");
        assert_eq!(q.difficulty, Difficulty::Intermediate);
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(matches!(
            parse_quiz_response("I cannot help with that.", &request()),
            Err(RemoteError::Malformed(_))
        ));
        assert!(parse_quiz_response("[]", &request()).is_err());
        assert!(parse_quiz_response("[{broken", &request()).is_err());
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let mut config = GenerationConfig::default();
        config.api_key = String::new();
        let client = TextGenerationClient::new(config).unwrap();
        let err = client.generate_quiz(&request()).await.unwrap_err();
        assert!(matches!(err, RemoteError::MissingCredentials("watsonx")));
    }

    #[tokio::test]
    async fn test_generate_quiz_success_and_token_reuse() {
        let mut server = mockito::Server::new_async().await;
        let token = server
            .mock("POST", "/identity/token")
            .match_body(mockito::Matcher::UrlEncoded(
                "grant_type".into(),
                IAM_GRANT_TYPE.into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"tok-123","expires_in":3600}"#)
            .expect(1)
            .create_async()
            .await;
        let generation = server
            .mock("POST", "/v1/text/generation")
            .match_query(mockito::Matcher::UrlEncoded("version".into(), API_VERSION.into()))
            .match_header("authorization", "Bearer tok-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(generation_body(
                r#"[{"question":"Q1","options":["a","b","c","d"],"correctAnswer":2,"explanation":"e"},
                    {"question":"Q2","options":["a","b","c","d"],"correctAnswer":1,"explanation":"e"},
                    {"question":"Q3","options":["a","b","c","d"],"correctAnswer":0,"explanation":"e"}]"#,
            ))
            .expect(2)
            .create_async()
            .await;

        let client = TextGenerationClient::new(config(&server)).unwrap();
        let questions = client.generate_quiz(&request()).await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct_answer_index, 2);
        assert!(questions[0].id.starts_with("remote_"));

        client.generate_quiz(&request()).await.unwrap();
        token.assert_async().await;
        generation.assert_async().await;
    }

    #[tokio::test]
    async fn test_generation_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/identity/token")
            .with_status(200)
            .with_body(r#"{"access_token":"tok","expires_in":3600}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v1/text/generation")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let client = TextGenerationClient::new(config(&server)).unwrap();
        match client.generate_quiz(&request()).await {
            Err(RemoteError::Status { status, body, .. }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_token_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/identity/token")
            .with_status(401)
            .with_body("bad key")
            .create_async()
            .await;

        let client = TextGenerationClient::new(config(&server)).unwrap();
        let err = client.generate_quiz(&request()).await.unwrap_err();
        assert!(matches!(err, RemoteError::Status { service: "iam", status: 401, .. }));
    }

    #[tokio::test]
    async fn test_no_results_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/identity/token")
            .with_status(200)
            .with_body(r#"{"access_token":"tok","expires_in":3600}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v1/text/generation")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results":[]}"#)
            .create_async()
            .await;

        let client = TextGenerationClient::new(config(&server)).unwrap();
        assert!(matches!(
            client.generate_quiz(&request()).await,
            Err(RemoteError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_analyze_response_falls_back() {
        let mut config = GenerationConfig::default();
        config.api_key = String::new();
        let client = TextGenerationClient::new(config).unwrap();
        let feedback = client.analyze_student_response("2+2?", "5", "4").await;
        assert_eq!(feedback, DEFAULT_RESPONSE_FEEDBACK);
    }

    #[tokio::test]
    async fn test_analyze_response_trims_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/identity/token")
            .with_status(200)
            .with_body(r#"{"access_token":"tok","expires_in":3600}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v1/text/generation")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(generation_body("  Close! Remember to carry the one.\n"))
            .create_async()
            .await;

        let client = TextGenerationClient::new(config(&server)).unwrap();
        let feedback = client.analyze_student_response("2+2?", "5", "4").await;
        assert_eq!(feedback, "Close! Remember to carry the one.");
    }
}
