//! HTTP API
//!
//! JSON in, JSON out. Bad input is a 400 with `{"error": ...}`; generation
//! itself never fails, it degrades to tagged fallback content.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::adaptive::AdaptiveQuizRequest;
use crate::error::ConfigError;
use crate::service::Tutor;
use crate::types::{DiagnosticConfig, Generation, Question, QuizConfig};

type SharedTutor = Arc<Tutor>;

/// Request rejected at the boundary
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid request body: {0}")]
    Body(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

pub fn router(tutor: SharedTutor) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    Router::new()
        .route("/api/generate-quiz", post(generate_quiz))
        .route("/api/generate-diagnostic", post(generate_diagnostic))
        .route("/api/generate-custom-quiz", post(generate_custom_quiz))
        .route("/api/generate-adaptive-quiz", post(generate_adaptive_quiz))
        .route("/api/grade-diagnostic", post(grade_diagnostic))
        .route("/api/feedback", post(feedback))
        .route("/health", get(health))
        .layer(cors)
        .with_state(tutor)
}

/// Bind and serve until the process is stopped
pub async fn serve(tutor: SharedTutor, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "server listening");
    axum::serve(listener, router(tutor)).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

fn generation_metadata(generation: &Generation) -> Value {
    match generation {
        Generation::Generated { origin, .. } => json!({ "status": "generated", "origin": origin }),
        Generation::Fallback { reason, .. } => json!({ "status": "fallback", "reason": reason }),
    }
}

async fn generate_quiz(
    State(tutor): State<SharedTutor>,
    payload: Result<Json<QuizConfig>, JsonRejection>,
) -> ApiResult {
    let Json(config) = payload?;
    config.validate()?;

    let generation = tutor.generate_quiz(&config);
    let metadata = json!({
        "config": &config,
        "generatedAt": Utc::now(),
        "totalQuestions": generation.questions().len(),
        "generation": generation_metadata(&generation),
    });
    Ok(Json(json!({
        "success": true,
        "questions": generation.questions(),
        "metadata": metadata,
    })))
}

async fn generate_diagnostic(
    State(tutor): State<SharedTutor>,
    payload: Result<Json<DiagnosticConfig>, JsonRejection>,
) -> ApiResult {
    let Json(config) = payload?;
    config.validate()?;

    let questions = tutor.generate_diagnostic(&config);
    Ok(Json(json!({
        "success": true,
        "questions": &questions,
        "metadata": {
            "subject": config.subject,
            "gradeLevel": config.grade_level,
            "topics": config.topics,
            "totalQuestions": questions.len(),
            "generatedAt": Utc::now(),
        },
    })))
}

async fn generate_custom_quiz(
    State(tutor): State<SharedTutor>,
    payload: Result<Json<AdaptiveQuizRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    request.validate()?;

    let quiz = tutor.custom_quiz(&request).await;
    let concepts: BTreeSet<&str> = quiz
        .questions
        .iter()
        .filter_map(|q| q.concept.as_deref())
        .collect();
    Ok(Json(json!({
        "success": true,
        "questions": &quiz.questions,
        "adaptiveInfo": &quiz.adaptive_info,
        "metadata": {
            "effectiveDifficulty": quiz.effective_difficulty,
            "generatedAt": Utc::now(),
            "totalQuestions": quiz.questions.len(),
            "uniqueConcepts": concepts.len(),
        },
    })))
}

async fn generate_adaptive_quiz(
    State(tutor): State<SharedTutor>,
    payload: Result<Json<AdaptiveQuizRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    request.validate()?;

    let quiz = tutor.adaptive_quiz(&request).await;
    Ok(Json(json!({
        "success": true,
        "questions": quiz.generation.questions(),
        "adaptiveInfo": &quiz.adaptive_info,
        "metadata": {
            "generatedAt": Utc::now(),
            "generation": generation_metadata(&quiz.generation),
        },
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradeRequest {
    #[serde(default)]
    student_id: String,
    #[serde(default)]
    questions: Vec<Question>,
    /// Question id -> chosen option index
    #[serde(default)]
    answers: HashMap<String, usize>,
}

async fn grade_diagnostic(
    State(tutor): State<SharedTutor>,
    payload: Result<Json<GradeRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    if request.student_id.trim().is_empty() {
        return Err(ConfigError::MissingField("studentId").into());
    }

    let result = tutor
        .grade_diagnostic(&request.student_id, &request.questions, &request.answers)
        .await;
    Ok(Json(json!({ "success": true, "result": result })))
}

#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    question: Question,
    answer: usize,
}

async fn feedback(
    State(tutor): State<SharedTutor>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let answer = tutor.feedback(&request.question, request.answer).await;
    Ok(Json(json!({
        "success": true,
        "feedback": answer.feedback,
        "analysis": answer.analysis,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(Tutor::default()))
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_generate_quiz_ok() {
        let (status, body) = post_json(
            "/api/generate-quiz",
            json!({"subject": "Mathematics", "topic": "Algebra", "difficulty": "beginner", "questionCount": 5}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["questions"].as_array().unwrap().len(), 5);
        assert_eq!(body["metadata"]["generation"]["origin"], "bank");
        assert_eq!(body["questions"][0]["correctAnswerIndex"], 0);
    }

    #[tokio::test]
    async fn test_generate_quiz_missing_subject() {
        let (status, body) = post_json(
            "/api/generate-quiz",
            json!({"topic": "Algebra", "difficulty": "beginner", "questionCount": 5}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "subject is required");
    }

    #[tokio::test]
    async fn test_generate_quiz_bad_count_and_body() {
        let (status, _) = post_json(
            "/api/generate-quiz",
            json!({"subject": "Mathematics", "topic": "Algebra", "difficulty": "beginner", "questionCount": 0}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post_json("/api/generate-quiz", json!({"subject": "Mathematics"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("invalid request body"));
    }

    #[tokio::test]
    async fn test_unknown_subject_reports_fallback() {
        let (status, body) = post_json(
            "/api/generate-quiz",
            json!({"subject": "Underwater Basketweaving", "topic": "Knots", "difficulty": "advanced", "questionCount": 2}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["generation"]["status"], "fallback");
        assert_eq!(body["metadata"]["generation"]["reason"]["kind"], "unknownSubject");
    }

    #[tokio::test]
    async fn test_generate_diagnostic() {
        let (status, body) = post_json(
            "/api/generate-diagnostic",
            json!({"subject": "Physics", "gradeLevel": "Grade 11", "topics": ["Mechanics", "Thermodynamics"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["totalQuestions"], 6);

        let (status, _) = post_json(
            "/api/generate-diagnostic",
            json!({"subject": "Physics", "gradeLevel": "Grade 11", "topics": []}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_custom_and_adaptive_quiz() {
        let request = json!({"studentId": "s1", "topic": "Forces", "difficulty": "intermediate", "questionCount": 3});

        let (status, body) = post_json("/api/generate-custom-quiz", request.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions"].as_array().unwrap().len(), 3);
        assert_eq!(body["metadata"]["effectiveDifficulty"], "intermediate");

        let (status, body) = post_json("/api/generate-adaptive-quiz", request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["generation"]["status"], "fallback");
        assert_eq!(body["questions"].as_array().unwrap().len(), 3);
        assert_eq!(body["adaptiveInfo"]["recommendedDifficulty"], "intermediate");
    }

    #[tokio::test]
    async fn test_grade_and_feedback() {
        let (_, quiz) = post_json(
            "/api/generate-quiz",
            json!({"subject": "Mathematics", "topic": "Algebra", "difficulty": "beginner", "questionCount": 2}),
        )
        .await;
        let questions = quiz["questions"].clone();
        let first_id = questions[0]["id"].as_str().unwrap().to_string();

        let (status, body) = post_json(
            "/api/grade-diagnostic",
            json!({"studentId": "s1", "questions": questions, "answers": { first_id: 0 }}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["overallScore"], 50);

        let (status, body) = post_json(
            "/api/feedback",
            json!({"question": quiz["questions"][0], "answer": 1}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["feedback"]["correct"], false);

        let (status, _) = post_json("/api/grade-diagnostic", json!({"questions": []})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
