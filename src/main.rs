//! edututor CLI
//!
//! Generate quizzes and diagnostics as JSON, inspect the bank, or run the
//! HTTP API.
//!
//! Run with: cargo run -- quiz --subject Mathematics --topic Algebra

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use edututor::{
    adaptive::{generate_adaptive_quiz, AdaptiveQuizRequest},
    config::{AppConfig, DEFAULT_BIND},
    insights::{derive_insights, PerformanceRecord},
    quiz::QuizAssembler,
    server,
    service::Tutor,
    templates::TemplateBank,
    types::{DiagnosticConfig, Difficulty, QuizConfig},
};

#[derive(Parser, Debug)]
#[command(name = "edututor", version, about = "Quiz and diagnostic generation")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a quiz
    Quiz {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        topic: String,
        #[arg(long, default_value = "beginner")]
        difficulty: Difficulty,
        #[arg(long, default_value_t = 5)]
        count: usize,
        /// Seed for reproducible synthesized questions
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate a diagnostic test
    Diagnostic {
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "General")]
        grade_level: String,
        /// Comma-separated topics
        #[arg(long, value_delimiter = ',', required = true)]
        topics: Vec<String>,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate an adaptive quiz locally
    Adaptive {
        #[arg(long)]
        topic: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, default_value = "intermediate")]
        difficulty: Difficulty,
        #[arg(long, default_value_t = 5)]
        count: usize,
        /// Prior score on the topic (0-100)
        #[arg(long)]
        score: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List bank subjects, topics and bucket sizes
    Bank {
        #[arg(long)]
        subject: Option<String>,
    },

    /// Run the HTTP API
    Serve {
        #[arg(long, env = "EDUTUTOR_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,
    },
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let assembler = QuizAssembler::default();

    match args.command {
        Command::Quiz {
            subject,
            topic,
            difficulty,
            count,
            seed,
        } => {
            let config = QuizConfig::new(&subject, &topic, difficulty, count);
            config.validate().context("invalid quiz request")?;
            print_json(&assembler.generate(&config, &mut rng(seed)))
        }

        Command::Diagnostic {
            subject,
            grade_level,
            topics,
            seed,
        } => {
            let config = DiagnosticConfig {
                subject,
                grade_level,
                topics,
            };
            config.validate().context("invalid diagnostic request")?;
            print_json(&assembler.diagnostic(&config, &mut rng(seed)))
        }

        Command::Adaptive {
            topic,
            subject,
            difficulty,
            count,
            score,
            seed,
        } => {
            let request = AdaptiveQuizRequest {
                student_id: None,
                subject,
                topic,
                difficulty,
                question_count: count,
                course_context: None,
            };
            request.validate().context("invalid adaptive request")?;

            let insights = score.and_then(|score| {
                derive_insights(
                    "cli",
                    &[PerformanceRecord {
                        student_id: "cli".to_string(),
                        topic: request.topic.clone(),
                        score,
                        difficulty,
                        timestamp: Utc::now(),
                        concepts: Vec::new(),
                    }],
                )
            });
            print_json(&generate_adaptive_quiz(
                &assembler,
                &request,
                insights.as_ref(),
                &mut rng(seed),
            ))
        }

        Command::Bank { subject } => {
            let bank = TemplateBank::builtin();
            let subjects = match subject {
                Some(s) => vec![s],
                None => bank.subjects().into_iter().map(str::to_string).collect(),
            };
            for subject in subjects {
                println!("{}", subject);
                for topic in bank.topics(&subject) {
                    let counts: Vec<String> = Difficulty::ALL
                        .iter()
                        .map(|d| format!("{}={}", d, bank.count(&subject, topic, *d)))
                        .collect();
                    println!("  {:<20} {}", topic, counts.join(" "));
                }
            }
            Ok(())
        }

        Command::Serve { bind } => {
            let tutor = Arc::new(Tutor::from_config(&AppConfig::from_env()));
            server::serve(tutor, bind)
                .await
                .with_context(|| format!("server on {} failed", bind))
        }
    }
}
