//! Generative note pipeline.
//!
//! Defines the [`NoteGenerator`] trait and its implementations:
//! - **[`DisabledGenerator`]**: always fails; used when no provider or key is configured.
//! - **[`OpenAIGenerator`]**: calls an OpenAI-compatible `/chat/completions`
//!   endpoint in JSON mode, with retry and backoff.
//!
//! # Stages
//!
//! A full note is produced by three strictly sequential stages. Each later
//! stage receives the earlier stages' JSON as context:
//!
//! ```text
//! analyze ──▶ pseudocode ──▶ explain ──▶ Note
//! {title, problem,   {pseudocode}   {explanation,
//!  approach, ...}                    examples}
//! ```
//!
//! Hybrid mode uses a single `refine` stage that only rewrites the prose
//! fields of a heuristic draft.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use async_trait::async_trait;
use serde_json::{json, Value};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::Config;
use crate::models::{Note, SourceUnit};
use crate::note::{string_list, value_to_text};
use crate::progress::{StageProgressEvent, StageProgressReporter};
use crate::signals::scan_window;

/// One request/response step of the pipeline.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    Analyze,
    Pseudocode,
    Explain,
    Refine,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Analyze => "analyze",
            Stage::Pseudocode => "pseudocode",
            Stage::Explain => "explain",
            Stage::Refine => "refine",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error("generation is disabled: {0}")]
    Disabled(String),
    #[error("{stage} stage request failed: {message}")]
    Request { stage: Stage, message: String },
    #[error("{stage} stage returned HTTP {status}: {body}")]
    Status {
        stage: Stage,
        status: u16,
        body: String,
    },
    #[error("{stage} stage returned unusable output: {message}")]
    Parse { stage: Stage, message: String },
}

impl StageError {
    /// Stage name for log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            StageError::Disabled(_) => "setup",
            StageError::Request { stage, .. }
            | StageError::Status { stage, .. }
            | StageError::Parse { stage, .. } => stage.as_str(),
        }
    }
}

/// Prose fields produced by the `refine` stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Refinement {
    pub approach: String,
    pub explanation: String,
    pub edge_cases: Vec<String>,
}

/// A backend that turns source text into a [`Note`].
///
/// Returned notes are not yet normalized; the dispatcher does that.
#[async_trait]
pub trait NoteGenerator: Send + Sync {
    /// Backend identifier for logs (e.g. the model name).
    fn name(&self) -> &str;

    /// Produce a complete note from scratch.
    async fn generate(
        &self,
        unit: &SourceUnit,
        progress: &dyn StageProgressReporter,
    ) -> Result<Note, StageError>;

    /// Rewrite the prose fields of an existing draft.
    async fn refine(
        &self,
        unit: &SourceUnit,
        draft: &Note,
        progress: &dyn StageProgressReporter,
    ) -> Result<Refinement, StageError>;
}

// ============ Disabled Generator ============

/// Fails every call with the reason it was disabled.
pub struct DisabledGenerator {
    reason: String,
}

impl DisabledGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl NoteGenerator for DisabledGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(
        &self,
        _unit: &SourceUnit,
        _progress: &dyn StageProgressReporter,
    ) -> Result<Note, StageError> {
        Err(StageError::Disabled(self.reason.clone()))
    }

    async fn refine(
        &self,
        _unit: &SourceUnit,
        _draft: &Note,
        _progress: &dyn StageProgressReporter,
    ) -> Result<Refinement, StageError> {
        Err(StageError::Disabled(self.reason.clone()))
    }
}

// ============ OpenAI Generator ============

const ANALYZE_PROMPT: &str = "\
You study a single source file that solves an algorithmic problem and write a \
study note about it. Reply with one JSON object with the keys: title (short \
problem name, no file extension), language, problem (what is being solved, \
inputs and outputs), approach (the key idea in a few sentences), complexity \
(object with time and space), edgeCases (array of short strings). Do not \
invent details the code does not support.";

const PSEUDOCODE_PROMPT: &str = "\
You turn source code into language-neutral pseudocode. You are given the code \
and a JSON analysis of it. Reply with one JSON object with the key pseudocode: \
a string of indented pseudocode lines that mirrors the real control flow.";

const EXPLAIN_PROMPT: &str = "\
You explain algorithms to a student. You are given the code, its analysis and \
its pseudocode. Reply with one JSON object with the keys: explanation (two or \
three short paragraphs of plain language) and examples (array of objects with \
input, output and note; at most two, each small enough to trace by hand).";

const REFINE_PROMPT: &str = "\
You improve a study note drafted by pattern matching. You are given the code \
and the draft. The title, pseudocode and complexity stay as they are. Reply \
with one JSON object with the keys: approach (the key idea in a few \
sentences), explanation (two or three short paragraphs) and edgeCases (array \
of short strings specific to this code).";

/// Generator backed by an OpenAI-compatible chat completions API.
pub struct OpenAIGenerator {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    max_retries: u32,
    max_code_chars: usize,
}

impl OpenAIGenerator {
    /// Create a generator from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` is not available or the HTTP
    /// client cannot be built.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let api_key = config
            .credentials
            .openai_api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.generation.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!(
                "{}/chat/completions",
                config.generation.base_url.trim_end_matches('/')
            ),
            model: config.generation.model.clone(),
            temperature: config.generation.temperature,
            max_retries: config.generation.max_retries,
            max_code_chars: config.limits.max_code_chars,
        })
    }

    fn code_block(&self, unit: &SourceUnit) -> String {
        format!(
            "Language: {}\n\n```\n{}\n```",
            unit.language,
            scan_window(&unit.text, self.max_code_chars)
        )
    }

    /// Run one stage, reporting start and outcome.
    async fn run_stage(
        &self,
        stage: Stage,
        system: &str,
        user: String,
        progress: &dyn StageProgressReporter,
    ) -> Result<Value, StageError> {
        progress.report(StageProgressEvent::Started {
            stage: stage.to_string(),
        });
        let started = Instant::now();
        let result = self.chat(stage, system, user).await;
        match &result {
            Ok(_) => progress.report(StageProgressEvent::Finished {
                stage: stage.to_string(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            }),
            Err(e) => progress.report(StageProgressEvent::Failed {
                stage: stage.to_string(),
                error: e.to_string(),
            }),
        }
        result
    }

    /// Call the chat completions API with retry/backoff and return the
    /// JSON object from the first choice.
    async fn chat(&self, stage: Stage, system: &str, user: String) -> Result<Value, StageError> {
        let body = chat_request(&self.model, self.temperature, system, &user);
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::debug!(stage = %stage, attempt, ?delay, "retrying stage");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: Value =
                            response.json().await.map_err(|e| StageError::Parse {
                                stage,
                                message: e.to_string(),
                            })?;
                        return parse_chat_response(stage, &json);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err = StageError::Status {
                        stage,
                        status: status.as_u16(),
                        body: body_text,
                    };

                    // Rate limited or server error: retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(err);
                        continue;
                    }

                    return Err(err);
                }
                Err(e) => {
                    last_err = Some(StageError::Request {
                        stage,
                        message: e.to_string(),
                    });
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| StageError::Request {
            stage,
            message: "no attempts made".to_string(),
        }))
    }
}

#[async_trait]
impl NoteGenerator for OpenAIGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        unit: &SourceUnit,
        progress: &dyn StageProgressReporter,
    ) -> Result<Note, StageError> {
        let code = self.code_block(unit);

        let analysis = self
            .run_stage(Stage::Analyze, ANALYZE_PROMPT, code.clone(), progress)
            .await?;

        let pseudocode = self
            .run_stage(
                Stage::Pseudocode,
                PSEUDOCODE_PROMPT,
                format!("{}\n\nAnalysis:\n{}", code, analysis),
                progress,
            )
            .await?;

        let explain = self
            .run_stage(
                Stage::Explain,
                EXPLAIN_PROMPT,
                format!(
                    "{}\n\nAnalysis:\n{}\n\nPseudocode:\n{}",
                    code, analysis, pseudocode
                ),
                progress,
            )
            .await?;

        let mut note = merge_stages(&analysis, &pseudocode, &explain);
        if note.language.trim().is_empty() {
            note.language = unit.language.clone();
        }
        note.code = unit.text.clone();
        Ok(note)
    }

    async fn refine(
        &self,
        unit: &SourceUnit,
        draft: &Note,
        progress: &dyn StageProgressReporter,
    ) -> Result<Refinement, StageError> {
        let draft_json = json!({
            "title": draft.title,
            "problem": draft.problem,
            "approach": draft.approach,
            "pseudocode": draft.pseudocode,
            "complexity": draft.complexity,
            "edgeCases": draft.edge_cases,
        });
        let user = format!("{}\n\nDraft:\n{}", self.code_block(unit), draft_json);
        let value = self
            .run_stage(Stage::Refine, REFINE_PROMPT, user, progress)
            .await?;
        Ok(refinement_from_value(&value))
    }
}

/// Request body for one JSON-mode chat completion.
fn chat_request(model: &str, temperature: f32, system: &str, user: &str) -> Value {
    json!({
        "model": model,
        "temperature": temperature,
        "response_format": { "type": "json_object" },
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": user },
        ],
    })
}

/// Extract `choices[0].message.content` and parse it as a JSON object.
fn parse_chat_response(stage: Stage, json: &Value) -> Result<Value, StageError> {
    let content = json
        .pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .ok_or_else(|| StageError::Parse {
            stage,
            message: "missing choices[0].message.content".to_string(),
        })?;
    parse_content(stage, content)
}

fn parse_content(stage: Stage, content: &str) -> Result<Value, StageError> {
    let value: Value =
        serde_json::from_str(strip_code_fences(content)).map_err(|e| StageError::Parse {
            stage,
            message: e.to_string(),
        })?;
    if !value.is_object() {
        return Err(StageError::Parse {
            stage,
            message: "expected a JSON object".to_string(),
        });
    }
    Ok(value)
}

/// Models sometimes wrap JSON in a Markdown fence even in JSON mode.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) up to the first newline.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Combine the three stage outputs into one note. Later stages only
/// contribute the keys they own.
fn merge_stages(analysis: &Value, pseudocode: &Value, explain: &Value) -> Note {
    let mut merged = analysis.clone();
    if let Some(map) = merged.as_object_mut() {
        if let Some(p) = pseudocode.get("pseudocode") {
            map.insert("pseudocode".to_string(), p.clone());
        }
        for key in ["explanation", "examples"] {
            if let Some(v) = explain.get(key) {
                map.insert(key.to_string(), v.clone());
            }
        }
    }
    Note::from_value(&merged)
}

fn refinement_from_value(value: &Value) -> Refinement {
    let text = |key: &str| value.get(key).map(value_to_text).unwrap_or_default();
    Refinement {
        approach: text("approach"),
        explanation: text("explanation"),
        edge_cases: string_list(value.get("edgeCases").or_else(|| value.get("edge_cases"))),
    }
}

/// Create the [`NoteGenerator`] named by `generation.provider`.
///
/// # Errors
///
/// Returns an error if the OpenAI generator cannot be initialized.
pub fn create_generator(config: &Config) -> anyhow::Result<Box<dyn NoteGenerator>> {
    match config.generation.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledGenerator::new(
            "generation.provider is disabled",
        ))),
        "openai" => Ok(Box::new(OpenAIGenerator::new(config)?)),
        other => anyhow::bail!("Unknown generation provider: {}", other),
    }
}
