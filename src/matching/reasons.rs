// src/matching/reasons.rs
//! Match rationales from the text generator, with deterministic fallbacks.

use serde::Deserialize;
use serde_json::Value;

use crate::app_log;
use crate::core::{GenerationOptions, TextGenerator};
use crate::matching::overlap::SkillOverlap;

pub const DEFAULT_MODEL_REASON: &str = "AI-generated match based on profile analysis";

const MODEL_SCORE_TEMPERATURE: f32 = 0.3;
const MODEL_SCORE_MAX_TOKENS: u32 = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelVerdict {
    /// Clamped to 0-100.
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    score: Value,
    #[serde(default)]
    reason: Option<String>,
}

/// Text used when the generator fails or returns nothing.
pub fn fallback_reason(overlap: &SkillOverlap, years_experience: Option<i64>) -> String {
    let mut reason = format!(
        "Strong skill match with {} of {} required skills ({}% overlap)",
        overlap.matched_count(),
        overlap.required_count,
        overlap.rounded()
    );
    match years_experience {
        Some(years) if years > 0 => {
            reason.push_str(&format!(" and {} years of experience", years));
        }
        _ => {}
    }
    reason.push('.');
    reason
}

/// Extract `{score, reason}` from a model reply.
///
/// Takes the span from the first `{` to the last `}`. Returns `None` when
/// there is no such span or it is not a JSON object.
pub fn parse_verdict(content: &str) -> Option<ModelVerdict> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }

    let raw: RawVerdict = serde_json::from_str(&content[start..=end]).ok()?;
    let score = match raw.score {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    let score = if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    };

    let reason = raw
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL_REASON.to_string());

    Some(ModelVerdict { score, reason })
}

pub struct ReasonGenerator<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> ReasonGenerator<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    /// Ask for a short rationale, falling back to `fallback` on any failure.
    ///
    /// The boolean reports whether the generator produced the text.
    pub async fn explain(&self, system: &str, prompt: &str, fallback: String) -> (String, bool) {
        match self
            .generator
            .generate(system, prompt, &GenerationOptions::default())
            .await
        {
            Ok(text) if !text.trim().is_empty() => (text.trim().to_string(), true),
            Ok(_) => {
                app_log!(warn, "Empty match rationale from generator, using fallback");
                (fallback, false)
            }
            Err(e) => {
                app_log!(warn, "Match rationale generation failed: {:#}", e);
                (fallback, false)
            }
        }
    }

    /// Ask the model for a score. `None` means skip this candidate.
    pub async fn score(&self, system: &str, prompt: &str) -> Option<ModelVerdict> {
        let options = GenerationOptions {
            temperature: Some(MODEL_SCORE_TEMPERATURE),
            max_tokens: Some(MODEL_SCORE_MAX_TOKENS),
        };

        let content = match self.generator.generate(system, prompt, &options).await {
            Ok(content) => content,
            Err(e) => {
                app_log!(warn, "Model scoring failed: {:#}", e);
                return None;
            }
        };

        if content.trim().is_empty() {
            app_log!(warn, "Model scoring returned no content");
            return None;
        }

        let verdict = parse_verdict(&content);
        if verdict.is_none() {
            app_log!(warn, "Could not parse model verdict: {}", content);
        }
        verdict
    }
}
