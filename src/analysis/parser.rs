use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::AnalysisError;
use crate::models::{
    AnalysisRequest, AnalysisResult, Condition, Remedy, RemedyKind, MAX_CONDITIONS,
};

/// First `{` through last `}`. Multiple fragments are not disambiguated.
static JSON_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Words that usually name a condition in free-form model output.
static CONDITION_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(syndrome|disease|infection|disorder|cold|flu|allergy|pain|inflammation)\b",
    )
    .unwrap()
});

/// Conditions synthesised from text mining are capped lower than the result cap.
const MAX_MINED_CONDITIONS: usize = 3;

/// Which parse tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePath {
    Json,
    TextMining,
}

impl ParsePath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::TextMining => "text_mining",
        }
    }
}

/// Turn generated text into a result.
///
/// A JSON span, when present, must parse and validate; a broken span is an
/// error (the caller falls back locally). Text with no span at all goes to
/// keyword mining, which always yields something.
pub fn parse_generated_text(
    text: &str,
    request: &AnalysisRequest,
) -> Result<(AnalysisResult, ParsePath), AnalysisError> {
    match extract_json_span(text) {
        Some(span) => parse_json_result(span).map(|r| (r, ParsePath::Json)),
        None => Ok((mine_conditions(text, request), ParsePath::TextMining)),
    }
}

pub fn extract_json_span(text: &str) -> Option<&str> {
    JSON_SPAN.find(text).map(|m| m.as_str())
}

/// Loose top-level shape; items are converted one by one.
#[derive(Deserialize)]
struct RawAnalysis {
    conditions: Option<Vec<serde_json::Value>>,
    remedies: Option<Vec<serde_json::Value>>,
}

/// Parse a JSON span and check it has the analysis shape.
///
/// Items that do not convert are dropped; the span is rejected only when no
/// condition or no remedy survives.
pub fn parse_json_result(span: &str) -> Result<AnalysisResult, AnalysisError> {
    let value: serde_json::Value =
        serde_json::from_str(span).map_err(|e| AnalysisError::JsonParsing(e.to_string()))?;
    let raw: RawAnalysis =
        serde_json::from_value(value).map_err(|e| AnalysisError::InvalidShape(e.to_string()))?;

    let mut conditions: Vec<Condition> = parse_array_lenient(raw.conditions.as_deref());
    let remedies: Vec<Remedy> = parse_array_lenient(raw.remedies.as_deref());

    let offered_conditions = raw.conditions.as_ref().map_or(0, Vec::len);
    let offered_remedies = raw.remedies.as_ref().map_or(0, Vec::len);
    if conditions.len() < offered_conditions || remedies.len() < offered_remedies {
        tracing::debug!(
            conditions_dropped = offered_conditions - conditions.len(),
            remedies_dropped = offered_remedies - remedies.len(),
            "Dropped malformed remote items"
        );
    }

    if conditions.is_empty() {
        return Err(AnalysisError::InvalidShape("no usable conditions".into()));
    }
    if remedies.is_empty() {
        return Err(AnalysisError::InvalidShape("no usable remedies".into()));
    }
    if conditions.len() > MAX_CONDITIONS {
        tracing::debug!(
            returned = conditions.len(),
            kept = MAX_CONDITIONS,
            "Truncating remote conditions"
        );
        conditions.truncate(MAX_CONDITIONS);
    }

    Ok(AnalysisResult {
        conditions,
        remedies,
    })
}

fn parse_array_lenient<T: DeserializeOwned>(items: Option<&[serde_json::Value]>) -> Vec<T> {
    items
        .unwrap_or_default()
        .iter()
        .filter_map(|v| serde_json::from_value(v.clone()).ok())
        .collect()
}

/// Keyword scan over prose that carried no JSON.
pub fn mine_conditions(text: &str, request: &AnalysisRequest) -> AnalysisResult {
    let level = request.severity.level();
    let symptoms = request.symptoms.join(", ");

    let mut names: Vec<String> = Vec::new();
    for m in CONDITION_WORDS.find_iter(text) {
        let name = title_case(m.as_str());
        if !names.contains(&name) {
            names.push(name);
        }
        if names.len() == MAX_MINED_CONDITIONS {
            break;
        }
    }

    let conditions = if names.is_empty() {
        vec![Condition {
            name: "Unspecified Condition".into(),
            confidence: level.heuristic_confidence(),
            description: format!(
                "Symptoms reported: {symptoms}. A healthcare provider can help identify the cause."
            ),
            severity: level,
        }]
    } else {
        names
            .into_iter()
            .map(|name| Condition {
                description: format!(
                    "Possible {} suggested by reported symptoms: {symptoms}",
                    name.to_lowercase()
                ),
                name,
                confidence: level.heuristic_confidence(),
                severity: level,
            })
            .collect()
    };

    AnalysisResult {
        conditions,
        remedies: generic_remedies(),
    }
}

fn generic_remedies() -> Vec<Remedy> {
    vec![
        Remedy::new(
            RemedyKind::Home,
            "Rest and Self-Care",
            "Get plenty of rest, stay hydrated, and monitor how your symptoms change.",
        ),
        Remedy::new(
            RemedyKind::Professional,
            "Consult a Healthcare Provider",
            "See a doctor if symptoms persist, worsen, or new symptoms appear.",
        ),
    ]
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
