use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::enums::{RemedyKind, SeverityLevel, SymptomDuration};
use super::InvalidEnum;

/// Maximum conditions carried by a result.
pub const MAX_CONDITIONS: usize = 4;

// ═══════════════════════════════════════════
// Request side
// ═══════════════════════════════════════════

/// Canonical anatomical tag keying the local lookup tables.
///
/// Unrecognised tags are preserved as `Other` so they survive a round trip
/// through history, but they have no candidate conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BodyArea {
    Head,
    Chest,
    Abdomen,
    Back,
    Arms,
    Legs,
    Skin,
    General,
    Other(String),
}

impl BodyArea {
    pub const KNOWN: [BodyArea; 8] = [
        BodyArea::Head,
        BodyArea::Chest,
        BodyArea::Abdomen,
        BodyArea::Back,
        BodyArea::Arms,
        BodyArea::Legs,
        BodyArea::Skin,
        BodyArea::General,
    ];

    /// Normalise a caller tag (trimmed, lowercased). Never fails.
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        match tag.as_str() {
            "head" => Self::Head,
            "chest" => Self::Chest,
            "abdomen" => Self::Abdomen,
            "back" => Self::Back,
            "arms" => Self::Arms,
            "legs" => Self::Legs,
            "skin" => Self::Skin,
            "general" => Self::General,
            _ => Self::Other(tag),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Head => "head",
            Self::Chest => "chest",
            Self::Abdomen => "abdomen",
            Self::Back => "back",
            Self::Arms => "arms",
            Self::Legs => "legs",
            Self::Skin => "skin",
            Self::General => "general",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for BodyArea {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<BodyArea> for String {
    fn from(area: BodyArea) -> Self {
        area.as_str().to_string()
    }
}

/// Numeric severity, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    /// Saturating constructor for untrusted caller input.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// ≤2 mild, 3 moderate, 4 severe, ≥5 emergency.
    pub fn level(&self) -> SeverityLevel {
        match self.0 {
            0..=2 => SeverityLevel::Mild,
            3 => SeverityLevel::Moderate,
            4 => SeverityLevel::Severe,
            _ => SeverityLevel::Emergency,
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = InvalidEnum;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| InvalidEnum {
            field: "Severity".into(),
            value: value.to_string(),
        })
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.0
    }
}

/// Input to a single symptom analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub symptoms: Vec<String>,
    pub body_areas: Vec<BodyArea>,
    pub duration: SymptomDuration,
    pub severity: Severity,
}

impl AnalysisRequest {
    pub fn new(
        symptoms: Vec<String>,
        body_areas: Vec<BodyArea>,
        duration: SymptomDuration,
        severity: Severity,
    ) -> Self {
        let mut unique: Vec<BodyArea> = Vec::with_capacity(body_areas.len());
        for area in body_areas {
            if !unique.contains(&area) {
                unique.push(area);
            }
        }
        Self {
            symptoms,
            body_areas: unique,
            duration,
            severity,
        }
    }

    /// Build a request from untyped caller values without failing.
    ///
    /// Unknown durations become `days`, severity is clamped into 1..=5.
    pub fn from_raw<S: AsRef<str>>(
        symptoms: &[S],
        body_areas: &[S],
        duration: &str,
        severity: i64,
    ) -> Self {
        let duration = SymptomDuration::from_str(duration.trim()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unknown symptom duration, assuming days");
            SymptomDuration::Days
        });
        let severity_value = Severity::clamped(severity);
        if i64::from(severity_value.value()) != severity {
            tracing::warn!(severity, clamped = severity_value.value(), "Severity out of range");
        }

        Self::new(
            symptoms.iter().map(|s| s.as_ref().to_string()).collect(),
            body_areas.iter().map(|a| BodyArea::parse(a.as_ref())).collect(),
            duration,
            severity_value,
        )
    }

    /// Body areas to analyse; an empty selection means `general`.
    pub fn effective_body_areas(&self) -> Vec<BodyArea> {
        if self.body_areas.is_empty() {
            vec![BodyArea::General]
        } else {
            self.body_areas.clone()
        }
    }
}

// ═══════════════════════════════════════════
// Result side
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    /// 0–100.
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: u8,
    pub description: String,
    pub severity: SeverityLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remedy {
    #[serde(rename = "type")]
    pub kind: RemedyKind,
    pub title: String,
    pub description: String,
}

impl Remedy {
    pub fn new(kind: RemedyKind, title: &str, description: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// What the UI renders. Always has at least one condition and one remedy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub conditions: Vec<Condition>,
    pub remedies: Vec<Remedy>,
}

impl AnalysisResult {
    pub fn is_well_formed(&self) -> bool {
        !self.conditions.is_empty()
            && self.conditions.len() <= MAX_CONDITIONS
            && !self.remedies.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawConfidence {
    Number(f64),
    Text(String),
}

/// Accepts 0–100 integers or fractions in [0, 1), as numbers or numeric
/// strings (`"80"`, `"80%"`); clamps to 100.
fn deserialize_confidence<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match RawConfidence::deserialize(deserializer)? {
        RawConfidence::Number(n) => n,
        RawConfidence::Text(text) => text
            .trim()
            .trim_end_matches('%')
            .trim_end()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid confidence {text:?}")))?,
    };
    if !raw.is_finite() || raw < 0.0 {
        return Err(serde::de::Error::custom(format!("invalid confidence {raw}")));
    }
    let scaled = if raw < 1.0 { raw * 100.0 } else { raw };
    Ok(scaled.round().min(100.0) as u8)
}
