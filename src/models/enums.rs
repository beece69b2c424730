use serde::{Deserialize, Deserializer, Serialize};

use super::InvalidEnum;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Parsing and deserialization ignore case and surrounding whitespace.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(SymptomDuration {
    Hours => "hours",
    Days => "days",
    Weeks => "weeks",
    Months => "months",
    Years => "years",
});

str_enum!(SeverityLevel {
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
    Emergency => "emergency",
});

str_enum!(RemedyKind {
    Home => "home",
    Otc => "otc",
    Professional => "professional",
});

str_enum!(MoodLevel {
    Awful => "awful",
    Low => "low",
    Okay => "okay",
    Good => "good",
    Great => "great",
});

impl SeverityLevel {
    /// Fixed confidence used when conditions are mined from free text.
    pub fn heuristic_confidence(&self) -> u8 {
        match self {
            Self::Mild => 55,
            Self::Moderate => 70,
            Self::Severe => 85,
            Self::Emergency => 95,
        }
    }
}

impl MoodLevel {
    pub fn score(&self) -> u8 {
        match self {
            Self::Awful => 1,
            Self::Low => 2,
            Self::Okay => 3,
            Self::Good => 4,
            Self::Great => 5,
        }
    }

    /// Nearest level for a 1–5 score; out-of-range scores saturate.
    pub fn from_score(score: u8) -> Self {
        match score {
            0 | 1 => Self::Awful,
            2 => Self::Low,
            3 => Self::Okay,
            4 => Self::Good,
            _ => Self::Great,
        }
    }
}
