//! Mood tracking: local trend summary over recorded check-ins.

use serde::{Deserialize, Serialize};

use crate::models::{MoodEntry, MoodLevel};

/// Difference in mean score between halves that counts as a change.
pub const TREND_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTrend {
    Improving,
    Steady,
    Declining,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSummary {
    pub entries: usize,
    /// Mean score on the 1–5 scale.
    pub average: f32,
    pub trend: MoodTrend,
    /// Most frequent level; ties go to the most recently recorded.
    pub dominant: MoodLevel,
    pub suggestion: String,
}

/// Summarise check-ins in any order. `None` when there are none.
pub fn summarize_moods(entries: &[MoodEntry]) -> Option<MoodSummary> {
    if entries.is_empty() {
        return None;
    }

    let mut ordered: Vec<&MoodEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.recorded_at);

    let scores: Vec<f32> = ordered.iter().map(|e| f32::from(e.level.score())).collect();
    let average = mean(&scores);
    let trend = trend_of(&scores);
    let dominant = dominant_level(&ordered);

    Some(MoodSummary {
        entries: entries.len(),
        average,
        trend,
        dominant,
        suggestion: suggestion_for(average, trend).to_string(),
    })
}

fn mean(scores: &[f32]) -> f32 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f32>() / scores.len() as f32
}

/// Older half against newer half; an odd middle entry belongs to neither.
fn trend_of(scores: &[f32]) -> MoodTrend {
    if scores.len() < 2 {
        return MoodTrend::Steady;
    }
    let half = scores.len() / 2;
    let older = mean(&scores[..half]);
    let newer = mean(&scores[scores.len() - half..]);
    let delta = newer - older;

    if delta >= TREND_THRESHOLD {
        MoodTrend::Improving
    } else if delta <= -TREND_THRESHOLD {
        MoodTrend::Declining
    } else {
        MoodTrend::Steady
    }
}

fn dominant_level(ordered: &[&MoodEntry]) -> MoodLevel {
    let mut counts = [0usize; 5];
    let mut last_seen = [0usize; 5];
    for (position, entry) in ordered.iter().enumerate() {
        let slot = usize::from(entry.level.score() - 1);
        counts[slot] += 1;
        last_seen[slot] = position;
    }

    let best = (0..5)
        .filter(|&slot| counts[slot] > 0)
        .max_by_key(|&slot| (counts[slot], last_seen[slot]))
        .unwrap_or(2);
    MoodLevel::from_score(best as u8 + 1)
}

fn suggestion_for(average: f32, trend: MoodTrend) -> &'static str {
    match trend {
        MoodTrend::Declining if average < 2.5 => {
            "Your mood has been low and dropping. Consider reaching out to someone you trust or a professional."
        }
        MoodTrend::Declining => {
            "Your mood has dipped recently. Short walks, regular sleep and time with friends can help."
        }
        MoodTrend::Improving => "Your mood is trending up. Keep doing what has been working.",
        MoodTrend::Steady if average < 2.5 => {
            "Your mood has stayed low for a while. Talking to a healthcare provider may help."
        }
        MoodTrend::Steady => "Your mood has been steady. Keep checking in to spot changes early.",
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn entries(levels: &[MoodLevel]) -> Vec<MoodEntry> {
        let start = Utc::now() - Duration::days(levels.len() as i64);
        levels
            .iter()
            .enumerate()
            .map(|(i, level)| MoodEntry {
                level: *level,
                note: None,
                recorded_at: start + Duration::days(i as i64),
            })
            .collect()
    }

    #[test]
    fn empty_input_has_no_summary() {
        assert!(summarize_moods(&[]).is_none());
    }

    #[test]
    fn single_entry_is_steady() {
        let summary = summarize_moods(&entries(&[MoodLevel::Good])).unwrap();
        assert_eq!(summary.entries, 1);
        assert_eq!(summary.trend, MoodTrend::Steady);
        assert_eq!(summary.dominant, MoodLevel::Good);
        assert!((summary.average - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rising_scores_are_improving() {
        use MoodLevel::*;
        let summary = summarize_moods(&entries(&[Awful, Low, Okay, Good, Great])).unwrap();
        assert_eq!(summary.trend, MoodTrend::Improving);
        assert!((summary.average - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn falling_low_scores_suggest_reaching_out() {
        use MoodLevel::*;
        let summary = summarize_moods(&entries(&[Okay, Low, Awful, Awful])).unwrap();
        assert_eq!(summary.trend, MoodTrend::Declining);
        assert!(summary.suggestion.contains("reaching out"));
    }

    #[test]
    fn order_of_input_does_not_matter() {
        use MoodLevel::*;
        let mut shuffled = entries(&[Great, Good, Low, Awful]);
        shuffled.reverse();
        let summary = summarize_moods(&shuffled).unwrap();
        assert_eq!(summary.trend, MoodTrend::Declining);
    }

    #[test]
    fn small_changes_are_steady() {
        use MoodLevel::*;
        let summary = summarize_moods(&entries(&[Okay, Good, Okay, Good])).unwrap();
        assert_eq!(summary.trend, MoodTrend::Steady);
    }

    #[test]
    fn dominant_ties_go_to_most_recent() {
        use MoodLevel::*;
        let summary = summarize_moods(&entries(&[Low, Good, Low, Good])).unwrap();
        assert_eq!(summary.dominant, Good);
        let summary = summarize_moods(&entries(&[Okay, Okay, Great])).unwrap();
        assert_eq!(summary.dominant, Okay);
    }
}
