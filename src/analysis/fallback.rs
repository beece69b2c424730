//! Offline analyzer: fixed condition tables per body area, remedies escalated
//! by severity. No I/O and no failure path.

use rand::Rng;

use crate::models::{
    AnalysisResult, BodyArea, Condition, Remedy, RemedyKind, Severity, SeverityLevel,
    MAX_CONDITIONS,
};

/// Confidence jitter range for table conditions, inclusive.
pub const LOCAL_CONFIDENCE_MIN: u8 = 50;
pub const LOCAL_CONFIDENCE_MAX: u8 = 79;

type Candidate = (&'static str, &'static str);

const HEAD: &[Candidate] = &[
    ("Tension Headache", "Dull, band-like head pain often linked to stress or poor sleep."),
    ("Migraine", "Throbbing headache that may come with light sensitivity or nausea."),
    ("Sinus Infection", "Inflamed sinuses causing facial pressure, congestion and headache."),
];

const CHEST: &[Candidate] = &[
    ("Bronchitis", "Inflamed airways causing cough, mucus and chest discomfort."),
    ("Acid Reflux", "Stomach acid rising into the esophagus, felt as chest burning."),
    ("Muscle Strain", "Overworked or pulled muscle causing localized pain."),
];

const ABDOMEN: &[Candidate] = &[
    ("Indigestion", "Upper abdominal discomfort or bloating after eating."),
    ("Gastroenteritis", "Stomach and intestine irritation causing cramps, nausea or diarrhea."),
    ("Irritable Bowel Syndrome", "Recurring cramps, bloating and changes in bowel habits."),
];

const BACK: &[Candidate] = &[
    ("Muscle Strain", "Overworked or pulled muscle causing localized pain."),
    ("Poor Posture", "Sustained slouching that loads the spine and back muscles."),
    ("Sciatica", "Irritated sciatic nerve causing pain that runs into the leg."),
];

const ARMS: &[Candidate] = &[
    ("Tendinitis", "Inflamed tendon causing pain with movement near a joint."),
    ("Carpal Tunnel Syndrome", "Compressed wrist nerve causing numbness or tingling in the hand."),
    ("Muscle Strain", "Overworked or pulled muscle causing localized pain."),
];

const LEGS: &[Candidate] = &[
    ("Muscle Cramps", "Sudden involuntary tightening of a leg muscle."),
    ("Shin Splints", "Pain along the shin bone, common after increased activity."),
    ("Poor Circulation", "Reduced blood flow causing heaviness, coldness or tingling."),
];

const SKIN: &[Candidate] = &[
    ("Contact Dermatitis", "Red, itchy rash after contact with an irritant or allergen."),
    ("Eczema", "Dry, itchy, inflamed patches of skin that flare periodically."),
    ("Allergic Reaction", "Hives or redness triggered by food, medication or environment."),
];

const GENERAL: &[Candidate] = &[
    ("Viral Infection", "Common viral illness with fatigue, aches or mild fever."),
    ("Stress and Fatigue", "Physical exhaustion from stress, overwork or poor sleep."),
    ("Dehydration", "Low fluid intake causing tiredness, headache or dizziness."),
];

/// Used only when no body area produced a candidate.
const DEFAULT_CONDITIONS: &[Candidate] = &[
    ("Common Cold", "Mild viral infection of the nose and throat."),
    ("Seasonal Allergies", "Sneezing, congestion or itchy eyes triggered by pollen or dust."),
];

/// Candidate conditions for a body area; unrecognised areas have none.
pub fn candidates_for(area: &BodyArea) -> &'static [Candidate] {
    match area {
        BodyArea::Head => HEAD,
        BodyArea::Chest => CHEST,
        BodyArea::Abdomen => ABDOMEN,
        BodyArea::Back => BACK,
        BodyArea::Arms => ARMS,
        BodyArea::Legs => LEGS,
        BodyArea::Skin => SKIN,
        BodyArea::General => GENERAL,
        BodyArea::Other(_) => &[],
    }
}

/// Table-driven analysis keyed on body areas and severity.
///
/// `rng` only feeds the confidence jitter; names, descriptions, severity
/// labels and remedies depend on the inputs alone.
pub fn analyze_locally<R: Rng + ?Sized>(
    body_areas: &[BodyArea],
    severity: Severity,
    rng: &mut R,
) -> AnalysisResult {
    let level = severity.level();
    let general = [BodyArea::General];
    let areas: &[BodyArea] = if body_areas.is_empty() { &general } else { body_areas };

    let mut conditions: Vec<Condition> = Vec::with_capacity(MAX_CONDITIONS);
    'areas: for area in areas {
        for (name, description) in candidates_for(area) {
            if conditions.len() == MAX_CONDITIONS {
                break 'areas;
            }
            if conditions.iter().any(|c| c.name == *name) {
                continue;
            }
            conditions.push(table_condition(name, description, level, rng));
        }
    }

    if conditions.is_empty() {
        conditions = DEFAULT_CONDITIONS
            .iter()
            .map(|(name, description)| table_condition(name, description, level, rng))
            .collect();
    }

    AnalysisResult {
        conditions,
        remedies: remedies_for(level),
    }
}

fn table_condition<R: Rng + ?Sized>(
    name: &str,
    description: &str,
    level: SeverityLevel,
    rng: &mut R,
) -> Condition {
    Condition {
        name: name.to_string(),
        confidence: rng.gen_range(LOCAL_CONFIDENCE_MIN..=LOCAL_CONFIDENCE_MAX),
        description: description.to_string(),
        severity: level,
    }
}

/// Home care always; pharmacy options from moderate up; a doctor visit from
/// moderate up; urgent care for severe and emergency.
pub fn remedies_for(level: SeverityLevel) -> Vec<Remedy> {
    let mut remedies = vec![
        Remedy::new(
            RemedyKind::Home,
            "Rest and Hydration",
            "Rest as much as you can and drink plenty of water through the day.",
        ),
        Remedy::new(
            RemedyKind::Home,
            "Warm Compress",
            "Apply a warm compress to sore or tense areas for 15-20 minutes.",
        ),
    ];

    if level != SeverityLevel::Mild {
        remedies.push(Remedy::new(
            RemedyKind::Otc,
            "Over-the-Counter Pain Relief",
            "Acetaminophen or ibuprofen can ease pain. Follow the label dosing.",
        ));
        remedies.push(Remedy::new(
            RemedyKind::Otc,
            "Pharmacy Symptom Relief",
            "Antacids, antihistamines or decongestants may help. Ask a pharmacist.",
        ));
        remedies.push(Remedy::new(
            RemedyKind::Professional,
            "Schedule a Doctor Visit",
            "Book an appointment if symptoms last more than a few days or keep returning.",
        ));
    }

    if matches!(level, SeverityLevel::Severe | SeverityLevel::Emergency) {
        remedies.push(Remedy::new(
            RemedyKind::Professional,
            "Immediate Medical Attention",
            "Seek urgent care or call emergency services if symptoms are severe or sudden.",
        ));
    }

    remedies
}
