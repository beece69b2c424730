use crate::models::AnalysisRequest;

/// Descriptions requested from the model are capped at this many characters.
pub const DESCRIPTION_CHAR_LIMIT: usize = 100;

/// Build the generation prompt for a symptom analysis.
///
/// The schema block is rigid on purpose: the endpoint returns prose, and the
/// parser only succeeds when that prose contains a JSON object of this shape.
pub fn build_prompt(request: &AnalysisRequest) -> String {
    let symptoms = request.symptoms.join(", ");
    let areas = request
        .effective_body_areas()
        .iter()
        .map(|a| a.as_str().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let severity = request.severity.value();
    let level = request.severity.level();
    let duration = request.duration;
    let limit = DESCRIPTION_CHAR_LIMIT;

    format!(
        r#"You are a cautious health information assistant. A user reports the following:

Symptoms: {symptoms}
Affected body areas: {areas}
Duration: {duration}
Severity: {severity}/5 ({level})

Suggest 2-3 possible conditions and 2-3 remedies. Respond ONLY with a JSON object
in exactly this shape, with no text before or after it:

{{
  "conditions": [
    {{
      "name": "short condition name",
      "confidence": 0-100,
      "description": "at most {limit} characters",
      "severity": "mild | moderate | severe | emergency"
    }}
  ],
  "remedies": [
    {{
      "type": "home | otc | professional",
      "title": "short remedy name",
      "description": "at most {limit} characters"
    }}
  ]
}}

Keep every description under {limit} characters."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BodyArea, Severity, SymptomDuration};

    fn request(areas: Vec<BodyArea>) -> AnalysisRequest {
        AnalysisRequest::new(
            vec!["Headache".into(), "Nausea".into()],
            areas,
            SymptomDuration::Days,
            Severity::new(3).unwrap(),
        )
    }

    #[test]
    fn prompt_embeds_all_fields() {
        let prompt = build_prompt(&request(vec![BodyArea::Head, BodyArea::Abdomen]));
        assert!(prompt.contains("Headache, Nausea"));
        assert!(prompt.contains("head, abdomen"));
        assert!(prompt.contains("Duration: days"));
        assert!(prompt.contains("3/5 (moderate)"));
    }

    #[test]
    fn prompt_requests_result_schema() {
        let prompt = build_prompt(&request(vec![BodyArea::Head]));
        for key in ["\"conditions\"", "\"remedies\"", "\"confidence\"", "\"type\"", "\"title\""] {
            assert!(prompt.contains(key), "missing {key}");
        }
        assert!(prompt.contains("2-3 possible conditions"));
        assert!(prompt.contains("at most 100 characters"));
    }

    #[test]
    fn empty_areas_render_as_general() {
        let prompt = build_prompt(&request(vec![]));
        assert!(prompt.contains("Affected body areas: general"));
    }

    #[test]
    fn empty_symptoms_still_build() {
        let req = AnalysisRequest::new(
            vec![],
            vec![],
            SymptomDuration::Hours,
            Severity::new(1).unwrap(),
        );
        let prompt = build_prompt(&req);
        assert!(prompt.contains("Symptoms: \n"));
    }
}
