// rest_api/src/ai/parse.rs
// The model output is an untrusted string. It is parsed strictly against the
// analysis schema, with one fallback: the JSON inside a fenced code block, or
// failing that the outermost `{...}` span.

use lazy_static::lazy_static;
use models::medical::{clamp_confidence, AiAnalysis, Diagnosis, MAX_DIAGNOSES};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::client::AiError;

lazy_static! {
    static ref FENCED_BLOCK: Regex =
        Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)\s*```").expect("Failed to compile fenced block pattern");
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    #[serde(alias = "differentialDiagnoses", alias = "possibleDiagnoses")]
    diagnoses: Vec<RawDiagnosis>,
    #[serde(default, alias = "recommendation", alias = "recommendedActions")]
    recommended_action: Option<Value>,
    #[serde(default, alias = "reasoning")]
    explanation: Option<String>,
    #[serde(default)]
    confidence: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDiagnosis {
    Name(String),
    Detailed {
        #[serde(alias = "name", alias = "diagnosis")]
        condition: String,
        #[serde(default, alias = "probability")]
        likelihood: Option<Value>,
    },
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Candidate JSON text for the fallback parse. Only the first fenced block is
/// considered.
fn extract_candidate(text: &str) -> Option<&str> {
    FENCED_BLOCK
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|block| outermost_object(block.as_str()))
        .or_else(|| outermost_object(text))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numbers, or strings like `"85"` / `"85%"`. Anything else counts as 0.
fn confidence_of(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn action_of(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_text)
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    }
}

fn normalize(raw: RawAnalysis, model: &str) -> AiAnalysis {
    let diagnoses = raw
        .diagnoses
        .into_iter()
        .filter_map(|entry| {
            let (condition, likelihood) = match entry {
                RawDiagnosis::Name(name) => (name, None),
                RawDiagnosis::Detailed { condition, likelihood } => (condition, likelihood.as_ref().and_then(scalar_text)),
            };
            let condition = condition.trim().to_string();
            (!condition.is_empty()).then_some(Diagnosis { condition, likelihood })
        })
        .take(MAX_DIAGNOSES)
        .collect();

    let mut recommended_action = action_of(raw.recommended_action);
    if recommended_action.is_empty() {
        recommended_action = "Clinical correlation recommended".to_string();
    }
    let explanation = raw.explanation.map(|s| s.trim().to_string()).unwrap_or_default();
    let confidence = clamp_confidence(confidence_of(raw.confidence.as_ref()));

    AiAnalysis::new(diagnoses, recommended_action, explanation, confidence, model)
}

/// Parses and normalizes model output into an `AiAnalysis`.
pub fn parse_analysis(text: &str, model: &str) -> Result<AiAnalysis, AiError> {
    let trimmed = text.trim();
    let raw = match serde_json::from_str::<RawAnalysis>(trimmed) {
        Ok(raw) => raw,
        Err(strict) => {
            let candidate = extract_candidate(trimmed).ok_or_else(|| AiError::Parse(strict.to_string()))?;
            serde_json::from_str::<RawAnalysis>(candidate).map_err(|e| AiError::Parse(e.to_string()))?
        }
    };
    Ok(normalize(raw, model))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "gemini-test";

    #[test]
    fn strict_json_is_normalized() {
        let text = r#" {"diagnoses": ["Influenza", " ", {"condition": "Pneumonia", "likelihood": "moderate"}],
                       "recommendedAction": "Chest X-ray", "explanation": "Fever and cough", "confidence": 72.5} "#;
        let analysis = parse_analysis(text, MODEL).unwrap();
        assert_eq!(analysis.diagnoses.len(), 2);
        assert_eq!(analysis.diagnoses[0].condition, "Influenza");
        assert_eq!(analysis.diagnoses[1].likelihood.as_deref(), Some("moderate"));
        assert_eq!(analysis.recommended_action, "Chest X-ray");
        assert_eq!(analysis.confidence, 72.5);
        assert_eq!(analysis.metadata.model, MODEL);
        assert!(!analysis.error);
    }

    #[test]
    fn fenced_block_is_the_fallback() {
        let text = "Here is the analysis:\n```json\n{\"diagnoses\": [{\"name\": \"Migraine\"}], \"confidence\": \"85%\"}\n```\nStay safe.";
        let analysis = parse_analysis(text, MODEL).unwrap();
        assert_eq!(analysis.diagnoses[0].condition, "Migraine");
        assert_eq!(analysis.confidence, 85.0);
        assert_eq!(analysis.recommended_action, "Clinical correlation recommended");
    }

    #[test]
    fn first_of_several_fenced_blocks_wins() {
        let text = "```json\n{\"diagnoses\":[\"A\"]}\n```\nAlternative:\n```json\n{\"diagnoses\":[\"B\"]}\n```";
        let analysis = parse_analysis(text, MODEL).unwrap();
        assert_eq!(analysis.diagnoses.len(), 1);
        assert_eq!(analysis.diagnoses[0].condition, "A");
    }

    #[test]
    fn outermost_braces_are_used_without_a_fence() {
        let text = "Result: {\"diagnoses\": [\"Gastritis\"], \"recommendedAction\": [\"PPI trial\", \"Follow up\"]} end";
        let analysis = parse_analysis(text, MODEL).unwrap();
        assert_eq!(analysis.recommended_action, "PPI trial; Follow up");
    }

    #[test]
    fn caps_and_clamps() {
        let text = r#"{"diagnoses": ["a","b","c","d","e","f","g"], "confidence": 140}"#;
        let analysis = parse_analysis(text, MODEL).unwrap();
        assert_eq!(analysis.diagnoses.len(), MAX_DIAGNOSES);
        assert_eq!(analysis.confidence, 100.0);

        let negative = parse_analysis(r#"{"diagnoses": [], "confidence": "-3"}"#, MODEL).unwrap();
        assert_eq!(negative.confidence, 0.0);
    }

    #[test]
    fn unusable_output_is_a_parse_error() {
        assert!(matches!(parse_analysis("I cannot help with that.", MODEL), Err(AiError::Parse(_))));
        assert!(matches!(parse_analysis("{\"summary\": \"no schema\"}", MODEL), Err(AiError::Parse(_))));
        assert!(matches!(parse_analysis("{ broken", MODEL), Err(AiError::Parse(_))));
    }
}
