// rest_api/src/ai/prompt.rs

use models::medical::MAX_DIAGNOSES;
use serde::Deserialize;
use serde_json::Value;

/// Placeholder texts the frontend submits for untouched fields.
const PLACEHOLDERS: [&str; 3] = ["not provided", "n/a", "none"];

/// Body of `POST /api/ai/analyze`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default, alias = "examinationDetails")]
    pub examination: Option<String>,
    /// Free text or an object of named readings.
    #[serde(default)]
    pub vitals: Option<Value>,
    #[serde(default, alias = "previousNotes")]
    pub notes: Option<String>,
    #[serde(default)]
    pub checkup_id: Option<String>,
}

/// Patient facts added to the prompt when the analysis targets a checkup.
#[derive(Debug, Clone)]
pub struct PatientContext {
    pub age: u32,
    pub gender: String,
    pub medical_history: String,
}

fn informative(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && !PLACEHOLDERS.iter().any(|p| text.eq_ignore_ascii_case(p))
}

fn informative_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => informative(s),
        Value::Array(items) => items.iter().any(informative_value),
        Value::Object(fields) => fields.values().any(informative_value),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

fn vitals_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Object(fields) => fields
            .iter()
            .filter(|(_, v)| informative_value(v))
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}: {}", k, s.trim()),
                other => format!("{}: {}", k, other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

impl AnalysisRequest {
    /// True when at least one input group carries real content.
    pub fn has_clinical_data(&self) -> bool {
        [&self.symptoms, &self.examination, &self.notes]
            .into_iter()
            .any(|field| field.as_deref().is_some_and(informative))
            || self.vitals.as_ref().is_some_and(informative_value)
    }
}

fn section(out: &mut String, title: &str, body: Option<String>) {
    if let Some(body) = body.filter(|b| informative(b)) {
        out.push_str(&format!("{}:\n{}\n\n", title, body));
    }
}

/// Builds the instruction prompt. The reply is requested as a single JSON
/// object matching what `parse_analysis` accepts.
pub fn build_prompt(request: &AnalysisRequest, patient: Option<&PatientContext>) -> String {
    let mut prompt = String::from(
        "You are assisting a licensed clinician. Review the findings below and suggest a differential diagnosis. \
         This is decision support only and will be reviewed by a physician.\n\n",
    );

    if let Some(patient) = patient {
        prompt.push_str(&format!("Patient: {} years old, {}.\n", patient.age, patient.gender));
        if informative(&patient.medical_history) {
            prompt.push_str(&format!("Medical history: {}\n", patient.medical_history.trim()));
        }
        prompt.push('\n');
    }

    section(&mut prompt, "Symptoms", request.symptoms.clone());
    section(&mut prompt, "Examination findings", request.examination.clone());
    section(&mut prompt, "Vital signs", request.vitals.as_ref().map(vitals_text));
    section(&mut prompt, "Previous notes", request.notes.clone());

    prompt.push_str(&format!(
        "Respond with only a JSON object, no prose and no code fences, of the form:\n\
         {{\"diagnoses\": [{{\"condition\": string, \"likelihood\": \"high\"|\"moderate\"|\"low\"}}] (at most {}), \
         \"recommendedAction\": string, \"explanation\": string, \"confidence\": number between 0 and 100}}\n",
        MAX_DIAGNOSES
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> AnalysisRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn placeholders_do_not_count_as_data() {
        assert!(!AnalysisRequest::default().has_clinical_data());
        let placeholders = request(json!({
            "symptoms": "Not Provided",
            "examination": "  ",
            "vitals": { "heartRate": "N/A", "temperature": null },
            "notes": "none"
        }));
        assert!(!placeholders.has_clinical_data());
    }

    #[test]
    fn any_real_group_is_enough() {
        assert!(request(json!({ "notes": "chronic cough" })).has_clinical_data());
        assert!(request(json!({ "vitals": { "heartRate": 112 } })).has_clinical_data());
        assert!(request(json!({ "vitals": "BP 150/95" })).has_clinical_data());
    }

    #[test]
    fn prompt_includes_only_informative_sections() {
        let req = request(json!({
            "symptoms": "fever, productive cough",
            "examination": "n/a",
            "vitals": { "temperature": 39.1, "bloodPressure": "120/80" }
        }));
        let context = PatientContext { age: 54, gender: "female".into(), medical_history: "asthma".into() };
        let prompt = build_prompt(&req, Some(&context));
        assert!(prompt.contains("Symptoms:\nfever, productive cough"));
        assert!(!prompt.contains("Examination findings"));
        assert!(prompt.contains("temperature: 39.1"));
        assert!(prompt.contains("bloodPressure: 120/80"));
        assert!(prompt.contains("54 years old, female"));
        assert!(prompt.contains("Medical history: asthma"));
    }
}
