//! Client for the Google Generative Language API
//!
//! Thin wrapper over the REST endpoint; the platform only needs a single
//! completion call for the chatbot proxy.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    http: Client,
}

#[derive(Debug)]
pub enum GeminiError {
    Http(reqwest::Error),
    Api(String),
    EmptyResponse,
}

impl From<reqwest::Error> for GeminiError {
    fn from(e: reqwest::Error) -> Self {
        GeminiError::Http(e)
    }
}

impl std::fmt::Display for GeminiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeminiError::Http(e) => write!(f, "HTTP error: {}", e),
            GeminiError::Api(s) => write!(f, "Gemini API error: {}", s),
            GeminiError::EmptyResponse => write!(f, "Gemini returned no candidates"),
        }
    }
}

impl std::error::Error for GeminiError {}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

fn first_candidate_text(resp: GenerateContentResponse) -> Result<String, GeminiError> {
    resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .filter(|t| !t.is_empty())
        .ok_or(GeminiError::EmptyResponse)
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            http: Client::new(),
        }
    }

    /// Run a single completion with a fixed system instruction and return
    /// the model's text verbatim.
    pub async fn generate(&self, system: &str, prompt: &str) -> Result<String, GeminiError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let body = json!({
            "system_instruction": {
                "parts": [{ "text": system }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        });

        let resp = self.http.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(GeminiError::Api(text));
        }

        let parsed: GenerateContentResponse = resp.json().await?;
        first_candidate_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_first_candidate_text() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "AI works by pattern matching." }],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        });
        let resp: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(
            first_candidate_text(resp).unwrap(),
            "AI works by pattern matching."
        );
    }

    #[test]
    fn test_no_candidates_is_empty_response() {
        let resp: GenerateContentResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(
            first_candidate_text(resp),
            Err(GeminiError::EmptyResponse)
        ));
    }
}
