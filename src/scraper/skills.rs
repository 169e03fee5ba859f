//! Optional skill extraction via the external generative-language API
//! (black box, see Non-goals). When no API key is configured, extraction
//! is disabled and every listing gets an empty `extracted_skills` list.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

#[derive(Debug, Error)]
pub enum SkillExtractionError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("unexpected response shape")]
    UnexpectedResponse,
}

pub struct SkillExtractor {
    client: Client,
    api_key: String,
}

impl SkillExtractor {
    /// Returns `None` when `api_key` is empty, signaling the pipeline to
    /// run with skill extraction disabled rather than failing the job.
    pub fn new(api_key: &str) -> Option<Self> {
        if api_key.is_empty() {
            return None;
        }
        Some(Self {
            client: Client::new(),
            api_key: api_key.to_string(),
        })
    }

    pub async fn extract_skills(&self, description: &str) -> Result<Vec<String>, SkillExtractionError> {
        let prompt = format!(
            "Extract a JSON array of distinct technical skills mentioned in this job description. \
             Respond with only the JSON array, nothing else.\n\n{description}"
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(ENDPOINT)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| SkillExtractionError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SkillExtractionError::RequestFailed(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SkillExtractionError::RequestFailed(e.to_string()))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or(SkillExtractionError::UnexpectedResponse)?;

        parse_skills_array(text).ok_or(SkillExtractionError::UnexpectedResponse)
    }
}

fn parse_skills_array(text: &str) -> Option<Vec<String>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    serde_json::from_str(&text[start..=end]).ok()
}

/// Calls the extractor, logging and returning an empty list on any
/// failure rather than propagating — per §4.2, an LLM failure degrades
/// the job, it does not abort it.
pub async fn extract_or_degrade(extractor: Option<&SkillExtractor>, description: &str) -> Vec<String> {
    let Some(extractor) = extractor else {
        return Vec::new();
    };
    match extractor.extract_skills(description).await {
        Ok(skills) => skills,
        Err(err) => {
            warn!(%err, "skill extraction failed, continuing without skills");
            Vec::new()
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extractor_is_none_for_empty_key() {
        assert!(SkillExtractor::new("").is_none());
    }

    #[test]
    fn extractor_is_some_for_present_key() {
        assert!(SkillExtractor::new("abc123").is_some());
    }

    #[test]
    fn parse_skills_array_extracts_json_from_surrounding_text() {
        let text = "Here you go:\n[\"Rust\", \"PostgreSQL\"]\nHope that helps.";
        let skills = parse_skills_array(text).unwrap();
        assert_eq!(skills, vec!["Rust".to_string(), "PostgreSQL".to_string()]);
    }

    #[test]
    fn parse_skills_array_returns_none_without_brackets() {
        assert!(parse_skills_array("no array here").is_none());
    }
}
