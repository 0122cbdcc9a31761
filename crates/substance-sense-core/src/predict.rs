use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path appended to the configured backend base URL.
pub const PREDICT_PATH: &str = "predict_from_text";

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("request to prediction backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("prediction backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("could not decode prediction response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("prediction response has no formatted_output.parts[0].text")]
    MissingField,
}

impl PredictError {
    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::Transport(_) => "transport",
            PredictError::Status { .. } => "status",
            PredictError::Decode(_) => "decode",
            PredictError::MissingField => "missing_field",
        }
    }
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

// Everything besides formatted_output (parsed_data, prediction) is ignored.
#[derive(Deserialize)]
struct PredictResponse {
    formatted_output: Option<FormattedOutput>,
}

#[derive(Deserialize)]
struct FormattedOutput {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl PredictResponse {
    fn into_text(self) -> Result<String, PredictError> {
        self.formatted_output
            .and_then(|output| output.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or(PredictError::MissingField)
    }
}

#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: Client,
    base_url: String,
}

impl PredictionClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, PREDICT_PATH)
    }

    /// Send one question and return the markdown reply. Never retries.
    pub async fn predict(&self, text: &str) -> Result<String, PredictError> {
        let url = self.endpoint();
        tracing::debug!(%url, chars = text.chars().count(), "sending prediction request");

        let response = self
            .client
            .post(&url)
            .json(&PredictRequest { text })
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(%status, "prediction response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        let parsed: PredictResponse = serde_json::from_slice(&bytes)?;
        parsed.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<String, PredictError> {
        serde_json::from_str::<PredictResponse>(body)?.into_text()
    }

    #[test]
    fn test_extracts_first_part_text() {
        let body = r#"{
            "parsed_data": {"Age": "23 to 23"},
            "prediction": {"overdose_probability": 0.67},
            "formatted_output": {"parts": [{"text": "**67%**"}, {"text": "ignored"}], "role": "model"}
        }"#;
        assert_eq!(parse(body).unwrap(), "**67%**");
    }

    #[test]
    fn test_missing_formatted_output() {
        let err = parse(r#"{"error": "No text provided"}"#).unwrap_err();
        assert!(matches!(err, PredictError::MissingField));
    }

    #[test]
    fn test_empty_parts_is_missing_field() {
        let err = parse(r#"{"formatted_output": {"parts": []}}"#).unwrap_err();
        assert!(matches!(err, PredictError::MissingField));
    }

    #[test]
    fn test_string_formatted_output_is_decode_error() {
        // The backend falls back to a plain string when its LLM call fails.
        let err = parse(r#"{"formatted_output": "Error from Gemini: 500"}"#).unwrap_err();
        assert!(matches!(err, PredictError::Decode(_)));
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = PredictionClient::new("http://localhost:8080/");
        assert_eq!(client.endpoint(), "http://localhost:8080/predict_from_text");
    }
}
