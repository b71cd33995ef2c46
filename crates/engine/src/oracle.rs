// Path: crates/engine/src/oracle.rs
//! The HTTP client for the external proof classifier.

use async_trait::async_trait;
use ecopoints_api::oracle::VerificationOracle;
use ecopoints_types::app::{ProofArtifact, Verdict};
use ecopoints_types::config::OracleConfig;
use ecopoints_types::error::OracleError;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const BODY_SNIPPET: usize = 256;

/// The classifier's answer. Either field may carry the decision.
#[derive(Deserialize)]
struct ClassifierResponse {
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    accepted: Option<bool>,
    #[serde(default)]
    reason: Option<String>,
}

/// Posts proof bytes to a classifier endpoint and thresholds its score.
pub struct HttpVerificationOracle {
    client: Client,
    url: String,
    threshold: f64,
}

impl std::fmt::Debug for HttpVerificationOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpVerificationOracle")
            .field("url", &self.url)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl HttpVerificationOracle {
    /// Creates a client for `url`. A proof is accepted when its score is
    /// strictly greater than `threshold`.
    pub fn new(url: &str, threshold: f64, timeout: Duration) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::Unavailable(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.to_string(),
            threshold,
        })
    }

    /// Builds the client from the `[oracle]` config section.
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        Self::new(
            &config.url,
            config.threshold,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn judge(&self, response: ClassifierResponse) -> Result<Verdict, OracleError> {
        if let Some(accepted) = response.accepted {
            return Ok(if accepted {
                Verdict::Accepted
            } else {
                Verdict::Rejected {
                    reason: response
                        .reason
                        .unwrap_or_else(|| "classifier rejected the proof".to_string()),
                }
            });
        }
        match response.score {
            Some(score) if !score.is_finite() => Err(OracleError::MalformedResponse(format!(
                "score {} is not a finite number",
                score
            ))),
            Some(score) if score > self.threshold => Ok(Verdict::Accepted),
            Some(score) => Ok(Verdict::Rejected {
                reason: format!(
                    "score {:.3} is not above threshold {:.3}",
                    score, self.threshold
                ),
            }),
            None => Err(OracleError::MalformedResponse(
                "response carries neither `score` nor `accepted`".to_string(),
            )),
        }
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET).collect()
}

/// `attachment; filename="..."` with characters a quoted header value cannot hold removed.
fn content_disposition(file_name: &str) -> String {
    let name: String = file_name
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"' && *c != '\\')
        .collect();
    format!("attachment; filename=\"{}\"", name)
}

#[async_trait]
impl VerificationOracle for HttpVerificationOracle {
    async fn verify(&self, proof: &ProofArtifact) -> Result<Verdict, OracleError> {
        let content_type = proof
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, content_type);
        if let Some(file_name) = proof.file_name.as_deref() {
            request = request.header(CONTENT_DISPOSITION, content_disposition(file_name));
        }
        let response = request
            .body(proof.bytes.clone())
            .send()
            .await
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            // The classifier could not interpret the proof at all.
            let reason = serde_json::from_str::<ClassifierResponse>(&body)
                .ok()
                .and_then(|r| r.reason)
                .unwrap_or_else(|| snippet(&body));
            tracing::info!(target: "oracle", %reason, "Proof format rejected");
            return Ok(Verdict::Rejected { reason });
        }
        if !status.is_success() {
            return Err(OracleError::Http {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let parsed: ClassifierResponse = serde_json::from_str(&body)
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;
        let verdict = self.judge(parsed)?;
        tracing::debug!(
            target: "oracle",
            len = proof.bytes.len(),
            accepted = verdict.is_accepted(),
            "Proof classified"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle() -> HttpVerificationOracle {
        HttpVerificationOracle::new("http://127.0.0.1:1", 0.5, Duration::from_secs(1)).unwrap()
    }

    fn response(json: &str) -> ClassifierResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_content_disposition_quotes_file_name() {
        assert_eq!(
            content_disposition("bottles.jpg"),
            "attachment; filename=\"bottles.jpg\""
        );
        assert_eq!(
            content_disposition("my \"bin\"\\\r\nphoto\u{e9}.png"),
            "attachment; filename=\"my binphoto.png\""
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let o = oracle();
        assert_eq!(o.judge(response(r#"{"score":0.51}"#)).unwrap(), Verdict::Accepted);
        assert!(!o.judge(response(r#"{"score":0.5}"#)).unwrap().is_accepted());
        assert!(!o.judge(response(r#"{"score":0.1}"#)).unwrap().is_accepted());
    }

    #[test]
    fn test_accepted_flag_wins_and_carries_reason() {
        let o = oracle();
        assert_eq!(
            o.judge(response(r#"{"accepted":true,"score":0.0}"#)).unwrap(),
            Verdict::Accepted
        );
        assert_eq!(
            o.judge(response(r#"{"accepted":false,"reason":"not recyclable"}"#))
                .unwrap(),
            Verdict::Rejected {
                reason: "not recyclable".into()
            }
        );
    }

    #[test]
    fn test_undecidable_response_is_an_error() {
        assert!(matches!(
            oracle().judge(response(r#"{"label":"paper"}"#)),
            Err(OracleError::MalformedResponse(_))
        ));
    }
}
