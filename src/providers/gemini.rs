//! Gemini generateContent client with a token-bucket throttle.
//!
//! The bucket bounds the request rate to the third-party API; HTTP 429 is
//! still classified separately so callers can show a notice instead of
//! silently degrading.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, sleep};
use tracing::debug;

use crate::core::insights::{InsightError, InsightGenerator};
use crate::providers::util::http_client;

/// Grants up to `capacity` immediate requests, refilling continuously.
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<BucketState>,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        TokenBucket {
            capacity: f64::from(capacity),
            refill_per_sec,
            state: Mutex::new(BucketState {
                tokens: f64::from(capacity),
                last_refill: Instant::now(),
            }),
        }
    }

    /// Waits until a token is available, then consumes it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let elapsed = state.last_refill.elapsed().as_secs_f64();
                state.tokens =
                    (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
                state.last_refill = Instant::now();

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    None
                } else {
                    Some(Duration::from_secs_f64(
                        (1.0 - state.tokens) / self.refill_per_sec,
                    ))
                }
            };
            match wait {
                None => return,
                Some(duration) => sleep(duration).await,
            }
        }
    }
}

pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    bucket: TokenBucket,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        // One request burst, then at most a request every other second.
        Self::with_bucket(base_url, api_key, model, TokenBucket::new(1, 0.5))
    }

    pub fn with_bucket(base_url: &str, api_key: &str, model: &str, bucket: TokenBucket) -> Self {
        GeminiClient {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            bucket,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

#[async_trait]
impl InsightGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, InsightError> {
        self.bucket.acquire().await;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.4, "maxOutputTokens": 1024 }
        });
        debug!("Requesting insights from model {}", self.model);

        let client = http_client().map_err(|e| InsightError::Request(e.to_string()))?;
        let response = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| InsightError::Request(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(InsightError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(InsightError::Request(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|_| InsightError::Malformed)?;

        data.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(InsightError::Malformed)
    }
}
