use std::sync::OnceLock;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use anyhow::Context;
use reqwest::Client;
use serde::{Serialize, Deserialize};
use tokio::time::timeout;
use crate::cache::ResponseCache;
use crate::circuit_breaker::{CircuitBreaker, ExponentialBackoff};
use crate::config::AdviceConfig;
use crate::curriculum::{CurriculumPlan, Goal};
use crate::error::TrackerError;
use super::{build_prompt, extract::extract_json, AdviceProvider, PlanAdvice};

/// Shared connection pool; per-call deadlines come from the advisor config.
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

fn http_client() -> &'static Client {
    HTTP_CLIENT.get_or_init(|| {
        Client::builder()
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(4)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                Client::new()
            })
    })
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Advice from a local Ollama model, behind a breaker, retries and an LRU
/// keyed by the goal fingerprint.
pub struct OllamaAdvisor {
    config: AdviceConfig,
    breaker: CircuitBreaker,
    backoff: ExponentialBackoff,
    cache: ResponseCache,
}

impl OllamaAdvisor {
    pub fn new(config: AdviceConfig) -> Self {
        let breaker = CircuitBreaker::new(
            Duration::from_secs(config.breaker_cooldown_secs),
            config.breaker_failure_threshold,
        );
        let cache = ResponseCache::new(config.cache_capacity);
        Self {
            config,
            breaker,
            backoff: ExponentialBackoff::default(),
            cache,
        }
    }

    pub fn with_backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    fn cache_key(&self, goal: &Goal) -> String {
        format!("{}:{}", self.config.model, goal.fingerprint())
    }

    async fn generate_once(&self, prompt: &str) -> anyhow::Result<PlanAdvice> {
        let deadline = Duration::from_secs(self.config.timeout_secs);
        let call = async {
            let response = http_client()
                .post(&self.config.endpoint)
                .json(&GenerateRequest {
                    model: &self.config.model,
                    prompt,
                    stream: false,
                })
                .send()
                .await
                .with_context(|| format!("Failed to reach Ollama at {}", self.config.endpoint))?
                .error_for_status()
                .context("Ollama returned an error status")?;
            let body: GenerateResponse = response
                .json()
                .await
                .with_context(|| format!("Unreadable response from model '{}'", self.config.model))?;
            anyhow::Ok(body.response)
        };

        let raw = timeout(deadline, call).await.map_err(|_| {
            anyhow::anyhow!("Model '{}' timed out after {}s", self.config.model, deadline.as_secs())
        })??;
        let json = extract_json(&raw)
            .with_context(|| format!("Failed to extract JSON from model '{}'", self.config.model))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Model '{}' returned JSON of the wrong shape", self.config.model))
    }
}

#[async_trait]
impl AdviceProvider for OllamaAdvisor {
    async fn advise(&self, goal: &Goal, plan: &CurriculumPlan) -> Result<PlanAdvice, TrackerError> {
        let key = self.cache_key(goal);
        if let Some(hit) = self.cache.get::<PlanAdvice>(&key) {
            return Ok(hit);
        }
        if self.breaker.is_open() {
            return Err(TrackerError::new("Advice circuit open, skipping model call", "advice")
                .with_context(format!("model: {}", self.config.model)));
        }

        let prompt = build_prompt(goal, plan);
        let attempts = self.config.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            let start = Instant::now();
            match self.generate_once(&prompt).await {
                Ok(advice) => {
                    self.breaker.record_success();
                    tracing::info!(
                        model = %self.config.model,
                        attempt,
                        latency_ms = start.elapsed().as_millis() as u64,
                        "Plan advice generated"
                    );
                    if let Err(e) = self.cache.put(&key, &advice) {
                        tracing::warn!(error = %e, "Failed to cache plan advice");
                    }
                    return Ok(advice);
                }
                Err(e) => {
                    self.breaker.record_failure();
                    tracing::warn!(
                        model = %self.config.model,
                        attempt,
                        error = %e,
                        "Advice call failed"
                    );
                    last_error = Some(e);
                    if attempt + 1 == attempts || self.breaker.is_open() {
                        break;
                    }
                    tokio::time::sleep(self.backoff.delay_for_attempt(attempt)).await;
                }
            }
        }

        let source = last_error.map(|e| format!("{:#}", e)).unwrap_or_default();
        Err(TrackerError::new("Plan advice unavailable", "advice")
            .with_context(format!("model: {}", self.config.model))
            .with_source(source))
    }
}
