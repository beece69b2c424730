use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

use super::client::{GenerationClient, HttpGenerationClient};
use super::fallback::analyze_locally;
use super::parser::{parse_generated_text, ParsePath};
use super::prompt::build_prompt;
use super::AnalysisError;
use crate::config::AnalyzerConfig;
use crate::models::{AnalysisRequest, AnalysisResult};

/// Symptom analysis with a remote generation path and a local fallback.
///
/// Holds no mutable state; concurrent calls are independent.
pub struct SymptomAnalyzer<C> {
    client: C,
    config: AnalyzerConfig,
}

impl SymptomAnalyzer<HttpGenerationClient> {
    /// Analyzer talking to the configured HTTP endpoint.
    pub fn from_config(config: AnalyzerConfig) -> Result<Self, AnalysisError> {
        let client = HttpGenerationClient::from_config(&config)?;
        Ok(Self::new(client, config))
    }
}

impl<C: GenerationClient> SymptomAnalyzer<C> {
    pub fn new(client: C, config: AnalyzerConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Analyze a request. Never fails and never returns an empty result.
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        self.analyze_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Like [`analyze`](Self::analyze), abandoning the remote call as soon as
    /// `cancel` fires. The in-flight request future is dropped, which aborts
    /// the HTTP exchange.
    pub async fn analyze_with_cancel(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> AnalysisResult {
        let started = Instant::now();

        self.analyze_remote(request, cancel)
            .await
            .map(|(result, path)| {
                tracing::info!(
                    path = path.as_str(),
                    conditions = result.conditions.len(),
                    remedies = result.remedies.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Remote analysis complete"
                );
                result
            })
            .unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    kind = e.kind(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Remote analysis failed, using local fallback"
                );
                self.analyze_local(request)
            })
    }

    /// The remote path alone: prompt, dispatch, parse.
    pub async fn analyze_remote(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<(AnalysisResult, ParsePath), AnalysisError> {
        let prompt = build_prompt(request);
        tracing::debug!(
            model = %self.config.model,
            symptoms = request.symptoms.len(),
            prompt_chars = prompt.len(),
            "Dispatching analysis request"
        );

        let text = self.dispatch(&prompt, cancel).await?;
        parse_generated_text(&text, request)
    }

    /// Local table-driven analysis. Seeded from config when a seed is set.
    pub fn analyze_local(&self, request: &AnalysisRequest) -> AnalysisResult {
        let mut rng = local_rng(self.config.confidence_seed);
        analyze_locally(&request.body_areas, request.severity, &mut rng)
    }

    async fn dispatch(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, AnalysisError> {
        let timeout = self.config.timeout;
        let call = tokio::time::timeout(timeout, self.client.generate(prompt, &self.config.model));

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AnalysisError::Cancelled),
            outcome = call => outcome
                .unwrap_or_else(|_| Err(AnalysisError::Timeout(timeout.as_millis() as u64))),
        }
    }

    /// Entry point for untyped caller input (see [`AnalysisRequest::from_raw`]).
    pub async fn analyze_raw<S: AsRef<str>>(
        &self,
        symptoms: &[S],
        body_areas: &[S],
        duration: &str,
        severity: i64,
    ) -> AnalysisResult {
        let request = AnalysisRequest::from_raw(symptoms, body_areas, duration, severity);
        self.analyze(&request).await
    }
}

/// Analyze symptoms against the endpoint configured in the environment.
///
/// If the HTTP client itself cannot be built the local analyzer answers.
pub async fn analyze_symptoms<S: AsRef<str>>(
    symptoms: &[S],
    body_areas: &[S],
    duration: &str,
    severity: i64,
) -> AnalysisResult {
    let config = AnalyzerConfig::from_env();
    let request = AnalysisRequest::from_raw(symptoms, body_areas, duration, severity);

    match SymptomAnalyzer::<HttpGenerationClient>::from_config(config.clone()) {
        Ok(analyzer) => analyzer.analyze(&request).await,
        Err(e) => {
            tracing::error!(error = %e, "Cannot build generation client, using local fallback");
            let mut rng = local_rng(config.confidence_seed);
            analyze_locally(&request.body_areas, request.severity, &mut rng)
        }
    }
}

fn local_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
