use std::time::Duration;

use tracing::{info, warn};

use crate::provider::{prompts, AiError, AiProvider};

/// Quota policy for a batch of analysis calls. Defaults are conservative
/// guards against the hosted APIs' per-minute and per-day limits.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Chunks beyond this count are produced but never submitted.
    pub max_chunks: usize,
    /// Pause between successive calls (not after the last).
    pub request_delay: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_chunks: 3,
            request_delay: Duration::from_secs(4),
        }
    }
}

pub struct Analyzer {
    provider: Box<dyn AiProvider>,
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(provider: Box<dyn AiProvider>) -> Self {
        Self {
            provider,
            config: AnalysisConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Submit chunks strictly in order, one blocking round trip at a time.
    /// A failed call degrades into an inline error string for that segment;
    /// the rest of the batch still runs. No retries.
    pub async fn analyze_chunks(&self, chunks: &[String]) -> Vec<String> {
        let submitted = chunks.len().min(self.config.max_chunks);
        if chunks.len() > submitted {
            info!(
                "Analyzing first {} of {} chunks (quota cap)",
                submitted,
                chunks.len()
            );
        }

        let mut analyses = Vec::with_capacity(submitted);
        for (i, chunk) in chunks.iter().take(submitted).enumerate() {
            let segment = i + 1;
            info!(
                "Analyzing segment {} with {} ({} chars)",
                segment,
                self.provider.name(),
                chunk.len()
            );

            let prompt = prompts::analysis_prompt(chunk);
            let analysis = match self.provider.complete(&prompt).await {
                Ok(text) => text,
                Err(AiError::EmptyCompletion) => {
                    warn!("Segment {} returned no completion text", segment);
                    "Analysis failed".to_string()
                }
                Err(e) => {
                    warn!("Segment {} analysis failed: {}", segment, e);
                    format!("Error analyzing segment {}: {}", segment, e)
                }
            };
            analyses.push(analysis);

            if segment < submitted && !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }
        }
        analyses
    }
}
