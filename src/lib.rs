pub mod analysis;
pub mod config;
pub mod history;
pub mod models;
pub mod mood;

pub use analysis::{analyze_symptoms, AnalysisError, SymptomAnalyzer};
pub use config::AnalyzerConfig;
pub use models::{AnalysisRequest, AnalysisResult};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Safe to call more than once.
pub fn init_tracing() {
    let initialized = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!("{} v{} tracing initialised", config::APP_NAME, config::APP_VERSION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::HttpGenerationClient;

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }

    #[tokio::test]
    async fn caller_entry_point_never_fails_without_endpoint() {
        // Port 9 (discard) on localhost has nothing listening in test environments.
        let analyzer = SymptomAnalyzer::<HttpGenerationClient>::from_config(AnalyzerConfig {
            endpoint: "http://127.0.0.1:9/analyze".into(),
            ..AnalyzerConfig::default()
        })
        .unwrap();

        let result = analyzer
            .analyze_raw(&["Cough", "Fever"], &["chest"], "days", 3)
            .await;
        assert!(result.is_well_formed());
        assert!(result.remedies.len() >= 2);
    }
}
