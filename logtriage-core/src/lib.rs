// logtriage - incident-analysis pipeline
//
// Loads a CSV/JSON log export, reduces it to the rows worth looking at,
// chunks them under the provider's context budget, sends each chunk to a
// hosted completion API for root-cause analysis, and assembles the answers
// into a markdown incident report.

use anyhow::Result;
use tracing::info;

pub mod analyzer;
pub mod chunker;
pub mod config;
pub mod loader;
pub mod preprocess;
pub mod provider;
pub mod report;

pub use analyzer::{AnalysisConfig, Analyzer};
pub use chunker::{chunk_rows, serialize_row};
pub use config::{Config, Limits};
pub use loader::{load_log_table, LoadError, LogTable};
pub use preprocess::{preprocess, FilteredTable, SEVERITY_MARKERS};
pub use provider::{create_provider, create_provider_with_model, AiError, AiProvider};
pub use report::{compile_report, default_report_path, save_report, NO_ERROR_LOGS_FOUND};

use std::path::Path;

/// Pipeline facade: load → preprocess → chunk → analyze → report.
pub struct LogTriage {
    config: Config,
}

impl LogTriage {
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self { config })
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline over a log export and return the markdown
    /// report. Fatal errors (bad path, unsupported format, missing API key)
    /// abort; remote failures degrade into per-segment error text.
    pub async fn generate_report(
        &self,
        file_path: &Path,
        provider_name: &str,
        api_key: Option<&str>,
        model: Option<&str>,
    ) -> Result<String> {
        let table = load_log_table(file_path)?;
        let source = file_path.display().to_string();

        self.run_pipeline(&table, &source, || {
            let api_key = match api_key {
                Some(key) => key.to_string(),
                None => self.config.get_api_key(provider_name).ok_or_else(|| {
                    anyhow::anyhow!(
                        "API key required for provider {}. Set {}_API_KEY environment variable",
                        provider_name,
                        provider_name.to_uppercase()
                    )
                })?,
            };
            let model = model
                .map(|m| m.to_string())
                .or_else(|| self.config.get_model(provider_name));
            create_provider_with_model(provider_name, &api_key, model)
        })
        .await
    }

    /// Pipeline body with the provider injected lazily: when nothing survives
    /// preprocessing no provider is ever built and no remote call is made.
    /// Tests inject a local double here.
    pub async fn run_pipeline(
        &self,
        table: &LogTable,
        source: &str,
        make_provider: impl FnOnce() -> Result<Box<dyn AiProvider>>,
    ) -> Result<String> {
        let filtered = preprocess(table, self.config.limits.max_rows);
        if filtered.is_empty() {
            info!("No rows survived preprocessing for {}", source);
            return Ok(NO_ERROR_LOGS_FOUND.to_string());
        }

        let chunks = chunk_rows(&filtered.table, self.config.limits.max_chunk_chars);
        let row_count = filtered.row_count();

        let provider = make_provider()?;
        let engine = provider.name().to_string();
        let analyzer = Analyzer::new(provider).with_config(self.config.analysis_config());
        let analyses = analyzer.analyze_chunks(&chunks).await;

        Ok(compile_report(&analyses, row_count, source, &engine))
    }
}
