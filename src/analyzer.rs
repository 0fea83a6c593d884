//! Analyzer facade: extract, classify, assemble, report.

use crate::classifier::Classifier;
use crate::input::ErrorInput;
use crate::record::NormalizedErrorRecord;
use crate::result::ClassificationResult;
use crate::retry::RetryPolicy;
use crate::settings::AnalyzerSettings;
use crate::stats::{NoopStats, StatsSink};
use std::sync::Arc;

/// Entry point for classifying LINE Messaging API errors.
///
/// Holds no per-call state; share one instance across threads freely.
#[derive(Debug, Clone)]
pub struct ErrorAnalyzer {
    settings: AnalyzerSettings,
    classifier: Classifier,
    stats: Arc<dyn StatsSink>,
}

impl Default for ErrorAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorAnalyzer {
    /// Analyzer with global settings and no stats.
    pub fn new() -> Self {
        Self::with_settings(AnalyzerSettings::global().clone())
    }

    /// Analyzer with explicit settings and no stats.
    pub fn with_settings(settings: AnalyzerSettings) -> Self {
        Self {
            settings,
            classifier: Classifier::new(),
            stats: Arc::new(NoopStats),
        }
    }

    /// Report every result to `stats`.
    pub fn with_stats(mut self, stats: Arc<dyn StatsSink>) -> Self {
        self.stats = stats;
        self
    }

    /// Settings in effect.
    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Retry policy derived from this analyzer's settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_settings(&self.settings)
    }

    /// Classify any supported input.
    pub fn classify(&self, input: &ErrorInput, api_context: Option<&str>) -> ClassificationResult {
        let record = NormalizedErrorRecord::extract(input);
        self.finish(record, input.clone(), api_context)
    }

    /// Classify free-form log text.
    pub fn classify_log(&self, text: &str, api_context: Option<&str>) -> ClassificationResult {
        self.classify(&ErrorInput::log(text), api_context)
    }

    /// Classify several inputs under one context. Output order matches input order.
    pub fn classify_batch(
        &self,
        inputs: &[ErrorInput],
        api_context: Option<&str>,
    ) -> Vec<ClassificationResult> {
        inputs
            .iter()
            .map(|input| self.classify(input, api_context))
            .collect()
    }

    /// Classify an already extracted record.
    ///
    /// `raw` is kept on the result untouched.
    pub fn classify_record(
        &self,
        record: NormalizedErrorRecord,
        raw: ErrorInput,
        api_context: Option<&str>,
    ) -> ClassificationResult {
        self.finish(record, raw, api_context)
    }

    fn finish(
        &self,
        record: NormalizedErrorRecord,
        raw: ErrorInput,
        api_context: Option<&str>,
    ) -> ClassificationResult {
        let outcome = self.classifier.classify(&record, api_context);
        tracing::debug!(
            category = %outcome.category,
            tier = %outcome.tier,
            context = ?outcome.context.as_ref().map(|c| c.tag()),
            "Classified error"
        );

        let result = ClassificationResult::assemble(record, outcome, raw);
        if self.settings.log_classifications {
            tracing::info!(
                status = result.status_code,
                category = %result.category,
                severity = %result.severity,
                retryable = result.is_retryable,
                request_id = ?result.request_id,
                "LINE API error classified"
            );
        }
        self.stats.record(&result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::ErrorCategory;
    use crate::stats::InMemoryStats;
    use serde_json::json;

    fn analyzer() -> ErrorAnalyzer {
        ErrorAnalyzer::with_settings(AnalyzerSettings::default())
    }

    #[test]
    fn test_classify_should_keep_raw_input() {
        // Given
        let input =
            ErrorInput::try_from(json!({"status_code": 429, "message": "Too many"})).unwrap();

        // When
        let result = analyzer().classify(&input, None);

        // Then
        assert_eq!(result.category, ErrorCategory::RateLimit);
        assert_eq!(result.raw, input);
    }

    #[test]
    fn test_batch_should_preserve_order() {
        let inputs = vec![
            ErrorInput::log("(401) Unauthorized"),
            ErrorInput::log("(429) Too Many Requests"),
            ErrorInput::log("(500) Internal Server Error"),
        ];
        let categories: Vec<_> = analyzer()
            .classify_batch(&inputs, None)
            .into_iter()
            .map(|r| r.category)
            .collect();

        assert_eq!(
            categories,
            vec![
                ErrorCategory::AuthError,
                ErrorCategory::RateLimit,
                ErrorCategory::ServerError
            ]
        );
    }

    #[test]
    fn test_stats_sink_should_see_every_result() {
        let stats = Arc::new(InMemoryStats::new());
        let analyzer =
            ErrorAnalyzer::with_settings(AnalyzerSettings::default().with_log_classifications(true))
                .with_stats(stats.clone());

        analyzer.classify_log("(429) Too Many Requests", None);
        analyzer.classify_log("(429) Too Many Requests", Some("message.message_push"));

        assert_eq!(stats.total(), 2);
        assert_eq!(stats.count(ErrorCategory::RateLimit), 2);
    }

    #[test]
    fn test_classify_record_should_skip_extraction() {
        let record = NormalizedErrorRecord {
            status_code: Some(404),
            message: "Not found".to_string(),
            ..NormalizedErrorRecord::default()
        };
        let result = analyzer().classify_record(record, ErrorInput::log("n/a"), Some("user"));
        assert_eq!(result.category, ErrorCategory::UserBlocked);
        assert_eq!(result.raw, ErrorInput::log("n/a"));
    }

    #[test]
    fn test_retry_policy_should_use_analyzer_settings() {
        let analyzer =
            ErrorAnalyzer::with_settings(AnalyzerSettings::default().with_max_retries(7));
        assert_eq!(analyzer.retry_policy().max_attempts, 7);
    }
}
