//! The receipt pipeline: classifier first, body scan as the fallback.

use chrono::{DateTime, FixedOffset};
use mailtally_core::{extract, extract_with_total, tally, Currency, Extraction, ExtractionResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::{Classification, Classifier, ClassifyRequest};

/// Parser name recorded for receipts totalled by the body scan.
pub const MANUAL_PARSER: &str = "manual";

/// Errors that stop a receipt from being processed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The user's currency is not in the currency table.
    #[error("unknown currency {code}")]
    UnknownCurrency {
        /// The configured code.
        code: String,
    },
}

/// A decoded receipt email.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmailContent {
    /// The `Message-ID` header.
    pub message_id: Option<String>,
    /// The `From` header.
    pub from: Option<String>,
    /// The `Date` header.
    pub date: Option<DateTime<FixedOffset>>,
    /// The plain-text body.
    pub body: String,
}

impl EmailContent {
    /// Create an email from its plain-text body.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            message_id: None,
            from: None,
            date: None,
            body: body.into(),
        }
    }

    /// Set the message id.
    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    /// Set the sender.
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set the sent date.
    pub const fn with_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }
}

/// A receipt ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    /// Message id of the source email.
    pub email_id: Option<String>,
    /// When the source email was sent.
    pub email_created: Option<DateTime<FixedOffset>>,
    /// One-line summary from the classifier.
    pub summary: Option<String>,
    /// The body the amounts were read from.
    pub email_content: String,
    /// Total and candidate amounts.
    #[serde(flatten)]
    pub extraction: ExtractionResult,
    /// Matched category, if any.
    pub category_id: Option<i64>,
    /// Tokens spent by the classifier, if it reported them.
    pub token_size: Option<u32>,
    /// Which parser produced the total.
    pub parser: String,
}

/// Classifies receipt emails and assembles [`ReceiptRecord`]s.
///
/// Without a classifier, or when the classifier has no usable answer, the
/// body is scanned and the most repeated amount becomes the total.
pub struct ReceiptPipeline {
    config: PipelineConfig,
    classifier: Option<Arc<dyn Classifier>>,
}

impl ReceiptPipeline {
    /// Create a pipeline that only scans bodies.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            classifier: None,
        }
    }

    /// Ask `classifier` first.
    pub fn with_classifier(mut self, classifier: impl Classifier + 'static) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Get the configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one email.
    ///
    /// Returns `Ok(None)` when no amount could be found.
    pub fn process(&self, email: &EmailContent) -> Result<Option<ReceiptRecord>, PipelineError> {
        let code = &self.config.currency;
        let currency =
            self.config
                .table
                .get(code)
                .ok_or_else(|| PipelineError::UnknownCurrency {
                    code: code.clone(),
                })?;

        if self.config.table.symbol_for(code).is_none() {
            warn!("no symbol known for {code}, scanning by currency code only");
        }

        let message_id = email.message_id.as_deref().unwrap_or("<none>");

        if let Some(classifier) = &self.classifier {
            if let Some(record) = self.classify(classifier.as_ref(), email, currency) {
                info!(
                    message_id,
                    parser = %record.parser,
                    amount = record.extraction.amount,
                    "receipt classified"
                );
                return Ok(Some(record));
            }
        }

        if !self.config.fallback {
            info!(message_id, "no usable classification and fallback disabled");
            return Ok(None);
        }

        let extraction = extract(&email.body, currency);
        log_extraction(&extraction);

        match extraction.result {
            Some(result) => {
                info!(
                    message_id,
                    amount = result.amount,
                    candidates = result.other_amounts.len(),
                    "receipt totalled by body scan"
                );
                Ok(Some(self.record(email, result, None, MANUAL_PARSER)))
            }
            None => {
                info!(message_id, "no amount found");
                Ok(None)
            }
        }
    }

    /// Try the classifier; `None` means fall back.
    fn classify(
        &self,
        classifier: &dyn Classifier,
        email: &EmailContent,
        currency: &Currency,
    ) -> Option<ReceiptRecord> {
        let text = flatten_newlines(&email.body);
        let request = ClassifyRequest::new(&text, &self.config.categories);

        let classification = match classifier.classify(&request) {
            Ok(Some(c)) => c,
            Ok(None) => {
                info!(classifier = classifier.name(), "not a receipt");
                return None;
            }
            Err(e) => {
                warn!(classifier = classifier.name(), "classifier failed: {e:#}");
                return None;
            }
        };
        debug!(?classification, "classifier reply");

        match extract_with_total(&email.body, &classification.total, currency) {
            Ok(extraction) => {
                log_extraction(&extraction);
                let result = extraction.result?;
                Some(self.record(email, result, Some(classification), classifier.name()))
            }
            Err(e) => {
                warn!(
                    total = %classification.total,
                    "unusable total from classifier: {e}"
                );
                None
            }
        }
    }

    fn record(
        &self,
        email: &EmailContent,
        extraction: ExtractionResult,
        classification: Option<Classification>,
        parser: &str,
    ) -> ReceiptRecord {
        let (summary, category_id, token_size) = match classification {
            Some(c) => {
                let category_id = c.category.as_deref().and_then(|name| {
                    let id = self.config.category_id(name);
                    if id.is_none() {
                        debug!(category = name, "category not in the user's list");
                    }
                    id
                });
                (Some(c.summary), category_id, c.token_size)
            }
            // The sender's default category only applies without a classifier verdict
            None => (None, self.sender_category(email), None),
        };

        ReceiptRecord {
            email_id: email.message_id.clone(),
            email_created: email.date,
            summary,
            email_content: email.body.clone(),
            extraction,
            category_id,
            token_size,
            parser: parser.to_string(),
        }
    }

    fn sender_category(&self, email: &EmailContent) -> Option<i64> {
        let from = email.from.as_deref()?;
        let id = self.config.sender_category_id(from);
        if let Some(id) = id {
            debug!(from, category_id = id, "using sender's default category");
        }
        id
    }
}

fn log_extraction(extraction: &Extraction) {
    for rejected in &extraction.rejected {
        warn!(
            token = %rejected.token.text,
            span = %rejected.token.span,
            "dropped money token: {}",
            rejected.error
        );
    }
    if let Some(result) = &extraction.result {
        debug!(
            marker = extraction.marker.as_deref().unwrap_or(""),
            tally = ?tally(&result.other_amounts),
            "candidate amounts"
        );
    }
}

/// Replace line breaks with spaces before handing text to a classifier.
pub fn flatten_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Category;
    use crate::reply::ReplyClassifier;
    use anyhow::{bail, Result};

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn name(&self) -> &str {
            "failing"
        }

        fn classify(&self, _request: &ClassifyRequest<'_>) -> Result<Option<Classification>> {
            bail!("upstream timed out")
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig::builder()
            .currency("USD")
            .category(1, "Food")
            .category(2, "Travel")
            .build()
    }

    const BODY: &str = "Burger $12.50\nFries $4.00\nTotal $16.50\nPaid $16.50";

    #[test]
    fn test_fallback_without_classifier() {
        let pipeline = ReceiptPipeline::new(config());
        let record = pipeline
            .process(&EmailContent::new(BODY).with_message_id("<a@b>"))
            .unwrap()
            .unwrap();
        assert_eq!(record.extraction.amount, 1650);
        assert_eq!(record.extraction.other_amounts, vec![1250, 400, 1650, 1650]);
        assert_eq!(record.parser, MANUAL_PARSER);
        assert_eq!(record.email_id.as_deref(), Some("<a@b>"));
        assert!(record.summary.is_none());
        assert!(record.category_id.is_none());
    }

    #[test]
    fn test_classifier_total_wins() {
        let pipeline = ReceiptPipeline::new(config())
            .with_classifier(ReplyClassifier::new("12.50|Food|Burger").with_name("gpt-3.5-turbo"));
        let record = pipeline.process(&EmailContent::new(BODY)).unwrap().unwrap();
        assert_eq!(record.extraction.amount, 1250);
        assert_eq!(record.extraction.other_amounts.len(), 4);
        assert_eq!(record.parser, "gpt-3.5-turbo");
        assert_eq!(record.category_id, Some(1));
        assert_eq!(record.summary.as_deref(), Some("Burger"));
    }

    #[test]
    fn test_unknown_category_is_none() {
        let pipeline = ReceiptPipeline::new(config())
            .with_classifier(ReplyClassifier::new("16.50|Snacks|Burger"));
        let record = pipeline.process(&EmailContent::new(BODY)).unwrap().unwrap();
        assert_eq!(record.category_id, None);
    }

    #[test]
    fn test_not_a_receipt_falls_back() {
        let pipeline =
            ReceiptPipeline::new(config()).with_classifier(ReplyClassifier::new("NULL"));
        let record = pipeline.process(&EmailContent::new(BODY)).unwrap().unwrap();
        assert_eq!(record.parser, MANUAL_PARSER);
        assert_eq!(record.extraction.amount, 1650);
    }

    #[test]
    fn test_classifier_error_falls_back() {
        let pipeline = ReceiptPipeline::new(config()).with_classifier(FailingClassifier);
        let record = pipeline.process(&EmailContent::new(BODY)).unwrap().unwrap();
        assert_eq!(record.parser, MANUAL_PARSER);
    }

    #[test]
    fn test_unusable_total_falls_back() {
        let pipeline = ReceiptPipeline::new(config())
            .with_classifier(ReplyClassifier::new("about sixteen dollars|Food|Burger"));
        let record = pipeline.process(&EmailContent::new(BODY)).unwrap().unwrap();
        assert_eq!(record.parser, MANUAL_PARSER);
        assert_eq!(record.extraction.amount, 1650);
    }

    #[test]
    fn test_fallback_uses_sender_category() {
        let config = PipelineConfig::builder()
            .category(1, "Food")
            .sender_category("orders@burgers.example", 1)
            .build();
        let pipeline = ReceiptPipeline::new(config);

        let email = EmailContent::new(BODY).with_from("Burgers <orders@burgers.example>");
        let record = pipeline.process(&email).unwrap().unwrap();
        assert_eq!(record.parser, MANUAL_PARSER);
        assert_eq!(record.category_id, Some(1));

        let stranger = EmailContent::new(BODY).with_from("someone@else.example");
        let record = pipeline.process(&stranger).unwrap().unwrap();
        assert_eq!(record.category_id, None);
    }

    #[test]
    fn test_classifier_category_overrides_sender() {
        let config = PipelineConfig::builder()
            .category(1, "Food")
            .category(2, "Travel")
            .sender_category("orders@burgers.example", 1)
            .build();
        let email = EmailContent::new(BODY).with_from("orders@burgers.example");

        let pipeline = ReceiptPipeline::new(config.clone())
            .with_classifier(ReplyClassifier::new("16.50|Travel|Airport burger"));
        let record = pipeline.process(&email).unwrap().unwrap();
        assert_eq!(record.category_id, Some(2));

        // A null category from the model clears the sender's default too
        let pipeline = ReceiptPipeline::new(config)
            .with_classifier(ReplyClassifier::new("16.50|null|Burger"));
        let record = pipeline.process(&email).unwrap().unwrap();
        assert_eq!(record.category_id, None);
    }

    #[test]
    fn test_fallback_disabled() {
        let config = PipelineConfig::builder().fallback(false).build();
        let pipeline = ReceiptPipeline::new(config).with_classifier(ReplyClassifier::new("NULL"));
        assert!(pipeline.process(&EmailContent::new(BODY)).unwrap().is_none());
    }

    #[test]
    fn test_no_amount_found() {
        let pipeline = ReceiptPipeline::new(config());
        let email = EmailContent::new("Your order has shipped!");
        assert!(pipeline.process(&email).unwrap().is_none());
    }

    #[test]
    fn test_unknown_currency() {
        let config = PipelineConfig::builder().currency("XYZ").build();
        let pipeline = ReceiptPipeline::new(config);
        let err = pipeline.process(&EmailContent::new(BODY)).unwrap_err();
        assert_eq!(
            err,
            PipelineError::UnknownCurrency {
                code: "XYZ".to_string()
            }
        );
    }

    #[test]
    fn test_classifier_sees_flattened_text_and_categories() {
        struct Inspecting;

        impl Classifier for Inspecting {
            fn name(&self) -> &str {
                "inspecting"
            }

            fn classify(&self, request: &ClassifyRequest<'_>) -> Result<Option<Classification>> {
                assert!(!request.text.contains('\n'));
                assert_eq!(request.categories, &[Category::new(1, "Food"), Category::new(2, "Travel")]);
                Ok(None)
            }
        }

        let pipeline = ReceiptPipeline::new(config()).with_classifier(Inspecting);
        pipeline.process(&EmailContent::new(BODY)).unwrap();
    }

    #[test]
    fn test_flatten_newlines() {
        assert_eq!(flatten_newlines("a\r\nb\nc"), "a b c");
    }
}
