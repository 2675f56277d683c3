//! Receipt pipeline for mailtally
//!
//! This crate turns a decoded receipt email into a [`ReceiptRecord`]: a total
//! in the user's currency, the other amounts seen in the body, a category
//! and a summary.
//!
//! # Overview
//!
//! A [`Classifier`] (typically a language model) is asked first. Its reply
//! carries the total as text, which is parsed and normalized by
//! `mailtally-core`. When there is no classifier, or it has no usable
//! answer, the body is scanned instead and the most repeated amount wins.
//!
//! # Example
//!
//! ```
//! use mailtally_extract::{EmailContent, PipelineConfig, ReceiptPipeline, ReplyClassifier};
//!
//! let config = PipelineConfig::builder()
//!     .currency("USD")
//!     .category(1, "Food")
//!     .build();
//!
//! let pipeline = ReceiptPipeline::new(config)
//!     .with_classifier(ReplyClassifier::new("16.50|Food|Burger and fries"));
//!
//! let email = EmailContent::new("Burger $12.50\nFries $4.00\nTotal $16.50");
//! let record = pipeline.process(&email).unwrap().unwrap();
//!
//! assert_eq!(record.extraction.amount, 1650);
//! assert_eq!(record.category_id, Some(1));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod pipeline;
pub mod reply;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use config::{sender_key, Category, PipelineConfig, PipelineConfigBuilder};
pub use pipeline::{
    flatten_newlines, EmailContent, PipelineError, ReceiptPipeline, ReceiptRecord, MANUAL_PARSER,
};
pub use reply::{parse_reply, ReplyClassifier, ReplyError};

/// What a classifier is asked about.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyRequest<'a> {
    /// The email body with line breaks flattened to spaces.
    pub text: &'a str,
    /// The categories the receipt may be filed under.
    pub categories: &'a [config::Category],
}

impl<'a> ClassifyRequest<'a> {
    /// Create a request.
    pub const fn new(text: &'a str, categories: &'a [config::Category]) -> Self {
        Self { text, categories }
    }

    /// The instruction a language model is given for this request.
    ///
    /// The model must answer in the format [`parse_reply`] reads.
    pub fn system_prompt(&self) -> String {
        let categories: Vec<&str> = self.categories.iter().map(|c| c.value.as_str()).collect();
        format!(
            "You are tasked with classifying and summarizing receipts from emails, \
             reply without explanation in this format only: Total|Category|Summary. \
             For Category choose from these categories: {}. \
             If category is not available use null instead. \
             If the email doesn't seem to be a receipt reply with null instead",
            categories.join(", ")
        )
    }
}

/// A classifier's verdict on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// The total as the classifier wrote it (e.g. `"45.00"` or `"$45.00"`).
    pub total: String,
    /// Category name, if one of the offered categories fit.
    pub category: Option<String>,
    /// One-line summary.
    pub summary: String,
    /// Tokens spent producing the verdict, if known.
    pub token_size: Option<u32>,
}

/// Trait for receipt classifiers.
///
/// Implementors decide whether an email is a receipt and, if so, report its
/// total, category and a summary. Network-backed implementations live with
/// the caller; this crate ships [`ReplyClassifier`].
pub trait Classifier: Send + Sync {
    /// Returns the name of this classifier, recorded as the receipt's parser.
    fn name(&self) -> &str;

    /// Classify an email. `Ok(None)` means it is not a receipt.
    fn classify(&self, request: &ClassifyRequest<'_>) -> Result<Option<Classification>>;

    /// Returns a description of this classifier.
    fn description(&self) -> &str {
        self.name()
    }
}
