//! The model reply contract.
//!
//! A classifier answers with one line, `Total|Category|Summary`, or with
//! `NULL` when the email is not a receipt. The category is `null` when none
//! of the user's categories fit.

use crate::{Classification, Classifier, ClassifyRequest};
use anyhow::Result;
use thiserror::Error;

/// Errors in a model reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    /// The reply is empty or its total field is blank.
    #[error("model reply has no total: {reply:?}")]
    MissingTotal {
        /// The reply as received.
        reply: String,
    },
}

/// Parse a `Total|Category|Summary` reply.
///
/// Returns `Ok(None)` for `NULL` (any case). A missing summary becomes an
/// empty string; a summary containing `|` is kept whole.
///
/// # Example
///
/// ```
/// use mailtally_extract::parse_reply;
///
/// let c = parse_reply("45.00|Food|Lunch at Joe's").unwrap().unwrap();
/// assert_eq!(c.total, "45.00");
/// assert_eq!(c.category.as_deref(), Some("Food"));
/// assert_eq!(c.summary, "Lunch at Joe's");
///
/// assert!(parse_reply("NULL").unwrap().is_none());
/// ```
pub fn parse_reply(reply: &str) -> Result<Option<Classification>, ReplyError> {
    let reply = reply.trim();
    if reply.eq_ignore_ascii_case("null") {
        return Ok(None);
    }

    let mut fields = reply.splitn(3, '|').map(str::trim);
    let total = fields.next().unwrap_or_default();
    if total.is_empty() {
        return Err(ReplyError::MissingTotal {
            reply: reply.to_string(),
        });
    }

    let category = fields
        .next()
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("null"))
        .map(str::to_string);
    let summary = fields.next().unwrap_or_default().to_string();

    Ok(Some(Classification {
        total: total.to_string(),
        category,
        summary,
        token_size: None,
    }))
}

/// A classifier that replays a fixed model reply.
///
/// Useful when the model was called elsewhere (the reply is passed in), and
/// in tests.
#[derive(Debug, Clone)]
pub struct ReplyClassifier {
    name: String,
    reply: String,
    token_size: Option<u32>,
}

impl ReplyClassifier {
    /// Replay `reply` under the default name.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            name: "replay".to_string(),
            reply: reply.into(),
            token_size: None,
        }
    }

    /// Report records under a specific parser name (e.g. the model that produced the reply).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Report the token usage of the original call.
    pub const fn with_token_size(mut self, token_size: u32) -> Self {
        self.token_size = Some(token_size);
        self
    }
}

impl Classifier for ReplyClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, _request: &ClassifyRequest<'_>) -> Result<Option<Classification>> {
        let classification = parse_reply(&self.reply)?;
        Ok(classification.map(|mut c| {
            c.token_size = self.token_size;
            c
        }))
    }

    fn description(&self) -> &str {
        "Replays a model reply supplied by the caller"
    }
}
