//! Configuration for the receipt pipeline.

use mailtally_core::CurrencyTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user-defined spending category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// Database id of the category.
    pub id: i64,
    /// Display name, as offered to the classifier.
    pub value: String,
}

impl Category {
    /// Create a category.
    pub fn new(id: i64, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
        }
    }
}

/// Configuration for a receipt pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The user's currency code; every amount is normalized to it.
    pub currency: String,
    /// The user's categories, offered to the classifier.
    pub categories: Vec<Category>,
    /// Whether to scan the body when the classifier gives no usable answer.
    pub fallback: bool,
    /// Currency reference data.
    pub table: CurrencyTable,
    /// Default category per sender address, keyed by [`sender_key`].
    pub sender_categories: HashMap<String, i64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            categories: Vec::new(),
            fallback: true,
            table: CurrencyTable::builtin(),
            sender_categories: HashMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Start building a pipeline configuration.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Find the category id for a classifier's category name.
    ///
    /// Names must match exactly; anything else leaves the receipt
    /// uncategorised.
    pub fn category_id(&self, name: &str) -> Option<i64> {
        self.categories
            .iter()
            .find(|c| c.value == name)
            .map(|c| c.id)
    }

    /// The default category filed for mail from `from`, if one is set.
    pub fn sender_category_id(&self, from: &str) -> Option<i64> {
        self.sender_categories.get(&sender_key(from)).copied()
    }
}

/// Reduce a `From` value to the bare, lower-cased address.
///
/// `"Shop <Orders@Shop.example>"` and `"orders@shop.example"` give the same key.
pub fn sender_key(from: &str) -> String {
    let address = match (from.rfind('<'), from.rfind('>')) {
        (Some(open), Some(close)) if open < close => &from[open + 1..close],
        _ => from,
    };
    address.trim().to_lowercase()
}

/// Builder for pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user's currency code.
    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.config.currency = code.into().trim().to_ascii_uppercase();
        self
    }

    /// Add a category.
    pub fn category(mut self, id: i64, value: impl Into<String>) -> Self {
        self.config.categories.push(Category::new(id, value));
        self
    }

    /// Replace the category list.
    pub fn categories(mut self, categories: Vec<Category>) -> Self {
        self.config.categories = categories;
        self
    }

    /// Set whether to scan the body when the classifier gives no usable answer.
    pub const fn fallback(mut self, enabled: bool) -> Self {
        self.config.fallback = enabled;
        self
    }

    /// File mail from `email` under category `id` unless a classifier says otherwise.
    pub fn sender_category(mut self, email: &str, id: i64) -> Self {
        self.config.sender_categories.insert(sender_key(email), id);
        self
    }

    /// Use a specific currency table.
    pub fn table(mut self, table: CurrencyTable) -> Self {
        self.config.table = table;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}
