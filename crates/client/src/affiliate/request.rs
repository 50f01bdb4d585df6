//! Affiliate product-query request parameters and validation.

use serde::{Deserialize, Serialize};

use crate::affiliate::AffiliateError;

/// Business parameters for a product query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Search keywords (required).
    pub keywords: String,

    /// Page number, 1-based.
    pub page_no: u32,

    /// Results per page (1-50).
    pub page_size: u32,

    /// Result language (e.g. "ar").
    pub target_language: String,

    /// Result currency (e.g. "SAR").
    pub target_currency: String,

    /// Affiliate tracking id.
    pub tracking_id: String,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            keywords: String::new(),
            page_no: 1,
            page_size: 20,
            target_language: "ar".to_string(),
            target_currency: "SAR".to_string(),
            tracking_id: String::new(),
        }
    }
}

impl ProductQuery {
    /// Validate the query parameters.
    pub fn validate(&self) -> Result<(), AffiliateError> {
        if self.keywords.trim().is_empty() {
            return Err(AffiliateError::InvalidQuery("keywords cannot be empty".to_string()));
        }
        if self.page_no == 0 {
            return Err(AffiliateError::InvalidQuery("page_no must be at least 1".to_string()));
        }
        if self.page_size == 0 || self.page_size > 50 {
            return Err(AffiliateError::InvalidQuery(format!(
                "page_size out of range: {} (must be 1-50)",
                self.page_size
            )));
        }
        Ok(())
    }

    /// Business parameters as wire key/value pairs.
    pub fn business_params(&self) -> Vec<(String, String)> {
        vec![
            ("key_words".to_string(), self.keywords.clone()),
            ("page_no".to_string(), self.page_no.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
            ("target_language".to_string(), self.target_language.clone()),
            ("target_currency".to_string(), self.target_currency.clone()),
            ("tracking_id".to_string(), self.tracking_id.clone()),
        ]
    }
}
