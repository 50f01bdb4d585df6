//! Affiliate API response unwrapping and normalization.
//!
//! The upstream wraps the result in a deeply nested envelope and is loose
//! about field names: prices and commission rates arrive under different
//! keys depending on the product source. Normalization flattens each raw
//! item into a `Product` DTO with independently nullable fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw product item as the upstream returns it.
///
/// Numeric-ish fields stay as JSON values since the API mixes strings and
/// numbers freely.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawProduct {
    pub product_id: Option<Value>,
    pub product_title: Option<String>,
    pub product_detail_url: Option<String>,
    pub product_main_image_url: Option<String>,
    pub target_sale_price: Option<Value>,
    pub sale_price: Option<Value>,
    pub target_original_price: Option<Value>,
    pub original_price: Option<Value>,
    pub hot_product_commission_rate: Option<Value>,
    pub commission_rate: Option<Value>,
    pub promotion_link: Option<String>,
}

/// Normalized product DTO returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: Option<Value>,
    pub product_title: Option<String>,
    pub product_detail_url: Option<String>,
    pub product_main_image_url: Option<String>,
    pub sale_price: Option<Value>,
    pub original_price: Option<Value>,
    pub commission_rate: Option<Value>,
    pub promotion_link: Option<String>,
}

impl From<RawProduct> for Product {
    /// Flatten a raw item, preferring the `target_*` price variants and the
    /// hot-product commission rate when present.
    fn from(raw: RawProduct) -> Self {
        Product {
            product_id: raw.product_id,
            product_title: raw.product_title,
            product_detail_url: raw.product_detail_url,
            product_main_image_url: raw.product_main_image_url,
            sale_price: raw.target_sale_price.or(raw.sale_price),
            original_price: raw.target_original_price.or(raw.original_price),
            commission_rate: raw.hot_product_commission_rate.or(raw.commission_rate),
            promotion_link: raw.promotion_link,
        }
    }
}

/// Unwrap the nested result envelope.
///
/// Prefers `aliexpress_affiliate_product_query_response.resp_result.result`,
/// falls back to the response object, then to the body itself.
pub fn unwrap_result(body: &Value) -> &Value {
    if let Some(result) = body.pointer("/aliexpress_affiliate_product_query_response/resp_result/result") {
        return result;
    }
    if let Some(resp) = body.get("aliexpress_affiliate_product_query_response") {
        return resp;
    }
    body
}

/// Normalize a parsed response body into a flat product list.
///
/// Returns an empty list when the envelope carries no products.
pub fn normalize_products(body: &Value) -> Vec<Product> {
    unwrap_result(body)
        .pointer("/products/product")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<RawProduct>(item.clone()).ok())
                .map(Product::from)
                .collect()
        })
        .unwrap_or_default()
}
