use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use super::result_items;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::model::{Decode, Product};
use crate::transport::{JsonObject, Transport};

const LIST_PATH: &str = "/api/v2/product/list-all/";
const IMPORT_PATH: &str = "/api/v2/public/product";

/// Page and category filter for a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListQuery {
    pub page: u32,
    /// Empty means every category.
    #[serde(default)]
    pub categories: Vec<i64>,
}

impl Default for ProductListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            categories: Vec::new(),
        }
    }
}

/// One product in a bulk import request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProduct {
    pub guid: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    pub is_visible: bool,
    #[serde(default)]
    pub categories: Vec<i64>,
    #[serde(default)]
    pub images: Vec<ImportImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportImage {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<bool>,
}

/// Product endpoints.
#[derive(Debug, Clone)]
pub struct ProductClient {
    transport: Transport,
}

impl ProductClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// One page of products, optionally limited to `category_ids`.
    pub fn list(&self, page: u32, category_ids: &[i64]) -> Result<Vec<Product>> {
        self.list_with(&ProductListQuery {
            page,
            categories: category_ids.to_vec(),
        })
    }

    #[instrument(skip(self), fields(page = query.page))]
    pub fn list_with(&self, query: &ProductListQuery) -> Result<Vec<Product>> {
        let payload = json!({
            "page": query.page,
            "categories": query.categories,
        });
        let response = self
            .transport
            .request(HttpMethod::Get, LIST_PATH, Some(&payload))?;
        let items = result_items(&response, "products")?;
        let products = Product::decode_all(items).inspect_err(|e| {
            warn!(error = %e, "product decode failed");
        })?;
        debug!(count = products.len(), "products listed");
        Ok(products)
    }

    /// Send `items` for import and return the server's summary
    /// (`success`, `skipped`, `errors`) untouched.
    #[instrument(skip_all, fields(items = items.len()))]
    pub fn bulk_import<T: Serialize>(&self, items: &[T]) -> Result<JsonObject> {
        let payload = serde_json::to_value(items)?;
        let summary = self
            .transport
            .request(HttpMethod::Post, IMPORT_PATH, Some(&payload))?;
        info!(
            success = ?summary.get("success"),
            skipped = ?summary.get("skipped"),
            "bulk import finished"
        );
        Ok(summary)
    }
}
