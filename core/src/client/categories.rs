use tracing::{debug, instrument, warn};

use super::result_items;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::model::{Category, Decode};
use crate::transport::Transport;

const GRID_PATH: &str = "/api/v2/category/grid/";

/// Category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryClient {
    transport: Transport,
}

impl CategoryClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Every category in the shop.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<Category>> {
        let response = self.transport.request(HttpMethod::Post, GRID_PATH, None)?;
        let items = result_items(&response, "category")?;
        let categories = Category::decode_all(items).inspect_err(|e| {
            warn!(error = %e, "category decode failed");
        })?;
        debug!(count = categories.len(), "categories listed");
        Ok(categories)
    }
}
