use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::{timestamp, Decode, Fields};
use crate::error::DecodeError;
use crate::transport::JsonObject;

/// A product as listed by the product catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    id: i64,
    name: String,
    guid: String,
    short_description: Option<String>,
    image_preview: Option<String>,
    is_visible: bool,
    is_favourite: bool,
    created_at: DateTime<FixedOffset>,
}

impl Product {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Externally assigned identifier. Usually UUID-shaped, never checked.
    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn short_description(&self) -> Option<&str> {
        self.short_description.as_deref()
    }

    /// URL of the preview image.
    pub fn image_preview(&self) -> Option<&str> {
        self.image_preview.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn is_favourite(&self) -> bool {
        self.is_favourite
    }

    pub fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }
}

impl Decode for Product {
    const NAME: &'static str = "Product";

    fn decode(raw: &JsonObject) -> Result<Self, DecodeError> {
        let fields = Fields::new(Self::NAME, raw);
        let created_at = fields.required("created_at")?;
        let created_at = timestamp::parse(created_at).ok_or_else(|| DecodeError::InvalidTimestamp {
            model: fields.model(),
            value: created_at.to_string(),
        })?;

        Ok(Self {
            id: fields.int("id")?,
            name: fields.string("name")?,
            guid: fields.string("guid")?,
            short_description: fields.opt_string("short_description")?,
            image_preview: fields.opt_string("image_preview")?,
            is_visible: fields.bool_or("is_visible", false)?,
            is_favourite: fields.bool_or("is_favourite", false)?,
            created_at,
        })
    }
}
