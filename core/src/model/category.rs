use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::{coerce_string, Decode, Fields};
use crate::error::DecodeError;
use crate::transport::JsonObject;

/// Field name -> text, for one locale.
pub type Translation = BTreeMap<String, String>;

/// Locale key used when no locale is given.
pub const DEFAULT_LOCALE_KEY: &str = "default";

/// A catalogue category as returned by the category grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    id: i64,
    url: String,
    translations: BTreeMap<String, Translation>,
    is_visible: bool,
    is_deleted: bool,
}

impl Category {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn translations(&self) -> &BTreeMap<String, Translation> {
        &self.translations
    }

    /// Name under the `default` locale key.
    pub fn name(&self) -> Option<&str> {
        self.name_in(DEFAULT_LOCALE_KEY)
    }

    /// Name under `locale`, or `None` when either the locale or its `name`
    /// entry is absent.
    pub fn name_in(&self, locale: &str) -> Option<&str> {
        self.translations
            .get(locale)
            .and_then(|t| t.get("name"))
            .map(String::as_str)
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

impl Decode for Category {
    const NAME: &'static str = "Category";

    fn decode(raw: &JsonObject) -> Result<Self, DecodeError> {
        let fields = Fields::new(Self::NAME, raw);
        Ok(Self {
            id: fields.int("id")?,
            url: fields.string("url")?,
            translations: translations(&fields)?,
            is_visible: fields.bool("is_visible")?,
            is_deleted: fields.bool("is_delete")?,
        })
    }
}

/// An empty map may arrive as `[]`.
fn translations(fields: &Fields<'_>) -> Result<BTreeMap<String, Translation>, DecodeError> {
    let locales = match fields.required("translations")? {
        Value::Object(locales) => locales,
        Value::Array(items) if items.is_empty() => return Ok(BTreeMap::new()),
        other => return Err(fields.invalid("translations", format!("is not an object: {other}"))),
    };

    let mut out = BTreeMap::new();
    for (locale, entries) in locales {
        let entries = match entries {
            Value::Object(entries) => entries,
            Value::Array(items) if items.is_empty() => {
                out.insert(locale.clone(), Translation::new());
                continue;
            }
            other => {
                return Err(fields.invalid(
                    "translations",
                    format!("entry `{locale}` is not an object: {other}"),
                ))
            }
        };

        let mut translation = Translation::new();
        for (key, text) in entries {
            if text.is_null() {
                continue;
            }
            let text = coerce_string(text).ok_or_else(|| {
                fields.invalid(
                    "translations",
                    format!("value `{locale}.{key}` is not a string: {text}"),
                )
            })?;
            translation.insert(key.clone(), text);
        }
        out.insert(locale.clone(), translation);
    }
    Ok(out)
}
