//! Supported storefront markets and their API hosts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "CZ")]
    Cz,
    #[serde(rename = "HU")]
    Hu,
    #[serde(rename = "SPACE")]
    Space,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::Cz, Locale::Hu, Locale::Space];

    pub fn code(self) -> &'static str {
        match self {
            Locale::Cz => "CZ",
            Locale::Hu => "HU",
            Locale::Space => "SPACE",
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Locale::Cz => "https://www.pobo.cz",
            Locale::Hu => "https://www.pobo.hu",
            Locale::Space => "https://www.pobo.space",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Codes are matched exactly; `cz` is not `CZ`.
impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|locale| locale.code() == s)
            .ok_or_else(|| Error::InvalidLocale(s.to_string()))
    }
}
