use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A marketplace a listing can come from.
///
/// Serializes to the lowercase wire strings (`"ebay"`, `"heritage"`,
/// `"comiclink"`). The "all platforms" filter sentinel is expressed by
/// omission at the query layer, not as a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ebay,
    Heritage,
    ComicLink,
}

impl Platform {
    /// All platforms, in display order.
    pub const ALL: [Platform; 3] = [Platform::Ebay, Platform::Heritage, Platform::ComicLink];

    /// The lowercase wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ebay => "ebay",
            Platform::Heritage => "heritage",
            Platform::ComicLink => "comiclink",
        }
    }

    /// The user-facing name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Ebay => "eBay",
            Platform::Heritage => "Heritage",
            Platform::ComicLink => "ComicLink",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ebay" => Ok(Platform::Ebay),
            "heritage" => Ok(Platform::Heritage),
            "comiclink" => Ok(Platform::ComicLink),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}
