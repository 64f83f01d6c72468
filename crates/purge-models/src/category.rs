use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of download tracked by the remote service.
///
/// Each category owns its list endpoint, its control endpoint and the
/// name of the id field the control endpoint expects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "torrent", alias = "torrents")]
    Torrent,
    #[serde(rename = "webdl", alias = "web-download")]
    WebDownload,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Torrent, Category::WebDownload];

    /// Name used in configuration files and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Torrent => "torrent",
            Category::WebDownload => "webdl",
        }
    }

    /// Path of the paginated list endpoint, relative to the API base
    pub fn list_path(&self) -> &'static str {
        match self {
            Category::Torrent => "torrents/mylist",
            Category::WebDownload => "webdl/mylist",
        }
    }

    /// Path of the control endpoint used for deletes, relative to the API base
    pub fn control_path(&self) -> &'static str {
        match self {
            Category::Torrent => "torrents/controltorrent",
            Category::WebDownload => "webdl/controlwebdownload",
        }
    }

    /// Payload field carrying the item id on the control endpoint
    pub fn id_field(&self) -> &'static str {
        match self {
            Category::Torrent => "torrent_id",
            Category::WebDownload => "webdl_id",
        }
    }

    /// Parse a comma separated list such as `torrent,webdl`.
    ///
    /// Blank segments are ignored; duplicates are kept once, in first-seen order.
    pub fn parse_list(value: &str) -> Result<Vec<Category>, ParseCategoryError> {
        let mut categories = Vec::new();
        for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let category = part.parse::<Category>()?;
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        Ok(categories)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError {
    value: String,
}

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown category '{}'. Use 'torrent' or 'webdl'",
            self.value
        )
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "torrent" | "torrents" => Ok(Category::Torrent),
            "webdl" | "web-download" => Ok(Category::WebDownload),
            _ => Err(ParseCategoryError {
                value: s.to_string(),
            }),
        }
    }
}
