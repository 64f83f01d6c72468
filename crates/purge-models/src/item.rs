use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::category::Category;
use crate::state::DownloadState;

/// Timestamp layout used by the remote service for `created_at`
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Opaque item identifier.
///
/// The remote service reports numeric ids; textual ids are accepted as well
/// and serialized back in the same shape they arrived in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ItemId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Numeric(id) => write!(f, "{}", id),
            ItemId::Text(id) => f.write_str(id),
        }
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        ItemId::Numeric(id)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId::Text(id.to_string())
    }
}

/// One download entry, as fetched during a single cleanup run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub category: Category, // Which list this item came from
    pub created_at: String, // Raw value; parsed when classifying
    pub state: DownloadState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Item {
    pub fn new(
        id: impl Into<ItemId>,
        category: Category,
        created_at: impl Into<String>,
        state: impl Into<DownloadState>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            created_at: created_at.into(),
            state: state.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parse `created_at` as a UTC timestamp.
    ///
    /// The service format is `2024-05-01T12:00:00Z`; RFC 3339 values with an
    /// offset or fractional seconds are accepted too.
    pub fn created_at_utc(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        let raw = self.created_at.trim();
        match NaiveDateTime::parse_from_str(raw, CREATED_AT_FORMAT) {
            Ok(naive) => Ok(naive.and_utc()),
            Err(err) => DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| err),
        }
    }

    /// Human readable label for logs: the name when known, the id otherwise
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", self.id, name),
            None => self.id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_service_timestamp() {
        let item = Item::new(1u64, Category::Torrent, "2024-05-01T12:30:45Z", "checking");
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
        assert_eq!(item.created_at_utc().unwrap(), expected);
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let item = Item::new(1u64, Category::Torrent, "2024-05-01T14:30:45+02:00", "checking");
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
        assert_eq!(item.created_at_utc().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for raw in ["", "yesterday", "2024-13-01T00:00:00Z", "2024-05-01"] {
            let item = Item::new(1u64, Category::Torrent, raw, "checking");
            assert!(item.created_at_utc().is_err(), "{:?} should not parse", raw);
        }
    }

    #[test]
    fn test_item_id_keeps_wire_shape() {
        let numeric: ItemId = serde_json::from_str("42").unwrap();
        assert_eq!(numeric, ItemId::Numeric(42));
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "42");

        let text: ItemId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(text.to_string(), "abc");
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"abc\"");
    }

    #[test]
    fn test_label_prefers_name() {
        let item = Item::new(7u64, Category::WebDownload, "2024-05-01T12:30:45Z", "downloading")
            .with_name("ubuntu.iso");
        assert_eq!(item.label(), "7 (ubuntu.iso)");
    }
}
