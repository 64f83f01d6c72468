use purge_models::{Category, Item, ItemId};
use serde::Deserialize;
use tracing::warn;

use crate::error::ClientError;
use crate::traits::{DeleteOutcome, Page};

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    id: Option<ItemId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    download_state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ControlResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl WireItem {
    fn into_item(self, category: Category) -> Result<Item, &'static str> {
        let id = self.id.ok_or("missing id")?;
        let state = self.download_state.ok_or("missing download_state")?;
        Ok(Item {
            id,
            category,
            // An absent timestamp is left for the classifier to reject
            created_at: self.created_at.unwrap_or_default(),
            state: state.into(),
            name: self.name,
        })
    }
}

/// Decode a list endpoint body (`{"data": [...]}`) into a page of items
pub fn parse_list_body(body: &str, category: Category) -> Result<Page, ClientError> {
    let response: ListResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))?;

    if response.success == Some(false) {
        return Err(ClientError::Rejected(
            response.detail.unwrap_or_else(|| "no detail given".to_string()),
        ));
    }

    let entries = response.data.unwrap_or_default();
    let count = entries.len();
    let mut items = Vec::with_capacity(count);
    for (index, raw) in entries.into_iter().enumerate() {
        let raw_id = raw.get("id").cloned();
        let parsed = serde_json::from_value::<WireItem>(raw)
            .map_err(|e| e.to_string())
            .and_then(|entry| entry.into_item(category).map_err(str::to_string));
        match parsed {
            Ok(item) => items.push(item),
            Err(reason) => {
                warn!(
                    operation = "parse_item_error",
                    category = %category,
                    index,
                    id = ?raw_id,
                    reason = %reason,
                    "Skipping malformed entry"
                );
            }
        }
    }

    Ok(Page {
        items,
        entries: count,
    })
}

/// JSON body for the control endpoint's delete operation
pub fn delete_payload(id: &ItemId, category: Category) -> serde_json::Value {
    let mut payload = serde_json::Map::new();
    payload.insert(
        category.id_field().to_string(),
        serde_json::to_value(id).unwrap_or(serde_json::Value::Null),
    );
    payload.insert("operation".to_string(), serde_json::Value::from("delete"));
    serde_json::Value::Object(payload)
}

/// Turn a control endpoint answer into an outcome.
///
/// Non-2xx statuses fail. A 2xx body that reports `"success": false` fails
/// too; anything else (including non-JSON bodies) counts as deleted.
pub fn interpret_delete_response(status: u16, body: String) -> DeleteOutcome {
    if !(200..300).contains(&status) {
        return DeleteOutcome::Failed {
            reason: format!("HTTP {}: {}", status, body),
        };
    }

    if let Ok(response) = serde_json::from_str::<ControlResponse>(&body) {
        if response.success == Some(false) {
            let reason = response
                .detail
                .or(response.error)
                .unwrap_or_else(|| body.clone());
            return DeleteOutcome::Failed { reason };
        }
    }

    DeleteOutcome::Deleted { body }
}
