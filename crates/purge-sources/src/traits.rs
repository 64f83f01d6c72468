use async_trait::async_trait;
use purge_models::{Category, Item, ItemId};
use tracing::{debug, warn};

use crate::error::ClientError;

/// One page of a list endpoint.
///
/// `entries` counts what the service sent, including entries that were
/// dropped as malformed, so pagination is not cut short by bad data.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Item>,
    pub entries: usize,
}

impl Page {
    pub fn new(items: Vec<Item>) -> Self {
        let entries = items.len();
        Self { items, entries }
    }
}

/// Items collected for one category, plus the error that ended the fetch early
#[derive(Debug)]
pub struct FetchOutcome {
    pub items: Vec<Item>,
    pub error: Option<ClientError>,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { body: String },
    Failed { reason: String },
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted { .. })
    }
}

#[async_trait]
pub trait DownloadService: Send + Sync {
    fn service_name(&self) -> &str;

    /// Fetch a single page of a category's list
    async fn list_page(
        &self,
        category: Category,
        offset: usize,
        limit: usize,
    ) -> Result<Page, ClientError>;

    /// Delete one item. Failures are reported, never raised.
    async fn delete_item(&self, id: &ItemId, category: Category) -> DeleteOutcome;

    /// Walk the paginated list of a category.
    ///
    /// Stops on an empty or short page. A failed request stops the walk and
    /// the items gathered so far are returned alongside the error.
    async fn list_items(&self, category: Category, page_size: usize) -> FetchOutcome {
        let page_size = page_size.max(1);
        let mut items = Vec::new();
        let mut offset = 0;

        loop {
            match self.list_page(category, offset, page_size).await {
                Ok(page) => {
                    let entries = page.entries;
                    items.extend(page.items);
                    debug!(
                        operation = "fetch_page",
                        category = %category,
                        offset,
                        entries,
                        total = items.len(),
                        "Fetched page"
                    );

                    if entries < page_size {
                        return FetchOutcome {
                            items,
                            error: None,
                        };
                    }
                    offset += page_size;
                }
                Err(error) => {
                    warn!(
                        operation = "fetch_page_error",
                        category = %category,
                        offset,
                        collected = items.len(),
                        error = %error,
                        "Failed to fetch page, continuing with partial list"
                    );
                    return FetchOutcome {
                        items,
                        error: Some(error),
                    };
                }
            }
        }
    }
}
