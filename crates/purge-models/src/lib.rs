pub mod category;
pub mod item;
pub mod state;

pub use category::{Category, ParseCategoryError};
pub use item::{Item, ItemId};
pub use state::DownloadState;
