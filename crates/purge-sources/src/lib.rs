pub mod error;
pub mod torbox;
pub mod traits;

pub use error::ClientError;
pub use torbox::TorboxClient;
pub use traits::{DeleteOutcome, DownloadService, FetchOutcome, Page};
