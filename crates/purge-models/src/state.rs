use serde::{Deserialize, Serialize};
use std::fmt;

/// Download state label as reported by the remote service.
///
/// The remote set is open-ended; labels this crate does not know about are
/// kept verbatim in `Other`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum DownloadState {
    /// `metaDL`
    MetadataFetch,
    /// `stalled (no seeds)`
    StalledNoSeeds,
    /// `stalledDL`
    StalledDownload,
    /// `checking`
    Checking,
    /// `missingFiles`
    MissingFiles,
    /// `uploading (no peers)`
    UploadingNoPeers,
    /// `uploading`
    Uploading,
    /// `downloading`
    Downloading,
    Other(String),
}

impl DownloadState {
    pub fn as_str(&self) -> &str {
        match self {
            DownloadState::MetadataFetch => "metaDL",
            DownloadState::StalledNoSeeds => "stalled (no seeds)",
            DownloadState::StalledDownload => "stalledDL",
            DownloadState::Checking => "checking",
            DownloadState::MissingFiles => "missingFiles",
            DownloadState::UploadingNoPeers => "uploading (no peers)",
            DownloadState::Uploading => "uploading",
            DownloadState::Downloading => "downloading",
            DownloadState::Other(label) => label,
        }
    }

    /// States in which an item makes no forward progress
    pub fn is_stuck(&self) -> bool {
        matches!(
            self,
            DownloadState::MetadataFetch
                | DownloadState::StalledNoSeeds
                | DownloadState::StalledDownload
                | DownloadState::Checking
                | DownloadState::MissingFiles
                | DownloadState::UploadingNoPeers
                | DownloadState::Uploading
        )
    }

    pub fn is_downloading(&self) -> bool {
        matches!(self, DownloadState::Downloading)
    }
}

impl From<&str> for DownloadState {
    fn from(label: &str) -> Self {
        match label {
            "metaDL" => DownloadState::MetadataFetch,
            "stalled (no seeds)" => DownloadState::StalledNoSeeds,
            "stalledDL" => DownloadState::StalledDownload,
            "checking" => DownloadState::Checking,
            "missingFiles" => DownloadState::MissingFiles,
            "uploading (no peers)" => DownloadState::UploadingNoPeers,
            "uploading" => DownloadState::Uploading,
            "downloading" => DownloadState::Downloading,
            other => DownloadState::Other(other.to_string()),
        }
    }
}

impl From<String> for DownloadState {
    fn from(label: String) -> Self {
        match DownloadState::from(label.as_str()) {
            DownloadState::Other(_) => DownloadState::Other(label),
            known => known,
        }
    }
}

impl From<DownloadState> for String {
    fn from(state: DownloadState) -> Self {
        match state {
            DownloadState::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
