use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::file::FileId;

/// Lifecycle of a conversion job as seen by the in-process tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl ConversionStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, ConversionStatus::Completed | ConversionStatus::Failed)
    }
}

impl Display for ConversionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ConversionStatus::Queued => write!(f, "queued"),
            ConversionStatus::Processing => write!(f, "processing"),
            ConversionStatus::Completed => write!(f, "completed"),
            ConversionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Body returned by `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub file_id: FileId,
    /// Always `"processing"`: the conversion has been scheduled, not finished.
    pub status: String,
}

impl UploadResponse {
    pub fn processing(file_id: FileId) -> Self {
        Self {
            file_id,
            status: "processing".to_string(),
        }
    }
}

/// Body returned by `GET /status/{file_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub file_id: FileId,
    pub status: ConversionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
