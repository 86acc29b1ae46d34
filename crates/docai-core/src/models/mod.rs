pub mod conversion;
pub mod file;

pub use conversion::{ConversionStatus, StatusResponse, UploadResponse};
pub use file::{Bucket, FileId};
