//! DocAI API Library
//!
//! HTTP handlers, application state and setup for the document conversion
//! front-end.

mod api_doc;
mod handlers;
mod utils;

pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::{AppState, ConversionState};
