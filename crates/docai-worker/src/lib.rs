//! DocAI Worker Library
//!
//! Background conversion of uploaded documents: the [`Converter`] collaborator,
//! the in-process [`ConversionQueue`] that runs it, and the [`JobTracker`] that
//! records what happened to each upload.

pub mod converter;
pub mod queue;
pub mod tracker;

pub use converter::{converter_from_command, CommandConverter, Converter, PassthroughConverter};
pub use queue::{ConversionJob, ConversionQueue};
pub use tracker::{JobEvent, JobRecord, JobTracker};
