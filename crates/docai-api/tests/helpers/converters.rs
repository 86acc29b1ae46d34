//! Converters that let tests control when and how a conversion finishes.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use docai_worker::Converter;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Passthrough converter that blocks until the test releases it.
pub struct GatedConverter {
    gate: Arc<Semaphore>,
}

impl GatedConverter {
    /// Returns the converter and the gate. Each `add_permits(1)` lets one
    /// conversion through.
    pub fn new() -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (Arc::new(Self { gate: gate.clone() }), gate)
    }
}

#[async_trait]
impl Converter for GatedConverter {
    async fn convert(&self, input: Bytes) -> Result<Bytes> {
        self.gate.acquire().await?.forget();
        Ok(input)
    }

    fn name(&self) -> &str {
        "gated"
    }
}

pub struct FailingConverter;

#[async_trait]
impl Converter for FailingConverter {
    async fn convert(&self, _input: Bytes) -> Result<Bytes> {
        Err(anyhow!("document is encrypted"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
