//! Document converters run by the conversion queue.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

pub const INPUT_PLACEHOLDER: &str = "{input}";
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Characters a shell would interpret. Commands are never run through a shell,
/// but a template containing them is almost certainly a misconfiguration.
const FORBIDDEN_CHARS: &[char] = &[';', '|', '&', '$', '`', '<', '>', '\n', '\r'];

/// Turns an input document into its converted form.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, input: Bytes) -> Result<Bytes>;

    fn name(&self) -> &str;
}

/// Returns the input unchanged. Used when no converter command is configured.
#[derive(Debug, Default, Clone)]
pub struct PassthroughConverter;

#[async_trait]
impl Converter for PassthroughConverter {
    async fn convert(&self, input: Bytes) -> Result<Bytes> {
        Ok(input)
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

/// Runs an external program on a temporary copy of the document.
///
/// The template is split on whitespace; `{input}` and `{output}` in any argument
/// are replaced with paths inside a per-job temporary directory. The program must
/// write the converted document to `{output}` and exit with status 0.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandConverter {
    pub fn parse(template: &str, timeout: Duration) -> Result<Self> {
        let mut parts = template.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("Converter command is empty"))?
            .to_string();
        let args: Vec<String> = parts.map(String::from).collect();

        if let Some(bad) = std::iter::once(&program)
            .chain(args.iter())
            .find(|part| part.contains(FORBIDDEN_CHARS))
        {
            bail!("Converter command contains forbidden characters: {}", bad);
        }
        if !args.iter().any(|a| a.contains(INPUT_PLACEHOLDER)) {
            bail!("Converter command must reference {}", INPUT_PLACEHOLDER);
        }
        if !args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER)) {
            bail!("Converter command must reference {}", OUTPUT_PLACEHOLDER);
        }

        Ok(Self {
            program,
            args,
            timeout,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Converter for CommandConverter {
    async fn convert(&self, input: Bytes) -> Result<Bytes> {
        let work_dir = tempfile::tempdir().context("Failed to create conversion work directory")?;
        let input_path = work_dir.path().join("input.pdf");
        let output_path = work_dir.path().join("output.pdf");

        tokio::fs::write(&input_path, &input)
            .await
            .context("Failed to write conversion input")?;

        let input_arg = input_path.to_string_lossy();
        let output_arg = output_path.to_string_lossy();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| {
                a.replace(INPUT_PLACEHOLDER, &input_arg)
                    .replace(OUTPUT_PLACEHOLDER, &output_arg)
            })
            .collect();

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| anyhow!("Conversion timed out after {}s", self.timeout.as_secs()))?
            .with_context(|| format!("Failed to execute {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} failed ({}): {}", self.program, output.status, stderr.trim());
        }

        let data = tokio::fs::read(&output_path)
            .await
            .with_context(|| format!("{} produced no output file", self.program))?;

        Ok(Bytes::from(data))
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Build the converter for a configured command template, or the passthrough
/// converter when none is set.
pub fn converter_from_command(template: Option<&str>, timeout: Duration) -> Result<Arc<dyn Converter>> {
    match template.map(str::trim).filter(|t| !t.is_empty()) {
        Some(template) => {
            let converter = CommandConverter::parse(template, timeout)?;
            tracing::info!(program = %converter.program(), timeout_secs = timeout.as_secs(), "Using command converter");
            Ok(Arc::new(converter))
        }
        None => {
            tracing::warn!("CONVERTER_COMMAND not set; converted documents will be copies of the input");
            Ok(Arc::new(PassthroughConverter))
        }
    }
}
