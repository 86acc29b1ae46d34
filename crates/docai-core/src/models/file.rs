use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Identifier minted per upload.
///
/// Used as the blob key in both buckets and as the reference handed back to the
/// client. Uniqueness relies on UUID v4 randomness alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    pub fn new() -> Self {
        FileId(Uuid::new_v4())
    }

    /// Parse an opaque client token. Only the lowercase hyphenated form this
    /// type displays as is accepted, so a token always names exactly one blob
    /// key and one download filename.
    pub fn parse(token: &str) -> Option<Self> {
        let id = Uuid::try_parse(token).ok().map(FileId)?;
        (id.to_string() == token).then_some(id)
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for FileId {
    fn from(id: Uuid) -> Self {
        FileId(id)
    }
}

impl Display for FileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Logical blob buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Input,
    Output,
}

impl Bucket {
    pub const ALL: [Bucket; 2] = [Bucket::Input, Bucket::Output];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Input => "input",
            Bucket::Output => "output",
        }
    }
}

impl Display for Bucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
