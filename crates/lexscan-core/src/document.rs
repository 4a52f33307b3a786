use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{LexError, Result};

/// Location of a stored document: a bucket-style container plus an object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentReference {
    pub container: String,
    pub key: String,
}

impl DocumentReference {
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }

    /// Parse `s3://container/key`. Everything after the first `/` is the key, verbatim.
    pub fn parse(s: &str) -> Result<Self> {
        let rest = s.strip_prefix("s3://").ok_or_else(|| {
            LexError::InvalidInput(format!("document reference '{s}' must use the s3:// scheme"))
        })?;

        let (container, key) = rest
            .split_once('/')
            .ok_or_else(|| LexError::InvalidInput(format!("missing object key in '{s}'")))?;
        if container.is_empty() {
            return Err(LexError::InvalidInput(format!("missing bucket in '{s}'")));
        }
        if key.is_empty() {
            return Err(LexError::InvalidInput(format!("missing object key in '{s}'")));
        }

        Ok(Self::new(container, key))
    }
}

impl fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.container, self.key)
    }
}

impl FromStr for DocumentReference {
    type Err = LexError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Reject names that would escape the upload prefix or produce an empty key.
pub fn validate_file_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LexError::InvalidInput("file name is empty".into()));
    }
    if trimmed.contains('/') || trimmed.contains('\\') || trimmed == "." || trimmed == ".." {
        return Err(LexError::InvalidInput(format!(
            "file name '{trimmed}' must not contain path separators"
        )));
    }
    Ok(trimmed)
}

/// Opaque byte storage addressed by [`DocumentReference`].
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn exists(&self, reference: &DocumentReference) -> Result<bool>;
    async fn put(&self, reference: &DocumentReference, bytes: Vec<u8>) -> Result<()>;
    /// Fetch an object's bytes; a missing object is [`LexError::ReferenceNotFound`].
    async fn get(&self, reference: &DocumentReference) -> Result<Vec<u8>>;
}
