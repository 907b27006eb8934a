use awscurl_core::hash::hex_sha256;
use awscurl_core::{Context, Result};
use bytes::Bytes;
use log::debug;

/// The complete request payload held in memory.
///
/// Cloning shares the buffer, so the bytes that are hashed and the bytes
/// that are sent are the same allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Body {
    bytes: Bytes,
    digest: String,
}

impl Body {
    /// Build a body from owned bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let digest = hex_sha256(&bytes);
        Self { bytes, digest }
    }

    /// Turn the `--data` argument into a body.
    ///
    /// `@path` reads the whole file, anything else is taken literally.
    pub async fn materialize(ctx: &Context, data: &str) -> Result<Self> {
        let Some(path) = data.strip_prefix('@') else {
            return Ok(Self::new(data.as_bytes().to_vec()));
        };

        let content = ctx.file_read(path).await?;
        debug!("read {} bytes of request body from {path}", content.len());
        Ok(Self::new(content))
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Lowercase hex SHA-256 of the payload.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}
