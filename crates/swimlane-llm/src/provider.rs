use std::path::Path;

use async_trait::async_trait;

use crate::error::ProviderError;

/// A document attached to a generate call, in caller-defined order.
#[derive(Clone, Debug)]
pub struct Document {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Document {
    /// In-memory text document.
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime_type: "text/plain".into(),
            data: content.into().into_bytes(),
        }
    }

    /// Load a document from disk, inferring the mime type from the
    /// extension (only the types the pipeline actually attaches).
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        let mime_type = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
            _ => "text/plain",
        }
        .to_string();
        Ok(Self { name, mime_type, data })
    }
}

/// Trait implemented by each generative backend.
///
/// The pipeline's only contract with the service: a fixed instruction
/// prompt plus an ordered document set in, free text out, persisted
/// verbatim as the next artifact. No retry policy lives here.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;

    async fn generate(
        &self,
        prompt: &str,
        documents: &[Document],
    ) -> Result<String, ProviderError>;
}
