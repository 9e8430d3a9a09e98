//! Local text extraction for uploaded PDFs.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Unable to read PDF: {0}")]
    Unreadable(String),

    #[error("Encrypted PDFs are not supported")]
    Encrypted,

    #[error("No extractable text found in PDF")]
    NoText,
}

/// Extract the text of every page, in page order.
///
/// Parsing is CPU-bound, so callers on the async runtime should go through
/// [`extract_text_blocking`].
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    let document =
        lopdf::Document::load_mem(bytes).map_err(|e| PdfError::Unreadable(e.to_string()))?;

    if document.is_encrypted() {
        return Err(PdfError::Encrypted);
    }

    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    if pages.is_empty() {
        return Err(PdfError::NoText);
    }

    let text = document
        .extract_text(&pages)
        .map_err(|e| PdfError::Unreadable(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(PdfError::NoText);
    }

    Ok(text)
}

/// [`extract_text`] on the blocking thread pool.
pub async fn extract_text_blocking(bytes: Vec<u8>) -> Result<String, PdfError> {
    tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| PdfError::Unreadable(format!("extraction task failed: {}", e)))?
}
