//! Buffered multipart form parsing for the upload endpoints.

use crate::error::ApiError;
use crate::services::providers::MediaUpload;
use axum::extract::Multipart;
use std::collections::HashMap;

/// A file part read fully into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl UploadedFile {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<UploadedFile> for MediaUpload {
    fn from(file: UploadedFile) -> Self {
        MediaUpload {
            bytes: file.bytes,
            file_name: file.file_name,
            mime_type: file.mime_type,
        }
    }
}

/// File and text parts of a multipart body, keyed by field name.
///
/// A part with a file name is a file; everything else is text. Repeated
/// names keep the last part.
#[derive(Debug, Default)]
pub struct UploadForm {
    files: HashMap<String, UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(multipart: Multipart) -> Result<Self, ApiError> {
        Self::read_capped(multipart, &[]).await
    }

    /// Like [`UploadForm::read`], with per-field size caps for file parts.
    ///
    /// A capped file is read in chunks. Once it grows past its cap it is
    /// kept with `cap + 1` bytes and reading stops, leaving the rest of the
    /// body unread; callers detect the overflow from the length.
    pub async fn read_capped(
        mut multipart: Multipart,
        caps: &[(&str, usize)],
    ) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(mut field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let mime_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let cap = caps
                        .iter()
                        .find(|(capped, _)| *capped == name)
                        .map(|(_, cap)| *cap);

                    let (bytes, overflowed) = match cap {
                        Some(cap) => {
                            let mut bytes = Vec::new();
                            let mut overflowed = false;
                            while let Some(chunk) = field.chunk().await? {
                                bytes.extend_from_slice(&chunk);
                                if bytes.len() > cap {
                                    bytes.truncate(cap + 1);
                                    overflowed = true;
                                    break;
                                }
                            }
                            (bytes, overflowed)
                        }
                        None => (field.bytes().await?.to_vec(), false),
                    };

                    form.files.insert(
                        name,
                        UploadedFile {
                            bytes,
                            file_name,
                            mime_type,
                        },
                    );

                    if overflowed {
                        break;
                    }
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Remove and return a non-empty file part.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name).filter(|f| !f.is_empty())
    }

    /// A text part, trimmed; blank values count as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}
