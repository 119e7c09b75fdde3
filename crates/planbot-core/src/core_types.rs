//! Shared value types for the gateway boundary
//!
//! The completion gateway accepts an optional inline image alongside the
//! prompt text. Browsers deliver uploads as data URLs, so the constructor
//! strips the `data:<mime>;base64,` prefix before the payload crosses the
//! provider boundary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    /// Raw base64 payload, without any data-URL prefix.
    pub data: String,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Build an inline image from a browser upload, which may arrive either as
    /// a bare base64 string or as a `data:image/png;base64,...` URL.
    pub fn from_data_url(mime_type: &str, data: &str) -> Self {
        let payload = match data.split_once(',') {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => data,
        };
        Self::new(mime_type, payload)
    }
}
