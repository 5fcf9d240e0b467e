//! Inbound image payload decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

const DATA_URI_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("Missing required field: imageData")]
    Missing,

    #[error("Data URI must be base64 encoded")]
    UnsupportedDataUri,

    #[error("Image data is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("Image is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
}

/// A base64 image ready to forward upstream.
///
/// The data-URI prefix, if any, has been stripped and the payload has been
/// checked to decode within the configured size bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    data: String,
    decoded_len: usize,
}

impl ImagePayload {
    /// Parse `imageData` as sent by clients: bare base64 or a
    /// `data:<mime>;base64,<data>` URI.
    ///
    /// MIME type precedence: data-URI prefix, then `explicit_mime`, then
    /// `default_mime`.
    pub fn parse(
        image_data: &str,
        explicit_mime: Option<&str>,
        default_mime: &str,
        max_bytes: usize,
    ) -> Result<Self, ImageError> {
        let image_data = image_data.trim();
        if image_data.is_empty() {
            return Err(ImageError::Missing);
        }

        let (uri_mime, body) = match image_data.strip_prefix(DATA_URI_PREFIX) {
            Some(rest) => {
                let marker = rest.find(BASE64_MARKER).ok_or(ImageError::UnsupportedDataUri)?;
                let mime = &rest[..marker];
                let body = &rest[marker + BASE64_MARKER.len()..];
                ((!mime.is_empty()).then_some(mime), body)
            }
            None => (None, image_data),
        };

        let data: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        if data.is_empty() {
            return Err(ImageError::Missing);
        }

        let decoded = STANDARD
            .decode(data.as_bytes())
            .map_err(|e| ImageError::InvalidBase64(e.to_string()))?;
        if decoded.len() > max_bytes {
            return Err(ImageError::TooLarge {
                size: decoded.len(),
                limit: max_bytes,
            });
        }

        let mime_type = uri_mime
            .or(explicit_mime.filter(|m| !m.trim().is_empty()))
            .unwrap_or(default_mime)
            .trim()
            .to_string();

        Ok(Self {
            mime_type,
            data,
            decoded_len: decoded.len(),
        })
    }

    /// Encode raw image bytes, e.g. read from a local file.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
            decoded_len: bytes.len(),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 body without any data-URI prefix.
    pub fn base64(&self) -> &str {
        &self.data
    }

    pub fn decoded_len(&self) -> usize {
        self.decoded_len
    }
}
