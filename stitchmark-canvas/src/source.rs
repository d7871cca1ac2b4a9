//! Image source references: classification, decoding, data-URI normalization.
//!
//! Hosts hand the canvas opaque strings. Three shapes are accepted:
//!
//! | Shape      | Example                         | How it is read            |
//! |------------|---------------------------------|---------------------------|
//! | Data URI   | `data:image/png;base64,iVBO…`   | payload after the comma   |
//! | Bare base64| `iVBORw0KGgo…`                  | decoded, mime sniffed     |
//! | File path  | `sketches/front.png`            | read from disk            |

#[cfg(test)]
#[path = "source_test.rs"]
mod source_test;

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// First bytes of every PNG stream.
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// An opaque reference to a raster image supplied by the host.
///
/// The raw string is the identity: caches compare it verbatim and two
/// sources are the same image exactly when their strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSource(String);

/// Failure while reading or decoding an [`ImageSource`].
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("data URI has no base64 payload")]
    MalformedDataUri,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("read failed for `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// What shape of reference a source string is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    DataUri,
    Base64,
    Path,
}

impl ImageSource {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify the raw string without decoding it.
    ///
    /// Anything that is not a data URI and does not look like a base64
    /// payload is treated as a file path.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        if self.0.starts_with("data:") {
            SourceKind::DataUri
        } else if looks_like_base64(&self.0) {
            SourceKind::Base64
        } else {
            SourceKind::Path
        }
    }

    /// Decode the referenced image into an RGBA8 buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the payload cannot be read, is not
    /// valid base64, or is not a decodable PNG/JPEG stream.
    pub fn decode(&self) -> Result<RgbaImage, SourceError> {
        Ok(image::load_from_memory(&self.bytes()?)?.to_rgba8())
    }

    /// Raw encoded bytes of the referenced image.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the payload cannot be read or is not
    /// valid base64.
    pub fn bytes(&self) -> Result<Vec<u8>, SourceError> {
        match self.kind() {
            SourceKind::DataUri => {
                let payload = self
                    .0
                    .split_once(',')
                    .map(|(_, payload)| payload)
                    .ok_or(SourceError::MalformedDataUri)?;
                Ok(decode_base64(payload)?)
            }
            SourceKind::Base64 => Ok(decode_base64(&self.0)?),
            SourceKind::Path => std::fs::read(&self.0).map_err(|source| SourceError::Io {
                path: self.0.clone(),
                source,
            }),
        }
    }

    /// Normalize the source into a `data:` URI a browser host can show.
    ///
    /// Bare base64 payloads carry no mime information, so the decoded
    /// bytes are sniffed: a PNG signature prefix picks `image/png`,
    /// anything else is assumed JPEG.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the payload cannot be read or is not
    /// valid base64.
    pub fn to_data_uri(&self) -> Result<String, SourceError> {
        if self.kind() == SourceKind::DataUri {
            return Ok(self.0.clone());
        }
        let bytes = self.bytes()?;
        let mime = sniff_mime(&bytes);
        Ok(format!("data:{mime};base64,{}", STANDARD.encode(&bytes)))
    }
}

impl From<&str> for ImageSource {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Payloads run to megabytes; show a prefix only.
        if self.0.len() > 32 {
            let prefix: String = self.0.chars().take(32).collect();
            write!(f, "{prefix}…")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Pick a mime type from decoded image bytes.
fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&PNG_SIGNATURE) {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// Heuristic for a bare base64 payload as opposed to a file path.
///
/// Real payloads are long and drawn from the base64 alphabet; paths
/// carry dots, separators, or other bytes outside it.
fn looks_like_base64(raw: &str) -> bool {
    raw.len() >= 16
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=' | b'\r' | b'\n'))
}

/// Decode base64 accepting both padded and unpadded payloads.
fn decode_base64(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(&cleaned)
        .or_else(|_| STANDARD_NO_PAD.decode(&cleaned))
}
