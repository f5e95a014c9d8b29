use std::{fmt, str::FromStr};

use base64::{Engine, engine::general_purpose};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// MIME type assumed when a payload carries none and cannot be sniffed
const DEFAULT_MIME_TYPE: &str = "image/png";

/// Reference to a generated image
///
/// Either a remote URL or an embedded base64 payload tagged with its MIME
/// type. Serializes as a plain string: the URL itself, or a
/// `data:<mime>;base64,<payload>` URI.
#[derive(Debug, Clone, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub enum ImageRef {
    /// Remote image URL
    Url(String),
    /// Embedded image payload
    Base64 {
        /// MIME type of the decoded payload (e.g. "image/png")
        mime_type: String,
        /// Standard base64 encoding of the image bytes
        data: String,
    },
}

/// Reasons a string cannot become an [`ImageRef`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageRefError {
    #[error("image reference is empty")]
    Empty,
    #[error("image payload is not valid base64")]
    InvalidBase64,
    #[error("malformed data URI")]
    MalformedDataUri,
}

impl ImageRef {
    /// Build a URL reference, rejecting blank input
    pub fn url(url: impl Into<String>) -> Result<Self, ImageRefError> {
        let url = url.into();
        let trimmed = url.trim();

        if trimmed.is_empty() {
            return Err(ImageRefError::Empty);
        }

        Ok(Self::Url(trimmed.to_string()))
    }

    /// Build an embedded reference from a base64 payload
    ///
    /// Whitespace inside the payload is dropped. When `mime_type` is absent
    /// the type is sniffed from the decoded bytes.
    pub fn from_base64(data: &str, mime_type: Option<&str>) -> Result<Self, ImageRefError> {
        let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();

        if data.is_empty() {
            return Err(ImageRefError::Empty);
        }

        let bytes = general_purpose::STANDARD
            .decode(&data)
            .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(&data))
            .map_err(|_| ImageRefError::InvalidBase64)?;

        let mime_type = mime_type
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map_or_else(|| sniff_mime_type(&bytes).to_string(), str::to_string);

        Ok(Self::Base64 { mime_type, data })
    }

    /// Remote URL, if this is a URL reference
    pub fn as_url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Base64 { .. } => None,
        }
    }

    pub const fn is_embedded(&self) -> bool {
        matches!(self, Self::Base64 { .. })
    }
}

/// Guess an image MIME type from its leading magic bytes
fn sniff_mime_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => DEFAULT_MIME_TYPE,
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Base64 { mime_type, data } => write!(f, "data:{mime_type};base64,{data}"),
        }
    }
}

impl FromStr for ImageRef {
    type Err = ImageRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let Some(rest) = s.strip_prefix("data:") else {
            return Self::url(s);
        };

        let (mime_type, data) = rest
            .split_once(";base64,")
            .ok_or(ImageRefError::MalformedDataUri)?;

        Self::from_base64(data, Some(mime_type))
    }
}
