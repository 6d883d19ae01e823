//! The immutable request handed to the generation backend.
//!
//! A [`GenerationRequest`] is only built through
//! [`PromptComposer`](crate::composer::PromptComposer), so every request
//! that reaches the network has already passed validation.

use std::fmt;
use std::str::FromStr;

use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Aspect ratio
// ---------------------------------------------------------------------------

/// Output frame shape. Serialized as the wire string (`"16:9"`, `"9:16"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "16:9" | "landscape" => Ok(Self::Landscape),
            "9:16" | "portrait" => Ok(Self::Portrait),
            other => Err(CoreError::Validation(format!(
                "Invalid aspect ratio '{other}'. Must be one of: 16:9, 9:16"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Reference image
// ---------------------------------------------------------------------------

/// An optional still image the model animates from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    bytes: Vec<u8>,
    mime_type: &'static str,
}

impl ReferenceImage {
    /// Sniff the image header and accept PNG, JPEG or WebP.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CoreError> {
        if bytes.is_empty() {
            return Err(CoreError::Validation("Reference image is empty".to_string()));
        }

        let format = image::guess_format(&bytes).map_err(|_| {
            CoreError::Validation("Reference image format not recognized".to_string())
        })?;

        let mime_type = match format {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            other => {
                return Err(CoreError::Validation(format!(
                    "Unsupported reference image format: {other:?}. Use PNG, JPEG or WebP"
                )))
            }
        };

        Ok(Self { bytes, mime_type })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        self.mime_type
    }
}

// ---------------------------------------------------------------------------
// Generation request
// ---------------------------------------------------------------------------

/// A single user submission, fixed once composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt_text: String,
    image: Option<ReferenceImage>,
    aspect_ratio: AspectRatio,
    generate_audio: bool,
}

impl GenerationRequest {
    pub(crate) fn new(
        prompt_text: String,
        image: Option<ReferenceImage>,
        aspect_ratio: AspectRatio,
        generate_audio: bool,
    ) -> Self {
        Self {
            prompt_text,
            image,
            aspect_ratio,
            generate_audio,
        }
    }

    /// Final prompt text, including any style and music fragments.
    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn image(&self) -> Option<&ReferenceImage> {
        self.image.as_ref()
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn generate_audio(&self) -> bool {
        self.generate_audio
    }
}
