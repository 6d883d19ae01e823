//! Wire types for the long-running predict endpoint.
//!
//! Submission returns an [`Operation`] which is re-fetched until `done`.
//! A finished operation carries either a `response` with generated
//! samples or an `error`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clipstudio_core::progress::clamp_percent;
use clipstudio_core::request::GenerationRequest;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

/// Body of `POST models/{model}:predictLongRunning`.
#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    pub instances: Vec<PredictInstance<'a>>,
    pub parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
pub struct PredictInstance<'a> {
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<InlineImage<'a>>,
}

/// Base64-encoded reference image.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage<'a> {
    pub bytes_base64_encoded: String,
    pub mime_type: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictParameters {
    pub aspect_ratio: &'static str,
    pub generate_audio: bool,
}

impl<'a> PredictRequest<'a> {
    pub fn from_request(request: &'a GenerationRequest) -> Self {
        let image = request.image().map(|img| InlineImage {
            bytes_base64_encoded: STANDARD.encode(img.bytes()),
            mime_type: img.mime_type(),
        });

        Self {
            instances: vec![PredictInstance {
                prompt: request.prompt_text(),
                image,
            }],
            parameters: PredictParameters {
                aspect_ratio: request.aspect_ratio().as_str(),
                generate_audio: request.generate_audio(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Operation handle
// ---------------------------------------------------------------------------

/// Handle for an in-flight (or finished) generation job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    /// Resource name, e.g. `models/veo-3.0-generate-001/operations/abc123`.
    pub name: String,
    #[serde(default)]
    pub done: bool,
    /// Free-form progress metadata. Field names are not a stable contract.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub response: Option<OperationResponse>,
    #[serde(default)]
    pub error: Option<OperationError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
    /// Populated when samples were withheld by safety filters.
    #[serde(default)]
    pub rai_media_filtered_reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<VideoDescriptor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDescriptor {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Error embedded in a finished operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Operation {
    /// Progress from `metadata.progressPercent`, 0 when absent.
    pub fn progress_percent(&self) -> u8 {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("progressPercent"))
            .and_then(serde_json::Value::as_f64)
            .map(clamp_percent)
            .unwrap_or(0)
    }

    /// Best-effort live preview frame from `metadata.previewImage`.
    ///
    /// The field is undocumented; anything unexpected yields `None`.
    pub fn preview_image(&self) -> Option<Vec<u8>> {
        let encoded = self
            .metadata
            .as_ref()?
            .pointer("/previewImage/bytesBase64Encoded")?
            .as_str()?;
        STANDARD.decode(encoded).ok()
    }

    fn video_response(&self) -> Option<&GenerateVideoResponse> {
        self.response.as_ref()?.generate_video_response.as_ref()
    }

    /// URI of the first generated sample that has one.
    pub fn first_video_uri(&self) -> Option<&str> {
        self.video_response()?
            .generated_samples
            .iter()
            .filter_map(|s| s.video.as_ref()?.uri.as_deref())
            .find(|uri| !uri.is_empty())
    }

    /// Message of the embedded error, if the operation failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_ref()?
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
    }

    /// First safety-filter reason, if samples were withheld.
    pub fn filtered_reason(&self) -> Option<&str> {
        self.video_response()?
            .rai_media_filtered_reasons
            .first()
            .map(String::as_str)
    }
}
