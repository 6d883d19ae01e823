//! Long-poll loop for a single generation.
//!
//! [`GenerationPoller::generate`] submits a request, re-fetches the
//! operation at a fixed interval while emitting [`ProgressUpdate`]s, and
//! resolves to the downloaded video bytes. A failed call propagates
//! immediately; there is no retry.

use std::time::Duration;

use clipstudio_core::progress::ProgressUpdate;
use clipstudio_core::request::GenerationRequest;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::backend::VideoGenerationBackend;
use crate::error::{GenerationError, NO_VIDEOS_MESSAGE};
use crate::operation::Operation;

/// Fixed delay between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// A successfully generated and downloaded clip.
#[derive(Debug, Clone)]
pub struct GeneratedVideo {
    pub bytes: Vec<u8>,
    /// Resource name of the finished operation.
    pub operation_name: String,
    /// Download URI the bytes were fetched from (without the key).
    pub video_uri: String,
}

/// Drives one request at a time through a [`VideoGenerationBackend`].
pub struct GenerationPoller<B> {
    backend: B,
    poll_interval: Duration,
}

impl<B: VideoGenerationBackend> GenerationPoller<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Run a request to completion.
    ///
    /// One update is sent per unfinished poll, then a final 100% update
    /// once the video bytes are downloaded. A closed `progress` receiver
    /// does not stop the loop. `cancel` is checked while waiting between
    /// polls and again before and during the download; once it fires no
    /// video is returned.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        progress: &mpsc::UnboundedSender<ProgressUpdate>,
        cancel: &CancellationToken,
    ) -> Result<GeneratedVideo, GenerationError> {
        let mut operation = self.backend.submit(request).await?;
        tracing::info!(operation = %operation.name, "Generation submitted");

        let mut attempt = 0u32;
        while !operation.done {
            attempt += 1;
            let update =
                ProgressUpdate::new(operation.progress_percent()).with_preview(operation.preview_image());
            tracing::debug!(
                operation = %operation.name,
                attempt,
                percent = update.percent,
                stage = %update.stage,
                "Generation in progress",
            );
            let _ = progress.send(update);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(operation = %operation.name, attempt, "Generation cancelled");
                    return Err(GenerationError::Cancelled);
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            operation = self.backend.get_operation(&operation.name).await?;
        }

        if cancel.is_cancelled() {
            tracing::info!(operation = %operation.name, attempt, "Generation cancelled after completion");
            return Err(GenerationError::Cancelled);
        }

        let video_uri = resolve_video_uri(&operation)?;
        tracing::info!(operation = %operation.name, attempt, "Generation finished, downloading video");

        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(operation = %operation.name, "Download cancelled");
                return Err(GenerationError::Cancelled);
            }
            bytes = self.backend.download(&video_uri) => bytes?,
        };
        let _ = progress.send(ProgressUpdate::complete());
        tracing::info!(
            operation = %operation.name,
            bytes = bytes.len(),
            "Video downloaded",
        );

        Ok(GeneratedVideo {
            bytes,
            operation_name: operation.name,
            video_uri,
        })
    }
}

/// Pick the download URI from a finished operation, or explain its absence.
///
/// Precedence: first video, embedded error, safety-filter reason, generic
/// message.
pub fn resolve_video_uri(operation: &Operation) -> Result<String, GenerationError> {
    if let Some(uri) = operation.first_video_uri() {
        return Ok(uri.to_string());
    }

    let reason = operation
        .error_message()
        .or_else(|| operation.filtered_reason())
        .unwrap_or(NO_VIDEOS_MESSAGE);

    tracing::warn!(operation = %operation.name, reason, "Operation finished without a video");
    Err(GenerationError::NoOutput(reason.to_string()))
}
