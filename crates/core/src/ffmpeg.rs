//! Thumbnail capture through an external `ffmpeg` binary.
//!
//! The generated clip only exists in memory, so it is written to a
//! temporary directory first and a single JPEG frame is read back.

use std::path::{Path, PathBuf};

/// Default binary name, resolved through `PATH`.
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Seek offset for the thumbnail frame; skips fade-in black frames.
pub const THUMBNAIL_OFFSET_SECS: f64 = 0.5;

/// Thumbnail width in pixels; height follows the aspect ratio.
pub const THUMBNAIL_WIDTH: u32 = 320;

/// Error type for FFmpeg operations.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("ffmpeg produced no frame")]
    EmptyOutput,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Extracts a still frame from in-memory video bytes.
#[derive(Debug, Clone)]
pub struct ThumbnailCapture {
    ffmpeg: PathBuf,
    offset_secs: f64,
    width: u32,
}

impl Default for ThumbnailCapture {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG)
    }
}

impl ThumbnailCapture {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            offset_secs: THUMBNAIL_OFFSET_SECS,
            width: THUMBNAIL_WIDTH,
        }
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg
    }

    /// Return JPEG bytes of one frame from `video`.
    ///
    /// Clips shorter than the seek offset make ffmpeg exit cleanly without
    /// writing a frame; in that case the first frame is used instead.
    pub async fn capture(&self, video: &[u8]) -> Result<Vec<u8>, FfmpegError> {
        let dir = tempfile::tempdir()?;
        let video_path = dir.path().join("clip.mp4");
        let thumb_path = dir.path().join("thumb.jpg");

        tokio::fs::write(&video_path, video).await?;

        self.extract_frame(&video_path, &thumb_path, self.offset_secs)
            .await?;
        if let Some(frame) = read_frame(&thumb_path).await? {
            return Ok(frame);
        }

        tracing::debug!(
            offset_secs = self.offset_secs,
            "No frame at thumbnail offset, retrying at start of clip",
        );
        self.extract_frame(&video_path, &thumb_path, 0.0).await?;
        read_frame(&thumb_path).await?.ok_or(FfmpegError::EmptyOutput)
    }

    async fn extract_frame(
        &self,
        video_path: &Path,
        output_path: &Path,
        offset_secs: f64,
    ) -> Result<(), FfmpegError> {
        let output = tokio::process::Command::new(&self.ffmpeg)
            .args(frame_args(video_path, output_path, offset_secs, self.width))
            .output()
            .await
            .map_err(FfmpegError::NotFound)?;

        if !output.status.success() {
            return Err(FfmpegError::ExecutionFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(())
    }
}

/// Argument list for a single-frame JPEG extraction.
fn frame_args(video_path: &Path, output_path: &Path, offset_secs: f64, width: u32) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format!("{offset_secs:.3}"),
        "-i".to_string(),
        video_path.to_string_lossy().to_string(),
        "-frames:v".to_string(),
        "1".to_string(),
        "-vf".to_string(),
        format!("scale={width}:-2"),
        "-q:v".to_string(),
        "3".to_string(),
        output_path.to_string_lossy().to_string(),
    ]
}

/// Read the extracted frame, treating a missing or empty file as "no frame".
async fn read_frame(path: &Path) -> Result<Option<Vec<u8>>, FfmpegError> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.is_empty() => Ok(None),
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
