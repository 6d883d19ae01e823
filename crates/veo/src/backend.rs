//! Seam between the poll loop and the remote service.

use clipstudio_core::request::GenerationRequest;

use crate::error::GenerationError;
use crate::operation::Operation;

/// The three remote calls a generation needs.
///
/// [`VeoApi`](crate::api::VeoApi) is the HTTP implementation; tests drive
/// the poller with scripted operation sequences.
#[async_trait::async_trait]
pub trait VideoGenerationBackend: Send + Sync {
    /// Start a generation and return its operation handle.
    async fn submit(&self, request: &GenerationRequest) -> Result<Operation, GenerationError>;

    /// Re-fetch an operation by resource name.
    async fn get_operation(&self, name: &str) -> Result<Operation, GenerationError>;

    /// Download a finished video.
    async fn download(&self, uri: &str) -> Result<Vec<u8>, GenerationError>;
}
