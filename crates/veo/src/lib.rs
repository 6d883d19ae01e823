//! Client for the hosted video-generation API.
//!
//! Provides the long-running operation wire types, HTTP error
//! classification, the [`VeoApi`](api::VeoApi) REST client and the
//! [`GenerationPoller`](poller::GenerationPoller) that drives a request
//! from submission to downloaded bytes.

pub mod api;
pub mod backend;
pub mod error;
pub mod operation;
pub mod poller;

pub use api::VeoApi;
pub use backend::VideoGenerationBackend;
pub use error::GenerationError;
pub use poller::{GeneratedVideo, GenerationPoller};
