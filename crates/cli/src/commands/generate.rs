//! `clipstudio generate`: compose, poll, capture a thumbnail, store.

use std::io::IsTerminal;
use std::path::Path;

use clipstudio_core::composer::PromptComposer;
use clipstudio_core::progress::ProgressUpdate;
use clipstudio_core::request::{GenerationRequest, ReferenceImage};
use clipstudio_core::types::now_millis;
use clipstudio_db::models::video::{CreateVideoRecord, VideoRecord};
use clipstudio_db::repositories::VideoRepo;
use clipstudio_veo::{GeneratedVideo, GenerationPoller, VideoGenerationBackend};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cli::GenerateArgs;
use crate::commands::key;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// How many keys a single invocation will try before giving up.
pub const MAX_KEY_ATTEMPTS: usize = 3;

/// Source of a new API key when none is configured or one is rejected.
#[async_trait::async_trait]
pub trait KeyPrompt: Send {
    /// Return a validated and stored key, or `None` if the user cannot be
    /// asked. `reason` is shown before asking.
    async fn request_key(&mut self, state: &AppState, reason: &str) -> AppResult<Option<String>>;
}

/// Hidden-input prompt on the controlling terminal.
pub struct TerminalKeyPrompt;

#[async_trait::async_trait]
impl KeyPrompt for TerminalKeyPrompt {
    async fn request_key(&mut self, state: &AppState, reason: &str) -> AppResult<Option<String>> {
        if !std::io::stdin().is_terminal() {
            return Ok(None);
        }
        println!("{reason}");
        key::prompt_and_store(state).await.map(Some)
    }
}

pub async fn run(state: &AppState, args: GenerateArgs) -> AppResult<()> {
    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let result = run_with(
        state,
        args,
        |api_key| state.poller(api_key),
        &mut TerminalKeyPrompt,
        &cancel,
    )
    .await;

    ctrl_c.abort();
    result.map(|_| ())
}

/// The full `generate` flow with the backend and key prompt supplied by
/// the caller.
///
/// Nothing is written to disk or the library unless the generation
/// succeeds.
pub async fn run_with<B, F, P>(
    state: &AppState,
    args: GenerateArgs,
    make_poller: F,
    key_prompt: &mut P,
    cancel: &CancellationToken,
) -> AppResult<Option<VideoRecord>>
where
    B: VideoGenerationBackend,
    F: Fn(&str) -> AppResult<GenerationPoller<B>>,
    P: KeyPrompt,
{
    let request = compose(&args).await?;

    let mut api_key = match state.api_key().await? {
        Some(resolved) => {
            tracing::debug!(source = %resolved.source, "Using configured API key");
            resolved.key
        }
        None => key_prompt
            .request_key(state, "No API key configured.")
            .await?
            .ok_or(AppError::MissingApiKey)?,
    };

    let mut attempt = 1;
    let video = loop {
        let poller = make_poller(&api_key)?;
        match generate_once(&poller, &request, cancel).await {
            Err(AppError::Generation(err)) if err.is_auth() && attempt < MAX_KEY_ATTEMPTS => {
                tracing::warn!(attempt, error = %err, "API key rejected");
                match key_prompt.request_key(state, &err.user_message()).await? {
                    Some(next) => {
                        attempt += 1;
                        api_key = next;
                    }
                    None => return Err(err.into()),
                }
            }
            other => break other?,
        }
    };

    let prompt = args.prompt.trim().to_string();
    store_generated(state, prompt, video, args.output.as_deref(), !args.no_save).await
}

/// Build the request from command-line selections.
async fn compose(args: &GenerateArgs) -> AppResult<GenerationRequest> {
    let mut composer = PromptComposer::new(args.prompt.as_str())
        .aspect_ratio(args.aspect_ratio)
        .style(args.style)
        .music(args.music)
        .generate_audio(args.audio);

    if let Some(path) = &args.image {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::read_file(path, e))?;
        composer = composer.image(ReferenceImage::from_bytes(bytes)?);
    }

    Ok(composer.compose()?)
}

/// Run one generation, printing progress as it arrives.
async fn generate_once<B: VideoGenerationBackend>(
    poller: &GenerationPoller<B>,
    request: &GenerationRequest,
    cancel: &CancellationToken,
) -> AppResult<GeneratedVideo> {
    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_progress(rx));

    let result = poller.generate(request, &tx, cancel).await;

    drop(tx);
    let _ = printer.await;
    Ok(result?)
}

async fn print_progress(mut rx: mpsc::UnboundedReceiver<ProgressUpdate>) {
    while let Some(update) = rx.recv().await {
        if let Some(preview) = &update.preview {
            tracing::debug!(bytes = preview.len(), "Preview frame received");
        }
        println!("[{:>3}%] {}", update.percent, update.stage);
    }
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        println!("Cancelling...");
        cancel.cancel();
    }
}

/// Capture a thumbnail, optionally write the clip to `output`, and add it
/// to the library when `save` is set.
///
/// A failed thumbnail capture is logged and stored as an empty thumbnail.
pub async fn store_generated(
    state: &AppState,
    prompt: String,
    video: GeneratedVideo,
    output: Option<&Path>,
    save: bool,
) -> AppResult<Option<VideoRecord>> {
    if let Some(path) = output {
        tokio::fs::write(path, &video.bytes)
            .await
            .map_err(|e| AppError::write_file(path, e))?;
        println!("Wrote clip to {}", path.display());
    }

    if !save {
        if output.is_none() {
            println!("Clip discarded (--no-save without --output)");
        }
        return Ok(None);
    }

    let thumbnail_blob = match state.thumbnail_capture().capture(&video.bytes).await {
        Ok(thumbnail) => thumbnail,
        Err(e) => {
            tracing::warn!(error = %e, "Thumbnail capture failed, saving without thumbnail");
            Vec::new()
        }
    };

    let record = VideoRepo::add(
        &state.pool,
        &CreateVideoRecord {
            prompt,
            video_blob: video.bytes,
            thumbnail_blob,
            timestamp_millis: now_millis(),
        },
    )
    .await?;
    println!("Added to library as #{}", record.id);

    Ok(Some(record))
}
