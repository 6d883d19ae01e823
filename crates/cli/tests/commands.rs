use std::collections::VecDeque;
use std::time::Duration;

use assert_matches::assert_matches;
use clap::Parser;
use clipstudio_cli::cli::{Cli, Command, GenerateArgs};
use clipstudio_cli::commands::generate::{self, KeyPrompt};
use clipstudio_cli::commands::{key, library};
use clipstudio_cli::config::AppConfig;
use clipstudio_cli::error::{AppError, AppResult};
use clipstudio_cli::state::AppState;
use clipstudio_core::api_key::ApiKeySource;
use clipstudio_core::error::CoreError;
use clipstudio_core::request::GenerationRequest;
use clipstudio_db::repositories::VideoRepo;
use clipstudio_veo::error::GenerationError;
use clipstudio_veo::operation::Operation;
use clipstudio_veo::{GeneratedVideo, GenerationPoller, VideoGenerationBackend};
use serde_json::json;
use tokio_util::sync::CancellationToken;

async fn state_with(env_api_key: Option<&str>) -> AppState {
    let env_api_key = env_api_key.map(str::to_string);
    let config = AppConfig::from_lookup(|var| match var {
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "FFMPEG_PATH" => Some("/nonexistent/bin/ffmpeg-clipstudio".to_string()),
        "GEMINI_API_KEY" => env_api_key.clone(),
        _ => None,
    })
    .unwrap();
    AppState::init(config).await.unwrap()
}

fn video(bytes: &[u8]) -> GeneratedVideo {
    GeneratedVideo {
        bytes: bytes.to_vec(),
        operation_name: "models/veo/operations/1".to_string(),
        video_uri: "https://example.test/files/clip:download?alt=media".to_string(),
    }
}

// ---------------------------------------------------------------------------
// API key
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stored_key_overrides_environment_until_cleared() {
    let state = state_with(Some("env-key-0000")).await;

    let resolved = state.api_key().await.unwrap().unwrap();
    assert_eq!(resolved.source, ApiKeySource::Environment);

    key::set(&state, Some("  stored-key-1234 ".to_string())).await.unwrap();
    let resolved = state.api_key().await.unwrap().unwrap();
    assert_eq!(resolved.key, "stored-key-1234");
    assert_eq!(resolved.source, ApiKeySource::Stored);

    key::clear(&state).await.unwrap();
    let resolved = state.api_key().await.unwrap().unwrap();
    assert_eq!(resolved.key, "env-key-0000");
}

#[tokio::test]
async fn blank_key_is_rejected() {
    let state = state_with(None).await;
    let err = key::set(&state, Some("   ".to_string())).await.unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Validation(_)));
    assert!(state.api_key().await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Storing a generated clip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn thumbnail_failure_still_saves_clip() {
    let state = state_with(None).await;

    let record = generate::store_generated(&state, "A kite".to_string(), video(b"mp4"), None, true)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.prompt, "A kite");
    assert_eq!(record.video_blob, b"mp4");
    assert!(record.thumbnail_blob.is_empty());

    let all = VideoRepo::list(&state.pool).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, record.id);
}

#[tokio::test]
async fn no_save_writes_output_only() {
    let state = state_with(None).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("clip.mp4");

    let record = generate::store_generated(
        &state,
        "Rain".to_string(),
        video(b"rain-bytes"),
        Some(&output),
        false,
    )
    .await
    .unwrap();

    assert!(record.is_none());
    assert_eq!(std::fs::read(&output).unwrap(), b"rain-bytes");
    assert!(VideoRepo::list(&state.pool).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Library export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn export_writes_stored_video() {
    let state = state_with(None).await;
    let record = generate::store_generated(&state, "Dunes".to_string(), video(b"dune-bytes"), None, true)
        .await
        .unwrap()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.mp4");
    library::export(&state, record.id, &path, None).await.unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"dune-bytes");

    let thumb = dir.path().join("thumb.jpg");
    let err = library::export(&state, record.id, &path, Some(&thumb))
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Validation(_)));
    assert!(!thumb.exists());
}

#[tokio::test]
async fn export_unknown_id_is_not_found() {
    let state = state_with(None).await;
    let dir = tempfile::tempdir().unwrap();

    let err = library::export(&state, 404, &dir.path().join("missing.mp4"), None)
        .await
        .unwrap_err();

    assert_matches!(err, AppError::Core(CoreError::NotFound { entity: "Video", id: 404 }));
    assert_eq!(err.user_message(), "Video with id 404 not found");
}

// ---------------------------------------------------------------------------
// Generate flow
// ---------------------------------------------------------------------------

const VIDEO_URI: &str = "https://example.test/files/clip:download?alt=media";

/// Backend whose behaviour depends on the key it was built with.
///
/// Keys starting with `bad` are rejected on submit. Any other key finishes
/// immediately, either with a video or with `rejection` as the embedded
/// operation error.
struct KeyedBackend {
    api_key: String,
    rejection: Option<&'static str>,
}

#[async_trait::async_trait]
impl VideoGenerationBackend for KeyedBackend {
    async fn submit(&self, _request: &GenerationRequest) -> Result<Operation, GenerationError> {
        if self.api_key.starts_with("bad") {
            return Err(GenerationError::Auth {
                detail: "API key not valid. Please pass a valid API key.".to_string(),
            });
        }
        let operation = match self.rejection {
            Some(message) => json!({
                "name": "models/veo/operations/1",
                "done": true,
                "error": { "code": 3, "message": message }
            }),
            None => json!({
                "name": "models/veo/operations/1",
                "done": true,
                "response": { "generateVideoResponse": {
                    "generatedSamples": [{ "video": { "uri": VIDEO_URI } }]
                } }
            }),
        };
        Ok(serde_json::from_value(operation).unwrap())
    }

    async fn get_operation(&self, _name: &str) -> Result<Operation, GenerationError> {
        unreachable!("every scripted operation finishes on submit")
    }

    async fn download(&self, uri: &str) -> Result<Vec<u8>, GenerationError> {
        assert_eq!(uri, VIDEO_URI);
        Ok(format!("clip-for-{}", self.api_key).into_bytes())
    }
}

fn keyed_poller(
    rejection: Option<&'static str>,
) -> impl Fn(&str) -> AppResult<GenerationPoller<KeyedBackend>> {
    move |api_key| {
        let backend = KeyedBackend {
            api_key: api_key.to_string(),
            rejection,
        };
        Ok(GenerationPoller::new(backend).with_poll_interval(Duration::from_millis(1)))
    }
}

/// Hands out replacement keys in order, storing each one like the
/// terminal prompt does. Runs dry with `None`.
struct ScriptedKeys {
    keys: VecDeque<&'static str>,
    reasons: Vec<String>,
}

impl ScriptedKeys {
    fn new(keys: &[&'static str]) -> Self {
        Self {
            keys: keys.iter().copied().collect(),
            reasons: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl KeyPrompt for ScriptedKeys {
    async fn request_key(&mut self, state: &AppState, reason: &str) -> AppResult<Option<String>> {
        self.reasons.push(reason.to_string());
        match self.keys.pop_front() {
            Some(key) => state.store_api_key(key).await.map(Some),
            None => Ok(None),
        }
    }
}

fn generate_args(extra: &[&str]) -> GenerateArgs {
    let mut argv = vec!["clipstudio", "generate", "--prompt", "  A paper boat  "];
    argv.extend_from_slice(extra);
    match Cli::try_parse_from(argv).unwrap().command {
        Command::Generate(args) => args,
        other => panic!("expected generate, got {other:?}"),
    }
}

#[tokio::test]
async fn generation_saves_trimmed_prompt() {
    let state = state_with(Some("good-env-key")).await;
    let mut keys = ScriptedKeys::new(&[]);

    let record = generate::run_with(
        &state,
        generate_args(&[]),
        keyed_poller(None),
        &mut keys,
        &CancellationToken::new(),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(record.prompt, "A paper boat");
    assert_eq!(record.video_blob, b"clip-for-good-env-key");
    assert!(keys.reasons.is_empty());
    assert_eq!(VideoRepo::list(&state.pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_generation_is_never_stored() {
    let state = state_with(Some("good-env-key")).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("clip.mp4");
    let output_arg = output.to_str().unwrap();

    let err = generate::run_with(
        &state,
        generate_args(&["--output", output_arg]),
        keyed_poller(Some("Prompt rejected")),
        &mut ScriptedKeys::new(&[]),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert_matches!(&err, AppError::Generation(GenerationError::NoOutput(msg)) if msg == "Prompt rejected");
    assert_eq!(err.user_message(), "Prompt rejected");
    assert_eq!(err.exit_code(), 1);
    assert!(VideoRepo::list(&state.pool).await.unwrap().is_empty());
    assert!(!output.exists());
}

#[tokio::test]
async fn cancelled_generation_is_never_stored() {
    let state = state_with(Some("good-env-key")).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = generate::run_with(
        &state,
        generate_args(&[]),
        keyed_poller(None),
        &mut ScriptedKeys::new(&[]),
        &cancel,
    )
    .await
    .unwrap_err();

    assert_matches!(err, AppError::Generation(GenerationError::Cancelled));
    assert_eq!(err.exit_code(), 130);
    assert!(VideoRepo::list(&state.pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_key_is_replaced_and_retried() {
    let state = state_with(Some("bad-env-key")).await;
    let mut keys = ScriptedKeys::new(&["good-new-key"]);

    let record = generate::run_with(
        &state,
        generate_args(&[]),
        keyed_poller(None),
        &mut keys,
        &CancellationToken::new(),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(record.video_blob, b"clip-for-good-new-key");
    assert_eq!(
        keys.reasons,
        vec!["Invalid or missing API key. Please enter a valid API key.".to_string()]
    );

    let resolved = state.api_key().await.unwrap().unwrap();
    assert_eq!(resolved.key, "good-new-key");
    assert_eq!(resolved.source, ApiKeySource::Stored);
}

#[tokio::test]
async fn key_attempts_are_bounded() {
    let state = state_with(Some("bad-env-key")).await;
    let mut keys = ScriptedKeys::new(&["bad-second", "bad-third", "good-too-late"]);

    let err = generate::run_with(
        &state,
        generate_args(&[]),
        keyed_poller(None),
        &mut keys,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert_matches!(err, AppError::Generation(GenerationError::Auth { .. }));
    assert_eq!(keys.reasons.len(), generate::MAX_KEY_ATTEMPTS - 1);
    assert_eq!(keys.keys, VecDeque::from(["good-too-late"]));
    assert!(VideoRepo::list(&state.pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_key_without_replacement_keeps_auth_error() {
    let state = state_with(Some("bad-env-key")).await;
    let mut keys = ScriptedKeys::new(&[]);

    let err = generate::run_with(
        &state,
        generate_args(&[]),
        keyed_poller(None),
        &mut keys,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert_matches!(err, AppError::Generation(GenerationError::Auth { .. }));
    assert_eq!(keys.reasons.len(), 1);
    assert!(VideoRepo::list(&state.pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_key_asks_before_generating() {
    let state = state_with(None).await;

    let mut declined = ScriptedKeys::new(&[]);
    let err = generate::run_with(
        &state,
        generate_args(&[]),
        keyed_poller(None),
        &mut declined,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::MissingApiKey);
    assert_eq!(declined.reasons, vec!["No API key configured.".to_string()]);

    let mut provided = ScriptedKeys::new(&["good-first-key"]);
    let record = generate::run_with(
        &state,
        generate_args(&["--no-save"]),
        keyed_poller(None),
        &mut provided,
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert!(record.is_none());
    assert!(VideoRepo::list(&state.pool).await.unwrap().is_empty());
    assert_eq!(state.api_key().await.unwrap().unwrap().key, "good-first-key");
}
