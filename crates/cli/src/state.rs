use std::sync::Arc;

use clipstudio_core::api_key::{resolve_api_key, validate_api_key, ResolvedApiKey};
use clipstudio_core::ffmpeg::ThumbnailCapture;
use clipstudio_db::models::setting::API_KEY_SETTING;
use clipstudio_db::repositories::SettingsRepo;
use clipstudio_db::DbPool;
use clipstudio_veo::{GenerationPoller, VeoApi};

use crate::config::AppConfig;
use crate::error::AppResult;

/// State shared by every command for one invocation.
///
/// Cheaply cloneable (the pool is reference-counted and the config is
/// behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Library database pool, migrated and health-checked.
    pub pool: DbPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Open the library database and bring its schema up to date.
    pub async fn init(config: AppConfig) -> AppResult<Self> {
        let pool = clipstudio_db::create_pool(&config.database_url).await?;
        tracing::debug!(database_url = %config.database_url, "Database connection pool created");

        clipstudio_db::health_check(&pool).await?;
        clipstudio_db::run_migrations(&pool).await?;
        tracing::debug!("Database migrations applied");

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }

    /// The key to use for API calls: the stored key, else `GEMINI_API_KEY`.
    pub async fn api_key(&self) -> AppResult<Option<ResolvedApiKey>> {
        let stored = SettingsRepo::get(&self.pool, API_KEY_SETTING).await?;
        Ok(resolve_api_key(
            stored.as_deref(),
            self.config.env_api_key.as_deref(),
        ))
    }

    /// Validate and persist a user-entered key, returning the cleaned value.
    pub async fn store_api_key(&self, raw: &str) -> AppResult<String> {
        let key = validate_api_key(raw)?;
        SettingsRepo::set(&self.pool, API_KEY_SETTING, &key).await?;
        tracing::info!("API key saved");
        Ok(key)
    }

    /// Remove the stored key. Returns whether one was present.
    pub async fn clear_api_key(&self) -> AppResult<bool> {
        Ok(SettingsRepo::delete(&self.pool, API_KEY_SETTING).await?)
    }

    /// Build a poller bound to `api_key` using the configured endpoint.
    pub fn poller(&self, api_key: &str) -> AppResult<GenerationPoller<VeoApi>> {
        let api = VeoApi::new(
            self.config.api_base.as_str(),
            self.config.model.as_str(),
            api_key,
            self.config.request_timeout,
        )?;
        Ok(GenerationPoller::new(api).with_poll_interval(self.config.poll_interval))
    }

    pub fn thumbnail_capture(&self) -> ThumbnailCapture {
        match &self.config.ffmpeg_path {
            Some(path) => ThumbnailCapture::new(path.clone()),
            None => ThumbnailCapture::default(),
        }
    }
}
