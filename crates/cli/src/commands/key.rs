use std::io::IsTerminal;

use clipstudio_core::api_key::mask_api_key;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Save `key`, or ask for one with hidden input when omitted.
pub async fn set(state: &AppState, key: Option<String>) -> AppResult<()> {
    let key = match key {
        Some(key) => state.store_api_key(&key).await?,
        None => prompt_and_store(state).await?,
    };
    println!("API key saved ({})", mask_api_key(&key));
    Ok(())
}

pub async fn show(state: &AppState) -> AppResult<()> {
    match state.api_key().await? {
        Some(resolved) => println!(
            "Active API key: {} (from {})",
            mask_api_key(&resolved.key),
            resolved.source
        ),
        None => println!("No API key configured"),
    }
    Ok(())
}

pub async fn clear(state: &AppState) -> AppResult<()> {
    if state.clear_api_key().await? {
        println!("Stored API key removed");
    } else {
        println!("No stored API key");
    }
    if state.config.env_api_key.is_some() {
        println!("GEMINI_API_KEY is still set and will be used as a fallback");
    }
    Ok(())
}

/// Read a key from the terminal and persist it.
///
/// Fails with [`AppError::MissingApiKey`] when stdin is not a terminal.
pub async fn prompt_and_store(state: &AppState) -> AppResult<String> {
    if !std::io::stdin().is_terminal() {
        return Err(AppError::MissingApiKey);
    }

    let raw = tokio::task::block_in_place(|| {
        dialoguer::Password::new()
            .with_prompt("Gemini API key")
            .interact()
    })?;

    state.store_api_key(&raw).await
}
