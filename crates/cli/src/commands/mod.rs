//! Command handlers.
//!
//! Each submodule handles one top-level subcommand and writes its
//! user-facing output to stdout. Errors bubble up to `main` as
//! [`AppError`](crate::error::AppError).

pub mod generate;
pub mod key;
pub mod library;

use crate::cli::{Command, KeyCommand, LibraryCommand};
use crate::error::AppResult;
use crate::state::AppState;

/// Route a parsed command to its handler.
pub async fn dispatch(state: &AppState, command: Command) -> AppResult<()> {
    match command {
        Command::Generate(args) => generate::run(state, args).await,
        Command::Library(LibraryCommand::List { sort }) => library::list(state, sort).await,
        Command::Library(LibraryCommand::Export {
            id,
            path,
            thumbnail,
        }) => library::export(state, id, &path, thumbnail.as_deref()).await,
        Command::Key(KeyCommand::Set { key }) => key::set(state, key).await,
        Command::Key(KeyCommand::Show) => key::show(state).await,
        Command::Key(KeyCommand::Clear) => key::clear(state).await,
    }
}
