//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clipstudio_core::composer::{MusicMood, StylePreset};
use clipstudio_core::library::SortOrder;
use clipstudio_core::request::AspectRatio;
use clipstudio_core::types::DbId;

#[derive(Debug, Parser)]
#[command(name = "clipstudio")]
#[command(about = "Generate short video clips from text and image prompts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a clip and add it to the library
    Generate(GenerateArgs),

    /// Browse and export saved clips
    #[command(subcommand)]
    Library(LibraryCommand),

    /// Manage the stored API key
    #[command(subcommand)]
    Key(KeyCommand),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// What the clip should show
    #[arg(short, long)]
    pub prompt: String,

    /// Reference image (PNG, JPEG or WebP) to animate
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Frame shape: 16:9 or 9:16
    #[arg(short, long, default_value_t = AspectRatio::Landscape)]
    pub aspect_ratio: AspectRatio,

    /// Visual style preset
    #[arg(short, long, default_value_t = StylePreset::None)]
    pub style: StylePreset,

    /// Soundtrack mood (requires --audio)
    #[arg(short, long, default_value_t = MusicMood::None)]
    pub music: MusicMood,

    /// Generate an audio track
    #[arg(long)]
    pub audio: bool,

    /// Also write the clip to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not add the clip to the library
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Debug, Subcommand)]
pub enum LibraryCommand {
    /// List saved clips
    List {
        /// newest, oldest or alphabetical
        #[arg(long, default_value_t = SortOrder::Newest)]
        sort: SortOrder,
    },

    /// Write a saved clip to a file
    Export {
        /// Library id shown by `library list`
        id: DbId,

        /// Destination video file
        path: PathBuf,

        /// Also write the thumbnail JPEG to this file
        #[arg(long)]
        thumbnail: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Save an API key (prompts with hidden input when omitted)
    Set { key: Option<String> },

    /// Show the active key, masked, and where it comes from
    Show,

    /// Remove the stored key
    Clear,
}
