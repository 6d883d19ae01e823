//! Prompt composition.
//!
//! [`PromptComposer`] gathers the user's free text, an optional reference
//! image and the style/format/music selections, validates them, and folds
//! them into one [`GenerationRequest`].

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::request::{AspectRatio, GenerationRequest, ReferenceImage};

/// Upper bound on user prompt length, in characters.
pub const MAX_PROMPT_CHARS: usize = 4000;

// ---------------------------------------------------------------------------
// Style presets
// ---------------------------------------------------------------------------

/// Visual style appended to the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StylePreset {
    #[default]
    None,
    Cinematic,
    Anime,
    Documentary,
    Vintage,
    Claymation,
    Watercolor,
}

impl StylePreset {
    pub const ALL: &'static [StylePreset] = &[
        Self::None,
        Self::Cinematic,
        Self::Anime,
        Self::Documentary,
        Self::Vintage,
        Self::Claymation,
        Self::Watercolor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Cinematic => "cinematic",
            Self::Anime => "anime",
            Self::Documentary => "documentary",
            Self::Vintage => "vintage",
            Self::Claymation => "claymation",
            Self::Watercolor => "watercolor",
        }
    }

    /// Prompt text contributed by this style, if any.
    pub fn fragment(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Cinematic => {
                Some("Cinematic style, dramatic lighting, shallow depth of field, film grain")
            }
            Self::Anime => Some("Anime style, vibrant colors, hand-drawn cel shading"),
            Self::Documentary => Some("Documentary style, handheld camera, natural lighting"),
            Self::Vintage => Some("Vintage style, 1970s film stock, warm faded colors"),
            Self::Claymation => Some("Claymation style, stop-motion clay figures, tactile textures"),
            Self::Watercolor => Some("Watercolor style, soft painted washes, paper texture"),
        }
    }
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StylePreset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|style| style.as_str() == needle)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid style '{needle}'. Must be one of: {}",
                    join_names(Self::ALL.iter().map(StylePreset::as_str))
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Music moods
// ---------------------------------------------------------------------------

/// Soundtrack mood; only meaningful when audio generation is enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MusicMood {
    #[default]
    None,
    Upbeat,
    Calm,
    Dramatic,
    Ambient,
}

impl MusicMood {
    pub const ALL: &'static [MusicMood] = &[
        Self::None,
        Self::Upbeat,
        Self::Calm,
        Self::Dramatic,
        Self::Ambient,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Upbeat => "upbeat",
            Self::Calm => "calm",
            Self::Dramatic => "dramatic",
            Self::Ambient => "ambient",
        }
    }

    pub fn fragment(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Upbeat => Some("Background music: upbeat and energetic"),
            Self::Calm => Some("Background music: calm, gentle piano"),
            Self::Dramatic => Some("Background music: dramatic orchestral score"),
            Self::Ambient => Some("Background music: soft ambient soundscape"),
        }
    }
}

impl fmt::Display for MusicMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MusicMood {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|mood| mood.as_str() == needle)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid music mood '{needle}'. Must be one of: {}",
                    join_names(Self::ALL.iter().map(MusicMood::as_str))
                ))
            })
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

/// Builder for a [`GenerationRequest`].
#[derive(Debug, Clone, Default)]
pub struct PromptComposer {
    prompt_text: String,
    image: Option<ReferenceImage>,
    style: StylePreset,
    aspect_ratio: AspectRatio,
    music: MusicMood,
    generate_audio: bool,
}

impl PromptComposer {
    pub fn new(prompt_text: impl Into<String>) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            ..Default::default()
        }
    }

    pub fn image(mut self, image: ReferenceImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn style(mut self, style: StylePreset) -> Self {
        self.style = style;
        self
    }

    pub fn aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn music(mut self, music: MusicMood) -> Self {
        self.music = music;
        self
    }

    pub fn generate_audio(mut self, enabled: bool) -> Self {
        self.generate_audio = enabled;
        self
    }

    /// Validate the selections and build the final request.
    ///
    /// The prompt is the user's text, then the style fragment, then the
    /// music fragment (only when audio is enabled), as separate sentences.
    pub fn compose(self) -> Result<GenerationRequest, CoreError> {
        let text = self.prompt_text.trim();
        if text.is_empty() {
            return Err(CoreError::Validation("Prompt must not be empty".to_string()));
        }
        let char_count = text.chars().count();
        if char_count > MAX_PROMPT_CHARS {
            return Err(CoreError::Validation(format!(
                "Prompt is {char_count} characters; the limit is {MAX_PROMPT_CHARS}"
            )));
        }

        let mut fragments: Vec<&str> = Vec::new();
        fragments.extend(self.style.fragment());
        if self.generate_audio {
            fragments.extend(self.music.fragment());
        }

        let prompt_text = if fragments.is_empty() {
            text.to_string()
        } else {
            // Keep the user's `!`/`?`; a trailing `.` is replaced by the separator.
            let base = text.trim_end_matches('.');
            let separator = if base.ends_with(|c: char| c == '!' || c == '?') {
                " "
            } else {
                ". "
            };
            format!("{base}{separator}{}", fragments.join(". "))
        };

        Ok(GenerationRequest::new(
            prompt_text,
            self.image,
            self.aspect_ratio,
            self.generate_audio,
        ))
    }
}
