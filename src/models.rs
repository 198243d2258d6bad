//! Data models and structures
//!
//! Defines the core data structures for the story workflow: the language
//! selection, the in-memory image asset, the generation outcome, and the
//! application configuration.

use crate::Result;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target language for the generated story.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Amharic,
    Chinese,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Amharic, Language::Chinese];

    /// Natural-language name as used inside the prompt text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Amharic => "Amharic",
            Language::Chinese => "Chinese",
        }
    }

    /// Case-insensitive parse of a user-supplied language tag.
    pub fn parse(input: &str) -> Option<Language> {
        match input.trim().to_ascii_lowercase().as_str() {
            "english" => Some(Language::English),
            "amharic" => Some(Language::Amharic),
            "chinese" => Some(Language::Chinese),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw bytes of an uploaded image together with its detected format and
/// decoded pixel dimensions.
///
/// Lives in memory for a single interaction and is replaced wholesale when a
/// new image is supplied.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    bytes: Vec<u8>,
    format: ImageFormat,
    width: u32,
    height: u32,
}

impl ImageAsset {
    /// Decode `bytes` as an image, capturing format and pixel dimensions.
    ///
    /// Fails with [`crate::Error::Image`] when the bytes are not a decodable
    /// image, before any network traffic happens.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes)?;
        let decoded = image::load_from_memory_with_format(&bytes, format)?;

        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            format,
            bytes,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// MIME type reported to the generation API for the inline payload.
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Marker prefixing rendered failure messages at the presentation boundary.
pub const ERROR_MARKER: &str = "Error";

/// Result of one generation attempt: narrative text or a human-readable
/// failure reason.
///
/// Each invocation produces a fresh outcome; outcomes are never merged or
/// appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryOutcome {
    Story(String),
    Failure(String),
}

impl StoryOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        StoryOutcome::Failure(reason.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StoryOutcome::Failure(_))
    }

    /// Render for display. Failures carry the literal `Error` marker so that
    /// shells relying on the prefix convention keep working.
    pub fn render(&self) -> String {
        match self {
            StoryOutcome::Story(text) => text.clone(),
            StoryOutcome::Failure(reason) => format!("{}: {}", ERROR_MARKER, reason),
        }
    }
}

pub const DEFAULT_STORY_MODEL: &str = "gemini-flash-latest";

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Stored API key, typically from `.env` or the environment.
    pub gemini_api_key: Option<String>,
    pub story_model: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            story_model: std::env::var("STORY_MODEL")
                .unwrap_or_else(|_| DEFAULT_STORY_MODEL.to_string()),
        }
    }
}

/// Pick the credential to use for generation.
///
/// A manually entered key takes precedence over the stored one; blank values
/// count as absent.
pub fn resolve_credential(manual: Option<&str>, stored: Option<&str>) -> Option<String> {
    let present = |value: Option<&str>| {
        value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    present(manual).or_else(|| present(stored))
}
