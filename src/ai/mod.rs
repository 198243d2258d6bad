//! AI service integration for story generation
//!
//! Provides the interface to Gemini's generateContent API for producing a
//! short narrative from an image and a target language.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiStoryClient;
pub use mock::MockStoryClient;

use crate::models::{ImageAsset, Language};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait StoryService: Send + Sync {
    async fn generate_story(&self, image: &ImageAsset, language: Language) -> Result<String>;
}
