use super::StoryService;
use crate::models::{ImageAsset, Language};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum MockReply {
    Story(String),
    Failure(String),
}

/// Scripted stand-in for the Gemini client.
///
/// Replies cycle through the configured queue; an empty queue yields a
/// deterministic default story in the requested language.
#[derive(Clone)]
pub struct MockStoryClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockStoryClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_story_response(self, story: String) -> Self {
        self.replies.lock().unwrap().push(MockReply::Story(story));
        self
    }

    pub fn with_error_response(self, message: String) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Failure(message));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockStoryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoryService for MockStoryClient {
    async fn generate_story(&self, image: &ImageAsset, language: Language) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Ok(format!(
                "A quiet tale in {} about a {}x{} scene.",
                language,
                image.width(),
                image.height()
            ));
        }

        let index = (*count - 1) % replies.len();
        match &replies[index] {
            MockReply::Story(story) => Ok(story.clone()),
            MockReply::Failure(message) => Err(Error::AiProvider(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;
    use std::io::Cursor;

    fn test_asset() -> ImageAsset {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            4,
            4,
            image::Rgb([0, 0, 0]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        ImageAsset::from_bytes(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_default_story_mentions_language() {
        let client = MockStoryClient::new();
        let story = client
            .generate_story(&test_asset(), Language::Amharic)
            .await
            .unwrap();
        assert!(story.contains("Amharic"));
    }

    #[tokio::test]
    async fn test_configured_replies_cycle() {
        let client = MockStoryClient::new()
            .with_story_response("First story".to_string())
            .with_story_response("Second story".to_string());

        let asset = test_asset();
        assert_eq!(
            client
                .generate_story(&asset, Language::English)
                .await
                .unwrap(),
            "First story"
        );
        assert_eq!(
            client
                .generate_story(&asset, Language::English)
                .await
                .unwrap(),
            "Second story"
        );
        // Cycles back around.
        assert_eq!(
            client
                .generate_story(&asset, Language::English)
                .await
                .unwrap(),
            "First story"
        );
        assert_eq!(client.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_error_reply_surfaces_as_ai_provider_error() {
        let client = MockStoryClient::new().with_error_response("connection reset".to_string());

        let err = client
            .generate_story(&test_asset(), Language::Chinese)
            .await
            .unwrap_err();
        match err {
            Error::AiProvider(message) => assert_eq!(message, "connection reset"),
            other => panic!("expected AiProvider error, got {:?}", other),
        }
    }
}
