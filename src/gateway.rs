//! Story Generation Gateway
//!
//! Translates an (image bytes, language, credential) triple into narrative
//! text via the configured story service, and normalizes every failure mode
//! into a displayable [`StoryOutcome`]. The gateway never returns a hard
//! error: missing credentials, undecodable images, and service failures all
//! terminate in a `Failure` outcome.

use crate::ai::{GeminiStoryClient, StoryService};
use crate::models::{Config, ImageAsset, Language, StoryOutcome};
use crate::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

/// Builds a story service handle for a given credential.
///
/// The production factory constructs Gemini clients; tests inject factories
/// returning mocks or errors.
pub type StoryServiceFactory =
    Box<dyn Fn(&str) -> Result<Arc<dyn StoryService>> + Send + Sync>;

pub struct StoryGateway {
    factory: StoryServiceFactory,
    /// Handles memoized per credential for the process lifetime. The key
    /// space is effectively one active credential, so there is no eviction.
    handles: Mutex<HashMap<String, Arc<dyn StoryService>>>,
}

impl StoryGateway {
    /// Build a gateway that talks to Gemini with the configured model.
    pub fn new(config: &Config) -> Self {
        let model = config.story_model.clone();
        // Reuse one HTTP connection pool across memoized handles.
        let http_client = reqwest::Client::new();

        Self::with_factory(Box::new(move |api_key| {
            Ok(Arc::new(GeminiStoryClient::new_with_client(
                api_key.to_string(),
                model.clone(),
                http_client.clone(),
            )) as Arc<dyn StoryService>)
        }))
    }

    /// Build a gateway from an explicit service factory.
    ///
    /// This is primarily useful for integration tests and local harnesses
    /// that need to inject mocks.
    pub fn with_factory(factory: StoryServiceFactory) -> Self {
        Self {
            factory,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Configure (or fetch the memoized) service handle for `credential`.
    ///
    /// Returns `None` for an empty credential or when client construction
    /// fails; construction failures are logged rather than propagated.
    pub fn initialize_model(&self, credential: &str) -> Option<Arc<dyn StoryService>> {
        if credential.is_empty() {
            return None;
        }

        let mut handles = self.handles.lock().expect("handle cache lock poisoned");
        if let Some(handle) = handles.get(credential) {
            debug!("Reusing memoized story model handle");
            return Some(handle.clone());
        }

        match (self.factory)(credential) {
            Ok(handle) => {
                info!("Initialized story model handle");
                handles.insert(credential.to_string(), handle.clone());
                Some(handle)
            }
            Err(e) => {
                error!("Failed to initialize story model: {}", e);
                None
            }
        }
    }

    /// Generate a story for `image_bytes` written in `language`.
    ///
    /// Ordering is fixed: credential check, then decode, then a single
    /// generation call. Nothing is retried, and no network call happens for
    /// a missing credential or undecodable input.
    pub async fn generate_story(
        &self,
        image_bytes: &[u8],
        language: Language,
        credential: &str,
    ) -> StoryOutcome {
        let Some(model) = self.initialize_model(credential) else {
            return StoryOutcome::failure("Model not initialized. Please check your API key.");
        };

        let asset = match ImageAsset::from_bytes(image_bytes.to_vec()) {
            Ok(asset) => asset,
            Err(e) => {
                return StoryOutcome::failure(format!("Could not decode the uploaded image: {}", e))
            }
        };

        debug!(
            "Generating {} story for {}x{} {} image",
            language,
            asset.width(),
            asset.height(),
            asset.mime_type()
        );

        match model.generate_story(&asset, language).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    StoryOutcome::failure("Empty response from the story model.")
                } else {
                    StoryOutcome::Story(text.to_string())
                }
            }
            Err(e) => StoryOutcome::failure(format!("Story generation failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockStoryClient;
    use crate::Error;
    use image::ImageFormat;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn png_bytes() -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            16,
            16,
            image::Rgb([80, 120, 200]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn gateway_with_mock(mock: MockStoryClient) -> (StoryGateway, Arc<AtomicUsize>) {
        let factory_calls = Arc::new(AtomicUsize::new(0));
        let calls = factory_calls.clone();
        let gateway = StoryGateway::with_factory(Box::new(move |_credential| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(mock.clone()) as Arc<dyn StoryService>)
        }));
        (gateway, factory_calls)
    }

    #[tokio::test]
    async fn test_empty_credential_fails_without_touching_the_factory() {
        let mock = MockStoryClient::new();
        let probe = mock.clone();
        let (gateway, factory_calls) = gateway_with_mock(mock);

        let outcome = gateway
            .generate_story(&png_bytes(), Language::English, "")
            .await;

        assert!(outcome.is_error());
        assert_eq!(
            outcome.render(),
            "Error: Model not initialized. Please check your API key."
        );
        assert_eq!(factory_calls.load(Ordering::SeqCst), 0);
        assert_eq!(probe.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_factory_failure_is_logged_not_propagated() {
        let gateway = StoryGateway::with_factory(Box::new(|_credential| {
            Err(Error::AiProvider("malformed credential".to_string()))
        }));

        assert!(gateway.initialize_model("bad-key").is_none());

        let outcome = gateway
            .generate_story(&png_bytes(), Language::English, "bad-key")
            .await;
        assert!(outcome.is_error());
        assert!(outcome.render().contains("Model not initialized"));
    }

    #[tokio::test]
    async fn test_undecodable_image_fails_before_any_service_call() {
        let mock = MockStoryClient::new();
        let probe = mock.clone();
        let (gateway, _) = gateway_with_mock(mock);

        // Claims to be a JPEG, decodes as nothing.
        let mut corrupted = vec![0xFF, 0xD8, 0xFF, 0xE0];
        corrupted.extend_from_slice(&[0x00; 64]);

        let outcome = gateway
            .generate_story(&corrupted, Language::Chinese, "valid-key")
            .await;

        assert!(outcome.is_error());
        assert!(outcome.render().contains("Could not decode"));
        assert_eq!(probe.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_successful_generation_returns_trimmed_story() {
        let mock =
            MockStoryClient::new().with_story_response("  A lantern drifts over the bay.  ".to_string());
        let (gateway, _) = gateway_with_mock(mock);

        let outcome = gateway
            .generate_story(&png_bytes(), Language::Amharic, "valid-key")
            .await;

        assert!(!outcome.is_error());
        assert_eq!(outcome.render(), "A lantern drifts over the bay.");
    }

    #[tokio::test]
    async fn test_service_error_message_is_embedded_verbatim() {
        let mock = MockStoryClient::new()
            .with_error_response("connection reset by peer".to_string());
        let (gateway, _) = gateway_with_mock(mock);

        let outcome = gateway
            .generate_story(&png_bytes(), Language::English, "valid-key")
            .await;

        assert!(outcome.is_error());
        assert!(outcome.render().contains("connection reset by peer"));
    }

    #[tokio::test]
    async fn test_blank_story_text_is_reported_as_empty_response() {
        let mock = MockStoryClient::new().with_story_response("   \n  ".to_string());
        let (gateway, _) = gateway_with_mock(mock);

        let outcome = gateway
            .generate_story(&png_bytes(), Language::English, "valid-key")
            .await;

        assert!(outcome.is_error());
        assert!(outcome.render().contains("Empty response"));
    }

    #[tokio::test]
    async fn test_handle_is_memoized_per_credential() {
        let mock = MockStoryClient::new();
        let (gateway, factory_calls) = gateway_with_mock(mock);

        let bytes = png_bytes();
        gateway
            .generate_story(&bytes, Language::English, "key-a")
            .await;
        gateway
            .generate_story(&bytes, Language::Chinese, "key-a")
            .await;
        assert_eq!(factory_calls.load(Ordering::SeqCst), 1);

        gateway
            .generate_story(&bytes, Language::English, "key-b")
            .await;
        assert_eq!(factory_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_repeated_calls_are_independent_not_cached() {
        let mock = MockStoryClient::new()
            .with_story_response("First telling".to_string())
            .with_story_response("Second telling".to_string());
        let probe = mock.clone();
        let (gateway, _) = gateway_with_mock(mock);

        let bytes = png_bytes();
        let first = gateway
            .generate_story(&bytes, Language::English, "valid-key")
            .await;
        let second = gateway
            .generate_story(&bytes, Language::English, "valid-key")
            .await;

        // Identical inputs, two real calls, two different stories.
        assert_eq!(probe.get_call_count(), 2);
        assert_ne!(first, second);
    }
}
