//! Interactive shell orchestration: collect the inputs, call the gateway,
//! hand back the outcome for rendering.

use crate::gateway::StoryGateway;
use crate::models::{resolve_credential, Config, Language, StoryOutcome};
use crate::upload;
use crate::{Error, Result};
use std::path::Path;
use tracing::info;

/// One interactive session: a gateway plus the stored credential from
/// configuration. A manually entered key per invocation takes precedence.
pub struct App {
    gateway: StoryGateway,
    stored_key: Option<String>,
}

impl App {
    /// Construct an app from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            gateway: StoryGateway::new(config),
            stored_key: config.gemini_api_key.clone(),
        }
    }

    /// Construct an app around an existing gateway.
    ///
    /// This is primarily useful for integration tests that inject a mocked
    /// gateway.
    pub fn with_gateway(gateway: StoryGateway, stored_key: Option<String>) -> Self {
        Self {
            gateway,
            stored_key,
        }
    }

    /// Generate a story for the image at `path`.
    ///
    /// Fails before touching the gateway when no credential is available or
    /// the upload checks reject the file; everything past that point comes
    /// back as a [`StoryOutcome`].
    pub async fn run(
        &self,
        path: &Path,
        language: Language,
        manual_key: Option<&str>,
    ) -> Result<StoryOutcome> {
        let Some(credential) = resolve_credential(manual_key, self.stored_key.as_deref()) else {
            return Err(Error::Config(
                "No API key available. Pass --api-key or set GEMINI_API_KEY.".to_string(),
            ));
        };

        let image_bytes = upload::read_upload(path)?;
        info!(
            "Read {} ({} bytes), generating {} story",
            path.display(),
            image_bytes.len(),
            language
        );

        Ok(self
            .gateway
            .generate_story(&image_bytes, language, &credential)
            .await)
    }
}
