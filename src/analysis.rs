//! Screenshot-to-profile pipeline and profile comparison.
//!
//! Every step is one relay call; steps run strictly in order because each
//! prompt embeds the previous step's output.

use crate::ai::reply::parse_envelope_json;
use crate::ai::{
    ContentBlock, ImageSource, MessageContent, MessagesRequest, MessagesService, ScreenshotImage,
};
use crate::models::{ModelSettings, ParsedMovieInfo};
use crate::{prompts, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

const EXTRACTION_MAX_TOKENS: u32 = 1000;
const PROFILE_MAX_TOKENS: u32 = 2500;
const QUICK_PROFILE_MAX_TOKENS: u32 = 1000;
const COMPATIBILITY_MAX_TOKENS: u32 = 2500;

pub struct ProfileAnalyzer {
    messages: Arc<dyn MessagesService>,
    models: ModelSettings,
}

impl ProfileAnalyzer {
    pub fn new(messages: Arc<dyn MessagesService>, models: ModelSettings) -> Self {
        Self { messages, models }
    }

    fn image_request(model: &str, max_tokens: u32, image: &ScreenshotImage, text: &str) -> MessagesRequest {
        MessagesRequest::user(
            model,
            max_tokens,
            MessageContent::Blocks(vec![
                ContentBlock::Image {
                    source: ImageSource::base64(image.media_type, &image.data),
                },
                ContentBlock::Text {
                    text: text.to_string(),
                },
            ]),
        )
    }

    /// Step one: the extraction model reads the films off the screenshot.
    pub async fn extract_movie_info(&self, image: &ScreenshotImage) -> Result<ParsedMovieInfo> {
        info!(
            "Reading screenshot with {} ({} base64 chars)",
            self.models.extraction_model,
            image.data.len()
        );
        let request = Self::image_request(
            &self.models.extraction_model,
            EXTRACTION_MAX_TOKENS,
            image,
            prompts::EXTRACT_MOVIES,
        );

        let envelope = self.messages.create_message(&request).await?;
        let info: ParsedMovieInfo = parse_envelope_json(&envelope)?;
        Ok(info.clamped())
    }

    /// Step two: the profile model writes the dating profile.
    ///
    /// Returns the reply envelope unmodified.
    pub async fn generate_profile(&self, info: &ParsedMovieInfo) -> Result<Value> {
        info!(
            "Generating profile with {} ({} favorites, {} recent)",
            self.models.profile_model,
            info.favorites.len(),
            info.recent.len()
        );
        let request = MessagesRequest::user(
            &self.models.profile_model,
            PROFILE_MAX_TOKENS,
            MessageContent::Text(prompts::standard_profile(info)),
        );
        self.messages.create_message(&request).await
    }

    /// Full two-step pipeline; returns the profile envelope.
    pub async fn analyze_screenshot(&self, image: &ScreenshotImage) -> Result<Value> {
        let info = self.extract_movie_info(image).await?;
        self.generate_profile(&info).await
    }

    /// Single-call mode: the profile model reads the screenshot directly.
    pub async fn quick_profile(&self, image: &ScreenshotImage) -> Result<Value> {
        info!("Generating quick profile with {}", self.models.profile_model);
        let request = Self::image_request(
            &self.models.profile_model,
            QUICK_PROFILE_MAX_TOKENS,
            image,
            prompts::QUICK_PROFILE,
        );
        self.messages.create_message(&request).await
    }

    /// Full pipeline, with the profile document parsed out of the envelope.
    pub async fn profile_from_screenshot(&self, image: &ScreenshotImage) -> Result<Value> {
        let envelope = self.analyze_screenshot(image).await?;
        parse_envelope_json(&envelope)
    }

    /// Asks the profile model to compare two profiles; returns its envelope.
    pub async fn compare(&self, user_profile: &Value, crush_profile: &Value) -> Result<Value> {
        info!("Generating compatibility analysis with {}", self.models.profile_model);
        let request = MessagesRequest::user(
            &self.models.profile_model,
            COMPATIBILITY_MAX_TOKENS,
            MessageContent::Text(prompts::compatibility(user_profile, crush_profile)),
        );
        self.messages.create_message(&request).await
    }
}
