//! POST /api/analyze: turns a Letterboxd screenshot into a dating profile.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::ai::ScreenshotImage;
use crate::app::App;
use crate::{canned, Error, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub image_data: Option<String>,
    #[serde(default)]
    pub use_mock: bool,
    /// Single relay call instead of the two-step pipeline.
    #[serde(default)]
    pub quick: bool,
}

/// Handler: POST /api/analyze
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:3000/api/analyze \
///   -H 'content-type: application/json' \
///   -d '{"imageData":"/9j/4AAQSkZJRg..."}'
/// ```
pub async fn analyze(
    State(app): State<App>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = payload?;

    let image_data = request
        .image_data
        .filter(|data| !data.trim().is_empty())
        .ok_or_else(|| Error::BadRequest("No image data provided".to_string()))?;

    if app.mock_requested(request.use_mock) {
        info!("Debug mode: returning canned profile");
        return Ok(Json(canned::profile_envelope()?));
    }

    let image = ScreenshotImage::from_base64(&image_data)?;
    let envelope = if request.quick {
        app.analyzer().quick_profile(&image).await?
    } else {
        app.analyzer().analyze_screenshot(&image).await?
    };

    Ok(Json(envelope))
}
